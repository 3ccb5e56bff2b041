// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

use std::io;

use machin_engine::arch::Word;

/// Concatenates digit groups into a decimal string: the first group as is,
/// every later group zero-padded to nine digits.
pub fn render(groups: impl IntoIterator<Item = Word>) -> String {
    let mut rendered = String::new();
    for (i, group) in groups.into_iter().enumerate() {
        if i == 0 {
            rendered.push_str(&group.to_string());
        } else {
            rendered.push_str(&format!("{group:09}"));
        }
    }
    rendered
}

/// Writes one zero-padded group per line.
pub fn write_transcript<W: io::Write>(
    writer: &mut W,
    groups: impl IntoIterator<Item = Word>,
) -> io::Result<()> {
    for group in groups {
        writeln!(writer, "{group:09}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{render, write_transcript};

    #[test]
    fn pads_all_but_the_first_group() {
        assert_eq!("3000000001141592653", render([3, 1, 141_592_653]));
        assert_eq!("0", render([0]));
        assert_eq!("", render([]));
    }

    #[test]
    fn transcript_pads_every_group() {
        let mut out = vec![];
        write_transcript(&mut out, [3, 14]).unwrap();
        assert_eq!("000000003\n000000014\n", String::from_utf8(out).unwrap());
    }
}
