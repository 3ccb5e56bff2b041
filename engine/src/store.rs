// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

use crate::{
    arch::{Address, Word, DEFAULT_STORE_CAPACITY},
    error::{EngineError, EngineResult},
};

/// Flat word-addressable memory the engine computes in. One call is one
/// logical access.
pub trait WordStore {
    /// Number of addressable words.
    fn capacity(&self) -> usize;

    fn read(&self, address: Address) -> EngineResult<Word>;

    fn write(&mut self, address: Address, word: Word) -> EngineResult<()>;

    /// Fails with [`EngineError::OutOfRange`] unless `start..start + length`
    /// lies entirely inside the store.
    fn check_span(&self, start: Address, length: usize) -> EngineResult<()> {
        let capacity = self.capacity();
        match start.checked_add(length) {
            Some(end) if end <= capacity => Ok(()),
            _ => Err(EngineError::OutOfRange {
                address: start.saturating_add(length.saturating_sub(1)),
                capacity,
            }),
        }
    }
}

/// A zero-filled, bounds-checked [`WordStore`] on the heap.
pub struct VecStore {
    words: Box<[Word]>,
}

impl VecStore {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            words: vec![0; capacity].into_boxed_slice(),
        }
    }
}

impl Default for VecStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_STORE_CAPACITY)
    }
}

impl WordStore for VecStore {
    fn capacity(&self) -> usize {
        self.words.len()
    }

    fn read(&self, address: Address) -> EngineResult<Word> {
        self.words
            .get(address)
            .copied()
            .ok_or(EngineError::OutOfRange {
                address,
                capacity: self.words.len(),
            })
    }

    fn write(&mut self, address: Address, word: Word) -> EngineResult<()> {
        let capacity = self.words.len();
        let slot = self
            .words
            .get_mut(address)
            .ok_or(EngineError::OutOfRange { address, capacity })?;
        *slot = word;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{VecStore, WordStore};
    use crate::error::EngineError;

    #[test]
    fn starts_zeroed() {
        let store = VecStore::with_capacity(4);
        assert_eq!(4, store.capacity());
        assert!((0..4).all(|address| store.read(address) == Ok(0)));
    }

    #[test]
    fn reads_back_writes() {
        let mut store = VecStore::with_capacity(4);
        store.write(3, 999_999_999).expect("address 3 is in range");
        assert_eq!(Ok(999_999_999), store.read(3));
    }

    #[test]
    fn rejects_out_of_range_access() {
        let mut store = VecStore::with_capacity(4);
        let out_of_range = EngineError::OutOfRange {
            address: 4,
            capacity: 4,
        };
        assert_eq!(Err(out_of_range.clone()), store.read(4));
        assert_eq!(Err(out_of_range), store.write(4, 1));
    }

    #[test]
    fn checks_spans() {
        let store = VecStore::with_capacity(10);
        assert!(store.check_span(5, 5).is_ok());
        assert_eq!(
            Err(EngineError::OutOfRange {
                address: 10,
                capacity: 10
            }),
            store.check_span(5, 6)
        );
        assert!(store.check_span(usize::MAX, 2).is_err());
    }
}
