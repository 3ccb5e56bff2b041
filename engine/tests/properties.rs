// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

//! Algebraic properties of the engine's opcodes, checked with proptest.

use machin_engine::{arch::{Word, BASE}, Engine, Op};
use proptest::prelude::*;

const A: u8 = 0;
const B: u8 = 1;
const D: u8 = 2;
const T: u8 = 3;

fn configured(width: usize) -> Engine {
    let mut engine = Engine::with_capacity(width * 4);
    engine.configure(width).expect("fresh engine accepts a width");
    engine
}

fn load(engine: &mut Engine, r: u8, words: &[Word]) {
    engine.load_register(r, words).expect("register fits the store");
}

fn run(engine: &mut Engine, op: Op) -> Vec<Word> {
    engine.execute(op).expect("op should succeed").output
}

/// Words least significant first, with the top word bounded by `top`.
fn number(width: usize, top: Word) -> impl Strategy<Value = Vec<Word>> {
    (prop::collection::vec(0..BASE, width - 1), 0..top).prop_map(
        |(mut words, top)| {
            words.push(top);
            words
        },
    )
}

fn as_u128(words: &[Word]) -> u128 {
    words
        .iter()
        .rev()
        .fold(0, |value, &word| value * BASE as u128 + word as u128)
}

fn from_u128(mut value: u128, width: usize) -> Vec<Word> {
    (0..width)
        .map(|_| {
            let word = (value % BASE as u128) as Word;
            value /= BASE as u128;
            word
        })
        .collect()
}

/// `x * k mod 10^36` without overflowing, for `x < 10^36` and `k < 10^9`.
fn multiply_mod(x: u128, k: u128) -> u128 {
    let half = (BASE as u128).pow(2);
    let (high, low) = (x / half, x % half);
    ((high * k % half) * half + low * k) % (half * half)
}

proptest! {
    /// (a + b) - b == a
    #[test]
    fn add_then_subtract_round_trips(
        (a, b) in (1..6usize).prop_flat_map(|w| {
            (number(w, BASE / 2), number(w, BASE / 2))
        })
    ) {
        let mut engine = configured(a.len());
        load(&mut engine, A, &a);
        load(&mut engine, B, &b);
        run(&mut engine, Op::Add(D, A, B));
        run(&mut engine, Op::Subtract(D, D, B));
        prop_assert_eq!(a, engine.register(D).unwrap());
    }

    /// Shifting left then right by `k` words loses exactly the top `k` words.
    #[test]
    fn shift_round_trip_truncates_top_words(
        (a, k) in (1..6usize).prop_flat_map(|w| (number(w, BASE), 0..=w))
    ) {
        let width = a.len();
        let mut engine = configured(width);
        load(&mut engine, A, &a);
        run(&mut engine, Op::Set(D, 0));
        run(&mut engine, Op::LeftShift(D, A, k as u64));
        run(&mut engine, Op::RightShift(D, D, k as u64));

        let mut expected = a.clone();
        for word in &mut expected[width - k..] {
            *word = 0;
        }
        prop_assert_eq!(expected, engine.register(D).unwrap());
    }

    /// (a * k) / k == a whenever a * k fits.
    #[test]
    fn multiply_then_divide_round_trips(
        (a, k) in (1..6usize)
            .prop_flat_map(|w| (number(w, BASE / 100_000), 1..100_000u64))
    ) {
        let mut engine = configured(a.len());
        load(&mut engine, A, &a);
        run(&mut engine, Op::MultiplyImmediate(T, A, k));
        run(&mut engine, Op::DivideImmediate(D, T, k));
        prop_assert_eq!(a, engine.register(D).unwrap());
    }

    /// `is_zero` answers 1 exactly for the all-zero register.
    #[test]
    fn is_zero_iff_every_word_is_zero(
        a in (1..6usize).prop_flat_map(|w| {
            prop::collection::vec(prop_oneof![3 => Just(0), 1 => 0..BASE], w)
        })
    ) {
        let mut engine = configured(a.len());
        load(&mut engine, A, &a);
        let result = engine.execute(Op::IsZero(A)).unwrap().result;
        let expected = a.iter().all(|&word| word == 0) as Word;
        prop_assert_eq!(Some(expected), result);
    }

    /// `output` emits the value most significant group first, without
    /// leading zero groups.
    #[test]
    fn output_is_value_without_leading_zeros(
        a in (1..5usize).prop_flat_map(|w| {
            prop::collection::vec(prop_oneof![1 => Just(0), 1 => 0..BASE], w)
        })
    ) {
        let mut engine = configured(a.len());
        load(&mut engine, A, &a);
        let output = run(&mut engine, Op::Output(A));

        prop_assert!(!output.is_empty());
        prop_assert!(output.len() == 1 || output[0] != 0);
        let mut groups = output.clone();
        groups.reverse();
        prop_assert_eq!(as_u128(&a), as_u128(&groups));
    }

    /// Agrees with native 128-bit arithmetic modulo `10^36` on four-word
    /// registers.
    #[test]
    fn agrees_with_native_arithmetic(
        a in number(4, BASE),
        b in number(4, BASE),
        k in 1..1_000_000_000u64,
    ) {
        let modulus = (BASE as u128).pow(4);
        let (x, y) = (as_u128(&a), as_u128(&b));
        let mut engine = configured(4);
        load(&mut engine, A, &a);
        load(&mut engine, B, &b);

        run(&mut engine, Op::Add(D, A, B));
        prop_assert_eq!(
            from_u128((x + y) % modulus, 4),
            engine.register(D).unwrap()
        );

        run(&mut engine, Op::AddImmediate(D, A, k));
        prop_assert_eq!(
            from_u128((x + k as u128) % modulus, 4),
            engine.register(D).unwrap()
        );

        let (big, small) = if x >= y { (A, B) } else { (B, A) };
        run(&mut engine, Op::Subtract(D, big, small));
        prop_assert_eq!(
            from_u128(x.abs_diff(y), 4),
            engine.register(D).unwrap()
        );

        run(&mut engine, Op::MultiplyImmediate(D, A, k));
        prop_assert_eq!(
            from_u128(multiply_mod(x, k as u128), 4),
            engine.register(D).unwrap()
        );

        run(&mut engine, Op::DivideImmediate(D, A, k));
        prop_assert_eq!(
            from_u128(x / k as u128, 4),
            engine.register(D).unwrap()
        );
    }
}
