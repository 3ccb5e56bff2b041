// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

use std::mem;

use tracing::{debug, trace};

use crate::{
    arch::{
        Address, DoubleWord, Immediate, RegisterIndex, Word, BASE,
        IMMEDIATE_WORDS, MAX_DIVIDE_IMMEDIATE, MAX_MULTIPLY_IMMEDIATE,
    },
    error::{ConfigurationError, EngineError, EngineResult, ProtocolError},
    op::{Op, Request},
    store::{VecStore, WordStore},
};

/// The big-integer engine. Holds at most one outstanding request and
/// computes only with non-negative register values.
pub struct Engine<S: WordStore = VecStore> {
    store: S,
    word_width: usize,
    state: State,
    requests: u64,
}

enum State {
    Uninitialized,
    AwaitingRequest,
    Pending(Op),
    Streaming(OutputCursor),
}

/// Position of an in-progress `output`. `next` is the word emitted on the
/// following step; `None` means the least significant word has gone out.
struct OutputCursor {
    base: Address,
    next: Option<usize>,
}

/// What one [`Engine::step`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// One digit group of an `output` stream.
    Output(Word),
    /// The outstanding request finished.
    Completed(Completion),
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Completion {
    /// Scalar result, set only by `is_zero`.
    pub result: Option<Word>,
    /// Groups streamed by `output`, most significant first. Only filled in
    /// by [`Engine::execute`].
    pub output: Vec<Word>,
}

impl Engine<VecStore> {
    /// Creates an engine over a fresh zeroed store of `capacity` words.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(VecStore::with_capacity(capacity))
    }
}

impl Default for Engine<VecStore> {
    fn default() -> Self {
        Self::new(VecStore::default())
    }
}

impl<S: WordStore> Engine<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            word_width: 0,
            state: State::Uninitialized,
            requests: 0,
        }
    }

    /// Fixes the number of words per register. Must be called exactly once,
    /// before any request.
    pub fn configure(&mut self, word_width: usize) -> EngineResult<()> {
        if !matches!(self.state, State::Uninitialized) {
            return Err(
                ConfigurationError::AlreadyConfigured(self.word_width).into()
            );
        }
        if word_width == 0 {
            return Err(ConfigurationError::ZeroWordWidth.into());
        }

        self.word_width = word_width;
        self.state = State::AwaitingRequest;
        debug!(word_width, capacity = self.store.capacity(), "configured");
        Ok(())
    }

    pub fn word_width(&self) -> Option<usize> {
        match self.state {
            State::Uninitialized => None,
            _ => Some(self.word_width),
        }
    }

    /// Whether a request can be submitted right now.
    pub fn is_idle(&self) -> bool {
        matches!(self.state, State::AwaitingRequest)
    }

    /// Number of requests accepted so far.
    pub fn requests_issued(&self) -> u64 {
        self.requests
    }

    /// Accepts `request` as the outstanding request.
    pub fn submit(&mut self, request: impl Into<Request>) -> EngineResult<()> {
        match &self.state {
            State::Uninitialized => {
                Err(ConfigurationError::Unconfigured.into())
            }
            State::Pending(op) => {
                Err(ProtocolError::RequestOutstanding(op.mnemonic()).into())
            }
            State::Streaming(_) => {
                Err(ProtocolError::RequestOutstanding("output").into())
            }
            State::AwaitingRequest => {
                let op = Op::decode(request.into())?;
                self.requests += 1;
                self.state = State::Pending(op);
                Ok(())
            }
        }
    }

    /// Advances the outstanding request by one step. A failed step drops
    /// the request.
    pub fn step(&mut self) -> EngineResult<Event> {
        match mem::replace(&mut self.state, State::AwaitingRequest) {
            State::Uninitialized => {
                self.state = State::Uninitialized;
                Err(ConfigurationError::Unconfigured.into())
            }
            State::AwaitingRequest => Err(ProtocolError::NoRequest.into()),
            State::Pending(op) => self.dispatch(op),
            State::Streaming(cursor) => self.stream(cursor),
        }
    }

    /// Submits `request` and steps it to completion, gathering any streamed
    /// output into the returned [`Completion`].
    pub fn execute(
        &mut self,
        request: impl Into<Request>,
    ) -> EngineResult<Completion> {
        self.submit(request)?;
        let mut output = vec![];
        loop {
            match self.step()? {
                Event::Output(word) => output.push(word),
                Event::Completed(mut completion) => {
                    completion.output = output;
                    return Ok(completion);
                }
            }
        }
    }

    /// Writes `words` (least significant first) straight into register `r`,
    /// zero-filling the rest, bypassing the request protocol. Intended for
    /// seeding registers from tooling and tests.
    pub fn load_register(
        &mut self,
        r: RegisterIndex,
        words: &[Word],
    ) -> EngineResult<()> {
        let base = self.register_base(r)?;
        if words.len() > self.word_width {
            return Err(EngineError::OutOfRange {
                address: base.saturating_add(words.len() - 1),
                capacity: self.store.capacity(),
            });
        }
        if words.iter().any(|&word| word >= BASE) {
            return Err(EngineError::InvalidArgument(
                "register words must be below 10^9",
            ));
        }
        for i in 0..self.word_width {
            self.store.write(base + i, words.get(i).copied().unwrap_or(0))?;
        }
        Ok(())
    }

    /// Reads register `r`, least significant word first.
    pub fn register(&self, r: RegisterIndex) -> EngineResult<Vec<Word>> {
        let base = self.register_base(r)?;
        (0..self.word_width)
            .map(|i| self.store.read(base + i))
            .collect()
    }

    fn dispatch(&mut self, op: Op) -> EngineResult<Event> {
        trace!(%op, "dispatch");

        match op {
            Op::Set(d, k) => self.set(d, k),
            Op::AddImmediate(d, s, k) => self.add_immediate(d, s, k),
            Op::Add(d, a, b) => self.add(d, a, b),
            Op::SubtractImmediate(d, s, k) => self.subtract_immediate(d, s, k),
            Op::Subtract(d, a, b) => self.subtract(d, a, b),
            Op::MultiplyImmediate(d, s, k) => self.multiply_immediate(d, s, k),
            Op::DivideImmediate(d, s, k) => self.divide_immediate(d, s, k),
            Op::Copy(d, s) => self.copy(d, s),
            Op::LeftShift(d, s, k) => self.left_shift(d, s, k),
            Op::RightShift(d, s, k) => self.right_shift(d, s, k),
            Op::Output(s) => return self.begin_output(s),
            Op::IsZero(s) => {
                let zero = self.is_zero(s)?;
                return Ok(Event::Completed(Completion {
                    result: Some(zero as Word),
                    output: vec![],
                }));
            }
        }?;

        Ok(Event::Completed(Completion::default()))
    }

    fn set(&mut self, d: RegisterIndex, k: Immediate) -> EngineResult<()> {
        let d = self.register_base(d)?;
        let needed = {
            let mut rest = k;
            let mut words = 0;
            while rest != 0 {
                rest /= BASE as Immediate;
                words += 1;
            }
            words
        };
        debug_assert!(needed <= IMMEDIATE_WORDS);
        if needed > self.word_width {
            return Err(EngineError::ImmediateOutOfRange {
                op: "set",
                immediate: k,
            });
        }

        let mut rest = k;
        for i in 0..self.word_width {
            self.store.write(d + i, (rest % BASE as Immediate) as Word)?;
            rest /= BASE as Immediate;
        }
        Ok(())
    }

    fn add_immediate(
        &mut self,
        d: RegisterIndex,
        s: RegisterIndex,
        k: Immediate,
    ) -> EngineResult<()> {
        let mut carry = Self::single_word_immediate("add_immediate", k)?;
        let in_place = d == s;
        let (d, s) = (self.register_base(d)?, self.register_base(s)?);

        for i in 0..self.word_width {
            if carry == 0 && in_place {
                break;
            }
            let mut sum = self.store.read(s + i)? + carry;
            carry = 0;
            if sum >= BASE {
                sum -= BASE;
                carry = 1;
            }
            self.store.write(d + i, sum)?;
        }
        Ok(())
    }

    fn add(
        &mut self,
        d: RegisterIndex,
        a: RegisterIndex,
        b: RegisterIndex,
    ) -> EngineResult<()> {
        let (d, a, b) = (
            self.register_base(d)?,
            self.register_base(a)?,
            self.register_base(b)?,
        );

        let mut carry = 0;
        for i in 0..self.word_width {
            let mut sum =
                self.store.read(a + i)? + self.store.read(b + i)? + carry;
            carry = 0;
            if sum >= BASE {
                sum -= BASE;
                carry = 1;
            }
            self.store.write(d + i, sum)?;
        }
        Ok(())
    }

    fn subtract_immediate(
        &mut self,
        d: RegisterIndex,
        s: RegisterIndex,
        k: Immediate,
    ) -> EngineResult<()> {
        let mut borrow = Self::single_word_immediate("subtract_immediate", k)?;
        let in_place = d == s;
        let (d, s) = (self.register_base(d)?, self.register_base(s)?);

        for i in 0..self.word_width {
            if borrow == 0 && in_place {
                break;
            }
            let (difference, next_borrow) =
                Self::subtract_word(self.store.read(s + i)?, borrow);
            borrow = next_borrow;
            self.store.write(d + i, difference)?;
        }
        Ok(())
    }

    fn subtract(
        &mut self,
        d: RegisterIndex,
        a: RegisterIndex,
        b: RegisterIndex,
    ) -> EngineResult<()> {
        let (d, a, b) = (
            self.register_base(d)?,
            self.register_base(a)?,
            self.register_base(b)?,
        );

        let mut borrow = 0;
        for i in 0..self.word_width {
            let subtrahend = self.store.read(b + i)? + borrow;
            let (difference, next_borrow) =
                Self::subtract_word(self.store.read(a + i)?, subtrahend);
            borrow = next_borrow;
            self.store.write(d + i, difference)?;
        }
        Ok(())
    }

    /// `minuend - subtrahend` for one word, where `subtrahend <= BASE`.
    /// Returns the difference and the borrow out.
    fn subtract_word(minuend: Word, subtrahend: Word) -> (Word, Word) {
        if minuend >= subtrahend {
            (minuend - subtrahend, 0)
        } else {
            (minuend + BASE - subtrahend, 1)
        }
    }

    fn multiply_immediate(
        &mut self,
        d: RegisterIndex,
        s: RegisterIndex,
        k: Immediate,
    ) -> EngineResult<()> {
        if k > MAX_MULTIPLY_IMMEDIATE {
            return Err(EngineError::ImmediateOutOfRange {
                op: "multiply_immediate",
                immediate: k,
            });
        }
        let (d, s) = (self.register_base(d)?, self.register_base(s)?);

        let mut carry: DoubleWord = 0;
        for i in 0..self.word_width {
            let product = self.store.read(s + i)? as DoubleWord * k + carry;
            self.store
                .write(d + i, (product % BASE as DoubleWord) as Word)?;
            carry = product / BASE as DoubleWord;
        }
        Ok(())
    }

    fn divide_immediate(
        &mut self,
        d: RegisterIndex,
        s: RegisterIndex,
        k: Immediate,
    ) -> EngineResult<()> {
        if k == 0 {
            return Err(EngineError::InvalidArgument("division by zero"));
        }
        if k > MAX_DIVIDE_IMMEDIATE {
            return Err(EngineError::ImmediateOutOfRange {
                op: "divide_immediate",
                immediate: k,
            });
        }
        let (d, s) = (self.register_base(d)?, self.register_base(s)?);

        let mut remainder: DoubleWord = 0;
        for i in (0..self.word_width).rev() {
            let dividend = remainder * BASE as DoubleWord
                + self.store.read(s + i)? as DoubleWord;
            self.store.write(d + i, (dividend / k) as Word)?;
            remainder = dividend % k;
        }
        Ok(())
    }

    fn copy(&mut self, d: RegisterIndex, s: RegisterIndex) -> EngineResult<()> {
        let (d, s) = (self.register_base(d)?, self.register_base(s)?);
        for i in 0..self.word_width {
            let word = self.store.read(s + i)?;
            self.store.write(d + i, word)?;
        }
        Ok(())
    }

    fn left_shift(
        &mut self,
        d: RegisterIndex,
        s: RegisterIndex,
        k: Immediate,
    ) -> EngineResult<()> {
        let shift = self.clamp_shift(k);
        let (d, s) = (self.register_base(d)?, self.register_base(s)?);

        // most significant first so an in-place shift reads before it writes
        for i in (0..self.word_width).rev() {
            let word = if i >= shift {
                self.store.read(s + i - shift)?
            } else {
                0
            };
            self.store.write(d + i, word)?;
        }
        Ok(())
    }

    fn right_shift(
        &mut self,
        d: RegisterIndex,
        s: RegisterIndex,
        k: Immediate,
    ) -> EngineResult<()> {
        let shift = self.clamp_shift(k);
        let (d, s) = (self.register_base(d)?, self.register_base(s)?);

        for i in 0..self.word_width {
            let word = if i + shift < self.word_width {
                self.store.read(s + i + shift)?
            } else {
                0
            };
            self.store.write(d + i, word)?;
        }
        Ok(())
    }

    fn is_zero(&self, s: RegisterIndex) -> EngineResult<bool> {
        let s = self.register_base(s)?;
        for i in 0..self.word_width {
            if self.store.read(s + i)? != 0 {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn begin_output(&mut self, s: RegisterIndex) -> EngineResult<Event> {
        let base = self.register_base(s)?;

        let mut top = 0;
        for i in (0..self.word_width).rev() {
            if self.store.read(base + i)? != 0 {
                top = i;
                break;
            }
        }

        self.stream(OutputCursor {
            base,
            next: Some(top),
        })
    }

    fn stream(&mut self, cursor: OutputCursor) -> EngineResult<Event> {
        match cursor.next {
            Some(i) => {
                let word = self.store.read(cursor.base + i)?;
                self.state = State::Streaming(OutputCursor {
                    base: cursor.base,
                    next: i.checked_sub(1),
                });
                Ok(Event::Output(word))
            }
            None => Ok(Event::Completed(Completion::default())),
        }
    }

    fn register_base(&self, r: RegisterIndex) -> EngineResult<Address> {
        let base = (r as usize).checked_mul(self.word_width).ok_or(
            EngineError::OutOfRange {
                address: Address::MAX,
                capacity: self.store.capacity(),
            },
        )?;
        self.store.check_span(base, self.word_width)?;
        Ok(base)
    }

    fn clamp_shift(&self, k: Immediate) -> usize {
        usize::try_from(k).map_or(self.word_width, |k| k.min(self.word_width))
    }

    fn single_word_immediate(
        op: &'static str,
        k: Immediate,
    ) -> EngineResult<Word> {
        if k < BASE as Immediate {
            Ok(k as Word)
        } else {
            Err(EngineError::ImmediateOutOfRange { op, immediate: k })
        }
    }
}
