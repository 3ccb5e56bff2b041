// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

use machin_engine::{
    arch::{Immediate, RegisterIndex, Word},
    Engine, Event, Op, VecStore, WordStore,
};
use tracing::{debug, info};

use crate::{
    config::{PiConfig, TRIM_DIGITS, TRIM_WORDS},
    error::PiResult,
};

/// Holds the scaled constant 1.
const ONE: RegisterIndex = 0;

/// Scratch registers for one arctangent: the current power `T`, the running
/// sum `Acc` and the current term `U`.
#[derive(Debug, Clone, Copy)]
struct Window {
    power: RegisterIndex,
    sum: RegisterIndex,
    term: RegisterIndex,
}

/// One arctangent of Machin's formula: `coefficient * arctan(1/argument)`.
#[derive(Debug, Clone, Copy)]
struct Arctangent {
    argument: Immediate,
    coefficient: Immediate,
    window: Window,
}

const ARCTANGENTS: [Arctangent; 2] = [
    Arctangent {
        argument: 5,
        coefficient: 16,
        window: Window {
            power: 1,
            sum: 2,
            term: 3,
        },
    },
    Arctangent {
        argument: 239,
        coefficient: 4,
        window: Window {
            power: 4,
            sum: 5,
            term: 6,
        },
    },
];

/// The combined result lands in the first arctangent's sum.
const RESULT: RegisterIndex = ARCTANGENTS[0].window.sum;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sign {
    Positive,
    Negative,
}

impl Sign {
    fn flip(self) -> Self {
        match self {
            Self::Positive => Self::Negative,
            Self::Negative => Self::Positive,
        }
    }
}

/// Progress through one arctangent's Gregory series.
#[derive(Debug, Clone, Copy)]
struct Series {
    index: usize,
    denominator: Immediate,
    sign: Sign,
    terms: u64,
}

impl Series {
    fn new(index: usize) -> Self {
        Self {
            index,
            denominator: 1,
            sign: Sign::Negative,
            terms: 1,
        }
    }

    fn arctangent(&self) -> Arctangent {
        ARCTANGENTS[self.index]
    }
}

enum Phase {
    Scale,
    Seed(Series),
    Term(Series),
    Combine,
    Stream,
    Done,
}

/// Counters for a computation, available once it has run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PiStats {
    /// Series terms summed for `arctan(1/5)` and `arctan(1/239)`.
    pub terms: [u64; 2],
    /// Engine requests issued.
    pub requests: u64,
    /// Digit groups emitted.
    pub groups: u64,
}

/// Lazily computes the digit groups of pi, most significant first.
///
/// The first group is the leading digits of pi (the integer part followed
/// by however many fractional digits do not fill a whole group); every later
/// group is nine fractional digits. All arithmetic runs on the first call to
/// [`Iterator::next`]. An engine failure is yielded once, after which the
/// iterator is exhausted.
pub struct PiDigits<S: WordStore = VecStore> {
    config: PiConfig,
    engine: Engine<S>,
    phase: Phase,
    stats: PiStats,
}

impl PiDigits<VecStore> {
    pub fn new(config: PiConfig) -> PiResult<Self> {
        Self::with_store(config, VecStore::with_capacity(config.capacity()))
    }
}

impl<S: WordStore> PiDigits<S> {
    /// Computes over a caller-supplied store, which must be zeroed and large
    /// enough for [`PiConfig::capacity`] words.
    pub fn with_store(config: PiConfig, store: S) -> PiResult<Self> {
        let mut engine = Engine::new(store);
        engine.configure(config.word_width())?;
        info!(
            digits = config.digits(),
            word_width = config.word_width(),
            "computing pi"
        );
        Ok(Self {
            config,
            engine,
            phase: Phase::Scale,
            stats: PiStats::default(),
        })
    }

    pub fn stats(&self) -> PiStats {
        PiStats {
            requests: self.engine.requests_issued(),
            ..self.stats
        }
    }

    /// Whether the final group has been emitted (or the computation failed).
    pub fn is_done(&self) -> bool {
        matches!(self.phase, Phase::Done)
    }

    /// Runs the current phase. Returns the next phase and, while streaming,
    /// the group just emitted.
    fn advance(&mut self) -> PiResult<(Phase, Option<Word>)> {
        match self.phase {
            Phase::Scale => self.scale().map(|phase| (phase, None)),
            Phase::Seed(series) => self.seed(series).map(|phase| (phase, None)),
            Phase::Term(series) => self.term(series).map(|phase| (phase, None)),
            Phase::Combine => self.combine().map(|phase| (phase, None)),
            Phase::Stream => self.stream(),
            Phase::Done => Ok((Phase::Done, None)),
        }
    }

    /// `R0 = 10^(digits + 21)`.
    fn scale(&mut self) -> PiResult<Phase> {
        let multiplier: Immediate =
            num_traits::pow(10, self.config.scale_exponent());
        self.engine.execute(Op::Set(ONE, 1))?;
        self.engine
            .execute(Op::LeftShift(ONE, ONE, self.config.scale_words()))?;
        self.engine
            .execute(Op::MultiplyImmediate(ONE, ONE, multiplier))?;
        Ok(Phase::Seed(Series::new(0)))
    }

    /// The first term `1/a` is both the power and the running sum.
    fn seed(&mut self, series: Series) -> PiResult<Phase> {
        let Arctangent {
            argument, window, ..
        } = series.arctangent();
        self.engine
            .execute(Op::DivideImmediate(window.power, ONE, argument))?;
        self.engine.execute(Op::Copy(window.sum, window.power))?;
        Ok(Phase::Term(series))
    }

    /// Adds one more term `±1 / ((2k + 1) * a^(2k + 1))`, or finishes the
    /// series once the term vanishes at this precision.
    fn term(&mut self, mut series: Series) -> PiResult<Phase> {
        let Arctangent {
            argument, window, ..
        } = series.arctangent();

        self.engine.execute(Op::DivideImmediate(
            window.power,
            window.power,
            argument * argument,
        ))?;
        series.denominator += 2;
        self.engine.execute(Op::DivideImmediate(
            window.term,
            window.power,
            series.denominator,
        ))?;

        let converged = self.engine.execute(Op::IsZero(window.term))?.result
            == Some(1);
        if converged {
            debug!(argument, terms = series.terms, "arctangent converged");
            self.stats.terms[series.index] = series.terms;
            return Ok(match series.index + 1 {
                next if next < ARCTANGENTS.len() => {
                    Phase::Seed(Series::new(next))
                }
                _ => Phase::Combine,
            });
        }

        let accumulate = match series.sign {
            Sign::Negative => Op::Subtract(window.sum, window.sum, window.term),
            Sign::Positive => Op::Add(window.sum, window.sum, window.term),
        };
        self.engine.execute(accumulate)?;
        series.sign = series.sign.flip();
        series.terms += 1;
        Ok(Phase::Term(series))
    }

    /// `16 * arctan(1/5) - 4 * arctan(1/239)`, with the guard digits
    /// trimmed, then starts streaming it.
    fn combine(&mut self) -> PiResult<Phase> {
        let [first, second] = ARCTANGENTS;
        for arctangent in ARCTANGENTS {
            let sum = arctangent.window.sum;
            self.engine.execute(Op::MultiplyImmediate(
                sum,
                sum,
                arctangent.coefficient,
            ))?;
        }
        self.engine.execute(Op::Subtract(
            RESULT,
            first.window.sum,
            second.window.sum,
        ))?;

        self.engine
            .execute(Op::RightShift(RESULT, RESULT, TRIM_WORDS))?;
        let divisor: Immediate = num_traits::pow(10, TRIM_DIGITS);
        self.engine
            .execute(Op::DivideImmediate(RESULT, RESULT, divisor))?;

        debug!("streaming digits");
        self.engine.submit(Op::Output(RESULT))?;
        Ok(Phase::Stream)
    }

    fn stream(&mut self) -> PiResult<(Phase, Option<Word>)> {
        match self.engine.step()? {
            Event::Output(group) => {
                self.stats.groups += 1;
                Ok((Phase::Stream, Some(group)))
            }
            Event::Completed(_) => {
                let stats = self.stats();
                info!(
                    groups = stats.groups,
                    requests = stats.requests,
                    "pi complete"
                );
                Ok((Phase::Done, None))
            }
        }
    }
}

impl<S: WordStore> Iterator for PiDigits<S> {
    type Item = PiResult<Word>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.is_done() {
            match self.advance() {
                Ok((phase, group)) => {
                    self.phase = phase;
                    if let Some(group) = group {
                        return Some(Ok(group));
                    }
                }
                Err(error) => {
                    self.phase = Phase::Done;
                    return Some(Err(error));
                }
            }
        }
        None
    }
}

impl<S: WordStore> std::iter::FusedIterator for PiDigits<S> {}

#[cfg(test)]
mod tests {
    use machin_engine::{EngineError, VecStore};

    use super::PiDigits;
    use crate::{config::PiConfig, error::PiError};

    fn digits(count: u64) -> PiDigits {
        PiDigits::new(PiConfig::new(count).unwrap()).unwrap()
    }

    #[test]
    fn single_digit() {
        let groups: Vec<_> = digits(1).map(Result::unwrap).collect();
        assert_eq!(vec![3], groups);
    }

    #[test]
    fn groups_split_after_leading_digits() {
        let groups: Vec<_> = digits(10).map(Result::unwrap).collect();
        assert_eq!(vec![3, 141_592_653], groups);

        let groups: Vec<_> = digits(9).map(Result::unwrap).collect();
        assert_eq!(vec![314_159_265], groups);
    }

    #[test]
    fn counts_series_terms() {
        let mut pi = digits(50);
        assert!(pi.by_ref().all(|group| group.is_ok()));
        assert!(pi.is_done());

        let stats = pi.stats();
        assert_eq!([49, 15], stats.terms);
        assert_eq!(6, stats.groups);
        assert!(stats.requests > 0);
    }

    #[test]
    fn reports_store_failures_once() {
        let config = PiConfig::new(50).unwrap();
        let mut pi =
            PiDigits::with_store(config, VecStore::with_capacity(20)).unwrap();
        assert!(matches!(
            pi.next(),
            Some(Err(PiError::Engine(EngineError::OutOfRange { .. })))
        ));
        assert!(pi.next().is_none());
        assert!(pi.is_done());
    }
}
