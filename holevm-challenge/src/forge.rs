//! # Test-Vector Forger
//!
//! Picks a hidden assignment and runs the program under it to produce
//! `(input, expected output)` pairs.
//!
//! A failed run or an empty output discards the whole batch and restarts
//! from a fresh assignment, so every case in a challenge agrees with one
//! assignment. The restart loop is bounded by `max_forge_attempts`.

use crate::config::ChallengeConfig;
use crate::synth::COUNTER_SLOT;
use holevm_vm::{self as vm, Assignment, Error, ErrorKind, Program, Result, Int};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// One forged input vector and the output it must produce
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub input: Vec<Int>,
    pub expected: String,
}

/// Result of forging: the hidden assignment and its cases
#[derive(Debug, Clone)]
pub struct Forged {
    pub hidden: Assignment,
    pub cases: Vec<TestCase>,
    /// Batches discarded before this one was accepted
    pub rejected: usize,
}

/// Draws assignments and inputs from `rng`
pub struct Forger<'a, R: Rng> {
    config: &'a ChallengeConfig,
    rng: &'a mut R,
}

impl<'a, R: Rng> Forger<'a, R> {
    pub fn new(config: &'a ChallengeConfig, rng: &'a mut R) -> Self {
        Self { config, rng }
    }

    /// Forge `config.cases` cases consistent with one hidden assignment
    pub fn forge(&mut self, program: &Program) -> Result<Forged> {
        let with_counter = program.loads_slot(COUNTER_SLOT);

        'attempt: for attempt in 0..self.config.max_forge_attempts {
            let hidden = self.sample_assignment(program)?;
            let mut cases = Vec::with_capacity(self.config.cases);

            while cases.len() < self.config.cases {
                let input = self.sample_input(with_counter);
                match vm::run(program, &hidden, &input) {
                    Ok(out) if !out.is_empty() => cases.push(TestCase { input, expected: out }),
                    Ok(_) => {
                        tracing::debug!(attempt, ?input, "empty output, restarting batch");
                        continue 'attempt;
                    }
                    Err(e) => {
                        tracing::debug!(
                            attempt,
                            ?input,
                            kind = %e.kind(),
                            "run failed, restarting batch"
                        );
                        continue 'attempt;
                    }
                }
            }

            return Ok(Forged { hidden, cases, rejected: attempt });
        }

        Err(Error::new(
            ErrorKind::ForgeExhausted,
            "no assignment produced a consistent batch of cases",
        )
        .with_operation("forger::forge")
        .with_context("attempts", self.config.max_forge_attempts.to_string())
        .persist())
    }

    /// Independent uniform draw per hole from its domain
    pub fn sample_assignment(&mut self, program: &Program) -> Result<Assignment> {
        let mut assignment = Assignment::new();
        for hole in &program.holes {
            let index = self.rng.gen_range(0..hole.domain.len());
            let value = hole.domain.nth(index).ok_or_else(|| {
                Error::invalid_domain(format!("cannot sample from domain {}", hole.domain))
                    .with_context("hole", hole.name.as_str())
            })?;
            assignment.insert(hole.name.clone(), value);
        }
        Ok(assignment)
    }

    fn sample_input(&mut self, with_counter: bool) -> Vec<Int> {
        let a = self.config.input_range.sample(&mut *self.rng);
        let b = self.config.input_range.sample(&mut *self.rng);
        if with_counter {
            vec![a, b, self.config.counter_range.sample(&mut *self.rng)]
        } else {
            vec![a, b]
        }
    }
}
