//! # Challenge
//!
//! One generated task: the program, the hidden assignment it was forged
//! under, the forged cases and the rendered prompt.

use crate::config::ChallengeConfig;
use crate::forge::{Forger, TestCase};
use crate::prompt::render_prompt;
use crate::score::{self, Evaluation};
use crate::synth::Synthesizer;
use holevm_vm::{Assignment, Error, Program, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    pub program: Program,
    hidden: Assignment,
    pub cases: Vec<TestCase>,
    pub prompt: String,
}

/// Synthesize a program, forge its cases and render the prompt
pub fn generate_challenge<R: Rng>(config: &ChallengeConfig, rng: &mut R) -> Result<Challenge> {
    config.validate()?;
    let program = Synthesizer::new(config).synthesize()?;
    let forged = Forger::new(config, rng).forge(&program)?;
    let prompt = render_prompt(&program, &forged.cases, config.enumerate_limit);

    tracing::info!(
        hard = config.hard,
        instructions = program.len(),
        holes = program.holes.len(),
        cases = forged.cases.len(),
        rejected_batches = forged.rejected,
        "generated challenge"
    );
    Ok(Challenge { program, hidden: forged.hidden, cases: forged.cases, prompt })
}

impl Challenge {
    /// The assignment the cases were forged under. One witness among
    /// possibly many; submissions are never compared against it.
    pub fn hidden(&self) -> &Assignment {
        &self.hidden
    }

    /// Score a reply against this challenge
    pub fn evaluate(&self, text: &str) -> Evaluation {
        score::evaluate(&self.program, &self.cases, text)
    }

    /// Reply text that submits the hidden assignment
    pub fn reference_answer(&self) -> String {
        let lines: Vec<String> = self.hidden.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        format!("<HOLES>\n{}\n</HOLES>", lines.join("\n"))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            Error::new(holevm_vm::ErrorKind::SerializationFailed, "cannot serialize challenge")
                .with_operation("challenge::to_json")
                .set_source(e)
        })
    }

    /// Write the challenge, hidden assignment included, as JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = self.to_json()?;
        std::fs::write(path.as_ref(), json).map_err(|e| {
            Error::from(e)
                .with_operation("challenge::save")
                .with_context("path", path.as_ref().display().to_string())
        })
    }

    /// Read a saved challenge and check its program is well formed
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::from(e)
                .with_operation("challenge::load")
                .with_context("path", path.display().to_string())
        })?;
        let challenge: Challenge = serde_json::from_str(&text).map_err(|e| {
            Error::parse_failed(format!("malformed challenge file: {}", e))
                .with_operation("challenge::load")
                .with_context("path", path.display().to_string())
                .set_source(e)
        })?;
        challenge.program.validate()?;
        Ok(challenge)
    }
}
