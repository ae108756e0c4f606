//! # Environment
//!
//! Async front for hosting challenges in an evaluation loop. Generation is
//! CPU-bound and runs on the blocking pool; each call draws a child seed
//! from the environment's RNG so a seeded environment yields a fixed
//! sequence of challenges.
//!
//! [`Episode`] wraps one environment in a reset/step session.

use crate::challenge::{generate_challenge, Challenge};
use crate::config::ChallengeConfig;
use crate::score::Evaluation;
use holevm_vm::{Error, ErrorKind, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

pub struct HvmEnv {
    config: ChallengeConfig,
    rng: StdRng,
}

impl HvmEnv {
    pub fn new(config: ChallengeConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self { config, rng })
    }

    pub fn config(&self) -> &ChallengeConfig {
        &self.config
    }

    /// Produce the next challenge
    pub async fn generate(&mut self) -> Result<Challenge> {
        let child_seed: u64 = self.rng.gen();
        let config = self.config.clone();

        tokio::task::spawn_blocking(move || {
            let mut rng = StdRng::seed_from_u64(child_seed);
            generate_challenge(&config, &mut rng)
        })
        .await
        .map_err(|e| {
            Error::new(ErrorKind::Unexpected, "challenge generation task failed")
                .with_operation("env::generate")
                .set_source(e)
        })?
    }

    /// Score a reply. Consumes the challenge; each one is evaluated once.
    pub async fn evaluate(&self, challenge: Challenge, text: &str) -> (f64, Evaluation) {
        let evaluation = challenge.evaluate(text);
        (evaluation.score, evaluation)
    }
}

/// Result of submitting a reply in an episode
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub observation: String,
    pub reward: f64,
    /// Always true: an episode is a single turn
    pub done: bool,
    pub details: Evaluation,
}

/// Single-turn session: `reset` poses a challenge, `step` scores the reply
pub struct Episode {
    env: HvmEnv,
    current: Option<Challenge>,
}

impl Episode {
    pub fn new(env: HvmEnv) -> Self {
        Self { env, current: None }
    }

    /// Generate a fresh challenge and return its prompt
    pub async fn reset(&mut self) -> Result<String> {
        let challenge = self.env.generate().await?;
        let prompt = challenge.prompt.clone();
        self.current = Some(challenge);
        Ok(prompt)
    }

    /// Prompt of the active challenge; generates one when none is active
    pub async fn observation(&mut self) -> Result<String> {
        match &self.current {
            Some(challenge) => Ok(challenge.prompt.clone()),
            None => self.reset().await,
        }
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// Score `text` against the active challenge and end the episode
    pub async fn step(&mut self, text: &str) -> Result<StepOutcome> {
        let challenge = self.current.take().ok_or_else(|| {
            Error::no_active_challenge().with_operation("episode::step")
        })?;
        let (reward, details) = self.env.evaluate(challenge, text).await;
        Ok(StepOutcome {
            observation: format!("Score: {:.1}. Details: {}", reward, details.details_json()),
            reward,
            done: true,
            details,
        })
    }
}
