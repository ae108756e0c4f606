//! Challenge generation settings

use holevm_vm::{Domain, Error, ErrorKind, Result, Int, DEFAULT_STACK_CAP};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Inclusive integer interval `lo..=hi`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntRange {
    pub lo: Int,
    pub hi: Int,
}

impl IntRange {
    pub const fn new(lo: Int, hi: Int) -> Self {
        IntRange { lo, hi }
    }

    /// The range as a hole domain
    pub fn domain(&self) -> Result<Domain> {
        Domain::range(self.lo, self.hi)
    }

    /// Uniform draw from the range
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Int {
        rng.gen_range(self.lo..=self.hi)
    }

    fn check(&self, name: &str) -> Result<()> {
        if self.lo > self.hi {
            let message = format!("{} is empty: [{}, {}]", name, self.lo, self.hi);
            return Err(Error::config_invalid(message).with_context("field", name.to_string()));
        }
        Ok(())
    }
}

/// Settings for synthesizing and forging challenges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChallengeConfig {
    /// Fixed RNG seed; entropy when absent
    pub seed: Option<u64>,
    /// Append the counted loop to the base computation
    pub hard: bool,
    /// Number of forged test cases
    pub cases: usize,
    /// Bound on the forging rejection loop
    pub max_forge_attempts: usize,
    /// Domain of the base scaling holes and the loop addend
    pub scale_domain: IntRange,
    /// Domain of the loop multiplier
    pub loop_scale_domain: IntRange,
    /// Domain of modulus holes; must start at 3 or above
    pub modulus_domain: IntRange,
    /// Range of the two data inputs
    pub input_range: IntRange,
    /// Range of the loop counter input
    pub counter_range: IntRange,
    pub max_steps_easy: usize,
    pub max_steps_hard: usize,
    pub stack_cap: usize,
    /// Largest domain rendered by enumeration in prompts
    pub enumerate_limit: u64,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            seed: None,
            hard: true,
            cases: 3,
            max_forge_attempts: 1000,
            scale_domain: IntRange::new(-9, 9),
            loop_scale_domain: IntRange::new(0, 12),
            modulus_domain: IntRange::new(3, 30),
            input_range: IntRange::new(-8, 8),
            counter_range: IntRange::new(1, 8),
            max_steps_easy: 4000,
            max_steps_hard: 8000,
            stack_cap: DEFAULT_STACK_CAP,
            enumerate_limit: 15,
        }
    }
}

impl ChallengeConfig {
    /// Load settings from a JSON file; missing fields take their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::from(e).with_operation("config::from_file"))?;
        let config: ChallengeConfig = serde_json::from_str(&text).map_err(|e| {
            Error::new(ErrorKind::ConfigInvalid, format!("malformed config: {}", e))
                .with_operation("config::from_file")
                .with_context("path", path.display().to_string())
                .set_source(e)
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Step budget for the selected variant
    pub fn max_steps(&self) -> usize {
        if self.hard {
            self.max_steps_hard
        } else {
            self.max_steps_easy
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.cases == 0 {
            return Err(Error::config_invalid("cases must be at least 1"));
        }
        if self.max_forge_attempts == 0 {
            return Err(Error::config_invalid("max_forge_attempts must be at least 1"));
        }
        if self.stack_cap < 4 {
            return Err(Error::config_invalid("stack_cap must be at least 4"));
        }
        self.scale_domain.check("scale_domain")?;
        self.loop_scale_domain.check("loop_scale_domain")?;
        self.modulus_domain.check("modulus_domain")?;
        self.input_range.check("input_range")?;
        self.counter_range.check("counter_range")?;
        if self.modulus_domain.lo < 3 {
            return Err(Error::config_invalid(format!(
                "modulus_domain must start at 3 or above, got {}",
                self.modulus_domain.lo
            )));
        }
        if self.counter_range.lo < 1 {
            return Err(Error::config_invalid("counter_range must be positive"));
        }
        Ok(())
    }
}
