//! # holevm Challenge
//!
//! Turns the hole-parameterized VM into a hole-inference task:
//! 1. The synthesizer lays out a program whose constants are holes
//! 2. The forger picks a hidden assignment and records test vectors
//! 3. The prompt shows the program, the domains and the vectors
//! 4. The agent answers with a `<HOLES>` block
//! 5. Scoring replays every vector under the submitted assignment
//!
//! Any assignment that reproduces every vector scores 1.0, whether or not it
//! equals the hidden one.

pub mod canon;
pub mod challenge;
pub mod config;
pub mod env;
pub mod forge;
pub mod prompt;
pub mod score;
pub mod submission;
pub mod synth;

pub use canon::canonicalize;
pub use challenge::{generate_challenge, Challenge};
pub use config::{ChallengeConfig, IntRange};
pub use env::{Episode, HvmEnv, StepOutcome};
pub use forge::{Forged, Forger, TestCase};
pub use prompt::render_prompt;
pub use score::{evaluate, CaseReport, Evaluation};
pub use submission::{parse_submission, DomainViolation, Rejection};
pub use synth::{Synthesizer, COUNTER_SLOT};
