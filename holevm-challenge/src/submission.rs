//! # Submission Parsing
//!
//! Extracts the agent's hole assignment from free-form reply text:
//!
//! 1. drop `<think>…</think>` and `<thinking>…</thinking>` blocks
//! 2. take the last `<HOLES>…</HOLES>` block (case-insensitive, multi-line)
//! 3. parse one `?name=value` per line; blank lines and `#` comments skipped

use holevm_vm::{Assignment, Domain, HoleName, Int};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Why a submission was rejected before any test case ran
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum Rejection {
    /// No `<HOLES>` block in the reply
    MissingBlock,
    /// A line in the block is not `?name=value`
    InvalidFormat { line: String },
    /// Submitted names differ from the declared holes
    IncompleteHoles { missing: Vec<HoleName>, extra: Vec<HoleName> },
    /// Values outside their hole's domain
    OutOfDomain { violations: Vec<DomainViolation> },
}

/// A submitted value its hole's domain does not contain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainViolation {
    pub hole: HoleName,
    pub value: Int,
    pub domain: Domain,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::MissingBlock => write!(f, "missing <HOLES> block"),
            Rejection::InvalidFormat { line } => {
                write!(f, "invalid format in <HOLES> block: '{}'", line)
            }
            Rejection::IncompleteHoles { missing, extra } => {
                let names = |v: &[HoleName]| {
                    v.iter().map(|h| h.as_str()).collect::<Vec<_>>().join(", ")
                };
                write!(f, "not all holes provided")?;
                if !missing.is_empty() {
                    write!(f, "; missing: {}", names(missing))?;
                }
                if !extra.is_empty() {
                    write!(f, "; unknown: {}", names(extra))?;
                }
                Ok(())
            }
            Rejection::OutOfDomain { violations } => {
                for (i, v) in violations.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "value {} for {} outside domain {}", v.value, v.hole, v.domain)?;
                }
                Ok(())
            }
        }
    }
}

fn reasoning_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)<think>.*?</think>|<thinking>.*?</thinking>")
            .expect("valid reasoning pattern")
    })
}

fn block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<HOLES>\s*(.*?)\s*</HOLES>").expect("valid block pattern"))
}

fn line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // ASCII classes: `\d` and `\w` would admit Unicode digits and letters
    RE.get_or_init(|| {
        Regex::new(r"^(\?[A-Za-z][A-Za-z0-9_]*)\s*=\s*(-?[0-9]+)$").expect("valid line pattern")
    })
}

/// Remove reasoning blocks from the reply
pub fn strip_reasoning(text: &str) -> String {
    reasoning_re().replace_all(text, "").into_owned()
}

/// Body of the last `<HOLES>` block, trimmed
pub fn extract_block(text: &str) -> Option<&str> {
    block_re()
        .captures_iter(text)
        .last()
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Parse the lines of a block. A repeated name keeps its last value.
pub fn parse_block(block: &str) -> Result<Assignment, Rejection> {
    let mut assignment = Assignment::new();
    for raw in block.trim().lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let invalid = || Rejection::InvalidFormat { line: line.to_string() };
        let caps = line_re().captures(line).ok_or_else(invalid)?;
        let value: Int = caps[2].parse().map_err(|_| invalid())?;
        assignment.insert(HoleName::new(&caps[1]), value);
    }
    Ok(assignment)
}

/// Extract and parse the assignment from a full reply
pub fn parse_submission(text: &str) -> Result<Assignment, Rejection> {
    let stripped = strip_reasoning(text);
    let block = extract_block(&stripped).ok_or(Rejection::MissingBlock)?;
    parse_block(block)
}
