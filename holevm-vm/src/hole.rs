//! # Holes
//!
//! Named unknown constants, their finite integer domains, and assignments
//! from hole names to values.

use crate::error::{self, Result};
use crate::opcode::Int;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Name of a hole, e.g. `?a`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HoleName(String);

impl HoleName {
    pub fn new(name: impl Into<String>) -> Self {
        HoleName(name.into())
    }

    /// Label for the `index`-th hole created in a program.
    ///
    /// `?a` .. `?z`, then `?a1` .. `?z1`, `?a2`, ...
    pub fn from_index(index: usize) -> Self {
        let letter = (b'a' + (index % 26) as u8) as char;
        match index / 26 {
            0 => HoleName(format!("?{}", letter)),
            round => HoleName(format!("?{}{}", letter, round)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HoleName {
    fn from(s: &str) -> Self {
        HoleName::new(s)
    }
}

/// Finite, non-empty set of values a hole may take.
///
/// Deserialization goes through [`Domain::range`] and [`Domain::set`], so a
/// loaded domain is never inverted and a loaded set is always sorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", try_from = "RawDomain")]
pub enum Domain {
    /// Every integer in `lo..=hi`
    Range { lo: Int, hi: Int },
    /// Explicit values, sorted and deduplicated
    Set { values: Vec<Int> },
}

#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum RawDomain {
    Range { lo: Int, hi: Int },
    Set { values: Vec<Int> },
}

impl TryFrom<RawDomain> for Domain {
    type Error = error::Error;

    fn try_from(raw: RawDomain) -> Result<Self> {
        match raw {
            RawDomain::Range { lo, hi } => Domain::range(lo, hi),
            RawDomain::Set { values } => Domain::set(values),
        }
    }
}

impl Domain {
    /// Inclusive range domain; fails if `lo > hi`
    pub fn range(lo: Int, hi: Int) -> Result<Self> {
        if lo > hi {
            return Err(error::invalid_domain(format!("empty range [{}, {}]", lo, hi)));
        }
        Ok(Domain::Range { lo, hi })
    }

    /// Explicit domain; fails if `values` is empty
    pub fn set(values: impl IntoIterator<Item = Int>) -> Result<Self> {
        let mut values: Vec<Int> = values.into_iter().collect();
        if values.is_empty() {
            return Err(error::invalid_domain("empty value set"));
        }
        values.sort_unstable();
        values.dedup();
        Ok(Domain::Set { values })
    }

    /// Domain with exactly one legal value
    pub fn singleton(value: Int) -> Self {
        Domain::Set { values: vec![value] }
    }

    /// Check a domain assembled from its variants directly
    pub fn check(&self) -> Result<()> {
        match self {
            Domain::Range { lo, hi } if lo > hi => {
                Err(error::invalid_domain(format!("empty range [{}, {}]", lo, hi)))
            }
            Domain::Set { values } if values.is_empty() => {
                Err(error::invalid_domain("empty value set"))
            }
            Domain::Set { values } if values.windows(2).any(|w| w[0] >= w[1]) => {
                Err(error::invalid_domain("set values must be strictly ascending"))
            }
            _ => Ok(()),
        }
    }

    pub fn contains(&self, value: Int) -> bool {
        match self {
            Domain::Range { lo, hi } => (*lo..=*hi).contains(&value),
            Domain::Set { values } => values.binary_search(&value).is_ok(),
        }
    }

    /// Number of members
    pub fn len(&self) -> u64 {
        match self {
            Domain::Range { lo, hi } => hi.abs_diff(*lo).saturating_add(1),
            Domain::Set { values } => values.len() as u64,
        }
    }

    /// Domains are never empty once constructed
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_singleton(&self) -> bool {
        self.len() == 1
    }

    pub fn min(&self) -> Int {
        match self {
            Domain::Range { lo, .. } => *lo,
            Domain::Set { values } => values[0],
        }
    }

    pub fn max(&self) -> Int {
        match self {
            Domain::Range { hi, .. } => *hi,
            Domain::Set { values } => values[values.len() - 1],
        }
    }

    /// The `index`-th member in ascending order, if any
    pub fn nth(&self, index: u64) -> Option<Int> {
        if index >= self.len() {
            return None;
        }
        match self {
            Domain::Range { lo, .. } => lo.checked_add_unsigned(index),
            Domain::Set { values } => values.get(index as usize).copied(),
        }
    }

    /// Human-readable form: enumerated when it has at most `enumerate_limit`
    /// members, range form otherwise
    pub fn describe(&self, enumerate_limit: u64) -> String {
        if self.len() > enumerate_limit {
            return format!("[{}, {}] (integers)", self.min(), self.max());
        }
        let members: Vec<String> = (0..self.len())
            .filter_map(|i| self.nth(i))
            .map(|v| v.to_string())
            .collect();
        format!("{{{}}}", members.join(", "))
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::Range { lo, hi } => write!(f, "[{}, {}]", lo, hi),
            Domain::Set { .. } => f.write_str(&self.describe(u64::MAX)),
        }
    }
}

/// What a hole stands for in the program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoleKind {
    /// A data constant pushed onto the stack
    Data,
    /// A code address used by a jump
    JumpTarget,
}

/// A declared hole
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hole {
    pub name: HoleName,
    pub domain: Domain,
    pub kind: HoleKind,
}

/// Mapping from hole name to value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Assignment(BTreeMap<HoleName, Int>);

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a hole's value, returning the previous one
    pub fn insert(&mut self, hole: HoleName, value: Int) -> Option<Int> {
        self.0.insert(hole, value)
    }

    pub fn get(&self, hole: &HoleName) -> Option<Int> {
        self.0.get(hole).copied()
    }

    /// Value of `hole`, or an UnassignedHole error
    pub fn resolve(&self, hole: &HoleName) -> Result<Int> {
        self.get(hole).ok_or_else(|| error::unassigned_hole(hole.as_str()))
    }

    pub fn contains(&self, hole: &HoleName) -> bool {
        self.0.contains_key(hole)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Hole names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &HoleName> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HoleName, Int)> {
        self.0.iter().map(|(k, v)| (k, *v))
    }
}

impl FromIterator<(HoleName, Int)> for Assignment {
    fn from_iter<T: IntoIterator<Item = (HoleName, Int)>>(iter: T) -> Self {
        Assignment(iter.into_iter().collect())
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        Ok(())
    }
}
