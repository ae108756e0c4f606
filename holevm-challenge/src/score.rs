//! # Scoring
//!
//! A submission scores 1.0 only when it passes every gate and every forged
//! case; anything else scores 0.0. Gates run in order:
//!
//! 1. block extraction and line format
//! 2. completeness: exactly the declared hole names
//! 3. domains: every value inside its hole's domain
//! 4. replay: each case run under the submission, compared canonically

use crate::canon::canonicalize;
use crate::forge::TestCase;
use crate::submission::{parse_submission, DomainViolation, Rejection};
use holevm_vm::{self as vm, Assignment, HoleName, Program, Int};
use serde::Serialize;
use std::collections::BTreeSet;

/// Outcome of one forged case under the submitted assignment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseReport {
    pub input: Vec<Int>,
    pub expected: String,
    pub expected_canon: String,
    /// Raw output; `None` when the case did not run or failed
    pub got: Option<String>,
    pub got_canon: Option<String>,
    /// Execution failure, if the run aborted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
    pub passed: bool,
}

impl CaseReport {
    fn not_run(case: &TestCase) -> Self {
        CaseReport {
            input: case.input.clone(),
            expected: case.expected.clone(),
            expected_canon: canonicalize(&case.expected),
            got: None,
            got_canon: None,
            failure: None,
            passed: false,
        }
    }
}

/// Score plus the details record handed back to the agent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<Rejection>,
    pub passed: usize,
    pub total: usize,
    pub cases: Vec<CaseReport>,
}

impl Evaluation {
    pub fn is_solved(&self) -> bool {
        self.score >= 1.0
    }

    /// Details as JSON, for observations and the CLI
    pub fn details_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    fn rejected(rejection: Rejection, cases: &[TestCase]) -> Self {
        tracing::debug!(%rejection, "submission rejected");
        Evaluation {
            score: 0.0,
            rejection: Some(rejection),
            passed: 0,
            total: cases.len(),
            cases: cases.iter().map(CaseReport::not_run).collect(),
        }
    }
}

/// Names the program declares but the submission lacks (declaration order),
/// and names the submission has but the program does not (sorted)
fn completeness(program: &Program, assignment: &Assignment) -> Option<Rejection> {
    let missing: Vec<HoleName> = program
        .hole_names()
        .filter(|name| !assignment.contains(name))
        .cloned()
        .collect();
    let declared: BTreeSet<&HoleName> = program.hole_names().collect();
    let extra: Vec<HoleName> = assignment
        .names()
        .filter(|name| !declared.contains(name))
        .cloned()
        .collect();

    if missing.is_empty() && extra.is_empty() {
        None
    } else {
        Some(Rejection::IncompleteHoles { missing, extra })
    }
}

fn domain_violations(program: &Program, assignment: &Assignment) -> Option<Rejection> {
    let violations: Vec<DomainViolation> = program
        .holes
        .iter()
        .filter_map(|hole| {
            let value = assignment.get(&hole.name)?;
            (!hole.domain.contains(value)).then(|| DomainViolation {
                hole: hole.name.clone(),
                value,
                domain: hole.domain.clone(),
            })
        })
        .collect();

    if violations.is_empty() {
        None
    } else {
        Some(Rejection::OutOfDomain { violations })
    }
}

/// Run one case. Execution failures count as a mismatch.
fn replay(program: &Program, assignment: &Assignment, case: &TestCase) -> CaseReport {
    let expected_canon = canonicalize(&case.expected);
    match vm::run(program, assignment, &case.input) {
        Ok(got) => {
            let got_canon = canonicalize(&got);
            let passed = got_canon == expected_canon;
            CaseReport {
                input: case.input.clone(),
                expected: case.expected.clone(),
                expected_canon,
                got: Some(got),
                got_canon: Some(got_canon),
                failure: None,
                passed,
            }
        }
        Err(e) => {
            if e.is_execution_failure() {
                tracing::debug!(input = ?case.input, kind = %e.kind(), "case aborted");
            } else {
                tracing::warn!(input = ?case.input, error = %e, "case could not run");
            }
            CaseReport {
                failure: Some(e.to_string()),
                ..CaseReport::not_run(case)
            }
        }
    }
}

/// Score a reply against a program and its forged cases
pub fn evaluate(program: &Program, cases: &[TestCase], text: &str) -> Evaluation {
    let assignment = match parse_submission(text) {
        Ok(a) => a,
        Err(rejection) => return Evaluation::rejected(rejection, cases),
    };
    if let Some(rejection) = completeness(program, &assignment) {
        return Evaluation::rejected(rejection, cases);
    }
    if let Some(rejection) = domain_violations(program, &assignment) {
        return Evaluation::rejected(rejection, cases);
    }

    let reports: Vec<CaseReport> = cases
        .iter()
        .map(|case| replay(program, &assignment, case))
        .collect();
    let passed = reports.iter().filter(|r| r.passed).count();
    let score = if passed == cases.len() { 1.0 } else { 0.0 };

    tracing::info!(score, passed, total = cases.len(), "submission scored");
    Evaluation { score, rejection: None, passed, total: cases.len(), cases: reports }
}
