//! Output canonicalization for comparison.
//!
//! Ignores line-ending style, trailing whitespace on each line and trailing
//! blank lines. Keeps internal blank lines, line order and the exact digits.

/// Canonical form of program output. Idempotent.
pub fn canonicalize(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    let lines: Vec<&str> = unified.split('\n').map(str::trim_end).collect();
    lines.join("\n").trim_end_matches('\n').to_string()
}
