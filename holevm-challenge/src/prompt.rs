//! Challenge prompt rendering

use crate::forge::TestCase;
use holevm_vm::{InstructionSchema, Program, Int};

const INTRO: &str = "You are given a small stack-based Virtual Machine program with UNKNOWN constants (holes).\n";

const ANSWER_FORMAT: &str =
    "Return ONLY the hole mapping in this exact format:\n\n<HOLES>\n?a=3\n?b=-1\n?c=42\n</HOLES>\n";

fn format_input(input: &[Int]) -> String {
    let items: Vec<String> = input.iter().map(|v| v.to_string()).collect();
    format!("[{}]", items.join(", "))
}

/// Render the full task text: instruction set, listing, hole domains,
/// forged cases and the answer format.
///
/// Domains with more than `enumerate_limit` members are shown as a range.
pub fn render_prompt(program: &Program, cases: &[TestCase], enumerate_limit: u64) -> String {
    let holes: Vec<String> = program
        .holes
        .iter()
        .map(|h| format!("{} ∈ {}", h.name, h.domain.describe(enumerate_limit)))
        .collect();
    let cases: Vec<String> = cases
        .iter()
        .enumerate()
        .map(|(i, c)| {
            format!(
                "Case #{}: input={}  expected stdout=\n---\n{}\n---",
                i,
                format_input(&c.input),
                c.expected
            )
        })
        .collect();

    let mut out = String::from(INTRO);
    out.push_str(&InstructionSchema::new().to_prompt());
    out.push('\n');
    out.push_str(&format!("Program:\n{}\n\n", program.listing()));
    out.push_str(&format!("Holes and domains:\n- {}\n\n", holes.join("\n- ")));
    out.push_str(&format!("Test cases:\n{}\n\n", cases.join("\n")));
    out.push_str(ANSWER_FORMAT);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChallengeConfig;
    use crate::synth::Synthesizer;

    #[test]
    fn test_easy_prompt_exact() {
        let config = ChallengeConfig { hard: false, ..ChallengeConfig::default() };
        let program = Synthesizer::new(&config).synthesize().unwrap();
        let cases = vec![
            TestCase { input: vec![3, 4], expected: "6".into() },
            TestCase { input: vec![-1, 0], expected: "2".into() },
        ];

        let prompt = render_prompt(&program, &cases, 15);

        let expected = "\
You are given a small stack-based Virtual Machine program with UNKNOWN constants (holes).
Instruction set:
  PUSH n       ; push integer n (n can also be a hole like ?a)
  LOAD i       ; push i-th input integer (0-based)
  ADD SUB MUL DIV MOD
  DUP SWAP POP
  JMP k        ; absolute jump
  JMPZ k       ; jump if top==0
  JMPNZ k      ; jump if top!=0
  PRINT
  HALT

Program:
000: LOAD 0
001: LOAD 1
002: PUSH ?a
003: MUL
004: PUSH ?b
005: MUL
006: ADD
007: DUP
008: PUSH ?c
009: MOD
010: PRINT
011: HALT

Holes and domains:
- ?a ∈ [-9, 9] (integers)
- ?b ∈ [-9, 9] (integers)
- ?c ∈ [3, 30] (integers)

Test cases:
Case #0: input=[3, 4]  expected stdout=
---
6
---
Case #1: input=[-1, 0]  expected stdout=
---
2
---

Return ONLY the hole mapping in this exact format:

<HOLES>
?a=3
?b=-1
?c=42
</HOLES>
";
        assert_eq!(prompt, expected);
    }

    #[test]
    fn test_small_domains_enumerated() {
        let program = Synthesizer::new(&ChallengeConfig::default()).synthesize().unwrap();
        let prompt = render_prompt(&program, &[], 15);

        assert!(prompt.contains("- ?d ∈ {0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12}\n"));
        assert!(prompt.contains("- ?g ∈ {25}\n"));
        assert!(prompt.contains("- ?h ∈ {12}\n\n"));
        assert!(prompt.contains("024: JMP ?h\n"));
    }
}
