//! # Program Synthesizer
//!
//! Builds the challenge program:
//!
//! - **base**: `in0 + in1 * ?a * ?b`, kept on the stack, printed modulo `?c`
//! - **counted loop** (hard variant): with `in2` as counter, repeat
//!   `acc = (acc * ?d + ?e) mod ?f` until the counter reaches zero, then
//!   print `acc`
//!
//! The loop's two jumps are emitted as placeholders and patched afterwards
//! to jump-target holes whose only legal value is the resolved address.

use crate::config::ChallengeConfig;
use holevm_vm::{HoleKind, Instruction, Program, ProgramBuilder, Result};

/// Input slot holding the loop counter
pub const COUNTER_SLOT: usize = 2;

/// Deterministic program synthesizer
pub struct Synthesizer<'a> {
    config: &'a ChallengeConfig,
}

impl<'a> Synthesizer<'a> {
    pub fn new(config: &'a ChallengeConfig) -> Self {
        Self { config }
    }

    /// Lay out the program for the configured variant
    pub fn synthesize(&self) -> Result<Program> {
        let mut b = ProgramBuilder::new();
        self.emit_base(&mut b)?;
        if self.config.hard {
            self.emit_counted_loop(&mut b)?;
        } else {
            b.emit(Instruction::Halt);
        }
        let program = b.build(self.config.max_steps(), self.config.stack_cap)?;

        tracing::debug!(
            hard = self.config.hard,
            instructions = program.len(),
            holes = program.holes.len(),
            "synthesized program"
        );
        Ok(program)
    }

    fn emit_base(&self, b: &mut ProgramBuilder) -> Result<()> {
        let scale = self.config.scale_domain.domain()?;

        b.emit(Instruction::load(0));
        b.emit(Instruction::load(1));
        let first = b.hole(scale.clone(), HoleKind::Data);
        b.emit(Instruction::push_hole(first));
        b.emit(Instruction::Mul);
        let second = b.hole(scale, HoleKind::Data);
        b.emit(Instruction::push_hole(second));
        b.emit(Instruction::Mul);
        b.emit(Instruction::Add);
        b.emit(Instruction::Dup);
        let modulus = b.hole(self.config.modulus_domain.domain()?, HoleKind::Data);
        b.emit(Instruction::push_hole(modulus));
        b.emit(Instruction::Mod);
        b.emit(Instruction::Print);
        Ok(())
    }

    /// Stack on entry: `[acc]`. Stack inside the loop: `[acc, counter]`.
    fn emit_counted_loop(&self, b: &mut ProgramBuilder) -> Result<()> {
        b.emit(Instruction::load(COUNTER_SLOT));
        let mul = b.hole(self.config.loop_scale_domain.domain()?, HoleKind::Data);
        let add = b.hole(self.config.scale_domain.domain()?, HoleKind::Data);
        let modulus = b.hole(self.config.modulus_domain.domain()?, HoleKind::Data);

        let loop_start = b.here();
        b.emit(Instruction::Dup);
        let exit = b.placeholder(|target| Instruction::Jmpz { target });
        b.emit(Instruction::Swap);
        b.emit(Instruction::push_hole(mul));
        b.emit(Instruction::Mul);
        b.emit(Instruction::push_hole(add));
        b.emit(Instruction::Add);
        b.emit(Instruction::push_hole(modulus));
        b.emit(Instruction::Mod);
        b.emit(Instruction::Swap);
        b.emit(Instruction::push(1));
        b.emit(Instruction::Sub);
        let back = b.placeholder(|target| Instruction::Jmp { target });

        let end = b.here();
        b.emit(Instruction::Pop);
        b.emit(Instruction::Print);
        b.emit(Instruction::Halt);

        b.patch_with_hole(exit, end)?;
        b.patch_with_hole(back, loop_start)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use holevm_vm::{Assignment, Domain, HoleName, Target};

    fn hard() -> Program {
        Synthesizer::new(&ChallengeConfig::default()).synthesize().unwrap()
    }

    #[test]
    fn test_easy_shape() {
        let config = ChallengeConfig { hard: false, ..ChallengeConfig::default() };
        let program = Synthesizer::new(&config).synthesize().unwrap();

        let expected = "\
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
011: HALT";
        assert_eq!(program.listing(), expected);
        assert_eq!(program.max_steps, 4000);
        assert!(!program.loads_slot(COUNTER_SLOT));
    }

    #[test]
    fn test_hard_shape() {
        let program = hard();

        assert_eq!(program.len(), 28);
        assert_eq!(program.max_steps, 8000);
        assert_eq!(program.stack_cap, 256);
        assert!(program.loads_slot(COUNTER_SLOT));
        assert_eq!(program.code[13], Instruction::Jmpz { target: Target::Hole("?g".into()) });
        assert_eq!(program.code[24], Instruction::Jmp { target: Target::Hole("?h".into()) });
        assert_eq!(program.code[25], Instruction::Pop);
    }

    #[test]
    fn test_hole_order_and_domains() {
        let program = hard();
        let names: Vec<&str> = program.hole_names().map(|h| h.as_str()).collect();
        assert_eq!(names, ["?a", "?b", "?c", "?d", "?e", "?f", "?g", "?h"]);

        assert_eq!(program.domain(&"?a".into()), Some(&Domain::range(-9, 9).unwrap()));
        assert_eq!(program.domain(&"?c".into()), Some(&Domain::range(3, 30).unwrap()));
        assert_eq!(program.domain(&"?d".into()), Some(&Domain::range(0, 12).unwrap()));
        assert_eq!(program.domain(&"?g".into()), Some(&Domain::singleton(25)));
        assert_eq!(program.domain(&"?h".into()), Some(&Domain::singleton(12)));

        for hole in &program.holes {
            assert!(!hole.domain.is_empty());
            if hole.kind == HoleKind::JumpTarget {
                assert!(hole.domain.is_singleton());
                assert!((hole.domain.min() as usize) < program.len());
            }
        }
    }

    #[test]
    fn test_hard_program_runs() {
        let program = hard();
        let values = [
            ("?a", 2),
            ("?b", 3),
            ("?c", 7),
            ("?d", 2),
            ("?e", 1),
            ("?f", 5),
            ("?g", 25),
            ("?h", 12),
        ];
        let assignment: Assignment = values
            .into_iter()
            .map(|(k, v)| (HoleName::new(k), v))
            .collect();

        // base: 3 + 4*2*3 = 27 -> prints 6; loop twice: 27*2+1=55%5=0, 0*2+1=1
        let out = holevm_vm::run(&program, &assignment, &[3, 4, 2]).unwrap();
        assert_eq!(out, "6\n1");
    }
}
