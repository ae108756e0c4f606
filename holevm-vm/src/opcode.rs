//! # Instruction Set
//!
//! Opcodes and instructions for the hole-parameterized stack machine.
//!
//! ## Design Philosophy
//! - The opcode set is closed: fifteen operations, no extensions
//! - Operands are typed: a literal, an input slot, a code address, or a hole
//! - A hole is never a raw string; resolution failures are a matchable case

use crate::hole::HoleName;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer fixed before a run: literals, hole values, inputs, domain bounds
pub type Int = i64;

/// Value held on the stack. Unbounded, so ADD, SUB and MUL never overflow.
pub type Word = BigInt;

/// The closed set of opcodes, without operands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Opcode {
    Push,
    Load,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Dup,
    Swap,
    Pop,
    Jmp,
    Jmpz,
    Jmpnz,
    Print,
    Halt,
}

impl Opcode {
    /// Every opcode, in reference order
    pub const ALL: [Opcode; 15] = [
        Opcode::Push,
        Opcode::Load,
        Opcode::Add,
        Opcode::Sub,
        Opcode::Mul,
        Opcode::Div,
        Opcode::Mod,
        Opcode::Dup,
        Opcode::Swap,
        Opcode::Pop,
        Opcode::Jmp,
        Opcode::Jmpz,
        Opcode::Jmpnz,
        Opcode::Print,
        Opcode::Halt,
    ];

    /// Mnemonic as it appears in program listings
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::Push => "PUSH",
            Opcode::Load => "LOAD",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::Mod => "MOD",
            Opcode::Dup => "DUP",
            Opcode::Swap => "SWAP",
            Opcode::Pop => "POP",
            Opcode::Jmp => "JMP",
            Opcode::Jmpz => "JMPZ",
            Opcode::Jmpnz => "JMPNZ",
            Opcode::Print => "PRINT",
            Opcode::Halt => "HALT",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// Value operand of PUSH: a literal or a hole
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    Int(Int),
    Hole(HoleName),
}

/// Jump operand: a literal code address or a hole holding one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Addr(usize),
    Hole(HoleName),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Int(v) => write!(f, "{}", v),
            Operand::Hole(h) => write!(f, "{}", h),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Addr(a) => write!(f, "{}", a),
            Target::Hole(h) => write!(f, "{}", h),
        }
    }
}

/// A decoded instruction: opcode plus its operand, if any
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Instruction {
    /// Push a literal or a hole's value
    Push { value: Operand },
    /// Push input slot `slot`
    Load { slot: usize },
    Add,
    Sub,
    Mul,
    /// Truncating division
    Div,
    /// Remainder with the sign of the divisor
    Mod,
    Dup,
    Swap,
    Pop,
    /// Unconditional jump
    Jmp { target: Target },
    /// Pop; jump if the value is zero
    Jmpz { target: Target },
    /// Pop; jump if the value is non-zero
    Jmpnz { target: Target },
    /// Pop and emit one output line
    Print,
    Halt,
}

impl Instruction {
    /// Shorthand for `PUSH <literal>`
    pub fn push(value: Int) -> Self {
        Instruction::Push { value: Operand::Int(value) }
    }

    /// Shorthand for `PUSH <hole>`
    pub fn push_hole(hole: HoleName) -> Self {
        Instruction::Push { value: Operand::Hole(hole) }
    }

    /// Shorthand for `LOAD <slot>`
    pub fn load(slot: usize) -> Self {
        Instruction::Load { slot }
    }

    pub fn opcode(&self) -> Opcode {
        match self {
            Instruction::Push { .. } => Opcode::Push,
            Instruction::Load { .. } => Opcode::Load,
            Instruction::Add => Opcode::Add,
            Instruction::Sub => Opcode::Sub,
            Instruction::Mul => Opcode::Mul,
            Instruction::Div => Opcode::Div,
            Instruction::Mod => Opcode::Mod,
            Instruction::Dup => Opcode::Dup,
            Instruction::Swap => Opcode::Swap,
            Instruction::Pop => Opcode::Pop,
            Instruction::Jmp { .. } => Opcode::Jmp,
            Instruction::Jmpz { .. } => Opcode::Jmpz,
            Instruction::Jmpnz { .. } => Opcode::Jmpnz,
            Instruction::Print => Opcode::Print,
            Instruction::Halt => Opcode::Halt,
        }
    }

    /// Jump target, for the three jump instructions
    pub fn target(&self) -> Option<&Target> {
        match self {
            Instruction::Jmp { target }
            | Instruction::Jmpz { target }
            | Instruction::Jmpnz { target } => Some(target),
            _ => None,
        }
    }

    /// The hole this instruction references, if any
    pub fn hole(&self) -> Option<&HoleName> {
        match self {
            Instruction::Push { value: Operand::Hole(h) } => Some(h),
            _ => match self.target() {
                Some(Target::Hole(h)) => Some(h),
                _ => None,
            },
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = self.opcode();
        match self {
            Instruction::Push { value } => write!(f, "{} {}", op, value),
            Instruction::Load { slot } => write!(f, "{} {}", op, slot),
            Instruction::Jmp { target }
            | Instruction::Jmpz { target }
            | Instruction::Jmpnz { target } => write!(f, "{} {}", op, target),
            _ => write!(f, "{}", op),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_serialization() {
        let ins = Instruction::Jmpz { target: Target::Hole(HoleName::new("?g")) };

        let json = serde_json::to_string(&ins).unwrap();
        assert_eq!(json, r#"{"op":"JMPZ","target":{"hole":"?g"}}"#);

        let parsed: Instruction = serde_json::from_str(&json).unwrap();
        assert_eq!(ins, parsed);
    }

    #[test]
    fn test_display() {
        assert_eq!(Instruction::push(-3).to_string(), "PUSH -3");
        assert_eq!(Instruction::push_hole(HoleName::new("?a")).to_string(), "PUSH ?a");
        assert_eq!(Instruction::load(2).to_string(), "LOAD 2");
        assert_eq!(Instruction::Jmp { target: Target::Addr(13) }.to_string(), "JMP 13");
        assert_eq!(Instruction::Mod.to_string(), "MOD");
    }

    #[test]
    fn test_hole_reference() {
        let h = HoleName::new("?h");
        assert_eq!(Instruction::Jmp { target: Target::Hole(h.clone()) }.hole(), Some(&h));
        assert_eq!(Instruction::push_hole(h.clone()).hole(), Some(&h));
        assert_eq!(Instruction::push(1).hole(), None);
        assert_eq!(Instruction::Jmp { target: Target::Addr(0) }.hole(), None);
    }

    #[test]
    fn test_opcode_mnemonics_unique() {
        let mut names: Vec<_> = Opcode::ALL.iter().map(|o| o.mnemonic()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), Opcode::ALL.len());
    }
}
