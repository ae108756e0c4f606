//! # Instruction Set Schema
//!
//! A structured description of the machine's instruction set, rendered
//! into challenge prompts and printed by the CLI.

use crate::opcode::Opcode;
use serde::Serialize;

/// The full instruction-set reference
#[derive(Debug, Clone, Serialize)]
pub struct InstructionSchema {
    /// Opcodes grouped by category
    pub categories: Vec<OpcodeCategory>,
}

/// A category of opcodes
#[derive(Debug, Clone, Serialize)]
pub struct OpcodeCategory {
    pub name: &'static str,
    pub opcodes: Vec<OpcodeSpec>,
}

/// Specification for a single opcode
#[derive(Debug, Clone, Serialize)]
pub struct OpcodeSpec {
    pub opcode: Opcode,
    /// Operand placeholder, e.g. `n` in `PUSH n`
    pub operand: Option<&'static str>,
    pub description: &'static str,
}

impl Default for InstructionSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl InstructionSchema {
    pub fn new() -> Self {
        let spec = |opcode, operand, description| OpcodeSpec { opcode, operand, description };
        Self {
            categories: vec![
                OpcodeCategory {
                    name: "Data",
                    opcodes: vec![
                        spec(Opcode::Push, Some("n"), "push integer n (n can also be a hole like ?a)"),
                        spec(Opcode::Load, Some("i"), "push i-th input integer (0-based)"),
                    ],
                },
                OpcodeCategory {
                    name: "Arithmetic",
                    opcodes: vec![
                        spec(Opcode::Add, None, "pop b, pop a, push a+b"),
                        spec(Opcode::Sub, None, "pop b, pop a, push a-b"),
                        spec(Opcode::Mul, None, "pop b, pop a, push a*b"),
                        spec(Opcode::Div, None, "pop b, pop a, push a/b truncated toward zero"),
                        spec(Opcode::Mod, None, "pop b, pop a, push a mod b with the sign of b"),
                    ],
                },
                OpcodeCategory {
                    name: "Stack",
                    opcodes: vec![
                        spec(Opcode::Dup, None, "duplicate the top value"),
                        spec(Opcode::Swap, None, "swap the top two values"),
                        spec(Opcode::Pop, None, "discard the top value"),
                    ],
                },
                OpcodeCategory {
                    name: "Control Flow",
                    opcodes: vec![
                        spec(Opcode::Jmp, Some("k"), "absolute jump"),
                        spec(Opcode::Jmpz, Some("k"), "jump if top==0"),
                        spec(Opcode::Jmpnz, Some("k"), "jump if top!=0"),
                    ],
                },
                OpcodeCategory {
                    name: "Output",
                    opcodes: vec![spec(Opcode::Print, None, "pop the top value and print it on its own line")],
                },
                OpcodeCategory {
                    name: "Termination",
                    opcodes: vec![spec(Opcode::Halt, None, "stop successfully")],
                },
            ],
        }
    }

    /// Compact reference for challenge prompts.
    ///
    /// Opcodes with an operand get their own commented line; operand-less
    /// opcodes of one category share a line.
    pub fn to_prompt(&self) -> String {
        let mut out = String::from("Instruction set:\n");
        for category in &self.categories {
            let mut bare = Vec::new();
            for op in &category.opcodes {
                match op.operand {
                    Some(operand) => {
                        let syntax = format!("{} {}", op.opcode, operand);
                        out.push_str(&format!("  {:<12} ; {}\n", syntax, op.description));
                    }
                    None => bare.push(op.opcode.mnemonic()),
                }
            }
            if !bare.is_empty() {
                out.push_str(&format!("  {}\n", bare.join(" ")));
            }
        }
        out
    }

    /// Long-form reference with one described line per opcode
    pub fn to_reference(&self) -> String {
        let mut out = String::new();
        for category in &self.categories {
            out.push_str(&format!("{}:\n", category.name));
            for op in &category.opcodes {
                let syntax = match op.operand {
                    Some(operand) => format!("{} {}", op.opcode, operand),
                    None => op.opcode.to_string(),
                };
                out.push_str(&format!("  {:<10} {}\n", syntax, op.description));
            }
            out.push('\n');
        }
        out
    }

    /// Render as JSON for structured consumption
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_opcode_documented() {
        let schema = InstructionSchema::new();
        let documented: Vec<Opcode> = schema
            .categories
            .iter()
            .flat_map(|c| c.opcodes.iter().map(|o| o.opcode))
            .collect();
        assert_eq!(documented, Opcode::ALL.to_vec());
    }

    #[test]
    fn test_prompt_layout() {
        let prompt = InstructionSchema::new().to_prompt();
        let expected = "Instruction set:\n\
            \x20 PUSH n       ; push integer n (n can also be a hole like ?a)\n\
            \x20 LOAD i       ; push i-th input integer (0-based)\n\
            \x20 ADD SUB MUL DIV MOD\n\
            \x20 DUP SWAP POP\n\
            \x20 JMP k        ; absolute jump\n\
            \x20 JMPZ k       ; jump if top==0\n\
            \x20 JMPNZ k      ; jump if top!=0\n\
            \x20 PRINT\n\
            \x20 HALT\n";
        assert_eq!(prompt, expected);
    }

    #[test]
    fn test_schema_json() {
        let json = InstructionSchema::new().to_json();
        assert!(json.contains("\"JMPNZ\""));
        assert!(json.contains("Control Flow"));
    }
}
