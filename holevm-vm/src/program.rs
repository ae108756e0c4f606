//! # Programs
//!
//! A program is an instruction sequence plus its declared holes and
//! execution limits. [`ProgramBuilder`] lays code out in two phases: jumps
//! whose targets are not yet known are emitted as placeholders, then patched
//! once the surrounding layout is final.

use crate::error::{self, Result};
use crate::hole::{Domain, Hole, HoleKind, HoleName};
use crate::opcode::{Instruction, Target, Int};
use crate::stack::DEFAULT_STACK_CAP;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Instruction sequence with holes, a step budget and a stack capacity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    /// Instructions; position is the code address
    pub code: Vec<Instruction>,
    /// Declared holes in creation order
    pub holes: Vec<Hole>,
    /// Step budget for one run
    pub max_steps: usize,
    /// Maximum stack depth
    #[serde(default = "default_stack_cap")]
    pub stack_cap: usize,
}

fn default_stack_cap() -> usize {
    DEFAULT_STACK_CAP
}

impl Program {
    /// Build a program and check its invariants
    pub fn new(
        code: Vec<Instruction>,
        holes: Vec<Hole>,
        max_steps: usize,
        stack_cap: usize,
    ) -> Result<Self> {
        let program = Program { code, holes, max_steps, stack_cap };
        program.validate()?;
        Ok(program)
    }

    /// Number of instructions
    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Look up a declared hole
    pub fn hole(&self, name: &HoleName) -> Option<&Hole> {
        self.holes.iter().find(|h| &h.name == name)
    }

    /// Domain of a declared hole
    pub fn domain(&self, name: &HoleName) -> Option<&Domain> {
        self.hole(name).map(|h| &h.domain)
    }

    /// Declared hole names in creation order
    pub fn hole_names(&self) -> impl Iterator<Item = &HoleName> {
        self.holes.iter().map(|h| &h.name)
    }

    /// Check if any LOAD reads input slot `slot`
    pub fn loads_slot(&self, slot: usize) -> bool {
        self.code.iter().any(|ins| matches!(ins, Instruction::Load { slot: s } if *s == slot))
    }

    /// Check the structural invariants:
    /// - hole names are unique and every domain is well formed
    /// - every hole an operand references is declared
    /// - every literal jump target lies inside the code
    /// - every jump-target hole has a singleton domain holding a valid address
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for hole in &self.holes {
            if !seen.insert(&hole.name) {
                return Err(error::invalid_program(format!("hole '{}' declared twice", hole.name))
                    .with_context("hole", hole.name.as_str()));
            }
            hole.domain
                .check()
                .map_err(|e| e.with_context("hole", hole.name.as_str()))?;
            if hole.kind == HoleKind::JumpTarget {
                let valid = hole.domain.is_singleton() && self.is_address(hole.domain.min());
                if !valid {
                    return Err(error::invalid_program(format!(
                        "jump hole '{}' must have a single in-range address, got {}",
                        hole.name, hole.domain
                    ))
                    .with_context("hole", hole.name.as_str()));
                }
            }
        }

        for (addr, ins) in self.code.iter().enumerate() {
            if let Some(name) = ins.hole() {
                if !seen.contains(name) {
                    let message = format!("'{}' at {} references undeclared hole {}", ins, addr, name);
                    return Err(error::invalid_program(message)
                        .with_context("address", addr.to_string()));
                }
            }
            if let Some(Target::Addr(target)) = ins.target() {
                if *target >= self.code.len() {
                    let message = format!("'{}' at {} jumps outside the code", ins, addr);
                    return Err(error::invalid_program(message)
                        .with_context("address", addr.to_string()));
                }
            }
        }
        Ok(())
    }

    fn is_address(&self, value: Int) -> bool {
        usize::try_from(value).is_ok_and(|a| a < self.code.len())
    }

    /// One instruction per line, prefixed with a zero-padded address
    pub fn listing(&self) -> String {
        self.code
            .iter()
            .enumerate()
            .map(|(i, ins)| format!("{:03}: {}", i, ins))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Address of a jump emitted before its target was known
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchSite(usize);

impl PatchSite {
    pub fn address(&self) -> usize {
        self.0
    }
}

/// Mutable instruction buffer with forward-reference placeholders
#[derive(Debug, Default)]
pub struct ProgramBuilder {
    code: Vec<Instruction>,
    holes: Vec<Hole>,
    pending: Vec<usize>,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Address the next emitted instruction will get
    pub fn here(&self) -> usize {
        self.code.len()
    }

    /// Append an instruction, returning its address
    pub fn emit(&mut self, ins: Instruction) -> usize {
        self.code.push(ins);
        self.code.len() - 1
    }

    /// Declare a new hole, named in creation order
    pub fn hole(&mut self, domain: Domain, kind: HoleKind) -> HoleName {
        let name = HoleName::from_index(self.holes.len());
        self.holes.push(Hole { name: name.clone(), domain, kind });
        name
    }

    /// Emit a jump whose target is filled in later by [`patch`](Self::patch)
    pub fn placeholder(&mut self, jump: fn(Target) -> Instruction) -> PatchSite {
        let addr = self.emit(jump(Target::Addr(usize::MAX)));
        self.pending.push(addr);
        PatchSite(addr)
    }

    /// Point a placeholder jump at `target`
    pub fn patch(&mut self, site: PatchSite, target: Target) -> Result<()> {
        let Some(pos) = self.pending.iter().position(|&a| a == site.0) else {
            return Err(error::invalid_program(format!("no pending jump at {}", site.0))
                .with_context("address", site.0.to_string()));
        };
        match &mut self.code[site.0] {
            Instruction::Jmp { target: t }
            | Instruction::Jmpz { target: t }
            | Instruction::Jmpnz { target: t } => *t = target,
            other => {
                return Err(error::invalid_program(format!("'{}' at {} is not a jump", other, site.0)));
            }
        }
        self.pending.swap_remove(pos);
        Ok(())
    }

    /// Patch a placeholder to a fresh jump-target hole whose only legal
    /// value is `address`
    pub fn patch_with_hole(&mut self, site: PatchSite, address: usize) -> Result<HoleName> {
        let value = Int::try_from(address)
            .map_err(|_| error::invalid_program(format!("address {} out of range", address)))?;
        let name = self.hole(Domain::singleton(value), HoleKind::JumpTarget);
        self.patch(site, Target::Hole(name.clone()))?;
        Ok(name)
    }

    /// Finish the layout; fails if a placeholder was never patched
    pub fn build(self, max_steps: usize, stack_cap: usize) -> Result<Program> {
        if let Some(&addr) = self.pending.iter().min() {
            return Err(error::unresolved_placeholder(addr));
        }
        Program::new(self.code, self.holes, max_steps, stack_cap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn countdown() -> ProgramBuilder {
        let mut b = ProgramBuilder::new();
        b.emit(Instruction::load(0));
        let start = b.here();
        b.emit(Instruction::Dup);
        let exit = b.placeholder(|target| Instruction::Jmpz { target });
        b.emit(Instruction::push(1));
        b.emit(Instruction::Sub);
        let back = b.placeholder(|target| Instruction::Jmp { target });
        let end = b.here();
        b.emit(Instruction::Print);
        b.emit(Instruction::Halt);
        b.patch_with_hole(exit, end).unwrap();
        b.patch_with_hole(back, start).unwrap();
        b
    }

    #[test]
    fn test_two_phase_patching() {
        let program = countdown().build(100, 16).unwrap();

        assert_eq!(program.code[2], Instruction::Jmpz { target: Target::Hole("?a".into()) });
        assert_eq!(program.code[5], Instruction::Jmp { target: Target::Hole("?b".into()) });
        assert_eq!(program.domain(&"?a".into()), Some(&Domain::singleton(6)));
        assert_eq!(program.domain(&"?b".into()), Some(&Domain::singleton(1)));
        assert_eq!(program.hole(&"?a".into()).unwrap().kind, HoleKind::JumpTarget);
    }

    #[test]
    fn test_unpatched_placeholder_rejected() {
        let mut b = ProgramBuilder::new();
        b.emit(Instruction::push(0));
        b.placeholder(|target| Instruction::Jmpz { target });
        b.emit(Instruction::Halt);

        let err = b.build(10, 16).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnresolvedPlaceholder);
    }

    #[test]
    fn test_double_patch_rejected() {
        let mut b = ProgramBuilder::new();
        let site = b.placeholder(|target| Instruction::Jmp { target });
        b.emit(Instruction::Halt);
        b.patch(site, Target::Addr(1)).unwrap();

        assert!(b.patch(site, Target::Addr(0)).is_err());
    }

    #[test]
    fn test_validate_undeclared_hole() {
        let code = vec![Instruction::push_hole("?q".into()), Instruction::Halt];
        let err = Program::new(code, vec![], 10, 16).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidProgram);
    }

    #[test]
    fn test_validate_literal_target() {
        let code = vec![Instruction::Jmp { target: Target::Addr(5) }];
        let err = Program::new(code, vec![], 10, 16).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidProgram);
    }

    #[test]
    fn test_validate_malformed_domains() {
        let code = vec![Instruction::push_hole("?a".into()), Instruction::Halt];
        for domain in [Domain::Range { lo: 5, hi: 3 }, Domain::Set { values: vec![5, 1] }] {
            let holes = vec![Hole { name: "?a".into(), domain, kind: HoleKind::Data }];
            let err = Program::new(code.clone(), holes, 10, 16).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidDomain);
        }
    }

    #[test]
    fn test_validate_jump_hole_domain() {
        let holes = vec![Hole {
            name: "?a".into(),
            domain: Domain::range(0, 1).unwrap(),
            kind: HoleKind::JumpTarget,
        }];
        let code = vec![Instruction::Jmp { target: Target::Hole("?a".into()) }, Instruction::Halt];
        assert!(Program::new(code, holes, 10, 16).is_err());
    }

    #[test]
    fn test_listing() {
        let program = countdown().build(100, 16).unwrap();
        let listing = program.listing();
        let lines: Vec<_> = listing.lines().collect();

        assert_eq!(lines[0], "000: LOAD 0");
        assert_eq!(lines[2], "002: JMPZ ?a");
        assert_eq!(lines[7], "007: HALT");
        assert!(program.loads_slot(0));
        assert!(!program.loads_slot(1));
    }

    #[test]
    fn test_program_serialization() {
        let program = countdown().build(100, 16).unwrap();

        let json = serde_json::to_string_pretty(&program).unwrap();
        let parsed: Program = serde_json::from_str(&json).unwrap();
        assert_eq!(program, parsed);
    }
}
