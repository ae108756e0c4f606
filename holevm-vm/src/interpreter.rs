//! # Interpreter
//!
//! Runs a [`Program`] under a hole [`Assignment`] on one input vector.
//!
//! The run is a pure function of `(program, assignment, input)`: the same
//! triple always yields the same output or the same error kind.
//!
//! ## Execution model
//! - `ip` starts at 0, `steps` at 0, the stack empty (capacity from the program)
//! - before each instruction the run fails if `steps > max_steps` or `ip` is
//!   outside the code, then `steps` is incremented
//! - jumps replace `ip`; every other instruction advances it by one
//! - `HALT` ends the run; output is the printed lines joined by `\n`
//! - stack values are arbitrary-precision; inputs and hole values are
//!   widened when pushed

use crate::error::{self, Result};
use crate::hole::Assignment;
use crate::opcode::{Instruction, Int, Operand, Target, Word};
use crate::program::Program;
use crate::stack::Stack;
use num_integer::Integer;
use num_traits::Zero;

/// Whether a run continues after a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Running,
    Halted,
}

/// Machine state for one run
pub struct Interpreter<'a> {
    program: &'a Program,
    assignment: &'a Assignment,
    input: &'a [Int],
    ip: usize,
    steps: usize,
    stack: Stack,
    output: Vec<String>,
}

/// Run `program` to completion and return its output
pub fn run(program: &Program, assignment: &Assignment, input: &[Int]) -> Result<String> {
    Interpreter::new(program, assignment, input).run()
}

impl<'a> Interpreter<'a> {
    pub fn new(program: &'a Program, assignment: &'a Assignment, input: &'a [Int]) -> Self {
        Self {
            program,
            assignment,
            input,
            ip: 0,
            steps: 0,
            stack: Stack::with_capacity(program.stack_cap),
            output: Vec::new(),
        }
    }

    /// Instruction pointer
    pub fn ip(&self) -> usize {
        self.ip
    }

    /// Instructions executed so far
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    /// Lines printed so far
    pub fn printed(&self) -> &[String] {
        &self.output
    }

    /// Run until HALT or the first failure
    pub fn run(mut self) -> Result<String> {
        while self.step()? == StepState::Running {}
        Ok(self.output.join("\n"))
    }

    /// Execute a single instruction
    pub fn step(&mut self) -> Result<StepState> {
        if self.steps > self.program.max_steps {
            return Err(error::step_limit_exceeded(self.program.max_steps)
                .with_operation("interpreter::step"));
        }
        let program = self.program;
        let ins = program.code.get(self.ip).ok_or_else(|| {
            error::address_out_of_bounds(self.ip as Int, program.len())
                .with_operation("interpreter::step")
        })?;
        self.steps += 1;

        tracing::trace!(
            ip = self.ip,
            step = self.steps,
            depth = self.stack.len(),
            instruction = %ins
        );

        self.execute(ins).map_err(|e| {
            e.with_operation("interpreter::step")
                .with_context("ip", self.ip.to_string())
        })
    }

    fn execute(&mut self, ins: &Instruction) -> Result<StepState> {
        let mut next = self.ip + 1;

        match ins {
            Instruction::Push { value } => {
                let v = match value {
                    Operand::Int(v) => *v,
                    Operand::Hole(h) => self.assignment.resolve(h)?,
                };
                self.stack.push(Word::from(v))?;
            }
            Instruction::Load { slot } => {
                let v = self
                    .input
                    .get(*slot)
                    .copied()
                    .ok_or_else(|| error::input_out_of_bounds(*slot, self.input.len()))?;
                self.stack.push(Word::from(v))?;
            }
            Instruction::Add => self.binary(|a, b| Ok(a + b))?,
            Instruction::Sub => self.binary(|a, b| Ok(a - b))?,
            Instruction::Mul => self.binary(|a, b| Ok(a * b))?,
            Instruction::Div => self.binary(|a, b| trunc_div(&a, &b))?,
            Instruction::Mod => self.binary(|a, b| floor_mod(&a, &b))?,
            Instruction::Dup => self.stack.dup()?,
            Instruction::Swap => self.stack.swap()?,
            Instruction::Pop => {
                self.stack.pop()?;
            }
            Instruction::Jmp { target } => next = self.resolve_target(target)?,
            Instruction::Jmpz { target } | Instruction::Jmpnz { target } => {
                let top = self.stack.pop()?;
                let jump_on_zero = matches!(ins, Instruction::Jmpz { .. });
                if top.is_zero() == jump_on_zero {
                    next = self.resolve_target(target)?;
                }
            }
            Instruction::Print => {
                let v = self.stack.pop()?;
                self.output.push(v.to_string());
            }
            Instruction::Halt => return Ok(StepState::Halted),
        }

        self.ip = next;
        Ok(StepState::Running)
    }

    fn binary(&mut self, f: impl FnOnce(Word, Word) -> Result<Word>) -> Result<()> {
        let (a, b) = self.stack.pop_pair()?;
        let v = f(a, b)?;
        self.stack.push(v)
    }

    fn resolve_target(&self, target: &Target) -> Result<usize> {
        match target {
            Target::Addr(a) => Ok(*a),
            Target::Hole(h) => {
                let v = self.assignment.resolve(h)?;
                usize::try_from(v).map_err(|_| error::address_out_of_bounds(v, self.program.len()))
            }
        }
    }
}

/// Quotient rounded toward zero
pub fn trunc_div(a: &Word, b: &Word) -> Result<Word> {
    if b.is_zero() {
        return Err(error::division_by_zero("DIV"));
    }
    Ok(a / b)
}

/// Remainder of floor division: the result takes the sign of the divisor
pub fn floor_mod(a: &Word, b: &Word) -> Result<Word> {
    if b.is_zero() {
        return Err(error::division_by_zero("MOD"));
    }
    Ok(a.mod_floor(b))
}
