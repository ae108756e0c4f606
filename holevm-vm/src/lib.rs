//! # holevm VM
//!
//! A small stack machine whose programs contain holes: named unknown
//! constants, some holding data and some holding jump targets.
//!
//! ## Core Concepts
//! - **Instructions**: a closed set of fifteen opcodes with typed operands
//! - **Holes**: named constants constrained to finite integer domains
//! - **Programs**: instructions + holes + step budget + stack capacity,
//!   laid out by a two-phase builder that patches forward jumps
//! - **Interpreter**: deterministic execution under an assignment of holes

pub mod error;
pub mod hole;
pub mod interpreter;
pub mod opcode;
pub mod program;
pub mod schema;
pub mod stack;

pub use error::{Error, ErrorKind, ErrorStatus, Result};
pub use hole::{Assignment, Domain, Hole, HoleKind, HoleName};
pub use interpreter::{floor_mod, run, trunc_div, Interpreter, StepState};
pub use opcode::{Instruction, Int, Opcode, Operand, Target, Word};
pub use program::{PatchSite, Program, ProgramBuilder};
pub use schema::InstructionSchema;
pub use stack::{Stack, DEFAULT_STACK_CAP};
