//! Interpreter and builder failures, on top of `holevm_error`

pub use holevm_error::{Error, ErrorKind, ErrorStatus, Result};

pub fn stack_overflow(capacity: usize) -> Error {
    Error::stack_overflow(capacity)
}

pub fn stack_underflow() -> Error {
    Error::stack_underflow()
}

/// `op` is the mnemonic, DIV or MOD
pub fn division_by_zero(op: &'static str) -> Error {
    Error::new(ErrorKind::DivisionByZero, format!("{} by zero", op)).with_context("op", op)
}

/// `ip` is signed: a hole may resolve to a negative address
pub fn address_out_of_bounds(ip: i64, len: usize) -> Error {
    let message = format!("address {} outside code of length {}", ip, len);
    Error::new(ErrorKind::AddressOutOfBounds, message).with_context("target", ip.to_string())
}

pub fn step_limit_exceeded(max_steps: usize) -> Error {
    Error::new(ErrorKind::StepLimitExceeded, format!("step budget {} exhausted", max_steps))
        .with_context("max_steps", max_steps.to_string())
}

pub fn input_out_of_bounds(slot: usize, len: usize) -> Error {
    Error::new(ErrorKind::InputOutOfBounds, format!("LOAD {} with {} inputs", slot, len))
        .with_context("slot", slot.to_string())
}

pub fn unassigned_hole(hole: impl Into<String>) -> Error {
    Error::unassigned_hole(hole)
}

pub fn invalid_program(message: impl Into<String>) -> Error {
    Error::invalid_program(message)
}

pub fn unresolved_placeholder(address: usize) -> Error {
    Error::new(ErrorKind::UnresolvedPlaceholder, format!("jump at {} never patched", address))
        .with_context("address", address.to_string())
}

pub fn invalid_domain(message: impl Into<String>) -> Error {
    Error::invalid_domain(message)
}
