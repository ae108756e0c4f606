//! What went wrong

use std::fmt;

/// Category of a holevm failure.
///
/// Grouped by the stage that raises it: the interpreter, the synthesizer and
/// forger, the episode wrapper, and the IO/parsing edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Catch-all for conditions with no better kind
    Unexpected,
    /// A `ChallengeConfig` field is out of range or the file is malformed
    ConfigInvalid,

    // raised by the interpreter
    /// Push beyond the program's stack capacity
    StackOverflow,
    /// Pop, DUP, SWAP or a binary op on too few values
    StackUnderflow,
    /// DIV or MOD by zero
    DivisionByZero,
    /// Instruction pointer outside the code
    AddressOutOfBounds,
    StepLimitExceeded,
    /// LOAD of a slot the input vector lacks
    InputOutOfBounds,
    /// Hole referenced with no value in the assignment
    UnassignedHole,
    /// Structural defect found while validating a program
    InvalidProgram,

    // raised while building challenges
    /// Jump placeholder left unpatched at build time
    UnresolvedPlaceholder,
    /// Empty or inverted hole domain
    InvalidDomain,
    /// No assignment produced a full batch of cases within the attempt budget
    ForgeExhausted,

    /// `step` with no challenge posed
    NoActiveChallenge,

    FileNotFound,
    PermissionDenied,
    IoFailed,

    ParseFailed,
    SerializationFailed,
    /// Malformed command-line value
    InvalidArgument,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        use ErrorKind::*;
        match self {
            Unexpected => "Unexpected",
            ConfigInvalid => "ConfigInvalid",
            StackOverflow => "StackOverflow",
            StackUnderflow => "StackUnderflow",
            DivisionByZero => "DivisionByZero",
            AddressOutOfBounds => "AddressOutOfBounds",
            StepLimitExceeded => "StepLimitExceeded",
            InputOutOfBounds => "InputOutOfBounds",
            UnassignedHole => "UnassignedHole",
            InvalidProgram => "InvalidProgram",
            UnresolvedPlaceholder => "UnresolvedPlaceholder",
            InvalidDomain => "InvalidDomain",
            ForgeExhausted => "ForgeExhausted",
            NoActiveChallenge => "NoActiveChallenge",
            FileNotFound => "FileNotFound",
            PermissionDenied => "PermissionDenied",
            IoFailed => "IoFailed",
            ParseFailed => "ParseFailed",
            SerializationFailed => "SerializationFailed",
            InvalidArgument => "InvalidArgument",
        }
    }

    /// Only forging can succeed on a second try, with a fresh random draw
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::ForgeExhausted)
    }

    /// Kinds a program run can end with. Scoring folds all of them into a
    /// single failed case.
    pub fn is_execution_failure(&self) -> bool {
        use ErrorKind::*;
        matches!(
            self,
            StackOverflow
                | StackUnderflow
                | DivisionByZero
                | AddressOutOfBounds
                | StepLimitExceeded
                | InputOutOfBounds
                | UnassignedHole
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_variant() {
        assert_eq!(ErrorKind::StackUnderflow.to_string(), "StackUnderflow");
        assert_eq!(ErrorKind::ForgeExhausted.to_string(), "ForgeExhausted");
    }

    #[test]
    fn test_only_forging_retries() {
        assert!(ErrorKind::ForgeExhausted.is_retryable());
        assert!(!ErrorKind::DivisionByZero.is_retryable());
        assert!(!ErrorKind::NoActiveChallenge.is_retryable());
    }

    #[test]
    fn test_execution_failures() {
        assert!(ErrorKind::DivisionByZero.is_execution_failure());
        assert!(ErrorKind::StepLimitExceeded.is_execution_failure());
        assert!(ErrorKind::UnassignedHole.is_execution_failure());
        assert!(!ErrorKind::NoActiveChallenge.is_execution_failure());
        assert!(!ErrorKind::InvalidProgram.is_execution_failure());
    }
}
