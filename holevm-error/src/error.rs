use crate::{ErrorKind, ErrorStatus};
use std::fmt;

/// A holevm failure: its kind, a message, a retry status, the operation that
/// raised it and where it was called from, plus key/value context.
///
/// ```rust
/// use holevm_error::{Error, ErrorKind, ErrorStatus};
///
/// let err = Error::new(ErrorKind::ForgeExhausted, "no consistent case batch")
///     .with_operation("forger::forge")
///     .with_context("attempts", "1000");
///
/// assert_eq!(err.kind(), ErrorKind::ForgeExhausted);
/// assert_eq!(err.status(), ErrorStatus::Temporary);
/// ```
pub struct Error {
    kind: ErrorKind,
    message: String,
    status: ErrorStatus,
    operation: &'static str,
    context: Vec<(&'static str, String)>,
    source: Option<anyhow::Error>,
}

impl Error {
    /// Status starts as Temporary for retryable kinds, Permanent otherwise
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: if kind.is_retryable() { ErrorStatus::Temporary } else { ErrorStatus::Permanent },
            operation: "",
            context: Vec::new(),
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> ErrorStatus {
        self.status
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn context(&self) -> &[(&'static str, String)] {
        &self.context
    }

    /// Wrapped lower-level error, if any
    pub fn source_ref(&self) -> Option<&anyhow::Error> {
        self.source.as_ref()
    }

    pub fn is_retryable(&self) -> bool {
        self.status.is_retryable()
    }

    pub fn is_execution_failure(&self) -> bool {
        self.kind.is_execution_failure()
    }

    pub fn with_status(mut self, status: ErrorStatus) -> Self {
        self.status = status;
        self
    }

    /// Retries are used up; a temporary error becomes persistent
    pub fn persist(mut self) -> Self {
        self.status = self.status.persist();
        self
    }

    /// Record the raising operation. An operation already set is kept in
    /// context under `called`, innermost first.
    pub fn with_operation(mut self, operation: &'static str) -> Self {
        if !self.operation.is_empty() {
            self.context.push(("called", self.operation.to_string()));
        }
        self.operation = operation;
        self
    }

    pub fn with_context(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.context.push((key, value.into()));
        self
    }

    /// Attach the underlying error. Set at most once.
    pub fn set_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        debug_assert!(self.source.is_none(), "error source set twice");
        self.source = Some(source.into());
        self
    }
}

/// One line: `Kind at operation: message [key=value, ...] (status)`
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if !self.operation.is_empty() {
            write!(f, " at {}", self.operation)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if !self.context.is_empty() {
            let pairs: Vec<String> = self.context.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            write!(f, " [{}]", pairs.join(", "))?;
        }
        write!(f, " ({})", self.status)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({})", self.kind, self.status)?;
        if !self.operation.is_empty() {
            writeln!(f, "  operation: {}", self.operation)?;
        }
        if !self.message.is_empty() {
            writeln!(f, "  message:   {}", self.message)?;
        }
        for (key, value) in &self.context {
            writeln!(f, "  {:<10} {}", format!("{}:", key), value)?;
        }
        if let Some(source) = &self.source {
            writeln!(f, "  source:    {:#}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied,
            _ => ErrorKind::IoFailed,
        };
        Error::new(kind, err.to_string()).with_operation("io").set_source(err)
    }
}

impl Error {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }

    pub fn stack_overflow(capacity: usize) -> Self {
        Self::new(ErrorKind::StackOverflow, format!("stack depth exceeded capacity {}", capacity))
            .with_context("capacity", capacity.to_string())
    }

    pub fn stack_underflow() -> Self {
        Self::new(ErrorKind::StackUnderflow, "not enough values on the stack")
    }

    pub fn unassigned_hole(hole: impl Into<String>) -> Self {
        let hole = hole.into();
        Self::new(ErrorKind::UnassignedHole, format!("hole '{}' has no value", hole))
            .with_context("hole", hole)
    }

    pub fn invalid_program(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidProgram, message)
    }

    pub fn invalid_domain(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidDomain, message)
    }

    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigInvalid, message)
    }

    pub fn no_active_challenge() -> Self {
        Self::new(ErrorKind::NoActiveChallenge, "no active challenge, call reset() first")
    }

    pub fn parse_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ParseFailed, message)
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }
}
