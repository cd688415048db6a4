use std::error::Error;
use std::fmt;

use crate::log;

/// Collects human-readable error messages; joined with newlines on `take`.
#[derive(Debug, Clone, Default)]
pub struct ErrorAccumulator(Option<String>);

impl ErrorAccumulator {
    pub fn push(&mut self, msg: &str) {
        match &mut self.0 {
            Some(existing) => {
                existing.push('\n');
                existing.push_str(msg);
            }
            None => {
                self.0 = Some(msg.to_string());
            }
        }
    }

    pub fn take(&mut self) -> Option<String> {
        self.0.take()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed nesting, missing `;` or `]`, stray text after a value.
    Structural,
    /// Nothing to interpret after structural parsing.
    Selection,
    /// A recognized property with a bad arity or value.
    Semantic,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SgfError {
    pub kind: ErrorKind,
    pub message: String,
}

impl SgfError {
    /// Builds the error and reports it to the diagnostic sink.
    pub(crate) fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        log::warn(format!("SGF parser error: {message}"));
        Self { kind, message }
    }

    pub(crate) fn structural(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Structural, message)
    }

    pub(crate) fn selection(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Selection, message)
    }

    pub(crate) fn semantic(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Semantic, message)
    }

    /// Prefixes the message. The error was already reported when built.
    pub(crate) fn context(self, prefix: &str) -> Self {
        Self {
            kind: self.kind,
            message: format!("{prefix}: {}", self.message),
        }
    }
}

impl fmt::Display for SgfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for SgfError {}
