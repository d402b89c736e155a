//! Recoverable diagnostics
//!
//! Malformed but recoverable input never aborts a pass. A safe default is
//! substituted and one of these is recorded instead.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A warning tied to a source line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseWarning {
    /// 1-based source line
    pub line: usize,
    pub message: String,
}

impl ParseWarning {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::warn!("line {}: {}", line, message);
        Self { line, message }
    }
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}
