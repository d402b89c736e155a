//! Error handling for CNCForge
//!
//! Only contract violations are errors. Malformed program content is
//! reported as warnings next to a complete result instead.
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Program-level contract errors
///
/// Raised before any processing happens; no partial result is produced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProgramError {
    /// Program text is empty or holds no executable lines
    #[error("Program is empty")]
    Empty,

    /// Controller identifier outside the accepted set
    #[error("Unknown controller '{name}' (expected one of: {expected})")]
    UnknownController {
        /// The identifier that was supplied.
        name: String,
        /// Comma separated list of accepted identifiers.
        expected: String,
    },
}

/// Optimization option errors
///
/// Produced by the options builder when a combination of flags is
/// internally inconsistent or a value is outside its range.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptionsError {
    /// Flags that cannot be enabled together, or for this controller
    #[error("Incompatible options: {0}")]
    Incompatible(String),

    /// A numeric option is outside its valid range
    #[error("Option '{name}' out of range: {value} (valid: {min}..{max})")]
    OutOfRange {
        /// The option name.
        name: String,
        /// The rejected value.
        value: f64,
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },

    /// Preset name not recognized
    #[error("Unknown preset '{0}'")]
    UnknownPreset(String),
}

/// Main error type for CNCForge
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Program contract error
    #[error(transparent)]
    Program(#[from] ProgramError),

    /// Options error
    #[error(transparent)]
    Options(#[from] OptionsError),
}

impl Error {
    /// Check if this is a program contract error
    pub fn is_program_error(&self) -> bool {
        matches!(self, Error::Program(_))
    }

    /// Check if this is an options error
    pub fn is_options_error(&self) -> bool {
        matches!(self, Error::Options(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_error_display() {
        assert_eq!(ProgramError::Empty.to_string(), "Program is empty");

        let err = ProgramError::UnknownController {
            name: "sinumerik".to_string(),
            expected: "fanuc, generic".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unknown controller 'sinumerik' (expected one of: fanuc, generic)"
        );
    }

    #[test]
    fn test_options_error_display() {
        let err = OptionsError::OutOfRange {
            name: "decimal_places".to_string(),
            value: 9.0,
            min: 0.0,
            max: 6.0,
        };
        assert_eq!(
            err.to_string(),
            "Option 'decimal_places' out of range: 9 (valid: 0..6)"
        );

        let err = OptionsError::UnknownPreset("turbo".to_string());
        assert_eq!(err.to_string(), "Unknown preset 'turbo'");
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = ProgramError::Empty.into();
        assert!(err.is_program_error());
        assert!(!err.is_options_error());

        let err: Error = OptionsError::Incompatible("x".to_string()).into();
        assert!(err.is_options_error());
        assert_eq!(err.to_string(), "Incompatible options: x");
    }
}
