//! Error types for directive parsing and compilation.

use serde::Serialize;
use thiserror::Error;

/// Result type for compile operations.
pub type Result<T> = std::result::Result<T, CompileError>;

/// 1-based position of a token in the directive text, ordered by line then column
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

/// A recoverable error confined to a single directive.
///
/// These are collected alongside the directives that did parse; they never
/// abort a compile.
#[derive(Debug, Clone, Error, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DirectiveError {
    #[error("Unknown command: {command}")]
    UnknownCommand { command: String, location: Location },

    /// Not enough tokens left for the required positions
    #[error("Incomplete command: {command}")]
    Incomplete { command: String, location: Location },

    #[error("{command}: Invalid command arguments {{{token}}}")]
    InvalidArguments {
        command: String,
        token: String,
        /// Offset of the token inside the directive
        position: usize,
        location: Location,
    },

    /// The tokens matched but the validator rejected the bound values
    #[error("Params didn't validate: {{{source_text}}}")]
    ValidationFailed {
        command: String,
        source_text: String,
        reason: Option<String>,
        location: Location,
    },

    #[error("Only one input command is allowed")]
    DuplicateInput { location: Location },
}

impl DirectiveError {
    pub fn location(&self) -> Location {
        match self {
            DirectiveError::UnknownCommand { location, .. }
            | DirectiveError::Incomplete { location, .. }
            | DirectiveError::InvalidArguments { location, .. }
            | DirectiveError::ValidationFailed { location, .. }
            | DirectiveError::DuplicateInput { location } => *location,
        }
    }
}

/// A fatal error that replaces the whole compile output.
#[derive(Debug, Error)]
pub enum CompileError {
    /// Merged crop totals leave no pixels on one axis
    #[error(
        "Crop totals exceed source {axis}: {first_edge} {first}px + {second_edge} {second}px >= {dimension}px"
    )]
    CropExceedsFrame {
        axis: &'static str,
        first_edge: &'static str,
        first: u32,
        second_edge: &'static str,
        second: u32,
        dimension: u32,
    },

    #[error("Invalid resolution: {0} (expected WxH)")]
    InvalidResolution(String),

    #[error("Invalid media descriptor: {0}")]
    Descriptor(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const AT: Location = Location { line: 1, column: 1 };

    #[test]
    fn test_directive_error_display() {
        let err = DirectiveError::UnknownCommand {
            command: "blur".to_string(),
            location: AT,
        };
        assert_eq!(err.to_string(), "Unknown command: blur");

        let err = DirectiveError::InvalidArguments {
            command: "crop".to_string(),
            token: "100".to_string(),
            position: 1,
            location: AT,
        };
        assert_eq!(err.to_string(), "crop: Invalid command arguments {100}");

        let err = DirectiveError::ValidationFailed {
            command: "trim".to_string(),
            source_text: "trim from 10 to 5".to_string(),
            reason: Some("end time must be after start time".to_string()),
            location: AT,
        };
        assert_eq!(
            err.to_string(),
            "Params didn't validate: {trim from 10 to 5}"
        );
    }

    #[test]
    fn test_crop_error_display() {
        let err = CompileError::CropExceedsFrame {
            axis: "width",
            first_edge: "left",
            first: 1000,
            second_edge: "right",
            second: 920,
            dimension: 1920,
        };
        assert_eq!(
            err.to_string(),
            "Crop totals exceed source width: left 1000px + right 920px >= 1920px"
        );
    }
}
