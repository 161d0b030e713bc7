//! Codec error definitions.

use thiserror::Error;

/// Errors produced while parsing types or encoding/decoding values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbiError {
    /// Type signature does not follow the grammar.
    #[error("invalid type signature '{signature}': {reason}")]
    Syntax { signature: String, reason: String },

    /// Input is shorter than the type requires.
    #[error("input for {kind} requires {needed} bytes, but only {available} available")]
    Length {
        kind: &'static str,
        needed: usize,
        available: usize,
    },

    /// Value is present but semantically invalid for the type.
    #[error("bad value: {0}")]
    BadValue(String),

    /// Two tuple members resolve to the same name.
    #[error("tuple with repeated field '{0}'")]
    DuplicateField(String),

    /// Payload header differs from the codec's declared header.
    #[error("header does not match: expected {expected}, found {found}")]
    HeaderMismatch { expected: String, found: String },

    /// No codec implementation for this descriptor kind in this mode.
    #[error("{mode} codec not available for type '{ty}'")]
    UnsupportedType { mode: &'static str, ty: String },
}

impl AbiError {
    pub(crate) fn bad_value(msg: impl Into<String>) -> Self {
        AbiError::BadValue(msg.into())
    }

    pub(crate) fn length(kind: &'static str, needed: usize, available: usize) -> Self {
        AbiError::Length {
            kind,
            needed,
            available,
        }
    }
}

/// Result type for codec operations.
pub type AbiResult<T> = Result<T, AbiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AbiError::length("uint", 32, 4);
        assert_eq!(
            err.to_string(),
            "input for uint requires 32 bytes, but only 4 available"
        );
        assert!(AbiError::DuplicateField("0".into()).to_string().contains("'0'"));
    }
}
