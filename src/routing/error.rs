//! Registration errors.

use thiserror::Error;

/// Raised while registering routes, before any request is processed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("invalid route header '{0}': expected 0x followed by 64 hex characters")]
    InvalidHeader(String),

    #[error("route already added: {0}")]
    DuplicateRoute(String),

    #[error("ambiguous routes: {0}")]
    AmbiguousRoute(String),

    #[error("invalid address '{0}': expected 0x followed by 40 hex characters")]
    InvalidAddress(String),

    #[error("invalid route '{0}'")]
    InvalidRoute(String),

    #[error("{0} handler already registered")]
    HandlerAlreadySet(&'static str),

    #[error("well-known rollups addresses are not initialized")]
    UninitializedAddresses,

    #[error("codec error: {0}")]
    Codec(#[from] crate::abi::AbiError),
}
