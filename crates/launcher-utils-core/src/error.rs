// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for the launcher-utils bridge.

use std::fmt;

use thiserror::Error;

/// Which kind of symbol a failed resolution was looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Class,
    StaticMethod,
    Method,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolKind::Class => f.write_str("class"),
            SymbolKind::StaticMethod => f.write_str("static method"),
            SymbolKind::Method => f.write_str("method"),
        }
    }
}

/// Top-level error type for all bridge operations.
#[derive(Debug, Error)]
pub enum BridgeError {
    // -- Environment --
    /// The calling thread has no attached managed-runtime environment.
    /// Attach the thread and try again.
    #[error("no managed-runtime environment is attached to this thread")]
    EnvironmentUnavailable,

    #[error("environment error: {0}")]
    Environment(String),

    // -- Dispatch --
    #[error("{kind} not found: {name}")]
    SymbolNotFound { kind: SymbolKind, name: String },

    #[error("managed runtime exception: {0}")]
    RuntimeException(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("operation failed: {0}")]
    OperationFailed(String),

    // -- Configuration / persistence --
    #[error("configuration error: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BridgeError {
    /// True when the failure only means "this thread is not attached", so the
    /// caller may attach and retry.
    pub fn is_detached(&self) -> bool {
        matches!(self, BridgeError::EnvironmentUnavailable)
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detached_is_distinct_from_other_failures() {
        assert!(BridgeError::EnvironmentUnavailable.is_detached());
        assert!(!BridgeError::Environment("GetEnv returned -3".into()).is_detached());
        assert!(!BridgeError::RuntimeException("boom".into()).is_detached());
    }

    #[test]
    fn symbol_not_found_names_the_symbol() {
        let err = BridgeError::SymbolNotFound {
            kind: SymbolKind::StaticMethod,
            name: "com/example/Utils.vibrate(J)V".into(),
        };
        assert_eq!(
            err.to_string(),
            "static method not found: com/example/Utils.vibrate(J)V"
        );
    }
}
