// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Error taxonomy for ledger operations.
//!
//! Every domain failure falls into one of five kinds; unexpected storage
//! failures are wrapped rather than exposed verbatim. All errors are terminal
//! for the operation that raised them.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    /// Missing or malformed required input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Entity absent, or present but outside the caller's visibility.
    #[error("{entity} not found: {identifier}")]
    NotFound {
        entity: &'static str,
        identifier: String,
    },

    /// Entity visible but the caller lacks mutation rights.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Duplicate code, in-use delete, or category cycle.
    #[error("conflict: {0}")]
    Conflict(String),

    /// No conversion rate could be resolved for a currency pair.
    #[error("no conversion rate from {from} to {to}")]
    Conversion { from: String, to: String },

    /// Unexpected storage failure; never a substitute for a domain kind.
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

/// Stable category for programmatic handling (the outer layer maps these to
/// transport status codes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Forbidden,
    Conflict,
    Conversion,
    Internal,
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Conversion { .. } => ErrorKind::Conversion,
            Self::Storage(_) => ErrorKind::Internal,
        }
    }

    pub fn not_found(entity: &'static str, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            identifier: identifier.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
