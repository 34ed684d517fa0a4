//! Domain error model.

use thiserror::Error;

/// Domain-level error.
///
/// Raised while turning untrusted input (headers, JSON bodies, store rows)
/// into typed values. Storage and transport failures belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An identifier was invalid (e.g. malformed UUID, non-positive user id).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A record type tag outside the supported hierarchy.
    #[error("unknown record type '{0}'")]
    UnknownRecordType(String),
}

impl DomainError {
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn unknown_record_type(tag: impl Into<String>) -> Self {
        Self::UnknownRecordType(tag.into())
    }
}
