//! Common error infrastructure for summon-core.
//!
//! This module provides shared types and traits used across all error types in
//! the crate. Component errors (e.g., [`crate::EquipError`],
//! [`crate::RegistryError`]) are defined next to the component they guard.
//!
//! # Design Principles
//!
//! - **Explicit Results**: every mutating call returns a `Result`; nothing in
//!   ordinary control flow panics
//! - **Severity Classification**: errors are categorized for recovery strategies
//! - **Stable Codes**: each variant maps to a `&'static str` code for metrics
//!   and tests

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the caller may retry, possibly after a confirmation step
/// - **Validation**: invalid input that should be rejected without retry
/// - **Internal**: unexpected state inconsistencies that require investigation
/// - **Fatal**: unrecoverable errors indicating corrupted state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error - can retry with same or alternative input.
    ///
    /// Examples: cross-creature conflict awaiting confirmation
    Recoverable,

    /// Validation error - invalid input, should not retry without changes.
    ///
    /// Examples: item not found, not enough potential points
    Validation,

    /// Internal error - unexpected state inconsistency.
    ///
    /// Examples: forward and reverse relation maps disagree
    Internal,

    /// Fatal error - state corrupted, cannot continue.
    ///
    /// Examples: identifier space exhausted
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all summon-core errors.
///
/// # Implementation Guidelines
///
/// - All error enums should implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait EngineError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Default implementation uses the error type name.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
