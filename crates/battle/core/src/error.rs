//! Common error infrastructure for battle-core.
//!
//! Illegal moves are not errors in this crate: they are reported as reasons by
//! the runtime and absorbed. What remains here are malformed content and
//! configuration, which indicate a bug in authored data rather than a bad
//! decision made during play.

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// The caller may retry with a different request.
    Recoverable,

    /// Invalid input that should not be retried without changes.
    Validation,

    /// Unexpected inconsistency between content and state.
    Internal,

    /// The battle cannot continue.
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

/// Common trait for all battle errors.
///
/// Implemented by [`CoreError`] here and by the runtime's error enum so that
/// logging can classify failures uniformly.
pub trait BattleError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Errors raised by malformed content or configuration.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum CoreError {
    /// A mask index does not exist in the template's mask list.
    #[error("mask index {index} out of range for template with {available} masks")]
    MaskIndexOutOfRange { index: usize, available: usize },

    /// A stat collection violates `0 <= current <= max`.
    #[error("invalid stats: {resource} is {current} but maximum is {maximum}")]
    InvalidStats {
        resource: crate::stats::Resource,
        current: i32,
        maximum: i32,
    },

    /// A chance value lies outside `[0, 1]`.
    #[error("{name} must lie within [0, 1], got {value}")]
    ChanceOutOfRange { name: &'static str, value: f64 },

    /// A tunable that must be positive is not.
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },
}

impl BattleError for CoreError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::MaskIndexOutOfRange { .. } => ErrorSeverity::Validation,
            CoreError::InvalidStats { .. } => ErrorSeverity::Internal,
            CoreError::ChanceOutOfRange { .. } | CoreError::NonPositive { .. } => {
                ErrorSeverity::Validation
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            CoreError::MaskIndexOutOfRange { .. } => "CORE_MASK_INDEX_OUT_OF_RANGE",
            CoreError::InvalidStats { .. } => "CORE_INVALID_STATS",
            CoreError::ChanceOutOfRange { .. } => "CORE_CHANCE_OUT_OF_RANGE",
            CoreError::NonPositive { .. } => "CORE_NON_POSITIVE",
        }
    }
}

pub type Result<T> = core::result::Result<T, CoreError>;
