//! Unified error types surfaced by the runtime API.
//!
//! Every fallible engine operation returns [`RuntimeError`]. Event handlers
//! reject an operation by returning one, and the rejection travels back up
//! through the triad, the turn, and the round driver unchanged.
use std::path::PathBuf;

use battle_core::{BattleError, CoreError, ErrorSeverity};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("{combatant} cannot take a turn for an action executed by {executor}")]
    ExecutorMismatch { combatant: String, executor: String },

    #[error(
        "event triad lengths differ: {entities} entities, {before} before events, \
         {after} after events, {executions} executions"
    )]
    TriadLengthMismatch {
        entities: usize,
        before: usize,
        after: usize,
        executions: usize,
    },

    #[error("{expected} handler returned a {found} event")]
    EventKindChanged { expected: String, found: String },

    #[error("rejected: {0}")]
    Rejected(String),

    #[error("invalid action type `{0}`")]
    InvalidActionType(String),

    #[error("{action} action has no target to resolve against")]
    MissingTarget { action: String },

    #[error("no actions to execute")]
    NoActions,

    #[error("no active combatants available for turn scheduling")]
    NoActiveCombatants,

    #[error("battle session is already over")]
    SessionOver,

    #[error("battle did not finish within {0} rounds")]
    RoundLimitReached(u32),

    #[error("action provider task failed")]
    ProviderJoin(#[source] tokio::task::JoinError),

    #[error("timeline playback aborted")]
    TimelineAborted,

    #[error("unknown {kind} `{name}` in snapshot")]
    UnknownContent { kind: &'static str, name: String },

    #[error("failed to read config file {path}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config")]
    ParseConfig(#[from] toml::de::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl RuntimeError {
    /// Shorthand used by event handlers and use effects to veto an operation.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected(reason.into())
    }
}

impl BattleError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Rejected(_) | Self::TimelineAborted => ErrorSeverity::Recoverable,
            Self::ExecutorMismatch { .. }
            | Self::InvalidActionType(_)
            | Self::MissingTarget { .. }
            | Self::NoActions
            | Self::SessionOver
            | Self::UnknownContent { .. }
            | Self::ParseConfig(_) => ErrorSeverity::Validation,
            Self::TriadLengthMismatch { .. }
            | Self::EventKindChanged { .. }
            | Self::NoActiveCombatants
            | Self::RoundLimitReached(_) => ErrorSeverity::Internal,
            Self::ProviderJoin(_) | Self::ReadConfig { .. } => ErrorSeverity::Fatal,
            Self::Core(err) => err.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::ExecutorMismatch { .. } => "RUNTIME_EXECUTOR_MISMATCH",
            Self::TriadLengthMismatch { .. } => "RUNTIME_TRIAD_LENGTH",
            Self::EventKindChanged { .. } => "RUNTIME_EVENT_KIND_CHANGED",
            Self::Rejected(_) => "RUNTIME_REJECTED",
            Self::InvalidActionType(_) => "RUNTIME_INVALID_ACTION_TYPE",
            Self::MissingTarget { .. } => "RUNTIME_MISSING_TARGET",
            Self::NoActions => "RUNTIME_NO_ACTIONS",
            Self::NoActiveCombatants => "RUNTIME_NO_ACTIVE_COMBATANTS",
            Self::SessionOver => "RUNTIME_SESSION_OVER",
            Self::RoundLimitReached(_) => "RUNTIME_ROUND_LIMIT",
            Self::ProviderJoin(_) => "RUNTIME_PROVIDER_JOIN",
            Self::TimelineAborted => "RUNTIME_TIMELINE_ABORTED",
            Self::UnknownContent { .. } => "RUNTIME_UNKNOWN_CONTENT",
            Self::ReadConfig { .. } => "RUNTIME_READ_CONFIG",
            Self::ParseConfig(_) => "RUNTIME_PARSE_CONFIG",
            Self::Core(err) => err.error_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_is_recoverable() {
        let err = RuntimeError::rejected("shielded");
        assert_eq!(err.to_string(), "rejected: shielded");
        assert!(err.severity().is_recoverable());
        assert_eq!(err.error_code(), "RUNTIME_REJECTED");
    }

    #[test]
    fn core_errors_keep_their_code() {
        let err = RuntimeError::from(CoreError::MaskIndexOutOfRange {
            index: 3,
            available: 1,
        });
        assert_eq!(err.error_code(), "CORE_MASK_INDEX_OUT_OF_RANGE");
    }
}
