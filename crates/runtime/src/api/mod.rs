//! Public runtime API surface.
//!
//! Gathers the seams consumers plug into (providers for intent, presenters
//! for animation) together with the crate-wide error type.

pub mod errors;
pub mod presenter;
pub mod providers;

pub use errors::{Result, RuntimeError};
pub use presenter::{Cue, InstantPresenter, Presenter, TimelinePresenter};
pub use providers::{
    ActionProvider, AggressiveActionProvider, PassActionProvider, RandomActionProvider,
    ScriptedActionProvider,
};
