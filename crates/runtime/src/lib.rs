//! Turn-based battle engine.
//!
//! Combatants own an interceptor [`EventBus`]: every mutation (damage,
//! healing, statuses, turns) is dispatched as a [`BattlerEvent`] that
//! listeners may rewrite or reject before it applies. A [`BattleSession`]
//! groups combatants into two rosters and drives rounds, asking each
//! combatant's [`ActionProvider`] for an [`Action`] and resolving the
//! actions in turn order.
//!
//! Modules are organized by responsibility:
//! - [`events`] hosts the bus and the event vocabulary
//! - [`content`] defines shared templates, moves, items, masks, and statuses
//! - [`combatant`] implements the per-combatant operations
//! - [`action`] validates and executes actions
//! - [`session`] drives rounds and reports outcomes
//! - [`api`] exposes the seams hosts plug into and the error type
//! - [`timeline`] provides frame-driven playback for presentation
//! - [`snapshot`] persists combatants between battles
pub mod action;
pub mod api;
pub mod combatant;
pub mod config;
pub mod content;
pub mod events;
pub mod session;
pub mod snapshot;
pub mod timeline;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use action::{Action, ActionKind, Impossible, RANDOM_DRAWS, Target};
pub use api::{
    ActionProvider, AggressiveActionProvider, Cue, InstantPresenter, PassActionProvider,
    Presenter, RandomActionProvider, Result, RuntimeError, ScriptedActionProvider,
    TimelinePresenter,
};
pub use combatant::{Combatant, CombatantId};
pub use config::SessionConfig;
pub use events::{
    BattlerEvent, BusEvent, Cause, EventBus, EventHandler, EventKind, EventPayload, SessionEvent,
    handler_fn,
};
pub use session::{BattleSession, BattleSessionBuilder, SessionStatus, Side};
pub use snapshot::{CombatantSnapshot, ContentCatalog, StatusSnapshot};
pub use timeline::{Timeline, TimelinePlayback};

/// Locks `mutex`, recovering the data if a previous holder panicked.
///
/// State mutations never leave a guard across an await point, so a
/// poisoned lock still holds consistent data.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
