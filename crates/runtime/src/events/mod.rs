//! Event plumbing for the battle engine.
//!
//! Two kinds of events live here:
//! - [`BattlerEvent`]s travel through a combatant's [`EventBus`], where
//!   listeners can rewrite or veto them before the operation applies
//! - [`SessionEvent`]s are broadcast by the session after the fact

mod bus;
mod handler;
mod session;
mod types;

pub use bus::{BusEvent, EventBus};
pub use handler::{EventHandler, handler_fn};
pub use session::SessionEvent;
pub use types::{BattlerEvent, Cause, EventKind, EventPayload};
