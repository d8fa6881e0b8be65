//! Deterministic battle rules shared by the runtime and tools.
//!
//! `battle-core` defines the canonical numbers of a battle: stat collections
//! and their clamping rules, damage and elemental formulas, tunables, and the
//! turn-order and win-condition policy. Nothing here awaits or touches I/O;
//! the asynchronous resolution engine lives in `battle-runtime`.
pub mod config;
pub mod element;
pub mod error;
pub mod formula;
pub mod order;
pub mod stats;

pub use config::BattleConfig;
pub use element::{Element, ElementKind};
pub use error::{BattleError, CoreError, ErrorSeverity};
pub use formula::{calculate_damage, elemental_cost, elemental_damage, elemental_multiplier};
pub use order::{Contender, Outcome, turn_order, win_condition};
pub use stats::{Resource, StatCollection, round_amount};
