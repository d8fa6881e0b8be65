//! Shared, immutable battle content.
//!
//! Templates, moves, items, masks, and status effects are defined once and
//! shared behind `Arc` by every combatant that refers to them. Identity is
//! the allocation: two separately built statuses with the same name are
//! different statuses.

mod hooks;
mod item;
mod status;
mod template;
mod usable;

pub use hooks::{BearerHooks, NoHooks, hooks_fn};
pub use item::{EquipItem, EquipSlot, Item, ItemInfo};
pub use status::{AppliedStatusEffect, StatusEffect};
pub use template::{Template, TemplateBuilder};
pub use usable::{
    EffectFuture, Mask, SpecialMove, TargetArity, TargetSide, Usable, UsableItem, UseEffect,
    effect_fn, no_effect,
};
