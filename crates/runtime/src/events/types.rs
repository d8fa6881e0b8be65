//! Events dispatched on a combatant's bus.

use std::sync::Arc;

use battle_core::Resource;

use super::bus::BusEvent;
use crate::action::Action;
use crate::api::{Result, RuntimeError};
use crate::combatant::Combatant;
use crate::content::{StatusEffect, Usable, UsableItem};

/// What caused a change to a combatant.
#[derive(Clone, Debug)]
pub enum Cause {
    /// A basic or elemental attack by the given combatant.
    Attack(Combatant),
    /// A move, item, or mask used by `user`.
    Usable { user: Combatant, usable: Usable },
    /// A status effect acting on its bearer.
    Status(Arc<StatusEffect>),
    /// Anything else, described in free text.
    Other(String),
}

/// Event kinds listeners register for.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum EventKind {
    BeginTurn,
    EndTurn,
    BeginRound,
    EndRound,
    Damage,
    Heal,
    KnockOut,
    Revive,
    StatusApplied,
    StatusRemoved,
    BeforeAffected,
    AfterAffected,
    Flee,
    Given,
}

/// Mutable data carried by a [`BattlerEvent`].
///
/// Listeners rewrite these fields in place; the operation that dispatched
/// the event reads them back once the chain completes.
#[derive(Clone, Debug)]
pub enum EventPayload {
    BeginTurn { action: Action },
    EndTurn { action: Action },
    BeginRound,
    EndRound,
    Damage {
        amount: f64,
        resource: Resource,
        cause: Option<Cause>,
    },
    Heal {
        amount: f64,
        resource: Resource,
        cause: Option<Cause>,
    },
    KnockOut { cause: Option<Cause> },
    Revive { hp: f64, cause: Option<Cause> },
    StatusApplied {
        status: Arc<StatusEffect>,
        turns: u32,
    },
    StatusRemoved {
        status: Arc<StatusEffect>,
        forced: bool,
    },
    BeforeAffected { action: Action },
    AfterAffected { action: Action },
    Flee { success: bool },
    Given {
        giver: Combatant,
        item: Arc<UsableItem>,
    },
}

impl EventPayload {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::BeginTurn { .. } => EventKind::BeginTurn,
            Self::EndTurn { .. } => EventKind::EndTurn,
            Self::BeginRound => EventKind::BeginRound,
            Self::EndRound => EventKind::EndRound,
            Self::Damage { .. } => EventKind::Damage,
            Self::Heal { .. } => EventKind::Heal,
            Self::KnockOut { .. } => EventKind::KnockOut,
            Self::Revive { .. } => EventKind::Revive,
            Self::StatusApplied { .. } => EventKind::StatusApplied,
            Self::StatusRemoved { .. } => EventKind::StatusRemoved,
            Self::BeforeAffected { .. } => EventKind::BeforeAffected,
            Self::AfterAffected { .. } => EventKind::AfterAffected,
            Self::Flee { .. } => EventKind::Flee,
            Self::Given { .. } => EventKind::Given,
        }
    }
}

/// An event about one combatant.
#[derive(Clone, Debug)]
pub struct BattlerEvent {
    /// The combatant whose bus carries the event.
    pub combatant: Combatant,
    pub instantaneous: bool,
    pub payload: EventPayload,
}

impl BattlerEvent {
    pub fn new(combatant: Combatant, instantaneous: bool, payload: EventPayload) -> Self {
        Self {
            combatant,
            instantaneous,
            payload,
        }
    }

    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }

    /// The action carried by turn and affected events.
    pub fn action(&self) -> Option<&Action> {
        match &self.payload {
            EventPayload::BeginTurn { action }
            | EventPayload::EndTurn { action }
            | EventPayload::BeforeAffected { action }
            | EventPayload::AfterAffected { action } => Some(action),
            _ => None,
        }
    }

    pub fn action_mut(&mut self) -> Option<&mut Action> {
        match &mut self.payload {
            EventPayload::BeginTurn { action }
            | EventPayload::EndTurn { action }
            | EventPayload::BeforeAffected { action }
            | EventPayload::AfterAffected { action } => Some(action),
            _ => None,
        }
    }

    /// Takes the carried action out of the event.
    pub fn into_action(self) -> Result<Action> {
        let kind = self.kind();
        match self.payload {
            EventPayload::BeginTurn { action }
            | EventPayload::EndTurn { action }
            | EventPayload::BeforeAffected { action }
            | EventPayload::AfterAffected { action } => Ok(action),
            _ => Err(RuntimeError::EventKindChanged {
                expected: "action-carrying event".to_owned(),
                found: kind.to_string(),
            }),
        }
    }
}

impl BusEvent for BattlerEvent {
    type Kind = EventKind;

    fn kind(&self) -> EventKind {
        self.payload.kind()
    }

    fn instantaneous(&self) -> bool {
        self.instantaneous
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::test_support::template;
    use crate::content::{Item, Usable};

    #[test]
    fn given_events_name_the_item_when_logged() {
        let giver = Combatant::new(template());
        let Some(Item::Usable(potion)) = giver.inventory().into_iter().next() else {
            panic!("template carries a potion");
        };
        let event = BattlerEvent::new(
            giver.clone(),
            true,
            EventPayload::Given {
                giver,
                item: Arc::clone(&potion),
            },
        );

        let logged = format!("{event:?}");
        assert!(logged.contains("UsableItem"));
        assert!(logged.contains("Potion"));
        assert_eq!(format!("{}", Usable::Item(potion)), "Potion");
        assert_eq!(event.kind(), EventKind::Given);
    }
}
