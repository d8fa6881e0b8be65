use std::sync::Arc;

use battle_core::{Resource, elemental_cost};
use thiserror::Error;

use super::{Action, ActionKind, Target};
use crate::api::Result;
use crate::content::{Item, TargetArity, Usable};

/// Why an action cannot execute right now.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum Impossible {
    #[error("{0} is knocked out")]
    ExecutorKnockedOut(String),

    #[error("{0} actions need exactly one target")]
    NeedsSingleTarget(String),

    #[error("{executor} has {available} nova but {element} costs {cost}")]
    ElementTooCostly {
        executor: String,
        element: String,
        cost: i32,
        available: i32,
    },

    #[error("use actions need a usable")]
    MissingUsable,

    #[error("{usable} expects {expected} targeting")]
    TargetShapeMismatch {
        usable: String,
        expected: TargetArity,
    },

    #[error("{executor} cannot use {usable}")]
    NotAvailable { executor: String, usable: String },

    #[error("{usable} costs {cost} nova but {executor} has {available}")]
    MoveTooCostly {
        executor: String,
        usable: String,
        cost: i32,
        available: i32,
    },

    #[error("fleeing is not allowed in this battle")]
    FleeDisallowed,

    #[error("only usable items can be given")]
    NotGivable,

    #[error("{recipient} has no room for another item")]
    InventoryFull { recipient: String },
}

impl Action {
    /// Checks whether the action can execute against the current state.
    ///
    /// Passing is always possible and unknown kinds are left for
    /// [`execute`](Action::execute) to reject.
    pub fn is_impossible(&self) -> Option<Impossible> {
        let executor = &self.executor;
        let knocked_out = || Impossible::ExecutorKnockedOut(executor.to_string());

        match &self.kind {
            ActionKind::Pass | ActionKind::Custom(_) => None,
            ActionKind::Attack => {
                if executor.is_knocked_out() {
                    return Some(knocked_out());
                }
                if self.target.single().is_none() {
                    return Some(Impossible::NeedsSingleTarget(self.kind.to_string()));
                }
                let element = self.element.as_ref()?;
                let cost = elemental_cost(element, executor.battle_config().elemental_base_cost);
                let available = executor.stats().current(Resource::Nova);
                (available < cost).then(|| Impossible::ElementTooCostly {
                    executor: executor.to_string(),
                    element: element.name.clone(),
                    cost,
                    available,
                })
            }
            ActionKind::Use => {
                if executor.is_knocked_out() {
                    return Some(knocked_out());
                }
                let Some(usable) = &self.usable else {
                    return Some(Impossible::MissingUsable);
                };
                let shaped = match (usable.arity(), &self.target) {
                    (TargetArity::Single, Target::Single(_)) => true,
                    (TargetArity::Multiple, Target::Multiple(targets)) => !targets.is_empty(),
                    (TargetArity::None, Target::None) => true,
                    _ => false,
                };
                if !shaped {
                    return Some(Impossible::TargetShapeMismatch {
                        usable: usable.name().to_owned(),
                        expected: usable.arity(),
                    });
                }
                self.check_available(usable)
            }
            ActionKind::Flee => {
                if executor.is_knocked_out() {
                    return Some(knocked_out());
                }
                let allowed = executor
                    .session()
                    .is_some_and(|session| session.flee_allowed());
                (!allowed).then_some(Impossible::FleeDisallowed)
            }
            ActionKind::Give => {
                if executor.is_knocked_out() {
                    return Some(knocked_out());
                }
                let Some(recipient) = self.target.single() else {
                    return Some(Impossible::NeedsSingleTarget(self.kind.to_string()));
                };
                let Some(usable @ Usable::Item(_)) = &self.usable else {
                    return Some(Impossible::NotGivable);
                };
                if let Some(reason) = self.check_available(usable) {
                    return Some(reason);
                }
                let capacity = executor.battle_config().inventory_capacity;
                let held = recipient.with_state(|state| state.inventory.len());
                (held >= capacity).then(|| Impossible::InventoryFull {
                    recipient: recipient.to_string(),
                })
            }
        }
    }

    /// Whether the executor knows, holds, or wears `usable`, and can pay for
    /// it.
    fn check_available(&self, usable: &Usable) -> Option<Impossible> {
        let executor = &self.executor;
        let template = executor.template();
        let not_available = || Impossible::NotAvailable {
            executor: executor.to_string(),
            usable: usable.name().to_owned(),
        };

        match usable {
            Usable::Move(special) => {
                if !template.knows_move(special) {
                    return Some(not_available());
                }
                let available = executor.stats().current(Resource::Nova);
                (available < special.cost).then(|| Impossible::MoveTooCostly {
                    executor: executor.to_string(),
                    usable: special.name.clone(),
                    cost: special.cost,
                    available,
                })
            }
            Usable::Item(item) => {
                let held = executor.holds(&Item::Usable(Arc::clone(item)));
                (!held).then(not_available)
            }
            Usable::Mask(mask) => template.mask_index(mask).is_none().then(not_available),
        }
    }

    /// Pays for the action: nova for elemental attacks and moves, the item
    /// for consumables, and switching to a mask that is not yet worn.
    ///
    /// Callers check [`is_impossible`](Action::is_impossible) first.
    pub fn apply_requirements(&self) -> Result<()> {
        let executor = &self.executor;
        match (&self.kind, &self.usable) {
            (ActionKind::Attack, _) => {
                if let Some(element) = &self.element {
                    let cost = elemental_cost(element, executor.battle_config().elemental_base_cost);
                    executor.with_stats_mut(|stats| stats.subtract(Resource::Nova, cost.into()));
                }
            }
            (ActionKind::Use, Some(Usable::Move(special))) => {
                executor.with_stats_mut(|stats| stats.subtract(Resource::Nova, special.cost.into()));
            }
            (ActionKind::Use, Some(Usable::Item(item))) => {
                if item.consumed_on_use {
                    executor.take_item(&Item::Usable(Arc::clone(item)));
                }
            }
            (ActionKind::Use, Some(Usable::Mask(mask))) => {
                if let Some(index) = executor.template().mask_index(mask)
                    && executor.current_mask() != Some(index)
                {
                    executor.equip_mask(Some(index))?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use battle_core::{Element, ElementKind};

    use super::*;
    use crate::combatant::Combatant;
    use crate::combatant::test_support::template;
    use crate::content::{
        ItemInfo, Mask, SpecialMove, TargetSide, Template, UsableItem, no_effect,
    };

    fn special(cost: i32) -> Arc<SpecialMove> {
        Arc::new(SpecialMove::new(
            "Blast",
            cost,
            TargetArity::Single,
            TargetSide::Enemy,
            no_effect(),
        ))
    }

    #[tokio::test]
    async fn attacks_need_a_conscious_executor_and_one_target() {
        let executor = Combatant::new(template());
        let target = Combatant::new(template());

        let attack = Action::attack(executor.clone(), target.clone());
        assert!(attack.is_impossible().is_none());

        let mut untargeted = attack.clone();
        untargeted.target = Target::Multiple(vec![target]);
        assert!(matches!(
            untargeted.is_impossible(),
            Some(Impossible::NeedsSingleTarget(_))
        ));

        executor.knock_out(None, true).await.unwrap();
        assert!(matches!(
            attack.is_impossible(),
            Some(Impossible::ExecutorKnockedOut(_))
        ));
    }

    #[test]
    fn elemental_attacks_cost_nova() {
        let fire = Arc::new(Element::new(ElementKind::Fire, "Fire").with_cost_multiplier(3.0));
        let executor = Combatant::new(template());
        let target = Combatant::new(template());
        let attack = Action::elemental_attack(executor.clone(), target, fire);

        assert!(attack.is_impossible().is_none());
        attack.apply_requirements().unwrap();
        assert_eq!(executor.stats().nova, 7);

        executor.with_stats_mut(|stats| stats.nova = 2);
        assert!(matches!(
            attack.is_impossible(),
            Some(Impossible::ElementTooCostly { cost: 3, .. })
        ));
    }

    #[test]
    fn moves_must_be_known_and_affordable() {
        let known = special(4);
        let template = Template::builder("Mage")
            .special_move(Arc::clone(&known))
            .build();
        let executor = Combatant::new(template);
        let target = Combatant::new(crate::combatant::test_support::template());

        let action = Action::use_on(
            executor.clone(),
            Usable::Move(Arc::clone(&known)),
            Target::Single(target.clone()),
        );
        assert!(action.is_impossible().is_none());
        action.apply_requirements().unwrap();
        assert_eq!(executor.stats().nova, 6);

        executor.with_stats_mut(|stats| stats.nova = 3);
        assert!(matches!(
            action.is_impossible(),
            Some(Impossible::MoveTooCostly { .. })
        ));

        let unknown = Action::use_on(executor, Usable::Move(special(0)), Target::Single(target));
        assert!(matches!(
            unknown.is_impossible(),
            Some(Impossible::NotAvailable { .. })
        ));
    }

    #[test]
    fn target_shape_must_match_arity() {
        let executor = Combatant::new(template());
        let potion = executor.inventory()[0].as_usable().cloned().unwrap();

        let none = Action::use_on(executor.clone(), Usable::Item(Arc::clone(&potion)), Target::None);
        assert!(matches!(
            none.is_impossible(),
            Some(Impossible::TargetShapeMismatch { .. })
        ));

        let empty = Action::use_on(
            executor.clone(),
            Usable::Item(Arc::new(UsableItem::new(
                ItemInfo::named("Bomb"),
                TargetArity::Multiple,
                TargetSide::Enemy,
                no_effect(),
            ))),
            Target::Multiple(Vec::new()),
        );
        assert!(empty.is_impossible().is_some());

        let mut missing = Action::use_on(executor.clone(), Usable::Item(potion), Target::Single(executor));
        missing.usable = None;
        assert_eq!(missing.is_impossible(), Some(Impossible::MissingUsable));
    }

    #[test]
    fn consumable_items_are_spent() {
        let executor = Combatant::new(template());
        let potion = executor.inventory()[0].as_usable().cloned().unwrap();
        let action = Action::use_on(
            executor.clone(),
            Usable::Item(Arc::clone(&potion)),
            Target::Single(executor.clone()),
        );

        action.apply_requirements().unwrap();
        assert!(executor.inventory().is_empty());
        assert!(matches!(
            action.is_impossible(),
            Some(Impossible::NotAvailable { .. })
        ));
    }

    #[test]
    fn using_a_mask_puts_it_on() {
        let first = Arc::new(Mask::new("Hau", TargetArity::None, TargetSide::Friendly, no_effect()));
        let second = Arc::new(Mask::new("Miru", TargetArity::None, TargetSide::Friendly, no_effect()));
        let template = Template::builder("Toa")
            .mask(first)
            .mask(Arc::clone(&second))
            .build();
        let executor = Combatant::new(template);

        let action = Action::use_on(executor.clone(), Usable::Mask(second), Target::None);
        assert!(action.is_impossible().is_none());
        action.apply_requirements().unwrap();
        assert_eq!(executor.current_mask(), Some(1));
    }

    #[test]
    fn fleeing_needs_a_session() {
        let executor = Combatant::new(template());
        assert_eq!(
            Action::flee(executor).is_impossible(),
            Some(Impossible::FleeDisallowed)
        );
    }

    #[test]
    fn pass_is_always_possible() {
        let executor = Combatant::new(template());
        executor.with_state_mut(|state| state.knocked_out = true);
        assert!(Action::pass(executor).is_impossible().is_none());
    }
}
