use std::sync::Arc;

use super::Combatant;
use crate::action::{Action, Target};
use crate::content::{Item, TargetArity, TargetSide, Usable};

impl Combatant {
    /// Members of this combatant's roster, including itself. Outside a
    /// session that is just the combatant.
    pub fn friends(&self) -> Vec<Combatant> {
        match self.session().zip(self.side()) {
            Some((session, side)) => session.roster(side),
            None => vec![self.clone()],
        }
    }

    /// Members of the opposing roster. Empty outside a session.
    pub fn enemies(&self) -> Vec<Combatant> {
        match self.session().zip(self.side()) {
            Some((session, side)) => session.roster(side.opposite()),
            None => Vec::new(),
        }
    }

    fn targets_on(&self, side: TargetSide) -> Vec<Combatant> {
        match side {
            TargetSide::Friendly => self.friends(),
            TargetSide::Enemy => self.enemies(),
        }
    }

    /// Expands a usable into concrete actions.
    ///
    /// Single-target usables yield one action per combatant on the usable's
    /// side, multi-target usables one action aimed at that whole side, and
    /// untargeted usables one action with no target.
    pub fn get_use_targets(&self, usable: &Usable, instantaneous: bool) -> Vec<Action> {
        let build = |target: Target| {
            Action::use_on(self.clone(), usable.clone(), target).instantaneous(instantaneous)
        };
        match usable.arity() {
            TargetArity::Single => self
                .targets_on(usable.side())
                .into_iter()
                .map(|target| build(Target::Single(target)))
                .collect(),
            TargetArity::Multiple => vec![build(Target::Multiple(self.targets_on(usable.side())))],
            TargetArity::None => vec![build(Target::None)],
        }
    }

    /// Every legal action for this combatant's turn.
    ///
    /// One plain attack per enemy, one elemental attack per enemy per
    /// affinity, every known move, held usable item, and the worn mask
    /// expanded by [`get_use_targets`](Self::get_use_targets), and a pass.
    /// Impossible actions are dropped.
    pub fn get_all_actions(&self, instantaneous: bool) -> Vec<Action> {
        let enemies = self.enemies();
        let template = Arc::clone(self.template());
        let mut actions = Vec::new();

        for enemy in &enemies {
            actions.push(Action::attack(self.clone(), enemy.clone()).instantaneous(instantaneous));
        }
        for element in &template.elements {
            for enemy in &enemies {
                actions.push(
                    Action::elemental_attack(self.clone(), enemy.clone(), Arc::clone(element))
                        .instantaneous(instantaneous),
                );
            }
        }

        let mut usables: Vec<Usable> = template.moves.iter().cloned().map(Usable::Move).collect();
        usables.extend(
            self.inventory()
                .iter()
                .filter_map(Item::as_usable)
                .cloned()
                .map(Usable::Item),
        );
        if let Some(mask) = self.current_mask().and_then(|i| template.masks.get(i)) {
            usables.push(Usable::Mask(Arc::clone(mask)));
        }
        for usable in &usables {
            actions.extend(self.get_use_targets(usable, instantaneous));
        }

        actions.push(Action::pass(self.clone()).instantaneous(instantaneous));
        actions.retain(|action| action.is_impossible().is_none());
        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionKind;
    use crate::combatant::test_support::template;
    use crate::content::{ItemInfo, Mask, UsableItem, no_effect};

    #[test]
    fn outside_a_session_only_self_is_friendly() {
        let combatant = Combatant::new(template());
        let potion = combatant.inventory()[0].as_usable().cloned().unwrap();

        let actions = combatant.get_use_targets(&Usable::Item(potion), true);
        assert_eq!(actions.len(), 1);
        assert!(matches!(&actions[0].target, Target::Single(target) if *target == combatant));
    }

    #[test]
    fn arity_shapes_the_expansion() {
        let combatant = Combatant::new(template());
        let splash = Usable::Item(Arc::new(UsableItem::new(
            ItemInfo::named("Splash"),
            TargetArity::Multiple,
            TargetSide::Enemy,
            no_effect(),
        )));
        let aura = Usable::Mask(Arc::new(Mask::new(
            "Aura",
            TargetArity::None,
            TargetSide::Friendly,
            no_effect(),
        )));

        let multi = combatant.get_use_targets(&splash, true);
        assert_eq!(multi.len(), 1);
        assert!(matches!(&multi[0].target, Target::Multiple(targets) if targets.is_empty()));

        let none = combatant.get_use_targets(&aura, true);
        assert_eq!(none.len(), 1);
        assert!(matches!(none[0].target, Target::None));
    }

    #[test]
    fn lone_combatant_can_use_items_or_pass() {
        let combatant = Combatant::new(template());
        let kinds: Vec<ActionKind> = combatant
            .get_all_actions(true)
            .into_iter()
            .map(|action| action.kind)
            .collect();
        assert_eq!(kinds, [ActionKind::Use, ActionKind::Pass]);
    }
}
