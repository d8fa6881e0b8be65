use std::sync::Arc;

use battle_core::{Resource, calculate_damage, elemental_damage, elemental_multiplier};
use tracing::{debug, info};

use super::{Action, ActionKind, Target};
use crate::api::{Cue, Result, RuntimeError};
use crate::combatant::Combatant;
use crate::content::{Item, Usable};
use crate::events::{Cause, EventPayload};

impl Action {
    /// Resolves the action.
    ///
    /// Impossible actions are logged and skipped. Otherwise requirements are
    /// paid and the kind-specific resolution runs. Listener rejections
    /// propagate; an unknown kind is an error.
    pub async fn execute(&mut self) -> Result<()> {
        if let Some(reason) = self.is_impossible() {
            debug!(
                target: "battle::action",
                executor = %self.executor,
                action = %self.kind,
                %reason,
                "Skipping impossible action"
            );
            return Ok(());
        }
        self.apply_requirements()?;

        match self.kind.clone() {
            ActionKind::Attack => self.execute_attack().await,
            ActionKind::Use => self.execute_use().await,
            ActionKind::Flee => self.execute_flee().await,
            ActionKind::Give => self.execute_give().await,
            ActionKind::Pass => Ok(()),
            ActionKind::Custom(name) => Err(RuntimeError::InvalidActionType(name)),
        }
    }

    fn missing_target(&self) -> RuntimeError {
        RuntimeError::MissingTarget {
            action: self.kind.to_string(),
        }
    }

    /// Damage against the current single target, elemental multipliers
    /// included.
    fn compute_damage(&self, target: &Combatant) -> i64 {
        let config = self.executor.battle_config();
        let attack = self.executor.stats().attack;
        let defense = target.stats().defense;
        let base = calculate_damage(attack.into(), defense.into(), config.damage_constant);

        match &self.element {
            Some(element) => {
                let defending = &target.template().elements;
                let multiplier = elemental_multiplier(element, defending.iter().map(Arc::as_ref));
                elemental_damage(base, multiplier)
            }
            None => base,
        }
    }

    async fn execute_attack(&mut self) -> Result<()> {
        let target = self.target.single().cloned().ok_or_else(|| self.missing_target())?;
        self.damage = Some(self.compute_damage(&target));

        let instantaneous = self.instantaneous;
        let presenter = self.executor.session().map(|session| session.presenter());
        let before = target.event(
            instantaneous,
            EventPayload::BeforeAffected {
                action: self.clone(),
            },
        );

        let original = target.clone();
        let after = target
            .dispatch_event_triad(before, move |event| async move {
                let action = event.into_action()?;
                // listeners may have redirected the attack
                let victim = action
                    .target
                    .single()
                    .cloned()
                    .ok_or_else(|| action.missing_target())?;
                let damage = action.damage.unwrap_or(1);

                if !action.instantaneous
                    && let Some(presenter) = presenter
                {
                    presenter
                        .present(Cue::Attack {
                            attacker: action.executor.clone(),
                            target: victim.clone(),
                            damage,
                        })
                        .await?;
                }
                victim
                    .damage(
                        damage as f64,
                        Resource::Hp,
                        Some(Cause::Attack(action.executor.clone())),
                        action.instantaneous,
                    )
                    .await?;
                info!(
                    target: "battle::action",
                    attacker = %action.executor,
                    target = %victim,
                    damage,
                    "Attack landed"
                );
                Ok(original.event(instantaneous, EventPayload::AfterAffected { action }))
            })
            .await?;

        *self = after.into_action()?;
        Ok(())
    }

    async fn execute_use(&mut self) -> Result<()> {
        let usable = self.usable.clone().ok_or_else(|| self.missing_target())?;
        let instantaneous = self.instantaneous;
        let user = self.executor.clone();

        match self.target.clone() {
            Target::None => usable.apply(user, None, instantaneous).await,
            Target::Single(target) => {
                let before = target.event(
                    instantaneous,
                    EventPayload::BeforeAffected {
                        action: self.clone(),
                    },
                );
                let original = target.clone();
                let after = target
                    .dispatch_event_triad(before, move |event| async move {
                        let action = event.into_action()?;
                        let victim = action.target.single().cloned();
                        usable.apply(user, victim, instantaneous).await?;
                        Ok(original.event(instantaneous, EventPayload::AfterAffected { action }))
                    })
                    .await?;
                *self = after.into_action()?;
                Ok(())
            }
            Target::Multiple(targets) => {
                let before = targets
                    .iter()
                    .map(|target| {
                        target.event(
                            instantaneous,
                            EventPayload::BeforeAffected {
                                action: self.clone(),
                            },
                        )
                    })
                    .collect();
                let after = targets
                    .iter()
                    .map(|target| {
                        target.event(
                            instantaneous,
                            EventPayload::AfterAffected {
                                action: self.clone(),
                            },
                        )
                    })
                    .collect();
                let executions = targets
                    .iter()
                    .map(|target| usable.apply(user.clone(), Some(target.clone()), instantaneous))
                    .collect();

                Combatant::dispatch_multiple_event_triads(&targets, before, after, executions)
                    .await?;
                Ok(())
            }
        }
    }

    async fn execute_flee(&mut self) -> Result<()> {
        let executor = self.executor.clone();
        let chance = executor
            .template()
            .flee_chance
            .unwrap_or(executor.battle_config().default_flee_chance);
        let success = self.randoms[0] < chance;

        let event = executor
            .dispatch(executor.event(self.instantaneous, EventPayload::Flee { success }))
            .await?;
        let success = matches!(event.payload, EventPayload::Flee { success: true });
        if success {
            executor.set_fled(true);
        }
        info!(target: "battle::action", combatant = %executor, success, "Flee attempt");
        Ok(())
    }

    async fn execute_give(&mut self) -> Result<()> {
        let recipient = self.target.single().cloned().ok_or_else(|| self.missing_target())?;
        let Some(Usable::Item(item)) = self.usable.clone() else {
            return Err(self.missing_target());
        };
        let giver = self.executor.clone();

        recipient
            .dispatch(recipient.event(
                self.instantaneous,
                EventPayload::Given {
                    giver: giver.clone(),
                    item: item.clone(),
                },
            ))
            .await?;

        let gift = Item::Usable(item);
        if giver.take_item(&gift) {
            recipient.give_item(gift);
            info!(target: "battle::action", %giver, %recipient, "Item given");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use battle_core::{Element, ElementKind, StatCollection};

    use super::*;
    use crate::combatant::test_support::{template, water};
    use crate::content::{ItemInfo, TargetArity, TargetSide, Template, UsableItem, effect_fn};
    use crate::events::{BattlerEvent, EventKind, handler_fn};

    fn defender(defense: i32) -> Combatant {
        let stats = StatCollection {
            defense,
            ..StatCollection::with_pools(10, 10)
        };
        Combatant::new(Template::builder("Wall").stats(stats).build())
    }

    #[tokio::test]
    async fn attack_uses_the_damage_formula() {
        let attacker = Combatant::new(template());
        attacker.with_stats_mut(|stats| stats.attack = 10);
        let target = defender(40);

        let mut action = Action::attack(attacker, target.clone()).instantaneous(true);
        action.execute().await.unwrap();

        assert_eq!(action.damage, Some(2));
        assert_eq!(target.stats().hp, 8);
    }

    #[tokio::test]
    async fn elemental_multiplier_applies() {
        let fire = Arc::new(
            Element::new(ElementKind::Fire, "Fire").with_multiplier(ElementKind::Water, 2.0),
        );
        let attacker = Combatant::new(template());
        attacker.with_stats_mut(|stats| stats.attack = 10);
        let target = Combatant::new(
            Template::builder("Fish")
                .stats(StatCollection {
                    defense: 40,
                    ..StatCollection::with_pools(10, 10)
                })
                .element(water())
                .build(),
        );

        let mut action =
            Action::elemental_attack(attacker.clone(), target.clone(), fire).instantaneous(true);
        action.execute().await.unwrap();

        assert_eq!(action.damage, Some(4));
        assert_eq!(target.stats().hp, 6);
        assert_eq!(attacker.stats().nova, 9);
    }

    #[tokio::test]
    async fn before_affected_can_redirect() {
        let attacker = Combatant::new(template());
        let first = Combatant::new(template());
        let decoy = Combatant::new(template());
        let swap_to = decoy.clone();
        first.subscribe(
            EventKind::BeforeAffected,
            handler_fn(move |mut event: BattlerEvent| {
                let swap_to = swap_to.clone();
                async move {
                    if let Some(action) = event.action_mut() {
                        action.target = Target::Single(swap_to);
                    }
                    Ok(event)
                }
            }),
            0,
            false,
        );

        let mut action = Action::attack(attacker, first.clone()).instantaneous(true);
        action.execute().await.unwrap();

        assert_eq!(first.stats().hp, 10);
        assert!(decoy.stats().hp < 10);
        assert!(matches!(&action.target, Target::Single(t) if *t == decoy));
    }

    #[tokio::test]
    async fn impossible_actions_are_skipped() {
        let attacker = Combatant::new(template());
        let target = Combatant::new(template());
        attacker.knock_out(None, true).await.unwrap();

        let mut action = Action::attack(attacker, target.clone()).instantaneous(true);
        action.execute().await.unwrap();
        assert_eq!(target.stats().hp, 10);
        assert!(action.damage.is_none());
    }

    #[tokio::test]
    async fn custom_kinds_are_rejected() {
        let executor = Combatant::new(template());
        let mut action = Action::new(ActionKind::Custom("dance".into()), executor, Target::None);
        let err = action.execute().await.unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidActionType(name) if name == "dance"));
    }

    #[tokio::test]
    async fn untargeted_use_runs_without_events() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let item = Arc::new(
            UsableItem::new(
                ItemInfo::named("Flare"),
                TargetArity::None,
                TargetSide::Enemy,
                effect_fn(move |_, target, _| {
                    let counter = Arc::clone(&counter);
                    async move {
                        assert!(target.is_none());
                        counter.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    }
                }),
            )
            .with_consumed_on_use(false),
        );
        let executor = Combatant::new(
            Template::builder("Scout")
                .item(Item::Usable(Arc::clone(&item)))
                .build(),
        );

        let mut action =
            Action::use_on(executor.clone(), Usable::Item(item), Target::None).instantaneous(true);
        action.execute().await.unwrap();
        action.execute().await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(executor.inventory().len(), 1);
    }

    #[tokio::test]
    async fn rejected_item_use_fails_the_action() {
        let item = Arc::new(UsableItem::new(
            ItemInfo::named("Dud"),
            TargetArity::Single,
            TargetSide::Friendly,
            effect_fn(|_, target: Option<Combatant>, _| async move {
                match target {
                    Some(_) => Err(RuntimeError::rejected("fizzled")),
                    None => Ok(()),
                }
            }),
        ));
        let executor = Combatant::new(
            Template::builder("Scout")
                .item(Item::Usable(Arc::clone(&item)))
                .build(),
        );
        let mut action = Action::use_on(
            executor.clone(),
            Usable::Item(item),
            Target::Single(executor),
        )
        .instantaneous(true);
        assert!(action.execute().await.is_err());
    }

    #[tokio::test]
    async fn flee_compares_first_random_with_chance() {
        let executor = Combatant::new(template());
        let failed = Action::flee(executor.clone()).with_randoms([0.9, 0.0, 0.0, 0.0]);
        let escaped = Action::flee(executor.clone()).with_randoms([0.2, 0.0, 0.0, 0.0]);

        // outside a session fleeing is impossible and skipped
        failed.clone().execute().await.unwrap();
        assert!(!executor.has_fled());

        failed.clone().execute_flee().await.unwrap();
        assert!(!executor.has_fled());
        escaped.clone().execute_flee().await.unwrap();
        assert!(executor.has_fled());
    }

    #[tokio::test]
    async fn give_moves_the_item() {
        let giver = Combatant::new(template());
        let recipient = Combatant::new(template());
        let potion = giver.inventory()[0].as_usable().cloned().unwrap();

        let mut action = Action::give(giver.clone(), recipient.clone(), potion).instantaneous(true);
        action.execute().await.unwrap();

        assert!(giver.inventory().is_empty());
        assert_eq!(recipient.inventory().len(), 2);
    }
}
