//! Demo content: a party of heroes against a pack of monsters.

use std::sync::Arc;

use battle_core::{Element, ElementKind, Resource, StatCollection};
use battle_runtime::content::{
    EquipItem, EquipSlot, Item, ItemInfo, SpecialMove, StatusEffect, TargetArity, TargetSide,
    Template, UsableItem, effect_fn, hooks_fn,
};
use battle_runtime::{BattlerEvent, Cause, Combatant, EventKind, EventPayload, handler_fn};

fn stats(hp: i32, nova: i32, attack: i32, defense: i32, speed: i32) -> StatCollection {
    StatCollection {
        attack,
        defense,
        speed,
        ..StatCollection::with_pools(hp, nova)
    }
}

fn fire() -> Arc<Element> {
    Arc::new(
        Element::new(ElementKind::Fire, "Fire")
            .with_multiplier(ElementKind::Ice, 2.0)
            .with_multiplier(ElementKind::Water, 0.5)
            .with_cost_multiplier(2.0),
    )
}

fn ice() -> Arc<Element> {
    Arc::new(Element::new(ElementKind::Ice, "Ice").with_multiplier(ElementKind::Fire, 0.5))
}

/// Deals 2 damage at the end of every round it is applied.
fn poison() -> Arc<StatusEffect> {
    let tick = handler_fn(|event: BattlerEvent| async move {
        let cause = Cause::Other("Poison".to_owned());
        event
            .combatant
            .damage(2.0, Resource::Hp, Some(cause), event.instantaneous)
            .await?;
        Ok(event)
    });
    let (on, off) = (Arc::clone(&tick), tick);
    Arc::new(
        StatusEffect::new("Poison", 4)
            .with_description("Loses 2 hp at the end of each round")
            .with_hooks(hooks_fn(
                move |bearer| bearer.subscribe(EventKind::EndRound, Arc::clone(&on), 0, false),
                move |bearer| bearer.unsubscribe(EventKind::EndRound, &off, 0, false),
            )),
    )
}

fn potion() -> Item {
    let potion = UsableItem::new(
        ItemInfo::named("Potion"),
        TargetArity::Single,
        TargetSide::Friendly,
        effect_fn(|user, target, instantaneous| async move {
            let Some(target) = target else {
                return Ok(());
            };
            let cause = Cause::Other(user.name().to_owned());
            target
                .heal(8.0, Resource::Hp, Some(cause), instantaneous)
                .await
        }),
    );
    Item::Usable(Arc::new(potion))
}

fn shield() -> Arc<EquipItem> {
    let guard = handler_fn(|mut event: BattlerEvent| async move {
        if let EventPayload::Damage { amount, .. } = &mut event.payload {
            *amount = (*amount - 1.0).max(0.0);
        }
        Ok(event)
    });
    let (on, off) = (Arc::clone(&guard), guard);
    Arc::new(
        EquipItem::new(ItemInfo::named("Buckler"), EquipSlot::Equipment).with_hooks(hooks_fn(
            move |bearer| bearer.subscribe(EventKind::Damage, Arc::clone(&on), 5, false),
            move |bearer| bearer.unsubscribe(EventKind::Damage, &off, 5, false),
        )),
    )
}

fn knight() -> Arc<Template> {
    Template::builder("Knight")
        .description("Sturdy and patient")
        .stats(stats(40, 6, 7, 6, 4))
        .equipment(shield())
        .item(potion())
        .flee_chance(0.3)
        .build()
}

fn mage() -> Arc<Template> {
    let fireball = SpecialMove::new(
        "Fireball",
        4,
        TargetArity::Multiple,
        TargetSide::Enemy,
        effect_fn(|user, target, instantaneous| async move {
            let Some(target) = target else {
                return Ok(());
            };
            let cause = Cause::Other(user.name().to_owned());
            target
                .damage(5.0, Resource::Hp, Some(cause), instantaneous)
                .await
        }),
    )
    .with_description("Scorches every enemy");

    Template::builder("Mage")
        .stats(stats(24, 16, 4, 2, 6))
        .element(fire())
        .special_move(Arc::new(fireball))
        .item(potion())
        .build()
}

fn goblin() -> Arc<Template> {
    let venom = poison();
    let sting = SpecialMove::new(
        "Sting",
        2,
        TargetArity::Single,
        TargetSide::Enemy,
        effect_fn(move |_, target, instantaneous| {
            let venom = Arc::clone(&venom);
            async move {
                if let Some(target) = target {
                    target.apply_status(&venom, 3, instantaneous).await?;
                }
                Ok(())
            }
        }),
    );

    Template::builder("Goblin")
        .stats(stats(18, 4, 5, 1, 5))
        .special_move(Arc::new(sting))
        .drops(5, 3)
        .build()
}

fn yeti() -> Arc<Template> {
    Template::builder("Yeti")
        .stats(stats(30, 0, 8, 3, 2))
        .element(ice())
        .drops(12, 8)
        .build()
}

/// Heroes for the allied roster, cycling through the party templates.
pub fn allies(count: usize) -> Vec<Combatant> {
    let party = [knight(), mage()];
    party
        .iter()
        .cycle()
        .take(count)
        .map(|template| Combatant::hero(Arc::clone(template)))
        .collect()
}

pub fn foes(count: usize) -> Vec<Combatant> {
    let pack = [goblin(), yeti(), goblin()];
    pack.iter()
        .cycle()
        .take(count)
        .map(|template| Combatant::new(Arc::clone(template)))
        .collect()
}
