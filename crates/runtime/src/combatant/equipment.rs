use std::sync::Arc;

use battle_core::CoreError;
use tracing::debug;

use super::{Combatant, CombatantState};
use crate::api::Result;
use crate::content::{EquipItem, EquipSlot};

impl Combatant {
    pub fn weapon(&self) -> Option<Arc<EquipItem>> {
        self.with_state(|state| state.weapon.clone())
    }

    pub fn equipment(&self) -> Option<Arc<EquipItem>> {
        self.with_state(|state| state.equipment.clone())
    }

    pub fn accessory(&self) -> Option<Arc<EquipItem>> {
        self.with_state(|state| state.accessory.clone())
    }

    pub fn current_mask(&self) -> Option<usize> {
        self.with_state(|state| state.current_mask)
    }

    /// Equips a weapon (or clears the slot with `None`) and returns the
    /// previous one. The outgoing item's `deinit` runs before the incoming
    /// item's `init`.
    pub fn equip_weapon(&self, weapon: Option<Arc<EquipItem>>) -> Option<Arc<EquipItem>> {
        self.swap_slot(EquipSlot::Weapon, weapon)
    }

    pub fn equip_equipment(&self, equipment: Option<Arc<EquipItem>>) -> Option<Arc<EquipItem>> {
        self.swap_slot(EquipSlot::Equipment, equipment)
    }

    pub fn equip_accessory(&self, accessory: Option<Arc<EquipItem>>) -> Option<Arc<EquipItem>> {
        self.swap_slot(EquipSlot::Accessory, accessory)
    }

    fn swap_slot(
        &self,
        slot: EquipSlot,
        incoming: Option<Arc<EquipItem>>,
    ) -> Option<Arc<EquipItem>> {
        let outgoing = self.with_state_mut(|state| {
            let field = slot_mut(state, slot);
            std::mem::replace(field, incoming.clone())
        });

        if let Some(item) = &outgoing {
            item.deinit(self);
        }
        if let Some(item) = &incoming {
            item.init(self);
            debug!(
                target: "battle::combatant",
                combatant = %self,
                %slot,
                item = %item.info.name,
                "Equipped"
            );
        }
        outgoing
    }

    /// Wears the mask at `index` in the template's mask list, or takes the
    /// current one off with `None`. Returns the previous index.
    pub fn equip_mask(&self, index: Option<usize>) -> Result<Option<usize>> {
        let masks = &self.template().masks;
        if let Some(index) = index
            && index >= masks.len()
        {
            return Err(CoreError::MaskIndexOutOfRange {
                index,
                available: masks.len(),
            }
            .into());
        }

        let previous = self.with_state_mut(|state| std::mem::replace(&mut state.current_mask, index));
        if let Some(mask) = previous.and_then(|i| masks.get(i)) {
            mask.deinit(self);
        }
        if let Some(mask) = index.and_then(|i| masks.get(i)) {
            mask.init(self);
        }
        Ok(previous)
    }
}

fn slot_mut(state: &mut CombatantState, slot: EquipSlot) -> &mut Option<Arc<EquipItem>> {
    match slot {
        EquipSlot::Weapon => &mut state.weapon,
        EquipSlot::Equipment => &mut state.equipment,
        EquipSlot::Accessory => &mut state.accessory,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::combatant::test_support::template;
    use crate::content::{
        BearerHooks, ItemInfo, Mask, TargetArity, TargetSide, Template, hooks_fn, no_effect,
    };

    #[derive(Default)]
    struct Counter {
        init: AtomicUsize,
        deinit: AtomicUsize,
    }

    fn counted(counter: &Arc<Counter>) -> Arc<dyn BearerHooks> {
        let on_init = Arc::clone(counter);
        let on_deinit = Arc::clone(counter);
        hooks_fn(
            move |_| {
                on_init.init.fetch_add(1, Ordering::SeqCst);
            },
            move |_| {
                on_deinit.deinit.fetch_add(1, Ordering::SeqCst);
            },
        )
    }

    #[test]
    fn swapping_gear_runs_hooks() {
        let counter = Arc::new(Counter::default());
        let sword = Arc::new(
            EquipItem::new(ItemInfo::named("Sword"), EquipSlot::Weapon).with_hooks(counted(&counter)),
        );
        let combatant = Combatant::new(template());

        assert!(combatant.equip_weapon(Some(Arc::clone(&sword))).is_none());
        assert_eq!(counter.init.load(Ordering::SeqCst), 1);

        let previous = combatant.equip_weapon(None);
        assert!(previous.is_some_and(|item| Arc::ptr_eq(&item, &sword)));
        assert_eq!(counter.deinit.load(Ordering::SeqCst), 1);
        assert!(combatant.weapon().is_none());
    }

    #[test]
    fn hooks_can_modify_the_bearer() {
        let ring = Arc::new(
            EquipItem::new(ItemInfo::named("Ring"), EquipSlot::Accessory).with_hooks(hooks_fn(
                |bearer: &Combatant| bearer.with_stats_mut(|stats| stats.defense += 3),
                |bearer: &Combatant| bearer.with_stats_mut(|stats| stats.defense -= 3),
            )),
        );
        let combatant = Combatant::new(template());

        combatant.equip_accessory(Some(ring));
        assert_eq!(combatant.stats().defense, 4);
        combatant.equip_accessory(None);
        assert_eq!(combatant.stats().defense, 1);
    }

    #[test]
    fn template_mask_is_worn_on_creation() {
        let counter = Arc::new(Counter::default());
        let mask = Arc::new(
            Mask::new("Hau", TargetArity::None, TargetSide::Friendly, no_effect())
                .with_hooks(counted(&counter)),
        );
        let other = Arc::new(Mask::new(
            "Kakama",
            TargetArity::None,
            TargetSide::Friendly,
            no_effect(),
        ));
        let template = Template::builder("Masked").mask(mask).mask(other).build();
        let combatant = Combatant::new(template);

        assert_eq!(combatant.current_mask(), Some(0));
        assert_eq!(counter.init.load(Ordering::SeqCst), 1);

        assert_eq!(combatant.equip_mask(Some(1)).unwrap(), Some(0));
        assert_eq!(counter.deinit.load(Ordering::SeqCst), 1);
        assert!(combatant.equip_mask(Some(5)).is_err());
        assert_eq!(combatant.current_mask(), Some(1));
    }
}
