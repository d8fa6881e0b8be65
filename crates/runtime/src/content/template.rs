use std::fmt;
use std::sync::Arc;

use battle_core::{Element, StatCollection};

use super::item::{EquipItem, Item};
use super::status::StatusEffect;
use super::usable::{Mask, SpecialMove};

/// Immutable description every combatant is built from.
///
/// Templates are shared behind `Arc`; a combatant copies what it mutates
/// (stats, inventory, equipped gear) and reads the rest in place.
pub struct Template {
    pub name: String,
    pub description: String,
    pub stats: StatCollection,
    pub elements: Vec<Arc<Element>>,
    pub masks: Vec<Arc<Mask>>,
    pub moves: Vec<Arc<SpecialMove>>,
    pub weapon: Option<Arc<EquipItem>>,
    pub equipment: Option<Arc<EquipItem>>,
    pub accessory: Option<Arc<EquipItem>>,
    pub inventory: Vec<Item>,
    pub immunities: Vec<Arc<StatusEffect>>,
    /// `None` falls back to the session's default flee chance.
    pub flee_chance: Option<f64>,
    /// Stays in the roster while knocked out instead of being removed at
    /// round end.
    pub survives_knockout: bool,
    pub drop_xp: i32,
    pub drop_money: i32,
}

impl Template {
    pub fn builder(name: impl Into<String>) -> TemplateBuilder {
        TemplateBuilder::new(name)
    }

    pub fn is_immune_to(&self, status: &Arc<StatusEffect>) -> bool {
        self.immunities
            .iter()
            .any(|immunity| Arc::ptr_eq(immunity, status))
    }

    pub fn knows_move(&self, special: &Arc<SpecialMove>) -> bool {
        self.moves.iter().any(|known| Arc::ptr_eq(known, special))
    }

    pub fn mask_index(&self, mask: &Arc<Mask>) -> Option<usize> {
        self.masks.iter().position(|worn| Arc::ptr_eq(worn, mask))
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("name", &self.name)
            .field("stats", &self.stats)
            .field("masks", &self.masks.len())
            .field("moves", &self.moves.len())
            .field("inventory", &self.inventory)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Template`].
pub struct TemplateBuilder {
    template: Template,
}

impl TemplateBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            template: Template {
                name: name.into(),
                description: String::new(),
                stats: StatCollection::default(),
                elements: Vec::new(),
                masks: Vec::new(),
                moves: Vec::new(),
                weapon: None,
                equipment: None,
                accessory: None,
                inventory: Vec::new(),
                immunities: Vec::new(),
                flee_chance: None,
                survives_knockout: false,
                drop_xp: 0,
                drop_money: 0,
            },
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.template.description = description.into();
        self
    }

    pub fn stats(mut self, stats: StatCollection) -> Self {
        self.template.stats = stats;
        self
    }

    pub fn element(mut self, element: Arc<Element>) -> Self {
        self.template.elements.push(element);
        self
    }

    pub fn mask(mut self, mask: Arc<Mask>) -> Self {
        self.template.masks.push(mask);
        self
    }

    pub fn special_move(mut self, special: Arc<SpecialMove>) -> Self {
        self.template.moves.push(special);
        self
    }

    pub fn weapon(mut self, weapon: Arc<EquipItem>) -> Self {
        self.template.weapon = Some(weapon);
        self
    }

    pub fn equipment(mut self, equipment: Arc<EquipItem>) -> Self {
        self.template.equipment = Some(equipment);
        self
    }

    pub fn accessory(mut self, accessory: Arc<EquipItem>) -> Self {
        self.template.accessory = Some(accessory);
        self
    }

    pub fn item(mut self, item: Item) -> Self {
        self.template.inventory.push(item);
        self
    }

    pub fn immunity(mut self, status: Arc<StatusEffect>) -> Self {
        self.template.immunities.push(status);
        self
    }

    pub fn flee_chance(mut self, chance: f64) -> Self {
        self.template.flee_chance = Some(chance);
        self
    }

    pub fn survives_knockout(mut self, survives: bool) -> Self {
        self.template.survives_knockout = survives;
        self
    }

    pub fn drops(mut self, xp: i32, money: i32) -> Self {
        self.template.drop_xp = xp;
        self.template.drop_money = money;
        self
    }

    pub fn build(self) -> Arc<Template> {
        Arc::new(self.template)
    }
}
