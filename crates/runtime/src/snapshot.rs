//! Serializable combatant state.
//!
//! Content is not serialized: a snapshot names its template, statuses, and
//! items, and a [`ContentCatalog`] resolves those names back to the shared
//! definitions on restore.

use std::collections::HashMap;
use std::sync::Arc;

use battle_core::StatCollection;
use serde::{Deserialize, Serialize};

use crate::api::{Result, RuntimeError};
use crate::combatant::Combatant;
use crate::content::{AppliedStatusEffect, Item, StatusEffect, Template};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub name: String,
    pub turns_remaining: u32,
}

/// Everything about a combatant that survives between battles.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CombatantSnapshot {
    pub template: String,
    pub stats: StatCollection,
    pub statuses: Vec<StatusSnapshot>,
    pub inventory: Vec<String>,
    pub current_mask: Option<usize>,
    pub knocked_out: bool,
    pub fled: bool,
    pub hero: bool,
    pub money: i32,
}

/// Name-indexed content used to restore snapshots.
#[derive(Default)]
pub struct ContentCatalog {
    templates: HashMap<String, Arc<Template>>,
    statuses: HashMap<String, Arc<StatusEffect>>,
    items: HashMap<String, Item>,
}

impl ContentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(mut self, template: Arc<Template>) -> Self {
        self.templates.insert(template.name.clone(), template);
        self
    }

    pub fn with_status(mut self, status: Arc<StatusEffect>) -> Self {
        self.statuses.insert(status.name.clone(), status);
        self
    }

    pub fn with_item(mut self, item: Item) -> Self {
        self.items.insert(item.name().to_owned(), item);
        self
    }

    pub fn template(&self, name: &str) -> Result<Arc<Template>> {
        lookup(&self.templates, "template", name)
    }

    pub fn status(&self, name: &str) -> Result<Arc<StatusEffect>> {
        lookup(&self.statuses, "status", name)
    }

    pub fn item(&self, name: &str) -> Result<Item> {
        lookup(&self.items, "item", name)
    }
}

fn lookup<T: Clone>(table: &HashMap<String, T>, kind: &'static str, name: &str) -> Result<T> {
    table
        .get(name)
        .cloned()
        .ok_or_else(|| RuntimeError::UnknownContent {
            kind,
            name: name.to_owned(),
        })
}

impl Combatant {
    pub fn snapshot(&self) -> CombatantSnapshot {
        self.with_state(|state| CombatantSnapshot {
            template: self.template().name.clone(),
            stats: state.stats.clone(),
            statuses: state
                .statuses
                .iter()
                .map(|applied| StatusSnapshot {
                    name: applied.status.name.clone(),
                    turns_remaining: applied.turns_remaining,
                })
                .collect(),
            inventory: state
                .inventory
                .iter()
                .map(|item| item.name().to_owned())
                .collect(),
            current_mask: state.current_mask,
            knocked_out: state.knocked_out,
            fled: state.fled,
            hero: state.is_hero,
            money: state.money,
        })
    }

    /// Rebuilds a combatant from a snapshot.
    ///
    /// The template's gear is equipped as on creation, the snapshot's mask is
    /// worn, and each restored status runs its `init` hook. The saved stats
    /// already reflect every hook, so they are installed last and replace
    /// whatever the hooks changed. No events are dispatched.
    pub fn restore(snapshot: &CombatantSnapshot, catalog: &ContentCatalog) -> Result<Combatant> {
        snapshot.stats.validate()?;
        let template = catalog.template(&snapshot.template)?;
        let statuses = snapshot
            .statuses
            .iter()
            .map(|saved| -> Result<AppliedStatusEffect> {
                Ok(AppliedStatusEffect {
                    status: catalog.status(&saved.name)?,
                    turns_remaining: saved.turns_remaining,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let inventory = snapshot
            .inventory
            .iter()
            .map(|name| catalog.item(name))
            .collect::<Result<Vec<_>>>()?;

        let combatant = Combatant::new(template);
        combatant.equip_mask(snapshot.current_mask)?;
        combatant.with_state_mut(|state| state.statuses = statuses.clone());
        for applied in &statuses {
            applied.status.init(&combatant);
        }
        combatant.with_state_mut(|state| {
            state.stats = snapshot.stats.clone();
            state.inventory = inventory;
            state.knocked_out = snapshot.knocked_out;
            state.fled = snapshot.fled;
            state.is_hero = snapshot.hero;
            state.money = snapshot.money;
        });
        Ok(combatant)
    }
}
