use std::fmt;
use std::sync::Arc;

use super::hooks::{BearerHooks, no_hooks};
use super::usable::UsableItem;
use crate::combatant::Combatant;

/// Shop and inventory metadata shared by every kind of item.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ItemInfo {
    pub name: String,
    pub description: String,
    pub buy_price: u32,
    pub sell_price: u32,
    pub can_drop: bool,
    pub can_sell: bool,
    pub destroy_on_drop: bool,
}

impl ItemInfo {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            can_drop: true,
            can_sell: true,
            ..Self::default()
        }
    }
}

/// Which equipment slot an item occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum EquipSlot {
    Weapon,
    Equipment,
    Accessory,
}

/// A weapon, piece of equipment, or accessory.
pub struct EquipItem {
    pub info: ItemInfo,
    pub slot: EquipSlot,
    hooks: Arc<dyn BearerHooks>,
}

impl EquipItem {
    pub fn new(info: ItemInfo, slot: EquipSlot) -> Self {
        Self {
            info,
            slot,
            hooks: no_hooks(),
        }
    }

    #[must_use]
    pub fn with_hooks(mut self, hooks: Arc<dyn BearerHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn init(&self, bearer: &Combatant) {
        self.hooks.init(bearer);
    }

    pub fn deinit(&self, bearer: &Combatant) {
        self.hooks.deinit(bearer);
    }
}

impl fmt::Debug for EquipItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EquipItem")
            .field("name", &self.info.name)
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}

/// An inventory entry.
#[derive(Clone)]
pub enum Item {
    /// Key items and other things with no battle use.
    Plain(Arc<ItemInfo>),
    Usable(Arc<UsableItem>),
    Equip(Arc<EquipItem>),
}

impl Item {
    pub fn info(&self) -> &ItemInfo {
        match self {
            Self::Plain(info) => info,
            Self::Usable(item) => &item.info,
            Self::Equip(item) => &item.info,
        }
    }

    pub fn name(&self) -> &str {
        &self.info().name
    }

    pub fn as_usable(&self) -> Option<&Arc<UsableItem>> {
        match self {
            Self::Usable(item) => Some(item),
            _ => None,
        }
    }

    /// Identity comparison: same variant and same allocation.
    pub fn same_as(&self, other: &Item) -> bool {
        match (self, other) {
            (Self::Plain(a), Self::Plain(b)) => Arc::ptr_eq(a, b),
            (Self::Usable(a), Self::Usable(b)) => Arc::ptr_eq(a, b),
            (Self::Equip(a), Self::Equip(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let variant = match self {
            Self::Plain(_) => "Plain",
            Self::Usable(_) => "Usable",
            Self::Equip(_) => "Equip",
        };
        f.debug_tuple(variant).field(&self.name()).finish()
    }
}
