//! Live combatants.
//!
//! A [`Combatant`] is a cheap-to-clone handle; clones refer to the same
//! fighter. Mutable state sits behind a short-lived mutex that is never held
//! across an `.await` or while content hooks run, so listeners and hooks can
//! read and write any combatant, including the one being resolved.

mod equipment;
mod resources;
mod status;
mod targets;
mod turn;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use battle_core::{BattleConfig, Contender, StatCollection};

use crate::api::ActionProvider;
use crate::content::{AppliedStatusEffect, EquipItem, Item, Template};
use crate::events::{BattlerEvent, EventBus};
use crate::lock;
use crate::session::{BattleSession, SessionShared, Side};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique combatant identifier, used for logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CombatantId(pub u64);

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Everything about a combatant that changes during battle.
#[derive(Clone, Debug)]
pub struct CombatantState {
    pub stats: StatCollection,
    pub statuses: Vec<AppliedStatusEffect>,
    pub weapon: Option<Arc<EquipItem>>,
    pub equipment: Option<Arc<EquipItem>>,
    pub accessory: Option<Arc<EquipItem>>,
    /// Index into the template's masks.
    pub current_mask: Option<usize>,
    pub inventory: Vec<Item>,
    pub knocked_out: bool,
    pub fled: bool,
    /// Heroes act first on speed ties and are never pruned from rosters.
    pub is_hero: bool,
    pub money: i32,
}

struct CombatantInner {
    id: CombatantId,
    template: Arc<Template>,
    state: Mutex<CombatantState>,
    bus: EventBus<BattlerEvent>,
    session: Mutex<Weak<SessionShared>>,
    provider: Mutex<Option<Arc<dyn ActionProvider>>>,
}

/// A live fighter built from a [`Template`].
#[derive(Clone)]
pub struct Combatant {
    inner: Arc<CombatantInner>,
}

impl Combatant {
    /// Builds a combatant from a template.
    ///
    /// Stats and inventory are copied. The template's weapon, equipment,
    /// and accessory are equipped and the first mask, if any, is worn; each
    /// runs its `init` hook.
    pub fn new(template: Arc<Template>) -> Self {
        let state = CombatantState {
            stats: template.stats.clone(),
            statuses: Vec::new(),
            weapon: None,
            equipment: None,
            accessory: None,
            current_mask: None,
            inventory: template.inventory.clone(),
            knocked_out: false,
            fled: false,
            is_hero: false,
            money: 0,
        };
        let combatant = Self {
            inner: Arc::new(CombatantInner {
                id: CombatantId(NEXT_ID.fetch_add(1, Ordering::Relaxed)),
                template: Arc::clone(&template),
                state: Mutex::new(state),
                bus: EventBus::new(),
                session: Mutex::new(Weak::new()),
                provider: Mutex::new(None),
            }),
        };

        combatant.equip_weapon(template.weapon.clone());
        combatant.equip_equipment(template.equipment.clone());
        combatant.equip_accessory(template.accessory.clone());
        if let Some(mask) = template.masks.first() {
            combatant.with_state_mut(|state| state.current_mask = Some(0));
            mask.init(&combatant);
        }
        combatant
    }

    /// Builds a hero: never pruned and first on speed ties.
    pub fn hero(template: Arc<Template>) -> Self {
        let combatant = Self::new(template);
        combatant.set_hero(true);
        combatant
    }

    pub fn id(&self) -> CombatantId {
        self.inner.id
    }

    pub fn name(&self) -> &str {
        &self.inner.template.name
    }

    pub fn template(&self) -> &Arc<Template> {
        &self.inner.template
    }

    /// Reads the mutable state under its lock.
    pub fn with_state<R>(&self, f: impl FnOnce(&CombatantState) -> R) -> R {
        f(&lock(&self.inner.state))
    }

    /// Writes the mutable state under its lock. `f` must not call back into
    /// this combatant's state.
    pub fn with_state_mut<R>(&self, f: impl FnOnce(&mut CombatantState) -> R) -> R {
        f(&mut lock(&self.inner.state))
    }

    pub fn with_stats_mut<R>(&self, f: impl FnOnce(&mut StatCollection) -> R) -> R {
        self.with_state_mut(|state| f(&mut state.stats))
    }

    /// Copy of the current stats.
    pub fn stats(&self) -> StatCollection {
        self.with_state(|state| state.stats.clone())
    }

    /// Copy of the applied statuses.
    pub fn statuses(&self) -> Vec<AppliedStatusEffect> {
        self.with_state(|state| state.statuses.clone())
    }

    /// Copy of the inventory.
    pub fn inventory(&self) -> Vec<Item> {
        self.with_state(|state| state.inventory.clone())
    }

    pub fn is_knocked_out(&self) -> bool {
        self.with_state(|state| state.knocked_out)
    }

    pub fn has_fled(&self) -> bool {
        self.with_state(|state| state.fled)
    }

    pub fn is_hero(&self) -> bool {
        self.with_state(|state| state.is_hero)
    }

    pub fn set_hero(&self, hero: bool) {
        self.with_state_mut(|state| state.is_hero = hero);
    }

    pub(crate) fn set_fled(&self, fled: bool) {
        self.with_state_mut(|state| state.fled = fled);
    }

    /// Whether the session should keep this combatant while knocked out.
    pub fn survives_knockout(&self) -> bool {
        self.inner.template.survives_knockout || self.is_hero()
    }

    /// The session this combatant currently fights in, if it is still alive.
    pub fn session(&self) -> Option<BattleSession> {
        lock(&self.inner.session)
            .upgrade()
            .map(BattleSession::from_shared)
    }

    pub(crate) fn attach(&self, session: &BattleSession) {
        *lock(&self.inner.session) = session.downgrade();
    }

    /// Which roster this combatant is in.
    pub fn side(&self) -> Option<Side> {
        self.session().and_then(|session| session.side_of(self))
    }

    /// Battle tunables of the current session, or the defaults outside one.
    pub fn battle_config(&self) -> BattleConfig {
        self.session()
            .map(|session| session.config().battle.clone())
            .unwrap_or_default()
    }

    /// Overrides the session's default provider for this combatant.
    pub fn set_provider(&self, provider: Arc<dyn ActionProvider>) {
        *lock(&self.inner.provider) = Some(provider);
    }

    pub(crate) fn provider(&self) -> Option<Arc<dyn ActionProvider>> {
        lock(&self.inner.provider).clone()
    }

    pub(crate) fn bus(&self) -> &EventBus<BattlerEvent> {
        &self.inner.bus
    }

    /// Removes the first inventory entry matching `item`. Returns whether
    /// one was found.
    pub fn take_item(&self, item: &Item) -> bool {
        self.with_state_mut(|state| {
            match state.inventory.iter().position(|held| held.same_as(item)) {
                Some(index) => {
                    state.inventory.remove(index);
                    true
                }
                None => false,
            }
        })
    }

    pub fn give_item(&self, item: Item) {
        self.with_state_mut(|state| state.inventory.push(item));
    }

    pub fn holds(&self, item: &Item) -> bool {
        self.with_state(|state| state.inventory.iter().any(|held| held.same_as(item)))
    }
}

impl PartialEq for Combatant {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Combatant {}

impl fmt::Debug for Combatant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Combatant")
            .field("id", &self.inner.id)
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Combatant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name(), self.inner.id)
    }
}

impl Contender for Combatant {
    fn speed(&self) -> i32 {
        self.with_state(|state| state.stats.speed)
    }

    fn is_hero(&self) -> bool {
        Combatant::is_hero(self)
    }

    fn is_knocked_out(&self) -> bool {
        Combatant::is_knocked_out(self)
    }

    fn has_fled(&self) -> bool {
        Combatant::has_fled(self)
    }
}
