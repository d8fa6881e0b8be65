//! Things a combatant can use in battle: special moves, items, and masks.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;

use super::hooks::{BearerHooks, no_hooks};
use super::item::ItemInfo;
use crate::api::Result;
use crate::combatant::Combatant;

/// Boxed future returned by [`Usable::apply`].
pub type EffectFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// How many combatants a usable affects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum TargetArity {
    Single,
    Multiple,
    /// No target at all, e.g. field effects.
    None,
}

/// Which roster a usable aims at, relative to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum TargetSide {
    Friendly,
    Enemy,
}

/// The behaviour of a usable.
///
/// For multi-target usables the effect runs once per target.
#[async_trait]
pub trait UseEffect: Send + Sync {
    async fn apply(
        &self,
        user: Combatant,
        target: Option<Combatant>,
        instantaneous: bool,
    ) -> Result<()>;
}

struct FnEffect<F>(F);

#[async_trait]
impl<F, Fut> UseEffect for FnEffect<F>
where
    F: Fn(Combatant, Option<Combatant>, bool) -> Fut + Send + Sync,
    Fut: Future<Output = Result<()>> + Send,
{
    async fn apply(
        &self,
        user: Combatant,
        target: Option<Combatant>,
        instantaneous: bool,
    ) -> Result<()> {
        (self.0)(user, target, instantaneous).await
    }
}

/// Wraps an async closure as a use effect.
pub fn effect_fn<F, Fut>(f: F) -> Arc<dyn UseEffect>
where
    F: Fn(Combatant, Option<Combatant>, bool) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    Arc::new(FnEffect(f))
}

/// An effect that does nothing.
pub fn no_effect() -> Arc<dyn UseEffect> {
    effect_fn(|_, _, _| async { Ok(()) })
}

/// A learned technique paid for with nova.
pub struct SpecialMove {
    pub name: String,
    pub description: String,
    pub cost: i32,
    pub arity: TargetArity,
    pub side: TargetSide,
    effect: Arc<dyn UseEffect>,
}

impl SpecialMove {
    pub fn new(
        name: impl Into<String>,
        cost: i32,
        arity: TargetArity,
        side: TargetSide,
        effect: Arc<dyn UseEffect>,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            cost,
            arity,
            side,
            effect,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// An inventory item with an in-battle effect.
pub struct UsableItem {
    pub info: ItemInfo,
    /// Removed from the inventory when used.
    pub consumed_on_use: bool,
    pub arity: TargetArity,
    pub side: TargetSide,
    effect: Arc<dyn UseEffect>,
}

impl UsableItem {
    pub fn new(
        info: ItemInfo,
        arity: TargetArity,
        side: TargetSide,
        effect: Arc<dyn UseEffect>,
    ) -> Self {
        Self {
            info,
            consumed_on_use: true,
            arity,
            side,
            effect,
        }
    }

    #[must_use]
    pub fn with_consumed_on_use(mut self, consumed: bool) -> Self {
        self.consumed_on_use = consumed;
        self
    }
}

/// A wearable mask with a passive part (hooks) and an active part (effect).
pub struct Mask {
    pub name: String,
    pub image: u32,
    pub arity: TargetArity,
    pub side: TargetSide,
    hooks: Arc<dyn BearerHooks>,
    effect: Arc<dyn UseEffect>,
}

impl Mask {
    pub fn new(
        name: impl Into<String>,
        arity: TargetArity,
        side: TargetSide,
        effect: Arc<dyn UseEffect>,
    ) -> Self {
        Self {
            name: name.into(),
            image: 0,
            arity,
            side,
            hooks: no_hooks(),
            effect,
        }
    }

    #[must_use]
    pub fn with_image(mut self, image: u32) -> Self {
        self.image = image;
        self
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

impl fmt::Debug for SpecialMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecialMove")
            .field("name", &self.name)
            .field("cost", &self.cost)
            .field("arity", &self.arity)
            .field("side", &self.side)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for UsableItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UsableItem")
            .field("name", &self.info.name)
            .field("consumed_on_use", &self.consumed_on_use)
            .field("arity", &self.arity)
            .field("side", &self.side)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mask")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .field("side", &self.side)
            .finish_non_exhaustive()
    }
}

/// Anything the `use` action can resolve.
#[derive(Clone)]
pub enum Usable {
    Move(Arc<SpecialMove>),
    Item(Arc<UsableItem>),
    Mask(Arc<Mask>),
}

impl Usable {
    pub fn name(&self) -> &str {
        match self {
            Self::Move(special) => &special.name,
            Self::Item(item) => &item.info.name,
            Self::Mask(mask) => &mask.name,
        }
    }

    pub fn arity(&self) -> TargetArity {
        match self {
            Self::Move(special) => special.arity,
            Self::Item(item) => item.arity,
            Self::Mask(mask) => mask.arity,
        }
    }

    pub fn side(&self) -> TargetSide {
        match self {
            Self::Move(special) => special.side,
            Self::Item(item) => item.side,
            Self::Mask(mask) => mask.side,
        }
    }

    /// Runs the effect once against `target`.
    ///
    /// The future does nothing until awaited, so callers can build a batch of
    /// them up front and sequence them later.
    pub fn apply(
        &self,
        user: Combatant,
        target: Option<Combatant>,
        instantaneous: bool,
    ) -> EffectFuture<'_> {
        let effect = match self {
            Self::Move(special) => &special.effect,
            Self::Item(item) => &item.effect,
            Self::Mask(mask) => &mask.effect,
        };
        effect.apply(user, target, instantaneous)
    }

    /// Identity comparison: same variant and same allocation.
    pub fn same_as(&self, other: &Usable) -> bool {
        match (self, other) {
            (Self::Move(a), Self::Move(b)) => Arc::ptr_eq(a, b),
            (Self::Item(a), Self::Item(b)) => Arc::ptr_eq(a, b),
            (Self::Mask(a), Self::Mask(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Usable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let variant = match self {
            Self::Move(_) => "Move",
            Self::Item(_) => "Item",
            Self::Mask(_) => "Mask",
        };
        f.debug_tuple(variant).field(&self.name()).finish()
    }
}

impl fmt::Display for Usable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
