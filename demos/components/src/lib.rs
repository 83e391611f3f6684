//! Example component definitions for the entity registry.
//!
//! These demonstrate how to define ordinary and singleton components and how
//! to hand a registry its type set through a [`ComponentTypeProvider`].

use entity_component::{
    Component, ComponentKind, ComponentTypeProvider, SingletonComponent, StaticTypeProvider,
};

/// A 2D position in world units.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    #[must_use]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Component for Position {
    fn type_name() -> &'static str {
        "Position"
    }
}

/// A 2D velocity in world units per second.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Velocity {
    pub dx: f32,
    pub dy: f32,
}

impl Velocity {
    /// Zero velocity.
    pub const ZERO: Self = Self { dx: 0.0, dy: 0.0 };

    #[must_use]
    pub fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }
}

impl Component for Velocity {
    fn type_name() -> &'static str {
        "Velocity"
    }
}

/// A health component with current and maximum hit points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Health {
    /// Current hit points.
    pub current: f32,
    /// Maximum hit points.
    pub max: f32,
}

impl Health {
    /// Create a new health component at full HP.
    #[must_use]
    pub fn full(max: f32) -> Self {
        Self { current: max, max }
    }

    /// Returns `true` while HP is above zero.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    /// A copy with `amount` damage applied, clamped to zero.
    #[must_use]
    pub fn damaged(self, amount: f32) -> Self {
        Self {
            current: (self.current - amount).max(0.0),
            ..self
        }
    }
}

impl Component for Health {
    fn type_name() -> &'static str {
        "Health"
    }
}

/// Marks the entity the player controls. Only one entity can hold it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerControlled;

impl Component for PlayerControlled {
    fn type_name() -> &'static str {
        "PlayerControlled"
    }

    fn kind() -> ComponentKind {
        ComponentKind::Singleton
    }
}

impl SingletonComponent for PlayerControlled {}

/// Global simulation clock, attached to whichever entity drives time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorldClock {
    /// Ticks elapsed since the simulation started.
    pub tick: u64,
}

impl Component for WorldClock {
    fn type_name() -> &'static str {
        "WorldClock"
    }

    fn kind() -> ComponentKind {
        ComponentKind::Singleton
    }
}

impl SingletonComponent for WorldClock {}

/// The type set of this crate.
#[must_use]
pub fn provider() -> impl ComponentTypeProvider {
    StaticTypeProvider::new()
        .with::<Position>()
        .with::<Velocity>()
        .with::<Health>()
        .with::<PlayerControlled>()
        .with::<WorldClock>()
}
