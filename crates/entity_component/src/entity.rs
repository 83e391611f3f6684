//! Entity type and id generation.
//!
//! An [`Entity`] is a lightweight `u64` identifier plus a generation, with no
//! inherent data. Whether an entity is alive is a property of the registry
//! that issued it, not of the handle: copies of a handle never disagree.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// A unique entity identifier.
///
/// Entities are pure identifiers. Components are attached to entities to
/// give them meaning. The raw id comes from an [`EntityIdGenerator`]; the
/// generation is assigned by the registry and grows each time the same raw id
/// is handed out again, so a handle to a killed entity never matches its
/// successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Entity {
    id: u64,
    generation: u32,
}

impl Entity {
    #[must_use]
    pub const fn new(id: u64, generation: u32) -> Self {
        Self { id, generation }
    }

    /// Create a first-generation entity from a raw `u64` identifier.
    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self::new(id, 0)
    }

    /// Returns the raw `u64` identifier.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.id
    }

    /// How many times the raw id was issued before this handle.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.generation {
            0 => write!(f, "Entity({})", self.id),
            generation => write!(f, "Entity({}v{generation})", self.id),
        }
    }
}

/// Source of ids for newly created entities.
///
/// Implementations are shared between all threads creating entities in one
/// registry and must therefore be `Send + Sync`.
pub trait EntityIdGenerator: Send + Sync + fmt::Debug {
    /// Returns the id for the next entity.
    fn next_id(&self) -> u64;
}

/// Hands out monotonically increasing ids from an atomic counter.
///
/// This is the default generator. Ids start at 0 unless constructed with
/// [`SequentialIdGenerator::starting_at`].
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    next_id: AtomicU64,
}

impl SequentialIdGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Creates a generator whose first id is `first`.
    #[must_use]
    pub fn starting_at(first: u64) -> Self {
        Self {
            next_id: AtomicU64::new(first),
        }
    }

    /// Returns the id the next call to [`EntityIdGenerator::next_id`] will
    /// produce.
    #[must_use]
    pub fn peek(&self) -> u64 {
        self.next_id.load(Ordering::Relaxed)
    }
}

impl EntityIdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

/// Always returns the same id.
///
/// Only useful for tests that need to provoke id reuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantIdGenerator(pub u64);

impl EntityIdGenerator for ConstantIdGenerator {
    fn next_id(&self) -> u64 {
        self.0
    }
}
