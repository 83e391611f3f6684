//! Registry configuration.

use std::fmt;
use std::sync::Arc;

use entity_component::{
    Component, ComponentType, ComponentTypeProvider, EntityIdGenerator, SequentialIdGenerator,
};

use crate::error::RegistryError;
use crate::gate::ExecutionGate;
use crate::registry::Registry;
use crate::store::normalise_shard_amount;

/// Default initial capacity of the entity name table.
pub const DEFAULT_ENTITY_CAPACITY: usize = 10_000;

/// Default initial capacity of each ordinary component map.
pub const DEFAULT_COMPONENT_CAPACITY: usize = 5_000;

/// Default number of shards of each concurrent map.
pub const DEFAULT_SHARD_AMOUNT: usize = 16;

/// Everything needed to build a [`Registry`].
///
/// Only the component types and the id generator affect behaviour. The
/// capacities and the shard amount are sizing hints for the concurrent maps.
#[derive(Clone)]
pub struct RegistryConfig {
    /// The closed set of component types. Fixed for the life of the registry.
    pub component_types: Vec<ComponentType>,
    /// Source of entity ids.
    pub id_generator: Arc<dyn EntityIdGenerator>,
    /// Initial capacity of the entity name table.
    pub entity_capacity: usize,
    /// Initial capacity of each ordinary component map.
    pub component_capacity: usize,
    /// Shards per concurrent map. Rounded up to a power of two, at least 2.
    pub shard_amount: usize,
}

impl RegistryConfig {
    /// A config with no component types and default sizing.
    #[must_use]
    pub fn new() -> Self {
        Self {
            component_types: Vec::new(),
            id_generator: Arc::new(SequentialIdGenerator::new()),
            entity_capacity: DEFAULT_ENTITY_CAPACITY,
            component_capacity: DEFAULT_COMPONENT_CAPACITY,
            shard_amount: DEFAULT_SHARD_AMOUNT,
        }
    }

    /// Add component type `T`.
    #[must_use]
    pub fn with_component<T: Component>(mut self) -> Self {
        self.component_types.push(ComponentType::of::<T>());
        self
    }

    /// Add a batch of component type descriptors.
    #[must_use]
    pub fn with_component_types(mut self, types: impl IntoIterator<Item = ComponentType>) -> Self {
        self.component_types.extend(types);
        self
    }

    /// Add every type supplied by `provider`.
    #[must_use]
    pub fn with_provider(self, provider: &dyn ComponentTypeProvider) -> Self {
        self.with_component_types(provider.component_types())
    }

    /// Replace the default [`SequentialIdGenerator`].
    #[must_use]
    pub fn with_id_generator(mut self, generator: impl EntityIdGenerator + 'static) -> Self {
        self.id_generator = Arc::new(generator);
        self
    }

    #[must_use]
    pub fn with_entity_capacity(mut self, capacity: usize) -> Self {
        self.entity_capacity = capacity;
        self
    }

    #[must_use]
    pub fn with_component_capacity(mut self, capacity: usize) -> Self {
        self.component_capacity = capacity;
        self
    }

    #[must_use]
    pub fn with_shard_amount(mut self, shard_amount: usize) -> Self {
        self.shard_amount = shard_amount;
        self
    }

    /// The shard amount actually handed to the concurrent maps.
    #[must_use]
    pub fn effective_shard_amount(&self) -> usize {
        normalise_shard_amount(self.shard_amount)
    }

    /// Build a bare [`Registry`].
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateTypeHash`] if two configured types
    /// share a name hash.
    pub fn build_registry(self) -> Result<Registry, RegistryError> {
        Registry::new(self)
    }

    /// Build a registry and wrap it in its [`ExecutionGate`].
    ///
    /// # Errors
    ///
    /// See [`RegistryConfig::build_registry`].
    pub fn build(self) -> Result<ExecutionGate, RegistryError> {
        self.build_registry().map(ExecutionGate::new)
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RegistryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryConfig")
            .field(
                "component_types",
                &self.component_types.iter().map(ComponentType::name).collect::<Vec<_>>(),
            )
            .field("id_generator", &self.id_generator)
            .field("entity_capacity", &self.entity_capacity)
            .field("component_capacity", &self.component_capacity)
            .field("shard_amount", &self.shard_amount)
            .finish()
    }
}
