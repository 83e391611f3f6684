//! The entity registry: entity naming and lifecycle plus one store per
//! configured component type.
//!
//! Every operation takes `&self`; the name table and the stores are
//! concurrent maps. That makes single operations safe from any thread, but
//! multi-step changes such as [`Registry::kill_entity`] are only atomic with
//! respect to other jobs run through the
//! [`ExecutionGate`](crate::ExecutionGate). All mutation is expected to go
//! through the gate. Reads outside a job are fine for diagnostics and tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use entity_component::{
    AnyComponent, Component, ComponentType, Entity, EntityIdGenerator, SingletonComponent,
    downcast_arc,
};
use tracing::{debug, info, warn};

use crate::config::RegistryConfig;
use crate::error::RegistryError;
use crate::status::Status;
use crate::store::ComponentStore;
use crate::type_index::TypeIndex;
use crate::view::{ComponentView, EntityView};

/// Display name given to entities created without one.
pub const UNNAMED: &str = "[no name]";

fn display_name(name: Option<&str>) -> String {
    match name {
        Some(name) if !name.is_empty() => name.to_owned(),
        _ => UNNAMED.to_owned(),
    }
}

/// Entities, their names, and their components.
#[derive(Debug)]
pub struct Registry {
    /// Slot addressing for the configured component types.
    index: TypeIndex,
    /// One store per slot, in [`TypeIndex`] order.
    stores: Vec<ComponentStore>,
    /// Display names. Also the authoritative record of which entities exist.
    names: DashMap<Entity, String>,
    /// Latest generation issued per raw id.
    generations: DashMap<u64, u32>,
    id_generator: Arc<dyn EntityIdGenerator>,
}

impl Registry {
    /// Build a registry from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateTypeHash`] if two configured types
    /// share a name hash. No partially built registry is returned.
    pub fn new(config: RegistryConfig) -> Result<Self, RegistryError> {
        let shard_amount = config.effective_shard_amount();
        let index = TypeIndex::new(config.component_types)?;
        let stores = index
            .types()
            .iter()
            .map(|ty| ComponentStore::new(*ty, config.component_capacity, shard_amount))
            .collect();

        info!(
            component_types = index.len(),
            entity_capacity = config.entity_capacity,
            shard_amount,
            "entity registry built"
        );

        Ok(Self {
            index,
            stores,
            names: DashMap::with_capacity_and_shard_amount(config.entity_capacity, shard_amount),
            generations: DashMap::with_capacity_and_shard_amount(
                config.entity_capacity,
                shard_amount,
            ),
            id_generator: config.id_generator,
        })
    }

    /// The configured component types.
    #[must_use]
    pub fn type_index(&self) -> &TypeIndex {
        &self.index
    }

    // -- Entity lifecycle --

    /// Create a new entity. A missing or empty name is replaced by
    /// [`UNNAMED`].
    ///
    /// Never fails. If the id generator hands out a raw id it issued before,
    /// the new entity gets the next generation of that id: handles to the
    /// earlier entity stay distinct from it, and stay dead once killed.
    pub fn create_entity(&self, name: Option<&str>) -> Entity {
        let id = self.id_generator.next_id();
        let generation = match self.generations.entry(id) {
            Entry::Occupied(mut issued) => {
                let next = issued.get().wrapping_add(1);
                *issued.get_mut() = next;
                next
            }
            Entry::Vacant(fresh) => *fresh.insert(0),
        };

        let entity = Entity::new(id, generation);
        self.names.insert(entity, display_name(name));

        if generation > 0 {
            warn!(%entity, "id generator reused a raw id, issued a new generation");
        } else {
            debug!(%entity, "entity created");
        }
        entity
    }

    /// Shorthand for `create_entity(Some(name))`.
    pub fn create_named_entity(&self, name: &str) -> Entity {
        self.create_entity(Some(name))
    }

    /// Kill an entity and detach all of its components.
    ///
    /// Singleton components are only cleared if this entity currently owns
    /// them.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownOrDeadEntity`] if the entity is not
    /// alive in this registry, including when it was already killed.
    pub fn kill_entity(&self, entity: Entity) -> Result<(), RegistryError> {
        if self.names.remove(&entity).is_none() {
            return Err(RegistryError::UnknownOrDeadEntity(entity));
        }

        let detached = self
            .stores
            .iter()
            .filter(|store| store.remove(entity))
            .count();

        debug!(%entity, detached, "entity killed");
        Ok(())
    }

    /// Replace an entity's display name. `None` or an empty name resets it to
    /// [`UNNAMED`].
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownOrDeadEntity`] if the entity is not
    /// alive.
    pub fn set_name(&self, entity: Entity, name: Option<&str>) -> Result<(), RegistryError> {
        let mut current = self
            .names
            .get_mut(&entity)
            .ok_or(RegistryError::UnknownOrDeadEntity(entity))?;
        *current = display_name(name);
        Ok(())
    }

    /// The display name of an entity.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownOrDeadEntity`] if the entity is not
    /// alive.
    pub fn name_of(&self, entity: Entity) -> Result<String, RegistryError> {
        self.names
            .get(&entity)
            .map(|name| name.value().clone())
            .ok_or(RegistryError::UnknownOrDeadEntity(entity))
    }

    /// Returns `true` if `entity` was created by this registry and has not
    /// been killed.
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.names.contains_key(&entity)
    }

    /// Live view of all known entities.
    #[must_use]
    pub fn entities(&self) -> EntityView<'_> {
        EntityView::of_names(&self.names)
    }

    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.names.len()
    }

    // -- Component operations --

    /// Attach `component` to `entity`, replacing a previous component of the
    /// same type.
    ///
    /// For a singleton type this silently moves the singleton away from its
    /// previous owner. Callers that need to react to that must inspect the
    /// old owner themselves.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownOrDeadEntity`] for an entity that is
    /// not alive and [`RegistryError::UnknownComponentType`] for a type that
    /// was not configured.
    pub fn add_component<T: Component>(
        &self,
        entity: Entity,
        component: T,
    ) -> Result<(), RegistryError> {
        let component: Arc<dyn AnyComponent> = Arc::new(component);
        self.add_shared_component(entity, component)
    }

    /// Attach an already shared, type-erased component. The slot is chosen
    /// from the component's runtime type.
    ///
    /// # Errors
    ///
    /// See [`Registry::add_component`].
    pub fn add_shared_component(
        &self,
        entity: Entity,
        component: Arc<dyn AnyComponent>,
    ) -> Result<(), RegistryError> {
        self.ensure_alive(entity)?;
        let slot = self.index.resolve(&component.component_type())?;
        self.stores[slot].put(entity, component);
        Ok(())
    }

    /// The component of type `T` on `entity`, if any.
    ///
    /// # Errors
    ///
    /// See [`Registry::add_component`].
    pub fn get_component<T: Component>(
        &self,
        entity: Entity,
    ) -> Result<Option<Arc<T>>, RegistryError> {
        self.ensure_alive(entity)?;
        let store = self.store_of::<T>()?;
        Ok(store.get(entity).and_then(downcast_arc::<T>))
    }

    /// Returns `true` if `entity` has a component of type `T`.
    ///
    /// # Errors
    ///
    /// See [`Registry::add_component`].
    pub fn has_component<T: Component>(&self, entity: Entity) -> Result<bool, RegistryError> {
        self.ensure_alive(entity)?;
        Ok(self.store_of::<T>()?.contains(entity))
    }

    /// Detach the component of type `T` from `entity`. Does nothing if there
    /// is none.
    ///
    /// # Errors
    ///
    /// See [`Registry::add_component`].
    pub fn remove_component<T: Component>(&self, entity: Entity) -> Result<(), RegistryError> {
        self.remove_component_of_type(entity, &ComponentType::of::<T>())
    }

    /// Detach the component described by `ty` from `entity`. Does nothing if
    /// there is none.
    ///
    /// # Errors
    ///
    /// See [`Registry::add_component`].
    pub fn remove_component_of_type(
        &self,
        entity: Entity,
        ty: &ComponentType,
    ) -> Result<(), RegistryError> {
        self.ensure_alive(entity)?;
        let slot = self.index.resolve(ty)?;
        self.stores[slot].remove(entity);
        Ok(())
    }

    /// Every component attached to `entity`, in slot order.
    ///
    /// Visits every configured type, so this is meant for tooling rather than
    /// hot paths.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownOrDeadEntity`] if the entity is not
    /// alive.
    pub fn all_components_on_entity(
        &self,
        entity: Entity,
    ) -> Result<Vec<Arc<dyn AnyComponent>>, RegistryError> {
        self.ensure_alive(entity)?;
        Ok(self
            .stores
            .iter()
            .filter_map(|store| store.get(entity))
            .collect())
    }

    // -- Queries --

    /// Live view of all components of type `T`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownComponentType`] if `T` was not
    /// configured.
    pub fn all_components_of_type<T: Component>(
        &self,
    ) -> Result<ComponentView<'_, T>, RegistryError> {
        Ok(ComponentView::new(self.store_of::<T>()?))
    }

    /// Live view of the entities holding a component of type `T`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownComponentType`] if `T` was not
    /// configured.
    pub fn find_entities_with_component<T: Component>(
        &self,
    ) -> Result<EntityView<'_>, RegistryError> {
        Ok(EntityView::of_store(self.store_of::<T>()?))
    }

    /// Entities holding a component of every listed type. An empty list
    /// matches every known entity.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownComponentType`] if any listed type was
    /// not configured.
    pub fn find_entities_with_components(
        &self,
        types: &[ComponentType],
    ) -> Result<HashSet<Entity>, RegistryError> {
        let slots = types
            .iter()
            .map(|ty| self.index.resolve(ty))
            .collect::<Result<Vec<_>, _>>()?;

        let Some((first, rest)) = slots.split_first() else {
            return Ok(self.entities().to_set());
        };

        let mut matched: HashSet<Entity> = self.stores[*first].entities().into_iter().collect();
        for slot in rest {
            let store = &self.stores[*slot];
            matched.retain(|entity| store.contains(*entity));
        }
        Ok(matched)
    }

    /// The entity currently owning singleton type `T`, or `None` if nobody
    /// holds it.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownComponentType`] if `T` was not
    /// configured and [`RegistryError::NotASingleton`] if its
    /// [`Component::kind`] is ordinary.
    pub fn find_entity_with_singleton<T: SingletonComponent>(
        &self,
    ) -> Result<Option<Entity>, RegistryError> {
        let store = self.singleton_store_of::<T>()?;
        Ok(store.connection().map(|c| c.entity()))
    }

    /// The current instance of singleton type `T`, or `None` if nobody holds
    /// it.
    ///
    /// # Errors
    ///
    /// See [`Registry::find_entity_with_singleton`].
    pub fn find_singleton_component<T: SingletonComponent>(
        &self,
    ) -> Result<Option<Arc<T>>, RegistryError> {
        let store = self.singleton_store_of::<T>()?;
        Ok(store
            .connection()
            .and_then(|c| downcast_arc::<T>(Arc::clone(c.component()))))
    }

    /// Snapshot of `entity → component` for type `T`. Singleton types yield
    /// at most one entry.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownComponentType`] if `T` was not
    /// configured.
    pub fn component_map<T: Component>(&self) -> Result<HashMap<Entity, Arc<T>>, RegistryError> {
        Ok(self.all_components_of_type::<T>()?.to_map())
    }

    /// Entity and per-type component counts.
    #[must_use]
    pub fn status(&self) -> Status {
        let component_counts: BTreeMap<String, usize> = self
            .stores
            .iter()
            .map(|store| (store.component_type().name().to_owned(), store.len()))
            .collect();
        Status::new(self.names.len(), component_counts)
    }

    fn ensure_alive(&self, entity: Entity) -> Result<(), RegistryError> {
        if self.is_alive(entity) {
            Ok(())
        } else {
            Err(RegistryError::UnknownOrDeadEntity(entity))
        }
    }

    fn store_of<T: Component>(&self) -> Result<&ComponentStore, RegistryError> {
        let slot = self.index.resolve_of::<T>()?;
        Ok(&self.stores[slot])
    }

    fn singleton_store_of<T: SingletonComponent>(&self) -> Result<&ComponentStore, RegistryError> {
        let store = self.store_of::<T>()?;
        if store.component_type().is_singleton() {
            Ok(store)
        } else {
            Err(RegistryError::NotASingleton {
                name: T::type_name(),
            })
        }
    }
}
