//! Live, read-only views over registry storage.
//!
//! A view borrows the underlying map and reads it anew on every call, so it
//! reflects mutations made after the view was obtained. Iteration first
//! copies the current contents into a snapshot: a job may keep iterating a
//! view while it adds or removes components.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use dashmap::DashMap;
use entity_component::{Component, Entity, downcast_arc};

use crate::store::ComponentStore;

#[derive(Clone, Copy)]
enum EntitySource<'a> {
    Names(&'a DashMap<Entity, String>),
    Store(&'a ComponentStore),
}

/// A live set of entities: either all known entities or the holders of one
/// component type.
#[derive(Clone, Copy)]
pub struct EntityView<'a> {
    source: EntitySource<'a>,
}

impl<'a> EntityView<'a> {
    pub(crate) fn of_names(names: &'a DashMap<Entity, String>) -> Self {
        Self {
            source: EntitySource::Names(names),
        }
    }

    pub(crate) fn of_store(store: &'a ComponentStore) -> Self {
        Self {
            source: EntitySource::Store(store),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self.source {
            EntitySource::Names(names) => names.len(),
            EntitySource::Store(store) => store.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        match self.source {
            EntitySource::Names(names) => names.contains_key(&entity),
            EntitySource::Store(store) => store.contains(entity),
        }
    }

    /// Iterate over a snapshot of the current members. No order is
    /// guaranteed.
    pub fn iter(&self) -> std::vec::IntoIter<Entity> {
        self.to_vec().into_iter()
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<Entity> {
        match self.source {
            EntitySource::Names(names) => names.iter().map(|r| *r.key()).collect(),
            EntitySource::Store(store) => store.entities(),
        }
    }

    #[must_use]
    pub fn to_set(&self) -> HashSet<Entity> {
        self.iter().collect()
    }
}

impl fmt::Debug for EntityView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl IntoIterator for &EntityView<'_> {
    type Item = Entity;
    type IntoIter = std::vec::IntoIter<Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A live collection of all components of type `T`.
pub struct ComponentView<'a, T> {
    store: &'a ComponentStore,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, T: Component> ComponentView<'a, T> {
    pub(crate) fn new(store: &'a ComponentStore) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// The component held by `entity`, if any.
    #[must_use]
    pub fn get(&self, entity: Entity) -> Option<Arc<T>> {
        self.store.get(entity).and_then(downcast_arc::<T>)
    }

    /// Iterate over a snapshot of the current components.
    pub fn iter(&self) -> std::vec::IntoIter<Arc<T>> {
        self.to_vec().into_iter()
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<Arc<T>> {
        self.store
            .components()
            .into_iter()
            .filter_map(downcast_arc::<T>)
            .collect()
    }

    /// Snapshot of `entity → component`.
    #[must_use]
    pub fn to_map(&self) -> HashMap<Entity, Arc<T>> {
        self.store
            .entries()
            .into_iter()
            .filter_map(|(entity, component)| downcast_arc::<T>(component).map(|c| (entity, c)))
            .collect()
    }
}

impl<T> Clone for ComponentView<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ComponentView<'_, T> {}

impl<T: Component> fmt::Debug for ComponentView<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: Component> IntoIterator for &ComponentView<'_, T> {
    type Item = Arc<T>;
    type IntoIter = std::vec::IntoIter<Arc<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
