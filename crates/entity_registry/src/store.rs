//! Per-slot component storage.
//!
//! Each configured component type owns exactly one [`ComponentStore`]. The
//! variant is picked once, from the type's [`ComponentKind`]:
//!
//! - ordinary types live in a sharded concurrent map `Entity → component`,
//! - singleton types live in a single [`SingletonConnection`] slot behind a
//!   read/write lock.
//!
//! Every operation on a store is atomic on its own: concurrent readers see
//! the state before or after a `put`/`remove`, never a mix of both.
//! Operations spanning several stores are not atomic with each other.

use std::sync::Arc;

use dashmap::DashMap;
use entity_component::{AnyComponent, ComponentKind, ComponentType, Entity};
use parking_lot::RwLock;
use tracing::{debug, trace};

/// Rounds a requested shard amount to what the concurrent maps accept: a
/// power of two, at least 2.
pub(crate) fn normalise_shard_amount(requested: usize) -> usize {
    requested.max(2).next_power_of_two()
}

/// The binding of a singleton component to its current owner.
///
/// Connections are immutable. Moving a singleton to another entity replaces
/// the whole connection.
#[derive(Debug)]
pub struct SingletonConnection {
    entity: Entity,
    component: Arc<dyn AnyComponent>,
}

impl SingletonConnection {
    #[must_use]
    pub fn new(entity: Entity, component: Arc<dyn AnyComponent>) -> Self {
        Self { entity, component }
    }

    /// The entity currently owning the singleton.
    #[must_use]
    pub fn entity(&self) -> Entity {
        self.entity
    }

    #[must_use]
    pub fn component(&self) -> &Arc<dyn AnyComponent> {
        &self.component
    }
}

#[derive(Debug)]
enum Storage {
    Ordinary(DashMap<Entity, Arc<dyn AnyComponent>>),
    Singleton(RwLock<Option<Arc<SingletonConnection>>>),
}

/// Storage for all components of one type.
#[derive(Debug)]
pub struct ComponentStore {
    ty: ComponentType,
    storage: Storage,
}

impl ComponentStore {
    /// Create an empty store for `ty`.
    ///
    /// `capacity` and `shard_amount` size the concurrent map of ordinary
    /// types and are ignored for singletons. `shard_amount` is rounded up to
    /// a power of two, at least 2.
    #[must_use]
    pub fn new(ty: ComponentType, capacity: usize, shard_amount: usize) -> Self {
        let storage = match ty.kind() {
            ComponentKind::Ordinary => Storage::Ordinary(DashMap::with_capacity_and_shard_amount(
                capacity,
                normalise_shard_amount(shard_amount),
            )),
            ComponentKind::Singleton => Storage::Singleton(RwLock::new(None)),
        };
        Self { ty, storage }
    }

    /// The component type held by this store.
    #[must_use]
    pub fn component_type(&self) -> &ComponentType {
        &self.ty
    }

    /// Attach `component` to `entity`, replacing whatever was there.
    ///
    /// For a singleton type this also evicts the previous owner, if it was a
    /// different entity.
    pub fn put(&self, entity: Entity, component: Arc<dyn AnyComponent>) {
        match &self.storage {
            Storage::Ordinary(map) => {
                map.insert(entity, component);
                trace!(component = self.ty.name(), %entity, "component stored");
            }
            Storage::Singleton(slot) => {
                let connection = Arc::new(SingletonConnection::new(entity, component));
                let previous = slot.write().replace(connection);
                match previous {
                    Some(previous) if previous.entity != entity => {
                        debug!(
                            component = self.ty.name(),
                            from = %previous.entity,
                            to = %entity,
                            "singleton moved to new owner"
                        );
                    }
                    _ => trace!(component = self.ty.name(), %entity, "singleton stored"),
                }
            }
        }
    }

    /// Returns the component attached to `entity`, if any.
    ///
    /// For a singleton type the component is only returned to its current
    /// owner.
    #[must_use]
    pub fn get(&self, entity: Entity) -> Option<Arc<dyn AnyComponent>> {
        match &self.storage {
            Storage::Ordinary(map) => map.get(&entity).map(|c| Arc::clone(c.value())),
            Storage::Singleton(slot) => slot
                .read()
                .as_ref()
                .filter(|c| c.entity == entity)
                .map(|c| Arc::clone(&c.component)),
        }
    }

    /// Returns `true` if `entity` has a component in this store.
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        match &self.storage {
            Storage::Ordinary(map) => map.contains_key(&entity),
            Storage::Singleton(slot) => slot.read().as_ref().is_some_and(|c| c.entity == entity),
        }
    }

    /// Detach the component from `entity`.
    ///
    /// Returns `true` if something was removed. Removing an absent component,
    /// or a singleton owned by someone else, does nothing.
    pub fn remove(&self, entity: Entity) -> bool {
        let removed = match &self.storage {
            Storage::Ordinary(map) => map.remove(&entity).is_some(),
            Storage::Singleton(slot) => {
                let mut slot = slot.write();
                if slot.as_ref().is_some_and(|c| c.entity == entity) {
                    *slot = None;
                    true
                } else {
                    false
                }
            }
        };
        if removed {
            trace!(component = self.ty.name(), %entity, "component removed");
        }
        removed
    }

    /// Number of entities holding this component. Always 0 or 1 for
    /// singletons.
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.storage {
            Storage::Ordinary(map) => map.len(),
            Storage::Singleton(slot) => usize::from(slot.read().is_some()),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The current singleton connection. Always `None` for ordinary types.
    #[must_use]
    pub fn connection(&self) -> Option<Arc<SingletonConnection>> {
        match &self.storage {
            Storage::Ordinary(_) => None,
            Storage::Singleton(slot) => slot.read().clone(),
        }
    }

    /// Snapshot of the entities holding this component.
    #[must_use]
    pub fn entities(&self) -> Vec<Entity> {
        match &self.storage {
            Storage::Ordinary(map) => map.iter().map(|r| *r.key()).collect(),
            Storage::Singleton(slot) => slot.read().iter().map(|c| c.entity).collect(),
        }
    }

    /// Snapshot of the stored components.
    #[must_use]
    pub fn components(&self) -> Vec<Arc<dyn AnyComponent>> {
        match &self.storage {
            Storage::Ordinary(map) => map.iter().map(|r| Arc::clone(r.value())).collect(),
            Storage::Singleton(slot) => slot
                .read()
                .iter()
                .map(|c| Arc::clone(&c.component))
                .collect(),
        }
    }

    /// Snapshot of `(entity, component)` pairs.
    #[must_use]
    pub fn entries(&self) -> Vec<(Entity, Arc<dyn AnyComponent>)> {
        match &self.storage {
            Storage::Ordinary(map) => map
                .iter()
                .map(|r| (*r.key(), Arc::clone(r.value())))
                .collect(),
            Storage::Singleton(slot) => slot
                .read()
                .iter()
                .map(|c| (c.entity, Arc::clone(&c.component)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use entity_component::Component;

    use super::*;

    #[derive(Debug, PartialEq)]
    struct Label(&'static str);
    impl Component for Label {
        fn type_name() -> &'static str {
            "Label"
        }
    }

    #[derive(Debug, PartialEq)]
    struct Weather(u32);
    impl Component for Weather {
        fn type_name() -> &'static str {
            "Weather"
        }
        fn kind() -> ComponentKind {
            ComponentKind::Singleton
        }
    }

    fn ordinary() -> ComponentStore {
        ComponentStore::new(ComponentType::of::<Label>(), 16, 4)
    }

    fn singleton() -> ComponentStore {
        ComponentStore::new(ComponentType::of::<Weather>(), 16, 4)
    }

    fn label(store: &ComponentStore, entity: Entity) -> Option<&'static str> {
        store
            .get(entity)
            .and_then(|c| c.downcast_ref::<Label>().map(|l| l.0))
    }

    #[test]
    fn test_ordinary_put_get_remove() {
        let store = ordinary();
        let e = Entity::from_raw(1);
        assert!(store.is_empty());

        store.put(e, Arc::new(Label("first")));
        assert_eq!(label(&store, e), Some("first"));
        assert!(store.contains(e));

        store.put(e, Arc::new(Label("second")));
        assert_eq!(label(&store, e), Some("second"));
        assert_eq!(store.len(), 1);

        assert!(store.remove(e));
        assert_eq!(label(&store, e), None);
        assert!(!store.remove(e));
        assert!(store.connection().is_none());
    }

    #[test]
    fn test_any_shard_amount_is_accepted() {
        for shard_amount in [0, 1, 3, 6, 17] {
            let store = ComponentStore::new(ComponentType::of::<Label>(), 4, shard_amount);
            store.put(Entity::from_raw(1), Arc::new(Label("ok")));
            assert_eq!(label(&store, Entity::from_raw(1)), Some("ok"));
        }
        assert_eq!(normalise_shard_amount(0), 2);
        assert_eq!(normalise_shard_amount(5), 8);
        assert_eq!(normalise_shard_amount(16), 16);
    }

    #[test]
    fn test_ordinary_snapshots() {
        let store = ordinary();
        store.put(Entity::from_raw(1), Arc::new(Label("a")));
        store.put(Entity::from_raw(2), Arc::new(Label("b")));

        let mut entities = store.entities();
        entities.sort();
        assert_eq!(entities, vec![Entity::from_raw(1), Entity::from_raw(2)]);
        assert_eq!(store.components().len(), 2);
        assert_eq!(store.entries().len(), 2);
    }

    #[test]
    fn test_singleton_put_evicts_previous_owner() {
        let store = singleton();
        store.put(Entity::from_raw(1), Arc::new(Weather(10)));
        assert!(store.contains(Entity::from_raw(1)));

        store.put(Entity::from_raw(2), Arc::new(Weather(20)));
        assert!(!store.contains(Entity::from_raw(1)));
        assert!(store.get(Entity::from_raw(1)).is_none());
        assert!(store.contains(Entity::from_raw(2)));
        assert_eq!(store.len(), 1);
        assert_eq!(store.entities(), vec![Entity::from_raw(2)]);

        let connection = store.connection().unwrap();
        assert_eq!(connection.entity(), Entity::from_raw(2));
        assert_eq!(
            connection.component().downcast_ref::<Weather>(),
            Some(&Weather(20))
        );
    }

    #[test]
    fn test_singleton_remove_only_by_owner() {
        let store = singleton();
        assert!(!store.remove(Entity::from_raw(1)));

        store.put(Entity::from_raw(1), Arc::new(Weather(1)));
        assert!(!store.remove(Entity::from_raw(2)));
        assert_eq!(store.len(), 1);

        assert!(store.remove(Entity::from_raw(1)));
        assert!(store.is_empty());
        assert!(store.entities().is_empty());
        assert!(store.components().is_empty());
    }

    #[test]
    fn test_singleton_never_has_two_owners_under_contention() {
        let store = singleton();
        thread::scope(|scope| {
            for id in 0..8u64 {
                let store = &store;
                scope.spawn(move || {
                    for round in 0..200 {
                        store.put(Entity::from_raw(id), Arc::new(Weather(round)));
                        assert!(store.len() <= 1);
                        assert!(store.entities().len() <= 1);
                    }
                });
            }
        });
        assert_eq!(store.len(), 1);
    }
}
