//! Read-only access to a registry from outside a job.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use entity_component::{AnyComponent, Component, ComponentType, Entity, SingletonComponent};

use crate::error::RegistryError;
use crate::registry::Registry;
use crate::status::Status;
use crate::type_index::TypeIndex;
use crate::view::{ComponentView, EntityView};

/// The query half of a [`Registry`], handed out by
/// [`ExecutionGate::registry`](crate::ExecutionGate::registry).
///
/// Reads through a reader see each store atomically but not the registry as a
/// whole: an entity being killed by a concurrent job may still show up in some
/// stores. Mutation is only possible inside a job.
#[derive(Debug, Clone, Copy)]
pub struct RegistryReader<'a> {
    registry: &'a Registry,
}

impl<'a> RegistryReader<'a> {
    pub(crate) fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    #[must_use]
    pub fn type_index(&self) -> &'a TypeIndex {
        self.registry.type_index()
    }

    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.registry.is_alive(entity)
    }

    /// See [`Registry::name_of`].
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownOrDeadEntity`] if the entity is not
    /// alive.
    pub fn name_of(&self, entity: Entity) -> Result<String, RegistryError> {
        self.registry.name_of(entity)
    }

    #[must_use]
    pub fn entities(&self) -> EntityView<'a> {
        self.registry.entities()
    }

    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.registry.entity_count()
    }

    /// See [`Registry::get_component`].
    ///
    /// # Errors
    ///
    /// See [`Registry::add_component`].
    pub fn get_component<T: Component>(
        &self,
        entity: Entity,
    ) -> Result<Option<Arc<T>>, RegistryError> {
        self.registry.get_component(entity)
    }

    /// See [`Registry::has_component`].
    ///
    /// # Errors
    ///
    /// See [`Registry::add_component`].
    pub fn has_component<T: Component>(&self, entity: Entity) -> Result<bool, RegistryError> {
        self.registry.has_component::<T>(entity)
    }

    /// See [`Registry::all_components_on_entity`].
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownOrDeadEntity`] if the entity is not
    /// alive.
    pub fn all_components_on_entity(
        &self,
        entity: Entity,
    ) -> Result<Vec<Arc<dyn AnyComponent>>, RegistryError> {
        self.registry.all_components_on_entity(entity)
    }

    /// See [`Registry::all_components_of_type`].
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownComponentType`] if `T` was not
    /// configured.
    pub fn all_components_of_type<T: Component>(
        &self,
    ) -> Result<ComponentView<'a, T>, RegistryError> {
        self.registry.all_components_of_type()
    }

    /// See [`Registry::find_entities_with_component`].
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownComponentType`] if `T` was not
    /// configured.
    pub fn find_entities_with_component<T: Component>(
        &self,
    ) -> Result<EntityView<'a>, RegistryError> {
        self.registry.find_entities_with_component::<T>()
    }

    /// See [`Registry::find_entities_with_components`].
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownComponentType`] if any listed type was
    /// not configured.
    pub fn find_entities_with_components(
        &self,
        types: &[ComponentType],
    ) -> Result<HashSet<Entity>, RegistryError> {
        self.registry.find_entities_with_components(types)
    }

    /// See [`Registry::find_entity_with_singleton`].
    ///
    /// # Errors
    ///
    /// See [`Registry::find_entity_with_singleton`].
    pub fn find_entity_with_singleton<T: SingletonComponent>(
        &self,
    ) -> Result<Option<Entity>, RegistryError> {
        self.registry.find_entity_with_singleton::<T>()
    }

    /// See [`Registry::find_singleton_component`].
    ///
    /// # Errors
    ///
    /// See [`Registry::find_entity_with_singleton`].
    pub fn find_singleton_component<T: SingletonComponent>(
        &self,
    ) -> Result<Option<Arc<T>>, RegistryError> {
        self.registry.find_singleton_component()
    }

    /// See [`Registry::component_map`].
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownComponentType`] if `T` was not
    /// configured.
    pub fn component_map<T: Component>(&self) -> Result<HashMap<Entity, Arc<T>>, RegistryError> {
        self.registry.component_map()
    }

    #[must_use]
    pub fn status(&self) -> Status {
        self.registry.status()
    }
}

#[cfg(test)]
mod tests {
    use entity_component::ComponentKind;

    use super::*;
    use crate::config::RegistryConfig;

    #[derive(Debug, PartialEq)]
    struct Tag(u8);
    impl Component for Tag {
        fn type_name() -> &'static str {
            "Tag"
        }
    }

    #[derive(Debug, PartialEq)]
    struct Focus;
    impl Component for Focus {
        fn type_name() -> &'static str {
            "Focus"
        }
        fn kind() -> ComponentKind {
            ComponentKind::Singleton
        }
    }
    impl SingletonComponent for Focus {}

    #[test]
    fn test_reader_sees_job_results() {
        let gate = RegistryConfig::new()
            .with_component::<Tag>()
            .with_component::<Focus>()
            .build()
            .unwrap();

        let entity = gate
            .run(|registry| {
                let e = registry.create_named_entity("tagged");
                registry.add_component(e, Tag(3))?;
                registry.add_component(e, Focus)?;
                Ok::<_, RegistryError>(e)
            })
            .unwrap();

        let reader = gate.registry();
        assert!(reader.is_alive(entity));
        assert_eq!(reader.name_of(entity).unwrap(), "tagged");
        assert_eq!(reader.entity_count(), 1);
        assert_eq!(reader.entities().to_vec(), vec![entity]);
        assert_eq!(reader.get_component::<Tag>(entity).unwrap().as_deref(), Some(&Tag(3)));
        assert!(reader.has_component::<Tag>(entity).unwrap());
        assert_eq!(reader.all_components_on_entity(entity).unwrap().len(), 2);
        assert_eq!(reader.all_components_of_type::<Tag>().unwrap().len(), 1);
        assert!(reader.find_entities_with_component::<Tag>().unwrap().contains(entity));
        assert_eq!(
            reader
                .find_entities_with_components(&[ComponentType::of::<Tag>()])
                .unwrap(),
            HashSet::from([entity])
        );
        assert_eq!(reader.find_entity_with_singleton::<Focus>().unwrap(), Some(entity));
        assert_eq!(reader.find_singleton_component::<Focus>().unwrap().as_deref(), Some(&Focus));
        assert_eq!(reader.component_map::<Tag>().unwrap().len(), 1);
        assert_eq!(reader.status().component_count("Tag"), Some(1));
        assert_eq!(reader.type_index().len(), 2);
    }
}
