//! Discovery of the component types a registry is configured with.
//!
//! The registry never inspects code to find its component types. Whatever
//! produces the type set (a hand-written list, a generated module, a plugin
//! manifest) implements [`ComponentTypeProvider`] and is handed to the
//! registry builder.

use crate::component::{Component, ComponentType};

/// Supplies the closed set of component types for one registry.
pub trait ComponentTypeProvider {
    /// The descriptors to configure. Order does not matter.
    fn component_types(&self) -> Vec<ComponentType>;
}

/// A provider backed by a fixed list of descriptors.
#[derive(Debug, Clone, Default)]
pub struct StaticTypeProvider {
    types: Vec<ComponentType>,
}

impl StaticTypeProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add component type `T` to the list.
    #[must_use]
    pub fn with<T: Component>(mut self) -> Self {
        self.types.push(ComponentType::of::<T>());
        self
    }
}

impl FromIterator<ComponentType> for StaticTypeProvider {
    fn from_iter<I: IntoIterator<Item = ComponentType>>(iter: I) -> Self {
        Self {
            types: iter.into_iter().collect(),
        }
    }
}

impl ComponentTypeProvider for StaticTypeProvider {
    fn component_types(&self) -> Vec<ComponentType> {
        self.types.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Position;

    impl Component for Position {
        fn type_name() -> &'static str {
            "Position"
        }
    }

    #[derive(Debug)]
    struct Velocity;

    impl Component for Velocity {
        fn type_name() -> &'static str {
            "Velocity"
        }
    }

    #[test]
    fn test_static_provider_lists_added_types() {
        let provider = StaticTypeProvider::new().with::<Position>().with::<Velocity>();
        let types = provider.component_types();
        assert_eq!(types.len(), 2);
        assert!(types.contains(&ComponentType::of::<Position>()));
        assert!(types.contains(&ComponentType::of::<Velocity>()));
    }

    #[test]
    fn test_static_provider_from_iter() {
        let provider: StaticTypeProvider = [ComponentType::of::<Position>()].into_iter().collect();
        assert_eq!(provider.component_types(), vec![ComponentType::of::<Position>()]);
    }
}
