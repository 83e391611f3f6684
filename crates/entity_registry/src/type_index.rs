//! Slot addressing for the configured component types.
//!
//! The configured types are sorted by their [`ComponentTypeId`] once, at
//! registry construction. A type's slot is its position in that array and is
//! found by binary search afterwards. The order carries no meaning beyond
//! being stable for the life of the registry.

use std::collections::HashMap;

use entity_component::{Component, ComponentType, ComponentTypeId};

use crate::error::RegistryError;

/// The closed, hash-ordered set of component types of one registry.
#[derive(Debug, Clone, Default)]
pub struct TypeIndex {
    /// Configured types, sorted by id. Slot = position.
    types: Vec<ComponentType>,
}

impl TypeIndex {
    /// Build the index from a set of component type descriptors.
    ///
    /// Listing the same type twice is harmless. Two different types with the
    /// same name hash are not.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateTypeHash`] if two distinct types
    /// share a [`ComponentTypeId`].
    pub fn new<I>(types: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = ComponentType>,
    {
        let mut known: HashMap<ComponentTypeId, ComponentType> = HashMap::new();

        for ty in types {
            match known.get(&ty.id()) {
                Some(existing) if existing.rust_type() == ty.rust_type() => {}
                Some(existing) => {
                    return Err(RegistryError::DuplicateTypeHash {
                        first: existing.name(),
                        second: ty.name(),
                        id: ty.id(),
                    });
                }
                None => {
                    known.insert(ty.id(), ty);
                }
            }
        }

        let mut types: Vec<ComponentType> = known.into_values().collect();
        types.sort_by_key(ComponentType::id);
        Ok(Self { types })
    }

    /// Resolve a descriptor to its slot.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownComponentType`] if the type was not
    /// configured. A foreign type whose name happens to hash to a configured
    /// id is rejected as well.
    pub fn resolve(&self, ty: &ComponentType) -> Result<usize, RegistryError> {
        match self.types.binary_search_by_key(&ty.id(), ComponentType::id) {
            Ok(slot) if self.types[slot].rust_type() == ty.rust_type() => Ok(slot),
            _ => Err(RegistryError::UnknownComponentType { name: ty.name() }),
        }
    }

    /// Resolve component type `T` to its slot.
    ///
    /// # Errors
    ///
    /// See [`TypeIndex::resolve`].
    pub fn resolve_of<T: Component>(&self) -> Result<usize, RegistryError> {
        self.resolve(&ComponentType::of::<T>())
    }

    /// Returns the descriptor stored at `slot`.
    #[must_use]
    pub fn get(&self, slot: usize) -> Option<&ComponentType> {
        self.types.get(slot)
    }

    /// All configured types in slot order.
    #[must_use]
    pub fn types(&self) -> &[ComponentType] {
        &self.types
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
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

    #[derive(Debug)]
    struct Health;
    impl Component for Health {
        fn type_name() -> &'static str {
            "Health"
        }
    }

    // Two distinct types declaring the same name collide.
    #[derive(Debug)]
    struct ClashA;
    impl Component for ClashA {
        fn type_name() -> &'static str {
            "Clash"
        }
    }

    #[derive(Debug)]
    struct ClashB;
    impl Component for ClashB {
        fn type_name() -> &'static str {
            "Clash"
        }
    }

    fn three_types() -> TypeIndex {
        TypeIndex::new([
            ComponentType::of::<Velocity>(),
            ComponentType::of::<Position>(),
            ComponentType::of::<Health>(),
        ])
        .unwrap()
    }

    #[test]
    fn test_slots_follow_hash_order() {
        let index = three_types();
        assert_eq!(index.len(), 3);
        let ids: Vec<_> = index.types().iter().map(ComponentType::id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);

        for (slot, ty) in index.types().iter().enumerate() {
            assert_eq!(index.resolve(ty).unwrap(), slot);
            assert_eq!(index.get(slot), Some(ty));
        }
    }

    #[test]
    fn test_resolve_is_stable() {
        let index = three_types();
        let first = index.resolve_of::<Health>().unwrap();
        for _ in 0..10 {
            assert_eq!(index.resolve_of::<Health>().unwrap(), first);
        }
    }

    #[test]
    fn test_order_is_independent_of_input_order() {
        let a = three_types();
        let b = TypeIndex::new([
            ComponentType::of::<Health>(),
            ComponentType::of::<Velocity>(),
            ComponentType::of::<Position>(),
        ])
        .unwrap();
        assert_eq!(a.types(), b.types());
    }

    #[test]
    fn test_duplicate_hash_is_rejected() {
        let err = TypeIndex::new([
            ComponentType::of::<ClashA>(),
            ComponentType::of::<Position>(),
            ComponentType::of::<ClashB>(),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateTypeHash {
                first: "Clash",
                second: "Clash",
                id: ComponentTypeId::from_name("Clash"),
            }
        );
    }

    #[test]
    fn test_same_type_twice_is_collapsed() {
        let index = TypeIndex::new([
            ComponentType::of::<Position>(),
            ComponentType::of::<Position>(),
        ])
        .unwrap();
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_unknown_type_is_an_error() {
        let index = TypeIndex::new([ComponentType::of::<Position>()]).unwrap();
        assert_eq!(
            index.resolve_of::<Velocity>(),
            Err(RegistryError::UnknownComponentType { name: "Velocity" })
        );
    }

    #[test]
    fn test_foreign_type_with_configured_hash_is_unknown() {
        let index = TypeIndex::new([ComponentType::of::<ClashA>()]).unwrap();
        assert!(index.resolve_of::<ClashA>().is_ok());
        assert_eq!(
            index.resolve_of::<ClashB>(),
            Err(RegistryError::UnknownComponentType { name: "Clash" })
        );
    }

    #[test]
    fn test_empty_index() {
        let index = TypeIndex::new(Vec::new()).unwrap();
        assert!(index.is_empty());
        assert!(index.resolve_of::<Position>().is_err());
    }
}
