//! Registry error types.

use entity_component::{ComponentTypeId, Entity};

/// Errors raised by the registry.
///
/// All of these signal a bug in the calling code rather than a transient
/// condition: they are surfaced, never retried. Removing an absent component
/// and evicting a singleton's previous owner are not errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Two configured component types share a name hash. Raised only while
    /// building a registry.
    #[error(
        "component types '{first}' and '{second}' share the type hash {id}; rename one of them"
    )]
    DuplicateTypeHash {
        first: &'static str,
        second: &'static str,
        id: ComponentTypeId,
    },

    /// A component type that was not part of the configured set.
    #[error("component type '{name}' is not known by this registry")]
    UnknownComponentType { name: &'static str },

    /// A singleton query named a type that is configured as ordinary.
    #[error("component type '{name}' is not a singleton")]
    NotASingleton { name: &'static str },

    /// The entity was never created by this registry or has been killed.
    #[error("{0} is unknown or dead")]
    UnknownOrDeadEntity(Entity),
}
