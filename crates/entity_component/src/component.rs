//! Core [`Component`] trait, type descriptors, and type-erased component
//! handles.
//!
//! Every piece of data stored in the registry must implement [`Component`].
//! The trait requires `Send + Sync + 'static` so components can be shared
//! between the threads that query a registry concurrently.
//!
//! ## Type Identity
//!
//! [`ComponentTypeId`] is derived from the component's **string name** using
//! the FNV-1a 64-bit hash algorithm. This is deterministic across processes
//! and builds, which makes the slot order of a registry reproducible. Two
//! configured types whose names hash to the same value cannot live in the
//! same registry.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A unique identifier for a component type, derived from its string name
/// using the FNV-1a 64-bit hash algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct ComponentTypeId(pub u64);

impl ComponentTypeId {
    /// FNV-1a 64-bit offset basis.
    const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;

    /// FNV-1a 64-bit prime.
    const FNV_PRIME: u64 = 0x0100_0000_01b3;

    /// Compute the [`ComponentTypeId`] from a component's string name.
    ///
    /// # Algorithm (FNV-1a 64-bit)
    ///
    /// ```text
    /// hash = 0xcbf29ce484222325          (offset basis)
    /// for each byte in name.as_bytes():
    ///     hash = hash XOR byte
    ///     hash = hash * 0x00000100000001b3  (prime)
    /// return hash
    /// ```
    #[must_use]
    pub const fn from_name(name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut hash = Self::FNV_OFFSET_BASIS;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u64;
            hash = hash.wrapping_mul(Self::FNV_PRIME);
            i += 1;
        }
        Self(hash)
    }

    /// Compute the [`ComponentTypeId`] for a Rust component type `T`.
    #[must_use]
    pub fn of<T: Component>() -> Self {
        Self::from_name(T::type_name())
    }
}

impl fmt::Display for ComponentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// Whether a component type may be attached to many entities or to at most
/// one entity in the whole registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    /// At most one instance per entity, any number of entities.
    #[default]
    Ordinary,
    /// At most one `(entity, component)` pair system-wide.
    Singleton,
}

impl ComponentKind {
    /// Returns `true` for [`ComponentKind::Singleton`].
    #[must_use]
    pub const fn is_singleton(self) -> bool {
        matches!(self, Self::Singleton)
    }
}

/// The core component trait.
///
/// Components are plain data. The only polymorphism the registry relies on
/// is type identity: the name hash, the [`ComponentKind`] and the Rust type.
///
/// # Examples
///
/// ```rust
/// use entity_component::{Component, ComponentKind};
///
/// #[derive(Debug, Clone)]
/// struct Health {
///     current: f32,
///     max: f32,
/// }
///
/// impl Component for Health {
///     fn type_name() -> &'static str { "Health" }
/// }
///
/// #[derive(Debug)]
/// struct Camera;
///
/// impl Component for Camera {
///     fn type_name() -> &'static str { "Camera" }
///     fn kind() -> ComponentKind { ComponentKind::Singleton }
/// }
///
/// assert!(!Health::kind().is_singleton());
/// assert!(Camera::kind().is_singleton());
/// ```
pub trait Component: Any + Send + Sync + fmt::Debug {
    /// A human-readable name for this component type. Hashed into the
    /// [`ComponentTypeId`].
    fn type_name() -> &'static str;

    /// Ordinary or singleton. Defaults to [`ComponentKind::Ordinary`].
    fn kind() -> ComponentKind {
        ComponentKind::Ordinary
    }

    /// Returns the [`ComponentTypeId`] for this component.
    fn component_type_id() -> ComponentTypeId {
        ComponentTypeId::from_name(Self::type_name())
    }
}

/// Marker for component types whose [`Component::kind`] is
/// [`ComponentKind::Singleton`].
///
/// Singleton-only queries are bounded on this trait, so asking one of them
/// about an ordinary type does not compile.
pub trait SingletonComponent: Component {}

/// Descriptor of one component type, as configured into a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentType {
    id: ComponentTypeId,
    name: &'static str,
    kind: ComponentKind,
    rust_type: TypeId,
}

impl ComponentType {
    /// Build the descriptor for component type `T`.
    #[must_use]
    pub fn of<T: Component>() -> Self {
        Self {
            id: T::component_type_id(),
            name: T::type_name(),
            kind: T::kind(),
            rust_type: TypeId::of::<T>(),
        }
    }

    /// The name hash used for slot ordering.
    #[must_use]
    pub const fn id(&self) -> ComponentTypeId {
        self.id
    }

    /// The component's declared name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub const fn kind(&self) -> ComponentKind {
        self.kind
    }

    #[must_use]
    pub const fn is_singleton(&self) -> bool {
        self.kind.is_singleton()
    }

    /// The [`TypeId`] of the Rust type behind this descriptor.
    #[must_use]
    pub const fn rust_type(&self) -> TypeId {
        self.rust_type
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Object-safe view of a [`Component`], used for type-erased storage.
///
/// Implemented for every [`Component`]; there is no need to implement it by
/// hand.
pub trait AnyComponent: Any + Send + Sync + fmt::Debug {
    /// Descriptor of the concrete component type.
    fn component_type(&self) -> ComponentType;

    fn as_any(&self) -> &dyn Any;

    /// Convert a shared handle into a `dyn Any` handle for downcasting.
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Component> AnyComponent for T {
    fn component_type(&self) -> ComponentType {
        ComponentType::of::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

impl dyn AnyComponent {
    /// Returns `true` if the erased component is a `T`.
    #[must_use]
    pub fn is<T: Component>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Borrow the erased component as a `T`.
    #[must_use]
    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Recover a typed handle from a type-erased one.
///
/// Returns `None` if the component is not a `T`.
#[must_use]
pub fn downcast_arc<T: Component>(component: Arc<dyn AnyComponent>) -> Option<Arc<T>> {
    component.into_any_arc().downcast::<T>().ok()
}
