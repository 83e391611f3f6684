//! # entity_component
//!
//! The vocabulary shared by the registry and the code that uses it: what a
//! component is, how component types are identified, and what an entity is.
//!
//! This crate provides:
//!
//! - [`Component`] trait: the contract all registry data must satisfy.
//! - [`SingletonComponent`]: marker for types at most one entity may hold.
//! - [`ComponentTypeId`]: FNV-1a name hash used to order component types.
//! - [`ComponentType`]: descriptor of one configured component type.
//! - [`AnyComponent`]: object-safe view used for type-erased storage.
//! - [`Entity`]: lightweight `u64` entity identifiers with a generation.
//! - [`EntityIdGenerator`]: pluggable id source, with
//!   [`SequentialIdGenerator`] as the default.
//! - [`ComponentTypeProvider`]: supplies the type set a registry is built
//!   from.

pub mod component;
pub mod entity;
pub mod provider;

pub use component::{
    AnyComponent, Component, ComponentKind, ComponentType, ComponentTypeId, SingletonComponent,
    downcast_arc,
};
pub use entity::{ConstantIdGenerator, Entity, EntityIdGenerator, SequentialIdGenerator};
pub use provider::{ComponentTypeProvider, StaticTypeProvider};
