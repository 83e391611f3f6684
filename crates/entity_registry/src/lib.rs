//! # entity_registry
//!
//! An in-memory entity-component registry with a fixed set of component
//! types, concurrent per-type storage, and a lock that serialises mutating
//! jobs.
//!
//! This crate provides:
//!
//! - [`TypeIndex`]: hash-ordered slot addressing for the configured types.
//! - [`ComponentStore`]: per-type storage, ordinary or singleton.
//! - [`Registry`]: entity lifecycle, naming, component CRUD and queries.
//! - [`ExecutionGate`]: runs [`Job`]s with exclusive registry access.
//! - [`RegistryReader`]: read-only queries outside a job.
//! - [`RegistryConfig`]: builder-style configuration.
//! - [`Status`]: diagnostic size snapshot.
//!
//! ## Usage
//!
//! ```rust
//! use entity_component::{Component, ComponentKind};
//! use entity_registry::{RegistryConfig, RegistryError};
//!
//! #[derive(Debug)]
//! struct Position { x: f32, y: f32 }
//! impl Component for Position {
//!     fn type_name() -> &'static str { "Position" }
//! }
//!
//! #[derive(Debug)]
//! struct Camera;
//! impl Component for Camera {
//!     fn type_name() -> &'static str { "Camera" }
//!     fn kind() -> ComponentKind { ComponentKind::Singleton }
//! }
//!
//! let gate = RegistryConfig::new()
//!     .with_component::<Position>()
//!     .with_component::<Camera>()
//!     .build()?;
//!
//! gate.run(|registry| {
//!     let player = registry.create_named_entity("player");
//!     registry.add_component(player, Position { x: 1.0, y: 2.0 })?;
//!     registry.add_component(player, Camera)?;
//!     Ok::<_, RegistryError>(())
//! })?;
//!
//! assert_eq!(gate.registry().entity_count(), 1);
//! # Ok::<(), RegistryError>(())
//! ```

pub mod config;
pub mod error;
pub mod gate;
pub mod reader;
pub mod registry;
pub mod status;
pub mod store;
pub mod type_index;
pub mod view;

pub use config::RegistryConfig;
pub use error::RegistryError;
pub use gate::{ExecutionGate, Job, ParametrizedJob};
pub use reader::RegistryReader;
pub use registry::{Registry, UNNAMED};
pub use status::Status;
pub use store::{ComponentStore, SingletonConnection};
pub use type_index::TypeIndex;
pub use view::{ComponentView, EntityView};
