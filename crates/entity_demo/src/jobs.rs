//! Jobs submitted by the demo.

use std::collections::HashSet;

use anyhow::{Context, ensure};
use components::{Health, PlayerControlled, Position, Velocity, WorldClock};
use entity_component::{ComponentType, Entity};
use entity_registry::{Job, ParametrizedJob, Registry, RegistryError};
use tracing::info;

/// A short single-threaded walk through entity lifecycle, control handover,
/// and queries.
pub struct Showcase;

impl Job for Showcase {
    type Error = anyhow::Error;

    fn execute(&mut self, registry: &Registry) -> anyhow::Result<()> {
        let player = registry.create_named_entity("Player");
        registry.add_component(player, Position::new(0.0, 0.0))?;
        registry.add_component(player, Velocity::new(1.0, 0.5))?;
        registry.add_component(player, Health::full(100.0))?;
        registry.add_component(player, PlayerControlled)?;

        let goblin = registry.create_named_entity("Goblin");
        registry.add_component(goblin, Position::new(4.0, 2.0))?;
        registry.add_component(goblin, Health::full(30.0))?;

        ensure!(
            registry.find_entity_with_singleton::<PlayerControlled>()? == Some(player),
            "player should start in control"
        );

        // Possession: control moves to the goblin and leaves the player.
        registry.add_component(goblin, PlayerControlled)?;
        ensure!(!registry.has_component::<PlayerControlled>(player)?);
        info!(from = %player, to = %goblin, "control handed over");

        let health = registry
            .get_component::<Health>(goblin)?
            .context("goblin has no health")?;
        let health = health.damaged(40.0);
        registry.add_component(goblin, health)?;
        if !health.is_alive() {
            registry.kill_entity(goblin)?;
            info!(entity = %goblin, "goblin died");
        }
        ensure!(
            registry.find_entity_with_singleton::<PlayerControlled>()?.is_none(),
            "control should die with its owner"
        );

        registry.add_component(player, PlayerControlled)?;

        let movers = registry.find_entities_with_components(&[
            ComponentType::of::<Position>(),
            ComponentType::of::<Velocity>(),
        ])?;
        ensure!(movers == HashSet::from([player]), "unexpected movers: {movers:?}");

        info!(entities = registry.entity_count(), "showcase finished");
        Ok(())
    }
}

/// Creates one moving entity per run and remembers the last one.
pub struct SpawnWalker {
    thread: usize,
    spawned: usize,
    last: Option<Entity>,
}

impl SpawnWalker {
    pub fn new(thread: usize) -> Self {
        Self {
            thread,
            spawned: 0,
            last: None,
        }
    }

    pub fn last(&self) -> Option<Entity> {
        self.last
    }
}

impl Job for SpawnWalker {
    type Error = RegistryError;

    fn execute(&mut self, registry: &Registry) -> Result<(), RegistryError> {
        let name = format!("walker-{}-{}", self.thread, self.spawned);
        let entity = registry.create_named_entity(&name);
        registry.add_component(entity, Position::new(self.thread as f32, self.spawned as f32))?;
        registry.add_component(entity, Velocity::new(1.0, 0.0))?;

        self.spawned += 1;
        self.last = Some(entity);
        Ok(())
    }
}

/// Moves the world clock to the given entity and advances it by one tick.
pub struct AdvanceClock;

impl ParametrizedJob<Entity> for AdvanceClock {
    type Error = RegistryError;

    fn execute(&mut self, registry: &Registry, entity: Entity) -> Result<(), RegistryError> {
        let tick = registry
            .find_singleton_component::<WorldClock>()?
            .map_or(0, |clock| clock.tick);
        registry.add_component(entity, WorldClock { tick: tick + 1 })
    }
}
