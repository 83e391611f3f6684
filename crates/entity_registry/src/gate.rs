//! The execution gate, the single entry point for mutating a registry.
//!
//! A [`Job`] is a unit of work that gets exclusive access to the
//! [`Registry`] for its whole duration. The gate serialises jobs with one
//! lock per registry:
//!
//! 1. Acquire the lock (blocking until the previous job has finished).
//! 2. Run the job against the registry.
//! 3. Release the lock, whether the job succeeded, failed, or panicked.
//! 4. Hand the job's result back to the caller unchanged.
//!
//! There is no rollback: a job that fails halfway leaves the registry as it
//! left it. There is no timeout either: a job that never returns blocks every
//! later job.
//!
//! If your simulation is simple, wrap the whole main loop in one job. To
//! spread work across threads, submit many short jobs from each of them.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::reader::RegistryReader;
use crate::registry::Registry;

/// A unit of work with exclusive access to a registry.
pub trait Job {
    /// Whatever the job may fail with. Opaque to the gate.
    type Error;

    /// Run the job.
    ///
    /// # Errors
    ///
    /// Any job-defined error; it is returned from
    /// [`ExecutionGate::execute`] after the lock is released.
    fn execute(&mut self, registry: &Registry) -> Result<(), Self::Error>;
}

/// A [`Job`] that also receives an input value.
pub trait ParametrizedJob<I> {
    /// Whatever the job may fail with. Opaque to the gate.
    type Error;

    /// Run the job with `input`.
    ///
    /// # Errors
    ///
    /// Any job-defined error; it is returned from
    /// [`ExecutionGate::execute_with`] after the lock is released.
    fn execute(&mut self, registry: &Registry, input: I) -> Result<(), Self::Error>;
}

/// Owns a [`Registry`] and serialises every job run against it.
///
/// The gate takes the registry by value, so no second gate can be built over
/// the same registry. Share the gate itself between threads, e.g. through an
/// `Arc` or scoped threads.
#[derive(Debug)]
pub struct ExecutionGate {
    registry: Registry,
    lock: Mutex<()>,
    jobs_executed: AtomicU64,
}

impl ExecutionGate {
    #[must_use]
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            lock: Mutex::new(()),
            jobs_executed: AtomicU64::new(0),
        }
    }

    /// Run `job` with exclusive access to the registry.
    ///
    /// # Errors
    ///
    /// Returns the job's own error.
    pub fn execute<J>(&self, job: &mut J) -> Result<(), J::Error>
    where
        J: Job + ?Sized,
    {
        self.run(|registry| job.execute(registry))
    }

    /// Run `job` with `input` and exclusive access to the registry.
    ///
    /// # Errors
    ///
    /// Returns the job's own error.
    pub fn execute_with<I, J>(&self, job: &mut J, input: I) -> Result<(), J::Error>
    where
        J: ParametrizedJob<I> + ?Sized,
    {
        self.run(|registry| job.execute(registry, input))
    }

    /// Run a closure as a job and return what it returns.
    ///
    /// # Errors
    ///
    /// Returns the closure's own error.
    pub fn run<R, E, F>(&self, job: F) -> Result<R, E>
    where
        F: FnOnce(&Registry) -> Result<R, E>,
    {
        // Released on drop, which also covers unwinding out of the job.
        let _guard = self.lock.lock();
        let sequence = self.jobs_executed.fetch_add(1, Ordering::Relaxed);
        debug!(job = sequence, "job started");

        let result = job(&self.registry);

        match &result {
            Ok(_) => debug!(job = sequence, "job finished"),
            Err(_) => warn!(job = sequence, "job failed"),
        }
        result
    }

    /// Read-only queries against the registry, outside any job.
    #[must_use]
    pub fn registry(&self) -> RegistryReader<'_> {
        RegistryReader::new(&self.registry)
    }

    /// Number of jobs started through this gate.
    #[must_use]
    pub fn jobs_executed(&self) -> u64 {
        self.jobs_executed.load(Ordering::Relaxed)
    }

    /// Tear down the gate and take the registry back.
    #[must_use]
    pub fn into_registry(self) -> Registry {
        self.registry
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;
    use std::thread;
    use std::time::Duration;

    use entity_component::{Component, Entity};

    use super::*;
    use crate::config::RegistryConfig;
    use crate::error::RegistryError;

    #[derive(Debug, PartialEq)]
    struct Counter(u32);
    impl Component for Counter {
        fn type_name() -> &'static str {
            "Counter"
        }
    }

    fn gate() -> ExecutionGate {
        RegistryConfig::new()
            .with_component::<Counter>()
            .build()
            .unwrap()
    }

    /// Creates one entity per call and remembers it.
    #[derive(Default)]
    struct SpawnJob {
        spawned: Vec<Entity>,
    }

    impl Job for SpawnJob {
        type Error = RegistryError;

        fn execute(&mut self, registry: &Registry) -> Result<(), RegistryError> {
            let entity = registry.create_entity(None);
            registry.add_component(entity, Counter(0))?;
            self.spawned.push(entity);
            Ok(())
        }
    }

    /// Sets the counter of the given entity.
    struct SetCounter;

    impl ParametrizedJob<(Entity, u32)> for SetCounter {
        type Error = RegistryError;

        fn execute(
            &mut self,
            registry: &Registry,
            (entity, value): (Entity, u32),
        ) -> Result<(), RegistryError> {
            registry.add_component(entity, Counter(value))
        }
    }

    #[test]
    fn test_execute_job() {
        let gate = gate();
        let mut job = SpawnJob::default();
        gate.execute(&mut job).unwrap();
        gate.execute(&mut job).unwrap();

        assert_eq!(job.spawned.len(), 2);
        assert_eq!(gate.registry().entity_count(), 2);
        assert_eq!(gate.jobs_executed(), 2);
    }

    #[test]
    fn test_execute_parametrized_job() {
        let gate = gate();
        let mut spawn = SpawnJob::default();
        gate.execute(&mut spawn).unwrap();
        let entity = spawn.spawned[0];

        gate.execute_with(&mut SetCounter, (entity, 41)).unwrap();
        let counter = gate.registry().get_component::<Counter>(entity).unwrap();
        assert_eq!(counter.as_deref(), Some(&Counter(41)));
    }

    #[test]
    fn test_job_error_propagates_without_rollback() {
        let gate = gate();
        let result: Result<(), RegistryError> = gate.run(|registry| {
            let e = registry.create_entity(None);
            registry.kill_entity(e)?;
            // Second kill is a lifecycle bug.
            registry.kill_entity(e)?;
            Ok(())
        });

        assert_eq!(result, Err(RegistryError::UnknownOrDeadEntity(Entity::from_raw(0))));

        // A partially applied job stays applied.
        let kept: Result<(), RegistryError> = gate.run(|registry| {
            registry.create_entity(Some("kept"));
            registry.kill_entity(Entity::from_raw(999))
        });
        assert!(kept.is_err());
        assert_eq!(gate.registry().entity_count(), 1);
    }

    #[test]
    fn test_lock_released_after_error() {
        let gate = gate();
        let failed: Result<(), &str> = gate.run(|_| Err("boom"));
        assert_eq!(failed, Err("boom"));

        let value: Result<u32, RegistryError> = gate.run(|_| Ok(7));
        assert_eq!(value, Ok(7));
    }

    #[test]
    fn test_lock_released_after_panic() {
        let gate = gate();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let _: Result<(), RegistryError> = gate.run(|_| panic!("job blew up"));
        }));
        assert!(outcome.is_err());

        let after: Result<usize, RegistryError> = gate.run(|registry| {
            registry.create_entity(None);
            Ok(registry.entity_count())
        });
        assert_eq!(after, Ok(1));
    }

    #[test]
    fn test_jobs_do_not_overlap() {
        let gate = Arc::new(gate());
        let inside = Arc::new(AtomicBool::new(false));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let gate = Arc::clone(&gate);
                let inside = Arc::clone(&inside);
                thread::spawn(move || {
                    for _ in 0..10 {
                        let _: Result<(), RegistryError> = gate.run(|_| {
                            assert!(!inside.swap(true, Ordering::SeqCst), "jobs overlapped");
                            thread::sleep(Duration::from_micros(200));
                            inside.store(false, Ordering::SeqCst);
                            Ok(())
                        });
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(gate.jobs_executed(), 40);
    }

    #[test]
    fn test_into_registry() {
        let gate = gate();
        let _: Result<(), RegistryError> = gate.run(|registry| {
            registry.create_entity(None);
            Ok(())
        });
        let registry = gate.into_registry();
        assert_eq!(registry.entity_count(), 1);
    }
}
