//! Process-wide default mediator.
//!
//! [`MediatorFactory::create`] lazily builds one Registry + Mediator pair
//! and hands out clones of it until [`MediatorFactory::reset`] tears it
//! down. Code that wants isolation should build its own [`Mediator`] and
//! pass it around instead; the singleton only backs the [`api`](crate::api)
//! functions.

use parking_lot::Mutex;

use crate::handler::Registry;
use crate::mediator::{Mediator, MediatorBuilder, MediatorConfig};

static SINGLETON: Mutex<Option<Mediator>> = parking_lot::const_mutex(None);

/// Lifecycle manager for the default mediator.
pub struct MediatorFactory;

impl MediatorFactory {
    /// Get the singleton, creating it with default configuration if needed.
    pub fn create() -> Mediator {
        Self::create_with_config(MediatorConfig::default())
    }

    /// Get the singleton, creating it with `config` if needed.
    ///
    /// `config` is ignored when the singleton already exists.
    pub fn create_with_config(config: MediatorConfig) -> Mediator {
        SINGLETON
            .lock()
            .get_or_insert_with(|| {
                tracing::debug!("Creating default mediator");
                MediatorBuilder::new().config(config).build()
            })
            .clone()
    }

    /// Build a standalone mediator over `registry`. The singleton is untouched.
    pub fn create_with_registry(registry: Registry) -> Mediator {
        Mediator::with_registry(registry)
    }

    /// Clear the singleton registry and drop the singleton.
    ///
    /// The next [`create`](Self::create) builds a fresh pair. Handles cloned
    /// before the reset keep pointing at the now empty registry.
    pub fn reset() {
        let previous = SINGLETON.lock().take();
        if let Some(mediator) = previous {
            mediator.registry().reset();
            tracing::debug!("Default mediator reset");
        }
    }

    /// Registry of the singleton, if one has been created.
    pub fn registry() -> Option<Registry> {
        SINGLETON
            .lock()
            .as_ref()
            .map(|mediator| mediator.registry().clone())
    }

    pub fn is_initialized() -> bool {
        SINGLETON.lock().is_some()
    }
}
