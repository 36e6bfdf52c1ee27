use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::debug;

use crate::tl::{Registry, Result, Schema};

/// Shared, atomically replaceable registry.
///
/// Readers take a snapshot with [`RegistryHandle::load`] and keep decoding against it even if a
/// writer publishes a new registry meanwhile.
#[derive(Debug, Clone)]
pub struct RegistryHandle {
	current: Arc<ArcSwap<Registry>>,
}

impl RegistryHandle {
	/// Wrap an already built registry.
	pub fn new(registry: Registry) -> Self {
		Self {
			current: Arc::new(ArcSwap::from_pointee(registry)),
		}
	}

	/// Snapshot of the currently published registry.
	pub fn load(&self) -> Arc<Registry> {
		self.current.load_full()
	}

	/// Publish `registry`, returning the one it replaced.
	pub fn store(&self, registry: Registry) -> Arc<Registry> {
		let previous = self.current.swap(Arc::new(registry));
		debug!(layer = ?self.current.load().layer(), previous_layer = ?previous.layer(), "swapped registry");
		previous
	}

	/// Build a registry from `schema` and publish it; the old registry stays live on failure.
	pub fn rebuild(&self, schema: Schema) -> Result<Arc<Registry>> {
		let registry = Registry::build(schema)?;
		Ok(self.store(registry))
	}
}

impl From<Registry> for RegistryHandle {
	fn from(registry: Registry) -> Self {
		Self::new(registry)
	}
}
