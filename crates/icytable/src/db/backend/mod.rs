//! Module: backend
//! Responsibility: the handle through which every index reaches storage.
//! A backend owns one commitment store, one index store, optional hooks
//! and the engine configuration.

mod hooks;

#[cfg(test)]
mod tests;

pub use hooks::Hooks;

use crate::{
    config::{ConfigError, EngineConfig},
    db::{
        commitment,
        store::{CommitmentStore, IndexStore},
    },
};
use canic_cdk::structures::{DefaultMemoryImpl, memory::VirtualMemory};

///
/// ReadBackend
///
/// Read-only access to both stores. Many readers may hold one at once.
///

pub trait ReadBackend {
    fn commitment_store_reader(&self) -> &CommitmentStore;

    fn index_store_reader(&self) -> &IndexStore;

    fn config(&self) -> &EngineConfig;
}

///
/// Backend
///
/// Write access. Holding `&mut dyn Backend` is the write lock: a batch
/// writer borrows it for its whole scope.
///

pub trait Backend: ReadBackend {
    fn commitment_store_mut(&mut self) -> &mut CommitmentStore;

    fn index_store_mut(&mut self) -> &mut IndexStore;

    fn hooks(&self) -> Option<&dyn Hooks>;
}

///
/// StoreBackend
///
/// Concrete backend over two stable-memory B-tree maps.
///

pub struct StoreBackend {
    commitment: CommitmentStore,
    index: IndexStore,
    hooks: Option<Box<dyn Hooks>>,
    config: EngineConfig,
}

impl StoreBackend {
    #[must_use]
    /// Initialize a backend over two distinct memory regions.
    pub fn init(
        commitment_memory: VirtualMemory<DefaultMemoryImpl>,
        index_memory: VirtualMemory<DefaultMemoryImpl>,
    ) -> Self {
        Self {
            commitment: CommitmentStore::init(commitment_memory),
            index: IndexStore::init(index_memory),
            hooks: None,
            config: EngineConfig::default(),
        }
    }

    #[must_use]
    pub fn with_hooks(mut self, hooks: impl Hooks + 'static) -> Self {
        self.hooks = Some(Box::new(hooks));
        self
    }

    /// Replace the engine configuration after validating it.
    pub fn with_config(mut self, config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        self.config = config;

        Ok(self)
    }

    /// SHA-256 digest of the commitment store contents.
    #[must_use]
    pub fn commitment_root(&self) -> [u8; 32] {
        commitment::commitment_root(&self.commitment)
    }

    /// Clear both stores.
    pub fn clear(&mut self) {
        self.commitment.clear();
        self.index.clear();
    }
}

impl ReadBackend for StoreBackend {
    fn commitment_store_reader(&self) -> &CommitmentStore {
        &self.commitment
    }

    fn index_store_reader(&self) -> &IndexStore {
        &self.index
    }

    fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl Backend for StoreBackend {
    fn commitment_store_mut(&mut self) -> &mut CommitmentStore {
        &mut self.commitment
    }

    fn index_store_mut(&mut self) -> &mut IndexStore {
        &mut self.index
    }

    fn hooks(&self) -> Option<&dyn Hooks> {
        self.hooks.as_deref()
    }
}
