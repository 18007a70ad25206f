//! InMemoryProviderRegistry - プロセス内の provider 一覧
//!
//! # 実装詳細
//! - RwLock<Vec<Arc<dyn CapacityProvider>>> で登録順を保持
//! - `list()` は Vec を clone して返す（iteration 中の変更を見ない）

use std::sync::{Arc, RwLock};

use crate::domain::ProvisionError;
use crate::ports::{CapacityProvider, ProviderRegistry};

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("provider '{0}' is already registered")]
    AlreadyRegistered(String),

    #[error("provider registry lock poisoned")]
    Poisoned,
}

#[derive(Default)]
pub struct InMemoryProviderRegistry {
    providers: RwLock<Vec<Arc<dyn CapacityProvider>>>,
}

impl InMemoryProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider. Names must be unique.
    pub fn register(&self, provider: Arc<dyn CapacityProvider>) -> Result<(), RegistryError> {
        let mut providers = self
            .providers
            .write()
            .map_err(|_| RegistryError::Poisoned)?;
        if providers.iter().any(|p| p.name() == provider.name()) {
            return Err(RegistryError::AlreadyRegistered(provider.name().to_string()));
        }
        providers.push(provider);
        Ok(())
    }

    /// Remove a provider by name. Returns whether it was registered.
    pub fn deregister(&self, name: &str) -> Result<bool, RegistryError> {
        let mut providers = self
            .providers
            .write()
            .map_err(|_| RegistryError::Poisoned)?;
        let before = providers.len();
        providers.retain(|p| p.name() != name);
        Ok(providers.len() != before)
    }

    pub fn len(&self) -> usize {
        self.providers.read().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ProviderRegistry for InMemoryProviderRegistry {
    fn list(&self) -> Result<Vec<Arc<dyn CapacityProvider>>, ProvisionError> {
        self.providers
            .read()
            .map(|providers| providers.clone())
            .map_err(|_| ProvisionError::RegistryUnavailable("lock poisoned".to_string()))
    }
}
