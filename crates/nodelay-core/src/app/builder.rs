//! ProvisionerBuilder - strategy chain と registry のワイヤリング
//!
//! # Fail-fast 設計
//! - strategy が 1 つもない chain は build() で拒否
//! - strategy 名の重複は build() で拒否（レポートの completed_by が曖昧になる）
//! - registry 未設定も build() で拒否

use std::collections::HashSet;
use std::sync::Arc;

use crate::app::chain::StrategyChain;
use crate::app::provisioner::NodeProvisioner;
use crate::config::ProvisionerConfig;
use crate::impls::NoDelayStrategy;
use crate::ports::{
    IdGenerator, ProviderRegistry, ProvisioningStrategy, SystemClock, UlidGenerator,
};

/// # 使用例
/// ```ignore
/// let provisioner = ProvisionerBuilder::new()
///     .with_config(&ProvisionerConfig::from_env())
///     .registry(Arc::new(registry))
///     .build()?;
/// let report = provisioner.run_round(label, snapshot).await?;
/// ```
pub struct ProvisionerBuilder {
    strategies: Vec<Arc<dyn ProvisioningStrategy>>,
    registry: Option<Arc<dyn ProviderRegistry>>,
    ids: Option<Arc<dyn IdGenerator>>,
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("strategy chain is empty")]
    EmptyChain,

    #[error("duplicate strategy names: {0:?}")]
    DuplicateStrategies(Vec<String>),

    #[error("no provider registry configured")]
    MissingRegistry,
}

impl ProvisionerBuilder {
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
            registry: None,
            ids: None,
        }
    }

    /// Append the no-delay strategy configured from `config`.
    pub fn with_config(self, config: &ProvisionerConfig) -> Self {
        self.strategy(Arc::new(NoDelayStrategy::from_config(config)))
    }

    /// Append a strategy; strategies run in the order they were added.
    pub fn strategy(mut self, strategy: Arc<dyn ProvisioningStrategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub fn registry(mut self, registry: Arc<dyn ProviderRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn build(self) -> Result<NodeProvisioner, BuildError> {
        if self.strategies.is_empty() {
            return Err(BuildError::EmptyChain);
        }

        let mut seen = HashSet::new();
        let mut duplicates: Vec<String> = self
            .strategies
            .iter()
            .map(|s| s.name().to_string())
            .filter(|name| !seen.insert(name.clone()))
            .collect();
        if !duplicates.is_empty() {
            duplicates.sort();
            duplicates.dedup();
            return Err(BuildError::DuplicateStrategies(duplicates));
        }

        let registry = self.registry.ok_or(BuildError::MissingRegistry)?;
        let ids: Arc<dyn IdGenerator> = match self.ids {
            Some(ids) => ids,
            None => Arc::new(UlidGenerator::new(SystemClock)),
        };

        Ok(NodeProvisioner::new(
            StrategyChain::new(self.strategies),
            registry,
            ids,
        ))
    }
}

impl Default for ProvisionerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
