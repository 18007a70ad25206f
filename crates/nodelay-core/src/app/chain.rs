//! StrategyChain - strategy を順番に評価し、最初の完了で止める

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Decision, ProvisionError, StrategyState};
use crate::ports::{ProviderRegistry, ProvisioningStrategy};

/// Result of one chain traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainOutcome {
    pub decision: Decision,

    /// Strategy that returned `ProvisioningCompleted`, if any did.
    pub completed_by: Option<String>,

    /// Number of strategies evaluated before the chain stopped.
    pub evaluated: usize,
}

/// Ordered list of provisioning strategies.
///
/// Strategies share one `StrategyState`; each sees the launches recorded by
/// the ones before it. A provider error aborts the traversal.
#[derive(Clone, Default)]
pub struct StrategyChain {
    strategies: Vec<Arc<dyn ProvisioningStrategy>>,
}

impl StrategyChain {
    pub fn new(strategies: Vec<Arc<dyn ProvisioningStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.strategies.iter().map(|s| s.name().to_string()).collect()
    }

    pub async fn run(
        &self,
        state: &mut StrategyState,
        registry: &dyn ProviderRegistry,
    ) -> Result<ChainOutcome, ProvisionError> {
        let mut evaluated = 0;
        for strategy in &self.strategies {
            evaluated += 1;
            let decision = strategy.apply(state, registry).await?;
            debug!(
                strategy = strategy.name(),
                label = %state.label(),
                ?decision,
                "strategy evaluated"
            );
            if decision.is_complete() {
                return Ok(ChainOutcome {
                    decision,
                    completed_by: Some(strategy.name().to_string()),
                    evaluated,
                });
            }
        }
        Ok(ChainOutcome {
            decision: Decision::ConsultRemainingStrategies,
            completed_by: None,
            evaluated,
        })
    }
}
