//! ProvisioningStrategy port - chain of responsibility の 1 要素
//!
//! # 設計原則
//! - strategy は state を読み、必要なら provider に要求し、Decision を返す
//! - chain の停止判断は Runner（`app::chain`）に任せる

use async_trait::async_trait;

use crate::domain::{Decision, ProvisionError, StrategyState};
use crate::ports::ProviderRegistry;

/// One link of the provisioning strategy chain.
///
/// Implementations must record every launch they obtain through
/// [`StrategyState::record_pending_launches`] before returning, so that later
/// strategies in the same round see the capacity already requested.
#[async_trait]
pub trait ProvisioningStrategy: Send + Sync {
    fn name(&self) -> &str;

    async fn apply(
        &self,
        state: &mut StrategyState,
        registry: &dyn ProviderRegistry,
    ) -> Result<Decision, ProvisionError>;
}
