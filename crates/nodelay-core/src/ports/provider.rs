//! CapacityProvider port - 計算資源を作る側の抽象化
//!
//! 実際にどうやって executor を起動するか（Pod, VM, container）は provider の責務。
//! strategy は family と `can_provision` で候補を絞り、`provision` を 1 回だけ呼ぶ。

use async_trait::async_trait;

use crate::domain::{Label, PendingLaunch, ProviderFamily, ProvisionError};

/// An entity that can create compute capacity on demand.
///
/// `provision` may return fewer launches than requested, including none; that
/// is not an error. Timeouts are the provider's own business: a call that
/// never returns blocks the strategy that made it.
#[async_trait]
pub trait CapacityProvider: Send + Sync {
    /// Unique name within a registry.
    fn name(&self) -> &str;

    fn family(&self) -> &ProviderFamily;

    fn can_provision(&self, label: &Label) -> bool;

    /// Request `count` units of capacity for `label`.
    async fn provision(
        &self,
        label: &Label,
        count: u32,
    ) -> Result<Vec<PendingLaunch>, ProvisionError>;
}
