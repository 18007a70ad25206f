//! ProviderRegistry port - provider 一覧の取得

use std::sync::Arc;

use crate::domain::ProvisionError;
use crate::ports::CapacityProvider;

/// Global set of capacity providers.
///
/// The registry is shared and synchronized by its implementation. `list`
/// returns an owned copy of the current membership, so a caller iterating over
/// it never observes a registry mutated mid-iteration.
pub trait ProviderRegistry: Send + Sync {
    fn list(&self) -> Result<Vec<Arc<dyn CapacityProvider>>, ProvisionError>;
}
