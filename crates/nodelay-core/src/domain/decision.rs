//! Decision model: verdict a provisioning strategy returns to the chain.

use serde::{Deserialize, Serialize};

/// Outcome of one strategy evaluation for a label.
///
/// The chain runner stops on `ProvisioningCompleted` and moves on to the next
/// strategy on `ConsultRemainingStrategies`. Disabled strategies, a missing
/// provider and a short provider all surface as `ConsultRemainingStrategies`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    /// Enough capacity exists or is in flight; no further strategy needs to run.
    ProvisioningCompleted,

    /// Capacity is still short; downstream strategies should get a chance.
    ConsultRemainingStrategies,
}

impl Decision {
    /// Verdict for a given capacity/demand pair.
    pub fn from_capacity(available: u32, demand: u32) -> Self {
        if available >= demand {
            Decision::ProvisioningCompleted
        } else {
            Decision::ConsultRemainingStrategies
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Decision::ProvisioningCompleted)
    }
}
