//! Pending launch: capacity requested from a provider but not yet live.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::LaunchId;
use super::label::Label;

/// Token for one executor that a provider has started creating.
///
/// Each pending launch accounts for exactly one unit of capacity. It outlives
/// the round that requested it and is reconciled later, when the executor
/// either comes online or fails to start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingLaunch {
    pub id: LaunchId,

    /// Name of the provider that accepted the request.
    pub provider: String,

    pub label: Label,

    pub requested_at: DateTime<Utc>,
}

impl PendingLaunch {
    pub fn new(
        id: LaunchId,
        provider: impl Into<String>,
        label: Label,
        requested_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            provider: provider.into(),
            label,
            requested_at,
        }
    }
}
