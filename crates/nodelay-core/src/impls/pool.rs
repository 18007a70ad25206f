//! PoolProvider - 上限付きの in-memory provider（開発用・テスト用）
//!
//! 実際に executor は起動しない。残り枠（quota）の範囲で pending launch を発行し、
//! 受けた要求を記録するだけ。

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Label, PendingLaunch, ProviderFamily, ProvisionError};
use crate::ports::{CapacityProvider, Clock, IdGenerator, SystemClock, UlidGenerator};

/// One `provision` call as seen by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionRequest {
    pub label: Label,
    pub count: u32,
}

/// Provider backed by a fixed pool of executor slots.
///
/// Each call hands out at most the remaining quota, so a request can be
/// partially or not at all satisfied.
pub struct PoolProvider {
    name: String,
    family: ProviderFamily,
    labels: HashSet<Label>,
    remaining: Mutex<u32>,
    requests: Mutex<Vec<ProvisionRequest>>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl PoolProvider {
    pub fn new(
        name: impl Into<String>,
        family: ProviderFamily,
        labels: impl IntoIterator<Item = Label>,
        quota: u32,
    ) -> Self {
        Self::with_clock(name, family, labels, quota, Arc::new(SystemClock))
    }

    pub fn with_clock(
        name: impl Into<String>,
        family: ProviderFamily,
        labels: impl IntoIterator<Item = Label>,
        quota: u32,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            name: name.into(),
            family,
            labels: labels.into_iter().collect(),
            remaining: Mutex::new(quota),
            requests: Mutex::new(Vec::new()),
            ids: Arc::new(UlidGenerator::new(clock.clone())),
            clock,
        }
    }

    /// Slots still available.
    pub fn remaining(&self) -> u32 {
        *self.slots()
    }

    /// Give slots back, e.g. after a launch failed to start.
    pub fn release(&self, slots: u32) {
        let mut remaining = self.slots();
        *remaining = remaining.saturating_add(slots);
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<ProvisionRequest> {
        self.log().clone()
    }

    fn launch(&self, label: &Label, now: DateTime<Utc>) -> PendingLaunch {
        let id = self.ids.generate_launch_id();
        PendingLaunch::new(id, &self.name, label.clone(), now)
    }

    // Guarded values change in single steps; poisoned data is still valid.
    fn slots(&self) -> MutexGuard<'_, u32> {
        self.remaining
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn log(&self) -> MutexGuard<'_, Vec<ProvisionRequest>> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl CapacityProvider for PoolProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn family(&self) -> &ProviderFamily {
        &self.family
    }

    fn can_provision(&self, label: &Label) -> bool {
        self.labels.contains(label)
    }

    async fn provision(
        &self,
        label: &Label,
        count: u32,
    ) -> Result<Vec<PendingLaunch>, ProvisionError> {
        self.log().push(ProvisionRequest {
            label: label.clone(),
            count,
        });

        let granted = {
            let mut remaining = self.slots();
            let granted = count.min(*remaining);
            *remaining -= granted;
            granted
        };
        debug!(
            provider = %self.name,
            %label,
            requested = count,
            granted,
            "pool provision"
        );

        let now = self.clock.now();
        Ok((0..granted).map(|_| self.launch(label, now)).collect())
    }
}
