//! NodeProvisioner - ラウンドの駆動と pending launch の台帳
//!
//! # フロー（1 ラベル・1 ラウンド）
//! 1. ラベルの台帳をロック（同じラベルのラウンドは直列化、別ラベルは並行）
//! 2. 台帳の launch 数を planned capacity として StrategyState を作成
//! 3. StrategyChain を実行
//! 4. このラウンドで記録された launch を台帳へ移す（chain が失敗しても移す）
//! 5. RoundReport を返す
//!
//! launch が executor として接続されたら（または起動に失敗したら）、
//! agent lifecycle 側が `launch_materialized` / `launch_failed` で台帳から外す。
//! 空になり、誰も参照していない台帳は map から取り除く。

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::Mutex as AsyncMutex;
use tracing::{info, warn};

use crate::app::chain::StrategyChain;
use crate::app::status::RoundReport;
use crate::domain::{Label, LaunchId, LoadSnapshot, PendingLaunch, ProvisionError, StrategyState};
use crate::ports::{IdGenerator, ProviderRegistry};

type Ledger = Arc<AsyncMutex<Vec<PendingLaunch>>>;

pub struct NodeProvisioner {
    chain: StrategyChain,
    registry: Arc<dyn ProviderRegistry>,
    ids: Arc<dyn IdGenerator>,
    ledgers: Mutex<HashMap<Label, Ledger>>,
}

impl NodeProvisioner {
    pub(crate) fn new(
        chain: StrategyChain,
        registry: Arc<dyn ProviderRegistry>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            chain,
            registry,
            ids,
            ledgers: Mutex::new(HashMap::new()),
        }
    }

    pub fn chain(&self) -> &StrategyChain {
        &self.chain
    }

    /// Number of labels that currently have a ledger.
    pub fn tracked_labels(&self) -> usize {
        self.ledgers().len()
    }

    fn ledgers(&self) -> MutexGuard<'_, HashMap<Label, Ledger>> {
        self.ledgers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Ledger for a round; created on first use.
    fn ledger(&self, label: &Label) -> Ledger {
        self.ledgers().entry(label.clone()).or_default().clone()
    }

    fn existing_ledger(&self, label: &Label) -> Option<Ledger> {
        self.ledgers().get(label).cloned()
    }

    /// Drop the map entry for `label` if it is empty and `ledger` is the
    /// only handle besides the map's own.
    ///
    /// Every clone out of the map happens under the `ledgers` lock, so the
    /// strong count cannot grow while it is held.
    fn prune(&self, label: &Label, ledger: Ledger) {
        let mut ledgers = self.ledgers();
        let Some(tracked) = ledgers.get(label) else {
            return;
        };
        if !Arc::ptr_eq(tracked, &ledger) || Arc::strong_count(&ledger) != 2 {
            return;
        }
        let empty = ledger
            .try_lock()
            .map(|pending| pending.is_empty())
            .unwrap_or(false);
        if empty {
            ledgers.remove(label);
        }
    }

    /// Run one round of the strategy chain for `label`.
    pub async fn run_round(
        &self,
        label: Label,
        snapshot: LoadSnapshot,
    ) -> Result<RoundReport, ProvisionError> {
        let ledger = self.ledger(&label);
        let round_id = self.ids.generate_round_id();

        let (planned, result, state) = {
            let mut pending = ledger.lock().await;
            let planned = u32::try_from(pending.len()).unwrap_or(u32::MAX);
            let mut state = StrategyState::new(label.clone(), snapshot, planned);
            let result = self.chain.run(&mut state, self.registry.as_ref()).await;
            pending.extend(state.pending_launches().iter().cloned());
            (planned, result, state)
        };
        self.prune(&label, ledger);

        let available_before = state.snapshot().existing_capacity().saturating_add(planned);
        let available_after = state.available_capacity();
        let demand = state.current_demand();
        let launch_ids: Vec<LaunchId> = state.pending_launches().iter().map(|l| l.id).collect();

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(
                    %round_id,
                    %label,
                    error = %err,
                    recorded = launch_ids.len(),
                    "provisioning round aborted"
                );
                return Err(err);
            }
        };

        info!(
            %round_id,
            %label,
            demand,
            available_before,
            available_after,
            launched = launch_ids.len(),
            decision = ?outcome.decision,
            "provisioning round finished"
        );

        Ok(RoundReport {
            round_id,
            label,
            snapshot,
            planned_from_prior_rounds: planned,
            demand,
            available_before,
            available_after,
            decision: outcome.decision,
            completed_by: outcome.completed_by,
            launches: launch_ids,
        })
    }

    /// Launches still counted as planned capacity for `label`.
    pub async fn pending_launches(&self, label: &Label) -> Vec<PendingLaunch> {
        match self.existing_ledger(label) {
            Some(ledger) => ledger.lock().await.clone(),
            None => Vec::new(),
        }
    }

    pub async fn planned_capacity(&self, label: &Label) -> u32 {
        let count = match self.existing_ledger(label) {
            Some(ledger) => ledger.lock().await.len(),
            None => 0,
        };
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// The executor behind `id` connected; it now shows up in the load snapshot.
    pub async fn launch_materialized(&self, label: &Label, id: LaunchId) -> bool {
        let removed = self.remove_launch(label, id).await;
        if removed {
            info!(%label, launch = %id, "launch materialized");
        }
        removed
    }

    /// The executor behind `id` never came up; stop counting it as planned.
    pub async fn launch_failed(&self, label: &Label, id: LaunchId) -> bool {
        let removed = self.remove_launch(label, id).await;
        if removed {
            warn!(%label, launch = %id, "launch failed");
        }
        removed
    }

    async fn remove_launch(&self, label: &Label, id: LaunchId) -> bool {
        let Some(ledger) = self.existing_ledger(label) else {
            return false;
        };
        let removed = {
            let mut pending = ledger.lock().await;
            let before = pending.len();
            pending.retain(|launch| launch.id != id);
            pending.len() != before
        };
        self.prune(label, ledger);
        removed
    }
}
