//! StrategyState - 1 ラウンド・1 ラベル分の provisioning 状態
//!
//! # 設計原則
//! - Runner がラウンド開始時に作成し、ラウンド終了時に破棄する
//! - chain 内の strategy は順番に同じ state を受け取る（single writer）
//! - pending launch の追記と planned capacity の加算は 1 操作で行う

use serde::{Deserialize, Serialize};

use super::label::Label;
use super::launch::PendingLaunch;
use super::snapshot::LoadSnapshot;

/// Mutable accumulator shared by the strategies of one chain traversal.
///
/// `additional_planned_capacity` is private: the only way to grow it is
/// [`StrategyState::record_pending_launches`], which appends the launches and
/// accounts for them in the same call. A later strategy in the chain therefore
/// always sees what earlier strategies already requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyState {
    label: Label,
    snapshot: LoadSnapshot,
    planned_capacity_snapshot: u32,
    additional_planned_capacity: u32,
    pending_launches: Vec<PendingLaunch>,
}

impl StrategyState {
    /// Create the state for one round.
    ///
    /// `planned_capacity_snapshot` is capacity requested in earlier rounds
    /// that has not materialized yet.
    pub fn new(label: Label, snapshot: LoadSnapshot, planned_capacity_snapshot: u32) -> Self {
        Self {
            label,
            snapshot,
            planned_capacity_snapshot,
            additional_planned_capacity: 0,
            pending_launches: Vec::new(),
        }
    }

    pub fn label(&self) -> &Label {
        &self.label
    }

    pub fn snapshot(&self) -> &LoadSnapshot {
        &self.snapshot
    }

    pub fn planned_capacity_snapshot(&self) -> u32 {
        self.planned_capacity_snapshot
    }

    pub fn additional_planned_capacity(&self) -> u32 {
        self.additional_planned_capacity
    }

    pub fn pending_launches(&self) -> &[PendingLaunch] {
        &self.pending_launches
    }

    /// Demand for this label: the queue length of the snapshot.
    pub fn current_demand(&self) -> u32 {
        self.snapshot.queue_length
    }

    /// Capacity that will serve demand without further action.
    ///
    /// live + connecting + planned in earlier rounds + planned this round.
    pub fn available_capacity(&self) -> u32 {
        self.snapshot
            .existing_capacity()
            .saturating_add(self.planned_capacity_snapshot)
            .saturating_add(self.additional_planned_capacity)
    }

    /// Append launches and add them to this round's planned capacity.
    ///
    /// Returns the number of capacity units recorded.
    pub fn record_pending_launches(&mut self, launches: Vec<PendingLaunch>) -> u32 {
        let count = u32::try_from(launches.len()).unwrap_or(u32::MAX);
        self.additional_planned_capacity = self.additional_planned_capacity.saturating_add(count);
        self.pending_launches.extend(launches);
        count
    }

    /// Hand the recorded launches to the caller at the end of the round.
    pub fn into_pending_launches(self) -> Vec<PendingLaunch> {
        self.pending_launches
    }
}
