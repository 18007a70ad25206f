//! Status - ラウンドの結果レポート
//!
//! Decision だけでは「何もしなかった」と「要求したが足りなかった」を区別できないので、
//! ラウンドごとの数字をここに残す。

use serde::{Deserialize, Serialize};

use crate::domain::{Decision, Label, LaunchId, LoadSnapshot, RoundId};

/// Serializable summary of one provisioning round for one label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundReport {
    pub round_id: RoundId,
    pub label: Label,
    pub snapshot: LoadSnapshot,

    /// Launches from earlier rounds still counted as planned capacity.
    pub planned_from_prior_rounds: u32,

    pub demand: u32,
    pub available_before: u32,
    pub available_after: u32,
    pub decision: Decision,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_by: Option<String>,

    /// Launches recorded during this round.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub launches: Vec<LaunchId>,
}

impl RoundReport {
    /// Capacity units still missing after the round.
    pub fn shortfall(&self) -> u32 {
        self.demand.saturating_sub(self.available_after)
    }
}
