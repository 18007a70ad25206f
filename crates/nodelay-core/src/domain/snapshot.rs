//! Demand/capacity snapshot produced by the load statistics subsystem.

use serde::{Deserialize, Serialize};

/// Point-in-time read of capacity and demand for one label.
///
/// Counts are unsigned, so a snapshot can never carry negative capacity or
/// demand. Strategies read it but never mutate it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadSnapshot {
    /// Idle executors that can take work right now.
    pub live_executors: u32,

    /// Executors that exist but have not connected yet.
    pub connecting_executors: u32,

    /// Work items waiting for this label.
    pub queue_length: u32,
}

impl LoadSnapshot {
    pub fn new(live_executors: u32, connecting_executors: u32, queue_length: u32) -> Self {
        Self {
            live_executors,
            connecting_executors,
            queue_length,
        }
    }

    /// Capacity that exists already, live or connecting.
    pub fn existing_capacity(&self) -> u32 {
        self.live_executors
            .saturating_add(self.connecting_executors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn existing_capacity_counts_live_and_connecting() {
        let snapshot = LoadSnapshot::new(2, 1, 5);
        assert_eq!(snapshot.existing_capacity(), 3);
    }

    #[test]
    fn existing_capacity_saturates() {
        let snapshot = LoadSnapshot::new(u32::MAX, 1, 0);
        assert_eq!(snapshot.existing_capacity(), u32::MAX);
    }
}
