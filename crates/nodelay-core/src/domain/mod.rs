//! Domain model (labels, snapshots, launches, round state, decisions).

pub mod decision;
pub mod errors;
pub mod ids;
pub mod label;
pub mod launch;
pub mod snapshot;
pub mod state;

pub use decision::Decision;
pub use errors::ProvisionError;
pub use ids::{LaunchId, RoundId};
pub use label::{Label, ProviderFamily};
pub use launch::PendingLaunch;
pub use snapshot::LoadSnapshot;
pub use state::StrategyState;
