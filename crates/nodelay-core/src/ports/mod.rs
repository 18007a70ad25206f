//! Ports - 抽象化レイヤー
//!
//! Hexagonal Architecture の「ポート」。provisioning の判断ロジックが
//! 外部（provider, registry, 時刻, ID）に触れる境界をすべて trait にしています。

pub mod clock;
pub mod id_generator;
pub mod provider;
pub mod registry;
pub mod strategy;

// 主要な trait を再エクスポート
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::provider::CapacityProvider;
pub use self::registry::ProviderRegistry;
pub use self::strategy::ProvisioningStrategy;
