//! Impls - 実装
//!
//! # 含まれる実装
//! - **NoDelayStrategy**: 待たずに provision する strategy
//! - **InMemoryProviderRegistry**: プロセス内の provider 一覧
//! - **PoolProvider**: 上限付きの開発用 provider
//!
//! 本番の provider（Kubernetes, クラウド VM など）は別クレートに置く想定。

pub mod no_delay;
pub mod pool;
pub mod registry;

pub use self::no_delay::NoDelayStrategy;
pub use self::pool::{PoolProvider, ProvisionRequest};
pub use self::registry::{InMemoryProviderRegistry, RegistryError};
