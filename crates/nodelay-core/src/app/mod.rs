//! App - アプリケーション層
//!
//! ports を組み合わせて provisioning のラウンドを回します。
//!
//! # 主要コンポーネント
//! - **ProvisionerBuilder**: chain と registry の構築（Fail-fast）
//! - **StrategyChain**: strategy を順に評価し、最初の完了で止める
//! - **NodeProvisioner**: ラウンドの駆動と pending launch の台帳
//! - **RoundReport**: ラウンドごとの結果

pub mod builder;
pub mod chain;
pub mod provisioner;
pub mod status;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, ProvisionerBuilder};
pub use self::chain::{ChainOutcome, StrategyChain};
pub use self::provisioner::NodeProvisioner;
pub use self::status::RoundReport;
