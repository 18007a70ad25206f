//! nodelay-core
//!
//! Provisioning decision strategies for an elastic executor pool.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（label, snapshot, pending launch, strategy state, decision, errors）
//! - **ports**: 抽象化レイヤー（CapacityProvider, ProviderRegistry, ProvisioningStrategy, Clock, IdGenerator）
//! - **impls**: 実装（NoDelayStrategy, InMemoryProviderRegistry, PoolProvider）
//! - **app**: アプリケーションロジック（builder, strategy chain, round driver, reports）
//! - **config**: kill-switch と provider family の設定

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;
