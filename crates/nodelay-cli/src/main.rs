use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use nodelay_core::app::{NodeProvisioner, ProvisionerBuilder, RoundReport};
use nodelay_core::config::ProvisionerConfig;
use nodelay_core::domain::{Label, LoadSnapshot, ProviderFamily};
use nodelay_core::impls::{InMemoryProviderRegistry, PoolProvider};

/// Providers the simulation runs against: two Kubernetes pools and one VM pool
/// the no-delay strategy must ignore.
fn build_registry(family: &ProviderFamily) -> anyhow::Result<InMemoryProviderRegistry> {
    let linux = Label::new("linux");
    let registry = InMemoryProviderRegistry::new();
    registry.register(Arc::new(PoolProvider::new(
        "k8s-east",
        family.clone(),
        [linux.clone(), Label::new("gpu")],
        4,
    )))?;
    registry.register(Arc::new(PoolProvider::new(
        "k8s-west",
        family.clone(),
        [linux.clone()],
        3,
    )))?;
    registry.register(Arc::new(PoolProvider::new(
        "vm-pool",
        ProviderFamily::new("vm"),
        [linux],
        100,
    )))?;
    Ok(registry)
}

async fn round(
    provisioner: &NodeProvisioner,
    label: &str,
    snapshot: LoadSnapshot,
) -> anyhow::Result<RoundReport> {
    let report = provisioner
        .run_round(Label::new(label), snapshot)
        .await
        .with_context(|| format!("provisioning round for '{label}'"))?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(report)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // (A) 設定と provider registry
    let config = ProvisionerConfig::from_env();
    info!(
        disabled = config.disable_no_delay_provisioning,
        family = %config.provider_family,
        "starting provisioning simulation"
    );
    let registry = build_registry(&config.provider_family)?;

    // (B) strategy chain（no-delay のみ）
    let provisioner = ProvisionerBuilder::new()
        .with_config(&config)
        .registry(Arc::new(registry))
        .build()?;

    // (C) 5 件の待ちに対して live 2 + connecting 1
    let first = round(&provisioner, "linux", LoadSnapshot::new(2, 1, 5)).await?;

    // (D) 同じ待ち行列のまま次のラウンド: 前ラウンドの launch が planned として数えられる
    round(&provisioner, "linux", LoadSnapshot::new(2, 1, 5)).await?;

    // (E) launch が接続された。待ちが 9 件に増える
    let linux = Label::new("linux");
    for id in &first.launches {
        provisioner.launch_materialized(&linux, *id).await;
    }
    let connected = u32::try_from(first.launches.len())?;
    round(&provisioner, "linux", LoadSnapshot::new(2, 1 + connected, 9)).await?;

    // (F) 別ラベル
    round(&provisioner, "gpu", LoadSnapshot::new(0, 0, 2)).await?;

    Ok(())
}
