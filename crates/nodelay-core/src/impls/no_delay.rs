//! NoDelayStrategy - キューに仕事が入った瞬間に provision する strategy
//!
//! executor の起動と破棄が速い provider（Kubernetes Pod など）では、
//! 負荷の推移を見てから provision する必要がない。この strategy は
//! 「使える容量 < 待ち行列」なら即座に不足分を 1 つの provider に要求する。
//!
//! # フロー
//! 1. kill-switch が ON なら何もせず ConsultRemainingStrategies
//! 2. available = live + connecting + 前ラウンドまでの planned + このラウンドの planned
//! 3. available < demand なら provider 一覧をシャッフルし、
//!    family と `can_provision` を満たす最初の 1 つに `demand - available` を要求
//! 4. 得られた launch を state に記録（planned capacity も同時に加算）
//! 5. available >= demand なら ProvisioningCompleted

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::config::{KillSwitch, ProvisionerConfig};
use crate::domain::{Decision, ProviderFamily, ProvisionError, StrategyState};
use crate::ports::{CapacityProvider, ProviderRegistry, ProvisioningStrategy};

pub struct NoDelayStrategy {
    name: String,
    family: ProviderFamily,
    kill_switch: KillSwitch,
    rng: Mutex<StdRng>,
}

impl NoDelayStrategy {
    pub const NAME: &'static str = "no-delay";

    pub fn new(family: ProviderFamily, kill_switch: KillSwitch) -> Self {
        Self::with_rng(family, kill_switch, StdRng::from_entropy())
    }

    /// Deterministic provider order, for tests and simulations.
    pub fn with_seed(family: ProviderFamily, kill_switch: KillSwitch, seed: u64) -> Self {
        Self::with_rng(family, kill_switch, StdRng::seed_from_u64(seed))
    }

    pub fn from_config(config: &ProvisionerConfig) -> Self {
        Self::new(config.provider_family.clone(), config.kill_switch())
    }

    fn with_rng(family: ProviderFamily, kill_switch: KillSwitch, rng: StdRng) -> Self {
        Self {
            name: Self::NAME.to_string(),
            family,
            kill_switch,
            rng: Mutex::new(rng),
        }
    }

    /// Rename, so that several instances serving different families can sit in one chain.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn family(&self) -> &ProviderFamily {
        &self.family
    }

    pub fn kill_switch(&self) -> &KillSwitch {
        &self.kill_switch
    }

    /// Uniform random permutation of the registry snapshot.
    ///
    /// The RNG lock is released before any provider is called.
    fn shuffled(
        &self,
        mut providers: Vec<Arc<dyn CapacityProvider>>,
    ) -> Vec<Arc<dyn CapacityProvider>> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        providers.shuffle(&mut *rng);
        providers
    }
}

#[async_trait]
impl ProvisioningStrategy for NoDelayStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    async fn apply(
        &self,
        state: &mut StrategyState,
        registry: &dyn ProviderRegistry,
    ) -> Result<Decision, ProvisionError> {
        if self.kill_switch.is_disabled() {
            debug!("provisioning not complete, no-delay strategy is disabled");
            return Ok(Decision::ConsultRemainingStrategies);
        }

        let label = state.label().clone();
        let demand = state.current_demand();
        let mut available = state.available_capacity();
        debug!(%label, available, demand, "evaluating capacity");

        if available < demand {
            for provider in self.shuffled(registry.list()?) {
                if provider.family() != &self.family {
                    continue;
                }
                if !provider.can_provision(&label) {
                    continue;
                }

                let launches = provider.provision(&label, demand - available).await?;
                let planned = state.record_pending_launches(launches);
                available = state.available_capacity();
                debug!(
                    %label,
                    provider = provider.name(),
                    planned,
                    available,
                    demand,
                    "planned new executors"
                );
                break;
            }
        }

        let decision = Decision::from_capacity(available, demand);
        if decision.is_complete() {
            debug!(%label, "provisioning completed");
        } else {
            debug!(
                %label,
                available,
                demand,
                "provisioning not complete, consulting remaining strategies"
            );
        }
        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Label, LoadSnapshot, PendingLaunch};
    use crate::impls::{InMemoryProviderRegistry, PoolProvider};
    use rstest::rstest;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn linux() -> Label {
        Label::new("linux")
    }

    fn strategy(seed: u64) -> NoDelayStrategy {
        NoDelayStrategy::with_seed(ProviderFamily::kubernetes(), KillSwitch::default(), seed)
    }

    fn k8s_pool(name: &str, quota: u32) -> Arc<PoolProvider> {
        Arc::new(PoolProvider::new(
            name,
            ProviderFamily::kubernetes(),
            [linux()],
            quota,
        ))
    }

    fn registry_of(providers: &[Arc<PoolProvider>]) -> InMemoryProviderRegistry {
        let registry = InMemoryProviderRegistry::new();
        for provider in providers {
            registry.register(provider.clone()).unwrap();
        }
        registry
    }

    /// Registry that counts how often it is listed.
    struct CountingRegistry {
        inner: InMemoryProviderRegistry,
        lists: AtomicUsize,
    }

    impl ProviderRegistry for CountingRegistry {
        fn list(&self) -> Result<Vec<Arc<dyn CapacityProvider>>, ProvisionError> {
            self.lists.fetch_add(1, Ordering::SeqCst);
            self.inner.list()
        }
    }

    struct FailingProvider {
        family: ProviderFamily,
    }

    #[async_trait]
    impl CapacityProvider for FailingProvider {
        fn name(&self) -> &str {
            "broken"
        }

        fn family(&self) -> &ProviderFamily {
            &self.family
        }

        fn can_provision(&self, _label: &Label) -> bool {
            true
        }

        async fn provision(
            &self,
            _label: &Label,
            _count: u32,
        ) -> Result<Vec<PendingLaunch>, ProvisionError> {
            Err(ProvisionError::provider_failed(
                "broken",
                "api server unreachable",
            ))
        }
    }

    #[tokio::test]
    async fn partial_capacity_is_topped_up_to_completion() {
        // 2 live + 1 connecting, 5 queued, provider can add 2
        let pool = k8s_pool("pool", 2);
        let registry = registry_of(&[pool.clone()]);
        let mut state = StrategyState::new(linux(), LoadSnapshot::new(2, 1, 5), 0);

        let decision = strategy(1).apply(&mut state, &registry).await.unwrap();

        assert_eq!(decision, Decision::ProvisioningCompleted);
        assert_eq!(state.pending_launches().len(), 2);
        assert_eq!(state.additional_planned_capacity(), 2);
        assert_eq!(pool.requests().len(), 1);
        assert_eq!(pool.requests()[0].count, 2);
    }

    #[tokio::test]
    async fn no_providers_consults_remaining() {
        let registry = InMemoryProviderRegistry::new();
        let mut state = StrategyState::new(linux(), LoadSnapshot::new(0, 0, 1), 0);
        let before = state.clone();

        let decision = strategy(1).apply(&mut state, &registry).await.unwrap();

        assert_eq!(decision, Decision::ConsultRemainingStrategies);
        assert_eq!(state, before);
    }

    #[rstest]
    #[case::surplus(LoadSnapshot::new(10, 0, 2), 0)]
    #[case::exact(LoadSnapshot::new(1, 1, 5), 3)]
    #[case::idle(LoadSnapshot::new(0, 0, 0), 0)]
    #[case::planned_only(LoadSnapshot::new(0, 0, 4), 4)]
    #[tokio::test]
    async fn sufficient_capacity_requests_nothing(
        #[case] snapshot: LoadSnapshot,
        #[case] planned: u32,
    ) {
        let pool = k8s_pool("pool", 100);
        let registry = registry_of(&[pool.clone()]);
        let mut state = StrategyState::new(linux(), snapshot, planned);
        let before = state.clone();

        let decision = strategy(1).apply(&mut state, &registry).await.unwrap();

        assert_eq!(decision, Decision::ProvisioningCompleted);
        assert!(pool.requests().is_empty());
        assert_eq!(state, before);
    }

    #[tokio::test]
    async fn capacity_planned_earlier_this_round_is_not_requested_again() {
        let pool = k8s_pool("pool", 100);
        let registry = registry_of(&[pool.clone()]);
        let mut state = StrategyState::new(linux(), LoadSnapshot::new(1, 0, 6), 2);
        let earlier = pool.provision(&linux(), 1).await.unwrap();
        state.record_pending_launches(earlier);

        let decision = strategy(3).apply(&mut state, &registry).await.unwrap();

        assert_eq!(decision, Decision::ProvisioningCompleted);
        // 1 live + 2 prior rounds + 1 this round leaves 2 to request
        assert_eq!(pool.requests().last().unwrap().count, 2);
        assert_eq!(state.additional_planned_capacity(), 3);
    }

    #[tokio::test]
    async fn disabled_strategy_touches_nothing() {
        let pool = k8s_pool("pool", 100);
        let registry = CountingRegistry {
            inner: registry_of(&[pool.clone()]),
            lists: AtomicUsize::new(0),
        };
        let strategy =
            NoDelayStrategy::with_seed(ProviderFamily::kubernetes(), KillSwitch::new(true), 1);
        let mut state = StrategyState::new(linux(), LoadSnapshot::new(0, 0, 100), 0);
        let before = state.clone();

        let decision = strategy.apply(&mut state, &registry).await.unwrap();

        assert_eq!(decision, Decision::ConsultRemainingStrategies);
        assert_eq!(registry.lists.load(Ordering::SeqCst), 0);
        assert!(pool.requests().is_empty());
        assert_eq!(state, before);
    }

    #[tokio::test]
    async fn kill_switch_is_read_on_every_call() {
        let pool = k8s_pool("pool", 100);
        let registry = registry_of(&[pool.clone()]);
        let strategy = strategy(1);

        strategy.kill_switch().set_disabled(true);
        let mut state = StrategyState::new(linux(), LoadSnapshot::new(0, 0, 1), 0);
        let decision = strategy.apply(&mut state, &registry).await.unwrap();
        assert_eq!(decision, Decision::ConsultRemainingStrategies);

        strategy.kill_switch().set_disabled(false);
        let decision = strategy.apply(&mut state, &registry).await.unwrap();
        assert_eq!(decision, Decision::ProvisioningCompleted);
        assert_eq!(pool.requests().len(), 1);
    }

    #[tokio::test]
    async fn short_provider_reflects_returned_capacity() {
        let pool = k8s_pool("pool", 1);
        let registry = registry_of(&[pool.clone()]);
        let mut state = StrategyState::new(linux(), LoadSnapshot::new(0, 0, 4), 0);

        let decision = strategy(1).apply(&mut state, &registry).await.unwrap();

        assert_eq!(decision, Decision::ConsultRemainingStrategies);
        assert_eq!(pool.requests()[0].count, 4);
        assert_eq!(state.available_capacity(), 1);
    }

    #[tokio::test]
    async fn empty_provider_answer_is_not_an_error() {
        let pool = k8s_pool("pool", 0);
        let registry = registry_of(&[pool.clone()]);
        let mut state = StrategyState::new(linux(), LoadSnapshot::new(1, 0, 3), 0);

        let decision = strategy(1).apply(&mut state, &registry).await.unwrap();

        assert_eq!(decision, Decision::ConsultRemainingStrategies);
        assert!(state.pending_launches().is_empty());
        assert_eq!(pool.requests().len(), 1);
    }

    #[tokio::test]
    async fn only_one_provider_is_consulted_even_when_still_short() {
        let pools: Vec<_> = (0..4).map(|i| k8s_pool(&format!("pool-{i}"), 1)).collect();
        let registry = registry_of(&pools);
        let mut state = StrategyState::new(linux(), LoadSnapshot::new(0, 0, 10), 0);

        let decision = strategy(9).apply(&mut state, &registry).await.unwrap();

        assert_eq!(decision, Decision::ConsultRemainingStrategies);
        let consulted: usize = pools.iter().map(|p| p.requests().len()).sum();
        assert_eq!(consulted, 1);
    }

    #[tokio::test]
    async fn ineligible_providers_never_receive_requests() {
        let other_family = Arc::new(PoolProvider::new(
            "ec2",
            ProviderFamily::new("ec2"),
            [linux()],
            100,
        ));
        let wrong_label = Arc::new(PoolProvider::new(
            "k8s-windows",
            ProviderFamily::kubernetes(),
            [Label::new("windows")],
            100,
        ));
        let eligible = k8s_pool("k8s-linux", 100);
        let registry = registry_of(&[other_family.clone(), wrong_label.clone(), eligible.clone()]);

        for seed in 0..50 {
            let mut state = StrategyState::new(linux(), LoadSnapshot::new(0, 0, 1), 0);
            let decision = strategy(seed).apply(&mut state, &registry).await.unwrap();
            assert_eq!(decision, Decision::ProvisioningCompleted);
        }

        assert!(other_family.requests().is_empty());
        assert!(wrong_label.requests().is_empty());
        assert_eq!(eligible.requests().len(), 50);
    }

    #[tokio::test]
    async fn selection_is_roughly_uniform_across_eligible_providers() {
        const TRIALS: usize = 3000;
        let pools: Vec<_> = (0..3)
            .map(|i| k8s_pool(&format!("pool-{i}"), u32::MAX))
            .collect();
        let registry = registry_of(&pools);
        let strategy = strategy(42);

        for _ in 0..TRIALS {
            let mut state = StrategyState::new(linux(), LoadSnapshot::new(0, 0, 1), 0);
            strategy.apply(&mut state, &registry).await.unwrap();
        }

        let counts: HashMap<String, usize> = pools
            .iter()
            .map(|p| (p.name().to_string(), p.requests().len()))
            .collect();
        assert_eq!(counts.values().sum::<usize>(), TRIALS);
        for (name, count) in counts {
            assert!(
                (800..=1200).contains(&count),
                "provider {name} selected {count} times out of {TRIALS}"
            );
        }
    }

    #[tokio::test]
    async fn provider_errors_propagate() {
        let registry = InMemoryProviderRegistry::new();
        registry
            .register(Arc::new(FailingProvider {
                family: ProviderFamily::kubernetes(),
            }))
            .unwrap();
        let mut state = StrategyState::new(linux(), LoadSnapshot::new(0, 0, 2), 0);

        let err = strategy(1).apply(&mut state, &registry).await.unwrap_err();

        assert!(matches!(
            err,
            ProvisionError::ProviderFailed { ref provider, .. } if provider == "broken"
        ));
        assert!(state.pending_launches().is_empty());
    }

    #[test]
    fn config_wires_family_and_kill_switch() {
        let config = ProvisionerConfig {
            disable_no_delay_provisioning: true,
            provider_family: ProviderFamily::new("nomad"),
        };
        let strategy = NoDelayStrategy::from_config(&config);
        assert_eq!(strategy.family(), &ProviderFamily::new("nomad"));
        assert!(strategy.kill_switch().is_disabled());
        assert_eq!(strategy.name(), "no-delay");
    }
}
