//! Provisioner configuration and the operator kill-switch.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::domain::ProviderFamily;

/// Environment variable that disables no-delay provisioning.
pub const DISABLE_NO_DELAY_ENV: &str = "NODELAY_DISABLE_NO_DELAY_PROVISIONING";

/// Environment variable naming the provider family the no-delay strategy serves.
pub const PROVIDER_FAMILY_ENV: &str = "NODELAY_PROVIDER_FAMILY";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionerConfig {
    pub disable_no_delay_provisioning: bool,
    pub provider_family: ProviderFamily,
}

impl Default for ProvisionerConfig {
    fn default() -> Self {
        Self {
            disable_no_delay_provisioning: false,
            provider_family: ProviderFamily::kubernetes(),
        }
    }
}

impl ProvisionerConfig {
    /// Load from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary lookup, e.g. a map in tests.
    ///
    /// The kill-switch is on only when the value is `true`, ignoring case.
    /// Anything else, including garbage, leaves the strategy enabled.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let disable_no_delay_provisioning = lookup(DISABLE_NO_DELAY_ENV)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let provider_family = lookup(PROVIDER_FAMILY_ENV)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(ProviderFamily::new)
            .unwrap_or_else(ProviderFamily::kubernetes);

        Self {
            disable_no_delay_provisioning,
            provider_family,
        }
    }

    pub fn kill_switch(&self) -> KillSwitch {
        KillSwitch::new(self.disable_no_delay_provisioning)
    }
}

/// Shared on/off switch for a strategy.
///
/// Injected at construction and read on every evaluation, so an operator can
/// flip it at runtime and tests can toggle it per case.
#[derive(Debug, Clone, Default)]
pub struct KillSwitch {
    disabled: Arc<AtomicBool>,
}

impl KillSwitch {
    pub fn new(disabled: bool) -> Self {
        Self {
            disabled: Arc::new(AtomicBool::new(disabled)),
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::Relaxed)
    }

    pub fn set_disabled(&self, disabled: bool) {
        self.disabled.store(disabled, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[rstest]
    #[case::lowercase("true", true)]
    #[case::uppercase("TRUE", true)]
    #[case::mixed("TrUe", true)]
    #[case::padded(" true ", false)]
    #[case::falsy("false", false)]
    #[case::one("1", false)]
    #[case::garbage("yes please", false)]
    fn kill_switch_parsing(#[case] raw: &str, #[case] expected: bool) {
        let config = ProvisionerConfig::from_lookup(lookup_from(&[(DISABLE_NO_DELAY_ENV, raw)]));
        assert_eq!(config.disable_no_delay_provisioning, expected);
    }

    #[test]
    fn missing_variables_use_defaults() {
        let config = ProvisionerConfig::from_lookup(|_| None);
        assert_eq!(config, ProvisionerConfig::default());
    }

    #[test]
    fn provider_family_can_be_overridden() {
        let config = ProvisionerConfig::from_lookup(lookup_from(&[(PROVIDER_FAMILY_ENV, "nomad")]));
        assert_eq!(config.provider_family, ProviderFamily::new("nomad"));
    }

    #[test]
    fn kill_switch_clones_share_state() {
        let switch = KillSwitch::new(false);
        let handle = switch.clone();
        handle.set_disabled(true);
        assert!(switch.is_disabled());
    }
}
