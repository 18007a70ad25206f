//! Label and provider family tags.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for a class of interchangeable work.
///
/// The label has no internal structure here; it is only compared for equality
/// and handed to providers, which decide whether they can serve it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Family tag of a capacity provider.
///
/// A strategy only consults providers of its own family; providers of other
/// families are left to the strategies that serve them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderFamily(String);

impl ProviderFamily {
    /// Family served by the no-delay strategy unless configured otherwise.
    pub const KUBERNETES: &'static str = "kubernetes";

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn kubernetes() -> Self {
        Self::new(Self::KUBERNETES)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_compare_by_value() {
        assert_eq!(Label::new("linux"), Label::from("linux"));
        assert_ne!(Label::new("linux"), Label::new("windows"));
    }

    #[test]
    fn label_serializes_as_plain_string() {
        let json = serde_json::to_string(&Label::new("gpu")).unwrap();
        assert_eq!(json, "\"gpu\"");
    }

    #[test]
    fn kubernetes_family_is_the_default_tag() {
        assert_eq!(ProviderFamily::kubernetes().as_str(), "kubernetes");
    }
}
