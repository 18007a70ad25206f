//! Errors - provisioning のエラー型
//!
//! 判断そのもの（足りる / 足りない）はエラーではなく Decision で返す。
//! ここに来るのは provider や registry の失敗だけで、そのまま呼び出し元へ伝播する。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProvisionError {
    /// A provider's `provision` call failed. The current chain traversal is aborted.
    #[error("provider '{provider}' failed to provision: {message}")]
    ProviderFailed { provider: String, message: String },

    /// The provider registry could not produce a snapshot of its members.
    #[error("provider registry unavailable: {0}")]
    RegistryUnavailable(String),
}

impl ProvisionError {
    pub fn provider_failed(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProviderFailed {
            provider: provider.into(),
            message: message.into(),
        }
    }
}
