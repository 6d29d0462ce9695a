//! Seams between the dispatcher and its collaborators: where credentials
//! come from and how a built request reaches the network.

use std::collections::HashMap;

use async_trait::async_trait;
use cotask_core::config::ProvidersConfig;
use cotask_core::types::ProviderTag;

use crate::request::ProviderRequest;

/// Read-only view of the stored API keys.
///
/// The dispatcher never writes; keys are managed by the settings UI.
pub trait CredentialStore: Send + Sync {
    /// The key for `provider`, or `None` when absent or empty.
    fn lookup(&self, provider: ProviderTag) -> Option<String>;
}

impl CredentialStore for ProvidersConfig {
    fn lookup(&self, provider: ProviderTag) -> Option<String> {
        self.api_key(provider).map(String::from)
    }
}

impl CredentialStore for HashMap<ProviderTag, String> {
    fn lookup(&self, provider: ProviderTag) -> Option<String> {
        self.get(&provider)
            .map(|key| key.trim())
            .filter(|key| !key.is_empty())
            .map(String::from)
    }
}

/// Status and body of an HTTP response, read in full.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one built request and returns the raw response.
///
/// Errors mean no response was obtained (DNS, connect, timeout, body read).
/// A non-2xx status is a response, not an error.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ProviderRequest) -> anyhow::Result<RawResponse>;
}
