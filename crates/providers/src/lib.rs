//! Completion-service adapters for studyclaw.
//!
//! Both adapters implement the `studyclaw_core::Provider` trait: the
//! stateless one resends the full history every call, the stateful one
//! continues a server-side conversation. The `Gateway` sits in front of
//! whichever adapter configuration selects and enforces the request
//! spacing.

pub mod conversations;
pub mod gateway;
pub mod mistral;

use std::sync::Arc;

pub use conversations::ConversationsProvider;
pub use gateway::Gateway;
pub use mistral::MistralProvider;

use studyclaw_core::error::ProviderError;
use studyclaw_core::provider::Provider;

/// Build the configured provider adapter.
pub fn build_from_config(
    config: &studyclaw_config::AppConfig,
) -> Result<Arc<dyn Provider>, ProviderError> {
    let api_key = config
        .api_key
        .clone()
        .ok_or_else(|| ProviderError::NotConfigured("No API key configured".into()))?;

    match config.provider.as_str() {
        "mistral" => {
            let mut provider = MistralProvider::new(api_key);
            if let Some(url) = &config.api_url {
                provider = provider.with_base_url(url);
            }
            Ok(Arc::new(provider))
        }
        "mistral-conversations" => {
            let mut provider = ConversationsProvider::new(api_key);
            if let Some(url) = &config.api_url {
                provider = provider.with_base_url(url);
            }
            Ok(Arc::new(provider))
        }
        other => Err(ProviderError::NotConfigured(format!(
            "Unknown provider '{other}' (expected \"mistral\" or \"mistral-conversations\")"
        ))),
    }
}
