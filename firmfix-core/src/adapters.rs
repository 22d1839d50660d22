//! Default port implementations.

use anyhow::Context;
use firmfix_repair::OllamaClient;

use crate::settings::PipelineSettings;

/// HTTP inference client for the configured endpoint and timeout.
pub fn inference_client(settings: &PipelineSettings) -> anyhow::Result<OllamaClient> {
    OllamaClient::new(&settings.endpoint, settings.timeouts.inference)
        .with_context(|| format!("create inference client for {}", settings.endpoint))
}
