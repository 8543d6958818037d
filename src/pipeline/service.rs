//! The generation-service boundary.
//!
//! [`GenerationService`] is the narrow capability interface the rest of the
//! crate depends on: an ordered multimodal payload goes in, one opaque text
//! blob comes out. Keeping the surface this small means the conversion
//! pipeline is testable with a deterministic stand-in instead of a live
//! network dependency.
//!
//! The production implementation, [`LlmGenerationService`], drives an
//! `edgequake-llm` provider. The boundary itself is single-shot with no
//! retry contract, so resilience lives here on the caller's side:
//! exponential backoff (`retry_backoff_ms * 2^attempt`) plus an explicit
//! per-call timeout, since the remote API defines neither.

use crate::config::ConversionConfig;
use crate::error::Docx2AdocError;
use crate::pipeline::payload::{GenerationPayload, PayloadPart};
use crate::prompts::DEFAULT_SYSTEM_PROMPT;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

/// Opaque text-and-image-to-text transformation service.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Submit one document's ordered payload and return the raw generated
    /// markup. `document` is the source filename, used for diagnostics only.
    async fn submit(
        &self,
        document: &str,
        payload: &GenerationPayload,
    ) -> Result<String, Docx2AdocError>;
}

/// [`GenerationService`] backed by an `edgequake-llm` vision provider.
pub struct LlmGenerationService {
    provider: Arc<dyn LLMProvider>,
    system_prompt: String,
    temperature: f32,
    max_tokens: usize,
    max_retries: u32,
    retry_backoff_ms: u64,
    api_timeout_secs: u64,
}

impl LlmGenerationService {
    /// Build a service from the pipeline configuration, resolving the
    /// provider from most-specific to least-specific:
    ///
    /// 1. A pre-built provider injected via `config.provider`.
    /// 2. A named provider (`config.provider_name`) plus model.
    /// 3. Auto-detection from the environment, after exporting
    ///    `config.api_key` as `OPENAI_API_KEY` when the variable is unset.
    pub fn from_config(config: &ConversionConfig) -> Result<Self, Docx2AdocError> {
        let provider = resolve_provider(config)?;
        Ok(Self {
            provider,
            system_prompt: config
                .system_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            max_retries: config.max_retries,
            retry_backoff_ms: config.retry_backoff_ms,
            api_timeout_secs: config.api_timeout_secs,
        })
    }
}

/// One chat turn per payload part, preceded by the system prompt. A text
/// unit becomes a user text turn; an image unit becomes an image-only user
/// turn, so the provider sees parts in exactly the extracted order.
fn assemble_messages(system_prompt: &str, payload: &GenerationPayload) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(payload.parts.len() + 1);
    messages.push(ChatMessage::system(system_prompt));
    for part in &payload.parts {
        match part {
            PayloadPart::Text(text) => messages.push(ChatMessage::user(text)),
            PayloadPart::Image(img) => {
                messages.push(ChatMessage::user_with_images("", vec![img.clone()]));
            }
        }
    }
    messages
}

fn completion_options(temperature: f32, max_tokens: usize) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(temperature),
        max_tokens: Some(max_tokens),
        ..Default::default()
    }
}

#[async_trait]
impl GenerationService for LlmGenerationService {
    async fn submit(
        &self,
        document: &str,
        payload: &GenerationPayload,
    ) -> Result<String, Docx2AdocError> {
        let messages = assemble_messages(&self.system_prompt, payload);
        let options = completion_options(self.temperature, self.max_tokens);
        let call_timeout = Duration::from_secs(self.api_timeout_secs);

        let mut last_err = String::new();
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let backoff = self.retry_backoff_ms * 2u64.pow(attempt - 1);
                warn!(
                    "'{document}': retry {attempt}/{} after {backoff}ms",
                    self.max_retries
                );
                sleep(Duration::from_millis(backoff)).await;
            }

            match timeout(call_timeout, self.provider.chat(&messages, Some(&options))).await {
                Ok(Ok(response)) => {
                    debug!(
                        "'{document}': {} input tokens, {} output tokens",
                        response.prompt_tokens, response.completion_tokens
                    );
                    return Ok(response.content);
                }
                Ok(Err(e)) => {
                    last_err = e.to_string();
                    warn!("'{document}': attempt {} failed: {last_err}", attempt + 1);
                }
                Err(_) => {
                    last_err = format!("timed out after {}s", self.api_timeout_secs);
                    warn!("'{document}': attempt {} {last_err}", attempt + 1);
                }
            }
        }

        if last_err.starts_with("timed out") {
            Err(Docx2AdocError::GenerationTimeout {
                document: document.to_string(),
                secs: self.api_timeout_secs,
            })
        } else {
            Err(Docx2AdocError::GenerationFailed {
                document: document.to_string(),
                retries: self.max_retries,
                detail: last_err,
            })
        }
    }
}

/// Resolve the LLM provider, from most-specific to least-specific.
fn resolve_provider(config: &ConversionConfig) -> Result<Arc<dyn LLMProvider>, Docx2AdocError> {
    // 1) Injected provider takes priority (tests, custom middleware).
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    // 2) Named provider + model.
    if let Some(ref name) = config.provider_name {
        return ProviderFactory::create_llm_provider(name, &config.model).map_err(|e| {
            Docx2AdocError::ProviderNotConfigured {
                provider: name.clone(),
                hint: e.to_string(),
            }
        });
    }

    // 3) Key from the config file, exported for the factory when the
    //    environment doesn't already carry one.
    if let Some(ref key) = config.api_key {
        if std::env::var("OPENAI_API_KEY").is_err() && !key.is_empty() {
            std::env::set_var("OPENAI_API_KEY", key);
        }
    }

    if std::env::var("OPENAI_API_KEY").map(|k| !k.is_empty()).unwrap_or(false) {
        return ProviderFactory::create_llm_provider("openai", &config.model).map_err(|e| {
            Docx2AdocError::ProviderNotConfigured {
                provider: "openai".to_string(),
                hint: e.to_string(),
            }
        });
    }

    let (provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| Docx2AdocError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                 Set openai.api_key in config.yaml or export OPENAI_API_KEY.\n\
                 Error: {e}"
            ),
        })?;
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgequake_llm::ImageData;

    #[test]
    fn completion_options_forward_knobs() {
        let opts = completion_options(0.1, 8192);
        assert_eq!(opts.temperature, Some(0.1));
        assert_eq!(opts.max_tokens, Some(8192));
    }

    #[test]
    fn messages_start_with_system_then_follow_payload_order() {
        let payload = GenerationPayload {
            parts: vec![
                PayloadPart::Text("first".into()),
                PayloadPart::Image(ImageData::new("QUJD", "image/png")),
                PayloadPart::Text("second".into()),
            ],
        };
        let messages = assemble_messages(DEFAULT_SYSTEM_PROMPT, &payload);
        // System prompt plus one turn per part.
        assert_eq!(messages.len(), 4);
    }

    #[test]
    fn empty_payload_still_carries_system_prompt() {
        let messages = assemble_messages("prompt", &GenerationPayload::default());
        assert_eq!(messages.len(), 1);
    }
}
