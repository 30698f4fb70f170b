use crate::cli::Args;
use crate::config::prompt::PromptPolicy;
use crate::llm::{ LlmConfig, ProviderShape };
use crate::llm::chat::{ new_client as new_chat_client, ChatClient, ProviderError };
use crate::models::chat::Message;

use log::{ info, warn, error };
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error as ThisError;

/// Number of caller messages forwarded to the provider. Older turns are dropped.
pub const HISTORY_WINDOW: usize = 20;

/// Tried once when the primary model answers 403 or 404.
pub const FALLBACK_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, ThisError)]
pub enum ProxyError {
    #[error("Missing OPENAI_API_KEY")]
    MissingCredential,
    #[error("OpenAI error {status}: {body}")]
    UpstreamHttp { status: u16, body: String },
    #[error("Server exception: {0}")]
    Unhandled(String),
}

impl From<ProviderError> for ProxyError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Status { status, body } => ProxyError::UpstreamHttp { status, body },
            other => ProxyError::Unhandled(other.to_string()),
        }
    }
}

/// System prompt followed by the most recent [`HISTORY_WINDOW`] messages.
pub fn build_provider_messages(policy: PromptPolicy, history: &[Message]) -> Vec<Message> {
    let start = history.len().saturating_sub(HISTORY_WINDOW);
    let mut messages = Vec::with_capacity(history.len() - start + 1);
    messages.push(policy.system_message());
    messages.extend_from_slice(&history[start..]);
    messages
}

#[derive(Clone)]
pub struct ConversationProxy {
    chat_client: Option<Arc<dyn ChatClient>>,
    policy: PromptPolicy,
    primary_model: String,
    fallback_model: String,
}

impl ConversationProxy {
    pub fn new(args: &Args) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let shape: ProviderShape = args.provider_shape.parse()?;
        let policy: PromptPolicy = args.prompt_policy.parse()?;
        let config = LlmConfig {
            shape,
            api_key: args.openai_api_key.clone(),
            base_url: args.openai_base_url.clone(),
            temperature: args.openai_temp,
            max_output_tokens: args.max_output_tokens,
            timeout: Duration::from_secs(args.request_timeout_secs),
        };
        let chat_client = new_chat_client(&config)?;
        match &chat_client {
            Some(client) => info!(
                "Chat client configured: Shape={}, Model={}, Fallback={}, BaseURL={}",
                shape,
                args.openai_model,
                FALLBACK_MODEL,
                client.get_base_url()
            ),
            None => warn!("OPENAI_API_KEY is not set. Every request will fail until it is configured."),
        }
        Ok(Self::with_client(chat_client, policy, args.openai_model.clone()))
    }

    pub fn with_client(
        chat_client: Option<Arc<dyn ChatClient>>,
        policy: PromptPolicy,
        primary_model: String
    ) -> Self {
        Self {
            chat_client,
            policy,
            primary_model,
            fallback_model: FALLBACK_MODEL.to_string(),
        }
    }

    pub fn policy(&self) -> PromptPolicy {
        self.policy
    }

    pub fn has_credential(&self) -> bool {
        self.chat_client.is_some()
    }

    /// Produces the assistant reply for one stateless turn.
    ///
    /// `request_id` only tags log lines.
    pub async fn respond(&self, history: &[Message], request_id: &str) -> Result<String, ProxyError> {
        let client = self.chat_client.as_ref().ok_or(ProxyError::MissingCredential)?;

        let messages = build_provider_messages(self.policy, history);
        info!(
            "[{}] Forwarding {} of {} messages to model {}",
            request_id,
            messages.len() - 1,
            history.len(),
            self.primary_model
        );

        let result = match client.complete(&self.primary_model, &messages).await {
            Err(e) if e.is_model_unavailable() => {
                warn!(
                    "[{}] Primary model {} unavailable ({}). Retrying with {}",
                    request_id,
                    self.primary_model,
                    e,
                    self.fallback_model
                );
                client.complete(&self.fallback_model, &messages).await
            }
            other => other,
        };

        match result {
            Ok(completion) => Ok(completion.response),
            Err(e) => {
                error!("[{}] Provider call failed: {}", request_id, e);
                Err(e.into())
            }
        }
    }
}
