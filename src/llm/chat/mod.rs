pub mod extract;
pub mod openai;

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

use super::LlmConfig;
use self::openai::OpenAIChatClient;
use crate::models::chat::Message;

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CompletionResponse {
    pub response: String,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    /// Non-success HTTP status with the raw upstream body.
    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid provider response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid credential: {0}")]
    InvalidCredential(String),
}

impl ProviderError {
    /// Statuses that mean the model is unavailable to this key rather than a failed call.
    pub fn is_model_unavailable(&self) -> bool {
        matches!(self, ProviderError::Status { status: 403 | 404, .. })
    }
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(
        &self,
        model: &str,
        messages: &[Message]
    ) -> Result<CompletionResponse, ProviderError>;

    fn get_base_url(&self) -> String;
}

pub fn new_client(config: &LlmConfig) -> Result<Option<Arc<dyn ChatClient>>, ProviderError> {
    let Some(api_key) = config.api_key.clone().filter(|k| !k.trim().is_empty()) else {
        return Ok(None);
    };
    let client: Arc<dyn ChatClient> = Arc::new(OpenAIChatClient::new(api_key, config)?);
    Ok(Some(client))
}
