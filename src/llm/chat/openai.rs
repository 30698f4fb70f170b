use async_trait::async_trait;
use log::debug;
use reqwest::{Client as HttpClient, header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION}};
use serde::Serialize;
use serde_json::Value as JsonValue;

use super::{ChatClient, CompletionResponse, ProviderError};
use super::extract::extract_reply;
use crate::llm::{LlmConfig, ProviderShape};
use crate::models::chat::Message;

pub struct OpenAIChatClient {
    http: HttpClient,
    base_url: String,
    shape: ProviderShape,
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Serialize)]
struct OpenAIChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct OpenAIResponsesRequest<'a> {
    model: &'a str,
    input: &'a [Message],
    temperature: f32,
    max_output_tokens: u32,
}

impl OpenAIChatClient {
    pub fn new(api_key: String, config: &LlmConfig) -> Result<Self, ProviderError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|e| ProviderError::InvalidCredential(format!("Invalid API key format: {}", e)))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = HttpClient::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            shape: config.shape,
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        })
    }

    fn request_body(&self, model: &str, messages: &[Message]) -> Result<JsonValue, ProviderError> {
        let body = match self.shape {
            ProviderShape::ChatCompletions => serde_json::to_value(OpenAIChatRequest {
                model,
                messages,
                temperature: self.temperature,
                max_tokens: self.max_output_tokens,
            })?,
            ProviderShape::Responses => serde_json::to_value(OpenAIResponsesRequest {
                model,
                input: messages,
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            })?,
        };
        Ok(body)
    }
}

#[async_trait]
impl ChatClient for OpenAIChatClient {
    async fn complete(
        &self,
        model: &str,
        messages: &[Message]
    ) -> Result<CompletionResponse, ProviderError> {
        let url = format!("{}{}", self.base_url, self.shape.route());
        let body = self.request_body(model, messages)?;

        debug!("POST {} model={} messages={}", url, model, messages.len());
        let resp = self.http.post(&url).json(&body).send().await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(ProviderError::Status { status: status.as_u16(), body: text });
        }

        let json: JsonValue = serde_json::from_str(&text)?;
        Ok(CompletionResponse { response: extract_reply(self.shape, &json) })
    }

    fn get_base_url(&self) -> String {
        self.base_url.clone()
    }
}
