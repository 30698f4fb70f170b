use async_trait::async_trait;
use reqwest::Client as HttpClient;

use super::ChatError;
use crate::models::chat::{ Message, ProxyRequest, ProxyResponse };

/// Sends the visible conversation to the proxy and returns the raw reply text.
#[async_trait]
pub trait ProxyTransport: Send + Sync {
    async fn request_reply(&self, messages: &[Message]) -> Result<String, ChatError>;
}

pub struct HttpProxyTransport {
    http: HttpClient,
    endpoint: String,
}

impl HttpProxyTransport {
    pub fn new(proxy_url: &str) -> Result<Self, ChatError> {
        let http = HttpClient::builder()
            .build()
            .map_err(|e| ChatError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: format!("{}/api/ai-client", proxy_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ProxyTransport for HttpProxyTransport {
    async fn request_reply(&self, messages: &[Message]) -> Result<String, ChatError> {
        let body = ProxyRequest { messages: messages.to_vec() };
        let resp = self.http
            .post(&self.endpoint)
            .json(&body)
            .send().await
            .map_err(|e| ChatError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let detail = if text.trim().is_empty() {
                format!("HTTP {}", status.as_u16())
            } else {
                text
            };
            return Err(ChatError::Transport(detail));
        }

        let data: ProxyResponse = resp
            .json().await
            .map_err(|e| ChatError::Transport(e.to_string()))?;
        Ok(data.reply)
    }
}
