pub mod chat;
use std::str::FromStr;
use std::fmt;
use std::time::Duration;

/// Which OpenAI-compatible API variant the provider speaks.
///
/// The variant decides the route, the request body and where the reply text
/// lives in the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderShape {
    /// `/v1/chat/completions`, reply at `choices[0].message.content`.
    ChatCompletions,
    /// `/v1/responses`, reply at `output_text` or inside `output[].content[]`.
    Responses,
}

impl ProviderShape {
    pub fn route(&self) -> &'static str {
        match self {
            ProviderShape::ChatCompletions => "/v1/chat/completions",
            ProviderShape::Responses => "/v1/responses",
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseProviderShapeError {
    message: String,
}

impl fmt::Display for ParseProviderShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseProviderShapeError {}
impl FromStr for ProviderShape {
    type Err = ParseProviderShapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chat" | "chat_completions" | "chat-completions" => Ok(ProviderShape::ChatCompletions),
            "responses" => Ok(ProviderShape::Responses),
            _ =>
                Err(ParseProviderShapeError {
                    message: format!("Invalid provider shape: '{}'", s),
                }),
        }
    }
}

impl fmt::Display for ProviderShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderShape::ChatCompletions => f.write_str("chat"),
            ProviderShape::Responses => f.write_str("responses"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub shape: ProviderShape,
    pub api_key: Option<String>,
    pub base_url: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            shape: ProviderShape::ChatCompletions,
            api_key: None,
            base_url: "https://api.openai.com".to_string(),
            temperature: 0.8,
            max_output_tokens: 800,
            timeout: Duration::from_secs(30),
        }
    }
}
