use serde_json::Value as JsonValue;

use crate::llm::ProviderShape;

/// Pulls the assistant text out of a provider response body.
///
/// Never fails: a body without the expected field yields an empty string.
pub fn extract_reply(shape: ProviderShape, body: &JsonValue) -> String {
    let text = match shape {
        ProviderShape::ChatCompletions => chat_completion_text(body),
        ProviderShape::Responses => responses_text(body),
    };
    text.map(|t| t.trim().to_string()).unwrap_or_default()
}

fn chat_completion_text(body: &JsonValue) -> Option<&str> {
    body.pointer("/choices/0/message/content")?.as_str()
}

fn responses_text(body: &JsonValue) -> Option<&str> {
    if let Some(text) = body.get("output_text").and_then(JsonValue::as_str) {
        if !text.trim().is_empty() {
            return Some(text);
        }
    }
    // reasoning items carry no content, so take the first item that does
    body.get("output")?
        .as_array()?
        .iter()
        .filter_map(|item| item.get("content")?.as_array())
        .flatten()
        .find_map(|part| part.get("text")?.as_str())
}
