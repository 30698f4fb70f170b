use std::error::Error;
use std::fmt;
use std::str::FromStr;

use crate::models::chat::Message;

const COUNSELING_PROMPT: &str = include_str!("prompts/counseling.txt");

#[derive(Debug, PartialEq, Eq)]
pub enum PromptError {
    UnknownPolicy(String),
}

impl fmt::Display for PromptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptError::UnknownPolicy(name) => write!(f, "Unknown prompt policy '{}'", name),
        }
    }
}

impl Error for PromptError {}

/// The fixed persona/policy block prepended to every provider call.
///
/// Selected once at startup; callers of the proxy cannot alter it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptPolicy {
    /// Simulated psychotherapy client for counselor training.
    #[default]
    Counseling,
}

impl PromptPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            PromptPolicy::Counseling => "counseling",
        }
    }

    /// Instructions joined into a single paragraph, one sentence group per line of the source file.
    pub fn system_prompt(&self) -> String {
        let raw = match self {
            PromptPolicy::Counseling => COUNSELING_PROMPT,
        };
        raw.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn system_message(&self) -> Message {
        Message::system(self.system_prompt())
    }
}

impl FromStr for PromptPolicy {
    type Err = PromptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "counseling" => Ok(PromptPolicy::Counseling),
            _ => Err(PromptError::UnknownPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for PromptPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
