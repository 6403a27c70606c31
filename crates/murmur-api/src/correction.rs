//! Chat-completion cleanup client.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ApiError, Result};

const CHAT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o";

/// Fixed instruction for the cleanup pass: fix spelling, add only necessary
/// punctuation and capitalization, use only the provided context.
const SYSTEM_INSTRUCTION: &str = "You are a helpful assistant for the company. Your task is \
     to correct any spelling discrepancies in the transcribed text. Only add necessary \
     punctuation such as periods, commas, and capitalization, and use only the context \
     provided.";

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Configuration for the correction client.
#[derive(Debug, Clone)]
pub struct CorrectionConfig {
    /// API key
    pub api_key: String,

    /// Model to use (defaults to gpt-4o)
    pub model: Option<String>,
}

impl CorrectionConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: None,
        }
    }

    /// Set the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Get the model name, using default if not set.
    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }
}

/// Client for the chat-completion endpoint.
#[derive(Debug, Clone)]
pub struct CorrectionClient {
    client: reqwest::Client,
    config: CorrectionConfig,
}

impl CorrectionClient {
    /// Create a new client with the given configuration.
    pub fn new(config: CorrectionConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// The model this client sends requests to.
    pub fn model(&self) -> &str {
        self.config.model()
    }

    /// Send the transcription for cleanup and return the corrected text.
    ///
    /// Callers must not pass an empty transcript; the pipeline only reaches
    /// this stage with usable text in hand.
    pub async fn correct(&self, transcript: &str) -> Result<String> {
        debug!(
            model = self.config.model(),
            chars = transcript.len(),
            "Sending correction request"
        );

        let request = ChatRequest {
            model: self.config.model().to_string(),
            messages: vec![
                Message {
                    role: "system",
                    content: SYSTEM_INSTRUCTION.to_string(),
                },
                Message {
                    role: "user",
                    content: transcript.to_string(),
                },
            ],
        };

        let response = self
            .client
            .post(CHAT_ENDPOINT)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let headers = Box::new(response.headers().clone());
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status,
                headers,
                body,
            });
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Shape(e.to_string()))?;

        first_choice(chat)
    }
}

/// Extract the first completion choice's message content.
fn first_choice(chat: ChatResponse) -> Result<String> {
    chat.choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| ApiError::Shape("no completion choices".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let request = ChatRequest {
            model: "gpt-4o".to_string(),
            messages: vec![
                Message {
                    role: "system",
                    content: SYSTEM_INSTRUCTION.to_string(),
                },
                Message {
                    role: "user",
                    content: "helo wrld".to_string(),
                },
            ],
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["messages"].as_array().unwrap().len(), 2);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "helo wrld");
    }

    #[test]
    fn test_first_choice_extraction() {
        let chat: ChatResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": "Hello world."}}]}"#,
        )
        .unwrap();

        assert_eq!(first_choice(chat).unwrap(), "Hello world.");
    }

    #[test]
    fn test_no_choices_is_shape_error() {
        let chat: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();

        let err = first_choice(chat).unwrap_err();
        assert!(matches!(err, ApiError::Shape(_)));
    }

    #[test]
    fn test_config_defaults() {
        let config = CorrectionConfig::new("sk-test");
        assert_eq!(config.model(), "gpt-4o");
        assert_eq!(config.with_model("gpt-4.1").model(), "gpt-4.1");
    }
}
