//! Language gateway (chat completions)

use crate::{Error, Result};

/// Response from the `OpenAI` chat completions API
#[derive(serde::Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(serde::Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(serde::Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(serde::Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(serde::Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Generates replies through a remote chat-completion model
///
/// Stateless: each call is a single request/response with the fixed persona
/// system prompt; no conversation memory is kept across commands.
pub struct ChatGateway {
    client: reqwest::Client,
    api_key: String,
    model: String,
    persona: String,
}

impl ChatGateway {
    /// Create a new language gateway
    ///
    /// # Errors
    ///
    /// Returns error if the API key is empty
    pub fn new(api_key: String, model: String, persona: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "OpenAI API key required for chat".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            persona,
        })
    }

    /// Generate a reply to a single user prompt
    ///
    /// # Errors
    ///
    /// Returns `Error::Upstream` if the remote call fails or returns no
    /// completion.
    pub async fn generate_reply(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &self.persona,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let response = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!("OpenAI chat error {status}: {body}")));
        }

        let completion: ChatResponse = response.json().await?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| Error::Upstream("OpenAI chat returned no choices".to_string()))
    }
}
