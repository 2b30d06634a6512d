use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Body sent to the chat completion provider.
#[derive(Debug, Serialize)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a serde_json::Value,
}

/// The part of a completion body the chat front end reads.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: ChoiceMessage,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletion {
    /// Content of the first choice, if it is a non-empty string.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()?
            .message
            .content
            .as_deref()
            .filter(|s| !s.is_empty())
    }
}

/// Pull `choices[0].message.content` out of a completion body.
///
/// Returns `None` when the body does not have that shape or the content is empty.
pub fn completion_text(body: &serde_json::Value) -> Option<String> {
    let completion = ChatCompletion::deserialize(body).ok()?;
    completion.text().map(str::to_string)
}
