use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::openrouter::{completion_text, ChatMessage, Role};

pub const SYSTEM_PROMPT: &str = "You are a helpful AI movie expert.";
pub const NO_RESPONSE: &str = "Sorry, I couldn't respond.";
pub const API_FAILED: &str = "Error: API failed.";
pub const CONTACT_FAILED: &str = "Error: Failed to contact AI.";
pub const TYPING: &str = "Typing...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn role(&self) -> Role {
        match self {
            Sender::User => Role::User,
            Sender::Bot => Role::Assistant,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub sender: Sender,
    pub text: String,
}

impl TranscriptEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatStatus {
    #[default]
    Idle,
    Sending,
}

/// Payload posted to `/api/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

/// What came back from one chat relay call.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayOutcome {
    /// 2xx with a JSON body, which may or may not hold a completion.
    Completed(serde_json::Value),
    /// Non-2xx from the relay.
    Rejected { status: u16, body: serde_json::Value },
    /// The call itself failed.
    Failed(String),
}

#[async_trait]
pub trait ChatRelay: Send + Sync {
    async fn post_chat(&self, request: &ChatRequest) -> RelayOutcome;
}

/// State of the chat box: the transcript, the input field and whether a
/// turn is in flight.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSession {
    transcript: Vec<TranscriptEntry>,
    input: String,
    status: ChatStatus,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn status(&self) -> ChatStatus {
        self.status
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    pub fn can_submit(&self) -> bool {
        self.status == ChatStatus::Idle && !self.input.trim().is_empty()
    }

    /// Shown below the transcript while a turn is in flight. Never part of
    /// the transcript itself.
    pub fn typing_indicator(&self) -> Option<&'static str> {
        match self.status {
            ChatStatus::Sending => Some(TYPING),
            ChatStatus::Idle => None,
        }
    }

    /// Start a turn.
    ///
    /// Returns `None` and leaves everything untouched when the input is blank
    /// or a turn is already in flight. Otherwise the outbound payload is built
    /// from the transcript as it was before this turn, then the user entry is
    /// appended, the input cleared and the session moves to `Sending`.
    pub fn begin_submit(&mut self) -> Option<ChatRequest> {
        if !self.can_submit() {
            return None;
        }

        let text = std::mem::take(&mut self.input);

        let mut messages = Vec::with_capacity(self.transcript.len() + 2);
        messages.push(ChatMessage::system(SYSTEM_PROMPT));
        messages.extend(
            self.transcript
                .iter()
                .map(|entry| ChatMessage::new(entry.sender.role(), entry.text.clone())),
        );
        messages.push(ChatMessage::user(text.clone()));

        self.transcript.push(TranscriptEntry::user(text));
        self.status = ChatStatus::Sending;

        Some(ChatRequest { messages })
    }

    /// End the turn with exactly one bot entry and return to `Idle`.
    pub fn finish(&mut self, outcome: RelayOutcome) -> &TranscriptEntry {
        let text = match outcome {
            RelayOutcome::Completed(body) => match completion_text(&body) {
                Some(text) => {
                    debug!("Bot reply received");
                    text
                }
                None => {
                    warn!(body = %body, "No usable completion in chat response");
                    NO_RESPONSE.to_string()
                }
            },
            RelayOutcome::Rejected { status, body } => {
                error!(status, body = %body, "Chat relay returned an error");
                API_FAILED.to_string()
            }
            RelayOutcome::Failed(e) => {
                error!("Chat relay call failed: {}", e);
                CONTACT_FAILED.to_string()
            }
        };

        self.status = ChatStatus::Idle;
        self.transcript.push(TranscriptEntry::bot(text));
        // Just pushed.
        &self.transcript[self.transcript.len() - 1]
    }

    /// Run one complete turn through `relay`. Returns the bot entry, or
    /// `None` when nothing was submitted.
    pub async fn send<R>(&mut self, relay: &R) -> Option<&TranscriptEntry>
    where
        R: ChatRelay + ?Sized,
    {
        let request = self.begin_submit()?;
        let outcome = relay.post_chat(&request).await;
        Some(self.finish(outcome))
    }
}
