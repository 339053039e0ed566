//! Chat session state machine.
//!
//! A [`ChatSession`] holds the transcript of a conversation with the
//! assistant and allows at most one exchange in flight:
//!
//! ```text
//!          begin(text)                 resolve(outcome)
//!   Idle --------------> Awaiting -----------------------> Idle
//!    ^   (user msg +        |   (placeholder replaced by
//!    |    pending bot)      |    reply or error text)
//!    +----------------------+
//! ```
//!
//! Sending is optimistic: the user's message and a pending placeholder are
//! appended before the request goes out. Every way the request can end
//! (reply, error payload, no response) replaces that placeholder, so the
//! transcript never keeps a dangling pending entry.

use tracing::{debug, warn};
use uuid::Uuid;

use pm25_types::{ChatMessage, MessageStatus, Sender};

use crate::error::ApiError;
use crate::traits::DashboardApi;

/// Text of the placeholder shown while waiting for a reply.
pub const PENDING_TEXT: &str = "Thinking...";

/// Reply shown when the server answered with an error.
pub const APOLOGY_MESSAGE: &str =
    "Sorry, I couldn't process that request right now. Please try again.";

/// Reply shown when the server could not be reached.
pub const UNREACHABLE_MESSAGE: &str =
    "Could not reach the server. Please check your connection and try again.";

/// Whether an exchange is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChatState {
    Idle,
    Awaiting,
}

/// An accepted exchange waiting for its reply.
///
/// Returned by [`ChatSession::begin`] and consumed by
/// [`ChatSession::resolve`].
#[derive(Debug, PartialEq, Eq)]
#[must_use = "an exchange must be resolved or the session stays busy"]
pub struct PendingExchange {
    placeholder: Uuid,
    message: String,
}

impl PendingExchange {
    /// The text to send to the server.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Conversation transcript with a single-exchange guard.
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    in_flight: bool,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// The transcript, oldest first.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn state(&self) -> ChatState {
        if self.in_flight {
            ChatState::Awaiting
        } else {
            ChatState::Idle
        }
    }

    pub fn is_awaiting(&self) -> bool {
        self.in_flight
    }

    /// Start an exchange.
    ///
    /// Returns `None` without touching the transcript when `text` is blank
    /// or another exchange is still in flight. Otherwise appends the user's
    /// message and a pending placeholder.
    pub fn begin(&mut self, text: &str) -> Option<PendingExchange> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if self.in_flight {
            debug!("Ignoring chat message while a reply is outstanding");
            return None;
        }

        self.in_flight = true;
        self.messages
            .push(ChatMessage::new(Sender::User, text, MessageStatus::Final));
        let placeholder = ChatMessage::new(Sender::Bot, PENDING_TEXT, MessageStatus::Pending);
        let id = placeholder.id;
        self.messages.push(placeholder);

        Some(PendingExchange {
            placeholder: id,
            message: text.to_string(),
        })
    }

    /// Finish an exchange, replacing its placeholder.
    ///
    /// The placeholder always becomes a final bot message. Its text is the
    /// reply, [`APOLOGY_MESSAGE`] for an error payload or a blank reply, or
    /// [`UNREACHABLE_MESSAGE`] when the server could not be reached.
    pub fn resolve(
        &mut self,
        exchange: PendingExchange,
        outcome: Result<String, ApiError>,
    ) -> &ChatMessage {
        let text = match outcome {
            Ok(reply) if !reply.trim().is_empty() => reply,
            Ok(_) => {
                warn!("Chat reply was empty");
                APOLOGY_MESSAGE.to_string()
            }
            Err(e) if e.is_transport() => {
                warn!("Chat request failed: {}", e);
                UNREACHABLE_MESSAGE.to_string()
            }
            Err(e) => {
                warn!("Chat request rejected: {}", e);
                APOLOGY_MESSAGE.to_string()
            }
        };

        let reply = ChatMessage {
            id: exchange.placeholder,
            sender: Sender::Bot,
            text,
            status: MessageStatus::Final,
        };

        let index = match self
            .messages
            .iter()
            .position(|m| m.id == exchange.placeholder)
        {
            Some(index) => {
                self.messages[index] = reply;
                index
            }
            None => {
                self.messages.push(reply);
                self.messages.len() - 1
            }
        };

        self.in_flight = false;
        &self.messages[index]
    }

    /// Send a message and wait for the reply.
    ///
    /// Returns the resolved bot message, or `None` if the message was
    /// rejected by [`begin`](Self::begin).
    pub async fn send<A: DashboardApi + ?Sized>(
        &mut self,
        api: &A,
        text: &str,
    ) -> Option<&ChatMessage> {
        let exchange = self.begin(text)?;
        let outcome = api.chat(exchange.message()).await;
        Some(self.resolve(exchange, outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Endpoint, MockApi, MockFailure};

    fn pending_count(session: &ChatSession) -> usize {
        session.messages().iter().filter(|m| m.is_pending()).count()
    }

    #[test]
    fn test_blank_send_is_noop() {
        let mut session = ChatSession::new();
        assert!(session.begin("").is_none());
        assert!(session.begin("   \n").is_none());
        assert!(session.messages().is_empty());
        assert_eq!(session.state(), ChatState::Idle);
    }

    #[test]
    fn test_begin_appends_user_and_placeholder() {
        let mut session = ChatSession::new();
        let exchange = session.begin("  How is the air?  ").unwrap();

        assert_eq!(exchange.message(), "How is the air?");
        assert_eq!(session.state(), ChatState::Awaiting);

        let messages = session.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].sender, Sender::User);
        assert_eq!(messages[0].text, "How is the air?");
        assert_eq!(messages[0].status, MessageStatus::Final);
        assert_eq!(messages[1].sender, Sender::Bot);
        assert!(messages[1].is_pending());

        let _ = session.resolve(exchange, Ok("Fine".into()));
    }

    #[test]
    fn test_second_send_while_awaiting_is_rejected() {
        let mut session = ChatSession::new();
        let exchange = session.begin("first").unwrap();
        assert!(session.begin("second").is_none());

        assert_eq!(session.messages().len(), 2);
        assert_eq!(pending_count(&session), 1);

        let _ = session.resolve(exchange, Ok("ok".into()));
    }

    #[test]
    fn test_success_replaces_placeholder() {
        let mut session = ChatSession::new();
        let exchange = session.begin("hello").unwrap();
        let reply = session.resolve(exchange, Ok("Hi!".into()));

        assert_eq!(reply.text, "Hi!");
        assert_eq!(reply.status, MessageStatus::Final);
        assert_eq!(session.messages().len(), 2);
        assert_eq!(pending_count(&session), 0);
        assert_eq!(session.state(), ChatState::Idle);
    }

    #[test]
    fn test_every_exit_path_clears_placeholder() {
        let outcomes: Vec<(Result<String, ApiError>, &str)> = vec![
            (Ok("reply".into()), "reply"),
            (Ok("  ".into()), APOLOGY_MESSAGE),
            (
                Err(ApiError::Api {
                    status: 500,
                    message: "boom".into(),
                }),
                APOLOGY_MESSAGE,
            ),
            (
                Err(ApiError::Decode {
                    url: "u".into(),
                    message: "bad".into(),
                }),
                APOLOGY_MESSAGE,
            ),
            (Err(ApiError::unreachable("u", "refused")), UNREACHABLE_MESSAGE),
            (
                Err(ApiError::Timeout {
                    url: "u".into(),
                    duration: std::time::Duration::from_secs(1),
                }),
                UNREACHABLE_MESSAGE,
            ),
        ];

        let mut session = ChatSession::new();
        for (i, (outcome, expected)) in outcomes.into_iter().enumerate() {
            let exchange = session.begin("question").unwrap();
            let reply = session.resolve(exchange, outcome);
            assert_eq!(reply.text, expected);
            assert_eq!(reply.status, MessageStatus::Final);
            assert_eq!(pending_count(&session), 0);
            assert_eq!(session.messages().len(), (i + 1) * 2);
            assert!(!session.is_awaiting());
        }
    }

    #[test]
    fn test_placeholder_keeps_its_position() {
        let mut session = ChatSession::new();
        let exchange = session.begin("q").unwrap();
        let placeholder_id = session.messages()[1].id;

        let reply_id = session.resolve(exchange, Ok("a".into())).id;

        assert_eq!(reply_id, placeholder_id);
        assert_eq!(session.messages()[1].text, "a");
    }

    #[tokio::test]
    async fn test_send_with_mock() {
        let api = MockApi::new();
        api.set_chat_reply("PM2.5 averaged 14 last week.").await;

        let mut session = ChatSession::new();
        let reply = session.send(&api, "average last week?").await.unwrap();

        assert_eq!(reply.text, "PM2.5 averaged 14 last week.");
        assert_eq!(api.last_chat_message().await.as_deref(), Some("average last week?"));
    }

    #[tokio::test]
    async fn test_send_transport_failure() {
        let api = MockApi::new();
        api.fail(Endpoint::Chat, MockFailure::Transport).await;

        let mut session = ChatSession::new();
        let reply = session.send(&api, "hello").await.unwrap();

        assert_eq!(reply.text, UNREACHABLE_MESSAGE);
        assert_eq!(reply.status, MessageStatus::Final);
    }

    #[test]
    fn test_server_error_reply_is_final_apology() {
        let mut session = ChatSession::new();
        let exchange = session.begin("q").unwrap();
        let reply = session.resolve(
            exchange,
            Err(ApiError::Api {
                status: 500,
                message: "quota exceeded".into(),
            }),
        );

        assert_eq!(reply.sender, Sender::Bot);
        assert_eq!(reply.text, APOLOGY_MESSAGE);
        assert_eq!(reply.status, MessageStatus::Final);
        assert!(!session.is_awaiting());
    }

    #[tokio::test]
    async fn test_send_blank_does_not_call_server() {
        let api = MockApi::new();
        let mut session = ChatSession::new();

        assert!(session.send(&api, " ").await.is_none());
        assert_eq!(api.call_count(Endpoint::Chat), 0);
    }
}
