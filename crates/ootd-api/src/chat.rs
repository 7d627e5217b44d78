//! Chat dispatch: the seam between the analysis pipeline and the
//! conversational engine.
//!
//! The engine itself lives outside this crate and is reached through the
//! [`ChatSession`] trait.

use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use utoipa::ToSchema;

use ootd_core::{Error, GuidanceAction, GuidanceDirective, Result};

/// Reply when an image message asks for something other than outfit advice.
pub const UNSUPPORTED_QUESTION_REPLY: &str = "Your question is not supported, I cannot answer it.";

/// Question assumed when an image message carries none.
pub const DEFAULT_IMAGE_QUESTION: &str = "ootd";

/// Scene shown in the chat turn when the message carries none.
pub const UNSPECIFIED_SCENE: &str = "not specified";

/// Component that produced an error envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeSource {
    Llm,
    Stt,
}

/// Error envelope sent over the chat connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(rename = "type")]
    pub source: EnvelopeSource,
    /// Always `"error"`.
    pub status: String,
    pub message: String,
}

impl ErrorEnvelope {
    pub fn llm(message: impl Into<String>) -> Self {
        Self {
            source: EnvelopeSource::Llm,
            status: "error".to_string(),
            message: message.into(),
        }
    }
}

/// A conversation the pipeline can act on.
#[async_trait]
pub trait ChatSession: Send + Sync {
    /// Feed `text` to the language model as the next conversation turn.
    async fn start_chat(&self, text: &str) -> Result<()>;

    /// Reply to the user directly with `text`.
    async fn reply(&self, text: &str) -> Result<()>;

    /// Send a raw envelope to the client.
    async fn send(&self, envelope: &ErrorEnvelope) -> Result<()>;
}

/// Route a directive to the session.
pub async fn dispatch_directive(
    session: &dyn ChatSession,
    directive: &GuidanceDirective,
) -> Result<()> {
    debug!(action = ?directive.action, text_len = directive.text.len(), "Dispatching directive");
    match directive.action {
        GuidanceAction::ContinueChat => session.start_chat(&directive.text).await,
        GuidanceAction::RespondError => session.reply(&directive.text).await,
    }
}

/// Incoming `image` message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ImageMessage {
    /// Name of an uploaded file in the data directory.
    #[serde(default)]
    pub file_name: Option<String>,
    /// Scene the outfit is for.
    #[serde(default)]
    pub status: Option<String>,
    /// What the user asks; only outfit questions (`ootd`) are supported.
    #[serde(default)]
    pub question: Option<String>,
}

/// Turns `image` messages into chat turns.
#[derive(Debug, Default)]
pub struct ImageMessageHandler;

impl ImageMessageHandler {
    pub fn new() -> Self {
        Self
    }

    /// Handle one message. Failures are reported to the session as an
    /// `llm` error envelope rather than returned.
    pub async fn handle(&self, session: &dyn ChatSession, message: &ImageMessage) {
        if let Err(e) = self.try_handle(session, message).await {
            error!(error = %e, "Image message handling failed");
            let envelope =
                ErrorEnvelope::llm(format!("error while handling image message: {}", cause(&e)));
            if let Err(send_err) = session.send(&envelope).await {
                error!(error = %send_err, "Failed to send error envelope");
            }
        }
    }

    async fn try_handle(&self, session: &dyn ChatSession, message: &ImageMessage) -> Result<()> {
        let question = message
            .question
            .as_deref()
            .unwrap_or(DEFAULT_IMAGE_QUESTION);
        if !question.contains(DEFAULT_IMAGE_QUESTION) {
            return session.start_chat(UNSUPPORTED_QUESTION_REPLY).await;
        }

        let file_name = message
            .file_name
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .ok_or_else(|| Error::InvalidInput("file_name is required".to_string()))?;
        let scene = message
            .status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(UNSPECIFIED_SCENE);

        session
            .start_chat(&format!(
                "outfit advice:\nimage path: {}\nscene: {}",
                file_name, scene
            ))
            .await
    }
}

/// Error text without the category prefix.
fn cause(err: &Error) -> String {
    match err {
        Error::InvalidInput(msg)
        | Error::NotFound(msg)
        | Error::InvalidContent(msg)
        | Error::Config(msg)
        | Error::Inference(msg)
        | Error::Request(msg)
        | Error::Serialization(msg)
        | Error::Internal(msg) => msg.clone(),
        Error::Io(e) => e.to_string(),
    }
}

/// Event produced for the client during a chat exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutboundEvent {
    /// Text fed to the language model.
    StartChat { text: String },
    /// Direct reply to the user.
    Reply { text: String },
    /// Raw error envelope.
    Error(ErrorEnvelope),
}

/// Session that records what it is asked to do.
///
/// Serves the HTTP message endpoint, where the events are returned to the
/// caller instead of being streamed over a live connection.
#[derive(Debug, Default)]
pub struct RecordingSession {
    events: Mutex<Vec<OutboundEvent>>,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_events(self) -> Vec<OutboundEvent> {
        self.events.into_inner().unwrap_or_else(|e| e.into_inner())
    }

    fn push(&self, event: OutboundEvent) -> Result<()> {
        self.events
            .lock()
            .map_err(|_| Error::Internal("chat session poisoned".to_string()))?
            .push(event);
        Ok(())
    }
}

#[async_trait]
impl ChatSession for RecordingSession {
    async fn start_chat(&self, text: &str) -> Result<()> {
        self.push(OutboundEvent::StartChat {
            text: text.to_string(),
        })
    }

    async fn reply(&self, text: &str) -> Result<()> {
        self.push(OutboundEvent::Reply {
            text: text.to_string(),
        })
    }

    async fn send(&self, envelope: &ErrorEnvelope) -> Result<()> {
        self.push(OutboundEvent::Error(envelope.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Session whose chat turns always fail.
    #[derive(Default)]
    struct BrokenSession {
        sent: Mutex<Vec<ErrorEnvelope>>,
    }

    #[async_trait]
    impl ChatSession for BrokenSession {
        async fn start_chat(&self, _text: &str) -> Result<()> {
            Err(Error::Internal("connection closed".to_string()))
        }

        async fn reply(&self, _text: &str) -> Result<()> {
            Err(Error::Internal("connection closed".to_string()))
        }

        async fn send(&self, envelope: &ErrorEnvelope) -> Result<()> {
            self.sent.lock().unwrap().push(envelope.clone());
            Ok(())
        }
    }

    fn image_message(file_name: &str, status: Option<&str>, question: Option<&str>) -> ImageMessage {
        ImageMessage {
            file_name: Some(file_name.to_string()),
            status: status.map(str::to_string),
            question: question.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_dispatch_continue_chat_starts_turn() {
        let session = RecordingSession::new();
        dispatch_directive(&session, &GuidanceDirective::continue_chat("advice prompt"))
            .await
            .unwrap();
        assert_eq!(
            session.into_events(),
            vec![OutboundEvent::StartChat {
                text: "advice prompt".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_dispatch_respond_error_replies() {
        let session = RecordingSession::new();
        dispatch_directive(&session, &GuidanceDirective::respond_error("generation failed: x"))
            .await
            .unwrap();
        assert_eq!(
            session.into_events(),
            vec![OutboundEvent::Reply {
                text: "generation failed: x".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_default_question_starts_outfit_turn() {
        let session = RecordingSession::new();
        ImageMessageHandler::new()
            .handle(&session, &image_message("image_1_ab.png", Some("job interview"), None))
            .await;
        assert_eq!(
            session.into_events(),
            vec![OutboundEvent::StartChat {
                text: "outfit advice:\nimage path: image_1_ab.png\nscene: job interview"
                    .to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_question_mentioning_ootd_is_supported() {
        let session = RecordingSession::new();
        ImageMessageHandler::new()
            .handle(
                &session,
                &image_message("a.png", None, Some("what's my ootd today?")),
            )
            .await;
        match &session.into_events()[..] {
            [OutboundEvent::StartChat { text }] => {
                assert!(text.starts_with("outfit advice:"));
                assert!(text.ends_with("scene: not specified"));
            }
            other => panic!("unexpected events {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_other_question_is_declined() {
        let session = RecordingSession::new();
        ImageMessageHandler::new()
            .handle(&session, &image_message("a.png", None, Some("what breed is this dog?")))
            .await;
        assert_eq!(
            session.into_events(),
            vec![OutboundEvent::StartChat {
                text: UNSUPPORTED_QUESTION_REPLY.to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_missing_file_name_sends_error_envelope() {
        let session = RecordingSession::new();
        ImageMessageHandler::new()
            .handle(&session, &ImageMessage::default())
            .await;
        assert_eq!(
            session.into_events(),
            vec![OutboundEvent::Error(ErrorEnvelope::llm(
                "error while handling image message: file_name is required"
            ))]
        );
    }

    #[tokio::test]
    async fn test_session_failure_sends_error_envelope() {
        let session = BrokenSession::default();
        ImageMessageHandler::new()
            .handle(&session, &image_message("a.png", None, None))
            .await;
        let sent = session.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].message,
            "error while handling image message: connection closed"
        );
    }

    #[test]
    fn test_error_envelope_wire_shape() {
        let json = serde_json::to_value(ErrorEnvelope::llm("boom")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "llm", "status": "error", "message": "boom"})
        );
    }

    #[test]
    fn test_outbound_event_wire_shape() {
        let json = serde_json::to_value(OutboundEvent::Error(ErrorEnvelope::llm("boom"))).unwrap();
        assert_eq!(json["kind"], "error");
        assert_eq!(json["type"], "llm");
        let json = serde_json::to_value(OutboundEvent::StartChat {
            text: "hi".to_string(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"kind": "start_chat", "text": "hi"}));
    }
}
