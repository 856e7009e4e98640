// Chat surface
// One session's transcript, the input box and the in-flight reply

use crate::chat::message::ChatMessage;
use crate::chat::transport::{ChatTransport, StreamEvent, StreamHandle};
use crate::state::session_store::{ChatSession, SessionId};
use std::sync::mpsc::TryRecvError;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Lifecycle of the current request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatStatus {
    /// No request in flight
    Idle,
    /// Request sent, no text received yet
    Submitted,
    /// Reply text is arriving
    Streaming,
}

/// State of the chat view for a single session
pub struct ChatSurface {
    session_id: SessionId,
    messages: Arc<Vec<ChatMessage>>,
    status: ChatStatus,
    /// Text currently in the input box
    pub input: String,
    last_error: Option<String>,
    in_flight: Option<StreamHandle>,
    scroll_requested: bool,
}

impl ChatSurface {
    /// Create a surface seeded from the store's copy of a session
    pub fn new(session: &ChatSession) -> Self {
        Self {
            session_id: session.id.clone(),
            messages: Arc::clone(&session.messages),
            status: ChatStatus::Idle,
            input: String::new(),
            last_error: None,
            in_flight: None,
            scroll_requested: !session.messages.is_empty(),
        }
    }

    /// Session this surface belongs to
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Current transcript
    pub fn messages(&self) -> &Arc<Vec<ChatMessage>> {
        &self.messages
    }

    pub fn status(&self) -> ChatStatus {
        self.status
    }

    /// Error from the last request, if it failed
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// True while a request is submitted or streaming
    pub fn is_busy(&self) -> bool {
        self.status != ChatStatus::Idle
    }

    /// Send the input as a new user message
    /// Returns false when the input is blank or a request is already in flight
    pub fn submit(&mut self, transport: &dyn ChatTransport) -> bool {
        if self.is_busy() || self.input.trim().is_empty() {
            return false;
        }

        let text = std::mem::take(&mut self.input);
        Arc::make_mut(&mut self.messages).push(ChatMessage::user(text));
        self.last_error = None;
        self.status = ChatStatus::Submitted;
        self.scroll_requested = true;

        info!(
            session_id = %self.session_id,
            message_count = self.messages.len(),
            "Submitting chat message"
        );
        self.in_flight = Some(transport.send(self.messages.to_vec()));
        true
    }

    /// Apply every pending stream event
    pub fn poll(&mut self) {
        while let Some(handle) = &self.in_flight {
            let event = match handle.try_recv() {
                Ok(event) => event,
                Err(TryRecvError::Empty) => return,
                Err(TryRecvError::Disconnected) => {
                    // Worker went away without a final event
                    self.finish(Some("Connection to chat backend closed".to_string()));
                    return;
                }
            };

            match event {
                StreamEvent::Delta(delta) => self.apply_delta(&delta),
                StreamEvent::Finished => {
                    debug!(session_id = %self.session_id, "Reply complete");
                    self.finish(None);
                }
                StreamEvent::Failed(message) => {
                    warn!(session_id = %self.session_id, error = %message, "Reply failed");
                    self.finish(Some(message));
                }
            }
        }
    }

    fn apply_delta(&mut self, delta: &str) {
        let messages = Arc::make_mut(&mut self.messages);
        if self.status == ChatStatus::Streaming {
            if let Some(reply) = messages.last_mut() {
                reply.append_text(delta);
            }
        } else {
            messages.push(ChatMessage::assistant(delta));
            self.status = ChatStatus::Streaming;
            self.scroll_requested = true;
        }
    }

    fn finish(&mut self, error: Option<String>) {
        self.in_flight = None;
        self.status = ChatStatus::Idle;
        self.last_error = error;
    }

    /// Abort the in-flight reply; text received so far is kept
    pub fn stop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            info!(session_id = %self.session_id, "Stopping reply");
            handle.cancel();
        }
        self.status = ChatStatus::Idle;
    }

    /// Whether the view should scroll to the bottom; clears the request
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_requested)
    }
}
