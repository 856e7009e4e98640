// Chat transport
// Sends a history to the backend and delivers the streamed reply as events

use crate::chat::message::ChatMessage;
use crate::chat::protocol::{decode_event_data, ChatRequestBody, ErrorBody, Frame, UiMessageChunk};
use crate::config::ClientConfig;
use eventsource_stream::Eventsource;
use futures_util::{Stream, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Notify;
use tracing::{debug, info, warn};

/// Event produced while a reply streams in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Text to append to the reply
    Delta(String),
    /// The reply is complete
    Finished,
    /// The request failed; no further events follow
    Failed(String),
}

/// Errors that can occur while talking to the backend
#[derive(Error, Debug)]
pub enum TransportError {
    /// The backend could not be reached or the connection broke
    #[error("Failed to reach chat backend: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with its JSON error body
    #[error("{error}: {details}")]
    Server { error: String, details: String },

    /// The backend answered with an unexpected status
    #[error("Chat backend returned status {0}")]
    Status(u16),

    /// The event stream could not be read or parsed
    #[error("Stream read error: {0}")]
    Stream(String),

    /// The event stream closed before the end-of-reply signal
    #[error("stream ended unexpectedly")]
    Truncated,

    /// The model failed after the reply had started
    #[error("{0}")]
    Generation(String),

    /// The request worker could not start its runtime
    #[error("Failed to start request worker: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Cancellation shared by a handle and the worker serving it
#[derive(Debug, Default)]
pub struct CancelFlag {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelFlag {
    /// Request cancellation and wake the worker
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.notify.notify_one();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once cancellation has been requested
    pub async fn cancelled(&self) {
        while !self.is_cancelled() {
            self.notify.notified().await;
        }
    }
}

/// Receiving end of one in-flight request
/// Dropping the handle cancels the request
#[derive(Debug)]
pub struct StreamHandle {
    events: Receiver<StreamEvent>,
    cancel: Arc<CancelFlag>,
}

impl StreamHandle {
    /// Create a handle and the sender a producer writes to
    pub fn channel() -> (Sender<StreamEvent>, Arc<CancelFlag>, Self) {
        let (tx, rx) = mpsc::channel();
        let cancel = Arc::new(CancelFlag::default());
        let handle = Self {
            events: rx,
            cancel: cancel.clone(),
        };
        (tx, cancel, handle)
    }

    /// Next pending event, if any
    pub fn try_recv(&self) -> Result<StreamEvent, TryRecvError> {
        self.events.try_recv()
    }

    /// Ask the producer to stop; already-delivered text is unaffected
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Something that can stream a reply for a message history
pub trait ChatTransport {
    /// Start a request; events arrive through the returned handle
    fn send(&self, messages: Vec<ChatMessage>) -> StreamHandle;
}

/// Transport over HTTP to the chat proxy backend
/// Each request runs on its own worker thread with a single-threaded runtime
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    repaint: Arc<dyn Fn() + Send + Sync>,
}

impl HttpTransport {
    /// Create a transport; `repaint` is called after every delivered event
    pub fn new(
        config: &ClientConfig,
        repaint: impl Fn() + Send + Sync + 'static,
    ) -> Result<Self, TransportError> {
        // Replies may stream for a long time: no overall timeout
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            endpoint: config.chat_endpoint(),
            repaint: Arc::new(repaint),
        })
    }
}

impl ChatTransport for HttpTransport {
    fn send(&self, messages: Vec<ChatMessage>) -> StreamHandle {
        let (tx, cancel, handle) = StreamHandle::channel();
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        let repaint = self.repaint.clone();

        std::thread::spawn(move || {
            let notify = |event: StreamEvent| -> bool {
                let delivered = tx.send(event).is_ok();
                repaint();
                delivered
            };

            let result = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(TransportError::from)
                .and_then(|runtime| {
                    runtime.block_on(async {
                        tokio::select! {
                            result = run_request(&client, &endpoint, &messages, &notify) => result,
                            _ = cancel.cancelled() => {
                                debug!("Stream cancelled by user");
                                Ok(())
                            }
                        }
                    })
                });

            match result {
                Ok(()) => {}
                Err(e) if cancel.is_cancelled() => {
                    debug!(error = %e, "Cancelled request ended with error");
                }
                Err(e) => {
                    warn!(error = %e, "Chat request failed");
                    notify(StreamEvent::Failed(e.to_string()));
                }
            }
        });

        handle
    }
}

/// Perform one request, forwarding stream events until the reply ends
async fn run_request(
    client: &reqwest::Client,
    endpoint: &str,
    messages: &[ChatMessage],
    notify: &dyn Fn(StreamEvent) -> bool,
) -> Result<(), TransportError> {
    info!(message_count = messages.len(), "Sending chat request");
    let response = client
        .post(endpoint)
        .json(&ChatRequestBody { messages })
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(match serde_json::from_str::<ErrorBody>(&body) {
            Ok(ErrorBody { error, details }) => TransportError::Server { error, details },
            Err(_) => TransportError::Status(status.as_u16()),
        });
    }

    forward_stream(response.bytes_stream(), notify).await
}

/// Decode server-sent events and translate them into stream events
/// A reply is only complete once the end-of-reply signal arrives
async fn forward_stream<S, B, E>(
    bytes: S,
    notify: &dyn Fn(StreamEvent) -> bool,
) -> Result<(), TransportError>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    let mut events = std::pin::pin!(bytes.eventsource());

    while let Some(event) = events.next().await {
        let event = event.map_err(|e| TransportError::Stream(e.to_string()))?;

        match decode_event_data(&event.data) {
            Some(Frame::Chunk(UiMessageChunk::TextDelta { delta, .. })) => {
                if !notify(StreamEvent::Delta(delta)) {
                    // Nobody is listening any more
                    return Ok(());
                }
            }
            Some(Frame::Chunk(UiMessageChunk::Error { error_text })) => {
                return Err(TransportError::Generation(error_text));
            }
            Some(Frame::Done) => {
                notify(StreamEvent::Finished);
                return Ok(());
            }
            Some(Frame::Chunk(_)) | None => {}
        }
    }

    Err(TransportError::Truncated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use std::sync::Mutex;

    async fn run(chunks: Vec<&'static str>) -> (Result<(), TransportError>, Vec<StreamEvent>) {
        let events = Mutex::new(Vec::new());
        let notify = |event: StreamEvent| {
            events.lock().unwrap().push(event);
            true
        };
        let body = stream::iter(chunks.into_iter().map(Ok::<_, std::io::Error>));
        let result = forward_stream(body, &notify).await;
        (result, events.into_inner().unwrap())
    }

    #[tokio::test]
    async fn test_forward_stream_success() {
        let (result, events) = run(vec![
            "data: {\"type\":\"start\",\"messageId\":\"m\"}\n\n",
            "data: {\"type\":\"text-start\",\"id\":\"t\"}\n\n",
            "data: {\"type\":\"text-delta\",\"id\":\"t\",\"delta\":\"Hel\"}\n\n",
            "data: {\"type\":\"text-delta\",\"id\":\"t\",\"delta\":\"lo\"}\n\n",
            "data: {\"type\":\"text-end\",\"id\":\"t\"}\n\n",
            "data: {\"type\":\"finish\"}\n\n",
            "data: [DONE]\n\n",
        ])
        .await;
        assert!(result.is_ok());
        assert_eq!(
            events,
            vec![
                StreamEvent::Delta("Hel".to_string()),
                StreamEvent::Delta("lo".to_string()),
                StreamEvent::Finished,
            ]
        );
    }

    #[tokio::test]
    async fn test_events_split_across_chunks_are_reassembled() {
        let (result, events) = run(vec![
            "data: {\"type\":\"text-del",
            "ta\",\"id\":\"t\",\"delta\":\"joined\"}\n",
            "\ndata: [DO",
            "NE]\n\n",
        ])
        .await;
        assert!(result.is_ok());
        assert_eq!(
            events,
            vec![StreamEvent::Delta("joined".to_string()), StreamEvent::Finished]
        );
    }

    #[tokio::test]
    async fn test_forward_stream_in_band_error() {
        let (result, events) = run(vec![
            "data: {\"type\":\"text-delta\",\"id\":\"t\",\"delta\":\"par\"}\n\n",
            "data: {\"type\":\"error\",\"errorText\":\"Gemini API blocked the prompt: SAFETY\"}\n\n",
            "data: [DONE]\n\n",
        ])
        .await;
        assert_eq!(events, vec![StreamEvent::Delta("par".to_string())]);
        assert!(matches!(result, Err(TransportError::Generation(msg)) if msg.contains("SAFETY")));
    }

    #[tokio::test]
    async fn test_stream_closed_without_done_is_an_error() {
        let (result, events) = run(vec![
            "data: {\"type\":\"text-delta\",\"id\":\"t\",\"delta\":\"cut\"}\n\n",
        ])
        .await;
        assert_eq!(events, vec![StreamEvent::Delta("cut".to_string())]);
        let err = result.unwrap_err();
        assert!(matches!(err, TransportError::Truncated));
        assert_eq!(err.to_string(), "stream ended unexpectedly");
    }

    #[tokio::test]
    async fn test_cancel_wakes_a_waiting_worker() {
        let flag = Arc::new(CancelFlag::default());
        let waiter = {
            let flag = flag.clone();
            tokio::spawn(async move { flag.cancelled().await })
        };
        flag.cancel();
        waiter.await.unwrap();
        assert!(flag.is_cancelled());
    }

    #[test]
    fn test_dropping_handle_sets_cancel_flag() {
        let (_tx, cancel, handle) = StreamHandle::channel();
        assert!(!cancel.is_cancelled());
        drop(handle);
        assert!(cancel.is_cancelled());
    }

    #[test]
    fn test_server_error_display() {
        let err = TransportError::Server {
            error: "Internal Server Error".to_string(),
            details: "No API key found for fallback".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Internal Server Error: No API key found for fallback"
        );
    }
}
