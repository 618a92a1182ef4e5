//! Streaming turn in progress.
//!
//! A [`TurnStream`] owns the session lock from the moment the user turn is
//! pushed until the reply is settled. The reply is committed as a single
//! assistant turn once the stream completes; an error, a timeout or dropping
//! the stream early rolls the transcript back to where it was.

use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use crate::ports::llm_gateway::{GatewayError, StreamHandle};
use crate::use_cases::advance_turn::AdvanceTurnError;
use parley_domain::{Session, SessionId, StreamEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamState {
    Open,
    Committed,
    RolledBack,
}

/// Fragments of one assistant reply, tied to the locked session.
pub struct TurnStream {
    session: OwnedMutexGuard<Session>,
    checkpoint: usize,
    events: StreamHandle,
    received: String,
    fragment_timeout: Option<Duration>,
    state: StreamState,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl TurnStream {
    pub(crate) fn new(
        session: OwnedMutexGuard<Session>,
        checkpoint: usize,
        events: StreamHandle,
        fragment_timeout: Option<Duration>,
        conversation_logger: Arc<dyn ConversationLogger>,
    ) -> Self {
        Self {
            session,
            checkpoint,
            events,
            received: String::new(),
            fragment_timeout,
            state: StreamState::Open,
            conversation_logger,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        self.session.id()
    }

    /// Text received so far
    pub fn received(&self) -> &str {
        &self.received
    }

    /// Whether the reply is settled (committed or rolled back)
    pub fn is_finished(&self) -> bool {
        self.state != StreamState::Open
    }

    /// Next fragment of the reply.
    ///
    /// Returns `None` once the reply is complete and committed. An error
    /// rolls the transcript back and ends the stream.
    pub async fn next_fragment(&mut self) -> Option<Result<String, AdvanceTurnError>> {
        if self.is_finished() {
            return None;
        }

        let event = match self.fragment_timeout {
            Some(limit) => match tokio::time::timeout(limit, self.events.recv()).await {
                Ok(event) => event,
                Err(_) => return Some(Err(self.roll_back(GatewayError::Timeout))),
            },
            None => self.events.recv().await,
        };

        match event {
            Some(StreamEvent::Delta(chunk)) => {
                self.received.push_str(&chunk);
                Some(Ok(chunk))
            }
            Some(StreamEvent::Completed(text)) => {
                // Adapters without deltas deliver the whole reply here
                let fragment = if self.received.is_empty() && !text.is_empty() {
                    self.received = text.clone();
                    Some(text)
                } else {
                    None
                };
                match self.commit() {
                    Ok(()) => fragment.map(Ok),
                    Err(e) => Some(Err(e)),
                }
            }
            Some(StreamEvent::Error(message)) => {
                Some(Err(self.roll_back(GatewayError::RequestFailed(message))))
            }
            None => self.commit().err().map(Err),
        }
    }

    /// Drain the remaining fragments and return the full reply.
    pub async fn collect(mut self) -> Result<String, AdvanceTurnError> {
        while let Some(fragment) = self.next_fragment().await {
            fragment?;
        }
        Ok(std::mem::take(&mut self.received))
    }

    /// Settle the turn without waiting for more fragments.
    ///
    /// Whatever was received so far is committed as the reply; if nothing
    /// arrived, the exchange is rolled back and `None` is returned.
    pub fn finalize(mut self) -> Option<String> {
        match self.state {
            StreamState::Open => {
                if self.commit().is_err() {
                    return None;
                }
            }
            StreamState::RolledBack => return None,
            StreamState::Committed => {}
        }
        Some(std::mem::take(&mut self.received))
    }

    fn commit(&mut self) -> Result<(), AdvanceTurnError> {
        if self.received.trim().is_empty() {
            return Err(self.roll_back(GatewayError::MalformedResponse(
                "stream ended without content".to_string(),
            )));
        }

        self.session.add_assistant_turn(self.received.as_str());
        self.state = StreamState::Committed;
        self.conversation_logger.log(ConversationEvent::new(
            "assistant_turn",
            serde_json::json!({
                "session": self.session.id().as_str(),
                "content": self.received,
                "streamed": true,
            }),
        ));
        debug!(session = %self.session.id(), turns = self.session.len(), "Streamed turn committed");
        Ok(())
    }

    fn roll_back(&mut self, error: GatewayError) -> AdvanceTurnError {
        self.session.truncate(self.checkpoint);
        self.state = StreamState::RolledBack;
        self.conversation_logger.log(ConversationEvent::new(
            "provider_error",
            serde_json::json!({
                "session": self.session.id().as_str(),
                "kind": error.kind(),
                "message": error.to_string(),
            }),
        ));
        warn!(session = %self.session.id(), "Streamed turn failed, transcript rolled back: {}", error);
        error.into()
    }
}

impl Drop for TurnStream {
    fn drop(&mut self) {
        if self.state == StreamState::Open {
            self.session.truncate(self.checkpoint);
            debug!(session = %self.session.id(), "Unfinished stream dropped, transcript rolled back");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChatBehavior, RoutingMode};
    use crate::ports::conversation_store::{ConversationStore, SessionHandle};
    use crate::ports::llm_gateway::LlmGateway;
    use crate::use_cases::advance_turn::AdvanceTurnUseCase;
    use async_trait::async_trait;
    use parley_domain::{GenerationConfig, Model, Role, Turn};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    /// Gateway whose streams are fed by the test through a sender.
    struct ChannelGateway {
        model: Model,
        pending: Mutex<Option<mpsc::Receiver<StreamEvent>>>,
    }

    impl ChannelGateway {
        fn new() -> (Self, mpsc::Sender<StreamEvent>) {
            let (tx, rx) = mpsc::channel(16);
            let gateway = Self {
                model: Model::default(),
                pending: Mutex::new(Some(rx)),
            };
            (gateway, tx)
        }
    }

    #[async_trait]
    impl LlmGateway for ChannelGateway {
        fn model(&self) -> &Model {
            &self.model
        }

        async fn generate(
            &self,
            _turns: &[Turn],
            _config: &GenerationConfig,
        ) -> Result<String, GatewayError> {
            Err(GatewayError::Other("streaming only".to_string()))
        }

        async fn generate_streaming(
            &self,
            _turns: &[Turn],
            _config: &GenerationConfig,
        ) -> Result<StreamHandle, GatewayError> {
            self.pending
                .lock()
                .unwrap()
                .take()
                .map(StreamHandle::new)
                .ok_or_else(|| GatewayError::Other("stream already taken".to_string()))
        }
    }

    /// Gateway without native streaming (uses the default wrapper).
    struct WholeReplyGateway {
        model: Model,
    }

    #[async_trait]
    impl LlmGateway for WholeReplyGateway {
        fn model(&self) -> &Model {
            &self.model
        }

        async fn generate(
            &self,
            _turns: &[Turn],
            _config: &GenerationConfig,
        ) -> Result<String, GatewayError> {
            Ok("Ram Ram".to_string())
        }
    }

    #[derive(Default)]
    struct MapStore {
        sessions: Mutex<HashMap<SessionId, SessionHandle>>,
    }

    impl ConversationStore for MapStore {
        fn get_or_create(&self, id: &SessionId) -> SessionHandle {
            self.sessions
                .lock()
                .unwrap()
                .entry(id.clone())
                .or_insert_with(|| {
                    Arc::new(tokio::sync::Mutex::new(Session::with_system_prompt(
                        id.clone(),
                        "sys",
                    )))
                })
                .clone()
        }

        fn get(&self, id: &SessionId) -> Option<SessionHandle> {
            self.sessions.lock().unwrap().get(id).cloned()
        }

        fn remove(&self, id: &SessionId) -> bool {
            self.sessions.lock().unwrap().remove(id).is_some()
        }

        fn len(&self) -> usize {
            self.sessions.lock().unwrap().len()
        }

        fn clear(&self) {
            self.sessions.lock().unwrap().clear();
        }
    }

    fn sid() -> SessionId {
        SessionId::new("stream").unwrap()
    }

    fn channel_use_case() -> (AdvanceTurnUseCase, mpsc::Sender<StreamEvent>) {
        let (gateway, tx) = ChannelGateway::new();
        let uc = AdvanceTurnUseCase::new(Arc::new(gateway), Arc::new(MapStore::default()));
        (uc, tx)
    }

    #[tokio::test]
    async fn test_fragments_concatenate_to_committed_reply() {
        let (uc, tx) = channel_use_case();
        for chunk in ["Jai ", "Shri ", "Ram"] {
            tx.send(StreamEvent::Delta(chunk.to_string())).await.unwrap();
        }
        tx.send(StreamEvent::Completed("Jai Shri Ram".to_string()))
            .await
            .unwrap();

        let mut stream = uc
            .advance_streaming(&sid(), "Greet me", &GenerationConfig::default())
            .await
            .unwrap();
        let mut fragments = Vec::new();
        while let Some(fragment) = stream.next_fragment().await {
            fragments.push(fragment.unwrap());
        }
        assert!(stream.is_finished());
        drop(stream);

        assert_eq!(fragments.concat(), "Jai Shri Ram");
        let turns = uc.transcript(&sid()).await;
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[2].role, Role::Assistant);
        assert_eq!(turns[2].content, "Jai Shri Ram");
    }

    #[tokio::test]
    async fn test_closed_channel_commits_received_text() {
        let (uc, tx) = channel_use_case();
        tx.send(StreamEvent::Delta("partial".to_string())).await.unwrap();
        drop(tx);

        let stream = uc
            .advance_streaming(&sid(), "hi", &GenerationConfig::default())
            .await
            .unwrap();
        assert_eq!(stream.collect().await.unwrap(), "partial");
        assert_eq!(uc.transcript(&sid()).await.len(), 3);
    }

    #[tokio::test]
    async fn test_drop_before_completion_rolls_back() {
        let (uc, tx) = channel_use_case();
        tx.send(StreamEvent::Delta("half a ".to_string())).await.unwrap();

        let mut stream = uc
            .advance_streaming(&sid(), "tell me a story", &GenerationConfig::default())
            .await
            .unwrap();
        assert_eq!(stream.next_fragment().await.unwrap().unwrap(), "half a ");
        drop(stream);

        let turns = uc.transcript(&sid()).await;
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].role, Role::System);
    }

    #[tokio::test]
    async fn test_error_event_rolls_back() {
        let (uc, tx) = channel_use_case();
        tx.send(StreamEvent::Delta("oops".to_string())).await.unwrap();
        tx.send(StreamEvent::Error("upstream reset".to_string()))
            .await
            .unwrap();

        let stream = uc
            .advance_streaming(&sid(), "hi", &GenerationConfig::default())
            .await
            .unwrap();
        let err = stream.collect().await.unwrap_err();
        assert!(matches!(
            err,
            AdvanceTurnError::Gateway(GatewayError::RequestFailed(_))
        ));
        assert_eq!(uc.transcript(&sid()).await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_stream_times_out_and_rolls_back() {
        let (gateway, _tx) = ChannelGateway::new();
        let uc = AdvanceTurnUseCase::new(Arc::new(gateway), Arc::new(MapStore::default()))
            .with_behavior(ChatBehavior::default().with_timeout(Some(Duration::from_secs(2))));

        let mut stream = uc
            .advance_streaming(&sid(), "hi", &GenerationConfig::default())
            .await
            .unwrap();
        let err = stream.next_fragment().await.unwrap().unwrap_err();
        assert_eq!(err, AdvanceTurnError::Gateway(GatewayError::Timeout));
        assert!(stream.next_fragment().await.is_none());
        drop(stream);
        assert_eq!(uc.transcript(&sid()).await.len(), 1);
    }

    #[tokio::test]
    async fn test_finalize_commits_partial_reply() {
        let (uc, tx) = channel_use_case();
        tx.send(StreamEvent::Delta("enough".to_string())).await.unwrap();

        let mut stream = uc
            .advance_streaming(&sid(), "hi", &GenerationConfig::default())
            .await
            .unwrap();
        stream.next_fragment().await.unwrap().unwrap();
        assert_eq!(stream.finalize().as_deref(), Some("enough"));

        let turns = uc.transcript(&sid()).await;
        assert_eq!(turns.last().unwrap().content, "enough");
    }

    #[tokio::test]
    async fn test_finalize_without_content_rolls_back() {
        let (uc, _tx) = channel_use_case();
        let stream = uc
            .advance_streaming(&sid(), "hi", &GenerationConfig::default())
            .await
            .unwrap();
        assert_eq!(stream.finalize(), None);
        assert_eq!(uc.transcript(&sid()).await.len(), 1);
    }

    #[tokio::test]
    async fn test_non_streaming_gateway_yields_single_fragment() {
        let uc = AdvanceTurnUseCase::new(
            Arc::new(WholeReplyGateway {
                model: Model::default(),
            }),
            Arc::new(MapStore::default()),
        );
        let mut stream = uc
            .advance_streaming(&sid(), "greet", &GenerationConfig::default())
            .await
            .unwrap();
        assert_eq!(stream.next_fragment().await.unwrap().unwrap(), "Ram Ram");
        assert!(stream.next_fragment().await.is_none());
        drop(stream);
        assert_eq!(uc.transcript(&sid()).await.len(), 3);
    }

    #[tokio::test]
    async fn test_tool_reply_streams_as_one_fragment() {
        let (gateway, _tx) = ChannelGateway::new();
        let uc = AdvanceTurnUseCase::new(Arc::new(gateway), Arc::new(MapStore::default()))
            .with_behavior(ChatBehavior::default().with_routing(RoutingMode::ToolsThenModel));

        let stream = uc
            .advance_streaming(&sid(), "What is 6 * 7?", &GenerationConfig::default())
            .await
            .unwrap();
        assert_eq!(stream.collect().await.unwrap(), "42");
    }

    #[tokio::test]
    async fn test_stream_holds_session_lock() {
        let (uc, tx) = channel_use_case();
        let stream = uc
            .advance_streaming(&sid(), "hi", &GenerationConfig::default())
            .await
            .unwrap();

        let handle = uc.store().get(&sid()).unwrap();
        assert!(handle.try_lock().is_err());

        tx.send(StreamEvent::Completed("done".to_string()))
            .await
            .unwrap();
        stream.collect().await.unwrap();
        assert!(handle.try_lock().is_ok());
    }
}
