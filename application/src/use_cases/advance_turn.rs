//! Advance Turn use case (the Turn Processor).
//!
//! One call takes a user message for a session, produces a reply and
//! records both in the transcript:
//!
//! ```text
//! get_or_create(id) ─▶ lock session ─▶ push user turn
//!        ─▶ responder (tool router | model) ─▶ push assistant turn
//!                                   └─ on failure: roll back to checkpoint
//! ```
//!
//! The session lock is held for the whole exchange, so turns on one session
//! never interleave. A failed exchange leaves the transcript exactly as it
//! was before the call; the user turn is not retained.

use crate::config::{ChatBehavior, RoutingMode};
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::conversation_store::ConversationStore;
use crate::ports::llm_gateway::{GatewayError, LlmGateway, StreamHandle};
use crate::use_cases::turn_stream::TurnStream;
use parley_domain::core::string::{single_line, truncate};
use parley_domain::{
    GenerationConfig, RouteDecision, RouteOutcome, Session, SessionId, ToolRouter, Turn,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur while advancing a turn.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdvanceTurnError {
    #[error("User input is empty")]
    EmptyInput,

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// A streamed reply was cut short before any text arrived
    #[error("Interrupted before the reply started")]
    Interrupted,
}

impl AdvanceTurnError {
    /// Whether the caller may resend the same message
    pub fn is_retryable(&self) -> bool {
        match self {
            AdvanceTurnError::EmptyInput => false,
            AdvanceTurnError::Gateway(e) => e.is_retryable(),
            AdvanceTurnError::Interrupted => true,
        }
    }
}

/// Use case for advancing a conversation by one exchange.
pub struct AdvanceTurnUseCase {
    gateway: Arc<dyn LlmGateway>,
    store: Arc<dyn ConversationStore>,
    router: ToolRouter,
    behavior: ChatBehavior,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl Clone for AdvanceTurnUseCase {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            store: self.store.clone(),
            router: self.router.clone(),
            behavior: self.behavior.clone(),
            conversation_logger: self.conversation_logger.clone(),
        }
    }
}

impl AdvanceTurnUseCase {
    pub fn new(gateway: Arc<dyn LlmGateway>, store: Arc<dyn ConversationStore>) -> Self {
        let behavior = ChatBehavior::default();
        Self {
            gateway,
            store,
            router: ToolRouter::default().with_tie_break(behavior.tie_break),
            behavior,
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    /// Set chat behavior; the router adopts its tie-break.
    pub fn with_behavior(mut self, behavior: ChatBehavior) -> Self {
        self.router = self.router.with_tie_break(behavior.tie_break);
        self.behavior = behavior;
        self
    }

    /// Replace the tool router (registration order matters for tie-breaks).
    pub fn with_router(mut self, router: ToolRouter) -> Self {
        self.router = router;
        self
    }

    /// Create with a conversation logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub fn behavior(&self) -> &ChatBehavior {
        &self.behavior
    }

    pub fn store(&self) -> &Arc<dyn ConversationStore> {
        &self.store
    }

    pub fn gateway(&self) -> &Arc<dyn LlmGateway> {
        &self.gateway
    }

    /// Switch responder at runtime (REPL `/mode`).
    pub fn set_routing(&mut self, routing: RoutingMode) {
        self.behavior.routing = routing;
    }

    /// Advance the session named `session_id` by one exchange.
    pub async fn advance(
        &self,
        session_id: &SessionId,
        user_text: &str,
        config: &GenerationConfig,
    ) -> Result<String, AdvanceTurnError> {
        ensure_not_blank(user_text)?;
        let handle = self.store.get_or_create(session_id);
        let mut session = handle.lock().await;
        self.advance_session(&mut session, user_text, config).await
    }

    /// Advance an already-locked session by one exchange.
    pub async fn advance_session(
        &self,
        session: &mut Session,
        user_text: &str,
        config: &GenerationConfig,
    ) -> Result<String, AdvanceTurnError> {
        ensure_not_blank(user_text)?;
        info!(
            session = %session.id(),
            "Advancing turn: {}",
            truncate(&single_line(user_text), 80)
        );

        let checkpoint = session.len();
        session.add_user_turn(user_text);
        self.log_turn(session.id(), "user_turn", user_text);

        let outcome = match self.tool_reply(session.id(), user_text) {
            Some(reply) => Ok(reply),
            None => self.call_model(session.turns(), config).await,
        };

        match outcome {
            Ok(reply) => {
                session.add_assistant_turn(reply.as_str());
                self.log_turn(session.id(), "assistant_turn", &reply);
                debug!(session = %session.id(), turns = session.len(), "Turn committed");
                Ok(reply)
            }
            Err(e) => {
                session.truncate(checkpoint);
                self.log_failure(session.id(), &e);
                warn!(session = %session.id(), "Turn failed, transcript rolled back: {}", e);
                Err(e.into())
            }
        }
    }

    /// Streaming variant of [`advance`](Self::advance).
    ///
    /// The returned [`TurnStream`] holds the session lock until it is
    /// finished, finalized or dropped.
    pub async fn advance_streaming(
        &self,
        session_id: &SessionId,
        user_text: &str,
        config: &GenerationConfig,
    ) -> Result<TurnStream, AdvanceTurnError> {
        ensure_not_blank(user_text)?;
        let handle = self.store.get_or_create(session_id);
        let mut session = handle.lock_owned().await;
        info!(
            session = %session.id(),
            "Advancing streamed turn: {}",
            truncate(&single_line(user_text), 80)
        );

        let checkpoint = session.len();
        session.add_user_turn(user_text);
        self.log_turn(session.id(), "user_turn", user_text);

        let events = match self.tool_reply(session.id(), user_text) {
            Some(reply) => StreamHandle::completed(reply),
            None => match self.start_stream(session.turns(), config).await {
                Ok(events) => events,
                Err(e) => {
                    session.truncate(checkpoint);
                    self.log_failure(session.id(), &e);
                    warn!(session = %session.id(), "Stream failed to start: {}", e);
                    return Err(e.into());
                }
            },
        };

        Ok(TurnStream::new(
            session,
            checkpoint,
            events,
            self.behavior.timeout,
            self.conversation_logger.clone(),
        ))
    }

    /// Snapshot of a session's transcript (empty if it does not exist).
    pub async fn transcript(&self, session_id: &SessionId) -> Vec<Turn> {
        match self.store.get(session_id) {
            Some(handle) => handle.lock().await.turns().to_vec(),
            None => Vec::new(),
        }
    }

    /// Forget a session; the next message starts a fresh transcript.
    pub fn reset(&self, session_id: &SessionId) -> bool {
        let existed = self.store.remove(session_id);
        if existed {
            info!(session = %session_id, "Session reset");
        }
        existed
    }

    /// Reply from the tool router, or `None` when the model should answer.
    ///
    /// With `ToolsThenModel`, a query no tool matches or the chosen tool
    /// cannot use goes to the model.
    fn tool_reply(&self, session_id: &SessionId, user_text: &str) -> Option<String> {
        if self.behavior.routing == RoutingMode::Model {
            return None;
        }

        let decision = self.router.decide(user_text);
        if let RouteDecision::Ambiguous(candidates) = &decision {
            warn!(
                session = %session_id,
                tie_break = ?self.router.tie_break(),
                "Query matches {} tools: {:?}",
                candidates.len(),
                candidates
            );
        }

        let hybrid = self.behavior.routing == RoutingMode::ToolsThenModel;
        let reply = match self.router.resolve(user_text) {
            Ok(RouteOutcome::NoMatch) if hybrid => return None,
            Ok(RouteOutcome::Rejected { tool, error, .. }) if hybrid => {
                debug!(
                    session = %session_id,
                    tool = %tool,
                    "Tool rejected input, asking the model: {}",
                    error
                );
                return None;
            }
            Ok(outcome) => outcome.into_reply(),
            Err(ambiguous) => ambiguous.reply(),
        };

        self.conversation_logger.log(ConversationEvent::new(
            "tool_route",
            serde_json::json!({
                "session": session_id.as_str(),
                "decision": describe(&decision),
                "reply": reply,
            }),
        ));
        Some(reply)
    }

    async fn call_model(
        &self,
        turns: &[Turn],
        config: &GenerationConfig,
    ) -> Result<String, GatewayError> {
        debug!(
            model = %self.gateway.model(),
            turns = turns.len(),
            "Calling model"
        );
        let call = self.gateway.generate(turns, config);
        let reply = match self.behavior.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| GatewayError::Timeout)??,
            None => call.await?,
        };

        if reply.trim().is_empty() {
            return Err(GatewayError::MalformedResponse("empty reply".to_string()));
        }
        Ok(reply)
    }

    async fn start_stream(
        &self,
        turns: &[Turn],
        config: &GenerationConfig,
    ) -> Result<StreamHandle, GatewayError> {
        let call = self.gateway.generate_streaming(turns, config);
        match self.behavior.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| GatewayError::Timeout)?,
            None => call.await,
        }
    }

    fn log_turn(&self, session_id: &SessionId, event_type: &'static str, content: &str) {
        self.conversation_logger.log(ConversationEvent::new(
            event_type,
            serde_json::json!({
                "session": session_id.as_str(),
                "content": content,
            }),
        ));
    }

    fn log_failure(&self, session_id: &SessionId, error: &GatewayError) {
        self.conversation_logger.log(ConversationEvent::new(
            "provider_error",
            serde_json::json!({
                "session": session_id.as_str(),
                "kind": error.kind(),
                "message": error.to_string(),
            }),
        ));
    }
}

fn ensure_not_blank(user_text: &str) -> Result<(), AdvanceTurnError> {
    if user_text.trim().is_empty() {
        return Err(AdvanceTurnError::EmptyInput);
    }
    Ok(())
}

fn describe(decision: &RouteDecision) -> serde_json::Value {
    match decision {
        RouteDecision::Matched(tool) => serde_json::json!({ "matched": tool.name() }),
        RouteDecision::NoMatch => serde_json::json!("no_match"),
        RouteDecision::Ambiguous(candidates) => serde_json::json!({
            "ambiguous": candidates.iter().map(|t| t.name()).collect::<Vec<_>>(),
        }),
    }
}
