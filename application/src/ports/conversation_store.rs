//! Conversation Store port
//!
//! Keyed access to session transcripts. Each session sits behind its own
//! async mutex: holding the lock is what serializes turns on one session,
//! while different sessions proceed in parallel.

use parley_domain::{Session, SessionId};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared, lockable handle to one session
pub type SessionHandle = Arc<Mutex<Session>>;

/// Keyed mapping from session id to transcript.
///
/// `get_or_create` must be atomic: two concurrent calls with the same id
/// observe the same handle.
pub trait ConversationStore: Send + Sync {
    /// Existing session for `id`, or a freshly created (possibly seeded) one
    fn get_or_create(&self, id: &SessionId) -> SessionHandle;

    /// Existing session for `id`, without creating one
    fn get(&self, id: &SessionId) -> Option<SessionHandle>;

    /// Forget a session. Returns whether it existed.
    fn remove(&self, id: &SessionId) -> bool;

    /// Number of sessions currently held
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget every session
    fn clear(&self);
}
