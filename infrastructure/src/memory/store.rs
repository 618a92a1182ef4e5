//! In-memory conversation store with least-recently-used eviction.

use lru::LruCache;
use parley_application::ports::conversation_store::{ConversationStore, SessionHandle};
use parley_domain::{Session, SessionId};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Mutex as SessionMutex;
use tracing::{debug, info, warn};

/// Process-local session map bounded by `capacity`.
///
/// The internal lock is only held for map operations, never across an
/// `.await`. Only idle sessions are evicted: a session whose handle is held
/// outside the store (a turn in progress or waiting for the lock) stays
/// reachable by id. When every session is busy the map grows past
/// `capacity` and shrinks back on later insertions.
pub struct InMemoryConversationStore {
    sessions: Mutex<LruCache<SessionId, SessionHandle>>,
    capacity: NonZeroUsize,
    system_prompt: Option<String>,
}

impl InMemoryConversationStore {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            sessions: Mutex::new(LruCache::new(capacity)),
            capacity,
            system_prompt: None,
        }
    }

    /// Seed every new session with this system directive
    pub fn with_system_prompt(mut self, system_prompt: Option<String>) -> Self {
        self.system_prompt = system_prompt;
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<SessionId, SessionHandle>> {
        // No map operation can panic halfway, so a poisoned map is still consistent
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Evict idle sessions, least recently used first, until one more fits.
    fn make_room(&self, sessions: &mut LruCache<SessionId, SessionHandle>) {
        while sessions.len() >= self.capacity.get() {
            let idle = sessions
                .iter()
                .rev()
                .find(|(_, handle)| Arc::strong_count(handle) == 1)
                .map(|(id, _)| id.clone());
            let Some(evicted) = idle else {
                break;
            };
            sessions.pop(&evicted);
            info!(evicted = %evicted, "Session evicted (capacity {})", self.capacity);
        }

        let wanted = self.capacity.get().max(sessions.len() + 1);
        if wanted != sessions.cap().get() {
            if wanted > self.capacity.get() {
                warn!(
                    live = sessions.len(),
                    "All sessions busy; exceeding capacity {}", self.capacity
                );
            }
            sessions.resize(NonZeroUsize::new(wanted).unwrap_or(self.capacity));
        }
    }

    fn new_session(&self, id: &SessionId) -> Session {
        match &self.system_prompt {
            Some(prompt) => Session::with_system_prompt(id.clone(), prompt.clone()),
            None => Session::new(id.clone()),
        }
    }
}

impl ConversationStore for InMemoryConversationStore {
    fn get_or_create(&self, id: &SessionId) -> SessionHandle {
        let mut sessions = self.lock();
        if let Some(handle) = sessions.get(id) {
            return Arc::clone(handle);
        }

        self.make_room(&mut sessions);
        let handle = Arc::new(SessionMutex::new(self.new_session(id)));
        sessions.put(id.clone(), Arc::clone(&handle));
        info!(session = %id, live = sessions.len(), "Session created");
        handle
    }

    fn get(&self, id: &SessionId) -> Option<SessionHandle> {
        self.lock().get(id).cloned()
    }

    fn remove(&self, id: &SessionId) -> bool {
        let removed = self.lock().pop(id).is_some();
        if removed {
            debug!(session = %id, "Session removed");
        }
        removed
    }

    fn len(&self) -> usize {
        self.lock().len()
    }

    fn clear(&self) {
        self.lock().clear();
    }
}
