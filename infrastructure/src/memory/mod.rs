//! Process-local adapters.

mod store;

pub use store::InMemoryConversationStore;
