//! Session domain entities

use super::value_objects::SessionId;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Role of a turn in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Wire name used by chat completion APIs
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single message in a transcript (Entity)
///
/// `ordinal` is the 0-based insertion position within its session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub ordinal: usize,
}

impl Turn {
    pub fn is_system(&self) -> bool {
        self.role == Role::System
    }
}

/// A conversation session (Entity)
///
/// Holds the ordered transcript for one session id. Turns are append-only;
/// a system directive, when present, is always at ordinal 0.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    turns: Vec<Turn>,
}

impl Session {
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            turns: Vec::new(),
        }
    }

    pub fn with_system_prompt(id: SessionId, system_prompt: impl Into<String>) -> Self {
        let mut session = Self::new(id);
        session.turns.push(Turn {
            role: Role::System,
            content: system_prompt.into(),
            ordinal: 0,
        });
        session
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// The system directive, if the session was seeded with one
    pub fn system_prompt(&self) -> Option<&str> {
        self.turns
            .first()
            .filter(|t| t.is_system())
            .map(|t| t.content.as_str())
    }

    /// Turns after the system directive
    pub fn history(&self) -> &[Turn] {
        match self.turns.first() {
            Some(t) if t.is_system() => &self.turns[1..],
            _ => &self.turns,
        }
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn count_role(&self, role: Role) -> usize {
        self.turns.iter().filter(|t| t.role == role).count()
    }

    pub fn add_user_turn(&mut self, content: impl Into<String>) -> &Turn {
        self.push_turn(Role::User, content.into())
    }

    pub fn add_assistant_turn(&mut self, content: impl Into<String>) -> &Turn {
        self.push_turn(Role::Assistant, content.into())
    }

    /// Append a turn with an explicit role.
    ///
    /// System turns are only accepted through [`Session::with_system_prompt`].
    pub fn append(&mut self, role: Role, content: impl Into<String>) -> Result<&Turn, DomainError> {
        if role == Role::System {
            return Err(DomainError::SystemTurnAppend("system"));
        }
        Ok(self.push_turn(role, content.into()))
    }

    /// Drop every turn at or after `len`, never touching the system directive.
    ///
    /// Used to undo an exchange whose reply was never committed.
    pub fn truncate(&mut self, len: usize) {
        let floor = usize::from(self.system_prompt().is_some());
        self.turns.truncate(len.max(floor));
    }

    fn push_turn(&mut self, role: Role, content: String) -> &Turn {
        let ordinal = self.turns.len();
        self.turns.push(Turn {
            role,
            content,
            ordinal,
        });
        &self.turns[ordinal]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sid(s: &str) -> SessionId {
        SessionId::new(s).unwrap()
    }

    #[test]
    fn test_system_prompt_is_first() {
        let mut session = Session::with_system_prompt(sid("user_1"), "You are calm.");
        session.add_user_turn("hi");
        session.add_assistant_turn("hello");

        assert_eq!(session.system_prompt(), Some("You are calm."));
        assert_eq!(session.turns()[0].role, Role::System);
        assert_eq!(session.turns()[0].ordinal, 0);
        assert_eq!(session.history().len(), 2);
    }

    #[test]
    fn test_ordinals_follow_insertion_order() {
        let mut session = Session::new(sid("s"));
        session.add_user_turn("a");
        session.add_assistant_turn("b");
        session.add_user_turn("c");

        let ordinals: Vec<_> = session.turns().iter().map(|t| t.ordinal).collect();
        assert_eq!(ordinals, vec![0, 1, 2]);
        assert_eq!(session.system_prompt(), None);
        assert_eq!(session.history().len(), 3);
    }

    #[test]
    fn test_append_rejects_system_role() {
        let mut session = Session::new(sid("s"));
        assert!(session.append(Role::System, "sneaky").is_err());
        assert!(session.append(Role::User, "fine").is_ok());
        assert_eq!(session.len(), 1);
    }

    #[test]
    fn test_truncate_keeps_system_directive() {
        let mut session = Session::with_system_prompt(sid("s"), "sys");
        session.add_user_turn("q");
        session.truncate(0);
        assert_eq!(session.len(), 1);
        assert_eq!(session.system_prompt(), Some("sys"));
    }

    #[test]
    fn test_truncate_rolls_back_pending_user_turn() {
        let mut session = Session::new(sid("s"));
        session.add_user_turn("q1");
        session.add_assistant_turn("a1");
        let before = session.len();
        session.add_user_turn("q2");
        session.truncate(before);
        assert_eq!(session.len(), 2);
        assert_eq!(session.last().unwrap().content, "a1");
    }

    #[test]
    fn test_count_role() {
        let mut session = Session::with_system_prompt(sid("s"), "sys");
        session.add_user_turn("q1");
        session.add_assistant_turn("a1");
        session.add_user_turn("q2");
        assert_eq!(session.count_role(Role::User), 2);
        assert_eq!(session.count_role(Role::Assistant), 1);
        assert_eq!(session.count_role(Role::System), 1);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }
}
