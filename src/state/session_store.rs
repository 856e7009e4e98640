// Session store
// Ordered in-memory collection of chat sessions with one active session

use crate::chat::message::{ChatMessage, MessageRole};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Unique identifier for a chat session
pub type SessionId = String;

/// Maximum number of characters kept from the first user message
pub const TITLE_MAX_CHARS: usize = 30;

/// Title shown for sessions that have not been titled yet
pub const UNTITLED: &str = "New Chat";

/// One conversation
#[derive(Debug, Clone)]
pub struct ChatSession {
    /// Unique identifier, generated at creation
    pub id: SessionId,
    /// Empty until the first user message arrives
    pub title: String,
    /// Message list; replaced wholesale when the chat surface reports changes
    pub messages: Arc<Vec<ChatMessage>>,
}

impl ChatSession {
    /// Create an empty, untitled session with a fresh ID
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: String::new(),
            messages: Arc::new(Vec::new()),
        }
    }

    /// Title to show in the sidebar and header
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            UNTITLED
        } else {
            &self.title
        }
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Title for a session whose first user message has this text
/// The text is cut as sent, surrounding whitespace included
pub fn derive_title(text: &str) -> String {
    let mut chars = text.chars();
    let prefix: String = chars.by_ref().take(TITLE_MAX_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", prefix)
    } else {
        prefix
    }
}

/// All sessions, newest first, plus the active session pointer
/// Never empty: removing the last session creates a replacement
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Vec<ChatSession>,
    active_id: SessionId,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Create a store holding a single empty session
    pub fn new() -> Self {
        let session = ChatSession::new();
        Self {
            active_id: session.id.clone(),
            sessions: vec![session],
        }
    }

    /// Sessions in display order
    pub fn sessions(&self) -> &[ChatSession] {
        &self.sessions
    }

    /// Number of sessions
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// ID of the active session
    pub fn active_id(&self) -> &str {
        &self.active_id
    }

    /// The active session
    pub fn active_session(&self) -> &ChatSession {
        // active_id always refers to a stored session
        self.get(&self.active_id).unwrap_or(&self.sessions[0])
    }

    /// Look up a session by ID
    pub fn get(&self, id: &str) -> Option<&ChatSession> {
        self.sessions.iter().find(|s| s.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut ChatSession> {
        self.sessions.iter_mut().find(|s| s.id == id)
    }

    /// Prepend a new empty session and make it active
    /// Returns the new session's ID
    pub fn create_session(&mut self) -> SessionId {
        let session = ChatSession::new();
        let id = session.id.clone();
        debug!(session_id = %id, "Created chat session");
        self.sessions.insert(0, session);
        self.active_id = id.clone();
        id
    }

    /// Make an existing session active
    /// Returns false when no session has this ID
    pub fn select_session(&mut self, id: &str) -> bool {
        if self.get(id).is_some() {
            self.active_id = id.to_string();
            true
        } else {
            false
        }
    }

    /// Remove a session
    /// Deleting the last session replaces it with a fresh active one;
    /// deleting the active session activates the first remaining one
    pub fn delete_session(&mut self, id: &str) -> bool {
        let Some(index) = self.sessions.iter().position(|s| s.id == id) else {
            return false;
        };
        self.sessions.remove(index);
        debug!(session_id = %id, remaining = self.sessions.len(), "Deleted chat session");

        if self.sessions.is_empty() {
            let replacement = ChatSession::new();
            self.active_id = replacement.id.clone();
            self.sessions.push(replacement);
        } else if self.active_id == id {
            self.active_id = self.sessions[0].id.clone();
        }
        true
    }

    /// Set a session's title
    /// Only applies while the stored session has neither messages nor a title
    pub fn set_title(&mut self, id: &str, title: &str) -> bool {
        match self.get_mut(id) {
            Some(session) if session.messages.is_empty() && session.title.is_empty() => {
                session.title = title.to_string();
                true
            }
            _ => false,
        }
    }

    /// Write back a session's message list when it is a different list
    /// Titles the session from the first user message before the first write
    pub fn sync_messages(&mut self, id: &str, messages: &Arc<Vec<ChatMessage>>) -> bool {
        let Some(session) = self.get(id) else {
            return false;
        };
        if Arc::ptr_eq(&session.messages, messages) {
            return false;
        }

        let first_user_text = messages
            .iter()
            .find(|m| m.role == MessageRole::User)
            .map(ChatMessage::text);
        if let Some(text) = first_user_text {
            self.set_title(id, &derive_title(&text));
        }

        match self.get_mut(id) {
            Some(session) => {
                session.messages = Arc::clone(messages);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_user_message(text: &str) -> Arc<Vec<ChatMessage>> {
        Arc::new(vec![ChatMessage::user(text)])
    }

    #[test]
    fn test_store_starts_with_one_active_session() {
        let store = SessionStore::new();
        assert_eq!(store.len(), 1);
        assert_eq!(store.active_id(), store.sessions()[0].id);
        assert_eq!(store.active_session().display_title(), UNTITLED);
    }

    #[test]
    fn test_create_prepends_and_activates() {
        let mut store = SessionStore::new();
        let first = store.active_id().to_string();
        let created = store.create_session();

        assert_eq!(store.len(), 2);
        assert_eq!(store.sessions()[0].id, created);
        assert_eq!(store.sessions()[1].id, first);
        assert_eq!(store.active_id(), created);
        assert!(store.active_session().messages.is_empty());
        assert!(store.active_session().title.is_empty());
    }

    #[test]
    fn test_select_changes_only_the_active_pointer() {
        let mut store = SessionStore::new();
        let first = store.active_id().to_string();
        let messages = with_user_message("hello");
        store.sync_messages(&first, &messages);
        store.create_session();

        assert!(store.select_session(&first));
        assert_eq!(store.active_id(), first);
        assert!(Arc::ptr_eq(&store.active_session().messages, &messages));
        assert!(!store.select_session("missing"));
        assert_eq!(store.active_id(), first);
    }

    #[test]
    fn test_delete_last_session_creates_replacement() {
        let mut store = SessionStore::new();
        let only = store.active_id().to_string();

        assert!(store.delete_session(&only));
        assert_eq!(store.len(), 1);
        assert_ne!(store.active_id(), only);
        assert!(store.active_session().messages.is_empty());
        assert!(store.active_session().title.is_empty());
    }

    #[test]
    fn test_delete_active_activates_first_remaining() {
        let mut store = SessionStore::new();
        let a = store.active_id().to_string();
        let b = store.create_session();
        let c = store.create_session();
        // Order is now [c, b, a]
        store.select_session(&b);

        assert!(store.delete_session(&b));
        assert_eq!(store.active_id(), c);
        assert_eq!(store.len(), 2);
        assert!(store.get(&a).is_some());
    }

    #[test]
    fn test_delete_inactive_keeps_active() {
        let mut store = SessionStore::new();
        let a = store.active_id().to_string();
        let b = store.create_session();

        assert!(store.delete_session(&a));
        assert_eq!(store.active_id(), b);
        assert!(!store.delete_session("missing"));
    }

    #[test]
    fn test_title_is_derived_once_from_first_user_message() {
        let mut store = SessionStore::new();
        let id = store.active_id().to_string();

        let first = with_user_message("What is the capital of France and why?");
        assert!(store.sync_messages(&id, &first));
        assert_eq!(store.active_session().title, "What is the capital of France ...");

        let mut later = (*first).clone();
        later.push(ChatMessage::assistant("Paris."));
        later.push(ChatMessage::user("Something else entirely"));
        assert!(store.sync_messages(&id, &Arc::new(later)));
        assert_eq!(store.active_session().title, "What is the capital of France ...");
    }

    #[test]
    fn test_short_title_has_no_ellipsis() {
        assert_eq!(derive_title("Hi"), "Hi");
        assert_eq!(derive_title(&"x".repeat(30)), "x".repeat(30));
        assert_eq!(derive_title(&"x".repeat(31)), format!("{}...", "x".repeat(30)));
        assert_eq!(derive_title("héllo wörld"), "héllo wörld");
    }

    #[test]
    fn test_title_keeps_surrounding_whitespace() {
        assert_eq!(derive_title("  padded "), "  padded ");

        // Leading spaces count towards the limit
        let text = format!("  {}", "x".repeat(29));
        assert_eq!(derive_title(&text), format!("  {}...", "x".repeat(28)));
    }

    #[test]
    fn test_sync_skips_identical_list() {
        let mut store = SessionStore::new();
        let id = store.active_id().to_string();
        let messages = with_user_message("hi");

        assert!(store.sync_messages(&id, &messages));
        assert!(!store.sync_messages(&id, &messages.clone()));
        assert!(!store.sync_messages("missing", &messages));
    }

    #[test]
    fn test_set_title_is_guarded() {
        let mut store = SessionStore::new();
        let id = store.active_id().to_string();

        assert!(store.set_title(&id, "Manual"));
        assert!(!store.set_title(&id, "Again"));
        assert_eq!(store.active_session().title, "Manual");

        let other = store.create_session();
        store.sync_messages(&other, &Arc::new(vec![ChatMessage::assistant("hello")]));
        assert!(!store.set_title(&other, "Late"));
        assert!(store.get(&other).map(|s| s.title.is_empty()).unwrap_or(false));
    }

    #[test]
    fn test_each_session_keeps_its_own_messages() {
        let mut store = SessionStore::new();
        let a = store.active_id().to_string();
        let b = store.create_session();

        store.sync_messages(&a, &with_user_message("for a"));
        store.sync_messages(&b, &with_user_message("for b"));

        assert_eq!(store.get(&a).unwrap().messages[0].text(), "for a");
        assert_eq!(store.get(&b).unwrap().messages[0].text(), "for b");
        assert_eq!(store.get(&a).unwrap().title, "for a");
    }
}
