// Application state management
// Contains the session store and UI state

use crate::state::session_store::{SessionId, SessionStore};

/// Viewports narrower than this collapse the sidebar after navigation
pub const NARROW_VIEWPORT_WIDTH: f32 = 768.0;

/// Main application state
/// Owns the chat sessions and UI preferences
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// All chat sessions and the active one
    pub sessions: SessionStore,
    /// UI state preferences
    pub ui_state: UiState,
}

/// UI-specific state
#[derive(Debug, Clone)]
pub struct UiState {
    /// Whether the sidebar is visible
    pub sidebar_visible: bool,
    /// Whether the About window is open
    pub about_open: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            sidebar_visible: true,
            about_open: false,
        }
    }
}

impl AppState {
    /// Create a new application state with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new chat and make it active
    pub fn new_chat(&mut self, viewport_width: f32) -> SessionId {
        let id = self.sessions.create_session();
        self.collapse_sidebar_if_narrow(viewport_width);
        id
    }

    /// Switch to another chat
    /// Returns false for unknown IDs
    pub fn select_session(&mut self, id: &str, viewport_width: f32) -> bool {
        let selected = self.sessions.select_session(id);
        if selected {
            self.collapse_sidebar_if_narrow(viewport_width);
        }
        selected
    }

    /// Delete a chat
    pub fn delete_session(&mut self, id: &str) -> bool {
        self.sessions.delete_session(id)
    }

    fn collapse_sidebar_if_narrow(&mut self, viewport_width: f32) {
        if viewport_width < NARROW_VIEWPORT_WIDTH {
            self.ui_state.sidebar_visible = false;
        }
    }
}
