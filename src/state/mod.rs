// State management module
// Handles the session store and UI state

pub mod app_state;
pub mod session_store;

pub use app_state::AppState;
