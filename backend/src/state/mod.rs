//! Shared router state
//!
//! Holds only immutable data: every request is handled independently.

use crate::proxy::ChatProxy;
use std::sync::Arc;

/// State handed to every handler
#[derive(Debug, Clone)]
pub struct AppState {
    /// Chat proxy shared by all requests
    pub proxy: Arc<ChatProxy>,
}

impl AppState {
    /// Wrap a proxy for sharing across handlers
    pub fn new(proxy: ChatProxy) -> Self {
        Self {
            proxy: Arc::new(proxy),
        }
    }
}
