// Gemini Chat GUI - Main Entry Point
// Native Rust chat client for the Gemini chat proxy backend

mod chat;
mod config;
mod state;
mod ui;

use chat::{ChatSurface, ChatTransport, HttpTransport};
use config::ClientConfig;
use eframe::egui;
use egui_commonmark::CommonMarkCache;
use state::AppState;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use ui::render_app_layout;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = ClientConfig::from_env();
    info!(backend_url = %config.backend_url, "Starting chat client");

    // Configure window options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Gemini Chat")
            .with_inner_size([1000.0, 700.0])
            .with_min_inner_size([400.0, 400.0]),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Gemini Chat",
        options,
        Box::new(move |cc| {
            let ctx = cc.egui_ctx.clone();
            let app: Box<dyn eframe::App> =
                match HttpTransport::new(&config, move || ctx.request_repaint()) {
                    Ok(transport) => Box::new(ChatApp::new(Box::new(transport))),
                    Err(e) => {
                        error!(error = %e, "Failed to create HTTP client");
                        Box::new(StartupError(e.to_string()))
                    }
                };
            app
        }),
    )
}

/// Main application struct
/// Owns the session store, the active chat surface and the transport
struct ChatApp {
    /// Sessions and UI preferences
    state: AppState,
    /// Chat surface for the active session; rebuilt when the active session changes
    surface: ChatSurface,
    transport: Box<dyn ChatTransport>,
    /// Parsed markdown and code block state shared by all bubbles
    markdown: CommonMarkCache,
}

impl ChatApp {
    fn new(transport: Box<dyn ChatTransport>) -> Self {
        let state = AppState::new();
        let surface = ChatSurface::new(state.sessions.active_session());
        Self {
            state,
            surface,
            transport,
            markdown: CommonMarkCache::default(),
        }
    }

    /// Write the surface's messages back and follow active session changes
    fn sync(&mut self) {
        self.state
            .sessions
            .sync_messages(self.surface.session_id(), self.surface.messages());

        if self.surface.session_id() != self.state.sessions.active_id() {
            // Leaving a session drops its in-flight request
            self.surface = ChatSurface::new(self.state.sessions.active_session());
        }
    }
}

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.surface.poll();
        self.sync();

        // Render the main application layout
        render_app_layout(
            ctx,
            &mut self.state,
            &mut self.surface,
            self.transport.as_ref(),
            &mut self.markdown,
        );

        self.sync();
    }
}

/// Shown instead of the chat when the client cannot start
struct StartupError(String);

impl eframe::App for StartupError {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Unable to start");
            ui.label(&self.0);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat::{ChatMessage, StreamEvent, StreamHandle};
    use std::cell::RefCell;
    use std::sync::mpsc::Sender;

    #[derive(Default)]
    struct QueuedTransport {
        producers: RefCell<Vec<Sender<StreamEvent>>>,
    }

    impl ChatTransport for QueuedTransport {
        fn send(&self, _messages: Vec<ChatMessage>) -> StreamHandle {
            let (tx, _cancel, handle) = StreamHandle::channel();
            self.producers.borrow_mut().push(tx);
            handle
        }
    }

    #[test]
    fn test_app_creation() {
        let app = ChatApp::new(Box::<QueuedTransport>::default());
        assert_eq!(app.state.sessions.len(), 1);
        assert_eq!(app.surface.session_id(), app.state.sessions.active_id());
    }

    #[test]
    fn test_sync_titles_and_stores_messages() {
        let mut app = ChatApp::new(Box::<QueuedTransport>::default());
        app.surface.input = "Hello there".to_string();
        app.surface.submit(app.transport.as_ref());
        app.sync();

        let active = app.state.sessions.active_session();
        assert_eq!(active.title, "Hello there");
        assert_eq!(active.messages.len(), 1);
    }

    #[test]
    fn test_switching_sessions_rebuilds_surface() {
        let mut app = ChatApp::new(Box::<QueuedTransport>::default());
        let first = app.state.sessions.active_id().to_string();
        app.surface.input = "first chat".to_string();
        app.surface.submit(app.transport.as_ref());
        app.sync();

        let second = app.state.new_chat(1024.0);
        app.sync();
        assert_eq!(app.surface.session_id(), second);
        assert!(app.surface.messages().is_empty());
        assert!(!app.surface.is_busy());

        app.state.select_session(&first, 1024.0);
        app.sync();
        assert_eq!(app.surface.session_id(), first);
        assert_eq!(app.surface.messages()[0].text(), "first chat");
    }

    #[test]
    fn test_deleting_active_session_moves_surface() {
        let mut app = ChatApp::new(Box::<QueuedTransport>::default());
        let only = app.state.sessions.active_id().to_string();
        app.state.delete_session(&only);
        app.sync();

        assert_eq!(app.state.sessions.len(), 1);
        assert_eq!(app.surface.session_id(), app.state.sessions.active_id());
        assert_ne!(app.surface.session_id(), only);
    }
}
