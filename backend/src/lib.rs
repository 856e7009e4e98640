//! Chat Proxy Backend Library
//!
//! This library exposes modules for testing and external use.
//! The main binary is in `src/main.rs`.

pub mod api;
pub mod chat;
pub mod config;
pub mod credentials;
pub mod error;
pub mod provider;
pub mod proxy;
/// Shared router state
pub mod state;
