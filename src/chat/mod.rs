// Chat module
// Message model, stream protocol, backend transport and the per-session chat surface

pub mod message;
pub mod protocol;
pub mod surface;
pub mod transport;

pub use message::ChatMessage;
pub use surface::ChatSurface;
pub use transport::{ChatTransport, HttpTransport, StreamEvent, StreamHandle};
