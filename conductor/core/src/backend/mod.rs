//! Chat Backend Integration
//!
//! Abstracted access to the conversational backend through a common trait.
//!
//! # Available Backends
//!
//! - **HTTP**: JSON POST to a single chat endpoint (default)
//!
//! # Usage
//!
//! ```ignore
//! use pastel_conductor::backend::{ChatBackend, ChatRequest, HttpBackend};
//!
//! let backend = HttpBackend::new("http://localhost:8000/chat")?;
//! let reply = backend.send(&ChatRequest::new("Hello!", history)).await?;
//! ```

mod http;
mod traits;

pub use http::{HttpBackend, DEFAULT_ENDPOINT};
pub use traits::{BackendError, ChatBackend, ChatReply, ChatRequest};
