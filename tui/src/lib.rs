//! Pastel Chat TUI - Terminal chat surface
//!
//! A full-screen terminal chat with the persona's face on the left and the
//! conversation on the right.
//!
//! # Architecture
//!
//! - **App**: event loop, key handling, layout
//! - **ConductorClient**: embeds the Conductor and builds its backend/avatar
//! - **DisplayState**: what to draw, derived from `ConductorMessage`s
//! - **Avatar**: expression faces drawn with block characters
//! - **Widgets**: speech bubble and scrollable message list

pub mod app;
pub mod avatar;
pub mod conductor_client;
pub mod display;
pub mod theme;
pub mod widgets;

pub use app::App;
pub use conductor_client::ConductorClient;
