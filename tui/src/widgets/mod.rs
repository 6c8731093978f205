//! Widgets for the chat surface

mod bubble;
mod message_list;

pub use bubble::Bubble;
pub use message_list::{MessageList, MessageListState};
