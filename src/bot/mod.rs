//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules:
//! - `message_handler`: Handles incoming text, photo, and document messages
//! - `ui_builder`: Creates reply keyboards and formats messages
//! - `dialogue_manager`: Renders and sends the coach's replies

pub mod dialogue_manager;
pub mod message_handler;
pub mod ui_builder;

// Re-export main handler function for use in main.rs
pub use message_handler::{message_handler, SharedCoach};

// Re-export utility functions that might be used elsewhere
pub use dialogue_manager::{render_outgoing, send_outgoing};
pub use ui_builder::{format_meal_summary, format_portion_report};
