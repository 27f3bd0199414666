//! Discord bot integration.
//!
//! This module connects the review flow to Discord: message events in,
//! reactions and replies out.

pub mod client;
pub mod handler;

// Re-export main types for external use
pub use client::DiscordBotBuilder;
