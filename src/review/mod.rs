//! Course review commands: parsing, submission and replies.

pub mod command;
pub mod forwarder;
pub mod payload;
pub mod reply;

pub use command::{CommandParser, ParsedLine, ReviewCommand};
pub use forwarder::{HttpReviewApi, ReviewApi};
pub use payload::ReviewPayload;
pub use reply::Reaction;
