//! Wire format of a review sent to the REST API.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::review::command::ReviewCommand;

/// Body of `POST /avis`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPayload {
    pub course_id: String,
    pub difficulty: u8,
    pub workload: u8,
    pub comment: String,
    /// Discord display name of the submitter.
    pub author: String,
    /// Submission time, epoch milliseconds.
    pub timestamp: i64,
}

impl ReviewPayload {
    pub fn new(command: &ReviewCommand, author: &str, timestamp: i64) -> Self {
        Self {
            course_id: command.course_code.clone(),
            difficulty: command.difficulty,
            workload: command.workload,
            comment: command.comment.clone(),
            author: author.to_string(),
            timestamp,
        }
    }

    /// Build a payload stamped with the current time.
    pub fn now(command: &ReviewCommand, author: &str) -> Self {
        Self::new(command, author, Utc::now().timestamp_millis())
    }
}
