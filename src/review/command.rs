//! `!avis` command parsing.
//!
//! Classifies a chat line as a help request, a review, a malformed
//! review or something unrelated.

use fancy_regex::Regex;
use tracing::warn;

/// Prefix shared by every review command.
pub const COMMAND_PREFIX: &str = "!avis";

/// Phrases that request the usage text. Matched case-insensitively.
const HELP_PHRASES: [&str; 3] = ["!avis-help", "!avis help", "!help-avis"];

/// `!avis CODE DIFF CHARGE [comment]`
const REVIEW_PATTERN: &str =
    r"(?i)^!avis\s+([A-Za-z]{2,4}\d{4}[A-Za-z]?)\s+([1-5])\s+([1-5])(?:\s+(.*))?$";

/// A validated review command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewCommand {
    /// Upper-cased course code, e.g. `IFT2255`.
    pub course_code: String,
    /// Perceived difficulty, 1 (easy) to 5 (hard).
    pub difficulty: u8,
    /// Workload, 1 (light) to 5 (heavy).
    pub workload: u8,
    /// Trimmed free text, empty if none was given.
    pub comment: String,
}

/// Classification of a chat line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    Help,
    Review(ReviewCommand),
    /// Starts with `!avis` but does not follow the grammar.
    Malformed,
    NotACommand,
}

/// Parser for `!avis` commands.
#[derive(Debug, Clone)]
pub struct CommandParser {
    pattern: Regex,
}

impl CommandParser {
    pub fn new() -> Result<Self, fancy_regex::Error> {
        Ok(Self {
            pattern: Regex::new(REVIEW_PATTERN)?,
        })
    }

    /// Classify a chat line.
    ///
    /// Help phrases are checked before the review grammar, so `!avis help`
    /// is never reported as malformed.
    pub fn parse(&self, line: &str) -> ParsedLine {
        let content = line.trim();
        let lowered = content.to_lowercase();

        if HELP_PHRASES.contains(&lowered.as_str()) {
            return ParsedLine::Help;
        }

        if let Some(command) = self.parse_review(content) {
            return ParsedLine::Review(command);
        }

        if lowered.starts_with(COMMAND_PREFIX) {
            ParsedLine::Malformed
        } else {
            ParsedLine::NotACommand
        }
    }

    fn parse_review(&self, content: &str) -> Option<ReviewCommand> {
        let captures = match self.pattern.captures(content) {
            Ok(captures) => captures?,
            Err(e) => {
                warn!("Review pattern match error: {}", e);
                return None;
            }
        };

        let course_code = captures.get(1)?.as_str().to_uppercase();
        let difficulty = captures.get(2)?.as_str().parse().ok()?;
        let workload = captures.get(3)?.as_str().parse().ok()?;
        let comment = captures
            .get(4)
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default();

        Some(ReviewCommand {
            course_code,
            difficulty,
            workload,
            comment,
        })
    }
}
