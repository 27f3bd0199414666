//! Discord message event handling.
//!
//! [`ReviewHandler::decide`] and [`ReviewHandler::process`] hold the whole
//! per-message flow and know nothing about serenity; the [`EventHandler`]
//! impl only translates a serenity [`Message`] into a [`RawMessage`] and
//! applies the resulting [`Response`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serenity::async_trait;
use serenity::model::channel::{Message, ReactionType};
use serenity::model::gateway::Ready;
use serenity::model::Timestamp;
use serenity::prelude::*;
use tracing::{debug, error, info, warn};

use crate::common::error::{DiscordError, DiscordResult};
use crate::config::Config;
use crate::review::reply::{outcome_reply, FORMAT_ERROR_TEXT, HELP_TEXT};
use crate::review::{CommandParser, ParsedLine, Reaction, ReviewApi, ReviewCommand, ReviewPayload};

/// A chat message as the review flow sees it.
#[derive(Debug, Clone)]
pub struct RawMessage {
    pub text: String,
    pub author_display_name: String,
    pub channel_name: String,
    pub received_at: DateTime<Utc>,
}

/// What to do with a message, before any network call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Wrong channel or not a command: no reaction, no reply.
    Ignore,
    /// Answer in the channel without contacting the API.
    Reply(String),
    /// Submit the review, then answer with the outcome.
    Forward {
        command: ReviewCommand,
        author: String,
    },
}

/// What to send back to Discord for one message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    pub reaction: Option<Reaction>,
    pub reply: Option<String>,
}

/// Handles `!avis` messages for one bot.
pub struct ReviewHandler {
    config: Arc<Config>,
    parser: CommandParser,
    api: Arc<dyn ReviewApi>,
}

impl ReviewHandler {
    pub fn new(config: Arc<Config>, parser: CommandParser, api: Arc<dyn ReviewApi>) -> Self {
        Self {
            config,
            parser,
            api,
        }
    }

    /// Decide how to handle a message. Pure: no I/O.
    pub fn decide(&self, message: &RawMessage) -> Decision {
        if !self.config.accepts_channel(&message.channel_name) {
            return Decision::Ignore;
        }

        match self.parser.parse(&message.text) {
            ParsedLine::Help => Decision::Reply(HELP_TEXT.to_string()),
            ParsedLine::Malformed => Decision::Reply(FORMAT_ERROR_TEXT.to_string()),
            ParsedLine::NotACommand => Decision::Ignore,
            ParsedLine::Review(command) => Decision::Forward {
                command,
                author: message.author_display_name.clone(),
            },
        }
    }

    /// Run the whole flow for one message. Never fails: every problem
    /// ends up as a reaction and a reply.
    pub async fn process(&self, message: &RawMessage) -> Response {
        match self.decide(message) {
            Decision::Ignore => Response::default(),
            Decision::Reply(text) => Response {
                reaction: None,
                reply: Some(text),
            },
            Decision::Forward { command, author } => {
                info!(
                    "New review from {} at {}: course {}, difficulty {}/5, workload {}/5, comment: {}",
                    author,
                    message.received_at.format("%H:%M:%S"),
                    command.course_code,
                    command.difficulty,
                    command.workload,
                    if command.comment.is_empty() { "(none)" } else { command.comment.as_str() }
                );

                let payload = ReviewPayload::now(&command, &author);
                let outcome = self.api.submit(&payload).await;
                let (reaction, reply) = outcome_reply(&command, &outcome);

                Response {
                    reaction: Some(reaction),
                    reply: Some(reply),
                }
            }
        }
    }
}

#[async_trait]
impl EventHandler for ReviewHandler {
    async fn message(&self, ctx: Context, msg: Message) {
        // Ignore our own messages
        if msg.author.id == ctx.cache.current_user().id {
            return;
        }

        // Ignore bots
        if msg.author.bot {
            return;
        }

        let raw = RawMessage {
            text: msg.content.clone(),
            author_display_name: display_name(&msg),
            channel_name: channel_name(&ctx, &msg).await,
            received_at: received_at(&msg.timestamp),
        };

        let response = self.process(&raw).await;
        if response == Response::default() {
            debug!("Ignoring message in #{} from {}", raw.channel_name, raw.author_display_name);
            return;
        }

        let sink = MessageSink { ctx: &ctx, msg: &msg };
        for e in deliver(&sink, response).await {
            error!("Failed to answer {} in #{}: {}", raw.author_display_name, raw.channel_name, e);
        }
    }

    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("{}", "=".repeat(50));
        info!("Discord bot connected as {}", ready.user.name);
        info!("API base URL: {}", self.config.api.base_url);
        match self.config.channel_filter() {
            Some(channel) => info!("Allowed channel: #{}", channel),
            None => info!("Allowed channel: all channels"),
        }
        info!("{}", "=".repeat(50));
        info!("Review format: !avis IFT2255 4 3 optional comment (difficulty 1-5, workload 1-5)");
        info!("Waiting for messages...");
    }
}

/// Server nickname, then global display name, then username.
fn display_name(msg: &Message) -> String {
    msg.member
        .as_ref()
        .and_then(|m| m.nick.clone())
        .unwrap_or_else(|| msg.author.display_name().to_string())
}

/// Name of the channel a message was posted in, empty for DMs or on lookup failure.
async fn channel_name(ctx: &Context, msg: &Message) -> String {
    match msg.channel(ctx).await {
        Ok(channel) => channel.guild().map(|c| c.name).unwrap_or_default(),
        Err(e) => {
            warn!("Could not resolve channel {}: {}", msg.channel_id, e);
            String::new()
        }
    }
}

/// Where a [`Response`] ends up.
#[async_trait]
pub trait ResponseSink: Send + Sync {
    async fn react(&self, reaction: Reaction) -> DiscordResult<()>;
    async fn say(&self, text: String) -> DiscordResult<()>;
}

/// The channel and message a Discord event came from.
struct MessageSink<'a> {
    ctx: &'a Context,
    msg: &'a Message,
}

#[async_trait]
impl ResponseSink for MessageSink<'_> {
    async fn react(&self, reaction: Reaction) -> DiscordResult<()> {
        self.msg
            .react(&self.ctx.http, ReactionType::Unicode(reaction.emoji().to_string()))
            .await
            .map(|_| ())
            .map_err(DiscordError::ReactFailed)
    }

    async fn say(&self, text: String) -> DiscordResult<()> {
        self.msg
            .channel_id
            .say(&self.ctx.http, text)
            .await
            .map(|_| ())
            .map_err(DiscordError::SendFailed)
    }
}

/// React first, then reply, like the user would read them. A failed
/// reaction does not stop the reply.
pub async fn deliver(sink: &dyn ResponseSink, response: Response) -> Vec<DiscordError> {
    let mut errors = Vec::new();

    if let Some(reaction) = response.reaction {
        if let Err(e) = sink.react(reaction).await {
            errors.push(e);
        }
    }

    if let Some(reply) = response.reply {
        if let Err(e) = sink.say(reply).await {
            errors.push(e);
        }
    }

    errors
}

/// When Discord received the message, falling back to now.
fn received_at(timestamp: &Timestamp) -> DateTime<Utc> {
    DateTime::from_timestamp(timestamp.unix_timestamp(), 0).unwrap_or_else(Utc::now)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::review::forwarder::testing::{closed_port, serve_once};
    use crate::review::forwarder::ForwardOutcome;
    use crate::review::HttpReviewApi;

    /// Records submissions and answers with a scripted outcome.
    struct FakeApi {
        outcome: ForwardOutcome,
        calls: Mutex<Vec<ReviewPayload>>,
    }

    impl FakeApi {
        fn new(outcome: ForwardOutcome) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<ReviewPayload> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ReviewApi for FakeApi {
        async fn submit(&self, payload: &ReviewPayload) -> ForwardOutcome {
            self.calls.lock().unwrap().push(payload.clone());
            self.outcome.clone()
        }
    }

    /// Records what would have been sent, optionally refusing reactions.
    #[derive(Default)]
    struct FakeSink {
        refuse_reactions: bool,
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ResponseSink for FakeSink {
        async fn react(&self, reaction: Reaction) -> DiscordResult<()> {
            if self.refuse_reactions {
                return Err(DiscordError::ReactFailed(serenity::Error::Other("Missing Permissions")));
            }
            self.sent.lock().unwrap().push(reaction.emoji().to_string());
            Ok(())
        }

        async fn say(&self, text: String) -> DiscordResult<()> {
            self.sent.lock().unwrap().push(text);
            Ok(())
        }
    }

    fn handler_with(config: Config, api: Arc<dyn ReviewApi>) -> ReviewHandler {
        ReviewHandler::new(Arc::new(config), CommandParser::new().unwrap(), api)
    }

    fn message(text: &str, channel: &str) -> RawMessage {
        RawMessage {
            text: text.to_string(),
            author_display_name: "alice".to_string(),
            channel_name: channel.to_string(),
            received_at: Utc::now(),
        }
    }

    #[test]
    fn test_decide_review() {
        let handler = handler_with(Config::default(), FakeApi::new(ForwardOutcome::Success(201)));

        let decision = handler.decide(&message("!avis ift2255 4 3  Bon cours ", "avis-cours"));
        assert_eq!(
            decision,
            Decision::Forward {
                command: ReviewCommand {
                    course_code: "IFT2255".to_string(),
                    difficulty: 4,
                    workload: 3,
                    comment: "Bon cours".to_string(),
                },
                author: "alice".to_string(),
            }
        );
    }

    #[test]
    fn test_decide_help_and_malformed() {
        let handler = handler_with(Config::default(), FakeApi::new(ForwardOutcome::Success(201)));

        assert_eq!(
            handler.decide(&message("!avis help", "avis-cours")),
            Decision::Reply(HELP_TEXT.to_string())
        );
        assert_eq!(
            handler.decide(&message("!avis IFT2255 9 9", "avis-cours")),
            Decision::Reply(FORMAT_ERROR_TEXT.to_string())
        );
        assert_eq!(handler.decide(&message("salut", "avis-cours")), Decision::Ignore);
    }

    #[test]
    fn test_success_flow() {
        let api = FakeApi::new(ForwardOutcome::Success(201));
        let handler = handler_with(Config::default(), api.clone());

        let response = tokio_test::block_on(handler.process(&message("!avis IFT2255 4 3 Bon cours", "avis-cours")));
        assert_eq!(response.reaction, Some(Reaction::Success));
        let reply = response.reply.unwrap();
        assert!(reply.contains("IFT2255"));
        assert!(reply.contains("⭐⭐⭐⭐"));
        assert!(!reply.contains("⭐⭐⭐⭐⭐"));
        assert!(reply.contains("📚📚📚"));
        assert!(!reply.contains("📚📚📚📚"));

        let calls = api.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].course_id, "IFT2255");
        assert_eq!(calls[0].author, "alice");
        assert_eq!(calls[0].comment, "Bon cours");
    }

    #[test]
    fn test_malformed_makes_no_call() {
        let api = FakeApi::new(ForwardOutcome::Success(201));
        let handler = handler_with(Config::default(), api.clone());

        let response = tokio_test::block_on(handler.process(&message("!avis xx99", "avis-cours")));
        assert_eq!(response.reaction, None);
        assert_eq!(response.reply.as_deref(), Some(FORMAT_ERROR_TEXT));
        assert!(api.calls().is_empty());
    }

    #[test]
    fn test_other_channel_ignored() {
        let api = FakeApi::new(ForwardOutcome::Success(201));
        let handler = handler_with(Config::default(), api.clone());

        let response = tokio_test::block_on(handler.process(&message("!avis IFT2255 4 3", "general")));
        assert_eq!(response, Response::default());
        assert!(api.calls().is_empty());

        let response = tokio_test::block_on(handler.process(&message("!avis-help", "general")));
        assert_eq!(response, Response::default());
    }

    #[test]
    fn test_empty_channel_setting_accepts_everywhere() {
        let mut config = Config::default();
        config.discord.allowed_channel = String::new();
        let api = FakeApi::new(ForwardOutcome::Success(200));
        let handler = handler_with(config, api.clone());

        let response = tokio_test::block_on(handler.process(&message("!avis IFT1015 2 2", "general")));
        assert_eq!(response.reaction, Some(Reaction::Success));
        assert_eq!(api.calls().len(), 1);
    }

    #[test]
    fn test_api_error_flow() {
        let api = FakeApi::new(ForwardOutcome::ApiError {
            status: 400,
            detail: "Avis invalide".to_string(),
        });
        let handler = handler_with(Config::default(), api);

        let response = tokio_test::block_on(handler.process(&message("!avis IFT2255 4 3", "avis-cours")));
        assert_eq!(response.reaction, Some(Reaction::ApiError));
        assert_eq!(response.reply.as_deref(), Some("❌ Erreur API (400): Avis invalide"));
    }

    #[test]
    fn test_each_submission_is_sent() {
        let api = FakeApi::new(ForwardOutcome::Success(201));
        let handler = handler_with(Config::default(), api.clone());
        let msg = message("!avis IFT2255 4 3", "avis-cours");

        tokio_test::block_on(handler.process(&msg));
        tokio_test::block_on(handler.process(&msg));
        assert_eq!(api.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_end_to_end_created() {
        let (base_url, server) = serve_once("201 Created", "{}").await;
        let api = HttpReviewApi::new(&base_url, Duration::from_secs(5)).unwrap();
        let handler = handler_with(Config::default(), Arc::new(api));

        let response = handler.process(&message("!avis IFT2255 4 3 Bon cours", "avis-cours")).await;
        assert_eq!(response.reaction, Some(Reaction::Success));
        let reply = response.reply.unwrap();
        assert!(reply.contains("IFT2255"));
        assert_eq!(reply.matches('⭐').count(), 4);
        assert_eq!(reply.matches('📚').count(), 3);

        let request = server.await.unwrap();
        let sent: serde_json::Value = serde_json::from_str(&request.body).unwrap();
        assert_eq!(sent["courseId"], "IFT2255");
        assert_eq!(sent["difficulty"], 4);
        assert_eq!(sent["workload"], 3);
        assert_eq!(sent["comment"], "Bon cours");
        assert_eq!(sent["author"], "alice");
    }

    #[tokio::test]
    async fn test_end_to_end_unreachable_api() {
        let base_url = closed_port().await;
        let api = HttpReviewApi::new(&base_url, Duration::from_secs(5)).unwrap();
        let handler = handler_with(Config::default(), Arc::new(api));

        let response = handler.process(&message("!avis IFT1015 2 2", "avis-cours")).await;
        assert_eq!(response.reaction, Some(Reaction::Warning));
        assert!(response.reply.unwrap().contains("Impossible de joindre l'API"));
    }

    #[test]
    fn test_deliver_reacts_then_replies() {
        let sink = FakeSink::default();
        let response = Response {
            reaction: Some(Reaction::Timeout),
            reply: Some("trop lent".to_string()),
        };

        let errors = tokio_test::block_on(deliver(&sink, response));
        assert!(errors.is_empty());
        assert_eq!(*sink.sent.lock().unwrap(), vec!["⏱️".to_string(), "trop lent".to_string()]);
    }

    #[test]
    fn test_refused_reaction_still_replies() {
        let sink = FakeSink {
            refuse_reactions: true,
            ..Default::default()
        };
        let response = Response {
            reaction: Some(Reaction::Success),
            reply: Some("✅ **Avis enregistré!**".to_string()),
        };

        let errors = tokio_test::block_on(deliver(&sink, response));
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], DiscordError::ReactFailed(_)));
        assert_eq!(*sink.sent.lock().unwrap(), vec!["✅ **Avis enregistré!**".to_string()]);
    }

    #[test]
    fn test_received_at_uses_message_timestamp() {
        let timestamp = Timestamp::from_unix_timestamp(1_700_000_000).unwrap();
        let at = received_at(&timestamp);
        assert_eq!(at.timestamp(), 1_700_000_000);
        assert_eq!(at.format("%H:%M:%S").to_string(), "22:13:20");
    }
}
