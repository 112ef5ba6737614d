//! Per-message webhook pipeline.
//!
//! ```text
//! message ─┬─ no sender / no text ──────────────────────────► ignored
//!          ├─ /start, /help ────────────────────────────────► reply
//!          ├─ /connect <email> ─► AccountLinker ────────────► reply
//!          └─ other text ─► IntentParser ─► gate
//!                 incomplete_request ───────────────────────► "need a date"
//!                 not leave_request / low confidence ───────► "didn't understand"
//!                 accepted ─► find link ─┬─ none ───────────► "not linked"
//!                                        └─ LeaveWriter ────► "submitted"
//! ```
//!
//! Every branch replies (fire-and-forget) and returns `Ok`, except a failed
//! leave-request write, which is returned so the transport can answer 500.

use std::sync::Arc;

use leave_core::{IntentParser, PipelineConfig};
use leave_models::{Intent, LeaveRequest, Locale, ParsedIntent};
use tracing::{debug, info, warn};

use crate::client::ReplySender;
use crate::commands::{parse_command, Command};
use crate::error::{Result, TelegramError};
use crate::linker::{AccountLinker, LinkOutcome};
use crate::replies;
use crate::update::{chat_identity, incoming_message, message_text, Update};
use crate::writer::{LeaveWriter, WriteError};

/// Where a parsed intent goes next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    NeedsDate,
    NotUnderstood,
    Accepted,
}

/// Applies the confidence and completeness gate.
///
/// `incomplete_request` always asks for a date, whatever its confidence.
pub fn gate(parsed: &ParsedIntent, config: &PipelineConfig) -> Gate {
    match parsed.intent {
        Intent::IncompleteRequest => Gate::NeedsDate,
        Intent::LeaveRequest if config.accepts(parsed.confidence) => Gate::Accepted,
        _ => Gate::NotUnderstood,
    }
}

/// Terminal state of one message.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    Ignored,
    Welcomed,
    Helped,
    Link(LinkOutcome),
    NeedsDate,
    NotUnderstood,
    NotLinked,
    Submitted(LeaveRequest),
}

/// Sequences parser, linker, writer and replies for each inbound message.
#[derive(Clone)]
pub struct WebhookDispatcher {
    parser: IntentParser,
    linker: AccountLinker,
    writer: LeaveWriter,
    sender: Arc<dyn ReplySender>,
    config: PipelineConfig,
    bot_username: Option<String>,
    locale: Locale,
}

impl WebhookDispatcher {
    pub fn new(
        parser: IntentParser,
        linker: AccountLinker,
        writer: LeaveWriter,
        sender: Arc<dyn ReplySender>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            parser,
            linker,
            writer,
            sender,
            config,
            bot_username: None,
            locale: Locale::default(),
        }
    }

    /// Accept `/command@username` addressing for this bot.
    pub fn with_bot_username(mut self, username: Option<String>) -> Self {
        self.bot_username = username;
        self
    }

    /// Reply language.
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn linker(&self) -> &AccountLinker {
        &self.linker
    }

    /// Handles one webhook delivery.
    ///
    /// # Errors
    /// Returns [`TelegramError::Persistence`] only when an accepted leave
    /// request could not be stored.
    pub async fn dispatch(&self, update: &Update) -> Result<DispatchOutcome> {
        let Some(message) = incoming_message(update) else {
            return Ok(DispatchOutcome::Ignored);
        };
        let chat_id = message.chat.id.0;
        let (Some(sender), Some(text)) = (message.from.as_ref(), message_text(message)) else {
            debug!(chat_id = chat_id, "Ignoring message without sender or text");
            return Ok(DispatchOutcome::Ignored);
        };

        let identity = chat_identity(sender);
        debug!(chat_id = chat_id, telegram_user_id = identity.id, "Received message");

        match parse_command(text, self.bot_username.as_deref()) {
            Some(Command::Start) => {
                self.reply(chat_id, &replies::welcome(self.locale)).await;
                return Ok(DispatchOutcome::Welcomed);
            }
            Some(Command::Help) => {
                self.reply(chat_id, &replies::help(self.locale)).await;
                return Ok(DispatchOutcome::Helped);
            }
            Some(Command::Connect(args)) => {
                let outcome = self.linker.link_by_command(&identity, chat_id, &args).await;
                self.reply(chat_id, &outcome.reply(self.locale)).await;
                return Ok(DispatchOutcome::Link(outcome));
            }
            None => {}
        }

        let parsed = self.parser.parse(text).await;
        info!(
            chat_id = chat_id,
            intent = %parsed.intent,
            confidence = parsed.confidence,
            "Classified message"
        );

        match gate(&parsed, &self.config) {
            Gate::NeedsDate => {
                self.reply(chat_id, &replies::need_specific_date(self.locale)).await;
                return Ok(DispatchOutcome::NeedsDate);
            }
            Gate::NotUnderstood => {
                self.reply(chat_id, &replies::not_understood(self.locale)).await;
                return Ok(DispatchOutcome::NotUnderstood);
            }
            Gate::Accepted => {}
        }

        let Some(linked) = self.linker.find_linked(identity.id).await else {
            self.reply(chat_id, &replies::not_linked(self.locale)).await;
            return Ok(DispatchOutcome::NotLinked);
        };

        match self.writer.create_leave_request(linked.user_id(), &parsed).await {
            Ok(request) => {
                let text = replies::submitted(self.locale, &linked.display_name(), &request);
                self.reply(chat_id, &text).await;
                Ok(DispatchOutcome::Submitted(request))
            }
            Err(WriteError::Persistence(e)) => {
                self.reply(chat_id, &replies::save_failed(self.locale)).await;
                Err(TelegramError::Persistence(e))
            }
            Err(rejected) => {
                warn!(chat_id = chat_id, reason = %rejected, "Leave request rejected");
                self.reply(chat_id, &replies::need_specific_date(self.locale)).await;
                Ok(DispatchOutcome::NeedsDate)
            }
        }
    }

    async fn reply(&self, chat_id: i64, text: &str) {
        self.sender.send_reply(chat_id, text).await;
    }
}
