//! Telegram webhook pipeline for the leave bot.
//!
//! An inbound update flows through [`WebhookDispatcher`]: slash commands
//! are handled directly (`/connect` links the chat to an account), other
//! text is classified by the intent parser, gated on confidence, matched to
//! a linked account and written as a pending leave request. Each outcome is
//! answered with a reply through a [`ReplySender`].
//!
//! # Commands
//!
//! - `/start` - Welcome message
//! - `/help` - Command list and examples
//! - `/connect <email>` - Link this chat to an application account

pub mod client;
pub mod commands;
pub mod dispatcher;
pub mod error;
pub mod linker;
pub mod replies;
pub mod update;
pub mod writer;

pub use client::{ReplySender, TelegramClient};
pub use commands::{parse_command, Command};
pub use dispatcher::{gate, DispatchOutcome, Gate, WebhookDispatcher};
pub use error::{Result, TelegramError};
pub use linker::{extract_email, AccountLinker, LinkError, LinkOutcome, LinkedUser};
pub use update::{chat_identity, incoming_message, message_text, Update};
pub use writer::{LeaveWriter, WriteError, DEFAULT_REASON};
