//! Inbound webhook payloads, as teloxide types.

use leave_models::ChatIdentity;
pub use teloxide::types::{Message, Update, UpdateKind, User};

/// The new message carried by `update`, if that is what it carries.
///
/// Edits, callback queries and updates teloxide could not decode yield `None`.
pub fn incoming_message(update: &Update) -> Option<&Message> {
    match &update.kind {
        UpdateKind::Message(message) => Some(message),
        _ => None,
    }
}

/// The message text, if it has any non-blank content.
pub fn message_text(message: &Message) -> Option<&str> {
    message.text().map(str::trim).filter(|t| !t.is_empty())
}

/// The pipeline's view of a message sender.
pub fn chat_identity(user: &User) -> ChatIdentity {
    ChatIdentity {
        id: user.id.0 as i64,
        username: user.username.clone(),
        first_name: Some(user.first_name.clone()).filter(|n| !n.is_empty()),
        last_name: user.last_name.clone(),
    }
}
