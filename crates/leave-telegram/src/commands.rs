//! Slash commands understood by the bot.

use teloxide::utils::command::BotCommands;

/// Bot commands that can be invoked with /.
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Start the bot and see how to link your account")]
    Start,

    #[command(description = "Show help message")]
    Help,

    #[command(description = "Link this chat to your account: /connect <email>")]
    Connect(String),
}

/// Recognizes a command in `text`.
///
/// Returns `None` for ordinary text and for unknown commands, which the
/// dispatcher hands to the intent parser. Command names are matched
/// case-insensitively; `/cmd@bot` forms are accepted only for `bot_username`.
pub fn parse_command(text: &str, bot_username: Option<&str>) -> Option<Command> {
    if !text.starts_with('/') {
        return None;
    }
    let text = lowercase_command_name(text);
    match Command::parse(&text, bot_username.unwrap_or_default()) {
        Ok(command) => Some(command),
        // A bare "/connect" still gets the prompt for an email.
        Err(_) if text.split_whitespace().next() == Some("/connect") => {
            Some(Command::Connect(String::new()))
        }
        Err(_) => None,
    }
}

/// Lowercases the `/name` part of the first word, leaving `@bot` and arguments alone.
fn lowercase_command_name(text: &str) -> String {
    let name_end = text
        .find(|c: char| c == '@' || c.is_whitespace())
        .unwrap_or(text.len());
    let (name, rest) = text.split_at(name_end);
    format!("{}{}", name.to_lowercase(), rest)
}

/// The command list shown by `/help`.
pub fn command_list() -> String {
    Command::descriptions().to_string()
}
