//! Command handlers for the Telegram bot.

use std::sync::Arc;

use riukinho_core::{Request, Responder};
use teloxide::prelude::*;
use teloxide::types::ChatAction;
use teloxide::utils::command::BotCommands;
use tracing::{debug, info, warn};

/// Bot commands that can be invoked with /.
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Start the bot and get help")]
    Start,

    #[command(description = "Show help message")]
    Help,

    #[command(description = "Status of an order: /status <order>")]
    Status(String),

    #[command(description = "Orders registered for a line: /list <line>")]
    List(String),

    #[command(description = "Open (Pendente) order of a line: /pending <line>")]
    Pending(String),
}

impl From<Command> for Request {
    fn from(cmd: Command) -> Self {
        match cmd {
            Command::Start => Request::Start,
            Command::Help => Request::Help,
            Command::Status(arg) => Request::Status(arg),
            Command::List(arg) => Request::List(arg),
            Command::Pending(arg) => Request::Pending(arg),
        }
    }
}

/// Whether `text` is a `/`-command meant for this bot.
///
/// `/cmd@OtherBot` is addressed to another bot in the same group and must be
/// left alone. Mentions compare case-insensitively, like Telegram usernames.
pub fn is_own_command(text: &str, bot_username: &str) -> bool {
    let Some(command) = text.split_whitespace().next() else {
        return false;
    };
    if !command.starts_with('/') {
        return false;
    }
    match command.split_once('@') {
        Some((_, mention)) => mention.eq_ignore_ascii_case(bot_username),
        None => true,
    }
}

/// Reply for a `/`-command the bot does not know.
pub fn unknown_command_reply(text: &str) -> String {
    format!(
        "Unknown command: {}\n\nUse /help to see available commands.",
        text.split_whitespace().next().unwrap_or(text)
    )
}

/// Handle a command through the shared responder and send its reply.
///
/// `/start` and `/help` are answered here too, so every transport shows the
/// same help text.
pub async fn handle_lookup(
    bot: Bot,
    msg: Message,
    request: Request,
    responder: Arc<Responder>,
) -> ResponseResult<()> {
    if request.argument().is_some() {
        // Download and parsing can take a moment
        if let Err(e) = bot.send_chat_action(msg.chat.id, ChatAction::Typing).await {
            debug!(chat_id = %msg.chat.id, error = %e, "Failed to send typing action");
        }
    }

    let reply = responder.respond(&request).await;
    bot.send_message(msg.chat.id, reply).await?;

    info!(
        chat_id = %msg.chat.id,
        user = ?msg.from.as_ref().map(|u| &u.username),
        command = request.name(),
        "Reply sent"
    );
    Ok(())
}

/// Handle an unrecognized /command.
pub async fn handle_unknown(bot: Bot, msg: Message) -> ResponseResult<()> {
    if let Some(text) = msg.text() {
        warn!(chat_id = %msg.chat.id, cmd = %text, "Unrecognized command");
        bot.send_message(msg.chat.id, unknown_command_reply(text)).await?;
    }
    Ok(())
}

/// Dispatch commands to appropriate handlers.
pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    responder: Arc<Responder>,
) -> ResponseResult<()> {
    handle_lookup(bot, msg, cmd.into(), responder).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            Command::parse("/status 0123", "RiukinhoBot").unwrap(),
            Command::Status("0123".into())
        );
        assert_eq!(
            Command::parse("/list@RiukinhoBot 5", "RiukinhoBot").unwrap(),
            Command::List("5".into())
        );
        assert_eq!(Command::parse("/start", "RiukinhoBot").unwrap(), Command::Start);
    }

    #[test]
    fn test_missing_argument_parses_as_empty() {
        let cmd = Command::parse("/pending", "RiukinhoBot").unwrap();
        let request: Request = cmd.into();
        assert_eq!(request, Request::Pending(String::new()));
        assert_eq!(request.argument(), None);
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        assert!(Command::parse("/lista 5", "RiukinhoBot").is_err());
    }

    #[test]
    fn test_unknown_command_reply_names_command() {
        let reply = unknown_command_reply("/lista 5");
        assert!(reply.starts_with("Unknown command: /lista\n"));
    }

    #[test]
    fn test_own_command_detection() {
        assert!(is_own_command("/lista 5", "RiukinhoBot"));
        assert!(is_own_command("/lista@riukinhobot 5", "RiukinhoBot"));
        assert!(!is_own_command("/status@OtherBot 5", "RiukinhoBot"));
        assert!(!is_own_command("hello /status", "RiukinhoBot"));
        assert!(!is_own_command("   ", "RiukinhoBot"));
    }

    #[tokio::test]
    async fn test_help_matches_start_text() {
        use riukinho_core::format::start_message;
        use riukinho_core::{Columns, LiveSource};

        let source = Arc::new(LiveSource::new("/nonexistent/orders.xlsx", "Registros"));
        let responder = Responder::new(source, Columns::default());

        let request: Request = Command::Help.into();
        assert_eq!(request, Request::Help);
        assert_eq!(responder.respond(&request).await, start_message());
        assert_eq!(responder.respond(&Command::Start.into()).await, start_message());
    }
}
