//! Main Telegram bot implementation.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use riukinho_core::{source, BotConfig, Responder, WebhookConfig};
use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use teloxide::types::Me;
use teloxide::update_listeners::webhooks;
use tracing::{error, info, warn};

use crate::error::{BotError, Result};
use crate::handlers::{handle_command, handle_unknown, is_own_command, Command};

/// Health check route served next to the webhook.
pub const HEALTH_PATH: &str = "/healthz";

/// The Telegram bot answering order lookups.
pub struct RiukinhoBot {
    /// The teloxide bot instance.
    bot: Bot,
    /// Shared lookup entry point.
    responder: Arc<Responder>,
}

impl RiukinhoBot {
    /// Create a bot from configuration. Requires a bot token.
    pub fn new(config: &BotConfig) -> Result<Self> {
        let token = config.token()?;
        let responder = Responder::new(source::from_config(config), config.columns.clone());

        Ok(Self {
            bot: Bot::new(token),
            responder: Arc::new(responder),
        })
    }

    /// Get the bot's username.
    pub async fn get_me(&self) -> Result<String> {
        let me = self
            .bot
            .get_me()
            .await
            .map_err(|e| BotError::BotStartFailed(e.to_string()))?;
        Ok(me.username().to_string())
    }

    /// Start the bot in long-polling mode.
    pub async fn start_polling(&self) -> Result<()> {
        info!(table = %self.responder.source_description(), "Starting bot in polling mode...");

        Dispatcher::builder(self.bot.clone(), build_handler(Arc::clone(&self.responder)))
            .default_handler(|upd| async move {
                warn!("Unhandled update: {:?}", upd.kind);
            })
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        Ok(())
    }

    /// Start the bot behind a webhook served on `0.0.0.0:{port}`.
    ///
    /// Registers the webhook URL with Telegram and serves it with axum,
    /// alongside a [`HEALTH_PATH`] route.
    pub async fn start_webhook(&self, webhook: &WebhookConfig) -> Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], webhook.port));
        info!(
            port = webhook.port,
            table = %self.responder.source_description(),
            "Starting bot in webhook mode..."
        );

        let options = webhooks::Options::new(addr, webhook.url.clone());
        let (listener, stop_flag, router) = webhooks::axum_to_router(self.bot.clone(), options)
            .await
            .map_err(|e| BotError::WebhookFailed(e.to_string()))?;
        info!("Webhook registered");

        let app = router.route(HEALTH_PATH, get(|| async { "OK" }));
        let tcp = tokio::net::TcpListener::bind(addr).await?;
        tokio::spawn(async move {
            if let Err(e) = axum::serve(tcp, app).with_graceful_shutdown(stop_flag).await {
                error!(error = %e, "Webhook server failed");
            }
        });

        Dispatcher::builder(self.bot.clone(), build_handler(Arc::clone(&self.responder)))
            .default_handler(|upd| async move {
                warn!("Unhandled update: {:?}", upd.kind);
            })
            .enable_ctrlc_handler()
            .build()
            .dispatch_with_listener(
                listener,
                LoggingErrorHandler::with_custom_text("Error from the webhook listener"),
            )
            .await;

        Ok(())
    }
}

/// Update handler tree shared by both transports.
fn build_handler(responder: Arc<Responder>) -> UpdateHandler<teloxide::RequestError> {
    dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(move |bot: Bot, msg: Message, cmd: Command| {
                    let responder = Arc::clone(&responder);
                    info!(chat_id = %msg.chat.id, "Command matched: {:?}", cmd);
                    async move { handle_command(bot, msg, cmd, responder).await }
                }),
        )
        .branch(
            Update::filter_message()
                .filter(|msg: Message, me: Me| {
                    // Didn't parse as a known command
                    msg.text()
                        .map(|t| is_own_command(t, me.username()))
                        .unwrap_or(false)
                })
                .endpoint(|bot: Bot, msg: Message| async move { handle_unknown(bot, msg).await }),
        )
}
