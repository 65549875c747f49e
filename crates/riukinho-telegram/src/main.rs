//! Riukinho Telegram Bot binary.
//!
//! Start the bot with:
//! ```bash
//! TELEGRAM_BOT_TOKEN=xxx RIUKINHO_TABLE_PATH=orders.xlsm cargo run -p riukinho-telegram
//! ```

use clap::{Parser, Subcommand};
use riukinho_core::{config, source, BotConfig, Request, Responder};
use riukinho_telegram::{run_query, RiukinhoBot};
use tracing_subscriber::EnvFilter;

/// Riukinho - logistics bot answering order lookups from a spreadsheet
#[derive(Parser, Debug)]
#[command(name = "riukinho-telegram")]
#[command(about = "Telegram bot answering order and line lookups from a spreadsheet")]
struct Args {
    /// Use webhook mode (default: polling mode)
    #[arg(short, long)]
    webhook: bool,

    /// Webhook port (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Verbose logging (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Answer one command locally and print the reply (no Telegram needed)
    Query {
        /// Command name: start, help, status, list or pending
        name: String,

        /// Command argument (order or line number)
        arg: Option<String>,

        /// Print matched records as JSON instead of the reply text
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load environment variables from config directory first
    let env_path = config::env_file();
    if env_path.exists() {
        let _ = dotenvy::from_path(&env_path);
    }
    // Then local .env.local or .env
    let _ = dotenvy::from_filename(".env.local").or_else(|_| dotenvy::dotenv());

    let filter = match args.verbose {
        0 => "riukinho_telegram=info,riukinho_core=info,teloxide=warn",
        1 => "riukinho_telegram=debug,riukinho_core=debug,teloxide=info",
        2 => "riukinho_telegram=trace,riukinho_core=trace,teloxide=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut config = BotConfig::from_env()?;
    if let Some(port) = args.port {
        config.set_port(port);
    }

    if let Some(Cmd::Query { name, arg, json }) = args.command {
        let Some(request) = Request::from_parts(&name.to_lowercase(), arg.as_deref().unwrap_or(""))
        else {
            return Err(format!("unknown command '{}'", name).into());
        };
        let responder = Responder::new(source::from_config(&config), config.columns.clone());
        println!("{}", run_query(&responder, &request, json).await?);
        return Ok(());
    }

    let bot = RiukinhoBot::new(&config)?;

    match bot.get_me().await {
        Ok(username) => {
            tracing::info!(username = %username, "Bot initialized successfully");
            println!("\n[robot] Riukinho Bot");
            println!("   Bot: @{}", username);
            println!("   Mode: {}", if args.webhook { "webhook" } else { "polling" });
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to get bot info");
            return Err(e.into());
        }
    }

    println!("\n[phone] Open Telegram and send /start to begin");
    println!("   Press Ctrl+C to stop\n");

    if args.webhook {
        let webhook = config.webhook()?;
        bot.start_webhook(&webhook).await?;
    } else {
        bot.start_polling().await?;
    }

    Ok(())
}
