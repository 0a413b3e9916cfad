use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bookbay::console::{parse_line, ConsoleInput, ConsoleTransport};
use bookbay::{
    load_config, validate_config, AudiobookBayScraper, Bot, Config, Controller, PageAdapter,
    SearchQuery, SessionStore, StaticLinkStore,
};

#[derive(Parser)]
#[command(name = "bookbay")]
#[command(about = "Search AudiobookBay and get magnet links", long_about = None)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print one page of search results
    Search {
        /// Search query
        query: String,

        /// Result page, starting at 1
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Scrape an item's detail page and print its magnet link
    Details {
        /// Detail page URL
        url: String,

        #[arg(long)]
        json: bool,
    },

    /// Interactive chat session in the terminal
    Chat {
        /// User id the session runs as
        #[arg(short, long, default_value_t = 1)]
        user: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => Config::default(),
    };
    validate_config(&config).context("Configuration validation failed")?;

    let scraper = AudiobookBayScraper::new(&config.source).context("Failed to create scraper")?;

    match cli.command {
        Commands::Search { query, page, json } => {
            let query = SearchQuery::normalize(&query);
            let results = scraper.fetch_listing(query.normalized(), page).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else if results.is_empty() {
                println!("No results found for: {}", query.raw());
            } else {
                println!("\nAudiobookBay results for: {} (page {})\n", query.raw(), page);
                println!("{:-<120}", "");

                for (i, result) in results.iter().enumerate() {
                    println!("{}. {}", i + 1, result.title);
                    println!("   {}", result.size_info);
                    println!("   Link: {}", result.detail_link);
                    println!("{:-<120}", "");
                }

                println!("\nTotal results: {}", results.len());
            }
        }
        Commands::Details { url, json } => {
            let detail = scraper.fetch_detail(&url).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&detail)?);
            } else {
                println!("\n{}\n", detail.title);
                println!("{}\n", detail.description);
                if let Some(image) = &detail.image_url {
                    println!("Cover: {}", image);
                }
                if let Some(hash) = &detail.info_hash {
                    println!("Info hash: {}", hash);
                }
                println!("Trackers: {}", detail.trackers.len());
                println!("Magnet: {}", detail.magnet);
            }
        }
        Commands::Chat { user } => {
            run_chat(config, Arc::new(scraper), user).await?;
        }
    }

    Ok(())
}

async fn run_chat(config: Config, adapter: Arc<dyn PageAdapter>, user: i64) -> Result<()> {
    let transport = Arc::new(ConsoleTransport::default());
    let controller = Controller::new(adapter, Arc::new(SessionStore::new()), config.bot.caption_limit);
    let bot = Bot::new(
        controller,
        transport.clone(),
        Arc::new(StaticLinkStore::new(config.extra_link.clone())),
        config.bot.clone(),
    );

    info!(user, "Starting console chat");
    println!("Type a book name to search. Commands: /next /prev /select N /magnet /quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_line(&line, user, transport.last_message()) {
            ConsoleInput::Quit => break,
            ConsoleInput::Ignore => continue,
            ConsoleInput::Update(update) => bot.handle_update(update).await,
        }
    }

    Ok(())
}
