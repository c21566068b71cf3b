use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use xhs_core::{Credential, SaveMode};
use xhs_scraper::{ClientSettings, XhsClient};

mod crawl;

#[derive(Debug, Parser)]
#[command(name = "xhs-cli")]
#[command(about = "Crawl Xiaohongshu posts into JSON, spreadsheet, and media exports")]
struct Cli {
    /// Session cookie string; overrides `XHS_COOKIES`.
    #[arg(long, global = true)]
    cookies: Option<String>,

    /// Root directory for `excel_datas/` and `media_datas/`; overrides `XHS_OUTPUT_DIR`.
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Crawl every post published by one user.
    User {
        /// Profile URL, e.g. `https://www.xiaohongshu.com/user/profile/<id>`.
        url: String,

        #[arg(long, default_value_t = SaveMode::All)]
        mode: SaveMode,

        /// Base name for the export files. Defaults to `<nickname>_<user_id>`.
        #[arg(long)]
        output: Option<String>,
    },
    /// Crawl an explicit list of post URLs.
    Posts {
        urls: Vec<String>,

        /// Read additional URLs from a file, one per line.
        #[arg(long)]
        file: Option<PathBuf>,

        #[arg(long, default_value_t = SaveMode::All)]
        mode: SaveMode,

        /// Base name for the export files. Defaults to `notes_<timestamp>`.
        #[arg(long)]
        output: Option<String>,
    },
    /// Print a user's public profile as JSON.
    Profile { url: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = xhs_core::load_app_config().context("failed to load configuration")?;
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let Some(command) = cli.command else {
        println!("xhs-cli ready; run `xhs-cli --help` for commands");
        return Ok(());
    };

    let credential = Credential::resolve(cli.cookies.as_deref(), config.cookies.as_ref())?;
    let client = XhsClient::new(ClientSettings::from_config(&config))
        .context("failed to build HTTP client")?;

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    let session = crawl::Session {
        client: &client,
        config: &config,
        credential: &credential,
        cancel: &cancel,
    };

    match command {
        Commands::User { url, mode, output } => session.run_user(&url, mode, output).await,
        Commands::Posts {
            urls,
            file,
            mode,
            output,
        } => {
            let urls = crawl::collect_urls(urls, file.as_deref()).await?;
            session.run_posts(&urls, mode, output).await
        }
        Commands::Profile { url } => session.run_profile(&url).await,
    }
}

/// Cancels the in-flight batch on the first Ctrl-C. Items already resolved
/// are kept; the rest are reported as cancelled.
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling remaining posts");
            cancel.cancel();
        }
    });
}
