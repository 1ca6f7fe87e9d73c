//! Command-line search over a JSON dataset.
//!
//! Prints the search response as JSON on stdout. All tracing output goes to
//! stderr so that stdout can be piped straight into other tools.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use sift::AppConfig;
use sift_search::SearchRequest;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(
    name = "sift",
    about = "Fuzzy search across configured record collections",
    version
)]
struct Cli {
    /// Configuration file (defaults to ~/.config/sift/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Dataset file, overriding `[data] path` from the configuration
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Search query
    query: String,

    /// 1-based page number
    #[arg(long, default_value = "1")]
    page: usize,

    /// Entries per page
    #[arg(long, default_value = "10")]
    page_size: usize,

    /// Comma-separated attributes to return
    #[arg(long)]
    fields: Option<String>,

    /// Relations to populate, e.g. `author,cover[image]`
    #[arg(long)]
    populate: Option<String>,

    /// Pretty-print the JSON response
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("sift=info,sift_search=info")
            }),
        )
        .init();

    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(AppConfig::default_config_path);
    let config = AppConfig::from_file(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;
    let data_path = cli
        .data
        .or_else(|| config.data.path.clone())
        .context("no dataset given: pass --data or set [data] path in the config")?;

    let searcher = sift::open(config, &data_path)
        .with_context(|| format!("opening dataset {}", data_path.display()))?;

    let mut request = SearchRequest::new(cli.query)
        .with_page(cli.page)
        .with_page_size(cli.page_size);
    if let Some(fields) = cli.fields.as_deref() {
        request = request.with_fields(fields);
    }
    if let Some(populate) = cli.populate.as_deref() {
        request = request.with_populate(populate);
    }

    let token = CancellationToken::new();
    let on_interrupt = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupted, cancelling search");
            on_interrupt.cancel();
        }
    });

    let response = sift::run(&searcher, &request, &token).await.map_err(|e| {
        tracing::error!(error = %e, "search failed");
        anyhow::anyhow!("search failed: {e}")
    })?;

    let json = if cli.pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    println!("{json}");
    Ok(())
}
