//! Command-line driver for the feedback analysis pipeline.
//!
//! Every command prints its result as JSON on stdout. Logs go to stderr.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use feedback_analysis::{AnalysisConfig, FeedbackAnalyzer, FeedbackItem};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "feedback")]
#[command(about = "Classify and summarize customer feedback")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify one feedback message
    Classify { message: String },

    /// Classify review text imported from another platform
    External { text: String },

    /// Summarize a JSON array of {rating, message, isPositive} entries
    Bulk {
        #[arg(long)]
        file: PathBuf,
    },

    /// Scrape a review or survey page and classify its feedback
    Extract {
        url: String,
        /// Platform name to report instead of the detected one
        #[arg(long)]
        label: Option<String>,
    },

    /// Check that a URL is allowed and reachable
    CheckUrl { url: String },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UrlCheck {
    url: String,
    reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,feedback_analysis=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .init();

    let cli = Cli::parse();

    let config = AnalysisConfig::from_env().context("Invalid configuration")?;
    if !config.gateway.is_enabled() {
        tracing::warn!("GEMINI_API_KEY not set, using local heuristics only");
    }
    let analyzer = FeedbackAnalyzer::from_config(&config).context("Failed to build analyzer")?;

    match cli.command {
        Commands::Classify { message } => print_json(&analyzer.classify_single(&message).await),
        Commands::External { text } => print_json(&analyzer.classify_external(&text).await),
        Commands::Bulk { file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let items: Vec<FeedbackItem> = serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse feedback entries in {}", file.display()))?;
            print_json(&analyzer.summarize_bulk(&items).await)
        }
        Commands::Extract { url, label } => {
            print_json(&analyzer.extract_from_url(&url, label.as_deref()).await)
        }
        Commands::CheckUrl { url } => {
            let check = match analyzer.check_url(&url).await {
                Ok(status) => UrlCheck {
                    url,
                    reachable: (200..400).contains(&status),
                    status: Some(status),
                    error: None,
                },
                Err(e) => UrlCheck {
                    url,
                    reachable: false,
                    status: None,
                    error: Some(e.to_string()),
                },
            };
            print_json(&check)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize result")?;
    println!("{}", json);
    Ok(())
}
