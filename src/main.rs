mod merge;
mod parser;
mod report;
mod scraper;
mod server;
mod settings;
mod sources;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};

use scraper::HttpFetcher;
use server::AppState;
use settings::Settings;

#[derive(Parser)]
#[command(name = "institution_scraper", about = "Ranked-institution aggregator over HTML listings")]
struct Cli {
    /// Settings file (default: ./scraper.toml, optional)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the aggregation endpoints over HTTP
    Serve {
        /// Override the configured port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Aggregate every ranking category for one year and print JSON
    Rankings {
        /// Ranking year (default: configured default year)
        #[arg(short, long)]
        year: Option<String>,
    },
    /// Aggregate the directory page and print JSON
    Directory,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Commands::Serve { port: Some(port) } = cli.command {
        settings.port = port;
    }

    let fetcher = HttpFetcher::new(&settings.user_agent, Duration::from_secs(settings.timeout_secs))?;
    let state = Arc::new(AppState {
        settings,
        fetcher: Arc::new(fetcher),
    });

    let t0 = Instant::now();
    match cli.command {
        Commands::Serve { .. } => server::serve(state).await?,
        Commands::Rankings { year } => {
            let report = server::rankings_report(&state, year.as_deref()).await;
            eprintln!(
                "{}: {} institutions, {} failed categories in {:.1}s",
                report.year,
                report.total,
                report.errors.len(),
                t0.elapsed().as_secs_f64()
            );
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Directory => {
            let report = server::directory_report(&state).await;
            eprintln!(
                "{}: {} institutions, {} errors in {:.1}s",
                report.source,
                report.total,
                report.errors.len(),
                t0.elapsed().as_secs_f64()
            );
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
