use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use quotesync::app::QuoteApp;
use quotesync::storage::get_data_dir;
use quotesync::types::{CategoryFilter, Quote};

#[derive(Parser)]
#[command(name = "quotesync", about = "Quote catalog with remote sync")]
struct Cli {
    /// Data directory (defaults to the platform data dir or QUOTESYNC_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sync now, then on every interval until Ctrl-C
    Run,
    /// Run a single sync cycle
    Sync,
    /// Add a quote
    Add {
        #[arg(long)]
        text: String,
        #[arg(long)]
        category: String,
    },
    /// List quotes, optionally for one category
    List {
        #[arg(long)]
        category: Option<String>,
    },
    /// List distinct categories
    Categories,
    /// Show a random quote from the current filter
    Random {
        #[arg(long)]
        category: Option<String>,
    },
    /// Remember a category filter (`all` clears it)
    Filter { value: String },
    /// Export all quotes as JSON
    Export { path: PathBuf },
    /// Import quotes from a JSON array file
    Import { path: PathBuf },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{}", message);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => get_data_dir().map_err(|e| e.to_string())?,
    };
    let mut app = QuoteApp::open(&data_dir).map_err(|e| e.to_string())?;

    match cli.command {
        Command::Run => {
            app.start_sync();
            tokio::signal::ctrl_c().await.map_err(|e| e.to_string())?;
            app.stop_sync();
        }
        Command::Sync => {
            let report = app.sync_now().await;
            println!(
                "{} added, {} conflicts resolved",
                report.added, report.conflicts_resolved
            );
        }
        Command::Add { text, category } => {
            let post = app
                .add_quote(Quote::new(text, category))
                .await
                .map_err(|e| e.to_string())?;
            if let Some(post) = post {
                let _ = post.await;
            }
        }
        Command::List { category } => {
            let quotes = match category {
                Some(category) => app.filtered_by(&CategoryFilter::parse(&category)).await,
                None => app.filtered().await,
            };
            for quote in quotes {
                println!("\"{}\" ({})", quote.text, quote.category);
            }
        }
        Command::Categories => {
            for category in app.categories().await {
                println!("{}", category);
            }
        }
        Command::Random { category } => {
            let quote = match category {
                Some(category) => app.random_in(&CategoryFilter::parse(&category)).await,
                None => app.random_quote().await,
            };
            match quote {
                Some(quote) => println!("\"{}\"\nCategory: {}", quote.text, quote.category),
                None => println!("No quotes available. Please add a new quote."),
            }
        }
        Command::Filter { value } => {
            let selection = app.set_filter(&value).await.map_err(|e| e.to_string())?;
            println!("Filter set to {}", selection);
        }
        Command::Export { path } => {
            app.export_to_file(&path).await.map_err(|e| e.to_string())?;
        }
        Command::Import { path } => {
            let report = app.import_file(&path).await.map_err(|e| e.to_string())?;
            println!("{} imported, {} skipped", report.added, report.skipped);
        }
    }

    Ok(())
}
