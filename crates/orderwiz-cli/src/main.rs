//! CLI application for tracking e-commerce orders.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{add, config, delete, edit, extract, list, search, seed, show, GlobalOpts};

/// Order tracker - record orders, attach screenshots and read them with OCR
#[derive(Parser)]
#[command(name = "orderwiz")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Database file (overrides the configured one)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a new order
    Add(add::AddArgs),

    /// List all orders
    List(list::ListArgs),

    /// Show a single order
    Show(show::ShowArgs),

    /// Change fields of an order
    Edit(edit::EditArgs),

    /// Delete an order
    Delete(delete::DeleteArgs),

    /// Search orders by order number or amount
    Search(search::SearchArgs),

    /// Read order number and amount from a screenshot
    Extract(extract::ExtractArgs),

    /// Manage configuration
    Config(config::ConfigArgs),

    /// Insert sample orders
    Seed(seed::SeedArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let opts = GlobalOpts {
        config: cli.config,
        database: cli.database,
    };

    match cli.command {
        Commands::Add(args) => add::run(args, &opts).await,
        Commands::List(args) => list::run(args, &opts).await,
        Commands::Show(args) => show::run(args, &opts).await,
        Commands::Edit(args) => edit::run(args, &opts).await,
        Commands::Delete(args) => delete::run(args, &opts).await,
        Commands::Search(args) => search::run(args, &opts).await,
        Commands::Extract(args) => extract::run(args, &opts).await,
        Commands::Config(args) => config::run(args, &opts).await,
        Commands::Seed(args) => seed::run(args, &opts).await,
    }
}
