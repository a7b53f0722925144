//! Subcommands and the helpers they share.

pub mod add;
pub mod config;
pub mod delete;
pub mod edit;
pub mod extract;
pub mod list;
pub mod search;
pub mod seed;
pub mod show;

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use orderwiz_core::models::config::AppConfig;
use orderwiz_core::{
    build_recognizer, ExtractionResult, ImageStore, Order, OrderExtractor, OrderError,
    OrderStore, PatternSet, StoreOptions,
};

/// Flags that apply to every subcommand.
pub struct GlobalOpts {
    pub config: Option<String>,
    pub database: Option<PathBuf>,
}

/// Output format for order listings.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text table
    Text,
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("orderwiz")
        .join("config.json")
}

/// The `--config` path, or the per-user default.
pub fn config_path(opts: &GlobalOpts) -> PathBuf {
    opts.config
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path)
}

/// Load the configuration. An explicit `--config` file must exist.
pub fn load_config(opts: &GlobalOpts) -> anyhow::Result<AppConfig> {
    if let Some(path) = &opts.config {
        return AppConfig::from_file(Path::new(path))
            .with_context(|| format!("Failed to read config file {}", path));
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Loading config from {}", path.display());
        Ok(AppConfig::from_file(&path)?)
    } else {
        Ok(AppConfig::default())
    }
}

/// Open the order database named by `--database` or the configuration.
pub fn open_store(config: &AppConfig, opts: &GlobalOpts) -> anyhow::Result<OrderStore> {
    let database = opts
        .database
        .clone()
        .unwrap_or_else(|| config.store.database_path.clone());

    let store = OrderStore::open(
        &database,
        ImageStore::new(config.store.image_dir.clone()),
        StoreOptions {
            image_retention: config.store.image_retention,
        },
    )
    .with_context(|| format!("Failed to open database {}", database.display()))?;

    Ok(store)
}

/// Run OCR and pattern extraction on an image file off the async runtime.
pub async fn extract_from_file(config: &AppConfig, path: &Path) -> anyhow::Result<ExtractionResult> {
    if !path.exists() {
        anyhow::bail!("Image file not found: {}", path.display());
    }

    let bytes = std::fs::read(path)?;
    let ocr = config.ocr.clone();
    let extraction = config.extraction.clone();

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message(format!("Reading {}...", path.display()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let outcome = tokio::task::spawn_blocking(move || -> orderwiz_core::Result<ExtractionResult> {
        let recognizer = build_recognizer(&ocr)?;
        let patterns = PatternSet::from_config(&extraction)?;
        let extractor = OrderExtractor::new(recognizer).with_patterns(patterns);
        extractor.extract(&bytes).map_err(OrderError::from)
    })
    .await;

    spinner.finish_and_clear();

    Ok(outcome??)
}

/// Ask a yes/no question on stdin. Empty input or EOF gives `default`.
pub fn confirm(prompt: &str, default: bool) -> anyhow::Result<bool> {
    let hint = if default { "[Y/n]" } else { "[y/N]" };
    eprint!("{} {} ", prompt, hint);
    io::stderr().flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        eprintln!();
        return Ok(default);
    }

    Ok(match line.trim().to_lowercase().as_str() {
        "" => default,
        "y" | "yes" => true,
        _ => false,
    })
}

pub fn print_orders(orders: &[Order], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(orders)?),
        OutputFormat::Csv => print!("{}", format_csv(orders)?),
        OutputFormat::Text => print!("{}", format_table(orders)),
    }
    Ok(())
}

fn format_csv(orders: &[Order]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "id",
        "order_number",
        "amount",
        "comment_with_picture",
        "commented",
        "revealed",
        "reimbursed",
        "reimbursed_amount",
        "note",
        "image_path",
        "created_at",
        "updated_at",
    ])?;

    for order in orders {
        wtr.write_record([
            &order.id.to_string(),
            &order.order_number,
            &format!("{:.2}", order.amount),
            &order.comment_with_picture.to_string(),
            &order.commented.to_string(),
            &order.revealed.to_string(),
            &order.reimbursed.to_string(),
            &format!("{:.2}", order.reimbursed_amount),
            &order.note.clone().unwrap_or_default(),
            &order
                .image_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            &order.created_at.to_rfc3339(),
            &order.updated_at.to_rfc3339(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_table(orders: &[Order]) -> String {
    if orders.is_empty() {
        return "No orders found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{}\n",
        style(format!(
            "{:>5}  {:<21} {:>10}  {:<36} {}",
            "ID", "Order number", "Amount", "Flags", "Note"
        ))
        .bold()
    ));

    for order in orders {
        output.push_str(&format!(
            "{:>5}  {:<21} {:>10}  {:<36} {}\n",
            order.id,
            order.order_number,
            format!("${:.2}", order.amount),
            order.active_flags().join(","),
            order.note.as_deref().unwrap_or("")
        ));
    }

    output.push_str(&format!("\n{} order(s)\n", orders.len()));
    output
}

/// Multi-line description of one order.
pub fn format_detail(order: &Order) -> String {
    let yes_no = |flag: bool| if flag { style("yes").green() } else { style("no").dim() };

    let mut output = String::new();
    output.push_str(&format!("Order #{}\n", order.id));
    output.push_str(&format!("  Order number:       {}\n", order.order_number));
    output.push_str(&format!("  Amount:             ${:.2}\n", order.amount));
    output.push_str(&format!("  With picture:       {}\n", yes_no(order.comment_with_picture)));
    output.push_str(&format!("  Commented:          {}\n", yes_no(order.commented)));
    output.push_str(&format!("  Revealed:           {}\n", yes_no(order.revealed)));
    output.push_str(&format!("  Reimbursed:         {}\n", yes_no(order.reimbursed)));
    output.push_str(&format!("  Reimbursed amount:  ${:.2}\n", order.reimbursed_amount));
    if let Some(note) = &order.note {
        output.push_str(&format!("  Note:               {}\n", note));
    }
    if let Some(path) = &order.image_path {
        output.push_str(&format!("  Image:              {}\n", path.display()));
    }
    output.push_str(&format!(
        "  Created:            {}\n",
        order.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    output.push_str(&format!(
        "  Updated:            {}\n",
        order.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    output
}
