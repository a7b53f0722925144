//! Extract command - read order fields from a screenshot without saving.

use std::path::PathBuf;

use clap::Args;
use console::style;

use orderwiz_core::ExtractionResult;

use super::{extract_from_file, load_config, GlobalOpts};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Screenshot (PNG, JPEG, GIF or BMP)
    #[arg(required = true)]
    input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: ExtractFormat,

    /// Include the recognized text in text output
    #[arg(long)]
    show_text: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum ExtractFormat {
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

pub async fn run(args: ExtractArgs, opts: &GlobalOpts) -> anyhow::Result<()> {
    let config = load_config(opts)?;
    let result = extract_from_file(&config, &args.input).await?;

    match args.format {
        ExtractFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        ExtractFormat::Text => print!("{}", format_text(&result, args.show_text)),
    }

    Ok(())
}

fn format_text(result: &ExtractionResult, show_text: bool) -> String {
    let missing = || style("not found").yellow().to_string();

    let mut output = String::new();
    output.push_str(&format!(
        "Order number: {}\n",
        result.order_number.clone().unwrap_or_else(missing)
    ));
    output.push_str(&format!(
        "Amount:       {}\n",
        result
            .amount
            .map(|a| format!("${:.2}", a))
            .unwrap_or_else(missing)
    ));
    if let Some(engine) = &result.engine {
        output.push_str(&format!(
            "Engine:       {} ({}ms)\n",
            engine, result.processing_time_ms
        ));
    }

    if show_text {
        output.push_str("\nRecognized text:\n");
        output.push_str(&result.raw_text);
        output.push('\n');
    }

    output
}
