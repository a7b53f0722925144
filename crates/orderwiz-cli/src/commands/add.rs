//! Add command - record a new order, optionally read from a screenshot.

use std::path::PathBuf;

use clap::Args;
use console::style;
use rust_decimal::Decimal;
use tracing::{info, warn};

use orderwiz_core::{parse_amount, ExtractionResult, OrderDraft};

use super::{confirm, extract_from_file, format_detail, load_config, open_store, GlobalOpts};

/// Arguments for the add command.
#[derive(Args)]
pub struct AddArgs {
    /// Order number (e.g. 113-2089298-0236240)
    #[arg(short = 'n', long)]
    order_number: Option<String>,

    /// Order total (e.g. 16.15 or $16.15)
    #[arg(short, long, allow_hyphen_values = true)]
    amount: Option<String>,

    /// Screenshot to attach
    #[arg(short, long)]
    image: Option<PathBuf>,

    /// Free-text note
    #[arg(long)]
    note: Option<String>,

    /// The review was posted with a picture
    #[arg(long)]
    comment_with_picture: bool,

    /// A review has been posted
    #[arg(long)]
    commented: bool,

    /// The review has been revealed
    #[arg(long)]
    revealed: bool,

    /// The order has been reimbursed
    #[arg(long)]
    reimbursed: bool,

    /// Amount reimbursed so far
    #[arg(long, allow_hyphen_values = true)]
    reimbursed_amount: Option<String>,

    /// Read missing fields from this screenshot with OCR (also attached)
    #[arg(long)]
    from_image: Option<PathBuf>,

    /// Accept OCR values without asking
    #[arg(short, long)]
    yes: bool,
}

pub async fn run(args: AddArgs, opts: &GlobalOpts) -> anyhow::Result<()> {
    let config = load_config(opts)?;

    // Parse typed values first so a typo fails before OCR runs.
    let typed_amount = args.amount.as_deref().map(parse_amount).transpose()?;
    let reimbursed_amount = args
        .reimbursed_amount
        .as_deref()
        .map(parse_amount)
        .transpose()?;

    let mut order_number = args.order_number.clone();
    let mut amount = typed_amount;

    if let Some(path) = &args.from_image {
        if order_number.is_none() || amount.is_none() {
            match extract_from_file(&config, path).await {
                Ok(extracted) => {
                    let (found_number, found_amount) = accept_extracted(&extracted, args.yes)?;
                    order_number = order_number.or(found_number);
                    amount = amount.or(found_amount);
                }
                Err(e) => {
                    warn!("Extraction failed: {:#}", e);
                    eprintln!(
                        "{} Could not read {}: {:#}",
                        style("⚠").yellow(),
                        path.display(),
                        e
                    );
                    eprintln!("  Enter the values with --order-number and --amount.");
                }
            }
        }
    }

    let order_number = order_number
        .ok_or_else(|| anyhow::anyhow!("Order number is required; pass --order-number"))?;
    let amount = amount.ok_or_else(|| anyhow::anyhow!("Amount is required; pass --amount"))?;

    let mut draft = OrderDraft::new(order_number, amount)
        .with_comment_with_picture(args.comment_with_picture)
        .with_commented(args.commented)
        .with_revealed(args.revealed)
        .with_reimbursed(args.reimbursed)
        .with_reimbursed_amount(reimbursed_amount.unwrap_or(Decimal::ZERO));
    if let Some(note) = args.note {
        draft = draft.with_note(note);
    }

    let image = args.image.or(args.from_image);
    if let Some(path) = &image {
        if !path.exists() {
            anyhow::bail!("Image file not found: {}", path.display());
        }
    }

    let store = open_store(&config, opts)?;
    let order = match &image {
        Some(path) => {
            let order = store.insert_with_image(draft, path)?;
            info!("Attached {} to order {}", path.display(), order.id);
            order
        }
        None => store.insert(draft)?,
    };

    println!("{} Added order {}", style("✓").green(), order);
    print!("{}", format_detail(&order));

    Ok(())
}

/// Ask the user to confirm each OCR value unless `yes` is set.
fn accept_extracted(
    extracted: &ExtractionResult,
    yes: bool,
) -> anyhow::Result<(Option<String>, Option<Decimal>)> {
    let mut order_number = extracted.order_number.clone();
    let mut amount = extracted.amount;

    if order_number.is_none() && amount.is_none() {
        eprintln!(
            "{} No order number or amount found in the screenshot.",
            style("ℹ").blue()
        );
        return Ok((None, None));
    }

    if yes {
        return Ok((order_number, amount));
    }

    if let Some(found) = &order_number {
        if !confirm(&format!("Use order number {}?", style(found).cyan()), true)? {
            order_number = None;
        }
    }

    if let Some(found) = amount {
        if !confirm(&format!("Use amount {}?", style(format!("${:.2}", found)).cyan()), true)? {
            amount = None;
        }
    }

    Ok((order_number, amount))
}
