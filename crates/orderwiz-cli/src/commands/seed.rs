//! Seed command - fill the database with sample orders.

use std::str::FromStr;

use clap::Args;
use console::style;
use rust_decimal::Decimal;
use tracing::info;

use orderwiz_core::OrderDraft;

use super::{confirm, load_config, open_store, GlobalOpts};

/// Order number, amount, with picture, commented, revealed, reimbursed, note.
const SAMPLE_ORDERS: [(&str, &str, bool, bool, bool, bool, &str); 10] = [
    ("112-4567890-1234567", "25.99", true, true, true, true, "Computer accessories"),
    ("113-1234567-8901234", "75.50", true, true, true, false, "Kitchen appliance"),
    ("114-9876543-2109876", "12.99", true, true, false, false, "Office supplies"),
    ("115-4567890-0987654", "149.99", true, false, false, false, "Monitor stand"),
    ("116-7890123-4567890", "8.75", false, false, false, false, "Desk lamp"),
    ("117-3456789-0123456", "199.99", false, false, false, false, "Wireless headphones"),
    ("118-9012345-6789012", "35.50", false, false, false, false, "Keyboard"),
    ("119-5678901-2345678", "19.95", false, false, false, false, "Mouse pad"),
    ("120-1234567-8901234", "299.99", false, false, false, false, "Smart watch"),
    ("121-9876543-2109876", "15.75", false, false, false, false, "USB cables"),
];

/// Arguments for the seed command.
#[derive(Args)]
pub struct SeedArgs {
    /// Delete all existing orders first
    #[arg(long)]
    clear: bool,

    /// Do not ask before clearing
    #[arg(short, long)]
    yes: bool,
}

pub async fn run(args: SeedArgs, opts: &GlobalOpts) -> anyhow::Result<()> {
    let config = load_config(opts)?;
    let store = open_store(&config, opts)?;

    if args.clear {
        let existing = store.count()?;
        if existing > 0
            && !args.yes
            && !confirm(&format!("Delete all {} existing orders?", existing), false)?
        {
            println!("Cancelled.");
            return Ok(());
        }
        let removed = store.delete_all()?;
        info!("Cleared {} orders", removed);
    }

    for draft in sample_drafts()? {
        let order = store.insert(draft)?;
        info!("Added sample order {}", order);
    }

    println!(
        "{} Seeded {} sample orders ({} total)",
        style("✓").green(),
        SAMPLE_ORDERS.len(),
        store.count()?
    );

    Ok(())
}

fn sample_drafts() -> anyhow::Result<Vec<OrderDraft>> {
    SAMPLE_ORDERS
        .iter()
        .map(|&(number, amount, picture, commented, revealed, reimbursed, note)| -> anyhow::Result<OrderDraft> {
            let amount = Decimal::from_str(amount)?;
            let reimbursed_amount = if reimbursed { amount } else { Decimal::ZERO };
            Ok(OrderDraft::new(number, amount)
                .with_comment_with_picture(picture)
                .with_commented(commented)
                .with_revealed(revealed)
                .with_reimbursed(reimbursed)
                .with_reimbursed_amount(reimbursed_amount)
                .with_note(note))
        })
        .collect()
}
