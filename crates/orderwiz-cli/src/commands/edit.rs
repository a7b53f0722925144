//! Edit command - change fields of an existing order.

use std::path::PathBuf;

use clap::Args;
use console::style;

use orderwiz_core::{parse_amount, OrderPatch};

use super::{format_detail, load_config, open_store, GlobalOpts};

/// Arguments for the edit command.
#[derive(Args)]
pub struct EditArgs {
    /// Order id
    id: i64,

    /// New order number
    #[arg(short = 'n', long)]
    order_number: Option<String>,

    /// New order total
    #[arg(short, long, allow_hyphen_values = true)]
    amount: Option<String>,

    /// New note
    #[arg(long, conflicts_with = "clear_note")]
    note: Option<String>,

    /// Remove the note
    #[arg(long)]
    clear_note: bool,

    /// Attach a new screenshot
    #[arg(short, long, conflicts_with = "clear_image")]
    image: Option<PathBuf>,

    /// Detach the screenshot
    #[arg(long)]
    clear_image: bool,

    /// Review posted with a picture (true/false)
    #[arg(long)]
    comment_with_picture: Option<bool>,

    /// Review posted (true/false)
    #[arg(long)]
    commented: Option<bool>,

    /// Review revealed (true/false)
    #[arg(long)]
    revealed: Option<bool>,

    /// Order reimbursed (true/false)
    #[arg(long)]
    reimbursed: Option<bool>,

    /// Amount reimbursed so far
    #[arg(long, allow_hyphen_values = true)]
    reimbursed_amount: Option<String>,
}

impl EditArgs {
    fn to_patch(&self) -> anyhow::Result<OrderPatch> {
        let mut patch = OrderPatch::new();

        if let Some(order_number) = &self.order_number {
            patch = patch.order_number(order_number.clone());
        }
        if let Some(amount) = &self.amount {
            patch = patch.amount(parse_amount(amount)?);
        }
        if let Some(note) = &self.note {
            patch = patch.note(Some(note.clone()));
        }
        if self.clear_note {
            patch = patch.note(None);
        }
        if self.clear_image {
            patch = patch.image_path(None);
        }
        if let Some(value) = self.comment_with_picture {
            patch = patch.comment_with_picture(value);
        }
        if let Some(value) = self.commented {
            patch = patch.commented(value);
        }
        if let Some(value) = self.revealed {
            patch = patch.revealed(value);
        }
        if let Some(value) = self.reimbursed {
            patch = patch.reimbursed(value);
        }
        if let Some(amount) = &self.reimbursed_amount {
            patch = patch.reimbursed_amount(parse_amount(amount)?);
        }

        Ok(patch)
    }
}

pub async fn run(args: EditArgs, opts: &GlobalOpts) -> anyhow::Result<()> {
    let patch = args.to_patch()?;

    if patch.is_empty() && args.image.is_none() {
        anyhow::bail!("Nothing to change. Pass at least one field to update.");
    }

    let config = load_config(opts)?;
    let store = open_store(&config, opts)?;

    let order = match &args.image {
        Some(path) => store.update_with_image(args.id, patch, path)?,
        None => store.update(args.id, patch)?,
    };

    println!("{} Updated order {}", style("✓").green(), order);
    print!("{}", format_detail(&order));

    Ok(())
}
