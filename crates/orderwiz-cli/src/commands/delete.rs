//! Delete command - remove an order.

use clap::Args;
use console::style;

use orderwiz_core::ImageRetention;

use super::{confirm, load_config, open_store, GlobalOpts};

/// Arguments for the delete command.
#[derive(Args)]
pub struct DeleteArgs {
    /// Order id
    id: i64,

    /// Do not ask for confirmation
    #[arg(short, long)]
    yes: bool,

    /// Also delete the attached screenshot
    #[arg(long)]
    delete_image: bool,
}

pub async fn run(args: DeleteArgs, opts: &GlobalOpts) -> anyhow::Result<()> {
    let config = load_config(opts)?;
    let store = open_store(&config, opts)?;

    let order = store.get(args.id)?;

    if !args.yes && !confirm(&format!("Delete order {}?", order), false)? {
        println!("Cancelled.");
        return Ok(());
    }

    if args.delete_image {
        store.delete_with_retention(order.id, ImageRetention::Delete)?;
    } else {
        store.delete(order.id)?;
    }

    println!("{} Deleted order {}", style("✓").green(), order);

    Ok(())
}
