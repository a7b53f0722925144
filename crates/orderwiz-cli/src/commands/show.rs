//! Show command - print one order.

use clap::Args;

use super::{format_detail, load_config, open_store, GlobalOpts};

/// Arguments for the show command.
#[derive(Args)]
pub struct ShowArgs {
    /// Order id
    id: i64,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

pub async fn run(args: ShowArgs, opts: &GlobalOpts) -> anyhow::Result<()> {
    let config = load_config(opts)?;
    let store = open_store(&config, opts)?;

    let order = store.get(args.id)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&order)?);
    } else {
        print!("{}", format_detail(&order));
    }

    Ok(())
}
