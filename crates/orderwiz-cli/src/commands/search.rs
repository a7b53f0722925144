//! Search command - find orders by order number or amount.

use clap::{ArgGroup, Args};

use orderwiz_core::parse_amount;

use super::{load_config, open_store, print_orders, GlobalOpts, OutputFormat};

/// Arguments for the search command.
#[derive(Args)]
#[command(group(ArgGroup::new("query").required(true).args(["order_number", "amount"])))]
pub struct SearchArgs {
    /// Case-insensitive part of an order number
    #[arg(short = 'n', long)]
    order_number: Option<String>,

    /// Amount to match within the configured tolerance
    #[arg(short, long)]
    amount: Option<String>,

    /// Override the amount tolerance
    #[arg(short, long, requires = "amount")]
    tolerance: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

pub async fn run(args: SearchArgs, opts: &GlobalOpts) -> anyhow::Result<()> {
    let config = load_config(opts)?;
    let store = open_store(&config, opts)?;

    let orders = match (&args.order_number, &args.amount) {
        (Some(query), _) => store.search_by_order_number(query)?,
        (None, Some(amount)) => {
            let target = parse_amount(amount)?;
            let tolerance = match &args.tolerance {
                Some(text) => parse_amount(text)?,
                None => config.extraction.amount_tolerance,
            };
            store.search_by_amount_within(target, tolerance)?
        }
        (None, None) => anyhow::bail!("Pass --order-number or --amount"),
    };

    print_orders(&orders, args.format)
}
