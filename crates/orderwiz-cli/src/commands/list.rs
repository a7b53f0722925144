//! List command - print every stored order.

use clap::Args;

use orderwiz_core::OrderSort;

use super::{load_config, open_store, print_orders, GlobalOpts, OutputFormat};

/// Arguments for the list command.
#[derive(Args)]
pub struct ListArgs {
    /// Sort order
    #[arg(short, long, value_enum, default_value = "id")]
    sort: SortKey,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum SortKey {
    /// Insertion order
    Id,
    /// Newest first
    Newest,
    /// Cheapest first
    Amount,
    /// Most expensive first
    AmountDesc,
    /// Alphabetical by order number
    OrderNumber,
}

impl From<SortKey> for OrderSort {
    fn from(key: SortKey) -> Self {
        match key {
            SortKey::Id => OrderSort::IdAsc,
            SortKey::Newest => OrderSort::CreatedDesc,
            SortKey::Amount => OrderSort::AmountAsc,
            SortKey::AmountDesc => OrderSort::AmountDesc,
            SortKey::OrderNumber => OrderSort::OrderNumber,
        }
    }
}

pub async fn run(args: ListArgs, opts: &GlobalOpts) -> anyhow::Result<()> {
    let config = load_config(opts)?;
    let store = open_store(&config, opts)?;

    let orders = store.list_sorted(args.sort.into())?;
    print_orders(&orders, args.format)
}
