use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use discounts_overview::config;
use discounts_overview::ctp::{CtpClient, DiscountSource};
use discounts_overview::model::{DiscountKind, PageState, QueryVariables, SortState};
use discounts_overview::normalize::normalize_page;

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum Kind {
    Product,
    Cart,
}

#[derive(Parser, Debug)]
struct Args {
    /// Path to YAML config
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Collection to query
    #[arg(long, value_enum)]
    kind: Kind,

    /// Number of records to fetch
    #[arg(long, default_value_t = 20)]
    limit: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let cfg = config::load(Some(&args.config))?;
    let client = CtpClient::connect(&cfg.ctp).await?;

    let kind = match args.kind {
        Kind::Product => DiscountKind::Product,
        Kind::Cart => DiscountKind::Cart,
    };
    let vars = QueryVariables::new(&PageState::new(1, args.limit), &SortState::default());
    let page = normalize_page(client.fetch_discounts(kind, &vars).await?, kind);

    println!("Collection: {} discounts", kind);
    println!("Total: {}", page.total.map_or_else(|| "?".to_string(), |t| t.to_string()));
    for row in page.results {
        println!("{}", serde_json::to_string(&row)?);
    }
    Ok(())
}
