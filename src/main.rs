use anyhow::{bail, Context, Result};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};

use discounts_overview::config;
use discounts_overview::ctp::CtpClient;
use discounts_overview::model::{PageState, SortKey, SortOrder, SortState, PER_PAGE_RANGE};
use discounts_overview::overview::{self, ViewState};
use discounts_overview::view;

#[derive(Debug, Parser)]
#[command(author, version, about = "List product and cart discounts in one table")]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Page number, starting at 1
    #[arg(long, default_value_t = 1)]
    page: u32,

    /// Rows requested from each collection (20 or 50); defaults to `app.page_size`
    #[arg(long)]
    per_page: Option<u32>,

    /// Sort column
    #[arg(long, value_enum, default_value = "createdAt")]
    sort: SortKey,

    /// Sort direction
    #[arg(long, value_enum, default_value = "desc")]
    order: SortOrder,

    /// Data locale; defaults to `app.data_locale`
    #[arg(long)]
    locale: Option<String>,

    /// Print the detail route of the n-th listed row (1-based)
    #[arg(long)]
    open: Option<usize>,

    /// Print an example config file and exit
    #[arg(long)]
    print_config_example: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();

    let args = Args::parse();
    if args.print_config_example {
        print!("{}", config::example());
        return Ok(ExitCode::SUCCESS);
    }

    let cfg = config::load(Some(&args.config))
        .with_context(|| format!("failed to load {}", args.config.display()))?;

    let per_page = args.per_page.unwrap_or(cfg.app.page_size);
    if !PER_PAGE_RANGE.contains(&per_page) {
        bail!("--per-page must be one of {:?}", PER_PAGE_RANGE);
    }
    if args.page == 0 {
        bail!("--page starts at 1");
    }
    let page = PageState::new(args.page, per_page);
    let sort = SortState::new(args.sort, args.order);
    let mut locale = cfg.locale_context();
    if let Some(data_locale) = args.locale {
        locale.locale = data_locale;
    }

    view::write_view(&mut io::stderr(), &ViewState::Loading, &page, &sort, &locale)?;
    let client = match CtpClient::connect(&cfg.ctp).await {
        Ok(client) => client,
        Err(err) => {
            let message = format!("{:#}", err);
            warn!(error = %message, "could not connect to the API");
            view::write_error(&mut io::stdout().lock(), &message)?;
            return Ok(ExitCode::FAILURE);
        }
    };
    let queries = overview::fetch_both(&client, &page, &sort).await;
    let state = queries.view(&sort, &locale);

    let mut stdout = io::stdout().lock();
    view::write_view(&mut stdout, &state, &page, &sort, &locale)?;

    let overview = match &state {
        ViewState::Ready(overview) => overview,
        ViewState::Failed { kind, .. } => {
            info!(%kind, "discount listing failed");
            return Ok(ExitCode::FAILURE);
        }
        ViewState::Loading => return Ok(ExitCode::FAILURE),
    };

    if let Some(n) = args.open {
        let row = n
            .checked_sub(1)
            .and_then(|idx| overview.rows.get(idx))
            .with_context(|| format!("no row {} on this page", n))?;
        writeln!(stdout, "{}", row.detail_path(&cfg.ctp.project_key))?;
    }

    Ok(ExitCode::SUCCESS)
}
