//! Joins the two discount queries and derives what the view shows.
//!
//! Both queries are issued together with the same page and sort variables.
//! The merged table is only computed once both have settled. Any failure,
//! checked product first, replaces the whole view.
use futures::future;
use tracing::{info, instrument, warn};

use crate::ctp::{DiscountSource, FetchError};
use crate::listing::{combine, estimate_total_items, sort_rows};
use crate::locale::LocaleContext;
use crate::model::{DiscountKind, DiscountRow, PageState, PagedRows, QueryVariables, SortState};
use crate::normalize::normalize_page;

/// Lifecycle of one remote query.
#[derive(Debug, Default)]
pub enum QueryState {
    #[default]
    Pending,
    Loaded(PagedRows),
    Failed(FetchError),
}

/// Current state of both queries for one set of variables.
#[derive(Debug, Default)]
pub struct DiscountQueries {
    pub product: QueryState,
    pub cart: QueryState,
}

/// What the view renders for a [`DiscountQueries`] snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Loading,
    Failed { kind: DiscountKind, message: String },
    Ready(Overview),
}

/// Merged, ordered rows of the current page plus the pagination size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overview {
    pub rows: Vec<DiscountRow>,
    pub total_items: u64,
}

impl DiscountQueries {
    pub fn set(&mut self, kind: DiscountKind, state: QueryState) {
        match kind {
            DiscountKind::Product => self.product = state,
            DiscountKind::Cart => self.cart = state,
        }
    }

    /// First error in product-then-cart order, if any.
    pub fn first_error(&self) -> Option<(DiscountKind, &FetchError)> {
        [
            (DiscountKind::Product, &self.product),
            (DiscountKind::Cart, &self.cart),
        ]
        .into_iter()
        .find_map(|(kind, state)| match state {
            QueryState::Failed(err) => Some((kind, err)),
            _ => None,
        })
    }

    /// Derive the view. Pure; safe to call again after any change to the
    /// query states, the sort or the locale.
    pub fn view(&self, sort: &SortState, locale: &LocaleContext) -> ViewState {
        if let Some((kind, err)) = self.first_error() {
            return ViewState::Failed {
                kind,
                message: err.to_string(),
            };
        }
        match (&self.product, &self.cart) {
            (QueryState::Loaded(product), QueryState::Loaded(cart)) => {
                ViewState::Ready(build_overview(product, cart, sort, locale))
            }
            _ => ViewState::Loading,
        }
    }
}

pub fn build_overview(
    product: &PagedRows,
    cart: &PagedRows,
    sort: &SortState,
    locale: &LocaleContext,
) -> Overview {
    let mut rows = combine(product.results.clone(), cart.results.clone());
    sort_rows(&mut rows, sort, locale);
    Overview {
        rows,
        total_items: estimate_total_items(product.total, cart.total),
    }
}

/// Run both queries concurrently and wait until each has succeeded or failed.
#[instrument(skip(source, sort), fields(sort_expr = %sort.expression()))]
pub async fn fetch_both(
    source: &dyn DiscountSource,
    page: &PageState,
    sort: &SortState,
) -> DiscountQueries {
    let vars = QueryVariables::new(page, sort);
    let (product, cart) = future::join(
        fetch_one(source, DiscountKind::Product, &vars),
        fetch_one(source, DiscountKind::Cart, &vars),
    )
    .await;
    DiscountQueries { product, cart }
}

async fn fetch_one(
    source: &dyn DiscountSource,
    kind: DiscountKind,
    vars: &QueryVariables,
) -> QueryState {
    match source.fetch_discounts(kind, vars).await {
        Ok(page) => {
            let rows = normalize_page(page, kind);
            info!(%kind, count = rows.results.len(), total = ?rows.total, "fetched discounts");
            QueryState::Loaded(rows)
        }
        Err(err) => {
            warn!(%kind, error = %err, "discount query failed");
            QueryState::Failed(err)
        }
    }
}
