//! Terminal rendering of the discounts overview.
use std::io;

use tabled::builder::Builder;
use tabled::settings::Style;

use crate::locale::{LocaleContext, NO_VALUE_FALLBACK};
use crate::model::{DiscountRow, PageState, SortKey, SortOrder, SortState};
use crate::overview::{Overview, ViewState};

pub const TITLE: &str = "Discounts overview";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Name,
    Key,
    Type,
    Active,
    ValidFrom,
    ValidUntil,
    CreatedAt,
}

pub const COLUMNS: [Column; 7] = [
    Column::Name,
    Column::Key,
    Column::Type,
    Column::Active,
    Column::ValidFrom,
    Column::ValidUntil,
    Column::CreatedAt,
];

impl Column {
    pub fn label(&self) -> &'static str {
        match self {
            Column::Name => "Name",
            Column::Key => "Key",
            Column::Type => "Type",
            Column::Active => "Active",
            Column::ValidFrom => "Valid From",
            Column::ValidUntil => "Valid To",
            Column::CreatedAt => "Date Created",
        }
    }

    pub fn sort_key(&self) -> Option<SortKey> {
        match self {
            Column::Name => Some(SortKey::Name),
            Column::Key => Some(SortKey::Key),
            Column::ValidFrom => Some(SortKey::ValidFrom),
            Column::ValidUntil => Some(SortKey::ValidUntil),
            Column::CreatedAt => Some(SortKey::CreatedAt),
            Column::Type | Column::Active => None,
        }
    }

    /// Cell text for `row`.
    pub fn cell(&self, row: &DiscountRow, locale: &LocaleContext) -> String {
        match self {
            Column::Name => locale.localized_name(row.name_all_locales.as_deref()),
            Column::Key => row
                .key
                .clone()
                .filter(|k| !k.is_empty())
                .unwrap_or_else(|| NO_VALUE_FALLBACK.to_string()),
            Column::Type => row.kind.as_str().to_string(),
            Column::Active => (if row.is_active { "✓" } else { "✗" }).to_string(),
            Column::ValidFrom => locale.format_date(row.valid_from.as_deref()),
            Column::ValidUntil => locale.format_date(row.valid_until.as_deref()),
            Column::CreatedAt => locale.format_date(Some(&row.created_at)),
        }
    }

    fn header(&self, sort: &SortState) -> String {
        match self.sort_key() {
            Some(key) if key == sort.key && key.is_sortable_column() => {
                let arrow = match sort.order {
                    SortOrder::Asc => "▲",
                    SortOrder::Desc => "▼",
                };
                format!("{} {}", self.label(), arrow)
            }
            _ => self.label().to_string(),
        }
    }
}

/// Render `state`.
///
/// Loading shows the headline and an indicator, a failure shows only the
/// error message, and an empty result shows the headline alone.
pub fn write_view(
    out: &mut impl io::Write,
    state: &ViewState,
    page: &PageState,
    sort: &SortState,
    locale: &LocaleContext,
) -> io::Result<()> {
    match state {
        ViewState::Loading => {
            writeln!(out, "{}", TITLE)?;
            writeln!(out, "Loading…")
        }
        ViewState::Failed { message, .. } => write_error(out, message),
        ViewState::Ready(overview) => {
            writeln!(out, "{}", TITLE)?;
            if overview.rows.is_empty() {
                return Ok(());
            }
            writeln!(out, "{}", render_table(overview, sort, locale))?;
            writeln!(out, "{}", pagination_line(page, overview.total_items))
        }
    }
}

/// The error notification that replaces the whole view.
pub fn write_error(out: &mut impl io::Write, message: &str) -> io::Result<()> {
    writeln!(out, "Error: {}", message)
}

pub fn render_table(overview: &Overview, sort: &SortState, locale: &LocaleContext) -> String {
    let mut builder = Builder::default();

    let mut header = vec!["#".to_string()];
    header.extend(COLUMNS.iter().map(|c| c.header(sort)));
    builder.push_record(header);

    for (idx, row) in overview.rows.iter().enumerate() {
        let mut record = vec![(idx + 1).to_string()];
        record.extend(COLUMNS.iter().map(|c| c.cell(row, locale)));
        builder.push_record(record);
    }

    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.to_string()
}

pub fn pagination_line(page: &PageState, total_items: u64) -> String {
    format!(
        "Page {} of {} · {} per page · {} items",
        page.page,
        page.page_count(total_items),
        page.per_page,
        total_items
    )
}
