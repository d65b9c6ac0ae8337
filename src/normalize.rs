//! Maps raw product- and cart-discount records onto [`DiscountRow`].
use crate::ctp::model::{RawDiscount, RawPage};
use crate::model::{DiscountKind, DiscountRow, PagedRows};

/// Build a row tagged with the collection it came from.
pub fn normalize(raw: RawDiscount, kind: DiscountKind) -> DiscountRow {
    DiscountRow {
        id: raw.id,
        kind,
        key: raw.key,
        name_all_locales: raw.name_all_locales,
        is_active: raw.is_active.unwrap_or(false),
        valid_from: raw.valid_from,
        valid_until: raw.valid_until,
        created_at: raw.created_at,
    }
}

pub fn normalize_page(page: RawPage, kind: DiscountKind) -> PagedRows {
    PagedRows {
        results: page
            .results
            .into_iter()
            .map(|raw| normalize(raw, kind))
            .collect(),
        total: page.total,
    }
}
