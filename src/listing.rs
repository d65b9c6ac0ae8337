//! Client-side merge of the two discount pages: combine, order and size
//! the pagination.
use std::cmp::Ordering;

use crate::locale::{LocaleContext, TextCollator};
use crate::model::{DiscountRow, SortKey, SortOrder, SortState};

/// Product rows followed by cart rows. No deduplication.
pub fn combine(product: Vec<DiscountRow>, cart: Vec<DiscountRow>) -> Vec<DiscountRow> {
    let mut rows = product;
    rows.extend(cart);
    rows
}

/// Compare two rows under `sort`. Absent values compare as the empty string.
pub fn compare_rows(
    a: &DiscountRow,
    b: &DiscountRow,
    sort: &SortState,
    locale: &LocaleContext,
    collator: &TextCollator,
) -> Ordering {
    let ordering = match sort.key {
        SortKey::CreatedAt => collator.compare(&a.created_at, &b.created_at),
        SortKey::ValidFrom => collator.compare(
            a.valid_from.as_deref().unwrap_or_default(),
            b.valid_from.as_deref().unwrap_or_default(),
        ),
        SortKey::ValidUntil => collator.compare(
            a.valid_until.as_deref().unwrap_or_default(),
            b.valid_until.as_deref().unwrap_or_default(),
        ),
        SortKey::Name => collator.compare(
            &locale.localized_name(a.name_all_locales.as_deref()),
            &locale.localized_name(b.name_all_locales.as_deref()),
        ),
        SortKey::Key => collator.compare(
            a.key.as_deref().unwrap_or_default(),
            b.key.as_deref().unwrap_or_default(),
        ),
    };
    match sort.order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

/// Stable sort; rows with equal keys keep their combined order.
pub fn sort_rows(rows: &mut [DiscountRow], sort: &SortState, locale: &LocaleContext) {
    let collator = locale.collator();
    if sort.key == SortKey::Name {
        // Resolve each display name once instead of per comparison.
        let mut keyed: Vec<(String, DiscountRow)> = rows
            .iter()
            .map(|row| (locale.localized_name(row.name_all_locales.as_deref()), row.clone()))
            .collect();
        keyed.sort_by(|(a, _), (b, _)| match sort.order {
            SortOrder::Asc => collator.compare(a, b),
            SortOrder::Desc => collator.compare(a, b).reverse(),
        });
        for (slot, (_, row)) in rows.iter_mut().zip(keyed) {
            *slot = row;
        }
        return;
    }
    rows.sort_by(|a, b| compare_rows(a, b, sort, locale, &collator));
}

/// Item count that drives the pagination footer: the smaller of the two
/// remote totals, with a missing total counted as zero. Under-reports the
/// merged size whenever the collections differ in size.
pub fn estimate_total_items(product_total: Option<u64>, cart_total: Option<u64>) -> u64 {
    product_total.unwrap_or(0).min(cart_total.unwrap_or(0))
}
