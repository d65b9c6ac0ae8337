use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Origin collection of a discount row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    Product,
    Cart,
}

impl DiscountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountKind::Product => "product",
            DiscountKind::Cart => "cart",
        }
    }

    /// Path segment of the detail page in the back-office routes.
    pub fn route_segment(&self) -> &'static str {
        match self {
            DiscountKind::Product => "products",
            DiscountKind::Cart => "carts",
        }
    }
}

impl fmt::Display for DiscountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `(locale, text)` entry of a localized field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocalizedEntry {
    pub locale: String,
    pub value: String,
}

/// Unified row built from either a product discount or a cart discount.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiscountRow {
    pub id: String,
    pub kind: DiscountKind,
    pub key: Option<String>,
    pub name_all_locales: Option<Vec<LocalizedEntry>>,
    pub is_active: bool,
    pub valid_from: Option<String>,
    pub valid_until: Option<String>,
    pub created_at: String,
}

impl DiscountRow {
    /// Back-office route of the detail page for this row.
    pub fn detail_path(&self, project_key: &str) -> String {
        format!(
            "/{}/discounts/{}/{}",
            project_key,
            self.kind.route_segment(),
            self.id
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum SortKey {
    #[serde(rename = "createdAt")]
    #[value(name = "createdAt")]
    CreatedAt,
    #[serde(rename = "validFrom")]
    #[value(name = "validFrom")]
    ValidFrom,
    #[serde(rename = "validUntil")]
    #[value(name = "validUntil")]
    ValidUntil,
    #[serde(rename = "name")]
    #[value(name = "name")]
    Name,
    #[serde(rename = "key")]
    #[value(name = "key")]
    Key,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::CreatedAt => "createdAt",
            SortKey::ValidFrom => "validFrom",
            SortKey::ValidUntil => "validUntil",
            SortKey::Name => "name",
            SortKey::Key => "key",
        }
    }

    /// Whether the table header offers sorting on this column.
    pub fn is_sortable_column(&self) -> bool {
        matches!(self, SortKey::Key | SortKey::CreatedAt)
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "createdAt" => Ok(SortKey::CreatedAt),
            "validFrom" => Ok(SortKey::ValidFrom),
            "validUntil" => Ok(SortKey::ValidUntil),
            "name" => Ok(SortKey::Name),
            "key" => Ok(SortKey::Key),
            other => Err(format!("unknown sort key '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Active sort column and direction, shared by both remote queries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SortState {
    pub key: SortKey,
    pub order: SortOrder,
}

impl SortState {
    pub fn new(key: SortKey, order: SortOrder) -> Self {
        Self { key, order }
    }

    /// Sort expression understood by the GraphQL API, e.g. `createdAt desc`.
    pub fn expression(&self) -> String {
        format!("{} {}", self.key.as_str(), self.order.as_str())
    }
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            key: SortKey::CreatedAt,
            order: SortOrder::Desc,
        }
    }
}

/// Page sizes offered by the pagination footer.
pub const PER_PAGE_RANGE: [u32; 2] = [20, 50];

/// Current page (1-based) and page size, shared by both remote queries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageState {
    pub page: u32,
    pub per_page: u32,
}

impl PageState {
    /// Builds a page state, clamping `page` and `per_page` to at least 1.
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page)
    }

    /// Number of pages needed for `total_items`; never less than one.
    pub fn page_count(&self, total_items: u64) -> u64 {
        let per_page = u64::from(self.per_page.max(1));
        total_items.div_ceil(per_page).max(1)
    }
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: PER_PAGE_RANGE[0],
        }
    }
}

/// Variables sent with each discount query.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct QueryVariables {
    pub limit: u32,
    pub offset: u64,
    pub sort: Vec<String>,
}

impl QueryVariables {
    pub fn new(page: &PageState, sort: &SortState) -> Self {
        Self {
            limit: page.per_page,
            offset: page.offset(),
            sort: vec![sort.expression()],
        }
    }
}

/// One page of normalized rows plus the remote total for its collection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PagedRows {
    pub results: Vec<DiscountRow>,
    pub total: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_is_zero_based() {
        assert_eq!(PageState::new(1, 20).offset(), 0);
        assert_eq!(PageState::new(3, 50).offset(), 100);
        assert_eq!(PageState::new(0, 20).offset(), 0);
    }

    #[test]
    fn page_count_rounds_up() {
        let page = PageState::new(1, 20);
        assert_eq!(page.page_count(0), 1);
        assert_eq!(page.page_count(20), 1);
        assert_eq!(page.page_count(21), 2);
    }

    #[test]
    fn query_variables_share_sort_expression() {
        let vars = QueryVariables::new(
            &PageState::new(2, 20),
            &SortState::new(SortKey::ValidUntil, SortOrder::Asc),
        );
        assert_eq!(vars.limit, 20);
        assert_eq!(vars.offset, 20);
        assert_eq!(vars.sort, vec!["validUntil asc".to_string()]);
        assert_eq!(SortState::default().expression(), "createdAt desc");
    }

    #[test]
    fn detail_path_depends_on_kind() {
        let mut row = DiscountRow {
            id: "d-1".into(),
            kind: DiscountKind::Product,
            key: None,
            name_all_locales: None,
            is_active: true,
            valid_from: None,
            valid_until: None,
            created_at: "2023-01-01T00:00:00.000Z".into(),
        };
        assert_eq!(row.detail_path("shop"), "/shop/discounts/products/d-1");
        row.kind = DiscountKind::Cart;
        assert_eq!(row.detail_path("shop"), "/shop/discounts/carts/d-1");
    }

    #[test]
    fn sort_key_parses_api_names() {
        assert_eq!("validFrom".parse::<SortKey>(), Ok(SortKey::ValidFrom));
        assert!("created_at".parse::<SortKey>().is_err());
        assert!(SortKey::CreatedAt.is_sortable_column());
        assert!(!SortKey::Name.is_sortable_column());
    }
}
