use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;

use crate::model::LocalizedEntry;

/// Discount record as returned by either discount query.
///
/// Only `id` and `createdAt` are required; every other field that is absent
/// or has an unexpected shape decodes to `None`.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RawDiscount {
    pub id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub key: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub name_all_locales: Option<Vec<LocalizedEntry>>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub valid_from: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub valid_until: Option<String>,
    pub created_at: String,
}

/// `{ total, results }` page of one discount collection.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct RawPage {
    #[serde(default, deserialize_with = "lenient")]
    pub total: Option<u64>,
    #[serde(default)]
    pub results: Vec<RawDiscount>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct DiscountsData {
    pub product_discounts: Option<RawPage>,
    pub cart_discounts: Option<RawPage>,
}

#[derive(Deserialize, Debug)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Deserialize, Debug)]
pub struct GraphQlError {
    pub message: String,
}

#[derive(Deserialize, Debug)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn raw_discount_tolerates_missing_and_malformed_fields() {
        let raw: RawDiscount = serde_json::from_value(json!({
            "id": "pd-1",
            "isActive": "yes",
            "nameAllLocales": [{ "locale": "en" }],
            "validFrom": null,
            "createdAt": "2023-01-01T00:00:00.000Z"
        }))
        .unwrap();
        assert_eq!(raw.id, "pd-1");
        assert_eq!(raw.key, None);
        assert_eq!(raw.is_active, None);
        assert_eq!(raw.name_all_locales, None);
        assert_eq!(raw.valid_from, None);
    }

    #[test]
    fn raw_discount_requires_id_and_created_at() {
        let missing = serde_json::from_value::<RawDiscount>(json!({ "id": "x" }));
        assert!(missing.is_err());
    }

    #[test]
    fn graphql_response_decodes_both_collections() {
        let resp: GraphQlResponse<DiscountsData> = serde_json::from_value(json!({
            "data": {
                "cartDiscounts": {
                    "total": 3,
                    "results": [{
                        "id": "cd-1",
                        "key": "free-shipping",
                        "nameAllLocales": [{ "locale": "en", "value": "Free shipping" }],
                        "isActive": true,
                        "createdAt": "2023-02-01T00:00:00.000Z"
                    }]
                }
            }
        }))
        .unwrap();
        let data = resp.data.unwrap();
        assert!(data.product_discounts.is_none());
        let page = data.cart_discounts.unwrap();
        assert_eq!(page.total, Some(3));
        assert_eq!(page.results[0].key.as_deref(), Some("free-shipping"));
        assert!(resp.errors.is_empty());
    }
}
