use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::{json, Value};
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::config::Ctp;
use crate::ctp::model::{DiscountsData, GraphQlResponse, RawPage, TokenResponse};
use crate::model::{DiscountKind, QueryVariables};

pub mod model;

const USER_AGENT: &str = "discounts-overview/0.1";

const PRODUCT_DISCOUNTS_QUERY: &str = r#"query FetchProductDiscounts($limit: Int!, $offset: Int!, $sort: [String!]) {
  productDiscounts(limit: $limit, offset: $offset, sort: $sort) {
    total
    results {
      id
      key
      nameAllLocales { locale value }
      isActive
      validFrom
      validUntil
      createdAt
    }
  }
}"#;

const CART_DISCOUNTS_QUERY: &str = r#"query FetchCartDiscounts($limit: Int!, $offset: Int!, $sort: [String!]) {
  cartDiscounts(limit: $limit, offset: $offset, sort: $sort) {
    total
    results {
      id
      key
      nameAllLocales { locale value }
      isActive
      validFrom
      validUntil
      createdAt
    }
  }
}"#;

/// A failed discount query. All variants are surfaced to the user the same way.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to reach the API: {0}")]
    Transport(String),
    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },
    #[error("{0}")]
    GraphQl(String),
    #[error("invalid API response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

/// Read-only access to the two discount collections.
#[async_trait]
pub trait DiscountSource: Send + Sync {
    async fn fetch_discounts(
        &self,
        kind: DiscountKind,
        vars: &QueryVariables,
    ) -> Result<RawPage, FetchError>;
}

#[derive(Clone)]
pub struct CtpClient {
    http: Client,
    graphql_url: Url,
    token: String,
}

impl fmt::Debug for CtpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CtpClient")
            .field("graphql_url", &self.graphql_url)
            .finish_non_exhaustive()
    }
}

impl CtpClient {
    /// Obtain an access token with the client-credentials grant and build a
    /// client for the project's GraphQL endpoint.
    #[instrument(skip_all, fields(project = %cfg.project_key))]
    pub async fn connect(cfg: &Ctp) -> Result<Self> {
        let http = http_client()?;
        let token_url = join_url(&cfg.auth_url, "oauth/token").context("invalid auth URL")?;
        let scope = cfg
            .scopes
            .iter()
            .map(|s| format!("{}:{}", s, cfg.project_key))
            .collect::<Vec<_>>()
            .join(" ");

        debug!(url=%token_url, %scope, "requesting access token");
        let res = http
            .post(token_url)
            .basic_auth(&cfg.client_id, Some(&cfg.client_secret))
            .form(&[("grant_type", "client_credentials"), ("scope", scope.as_str())])
            .send()
            .await
            .context("failed to reach the auth service")?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            warn!(%status, "token request rejected");
            return Err(anyhow!("auth error {}: {}", status, body));
        }
        let token: TokenResponse = res.json().await.context("invalid token response")?;
        info!(expires_in = ?token.expires_in, "obtained access token");

        let graphql_url = graphql_url(&cfg.api_url, &cfg.project_key)?;
        Ok(Self {
            http,
            graphql_url,
            token: token.access_token,
        })
    }

    /// Build a client around an already issued bearer token.
    pub fn with_token(api_url: &str, project_key: &str, token: String) -> Result<Self> {
        Ok(Self {
            http: http_client()?,
            graphql_url: graphql_url(api_url, project_key)?,
            token,
        })
    }

    pub fn build_request(&self, kind: DiscountKind, vars: &QueryVariables) -> Result<reqwest::Request> {
        let body = build_query_body(kind, vars);
        self.http
            .post(self.graphql_url.clone())
            .bearer_auth(&self.token)
            .header("Content-Type", "application/json")
            .json(&body)
            .build()
            .context("failed to build GraphQL request")
    }

    #[instrument(skip(self, vars), fields(limit = vars.limit, offset = vars.offset))]
    async fn execute_query(
        &self,
        kind: DiscountKind,
        vars: &QueryVariables,
    ) -> Result<RawPage, FetchError> {
        let request = self
            .build_request(kind, vars)
            .map_err(|err| FetchError::Transport(format!("{:#}", err)))?;
        debug!(url=%request.url(), sort=?vars.sort, "sending discount query");

        let res = self.http.execute(request).await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            warn!(%status, %kind, "discount query failed");
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: GraphQlResponse<DiscountsData> = res.json().await?;
        page_from_response(kind, payload)
    }
}

#[async_trait]
impl DiscountSource for CtpClient {
    async fn fetch_discounts(
        &self,
        kind: DiscountKind,
        vars: &QueryVariables,
    ) -> Result<RawPage, FetchError> {
        self.execute_query(kind, vars).await
    }
}

fn http_client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .context("failed to build HTTP client")
}

fn graphql_url(api_url: &str, project_key: &str) -> Result<Url> {
    join_url(api_url, &format!("{}/graphql", project_key)).context("invalid API URL")
}

/// Resolve `path` below `base`, keeping any path prefix of the base URL.
fn join_url(base: &str, path: &str) -> Result<Url> {
    let mut base = Url::parse(base)?;
    if !base.path().ends_with('/') {
        let dir = format!("{}/", base.path());
        base.set_path(&dir);
    }
    Ok(base.join(path)?)
}

/// GraphQL body for one discount collection; both collections receive the
/// same variables.
pub fn build_query_body(kind: DiscountKind, vars: &QueryVariables) -> Value {
    let query = match kind {
        DiscountKind::Product => PRODUCT_DISCOUNTS_QUERY,
        DiscountKind::Cart => CART_DISCOUNTS_QUERY,
    };
    json!({
        "query": query,
        "variables": vars,
    })
}

/// Pick the page for `kind` out of a GraphQL response, turning GraphQL
/// errors and missing data into [`FetchError`]s.
pub fn page_from_response(
    kind: DiscountKind,
    payload: GraphQlResponse<DiscountsData>,
) -> Result<RawPage, FetchError> {
    if !payload.errors.is_empty() {
        let message = payload
            .errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(FetchError::GraphQl(message));
    }
    let data = payload
        .data
        .ok_or_else(|| FetchError::Decode("response has no data".into()))?;
    let page = match kind {
        DiscountKind::Product => data.product_discounts,
        DiscountKind::Cart => data.cart_discounts,
    };
    page.ok_or_else(|| FetchError::Decode(format!("response has no {} discounts", kind)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PageState, SortKey, SortOrder, SortState};
    use serde_json::json;

    fn vars() -> QueryVariables {
        QueryVariables::new(
            &PageState::new(2, 20),
            &SortState::new(SortKey::CreatedAt, SortOrder::Desc),
        )
    }

    #[test]
    fn query_body_selects_collection_by_kind() {
        let product = build_query_body(DiscountKind::Product, &vars());
        let cart = build_query_body(DiscountKind::Cart, &vars());
        assert!(product["query"].as_str().unwrap().contains("productDiscounts("));
        assert!(cart["query"].as_str().unwrap().contains("cartDiscounts("));
        assert_eq!(product["variables"], cart["variables"]);
        assert_eq!(
            product["variables"],
            json!({ "limit": 20, "offset": 20, "sort": ["createdAt desc"] })
        );
    }

    #[test]
    fn build_request_targets_project_graphql_endpoint() {
        let client = CtpClient::with_token(
            "https://api.example.com",
            "shop-1",
            "token".into(),
        )
        .unwrap();
        let request = client.build_request(DiscountKind::Cart, &vars()).unwrap();
        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(request.url().path(), "/shop-1/graphql");
        let headers = request.headers();
        assert_eq!(
            headers
                .get("Authorization")
                .and_then(|h| h.to_str().ok())
                .unwrap(),
            "Bearer token"
        );
        assert_eq!(
            headers
                .get("Content-Type")
                .and_then(|h| h.to_str().ok())
                .unwrap(),
            "application/json"
        );
    }

    #[test]
    fn endpoint_urls_keep_base_path_prefix() {
        for api_url in ["https://proxy.example.com/ctp", "https://proxy.example.com/ctp/"] {
            let url = graphql_url(api_url, "shop-1").unwrap();
            assert_eq!(url.as_str(), "https://proxy.example.com/ctp/shop-1/graphql");
        }
        let token = join_url("https://auth.example.com/gateway", "oauth/token").unwrap();
        assert_eq!(token.as_str(), "https://auth.example.com/gateway/oauth/token");
        let token = join_url("https://auth.example.com", "oauth/token").unwrap();
        assert_eq!(token.as_str(), "https://auth.example.com/oauth/token");
        assert!(graphql_url("not a url", "shop-1").is_err());
    }

    #[test]
    fn page_from_response_surfaces_graphql_errors() {
        let payload: GraphQlResponse<DiscountsData> = serde_json::from_value(json!({
            "data": null,
            "errors": [{ "message": "insufficient scope" }, { "message": "try again" }]
        }))
        .unwrap();
        let err = page_from_response(DiscountKind::Product, payload).unwrap_err();
        assert_eq!(err.to_string(), "insufficient scope; try again");
    }

    #[test]
    fn page_from_response_requires_requested_collection() {
        let payload: GraphQlResponse<DiscountsData> = serde_json::from_value(json!({
            "data": { "productDiscounts": { "total": 0, "results": [] } }
        }))
        .unwrap();
        assert!(matches!(
            page_from_response(DiscountKind::Cart, payload),
            Err(FetchError::Decode(_))
        ));
    }
}
