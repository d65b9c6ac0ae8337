//! Configuration loader and validator for the discounts overview.
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::locale::LocaleContext;
use crate::model::PER_PAGE_RANGE;

/// Overrides `ctp.client_secret` when set.
pub const CLIENT_SECRET_ENV: &str = "CTP_CLIENT_SECRET";

static PROJECT_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9_-]{2,36}$").expect("valid project key regex"));

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub app: App,
    pub ctp: Ctp,
}

/// Display settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct App {
    pub page_size: u32,
    pub data_locale: String,
    /// Project languages, in fallback order.
    #[serde(default)]
    pub languages: Vec<String>,
}

/// Project and API client credentials.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ctp {
    pub project_key: String,
    pub api_url: String,
    pub auth_url: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
}

fn default_scopes() -> Vec<String> {
    vec!["view_products".into(), "view_cart_discounts".into()]
}

impl Config {
    pub fn locale_context(&self) -> LocaleContext {
        LocaleContext::new(self.app.data_locale.clone(), self.app.languages.clone())
    }
}

/// Load configuration from a YAML file and validate it.
/// - If `path` is None, uses `config.yaml` in the current working directory.
/// - `CTP_CLIENT_SECRET` from the environment replaces the file's secret.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new("config.yaml"));
    let content = fs::read_to_string(path)?;
    let mut cfg: Config = serde_yaml::from_str(&content)?;
    if let Ok(secret) = std::env::var(CLIENT_SECRET_ENV) {
        if !secret.trim().is_empty() {
            cfg.ctp.client_secret = secret;
        }
    }
    validate(&cfg)?;
    Ok(cfg)
}

/// Validate a configuration instance.
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if !PER_PAGE_RANGE.contains(&cfg.app.page_size) {
        return Err(ConfigError::Invalid("app.page_size must be 20 or 50"));
    }
    if cfg.app.data_locale.trim().is_empty() {
        return Err(ConfigError::Invalid("app.data_locale must be non-empty"));
    }
    if cfg.app.languages.iter().any(|l| l.trim().is_empty()) {
        return Err(ConfigError::Invalid("app.languages must not contain empty entries"));
    }

    if !PROJECT_KEY_RE.is_match(&cfg.ctp.project_key) {
        return Err(ConfigError::Invalid(
            "ctp.project_key must be 2-36 lowercase letters, digits, '-' or '_'",
        ));
    }
    if Url::parse(&cfg.ctp.api_url).is_err() {
        return Err(ConfigError::Invalid("ctp.api_url must be a valid URL"));
    }
    if Url::parse(&cfg.ctp.auth_url).is_err() {
        return Err(ConfigError::Invalid("ctp.auth_url must be a valid URL"));
    }
    if cfg.ctp.client_id.trim().is_empty() {
        return Err(ConfigError::Invalid("ctp.client_id must be non-empty"));
    }
    if cfg.ctp.client_secret.trim().is_empty() {
        return Err(ConfigError::Invalid("ctp.client_secret must be non-empty"));
    }
    if cfg.ctp.scopes.is_empty() {
        return Err(ConfigError::Invalid("ctp.scopes must list at least one scope"));
    }

    Ok(())
}

/// Returns the canonical example YAML content.
pub fn example() -> &'static str {
    r#"app:
  page_size: 20
  data_locale: "en"
  languages:
    - "en"
    - "de"

ctp:
  project_key: "my-project"
  api_url: "https://api.us-central1.gcp.commercetools.com"
  auth_url: "https://auth.us-central1.gcp.commercetools.com"
  client_id: "YOUR_CLIENT_ID"
  client_secret: "YOUR_CLIENT_SECRET"
  scopes:
    - "view_products"
    - "view_cart_discounts"
"#
}
