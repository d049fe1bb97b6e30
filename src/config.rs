//! Tap configuration
//!
//! The JSON (or YAML) document passed with `--config`. Credentials are
//! required; everything else has a default matching the Amazon Ads NA
//! marketplace.

use crate::error::{Error, Result};
use crate::streams::Selection;
use crate::types::AdProduct;
use crate::validate::{parse_date, parse_date_time};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::Path;

/// Default page size for list and report requests
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Largest page size Amazon Ads accepts
pub const MAX_PAGE_SIZE: usize = 1000;

// ============================================================================
// Region
// ============================================================================

/// Amazon Ads API region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Region {
    /// North America
    #[default]
    NA,
    /// Europe
    EU,
    /// Far East
    FE,
}

impl Region {
    /// Advertising API base URL
    pub fn api_url(self) -> &'static str {
        match self {
            Region::NA => "https://advertising-api.amazon.com",
            Region::EU => "https://advertising-api-eu.amazon.com",
            Region::FE => "https://advertising-api-fe.amazon.com",
        }
    }

    /// Login with Amazon token endpoint
    pub fn token_url(self) -> &'static str {
        match self {
            Region::NA => "https://api.amazon.com/auth/o2/token",
            Region::EU => "https://api.amazon.co.uk/auth/o2/token",
            Region::FE => "https://api.amazon.co.jp/auth/o2/token",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Region::NA => write!(f, "NA"),
            Region::EU => write!(f, "EU"),
            Region::FE => write!(f, "FE"),
        }
    }
}

// ============================================================================
// Tap Config
// ============================================================================

/// Tap configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct TapConfig {
    /// Login with Amazon client id
    #[serde(default)]
    pub client_id: String,

    /// Login with Amazon client secret
    #[serde(default)]
    pub client_secret: String,

    /// Long-lived refresh token
    #[serde(default)]
    pub refresh_token: String,

    /// Advertiser profile, sent as the API scope header
    #[serde(default, deserialize_with = "string_or_number")]
    pub profile_id: String,

    /// API region
    #[serde(default)]
    pub region: Region,

    /// Earliest date to request reports for
    #[serde(default = "default_start_date")]
    pub start_date: String,

    /// User-Agent header value
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Records requested per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Stream/property selection patterns (`stream.property`, `*` globs)
    #[serde(rename = "_select", default = "default_select")]
    pub select: Vec<String>,

    /// Ad product to extract entities for
    #[serde(default)]
    pub ad_product: AdProduct,

    /// Override for the token endpoint
    #[serde(default)]
    pub auth_endpoint: Option<String>,

    /// Override for the API base URL
    #[serde(default)]
    pub api_url: Option<String>,
}

fn default_start_date() -> String {
    "2023-01-01T00:00:00Z".to_string()
}

fn default_user_agent() -> String {
    "tap-amazonads".to_string()
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_select() -> Vec<String> {
    vec!["*.*".to_string()]
}

/// Profile ids are numeric in the Amazon console and often pasted as numbers
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

impl TapConfig {
    /// Load and validate a config file. `.yaml`/`.yml` files are parsed as
    /// YAML, anything else as JSON.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

        if is_yaml {
            Self::from_yaml_str(&content)
        } else {
            Self::from_json_str(&content)
        }
    }

    /// Parse and validate a JSON config
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a YAML config
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check required fields and value ranges
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("refresh_token", &self.refresh_token),
            ("profile_id", &self.profile_id),
        ] {
            if value.trim().is_empty() {
                return Err(Error::missing_field(field));
            }
        }

        if !(1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(Error::invalid_value(
                "page_size",
                format!("must be between 1 and {MAX_PAGE_SIZE}, got {}", self.page_size),
            ));
        }

        self.start_date()?;

        if self.select.is_empty() {
            return Err(Error::invalid_value("_select", "must not be empty"));
        }
        Selection::parse(&self.select)?;

        for (field, value) in [("auth_endpoint", &self.auth_endpoint), ("api_url", &self.api_url)] {
            if let Some(url) = value {
                url::Url::parse(url)
                    .map_err(|e| Error::invalid_value(field, format!("{url}: {e}")))?;
            }
        }

        Ok(())
    }

    /// Parsed start date
    pub fn start_date(&self) -> Result<DateTime<Utc>> {
        parse_date_time(&self.start_date)
            .or_else(|| {
                parse_date(&self.start_date)
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .map(|t| t.and_utc())
            })
            .ok_or_else(|| {
                Error::invalid_value("start_date", format!("not a date-time: {}", self.start_date))
            })
    }

    /// API base URL, honouring the override
    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(self.region.api_url())
    }

    /// Token endpoint, honouring the override
    pub fn token_url(&self) -> &str {
        self.auth_endpoint
            .as_deref()
            .unwrap_or(self.region.token_url())
    }
}

impl fmt::Debug for TapConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TapConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("profile_id", &self.profile_id)
            .field("region", &self.region)
            .field("start_date", &self.start_date)
            .field("user_agent", &self.user_agent)
            .field("page_size", &self.page_size)
            .field("select", &self.select)
            .field("ad_product", &self.ad_product)
            .field("auth_endpoint", &self.auth_endpoint)
            .field("api_url", &self.api_url)
            .finish()
    }
}
