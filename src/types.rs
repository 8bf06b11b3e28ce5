use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tabled::Tabled;

pub const DEFAULT_QUOTA_LIMIT: u64 = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Token pair returned by the login endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortenRequest {
    pub original_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortenResponse {
    pub short_url: String,
    #[serde(default)]
    pub short_code: Option<String>,
    #[serde(default)]
    pub original_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUrlRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkRequest {
    pub short_codes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortUrl {
    pub short_code: String,
    pub original_url: String,
    #[serde(default)]
    pub short_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub visit_count: u64,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl ShortUrl {
    /// The public short URL, built from `base_url` when the API omitted it.
    pub fn resolved_short_url(&self, base_url: &str) -> String {
        match &self.short_url {
            Some(url) if !url.is_empty() => url.clone(),
            _ => format!("{}/{}", base_url.trim_end_matches('/'), self.short_code),
        }
    }

    /// Creation day as `YYYY-MM-DD`, or the raw value if it isn't RFC 3339.
    pub fn created_day(&self) -> String {
        match &self.created_at {
            Some(raw) => DateTime::parse_from_rfc3339(raw)
                .map(|t| t.with_timezone(&Utc).format("%Y-%m-%d").to_string())
                .unwrap_or_else(|_| raw.clone()),
            None => String::new(),
        }
    }
}

#[derive(Tabled)]
pub struct UrlTableRow {
    pub code: String,
    pub short_url: String,
    pub original_url: String,
    pub created: String,
    pub visits: u64,
    pub active: String,
}

/// Aggregate account metrics from `GET /user/stats/`.
///
/// Every field is optional on the wire; missing values read as zero, and a
/// missing quota limit reads as [`DEFAULT_QUOTA_LIMIT`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserStats {
    #[serde(default)]
    pub total_urls: u64,
    #[serde(default)]
    pub total_active_urls: u64,
    #[serde(default)]
    pub total_visits: u64,
    #[serde(default)]
    pub quota_used: u64,
    #[serde(default)]
    pub quota_limit: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatsSummary {
    pub total_urls: u64,
    pub active_urls: u64,
    pub inactive_urls: u64,
    pub total_visits: u64,
    pub average_visits: f64,
    pub quota_used: u64,
    pub quota_limit: u64,
    pub quota_percent: f64,
}

impl UserStats {
    pub fn summary(&self) -> StatsSummary {
        let quota_limit = match self.quota_limit {
            Some(limit) if limit > 0 => limit,
            _ => DEFAULT_QUOTA_LIMIT,
        };
        let average_visits = if self.total_urls > 0 {
            round_one_decimal(self.total_visits as f64 / self.total_urls as f64)
        } else {
            0.0
        };

        StatsSummary {
            total_urls: self.total_urls,
            active_urls: self.total_active_urls,
            inactive_urls: self.total_urls.saturating_sub(self.total_active_urls),
            total_visits: self.total_visits,
            average_visits,
            quota_used: self.quota_used,
            quota_limit,
            quota_percent: round_one_decimal(self.quota_used as f64 * 100.0 / quota_limit as f64),
        }
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[derive(Tabled)]
pub struct MetricTableRow {
    pub metric: String,
    pub value: String,
}

/// Per-URL analytics; the shape is owned by the server, so it stays loose.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UrlAnalytics(pub Value);

impl UrlAnalytics {
    /// Flattens top-level scalar fields into printable rows.
    pub fn rows(&self) -> Vec<MetricTableRow> {
        match &self.0 {
            Value::Object(map) => {
                let mut rows: Vec<MetricTableRow> = map
                    .iter()
                    .map(|(key, value)| MetricTableRow {
                        metric: key.replace('_', " "),
                        value: match value {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        },
                    })
                    .collect();
                rows.sort_by(|a, b| a.metric.cmp(&b.metric));
                rows
            }
            other => vec![MetricTableRow {
                metric: "value".to_string(),
                value: other.to_string(),
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub id: Option<Value>,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub date_joined: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none() && self.bio.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}
