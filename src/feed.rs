use std::time::Duration;

use reqwest::blocking::Client as HttpClient;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::record::MediaRecord;

pub const DEFAULT_FEED_URL: &str = "https://cdn.jsdelivr.net/gh/GCA-Classroom/apod/data.json";

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("feed request failed with status {status}")]
    Network { status: u16 },
    #[error("feed request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("feed body is not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("feed payload must be a JSON array, found {found}")]
    InvalidShape { found: &'static str },
}

pub trait FeedSource: Send + Sync {
    fn load(&self) -> Result<Vec<MediaRecord>, LoadError>;
    fn location(&self) -> &str;
}

#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub url: String,
    pub user_agent: String,
    pub timeout: Option<Duration>,
    pub http_client: Option<HttpClient>,
}

pub struct HttpFeed {
    http: HttpClient,
    url: String,
    user_agent: String,
}

impl HttpFeed {
    pub fn new(config: ClientConfig) -> anyhow::Result<Self> {
        if config.url.trim().is_empty() {
            anyhow::bail!("feed url required");
        }
        let user_agent = if config.user_agent.trim().is_empty() {
            format!("apod-tui/{}", crate::VERSION)
        } else {
            config.user_agent
        };

        let http = match config.http_client {
            Some(client) => client,
            None => {
                let mut builder = HttpClient::builder();
                if let Some(timeout) = config.timeout.filter(|t| !t.is_zero()) {
                    builder = builder.timeout(timeout);
                }
                builder.build()?
            }
        };

        Ok(HttpFeed {
            http,
            url: config.url,
            user_agent,
        })
    }
}

impl FeedSource for HttpFeed {
    fn load(&self) -> Result<Vec<MediaRecord>, LoadError> {
        debug!(url = %self.url, "requesting feed");
        let response = self
            .http
            .get(&self.url)
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, "application/json")
            .send()
            .map_err(LoadError::Request)?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %self.url, status = status.as_u16(), "feed request rejected");
            return Err(LoadError::Network {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().map_err(LoadError::Request)?;
        let records = parse_feed(&body)?;
        info!(url = %self.url, count = records.len(), "feed loaded");
        Ok(records)
    }

    fn location(&self) -> &str {
        &self.url
    }
}

#[derive(Debug, Clone)]
pub struct StaticFeed {
    body: String,
}

impl StaticFeed {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }
}

impl FeedSource for StaticFeed {
    fn load(&self) -> Result<Vec<MediaRecord>, LoadError> {
        parse_feed(self.body.as_bytes())
    }

    fn location(&self) -> &str {
        "static"
    }
}

pub fn parse_feed(body: &[u8]) -> Result<Vec<MediaRecord>, LoadError> {
    let payload: Value = serde_json::from_slice(body).map_err(LoadError::Parse)?;
    match payload {
        Value::Array(items) => Ok(items.iter().map(MediaRecord::from_value).collect()),
        other => Err(LoadError::InvalidShape {
            found: json_kind(&other),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
