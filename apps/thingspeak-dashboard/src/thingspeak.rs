use anyhow::{anyhow, Context, Result};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use tokio::time::sleep;
use tracing::{debug, warn};
use url::Url;

use crate::config::ThingSpeakSettings;

/// One record of a channel feed. ThingSpeak names its measurement columns
/// `field1`..`field8`; everything besides `created_at` and `entry_id` lands in
/// `fields` untouched. A missing or non-string `created_at` becomes `None`
/// rather than failing the whole feed.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedEntry {
    #[serde(default, deserialize_with = "string_or_none")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub entry_id: Option<u64>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, JsonValue>,
}

impl FeedEntry {
    pub fn new<'a>(
        created_at: impl Into<String>,
        fields: impl IntoIterator<Item = (&'a str, JsonValue)>,
    ) -> Self {
        Self {
            created_at: Some(created_at.into()),
            entry_id: None,
            fields: fields
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&JsonValue> {
        self.fields.get(name)
    }
}

fn string_or_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match JsonValue::deserialize(deserializer)? {
        JsonValue::String(value) => Some(value),
        _ => None,
    })
}

/// Channel metadata returned alongside the feed. Only the name is logged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChannelInfo {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelFeed {
    #[serde(default)]
    pub channel: Option<ChannelInfo>,
    pub feeds: Vec<FeedEntry>,
}

#[derive(Debug)]
struct StatusError(StatusCode);

impl std::fmt::Display for StatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ThingSpeak returned HTTP {}", self.0)
    }
}

impl std::error::Error for StatusError {}

#[derive(Clone)]
pub struct ThingSpeakClient {
    http: Client,
    settings: ThingSpeakSettings,
    feeds_url: Url,
}

impl ThingSpeakClient {
    pub fn new(http: Client, settings: ThingSpeakSettings) -> Result<Self> {
        let feeds_url = build_feeds_url(&settings)?;
        Ok(Self {
            http,
            settings,
            feeds_url,
        })
    }

    pub async fn fetch_feed(&self) -> Result<ChannelFeed> {
        let retry = &self.settings.retry;
        let max_attempts = retry.max_attempts.max(1);
        let mut attempt = 0u32;
        loop {
            if attempt > 0 {
                sleep(retry.delay_for(attempt)).await;
            }
            attempt += 1;

            match self.fetch_feed_once().await {
                Ok(feed) => {
                    debug!(
                        channel_id = %self.settings.channel_id,
                        channel = feed
                            .channel
                            .as_ref()
                            .and_then(|channel| channel.name.as_deref())
                            .unwrap_or_default(),
                        entries = feed.feeds.len(),
                        attempt,
                        "fetched ThingSpeak feed"
                    );
                    return Ok(feed);
                }
                Err(err) => {
                    warn!(
                        channel_id = %self.settings.channel_id,
                        attempt,
                        max_attempts,
                        "ThingSpeak fetch failed: {err:#}"
                    );
                    if attempt >= max_attempts || !is_retryable(&err) {
                        return Err(err);
                    }
                }
            }
        }
    }

    pub async fn fetch_feeds(&self) -> Result<Vec<FeedEntry>> {
        Ok(self.fetch_feed().await?.feeds)
    }

    async fn fetch_feed_once(&self) -> Result<ChannelFeed> {
        let response = self
            .http
            .get(self.feeds_url.clone())
            .send()
            .await
            .map_err(|err| err.without_url())
            .context("ThingSpeak request failed")?;

        let status = response.status();
        if !status.is_success() {
            return Err(StatusError(status).into());
        }

        response
            .json::<ChannelFeed>()
            .await
            .map_err(|err| err.without_url())
            .context("Failed to decode ThingSpeak feed response")
    }
}

fn is_retryable(err: &anyhow::Error) -> bool {
    match err.downcast_ref::<StatusError>() {
        Some(StatusError(status)) => !status.is_client_error(),
        None => true,
    }
}

fn build_feeds_url(settings: &ThingSpeakSettings) -> Result<Url> {
    let mut url = settings.base_url.clone();
    url.path_segments_mut()
        .map_err(|_| anyhow!("ThingSpeak base URL cannot carry a path"))?
        .pop_if_empty()
        .extend(["channels", settings.channel_id.as_str(), "feeds.json"]);
    url.query_pairs_mut()
        .clear()
        .append_pair("api_key", &settings.read_api_key)
        .append_pair("results", &settings.results.to_string());
    Ok(url)
}
