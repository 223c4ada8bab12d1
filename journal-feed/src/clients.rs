#![doc = "HTTP implementations of the core source client traits."]
//
//! # Source clients (CLI <-> Core)
//!
//! Bridges the async traits in [`journal_feed_core::contract`] to the real
//! upstream APIs with `reqwest`. One client per source; each is built from its
//! config section plus secrets read from the environment:
//!
//! - `TABLE_STORE_API_KEY`: sent as `x-api-key` to the table gateway, if set
//! - `CHANNEL_TOKEN`: bearer token for the channel history API (required)
//! - `COMMIT_LOG_TOKEN`: bearer token for the commit API, if set
//!
//! A missing required secret does not abort construction. The fetch for that
//! source fails instead, so the rest of the journal is still assembled.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::env;

use journal_feed_core::contract::{
    AnnotatedEntryClient, ChannelClient, CommitLogClient, FetchError, Sources, TableStoreClient,
};
use journal_feed_core::normalize::{AnnotatedFeed, ChannelHistory, CommitItem, TableScan};

use crate::load_config::{
    AnnotatedEntrySection, ChannelSection, CommitLogSection, SourcesSection, TableStoreSection,
};

const USER_AGENT: &str = concat!("journal-feed/", env!("CARGO_PKG_VERSION"));

/// Query parameter format for the commit listing bounds.
const COMMIT_BOUND_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Send `req` and decode a JSON body, treating any non-2xx status as a failure.
async fn get_json<T: DeserializeOwned>(req: RequestBuilder, url: &str) -> Result<T, FetchError> {
    let resp = req.send().await.map_err(|e| {
        tracing::error!(error = ?e, url = %url, "Request failed");
        e
    })?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp
            .text()
            .await
            .unwrap_or_else(|_| String::from("<Failed to decode response body>"));
        tracing::error!(status = %status, url = %url, "API returned error. Response body: {body}");
        return Err(format!("GET {url} returned {status}").into());
    }
    let payload = resp.json::<T>().await.map_err(|e| {
        tracing::error!(error = ?e, url = %url, "Failed to parse response JSON");
        e
    })?;
    Ok(payload)
}

fn secret_from_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path)
}

pub struct TableStoreHttpClient {
    http: Client,
    section: TableStoreSection,
    api_key: Option<String>,
}

impl TableStoreHttpClient {
    pub fn new_from_env(http: Client, section: TableStoreSection) -> Self {
        let api_key = secret_from_env("TABLE_STORE_API_KEY");
        tracing::info!(
            table = %section.table,
            api_key_set = api_key.is_some(),
            "Initialized table store client from environment"
        );
        Self {
            http,
            section,
            api_key,
        }
    }
}

#[async_trait]
impl TableStoreClient for TableStoreHttpClient {
    async fn scan_day(&self, query_key: &str) -> Result<TableScan, FetchError> {
        let url = endpoint(
            &self.section.base_url,
            &format!("tables/{}/items", self.section.table),
        );
        tracing::info!(url = %url, date = query_key, "Scanning table store");
        let mut req = self.http.get(&url).query(&[("date", query_key)]);
        if let Some(key) = &self.api_key {
            req = req.header("x-api-key", key);
        }
        let scan: TableScan = get_json(req, &url).await?;
        tracing::info!(items = scan.items.len(), "Fetched table store rows");
        Ok(scan)
    }
}

pub struct ChannelHttpClient {
    http: Client,
    section: ChannelSection,
    token: Option<String>,
}

impl ChannelHttpClient {
    pub fn new_from_env(http: Client, section: ChannelSection) -> Self {
        let token = secret_from_env("CHANNEL_TOKEN");
        if token.is_none() {
            tracing::warn!("CHANNEL_TOKEN missing in environment, channel fetch will fail");
        }
        tracing::info!(channel_id = %section.channel_id, "Initialized channel client from environment");
        Self {
            http,
            section,
            token,
        }
    }
}

#[async_trait]
impl ChannelClient for ChannelHttpClient {
    async fn history(&self, oldest: i64, latest: i64) -> Result<ChannelHistory, FetchError> {
        let token = self
            .token
            .as_deref()
            .ok_or("CHANNEL_TOKEN missing in environment")?;
        let url = endpoint(&self.section.base_url, "conversations.history");
        tracing::info!(url = %url, oldest, latest, "Fetching channel history");
        let req = self.http.get(&url).bearer_auth(token).query(&[
            ("channel", self.section.channel_id.clone()),
            ("oldest", oldest.to_string()),
            ("latest", latest.to_string()),
            ("inclusive", "true".to_string()),
            ("limit", self.section.page_size.to_string()),
        ]);
        let history: ChannelHistory = get_json(req, &url).await?;
        if history.ok == Some(false) {
            let reason = history.error.as_deref().unwrap_or("unknown error");
            tracing::error!(url = %url, error = reason, "Channel API reported failure");
            return Err(format!("channel API error: {reason}").into());
        }
        tracing::info!(messages = history.messages.len(), "Fetched channel history");
        Ok(history)
    }
}

pub struct CommitLogHttpClient {
    http: Client,
    section: CommitLogSection,
    token: Option<String>,
}

impl CommitLogHttpClient {
    pub fn new_from_env(http: Client, section: CommitLogSection) -> Self {
        let token = secret_from_env("COMMIT_LOG_TOKEN");
        tracing::info!(
            owner = %section.owner,
            repo = %section.repo,
            token_set = token.is_some(),
            "Initialized commit log client from environment"
        );
        Self {
            http,
            section,
            token,
        }
    }
}

#[async_trait]
impl CommitLogClient for CommitLogHttpClient {
    async fn commits(
        &self,
        since: NaiveDateTime,
        until: NaiveDateTime,
    ) -> Result<Vec<CommitItem>, FetchError> {
        let url = endpoint(
            &self.section.base_url,
            &format!("repos/{}/{}/commits", self.section.owner, self.section.repo),
        );
        let since = since.format(COMMIT_BOUND_FORMAT).to_string();
        let until = until.format(COMMIT_BOUND_FORMAT).to_string();
        tracing::info!(url = %url, since = %since, until = %until, "Fetching commits");
        let mut req = self
            .http
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .query(&[("since", since), ("until", until)]);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let commits: Vec<CommitItem> = get_json(req, &url).await?;
        tracing::info!(commits = commits.len(), "Fetched commits");
        Ok(commits)
    }
}

pub struct AnnotatedEntryHttpClient {
    http: Client,
    section: AnnotatedEntrySection,
}

impl AnnotatedEntryHttpClient {
    pub fn new(http: Client, section: AnnotatedEntrySection) -> Self {
        Self { http, section }
    }
}

#[async_trait]
impl AnnotatedEntryClient for AnnotatedEntryHttpClient {
    async fn entries(&self) -> Result<AnnotatedFeed, FetchError> {
        let url = &self.section.url;
        tracing::info!(url = %url, "Fetching annotated entries");
        let feed: AnnotatedFeed = get_json(self.http.get(url), url).await?;
        tracing::info!(entries = feed.entries.len(), "Fetched annotated entries");
        Ok(feed)
    }
}

/// The HTTP clients for every configured source.
#[derive(Default)]
pub struct HttpSources {
    pub table_store: Option<TableStoreHttpClient>,
    pub channel: Option<ChannelHttpClient>,
    pub commit_log: Option<CommitLogHttpClient>,
    pub annotated: Option<AnnotatedEntryHttpClient>,
}

impl HttpSources {
    pub fn from_config(section: &SourcesSection) -> anyhow::Result<Self> {
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            table_store: section
                .table_store
                .clone()
                .map(|s| TableStoreHttpClient::new_from_env(http.clone(), s)),
            channel: section
                .channel
                .clone()
                .map(|s| ChannelHttpClient::new_from_env(http.clone(), s)),
            commit_log: section
                .commit_log
                .clone()
                .map(|s| CommitLogHttpClient::new_from_env(http.clone(), s)),
            annotated: section
                .annotated_entry
                .clone()
                .map(|s| AnnotatedEntryHttpClient::new(http.clone(), s)),
        })
    }

    pub fn as_sources(&self) -> Sources<'_> {
        Sources {
            table_store: self
                .table_store
                .as_ref()
                .map(|c| c as &dyn TableStoreClient),
            channel: self.channel.as_ref().map(|c| c as &dyn ChannelClient),
            commit_log: self.commit_log.as_ref().map(|c| c as &dyn CommitLogClient),
            annotated: self
                .annotated
                .as_ref()
                .map(|c| c as &dyn AnnotatedEntryClient),
        }
    }
}
