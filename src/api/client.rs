//! HTTP client for the summarizer service.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::Summarizer;
use crate::error::{Result, WeftError};
use crate::graph::Tab;
use crate::settings::Settings;

/// An open tab as sent to the summarizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncTab {
    pub id: String,
    pub url: String,
    pub title: String,
    pub active: bool,
}

impl SyncTab {
    pub fn from_tab(tab: &Tab, active: bool) -> Self {
        Self {
            id: tab.id.clone(),
            url: tab.url.clone(),
            title: tab.display_title().to_string(),
            active,
        }
    }
}

#[derive(Debug, Serialize)]
struct SyncRequest<'a> {
    tabs: &'a [SyncTab],
}

#[derive(Debug, Deserialize)]
struct SyncResponse {
    insights: Option<String>,
}

pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(
            settings.summarizer_url.clone(),
            Duration::from_secs(settings.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check if the service is up
    pub fn health(&self) -> Result<bool> {
        let url = format!("{}/health", self.base_url);
        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| WeftError::RemoteSummary(format!("Failed to connect: {}", e)))?;

        if resp.status().is_success() {
            Ok(true)
        } else {
            Err(WeftError::RemoteSummary(format!(
                "Service returned status: {}",
                resp.status()
            )))
        }
    }

    /// Keep the client only if the service answers its health check.
    pub fn if_healthy(self) -> Option<Self> {
        match self.health() {
            Ok(_) => Some(self),
            Err(e) => {
                tracing::warn!("Summarizer at {} is down, skipping it: {}", self.base_url, e);
                None
            }
        }
    }

    /// Send the open tabs and return the report text
    pub fn sync(&self, tabs: &[SyncTab]) -> Result<String> {
        let url = format!("{}/sync", self.base_url);
        tracing::debug!("Syncing {} tabs to {}", tabs.len(), url);

        let resp = self
            .client
            .post(&url)
            .json(&SyncRequest { tabs })
            .send()
            .map_err(|e| WeftError::RemoteSummary(format!("Request failed: {}", e)))?;

        if !resp.status().is_success() {
            return Err(WeftError::RemoteSummary(format!(
                "Sync failed: {}",
                resp.status()
            )));
        }

        let body: SyncResponse = resp
            .json()
            .map_err(|e| WeftError::RemoteSummary(format!("Failed to parse response: {}", e)))?;

        body.insights
            .ok_or_else(|| WeftError::RemoteSummary("Response has no insights".to_string()))
    }
}

impl Summarizer for ApiClient {
    fn summarize(&self, tabs: &[SyncTab]) -> Result<String> {
        self.sync(tabs)
    }
}
