//! Blocking HTTP client for the planning backend. Owns the base URL and
//! bearer token; the engine sees it only as a [`BulkTransport`].

use anyhow::{Context, anyhow};
use reqwest::blocking::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use weekgrid_core::config::Config;
use weekgrid_core::model::{AssignmentInput, Preset, Schedule, Team};
use weekgrid_core::sync::{BulkTransport, SyncFailure};

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
    http: Client,
}

#[derive(Debug, Serialize)]
struct BulkBody<'a> {
    assignments: &'a [AssignmentInput],
}

/// Failure body the backend emits on non-2xx: `{ error, details }` where
/// `details` is a per-item array or a single string.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    details: Option<ErrorDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorDetails {
    Many(Vec<String>),
    One(String),
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> anyhow::Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = Client::builder()
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            base_url,
            token,
            http,
        })
    }

    pub fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        Self::new(cfg.backend_url(), cfg.backend_token())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[tracing::instrument(skip(self))]
    pub fn get_schedules(&self) -> anyhow::Result<Vec<Schedule>> {
        self.get_json("/schedules/current")
            .context("failed to fetch schedules")
    }

    #[tracing::instrument(skip(self))]
    pub fn get_teams(&self) -> anyhow::Result<Vec<Team>> {
        self.get_json("/teams").context("failed to fetch teams")
    }

    #[tracing::instrument(skip(self))]
    pub fn get_presets(&self) -> anyhow::Result<Vec<Preset>> {
        self.get_json("/presets").context("failed to fetch presets")
    }

    #[tracing::instrument(skip(self, preset), fields(label = %preset.label))]
    pub fn create_preset(&self, preset: &Preset) -> anyhow::Result<Preset> {
        let response = self
            .authorized(self.http.post(self.url("/presets")))
            .json(preset)
            .send()
            .context("failed to create preset")?;
        let response = check_status(response)?;
        response.json().context("invalid preset in response")
    }

    #[tracing::instrument(skip(self, preset), fields(label = %preset.label))]
    pub fn update_preset(&self, id: &str, preset: &Preset) -> anyhow::Result<Preset> {
        let response = self
            .authorized(self.http.put(self.url(&format!("/presets/{id}"))))
            .json(preset)
            .send()
            .context("failed to update preset")?;
        let response = check_status(response)?;
        response.json().context("invalid preset in response")
    }

    #[tracing::instrument(skip(self))]
    pub fn delete_preset(&self, id: &str) -> anyhow::Result<()> {
        let response = self
            .authorized(self.http.delete(self.url(&format!("/presets/{id}"))))
            .send()
            .context("failed to delete preset")?;
        check_status(response)?;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> anyhow::Result<T> {
        let url = self.url(path);
        debug!(url = %url, "GET");
        let response = self
            .authorized(self.http.get(&url))
            .send()
            .with_context(|| format!("request to {url} failed"))?;
        let response = check_status(response)?;
        response
            .json()
            .with_context(|| format!("invalid JSON from {url}"))
    }
}

impl BulkTransport for ApiClient {
    #[tracing::instrument(skip(self, assignments), fields(count = assignments.len()))]
    fn post_bulk(&self, assignments: &[AssignmentInput]) -> Result<(), SyncFailure> {
        let url = self.url("/assignments/bulk");
        let response = self
            .authorized(self.http.post(&url))
            .json(&BulkBody { assignments })
            .send()
            .map_err(|err| SyncFailure::Network(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().unwrap_or_default();
        warn!(status = %status, "bulk update rejected");
        Err(decode_failure(status.as_u16(), &body))
    }
}

fn check_status(response: reqwest::blocking::Response) -> anyhow::Result<reqwest::blocking::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    let failure = decode_failure(status.as_u16(), &body);
    Err(anyhow!("{}", failure.message()))
}

/// Turn a non-2xx body into one human-readable message: joined `details`
/// when present, else `error`, else a generic status line.
fn decode_failure(status: u16, body: &str) -> SyncFailure {
    let parsed: Option<ErrorBody> = serde_json::from_str(body).ok();
    let message = parsed
        .and_then(|err_body| match err_body.details {
            Some(ErrorDetails::Many(items)) if !items.is_empty() => Some(items.join("; ")),
            Some(ErrorDetails::One(item)) if !item.is_empty() => Some(item),
            _ => err_body.error.filter(|e| !e.is_empty()),
        })
        .unwrap_or_else(|| format!("request failed with status {status}"));
    SyncFailure::Validation(message)
}
