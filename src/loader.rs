//! Read-only project gallery fed from the projects slot or a remote document.
//!
//! The source is chosen explicitly by the caller; there is no fallback from
//! one to the other. A successful remote load overwrites the projects slot
//! with the fetched list before it is displayed.

use std::fmt::Write as _;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::card::ProjectCard;
use crate::html::escape;
use crate::record::{records_from_values, ProjectRecord};
use crate::storage::{SlotError, StoreHandle, PROJECTS_KEY};
use crate::theme::{Theme, ThemeSurface};

/// Header carrying the remote store's access credential.
pub const ACCESS_KEY_HEADER: &str = "X-Access-Key";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("No data found in storage. Please load from remote first or add data manually.")]
    Absent,
    #[error("Failed to load from storage: {0}")]
    Storage(#[source] SlotError),
    #[error("Failed to load from storage: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("Invalid data format in storage. Expected an array.")]
    NotAList,
    #[error("No remote endpoint is configured.")]
    RemoteNotConfigured,
    #[error("Failed to load from remote: HTTP error! Status: {0}")]
    RemoteStatus(u16),
    #[error("Failed to load from remote: Invalid data format from JSONBin. Expected an array.")]
    RemoteNotAList,
    #[error("Failed to load from remote: {0}")]
    RemoteTransport(#[source] reqwest::Error),
    #[error("Failed to load from remote: {0}")]
    RemoteBody(#[source] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Local,
    Remote,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSource {
    pub url: String,
    pub access_key: Option<String>,
    pub timeout: Option<Duration>,
}

impl RemoteSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            access_key: None,
            timeout: None,
        }
    }

    pub fn with_access_key(mut self, key: impl Into<String>) -> Self {
        self.access_key = Some(key.into());
        self
    }
}

/// Read the projects slot, distinguishing absent, malformed and mis-shaped
/// data.
pub fn load_local(slots: &StoreHandle) -> Result<Vec<ProjectRecord>, LoadError> {
    let raw = slots
        .get(PROJECTS_KEY)
        .map_err(LoadError::Storage)?
        .filter(|raw| !raw.is_empty())
        .ok_or(LoadError::Absent)?;
    let document: Value = serde_json::from_str(&raw).map_err(LoadError::Malformed)?;
    match document {
        Value::Array(values) => Ok(records_from_values(values)),
        _ => Err(LoadError::NotAList),
    }
}

/// Pull the record list out of a response body: either the bare array, or
/// an object carrying it under `record`.
pub fn extract_records(document: Value) -> Result<Vec<Value>, LoadError> {
    let list = match document {
        Value::Object(mut map) => match map.remove("record") {
            Some(record) if !is_falsy(&record) => record,
            _ => Value::Object(map),
        },
        other => other,
    };
    match list {
        Value::Array(values) => Ok(values),
        _ => Err(LoadError::RemoteNotAList),
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

pub fn build_client(source: &RemoteSource) -> Result<reqwest::Client, LoadError> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = source.timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().map_err(LoadError::RemoteTransport)
}

/// Fetch the remote document and cache the extracted list in the projects
/// slot. A failed cache write is logged and does not fail the load.
pub async fn load_remote(
    client: &reqwest::Client,
    source: &RemoteSource,
    slots: &StoreHandle,
) -> Result<Vec<ProjectRecord>, LoadError> {
    let mut request = client
        .get(&source.url)
        .header(CONTENT_TYPE, "application/json");
    if let Some(key) = &source.access_key {
        request = request.header(ACCESS_KEY_HEADER, key);
    }

    let response = request.send().await.map_err(LoadError::RemoteTransport)?;
    let status = response.status();
    if !status.is_success() {
        warn!(
            target: "folio",
            event = "remote_load_failed",
            status = status.as_u16(),
            url = %source.url
        );
        return Err(LoadError::RemoteStatus(status.as_u16()));
    }

    let body = response.bytes().await.map_err(LoadError::RemoteTransport)?;
    let document: Value = serde_json::from_slice(&body).map_err(LoadError::RemoteBody)?;
    let values = extract_records(document)?;

    match serde_json::to_string(&values) {
        Ok(payload) => {
            if let Err(err) = slots.set(PROJECTS_KEY, &payload) {
                warn!(target: "folio", event = "remote_cache_failed", error = %err);
            }
        }
        Err(err) => warn!(target: "folio", event = "remote_cache_failed", error = %err),
    }

    let records = records_from_values(values);
    info!(
        target: "folio",
        event = "remote_loaded",
        count = records.len(),
        url = %source.url
    );
    Ok(records)
}

/// Loads from either source on demand.
pub struct Loader {
    slots: StoreHandle,
    remote: Option<(RemoteSource, reqwest::Client)>,
}

impl Loader {
    pub fn new(slots: StoreHandle, remote: Option<RemoteSource>) -> Result<Self, LoadError> {
        let remote = match remote {
            Some(source) => {
                let client = build_client(&source)?;
                Some((source, client))
            }
            None => None,
        };
        Ok(Self { slots, remote })
    }

    pub fn local(&self) -> Result<Vec<ProjectRecord>, LoadError> {
        load_local(&self.slots)
    }

    pub async fn remote(&self) -> Result<Vec<ProjectRecord>, LoadError> {
        let (source, client) = self.remote.as_ref().ok_or(LoadError::RemoteNotConfigured)?;
        load_remote(client, source, &self.slots).await
    }

    pub async fn load(&self, source: Source) -> Result<Vec<ProjectRecord>, LoadError> {
        match source {
            Source::Local => self.local(),
            Source::Remote => self.remote().await,
        }
    }

    /// Show the loading state, load, then display the outcome.
    pub async fn load_into(&self, source: Source, gallery: &mut Gallery) {
        gallery.begin_loading();
        let result = self.load(source).await;
        present(source, result, gallery);
    }
}

/// Display a finished load, logging failures.
pub fn present(
    source: Source,
    result: Result<Vec<ProjectRecord>, LoadError>,
    gallery: &mut Gallery,
) {
    if let Err(err) = &result {
        warn!(target: "folio", event = "gallery_load_failed", source = ?source, error = %err);
    }
    gallery.show(result);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Idle,
    Loading,
    Cards,
    Empty,
    Failed(String),
}

/// The display container for loaded projects.
#[derive(Debug, Clone)]
pub struct Gallery {
    state: ViewState,
    cards: Vec<ProjectCard>,
    theme: Theme,
}

impl Gallery {
    pub fn new(theme: Theme) -> Self {
        Self {
            state: ViewState::Idle,
            cards: Vec::new(),
            theme,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn cards(&self) -> &[ProjectCard] {
        &self.cards
    }

    pub fn begin_loading(&mut self) {
        self.cards.clear();
        self.state = ViewState::Loading;
    }

    pub fn show(&mut self, result: Result<Vec<ProjectRecord>, LoadError>) {
        match result {
            Ok(records) => self.render_cards(&records),
            Err(err) => self.show_error(err.to_string()),
        }
    }

    pub fn render_cards(&mut self, records: &[ProjectRecord]) {
        self.cards = records
            .iter()
            .enumerate()
            .map(|(position, record)| ProjectCard::from_record(record, position, self.theme))
            .collect();
        self.state = if self.cards.is_empty() {
            ViewState::Empty
        } else {
            ViewState::Cards
        };
    }

    pub fn show_error(&mut self, message: impl Into<String>) {
        self.cards.clear();
        self.state = ViewState::Failed(message.into());
    }

    pub fn render(&self) -> String {
        match &self.state {
            ViewState::Idle => String::new(),
            ViewState::Loading => concat!(
                "<div class=\"loading-container\">",
                "<div class=\"loading-bar-wrapper\"><div class=\"loading-bar\"></div></div>",
                "<p class=\"loading-text\">Loading projects...</p>",
                "</div>"
            )
            .to_string(),
            ViewState::Empty => error_block("No projects found in the data."),
            ViewState::Failed(message) => error_block(message),
            ViewState::Cards => {
                let mut out = String::new();
                for card in &self.cards {
                    out.push_str(&card.to_html());
                }
                out
            }
        }
    }
}

impl ThemeSurface for Gallery {
    fn set_variant(&mut self, theme: Theme) {
        self.theme = theme;
        for card in &mut self.cards {
            card.set_variant(theme);
        }
    }
}

fn error_block(message: &str) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "<div class=\"error-container\"><p class=\"error-icon\">&#9888;</p><p class=\"error-message\">{}</p></div>",
        escape(message)
    );
    out
}
