//! Container catalog collaborators.
//!
//! The sizing engine never reads storage itself: a `ContainerCatalog` lists
//! the active containers once per request. Raw rows are validated here, so
//! the engine only ever sees typed, consistent `Container`s.
//!
//! An empty list means "no containers configured"; any failure to read the
//! source is a `CatalogError` and must reach the caller as such.

use std::cmp::Ordering;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::model::{Container, ContainerKind, ValidationError};

/// Failure to read the container catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog file {path} could not be read: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("catalog service answered with status {0}")]
    Status(u16),
    #[error("catalog data could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("catalog row '{id}' is invalid: {source}")]
    InvalidRow {
        id: String,
        #[source]
        source: ValidationError,
    },
}

/// Source of the active shipping containers.
#[async_trait]
pub trait ContainerCatalog: Send + Sync {
    /// Lists active containers, ordered by priority (desc) then interior length (asc).
    async fn list_active(&self) -> Result<Vec<Container>, CatalogError>;

    /// Short description for logs.
    fn describe(&self) -> String;
}

/// A catalog row as stored; optional columns get defaults on conversion.
#[derive(Clone, Debug, Deserialize)]
pub struct ContainerRow {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub kind: Option<ContainerKind>,
    pub interior: (f64, f64, f64),
    #[serde(default)]
    pub exterior: Option<(f64, f64, f64)>,
    #[serde(default)]
    pub empty_weight: Option<f64>,
    pub max_weight: f64,
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl ContainerRow {
    /// Validates the row into a catalog container.
    pub fn into_container(self) -> Result<Container, CatalogError> {
        let ContainerRow {
            id,
            name,
            code,
            kind,
            interior,
            exterior,
            empty_weight,
            max_weight,
            cost,
            priority,
            active: _,
        } = self;

        let name = name.unwrap_or_else(|| id.clone());
        let code = code.unwrap_or_else(|| id.to_ascii_uppercase());
        let row_id = id.clone();

        Container::new(id, interior, exterior.unwrap_or(interior), max_weight, cost)
            .and_then(|container| {
                let container = container
                    .with_meta(name, code, kind.unwrap_or_default())
                    .with_empty_weight(empty_weight.unwrap_or(0.0))
                    .with_priority(priority);
                container.validate()?;
                Ok(container)
            })
            .map_err(|source| CatalogError::InvalidRow { id: row_id, source })
    }
}

/// Orders containers by priority (desc), then interior length (asc).
pub fn sort_by_preference(containers: &mut [Container]) {
    containers.sort_by(|a, b| {
        b.priority.cmp(&a.priority).then_with(|| {
            a.interior
                .0
                .partial_cmp(&b.interior.0)
                .unwrap_or(Ordering::Equal)
        })
    });
}

/// Converts raw rows, dropping inactive ones, into the preferred order.
pub fn containers_from_rows(rows: Vec<ContainerRow>) -> Result<Vec<Container>, CatalogError> {
    let mut containers = rows
        .into_iter()
        .filter(|row| row.active)
        .map(ContainerRow::into_container)
        .collect::<Result<Vec<_>, CatalogError>>()?;
    sort_by_preference(&mut containers);
    Ok(containers)
}

/// Parses a JSON array of catalog rows.
pub fn parse_rows(json: &str) -> Result<Vec<Container>, CatalogError> {
    let rows: Vec<ContainerRow> = serde_json::from_str(json)?;
    containers_from_rows(rows)
}

/// In-memory catalog.
#[derive(Clone, Debug, Default)]
pub struct StaticCatalog {
    containers: Vec<Container>,
}

impl StaticCatalog {
    /// Validates every container and stores them in the preferred order.
    pub fn new(mut containers: Vec<Container>) -> Result<Self, ValidationError> {
        for container in &containers {
            container.validate()?;
        }
        sort_by_preference(&mut containers);
        Ok(Self { containers })
    }

    /// A catalog with no containers configured.
    pub fn empty() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContainerCatalog for StaticCatalog {
    async fn list_active(&self) -> Result<Vec<Container>, CatalogError> {
        Ok(self.containers.clone())
    }

    fn describe(&self) -> String {
        format!("static catalog ({} containers)", self.containers.len())
    }
}

/// Catalog backed by a JSON file, re-read on every listing.
#[derive(Clone, Debug)]
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ContainerCatalog for FileCatalog {
    async fn list_active(&self) -> Result<Vec<Container>, CatalogError> {
        let contents =
            tokio::fs::read_to_string(&self.path)
                .await
                .map_err(|source| CatalogError::Io {
                    path: self.path.display().to_string(),
                    source,
                })?;
        parse_rows(&contents)
    }

    fn describe(&self) -> String {
        format!("file catalog ({})", self.path.display())
    }
}

fn user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    let os = std::env::consts::OS;
    let arch = std::env::consts::ARCH;
    format!("cartonize/{version} ({os}; {arch})")
}

/// Catalog served by a remote catalog service as a JSON array of rows.
#[derive(Clone, Debug)]
pub struct HttpCatalog {
    client: reqwest::Client,
    url: String,
}

impl HttpCatalog {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent())
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl ContainerCatalog for HttpCatalog {
    async fn list_active(&self) -> Result<Vec<Container>, CatalogError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status(status.as_u16()));
        }
        let body = response.text().await?;
        parse_rows(&body)
    }

    fn describe(&self) -> String {
        format!("http catalog ({})", self.url)
    }
}
