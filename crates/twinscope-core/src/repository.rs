// ── Repository boundary ──
//
// The opaque capabilities this core consumes: model-definition fetchers
// and the twin registry API. Network-backed implementations live in the
// embedding application; only the local-directory fetcher is concrete
// here.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use tracing::{debug, warn};
use twinscope_dtdl::{Dtmi, ModelDefinition, interface_from_value};

use crate::error::CoreError;
use crate::model::{TwinDocument, TwinTarget};

/// Where a model definition came from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
pub enum ModelSource {
    /// The public device model repository.
    Public,
    /// A company-hosted repository requiring a token.
    Private,
    /// Reported by the device itself.
    Device,
    /// A directory on the local machine.
    Local,
}

/// A fetched model definition, tagged with provenance and validity.
///
/// The raw document is always present, even when typing failed; raw
/// JSON display must keep working for invalid models.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDefinitionWithSource {
    pub raw: Value,
    /// The typed document, present iff the whole document typed cleanly.
    /// Partial typing is rejected: one malformed entry invalidates the
    /// model rather than presenting a misleadingly incomplete interface.
    pub model: Option<ModelDefinition>,
    pub source: ModelSource,
    pub is_model_valid: bool,
    /// First typing error, for display next to the raw document.
    pub parse_error: Option<String>,
}

impl ModelDefinitionWithSource {
    fn from_raw(raw: Value, source: ModelSource, model_id: &Dtmi) -> Self {
        match interface_from_value(&raw) {
            Ok(model) => Self {
                raw,
                model: Some(model),
                source,
                is_model_valid: true,
                parse_error: None,
            },
            Err(error) => {
                warn!(model = %model_id, %source, %error, "model definition failed to type");
                Self {
                    raw,
                    model: None,
                    source,
                    is_model_valid: false,
                    parse_error: Some(error.to_string()),
                }
            }
        }
    }
}

// ── Capabilities ────────────────────────────────────────────────────

/// Fetches raw model definitions from one location kind.
///
/// "Not there" is signalled with [`CoreError::ModelNotFound`] so a
/// resolver can fall through to the next location; any other error is a
/// real failure and stops the search.
#[async_trait]
pub trait ModelFetcher: Send + Sync {
    fn source(&self) -> ModelSource;

    async fn fetch(&self, model_id: &Dtmi) -> Result<Value, CoreError>;
}

/// The twin registry: fetch and patch twin documents.
///
/// Transport, authentication, retry, and timeouts all live behind this
/// trait in the embedding application.
#[async_trait]
pub trait TwinApi: Send + Sync {
    async fn fetch_twin(&self, target: &TwinTarget) -> Result<TwinDocument, CoreError>;

    /// Apply a desired-property patch, returning the refreshed twin.
    async fn update_twin(
        &self,
        target: &TwinTarget,
        patch: Value,
    ) -> Result<TwinDocument, CoreError>;
}

// ── Resolution ──────────────────────────────────────────────────────

/// Walks an ordered list of fetchers until one supplies the model.
///
/// The first hit wins and is tagged with its fetcher's source. A
/// not-found falls through to the next location; any other error
/// surfaces immediately. A document that fetched but failed to type is
/// still a hit — it resolves as an invalid model with raw JSON intact.
pub struct ModelResolver {
    fetchers: Vec<Box<dyn ModelFetcher>>,
}

impl ModelResolver {
    pub fn new(fetchers: Vec<Box<dyn ModelFetcher>>) -> Self {
        Self { fetchers }
    }

    /// The sources this resolver searches, in order.
    pub fn sources(&self) -> Vec<ModelSource> {
        self.fetchers.iter().map(|fetcher| fetcher.source()).collect()
    }

    pub async fn resolve(
        &self,
        model_id: &Dtmi,
    ) -> Result<ModelDefinitionWithSource, CoreError> {
        let mut tried = Vec::with_capacity(self.fetchers.len());
        for fetcher in &self.fetchers {
            let source = fetcher.source();
            match fetcher.fetch(model_id).await {
                Ok(raw) => {
                    debug!(model = %model_id, %source, "model definition resolved");
                    return Ok(ModelDefinitionWithSource::from_raw(raw, source, model_id));
                }
                Err(error) if error.is_not_found() => {
                    debug!(model = %model_id, %source, "not found, trying next location");
                    tried.push(source);
                }
                Err(error) => return Err(error),
            }
        }
        Err(CoreError::ModelNotFound {
            model_id: model_id.as_str().to_owned(),
            locations_tried: tried,
        })
    }
}

// ── Local directory fetcher ─────────────────────────────────────────

/// Resolves models from a directory on disk.
///
/// Tries the device-model-repository convention path first
/// (`dtmi/com/example/thermostat-1.json`), then falls back to a flat
/// scan of `*.json` files in the directory root matching on `@id`.
pub struct LocalModelFetcher {
    root: PathBuf,
}

impl LocalModelFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read_value(&self, path: &std::path::Path) -> Result<Value, CoreError> {
        let text = std::fs::read_to_string(path).map_err(|error| CoreError::Repository {
            location: ModelSource::Local,
            message: format!("reading {}: {error}", path.display()),
        })?;
        serde_json::from_str(&text).map_err(|error| CoreError::Repository {
            location: ModelSource::Local,
            message: format!("decoding {}: {error}", path.display()),
        })
    }

    fn flat_scan(&self, model_id: &Dtmi) -> Result<Option<Value>, CoreError> {
        let entries = std::fs::read_dir(&self.root).map_err(|error| CoreError::Repository {
            location: ModelSource::Local,
            message: format!("listing {}: {error}", self.root.display()),
        })?;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            // A directory of hand-edited files will contain broken JSON
            // sooner or later; a bad neighbor must not block the scan.
            let Ok(value) = self.read_value(&path) else {
                debug!(path = %path.display(), "skipping unreadable candidate");
                continue;
            };
            if value.get("@id").and_then(Value::as_str) == Some(model_id.as_str()) {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl ModelFetcher for LocalModelFetcher {
    fn source(&self) -> ModelSource {
        ModelSource::Local
    }

    async fn fetch(&self, model_id: &Dtmi) -> Result<Value, CoreError> {
        let conventional = self.root.join(model_id.repository_path());
        if conventional.is_file() {
            return self.read_value(&conventional);
        }
        if let Some(value) = self.flat_scan(model_id)? {
            return Ok(value);
        }
        Err(CoreError::ModelNotFound {
            model_id: model_id.as_str().to_owned(),
            locations_tried: vec![ModelSource::Local],
        })
    }
}
