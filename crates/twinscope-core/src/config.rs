// ── Runtime session configuration ──
//
// These types describe *where* model definitions are searched and how a
// session behaves. They carry endpoints and credential data but never
// touch disk; the embedding shell loads whatever config files it wants
// and hands a `SessionConfig` in.

use secrecy::SecretString;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::repository::ModelSource;

/// Default public device model repository host.
pub const PUBLIC_REPOSITORY_HOST: &str = "https://devicemodels.azure.com";

/// One place to look for model definitions.
///
/// Public/Private/Device locations are served by environment-supplied
/// [`ModelFetcher`](crate::repository::ModelFetcher) implementations;
/// only `Local` has a concrete fetcher in this crate. The token for a
/// private repository is held as a [`SecretString`] and never logged.
#[derive(Debug, Clone)]
pub enum RepositoryLocation {
    /// The public device model repository.
    Public { host: Url },
    /// A company-hosted repository requiring a token.
    Private { host: Url, token: SecretString },
    /// The device's own model report.
    Device,
    /// A directory of model files on the local machine.
    Local { path: PathBuf },
}

impl RepositoryLocation {
    /// The provenance tag results from this location will carry.
    pub fn source(&self) -> ModelSource {
        match self {
            Self::Public { .. } => ModelSource::Public,
            Self::Private { .. } => ModelSource::Private,
            Self::Device => ModelSource::Device,
            Self::Local { .. } => ModelSource::Local,
        }
    }
}

/// Configuration for one twin session.
///
/// Built by the embedding application, passed to
/// [`TwinSession`](crate::session::TwinSession) — the core never reads
/// config files.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Model search order; the first location that has the model wins.
    pub repository_locations: Vec<RepositoryLocation>,
    /// How often to refresh the twin in the background. Zero = never.
    pub refresh_interval: Duration,
    /// Locale for resolving localized display names and descriptions.
    pub locale: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            repository_locations: vec![
                RepositoryLocation::Public {
                    host: Url::parse(PUBLIC_REPOSITORY_HOST)
                        .expect("default repository host parses"),
                },
                RepositoryLocation::Device,
            ],
            refresh_interval: Duration::ZERO,
            locale: "en".to_owned(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_searches_public_then_device() {
        let config = SessionConfig::default();
        let sources: Vec<ModelSource> = config
            .repository_locations
            .iter()
            .map(RepositoryLocation::source)
            .collect();
        assert_eq!(sources, vec![ModelSource::Public, ModelSource::Device]);
        assert_eq!(config.refresh_interval, Duration::ZERO);
        assert_eq!(config.locale, "en");
    }

    #[test]
    fn private_token_does_not_leak_through_debug() {
        let location = RepositoryLocation::Private {
            host: Url::parse("https://models.example.com").unwrap(),
            token: SecretString::from("hunter2".to_owned()),
        };
        let printed = format!("{location:?}");
        assert!(!printed.contains("hunter2"));
        assert_eq!(location.source(), ModelSource::Private);
    }
}
