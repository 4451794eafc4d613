// ── Twin session ──
//
// Consumer-facing orchestration for one twin: holds the registry and
// model-resolution capabilities, one sync cell for the twin document,
// and one per model definition. Cells are independent state machines;
// overlapping requests for different entities run concurrently, and
// requests for the same entity are serialized only by ticket discard.

use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use twinscope_dtdl::Dtmi;

use crate::adaptor::{AdaptedModel, ComponentRef, adapt, component_index};
use crate::config::SessionConfig;
use crate::error::CoreError;
use crate::model::{TwinDocument, TwinTarget};
use crate::repository::{ModelDefinitionWithSource, ModelResolver, TwinApi};
use crate::sync::{SyncCell, SyncSnapshot, SyncSubscription};

/// A model definition fetched, typed, and adapted for rendering.
///
/// `adapted` and `components` are present iff the definition typed
/// cleanly; an invalid model still carries its raw document inside
/// `definition` for raw-JSON display.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedModel {
    pub definition: ModelDefinitionWithSource,
    pub adapted: Option<AdaptedModel>,
    pub components: Vec<ComponentRef>,
}

impl ResolvedModel {
    pub fn is_valid(&self) -> bool {
        self.definition.is_model_valid
    }
}

/// The entry point consumers hold. Cheaply cloneable.
#[derive(Clone)]
pub struct TwinSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    config: SessionConfig,
    target: TwinTarget,
    twin_api: Arc<dyn TwinApi>,
    resolver: ModelResolver,
    twin: SyncCell<TwinDocument>,
    models: DashMap<Dtmi, Arc<SyncCell<ResolvedModel>>>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl TwinSession {
    /// Create a session for one twin. Does not fetch anything; call
    /// [`refresh_twin`](Self::refresh_twin) for the initial load and
    /// [`spawn_periodic_refresh`](Self::spawn_periodic_refresh) if the
    /// configured interval is non-zero.
    pub fn new(
        config: SessionConfig,
        target: TwinTarget,
        twin_api: Arc<dyn TwinApi>,
        resolver: ModelResolver,
    ) -> Self {
        let twin = SyncCell::new(format!("twin {target}"));
        Self {
            inner: Arc::new(SessionInner {
                config,
                target,
                twin_api,
                resolver,
                twin,
                models: DashMap::new(),
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    pub fn target(&self) -> &TwinTarget {
        &self.inner.target
    }

    // ── Twin operations ─────────────────────────────────────────────

    /// Fetch the twin document, applying the result with stale-discard.
    ///
    /// Re-entrant while a fetch is already in flight: the newer request
    /// supersedes the older one and only its response is applied.
    pub async fn refresh_twin(&self) -> Result<(), CoreError> {
        self.ensure_open()?;
        let ticket = self.inner.twin.begin_fetch().await?;
        match self.inner.twin_api.fetch_twin(&self.inner.target).await {
            Ok(twin) => {
                self.inner.twin.complete_fetch(ticket, twin).await;
                Ok(())
            }
            Err(error) => {
                self.inner.twin.fail_fetch(ticket, error.to_string()).await;
                Err(error)
            }
        }
    }

    /// Apply a desired-property patch to the twin.
    ///
    /// Requires a settled payload: saving before the first successful
    /// fetch is refused. On success the registry's post-save document
    /// becomes the tracker payload (`Upserted`); on failure the
    /// pre-save payload survives.
    pub async fn save_twin(&self, patch: Value) -> Result<(), CoreError> {
        self.ensure_open()?;
        if !patch.is_object() {
            return Err(CoreError::InvalidPatch {
                message: "patch must be a JSON object".to_owned(),
            });
        }
        let ticket = self.inner.twin.begin_update().await?;
        match self
            .inner
            .twin_api
            .update_twin(&self.inner.target, patch)
            .await
        {
            Ok(twin) => {
                self.inner.twin.complete_update(ticket, twin).await;
                Ok(())
            }
            Err(error) => {
                self.inner.twin.fail_update(ticket, error.to_string()).await;
                Err(error)
            }
        }
    }

    pub fn twin_snapshot(&self) -> SyncSnapshot<TwinDocument> {
        self.inner.twin.snapshot()
    }

    pub fn twin_state(&self) -> SyncSubscription<TwinDocument> {
        self.inner.twin.subscribe()
    }

    // ── Model operations ────────────────────────────────────────────

    /// Resolve, type, and adapt a model definition.
    ///
    /// A definition that fails to type still loads: its cell settles on
    /// `Fetched` with `is_model_valid == false` and the raw document
    /// retained. Only resolution failures (nothing found anywhere, or a
    /// location erroring out) fail the cell.
    pub async fn load_model(&self, model_id: &Dtmi) -> Result<(), CoreError> {
        self.ensure_open()?;
        let cell = self.model_cell(model_id);
        let ticket = cell.begin_fetch().await?;
        match self.inner.resolver.resolve(model_id).await {
            Ok(definition) => {
                let adapted = definition
                    .model
                    .as_ref()
                    .map(|model| adapt(model, &self.inner.config.locale));
                let components = definition
                    .model
                    .as_ref()
                    .map(component_index)
                    .unwrap_or_default();
                if !definition.is_model_valid {
                    warn!(model = %model_id, "model loaded invalid; raw display only");
                }
                cell.complete_fetch(
                    ticket,
                    ResolvedModel {
                        definition,
                        adapted,
                        components,
                    },
                )
                .await;
                Ok(())
            }
            Err(error) => {
                cell.fail_fetch(ticket, error.to_string()).await;
                Err(error)
            }
        }
    }

    /// Re-resolve a model definition. Same rules as [`load_model`](Self::load_model).
    pub async fn refresh_model(&self, model_id: &Dtmi) -> Result<(), CoreError> {
        self.load_model(model_id).await
    }

    pub fn model_snapshot(&self, model_id: &Dtmi) -> Option<SyncSnapshot<ResolvedModel>> {
        self.inner
            .models
            .get(model_id)
            .map(|cell| cell.snapshot())
    }

    /// Subscribe to a model's sync state, creating its cell on first
    /// use so subscribers can exist before the first load.
    pub fn model_state(&self, model_id: &Dtmi) -> SyncSubscription<ResolvedModel> {
        self.model_cell(model_id).subscribe()
    }

    // ── Background refresh ──────────────────────────────────────────

    /// Start the periodic twin refresh task, if the configured interval
    /// is non-zero. Each tick is an ordinary [`refresh_twin`](Self::refresh_twin),
    /// so stale-discard and the consumer's dirty-edit handling govern
    /// it like any user-initiated refresh.
    pub async fn spawn_periodic_refresh(&self) {
        let interval = self.inner.config.refresh_interval;
        if interval.is_zero() {
            debug!("periodic refresh disabled");
            return;
        }
        let session = self.clone();
        let cancel = self.inner.cancel.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // consume the immediate first tick

            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        if let Err(error) = session.refresh_twin().await {
                            warn!(%error, "periodic twin refresh failed");
                        }
                    }
                }
            }
        });
        self.inner.task_handles.lock().await.push(handle);
        info!(?interval, "periodic twin refresh started");
    }

    /// Cancel background tasks and refuse further operations.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!(twin = %self.inner.target, "session shut down");
    }

    // ── Internals ───────────────────────────────────────────────────

    fn model_cell(&self, model_id: &Dtmi) -> Arc<SyncCell<ResolvedModel>> {
        self.inner
            .models
            .entry(model_id.clone())
            .or_insert_with(|| Arc::new(SyncCell::new(format!("model {model_id}"))))
            .clone()
    }

    fn ensure_open(&self) -> Result<(), CoreError> {
        if self.inner.cancel.is_cancelled() {
            return Err(CoreError::SessionClosed);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::repository::{ModelFetcher, ModelSource};
    use crate::sync::SyncStatus;
    use async_trait::async_trait;
    use serde_json::json;

    struct FixedTwinApi;

    #[async_trait]
    impl TwinApi for FixedTwinApi {
        async fn fetch_twin(&self, target: &TwinTarget) -> Result<TwinDocument, CoreError> {
            Ok(serde_json::from_value(json!({
                "deviceId": target.device_id,
                "properties": {"desired": {"brightness": 5}, "reported": {}},
            }))
            .expect("fixture twin deserializes"))
        }

        async fn update_twin(
            &self,
            target: &TwinTarget,
            patch: Value,
        ) -> Result<TwinDocument, CoreError> {
            let desired = patch["properties"]["desired"].clone();
            Ok(serde_json::from_value(json!({
                "deviceId": target.device_id,
                "properties": {"desired": desired, "reported": {}},
            }))
            .expect("fixture twin deserializes"))
        }
    }

    struct FixedModelFetcher(Value);

    #[async_trait]
    impl ModelFetcher for FixedModelFetcher {
        fn source(&self) -> ModelSource {
            ModelSource::Device
        }

        async fn fetch(&self, _model_id: &Dtmi) -> Result<Value, CoreError> {
            Ok(self.0.clone())
        }
    }

    fn session(model: Value) -> TwinSession {
        TwinSession::new(
            SessionConfig::default(),
            TwinTarget::device("sensor-1"),
            Arc::new(FixedTwinApi),
            ModelResolver::new(vec![Box::new(FixedModelFetcher(model))]),
        )
    }

    fn light_model() -> Value {
        json!({
            "@id": "dtmi:com:example:Light;1",
            "@type": "Interface",
            "contents": [
                {"@type": "Property", "name": "brightness", "schema": "long",
                 "writable": true},
            ],
        })
    }

    #[tokio::test]
    async fn refresh_then_save_walks_the_twin_lifecycle() {
        let session = session(light_model());
        assert_eq!(session.twin_snapshot().status, SyncStatus::Initialized);

        session.refresh_twin().await.unwrap();
        let snapshot = session.twin_snapshot();
        assert_eq!(snapshot.status, SyncStatus::Fetched);
        assert_eq!(
            snapshot.payload.unwrap().properties.desired["brightness"],
            json!(5)
        );

        session
            .save_twin(json!({"properties": {"desired": {"brightness": 9}}}))
            .await
            .unwrap();
        let snapshot = session.twin_snapshot();
        assert_eq!(snapshot.status, SyncStatus::Upserted);
        assert_eq!(
            snapshot.payload.unwrap().properties.desired["brightness"],
            json!(9)
        );
    }

    #[tokio::test]
    async fn save_requires_fetch_and_object_patch() {
        let session = session(light_model());

        let error = session.save_twin(json!({})).await.unwrap_err();
        assert!(matches!(error, CoreError::NotAllowed { .. }));

        session.refresh_twin().await.unwrap();
        let error = session.save_twin(json!(42)).await.unwrap_err();
        assert!(matches!(error, CoreError::InvalidPatch { .. }));
    }

    #[tokio::test]
    async fn load_model_adapts_and_indexes() {
        let session = session(light_model());
        let id = Dtmi::parse("dtmi:com:example:Light;1").unwrap();
        session.load_model(&id).await.unwrap();

        let snapshot = session.model_snapshot(&id).unwrap();
        let resolved = snapshot.payload.unwrap();
        assert!(resolved.is_valid());
        let adapted = resolved.adapted.as_ref().unwrap();
        assert_eq!(adapted.writable.len(), 1);
        assert_eq!(resolved.components[0].component_name, "$default");
    }

    #[tokio::test]
    async fn invalid_model_still_settles_with_raw_document() {
        let raw = json!({
            "@id": "dtmi:com:example:Broken;1",
            "@type": "Interface",
            "contents": [{"@type": "Relationship", "name": "mystery"}],
        });
        let session = session(raw.clone());
        let id = Dtmi::parse("dtmi:com:example:Broken;1").unwrap();
        session.load_model(&id).await.unwrap();

        let snapshot = session.model_snapshot(&id).unwrap();
        assert_eq!(snapshot.status, SyncStatus::Fetched);
        let resolved = snapshot.payload.unwrap();
        assert!(!resolved.is_valid());
        assert!(resolved.adapted.is_none());
        assert_eq!(resolved.definition.raw, raw);
    }

    #[tokio::test]
    async fn shutdown_refuses_further_operations() {
        let session = session(light_model());
        session.shutdown().await;
        assert!(matches!(
            session.refresh_twin().await,
            Err(CoreError::SessionClosed)
        ));
    }
}
