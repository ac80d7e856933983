use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use beatline_domain::{validate_beat_map, BeatMap};

use crate::{StorageBackend, StoreError, BEAT_MAP_NAMESPACE};

/// Beat-map persistence with a write-through in-memory cache.
///
/// A save validates first and never writes a malformed map. Loads consult
/// the cache before the backend and, once populated, never go back to it
/// within a session; callers needing cross-restart freshness reload
/// explicitly.
pub struct BeatMapStore {
    backend: Arc<dyn StorageBackend>,
    cache: Mutex<HashMap<String, BeatMap>>,
}

impl BeatMapStore {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Validate and persist a beat map, then populate the cache. A failed
    /// validation prevents the write entirely.
    pub async fn save(&self, id: &str, map: &BeatMap) -> Result<(), StoreError> {
        validate_beat_map(map)?;
        let bytes = serde_json::to_vec(map)?;
        self.backend.write(BEAT_MAP_NAMESPACE, id, &bytes).await?;
        let mut cache = self.cache.lock().await;
        cache.insert(id.to_string(), map.clone());
        Ok(())
    }

    pub async fn load(&self, id: &str) -> Result<Option<BeatMap>, StoreError> {
        {
            let cache = self.cache.lock().await;
            if let Some(map) = cache.get(id) {
                return Ok(Some(map.clone()));
            }
        }
        let Some(bytes) = self.backend.read(BEAT_MAP_NAMESPACE, id).await? else {
            return Ok(None);
        };
        let map: BeatMap = serde_json::from_slice(&bytes)?;
        let mut cache = self.cache.lock().await;
        cache.insert(id.to_string(), map.clone());
        debug!(id, notes = map.notes.len(), "beat map loaded into cache");
        Ok(Some(map))
    }

    /// Warm the cache ahead of gameplay.
    pub async fn preload(&self, id: &str) -> Result<Option<BeatMap>, StoreError> {
        self.load(id).await
    }

    /// Cache-only lookup; never touches the backend.
    pub async fn get_preloaded(&self, id: &str) -> Option<BeatMap> {
        let cache = self.cache.lock().await;
        cache.get(id).cloned()
    }

    pub async fn clear_cache(&self) {
        let mut cache = self.cache.lock().await;
        cache.clear();
    }
}
