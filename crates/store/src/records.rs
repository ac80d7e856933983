use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use beatline_analysis::{AnalysisResult, SpectralFeatures};
use beatline_domain::{BeatMap, BeatMapVariations};

use crate::{StorageBackend, StoreError, ANALYSIS_NAMESPACE};

/// Persisted per-track analysis: the feature summary plus all three chart
/// tiers. Keyed by the track's content-derived id. The wire format keeps the
/// legacy camelCase field names.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub rms: f32,
    pub waveform: Vec<f32>,
    pub tempo: f64,
    pub spectral: SpectralFeatures,
    pub beat_maps: BeatMapVariations,
}

impl AnalysisRecord {
    pub fn new(analysis: AnalysisResult, beat_maps: BeatMapVariations) -> Self {
        Self {
            rms: analysis.rms,
            waveform: analysis.waveform,
            tempo: analysis.tempo,
            spectral: analysis.spectral,
            beat_maps,
        }
    }
}

/// Analysis result persistence with lazy migration of the legacy
/// single-chart record shape.
pub struct AnalysisStore {
    backend: Arc<dyn StorageBackend>,
}

impl AnalysisStore {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    pub async fn save(&self, id: &str, record: &AnalysisRecord) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(record)?;
        self.backend.write(ANALYSIS_NAMESPACE, id, &bytes).await
    }

    /// Load a record, transparently upgrading the legacy `{beatMap: M}`
    /// shape to `{beatMaps: {easy, normal, hard}}` with all three tiers set
    /// to the one legacy chart. The upgraded record is rewritten to storage
    /// before being returned.
    pub async fn load(&self, id: &str) -> Result<Option<AnalysisRecord>, StoreError> {
        let Some(bytes) = self.backend.read(ANALYSIS_NAMESPACE, id).await? else {
            return Ok(None);
        };
        let value: Value = serde_json::from_slice(&bytes)?;
        if let Some(record) = Self::upgrade_legacy(&value)? {
            info!(id, "migrating legacy single-chart analysis record");
            self.save(id, &record).await?;
            return Ok(Some(record));
        }
        Ok(Some(serde_json::from_value(value)?))
    }

    fn upgrade_legacy(value: &Value) -> Result<Option<AnalysisRecord>, StoreError> {
        let Some(object) = value.as_object() else {
            return Ok(None);
        };
        if object.contains_key("beatMaps") || !object.contains_key("beatMap") {
            return Ok(None);
        }
        let map: BeatMap = serde_json::from_value(object["beatMap"].clone())?;
        let mut upgraded = object.clone();
        upgraded.remove("beatMap");
        upgraded.insert(
            "beatMaps".to_string(),
            serde_json::to_value(BeatMapVariations::uniform(map))?,
        );
        Ok(Some(serde_json::from_value(Value::Object(upgraded))?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryBackend;
    use beatline_domain::BeatNote;

    fn sample_record() -> AnalysisRecord {
        let map = BeatMap::new(0.0, vec![BeatNote::new(0.4, 2)]);
        AnalysisRecord {
            rms: 0.3,
            waveform: vec![0.0, 0.1, -0.1],
            tempo: 128.0,
            spectral: SpectralFeatures {
                centroid: 1_200.0,
                rolloff: 4_800.0,
            },
            beat_maps: BeatMapVariations::uniform(map),
        }
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let store = AnalysisStore::new(Arc::new(MemoryBackend::new()));
        let record = sample_record();
        store.save("id", &record).await.unwrap();
        assert_eq!(store.load("id").await.unwrap().unwrap(), record);
    }

    #[tokio::test]
    async fn missing_record_loads_as_none() {
        let store = AnalysisStore::new(Arc::new(MemoryBackend::new()));
        assert!(store.load("absent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn legacy_record_is_upgraded_and_rewritten() {
        let backend = Arc::new(MemoryBackend::new());
        let store = AnalysisStore::new(backend.clone());
        let legacy = serde_json::json!({
            "type": "analysisResult",
            "rms": 0.25,
            "waveform": [0.0, 0.5],
            "tempo": 90.0,
            "spectral": { "centroid": 800.0, "rolloff": 3_000.0 },
            "beatMap": {
                "version": 1,
                "notes": [{ "time": 1.0, "lane": 2 }]
            }
        });
        backend
            .write(
                ANALYSIS_NAMESPACE,
                "old",
                &serde_json::to_vec(&legacy).unwrap(),
            )
            .await
            .unwrap();

        let record = store.load("old").await.unwrap().unwrap();
        assert_eq!(record.beat_maps.easy, record.beat_maps.normal);
        assert_eq!(record.beat_maps.easy, record.beat_maps.hard);
        assert_eq!(record.beat_maps.normal.notes[0].lane, 2);
        assert_eq!(record.tempo, 90.0);

        // The backing record now persists in the new shape.
        let bytes = backend.read(ANALYSIS_NAMESPACE, "old").await.unwrap().unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(value.get("beatMaps").is_some());
        assert!(value.get("beatMap").is_none());
        assert_eq!(store.load("old").await.unwrap().unwrap(), record);
    }

    #[tokio::test]
    async fn wire_format_uses_camel_case_keys() {
        let json = serde_json::to_value(sample_record()).unwrap();
        assert!(json.get("beatMaps").is_some());
        assert!(json.get("beat_maps").is_none());
    }
}
