use std::sync::Arc;

use anyhow::Result;
use rand::Rng;
use tracing::{info, instrument};

use beatline_analysis::{AnalysisCaps, Analyzer};
use beatline_chart::generate_beat_map_variations;
use beatline_domain::Difficulty;
use beatline_store::{AnalysisRecord, AnalysisStore, BeatMapStore, StorageBackend};

/// Identity of a source track, used to derive the analysis cache key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackSource {
    pub file_name: String,
    pub size_bytes: u64,
    pub modified_epoch: u64,
}

impl TrackSource {
    pub fn new(file_name: impl Into<String>, size_bytes: u64, modified_epoch: u64) -> Self {
        Self {
            file_name: file_name.into(),
            size_bytes,
            modified_epoch,
        }
    }

    /// Content-derived identifier: a changed file yields a fresh analysis.
    pub fn cache_key(&self) -> String {
        format!(
            "{}-{}-{}",
            self.file_name, self.size_bytes, self.modified_epoch
        )
    }
}

/// End-to-end track analysis: cached lookup, chart generation, feature
/// analysis (worker or reduced fallback) and persistence of the combined
/// record plus the three per-difficulty beat maps.
pub struct AnalysisPipeline {
    analyzer: Analyzer,
    analysis_store: AnalysisStore,
    beat_map_store: BeatMapStore,
}

impl AnalysisPipeline {
    pub fn new(caps: AnalysisCaps, backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            analyzer: Analyzer::new(caps),
            analysis_store: AnalysisStore::new(backend.clone()),
            beat_map_store: BeatMapStore::new(backend),
        }
    }

    pub fn beat_map_store(&self) -> &BeatMapStore {
        &self.beat_map_store
    }

    /// Analyze a decoded track, or return the cached record for it.
    ///
    /// Chart generation runs synchronously on the calling thread (it is a
    /// once-per-track cost, well under the interactive budget); the feature
    /// pass goes through the analyzer, which offloads to its worker when the
    /// environment supports one. Worker failures propagate; a soft-deadline
    /// overrun is only a warning inside the analyzer.
    #[instrument(skip(self, samples, rng), fields(key = %source.cache_key()))]
    pub async fn analyze_track<R: Rng + ?Sized>(
        &self,
        source: &TrackSource,
        samples: Arc<[f32]>,
        sample_rate: u32,
        difficulty: Difficulty,
        offset: f64,
        rng: &mut R,
    ) -> Result<AnalysisRecord> {
        let key = source.cache_key();
        if let Some(cached) = self.analysis_store.load(&key).await? {
            info!("serving cached analysis");
            return Ok(cached);
        }

        let beat_maps =
            generate_beat_map_variations(&samples, sample_rate, difficulty, offset, rng);
        let analysis = self.analyzer.analyze(samples, sample_rate).await?;
        let record = AnalysisRecord::new(analysis, beat_maps);

        self.analysis_store.save(&key, &record).await?;
        for tier in Difficulty::ALL {
            self.beat_map_store
                .save(&format!("{key}-{tier}"), record.beat_maps.get(tier))
                .await?;
        }
        info!(
            tempo = record.tempo,
            notes = record.beat_maps.normal.notes.len(),
            "analysis complete"
        );
        Ok(record)
    }
}
