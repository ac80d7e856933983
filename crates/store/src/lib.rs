pub mod backend;
pub mod beat_maps;
pub mod error;
pub mod records;

pub use backend::{FileBackend, MemoryBackend, StorageBackend};
pub use beat_maps::BeatMapStore;
pub use error::StoreError;
pub use records::{AnalysisRecord, AnalysisStore};

/// Namespace holding individual beat maps keyed by chart id.
pub const BEAT_MAP_NAMESPACE: &str = "beat_maps";
/// Namespace holding per-track analysis records.
pub const ANALYSIS_NAMESPACE: &str = "analysis_results";
