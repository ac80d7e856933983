pub mod detector;
pub mod features;
pub mod tempo;
pub mod worker;

pub use detector::detect_beats;
pub use features::{compute_rms, compute_spectral_features, downsample, SpectralFeatures};
pub use tempo::estimate_tempo;
pub use worker::{
    analyze_samples, AnalysisCaps, AnalysisError, AnalysisResult, AnalyzeRequest, Analyzer,
};
