use std::path::PathBuf;
use std::sync::Arc;
use std::time::UNIX_EPOCH;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use beatline_analysis::AnalysisCaps;
use beatline_audio::TrackDecoder;
use beatline_domain::Difficulty;
use beatline_pipeline::{AnalysisPipeline, TrackSource};
use beatline_store::{FileBackend, MemoryBackend, StorageBackend};

#[derive(Parser, Debug)]
#[command(author, version, about = "Analyze a track and generate its beat maps", long_about = None)]
struct Cli {
    /// Path to the audio file to analyze
    input: PathBuf,
    /// Difficulty tier selecting the lane count (easy, normal, hard)
    #[arg(short, long, default_value = "normal")]
    difficulty: Difficulty,
    /// Calibration offset in seconds applied to every note
    #[arg(short, long, default_value_t = 0.0)]
    offset: f64,
    /// Directory for the persistent store; in-memory only when omitted
    #[arg(short, long)]
    store_dir: Option<PathBuf>,
    /// Print the generated beat map for the selected difficulty as JSON
    #[arg(long)]
    dump: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let metadata = std::fs::metadata(&cli.input)
        .with_context(|| format!("stat input file {:?}", cli.input))?;
    let modified_epoch = metadata
        .modified()
        .ok()
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .map(|duration| duration.as_secs())
        .unwrap_or(0);
    let file_name = cli
        .input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let source = TrackSource::new(file_name, metadata.len(), modified_epoch);

    let track = TrackDecoder::open(&cli.input)?;
    let backend: Arc<dyn StorageBackend> = match &cli.store_dir {
        Some(dir) => Arc::new(FileBackend::new(dir)),
        None => Arc::new(MemoryBackend::new()),
    };
    let pipeline = AnalysisPipeline::new(AnalysisCaps::full(), backend);

    let duration = track.duration_secs();
    let samples: Arc<[f32]> = track.samples.into();
    let record = pipeline
        .analyze_track(
            &source,
            samples,
            track.sample_rate,
            cli.difficulty,
            cli.offset,
            &mut rand::thread_rng(),
        )
        .await?;

    println!("track: {} ({:.1}s)", source.cache_key(), duration);
    println!("rms: {:.4}  tempo: {:.1} bpm", record.rms, record.tempo);
    println!(
        "spectral centroid: {:.0} Hz  rolloff: {:.0} Hz",
        record.spectral.centroid, record.spectral.rolloff
    );
    for tier in Difficulty::ALL {
        println!("{tier}: {} notes", record.beat_maps.get(tier).notes.len());
    }
    if cli.dump {
        let map = record.beat_maps.get(cli.difficulty);
        println!("{}", serde_json::to_string_pretty(map)?);
    }
    Ok(())
}
