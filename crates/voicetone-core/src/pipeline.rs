//! Stateless analysis pipeline
//!
//! One call is one run: decode, extract the pitch contour, cluster into
//! speaker groups, classify registers, and render the optional density
//! plot. The audio buffer is owned by the run and dropped when it returns;
//! no analyzer state survives between calls.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::audio_file::{self, AudioFileError};
use crate::cluster::{self, ClusterError};
use crate::config::Config;
use crate::pitch;
use crate::plot;
use crate::report::{AnalysisReport, SpeakerReport};
use crate::tone::ToneStats;
use crate::types::AudioBuffer;

/// Terminal errors for a single analysis run
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    AudioFile(#[from] AudioFileError),

    #[error("No voiced frames detected in the audio")]
    EmptyPitch,

    #[error(transparent)]
    Cluster(ClusterError),
}

impl From<ClusterError> for AnalysisError {
    fn from(e: ClusterError) -> Self {
        match e {
            // The clusterer reports an empty series with its own variant;
            // surface it as the run-level "no voiced frames" outcome
            ClusterError::EmptyPitch => AnalysisError::EmptyPitch,
            other => AnalysisError::Cluster(other),
        }
    }
}

/// Options for one pipeline run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Where to write the density plot; `None` disables plotting
    pub plot_path: Option<PathBuf>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            plot_path: Some(PathBuf::from("pitch_distribution.png")),
        }
    }
}

/// Analyze an audio file on disk.
pub fn analyze_file(
    path: &Path,
    config: &Config,
    options: &RunOptions,
) -> Result<AnalysisReport, AnalysisError> {
    let audio = audio_file::load_file(path)?;
    analyze_buffer(audio, config, options)
}

/// Analyze an uploaded byte stream.
///
/// The bytes are staged to a temporary file for decoding; the file is
/// removed before this function returns, whatever the outcome.
pub fn analyze_bytes(
    bytes: &[u8],
    extension: Option<&str>,
    config: &Config,
    options: &RunOptions,
) -> Result<AnalysisReport, AnalysisError> {
    let audio = audio_file::load_bytes(bytes, extension)?;
    analyze_buffer(audio, config, options)
}

/// Run the pipeline stages over an already-decoded buffer.
pub fn analyze_buffer(
    audio: AudioBuffer,
    config: &Config,
    options: &RunOptions,
) -> Result<AnalysisReport, AnalysisError> {
    log::info!(
        "analyze: extracting pitch from {:.2}s of audio",
        audio.duration_secs()
    );
    let pitches = pitch::extract_pitch(&audio, &config.pitch);

    if pitches.is_empty() {
        return Err(AnalysisError::EmptyPitch);
    }

    log::info!("analyze: clustering {} pitch samples", pitches.len());
    let partition = cluster::split_speakers(&pitches, &config.cluster)?;

    let mut groups = Vec::new();
    for group in partition.groups() {
        match ToneStats::from_group(group, &config.register) {
            Some(stats) => groups.push(SpeakerReport {
                label: group.label,
                stats,
            }),
            None => log::warn!(
                "analyze: {} group received no samples, omitting it from the report",
                group.label.name()
            ),
        }
    }

    // A failed plot downgrades to "no plot"; the report still ships
    let plot = match &options.plot_path {
        Some(path) => match plot::render_density_plot(&partition, path, &config.plot) {
            Ok(()) => Some(path.clone()),
            Err(e) => {
                log::warn!("analyze: skipping density plot: {}", e);
                None
            }
        },
        None => None,
    };

    Ok(AnalysisReport { groups, plot })
}
