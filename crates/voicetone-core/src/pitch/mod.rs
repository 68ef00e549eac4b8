//! Frame-wise fundamental frequency extraction
//!
//! Runs the McLeod pitch method over fixed-size frames of the mono buffer
//! and keeps the estimates that fall inside the configured search range.
//! Unvoiced frames (low power or no clear periodicity) are dropped, so the
//! output series can legitimately be empty for silence or noise.

use pitch_detection::detector::mcleod::McLeodDetector;
use pitch_detection::detector::PitchDetector;
use serde::{Deserialize, Serialize};

use crate::types::{AudioBuffer, PitchSeries, DEFAULT_FMAX_HZ, DEFAULT_FMIN_HZ};

/// Pitch extraction configuration
///
/// The defaults cover roughly C2 to C7, a little over the span of human
/// singing voices, with the detector thresholds the McLeod implementation
/// documents for clean signals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PitchConfig {
    /// Lowest accepted fundamental in Hz
    pub fmin_hz: f64,
    /// Highest accepted fundamental in Hz
    pub fmax_hz: f64,
    /// Analysis frame length in samples
    pub frame_size: usize,
    /// Hop between consecutive frames in samples
    pub hop_size: usize,
    /// Minimum frame power (sum of squares) for a frame to count as voiced
    pub power_threshold: f64,
    /// Minimum detector clarity (0-1) for an estimate to be kept
    pub clarity_threshold: f64,
}

impl Default for PitchConfig {
    fn default() -> Self {
        Self {
            fmin_hz: DEFAULT_FMIN_HZ,
            fmax_hz: DEFAULT_FMAX_HZ,
            frame_size: 2048,
            hop_size: 512,
            power_threshold: 5.0,
            clarity_threshold: 0.7,
        }
    }
}

impl PitchConfig {
    /// Validate and clamp values to usable ranges
    pub fn validate(&mut self) {
        if !self.fmin_hz.is_finite() || self.fmin_hz < 20.0 {
            self.fmin_hz = DEFAULT_FMIN_HZ;
        }
        if !self.fmax_hz.is_finite() || self.fmax_hz <= self.fmin_hz {
            self.fmax_hz = DEFAULT_FMAX_HZ.max(self.fmin_hz * 2.0);
        }
        self.frame_size = self.frame_size.clamp(256, 1 << 16);
        self.hop_size = self.hop_size.clamp(1, self.frame_size);
        if !self.power_threshold.is_finite() || self.power_threshold < 0.0 {
            self.power_threshold = 5.0;
        }
        if !self.clarity_threshold.is_finite() {
            self.clarity_threshold = 0.7;
        }
        self.clarity_threshold = self.clarity_threshold.clamp(0.0, 1.0);
    }
}

/// Extract the pitch contour of a mono buffer.
///
/// Returns one estimate per voiced frame, in Hz. A trailing partial frame
/// is skipped. The result is empty when no frame yields an in-range
/// estimate; the caller decides whether that is an error.
pub fn extract_pitch(audio: &AudioBuffer, config: &PitchConfig) -> PitchSeries {
    let frame_size = config.frame_size;
    let hop_size = config.hop_size;

    if audio.samples.len() < frame_size {
        log::warn!(
            "extract_pitch: buffer shorter than one frame ({} < {} samples)",
            audio.samples.len(),
            frame_size
        );
        return Vec::new();
    }

    let mut detector = McLeodDetector::new(frame_size, frame_size / 2);
    let mut frame = vec![0.0f64; frame_size];
    let mut series = Vec::new();

    let n_frames = (audio.samples.len() - frame_size) / hop_size + 1;

    for frame_idx in 0..n_frames {
        let start = frame_idx * hop_size;
        for (dst, &src) in frame
            .iter_mut()
            .zip(&audio.samples[start..start + frame_size])
        {
            *dst = src as f64;
        }

        let estimate = detector.get_pitch(
            &frame,
            audio.sample_rate as usize,
            config.power_threshold,
            config.clarity_threshold,
        );

        if let Some(pitch) = estimate {
            // Range gate also rejects non-finite estimates
            if pitch.frequency >= config.fmin_hz && pitch.frequency <= config.fmax_hz {
                series.push(pitch.frequency);
            }
        }
    }

    log::info!(
        "extract_pitch: {} voiced frames out of {} ({:.0}-{:.0}Hz range)",
        series.len(),
        n_frames,
        config.fmin_hz,
        config.fmax_hz
    );

    series
}
