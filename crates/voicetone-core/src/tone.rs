//! Tone statistics and vocal register classification
//!
//! Computes per-group pitch statistics and maps the mean pitch onto a
//! coarse vocal register through ordered, half-open threshold bins. The
//! comparisons are strict, so a mean sitting exactly on a cut point takes
//! the bin above it.

use serde::{Deserialize, Serialize};

use crate::cluster::{SpeakerGroup, SpeakerLabel};

/// Vocal register derived from mean pitch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Register {
    Bass,
    Baritone,
    Tenor,
    Contralto,
    MezzoSoprano,
    Soprano,
}

impl Register {
    /// Get the display name of this register
    pub fn name(&self) -> &'static str {
        match self {
            Register::Bass => "Bass",
            Register::Baritone => "Baritone",
            Register::Tenor => "Tenor",
            Register::Contralto => "Contralto",
            Register::MezzoSoprano => "Mezzo-soprano",
            Register::Soprano => "Soprano",
        }
    }
}

/// Register thresholds in Hz.
///
/// Each side is a pair of ascending cut points splitting the mean-pitch axis
/// into three bins. These are conventional values, kept configurable rather
/// than derived from the recording.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterConfig {
    /// Male means below this are Bass
    pub male_bass_max_hz: f64,
    /// Male means below this (and at or above the bass cut) are Baritone; the rest are Tenor
    pub male_baritone_max_hz: f64,
    /// Female means below this are Contralto
    pub female_contralto_max_hz: f64,
    /// Female means below this (and at or above the contralto cut) are Mezzo-soprano; the rest are Soprano
    pub female_mezzo_max_hz: f64,
}

impl Default for RegisterConfig {
    fn default() -> Self {
        Self {
            male_bass_max_hz: 110.0,
            male_baritone_max_hz: 130.0,
            female_contralto_max_hz: 220.0,
            female_mezzo_max_hz: 260.0,
        }
    }
}

impl RegisterConfig {
    /// Validate and repair the cut points so each side stays ascending
    pub fn validate(&mut self) {
        let defaults = Self::default();
        if !self.male_bass_max_hz.is_finite() || self.male_bass_max_hz <= 0.0 {
            self.male_bass_max_hz = defaults.male_bass_max_hz;
        }
        if !self.male_baritone_max_hz.is_finite()
            || self.male_baritone_max_hz <= self.male_bass_max_hz
        {
            self.male_baritone_max_hz = self.male_bass_max_hz + 20.0;
        }
        if !self.female_contralto_max_hz.is_finite() || self.female_contralto_max_hz <= 0.0 {
            self.female_contralto_max_hz = defaults.female_contralto_max_hz;
        }
        if !self.female_mezzo_max_hz.is_finite()
            || self.female_mezzo_max_hz <= self.female_contralto_max_hz
        {
            self.female_mezzo_max_hz = self.female_contralto_max_hz + 40.0;
        }
    }
}

/// Map a group's mean pitch onto a register.
///
/// Total over positive means: exactly one bin applies. Comparisons are
/// strict, so a mean equal to a cut point lands in the bin above it.
pub fn classify_register(mean_hz: f64, label: SpeakerLabel, config: &RegisterConfig) -> Register {
    match label {
        SpeakerLabel::Male => {
            if mean_hz < config.male_bass_max_hz {
                Register::Bass
            } else if mean_hz < config.male_baritone_max_hz {
                Register::Baritone
            } else {
                Register::Tenor
            }
        }
        SpeakerLabel::Female => {
            if mean_hz < config.female_contralto_max_hz {
                Register::Contralto
            } else if mean_hz < config.female_mezzo_max_hz {
                Register::MezzoSoprano
            } else {
                Register::Soprano
            }
        }
    }
}

/// Per-group pitch statistics and derived register
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToneStats {
    /// Mean pitch in Hz
    pub mean_hz: f64,
    /// Population standard deviation in Hz
    pub std_hz: f64,
    /// Lowest pitch sample in Hz
    pub min_hz: f64,
    /// Highest pitch sample in Hz
    pub max_hz: f64,
    /// Tonal range (max - min) in Hz
    pub range_hz: f64,
    /// Register derived from the mean
    pub register: Register,
}

impl ToneStats {
    /// Compute statistics for one speaker group.
    ///
    /// Returns `None` for a group that received no samples.
    pub fn from_group(group: &SpeakerGroup, config: &RegisterConfig) -> Option<ToneStats> {
        let pitches = &group.pitches;
        if pitches.is_empty() {
            return None;
        }

        let n = pitches.len() as f64;
        let mean = pitches.iter().sum::<f64>() / n;
        let variance = pitches.iter().map(|p| (p - mean) * (p - mean)).sum::<f64>() / n;
        let min = pitches.iter().copied().fold(f64::INFINITY, f64::min);
        let max = pitches.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Some(ToneStats {
            mean_hz: mean,
            std_hz: variance.sqrt(),
            min_hz: min,
            max_hz: max,
            range_hz: max - min,
            register: classify_register(mean, group.label, config),
        })
    }
}
