//! Analysis report assembly
//!
//! The report is the user-facing product of one pipeline run: per-speaker
//! statistics plus the path of the density plot when one was rendered.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::cluster::SpeakerLabel;
use crate::tone::ToneStats;

/// Statistics for one speaker group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeakerReport {
    pub label: SpeakerLabel,
    pub stats: ToneStats,
}

/// Result of one analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Per-speaker summaries, male group first
    pub groups: Vec<SpeakerReport>,
    /// Path of the rendered density plot, if one was produced
    pub plot: Option<PathBuf>,
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for group in &self.groups {
            writeln!(f, "Analysis for {}:", group.label.name())?;
            writeln!(f, "  Voice type: {}", group.stats.register.name())?;
            writeln!(f, "  Mean pitch: {:.2} Hz", group.stats.mean_hz)?;
            writeln!(f, "  Pitch range: {:.2} Hz", group.stats.range_hz)?;
            writeln!(f)?;
        }
        if let Some(plot) = &self.plot {
            writeln!(f, "Density plot saved to {}", plot.display())?;
        }
        Ok(())
    }
}
