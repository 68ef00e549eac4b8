//! Speaker grouping by 1-D pitch clustering
//!
//! Partitions the pitch series into two groups with k-means, treating each
//! pitch value as a single-feature observation. The group with the lower
//! centroid is labeled Male, the higher Female. The seed is fixed so the
//! same recording always produces the same partition.

use std::cmp::Ordering;

use linfa::traits::{Fit, Predict};
use linfa::DatasetBase;
use linfa_clustering::KMeans;
use ndarray::Array2;
use rand_xoshiro::rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{PitchSeries, NUM_SPEAKERS};

/// Errors that can occur while grouping pitch samples
#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("No voiced frames to cluster")]
    EmptyPitch,

    #[error("Too few pitch samples to form two groups: {0}")]
    TooFewSamples(usize),

    #[error("K-means fit failed: {0}")]
    Fit(String),
}

/// Speaker label assigned to a pitch cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpeakerLabel {
    Male,
    Female,
}

impl SpeakerLabel {
    /// Get the display name of this label
    pub fn name(&self) -> &'static str {
        match self {
            SpeakerLabel::Male => "Male",
            SpeakerLabel::Female => "Female",
        }
    }
}

/// One speaker group: the pitch samples assigned to a cluster plus its centroid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeakerGroup {
    pub label: SpeakerLabel,
    /// Cluster center in Hz
    pub centroid_hz: f64,
    /// Pitch samples assigned to this cluster, in Hz
    pub pitches: Vec<f64>,
}

/// Both speaker groups, ordered by ascending centroid.
///
/// Invariants: every input sample lands in exactly one group, and the male
/// centroid is never above the female centroid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeakerPartition {
    pub male: SpeakerGroup,
    pub female: SpeakerGroup,
}

impl SpeakerPartition {
    /// Both groups, male first
    pub fn groups(&self) -> [&SpeakerGroup; NUM_SPEAKERS] {
        [&self.male, &self.female]
    }
}

/// Clustering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// RNG seed for centroid initialization (fixed for reproducibility)
    pub seed: u64,
    /// Iteration cap for the k-means solver
    pub max_iterations: u64,
    /// Convergence tolerance on centroid movement
    pub tolerance: f64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            max_iterations: 300,
            tolerance: 1e-4,
        }
    }
}

impl ClusterConfig {
    /// Validate and clamp values to usable ranges
    pub fn validate(&mut self) {
        if self.max_iterations == 0 {
            self.max_iterations = 300;
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            self.tolerance = 1e-4;
        }
    }
}

/// Partition a pitch series into two speaker groups.
///
/// An empty series returns [`ClusterError::EmptyPitch`] without invoking the
/// solver; a series with fewer samples than groups returns
/// [`ClusterError::TooFewSamples`].
pub fn split_speakers(
    pitches: &PitchSeries,
    config: &ClusterConfig,
) -> Result<SpeakerPartition, ClusterError> {
    if pitches.is_empty() {
        return Err(ClusterError::EmptyPitch);
    }
    if pitches.len() < NUM_SPEAKERS {
        return Err(ClusterError::TooFewSamples(pitches.len()));
    }

    // Single-feature observations: one row per pitch sample
    let observations = Array2::from_shape_fn((pitches.len(), 1), |(i, _)| pitches[i]);

    let rng = Xoshiro256Plus::seed_from_u64(config.seed);
    let dataset = DatasetBase::from(observations.clone());

    let model = KMeans::params_with_rng(NUM_SPEAKERS, rng)
        .max_n_iterations(config.max_iterations)
        .tolerance(config.tolerance)
        .fit(&dataset)
        .map_err(|e| ClusterError::Fit(e.to_string()))?;

    let assignments = model.predict(&observations);
    let centroids = model.centroids();

    let mut grouped: Vec<Vec<f64>> = vec![Vec::new(); NUM_SPEAKERS];
    for (sample, &cluster) in pitches.iter().zip(assignments.iter()) {
        grouped[cluster].push(*sample);
    }

    // Lower centroid reads as the male group
    let mut order: Vec<usize> = (0..NUM_SPEAKERS).collect();
    order.sort_by(|&a, &b| {
        centroids[[a, 0]]
            .partial_cmp(&centroids[[b, 0]])
            .unwrap_or(Ordering::Equal)
    });

    let male = SpeakerGroup {
        label: SpeakerLabel::Male,
        centroid_hz: centroids[[order[0], 0]],
        pitches: std::mem::take(&mut grouped[order[0]]),
    };
    let female = SpeakerGroup {
        label: SpeakerLabel::Female,
        centroid_hz: centroids[[order[1], 0]],
        pitches: std::mem::take(&mut grouped[order[1]]),
    };

    log::info!(
        "split_speakers: {} male / {} female samples (centroids {:.1}Hz / {:.1}Hz)",
        male.pitches.len(),
        female.pitches.len(),
        male.centroid_hz,
        female.centroid_hz
    );

    Ok(SpeakerPartition { male, female })
}
