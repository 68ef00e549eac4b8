//! Pitch density plot rendering
//!
//! Draws a Gaussian kernel density curve per speaker group with plotters.
//! Density estimation needs at least two distinct samples per group; any
//! failure here is reported to the caller, who treats it as "no plot"
//! rather than a failed run.

use std::path::Path;

use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cluster::SpeakerPartition;

/// Errors that can occur while rendering the density plot
#[derive(Debug, Error)]
pub enum PlotError {
    #[error("Density estimation needs at least 2 samples, got {0}")]
    TooFewSamples(usize),

    #[error("Density estimation undefined for zero-variance data")]
    ZeroBandwidth,

    #[error("Failed to render plot: {0}")]
    Render(String),
}

/// Plot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    /// Output image width in pixels
    pub width: u32,
    /// Output image height in pixels
    pub height: u32,
    /// Number of evaluation points per density curve
    pub grid_points: usize,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 600,
            grid_points: 200,
        }
    }
}

impl PlotConfig {
    /// Validate and clamp values to usable ranges
    pub fn validate(&mut self) {
        self.width = self.width.clamp(64, 8192);
        self.height = self.height.clamp(64, 8192);
        self.grid_points = self.grid_points.clamp(16, 4096);
    }
}

/// Gaussian kernel density estimate evaluated on an evenly spaced grid
/// spanning the sample range. Bandwidth follows Scott's rule.
fn gaussian_kde(samples: &[f64], grid_points: usize) -> Result<Vec<(f64, f64)>, PlotError> {
    if samples.len() < 2 {
        return Err(PlotError::TooFewSamples(samples.len()));
    }
    let grid_points = grid_points.max(2);

    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let variance = samples.iter().map(|s| (s - mean) * (s - mean)).sum::<f64>() / (n - 1.0);
    let std = variance.sqrt();

    if !std.is_finite() || std <= 0.0 {
        return Err(PlotError::ZeroBandwidth);
    }

    let bandwidth = std * n.powf(-0.2);
    let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
    let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let norm = 1.0 / (n * bandwidth * (2.0 * std::f64::consts::PI).sqrt());

    let curve = (0..grid_points)
        .map(|i| {
            let x = min + (max - min) * i as f64 / (grid_points - 1) as f64;
            let density = norm
                * samples
                    .iter()
                    .map(|&s| (-0.5 * ((x - s) / bandwidth).powi(2)).exp())
                    .sum::<f64>();
            (x, density)
        })
        .collect();

    Ok(curve)
}

/// Render the per-group pitch density curves to a PNG file.
///
/// Both groups must admit a density estimate; otherwise the whole plot is
/// skipped and the error returned.
pub fn render_density_plot(
    partition: &SpeakerPartition,
    path: &Path,
    config: &PlotConfig,
) -> Result<(), PlotError> {
    const COLORS: [&RGBColor; 2] = [&BLUE, &RED];

    // Estimate every curve before touching the backend
    let mut curves = Vec::new();
    for group in partition.groups() {
        let curve = gaussian_kde(&group.pitches, config.grid_points)?;
        curves.push((group.label.name(), curve));
    }

    let x_min = curves
        .iter()
        .flat_map(|(_, c)| c.iter().map(|&(x, _)| x))
        .fold(f64::INFINITY, f64::min);
    let x_max = curves
        .iter()
        .flat_map(|(_, c)| c.iter().map(|&(x, _)| x))
        .fold(f64::NEG_INFINITY, f64::max);
    let y_max = curves
        .iter()
        .flat_map(|(_, c)| c.iter().map(|&(_, y)| y))
        .fold(0.0f64, f64::max);

    let render = || -> Result<(), Box<dyn std::error::Error>> {
        let root =
            BitMapBackend::new(path, (config.width, config.height)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Pitch Distribution by Speaker", ("sans-serif", 28))
            .margin(12)
            .x_label_area_size(44)
            .y_label_area_size(56)
            .build_cartesian_2d(x_min..x_max, 0.0..y_max * 1.05)?;

        chart
            .configure_mesh()
            .x_desc("Frequency (Hz)")
            .y_desc("Density")
            .draw()?;

        for (i, (name, curve)) in curves.iter().enumerate() {
            let color = COLORS[i % COLORS.len()];
            chart
                .draw_series(LineSeries::new(curve.iter().copied(), color))?
                .label(*name)
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 18, y)], color)
                });
        }

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;

        root.present()?;
        Ok(())
    };

    render().map_err(|e| PlotError::Render(e.to_string()))?;

    log::info!("render_density_plot: wrote {:?}", path);
    Ok(())
}
