//! Discretised device cross-section.
//!
//! Sample points sit at `step/2, 3·step/2, ...` strictly below the total
//! thickness. Each point belongs to the layer whose cumulative boundary is
//! the first one reached or passed, so a point lying exactly on a boundary
//! goes to the layer in front of it.

use std::ops::Range;

use super::Stack;
use crate::config::ConfigError;

/// Index of the layer containing depth `x`.
///
/// `boundaries` are the cumulative layer thicknesses (non-decreasing, the
/// first entry being the zero-thickness incidence medium). The result is the
/// number of boundaries strictly below `x`.
pub fn locate_layer(boundaries: &[f64], x: f64) -> usize {
    boundaries.partition_point(|&b| b < x)
}

/// Sample positions through the stack and the layer each one falls in.
#[derive(Debug, Clone)]
pub struct CrossSection {
    step: f64,
    boundaries: Vec<f64>,
    positions: Vec<f64>,
    layer_of: Vec<usize>,
    layer_ranges: Vec<Range<usize>>,
}

impl CrossSection {
    /// Discretise `stack` with spacing `step` nm.
    pub fn new(stack: &Stack, step: f64) -> Result<Self, ConfigError> {
        if !step.is_finite() || step <= 0.0 {
            return Err(ConfigError::NonPositiveStep {
                name: "spatial step",
                value: step,
            });
        }

        let boundaries: Vec<f64> = stack
            .thicknesses()
            .iter()
            .scan(0.0, |sum, &t| {
                *sum += t;
                Some(*sum)
            })
            .collect();
        let total = boundaries[boundaries.len() - 1];

        let start = step / 2.0;
        let count = if total > start {
            ((total - start) / step).ceil() as usize
        } else {
            0
        };
        let positions: Vec<f64> = (0..count).map(|k| start + k as f64 * step).collect();
        let layer_of: Vec<usize> = positions
            .iter()
            .map(|&x| locate_layer(&boundaries, x))
            .collect();

        // Positions are sorted, so each layer owns a contiguous run of them
        let layer_ranges = (0..boundaries.len())
            .map(|layer| {
                let begin = layer_of.partition_point(|&l| l < layer);
                let end = layer_of.partition_point(|&l| l <= layer);
                begin..end
            })
            .collect();

        Ok(Self {
            step,
            boundaries,
            positions,
            layer_of,
            layer_ranges,
        })
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Cumulative layer boundaries in nm
    pub fn boundaries(&self) -> &[f64] {
        &self.boundaries
    }

    /// Sample depths in nm measured from the front of layer 1
    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    /// Layer index of every sample
    pub fn layer_of(&self) -> &[usize] {
        &self.layer_of
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Range of sample indices falling inside `layer`
    pub fn samples_in(&self, layer: usize) -> Range<usize> {
        self.layer_ranges.get(layer).cloned().unwrap_or(0..0)
    }

    /// Depth at which `layer` begins
    pub fn layer_start(&self, layer: usize) -> f64 {
        if layer == 0 {
            0.0
        } else {
            self.boundaries[layer - 1]
        }
    }

    /// `(sample index, depth relative to the layer front)` for every sample in `layer`
    pub fn local_depths(&self, layer: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let origin = self.layer_start(layer);
        self.samples_in(layer)
            .map(move |k| (k, self.positions[k] - origin))
    }
}
