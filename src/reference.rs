//! Reference z-score distribution of the healthy population.
//!
//! A flat array of standard-normal samples, loaded once at startup and used
//! only for plotting; it plays no part in the numeric transform.

use log::debug;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::errors::{BicamsError, Result};

#[derive(Debug, Clone)]
pub struct ReferenceDistribution {
    samples: Vec<f64>,
}

impl ReferenceDistribution {
    /// Load the sample from a file of one float per line. Missing or garbled
    /// data is fatal.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            BicamsError::data_unavailable("reference sample", path, e.to_string())
        })?;
        let mut samples = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let value: f64 = trimmed.parse().map_err(|_| {
                BicamsError::data_unavailable(
                    "reference sample",
                    path,
                    format!("line {}: `{trimmed}` is not a number", index + 1),
                )
            })?;
            samples.push(value);
        }
        if samples.is_empty() {
            return Err(BicamsError::data_unavailable(
                "reference sample",
                path,
                "file contains no samples",
            ));
        }
        debug!("loaded {} reference samples from {}", samples.len(), path.display());
        Ok(Self { samples })
    }

    pub fn from_samples(samples: Vec<f64>) -> Result<Self> {
        if samples.is_empty() {
            return Err(BicamsError::resource(
                "reference sample",
                "sample array is empty",
            ));
        }
        Ok(Self { samples })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Gaussian kernel density estimate at each point of `grid`, with
    /// Silverman's rule-of-thumb bandwidth.
    pub fn density(&self, grid: &[f64]) -> Vec<f64> {
        let n = self.samples.len() as f64;
        let bandwidth = 1.06 * self.std_dev().max(1e-9) * n.powf(-0.2);
        let norm = 1.0 / (n * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
        grid.iter()
            .map(|&x| {
                let sum: f64 = self
                    .samples
                    .iter()
                    .map(|&sample| {
                        let u = (x - sample) / bandwidth;
                        (-0.5 * u * u).exp()
                    })
                    .sum();
                norm * sum
            })
            .collect()
    }

    fn mean(&self) -> f64 {
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    fn std_dev(&self) -> f64 {
        let mean = self.mean();
        let variance = self
            .samples
            .iter()
            .map(|&x| (x - mean) * (x - mean))
            .sum::<f64>()
            / self.samples.len() as f64;
        variance.sqrt()
    }
}

/// Evenly spaced grid of `points` values over `[lo, hi]`, inclusive.
pub fn grid(lo: f64, hi: f64, points: usize) -> Vec<f64> {
    debug_assert!(points >= 2);
    let step = (hi - lo) / (points - 1) as f64;
    (0..points).map(|i| lo + step * i as f64).collect()
}
