//! Terminal rendering of the reference distribution with z-score markers.
//!
//! Stand-in for the original density plot: one line per grid point over
//! [-4, 4], bar length proportional to the KDE value, the impaired region
//! (at or below the cutoff) in red and the preserved region in green. Each
//! computed z-score is marked on the line closest to it.

use colored::Colorize;

use crate::core::ZScoreResult;
use crate::reference::{grid, ReferenceDistribution};

const GRID_POINTS: usize = 33;
const MAX_BAR_WIDTH: usize = 56;
const Z_LO: f64 = -4.0;
const Z_HI: f64 = 4.0;

/// Render the overlay as a multi-line string, ready to print.
pub fn render_overlay(
    distribution: &ReferenceDistribution,
    results: &[ZScoreResult],
    cutoff: f64,
) -> String {
    let xs = grid(Z_LO, Z_HI, GRID_POINTS);
    let ys = distribution.density(&xs);
    let peak = ys.iter().cloned().fold(f64::MIN, f64::max).max(1e-12);

    let mut lines = Vec::with_capacity(GRID_POINTS + 2);
    lines.push(format!(
        "reference distribution ({} samples), impaired at z <= {cutoff}",
        distribution.len()
    ));
    for (index, (&x, &y)) in xs.iter().zip(&ys).enumerate() {
        let width = ((y / peak) * MAX_BAR_WIDTH as f64).round() as usize;
        let bar = "#".repeat(width);
        let bar = if x <= cutoff {
            bar.red().to_string()
        } else {
            bar.green().to_string()
        };
        let marker = marker_for_line(&xs, index, results);
        lines.push(format!("{x:>5.2} |{bar}{marker}"));
    }
    lines.join("\n")
}

/// Marker text for every result whose z-score is closest to this grid line.
fn marker_for_line(xs: &[f64], index: usize, results: &[ZScoreResult]) -> String {
    let mut marker = String::new();
    for result in results {
        let clamped = result.z_score.clamp(Z_LO, Z_HI);
        let nearest = xs
            .iter()
            .enumerate()
            .min_by(|a, b| {
                (a.1 - clamped)
                    .abs()
                    .partial_cmp(&(b.1 - clamped).abs())
                    .unwrap()
            })
            .map(|(i, _)| i)
            .unwrap_or_default();
        if nearest == index {
            marker.push_str(&format!(" <- {} (z = {:.2})", result.test, result.z_score));
        }
    }
    marker
}
