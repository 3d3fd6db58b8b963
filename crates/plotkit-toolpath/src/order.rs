//! Greedy nearest-endpoint path ordering.
//!
//! Starts from the path whose first point has the smallest X and repeatedly
//! appends the remaining path whose start, or end when reversing is
//! strictly shorter, lies nearest to the current end point. Only endpoints
//! are compared. O(n²) in the number of paths.

use crate::primitive::Path;
use plotkit_core::Point;
use tracing::{debug, warn};

/// Distance between two optional endpoints; missing endpoints never win.
fn gap(from: Option<Point>, to: Option<Point>) -> f64 {
    match (from, to) {
        (Some(a), Some(b)) => a.distance_to(&b),
        _ => f64::INFINITY,
    }
}

/// Orders paths to reduce pen-up travel. Empty paths are dropped.
pub fn order_paths(paths: Vec<Path>) -> Vec<Path> {
    let mut remaining: Vec<Path> = Vec::with_capacity(paths.len());
    for path in paths {
        if path.is_empty() {
            warn!(path = %path.id, "dropping path with nothing to draw");
        } else {
            remaining.push(path);
        }
    }

    let mut first = None;
    let mut min_x = f64::INFINITY;
    for (i, path) in remaining.iter().enumerate() {
        if let Some(start) = path.start_point() {
            if first.is_none() || start.x < min_x {
                first = Some(i);
                min_x = start.x;
            }
        }
    }
    let Some(first) = first else {
        return Vec::new();
    };

    let mut ordered = Vec::with_capacity(remaining.len());
    let mut current = remaining.remove(first);
    let mut reversals = 0usize;

    loop {
        let end = current.end_point();
        ordered.push(current);
        if remaining.is_empty() {
            break;
        }

        let mut best = 0;
        let mut best_distance = f64::INFINITY;
        let mut best_reversed = false;
        for (i, candidate) in remaining.iter().enumerate() {
            let mut distance = gap(end, candidate.start_point());
            let mut reversed = false;
            if candidate.is_reversible() {
                let back = gap(end, candidate.end_point());
                if back < distance {
                    distance = back;
                    reversed = true;
                }
            }
            if distance < best_distance {
                best = i;
                best_distance = distance;
                best_reversed = reversed;
            }
        }

        current = remaining.remove(best);
        if best_reversed {
            current.reverse();
            reversals += 1;
        }
    }

    debug!(paths = ordered.len(), reversals, "ordered paths");
    ordered
}

/// Total pen-up distance between consecutive paths.
pub fn travel_distance(paths: &[Path]) -> f64 {
    paths
        .windows(2)
        .map(|pair| gap(pair[0].end_point(), pair[1].start_point()))
        .filter(|d| d.is_finite())
        .sum()
}
