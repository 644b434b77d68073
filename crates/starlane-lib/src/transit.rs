//! Transit discovery: which star pairs are a permissible single jump apart.
//!
//! Two strategies produce the same edge list:
//!
//! - [`BruteForceTransits`] compares every unordered pair. Lowest overhead for
//!   small star counts.
//! - [`KdTreeTransits`] indexes the stars in a kiddo KD-tree (k=3) and runs one
//!   radius query per star, which is O(n log n) on realistic data.
//!
//! [`AdaptiveTransits`] picks between them by star count. Whichever runs, the
//! candidate distance is always recomputed with
//! [`StarPosition::distance_to`](crate::StarPosition::distance_to) and tested
//! against the same inclusive bounds, so the edge set and its ordering do not
//! depend on the strategy.

use kiddo::float::kdtree::KdTree;
use kiddo::SquaredEuclidean;
use serde::Serialize;
use tracing::debug;

use crate::config::DEFAULT_KD_TREE_THRESHOLD;
use crate::error::{Error, Result};
use crate::star::StarNode;

/// KD-tree bucket size (kiddo default).
const BUCKET_SIZE: usize = 32;

/// Relative slack added to the KD-tree query radius. Candidates are filtered
/// exactly afterwards, so over-fetching by a hair never changes the result.
const QUERY_SLACK: f64 = 1e-9;

/// Inclusive jump distance range in light-years.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistanceBounds {
    lower: f64,
    upper: f64,
}

impl DistanceBounds {
    /// Validate and build a bound pair. Both ends must be finite,
    /// non-negative, and ordered.
    pub fn new(lower: f64, upper: f64) -> Result<Self> {
        let valid = lower.is_finite() && upper.is_finite() && lower >= 0.0 && lower <= upper;
        if !valid {
            return Err(Error::InvalidBounds { lower, upper });
        }
        Ok(Self { lower, upper })
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    pub fn contains(&self, distance: f64) -> bool {
        self.lower <= distance && distance <= self.upper
    }
}

/// A permissible direct jump between two stars.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitEdge {
    pub source: String,
    pub target: String,
    pub distance: f64,
}

/// Strategy for discovering transits among a pruned star list.
pub trait TransitCalculator: Send + Sync {
    /// Identifier used in logs.
    fn name(&self) -> &'static str;

    /// Return every unordered star pair whose distance lies within `bounds`.
    ///
    /// Edges are ordered by the index of their first star, then their second,
    /// with `source` always the earlier star of the input list.
    fn calculate(&self, stars: &[&StarNode], bounds: DistanceBounds) -> Result<Vec<TransitEdge>>;
}

/// Pairwise O(n²) comparison.
#[derive(Debug, Clone, Copy, Default)]
pub struct BruteForceTransits;

impl TransitCalculator for BruteForceTransits {
    fn name(&self) -> &'static str {
        "brute-force"
    }

    fn calculate(&self, stars: &[&StarNode], bounds: DistanceBounds) -> Result<Vec<TransitEdge>> {
        ensure_finite_positions(stars)?;

        let mut edges = Vec::new();
        for (i, from) in stars.iter().enumerate() {
            for to in &stars[i + 1..] {
                let distance = from.position.distance_to(&to.position);
                if bounds.contains(distance) {
                    edges.push(make_edge(from, to, distance));
                }
            }
        }

        debug!(
            stars = stars.len(),
            transits = edges.len(),
            "brute-force transit scan complete"
        );
        Ok(edges)
    }
}

/// Radius queries against a KD-tree built per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct KdTreeTransits;

impl TransitCalculator for KdTreeTransits {
    fn name(&self) -> &'static str {
        "kd-tree"
    }

    fn calculate(&self, stars: &[&StarNode], bounds: DistanceBounds) -> Result<Vec<TransitEdge>> {
        ensure_finite_positions(stars)?;
        if stars.len() < 2 {
            return Ok(Vec::new());
        }

        let mut tree: KdTree<f64, usize, 3, BUCKET_SIZE, u32> = KdTree::new();
        for (index, star) in stars.iter().enumerate() {
            tree.add(&star.position.to_array(), index);
        }

        let reach = bounds.upper() * (1.0 + QUERY_SLACK) + QUERY_SLACK;
        let squared_reach = reach * reach;

        let mut pairs: Vec<(usize, usize, f64)> = Vec::new();
        for (i, star) in stars.iter().enumerate() {
            let candidates = tree.within::<SquaredEuclidean>(&star.position.to_array(), squared_reach);
            for candidate in candidates {
                let j = candidate.item;
                if j <= i {
                    continue;
                }
                let distance = star.position.distance_to(&stars[j].position);
                if bounds.contains(distance) {
                    pairs.push((i, j, distance));
                }
            }
        }

        pairs.sort_unstable_by_key(|&(i, j, _)| (i, j));
        let edges: Vec<TransitEdge> = pairs
            .into_iter()
            .map(|(i, j, distance)| make_edge(stars[i], stars[j], distance))
            .collect();

        debug!(
            stars = stars.len(),
            transits = edges.len(),
            "kd-tree transit queries complete"
        );
        Ok(edges)
    }
}

/// Uses brute force up to `threshold` stars and the KD-tree above it.
#[derive(Debug, Clone, Copy)]
pub struct AdaptiveTransits {
    threshold: usize,
}

impl AdaptiveTransits {
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }

    /// The strategy used for `star_count` stars.
    pub fn select(&self, star_count: usize) -> &'static dyn TransitCalculator {
        if star_count > self.threshold {
            &KdTreeTransits
        } else {
            &BruteForceTransits
        }
    }
}

impl Default for AdaptiveTransits {
    fn default() -> Self {
        Self::new(DEFAULT_KD_TREE_THRESHOLD)
    }
}

impl TransitCalculator for AdaptiveTransits {
    fn name(&self) -> &'static str {
        "adaptive"
    }

    fn calculate(&self, stars: &[&StarNode], bounds: DistanceBounds) -> Result<Vec<TransitEdge>> {
        let inner = self.select(stars.len());
        debug!(
            strategy = inner.name(),
            stars = stars.len(),
            lower = bounds.lower(),
            upper = bounds.upper(),
            "calculating transits"
        );
        inner.calculate(stars, bounds)
    }
}

fn make_edge(from: &StarNode, to: &StarNode, distance: f64) -> TransitEdge {
    TransitEdge {
        source: from.name.clone(),
        target: to.name.clone(),
        distance,
    }
}

fn ensure_finite_positions(stars: &[&StarNode]) -> Result<()> {
    match stars.iter().find(|star| !star.position.is_finite()) {
        Some(star) => Err(Error::InvalidPosition {
            name: star.name.clone(),
        }),
        None => Ok(()),
    }
}
