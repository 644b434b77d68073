//! Tunable thresholds for the route finder.
//!
//! Every limit the pipeline consults lives in [`RoutingConfig`], which is
//! handed to [`RouteFinder`](crate::RouteFinder) at construction. Tests can
//! therefore shrink limits without touching process-wide state.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::assemble::AlternateColorPolicy;
use crate::error::Result;

/// Maximum number of stars that may remain after pruning. Beyond this the
/// K-shortest-path enumeration becomes impractically slow.
pub const DEFAULT_MAX_VERTICES: usize = 1500;

/// Star count above which transits are discovered with a KD-tree instead of a
/// pairwise scan.
pub const DEFAULT_KD_TREE_THRESHOLD: usize = 100;

/// Default number of cached route results.
pub const DEFAULT_CACHE_CAPACITY: usize = 50;

/// Configuration consumed by the route finder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Upper limit on pruned stars (and graph vertices).
    pub max_vertices: usize,
    /// Star count above which the KD-tree transit calculator is used.
    pub kd_tree_threshold: usize,
    /// Number of successful results kept by the route cache.
    pub cache_capacity: usize,
    /// How colours are chosen for routes ranked after the first.
    pub alternate_colors: AlternateColorPolicy,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            max_vertices: DEFAULT_MAX_VERTICES,
            kd_tree_threshold: DEFAULT_KD_TREE_THRESHOLD,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            alternate_colors: AlternateColorPolicy::default(),
        }
    }
}

impl RoutingConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}
