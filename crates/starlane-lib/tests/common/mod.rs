//! Common test utilities and fixture helpers.
//!
//! Provides the local-neighbourhood star fixture shared with the CLI tests,
//! plus synthetic star layouts for algorithm checks.

use std::fs;
use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use starlane_lib::{DatasetId, StarNode, StarPosition};

/// Path to fixtures directory used by tests.
#[allow(dead_code)]
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

/// Twelve stars of the solar neighbourhood with categories and affiliations.
#[allow(dead_code)]
pub fn local_stars() -> Vec<StarNode> {
    let path = fixtures_dir().join("local_stars.json");
    let text = fs::read_to_string(&path).expect("read fixture local_stars.json");
    serde_json::from_str(&text).expect("parse fixture local_stars.json")
}

#[allow(dead_code)]
pub fn local_dataset() -> DatasetId {
    DatasetId::new("local-neighbourhood")
}

/// Three stars five light-years apart on the x axis: A, B, C.
#[allow(dead_code)]
pub fn line_of_stars() -> Vec<StarNode> {
    vec![
        StarNode::new(1, "A", StarPosition::new(0.0, 0.0, 0.0)),
        StarNode::new(2, "B", StarPosition::new(5.0, 0.0, 0.0)),
        StarNode::new(3, "C", StarPosition::new(10.0, 0.0, 0.0)),
    ]
}

/// `count` stars scattered uniformly in a cube of side `extent`.
#[allow(dead_code)]
pub fn random_field(seed: u64, count: usize, extent: f64) -> Vec<StarNode> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|index| {
            let position = StarPosition::new(
                rng.gen_range(0.0..extent),
                rng.gen_range(0.0..extent),
                rng.gen_range(0.0..extent),
            );
            StarNode::new(index as i64 + 1, format!("S{index:04}"), position)
        })
        .collect()
}

/// Stars on an integer `width` x `height` grid in the z = 0 plane, named
/// `G<x>_<y>`.
#[allow(dead_code)]
pub fn grid_of_stars(width: usize, height: usize) -> Vec<StarNode> {
    let mut stars = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let id = (y * width + x) as i64 + 1;
            stars.push(StarNode::new(
                id,
                format!("G{x}_{y}"),
                StarPosition::new(x as f64, y as f64, 0.0),
            ));
        }
    }
    stars
}
