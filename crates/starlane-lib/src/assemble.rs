//! Turn graph paths into ranked, drawable route descriptors.
//!
//! Colour assignment is an explicit policy: the top-ranked route keeps the
//! colour the caller asked for, and every later route receives a distinct
//! generated colour chosen by [`AlternateColorPolicy`].

use std::collections::HashSet;
use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::path::GraphPath;
use crate::star::{DatasetId, StarCatalog, StarId, StarPosition};

/// Saturation used for palette colours.
const PALETTE_SATURATION: f64 = 0.75;

/// Brightness used for palette colours.
const PALETTE_VALUE: f64 = 0.95;

/// Hue step between consecutive palette colours (golden-ratio conjugate),
/// which keeps successive hues far apart.
const GOLDEN_RATIO_CONJUGATE: f64 = 0.618_033_988_749_895;

/// Attempts made to find an unused colour before accepting a repeat.
const MAX_COLOR_ATTEMPTS: usize = 64;

/// RGB colour with channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteColor {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

impl RouteColor {
    pub const CYAN: RouteColor = RouteColor {
        red: 0.0,
        green: 1.0,
        blue: 1.0,
    };

    /// Build a colour, clamping each channel into range.
    pub fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self {
            red: clamp_channel(red),
            green: clamp_channel(green),
            blue: clamp_channel(blue),
        }
    }

    /// Build a colour from hue, saturation and value, each in `0.0..=1.0`.
    pub fn from_hsv(hue: f64, saturation: f64, value: f64) -> Self {
        let hue = hue.rem_euclid(1.0) * 6.0;
        let sector = hue.floor();
        let fraction = hue - sector;
        let p = value * (1.0 - saturation);
        let q = value * (1.0 - saturation * fraction);
        let t = value * (1.0 - saturation * (1.0 - fraction));
        let (red, green, blue) = match sector as u8 {
            0 => (value, t, p),
            1 => (q, value, p),
            2 => (p, value, t),
            3 => (p, q, value),
            4 => (t, p, value),
            _ => (value, p, q),
        };
        Self::rgb(red, green, blue)
    }

    /// Parse `#rrggbb` (the leading `#` is optional).
    pub fn from_hex(text: &str) -> Option<Self> {
        let digits = text.strip_prefix('#').unwrap_or(text);
        let bytes = hex::decode(digits).ok()?;
        let [red, green, blue] = <[u8; 3]>::try_from(bytes).ok()?;
        Some(Self::rgb(
            f64::from(red) / 255.0,
            f64::from(green) / 255.0,
            f64::from(blue) / 255.0,
        ))
    }

    /// Format as `#rrggbb`.
    pub fn to_hex(&self) -> String {
        format!("#{}", hex::encode(self.to_bytes()))
    }

    fn to_bytes(self) -> [u8; 3] {
        [
            (self.red * 255.0).round() as u8,
            (self.green * 255.0).round() as u8,
            (self.blue * 255.0).round() as u8,
        ]
    }
}

impl Default for RouteColor {
    fn default() -> Self {
        Self::CYAN
    }
}

impl fmt::Display for RouteColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

fn clamp_channel(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// How colours are chosen for routes ranked after the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlternateColorPolicy {
    /// Deterministic golden-ratio hue rotation.
    #[default]
    Palette,
    /// Pseudo-random colours reproducible from the seed.
    Seeded(u64),
    /// Fresh random colours on every search.
    Random,
}

/// Display-only attributes of a route. Never part of cache identity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteStyle {
    pub color: RouteColor,
    pub line_width: f64,
}

impl Default for RouteStyle {
    fn default() -> Self {
        Self {
            color: RouteColor::default(),
            line_width: 0.5,
        }
    }
}

/// Drawable description of a single route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteDescriptor {
    /// Route label; the rank as text.
    pub name: String,
    pub origin: String,
    pub destination: String,
    pub dataset: DatasetId,
    pub color: RouteColor,
    pub line_width: f64,
    pub star_ids: Vec<StarId>,
    pub star_names: Vec<String>,
    /// Polyline through the stars, in route order.
    pub coordinates: Vec<StarPosition>,
    /// Length of each jump; one shorter than `coordinates`.
    pub segment_lengths: Vec<f64>,
    pub total_length: f64,
}

impl RouteDescriptor {
    /// Number of jumps along the route.
    pub fn segment_count(&self) -> usize {
        self.segment_lengths.len()
    }
}

/// One ranked alternative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutingMetric {
    /// 1-based rank; 1 is the shortest.
    pub rank: usize,
    /// Ordered star names along the route.
    pub path: Vec<String>,
    pub descriptor: RouteDescriptor,
    pub total_length: f64,
    pub segment_count: usize,
}

impl RoutingMetric {
    /// Human-readable path such as `Sol -> Alpha -> Barnard`.
    pub fn path_description(&self) -> String {
        self.path.join(" -> ")
    }
}

/// Builds [`RoutingMetric`]s from raw graph paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteAssembler {
    policy: AlternateColorPolicy,
}

impl RouteAssembler {
    pub fn new(policy: AlternateColorPolicy) -> Self {
        Self { policy }
    }

    /// Resolve each path against `catalog` and rank the survivors 1..N.
    ///
    /// A path naming a star the catalog does not know is dropped on its own;
    /// the remaining paths are still returned.
    pub fn assemble(
        &self,
        catalog: &StarCatalog<'_>,
        paths: &[GraphPath],
        style: RouteStyle,
        dataset: &DatasetId,
    ) -> Vec<RoutingMetric> {
        let mut colors = ColorSource::new(self.policy, style.color);
        let mut metrics = Vec::with_capacity(paths.len());

        for path in paths {
            let Some(stars) = path
                .vertices
                .iter()
                .map(|name| catalog.get(name))
                .collect::<Option<Vec<_>>>()
            else {
                warn!(path = %path.describe(), "dropping route with unresolved star");
                continue;
            };
            if stars.is_empty() {
                continue;
            }

            let rank = metrics.len() + 1;
            let color = if rank == 1 { style.color } else { colors.next_color() };

            let coordinates: Vec<StarPosition> = stars.iter().map(|star| star.position).collect();
            let segment_lengths: Vec<f64> = coordinates
                .windows(2)
                .map(|pair| pair[0].distance_to(&pair[1]))
                .collect();
            let total_length: f64 = segment_lengths.iter().sum();

            let descriptor = RouteDescriptor {
                name: rank.to_string(),
                origin: stars[0].name.clone(),
                destination: stars[stars.len() - 1].name.clone(),
                dataset: dataset.clone(),
                color,
                line_width: style.line_width,
                star_ids: stars.iter().map(|star| star.id).collect(),
                star_names: path.vertices.clone(),
                coordinates,
                segment_lengths,
                total_length,
            };

            metrics.push(RoutingMetric {
                rank,
                path: path.vertices.clone(),
                segment_count: descriptor.segment_count(),
                total_length,
                descriptor,
            });
        }

        metrics
    }
}

/// Produces colours for alternate routes, avoiding repeats.
struct ColorSource {
    /// `None` for the palette policy.
    rng: Option<StdRng>,
    hue: f64,
    issued: HashSet<[u8; 3]>,
}

impl ColorSource {
    fn new(policy: AlternateColorPolicy, requested: RouteColor) -> Self {
        let rng = match policy {
            AlternateColorPolicy::Palette => None,
            AlternateColorPolicy::Seeded(seed) => Some(StdRng::seed_from_u64(seed)),
            AlternateColorPolicy::Random => Some(StdRng::from_entropy()),
        };
        Self {
            rng,
            hue: 0.0,
            issued: HashSet::from([requested.to_bytes()]),
        }
    }

    fn next_color(&mut self) -> RouteColor {
        let mut candidate = self.generate();
        for _ in 0..MAX_COLOR_ATTEMPTS {
            if !self.issued.contains(&candidate.to_bytes()) {
                break;
            }
            candidate = self.generate();
        }
        self.issued.insert(candidate.to_bytes());
        candidate
    }

    fn generate(&mut self) -> RouteColor {
        match self.rng.as_mut() {
            Some(rng) => RouteColor::rgb(rng.gen(), rng.gen(), rng.gen()),
            None => {
                self.hue = (self.hue + GOLDEN_RATIO_CONJUGATE).rem_euclid(1.0);
                RouteColor::from_hsv(self.hue, PALETTE_SATURATION, PALETTE_VALUE)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::star::StarNode;

    fn stars() -> Vec<StarNode> {
        vec![
            StarNode::new(1, "A", StarPosition::new(0.0, 0.0, 0.0)),
            StarNode::new(2, "B", StarPosition::new(3.0, 0.0, 0.0)),
            StarNode::new(3, "C", StarPosition::new(3.0, 4.0, 0.0)),
        ]
    }

    fn path(names: &[&str], weight: f64) -> GraphPath {
        GraphPath {
            vertices: names.iter().map(|name| name.to_string()).collect(),
            weight,
        }
    }

    #[test]
    fn hex_round_trip() {
        let color = RouteColor::from_hex("#ff8000").unwrap();
        assert_eq!(color.to_hex(), "#ff8000");
        assert!(RouteColor::from_hex("#ff80").is_none());
        assert!(RouteColor::from_hex("zzzzzz").is_none());
    }

    #[test]
    fn builds_polyline_and_lengths() {
        let stars = stars();
        let catalog = StarCatalog::new(&stars);
        let metrics = RouteAssembler::default().assemble(
            &catalog,
            &[path(&["A", "B", "C"], 7.0)],
            RouteStyle::default(),
            &DatasetId::new("local"),
        );

        assert_eq!(metrics.len(), 1);
        let metric = &metrics[0];
        assert_eq!(metric.rank, 1);
        assert_eq!(metric.total_length, 7.0);
        assert_eq!(metric.segment_count, 2);
        assert_eq!(metric.descriptor.segment_lengths, vec![3.0, 4.0]);
        assert_eq!(metric.descriptor.star_ids, vec![1, 2, 3]);
        assert_eq!(metric.descriptor.coordinates.len(), 3);
        assert_eq!(metric.descriptor.dataset.as_str(), "local");
        assert_eq!(metric.path_description(), "A -> B -> C");
    }

    #[test]
    fn unresolved_paths_are_dropped_and_ranks_stay_dense() {
        let stars = stars();
        let catalog = StarCatalog::new(&stars);
        let metrics = RouteAssembler::default().assemble(
            &catalog,
            &[
                path(&["A", "Ghost", "C"], 5.0),
                path(&["A", "B"], 3.0),
                path(&["A", "C"], 5.0),
            ],
            RouteStyle::default(),
            &DatasetId::default(),
        );

        let ranks: Vec<usize> = metrics.iter().map(|m| m.rank).collect();
        assert_eq!(ranks, vec![1, 2]);
        assert_eq!(metrics[0].path, vec!["A", "B"]);
    }

    #[test]
    fn first_route_keeps_requested_color_and_others_differ() {
        let stars = stars();
        let catalog = StarCatalog::new(&stars);
        let requested = RouteColor::rgb(1.0, 0.0, 0.0);
        let style = RouteStyle {
            color: requested,
            line_width: 1.5,
        };
        let paths = [
            path(&["A", "B"], 3.0),
            path(&["A", "C"], 5.0),
            path(&["B", "C"], 4.0),
            path(&["A", "B", "C"], 7.0),
        ];

        for policy in [
            AlternateColorPolicy::Palette,
            AlternateColorPolicy::Seeded(42),
            AlternateColorPolicy::Random,
        ] {
            let metrics = RouteAssembler::new(policy).assemble(
                &catalog,
                &paths,
                style,
                &DatasetId::default(),
            );
            assert_eq!(metrics[0].descriptor.color, requested);
            let hexes: HashSet<String> = metrics
                .iter()
                .map(|metric| metric.descriptor.color.to_hex())
                .collect();
            assert_eq!(hexes.len(), metrics.len(), "{policy:?} repeated a colour");
            assert!(metrics.iter().all(|m| m.descriptor.line_width == 1.5));
        }
    }

    #[test]
    fn deterministic_policies_repeat_across_runs() {
        let stars = stars();
        let catalog = StarCatalog::new(&stars);
        let paths = [path(&["A", "B"], 3.0), path(&["A", "C"], 5.0)];

        for policy in [AlternateColorPolicy::Palette, AlternateColorPolicy::Seeded(9)] {
            let assembler = RouteAssembler::new(policy);
            let dataset = DatasetId::default();
            let first = assembler.assemble(&catalog, &paths, RouteStyle::default(), &dataset);
            let second = assembler.assemble(&catalog, &paths, RouteStyle::default(), &dataset);
            assert_eq!(first[1].descriptor.color, second[1].descriptor.color);
        }
    }
}
