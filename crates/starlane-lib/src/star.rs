use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier for a star, assigned by the owning dataset.
pub type StarId = i64;

/// Cartesian coordinates for a star in light-years.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StarPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl StarPosition {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Calculate the Euclidean distance to another position.
    pub fn distance_to(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub(crate) fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

/// Opaque identity of the dataset a star list came from. Carried into
/// results as metadata only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetId(String);

impl DatasetId {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A star as seen by the route finder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarNode {
    pub id: StarId,
    /// Display name, unique within a single query.
    pub name: String,
    pub position: StarPosition,
    /// Spectral class code such as `"M4V"`; only the first letter matters.
    #[serde(default)]
    pub category: Option<String>,
    /// Polity or group tag.
    #[serde(default)]
    pub affiliation: Option<String>,
}

impl StarNode {
    pub fn new(id: StarId, name: impl Into<String>, position: StarPosition) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            category: None,
            affiliation: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_affiliation(mut self, affiliation: impl Into<String>) -> Self {
        self.affiliation = Some(affiliation.into());
        self
    }

    /// First character of the category code, ignoring blank codes.
    pub fn category_letter(&self) -> Option<char> {
        self.category
            .as_deref()
            .map(str::trim)
            .and_then(|code| code.chars().next())
    }

    /// Affiliation tag, ignoring blank tags.
    pub fn affiliation_tag(&self) -> Option<&str> {
        self.affiliation
            .as_deref()
            .filter(|tag| !tag.trim().is_empty())
    }
}

impl fmt::Display for StarNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Name-indexed view over a borrowed star list.
///
/// Routes and graphs refer to stars by name; the catalog turns those names
/// back into star records without the graph ever holding a star reference.
#[derive(Debug, Clone, Default)]
pub struct StarCatalog<'a> {
    stars: Vec<&'a StarNode>,
    name_to_index: HashMap<&'a str, usize>,
}

impl<'a> StarCatalog<'a> {
    /// Index the given stars. When names repeat the first occurrence wins.
    pub fn new<I>(stars: I) -> Self
    where
        I: IntoIterator<Item = &'a StarNode>,
    {
        let mut catalog = Self::default();
        for star in stars {
            if catalog.name_to_index.contains_key(star.name.as_str()) {
                continue;
            }
            catalog
                .name_to_index
                .insert(star.name.as_str(), catalog.stars.len());
            catalog.stars.push(star);
        }
        catalog
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    /// Whether a star with this exact (case-sensitive) name is present.
    pub fn contains(&self, name: &str) -> bool {
        self.name_to_index.contains_key(name)
    }

    /// Lookup a star by its case-sensitive name.
    pub fn get(&self, name: &str) -> Option<&'a StarNode> {
        self.name_to_index.get(name).map(|&index| self.stars[index])
    }

    pub fn stars(&self) -> &[&'a StarNode] {
        &self.stars
    }
}
