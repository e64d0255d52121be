//! Fragments: the raw geometric records of street furniture.
//!
//! A fragment is one outline from the open-data export (a bench slat, a
//! leg, a frame side). Fragments are immutable once loaded and owned by a
//! [`FragmentStore`]; clustering records which candidate a fragment belongs
//! to outside of the fragment itself.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::core::{CoordinateSystem, GeoPoint, LocalFrame, PartKind, PlanarShape};
use crate::error::GeometryError;

/// Unique fragment identifier (the export's `objectid`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FragmentId(pub u64);

impl fmt::Display for FragmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for FragmentId {
    fn from(id: u64) -> Self {
        FragmentId(id)
    }
}

/// Administrative zone tag (a Paris arrondissement, for instance).
///
/// Deserializes from either a string or an integer, since exports disagree.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Zone(String);

impl Zone {
    /// Label used for fragments that carry no zone tag.
    pub const UNASSIGNED: &'static str = "unassigned";

    /// Create a zone from any string-like label.
    pub fn new(label: impl Into<String>) -> Self {
        Zone(label.into())
    }

    /// Zone for untagged fragments.
    pub fn unassigned() -> Self {
        Zone(Self::UNASSIGNED.to_string())
    }

    /// The zone label.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Zone {
    fn from(s: &str) -> Self {
        Zone::new(s)
    }
}

impl<'de> Deserialize<'de> for Zone {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Int(i64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Zone(s.trim().to_string()),
            Raw::Int(n) => Zone(n.to_string()),
        })
    }
}

/// Fragment geometry, in GeoJSON layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    /// Open polyline.
    LineString(Vec<GeoPoint>),
    /// Several open polylines.
    MultiLineString(Vec<Vec<GeoPoint>>),
    /// Exterior ring followed by optional holes.
    Polygon(Vec<Vec<GeoPoint>>),
}

impl Geometry {
    /// All vertices, in storage order.
    pub fn points(&self) -> impl Iterator<Item = GeoPoint> + '_ {
        let parts: Box<dyn Iterator<Item = &Vec<GeoPoint>> + '_> = match self {
            Geometry::LineString(line) => Box::new(std::iter::once(line)),
            Geometry::MultiLineString(lines) => Box::new(lines.iter()),
            Geometry::Polygon(rings) => Box::new(rings.iter()),
        };
        parts.flatten().copied()
    }

    /// Number of vertices (the original detection rules key on this).
    pub fn vertex_count(&self) -> usize {
        match self {
            Geometry::LineString(line) => line.len(),
            Geometry::MultiLineString(parts) | Geometry::Polygon(parts) => {
                parts.iter().map(Vec::len).sum()
            }
        }
    }

    /// Check coordinates and ring structure.
    ///
    /// # Errors
    /// - [`GeometryError::Empty`] if there are no vertices
    /// - [`GeometryError::Malformed`] for non-finite or out-of-range
    ///   coordinates, or a polygon ring with fewer than 3 vertices
    pub fn validate(&self, system: CoordinateSystem) -> Result<(), GeometryError> {
        if self.vertex_count() == 0 {
            return Err(GeometryError::Empty);
        }

        if let Geometry::Polygon(rings) = self
            && let Some(ring) = rings.iter().find(|r| r.len() < 3)
        {
            return Err(GeometryError::Malformed(format!(
                "polygon ring with {} vertices",
                ring.len()
            )));
        }

        let bad = self.points().find(|p| match system {
            CoordinateSystem::Geographic => !p.is_valid_geographic(),
            CoordinateSystem::Projected => !(p.lon.is_finite() && p.lat.is_finite()),
        });
        match bad {
            Some(p) => Err(GeometryError::Malformed(format!(
                "invalid coordinate [{}, {}]",
                p.lon, p.lat
            ))),
            None => Ok(()),
        }
    }

    /// Project into a metric frame for exact distance computation.
    pub fn to_planar(&self, frame: &LocalFrame) -> PlanarShape {
        let project = |part: &Vec<GeoPoint>| frame.project_all(part);
        match self {
            Geometry::LineString(line) => PlanarShape {
                parts: vec![project(line)],
                kinds: vec![PartKind::Open],
            },
            Geometry::MultiLineString(lines) => PlanarShape {
                parts: lines.iter().map(project).collect(),
                kinds: vec![PartKind::Open; lines.len()],
            },
            Geometry::Polygon(rings) => PlanarShape {
                parts: rings.iter().map(project).collect(),
                kinds: (0..rings.len())
                    .map(|i| if i == 0 { PartKind::Exterior } else { PartKind::Hole })
                    .collect(),
            },
        }
    }
}

/// One raw street-furniture record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    /// Unique identifier.
    pub id: FragmentId,
    /// Administrative zone, if the export carries one.
    #[serde(default)]
    pub zone: Option<Zone>,
    /// Source geometry.
    pub geometry: Geometry,
}

impl Fragment {
    /// Create a new fragment.
    pub fn new(id: impl Into<FragmentId>, zone: Option<Zone>, geometry: Geometry) -> Self {
        Self {
            id: id.into(),
            zone,
            geometry,
        }
    }

    /// Zone, falling back to [`Zone::unassigned`].
    pub fn zone_or_unassigned(&self) -> Zone {
        self.zone.clone().unwrap_or_else(Zone::unassigned)
    }
}

/// In-memory fragment corpus, ordered by identifier.
#[derive(Clone, Debug, Default)]
pub struct FragmentStore {
    coordinate_system: CoordinateSystem,
    fragments: BTreeMap<FragmentId, Fragment>,
}

impl FragmentStore {
    /// Create an empty store for the given coordinate system.
    pub fn new(coordinate_system: CoordinateSystem) -> Self {
        Self {
            coordinate_system,
            fragments: BTreeMap::new(),
        }
    }

    /// Build a store from fragments. Later duplicates replace earlier ones.
    pub fn from_fragments(
        coordinate_system: CoordinateSystem,
        fragments: impl IntoIterator<Item = Fragment>,
    ) -> Self {
        let mut store = Self::new(coordinate_system);
        for fragment in fragments {
            store.insert(fragment);
        }
        store
    }

    /// Insert a fragment, returning the one it replaced.
    pub fn insert(&mut self, fragment: Fragment) -> Option<Fragment> {
        self.fragments.insert(fragment.id, fragment)
    }

    /// Look up a fragment.
    #[inline]
    pub fn get(&self, id: FragmentId) -> Option<&Fragment> {
        self.fragments.get(&id)
    }

    /// Coordinate system of every geometry in the store.
    #[inline]
    pub fn coordinate_system(&self) -> CoordinateSystem {
        self.coordinate_system
    }

    /// Number of fragments.
    #[inline]
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Check if the store is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Fragments in ascending identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &Fragment> {
        self.fragments.values()
    }

    /// Group fragment references by zone (ascending zone, ascending id).
    pub fn by_zone(&self) -> BTreeMap<Zone, Vec<&Fragment>> {
        let mut zones: BTreeMap<Zone, Vec<&Fragment>> = BTreeMap::new();
        for fragment in self.fragments.values() {
            zones
                .entry(fragment.zone_or_unassigned())
                .or_default()
                .push(fragment);
        }
        zones
    }
}
