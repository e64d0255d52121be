//! Loader for the raw street-furniture export.
//!
//! Records look like:
//!
//! ```json
//! {"objectid": 104233, "num_arrond": 7,
//!  "geo_shape": {"type": "Feature",
//!                "geometry": {"type": "LineString", "coordinates": [[2.31, 48.85], ...]}}}
//! ```
//!
//! `id`, `zone`/`arrondissement` and a top-level `geometry` are accepted
//! too. Records that fail to parse, or carry an unsupported geometry type,
//! are rejected one by one and counted; they never abort the load.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::CoordinateSystem;
use crate::error::{Error, Result};
use crate::fragment::{Fragment, FragmentId, FragmentStore, Geometry, Zone};

#[derive(Deserialize)]
struct RawRecord {
    #[serde(alias = "id")]
    objectid: u64,
    #[serde(default, alias = "arrondissement", alias = "num_arrond")]
    zone: Option<Zone>,
    #[serde(default)]
    geo_shape: Option<GeoShape>,
    #[serde(default)]
    geometry: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct GeoShape {
    geometry: serde_json::Value,
}

/// Counts from a fragment load.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReport {
    /// Records read.
    pub records: usize,
    /// Fragments stored.
    pub loaded: usize,
    /// Records rejected (unparseable or unsupported geometry).
    pub rejected: usize,
    /// Records whose id was already present (last one wins).
    pub duplicates: usize,
}

/// Parse the export from JSON text.
///
/// # Errors
/// [`Error::Json`] if the text is not a JSON array; individual bad records
/// are only counted.
pub fn parse_fragments(content: &str, system: CoordinateSystem) -> Result<(FragmentStore, LoadReport)> {
    let values: Vec<serde_json::Value> = serde_json::from_str(content)?;
    let mut store = FragmentStore::new(system);
    let mut report = LoadReport {
        records: values.len(),
        ..LoadReport::default()
    };

    for (i, value) in values.into_iter().enumerate() {
        match to_fragment(value) {
            Ok(fragment) => {
                if store.insert(fragment).is_some() {
                    report.duplicates += 1;
                }
            }
            Err(err) => {
                log::debug!("Records: record #{} rejected: {}", i, err);
                report.rejected += 1;
            }
        }
    }
    report.loaded = store.len();

    if report.rejected > 0 {
        log::warn!(
            "Records: {} of {} records rejected",
            report.rejected,
            report.records
        );
    }
    Ok((store, report))
}

/// Load the export from a file.
pub fn load_fragments(path: &Path, system: CoordinateSystem) -> Result<(FragmentStore, LoadReport)> {
    let content = std::fs::read_to_string(path)?;
    let (store, report) = parse_fragments(&content, system)?;
    log::info!(
        "Records: loaded {} fragments from {} ({} rejected)",
        report.loaded,
        path.display(),
        report.rejected
    );
    Ok((store, report))
}

fn to_fragment(value: serde_json::Value) -> Result<Fragment> {
    let record: RawRecord = serde_json::from_value(value)?;
    let geometry = record
        .geo_shape
        .map(|shape| shape.geometry)
        .or(record.geometry)
        .ok_or_else(|| Error::Input(format!("record {} has no geometry", record.objectid)))?;
    let geometry: Geometry = serde_json::from_value(geometry)?;

    Ok(Fragment {
        id: FragmentId(record.objectid),
        zone: record.zone,
        geometry,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GeoPoint;

    #[test]
    fn test_parse_export() {
        let json = r#"[
            {"objectid": 1, "num_arrond": 7,
             "geo_shape": {"type": "Feature", "geometry":
                {"type": "LineString", "coordinates": [[2.31, 48.85], [2.3101, 48.85]]}}},
            {"objectid": 2, "arrondissement": "12",
             "geo_shape": {"geometry": {"type": "Point", "coordinates": [2.3, 48.8]}}},
            {"id": 3, "zone": "12",
             "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]}},
            {"objectid": 1, "geo_shape": {"geometry":
                {"type": "LineString", "coordinates": [[2.32, 48.85], [2.3201, 48.85]]}}},
            {"no_id": true}
        ]"#;

        let (store, report) = parse_fragments(json, CoordinateSystem::Geographic).unwrap();
        assert_eq!(report.records, 5);
        assert_eq!(report.loaded, 2);
        assert_eq!(report.rejected, 2);
        assert_eq!(report.duplicates, 1);

        // Later duplicate replaced the first record, zone included
        assert_eq!(store.get(FragmentId(1)).unwrap().zone, None);
        assert_eq!(store.get(FragmentId(3)).unwrap().zone, Some(Zone::new("12")));
    }

    #[test]
    fn test_positions_with_altitude() {
        let json = r#"[
            {"objectid": 4, "num_arrond": 7,
             "geo_shape": {"geometry": {"type": "LineString",
                "coordinates": [[2.31, 48.85, 35.0], [2.3101, 48.85, 35.0]]}}}
        ]"#;

        let (store, report) = parse_fragments(json, CoordinateSystem::Geographic).unwrap();
        assert_eq!(report.loaded, 1);
        assert_eq!(report.rejected, 0);

        let fragment = store.get(FragmentId(4)).unwrap();
        let points: Vec<GeoPoint> = fragment.geometry.points().collect();
        assert_eq!(points, vec![GeoPoint::new(2.31, 48.85), GeoPoint::new(2.3101, 48.85)]);
    }

    #[test]
    fn test_not_an_array() {
        assert!(matches!(
            parse_fragments("{}", CoordinateSystem::Geographic),
            Err(Error::Json(_))
        ));
    }
}
