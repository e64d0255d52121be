//! End-to-end detection runs over a small synthetic city.

mod common;

use std::collections::BTreeMap;
use std::io::Write;
use std::time::Instant;

use ousposer::core::{CoordinateSystem, Point2D};
use ousposer::envelope::{GeometryQueryService, QueryServiceProvider};
use ousposer::io::parse_fragments;
use ousposer::{
    BatchRunner, CanonicalTemplate, Category, ComponentRule, DetectionConfig, EnvelopeProvider,
    Fragment, FragmentId, FragmentStore, Geometry, GeometryEnvelopeProvider, Zone,
};

use common::{frame_fragments, rect_fragment, slat, store};

/// Zone 1: three benches, a four-slat frame bench and a stray slat.
/// Zone 2: an oversized slab and an empty outline.
fn city() -> Vec<Fragment> {
    let mut fragments = vec![
        rect_fragment(1, "1", (0.0, 0.0), 2.32, 1.60, 0.0),
        rect_fragment(2, "1", (20.0, 0.0), 2.32, 1.60, 0.8),
        rect_fragment(3, "1", (40.0, 0.0), 2.32, 1.60, 2.1),
    ];
    fragments.extend(frame_fragments(4, "1", (60.0, 0.0), 4.0, 1.6));
    fragments.push(slat(8, "1", Point2D::new(100.0, 0.0), Point2D::new(101.0, 0.0)));
    fragments.push(rect_fragment(9, "2", (0.0, 50.0), 5.0, 0.6, 0.0));
    fragments.push(Fragment::new(10, Some(Zone::new("2")), Geometry::LineString(vec![])));
    fragments
}

fn config() -> DetectionConfig {
    DetectionConfig {
        templates: vec![
            CanonicalTemplate::new("single bench", 2.32, 1.60, 0.02),
            CanonicalTemplate::new("frame bench", 4.0, 1.6, 0.03)
                .with_components(ComponentRule::Multi { min: 4, max: Some(6) }),
        ],
        ..DetectionConfig::default()
    }
}

fn expected_categories() -> BTreeMap<String, usize> {
    BTreeMap::from([("frame bench".to_string(), 1), ("single bench".to_string(), 3)])
}

#[test]
fn test_run_counts() {
    let store = store(city());
    let config = config();
    let provider = GeometryEnvelopeProvider::new(&store);
    let output = BatchRunner::new(&config, &provider).unwrap().run(&store);

    let summary = &output.summary;
    assert_eq!(summary.zones_processed, 2);
    assert!(!summary.is_partial());
    assert_eq!(summary.fragments, 10);
    assert_eq!(summary.candidates, 7);
    assert_eq!(summary.processed, 5);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.unclassified, 1);
    assert_eq!(summary.per_category, expected_categories());

    assert_eq!(output.results.len(), 5);
    assert_eq!(output.skipped.len(), 2);

    let frame = output
        .results
        .iter()
        .find(|r| r.category == Category::Template("frame bench".into()))
        .unwrap();
    assert_eq!(frame.fragments, (4..=7).map(FragmentId).collect::<Vec<_>>());
    assert_eq!(frame.candidate.0, 4);

    let skipped: Vec<u64> = output.skipped.iter().map(|s| s.candidate.0).collect();
    assert_eq!(skipped, vec![8, 10]);
}

#[test]
fn test_results_sorted_and_deterministic() {
    let store = store(city());
    let config = config();
    let provider = GeometryEnvelopeProvider::new(&store);
    let runner = BatchRunner::new(&config, &provider).unwrap();

    let first = runner.run(&store);
    assert!(first.results.windows(2).all(|w| w[0].candidate < w[1].candidate));

    for _ in 0..3 {
        let again = runner.run(&store);
        assert_eq!(again.results, first.results);
        assert_eq!(again.skipped, first.skipped);
        assert_eq!(again.summary.per_category, first.summary.per_category);
    }
}

#[test]
fn test_single_threaded_matches_parallel() {
    let store = store(city());
    let provider = GeometryEnvelopeProvider::new(&store);

    let parallel_config = config();
    let mut serial_config = config();
    serial_config.runtime.zone_parallelism = 1;
    serial_config.runtime.max_in_flight = 1;

    let parallel = BatchRunner::new(&parallel_config, &provider).unwrap().run(&store);
    let serial = BatchRunner::new(&serial_config, &provider).unwrap().run(&store);
    assert_eq!(parallel.results, serial.results);
    assert_eq!(parallel.skipped, serial.skipped);
}

#[test]
fn test_expired_deadline_aborts_every_zone() {
    let store = store(city());
    let config = config();
    let provider = GeometryEnvelopeProvider::new(&store);

    let output = BatchRunner::new(&config, &provider)
        .unwrap()
        .run_until(&store, Some(Instant::now()));

    assert!(output.summary.is_partial());
    assert_eq!(output.summary.zones_aborted, vec![Zone::new("1"), Zone::new("2")]);
    assert_eq!(output.summary.zones_processed, 0);
    assert!(output.results.is_empty());
    assert!(output.skipped.is_empty());
}

#[test]
fn test_invalid_templates_rejected() {
    let store = store(city());
    let provider = GeometryEnvelopeProvider::new(&store);
    let mut config = config();
    config.templates.clear();
    assert!(BatchRunner::new(&config, &provider).is_err());
}

/// Remote geometry service backed by local envelopes.
struct LocalService<'a> {
    inner: GeometryEnvelopeProvider<'a>,
}

impl GeometryQueryService for LocalService<'_> {
    fn oriented_rect_sides(&self, ids: &[FragmentId]) -> Result<Option<[f64; 4]>, String> {
        match self.inner.envelope(ids) {
            Ok(e) => Ok(Some([e.long, e.short, e.long, e.short])),
            Err(ousposer::GeometryError::UnknownFragment(_)) => Ok(None),
            Err(err) => Err(err.to_string()),
        }
    }
}

#[test]
fn test_query_service_provider_matches_local() {
    let store = store(city());
    let config = config();
    let provider = QueryServiceProvider::new(
        LocalService {
            inner: GeometryEnvelopeProvider::new(&store),
        },
        2,
    );

    let output = BatchRunner::new(&config, &provider).unwrap().run(&store);
    assert_eq!(output.summary.processed, 5);
    assert_eq!(output.summary.skipped, 2);
    assert_eq!(output.summary.per_category, expected_categories());
    assert_eq!(provider.pool().available(), 2);
}

#[test]
fn test_config_file_and_raw_export() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
        [clustering]
        proximity_threshold_m = 3.5
        index = "grid"

        [runtime]
        zone_parallelism = 2
        max_in_flight = 2

        [[templates]]
        name = "single bench"
        canonical_long = 2.32
        canonical_short = 1.60

        [[templates]]
        name = "frame bench"
        canonical_long = 4.0
        canonical_short = 1.6
        tolerance_ratio = 0.03
        components = {{ kind = "multi", min = 4, max = 6 }}
        "#
    )
    .unwrap();
    let config = DetectionConfig::load(file.path()).unwrap();

    let records: Vec<serde_json::Value> = city()
        .iter()
        .map(|f| {
            serde_json::json!({
                "objectid": f.id.0,
                "num_arrond": f.zone_or_unassigned().as_str(),
                "geo_shape": {"type": "Feature", "geometry": f.geometry},
            })
        })
        .collect();
    let content = serde_json::to_string(&records).unwrap();
    let (loaded, report): (FragmentStore, _) =
        parse_fragments(&content, CoordinateSystem::Geographic).unwrap();
    assert_eq!(report.loaded, 10);
    assert_eq!(report.rejected, 0);

    let provider = GeometryEnvelopeProvider::new(&loaded);
    let output = BatchRunner::new(&config, &provider).unwrap().run(&loaded);
    assert_eq!(output.summary.candidates, 7);
    assert_eq!(output.summary.per_category, expected_categories());
    assert_eq!(output.summary.unclassified, 1);
}
