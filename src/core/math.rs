//! Small numeric helpers shared by calibration and clustering.

use serde::{Deserialize, Serialize};

use super::Point2D;

/// Compute the centroid of a set of points.
///
/// Returns the origin for an empty slice.
///
/// # Example
/// ```
/// use ousposer::core::{Point2D, math::compute_centroid};
///
/// let points = [Point2D::new(0.0, 0.0), Point2D::new(2.0, 0.0), Point2D::new(1.0, 3.0)];
/// let centroid = compute_centroid(&points);
/// assert!((centroid.x - 1.0).abs() < 1e-12);
/// assert!((centroid.y - 1.0).abs() < 1e-12);
/// ```
#[inline]
pub fn compute_centroid(points: &[Point2D]) -> Point2D {
    if points.is_empty() {
        return Point2D::ZERO;
    }

    let n = points.len() as f64;
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;

    for p in points {
        sum_x += p.x;
        sum_y += p.y;
    }

    Point2D::new(sum_x / n, sum_y / n)
}

/// Median of a sample.
///
/// Even-sized samples use the mean of the two central values. The input
/// order does not matter. Returns `None` for an empty sample or one that
/// contains a NaN.
///
/// # Example
/// ```
/// use ousposer::core::math::median;
///
/// assert_eq!(median(&[4.4, 4.0, 4.2]), Some(4.2));
/// assert_eq!(median(&[1.0, 3.0]), Some(2.0));
/// assert_eq!(median(&[]), None);
/// ```
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() || values.iter().any(|v| v.is_nan()) {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) * 0.5)
    }
}

/// Arithmetic mean, `None` for an empty sample.
#[inline]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Population standard deviation, `None` for an empty sample.
pub fn std_dev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    Some(var.sqrt())
}

/// Descriptive statistics of a sample.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SampleStats {
    /// Number of values
    pub count: usize,
    /// Median value
    pub median: f64,
    /// Arithmetic mean
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
    /// Median absolute deviation from the median
    pub mad: f64,
    /// Smallest value
    pub min: f64,
    /// Largest value
    pub max: f64,
}

impl SampleStats {
    /// Summarize a sample. Returns `None` if empty or containing NaN.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let median = median(values)?;
        let deviations: Vec<f64> = values.iter().map(|v| (v - median).abs()).collect();

        Some(Self {
            count: values.len(),
            median,
            mean: mean(values)?,
            std_dev: std_dev(values)?,
            mad: self::median(&deviations)?,
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
    }
}
