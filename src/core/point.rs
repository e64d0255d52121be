//! Point types: planar metres and geographic degrees.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

/// A 2D point (or vector) in a metric plane.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    /// X coordinate in meters (east in a local tangent plane)
    pub x: f64,
    /// Y coordinate in meters (north in a local tangent plane)
    pub y: f64,
}

impl Point2D {
    /// Create a new point.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Origin.
    pub const ZERO: Point2D = Point2D { x: 0.0, y: 0.0 };

    /// Dot product.
    #[inline]
    pub fn dot(self, other: Point2D) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// 2D cross product (z component of the 3D cross product).
    #[inline]
    pub fn cross(self, other: Point2D) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Squared length (avoids sqrt).
    #[inline]
    pub fn length_squared(self) -> f64 {
        self.dot(self)
    }

    /// Length of this point as a vector from origin.
    #[inline]
    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Squared distance to another point.
    #[inline]
    pub fn distance_squared(self, other: Point2D) -> f64 {
        (self - other).length_squared()
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance(self, other: Point2D) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Component-wise minimum.
    #[inline]
    pub fn min(self, other: Point2D) -> Point2D {
        Point2D::new(self.x.min(other.x), self.y.min(other.y))
    }

    /// Component-wise maximum.
    #[inline]
    pub fn max(self, other: Point2D) -> Point2D {
        Point2D::new(self.x.max(other.x), self.y.max(other.y))
    }

    /// Unit vector in the same direction, or `None` for a zero vector.
    #[inline]
    pub fn normalized(self) -> Option<Point2D> {
        let len = self.length();
        if len <= f64::EPSILON {
            None
        } else {
            Some(self * (1.0 / len))
        }
    }

    /// Perpendicular vector (rotated 90° counter-clockwise).
    #[inline]
    pub fn perp(self) -> Point2D {
        Point2D::new(-self.y, self.x)
    }

    /// True if both coordinates are finite.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point2D {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Point2D::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Point2D {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Point2D::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f64> for Point2D {
    type Output = Self;

    #[inline]
    fn mul(self, scalar: f64) -> Self {
        Point2D::new(self.x * scalar, self.y * scalar)
    }
}

impl Neg for Point2D {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Point2D::new(-self.x, -self.y)
    }
}

/// A geographic coordinate in decimal degrees (WGS84).
///
/// Serialized as a GeoJSON position `[lon, lat]`. Extra trailing values
/// such as altitude are accepted and dropped on input.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "[f64; 2]")]
pub struct GeoPoint {
    /// Longitude in degrees, positive east
    pub lon: f64,
    /// Latitude in degrees, positive north
    pub lat: f64,
}

impl GeoPoint {
    /// Create a new geographic point.
    #[inline]
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// True if the coordinate is finite and inside the WGS84 domain.
    #[inline]
    pub fn is_valid_geographic(self) -> bool {
        self.lon.is_finite()
            && self.lat.is_finite()
            && (-180.0..=180.0).contains(&self.lon)
            && (-90.0..=90.0).contains(&self.lat)
    }

    /// Reinterpret as a planar point (for already-projected coordinates).
    #[inline]
    pub fn as_planar(self) -> Point2D {
        Point2D::new(self.lon, self.lat)
    }
}

impl From<[f64; 2]> for GeoPoint {
    fn from(pos: [f64; 2]) -> Self {
        GeoPoint::new(pos[0], pos[1])
    }
}

impl TryFrom<Vec<f64>> for GeoPoint {
    type Error = String;

    fn try_from(pos: Vec<f64>) -> Result<Self, Self::Error> {
        match pos.as_slice() {
            [lon, lat, ..] => Ok(GeoPoint::new(*lon, *lat)),
            _ => Err(format!("position needs at least 2 values, got {}", pos.len())),
        }
    }
}

impl From<GeoPoint> for [f64; 2] {
    fn from(p: GeoPoint) -> Self {
        [p.lon, p.lat]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_ops() {
        let a = Point2D::new(3.0, 4.0);
        let b = Point2D::new(1.0, 0.0);

        assert_eq!(a.length(), 5.0);
        assert_eq!(a.dot(b), 3.0);
        assert_eq!(b.cross(a), 4.0);
        assert_eq!(a - b, Point2D::new(2.0, 4.0));
        assert_eq!(a * 2.0, Point2D::new(6.0, 8.0));
        assert_eq!(b.perp(), Point2D::new(0.0, 1.0));
    }

    #[test]
    fn test_normalized_zero() {
        assert!(Point2D::ZERO.normalized().is_none());
        let n = Point2D::new(0.0, 2.0).normalized().unwrap();
        assert_eq!(n, Point2D::new(0.0, 1.0));
    }

    #[test]
    fn test_geo_point_validity() {
        assert!(GeoPoint::new(2.35, 48.85).is_valid_geographic());
        assert!(!GeoPoint::new(200.0, 48.85).is_valid_geographic());
        assert!(!GeoPoint::new(2.35, f64::NAN).is_valid_geographic());
    }

    #[test]
    fn test_geo_point_serde_as_position() {
        let p: GeoPoint = serde_json::from_str("[2.35, 48.85]").unwrap();
        assert_eq!(p, GeoPoint::new(2.35, 48.85));

        let with_altitude: GeoPoint = serde_json::from_str("[2.35, 48.85, 35.0]").unwrap();
        assert_eq!(with_altitude, p);
        assert!(serde_json::from_str::<GeoPoint>("[2.35]").is_err());
        assert_eq!(serde_json::to_string(&p).unwrap(), "[2.35,48.85]");
    }
}
