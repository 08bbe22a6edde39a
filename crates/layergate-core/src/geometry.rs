//! Planar geometry model and the geometry service interface.
//!
//! Authorized areas are unions of axis-aligned envelopes tagged with a
//! spatial reference id. This keeps intersection exact, which matters
//! because area authorizations are combined by repeated intersection.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{SecurityError, SecurityResult};

/// SRID used by geometries which do not declare a spatial reference.
pub const UNKNOWN_SRID: i32 = 0;

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Minimum x coordinate.
    pub min_x: f64,
    /// Minimum y coordinate.
    pub min_y: f64,
    /// Maximum x coordinate.
    pub max_x: f64,
    /// Maximum y coordinate.
    pub max_y: f64,
}

impl Envelope {
    /// Create an envelope from two corners, in any order.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            min_x: x1.min(x2),
            min_y: y1.min(y2),
            max_x: x1.max(x2),
            max_y: y1.max(y2),
        }
    }

    /// Width of the envelope.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the envelope.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// An envelope without interior is empty.
    pub fn is_empty(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }

    /// Surface of the envelope.
    pub fn area(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.width() * self.height()
        }
    }

    /// Check if a point lies inside or on the border of the envelope.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Common part of two envelopes, if they share an interior.
    pub fn intersection(&self, other: &Envelope) -> Option<Envelope> {
        let result = Envelope {
            min_x: self.min_x.max(other.min_x),
            min_y: self.min_y.max(other.min_y),
            max_x: self.max_x.min(other.max_x),
            max_y: self.max_y.min(other.max_y),
        };
        if result.is_empty() { None } else { Some(result) }
    }

    /// Smallest envelope covering both envelopes.
    pub fn expand_to_include(&self, other: &Envelope) -> Envelope {
        Envelope {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} {}, {} {}]",
            self.min_x, self.min_y, self.max_x, self.max_y
        )
    }
}

/// Area made of envelopes, with a spatial reference id.
///
/// A geometry without non-empty parts covers nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Spatial reference id.
    #[serde(default)]
    srid: i32,
    /// Parts of the area.
    parts: Vec<Envelope>,
}

impl Geometry {
    /// Create a geometry from parts. Empty parts are dropped.
    pub fn new(srid: i32, parts: Vec<Envelope>) -> Self {
        Self {
            srid,
            parts: parts.into_iter().filter(|p| !p.is_empty()).collect(),
        }
    }

    /// Create a geometry covering a single envelope.
    pub fn from_envelope(envelope: Envelope, srid: i32) -> Self {
        Self::new(srid, vec![envelope])
    }

    /// Create a geometry covering nothing.
    pub fn empty(srid: i32) -> Self {
        Self {
            srid,
            parts: Vec::new(),
        }
    }

    /// Get the spatial reference id.
    pub fn srid(&self) -> i32 {
        self.srid
    }

    /// Return the same area tagged with another spatial reference id.
    pub fn with_srid(mut self, srid: i32) -> Self {
        self.srid = srid;
        self
    }

    /// Get the parts of this geometry.
    pub fn parts(&self) -> &[Envelope] {
        &self.parts
    }

    /// Check if the geometry covers nothing.
    pub fn is_empty(&self) -> bool {
        self.parts.iter().all(Envelope::is_empty)
    }

    /// Bounding envelope of all parts.
    pub fn bounds(&self) -> Option<Envelope> {
        let mut iter = self.parts.iter();
        let first = *iter.next()?;
        Some(iter.fold(first, |acc, part| acc.expand_to_include(part)))
    }

    /// Covered area. Overlapping parts are counted once.
    pub fn area(&self) -> f64 {
        let mut xs: Vec<f64> = self
            .parts
            .iter()
            .flat_map(|p| [p.min_x, p.max_x])
            .collect();
        xs.sort_by(f64::total_cmp);
        xs.dedup();

        xs.windows(2)
            .map(|slab| {
                let (left, right) = (slab[0], slab[1]);
                let mut spans: Vec<(f64, f64)> = self
                    .parts
                    .iter()
                    .filter(|p| p.min_x <= left && p.max_x >= right)
                    .map(|p| (p.min_y, p.max_y))
                    .collect();
                spans.sort_by(|a, b| a.0.total_cmp(&b.0));

                let mut covered = 0.0;
                let mut current: Option<(f64, f64)> = None;
                for (lo, hi) in spans {
                    current = match current {
                        Some((c_lo, c_hi)) if lo <= c_hi => Some((c_lo, c_hi.max(hi))),
                        Some((c_lo, c_hi)) => {
                            covered += c_hi - c_lo;
                            Some((lo, hi))
                        }
                        None => Some((lo, hi)),
                    };
                }
                if let Some((c_lo, c_hi)) = current {
                    covered += c_hi - c_lo;
                }
                covered * (right - left)
            })
            .sum()
    }

    /// Check if a point lies within the geometry.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        self.parts.iter().any(|p| p.contains_point(x, y))
    }

    /// Check if two geometries share an interior.
    pub fn intersects(&self, other: &Geometry) -> bool {
        self.parts
            .iter()
            .any(|a| other.parts.iter().any(|b| a.intersection(b).is_some()))
    }

    /// Common area of two geometries. Keeps the SRID of `self`.
    pub fn intersection(&self, other: &Geometry) -> Geometry {
        let parts = self
            .parts
            .iter()
            .flat_map(|a| other.parts.iter().filter_map(move |b| a.intersection(b)))
            .collect();
        Geometry {
            srid: self.srid,
            parts,
        }
    }

    /// Area covered by either geometry. Keeps the SRID of `self`.
    pub fn union(&self, other: &Geometry) -> Geometry {
        let mut parts = self.parts.clone();
        parts.extend(other.parts.iter().copied());
        Geometry {
            srid: self.srid,
            parts,
        }
    }
}

/// Geometry and CRS operations used by the engine.
pub trait GeometryService: Send + Sync + fmt::Debug {
    /// Get the spatial reference id for a CRS code such as `EPSG:4326`.
    fn srid(&self, crs: &str) -> SecurityResult<i32>;

    /// Convert a geometry to another spatial reference system.
    fn transform(&self, geometry: &Geometry, srid: i32) -> SecurityResult<Geometry>;

    /// Common area of two geometries.
    fn intersection(&self, left: &Geometry, right: &Geometry) -> Geometry {
        left.intersection(right)
    }

    /// Area covered by either geometry.
    fn union(&self, left: &Geometry, right: &Geometry) -> Geometry {
        left.union(right)
    }
}

/// Geometry service for a single planar coordinate space.
///
/// Understands `EPSG:<code>` CRS codes. Geometries can only be re-tagged,
/// not reprojected: transforming between two different known SRIDs fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanarGeometryService;

impl PlanarGeometryService {
    /// Create a new planar geometry service.
    pub fn new() -> Self {
        Self
    }
}

impl GeometryService for PlanarGeometryService {
    fn srid(&self, crs: &str) -> SecurityResult<i32> {
        let code = crs
            .split_once(':')
            .filter(|(authority, _)| authority.eq_ignore_ascii_case("epsg"))
            .map(|(_, code)| code.trim())
            .ok_or_else(|| SecurityError::UnsupportedCrs(crs.to_string()))?;

        match code.parse::<i32>() {
            Ok(srid) if srid > 0 => Ok(srid),
            _ => Err(SecurityError::UnsupportedCrs(crs.to_string())),
        }
    }

    fn transform(&self, geometry: &Geometry, srid: i32) -> SecurityResult<Geometry> {
        if geometry.srid() == srid || geometry.srid() == UNKNOWN_SRID {
            Ok(geometry.clone().with_srid(srid))
        } else {
            Err(SecurityError::Transform {
                from: geometry.srid(),
                to: srid,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_normalizes_corners() {
        let env = Envelope::new(10.0, 10.0, 0.0, 0.0);
        assert_eq!(env, Envelope::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(env.area(), 100.0);
    }

    #[test]
    fn test_geometry_area_counts_overlap_once() {
        let geometry = Geometry::new(
            4326,
            vec![
                Envelope::new(0.0, 0.0, 10.0, 10.0),
                Envelope::new(5.0, 5.0, 15.0, 15.0),
                Envelope::new(20.0, 0.0, 21.0, 1.0),
            ],
        );
        assert_eq!(geometry.area(), 176.0);
        assert_eq!(Geometry::empty(4326).area(), 0.0);
    }

    #[test]
    fn test_envelope_intersection() {
        let a = Envelope::new(0.0, 0.0, 10.0, 10.0);
        let b = Envelope::new(5.0, 5.0, 15.0, 15.0);
        assert_eq!(a.intersection(&b), Some(Envelope::new(5.0, 5.0, 10.0, 10.0)));

        // touching borders share no interior
        let c = Envelope::new(10.0, 0.0, 20.0, 10.0);
        assert_eq!(a.intersection(&c), None);
    }

    #[test]
    fn test_geometry_drops_empty_parts() {
        let geometry = Geometry::new(4326, vec![Envelope::new(1.0, 1.0, 1.0, 5.0)]);
        assert!(geometry.is_empty());
        assert!(geometry.parts().is_empty());
    }

    #[test]
    fn test_geometry_intersection_of_unions() {
        let left = Geometry::new(
            4326,
            vec![
                Envelope::new(0.0, 0.0, 10.0, 10.0),
                Envelope::new(20.0, 0.0, 30.0, 10.0),
            ],
        );
        let right = Geometry::from_envelope(Envelope::new(5.0, 0.0, 25.0, 10.0), 0);
        let result = left.intersection(&right);

        assert_eq!(result.srid(), 4326);
        assert_eq!(
            result.parts(),
            &[
                Envelope::new(5.0, 0.0, 10.0, 10.0),
                Envelope::new(20.0, 0.0, 25.0, 10.0)
            ]
        );
        assert!(result.contains_point(7.0, 5.0));
        assert!(!result.contains_point(15.0, 5.0));
    }

    #[test]
    fn test_geometry_disjoint_intersection_is_empty() {
        let left = Geometry::from_envelope(Envelope::new(0.0, 0.0, 1.0, 1.0), 4326);
        let right = Geometry::from_envelope(Envelope::new(2.0, 2.0, 3.0, 3.0), 4326);
        assert!(!left.intersects(&right));
        assert!(left.intersection(&right).is_empty());
    }

    #[test]
    fn test_geometry_bounds() {
        let geometry = Geometry::from_envelope(Envelope::new(0.0, 0.0, 1.0, 1.0), 1)
            .union(&Geometry::from_envelope(Envelope::new(4.0, 4.0, 5.0, 6.0), 1));
        assert_eq!(geometry.bounds(), Some(Envelope::new(0.0, 0.0, 5.0, 6.0)));
        assert_eq!(Geometry::empty(1).bounds(), None);
    }

    #[test]
    fn test_planar_srid_lookup() {
        let service = PlanarGeometryService::new();
        assert_eq!(service.srid("EPSG:4326").unwrap(), 4326);
        assert_eq!(service.srid("epsg:900913").unwrap(), 900913);
        assert!(service.srid("CRS:84").is_err());
        assert!(service.srid("EPSG:abc").is_err());
        assert!(service.srid("EPSG:-1").is_err());
    }

    #[test]
    fn test_planar_transform() {
        let service = PlanarGeometryService::new();
        let untagged = Geometry::from_envelope(Envelope::new(0.0, 0.0, 1.0, 1.0), UNKNOWN_SRID);

        let tagged = service.transform(&untagged, 3857).unwrap();
        assert_eq!(tagged.srid(), 3857);
        assert!(service.transform(&tagged, 3857).is_ok());
        assert!(matches!(
            service.transform(&tagged, 4326),
            Err(SecurityError::Transform { from: 3857, to: 4326 })
        ));
    }
}
