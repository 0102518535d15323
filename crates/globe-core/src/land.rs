//! Land Geometry & Dot Sampling
//!
//! A small GeoJSON model (just what land polygons need) and the grid sampler
//! that turns filled land areas into the dots drawn on the globe.
//!
//! Sampling walks the feature's bounding box on a regular grid, longitude in
//! the outer loop and latitude in the inner loop, and keeps every grid point
//! that falls inside the land area. Output order is stable for a given input.

use serde::{Deserialize, Serialize};

use crate::error::{GlobeError, Result};

/// Default dot spacing; the grid step is `spacing * GRID_STEP_FACTOR` degrees
pub const DEFAULT_DOT_SPACING: f64 = 16.0;

/// Degrees of grid step per unit of dot spacing
pub const GRID_STEP_FACTOR: f64 = 0.08;

/// One land dot in degrees
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct SamplePoint {
    pub lon: f64,
    pub lat: f64,
}

impl SamplePoint {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

impl From<[f64; 2]> for SamplePoint {
    fn from([lon, lat]: [f64; 2]) -> Self {
        Self { lon, lat }
    }
}

impl From<SamplePoint> for [f64; 2] {
    fn from(p: SamplePoint) -> Self {
        [p.lon, p.lat]
    }
}

/// GeoJSON position; extra ordinates (altitude) are ignored
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(try_from = "Vec<f64>")]
pub struct Position {
    pub lon: f64,
    pub lat: f64,
}

impl TryFrom<Vec<f64>> for Position {
    type Error = String;

    fn try_from(values: Vec<f64>) -> std::result::Result<Self, Self::Error> {
        match values.as_slice() {
            [lon, lat, ..] => Ok(Self { lon: *lon, lat: *lat }),
            _ => Err(format!("position needs two ordinates, got {}", values.len())),
        }
    }
}

/// Closed ring of positions
pub type Ring = Vec<Position>;

/// Outer ring followed by hole rings
pub type PolygonRings = Vec<Ring>;

/// Geometry variants the sampler understands
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Polygon { coordinates: PolygonRings },
    MultiPolygon { coordinates: Vec<PolygonRings> },
    #[serde(other)]
    Unsupported,
}

/// A single GeoJSON feature
#[derive(Clone, Debug, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub geometry: Option<Geometry>,

    #[serde(default)]
    pub properties: Option<serde_json::Value>,
}

/// GeoJSON FeatureCollection of land polygons
#[derive(Clone, Debug, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// Parse and check the collection type
    pub fn from_json(payload: &str) -> Result<Self> {
        let collection: Self = serde_json::from_str(payload)?;
        if collection.kind != "FeatureCollection" {
            return Err(GlobeError::InvalidGeometry(format!(
                "expected FeatureCollection, got {}",
                collection.kind
            )));
        }
        Ok(collection)
    }
}

/// Ray-casting point-in-ring test (even-odd rule)
pub fn point_in_ring(lon: f64, lat: f64, ring: &[Position]) -> bool {
    let mut inside = false;
    let mut j = match ring.len() {
        0 => return false,
        n => n - 1,
    };

    for (i, pi) in ring.iter().enumerate() {
        let pj = ring[j];
        if (pi.lat > lat) != (pj.lat > lat)
            && lon < (pj.lon - pi.lon) * (lat - pi.lat) / (pj.lat - pi.lat) + pi.lon
        {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Inside the outer ring and outside every hole
pub fn point_in_polygon(lon: f64, lat: f64, rings: &[Ring]) -> bool {
    let Some((outer, holes)) = rings.split_first() else {
        return false;
    };
    point_in_ring(lon, lat, outer) && !holes.iter().any(|hole| point_in_ring(lon, lat, hole))
}

impl Geometry {
    /// Membership test for a point in degrees
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        match self {
            Self::Polygon { coordinates } => point_in_polygon(lon, lat, coordinates),
            Self::MultiPolygon { coordinates } => coordinates
                .iter()
                .any(|polygon| point_in_polygon(lon, lat, polygon)),
            Self::Unsupported => false,
        }
    }

    /// Planar bounding box as (min lon, min lat, max lon, max lat)
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let positions: Box<dyn Iterator<Item = &Position> + '_> = match self {
            Self::Polygon { coordinates } => Box::new(coordinates.iter().flatten()),
            Self::MultiPolygon { coordinates } => Box::new(coordinates.iter().flatten().flatten()),
            Self::Unsupported => return None,
        };

        positions.fold(None, |acc, p| {
            Some(match acc {
                None => (p.lon, p.lat, p.lon, p.lat),
                Some((min_lon, min_lat, max_lon, max_lat)) => (
                    min_lon.min(p.lon),
                    min_lat.min(p.lat),
                    max_lon.max(p.lon),
                    max_lat.max(p.lat),
                ),
            })
        })
    }
}

/// Grid sampler for land features
#[derive(Clone, Copy, Debug)]
pub struct DotSampler {
    step: f64,
}

impl Default for DotSampler {
    fn default() -> Self {
        Self::new(DEFAULT_DOT_SPACING)
    }
}

impl DotSampler {
    pub fn new(dot_spacing: f64) -> Self {
        Self {
            step: dot_spacing * GRID_STEP_FACTOR,
        }
    }

    /// Grid step in degrees
    pub const fn step(&self) -> f64 {
        self.step
    }

    /// Dots covering one feature
    pub fn sample_feature(&self, feature: &Feature) -> Vec<SamplePoint> {
        let Some(geometry) = &feature.geometry else {
            return Vec::new();
        };
        let Some((min_lon, min_lat, max_lon, max_lat)) = geometry.bounds() else {
            return Vec::new();
        };
        if !(self.step > 0.0) {
            return Vec::new();
        }

        let lon_steps = grid_len(min_lon, max_lon, self.step);
        let lat_steps = grid_len(min_lat, max_lat, self.step);

        let mut dots = Vec::new();
        for i in 0..lon_steps {
            let lon = (i as f64).mul_add(self.step, min_lon);
            for j in 0..lat_steps {
                let lat = (j as f64).mul_add(self.step, min_lat);
                if geometry.contains(lon, lat) {
                    dots.push(SamplePoint::new(lon, lat));
                }
            }
        }
        dots
    }

    /// Dots covering every feature, concatenated in feature order
    pub fn sample_collection(&self, collection: &FeatureCollection) -> Vec<SamplePoint> {
        let dots: Vec<SamplePoint> = collection
            .features
            .iter()
            .flat_map(|feature| self.sample_feature(feature))
            .collect();

        tracing::debug!(
            "Sampled {} land dots from {} features (step {:.2}°)",
            dots.len(),
            collection.features.len(),
            self.step
        );
        dots
    }
}

/// Number of grid values `min + i * step` that are `<= max`
fn grid_len(min: f64, max: f64, step: f64) -> usize {
    if max < min {
        return 0;
    }
    ((max - min) / step + 1e-9).floor() as usize + 1
}

/// Parse a precomputed `[[lon, lat], …]` list
pub fn parse_sample_points(payload: &str) -> Result<Vec<SamplePoint>> {
    let points: Vec<SamplePoint> = serde_json::from_str(payload)
        .map_err(|e| GlobeError::InvalidPoints(e.to_string()))?;

    if let Some(bad) = points.iter().find(|p| !(-90.0..=90.0).contains(&p.lat) || !p.lon.is_finite()) {
        return Err(GlobeError::InvalidPoints(format!(
            "point ({}, {}) is outside the globe",
            bad.lon, bad.lat
        )));
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(min: f64, max: f64) -> Ring {
        vec![
            Position { lon: min, lat: min },
            Position { lon: max, lat: min },
            Position { lon: max, lat: max },
            Position { lon: min, lat: max },
            Position { lon: min, lat: min },
        ]
    }

    fn donut() -> Geometry {
        Geometry::Polygon {
            coordinates: vec![square(0.0, 10.0), square(4.0, 6.0)],
        }
    }

    #[test]
    fn test_hole_excluded() {
        let g = donut();
        assert!(!g.contains(5.0, 5.0));
        assert!(g.contains(2.0, 2.0));
        assert!(!g.contains(12.0, 2.0));
    }

    #[test]
    fn test_multipolygon_holes_belong_to_their_polygon() {
        let g = Geometry::MultiPolygon {
            coordinates: vec![
                vec![square(0.0, 10.0), square(4.0, 6.0)],
                vec![square(20.0, 30.0)],
            ],
        };
        assert!(g.contains(25.0, 25.0));
        assert!(g.contains(1.0, 1.0));
        assert!(!g.contains(5.0, 5.0));
        assert!(!g.contains(15.0, 15.0));
    }

    #[test]
    fn test_empty_polygon_contains_nothing() {
        let g = Geometry::Polygon { coordinates: vec![] };
        assert!(!g.contains(0.0, 0.0));
        assert!(g.bounds().is_none());
    }

    #[test]
    fn test_sampling_is_deterministic() {
        let feature = Feature {
            geometry: Some(donut()),
            properties: None,
        };
        let sampler = DotSampler::new(16.0);

        let first = sampler.sample_feature(&feature);
        let second = sampler.sample_feature(&feature);
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn test_sampling_scan_order() {
        let feature = Feature {
            geometry: Some(Geometry::Polygon {
                coordinates: vec![square(0.0, 10.0)],
            }),
            properties: None,
        };
        let dots = DotSampler::new(25.0).sample_feature(&feature);

        // longitude outer, latitude inner
        for pair in dots.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            assert!(a.lon < b.lon || (a.lon == b.lon && a.lat < b.lat));
        }
    }

    #[test]
    fn test_sampling_skips_hole() {
        let feature = Feature {
            geometry: Some(donut()),
            properties: None,
        };
        let dots = DotSampler::new(12.5).sample_feature(&feature);
        assert!(dots.iter().all(|d| !(d.lon > 4.0 && d.lon < 6.0 && d.lat > 4.0 && d.lat < 6.0)));
    }

    #[test]
    fn test_parse_feature_collection() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"featurecla": "Land"},
                 "geometry": {"type": "Polygon", "coordinates": [[[0,0],[10,0],[10,10],[0,10],[0,0]]]}},
                {"type": "Feature", "properties": {}, "geometry": {"type": "Point", "coordinates": [1, 2]}},
                {"type": "Feature", "properties": {}, "geometry": null}
            ]
        }"#;

        let collection = FeatureCollection::from_json(json).unwrap();
        assert_eq!(collection.features.len(), 3);
        assert!(matches!(collection.features[1].geometry, Some(Geometry::Unsupported)));
        assert!(collection.features[2].geometry.is_none());

        let dots = DotSampler::default().sample_collection(&collection);
        assert!(dots.iter().all(|d| (0.0..=10.0).contains(&d.lon)));
    }

    #[test]
    fn test_rejects_non_collection() {
        let err = FeatureCollection::from_json(r#"{"type": "Feature"}"#).unwrap_err();
        assert!(matches!(err, GlobeError::InvalidGeometry(_)));
    }

    #[test]
    fn test_parse_sample_points() {
        let points = parse_sample_points("[[1.5, 2.5], [-20, 45]]").unwrap();
        assert_eq!(points, vec![SamplePoint::new(1.5, 2.5), SamplePoint::new(-20.0, 45.0)]);

        assert!(parse_sample_points("[[0, 120]]").is_err());
        assert!(parse_sample_points("{}").is_err());
    }
}
