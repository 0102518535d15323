//! Orthographic Projection
//!
//! Maps geographic coordinates (degrees) onto the drawing surface as seen
//! from infinitely far away, hiding everything beyond the clip angle.
//!
//! ## Usage
//!
//! ```rust
//! use globe_core::projection::{OrthographicProjector, ProjectionConfig};
//! use globe_core::rotation::Rotation;
//!
//! let mut projector = OrthographicProjector::new(ProjectionConfig::new(100.0, (200.0, 150.0)));
//! projector.set_rotation(Rotation::new(-90.0, 0.0));
//!
//! // The view is now centered on 90°E
//! assert!(projector.project(90.0, 0.0).is_some());
//! assert!(projector.project(-90.0, 0.0).is_none());
//! ```

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::rotation::Rotation;

/// Default clip angle: the whole front hemisphere
pub const DEFAULT_CLIP_ANGLE: f64 = 90.0;

/// Screen-space point in logical pixels
pub type ScreenPoint = (f64, f64);

/// Scale, translation and clip angle of the projection
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// Sphere radius in logical pixels
    pub scale: f64,

    /// Screen position of the view center
    pub translate: ScreenPoint,

    /// Angular distance from the view center beyond which points are hidden
    #[serde(default = "default_clip_angle")]
    pub clip_angle: f64,
}

const fn default_clip_angle() -> f64 {
    DEFAULT_CLIP_ANGLE
}

impl ProjectionConfig {
    pub const fn new(scale: f64, translate: ScreenPoint) -> Self {
        Self {
            scale,
            translate,
            clip_angle: DEFAULT_CLIP_ANGLE,
        }
    }
}

/// Orthographic projector with back-hemisphere clipping.
///
/// Rotation is set on the projector before a frame is drawn; `project` is a
/// pure function of the point and the configured state.
#[derive(Clone, Debug)]
pub struct OrthographicProjector {
    config: ProjectionConfig,
    rotation: Rotation,
    cos_phi: f64,
    sin_phi: f64,
    cos_gamma: f64,
    sin_gamma: f64,
    clip_cos: f64,
}

impl OrthographicProjector {
    pub fn new(config: ProjectionConfig) -> Self {
        let mut projector = Self {
            config,
            rotation: Rotation::default(),
            cos_phi: 1.0,
            sin_phi: 0.0,
            cos_gamma: 1.0,
            sin_gamma: 0.0,
            clip_cos: config.clip_angle.to_radians().cos(),
        };
        projector.set_rotation(Rotation::default());
        projector
    }

    pub const fn config(&self) -> ProjectionConfig {
        self.config
    }

    pub const fn scale(&self) -> f64 {
        self.config.scale
    }

    pub const fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: Rotation) {
        let (sin_phi, cos_phi) = rotation.phi.to_radians().sin_cos();
        let (sin_gamma, cos_gamma) = rotation.gamma.to_radians().sin_cos();
        self.rotation = rotation;
        self.cos_phi = cos_phi;
        self.sin_phi = sin_phi;
        self.cos_gamma = cos_gamma;
        self.sin_gamma = sin_gamma;
    }

    /// Replace scale/translation/clip angle (viewport change)
    pub fn set_config(&mut self, config: ProjectionConfig) {
        self.config = config;
        self.clip_cos = config.clip_angle.to_radians().cos();
    }

    /// Project a point in degrees; `None` when it lies beyond the clip angle
    pub fn project(&self, lon: f64, lat: f64) -> Option<ScreenPoint> {
        let v = self.rotate(lon, lat);
        (v.x > self.clip_cos).then(|| self.to_screen(v))
    }

    /// Project a polyline, cutting it where it crosses the clip circle.
    ///
    /// Returns the visible pieces; each has at least two points.
    pub fn project_line(&self, line: &[(f64, f64)]) -> Vec<Vec<ScreenPoint>> {
        let mut pieces = Vec::new();
        let mut current: Vec<ScreenPoint> = Vec::new();
        let mut previous: Option<(DVec3, f64)> = None;

        for &(lon, lat) in line {
            let v = self.rotate(lon, lat);
            let depth = v.x - self.clip_cos;

            match previous {
                None => {
                    if depth > 0.0 {
                        current.push(self.to_screen(v));
                    }
                }
                Some((pv, pdepth)) => {
                    if pdepth > 0.0 && depth > 0.0 {
                        current.push(self.to_screen(v));
                    } else if pdepth > 0.0 {
                        let h = self.horizon_point(pv, pdepth, v, depth);
                        current.push(self.to_screen(h));
                        flush_piece(&mut pieces, &mut current);
                    } else if depth > 0.0 {
                        let h = self.horizon_point(pv, pdepth, v, depth);
                        current.push(self.to_screen(h));
                        current.push(self.to_screen(v));
                    }
                }
            }

            previous = Some((v, depth));
        }

        flush_piece(&mut pieces, &mut current);
        pieces
    }

    /// Unit vector of the point after applying the rotation triple.
    ///
    /// The x component is the cosine of the angular distance to the view
    /// center; y and z are the screen-plane coordinates on the unit sphere.
    fn rotate(&self, lon: f64, lat: f64) -> DVec3 {
        let v = to_unit_vector(lon + self.rotation.lambda, lat);

        let x = v.x * self.cos_phi - v.z * self.sin_phi;
        let k = v.z * self.cos_phi + v.x * self.sin_phi;

        DVec3::new(
            x,
            v.y * self.cos_gamma - k * self.sin_gamma,
            k * self.cos_gamma + v.y * self.sin_gamma,
        )
    }

    fn to_screen(&self, v: DVec3) -> ScreenPoint {
        let (tx, ty) = self.config.translate;
        (tx + self.config.scale * v.y, ty - self.config.scale * v.z)
    }

    /// Point where the chord a→b meets the clip circle, pushed back onto the sphere
    fn horizon_point(&self, a: DVec3, da: f64, b: DVec3, db: f64) -> DVec3 {
        let t = da / (da - db);
        let mut p = a.lerp(b, t);
        p.x = self.clip_cos;

        let rim = (1.0 - self.clip_cos * self.clip_cos).max(0.0).sqrt();
        let planar = p.y.hypot(p.z);
        if planar > f64::EPSILON {
            p.y *= rim / planar;
            p.z *= rim / planar;
        }
        p
    }
}

fn flush_piece(pieces: &mut Vec<Vec<ScreenPoint>>, current: &mut Vec<ScreenPoint>) {
    if current.len() >= 2 {
        pieces.push(std::mem::take(current));
    } else {
        current.clear();
    }
}

/// Geographic degrees to a unit vector (x toward 0°E on the equator, z north)
pub fn to_unit_vector(lon: f64, lat: f64) -> DVec3 {
    let (sin_lon, cos_lon) = lon.to_radians().sin_cos();
    let (sin_lat, cos_lat) = lat.to_radians().sin_cos();
    DVec3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projector() -> OrthographicProjector {
        OrthographicProjector::new(ProjectionConfig::new(100.0, (200.0, 150.0)))
    }

    fn close(a: ScreenPoint, b: ScreenPoint) -> bool {
        (a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9
    }

    #[test]
    fn test_center_maps_to_translate() {
        let p = projector();
        assert!(close(p.project(0.0, 0.0).unwrap(), (200.0, 150.0)));
    }

    #[test]
    fn test_north_is_up() {
        let p = projector();
        let (x, y) = p.project(0.0, 30.0).unwrap();
        assert!((x - 200.0).abs() < 1e-9);
        assert!(y < 150.0);
    }

    #[test]
    fn test_antipode_is_hidden() {
        let mut p = projector();
        assert!(p.project(180.0, 0.0).is_none());

        for (lambda, phi) in [(35.0, 20.0), (-120.0, -45.0), (200.0, 80.0)] {
            p.set_rotation(Rotation::new(lambda, phi));
            // view center is (-lambda, -phi); its antipode is opposite on both axes
            let center = (-lambda, -phi);
            assert!(p.project(center.0, center.1).is_some());
            assert!(p.project(center.0 + 180.0, -center.1).is_none());
        }
    }

    #[test]
    fn test_lambda_rotation_moves_view_center() {
        let mut p = projector();
        p.set_rotation(Rotation::new(-90.0, 0.0));
        assert!(close(p.project(90.0, 0.0).unwrap(), (200.0, 150.0)));
        assert!(p.project(-90.0 - 1.0, 0.0).is_none());
    }

    #[test]
    fn test_phi_rotation_tilts_southern_point_to_center() {
        let mut p = projector();
        p.set_rotation(Rotation::new(0.0, 30.0));
        assert!(close(p.project(0.0, -30.0).unwrap(), (200.0, 150.0)));
    }

    #[test]
    fn test_equator_is_clipped_at_horizon() {
        let p = projector();
        let equator: Vec<(f64, f64)> = (-72..=72).map(|i| (f64::from(i) * 2.5, 0.0)).collect();

        let pieces = p.project_line(&equator);
        assert_eq!(pieces.len(), 1);

        let piece = &pieces[0];
        let first = piece.first().unwrap();
        let last = piece.last().unwrap();
        assert!((first.0 - 100.0).abs() < 1e-6, "left rim at {}", first.0);
        assert!((last.0 - 300.0).abs() < 1e-6, "right rim at {}", last.0);
    }

    #[test]
    fn test_hidden_line_yields_nothing() {
        let p = projector();
        let meridian: Vec<(f64, f64)> = (-8..=8).map(|i| (180.0, f64::from(i) * 10.0)).collect();
        assert!(p.project_line(&meridian).is_empty());
    }
}
