//! Drawing Surface
//!
//! The raster primitives the renderer needs from its host. A browser canvas
//! implements this in the web crate; tests use a recording fake.

use crate::projection::ScreenPoint;

/// 2D raster surface in logical pixels
pub trait DrawingSurface {
    /// Clear the whole logical area
    fn clear(&mut self, width: f64, height: f64);

    /// Fill a circle
    fn fill_circle(&mut self, center: ScreenPoint, radius: f64, color: &str);

    /// Outline a circle
    fn stroke_circle(&mut self, center: ScreenPoint, radius: f64, color: &str, line_width: f64);

    /// Stroke a batch of polylines as one path at the given opacity
    fn stroke_paths(&mut self, paths: &[Vec<ScreenPoint>], color: &str, line_width: f64, alpha: f64);
}
