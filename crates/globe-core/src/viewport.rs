//! Viewport Layout
//!
//! Derives the surface size and projection config from the requested widget
//! size, the space the host has available, and the device pixel ratio.

use serde::{Deserialize, Serialize};

use crate::error::{GlobeError, Result};
use crate::projection::ProjectionConfig;

/// Horizontal margin kept free around the widget
pub const HORIZONTAL_MARGIN: f64 = 40.0;

/// Vertical margin kept free around the widget
pub const VERTICAL_MARGIN: f64 = 100.0;

/// Ratio between the smaller surface side and the sphere radius
pub const RADIUS_DIVISOR: f64 = 2.5;

/// Requested widget size plus what the host can offer
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewportRequest {
    pub width: f64,
    pub height: f64,
    pub available_width: f64,
    pub available_height: f64,
    pub device_pixel_ratio: f64,
}

impl ViewportRequest {
    pub const fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            available_width: f64::INFINITY,
            available_height: f64::INFINITY,
            device_pixel_ratio: 1.0,
        }
    }

    pub const fn available(mut self, width: f64, height: f64) -> Self {
        self.available_width = width;
        self.available_height = height;
        self
    }

    pub const fn pixel_ratio(mut self, ratio: f64) -> Self {
        self.device_pixel_ratio = ratio;
        self
    }
}

impl Default for ViewportRequest {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

/// Resolved surface dimensions
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurfaceLayout {
    /// Logical (CSS) width
    pub width: f64,

    /// Logical (CSS) height
    pub height: f64,

    /// Backing store width in device pixels
    pub pixel_width: u32,

    /// Backing store height in device pixels
    pub pixel_height: u32,

    /// Scale from logical to device pixels
    pub pixel_ratio: f64,

    /// Sphere radius at scale factor 1
    pub radius: f64,
}

impl SurfaceLayout {
    /// Resolve a request into a layout
    pub fn resolve(request: ViewportRequest) -> Result<Self> {
        if !(request.width > 0.0 && request.height > 0.0) {
            return Err(GlobeError::InvalidViewport(format!(
                "requested size {}x{} must be positive",
                request.width, request.height
            )));
        }

        let width = request
            .width
            .min(request.available_width - HORIZONTAL_MARGIN)
            .max(1.0);
        let height = request
            .height
            .min(request.available_height - VERTICAL_MARGIN)
            .max(1.0);

        let pixel_ratio = if request.device_pixel_ratio > 0.0 {
            request.device_pixel_ratio
        } else {
            1.0
        };

        Ok(Self {
            width,
            height,
            pixel_width: (width * pixel_ratio).round() as u32,
            pixel_height: (height * pixel_ratio).round() as u32,
            pixel_ratio,
            radius: width.min(height) / RADIUS_DIVISOR,
        })
    }

    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }

    /// Projection config for this layout
    pub fn projection(&self) -> ProjectionConfig {
        ProjectionConfig::new(self.radius, self.center())
    }

    /// Whether a logical point lies on the surface
    pub fn contains(&self, (x, y): (f64, f64)) -> bool {
        (0.0..=self.width).contains(&x) && (0.0..=self.height).contains(&y)
    }
}
