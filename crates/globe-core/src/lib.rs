//! # globe-core
//!
//! Rotating dotted-globe widget core: orthographic projection, land-dot
//! sampling and the frame/drag state machine, independent of any UI toolkit.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       GlobeRenderer                           │
//! │  ┌────────────────┐  ┌────────────────┐  ┌─────────────────┐  │
//! │  │ RotationControl│──│ Orthographic   │──│ DrawingSurface  │  │
//! │  │ (timer | drag) │  │ Projector      │  │ (host canvas)   │  │
//! │  └────────────────┘  └────────────────┘  └─────────────────┘  │
//! │           ▲                   ▲                               │
//! │      DragSession        SamplePoints ◀── DotSampler(GeoJSON)  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `DrawingSurface` trait is the only thing a host has to provide; the
//! web crate implements it over a 2D canvas context.

pub mod error;
pub mod graticule;
pub mod interaction;
pub mod land;
pub mod projection;
pub mod renderer;
pub mod rotation;
pub mod surface;
pub mod viewport;

pub use error::{GlobeError, Result};
pub use land::{DotSampler, FeatureCollection, SamplePoint};
pub use projection::{OrthographicProjector, ProjectionConfig};
pub use renderer::{GlobeConfig, GlobeRenderer, GlobeState, Palette};
pub use rotation::{Rotation, RotationControl};
pub use surface::DrawingSurface;
pub use viewport::{SurfaceLayout, ViewportRequest};
