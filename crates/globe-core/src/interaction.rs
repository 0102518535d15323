//! Pointer Drag Session

use crate::projection::ScreenPoint;
use crate::rotation::Rotation;

/// Default rotation per pointer pixel (degrees)
pub const DEFAULT_DRAG_SENSITIVITY: f64 = 0.25;

/// Transient state of one pointer drag
#[derive(Clone, Debug, PartialEq)]
pub struct DragSession {
    /// Pointer position at pointer-down (client space)
    pub start: ScreenPoint,

    /// Rotation snapshot at pointer-down
    pub start_rotation: Rotation,

    /// Frame-clock time of pointer-up, once released
    pub released_at: Option<f64>,
}

impl DragSession {
    pub const fn new(start: ScreenPoint, start_rotation: Rotation) -> Self {
        Self {
            start,
            start_rotation,
            released_at: None,
        }
    }

    pub const fn is_released(&self) -> bool {
        self.released_at.is_some()
    }

    /// Rotation for the current pointer position.
    ///
    /// Horizontal motion turns longitude, vertical motion tilts latitude
    /// (dragging down brings the north toward the viewer). Latitude is
    /// clamped to [-90, 90].
    pub fn target(&self, pointer: ScreenPoint, sensitivity: f64) -> Rotation {
        let dx = pointer.0 - self.start.0;
        let dy = pointer.1 - self.start.1;

        Rotation::new(
            dx.mul_add(sensitivity, self.start_rotation.lambda),
            (-dy).mul_add(sensitivity, self.start_rotation.phi),
        )
        .clamped()
    }

    /// Whether the post-release delay has elapsed at `now`
    pub fn resume_due(&self, now: f64, delay_ms: f64) -> bool {
        self.released_at.is_some_and(|at| now - at >= delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_from_displacement() {
        let session = DragSession::new((100.0, 100.0), Rotation::new(10.0, 5.0));
        let r = session.target((140.0, 80.0), DEFAULT_DRAG_SENSITIVITY);
        assert!((r.lambda - 20.0).abs() < 1e-12);
        assert!((r.phi - 10.0).abs() < 1e-12);
        assert_eq!(r.gamma, 0.0);
    }

    #[test]
    fn test_target_latitude_clamped() {
        let session = DragSession::new((0.0, 0.0), Rotation::new(0.0, 80.0));
        assert_eq!(session.target((0.0, -1000.0), 0.25).phi, 90.0);
        assert_eq!(session.target((0.0, 5000.0), 0.25).phi, -90.0);
    }

    #[test]
    fn test_resume_due() {
        let mut session = DragSession::new((0.0, 0.0), Rotation::default());
        assert!(!session.resume_due(1000.0, 10.0));

        session.released_at = Some(100.0);
        assert!(!session.resume_due(105.0, 10.0));
        assert!(session.resume_due(110.0, 10.0));
    }
}
