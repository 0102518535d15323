//! Rotation State
//!
//! The globe's rotation triple and the single authority allowed to change it.

use serde::{Deserialize, Serialize};

/// Latitude bound (degrees) applied to every drag update
pub const MAX_LATITUDE: f64 = 90.0;

/// Rotation triple in degrees
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    /// Added to every longitude before projecting
    pub lambda: f64,

    /// Tilt toward the viewer, clamped to [-90, 90]
    pub phi: f64,

    /// Roll around the view axis (unused, kept at 0)
    pub gamma: f64,
}

impl Rotation {
    pub const fn new(lambda: f64, phi: f64) -> Self {
        Self { lambda, phi, gamma: 0.0 }
    }

    /// Copy with latitude clamped into range
    pub fn clamped(self) -> Self {
        Self {
            phi: self.phi.clamp(-MAX_LATITUDE, MAX_LATITUDE),
            ..self
        }
    }
}

/// Who currently owns the rotation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RotationAuthority {
    /// Frame timer advances longitude
    AutoRotate,
    /// Pointer drag sets longitude/latitude directly
    Drag,
}

/// Owned rotation value behind setters that check the caller's authority.
///
/// Exactly one authority is active at a time. Writes from the inactive one
/// are rejected and report `false`.
#[derive(Clone, Debug)]
pub struct RotationControl {
    rotation: Rotation,
    authority: RotationAuthority,
}

impl Default for RotationControl {
    fn default() -> Self {
        Self::new(Rotation::default())
    }
}

impl RotationControl {
    pub fn new(initial: Rotation) -> Self {
        Self {
            rotation: initial.clamped(),
            authority: RotationAuthority::AutoRotate,
        }
    }

    pub const fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub const fn authority(&self) -> RotationAuthority {
        self.authority
    }

    /// Advance longitude on behalf of the auto-rotate timer
    pub fn advance(&mut self, degrees: f64) -> bool {
        if self.authority != RotationAuthority::AutoRotate {
            return false;
        }
        self.rotation.lambda += degrees;
        true
    }

    /// Hand authority to a drag and return the rotation it starts from
    pub fn begin_drag(&mut self) -> Rotation {
        self.authority = RotationAuthority::Drag;
        self.rotation
    }

    /// Set rotation on behalf of an active drag; latitude is clamped
    pub fn drag_to(&mut self, lambda: f64, phi: f64) -> bool {
        if self.authority != RotationAuthority::Drag {
            return false;
        }
        self.rotation = Rotation::new(lambda, phi).clamped();
        true
    }

    /// Return authority to the auto-rotate timer
    pub fn resume_auto(&mut self) {
        self.authority = RotationAuthority::AutoRotate;
    }
}
