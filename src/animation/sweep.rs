//! Rotating gradient sweep behind the title mask.

use crate::animation::clock::Phase;
use crate::foundation::core::{Affine, Point, Rect, Transform2D, Vec2};

/// Rotation of the sweep layer for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
pub struct SweepState {
    /// Rotation in degrees, as produced by the sweep clock.
    pub angle_deg: f64,
}

impl SweepState {
    /// Identity mapping: the sweep clock ceiling is already expressed in degrees.
    pub fn from_phase(r: Phase) -> Self {
        Self { angle_deg: r.0 }
    }

    /// Angle folded into `[0, 360)`, so 360 and 0 produce the same transform bit for bit.
    pub fn normalized_deg(self) -> f64 {
        let a = self.angle_deg.rem_euclid(360.0);
        // rem_euclid can round up to exactly 360 for tiny negative inputs.
        if a >= 360.0 { 0.0 } else { a }
    }

    /// Normalized angle in radians.
    pub fn radians(self) -> f64 {
        self.normalized_deg().to_radians()
    }
}

/// Static geometry of the sweep layer: a square centred on the title box, large enough that
/// rotation never uncovers the box corners.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TitleSweep {
    mask_box: Rect,
    side: f64,
}

impl TitleSweep {
    /// Build the layer for a title mask box in canvas coordinates.
    pub fn new(mask_box: Rect) -> Self {
        let side = mask_box.width().hypot(mask_box.height());
        Self { mask_box, side }
    }

    /// Mask box the layer is clipped to.
    pub fn mask_box(&self) -> Rect {
        self.mask_box
    }

    /// Side length of the square layer (the mask box diagonal).
    pub fn side(&self) -> f64 {
        self.side
    }

    /// The layer in its local space: `[0, side]²`.
    pub fn local_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.side, self.side)
    }

    /// Pivot of the rotation, the mask box centre.
    pub fn pivot(&self) -> Point {
        self.mask_box.center()
    }

    /// Local-to-canvas transform placing the layer centred on the pivot, rotated by `state`.
    pub fn transform(&self, state: SweepState) -> Affine {
        let half = Vec2::new(self.side * 0.5, self.side * 0.5);
        Transform2D {
            translate: self.pivot().to_vec2() - half,
            rotation_rad: state.radians(),
            scale: Vec2::new(1.0, 1.0),
            anchor: half,
        }
        .to_affine()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/sweep.rs"]
mod tests;
