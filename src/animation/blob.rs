//! Blob field motion.
//!
//! Every blob is a pure function of `(config, orbit phase)`. Nothing here holds per-frame state:
//! the same phase always yields bit-identical geometry.

use crate::animation::clock::Phase;
use crate::foundation::color::Color;
use crate::foundation::core::Point;
use crate::foundation::error::{GlimmerError, GlimmerResult};
use std::f64::consts::TAU;

/// Y runs at 0.9x the X frequency so orbits lean into Lissajous curves instead of circles.
pub const Y_FREQ_RATIO: f64 = 0.9;
/// Radius pulse frequency relative to the orbit speed.
pub const RADIUS_FREQ_RATIO: f64 = 1.6;
/// Radius pulse phase weight.
pub const RADIUS_PHASE_WEIGHT: f64 = 1.3;
/// Opacity pulse frequency relative to the orbit speed.
pub const OPACITY_FREQ_RATIO: f64 = 1.2;
/// Opacity pulse phase weight.
pub const OPACITY_PHASE_WEIGHT: f64 = 0.7;

/// Motion parameters of one blob, in screen units.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BlobMotion {
    /// Orbit half-extent along X.
    pub amp_x: f64,
    /// Orbit half-extent along Y.
    pub amp_y: f64,
    /// Smallest radius.
    pub base_r: f64,
    /// Radius swing above `base_r`.
    pub var_r: f64,
    /// Radians of orbit angle per unit of shared phase.
    pub speed: f64,
    /// Phase offset in radians.
    pub phase: f64,
    /// Peak opacity in `0..=1`.
    pub base_opacity: f64,
}

/// Derived geometry of one blob for one frame.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct FrameBlobState {
    /// Blob centre on screen.
    pub center: Point,
    /// Radius of the radial fill.
    pub radius: f64,
    /// Layer opacity.
    pub opacity: f64,
}

impl BlobMotion {
    /// Check the non-negativity and range invariants.
    pub fn validate(&self) -> GlimmerResult<()> {
        let fields = [
            ("amp_x", self.amp_x),
            ("amp_y", self.amp_y),
            ("base_r", self.base_r),
            ("var_r", self.var_r),
            ("speed", self.speed),
            ("phase", self.phase),
            ("base_opacity", self.base_opacity),
        ];
        for (name, v) in fields {
            if !v.is_finite() {
                return Err(GlimmerError::validation(format!("{name} must be finite")));
            }
        }
        for (name, v) in [
            ("amp_x", self.amp_x),
            ("amp_y", self.amp_y),
            ("base_r", self.base_r),
            ("var_r", self.var_r),
        ] {
            if v < 0.0 {
                return Err(GlimmerError::validation(format!("{name} must be >= 0")));
            }
        }
        if !(0.0..=1.0).contains(&self.base_opacity) {
            return Err(GlimmerError::validation(
                "base_opacity must be within [0, 1]",
            ));
        }
        Ok(())
    }

    /// Orbit angle (radians) at phase `t`.
    #[inline]
    pub fn angle(&self, t: f64) -> f64 {
        t * self.speed + self.phase
    }

    /// Centre on the elliptical orbit around `origin`.
    #[inline]
    pub fn position(&self, t: f64, origin: Point) -> Point {
        let angle = self.angle(t);
        Point::new(
            origin.x + self.amp_x * angle.cos(),
            origin.y + self.amp_y * (angle * Y_FREQ_RATIO).sin(),
        )
    }

    /// Radius in `[base_r, base_r + var_r]`.
    #[inline]
    pub fn radius(&self, t: f64) -> f64 {
        let pulse = (t * (self.speed * RADIUS_FREQ_RATIO) + self.phase * RADIUS_PHASE_WEIGHT).sin();
        self.base_r + self.var_r * (0.5 + 0.5 * pulse)
    }

    /// Opacity in `[0.5 * base_opacity, base_opacity]`.
    #[inline]
    pub fn opacity(&self, t: f64) -> f64 {
        let pulse =
            (t * (self.speed * OPACITY_FREQ_RATIO) + self.phase * OPACITY_PHASE_WEIGHT).sin();
        self.base_opacity * (0.75 + 0.25 * pulse)
    }

    /// Full frame geometry at phase `t` around `origin`.
    #[inline]
    pub fn sample(&self, t: Phase, origin: Point) -> FrameBlobState {
        FrameBlobState {
            center: self.position(t.0, origin),
            radius: self.radius(t.0),
            opacity: self.opacity(t.0),
        }
    }

    /// Inclusive radius bounds.
    pub fn radius_range(&self) -> (f64, f64) {
        (self.base_r, self.base_r + self.var_r)
    }

    /// Inclusive opacity bounds.
    pub fn opacity_range(&self) -> (f64, f64) {
        (0.5 * self.base_opacity, self.base_opacity)
    }

    /// Phase span after which the X coordinate repeats, `None` for a stationary blob.
    pub fn x_period(&self) -> Option<f64> {
        (self.speed != 0.0).then(|| TAU / self.speed.abs())
    }

    /// Phase span after which the Y coordinate repeats.
    pub fn y_period(&self) -> Option<f64> {
        (self.speed != 0.0).then(|| TAU / (self.speed.abs() * Y_FREQ_RATIO))
    }

    /// Phase span after which the whole orbit repeats: ten X turns equal nine Y turns.
    pub fn orbit_period(&self) -> Option<f64> {
        self.x_period().map(|p| p * 10.0)
    }
}

/// Immutable identity, color and motion of one blob.
#[derive(Clone, Debug, PartialEq)]
pub struct BlobConfig {
    id: String,
    color: Color,
    motion: BlobMotion,
}

impl BlobConfig {
    /// Build a validated config.
    pub fn new(id: impl Into<String>, color: Color, motion: BlobMotion) -> GlimmerResult<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(GlimmerError::validation("blob id must be non-empty"));
        }
        motion
            .validate()
            .map_err(|e| GlimmerError::validation(format!("blob '{id}': {e}")))?;
        if !color.is_finite() {
            return Err(GlimmerError::validation(format!(
                "blob '{id}': color must be finite"
            )));
        }
        Ok(Self { id, color, motion })
    }

    /// Stable identifier, also the key of the blob's radial fill.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Base fill color.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Motion parameters.
    pub fn motion(&self) -> &BlobMotion {
        &self.motion
    }
}

/// A fixed list of blobs orbiting a shared origin.
#[derive(Clone, Debug, Default)]
pub struct BlobField {
    origin: Point,
    blobs: Vec<BlobConfig>,
}

impl BlobField {
    /// Build a field; `origin` is the screen centre captured at mount.
    pub fn new(blobs: Vec<BlobConfig>, origin: Point) -> Self {
        Self { origin, blobs }
    }

    /// Orbit centre.
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Blob configs in draw order.
    pub fn configs(&self) -> &[BlobConfig] {
        &self.blobs
    }

    /// Number of blobs.
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    /// Whether the field has no blobs.
    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    /// Geometry of blob `index` at phase `t`.
    pub fn sample(&self, index: usize, t: Phase) -> Option<FrameBlobState> {
        self.blobs
            .get(index)
            .map(|b| b.motion.sample(t, self.origin))
    }

    /// Evaluate every blob at the same phase into `out`, reusing its capacity.
    pub fn evaluate_into(&self, t: Phase, out: &mut Vec<FrameBlobState>) {
        out.clear();
        out.extend(self.blobs.iter().map(|b| b.motion.sample(t, self.origin)));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/blob.rs"]
mod tests;
