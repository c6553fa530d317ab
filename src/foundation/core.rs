use crate::foundation::error::{GlimmerError, GlimmerResult};
use std::time::Duration;

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Zero-based frame number on an fps timeline.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Half-open frame range `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    /// First frame (inclusive).
    pub start: FrameIndex,
    /// Last frame (exclusive).
    pub end: FrameIndex,
}

impl FrameRange {
    /// Build a range, rejecting `start > end`.
    pub fn new(start: FrameIndex, end: FrameIndex) -> GlimmerResult<Self> {
        if start.0 > end.0 {
            return Err(GlimmerError::validation("FrameRange start must be <= end"));
        }
        Ok(Self { start, end })
    }

    /// Number of frames in the range.
    pub fn len_frames(self) -> u64 {
        self.end.0.saturating_sub(self.start.0)
    }

    /// Whether the range holds no frames.
    pub fn is_empty(self) -> bool {
        self.start.0 == self.end.0
    }

    /// Whether `f` lies inside the range.
    pub fn contains(self, f: FrameIndex) -> bool {
        self.start.0 <= f.0 && f.0 < self.end.0
    }
}

/// Rational frames-per-second.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator.
    pub num: u32,
    /// Denominator, must be > 0.
    pub den: u32,
}

impl Fps {
    /// Build an fps value, rejecting zero numerator or denominator.
    pub fn new(num: u32, den: u32) -> GlimmerResult<Self> {
        if den == 0 {
            return Err(GlimmerError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(GlimmerError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Frames per second as a float.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Seconds covered by `frames` frames.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * f64::from(self.den) / f64::from(self.num)
    }

    /// Whole frames that fit in `secs` (rounded down).
    pub fn secs_to_frames_floor(self, secs: f64) -> u64 {
        (secs * self.as_f64()).floor().max(0.0) as u64
    }

    /// Timestamp of `frame` measured from the timeline origin.
    ///
    /// Computed in integer nanoseconds so frame times that land on a clock cycle boundary are
    /// exact multiples of that cycle.
    pub fn frame_time(self, frame: FrameIndex) -> Duration {
        let nanos = u128::from(frame.0) * u128::from(self.den) * 1_000_000_000
            / u128::from(self.num.max(1));
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }
}

/// Pixel dimensions of the host screen, captured once at mount.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Screen centre in canvas coordinates.
    pub fn center(self) -> Point {
        Point::new(f64::from(self.width) * 0.5, f64::from(self.height) * 0.5)
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Rgba8Premul {
    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Premultiply a straight-alpha color.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    /// Raw `[r, g, b, a]` bytes.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Translate/rotate/scale about an anchor point.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transform2D {
    /// Translation applied last.
    pub translate: Vec2,
    /// Rotation in radians, about `anchor`.
    pub rotation_rad: f64,
    /// Scale about `anchor`, default (1,1).
    pub scale: Vec2,
    /// Pivot in local space.
    pub anchor: Vec2,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            translate: Vec2::ZERO,
            rotation_rad: 0.0,
            scale: Vec2::new(1.0, 1.0),
            anchor: Vec2::ZERO,
        }
    }
}

impl Transform2D {
    /// Collapse into a single affine.
    pub fn to_affine(self) -> Affine {
        let t_translate = Affine::translate(self.translate);
        let t_anchor = Affine::translate(self.anchor);
        let t_unanchor = Affine::translate(-self.anchor);
        let t_rotate = Affine::rotate(self.rotation_rad);
        let t_scale = Affine::scale_non_uniform(self.scale.x, self.scale.y);

        // T(translate) * T(anchor) * R(rot) * S(scale) * T(-anchor)
        t_translate * t_anchor * t_rotate * t_scale * t_unanchor
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
