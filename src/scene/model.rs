use crate::foundation::color::Color;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{GlimmerError, GlimmerResult};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// JSON-facing description of a backdrop.
///
/// Geometry is relative to the screen so one document fits any device; it is resolved into screen
/// units once, at mount, by [`crate::Scene::resolve`]. [`SceneDef::default`] is the reference
/// backdrop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneDef {
    /// Screen snapshot used when the host does not supply one.
    #[serde(default = "default_canvas")]
    pub canvas: Canvas,
    /// Export frame rate.
    #[serde(default = "default_fps")]
    pub fps: Fps,
    /// Color painted beneath the blobs.
    #[serde(default = "default_background")]
    pub background: Color,
    /// The two independent rhythms.
    #[serde(default)]
    pub clocks: ClocksDef,
    /// Blobs in draw order; an explicit empty list is allowed.
    #[serde(default = "default_blobs")]
    pub blobs: Vec<BlobDef>,
    /// Radial falloff shared by every blob fill.
    #[serde(default)]
    pub blob_fill: FillDef,
    /// Title text, sweep and glow.
    #[serde(default)]
    pub title: TitleDef,
}

/// One repeating ramp: `0..ceiling` over `cycle_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClockDef {
    /// Ramp duration in milliseconds.
    pub cycle_ms: u64,
    /// Value reached just before the wrap.
    pub ceiling: f64,
}

/// Orbit and sweep clocks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClocksDef {
    /// Drives blob motion (radians).
    pub orbit: ClockDef,
    /// Drives the title sweep rotation (degrees).
    pub sweep: ClockDef,
}

impl Default for ClocksDef {
    fn default() -> Self {
        Self {
            orbit: ClockDef {
                cycle_ms: 16_000,
                ceiling: std::f64::consts::TAU,
            },
            sweep: ClockDef {
                cycle_ms: 12_000,
                ceiling: 360.0,
            },
        }
    }
}

/// One blob with geometry relative to the screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlobDef {
    /// Unique id, also the key of the blob's radial fill.
    pub id: String,
    /// Base color of the radial fill.
    pub color: Color,
    /// Orbit half-extent along X, as a fraction of screen width.
    pub amp_x: f64,
    /// Orbit half-extent along Y, as a fraction of screen height.
    pub amp_y: f64,
    /// Base radius, as a fraction of screen width.
    pub base_r: f64,
    /// Radius swing, as a fraction of screen width.
    pub var_r: f64,
    /// Angular speed in radians per unit of orbit phase.
    pub speed: f64,
    /// Phase offset in radians.
    #[serde(default)]
    pub phase: f64,
    /// Peak opacity.
    pub opacity: f64,
}

/// Alpha of the radial blob fill at its centre (0%) and rim (100%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FillDef {
    /// Alpha at the centre.
    pub inner_alpha: f64,
    /// Alpha at the rim.
    pub outer_alpha: f64,
}

impl Default for FillDef {
    fn default() -> Self {
        Self {
            inner_alpha: 0.9,
            outer_alpha: 0.0,
        }
    }
}

/// Gradient stop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StopDef {
    /// Position in `0..=1`.
    pub offset: f64,
    /// Color at `offset`.
    pub color: Color,
}

/// Linear gradient across the unit square of the sweep layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GradientDef {
    /// Stops with ascending offsets.
    pub stops: Vec<StopDef>,
    /// Gradient start in layer-relative coordinates.
    #[serde(default = "default_start")]
    pub start: [f64; 2],
    /// Gradient end in layer-relative coordinates.
    #[serde(default = "default_end")]
    pub end: [f64; 2],
}

impl Default for GradientDef {
    fn default() -> Self {
        let silver = Color::rgb8(0xc0, 0xc0, 0xc0);
        let pale = Color::rgb8(0xe8, 0xe8, 0xe8);
        let gold = Color::rgb8(0xff, 0xd7, 0x00);
        Self {
            stops: vec![
                StopDef {
                    offset: 0.0,
                    color: silver,
                },
                StopDef {
                    offset: 0.22,
                    color: pale,
                },
                StopDef {
                    offset: 0.5,
                    color: gold,
                },
                StopDef {
                    offset: 0.78,
                    color: pale,
                },
                StopDef {
                    offset: 1.0,
                    color: silver,
                },
            ],
            start: default_start(),
            end: default_end(),
        }
    }
}

/// Static bloom copy of the title.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GlowDef {
    /// Glyph color of the glow copy.
    pub color: Color,
    /// Layer opacity.
    pub opacity: f64,
    /// Gaussian blur radius in pixels; 0 disables the blur.
    pub blur_radius: u32,
}

impl Default for GlowDef {
    fn default() -> Self {
        Self {
            color: Color::rgb8(0xff, 0xd7, 0x00),
            opacity: 0.08,
            blur_radius: 16,
        }
    }
}

/// Title text and the layers that decorate it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TitleDef {
    /// Text to render; empty disables the title.
    pub text: String,
    /// Font file, absolute or relative to the assets root. Without one the title is skipped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<PathBuf>,
    /// Font size as a fraction of screen width.
    pub size_frac: f64,
    /// Upper bound of the font size in pixels.
    pub size_max: f64,
    /// Font weight (100..=1000).
    #[serde(default = "default_weight")]
    pub weight: f32,
    /// Extra advance between glyphs in pixels.
    #[serde(default)]
    pub letter_spacing: f32,
    /// Mask box width as a fraction of screen width.
    pub box_width_frac: f64,
    /// Upper bound of the mask box width in pixels.
    pub box_width_max: f64,
    /// Mask box height in pixels.
    pub box_height: f64,
    /// Rotating fill clipped to the glyphs.
    #[serde(default)]
    pub sweep: GradientDef,
    /// Static glow above the title.
    #[serde(default)]
    pub glow: GlowDef,
}

impl Default for TitleDef {
    fn default() -> Self {
        Self {
            text: "Smooth is Fast".to_owned(),
            font: None,
            size_frac: 0.12,
            size_max: 64.0,
            weight: default_weight(),
            letter_spacing: 0.5,
            box_width_frac: 0.9,
            box_width_max: 700.0,
            box_height: 140.0,
            sweep: GradientDef::default(),
            glow: GlowDef::default(),
        }
    }
}

impl Default for SceneDef {
    fn default() -> Self {
        Self {
            canvas: default_canvas(),
            fps: default_fps(),
            background: default_background(),
            clocks: ClocksDef::default(),
            blobs: default_blobs(),
            blob_fill: FillDef::default(),
            title: TitleDef::default(),
        }
    }
}

impl SceneDef {
    /// Parse a scene from a JSON reader. Missing sections fall back to the reference values.
    pub fn from_reader<R: std::io::Read>(r: R) -> GlimmerResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| GlimmerError::serde(format!("parse scene JSON: {e}")))
    }

    /// Parse a scene from a JSON string.
    pub fn from_json_str(s: &str) -> GlimmerResult<Self> {
        serde_json::from_str(s).map_err(|e| GlimmerError::serde(format!("parse scene JSON: {e}")))
    }

    /// Parse a scene from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> GlimmerResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            GlimmerError::serde(format!("open scene JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Pretty JSON rendering of the scene.
    pub fn to_json_pretty(&self) -> GlimmerResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| GlimmerError::serde(format!("serialize scene JSON: {e}")))
    }

    /// Check every invariant, reporting all violations at once.
    pub fn validate(&self) -> GlimmerResult<()> {
        crate::scene::validate::validate_scene(self)
            .map_err(|e| GlimmerError::validation(format!("scene validation failed:\n{e}")))
    }
}

fn default_canvas() -> Canvas {
    Canvas {
        width: 390,
        height: 844,
    }
}

fn default_fps() -> Fps {
    Fps { num: 60, den: 1 }
}

fn default_background() -> Color {
    Color::rgb8(0x0a, 0x0a, 0x0a)
}

fn default_blobs() -> Vec<BlobDef> {
    // (id, color, amp_x, amp_y, base_r, var_r, speed, phase, opacity)
    let rows: [(&str, [u8; 3], f64, f64, f64, f64, f64, f64, f64); 6] = [
        ("g0", [0xd4, 0xaf, 0x37], 0.42, 0.28, 0.55, 0.10, 0.60, 0.0, 0.30),
        ("g1", [0xc0, 0xc0, 0xc0], 0.38, 0.26, 0.48, 0.09, 0.72, 1.1, 0.26),
        ("g2", [0xff, 0xd7, 0x00], 0.36, 0.25, 0.52, 0.08, 0.54, 2.2, 0.28),
        ("g3", [0xd3, 0xd3, 0xd3], 0.40, 0.33, 0.50, 0.10, 0.66, 3.3, 0.24),
        ("g4", [0xb8, 0x86, 0x0b], 0.45, 0.30, 0.46, 0.08, 0.58, 4.4, 0.22),
        ("g5", [0xa9, 0xa9, 0xa9], 0.34, 0.27, 0.44, 0.07, 0.76, 5.5, 0.20),
    ];
    rows.iter()
        .map(
            |&(id, [r, g, b], amp_x, amp_y, base_r, var_r, speed, phase, opacity)| BlobDef {
                id: id.to_owned(),
                color: Color::rgb8(r, g, b),
                amp_x,
                amp_y,
                base_r,
                var_r,
                speed,
                phase,
                opacity,
            },
        )
        .collect()
}

fn default_weight() -> f32 {
    900.0
}

fn default_start() -> [f64; 2] {
    [0.0, 0.0]
}

fn default_end() -> [f64; 2] {
    [1.0, 1.0]
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
