use crate::animation::blob::{BlobConfig, BlobField, BlobMotion};
use crate::animation::clock::ClockSpec;
use crate::animation::sweep::TitleSweep;
use crate::foundation::color::Color;
use crate::foundation::core::{Canvas, Fps, Point, Rect};
use crate::foundation::error::{GlimmerError, GlimmerResult};
use crate::foundation::math::lcm_u128;
use crate::scene::model::{ClockDef, FillDef, GlowDef, GradientDef, SceneDef, TitleDef};
use smallvec::SmallVec;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// One resolved gradient stop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    /// Position in `0..=1`.
    pub offset: f64,
    /// Straight-alpha color.
    pub color: Color,
}

/// Linear gradient in the unit square of a layer.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearGradient {
    /// Ascending stops.
    pub stops: SmallVec<[GradientStop; 5]>,
    /// Start point in unit coordinates.
    pub start: Point,
    /// End point in unit coordinates.
    pub end: Point,
}

impl LinearGradient {
    fn from_def(def: &GradientDef) -> Self {
        Self {
            stops: def
                .stops
                .iter()
                .map(|s| GradientStop {
                    offset: s.offset,
                    color: s.color,
                })
                .collect(),
            start: Point::new(def.start[0], def.start[1]),
            end: Point::new(def.end[0], def.end[1]),
        }
    }

    /// Color at gradient parameter `t`, clamped to the end stops.
    pub fn sample(&self, t: f64) -> Color {
        let Some(first) = self.stops.first() else {
            return Color::rgba(0.0, 0.0, 0.0, 0.0);
        };
        if t <= first.offset {
            return first.color;
        }
        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.offset {
                let span = b.offset - a.offset;
                if span <= 0.0 {
                    return b.color;
                }
                let k = (t - a.offset) / span;
                return Color::rgba(
                    a.color.r + (b.color.r - a.color.r) * k,
                    a.color.g + (b.color.g - a.color.g) * k,
                    a.color.b + (b.color.b - a.color.b) * k,
                    a.color.a + (b.color.a - a.color.a) * k,
                );
            }
        }
        self.stops[self.stops.len() - 1].color
    }
}

/// Title geometry and styling in screen units.
#[derive(Clone, Debug)]
pub struct ResolvedTitle {
    /// Text to lay out.
    pub text: String,
    /// Font bytes, if a font was configured.
    pub font: Option<Arc<Vec<u8>>>,
    /// Font size in pixels.
    pub font_size: f32,
    /// Font weight.
    pub weight: f32,
    /// Extra advance between glyphs in pixels.
    pub letter_spacing: f32,
    /// Sweep layer geometry around the mask box.
    pub sweep: TitleSweep,
    /// Gradient painted on the sweep layer.
    pub gradient: LinearGradient,
    /// Static glow copy.
    pub glow: GlowDef,
}

impl ResolvedTitle {
    /// Box the text is centred in and the sweep is clipped to.
    pub fn mask_box(&self) -> Rect {
        self.sweep.mask_box()
    }
}

/// A scene resolved against one screen snapshot.
#[derive(Clone, Debug)]
pub struct Scene {
    canvas: Canvas,
    fps: Fps,
    background: Color,
    orbit: ClockSpec,
    sweep: ClockSpec,
    field: BlobField,
    fill: FillDef,
    title: Option<ResolvedTitle>,
}

impl Scene {
    /// Validate `def` and resolve it for `screen`, loading the title font from `assets_root`.
    pub fn resolve(
        def: &SceneDef,
        screen: Canvas,
        assets_root: impl AsRef<Path>,
    ) -> GlimmerResult<Self> {
        def.validate()?;
        let max = u32::from(u16::MAX);
        if screen.width == 0 || screen.height == 0 || screen.width > max || screen.height > max {
            return Err(GlimmerError::validation(format!(
                "screen size {}x{} must be within 1..={max} on both axes",
                screen.width, screen.height
            )));
        }

        let w = f64::from(screen.width);
        let h = f64::from(screen.height);
        let blobs = def
            .blobs
            .iter()
            .map(|b| {
                BlobConfig::new(
                    b.id.clone(),
                    b.color,
                    BlobMotion {
                        amp_x: b.amp_x * w,
                        amp_y: b.amp_y * h,
                        base_r: b.base_r * w,
                        var_r: b.var_r * w,
                        speed: b.speed,
                        phase: b.phase,
                        base_opacity: b.opacity,
                    },
                )
            })
            .collect::<GlimmerResult<Vec<_>>>()?;

        let title = if def.title.text.is_empty() {
            None
        } else {
            Some(resolve_title(&def.title, screen, assets_root.as_ref())?)
        };

        Ok(Self {
            canvas: screen,
            fps: def.fps,
            background: def.background,
            orbit: clock_spec(&def.clocks.orbit)?,
            sweep: clock_spec(&def.clocks.sweep)?,
            field: BlobField::new(blobs, screen.center()),
            fill: def.blob_fill,
            title,
        })
    }

    /// Screen snapshot taken at resolve time.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Export frame rate.
    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Background color.
    pub fn background(&self) -> Color {
        self.background
    }

    /// Orbit clock ramp.
    pub fn orbit_clock(&self) -> ClockSpec {
        self.orbit
    }

    /// Sweep clock ramp.
    pub fn sweep_clock(&self) -> ClockSpec {
        self.sweep
    }

    /// Blob field in screen units.
    pub fn field(&self) -> &BlobField {
        &self.field
    }

    /// Radial falloff of every blob fill.
    pub fn blob_fill(&self) -> FillDef {
        self.fill
    }

    /// Title, absent when the text is empty.
    pub fn title(&self) -> Option<&ResolvedTitle> {
        self.title.as_ref()
    }

    /// Time after which both clocks are back at phase zero together.
    ///
    /// `None` if the least common multiple does not fit a [`Duration`].
    pub fn loop_duration(&self) -> Option<Duration> {
        let nanos = lcm_u128(self.orbit.cycle().as_nanos(), self.sweep.cycle().as_nanos())?;
        let secs = u64::try_from(nanos / 1_000_000_000).ok()?;
        Some(Duration::new(secs, (nanos % 1_000_000_000) as u32))
    }

    /// Number of frames covering [`Self::loop_duration`] at the scene fps.
    pub fn loop_frames(&self) -> Option<u64> {
        let nanos = self.loop_duration()?.as_nanos();
        let num = u128::from(self.fps.num) * nanos;
        let den = u128::from(self.fps.den) * 1_000_000_000;
        u64::try_from(num.div_ceil(den)).ok()
    }
}

fn clock_spec(def: &ClockDef) -> GlimmerResult<ClockSpec> {
    ClockSpec::new(Duration::from_millis(def.cycle_ms), def.ceiling)
}

fn resolve_title(def: &TitleDef, screen: Canvas, assets_root: &Path) -> GlimmerResult<ResolvedTitle> {
    let w = f64::from(screen.width);
    let font_size = (w * def.size_frac).min(def.size_max);
    let box_w = (w * def.box_width_frac).min(def.box_width_max);
    let c = screen.center();
    let mask_box = Rect::from_center_size(c, (box_w, def.box_height));

    let font = match &def.font {
        Some(p) => {
            let path = font_path(assets_root, p);
            let bytes = std::fs::read(&path).map_err(|e| {
                GlimmerError::validation(format!("failed to read font '{}': {e}", path.display()))
            })?;
            Some(Arc::new(bytes))
        }
        None => None,
    };

    Ok(ResolvedTitle {
        text: def.text.clone(),
        font,
        font_size: font_size as f32,
        weight: def.weight,
        letter_spacing: def.letter_spacing,
        sweep: TitleSweep::new(mask_box),
        gradient: LinearGradient::from_def(&def.sweep),
        glow: def.glow,
    })
}

fn font_path(assets_root: &Path, p: &Path) -> PathBuf {
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        assets_root.join(p)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/resolve.rs"]
mod tests;
