use crate::animation::sweep::TitleSweep;
use crate::eval::evaluator::FrameState;
use crate::foundation::color::Color;
use crate::foundation::core::{Affine, Point};
use crate::scene::resolve::Scene;

/// Index into a [`FillTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FillId(pub u32);

/// Radial gradient fill bound to one blob: `color` at `inner_alpha` in the centre fading to
/// `outer_alpha` at the rim.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialFill {
    /// Id of the blob this fill belongs to.
    pub key: String,
    /// Base color.
    pub color: Color,
    /// Alpha at offset 0%.
    pub inner_alpha: f64,
    /// Alpha at offset 100%.
    pub outer_alpha: f64,
}

impl RadialFill {
    /// Straight-alpha color at normalized distance `d` from the centre.
    pub fn color_at(&self, d: f64) -> Color {
        let d = d.clamp(0.0, 1.0);
        let a = self.inner_alpha + (self.outer_alpha - self.inner_alpha) * d;
        self.color.with_alpha(self.color.a * a)
    }
}

/// Fill definitions keyed by [`FillId`]. Built once per scene; ids never change afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FillTable {
    fills: Vec<RadialFill>,
}

impl FillTable {
    /// One fill per blob, in config order.
    pub fn from_scene(scene: &Scene) -> Self {
        let falloff = scene.blob_fill();
        Self {
            fills: scene
                .field()
                .configs()
                .iter()
                .map(|b| RadialFill {
                    key: b.id().to_owned(),
                    color: b.color(),
                    inner_alpha: falloff.inner_alpha,
                    outer_alpha: falloff.outer_alpha,
                })
                .collect(),
        }
    }

    /// Fill for `id`.
    pub fn get(&self, id: FillId) -> Option<&RadialFill> {
        self.fills.get(id.0 as usize)
    }

    /// Look a fill up by blob id.
    pub fn find(&self, key: &str) -> Option<FillId> {
        self.fills
            .iter()
            .position(|f| f.key == key)
            .map(|i| FillId(i as u32))
    }

    /// Number of fills.
    pub fn len(&self) -> usize {
        self.fills.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.fills.is_empty()
    }

    /// `(id, fill)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (FillId, &RadialFill)> {
        self.fills
            .iter()
            .enumerate()
            .map(|(i, f)| (FillId(i as u32), f))
    }
}

/// One radial blob.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlobDraw {
    /// Fill to paint with.
    pub fill: FillId,
    /// Centre on screen.
    pub center: Point,
    /// Radius in pixels.
    pub radius: f64,
    /// Layer opacity.
    pub opacity: f64,
}

/// The masked title for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TitleDraw {
    /// Local-to-canvas transform of the sweep layer.
    pub sweep: Affine,
}

/// Backend-agnostic draw operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawOp {
    /// Draw a blob.
    Blob(BlobDraw),
    /// Draw the title (sweep, mask, glow).
    Title(TitleDraw),
}

/// Draw list for one frame, painted in order over the background.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FramePlan {
    /// Operations in paint order.
    pub ops: Vec<DrawOp>,
}

impl FramePlan {
    /// Deterministic text form, free of addresses and float noise beyond 1e-6.
    pub fn dump(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!("FramePlan ops: {}\n", self.ops.len()));
        for (i, op) in self.ops.iter().enumerate() {
            match op {
                DrawOp::Blob(b) => s.push_str(&format!(
                    "  O{i}: blob fill={} center=({:.6}, {:.6}) r={:.6} opacity={:.6}\n",
                    b.fill.0, b.center.x, b.center.y, b.radius, b.opacity
                )),
                DrawOp::Title(t) => {
                    let c = t.sweep.as_coeffs();
                    s.push_str(&format!(
                        "  O{i}: title sweep=[{:.6}, {:.6}, {:.6}, {:.6}, {:.6}, {:.6}]\n",
                        c[0], c[1], c[2], c[3], c[4], c[5]
                    ));
                }
            }
        }
        s
    }
}

/// Turns evaluated frames into [`FramePlan`]s for one scene.
#[derive(Debug, Clone)]
pub struct PlanCompiler {
    title: Option<TitleSweep>,
}

impl PlanCompiler {
    /// Compiler for `scene`.
    pub fn new(scene: &Scene) -> Self {
        Self {
            title: scene.title().map(|t| t.sweep),
        }
    }

    /// Emit one blob op per blob in config order, then the title if the scene has one.
    pub fn compile_frame(&self, state: &FrameState, plan: &mut FramePlan) {
        plan.ops.clear();
        plan.ops
            .extend(state.blobs.iter().enumerate().map(|(i, b)| {
                DrawOp::Blob(BlobDraw {
                    fill: FillId(i as u32),
                    center: b.center,
                    radius: b.radius,
                    opacity: b.opacity,
                })
            }));
        if let Some(sweep) = &self.title {
            plan.ops.push(DrawOp::Title(TitleDraw {
                sweep: sweep.transform(state.sweep),
            }));
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compile/plan.rs"]
mod tests;
