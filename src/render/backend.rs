use crate::compile::plan::FramePlan;
use crate::foundation::error::GlimmerResult;
use crate::scene::resolve::Scene;

/// A rendered frame as RGBA8 pixels.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha. Backends always produce premultiplied frames.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Pixel at `(x, y)`, `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Copy of the pixels in straight alpha, as image files expect.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if self.premultiplied {
            crate::render::raster::unpremultiply_rgba8_in_place(&mut out);
        }
        out
    }
}

/// The rendering surface: draws a [`FramePlan`] into pixels.
///
/// Fill bindings and static layers are set up when the backend is created for a scene; a plan
/// only carries per-frame parameters.
pub trait RenderBackend {
    /// Draw `plan` over the scene background and read the frame back.
    fn render_plan(&mut self, plan: &FramePlan) -> GlimmerResult<FrameRGBA>;
}

/// Available backend kinds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackendKind {
    /// CPU raster backend powered by `vello_cpu`.
    #[default]
    Cpu,
}

/// Create a backend bound to `scene`.
pub fn create_backend(
    kind: BackendKind,
    scene: &Scene,
) -> GlimmerResult<Box<dyn RenderBackend + Send>> {
    match kind {
        BackendKind::Cpu => Ok(Box::new(crate::render::cpu::CpuBackend::new(scene)?)),
    }
}
