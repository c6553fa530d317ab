use crate::compile::plan::{BlobDraw, DrawOp, FillId, FillTable, FramePlan, TitleDraw};
use crate::foundation::core::{Affine, Point, Vec2};
use crate::foundation::error::{GlimmerError, GlimmerResult};
use crate::render::backend::{FrameRGBA, RenderBackend};
use crate::render::raster::{
    affine_to_cpu, blur_rgba8_premul_q16, clip_to_rect_rgba8, fill_rgba8, gaussian_kernel_q16,
    linear_gradient_rgba8_premul, mask_apply_alpha_rgba8_premul, premul_over_in_place_opacity,
    radial_sprite_rgba8_premul, rgba_premul_to_image,
};
use crate::render::text::{TextBrushRgba8, TextLayoutEngine, TitleStyle};
use crate::scene::resolve::{ResolvedTitle, Scene};

/// Edge length of the cached radial sprites. Blobs are drawn by scaling these.
pub const SPRITE_SIZE: u32 = 256;

/// Static title surfaces, all canvas-sized except the sweep paint.
struct TitleLayers {
    sweep: vello_cpu::Image,
    sweep_px: u32,
    sweep_side: f64,
    mask: Vec<u8>,
    glow: Vec<u8>,
    glow_opacity: f32,
}

/// CPU raster backend powered by `vello_cpu`.
pub struct CpuBackend {
    width: u16,
    height: u16,
    background: [u8; 4],
    fills: FillTable,
    sprites: Vec<Option<vello_cpu::Image>>,
    title: Option<TitleLayers>,
    ctx: Option<vello_cpu::RenderContext>,
    layer: vello_cpu::Pixmap,
    masked: Vec<u8>,
}

impl CpuBackend {
    /// Bind fills and rasterize the static title layers of `scene`.
    pub fn new(scene: &Scene) -> GlimmerResult<Self> {
        let canvas = scene.canvas();
        let width: u16 = canvas
            .width
            .try_into()
            .map_err(|_| GlimmerError::render("canvas width exceeds u16"))?;
        let height: u16 = canvas
            .height
            .try_into()
            .map_err(|_| GlimmerError::render("canvas height exceeds u16"))?;

        let fills = FillTable::from_scene(scene);
        let title = match scene.title() {
            Some(t) => build_title_layers(t, width, height)?,
            None => None,
        };
        tracing::debug!(
            width,
            height,
            fills = fills.len(),
            title = title.is_some(),
            "cpu backend ready"
        );

        Ok(Self {
            width,
            height,
            background: scene.background().to_rgba8_premul().to_array(),
            sprites: vec![None; fills.len()],
            fills,
            title,
            ctx: None,
            layer: vello_cpu::Pixmap::new(width, height),
            masked: Vec::new(),
        })
    }

    /// Fill bindings used by blob ops.
    pub fn fills(&self) -> &FillTable {
        &self.fills
    }

    /// Whether the title (sweep, mask and glow) will be drawn.
    pub fn has_title(&self) -> bool {
        self.title.is_some()
    }

    fn with_ctx_mut<R>(
        &mut self,
        f: impl FnOnce(&mut Self, &mut vello_cpu::RenderContext) -> GlimmerResult<R>,
    ) -> GlimmerResult<R> {
        let mut ctx = match self.ctx.take() {
            Some(ctx) => ctx,
            None => vello_cpu::RenderContext::new(self.width, self.height),
        };
        ctx.reset();
        let out = f(self, &mut ctx)?;
        self.ctx = Some(ctx);
        Ok(out)
    }

    fn sprite_for(&mut self, id: FillId) -> GlimmerResult<vello_cpu::Image> {
        if let Some(img) = self.sprites.get(id.0 as usize).and_then(|s| s.clone()) {
            return Ok(img);
        }
        let fill = self
            .fills
            .get(id)
            .ok_or_else(|| GlimmerError::render(format!("unknown fill id {}", id.0)))?;
        let bytes = radial_sprite_rgba8_premul(fill, SPRITE_SIZE);
        let img = rgba_premul_to_image(&bytes, SPRITE_SIZE, SPRITE_SIZE)?;
        self.sprites[id.0 as usize] = Some(img.clone());
        Ok(img)
    }

    /// Draw a run of consecutive blob ops into the scratch layer, then composite it over `out`.
    fn draw_blobs(&mut self, blobs: &[DrawOp], out: &mut [u8]) -> GlimmerResult<()> {
        self.with_ctx_mut(|this, ctx| {
            for op in blobs {
                let DrawOp::Blob(b) = op else { continue };
                this.draw_blob(ctx, b)?;
            }
            ctx.flush();
            this.layer.data_as_u8_slice_mut().fill(0);
            ctx.render_to_pixmap(&mut this.layer);
            Ok(())
        })?;
        premul_over_in_place_opacity(out, self.layer.data_as_u8_slice(), 1.0)
    }

    fn draw_blob(&mut self, ctx: &mut vello_cpu::RenderContext, b: &BlobDraw) -> GlimmerResult<()> {
        if !(b.radius.is_finite() && b.radius > 0.0 && b.opacity.is_finite() && b.opacity > 0.0) {
            return Ok(());
        }
        let sprite = self.sprite_for(b.fill)?;
        let size = f64::from(SPRITE_SIZE);
        let tr = Affine::translate(b.center.to_vec2() - Vec2::new(b.radius, b.radius))
            * Affine::scale(2.0 * b.radius / size);

        let opacity = b.opacity.min(1.0) as f32;
        ctx.set_transform(affine_to_cpu(tr));
        ctx.set_paint(sprite);
        if opacity < 1.0 {
            ctx.push_opacity_layer(opacity);
        }
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, size, size));
        if opacity < 1.0 {
            ctx.pop_layer();
        }
        Ok(())
    }

    /// Rotate the sweep layer, clip it to the glyph mask, then add the glow on top.
    fn draw_title(&mut self, t: &TitleDraw, out: &mut [u8]) -> GlimmerResult<()> {
        let Some(title) = self.title.as_ref() else {
            return Ok(());
        };
        let paint = title.sweep.clone();
        let px = f64::from(title.sweep_px);
        let tr = t.sweep * Affine::scale(title.sweep_side / px);

        self.with_ctx_mut(|this, ctx| {
            ctx.set_transform(affine_to_cpu(tr));
            ctx.set_paint(paint);
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, px, px));
            ctx.flush();
            this.layer.data_as_u8_slice_mut().fill(0);
            ctx.render_to_pixmap(&mut this.layer);
            Ok(())
        })?;

        let Some(title) = self.title.as_ref() else {
            return Ok(());
        };
        let src = self.layer.data_as_u8_slice();
        self.masked.resize(src.len(), 0);
        mask_apply_alpha_rgba8_premul(src, &title.mask, &mut self.masked);
        premul_over_in_place_opacity(out, &self.masked, 1.0)?;
        premul_over_in_place_opacity(out, &title.glow, title.glow_opacity)
    }
}

impl RenderBackend for CpuBackend {
    fn render_plan(&mut self, plan: &FramePlan) -> GlimmerResult<FrameRGBA> {
        let len = usize::from(self.width) * usize::from(self.height) * 4;
        let mut out = vec![0u8; len];
        fill_rgba8(&mut out, self.background);

        let mut i = 0;
        while i < plan.ops.len() {
            match &plan.ops[i] {
                DrawOp::Blob(_) => {
                    let run = plan.ops[i..]
                        .iter()
                        .take_while(|op| matches!(op, DrawOp::Blob(_)))
                        .count();
                    self.draw_blobs(&plan.ops[i..i + run], &mut out)?;
                    i += run;
                }
                DrawOp::Title(t) => {
                    self.draw_title(t, &mut out)?;
                    i += 1;
                }
            }
        }

        Ok(FrameRGBA {
            width: u32::from(self.width),
            height: u32::from(self.height),
            data: out,
            premultiplied: true,
        })
    }
}

fn build_title_layers(
    title: &ResolvedTitle,
    width: u16,
    height: u16,
) -> GlimmerResult<Option<TitleLayers>> {
    let Some(font_bytes) = title.font.as_ref() else {
        tracing::warn!(text = %title.text, "no title font configured, skipping title and glow");
        return Ok(None);
    };

    let sweep = title.sweep;
    let sweep_side = sweep.side().ceil().max(1.0);
    if !sweep_side.is_finite() || sweep_side > f64::from(u16::MAX) {
        return Err(GlimmerError::render(format!(
            "title sweep layer side {sweep_side} px exceeds {}",
            u16::MAX
        )));
    }
    let sweep_px = sweep_side as u32;

    let mut engine = TextLayoutEngine::new();
    let layout = engine.layout_title(
        &title.text,
        font_bytes,
        TitleStyle {
            size_px: title.font_size,
            weight: title.weight,
            letter_spacing: title.letter_spacing,
            brush: TextBrushRgba8 {
                r: 255,
                g: 255,
                b: 255,
                a: 255,
            },
        },
    )?;
    let font = vello_cpu::peniko::FontData::new(
        vello_cpu::peniko::Blob::from(font_bytes.to_vec()),
        0,
    );

    let mask_box = title.mask_box();
    let c = mask_box.center();
    let origin = Point::new(
        c.x - f64::from(layout.width()) * 0.5,
        c.y - f64::from(layout.height()) * 0.5,
    );
    let (w, h) = (u32::from(width), u32::from(height));

    let mut mask = render_glyphs(&layout, &font, origin, [255, 255, 255, 255], width, height);
    clip_to_rect_rgba8(&mut mask, w, h, mask_box);

    let glow_src = render_glyphs(
        &layout,
        &font,
        origin,
        title.glow.color.to_rgba8(),
        width,
        height,
    );
    let radius = title.glow.blur_radius;
    let kernel = gaussian_kernel_q16(radius, (radius as f32 * 0.5).max(0.5))?;
    let mut glow = vec![0u8; glow_src.len()];
    let mut tmp = vec![0u8; glow_src.len()];
    blur_rgba8_premul_q16(&glow_src, &mut glow, &mut tmp, w, h, &kernel);

    let bytes = linear_gradient_rgba8_premul(&title.gradient, sweep_px);
    let sweep_img = rgba_premul_to_image(&bytes, sweep_px, sweep_px)?;

    Ok(Some(TitleLayers {
        sweep: sweep_img,
        sweep_px,
        sweep_side: sweep.side(),
        mask,
        glow,
        glow_opacity: title.glow.opacity as f32,
    }))
}

fn render_glyphs(
    layout: &parley::Layout<TextBrushRgba8>,
    font: &vello_cpu::peniko::FontData,
    origin: Point,
    rgba: [u8; 4],
    width: u16,
    height: u16,
) -> Vec<u8> {
    let mut ctx = vello_cpu::RenderContext::new(width, height);
    ctx.set_transform(vello_cpu::kurbo::Affine::translate((origin.x, origin.y)));
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
        rgba[0], rgba[1], rgba[2], rgba[3],
    ));
    for line in layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }
    ctx.flush();
    let mut pixmap = vello_cpu::Pixmap::new(width, height);
    ctx.render_to_pixmap(&mut pixmap);
    pixmap.data_as_u8_slice().to_vec()
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
