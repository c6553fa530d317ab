//! Pixel helpers for premultiplied RGBA8 buffers.

use crate::compile::plan::RadialFill;
use crate::foundation::core::{Affine, Rect};
use crate::foundation::error::{GlimmerError, GlimmerResult};
use crate::foundation::math::{add_sat_u8, mul_div255_u8};
use crate::scene::resolve::LinearGradient;
use std::sync::Arc;

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

pub(crate) fn fill_rgba8(buf: &mut [u8], rgba: [u8; 4]) {
    for px in buf.chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}

pub(crate) fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> GlimmerResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| GlimmerError::render("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| GlimmerError::render("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(GlimmerError::render("pixmap byte len mismatch"));
    }
    let mut may_have_opacities = false;
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            }
        })
        .collect::<Vec<_>>();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

pub(crate) fn rgba_premul_to_image(
    bytes_premul: &[u8],
    width: u32,
    height: u32,
) -> GlimmerResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(bytes_premul, width, height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

/// Square sprite of a radial fill: the disc touches all four edges, corners stay transparent.
pub(crate) fn radial_sprite_rgba8_premul(fill: &RadialFill, size: u32) -> Vec<u8> {
    let n = size as usize;
    let mut bytes = vec![0u8; n.saturating_mul(n).saturating_mul(4)];
    let half = f64::from(size) * 0.5;
    for y in 0..n {
        let dy = (y as f64 + 0.5 - half) / half;
        for x in 0..n {
            let dx = (x as f64 + 0.5 - half) / half;
            let d = dx.hypot(dy);
            if d > 1.0 {
                continue;
            }
            let px = fill.color_at(d).to_rgba8_premul().to_array();
            let idx = (y * n + x) * 4;
            bytes[idx..idx + 4].copy_from_slice(&px);
        }
    }
    bytes
}

/// Square `side`×`side` raster of a linear gradient whose endpoints are given in unit space.
pub(crate) fn linear_gradient_rgba8_premul(g: &LinearGradient, side: u32) -> Vec<u8> {
    let n = side as usize;
    let mut bytes = vec![0u8; n.saturating_mul(n).saturating_mul(4)];
    let axis = g.end - g.start;
    let len2 = axis.hypot2();
    let s = f64::from(side.max(1));
    for y in 0..n {
        let v = (y as f64 + 0.5) / s;
        for x in 0..n {
            let u = (x as f64 + 0.5) / s;
            let t = if len2 > 0.0 {
                ((u - g.start.x) * axis.x + (v - g.start.y) * axis.y) / len2
            } else {
                0.0
            };
            let px = g.sample(t).to_rgba8_premul().to_array();
            let idx = (y * n + x) * 4;
            bytes[idx..idx + 4].copy_from_slice(&px);
        }
    }
    bytes
}

/// Zero every pixel outside `clip`.
pub(crate) fn clip_to_rect_rgba8(buf: &mut [u8], width: u32, height: u32, clip: Rect) {
    let x0 = clip.x0.floor().clamp(0.0, f64::from(width)) as usize;
    let x1 = clip.x1.ceil().clamp(0.0, f64::from(width)) as usize;
    let y0 = clip.y0.floor().clamp(0.0, f64::from(height)) as usize;
    let y1 = clip.y1.ceil().clamp(0.0, f64::from(height)) as usize;
    let w = width as usize;
    for (y, row) in buf.chunks_exact_mut(w * 4).enumerate() {
        if y < y0 || y >= y1 {
            row.fill(0);
            continue;
        }
        row[..x0 * 4].fill(0);
        row[x1.max(x0) * 4..].fill(0);
    }
}

pub(crate) fn gaussian_kernel_q16(radius: u32, sigma: f32) -> GlimmerResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(GlimmerError::validation("blur sigma must be finite and > 0"));
    }

    let r = radius as i32;
    let mut weights_f = Vec::<f64>::with_capacity((2 * r + 1) as usize);
    let mut sum = 0.0f64;
    let sigma = f64::from(sigma);
    let denom = 2.0 * sigma * sigma;
    for i in -r..=r {
        let x = f64::from(i);
        let w = (-x * x / denom).exp();
        weights_f.push(w);
        sum += w;
    }
    if sum <= 0.0 {
        return Err(GlimmerError::render("gaussian kernel sum is zero"));
    }

    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = ((wf / sum) * 65536.0).round() as i64;
        let q = q.clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    // Rounding drift goes to the centre tap so the kernel sums to exactly 1.0.
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        weights[mid] = (i64::from(weights[mid]) + delta).clamp(0, 65536) as u32;
    }

    Ok(weights)
}

pub(crate) fn blur_rgba8_premul_q16(
    src: &[u8],
    dst: &mut [u8],
    tmp: &mut [u8],
    width: u32,
    height: u32,
    kernel_q16: &[u32],
) {
    if kernel_q16.len() == 1 {
        dst.copy_from_slice(src);
        return;
    }

    horizontal_blur_q16(src, tmp, width, height, kernel_q16);
    vertical_blur_q16(tmp, dst, width, height, kernel_q16);
}

fn horizontal_blur_q16(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    for y in 0..height as i32 {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sx = (x + ki as i32 - radius).clamp(0, w - 1);
                let idx = ((y * w + sx) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn vertical_blur_q16(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sy = (y + ki as i32 - radius).clamp(0, h - 1);
                let idx = ((sy * w + x) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    let v = (acc + 32768) >> 16;
    v.min(255) as u8
}

/// Scale `src` by the alpha channel of `mask`.
pub(crate) fn mask_apply_alpha_rgba8_premul(src: &[u8], mask: &[u8], dst: &mut [u8]) {
    debug_assert_eq!(src.len(), mask.len());
    debug_assert_eq!(src.len(), dst.len());

    for ((s, m), d) in src
        .chunks_exact(4)
        .zip(mask.chunks_exact(4))
        .zip(dst.chunks_exact_mut(4))
    {
        let w16 = u16::from(m[3]);
        d[0] = mul_div255_u8(u16::from(s[0]), w16);
        d[1] = mul_div255_u8(u16::from(s[1]), w16);
        d[2] = mul_div255_u8(u16::from(s[2]), w16);
        d[3] = mul_div255_u8(u16::from(s[3]), w16);
    }
}

pub(crate) fn premul_over_in_place_opacity(
    dst: &mut [u8],
    src: &[u8],
    opacity: f32,
) -> GlimmerResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(GlimmerError::render(
            "premul_over_in_place_opacity expects equal-length rgba8 buffers",
        ));
    }
    let op = ((opacity.clamp(0.0, 1.0) * 255.0).round() as i32).clamp(0, 255) as u16;
    if op == 0 {
        return Ok(());
    }

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let sa = mul_div255_u8(u16::from(s[3]), op);
        if sa == 0 {
            continue;
        }
        let inv = 255u16 - u16::from(sa);

        d[3] = add_sat_u8(sa, mul_div255_u8(u16::from(d[3]), inv));
        for c in 0..3 {
            let sc = mul_div255_u8(u16::from(s[c]), op);
            let dc = mul_div255_u8(u16::from(d[c]), inv);
            d[c] = add_sat_u8(sc, dc);
        }
    }
    Ok(())
}

/// Convert premultiplied RGBA8 to straight alpha in place.
pub(crate) fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in 0..3 {
            px[c] = ((u16::from(px[c]) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

/// Composite premultiplied RGBA8 over an opaque color, yielding opaque RGB8.
pub(crate) fn flatten_over_rgb8(premul: &[u8], background: [u8; 3], out: &mut Vec<u8>) {
    out.clear();
    out.reserve(premul.len() / 4 * 3);
    for px in premul.chunks_exact(4) {
        let inv = 255u16 - u16::from(px[3]);
        for c in 0..3 {
            out.push(add_sat_u8(
                px[c],
                mul_div255_u8(u16::from(background[c]), inv),
            ));
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
