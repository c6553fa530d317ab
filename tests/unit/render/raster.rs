use super::*;
use crate::foundation::color::Color;
use crate::foundation::core::Point;
use crate::scene::resolve::GradientStop;
use smallvec::smallvec;

fn gold_fill() -> RadialFill {
    RadialFill {
        key: "g0".to_owned(),
        color: Color::rgb8(0xd4, 0xaf, 0x37),
        inner_alpha: 0.9,
        outer_alpha: 0.0,
    }
}

fn px(buf: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * width + x) * 4) as usize;
    [buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]
}

#[test]
fn radial_sprite_fades_from_centre_to_rim() {
    let size = 64;
    let bytes = radial_sprite_rgba8_premul(&gold_fill(), size);
    assert_eq!(bytes.len(), 64 * 64 * 4);

    let centre = px(&bytes, size, 32, 32);
    assert!(centre[3] >= 220 && centre[3] <= 230, "{centre:?}");
    assert_eq!(px(&bytes, size, 0, 0), [0, 0, 0, 0]);
    assert_eq!(px(&bytes, size, 63, 63), [0, 0, 0, 0]);

    let mut last = 255u8;
    for x in 32..64 {
        let a = px(&bytes, size, x, 32)[3];
        assert!(a <= last, "alpha must not grow towards the rim");
        last = a;
    }
    assert!(last < 10);

    // Premultiplied channels never exceed alpha.
    for p in bytes.chunks_exact(4) {
        assert!(p[0] <= p[3] && p[1] <= p[3] && p[2] <= p[3]);
    }
}

#[test]
fn diagonal_gradient_runs_corner_to_corner() {
    let silver = Color::rgb8(0xc0, 0xc0, 0xc0);
    let gold = Color::rgb8(0xff, 0xd7, 0x00);
    let g = LinearGradient {
        stops: smallvec![
            GradientStop {
                offset: 0.0,
                color: silver,
            },
            GradientStop {
                offset: 0.5,
                color: gold,
            },
            GradientStop {
                offset: 1.0,
                color: silver,
            },
        ],
        start: Point::new(0.0, 0.0),
        end: Point::new(1.0, 1.0),
    };
    let side = 41;
    let bytes = linear_gradient_rgba8_premul(&g, side);

    let corner = px(&bytes, side, 0, 0);
    assert!((i32::from(corner[0]) - 0xc0).abs() <= 6, "{corner:?}");
    let mid = px(&bytes, side, 20, 20);
    assert_eq!(mid, [0xff, 0xd7, 0x00, 0xff]);
    // Anti-diagonal pixels share the same gradient parameter.
    assert_eq!(px(&bytes, side, 40, 0), mid);
    assert_eq!(px(&bytes, side, 0, 40), mid);
}

#[test]
fn clip_zeroes_everything_outside_the_rect() {
    let (w, h) = (8u32, 6u32);
    let mut buf = vec![255u8; (w * h * 4) as usize];
    clip_to_rect_rgba8(&mut buf, w, h, Rect::new(2.0, 1.0, 5.0, 4.0));
    for y in 0..h {
        for x in 0..w {
            let inside = (2..5).contains(&x) && (1..4).contains(&y);
            let expected = if inside { [255; 4] } else { [0; 4] };
            assert_eq!(px(&buf, w, x, y), expected, "at ({x}, {y})");
        }
    }
}

#[test]
fn gaussian_kernel_sums_to_one_and_is_symmetric() {
    let k = gaussian_kernel_q16(16, 8.0).unwrap();
    assert_eq!(k.len(), 33);
    assert_eq!(k.iter().map(|&w| u64::from(w)).sum::<u64>(), 65536);
    for i in 0..16 {
        assert_eq!(k[i], k[32 - i]);
    }
    assert_eq!(gaussian_kernel_q16(0, 0.0).unwrap(), vec![65536]);
    assert!(gaussian_kernel_q16(3, 0.0).is_err());
}

#[test]
fn blur_spreads_a_single_pixel_and_keeps_energy() {
    let (w, h) = (9u32, 9u32);
    let n = (w * h * 4) as usize;
    let mut src = vec![0u8; n];
    let c = ((4 * w + 4) * 4) as usize;
    src[c..c + 4].copy_from_slice(&[255, 255, 255, 255]);

    let k = gaussian_kernel_q16(2, 1.0).unwrap();
    let mut dst = vec![0u8; n];
    let mut tmp = vec![0u8; n];
    blur_rgba8_premul_q16(&src, &mut dst, &mut tmp, w, h, &k);

    let centre = px(&dst, w, 4, 4)[3];
    assert!(centre > 0 && centre < 255);
    assert!(px(&dst, w, 5, 4)[3] > 0);
    assert_eq!(px(&dst, w, 0, 0)[3], 0);
    let total: u32 = dst.chunks_exact(4).map(|p| u32::from(p[3])).sum();
    assert!((i64::from(total) - 255).abs() <= 12, "total alpha {total}");
}

#[test]
fn alpha_mask_scales_every_channel() {
    let src = [200u8, 100, 50, 200, 10, 20, 30, 40];
    let mask = [0u8, 0, 0, 255, 9, 9, 9, 0];
    let mut dst = [0u8; 8];
    mask_apply_alpha_rgba8_premul(&src, &mask, &mut dst);
    assert_eq!(&dst[..4], &src[..4]);
    assert_eq!(&dst[4..], &[0, 0, 0, 0]);
}

#[test]
fn over_respects_layer_opacity() {
    let mut dst = [0u8, 0, 255, 255];
    premul_over_in_place_opacity(&mut dst, &[255, 0, 0, 255], 1.0).unwrap();
    assert_eq!(dst, [255, 0, 0, 255]);

    let mut dst = [0u8, 0, 255, 255];
    premul_over_in_place_opacity(&mut dst, &[255, 0, 0, 255], 0.0).unwrap();
    assert_eq!(dst, [0, 0, 255, 255]);

    let mut dst = [0u8, 0, 0, 255];
    premul_over_in_place_opacity(&mut dst, &[255, 255, 255, 255], 0.5).unwrap();
    assert!(dst[0] >= 127 && dst[0] <= 129);
    assert_eq!(dst[3], 255);

    assert!(premul_over_in_place_opacity(&mut [0u8; 4], &[0u8; 8], 1.0).is_err());
}

#[test]
fn unpremultiply_and_flatten() {
    let mut px = [64u8, 32, 0, 128];
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(px, [128, 64, 0, 128]);

    let mut out = Vec::new();
    flatten_over_rgb8(&[0, 0, 0, 0, 255, 0, 0, 255], [10, 10, 10], &mut out);
    assert_eq!(out, [10, 10, 10, 255, 0, 0]);
}

#[test]
fn premul_bytes_become_a_pixmap() {
    let pm = pixmap_from_premul_bytes(&[1, 2, 3, 4, 5, 6, 7, 8], 2, 1).unwrap();
    assert_eq!(pm.width(), 2);
    assert_eq!(pm.data_as_u8_slice(), &[1, 2, 3, 4, 5, 6, 7, 8]);
    assert!(pixmap_from_premul_bytes(&[0; 4], 2, 1).is_err());
    assert!(pixmap_from_premul_bytes(&[], 70_000, 0).is_err());
}
