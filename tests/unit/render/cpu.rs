use super::*;
use crate::foundation::color::Color;
use crate::foundation::core::Canvas;
use crate::animation::sweep::TitleSweep;
use crate::foundation::core::Rect;
use crate::render::backend::{BackendKind, create_backend};
use crate::scene::model::{BlobDef, SceneDef};
use std::path::PathBuf;
use std::sync::Arc;

const W: u32 = 320;
const H: u32 = 240;

fn system_font() -> Option<PathBuf> {
    let p = PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf");
    p.is_file().then_some(p)
}

fn white_blob() -> BlobDef {
    BlobDef {
        id: "w".to_owned(),
        color: Color::rgb8(255, 255, 255),
        amp_x: 0.2,
        amp_y: 0.2,
        base_r: 0.1,
        var_r: 0.0,
        speed: 1.0,
        phase: 0.0,
        opacity: 1.0,
    }
}

fn def(title_text: &str) -> SceneDef {
    let mut def = SceneDef::default();
    def.background = Color::rgb8(0, 0, 0);
    def.blobs = vec![white_blob()];
    def.title.text = title_text.to_owned();
    def
}

fn backend(def: &SceneDef) -> CpuBackend {
    let scene = Scene::resolve(
        def,
        Canvas {
            width: W,
            height: H,
        },
        ".",
    )
    .unwrap();
    CpuBackend::new(&scene).unwrap()
}

fn blob_at(x: f64, y: f64, radius: f64, opacity: f64) -> DrawOp {
    DrawOp::Blob(BlobDraw {
        fill: FillId(0),
        center: Point::new(x, y),
        radius,
        opacity,
    })
}

#[test]
fn empty_plan_is_just_the_background() {
    let mut d = def("");
    d.background = Color::rgb8(0x0a, 0x14, 0x1e);
    let mut be = backend(&d);
    let frame = be.render_plan(&FramePlan::default()).unwrap();

    assert_eq!((frame.width, frame.height), (W, H));
    assert_eq!(frame.data.len(), (W * H * 4) as usize);
    assert!(frame.premultiplied);
    assert!(
        frame
            .data
            .chunks_exact(4)
            .all(|px| px == [0x0a, 0x14, 0x1e, 0xff])
    );
}

#[test]
fn blob_brightens_its_centre_and_leaves_far_pixels_alone() {
    let mut be = backend(&def(""));
    let plan = FramePlan {
        ops: vec![blob_at(80.0, 120.0, 40.0, 1.0)],
    };
    let frame = be.render_plan(&plan).unwrap();

    let centre = frame.pixel(80, 120).unwrap();
    assert!(centre[0] > 180, "{centre:?}");
    assert_eq!(centre[3], 255);

    let edge = frame.pixel(115, 120).unwrap();
    assert!(edge[0] < centre[0], "{edge:?} vs {centre:?}");

    assert_eq!(frame.pixel(300, 20).unwrap(), [0, 0, 0, 255]);
}

#[test]
fn blob_opacity_scales_the_contribution() {
    let mut be = backend(&def(""));
    let full = be
        .render_plan(&FramePlan {
            ops: vec![blob_at(160.0, 120.0, 50.0, 1.0)],
        })
        .unwrap();
    let faint = be
        .render_plan(&FramePlan {
            ops: vec![blob_at(160.0, 120.0, 50.0, 0.25)],
        })
        .unwrap();

    let a = full.pixel(160, 120).unwrap()[0];
    let b = faint.pixel(160, 120).unwrap()[0];
    assert!(b > 0 && b < a / 2, "full={a} faint={b}");
}

#[test]
fn degenerate_blobs_draw_nothing() {
    let mut be = backend(&def(""));
    let plan = FramePlan {
        ops: vec![
            blob_at(160.0, 120.0, 50.0, 0.0),
            blob_at(160.0, 120.0, 0.0, 1.0),
            blob_at(160.0, 120.0, f64::NAN, 1.0),
        ],
    };
    let frame = be.render_plan(&plan).unwrap();
    assert!(frame.data.chunks_exact(4).all(|px| px == [0, 0, 0, 255]));
}

#[test]
fn unknown_fill_is_a_render_error() {
    let mut be = backend(&def(""));
    let plan = FramePlan {
        ops: vec![DrawOp::Blob(BlobDraw {
            fill: FillId(7),
            center: Point::new(10.0, 10.0),
            radius: 5.0,
            opacity: 1.0,
        })],
    };
    let err = be.render_plan(&plan).unwrap_err();
    assert!(matches!(err, GlimmerError::Render(_)), "{err}");
}

#[test]
fn sprites_are_built_lazily_and_reused() {
    let mut be = backend(&def(""));
    assert_eq!(be.fills().len(), 1);
    assert!(be.sprites[0].is_none());

    let plan = FramePlan {
        ops: vec![blob_at(100.0, 100.0, 30.0, 1.0)],
    };
    let a = be.render_plan(&plan).unwrap();
    assert!(be.sprites[0].is_some());
    let b = be.render_plan(&plan).unwrap();
    assert_eq!(a.data, b.data);
}

#[test]
fn title_without_font_is_skipped() {
    let mut be = backend(&def("Smooth is Fast"));
    assert!(!be.has_title());

    let plan = FramePlan {
        ops: vec![DrawOp::Title(TitleDraw {
            sweep: Affine::IDENTITY,
        })],
    };
    let frame = be.render_plan(&plan).unwrap();
    assert!(frame.data.chunks_exact(4).all(|px| px == [0, 0, 0, 255]));
}

#[test]
fn oversized_sweep_layer_is_a_render_error() {
    let scene = Scene::resolve(
        &def("Smooth is Fast"),
        Canvas {
            width: W,
            height: H,
        },
        ".",
    )
    .unwrap();
    let mut title = scene.title().unwrap().clone();
    title.font = Some(Arc::new(Vec::new()));
    title.sweep = TitleSweep::new(Rect::from_center_size((160.0, 120.0), (700.0, 70_000.0)));

    let err = build_title_layers(&title, W as u16, H as u16).err().unwrap();
    assert!(matches!(err, GlimmerError::Render(_)), "{err}");
    assert!(err.to_string().contains("sweep layer"), "{err}");
}

#[test]
fn title_paints_inside_its_box_only() {
    let Some(font) = system_font() else {
        return;
    };
    let mut d = def("Smooth is Fast");
    d.blobs.clear();
    d.title.font = Some(font);

    let scene = Scene::resolve(
        &d,
        Canvas {
            width: W,
            height: H,
        },
        ".",
    )
    .unwrap();
    let title = scene.title().unwrap();
    let mut be = CpuBackend::new(&scene).unwrap();
    assert!(be.has_title());

    let plan = FramePlan {
        ops: vec![DrawOp::Title(TitleDraw {
            sweep: title.sweep.transform(Default::default()),
        })],
    };
    let frame = be.render_plan(&plan).unwrap();

    let bx = title.mask_box();
    let mut lit_inside = 0usize;
    for y in 0..H {
        for x in 0..W {
            let px = frame.pixel(x, y).unwrap();
            if px[..3] == [0, 0, 0] {
                continue;
            }
            let (fx, fy) = (f64::from(x) + 0.5, f64::from(y) + 0.5);
            if bx.contains(Point::new(fx, fy)) {
                lit_inside += 1;
            }
        }
    }
    assert!(lit_inside > 100, "lit_inside={lit_inside}");

    // Far from the glyphs neither the sweep nor the glow reach.
    assert_eq!(frame.pixel(0, 0).unwrap(), [0, 0, 0, 255]);
    assert_eq!(frame.pixel(W - 1, H - 1).unwrap(), [0, 0, 0, 255]);
}

#[test]
fn title_frames_change_with_the_sweep_angle() {
    let Some(font) = system_font() else {
        return;
    };
    let mut d = def("Smooth is Fast");
    d.blobs.clear();
    d.title.font = Some(font);
    let scene = Scene::resolve(
        &d,
        Canvas {
            width: W,
            height: H,
        },
        ".",
    )
    .unwrap();
    let sweep = scene.title().unwrap().sweep;
    let mut be = CpuBackend::new(&scene).unwrap();

    let mut render = |deg: f64| {
        let state = crate::animation::sweep::SweepState { angle_deg: deg };
        be.render_plan(&FramePlan {
            ops: vec![DrawOp::Title(TitleDraw {
                sweep: sweep.transform(state),
            })],
        })
        .unwrap()
    };
    let a = render(0.0);
    let b = render(90.0);
    let c = render(360.0);
    assert_ne!(a.data, b.data);
    assert_eq!(a.data, c.data);
}

#[test]
fn factory_builds_a_cpu_backend() {
    let scene = Scene::resolve(
        &def(""),
        Canvas {
            width: W,
            height: H,
        },
        ".",
    )
    .unwrap();
    let mut be = create_backend(BackendKind::Cpu, &scene).unwrap();
    let frame = be.render_plan(&FramePlan::default()).unwrap();
    assert_eq!((frame.width, frame.height), (W, H));
    assert_eq!(frame.pixel(W, 0), None);
    assert_eq!(frame.pixel(0, H), None);
    assert_eq!(frame.pixel(W - 1, H - 1), Some([0, 0, 0, 255]));
}
