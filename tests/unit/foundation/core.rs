use super::*;

#[test]
fn frame_range_contains_boundaries() {
    let r = FrameRange::new(FrameIndex(2), FrameIndex(5)).unwrap();
    assert!(!r.contains(FrameIndex(1)));
    assert!(r.contains(FrameIndex(2)));
    assert!(r.contains(FrameIndex(4)));
    assert!(!r.contains(FrameIndex(5)));
    assert_eq!(r.len_frames(), 3);
    assert!(FrameRange::new(FrameIndex(5), FrameIndex(2)).is_err());
}

#[test]
fn fps_frame_time_lands_on_cycle_boundaries() {
    let fps = Fps::new(60, 1).unwrap();
    assert_eq!(fps.frame_time(FrameIndex(0)), Duration::ZERO);
    assert_eq!(fps.frame_time(FrameIndex(60 * 16)), Duration::from_secs(16));

    let ntsc = Fps::new(30000, 1001).unwrap();
    let secs = ntsc.frames_to_secs(123);
    assert_eq!(ntsc.secs_to_frames_floor(secs), 123);
}

#[test]
fn canvas_center_is_half_extent() {
    let c = Canvas {
        width: 390,
        height: 844,
    };
    assert_eq!(c.center(), Point::new(195.0, 422.0));
}

#[test]
fn premul_scales_channels_by_alpha() {
    let c = Rgba8Premul::from_straight_rgba(255, 128, 0, 128);
    assert_eq!(c.to_array(), [128, 64, 0, 128]);
    assert_eq!(Rgba8Premul::transparent().to_array(), [0, 0, 0, 0]);
}

#[test]
fn transform_to_affine_identity_and_anchor_rotation() {
    assert_eq!(Transform2D::default().to_affine(), Affine::IDENTITY);

    let t = Transform2D {
        rotation_rad: std::f64::consts::PI,
        anchor: Vec2::new(10.0, 10.0),
        ..Transform2D::default()
    };
    let p = t.to_affine() * Point::new(10.0, 10.0);
    assert!((p.x - 10.0).abs() < 1e-9);
    assert!((p.y - 10.0).abs() < 1e-9);
    let q = t.to_affine() * Point::new(0.0, 10.0);
    assert!((q.x - 20.0).abs() < 1e-9);
}
