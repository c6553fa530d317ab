use super::*;

fn title_box() -> Rect {
    // 351 x 140 centred on a 390x844 screen.
    Rect::new(19.5, 352.0, 370.5, 492.0)
}

fn assert_affine_close(a: Affine, b: Affine) {
    for (x, y) in a.as_coeffs().iter().zip(b.as_coeffs()) {
        assert!((x - y).abs() < 1e-9, "{a:?} != {b:?}");
    }
}

#[test]
fn phase_maps_to_degrees_unchanged() {
    let s = SweepState::from_phase(Phase(180.0));
    assert_eq!(s.angle_deg, 180.0);
    assert_eq!(s.normalized_deg(), 180.0);
    assert!((s.radians() - std::f64::consts::PI).abs() < 1e-12);
}

#[test]
fn full_turn_is_identical_to_zero() {
    let sweep = TitleSweep::new(title_box());
    let zero = sweep.transform(SweepState::from_phase(Phase(0.0)));
    let full = sweep.transform(SweepState::from_phase(Phase(360.0)));
    assert_eq!(zero, full);
    assert_eq!(SweepState { angle_deg: 720.0 }.normalized_deg(), 0.0);
    assert_eq!(SweepState { angle_deg: -90.0 }.normalized_deg(), 270.0);
}

#[test]
fn half_turn_flips_the_layer_about_the_box_centre() {
    let sweep = TitleSweep::new(title_box());
    let t = sweep.transform(SweepState { angle_deg: 180.0 });
    let c = sweep.pivot();
    let side = sweep.side();

    // Local origin lands on the far corner of the rotated square.
    let p = t * Point::ZERO;
    assert!((p.x - (c.x + side * 0.5)).abs() < 1e-9);
    assert!((p.y - (c.y + side * 0.5)).abs() < 1e-9);

    // The local centre is a fixed point at every angle.
    for deg in [0.0, 33.0, 180.0, 271.5] {
        let m = sweep.transform(SweepState { angle_deg: deg }) * Point::new(side * 0.5, side * 0.5);
        assert!((m.x - c.x).abs() < 1e-9 && (m.y - c.y).abs() < 1e-9);
    }
}

#[test]
fn layer_covers_the_box_at_any_angle() {
    let b = title_box();
    let sweep = TitleSweep::new(b);
    assert!((sweep.side() - (351.0f64.hypot(140.0))).abs() < 1e-9);

    for step in 0..72 {
        let t = sweep.transform(SweepState {
            angle_deg: f64::from(step) * 5.0,
        });
        let inv = t.inverse();
        let local = sweep.local_rect();
        for corner in [
            Point::new(b.x0, b.y0),
            Point::new(b.x1, b.y0),
            Point::new(b.x0, b.y1),
            Point::new(b.x1, b.y1),
        ] {
            let q = inv * corner;
            assert!(
                q.x >= local.x0 - 1e-9
                    && q.x <= local.x1 + 1e-9
                    && q.y >= local.y0 - 1e-9
                    && q.y <= local.y1 + 1e-9,
                "corner {corner:?} escapes layer at {}°",
                step * 5
            );
        }
    }
}

#[test]
fn zero_angle_is_a_pure_translation() {
    let sweep = TitleSweep::new(title_box());
    let half = sweep.side() * 0.5;
    let c = sweep.pivot();
    assert_affine_close(
        sweep.transform(SweepState::default()),
        Affine::translate((c.x - half, c.y - half)),
    );
}
