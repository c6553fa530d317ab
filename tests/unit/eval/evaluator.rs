use super::*;
use crate::animation::clock::Phase;
use crate::foundation::core::Canvas;
use crate::scene::model::SceneDef;
use std::time::Duration;

fn scene() -> Scene {
    Scene::resolve(
        &SceneDef::default(),
        Canvas {
            width: 390,
            height: 844,
        },
        ".",
    )
    .unwrap()
}

#[test]
fn all_blobs_share_the_frame_phase() {
    let scene = scene();
    let mut ev = Evaluator::new(&scene);
    let tick = FrameTick {
        orbit: Phase(1.25),
        sweep: Phase(42.0),
    };
    let state = ev.eval_frame(&scene, tick).clone();

    assert_eq!(state.tick, tick);
    assert_eq!(state.blobs.len(), 6);
    for (i, blob) in state.blobs.iter().enumerate() {
        assert_eq!(Some(*blob), scene.field().sample(i, tick.orbit));
    }
    assert_eq!(state.sweep.angle_deg, 42.0);
}

#[test]
fn same_tick_gives_identical_frames() {
    let scene = scene();
    let mut a = Evaluator::new(&scene);
    let mut b = Evaluator::new(&scene);
    let tick = FrameTick::at(
        &scene.orbit_clock(),
        &scene.sweep_clock(),
        Duration::from_millis(7_321),
    );
    b.eval_frame(&scene, FrameTick::default());

    let sa = serde_json::to_string(a.eval_frame(&scene, tick)).unwrap();
    let sb = serde_json::to_string(b.eval_frame(&scene, tick)).unwrap();
    assert_eq!(sa, sb);
}

#[test]
fn storage_is_reused_across_frames() {
    let scene = scene();
    let mut ev = Evaluator::new(&scene);
    ev.eval_frame(&scene, FrameTick::default());
    let ptr = ev.state().blobs.as_ptr();
    for ms in (0..5_000).step_by(16) {
        let tick = FrameTick::at(
            &scene.orbit_clock(),
            &scene.sweep_clock(),
            Duration::from_millis(ms),
        );
        ev.eval_frame(&scene, tick);
    }
    assert_eq!(ev.state().blobs.as_ptr(), ptr);
}
