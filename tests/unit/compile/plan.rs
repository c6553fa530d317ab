use super::*;
use crate::animation::clock::{FrameTick, Phase};
use crate::eval::evaluator::Evaluator;
use crate::foundation::core::Canvas;
use crate::scene::model::SceneDef;

fn resolve(def: &SceneDef) -> Scene {
    Scene::resolve(
        def,
        Canvas {
            width: 390,
            height: 844,
        },
        ".",
    )
    .unwrap()
}

fn plan_for(scene: &Scene, tick: FrameTick) -> FramePlan {
    let mut ev = Evaluator::new(scene);
    let state = ev.eval_frame(scene, tick);
    let mut plan = FramePlan::default();
    PlanCompiler::new(scene).compile_frame(state, &mut plan);
    plan
}

#[test]
fn blobs_come_first_in_config_order_then_the_title() {
    let scene = resolve(&SceneDef::default());
    let plan = plan_for(&scene, FrameTick::default());
    assert_eq!(plan.ops.len(), 7);
    for (i, op) in plan.ops[..6].iter().enumerate() {
        let DrawOp::Blob(b) = op else {
            panic!("expected blob op at {i}, got {op:?}");
        };
        assert_eq!(b.fill, FillId(i as u32));
    }
    assert!(matches!(plan.ops[6], DrawOp::Title(_)));
}

#[test]
fn fill_table_binds_one_fill_per_blob() {
    let scene = resolve(&SceneDef::default());
    let fills = FillTable::from_scene(&scene);
    assert_eq!(fills.len(), 6);
    assert_eq!(fills.find("g2"), Some(FillId(2)));
    assert_eq!(fills.find("nope"), None);

    let g0 = fills.get(FillId(0)).unwrap();
    assert_eq!(g0.key, "g0");
    assert_eq!(g0.inner_alpha, 0.9);
    assert_eq!(g0.outer_alpha, 0.0);
    assert!((g0.color_at(0.0).a - 0.9).abs() < 1e-12);
    assert_eq!(g0.color_at(1.0).a, 0.0);
    assert!((g0.color_at(0.5).a - 0.45).abs() < 1e-12);

    let ids: Vec<u32> = fills.iter().map(|(id, _)| id.0).collect();
    assert_eq!(ids, [0, 1, 2, 3, 4, 5]);
}

#[test]
fn title_op_tracks_the_sweep_angle() {
    let scene = resolve(&SceneDef::default());
    let sweep = scene.title().unwrap().sweep;
    let tick = FrameTick {
        orbit: Phase(0.0),
        sweep: Phase(180.0),
    };
    let plan = plan_for(&scene, tick);
    let Some(DrawOp::Title(t)) = plan.ops.last() else {
        panic!("missing title op");
    };
    assert_eq!(
        t.sweep,
        sweep.transform(crate::animation::sweep::SweepState { angle_deg: 180.0 })
    );
}

#[test]
fn scene_without_title_or_blobs_compiles_to_nothing() {
    let mut def = SceneDef::default();
    def.blobs.clear();
    def.title.text.clear();
    let scene = resolve(&def);
    let plan = plan_for(&scene, FrameTick::default());
    assert!(plan.ops.is_empty());
    assert_eq!(plan.dump(), "FramePlan ops: 0\n");
}

#[test]
fn dump_is_stable_for_a_fixed_tick() {
    let scene = resolve(&SceneDef::default());
    let tick = FrameTick {
        orbit: Phase(2.0),
        sweep: Phase(90.0),
    };
    let a = plan_for(&scene, tick).dump();
    let b = plan_for(&scene, tick).dump();
    assert_eq!(a, b);
    assert!(a.starts_with("FramePlan ops: 7\n  O0: blob fill=0 center=("));
    assert!(a.contains("  O6: title sweep=["));
}
