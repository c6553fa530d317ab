use super::*;
use crate::foundation::color::Color;
use crate::scene::model::StopDef;

fn messages(def: &SceneDef) -> Vec<String> {
    match validate_scene(def) {
        Ok(()) => Vec::new(),
        Err(e) => e.errors.iter().map(ToString::to_string).collect(),
    }
}

#[test]
fn reference_scene_is_valid() {
    assert!(messages(&SceneDef::default()).is_empty());
}

#[test]
fn paths_point_at_the_offending_field() {
    let mut def = SceneDef::default();
    def.blobs[2].amp_x = -0.1;
    def.blobs[4].opacity = 1.2;
    def.clocks.sweep.cycle_ms = 0;
    def.canvas.width = 0;

    let msgs = messages(&def);
    assert!(msgs.contains(&"$.blobs[2].amp_x: must be finite and >= 0".to_owned()));
    assert!(msgs.contains(&"$.blobs[4].opacity: must be within [0, 1]".to_owned()));
    assert!(msgs.contains(&"$.clocks.sweep.cycle_ms: must be > 0".to_owned()));
    assert!(msgs.iter().any(|m| m.starts_with("$.canvas.width:")));
    assert_eq!(msgs.len(), 4, "{msgs:#?}");
}

#[test]
fn duplicate_and_empty_ids_are_reported() {
    let mut def = SceneDef::default();
    def.blobs[3].id = "g1".to_owned();
    def.blobs[5].id = "  ".to_owned();
    let msgs = messages(&def);
    assert!(msgs.contains(&"$.blobs[3].id: duplicate blob id 'g1'".to_owned()));
    assert!(msgs.contains(&"$.blobs[5].id: must be non-empty".to_owned()));
}

#[test]
fn gradient_stops_must_ascend_and_be_plural() {
    let mut def = SceneDef::default();
    def.title.sweep.stops.swap(1, 3);
    def.title.sweep.stops[1].offset = 0.9;
    let msgs = messages(&def);
    assert!(
        msgs.contains(&"$.title.sweep.stops[2].offset: offsets must be ascending".to_owned()),
        "{msgs:#?}"
    );

    def.title.sweep.stops = vec![StopDef {
        offset: 0.0,
        color: Color::rgb8(0, 0, 0),
    }];
    let msgs = messages(&def);
    assert!(msgs.contains(&"$.title.sweep.stops: needs at least 2 stops".to_owned()));
}

#[test]
fn degenerate_gradient_direction_is_rejected() {
    let mut def = SceneDef::default();
    def.title.sweep.end = def.title.sweep.start;
    assert_eq!(messages(&def), ["$.title.sweep.end: must differ from start"]);
}

#[test]
fn non_finite_values_are_caught() {
    let mut def = SceneDef::default();
    def.blobs[0].speed = f64::NAN;
    def.background = Color::rgba(f64::INFINITY, 0.0, 0.0, 1.0);
    def.title.glow.opacity = f64::NAN;
    let msgs = messages(&def);
    assert!(msgs.contains(&"$.blobs[0].speed: must be finite".to_owned()));
    assert!(msgs.contains(&"$.background: color channels must be finite".to_owned()));
    assert!(msgs.contains(&"$.title.glow.opacity: must be within [0, 1]".to_owned()));
}

#[test]
fn public_validate_wraps_every_message() {
    let mut def = SceneDef::default();
    def.blob_fill.inner_alpha = 2.0;
    def.title.box_height = 0.0;
    let err = def.validate().unwrap_err().to_string();
    assert!(err.starts_with("validation error: scene validation failed"));
    assert!(err.contains("$.blob_fill.inner_alpha"));
    assert!(err.contains("$.title.box_height"));
}

#[test]
fn title_sizes_must_be_positive() {
    let mut def = SceneDef::default();
    def.title.size_frac = 0.0;
    def.title.size_max = 0.0;
    let msgs = messages(&def);
    assert!(msgs.contains(&"$.title.size_frac: must be finite and > 0".to_owned()));
    assert!(msgs.contains(&"$.title.size_max: must be finite and > 0".to_owned()));
}

#[test]
fn mask_box_must_fit_a_sweep_pixmap() {
    let mut def = SceneDef::default();
    def.title.box_height = 70_000.0;
    assert_eq!(
        messages(&def),
        ["$.title.box_height: mask box diagonal (70003 px from box_width_max and box_height) must be <= 65535"]
    );
    assert!(def.validate().is_err());

    def.title.box_height = 140.0;
    def.title.box_width_max = 65_000.0;
    assert!(messages(&def).is_empty());
}
