//! Glimmer is a procedural animated backdrop: soft radial color blobs drifting on closed orbits
//! beneath a title whose glyphs reveal a slowly rotating gradient sweep, with a faint glow.
//!
//! Everything on screen is a pure function of two clock phases:
//!
//! - Describe the backdrop with a [`SceneDef`] (JSON, or [`SceneDef::default`])
//! - [`Stage::mount`] it for a screen size, which starts both clocks
//! - Render live frames with [`Stage::render_at`], or stream a range into a [`FrameSink`]
//! - [`Stage::unmount`] (or drop the stage) to stop the clocks
#![forbid(unsafe_code)]
#![deny(missing_docs)]
// Plan and backend internals keep a few accessors only the tests read.
#![allow(dead_code)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod compile;
pub(crate) mod encode;
pub(crate) mod eval;
pub(crate) mod render;
pub(crate) mod scene;
pub(crate) mod session;

pub use crate::foundation::color::Color;
pub use crate::foundation::core::{
    Affine, Canvas, Fps, FrameIndex, FrameRange, Point, Rect, Rgba8Premul, Transform2D, Vec2,
};
pub use crate::foundation::error::{GlimmerError, GlimmerResult};

pub use crate::animation::blob::{BlobConfig, BlobField, BlobMotion, FrameBlobState};
pub use crate::animation::clock::{ClockDriver, ClockSpec, ClockState, FrameTick, Phase};
pub use crate::animation::sweep::{SweepState, TitleSweep};
pub use crate::compile::plan::{
    BlobDraw, DrawOp, FillId, FillTable, FramePlan, PlanCompiler, RadialFill, TitleDraw,
};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use crate::encode::sink::{FrameSink, InMemorySink, PngSequenceSink, SinkConfig};
pub use crate::eval::evaluator::{Evaluator, FrameState};
pub use crate::render::backend::{BackendKind, FrameRGBA, RenderBackend, create_backend};
pub use crate::render::cpu::CpuBackend;
pub use crate::scene::model::{
    BlobDef, ClockDef, ClocksDef, FillDef, GlowDef, GradientDef, SceneDef, StopDef, TitleDef,
};
pub use crate::scene::resolve::{GradientStop, LinearGradient, ResolvedTitle, Scene};
pub use crate::session::stage::{RenderStats, Stage, StageOpts, tick_for_frame};
