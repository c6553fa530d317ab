use crate::animation::blob::FrameBlobState;
use crate::animation::clock::FrameTick;
use crate::animation::sweep::SweepState;
use crate::scene::resolve::Scene;

/// Everything derived from one [`FrameTick`].
///
/// Rebuilt in place every frame; nothing in it outlives the frame it was computed for.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct FrameState {
    /// Phases every derivation below was computed from.
    pub tick: FrameTick,
    /// One entry per blob, in config order.
    pub blobs: Vec<FrameBlobState>,
    /// Rotation of the title sweep.
    pub sweep: SweepState,
}

/// Reusable per-frame evaluator. Holds only scratch storage.
#[derive(Debug, Default)]
pub struct Evaluator {
    state: FrameState,
}

impl Evaluator {
    /// Evaluator with blob storage sized for `scene`.
    pub fn new(scene: &Scene) -> Self {
        Self {
            state: FrameState {
                blobs: Vec::with_capacity(scene.field().len()),
                ..FrameState::default()
            },
        }
    }

    /// Derive the frame for `tick`. Every blob reads the same orbit phase.
    pub fn eval_frame(&mut self, scene: &Scene, tick: FrameTick) -> &FrameState {
        self.state.tick = tick;
        scene.field().evaluate_into(tick.orbit, &mut self.state.blobs);
        self.state.sweep = SweepState::from_phase(tick.sweep);
        &self.state
    }

    /// Last evaluated frame.
    pub fn state(&self) -> &FrameState {
        &self.state
    }
}

#[cfg(test)]
#[path = "../../tests/unit/eval/evaluator.rs"]
mod tests;
