//! Repeating linear phase ramps.
//!
//! A [`ClockDriver`] is the only mutable state in the motion model. It is written by exactly one
//! owner (the stage) and read through [`FrameTick`] snapshots, so every consumer of a frame sees
//! the same phase.

use crate::foundation::error::{GlimmerError, GlimmerResult};
use std::time::Duration;

/// A phase value inside `[0, ceiling)` of its clock.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, serde::Serialize)]
pub struct Phase(pub f64);

impl Phase {
    /// Raw scalar value.
    pub fn value(self) -> f64 {
        self.0
    }
}

/// Cycle duration and ceiling of a repeating ramp.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClockSpec {
    cycle: Duration,
    ceiling: f64,
}

impl ClockSpec {
    /// Build a spec; `cycle` must be non-zero and `ceiling` finite and positive.
    pub fn new(cycle: Duration, ceiling: f64) -> GlimmerResult<Self> {
        if cycle.is_zero() {
            return Err(GlimmerError::validation("clock cycle must be > 0"));
        }
        if !ceiling.is_finite() || ceiling <= 0.0 {
            return Err(GlimmerError::validation(
                "clock ceiling must be finite and > 0",
            ));
        }
        Ok(Self { cycle, ceiling })
    }

    /// Orbit clock of the reference backdrop: 0..2π over 16 s.
    pub fn orbit() -> Self {
        Self {
            cycle: Duration::from_millis(16_000),
            ceiling: std::f64::consts::TAU,
        }
    }

    /// Sweep clock of the reference backdrop: 0..360 over 12 s.
    pub fn sweep() -> Self {
        Self {
            cycle: Duration::from_millis(12_000),
            ceiling: 360.0,
        }
    }

    /// Duration of one ramp.
    pub fn cycle(&self) -> Duration {
        self.cycle
    }

    /// Value the ramp approaches before wrapping to zero.
    pub fn ceiling(&self) -> f64 {
        self.ceiling
    }

    /// Phase after `elapsed` time on a linear ramp that restarts every cycle.
    ///
    /// The modulo runs on integer nanoseconds, so `phase_at(k * cycle)` is exactly zero.
    pub fn phase_at(&self, elapsed: Duration) -> Phase {
        let cycle_ns = self.cycle.as_nanos();
        let rem = elapsed.as_nanos() % cycle_ns;
        Phase(self.ceiling * (rem as f64 / cycle_ns as f64))
    }
}

/// Lifecycle of a [`ClockDriver`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockState {
    /// Created, never started.
    Idle,
    /// Advancing; `origin` is the host time at which the ramp started.
    Running {
        /// Host timestamp of phase zero.
        origin: Duration,
    },
    /// Halted; the phase stays frozen at its last value.
    Stopped,
}

/// Owns one phase value and advances it along a [`ClockSpec`] ramp.
#[derive(Clone, Debug)]
pub struct ClockDriver {
    name: &'static str,
    spec: ClockSpec,
    state: ClockState,
    phase: Phase,
}

impl ClockDriver {
    /// Create an idle driver at phase zero.
    pub fn new(name: &'static str, spec: ClockSpec) -> Self {
        Self {
            name,
            spec,
            state: ClockState::Idle,
            phase: Phase(0.0),
        }
    }

    /// Begin (or restart) the ramp from zero at host time `now`.
    pub fn start(&mut self, now: Duration) {
        tracing::debug!(
            clock = self.name,
            cycle_ms = self.spec.cycle.as_millis() as u64,
            ceiling = self.spec.ceiling,
            "clock started"
        );
        self.state = ClockState::Running { origin: now };
        self.phase = Phase(0.0);
    }

    /// Halt advancement. Idempotent; returns `true` only when a running clock was stopped.
    pub fn stop(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.state = ClockState::Stopped;
        tracing::debug!(clock = self.name, phase = self.phase.0, "clock stopped");
        true
    }

    /// Move the phase to host time `now`. Idle or stopped clocks keep their phase.
    pub fn advance(&mut self, now: Duration) -> Phase {
        if let ClockState::Running { origin } = self.state {
            self.phase = self.spec.phase_at(now.saturating_sub(origin));
        }
        self.phase
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether the ramp is advancing.
    pub fn is_running(&self) -> bool {
        matches!(self.state, ClockState::Running { .. })
    }

    /// Lifecycle state.
    pub fn state(&self) -> ClockState {
        self.state
    }

    /// Ramp parameters.
    pub fn spec(&self) -> &ClockSpec {
        &self.spec
    }
}

/// Both clock phases of one frame, sampled once and shared by every derivation of that frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
pub struct FrameTick {
    /// Orbital phase driving the blob field (radians, `0..2π` in the reference scene).
    pub orbit: Phase,
    /// Rotation phase driving the title sweep (degrees, `0..360` in the reference scene).
    pub sweep: Phase,
}

impl FrameTick {
    /// Pure tick for host time `elapsed` on two ramps started together at zero.
    pub fn at(orbit: &ClockSpec, sweep: &ClockSpec, elapsed: Duration) -> Self {
        Self {
            orbit: orbit.phase_at(elapsed),
            sweep: sweep.phase_at(elapsed),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/clock.rs"]
mod tests;
