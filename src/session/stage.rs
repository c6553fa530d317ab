use crate::animation::clock::{ClockDriver, FrameTick};
use crate::compile::plan::{FramePlan, PlanCompiler};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::eval::evaluator::Evaluator;
use crate::foundation::core::{Canvas, FrameIndex, FrameRange};
use crate::foundation::error::{GlimmerError, GlimmerResult};
use crate::render::backend::{BackendKind, FrameRGBA, RenderBackend, create_backend};
use crate::scene::model::SceneDef;
use crate::scene::resolve::Scene;
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

const MAX_REORDER_BUFFER_BYTES: u64 = 128 * 1024 * 1024;

/// Options controlling how a [`Stage`] renders.
#[derive(Clone, Debug)]
pub struct StageOpts {
    /// Rendering surface.
    pub backend: BackendKind,
    /// Render range frames on a dedicated rayon pool.
    pub parallel: bool,
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Frames rendered per parallel batch before the next batch starts.
    pub chunk_size: usize,
    /// Bounded channel capacity between render workers and the sink thread.
    pub channel_capacity: usize,
}

impl Default for StageOpts {
    fn default() -> Self {
        Self {
            backend: BackendKind::Cpu,
            parallel: false,
            threads: None,
            chunk_size: 64,
            channel_capacity: 4,
        }
    }
}

/// Range render statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Frames in the requested range.
    pub frames_total: u64,
    /// Frames delivered to the sink.
    pub frames_rendered: u64,
    /// Worker threads that rendered the range (1 when sequential).
    pub workers: usize,
}

/// A mounted backdrop: the resolved scene, its two clock drivers and a rendering surface.
///
/// Mounting starts both clocks at host time zero; [`Stage::unmount`] (or dropping the stage)
/// stops them synchronously. Live rendering goes through [`Stage::render_at`], which advances the
/// clocks and samples them once per frame. [`Stage::render_frame`] and [`Stage::render_range`]
/// derive time from the frame index and leave the live clocks untouched.
pub struct Stage {
    scene: Scene,
    orbit: ClockDriver,
    sweep: ClockDriver,
    eval: Evaluator,
    compiler: PlanCompiler,
    plan: FramePlan,
    backend: Box<dyn RenderBackend + Send>,
    assets_root: PathBuf,
    opts: StageOpts,
    mounted: bool,
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage")
            .field("canvas", &self.scene.canvas())
            .field("orbit", &self.orbit)
            .field("sweep", &self.sweep)
            .field("assets_root", &self.assets_root)
            .field("opts", &self.opts)
            .field("mounted", &self.mounted)
            .finish_non_exhaustive()
    }
}

impl Stage {
    /// Validate and resolve `def` for `screen`, bind a backend and start both clocks.
    #[tracing::instrument(skip_all, fields(width = screen.width, height = screen.height))]
    pub fn mount(
        def: &SceneDef,
        screen: Canvas,
        assets_root: impl Into<PathBuf>,
        opts: StageOpts,
    ) -> GlimmerResult<Self> {
        let assets_root = assets_root.into();
        let scene = Scene::resolve(def, screen, &assets_root)?;
        let backend = create_backend(opts.backend, &scene)?;

        let mut orbit = ClockDriver::new("orbit", scene.orbit_clock());
        let mut sweep = ClockDriver::new("sweep", scene.sweep_clock());
        orbit.start(Duration::ZERO);
        sweep.start(Duration::ZERO);

        tracing::info!(
            blobs = scene.field().len(),
            title = scene.title().is_some(),
            "stage mounted"
        );
        Ok(Self {
            eval: Evaluator::new(&scene),
            compiler: PlanCompiler::new(&scene),
            plan: FramePlan::default(),
            scene,
            orbit,
            sweep,
            backend,
            assets_root,
            opts,
            mounted: true,
        })
    }

    /// The resolved scene.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Orbit clock driver (blob field).
    pub fn orbit_clock(&self) -> &ClockDriver {
        &self.orbit
    }

    /// Sweep clock driver (title rotation).
    pub fn sweep_clock(&self) -> &ClockDriver {
        &self.sweep
    }

    /// Whether the stage is still mounted.
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Plan of the last rendered frame.
    pub fn last_plan(&self) -> &FramePlan {
        &self.plan
    }

    /// Advance both clocks to host time `now` and return the sampled phases.
    pub fn tick(&mut self, now: Duration) -> GlimmerResult<FrameTick> {
        self.ensure_mounted()?;
        Ok(FrameTick {
            orbit: self.orbit.advance(now),
            sweep: self.sweep.advance(now),
        })
    }

    /// Advance the clocks to `now` and render the frame they describe.
    pub fn render_at(&mut self, now: Duration) -> GlimmerResult<FrameRGBA> {
        let tick = self.tick(now)?;
        self.render_tick(tick)
    }

    /// Render `frame` at its fps timestamp on clocks started at zero.
    pub fn render_frame(&mut self, frame: FrameIndex) -> GlimmerResult<FrameRGBA> {
        self.ensure_mounted()?;
        let tick = tick_for_frame(&self.scene, frame);
        self.render_tick(tick)
    }

    fn render_tick(&mut self, tick: FrameTick) -> GlimmerResult<FrameRGBA> {
        let state = self.eval.eval_frame(&self.scene, tick);
        self.compiler.compile_frame(state, &mut self.plan);
        self.backend.render_plan(&self.plan)
    }

    /// Render a frame range and stream it into `sink`.
    ///
    /// The sink receives frames in strictly increasing index order. With `parallel` set, frames
    /// are rendered by pool workers that each own an evaluator and a backend, and reordered at
    /// the sink boundary behind a bounded channel.
    #[tracing::instrument(skip_all, fields(start = range.start.0, end = range.end.0))]
    pub fn render_range(
        &mut self,
        range: FrameRange,
        sink: &mut dyn FrameSink,
    ) -> GlimmerResult<RenderStats> {
        self.ensure_mounted()?;
        if range.is_empty() {
            return Err(GlimmerError::validation(
                "render_range range must be non-empty",
            ));
        }

        let canvas = self.scene.canvas();
        let cfg = SinkConfig {
            width: canvas.width,
            height: canvas.height,
            fps: self.scene.fps(),
            frames: range.len_frames(),
        };

        let cap = self.opts.channel_capacity.max(1);
        let bytes_per_frame = u64::from(cfg.width)
            .saturating_mul(u64::from(cfg.height))
            .saturating_mul(4)
            .max(1);
        let max_chunk_by_mem = (MAX_REORDER_BUFFER_BYTES / bytes_per_frame).max(1);
        let chunk_size = normalized_chunk_size(self.opts.chunk_size)
            .min(max_chunk_by_mem)
            .min(range.len_frames());

        let pool = if self.opts.parallel {
            Some(build_thread_pool(self.opts.threads)?)
        } else {
            None
        };
        let workers = pool.as_ref().map_or(1, |p| p.current_num_threads());
        tracing::debug!(chunk_size, workers, "rendering range");

        std::thread::scope(|scope| -> GlimmerResult<RenderStats> {
            let (tx, rx) = mpsc::sync_channel::<FrameMsg>(cap);
            let range_start = range.start.0;
            let range_end = range.end.0;
            let sink_ref: &mut dyn FrameSink = sink;

            let enc = scope.spawn(move || -> GlimmerResult<()> {
                sink_ref.begin(cfg)?;

                let mut next = range_start;
                let mut pending = HashMap::<u64, FrameRGBA>::new();
                while next < range_end {
                    let msg = rx.recv().map_err(|_| {
                        GlimmerError::render("frame channel disconnected unexpectedly")
                    })?;
                    pending.insert(msg.idx.0, msg.frame);

                    while let Some(frame) = pending.remove(&next) {
                        sink_ref.push_frame(FrameIndex(next), &frame)?;
                        next += 1;
                    }
                }

                sink_ref.end()
            });

            let mut stats = RenderStats {
                workers,
                ..RenderStats::default()
            };
            let mut produce = || -> Result<(), Halt> {
                let mut chunk_start = range_start;
                while chunk_start < range_end {
                    let chunk_end = (chunk_start + chunk_size).min(range_end);
                    match pool.as_ref() {
                        Some(pool) => {
                            let ctx = ChunkCtx {
                                scene: &self.scene,
                                backend: self.opts.backend,
                                pool,
                                tx: &tx,
                            };
                            render_chunk_parallel(&ctx, chunk_start, chunk_end)?;
                        }
                        None => {
                            for f in chunk_start..chunk_end {
                                let idx = FrameIndex(f);
                                let tick = tick_for_frame(&self.scene, idx);
                                let frame = self.render_tick(tick)?;
                                tx.send(FrameMsg { idx, frame })
                                    .map_err(|_| Halt::SinkClosed)?;
                            }
                        }
                    }
                    stats.frames_total += chunk_end - chunk_start;
                    chunk_start = chunk_end;
                }
                Ok(())
            };
            let produce_res = produce();

            drop(tx);
            let enc_res = enc
                .join()
                .map_err(|_| GlimmerError::render("sink thread panicked"))?;

            // Whichever side failed first hangs up the channel; report that side's error.
            match produce_res {
                Err(Halt::Failed(e)) => return Err(e),
                Err(Halt::SinkClosed) => {
                    enc_res?;
                    return Err(GlimmerError::render("sink stopped accepting frames"));
                }
                Ok(()) => enc_res?,
            }
            stats.frames_rendered = stats.frames_total;
            Ok(stats)
        })
    }

    /// Stop both clocks. Idempotent: returns `false` when the stage was already unmounted.
    pub fn unmount(&mut self) -> bool {
        if !self.mounted {
            return false;
        }
        self.mounted = false;
        self.orbit.stop();
        self.sweep.stop();
        tracing::info!("stage unmounted");
        true
    }

    fn ensure_mounted(&self) -> GlimmerResult<()> {
        if self.mounted {
            Ok(())
        } else {
            Err(GlimmerError::lifecycle("stage is unmounted"))
        }
    }

    /// Assets root the title font was resolved against.
    pub fn assets_root(&self) -> &Path {
        &self.assets_root
    }
}

impl Drop for Stage {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// Phases at the fps timestamp of `frame`, on clocks started together at zero.
pub fn tick_for_frame(scene: &Scene, frame: FrameIndex) -> FrameTick {
    let t = scene.fps().frame_time(frame);
    FrameTick::at(&scene.orbit_clock(), &scene.sweep_clock(), t)
}

/// Why frame production stopped early.
#[derive(Debug)]
enum Halt {
    Failed(GlimmerError),
    SinkClosed,
}

impl From<GlimmerError> for Halt {
    fn from(e: GlimmerError) -> Self {
        Self::Failed(e)
    }
}

#[derive(Debug)]
struct FrameMsg {
    idx: FrameIndex,
    frame: FrameRGBA,
}

fn normalized_chunk_size(chunk_size: usize) -> u64 {
    chunk_size.max(1) as u64
}

fn build_thread_pool(threads: Option<usize>) -> GlimmerResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(GlimmerError::validation(
            "render_range 'threads' must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| GlimmerError::render(format!("failed to build rayon thread pool: {e}")))
}

struct Worker {
    eval: Evaluator,
    compiler: PlanCompiler,
    plan: FramePlan,
    backend: Box<dyn RenderBackend + Send>,
}

impl Worker {
    fn new(scene: &Scene, kind: BackendKind) -> GlimmerResult<Self> {
        Ok(Self {
            eval: Evaluator::new(scene),
            compiler: PlanCompiler::new(scene),
            plan: FramePlan::default(),
            backend: create_backend(kind, scene)?,
        })
    }

    fn render(&mut self, scene: &Scene, frame: FrameIndex) -> GlimmerResult<FrameRGBA> {
        let state = self.eval.eval_frame(scene, tick_for_frame(scene, frame));
        self.compiler.compile_frame(state, &mut self.plan);
        self.backend.render_plan(&self.plan)
    }
}

struct ChunkCtx<'a> {
    scene: &'a Scene,
    backend: BackendKind,
    pool: &'a rayon::ThreadPool,
    tx: &'a mpsc::SyncSender<FrameMsg>,
}

fn render_chunk_parallel(ctx: &ChunkCtx<'_>, start: u64, end: u64) -> Result<(), Halt> {
    let scene = ctx.scene;
    let kind = ctx.backend;
    let tx = ctx.tx.clone();
    ctx.pool.install(|| {
        (start..end).into_par_iter().try_for_each_init(
            || Worker::new(scene, kind),
            move |worker, f| -> Result<(), Halt> {
                let worker = worker.as_mut().map_err(|e| {
                    GlimmerError::render(format!("failed to create render worker: {e}"))
                })?;
                let idx = FrameIndex(f);
                let frame = worker.render(scene, idx)?;
                tx.send(FrameMsg { idx, frame })
                    .map_err(|_| Halt::SinkClosed)?;
                Ok(())
            },
        )
    })
}

#[cfg(test)]
#[path = "../../tests/unit/session/stage.rs"]
mod tests;
