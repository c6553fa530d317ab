use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{GlimmerError, GlimmerResult};
use crate::render::backend::FrameRGBA;
use crate::render::raster::unpremultiply_rgba8_in_place;
use std::path::{Path, PathBuf};

/// Configuration provided to a [`FrameSink`] at the start of a range render.
#[derive(Debug, Clone, PartialEq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
    /// Total frames the range will deliver.
    pub frames: u64,
}

/// Sink contract for consuming rendered frames in timeline order.
///
/// Ordering contract: `push_frame` is called in strictly increasing `FrameIndex` order within the
/// requested render range.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> GlimmerResult<()>;
    /// Push one frame in strictly increasing timeline order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> GlimmerResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> GlimmerResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    finished: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Captured frames in delivery order.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    /// Whether `end` has been called since the last `begin`.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> GlimmerResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> GlimmerResult<()> {
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> GlimmerResult<()> {
        self.finished = true;
        Ok(())
    }
}

/// Writes every frame as `frame_00000.png`, `frame_00001.png`, ... into a directory.
///
/// Files are numbered by the frame's timeline index, in straight alpha.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
    written: u64,
    scratch: Vec<u8>,
}

impl PngSequenceSink {
    /// Sink writing into `dir`, created on `begin` if missing.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cfg: None,
            last_idx: None,
            written: 0,
            scratch: Vec::new(),
        }
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path used for frame `idx`.
    pub fn frame_path(&self, idx: FrameIndex) -> PathBuf {
        self.dir.join(format!("frame_{:05}.png", idx.0))
    }

    /// Number of files written since the last `begin`.
    pub fn written(&self) -> u64 {
        self.written
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> GlimmerResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(GlimmerError::validation(
                "png sink width/height must be non-zero",
            ));
        }
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            GlimmerError::encode(format!(
                "failed to create output directory '{}': {e}",
                self.dir.display()
            ))
        })?;
        self.cfg = Some(cfg);
        self.last_idx = None;
        self.written = 0;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> GlimmerResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| GlimmerError::encode("png sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(GlimmerError::encode(
                "png sink received out-of-order frame index",
            ));
        }
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(GlimmerError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }

        self.scratch.clear();
        self.scratch.extend_from_slice(&frame.data);
        if frame.premultiplied {
            unpremultiply_rgba8_in_place(&mut self.scratch);
        }

        let path = self.frame_path(idx);
        image::save_buffer_with_format(
            &path,
            &self.scratch,
            frame.width,
            frame.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .map_err(|e| GlimmerError::encode(format!("write png '{}': {e}", path.display())))?;

        self.last_idx = Some(idx);
        self.written += 1;
        Ok(())
    }

    fn end(&mut self) -> GlimmerResult<()> {
        if self.cfg.take().is_none() {
            return Err(GlimmerError::encode("png sink not started"));
        }
        tracing::debug!(dir = %self.dir.display(), frames = self.written, "png sequence written");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
