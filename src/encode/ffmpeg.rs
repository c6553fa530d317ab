use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::color::Color;
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{GlimmerError, GlimmerResult};
use crate::render::backend::FrameRGBA;
use crate::render::raster::flatten_over_rgb8;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

/// Options for [`FfmpegSink`] MP4 output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output MP4 file path.
    pub out_path: PathBuf,
    /// Overwrite the output file if it already exists.
    pub overwrite: bool,
    /// Opaque color the frames are flattened over (alpha is ignored).
    pub background: Color,
}

impl FfmpegSinkOpts {
    /// Options writing an MP4 to `out_path` over black.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            background: Color::rgb8(0, 0, 0),
        }
    }

    /// Same options with a different flatten color, usually the scene background.
    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw RGB frames to its stdin.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    /// Create a new sink that streams into `ffmpeg`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
        }
    }

    fn background_rgb(&self) -> [u8; 3] {
        let [r, g, b, _] = self.opts.background.with_alpha(1.0).to_rgba8();
        [r, g, b]
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> GlimmerResult<()> {
        check_dims(&cfg)?;

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(GlimmerError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(GlimmerError::encode(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd.arg(if self.opts.overwrite { "-y" } else { "-n" });
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgb24",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args([
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ]);
        cmd.arg(&self.opts.out_path);

        let mut child = cmd.spawn().map_err(|e| {
            GlimmerError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| GlimmerError::encode("failed to open ffmpeg stdin"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| GlimmerError::encode("failed to open ffmpeg stderr"))?;

        // ffmpeg blocks once its stderr pipe fills up, so drain it on a side thread.
        self.stderr_drain = Some(std::thread::spawn(move || {
            let mut buf = Vec::new();
            stderr.read_to_end(&mut buf)?;
            Ok(buf)
        }));

        tracing::debug!(
            out = %self.opts.out_path.display(),
            width = cfg.width,
            height = cfg.height,
            frames = cfg.frames,
            "ffmpeg started"
        );
        self.scratch = Vec::with_capacity((cfg.width as usize) * (cfg.height as usize) * 3);
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> GlimmerResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| GlimmerError::encode("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(GlimmerError::encode(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(GlimmerError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if frame.data.len() != (cfg.width as usize) * (cfg.height as usize) * 4 {
            return Err(GlimmerError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }
        self.last_idx = Some(idx);

        let bg = self.background_rgb();
        flatten_over_rgb8(&frame.data, bg, &mut self.scratch);

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(GlimmerError::encode("ffmpeg sink is already finalized"));
        };
        use std::io::Write as _;
        stdin.write_all(&self.scratch).map_err(|e| {
            GlimmerError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn end(&mut self) -> GlimmerResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| GlimmerError::encode("ffmpeg sink not started"))?;

        let status = child
            .wait()
            .map_err(|e| GlimmerError::encode(format!("failed to wait for ffmpeg: {e}")))?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| GlimmerError::encode("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| GlimmerError::encode(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(GlimmerError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        tracing::debug!(out = %self.opts.out_path.display(), "ffmpeg finished");
        self.cfg = None;
        Ok(())
    }
}

fn check_dims(cfg: &SinkConfig) -> GlimmerResult<()> {
    if cfg.fps.num == 0 || cfg.fps.den == 0 {
        return Err(GlimmerError::validation("fps must be non-zero"));
    }
    if cfg.width == 0 || cfg.height == 0 {
        return Err(GlimmerError::validation(
            "ffmpeg sink width/height must be non-zero",
        ));
    }
    if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
        return Err(GlimmerError::validation(
            "ffmpeg sink width/height must be even (required for yuv420p mp4 output)",
        ));
    }
    Ok(())
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // `-r` before `-i` sets the rawvideo input rate.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> GlimmerResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
