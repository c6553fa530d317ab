use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "glimmer", version, about = "Render the glimmer animated backdrop")]
struct Cli {
    /// Log debug events (clock start/stop, backend setup) to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame at a host time as a PNG.
    Frame(FrameArgs),
    /// Render a frame range into a PNG directory, or an MP4 (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Print the reference scene as JSON.
    Scene,
}

#[derive(Args, Debug)]
struct SceneArgs {
    /// Scene JSON. Defaults to the reference backdrop.
    #[arg(long)]
    scene: Option<PathBuf>,

    /// Screen width in pixels. Defaults to the scene canvas.
    #[arg(long)]
    width: Option<u32>,

    /// Screen height in pixels. Defaults to the scene canvas.
    #[arg(long)]
    height: Option<u32>,

    /// Title font file, overriding the scene's.
    #[arg(long)]
    font: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Host time in milliseconds since mount.
    #[arg(long, default_value_t = 0)]
    at_ms: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Output directory for PNG frames, or a `.mp4` file.
    #[arg(long)]
    out: PathBuf,

    /// Seconds to render from time zero.
    #[arg(long, default_value_t = 4.0, conflicts_with = "full_loop")]
    seconds: f64,

    /// Render exactly one full loop (until both clocks realign).
    #[arg(long = "loop")]
    full_loop: bool,

    /// Output format. Inferred from `--out` when omitted.
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Enable frame-level parallelism.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Render chunk size (parallel mode only).
    #[arg(long, default_value_t = 64)]
    chunk_size: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Png,
    Mp4,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
        Command::Scene => cmd_scene(),
    }
}

fn load_scene(args: &SceneArgs) -> anyhow::Result<(glimmer::SceneDef, glimmer::Canvas, PathBuf)> {
    let (mut def, assets_root) = match &args.scene {
        Some(path) => {
            let def = glimmer::SceneDef::from_path(path)
                .with_context(|| format!("load scene '{}'", path.display()))?;
            let root = path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
            (def, root)
        }
        None => (glimmer::SceneDef::default(), PathBuf::from(".")),
    };
    if let Some(font) = &args.font {
        let font = std::path::absolute(font)
            .with_context(|| format!("resolve font path '{}'", font.display()))?;
        def.title.font = Some(font);
    }
    let screen = glimmer::Canvas {
        width: args.width.unwrap_or(def.canvas.width),
        height: args.height.unwrap_or(def.canvas.height),
    };
    Ok((def, screen, assets_root))
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let (def, screen, assets_root) = load_scene(&args.scene)?;
    let mut stage =
        glimmer::Stage::mount(&def, screen, assets_root, glimmer::StageOpts::default())?;
    let frame = stage.render_at(Duration::from_millis(args.at_ms))?;
    stage.unmount();

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &args.out,
        &frame.to_straight_rgba8(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let (def, screen, assets_root) = load_scene(&args.scene)?;
    let opts = glimmer::StageOpts {
        parallel: args.parallel,
        threads: args.threads,
        chunk_size: args.chunk_size,
        ..glimmer::StageOpts::default()
    };
    let mut stage = glimmer::Stage::mount(&def, screen, assets_root, opts)?;

    let frames = if args.full_loop {
        stage
            .scene()
            .loop_frames()
            .context("clock cycles have no common loop")?
    } else {
        anyhow::ensure!(
            args.seconds.is_finite() && args.seconds > 0.0,
            "--seconds must be > 0"
        );
        stage.scene().fps().secs_to_frames_floor(args.seconds).max(1)
    };
    let range = glimmer::FrameRange::new(glimmer::FrameIndex(0), glimmer::FrameIndex(frames))?;

    let format = args.format.unwrap_or_else(|| infer_format(&args.out));
    let stats = match format {
        OutputFormat::Png => {
            let mut sink = glimmer::PngSequenceSink::new(&args.out);
            stage.render_range(range, &mut sink)?
        }
        OutputFormat::Mp4 => {
            let mut sink = glimmer::FfmpegSink::new(
                glimmer::FfmpegSinkOpts::new(&args.out).with_background(def.background),
            );
            stage.render_range(range, &mut sink)?
        }
    };
    stage.unmount();

    eprintln!(
        "wrote {} ({} frames, {} worker(s))",
        args.out.display(),
        stats.frames_rendered,
        stats.workers
    );
    Ok(())
}

fn cmd_scene() -> anyhow::Result<()> {
    println!("{}", glimmer::SceneDef::default().to_json_pretty()?);
    Ok(())
}

fn infer_format(out: &Path) -> OutputFormat {
    match out.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("mp4") => OutputFormat::Mp4,
        _ => OutputFormat::Png,
    }
}
