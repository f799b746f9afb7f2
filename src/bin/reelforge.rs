use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use reelforge::{Exporter, RenderJob, RenderResult, RenderStatus};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "reelforge", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export every segment to its own MP4 (requires `ffmpeg` on PATH).
    Segments(SegmentsArgs),
    /// Export a single segment.
    Preview(PreviewArgs),
    /// Export the full timeline.
    Full(JobArgs),
    /// Render one segment frame as a PNG.
    Frame(FrameArgs),
    /// Join already-exported segments in a directory into `final_output.mp4`.
    Concat(ConcatArgs),
}

#[derive(Parser, Debug)]
struct JobArgs {
    /// Render job JSON.
    #[arg(long)]
    job: PathBuf,
}

#[derive(Parser, Debug)]
struct SegmentsArgs {
    /// Render job JSON.
    #[arg(long)]
    job: PathBuf,

    /// Re-render segments whose output already exists.
    #[arg(long, default_value_t = false)]
    force: bool,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Render job JSON.
    #[arg(long)]
    job: PathBuf,

    /// Segment index (0-based, intro first).
    #[arg(long)]
    index: usize,

    /// Re-render even when the output already exists.
    #[arg(long, default_value_t = false)]
    force: bool,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Render job JSON.
    #[arg(long)]
    job: PathBuf,

    /// Segment index (0-based, intro first).
    #[arg(long)]
    index: usize,

    /// Segment-local time in seconds.
    #[arg(long, default_value_t = 0.0)]
    at: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ConcatArgs {
    /// Directory holding `<index>_<title>.mp4` files.
    #[arg(long)]
    dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Segments(args) => cmd_segments(args),
        Command::Preview(args) => cmd_preview(args),
        Command::Full(args) => cmd_full(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Concat(args) => cmd_concat(args),
    }
}

fn load_job(path: &Path) -> anyhow::Result<RenderJob> {
    RenderJob::from_path(path).with_context(|| format!("load job '{}'", path.display()))
}

fn report(results: &[RenderResult]) -> anyhow::Result<()> {
    for r in results {
        eprintln!("[{:?}] {}", r.status, r.message);
    }
    let failed = results
        .iter()
        .filter(|r| r.status == RenderStatus::Error)
        .count();
    if failed > 0 {
        anyhow::bail!("{failed} of {} exports failed", results.len());
    }
    Ok(())
}

fn cmd_segments(args: SegmentsArgs) -> anyhow::Result<()> {
    let job = load_job(&args.job)?;
    let exporter = Exporter::new(&job)?;
    report(&exporter.export_all_segments(args.force))
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let job = load_job(&args.job)?;
    let exporter = Exporter::new(&job)?;
    report(&[exporter.export_segment(args.index, args.force)])
}

fn cmd_full(args: JobArgs) -> anyhow::Result<()> {
    let job = load_job(&args.job)?;
    let exporter = Exporter::new(&job)?;
    report(&[exporter.export_full()])
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let job = load_job(&args.job)?;
    let exporter = Exporter::new(&job)?;
    exporter
        .preview_frame(args.index, args.at, &args.out)
        .with_context(|| format!("render frame of segment {}", args.index))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_concat(args: ConcatArgs) -> anyhow::Result<()> {
    let out = reelforge::concat_existing(&args.dir)?;
    eprintln!("wrote {}", out.display());
    Ok(())
}
