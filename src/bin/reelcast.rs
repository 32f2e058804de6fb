use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use reelcast::{
    CompositionInputs, FrameIndex, Registry, RenderRequest, RenderSession, RenderSessionOpts,
};

#[derive(Parser, Debug)]
#[command(name = "reelcast", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the registered compositions.
    List,
    /// Print the evaluated state of a single frame as JSON.
    Frame(FrameArgs),
    /// Evaluate every frame and write the frame plan as JSON lines.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Composition id, e.g. `Slides`.
    #[arg(long)]
    composition: String,

    /// Input parameters JSON; defaults to the composition's own.
    #[arg(long)]
    inputs: Option<PathBuf>,

    /// Frame index (0-based). Frames past the end are clamped.
    #[arg(long)]
    frame: u64,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Composition id, e.g. `Slides`.
    #[arg(long)]
    composition: String,

    /// Input parameters JSON; defaults to the composition's own.
    #[arg(long)]
    inputs: Option<PathBuf>,

    /// Output JSONL path.
    #[arg(long)]
    out: PathBuf,

    /// Evaluate frames on a rayon pool.
    #[arg(long)]
    parallel: bool,

    /// Worker threads when `--parallel` is set.
    #[arg(long)]
    threads: Option<usize>,

    /// Replace an existing output file.
    #[arg(long)]
    overwrite: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let registry = Registry::with_builtin_catalog().context("load composition catalog")?;
    match cli.cmd {
        Command::List => cmd_list(&registry),
        Command::Frame(args) => cmd_frame(&registry, args),
        Command::Render(args) => cmd_render(&registry, args),
    }
}

fn read_inputs(path: &Path) -> anyhow::Result<CompositionInputs> {
    let f = File::open(path).with_context(|| format!("open inputs '{}'", path.display()))?;
    let inputs: CompositionInputs = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parse inputs JSON '{}'", path.display()))?;
    inputs.validate()?;
    Ok(inputs)
}

fn cmd_list(registry: &Registry) -> anyhow::Result<()> {
    for d in registry.iter() {
        println!(
            "{}\t{}x{}\t{} fps\t{} frames\t{:?}",
            d.id,
            d.canvas.width,
            d.canvas.height,
            d.fps.as_f64(),
            d.duration_frames,
            d.input_kind
        );
    }
    Ok(())
}

fn cmd_frame(registry: &Registry, args: FrameArgs) -> anyhow::Result<()> {
    let inputs = args.inputs.as_deref().map(read_inputs).transpose()?;
    let session = RenderSession::from_registry(
        registry,
        &args.composition,
        inputs.as_ref(),
        RenderSessionOpts::default(),
    )
    .with_context(|| format!("build composition '{}'", args.composition))?;

    let state = session.eval_frame(FrameIndex(args.frame));
    let json = serde_json::to_string_pretty(&state).context("serialize frame state")?;
    println!("{json}");
    Ok(())
}

fn cmd_render(registry: &Registry, args: RenderArgs) -> anyhow::Result<()> {
    let inputs = args.inputs.as_deref().map(read_inputs).transpose()?;
    let request = RenderRequest {
        composition_id: args.composition,
        inputs,
        output_path: args.out,
        overwrite: args.overwrite,
    };
    let opts = RenderSessionOpts {
        parallel: args.parallel,
        threads: args.threads,
        ..RenderSessionOpts::default()
    };

    let stats = reelcast::render(registry, &request, opts)
        .with_context(|| format!("render '{}'", request.composition_id))?;

    eprintln!(
        "wrote {} ({} frames, {} clamped)",
        request.output_path.display(),
        stats.frames_total,
        stats.boundary_warnings
    );
    Ok(())
}
