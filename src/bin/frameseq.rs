use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use frameseq::{
    BatchEngine, EncodeFormat, EngineConfig, FrameCount, FrameIndexRange, FramePattern,
    IMAGE_EXTENSIONS, ListSelection, LoadedBatch, LogProgress, SecurityRoot, VIDEO_EXTENSIONS,
};

#[derive(Parser, Debug)]
#[command(name = "frameseq", version)]
struct Cli {
    /// JSON engine config. Command-line flags override its values.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Worker threads (default: twice the available parallelism).
    #[arg(long, global = true)]
    threads: Option<usize>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List image or video files in a directory.
    List(ListArgs),
    /// Load a numbered sequence and print its shape.
    Load(LoadArgs),
    /// Load an explicit list of files and print its shape.
    LoadList(LoadListArgs),
    /// Load a numbered sequence and save it under another pattern.
    Convert(ConvertArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MediaKind {
    Image,
    Video,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Webp,
    Png,
}

#[derive(Parser, Debug)]
struct ListArgs {
    /// Directory to search from.
    #[arg(long)]
    root: PathBuf,

    /// Subdirectory of `root` to list.
    #[arg(long, default_value = "")]
    subfolder: String,

    /// Which extensions to accept.
    #[arg(long, value_enum, default_value_t = MediaKind::Image)]
    kind: MediaKind,

    /// Descend into subdirectories.
    #[arg(long)]
    recursive: bool,

    /// Case-insensitive file name substring (`*` matches everything).
    #[arg(long)]
    filter: Option<String>,

    /// Keep at most this many paths (0 keeps all).
    #[arg(long)]
    cap: Option<usize>,
}

#[derive(Parser, Debug)]
struct SequenceArgs {
    /// Path pattern with one index placeholder, e.g. `frames/f_{:04d}.png`.
    #[arg(long)]
    pattern: String,

    /// First frame index.
    #[arg(long, default_value_t = 0)]
    start: u64,

    /// Number of frames (0 detects the contiguous run on disk).
    #[arg(long, default_value_t = 0)]
    count: u64,

    /// Index stride.
    #[arg(long, default_value_t = 1)]
    step: u64,

    /// Drop missing files instead of failing (fixed counts only).
    #[arg(long = "ignore-missing")]
    tolerant: bool,
}

#[derive(Parser, Debug)]
struct LoadArgs {
    #[command(flatten)]
    seq: SequenceArgs,
}

#[derive(Parser, Debug)]
struct LoadListArgs {
    /// Files to load, in order.
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// First position in the list.
    #[arg(long, default_value_t = 0)]
    start: usize,

    /// Exclusive end position (default: end of list).
    #[arg(long)]
    end: Option<usize>,

    /// Position stride.
    #[arg(long, default_value_t = 1)]
    step: usize,
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    #[command(flatten)]
    seq: SequenceArgs,

    /// Directory every output must stay inside.
    #[arg(long = "root")]
    out_root: PathBuf,

    /// Output pattern, relative to `out_root`.
    #[arg(long)]
    out_pattern: String,

    /// Index given to the first saved frame.
    #[arg(long, default_value_t = 0)]
    out_start: u64,

    /// Output container.
    #[arg(long, value_enum)]
    format: Option<FormatChoice>,

    /// Lossless encoding.
    #[arg(long)]
    lossless: bool,

    /// Lossy quality (1-100).
    #[arg(long)]
    quality: Option<u8>,

    /// Compression effort (0-6).
    #[arg(long)]
    method: Option<u8>,

    /// Write every frame even if identical to an earlier one.
    #[arg(long)]
    no_dedup: bool,

    /// Keep files that already exist.
    #[arg(long)]
    no_overwrite: bool,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_path(path)?,
        None => EngineConfig::default(),
    };
    if let Some(threads) = cli.threads {
        config = config.threads(threads);
    }
    match cli.cmd {
        Command::List(args) => cmd_list(config, args),
        Command::Load(args) => cmd_load(config, args),
        Command::LoadList(args) => cmd_load_list(config, args),
        Command::Convert(args) => cmd_convert(config, args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_list(mut config: EngineConfig, args: ListArgs) -> anyhow::Result<()> {
    if args.recursive {
        config = config.recursive(true);
    }
    if let Some(filter) = args.filter {
        config = config.filter(filter);
    }
    if let Some(cap) = args.cap {
        config = config.cap(cap);
    }
    let extensions = match args.kind {
        MediaKind::Image => IMAGE_EXTENSIONS,
        MediaKind::Video => VIDEO_EXTENSIONS,
    };

    let engine = BatchEngine::new(config)?;
    let listing = engine.list(&args.root, &args.subfolder, extensions)?;
    for path in &listing.paths {
        println!("{}", path.display());
    }
    eprintln!("{} file(s)", listing.count);
    Ok(())
}

fn load_sequence(engine: &BatchEngine, seq: &SequenceArgs) -> anyhow::Result<LoadedBatch> {
    let pattern = FramePattern::parse(&seq.pattern)?;
    let range = FrameIndexRange::new(seq.start, FrameCount::from_host(seq.count), seq.step)?;
    let progress = LogProgress::new("load", 25);
    Ok(engine.load_sequence(&pattern, &range, &progress)?)
}

fn print_loaded(loaded: &LoadedBatch) {
    let [b, h, w, c] = loaded.frames.shape();
    println!("frames: {}", loaded.frame_count);
    println!("shape: [{b}, {h}, {w}, {c}]");
}

fn cmd_load(mut config: EngineConfig, args: LoadArgs) -> anyhow::Result<()> {
    if args.seq.tolerant {
        config = config.tolerant(true);
    }
    let engine = BatchEngine::new(config)?;
    let loaded = load_sequence(&engine, &args.seq)?;
    print_loaded(&loaded);
    Ok(())
}

fn cmd_load_list(config: EngineConfig, args: LoadListArgs) -> anyhow::Result<()> {
    let engine = BatchEngine::new(config)?;
    let selection = ListSelection {
        start: args.start,
        end: args.end,
        step: args.step,
    };
    let progress = LogProgress::new("load-list", 25);
    let loaded = engine.load_list(&args.paths, selection, &progress)?;
    print_loaded(&loaded);
    Ok(())
}

fn cmd_convert(mut config: EngineConfig, args: ConvertArgs) -> anyhow::Result<()> {
    if args.seq.tolerant {
        config = config.tolerant(true);
    }
    if let Some(format) = args.format {
        config = config.format(match format {
            FormatChoice::Webp => EncodeFormat::WebP,
            FormatChoice::Png => EncodeFormat::Png,
        });
    }
    if args.lossless {
        config = config.lossless(true);
    }
    if let Some(quality) = args.quality {
        config = config.quality(quality);
    }
    if let Some(method) = args.method {
        config = config.method(method);
    }
    if args.no_dedup {
        config = config.dedup(false);
    }
    if args.no_overwrite {
        config = config.overwrite(false);
    }

    let engine = BatchEngine::new(config)?;
    let loaded = load_sequence(&engine, &args.seq)?;

    let root = SecurityRoot::new(&args.out_root)
        .with_context(|| format!("output root '{}'", args.out_root.display()))?;
    let out_pattern = FramePattern::parse(&args.out_pattern)?;
    let progress = LogProgress::new("save", 25);
    let saved =
        engine.save_sequence(&loaded.frames, &out_pattern, args.out_start, &root, &progress)?;

    for path in &saved.paths {
        println!("{}", path.display());
    }
    eprintln!(
        "wrote {} of {} frame(s) ({} duplicate, {} kept)",
        saved.stats.frames_written,
        saved.stats.frames_total,
        saved.stats.frames_deduplicated,
        saved.stats.frames_skipped_existing
    );
    Ok(())
}
