use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;

use paracoord::{
    AnimationEncoder, CancelToken, FrameRenderer, OutputDirs, Pipeline, RenderStyle, RunOptions,
    TextRenderer, Toolchain,
};

// No interrupt handler is installed: Ctrl+C ends the process at once, and the run being
// encoded when it arrives may leave a partial file behind.

/// Render parallel-coordinates animations of optimization runs.
#[derive(Parser, Debug)]
#[command(
    name = "paracoord",
    version,
    after_help = "Ctrl+C stops immediately; the animation being written may be incomplete."
)]
struct Cli {
    /// Directory containing `run<R>_gen<G>.pos` files.
    #[arg(long, default_value = ".")]
    input_dir: PathBuf,

    /// Output root; animations go to `<media-dir>/gifs` and `<media-dir>/mp4s`.
    #[arg(long, default_value = "media")]
    media_dir: PathBuf,

    /// Total duration of each animation in seconds (invalid values fall back to 5).
    #[arg(short = 'd', long = "duration", allow_hyphen_values = true)]
    duration_secs: Option<String>,

    /// Only render every N-th generation file of a run (invalid values fall back to 1).
    #[arg(short = 's', long, allow_hyphen_values = true)]
    stepping: Option<String>,

    /// Show the hypervolume from each generation's `.hv` file.
    #[arg(short = 'H', long = "hypervolume")]
    show_hypervolume: bool,

    /// Font used for header, footer and scale labels.
    #[arg(long)]
    font: Option<PathBuf>,

    /// JSON file overriding the default drawing style.
    #[arg(long)]
    style: Option<PathBuf>,

    /// Log debug output.
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = RunOptions::resolve(
        cli.duration_secs.as_deref(),
        cli.stepping.as_deref(),
        cli.show_hypervolume,
    );
    let style = match cli.style.as_deref() {
        Some(path) => RenderStyle::from_json_file(path)?,
        None => RenderStyle::default(),
    };
    let text = load_text(cli.font.as_deref())?;
    let renderer = FrameRenderer::new(style, text)?;

    let toolchain = Toolchain::detect();
    let mut pipeline = Pipeline {
        options,
        dirs: OutputDirs::under(&cli.media_dir),
        renderer,
        encoder: AnimationEncoder::from_toolchain(&toolchain),
        cancel: CancelToken::new(),
    };

    let artifacts = pipeline
        .run_dir(&cli.input_dir)
        .with_context(|| format!("processing '{}'", cli.input_dir.display()))?;

    for a in &artifacts {
        eprintln!("wrote {}", a.gif.display());
        if let Some(mp4) = &a.mp4 {
            eprintln!("wrote {}", mp4.display());
        }
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// An explicit `--font` must load; otherwise the first system font is used, or none.
fn load_text(font: Option<&Path>) -> anyhow::Result<Option<TextRenderer>> {
    if let Some(path) = font {
        let text = TextRenderer::from_file(path)
            .with_context(|| format!("load font '{}'", path.display()))?;
        return Ok(Some(text));
    }
    let Some(path) = TextRenderer::find_system_font() else {
        tracing::warn!("no usable system font found; frames will be drawn without text");
        return Ok(None);
    };
    match TextRenderer::from_file(&path) {
        Ok(text) => {
            tracing::debug!(font = %path.display(), family = text.family_name(), "loaded font");
            Ok(Some(text))
        }
        Err(err) => {
            tracing::warn!("{err}; frames will be drawn without text");
            Ok(None)
        }
    }
}
