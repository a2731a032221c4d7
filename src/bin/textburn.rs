use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser;
use textburn::fonts::DEFAULT_FONT_DIR;
use textburn::{FontResolver, OverlayConfig, ProcessRunner};

/// Add text overlays to a video sequentially.
#[derive(Parser, Debug)]
#[command(name = "textburn", version)]
struct Cli {
    /// Path to the input video file.
    input_video: PathBuf,

    /// Path to the text file with overlay instructions.
    text_file: PathBuf,

    /// Path for the final output video file.
    output_video: PathBuf,

    /// JSON settings file (ffmpeg path, font resolution, text colour).
    #[arg(long)]
    config: Option<PathBuf>,

    /// ffmpeg executable to use.
    #[arg(long)]
    ffmpeg: Option<PathBuf>,

    /// Directory that holds `<font>.<ext>` files.
    #[arg(long, conflicts_with = "search_fonts")]
    font_dir: Option<PathBuf>,

    /// Extension appended to bare font names.
    #[arg(long, conflicts_with = "search_fonts")]
    font_ext: Option<String>,

    /// Find fonts by name anywhere under this directory (any of ttf/otf/ttc).
    #[arg(long, value_name = "DIR")]
    search_fonts: Option<PathBuf>,

    /// Overlay text colour.
    #[arg(long)]
    font_color: Option<String>,

    /// More logging (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    textburn::logging::init(textburn::logging::level_for(cli.quiet, cli.verbose));

    tracing::info!("starting video processing");
    match run(cli) {
        Ok(()) => {
            tracing::info!("video processing completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("video processing failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cfg = resolve_config(&cli)?;

    let overlays = textburn::parse_script_file(&cli.text_file)
        .with_context(|| format!("parse overlay script '{}'", cli.text_file.display()))?;

    cfg.fonts.warn_if_fixed_extension();
    anyhow::ensure!(
        textburn::is_tool_on_path(&cfg.ffmpeg),
        "'{}' was not found or does not run (is ffmpeg installed and on PATH?)",
        cfg.ffmpeg.display()
    );

    let stats = textburn::burn_overlays(
        &mut ProcessRunner,
        &cfg,
        &cli.input_video,
        &overlays,
        &cli.output_video,
    )?;
    tracing::info!(
        overlays = stats.overlays_applied,
        output = %stats.output.display(),
        "all overlays applied"
    );
    Ok(())
}

fn resolve_config(cli: &Cli) -> anyhow::Result<OverlayConfig> {
    let mut cfg = match &cli.config {
        Some(path) => OverlayConfig::from_path(path)?,
        None => OverlayConfig::default(),
    };

    if let Some(ffmpeg) = &cli.ffmpeg {
        cfg.ffmpeg = ffmpeg.clone();
    }
    if let Some(color) = &cli.font_color {
        cfg.font_color = color.clone();
    }
    if let Some(dir) = &cli.search_fonts {
        cfg.fonts = FontResolver::Search { dir: dir.clone() };
    } else if cli.font_dir.is_some() || cli.font_ext.is_some() {
        let (dir, extension) = match &cfg.fonts {
            FontResolver::Directory { dir, extension } => (dir.clone(), extension.clone()),
            FontResolver::Search { .. } => (PathBuf::from(DEFAULT_FONT_DIR), "ttf".to_string()),
        };
        cfg.fonts = FontResolver::Directory {
            dir: cli.font_dir.clone().unwrap_or(dir),
            extension: cli.font_ext.clone().unwrap_or(extension),
        };
    }
    Ok(cfg)
}
