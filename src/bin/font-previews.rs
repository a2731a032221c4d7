use std::path::PathBuf;

use clap::Parser;
use textburn::{PreviewConfig, ProcessRunner};

/// Render a short sample clip for every font file in a directory tree.
#[derive(Parser, Debug)]
#[command(name = "font-previews", version)]
struct Cli {
    /// Font directory to walk.
    #[arg(long)]
    font_dir: Option<PathBuf>,

    /// Where preview clips are written.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// ffmpeg executable to use.
    #[arg(long)]
    ffmpeg: Option<PathBuf>,

    /// More logging (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long)]
    quiet: bool,
}

// Per-font failures are reported in the log only; the process always exits 0.
fn main() {
    let cli = Cli::parse();
    textburn::logging::init(textburn::logging::level_for(cli.quiet, cli.verbose));

    let mut cfg = PreviewConfig::default();
    if let Some(dir) = cli.font_dir {
        cfg.font_dir = dir;
    }
    if let Some(dir) = cli.out_dir {
        cfg.out_dir = dir;
    }
    if let Some(ffmpeg) = cli.ffmpeg {
        cfg.ffmpeg = ffmpeg;
    }

    match textburn::generate_previews(&mut ProcessRunner, &cfg) {
        Ok(report) => {
            tracing::info!(
                generated = report.generated.len(),
                total = report.total(),
                out_dir = %cfg.out_dir.display(),
                "done"
            );
        }
        Err(e) => tracing::error!("font previews failed: {e}"),
    }
}
