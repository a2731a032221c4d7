//! Sequential overlay composition.
//!
//! Overlays are applied one ffmpeg call at a time, in script order. Each step reads the previous
//! step's output, so the working video is a single owned path handed from step to step. All
//! intermediate files live in a scratch directory that is removed when the run ends, whatever
//! the outcome.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::OverlayConfig;
use crate::ffmpeg::invocation::overlay_invocation_with_font;
use crate::ffmpeg::runner::ToolRunner;
use crate::fonts::FontError;
use crate::foundation::error::{TextburnError, TextburnResult};
use crate::script::OverlaySpec;

const DEFAULT_VIDEO_EXT: &str = "mp4";

/// Summary of a successful run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BurnStats {
    pub overlays_applied: usize,
    pub output: PathBuf,
}

/// Burn `overlays` onto `input` and write the result to `output`.
///
/// `input` is never modified. Every overlay's font is resolved before any file is touched. If any
/// step fails the remaining steps are skipped and `output` is left untouched.
#[tracing::instrument(
    skip_all,
    fields(input = %input.display(), output = %output.display(), overlays = overlays.len())
)]
pub fn burn_overlays(
    runner: &mut dyn ToolRunner,
    cfg: &OverlayConfig,
    input: &Path,
    overlays: &[OverlaySpec],
    output: &Path,
) -> TextburnResult<BurnStats> {
    let fonts = resolve_fonts(cfg, overlays)?;

    let workdir = tempfile::Builder::new()
        .prefix("textburn-")
        .tempdir()
        .map_err(|e| TextburnError::io("create scratch directory", std::env::temp_dir(), e))?;
    tracing::debug!(workdir = %workdir.path().display(), "created scratch directory");

    let ext = input
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .unwrap_or(DEFAULT_VIDEO_EXT);

    let source = workdir.path().join(format!("source.{ext}"));
    std::fs::copy(input, &source).map_err(|e| TextburnError::io("copy input video", input, e))?;
    let mut working: PathBuf = source;

    for (idx, (overlay, font)) in overlays.iter().zip(&fonts).enumerate() {
        working = apply_overlay(runner, cfg, workdir.path(), ext, idx, overlay, font, working)?;
    }

    ensure_parent_dir(output)?;
    std::fs::copy(&working, output).map_err(|e| TextburnError::io("save output video", output, e))?;
    tracing::info!(output = %output.display(), "output video saved");

    // Dropping `workdir` removes every intermediate file.
    Ok(BurnStats {
        overlays_applied: overlays.len(),
        output: output.to_path_buf(),
    })
}

/// Resolve the font of every overlay, in order. Each distinct name is resolved once.
fn resolve_fonts(cfg: &OverlayConfig, overlays: &[OverlaySpec]) -> Result<Vec<PathBuf>, FontError> {
    let mut cache: HashMap<&str, PathBuf> = HashMap::new();
    overlays
        .iter()
        .map(|overlay| -> Result<PathBuf, FontError> {
            if let Some(path) = cache.get(overlay.font.as_str()) {
                return Ok(path.clone());
            }
            let path = cfg.fonts.resolve(&overlay.font)?;
            tracing::debug!(font = %overlay.font, path = %path.display(), "resolved font");
            cache.insert(&overlay.font, path.clone());
            Ok(path)
        })
        .collect()
}

/// Apply one overlay on top of `working`, returning the new working video.
#[allow(clippy::too_many_arguments)]
fn apply_overlay(
    runner: &mut dyn ToolRunner,
    cfg: &OverlayConfig,
    workdir: &Path,
    ext: &str,
    idx: usize,
    overlay: &OverlaySpec,
    font: &Path,
    working: PathBuf,
) -> TextburnResult<PathBuf> {
    tracing::debug!(idx, text = %overlay.text, "processing text overlay");

    let text_file = workdir.join(format!("text_{idx}.txt"));
    std::fs::write(&text_file, &overlay.text)
        .map_err(|e| TextburnError::io("write overlay text", &text_file, e))?;
    tracing::debug!(idx, text_file = %text_file.display(), "wrote overlay text");

    let step_output = workdir.join(format!("step_{idx}.{ext}"));
    let invocation =
        overlay_invocation_with_font(cfg, &working, &text_file, overlay, font, &step_output);
    tracing::debug!(idx, command = %invocation, "built overlay command");

    runner.run(&invocation).inspect_err(|e| {
        tracing::error!(idx, error = %e, "overlay step failed");
    })?;

    tracing::info!(
        idx,
        start = %overlay.start,
        end = %overlay.end,
        "applied overlay"
    );
    Ok(step_output)
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> TextburnResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .map_err(|e| TextburnError::io("create output directory", parent, e))?;
    }
    Ok(())
}
