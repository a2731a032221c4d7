//! Font preview clips: one short sample video per font file.

use std::path::{Path, PathBuf};

use crate::config::PreviewConfig;
use crate::ffmpeg::invocation::preview_invocation;
use crate::ffmpeg::runner::ToolRunner;
use crate::fonts::{FontFile, walk_fonts};
use crate::foundation::error::{TextburnError, TextburnResult};

/// What a preview batch produced.
#[derive(Debug, Default)]
pub struct PreviewReport {
    /// Preview clips written, in walk order.
    pub generated: Vec<PathBuf>,
    /// Fonts whose preview failed, with the error message.
    pub failed: Vec<(PathBuf, String)>,
}

impl PreviewReport {
    pub fn total(&self) -> usize {
        self.generated.len() + self.failed.len()
    }
}

/// `<out_dir>/<font file name, spaces replaced by '_'>.mp4`
pub fn preview_output_path(out_dir: &Path, font_path: &Path) -> PathBuf {
    let file_name = font_path
        .file_name()
        .map(|n| n.to_string_lossy().replace(' ', "_"))
        .unwrap_or_default();
    out_dir.join(format!("{file_name}.mp4"))
}

/// Render a preview for every font under `cfg.font_dir`.
///
/// A failing font is logged and recorded in the report; the batch carries on with the next one.
/// Only a bad configuration or an uncreatable output directory fails the whole call.
#[tracing::instrument(skip_all, fields(font_dir = %cfg.font_dir.display(), out_dir = %cfg.out_dir.display()))]
pub fn generate_previews(
    runner: &mut dyn ToolRunner,
    cfg: &PreviewConfig,
) -> TextburnResult<PreviewReport> {
    cfg.validate()?;
    std::fs::create_dir_all(&cfg.out_dir)
        .map_err(|e| TextburnError::io("create preview directory", &cfg.out_dir, e))?;

    let mut report = PreviewReport::default();
    for font in walk_fonts(&cfg.font_dir) {
        match render_preview(runner, cfg, &font) {
            Ok(path) => {
                tracing::info!(font = %font.name, output = %path.display(), "created preview");
                report.generated.push(path);
            }
            Err(e) => {
                tracing::warn!(font = %font.name, error = %e, "failed to create preview");
                report.failed.push((font.path, e.to_string()));
            }
        }
    }

    tracing::info!(
        generated = report.generated.len(),
        failed = report.failed.len(),
        "font previews finished"
    );
    Ok(report)
}

fn render_preview(
    runner: &mut dyn ToolRunner,
    cfg: &PreviewConfig,
    font: &FontFile,
) -> TextburnResult<PathBuf> {
    let output = preview_output_path(&cfg.out_dir, &font.path);
    let invocation = preview_invocation(cfg, font, &output);
    tracing::debug!(command = %invocation, "built preview command");
    runner.run(&invocation)?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_name_keeps_extension_and_replaces_spaces() {
        assert_eq!(
            preview_output_path(Path::new("font_previews"), Path::new("/f/Noto Sans Mono.ttf")),
            PathBuf::from("font_previews/Noto_Sans_Mono.ttf.mp4")
        );
    }
}
