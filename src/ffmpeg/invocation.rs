use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::{OverlayConfig, PreviewConfig};
use crate::ffmpeg::drawtext::{DrawText, between_expr};
use crate::fonts::{FontError, FontFile};
use crate::script::OverlaySpec;
use crate::timecode::format_seconds;

const COMMON_ARGS: [&str; 5] = ["-nostdin", "-hide_banner", "-loglevel", "error", "-y"];

/// One external tool call as a structured argument list. Nothing is ever passed through a shell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(&mut self, arg: impl AsRef<OsStr>) -> &mut Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for a in args {
            self.arg(a);
        }
        self
    }

    /// Path following the first `-i`.
    pub fn input_path(&self) -> Option<&Path> {
        let pos = self.args.iter().position(|a| a == "-i")?;
        self.args.get(pos + 1).map(Path::new)
    }

    /// Output file: the final argument.
    pub fn output_path(&self) -> Option<&Path> {
        self.args.last().map(Path::new)
    }

    /// Value following `flag`, as text.
    pub fn flag_value(&self, flag: &str) -> Option<String> {
        let pos = self.args.iter().position(|a| a == flag)?;
        self.args
            .get(pos + 1)
            .map(|v| v.to_string_lossy().into_owned())
    }

    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words: Vec<String> = std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(OsString::as_os_str))
            .map(|w| w.to_string_lossy().into_owned())
            .collect();
        match shlex::try_join(words.iter().map(String::as_str)) {
            Ok(line) => f.write_str(&line),
            // Only fails on NUL bytes; fall back to a debug rendering for the log line.
            Err(_) => write!(f, "{words:?}"),
        }
    }
}

fn push_common(inv: &mut Invocation) {
    inv.args(COMMON_ARGS);
}

/// Build the call that draws exactly one overlay onto `input` and writes `output`.
///
/// The overlay text is read by ffmpeg from `text_file`; audio is copied unchanged.
pub fn overlay_invocation(
    cfg: &OverlayConfig,
    input: &Path,
    text_file: &Path,
    overlay: &OverlaySpec,
    output: &Path,
) -> Result<Invocation, FontError> {
    let font_path = cfg.fonts.resolve(&overlay.font)?;
    Ok(overlay_invocation_with_font(
        cfg, input, text_file, overlay, &font_path, output,
    ))
}

/// Same as [`overlay_invocation`] with the overlay's font already resolved to `font_path`.
pub fn overlay_invocation_with_font(
    cfg: &OverlayConfig,
    input: &Path,
    text_file: &Path,
    overlay: &OverlaySpec,
    font_path: &Path,
    output: &Path,
) -> Invocation {
    let start = format_seconds(overlay.start.seconds());
    let end = format_seconds(overlay.end.seconds());

    let filter = DrawText::new()
        .path("fontfile", font_path)
        .path("textfile", text_file)
        .int("x", overlay.x)
        .int("y", overlay.y)
        .int("fontsize", overlay.font_size)
        .value("fontcolor", &cfg.font_color)
        .expr("enable", between_expr(&start, &end))
        .build();

    let mut inv = Invocation::new(&cfg.ffmpeg);
    push_common(&mut inv);
    inv.arg("-i")
        .arg(input)
        .arg("-filter:v")
        .arg(&filter)
        .args(["-codec:a", "copy"])
        .arg(output);
    inv
}

/// Build the call that renders a solid-background sample clip naming `font`.
pub fn preview_invocation(cfg: &PreviewConfig, font: &FontFile, output: &Path) -> Invocation {
    let source = format!(
        "color=c={}:s={}x{}:d={}",
        cfg.background,
        cfg.width,
        cfg.height,
        format_seconds(cfg.duration_sec)
    );
    let filter = DrawText::new()
        .path("fontfile", &font.path)
        .value("text", format!("{}\n{}", cfg.sample_text, font.name))
        .value("expansion", "none")
        .int("fontsize", cfg.font_size)
        .value("fontcolor", &cfg.font_color)
        .expr("x", "(w-text_w)/2")
        .expr("y", "(h-text_h)/2")
        .build();

    let mut inv = Invocation::new(&cfg.ffmpeg);
    push_common(&mut inv);
    inv.args(["-f", "lavfi", "-i"])
        .arg(&source)
        .arg("-vf")
        .arg(&filter)
        .arg(output);
    inv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlay(src: &str) -> OverlaySpec {
        crate::script::parse_script_reader(src.as_bytes())
            .unwrap()
            .remove(0)
    }

    #[test]
    fn overlay_call_has_window_position_and_size() {
        let cfg = OverlayConfig::default();
        let o = overlay("00:00:00,00:00:05,\"Hello\",10,20,Arial,24");
        let inv = overlay_invocation(
            &cfg,
            Path::new("/tmp/w/source.mp4"),
            Path::new("/tmp/w/text_0.txt"),
            &o,
            Path::new("/tmp/w/step_0.mp4"),
        )
        .unwrap();

        assert_eq!(inv.program, PathBuf::from("ffmpeg"));
        assert_eq!(inv.input_path(), Some(Path::new("/tmp/w/source.mp4")));
        assert_eq!(inv.output_path(), Some(Path::new("/tmp/w/step_0.mp4")));
        assert_eq!(inv.flag_value("-codec:a").as_deref(), Some("copy"));

        let filter = inv.flag_value("-filter:v").unwrap();
        assert!(filter.starts_with("drawtext="));
        assert!(filter.contains("fontfile=/usr/share/fonts/truetype/Arial.ttf"));
        assert!(filter.contains("textfile=/tmp/w/text_0.txt"));
        assert!(filter.contains("x=10:y=20"));
        assert!(filter.contains("fontsize=24"));
        assert!(filter.contains("fontcolor=white"));
        assert!(filter.contains("enable='between(t,0,5)'"));
        // Text comes from the file, never inline.
        assert!(!filter.contains("Hello"));
    }

    #[test]
    fn overlay_window_uses_seconds() {
        let cfg = OverlayConfig::default();
        let o = overlay("00:01:00.5,01:00:00,t,0,0,Arial,10");
        let inv = overlay_invocation(
            &cfg,
            Path::new("in.mp4"),
            Path::new("t.txt"),
            &o,
            Path::new("out.mp4"),
        )
        .unwrap();
        assert!(
            inv.flag_value("-filter:v")
                .unwrap()
                .contains("between(t,60.5,3600)")
        );
    }

    #[test]
    fn hostile_names_stay_single_arguments() {
        let cfg = OverlayConfig::default();
        let o = overlay("0,1,t,0,0,Arial,10");
        let input = Path::new("/tmp/my video; rm -rf ~.mp4");
        let inv =
            overlay_invocation(&cfg, input, Path::new("t.txt"), &o, Path::new("o.mp4")).unwrap();
        assert_eq!(inv.input_path(), Some(input));
        let words = shlex::split(&inv.to_string()).unwrap();
        assert!(words.iter().any(|w| w == "/tmp/my video; rm -rf ~.mp4"));
    }

    #[test]
    fn unresolvable_font_fails_before_any_call() {
        let cfg = OverlayConfig {
            fonts: crate::fonts::FontResolver::Search {
                dir: PathBuf::from("/definitely/missing"),
            },
            ..OverlayConfig::default()
        };
        let o = overlay("0,1,t,0,0,Arial,10");
        let err = overlay_invocation(&cfg, Path::new("i"), Path::new("t"), &o, Path::new("o"))
            .unwrap_err();
        assert!(matches!(err, FontError::NotFound { .. }));
    }

    #[test]
    fn pre_resolved_font_is_used_as_given() {
        let cfg = OverlayConfig::default();
        let o = overlay("0,1,t,0,0,Arial,10");
        let inv = overlay_invocation_with_font(
            &cfg,
            Path::new("i.mp4"),
            Path::new("t.txt"),
            &o,
            Path::new("/opt/fonts/Arial.otf"),
            Path::new("o.mp4"),
        );
        let filter = inv.flag_value("-filter:v").unwrap();
        assert!(filter.contains("fontfile=/opt/fonts/Arial.otf:"));
    }

    #[test]
    fn preview_call_centres_name_on_solid_clip() {
        let cfg = PreviewConfig::default();
        let font = FontFile::from_path("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf");
        let inv = preview_invocation(&cfg, &font, Path::new("font_previews/DejaVuSans.ttf.mp4"));

        assert_eq!(inv.flag_value("-f").as_deref(), Some("lavfi"));
        assert_eq!(
            inv.flag_value("-i").as_deref(),
            Some("color=c=white:s=640x480:d=5")
        );
        let filter = inv.flag_value("-vf").unwrap();
        assert!(filter.contains("fontfile=/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"));
        assert!(filter.contains("text=Sample Text\nDejaVuSans"));
        assert!(filter.contains("fontsize=48:fontcolor=black"));
        assert!(filter.contains("x='(w-text_w)/2':y='(h-text_h)/2'"));
        assert!(!inv.args.iter().any(|a| a == "-codec:a"));
    }
}
