//! Tool settings. Defaults reproduce the fixed constants of the command-line tools; a JSON file
//! and CLI flags can override them.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use crate::foundation::error::{TextburnError, TextburnResult};
use crate::fonts::{DEFAULT_FONT_DIR, FontResolver};

pub const DEFAULT_FFMPEG: &str = "ffmpeg";
pub const DEFAULT_PREVIEW_DIR: &str = "font_previews";

/// Settings for burning overlays onto a video.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OverlayConfig {
    /// ffmpeg executable (name on `PATH` or a path).
    pub ffmpeg: PathBuf,
    pub fonts: FontResolver,
    pub font_color: String,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from(DEFAULT_FFMPEG),
            fonts: FontResolver::default(),
            font_color: "white".to_string(),
        }
    }
}

impl OverlayConfig {
    pub fn from_path(path: impl AsRef<Path>) -> TextburnResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| TextburnError::io("open config", path, e))?;
        Self::from_reader(BufReader::new(f)).map_err(|e| {
            TextburnError::config(format!("'{}': {e}", path.display()))
        })
    }

    pub fn from_reader(r: impl Read) -> TextburnResult<Self> {
        serde_json::from_reader(r).map_err(|e| TextburnError::config(e.to_string()))
    }
}

/// Settings for rendering font preview clips.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreviewConfig {
    pub ffmpeg: PathBuf,
    pub font_dir: PathBuf,
    pub out_dir: PathBuf,
    pub width: u32,
    pub height: u32,
    pub duration_sec: f64,
    pub background: String,
    pub font_color: String,
    pub font_size: u32,
    /// First line of the clip; the font name is drawn on the second.
    pub sample_text: String,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from(DEFAULT_FFMPEG),
            font_dir: PathBuf::from(DEFAULT_FONT_DIR),
            out_dir: PathBuf::from(DEFAULT_PREVIEW_DIR),
            width: 640,
            height: 480,
            duration_sec: 5.0,
            background: "white".to_string(),
            font_color: "black".to_string(),
            font_size: 48,
            sample_text: "Sample Text".to_string(),
        }
    }
}

impl PreviewConfig {
    pub fn validate(&self) -> TextburnResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(TextburnError::config("preview width/height must be non-zero"));
        }
        if !(self.duration_sec.is_finite() && self.duration_sec > 0.0) {
            return Err(TextburnError::config("preview duration must be positive"));
        }
        Ok(())
    }
}
