//! textburn drives the system `ffmpeg` to burn timed text overlays onto a video and to render
//! font preview clips.
//!
//! - Parse an overlay script with [`parse_script_file`]
//! - Burn the overlays one ffmpeg call at a time with [`burn_overlays`]
//! - Render a sample clip per installed font with [`generate_previews`]
#![forbid(unsafe_code)]

mod foundation;

pub mod compose;
pub mod config;
pub mod ffmpeg;
pub mod fonts;
pub mod logging;
pub mod preview;
pub mod script;
pub mod timecode;

pub use crate::compose::{BurnStats, burn_overlays, ensure_parent_dir};
pub use crate::config::{OverlayConfig, PreviewConfig};
pub use crate::ffmpeg::invocation::{
    Invocation, overlay_invocation, overlay_invocation_with_font, preview_invocation,
};
pub use crate::ffmpeg::runner::{
    ProcessRunner, RecordingRunner, ToolError, ToolRunner, is_tool_on_path,
};
pub use crate::fonts::{FontError, FontFile, FontResolver, FontWalk, walk_fonts};
pub use crate::foundation::error::{TextburnError, TextburnResult};
pub use crate::preview::{PreviewReport, generate_previews, preview_output_path};
pub use crate::script::{OverlaySpec, ScriptError, parse_script_file, parse_script_reader};
pub use crate::timecode::{Timecode, TimecodeError, parse_seconds};
