use std::path::PathBuf;

use crate::ffmpeg::runner::ToolError;
use crate::fonts::FontError;
use crate::script::ScriptError;
use crate::timecode::TimecodeError;

pub type TextburnResult<T> = Result<T, TextburnError>;

#[derive(thiserror::Error, Debug)]
pub enum TextburnError {
    #[error("timecode error: {0}")]
    Timecode(#[from] TimecodeError),

    #[error("script error: {0}")]
    Script(#[from] ScriptError),

    #[error("font error: {0}")]
    Font(#[from] FontError),

    #[error("tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("io error: {context} '{}': {source}", .path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TextburnError {
    pub fn io(context: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            context,
            path: path.into(),
            source,
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
