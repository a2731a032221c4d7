//! Building and running `ffmpeg` calls.

/// `drawtext` filter construction and escaping.
pub mod drawtext;
/// Structured invocations for overlay and preview calls.
pub mod invocation;
/// Process execution behind the [`runner::ToolRunner`] seam.
pub mod runner;
