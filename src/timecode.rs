//! Human-readable timestamps (`HH:MM:SS`, `MM:SS`, `SS`).

use std::fmt;
use std::num::ParseFloatError;
use std::str::FromStr;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TimecodeError {
    #[error("empty timestamp")]
    Empty,

    #[error("timestamp '{raw}' has {parts} parts, expected at most 3 (HH:MM:SS)")]
    TooManyParts { raw: String, parts: usize },

    #[error("timestamp '{raw}': part '{part}' is not a number: {source}")]
    NotNumeric {
        raw: String,
        part: String,
        #[source]
        source: ParseFloatError,
    },

    #[error("timestamp '{raw}': part '{part}' must be finite and non-negative")]
    OutOfRange { raw: String, part: String },
}

/// Convert `HH:MM:SS`, `MM:SS` or `SS` into seconds.
///
/// Each part may be fractional (`00:01:02.5`).
pub fn parse_seconds(raw: &str) -> Result<f64, TimecodeError> {
    if raw.trim().is_empty() {
        return Err(TimecodeError::Empty);
    }

    let parts: Vec<&str> = raw.split(':').collect();
    if parts.len() > 3 {
        return Err(TimecodeError::TooManyParts {
            raw: raw.to_string(),
            parts: parts.len(),
        });
    }

    let mut total = 0.0;
    for part in parts {
        let trimmed = part.trim();
        let value: f64 = trimmed.parse().map_err(|source| TimecodeError::NotNumeric {
            raw: raw.to_string(),
            part: trimmed.to_string(),
            source,
        })?;
        if !value.is_finite() || value < 0.0 {
            return Err(TimecodeError::OutOfRange {
                raw: raw.to_string(),
                part: trimmed.to_string(),
            });
        }
        // Horner form: h*3600 + m*60 + s for whichever parts are present.
        total = total * 60.0 + value;
    }
    Ok(total)
}

/// Render seconds for an ffmpeg expression; whole values drop the fractional part.
pub fn format_seconds(seconds: f64) -> String {
    format!("{seconds}")
}

/// A parsed timestamp that remembers the text it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct Timecode {
    raw: String,
    seconds: f64,
}

impl Timecode {
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn seconds(&self) -> f64 {
        self.seconds
    }
}

impl FromStr for Timecode {
    type Err = TimecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let seconds = parse_seconds(s)?;
        Ok(Self {
            raw: s.trim().to_string(),
            seconds,
        })
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
