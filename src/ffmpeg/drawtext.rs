use std::fmt::Write as _;
use std::path::Path;

/// Builder for a single `drawtext` filter expression.
///
/// Values go through two escaping levels: the filter option parser (`\ ' :`) and the filtergraph
/// parser (`\ ' [ ] , ;`). Expressions are single-quoted instead, which keeps their commas intact.
#[derive(Clone, Debug, Default)]
pub struct DrawText {
    options: Vec<(&'static str, String)>,
}

impl DrawText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Literal value (text, colour, ...), escaped for both parser levels.
    pub fn value(mut self, key: &'static str, value: impl AsRef<str>) -> Self {
        self.options.push((key, escape_filter_value(value.as_ref())));
        self
    }

    pub fn path(self, key: &'static str, path: &Path) -> Self {
        self.value(key, path.to_string_lossy())
    }

    pub fn int(mut self, key: &'static str, value: impl Into<i64>) -> Self {
        self.options.push((key, value.into().to_string()));
        self
    }

    /// ffmpeg expression such as `between(t,0,5)`; must not contain `'`.
    pub fn expr(mut self, key: &'static str, expr: impl AsRef<str>) -> Self {
        debug_assert!(!expr.as_ref().contains('\''));
        self.options.push((key, format!("'{}'", expr.as_ref())));
        self
    }

    pub fn build(&self) -> String {
        let mut out = String::from("drawtext=");
        for (i, (key, value)) in self.options.iter().enumerate() {
            if i > 0 {
                out.push(':');
            }
            let _ = write!(out, "{key}={value}");
        }
        out
    }
}

/// `enable` predicate for an inclusive time window.
pub fn between_expr(start: &str, end: &str) -> String {
    format!("between(t,{start},{end})")
}

pub fn escape_filter_value(value: &str) -> String {
    let option_level = escape_with(value, &['\\', '\'', ':']);
    escape_with(&option_level, &['\\', '\'', '[', ']', ',', ';'])
}

fn escape_with(value: &str, specials: &[char]) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if specials.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
