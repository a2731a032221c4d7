//! Font discovery and font-name resolution.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Font container extensions picked up by [`walk_fonts`], in resolution preference order.
pub const FONT_EXTENSIONS: [&str; 3] = ["ttf", "otf", "ttc"];

/// Default system font directory.
pub const DEFAULT_FONT_DIR: &str = "/usr/share/fonts/truetype";

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FontError {
    #[error("empty font name")]
    EmptyName,

    #[error("no font named '{name}' under '{}'", .dir.display())]
    NotFound { name: String, dir: PathBuf },
}

/// A font file found on disk.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FontFile {
    pub path: PathBuf,
    /// File name without its extension.
    pub name: String,
}

impl FontFile {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, name }
    }
}

/// Return `true` when `path` has one of the [`FONT_EXTENSIONS`] (case-insensitive).
pub fn is_font_file(path: &Path) -> bool {
    font_extension_rank(path).is_some()
}

fn font_extension_rank(path: &Path) -> Option<usize> {
    let ext = path.extension().and_then(OsStr::to_str)?;
    FONT_EXTENSIONS
        .iter()
        .position(|known| known.eq_ignore_ascii_case(ext))
}

/// Lazily walk `root` for font files.
///
/// Directories that cannot be read are logged and skipped, and symlinked directories are not
/// followed. Calling this again on an unchanged
/// tree yields the same set of paths; the order follows the filesystem.
pub fn walk_fonts(root: impl Into<PathBuf>) -> FontWalk {
    FontWalk {
        pending_dirs: vec![root.into()],
        current: None,
    }
}

/// Iterator returned by [`walk_fonts`].
#[derive(Debug)]
pub struct FontWalk {
    pending_dirs: Vec<PathBuf>,
    current: Option<std::fs::ReadDir>,
}

impl Iterator for FontWalk {
    type Item = FontFile;

    fn next(&mut self) -> Option<FontFile> {
        loop {
            let Some(entries) = self.current.as_mut() else {
                let dir = self.pending_dirs.pop()?;
                match std::fs::read_dir(&dir) {
                    Ok(rd) => self.current = Some(rd),
                    Err(e) => {
                        tracing::warn!(dir = %dir.display(), error = %e, "skipping unreadable font directory");
                    }
                }
                continue;
            };

            let Some(entry) = entries.next() else {
                self.current = None;
                continue;
            };
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable directory entry");
                    continue;
                }
            };

            let path = entry.path();
            let file_type = match entry.file_type() {
                Ok(ft) => ft,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable directory entry");
                    continue;
                }
            };
            // Symlinked directories are not descended into; symlinked font files still count.
            if file_type.is_dir() {
                self.pending_dirs.push(path);
            } else if file_type.is_symlink() && path.is_dir() {
                tracing::trace!(path = %path.display(), "not following directory symlink");
            } else if is_font_file(&path) {
                return Some(FontFile::from_path(path));
            }
        }
    }
}

/// How an overlay's font name becomes a `fontfile=` path.
///
/// An absolute font path is always used verbatim.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum FontResolver {
    /// `<dir>/<name>.<extension>`, without checking that the file exists.
    Directory { dir: PathBuf, extension: String },
    /// Walk `dir` and pick the file whose stem equals the name; `ttf` beats `otf` beats `ttc`.
    Search { dir: PathBuf },
}

impl Default for FontResolver {
    fn default() -> Self {
        Self::Directory {
            dir: PathBuf::from(DEFAULT_FONT_DIR),
            extension: "ttf".to_string(),
        }
    }
}

impl FontResolver {
    pub fn resolve(&self, name: &str) -> Result<PathBuf, FontError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(FontError::EmptyName);
        }
        if Path::new(name).is_absolute() {
            return Ok(PathBuf::from(name));
        }

        match self {
            Self::Directory { dir, extension } => {
                let ext = extension.trim_start_matches('.');
                Ok(dir.join(format!("{name}.{ext}")))
            }
            Self::Search { dir } => walk_fonts(dir)
                .filter(|f| f.name == name)
                .min_by(|a, b| {
                    let rank = |f: &FontFile| font_extension_rank(&f.path).unwrap_or(usize::MAX);
                    rank(a).cmp(&rank(b)).then_with(|| a.path.cmp(&b.path))
                })
                .map(|f| f.path)
                .ok_or_else(|| FontError::NotFound {
                    name: name.to_string(),
                    dir: dir.clone(),
                }),
        }
    }

    /// A fixed extension can never reach `.otf`/`.ttc` files that [`walk_fonts`] would find.
    pub fn warn_if_fixed_extension(&self) {
        if let Self::Directory { extension, .. } = self {
            tracing::warn!(
                extension = %extension,
                "fonts resolve to a single fixed extension; use the search strategy to reach otf/ttc files"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, b"").unwrap();
    }

    #[test]
    fn display_name_drops_extension() {
        let f = FontFile::from_path("/fonts/dejavu/DejaVuSans-Bold.ttf");
        assert_eq!(f.name, "DejaVuSans-Bold");
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        assert!(is_font_file(Path::new("a/B.TTF")));
        assert!(is_font_file(Path::new("a/b.otf")));
        assert!(is_font_file(Path::new("a/b.ttc")));
        assert!(!is_font_file(Path::new("a/b.woff2")));
        assert!(!is_font_file(Path::new("a/ttf")));
    }

    #[test]
    fn walk_recurses_and_filters() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("a.ttf"));
        touch(&tmp.path().join("nested/deeper/b.otf"));
        touch(&tmp.path().join("nested/readme.txt"));

        let mut names: Vec<String> = walk_fonts(tmp.path()).map(|f| f.name).collect();
        names.sort();
        assert_eq!(names, ["a", "b"]);
    }

    #[cfg(unix)]
    #[test]
    fn walk_does_not_follow_directory_symlinks() {
        let tmp = tempfile::tempdir().unwrap();
        let fonts = tmp.path().join("fonts");
        touch(&fonts.join("a.ttf"));
        touch(&tmp.path().join("elsewhere/b.otf"));
        std::os::unix::fs::symlink(&fonts, fonts.join("loop")).unwrap();
        std::os::unix::fs::symlink(tmp.path().join("elsewhere"), fonts.join("compat")).unwrap();
        std::os::unix::fs::symlink(fonts.join("a.ttf"), fonts.join("alias.ttf")).unwrap();

        let mut names: Vec<String> = walk_fonts(&fonts).take(50).map(|f| f.name).collect();
        names.sort();
        assert_eq!(names, ["a", "alias"]);
    }

    #[test]
    fn walk_of_missing_root_is_empty() {
        assert_eq!(walk_fonts("/definitely/not/a/font/dir").count(), 0);
    }

    #[test]
    fn directory_strategy_appends_extension() {
        let r = FontResolver::default();
        assert_eq!(
            r.resolve("Arial").unwrap(),
            PathBuf::from("/usr/share/fonts/truetype/Arial.ttf")
        );

        let r = FontResolver::Directory {
            dir: PathBuf::from("/opt/fonts"),
            extension: ".otf".to_string(),
        };
        assert_eq!(r.resolve("Inter").unwrap(), PathBuf::from("/opt/fonts/Inter.otf"));
    }

    #[test]
    fn absolute_names_are_verbatim() {
        let r = FontResolver::default();
        assert_eq!(
            r.resolve("/srv/fonts/Custom.otf").unwrap(),
            PathBuf::from("/srv/fonts/Custom.otf")
        );
        assert_eq!(r.resolve("  ").unwrap_err(), FontError::EmptyName);
    }

    #[test]
    fn search_strategy_prefers_ttf_then_otf() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("x/Inter.ttc"));
        touch(&tmp.path().join("y/Inter.otf"));
        let r = FontResolver::Search {
            dir: tmp.path().to_path_buf(),
        };
        assert_eq!(r.resolve("Inter").unwrap(), tmp.path().join("y/Inter.otf"));

        touch(&tmp.path().join("z/Inter.ttf"));
        assert_eq!(r.resolve("Inter").unwrap(), tmp.path().join("z/Inter.ttf"));
    }

    #[test]
    fn search_strategy_reports_missing_font() {
        let tmp = tempfile::tempdir().unwrap();
        let r = FontResolver::Search {
            dir: tmp.path().to_path_buf(),
        };
        assert!(matches!(
            r.resolve("Nope").unwrap_err(),
            FontError::NotFound { ref name, .. } if name == "Nope"
        ));
    }

    #[test]
    fn resolver_config_round_trips_through_json() {
        let r: FontResolver =
            serde_json::from_str(r#"{ "strategy": "search", "dir": "/usr/share/fonts" }"#).unwrap();
        assert_eq!(
            r,
            FontResolver::Search {
                dir: PathBuf::from("/usr/share/fonts")
            }
        );
    }
}
