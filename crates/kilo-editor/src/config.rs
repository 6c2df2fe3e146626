//! Editor configuration.
//!
//! Settings are fixed at startup. Two file formats are accepted:
//!
//! - TOML (`.kilorc.toml` or any `*.toml`), kebab-case keys:
//!
//!   ```toml
//!   tab-stop = 4
//!   auto-indent = true
//!   line-numbers = true
//!   quit-times = 2
//!   ```
//!
//! - The classic `.kilorc` line format, one `Key value` pair per line:
//!
//!   ```text
//!   TabStop 4
//!   AutoIndent 1
//!   LineNumbers 1
//!   QuitTimes 2
//!   ```
//!
//! Missing keys keep their defaults.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Deserialize;

use crate::document::DEFAULT_TAB_STOP;
use crate::error::{Error, Result};

/// File names looked for in the working directory, in order.
pub const DISCOVERY_NAMES: [&str; 2] = [".kilorc.toml", ".kilorc"];

/// Startup settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Columns per tab stop. Always at least 1 after loading.
    pub tab_stop: usize,
    /// Start new lines with the previous line's indentation.
    pub auto_indent: bool,
    /// Show the line-number gutter.
    pub line_numbers: bool,
    /// Extra Ctrl-Q presses needed to quit with unsaved changes.
    pub quit_times: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tab_stop: DEFAULT_TAB_STOP,
            auto_indent: false,
            line_numbers: false,
            quit_times: 3,
        }
    }
}

impl Config {
    /// Parse TOML. `path` is only used in the error.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if the text is not valid TOML for this struct.
    pub fn from_toml(text: &str, path: &Path) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(config.normalized())
    }

    /// Parse the `.kilorc` line format. Unknown keys and bad values are
    /// skipped with a warning.
    #[must_use]
    pub fn from_kilorc(text: &str) -> Self {
        let mut config = Self::default();
        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.split_whitespace();
            let key = parts.next().unwrap_or_default();
            let value = parts.next().unwrap_or_default();
            if !config.apply(key, value) {
                warn!(".kilorc line {}: ignored {line:?}", number + 1);
            }
        }
        config.normalized()
    }

    /// Read `path`, choosing the format by its extension.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] if the file cannot be read, [`Error::Config`] if a TOML
    /// file does not parse.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = if path.extension().is_some_and(|ext| ext == "toml") {
            Self::from_toml(&text, path)?
        } else {
            Self::from_kilorc(&text)
        };
        info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Load `explicit` if given, otherwise the first of [`DISCOVERY_NAMES`]
    /// that exists in `dir`, otherwise the defaults.
    ///
    /// # Errors
    ///
    /// As [`load`](Self::load).
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        DISCOVERY_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
            .map_or_else(|| Ok(Self::default()), |path: PathBuf| Self::load(&path))
    }

    /// Set one `.kilorc` key. Returns `false` if the key or value is bad.
    fn apply(&mut self, key: &str, value: &str) -> bool {
        match key {
            "TabStop" => value.parse::<usize>().map(|n| self.tab_stop = n).is_ok(),
            "QuitTimes" => value.parse::<u32>().map(|n| self.quit_times = n).is_ok(),
            "AutoIndent" => parse_flag(value).map(|b| self.auto_indent = b).is_some(),
            "LineNumbers" => parse_flag(value).map(|b| self.line_numbers = b).is_some(),
            _ => false,
        }
    }

    fn normalized(mut self) -> Self {
        if self.tab_stop == 0 {
            warn!("tab stop 0 is not usable, using 1");
            self.tab_stop = 1;
        }
        self
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value {
        "1" => Some(true),
        "0" => Some(false),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // ── defaults ──────────────────────────────────────────────────────────

    #[test]
    fn defaults() {
        let c = Config::default();
        assert_eq!(c.tab_stop, 8);
        assert_eq!(c.quit_times, 3);
        assert!(!c.auto_indent);
        assert!(!c.line_numbers);
    }

    // ── TOML ──────────────────────────────────────────────────────────────

    #[test]
    fn toml_all_keys() {
        let c = Config::from_toml(
            "tab-stop = 4\nauto-indent = true\nline-numbers = true\nquit-times = 1\n",
            Path::new("x.toml"),
        )
        .unwrap();
        assert_eq!(
            c,
            Config {
                tab_stop: 4,
                auto_indent: true,
                line_numbers: true,
                quit_times: 1,
            }
        );
    }

    #[test]
    fn toml_missing_keys_keep_defaults() {
        let c = Config::from_toml("auto-indent = true", Path::new("x.toml")).unwrap();
        assert_eq!(c.tab_stop, 8);
        assert!(c.auto_indent);
    }

    #[test]
    fn toml_unknown_key_is_an_error() {
        let err = Config::from_toml("tabstop = 4", Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert!(err.to_string().starts_with("bad.toml: "));
    }

    #[test]
    fn toml_zero_tab_stop_is_clamped() {
        let c = Config::from_toml("tab-stop = 0", Path::new("x.toml")).unwrap();
        assert_eq!(c.tab_stop, 1);
    }

    // ── .kilorc ───────────────────────────────────────────────────────────

    #[test]
    fn kilorc_all_keys() {
        let c = Config::from_kilorc("LineNumbers 1\nAutoIndent 1\nTabStop 4\nQuitTimes 0\n");
        assert_eq!(
            c,
            Config {
                tab_stop: 4,
                auto_indent: true,
                line_numbers: true,
                quit_times: 0,
            }
        );
    }

    #[test]
    fn kilorc_skips_junk() {
        let c = Config::from_kilorc("# comment\n\nTabStop four\nColors 1\r\nAutoIndent 1\r\n");
        assert_eq!(c.tab_stop, 8);
        assert!(c.auto_indent);
    }

    // ── files ─────────────────────────────────────────────────────────────

    #[test]
    fn load_picks_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let toml_path = dir.path().join("kilo.toml");
        fs::write(&toml_path, "tab-stop = 2").unwrap();
        assert_eq!(Config::load(&toml_path).unwrap().tab_stop, 2);

        let rc_path = dir.path().join("rc");
        fs::write(&rc_path, "TabStop 3").unwrap();
        assert_eq!(Config::load(&rc_path).unwrap().tab_stop, 3);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn discover_prefers_toml_then_kilorc() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Config::discover(None, dir.path()).unwrap(), Config::default());

        fs::write(dir.path().join(".kilorc"), "TabStop 3").unwrap();
        assert_eq!(Config::discover(None, dir.path()).unwrap().tab_stop, 3);

        fs::write(dir.path().join(".kilorc.toml"), "tab-stop = 5").unwrap();
        assert_eq!(Config::discover(None, dir.path()).unwrap().tab_stop, 5);
    }

    #[test]
    fn discover_explicit_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".kilorc"), "TabStop 3").unwrap();
        let explicit = dir.path().join("mine.toml");
        fs::write(&explicit, "tab-stop = 6").unwrap();
        let c = Config::discover(Some(&explicit), dir.path()).unwrap();
        assert_eq!(c.tab_stop, 6);
    }
}
