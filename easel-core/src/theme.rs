//! Host presentation theme.
//!
//! The theme supplies the colors used when the guest draws without an
//! explicit color, mirroring how a browser host would read them from the
//! page style. It is loaded from a small YAML file:
//!
//! ```yaml
//! background: "#1e1e2eff"
//! foreground: "#cdd6f4"
//! ```

use crate::color::Color;
use crate::error::{EaselError, Result, ResultExt};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Fallback colors for commands that omit one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Theme {
    /// Used for `clear` commands without an explicit color.
    pub background: Color,
    /// Used for `line` commands without an explicit color.
    pub foreground: Color,
}

impl Default for Theme {
    /// White background, black foreground: the light theme of the
    /// reference host.
    fn default() -> Self {
        Self {
            background: Color::WHITE,
            foreground: Color::BLACK,
        }
    }
}

impl Theme {
    /// Parse a theme from YAML text.
    pub fn parse(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| EaselError::ThemeParse {
            path: "<inline>".into(),
            cause: e.to_string(),
        })
    }

    /// Load a theme from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).with_path(path)?;
        serde_yaml::from_str(&text).map_err(|e| EaselError::ThemeParse {
            path: path.to_path_buf(),
            cause: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_is_light() {
        let theme = Theme::default();
        assert_eq!(theme.background, Color::WHITE);
        assert_eq!(theme.foreground, Color::BLACK);
    }

    #[test]
    fn parse_full_theme() {
        let theme = Theme::parse("background: \"#1e1e2eff\"\nforeground: \"#cdd6f4\"\n").unwrap();
        assert_eq!(theme.background, Color::new(0x1e1e_2eff));
        assert_eq!(theme.foreground, Color::new(0xcdd6_f4ff));
    }

    #[test]
    fn parse_rejects_unknown_fields() {
        let err = Theme::parse("background: \"#ffffff\"\nforeground: \"#000000\"\ncursor: \"#ff0000\"\n")
            .unwrap_err();
        assert_eq!(err.code(), "E202");
    }

    #[test]
    fn parse_rejects_bad_color() {
        let err = Theme::parse("background: \"red\"\nforeground: \"#000000\"\n").unwrap_err();
        assert_eq!(err.code(), "E202");
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "background: \"#000000ff\"\nforeground: \"#ffffffff\"\n").unwrap();
        let theme = Theme::load(file.path()).unwrap();
        assert_eq!(theme.background, Color::BLACK);
        assert_eq!(theme.foreground, Color::WHITE);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = Theme::load("/nonexistent/theme.yaml").unwrap_err();
        assert_eq!(err.code(), "E901");
    }
}
