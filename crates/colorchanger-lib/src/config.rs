//! Run configuration: a flat TOML key-value file.
//!
//! ```toml
//! srcFileName = "map.xml"
//! targetFileName = "map_recolored.xml"
//! color = "#FF8000"        # or "255;128;0"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::color::{RgbColor, parse_color};
use crate::error::{ColorChangerError, Result};
use crate::report::Reporter;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "colorChanger.toml";
/// Source document used when `srcFileName` is absent.
pub const DEFAULT_SRC_FILE: &str = "source_file.xml";
/// Target document used when `targetFileName` is absent.
pub const DEFAULT_TARGET_FILE: &str = "target_file.xml";

/// Raw configuration values. Every key is optional at this stage;
/// [`Config::resolve`] decides what a missing key means.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Path to the source XML document.
    #[serde(rename = "srcFileName", default)]
    pub src_file_name: Option<String>,

    /// Path the recolored document is written to.
    #[serde(rename = "targetFileName", default)]
    pub target_file_name: Option<String>,

    /// Color in `#RRGGBB` or `R;G;B` form. No default.
    #[serde(default)]
    pub color: Option<String>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub src: PathBuf,
    pub target: PathBuf,
    pub color: RgbColor,
}

impl Config {
    /// Load config from `path`.
    ///
    /// Unlike an application preferences file there is nothing sensible to
    /// fall back to: a missing, unreadable or malformed file is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ColorChangerError::Config(format!("{}: {e}", path.display())))?;
        Self::parse(&contents)
            .map_err(|e| ColorChangerError::Config(format!("{}: {e}", path.display())))
    }

    /// Parse config from TOML text.
    pub fn parse(contents: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Replace file values with any `Some` override (command-line flags).
    pub fn with_overrides(
        mut self,
        src: Option<String>,
        target: Option<String>,
        color: Option<String>,
    ) -> Self {
        if src.is_some() {
            self.src_file_name = src;
        }
        if target.is_some() {
            self.target_file_name = target;
        }
        if color.is_some() {
            self.color = color;
        }
        self
    }

    /// Validate the color and fill in default file names.
    ///
    /// The color is checked first; a bad color aborts before any default is
    /// applied. Each applied default is reported as a warning.
    pub fn resolve(&self, reporter: &dyn Reporter) -> Result<Settings> {
        let color = parse_color(self.color.as_deref())?;
        let src = file_or_default(
            self.src_file_name.as_deref(),
            "srcFileName",
            DEFAULT_SRC_FILE,
            reporter,
        );
        let target = file_or_default(
            self.target_file_name.as_deref(),
            "targetFileName",
            DEFAULT_TARGET_FILE,
            reporter,
        );
        Ok(Settings { src, target, color })
    }
}

fn file_or_default(
    value: Option<&str>,
    key: &str,
    default: &str,
    reporter: &dyn Reporter,
) -> PathBuf {
    match value {
        Some(v) => PathBuf::from(v),
        None => {
            reporter.warn(&format!(
                "\"{key}\" not set in configuration, using default: \"{default}\""
            ));
            PathBuf::from(default)
        }
    }
}
