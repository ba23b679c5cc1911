//! iconsplit configuration handling
//!
//! Settings come from three places, highest precedence first:
//! - command-line flags (each also readable from an `ICONSPLIT_*` variable)
//! - `iconsplit.toml` in the current directory, or the file given by `--config`
//! - built-in defaults

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration file looked up in the current directory
pub const CONFIG_FILE: &str = "iconsplit.toml";

/// Command-line surface of the external editor
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EditorDialect {
    /// Inkscape 0.92 `--verb` sequences
    #[default]
    Verbs,
    /// Inkscape 1.x `--actions` sequences
    Actions,
}

/// Resolved settings for one run
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IconsplitConfig {
    /// Inkscape binary
    #[serde(default = "default_editor")]
    pub editor: PathBuf,
    /// Master drawing holding every icon
    #[serde(default = "default_master")]
    pub master: PathBuf,
    /// Icons are written to `<output_root>/<layer>/<icon>-symbolic.svg`
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,
    /// Fill color of the backdrop paths removed after editing
    #[serde(default = "default_background_fill")]
    pub background_fill: String,
    /// Editor time limit per icon, 0 waits forever
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub dialect: EditorDialect,
}

fn default_editor() -> PathBuf {
    PathBuf::from("/usr/bin/inkscape")
}

fn default_master() -> PathBuf {
    PathBuf::from("src/icons/icons.svg")
}

fn default_output_root() -> PathBuf {
    PathBuf::from("src/icons")
}

fn default_background_fill() -> String {
    "#ffffff".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for IconsplitConfig {
    fn default() -> Self {
        Self {
            editor: default_editor(),
            master: default_master(),
            output_root: default_output_root(),
            background_fill: default_background_fill(),
            timeout_secs: default_timeout_secs(),
            dialect: EditorDialect::default(),
        }
    }
}

/// Flags that override the configuration file
#[derive(Debug, Default, Args)]
pub struct ConfigArgs {
    /// Configuration file [default: ./iconsplit.toml when present]
    #[arg(long, env = "ICONSPLIT_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Inkscape binary
    #[arg(long, env = "ICONSPLIT_EDITOR", value_name = "PATH")]
    pub editor: Option<PathBuf>,

    /// Master drawing
    #[arg(long, env = "ICONSPLIT_MASTER", value_name = "FILE")]
    pub master: Option<PathBuf>,

    /// Output directory
    #[arg(long, env = "ICONSPLIT_OUTPUT_ROOT", value_name = "DIR")]
    pub output_root: Option<PathBuf>,

    /// Fill color of background paths to strip
    #[arg(long, env = "ICONSPLIT_BACKGROUND_FILL", value_name = "COLOR")]
    pub background_fill: Option<String>,

    /// Seconds to wait for the editor per icon (0 waits forever)
    #[arg(long = "timeout", env = "ICONSPLIT_TIMEOUT", value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Editor command-line dialect
    #[arg(long, env = "ICONSPLIT_DIALECT", value_enum)]
    pub dialect: Option<EditorDialect>,
}

impl IconsplitConfig {
    /// Load the configuration file, or the defaults when there is none.
    ///
    /// An explicitly named file must exist; the implicit `iconsplit.toml` is
    /// optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_file(path),
            None => {
                let path = Path::new(CONFIG_FILE);
                if path.exists() {
                    Self::load_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load configuration from a TOML file
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Apply command-line overrides
    pub fn with_overrides(mut self, args: &ConfigArgs) -> Self {
        if let Some(editor) = &args.editor {
            self.editor = editor.clone();
        }
        if let Some(master) = &args.master {
            self.master = master.clone();
        }
        if let Some(output_root) = &args.output_root {
            self.output_root = output_root.clone();
        }
        if let Some(fill) = &args.background_fill {
            self.background_fill = fill.clone();
        }
        if let Some(secs) = args.timeout_secs {
            self.timeout_secs = secs;
        }
        if let Some(dialect) = args.dialect {
            self.dialect = dialect;
        }
        self
    }

    /// Editor time limit, `None` when disabled
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}
