use crate::error::{AppError, Result};
use crate::patterns::IgnoreRule;
use log;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_CONFIG_FILENAME: &str = ".repodigest.toml";
pub const IGNORE_FILE_NAME: &str = ".gitignore";
pub const DEFAULT_MAX_FILE_BYTES: u64 = 300_000;
pub const DEFAULT_CHUNK_LINES: usize = 1200;

/// Directory names that are never descended into, regardless of ignore rules.
pub const DEFAULT_PRUNE_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    ".bzr",
    "node_modules",
    "bower_components",
    ".venv",
    "venv",
    "__pycache__",
    ".mypy_cache",
    ".pytest_cache",
    ".ruff_cache",
    ".tox",
    ".gradle",
    ".next",
    ".nuxt",
    "dist",
    "build",
    "target",
    "out",
    ".idea",
    ".vscode",
    ".terraform",
    ".cache",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    #[serde(alias = "md")]
    Markdown,
    Json,
}

impl FromStr for OutputFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "json" => Ok(OutputFormat::Json),
            other => Err(AppError::config(
                "render.format",
                format!("unknown output format '{}' (expected 'markdown' or 'json')", other),
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Markdown => f.write_str("markdown"),
            OutputFormat::Json => f.write_str("json"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RenderConfig {
    /// Files larger than this are listed but their content is omitted.
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
    /// Lines per fenced block; 0 disables chunking.
    #[serde(default = "default_chunk_lines")]
    pub chunk_lines: usize,
    #[serde(default)]
    pub line_numbers: bool,
    /// Lowercase extensions without the dot; empty means no filter.
    #[serde(default)]
    pub extensions: BTreeSet<String>,
    #[serde(default)]
    pub format: OutputFormat,
    /// Structure only: never open files.
    #[serde(default)]
    pub compress: bool,
    /// 0 means unlimited.
    #[serde(default)]
    pub max_output_bytes: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    #[serde(default)]
    pub render: RenderConfig,
    /// Extra glob patterns appended after the ignore-file rules.
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default = "default_prune_dirs")]
    pub prune_dirs: Vec<String>,
    #[serde(default = "default_true")]
    pub use_gitignore: bool,
}

fn default_true() -> bool {
    true
}
fn default_max_file_bytes() -> u64 {
    DEFAULT_MAX_FILE_BYTES
}
fn default_chunk_lines() -> usize {
    DEFAULT_CHUNK_LINES
}
fn default_prune_dirs() -> Vec<String> {
    DEFAULT_PRUNE_DIRS.iter().map(|s| s.to_string()).collect()
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: default_max_file_bytes(),
            chunk_lines: default_chunk_lines(),
            line_numbers: false,
            extensions: BTreeSet::new(),
            format: OutputFormat::default(),
            compress: false,
            max_output_bytes: 0,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            render: RenderConfig::default(),
            exclude: Vec::new(),
            prune_dirs: default_prune_dirs(),
            use_gitignore: default_true(),
        }
    }
}

/// Lowercases an extension and strips a leading dot (".PY" -> "py").
pub fn normalize_extension(raw: &str) -> String {
    raw.trim().trim_start_matches('.').to_lowercase()
}

impl RenderConfig {
    pub fn accepts_extension(&self, extension: Option<&str>) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        extension.is_some_and(|ext| self.extensions.contains(&ext.to_lowercase()))
    }
}

impl EngineConfig {
    /// Returns the config file to load: the explicit path if given, otherwise
    /// `<root>/.repodigest.toml` when it exists.
    pub fn resolve_config_path(
        root: &Path,
        explicit: Option<&Path>,
        disable: bool,
    ) -> Result<Option<PathBuf>> {
        if disable {
            log::debug!("Config file loading disabled.");
            return Ok(None);
        }
        match explicit {
            Some(path) => {
                if !path.is_file() {
                    return Err(AppError::config(
                        "config",
                        format!("config file not found at path: {}", path.display()),
                    ));
                }
                log::debug!("Using specified config file path: {}", path.display());
                Ok(Some(path.to_path_buf()))
            }
            None => {
                let default_path = root.join(DEFAULT_CONFIG_FILENAME);
                if default_path.is_file() {
                    log::debug!("Using default config file path: {}", default_path.display());
                    Ok(Some(default_path))
                } else {
                    log::trace!("No config file found at: {}", default_path.display());
                    Ok(None)
                }
            }
        }
    }

    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        log::info!("Loading configuration from: {}", config_path.display());
        let toml_content = fs::read_to_string(config_path).map_err(|e| AppError::FileRead {
            path: config_path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&toml_content).map_err(|e| match e {
            AppError::TomlParse(msg) => AppError::TomlParse(format!(
                "Error parsing config file '{}': {}",
                config_path.display(),
                msg
            )),
            other => other,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str::<EngineConfig>(content)?)
    }

    /// Normalizes the extension allow-list and rejects out-of-range values.
    /// Runs before any traversal so a bad field never yields partial output.
    pub fn validated(mut self) -> Result<Self> {
        if self.render.max_file_bytes == 0 {
            return Err(AppError::config(
                "render.max_file_bytes",
                "must be greater than 0",
            ));
        }

        let mut extensions = BTreeSet::new();
        for raw in &self.render.extensions {
            let ext = normalize_extension(raw);
            if ext.is_empty() || ext.contains(['/', '\\']) {
                return Err(AppError::config(
                    "render.extensions",
                    format!("invalid extension '{}'", raw),
                ));
            }
            extensions.insert(ext);
        }
        self.render.extensions = extensions;

        for pattern in &self.exclude {
            if let Some(Err(e)) = IgnoreRule::parse(pattern) {
                return Err(AppError::config(
                    "exclude",
                    format!("invalid pattern '{}': {}", pattern, e),
                ));
            }
        }

        if let Some(bad) = self
            .prune_dirs
            .iter()
            .find(|name| name.trim().is_empty() || name.contains(['/', '\\']))
        {
            return Err(AppError::config(
                "prune_dirs",
                format!("'{}' is not a bare directory name", bad),
            ));
        }

        log::trace!("Validated config: {:?}", self);
        Ok(self)
    }
}
