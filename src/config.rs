//! Build configuration.
//!
//! Every field has a default matching the Dark-Telegram layout, so a missing
//! config file (or a partial one) still describes a complete build.
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "userstyle.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStrategy {
    #[default]
    Mtime,
    Version,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    pub program: String,
    /// Substring of the compiler transcript that signals success.
    pub success_marker: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            program: "stylus".to_string(),
            success_marker: "compiled".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BannerConfig {
    pub placeholder: String,
}

impl Default for BannerConfig {
    fn default() -> Self {
        Self {
            placeholder: "--version".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub source: PathBuf,
    pub sibling: PathBuf,
    /// File name of the reconstructed stylus file, written beside `source`.
    pub intermediate: String,
    pub marker: String,
    pub protected_comment: String,
    pub sync_strategy: SyncStrategy,
    pub compiler: CompilerConfig,
    pub banner: BannerConfig,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("Dark-Telegram.user.styl"),
            sibling: PathBuf::from("Dark-Telegram.user.css"),
            intermediate: "darkmode.styl".to_string(),
            marker: "@-moz-document domain(".to_string(),
            protected_comment: "==UserStyle==".to_string(),
            sync_strategy: SyncStrategy::Mtime,
            compiler: CompilerConfig::default(),
            banner: BannerConfig::default(),
        }
    }
}

impl BuildConfig {
    pub fn intermediate_path(&self) -> PathBuf {
        self.source.with_file_name(&self.intermediate)
    }
}

/// Render a pretty JSON config stub for `init`.
pub fn config_stub() -> Result<String> {
    serde_json::to_string_pretty(&BuildConfig::default()).context("serialize config stub")
}

/// Load an explicit config, else `userstyle.json` in `cwd` when present,
/// else defaults.
pub fn load_config(explicit: Option<&Path>, cwd: &Path) -> Result<BuildConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let candidate = cwd.join(DEFAULT_CONFIG_FILE);
            if !candidate.is_file() {
                tracing::debug!("no config file; using defaults");
                return Ok(BuildConfig::default());
            }
            candidate
        }
    };
    let bytes = fs::read(&path).with_context(|| format!("read config {}", path.display()))?;
    let config: BuildConfig = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse config JSON {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

pub fn write_config(path: &Path, force: bool) -> Result<()> {
    if path.is_file() && !force {
        return Err(anyhow!(
            "config already exists at {} (use --force to overwrite)",
            path.display()
        ));
    }
    let text = config_stub()?;
    fs::write(path, text.as_bytes()).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn validate_config(config: &BuildConfig) -> Result<()> {
    if config.marker.trim().is_empty() {
        return Err(anyhow!("marker must be non-empty"));
    }
    if config.compiler.program.trim().is_empty() {
        return Err(anyhow!("compiler.program must be non-empty"));
    }
    if config.compiler.success_marker.is_empty() {
        return Err(anyhow!("compiler.success_marker must be non-empty"));
    }
    if config.banner.placeholder.trim().is_empty() {
        return Err(anyhow!("banner.placeholder must be non-empty"));
    }
    if config.intermediate.trim().is_empty() || config.intermediate.contains(['/', '\\']) {
        return Err(anyhow!(
            "intermediate must be a bare file name (got {:?})",
            config.intermediate
        ));
    }
    if config.intermediate_path() == config.source {
        return Err(anyhow!("intermediate file would overwrite the source"));
    }
    if config.source == config.sibling {
        return Err(anyhow!("source and sibling must differ"));
    }
    Ok(())
}
