//! CLI configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level ielts-grade configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeConfig {
    /// Max attempts graded at once.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// Output directory for reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Output format when `--format` is not given.
    #[serde(default = "default_format")]
    pub default_format: String,
    /// Overrides every quiz's own pass mark.
    #[serde(default)]
    pub pass_percentage: Option<f64>,
}

fn default_parallelism() -> usize {
    4
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./ielts-grade-results")
}
fn default_format() -> String {
    "text".to_string()
}

impl Default for GradeConfig {
    fn default() -> Self {
        Self {
            parallelism: default_parallelism(),
            output_dir: default_output_dir(),
            default_format: default_format(),
            pass_percentage: None,
        }
    }
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `ielts-grade.toml` in the current directory
/// 2. `~/.config/ielts-grade/config.toml`
///
/// `IELTS_GRADE_PARALLELISM` overrides the file's `parallelism`.
pub fn load_config_from(path: Option<&Path>) -> Result<GradeConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("ielts-grade.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|dir| dir.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => GradeConfig::default(),
    };

    if let Ok(value) = std::env::var("IELTS_GRADE_PARALLELISM") {
        config.parallelism = value
            .trim()
            .parse()
            .with_context(|| format!("invalid IELTS_GRADE_PARALLELISM: '{value}'"))?;
    }

    Ok(config)
}

fn parse_config(content: &str) -> Result<GradeConfig> {
    let config: GradeConfig = toml::from_str(content)?;
    if let Some(pass) = config.pass_percentage {
        anyhow::ensure!(
            (0.0..=100.0).contains(&pass),
            "pass_percentage must be between 0 and 100"
        );
    }
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("ielts-grade"))
}
