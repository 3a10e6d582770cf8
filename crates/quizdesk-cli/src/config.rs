//! CLI configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level quizdesk configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizdeskConfig {
    /// Output directory for reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Report format(s) used when `--format` is not given.
    #[serde(default = "default_format")]
    pub default_format: String,
    /// Exit with an error when any scenario step fails.
    #[serde(default = "default_true")]
    pub fail_on_step_error: bool,
    /// Skip the remaining steps of a scenario after its first failure.
    #[serde(default)]
    pub stop_on_failure: bool,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./quizdesk-results")
}
fn default_format() -> String {
    "json".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for QuizdeskConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            default_format: default_format(),
            fail_on_step_error: true,
            stop_on_failure: false,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are copied verbatim and never expanded again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + end];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `quizdesk.toml` in the current directory
/// 2. `~/.config/quizdesk/config.toml`
///
/// `QUIZDESK_OUTPUT_DIR` overrides `output_dir`.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizdeskConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("quizdesk.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizdeskConfig::default(),
    };

    if let Ok(dir) = std::env::var("QUIZDESK_OUTPUT_DIR") {
        config.output_dir = PathBuf::from(dir);
    }
    config.output_dir = PathBuf::from(resolve_env_vars(&config.output_dir.to_string_lossy()));

    Ok(config)
}

fn parse_config(content: &str) -> Result<QuizdeskConfig> {
    Ok(toml::from_str::<QuizdeskConfig>(content)?)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizdesk"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_QUIZDESK_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_QUIZDESK_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_QUIZDESK_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("${_QUIZDESK_UNSET_VAR}/out"), "/out");
        assert_eq!(resolve_env_vars("${unterminated"), "${unterminated");
        std::env::remove_var("_QUIZDESK_TEST_VAR");
    }

    #[test]
    fn resolve_env_vars_does_not_expand_substituted_values() {
        std::env::set_var("_QUIZDESK_SELF_REF", "${_QUIZDESK_SELF_REF}");
        assert_eq!(
            resolve_env_vars("${_QUIZDESK_SELF_REF}/out"),
            "${_QUIZDESK_SELF_REF}/out"
        );
        std::env::remove_var("_QUIZDESK_SELF_REF");
    }

    #[test]
    fn default_config() {
        let config = QuizdeskConfig::default();
        assert_eq!(config.output_dir, PathBuf::from("./quizdesk-results"));
        assert_eq!(config.default_format, "json");
        assert!(config.fail_on_step_error);
        assert!(!config.stop_on_failure);
    }

    #[test]
    fn parse_partial_config() {
        let config = parse_config(
            r#"
default_format = "html,markdown"
fail_on_step_error = false
"#,
        )
        .unwrap();
        assert_eq!(config.default_format, "html,markdown");
        assert!(!config.fail_on_step_error);
        assert_eq!(config.output_dir, PathBuf::from("./quizdesk-results"));
    }

    #[test]
    fn explicit_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "output_dir = \"reports\"\nstop_on_failure = true\n").unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert!(config.stop_on_failure);

        assert!(load_config_from(Some(&dir.path().join("missing.toml"))).is_err());
    }

    #[test]
    fn invalid_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "fail_on_step_error = \"sometimes\"\n").unwrap();

        let err = load_config_from(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse config"));
    }
}
