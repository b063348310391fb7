//! Library configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$MIMEPART_CONFIG` (environment variable)
//! 2. `~/.config/mimepart/config.toml` (Linux/macOS)
//!    `%APPDATA%\mimepart\config.toml` (Windows)
//! 3. Built-in defaults

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Defaults for the decoding collaborators.
    pub decoding: DecodingConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
    /// Override cache directory for logs.
    pub cache_dir: Option<PathBuf>,
    /// Also write logs to `mimepart.log` in the cache directory.
    pub log_to_file: bool,
}

/// Defaults used when building the standard decoding collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodingConfig {
    /// Charset label used when a part declares none, or an unknown one.
    pub default_charset: String,
    /// Reject malformed base64, unknown transfer encodings and unknown
    /// charsets instead of decoding best-effort.
    pub strict: bool,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            cache_dir: None,
            log_to_file: false,
        }
    }
}

impl Default for DecodingConfig {
    fn default() -> Self {
        Self {
            default_charset: "utf-8".to_string(),
            strict: false,
        }
    }
}

// ── Load / save ─────────────────────────────────────────────────

/// Load configuration from the standard location.
///
/// Falls back to the defaults when no file exists or it cannot be used.
pub fn load_config() -> Config {
    match config_file_path() {
        Some(path) if path.exists() => load_config_from(&path),
        _ => Config::default(),
    }
}

/// Load configuration from `path`, falling back to the defaults on a read
/// or parse failure.
pub fn load_config_from(path: &Path) -> Config {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed to read config file, using defaults"
            );
            return Config::default();
        }
    };
    match toml::from_str::<Config>(&contents) {
        Ok(cfg) => {
            tracing::info!(path = %path.display(), "Loaded config");
            cfg
        }
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed to parse config, using defaults"
            );
            Config::default()
        }
    }
}

/// Save configuration to the standard location.
pub fn save_config(config: &Config) -> anyhow::Result<()> {
    let path = config_file_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config file path"))?;
    save_config_to(config, &path)
}

/// Write `config` as TOML to `path`, creating parent directories.
pub fn save_config_to(config: &Config, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents).with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), "Saved config");
    Ok(())
}

/// `$MIMEPART_CONFIG` if set, else `mimepart/config.toml` under the
/// platform config directory.
pub fn config_file_path() -> Option<PathBuf> {
    match std::env::var_os("MIMEPART_CONFIG") {
        Some(env_path) => Some(PathBuf::from(env_path)),
        None => dirs::config_dir().map(|d| d.join("mimepart").join("config.toml")),
    }
}

/// Return the cache directory for logs.
pub fn cache_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.cache_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mimepart")
}

/// Return the log file path.
pub fn log_file_path(config: &Config) -> PathBuf {
    cache_dir(config).join("mimepart.log")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.general.log_level, "warn");
        assert!(!cfg.general.log_to_file);
        assert_eq!(cfg.decoding.default_charset, "utf-8");
        assert!(!cfg.decoding.strict);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let partial = r#"
[decoding]
default_charset = "windows-1252"
"#;
        let cfg: Config = toml::from_str(partial).expect("parse partial");
        assert_eq!(cfg.decoding.default_charset, "windows-1252");
        assert!(!cfg.decoding.strict);
        assert_eq!(cfg.general.log_level, "warn");
    }

    #[test]
    fn test_log_file_in_cache_dir_override() {
        let mut cfg = Config::default();
        cfg.general.cache_dir = Some(PathBuf::from("/tmp/mimepart-test"));
        assert_eq!(
            log_file_path(&cfg),
            PathBuf::from("/tmp/mimepart-test/mimepart.log")
        );
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.general.log_level = "debug".to_string();
        cfg.decoding.default_charset = "iso-8859-2".to_string();
        cfg.decoding.strict = true;
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path);
        assert_eq!(loaded.general.log_level, "debug");
        assert_eq!(loaded.decoding.default_charset, "iso-8859-2");
        assert!(loaded.decoding.strict);
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[decoding\ndefault_charset = ").unwrap();
        let cfg = load_config_from(&path);
        assert_eq!(cfg.decoding.default_charset, "utf-8");
        assert_eq!(cfg.general.log_level, "warn");
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml"));
        assert!(!cfg.decoding.strict);
    }
}
