//! Loading the config file from disk.

use super::Config;
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory name within the platform config directory.
const APP_DIR: &str = "git-groom";

/// Filename for the config file.
const CONFIG_FILE: &str = "config.toml";

/// Get path to the user's config file, if a config directory exists.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

/// Load configuration.
///
/// Uses `explicit` when given (it must exist); otherwise the user config file,
/// falling back to defaults when it does not exist.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(Error::Config(format!("{} does not exist", path.display())));
        }
        return load_config_from(path);
    }

    match config_path() {
        Some(path) => load_config_from(&path),
        None => Ok(Config::default()),
    }
}

/// Load configuration from `path`.
///
/// Returns the default `Config` if the file doesn't exist.
pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PrSourceKind;
    use tempfile::TempDir;

    #[test]
    fn test_config_path_ends_with_app_file() {
        if let Some(path) = config_path() {
            assert!(path.ends_with("git-groom/config.toml"));
        }
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let temp = TempDir::new().unwrap();
        let config = load_config_from(&temp.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let temp = TempDir::new().unwrap();
        let err = load_config(Some(&temp.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            "staging_branch = \"integration\"\npr_source = \"github-api\"\n",
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.staging_branch, "integration");
        assert_eq!(config.pr_source, PrSourceKind::GithubApi);
        assert_eq!(config.remote, "origin");
        assert_eq!(config.exit_delay_ms, 1000);
    }

    #[test]
    fn test_unknown_key_is_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "stagin_branch = \"typo\"\n").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }

    #[test]
    fn test_empty_pr_base_lists_all_bases() {
        let config = Config {
            pr_base: String::new(),
            ..Config::default()
        };
        assert_eq!(config.staging_options().pr_base, None);
    }
}
