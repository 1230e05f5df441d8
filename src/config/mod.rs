//! Config store
//!
//! Persists job aliases in a per-user YAML file. Loading fails soft: a
//! missing or unreadable file degrades to an empty config with a warning
//! so every command keeps working without one.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the per-user config, placed in the home directory.
const CONFIG_FILE_NAME: &str = ".jenky.yaml";

/// Errors that can occur writing the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be written.
    #[error("could not write {path}: {source}")]
    Write {
        /// Path that failed.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The in-memory config could not be serialized.
    #[error("could not serialize config: {0}")]
    Serialize(#[from] serde_yaml::Error),
}

/// Display options attached to an alias.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasOptions {
    /// Stream console output while the build runs.
    #[serde(default)]
    pub stream: bool,
    /// Render a progress bar while the build runs.
    #[serde(default)]
    pub progress: bool,
}

/// A named shortcut mapping to a real job name plus defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobAlias {
    /// Jenkins job the alias points at.
    pub job_name: String,
    /// Default build parameters; CLI-supplied parameters win per key.
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
    /// Default display options; CLI flags can only enable.
    #[serde(default)]
    pub options: AliasOptions,
}

/// The whole config file: alias name to [`JobAlias`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Configured aliases.
    #[serde(default)]
    pub aliases: BTreeMap<String, JobAlias>,
}

impl CliConfig {
    /// Built-in starter config seeded by `init-config`: one example alias
    /// triggering a deploy job with progress display enabled.
    #[must_use]
    pub fn example() -> Self {
        let mut parameters = BTreeMap::new();
        parameters.insert("TASK".to_string(), "deploy".to_string());
        parameters.insert("GIT_SYMBOL".to_string(), "origin/master".to_string());

        let mut aliases = BTreeMap::new();
        aliases.insert(
            "deploy-app".to_string(),
            JobAlias {
                job_name: "DEPLOY_my_application".to_string(),
                parameters,
                options: AliasOptions {
                    stream: false,
                    progress: true,
                },
            },
        );
        Self { aliases }
    }
}

/// Loads, queries and writes the per-user config file.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    config: CliConfig,
}

impl ConfigStore {
    /// Opens the per-user config, degrading to an empty one on any error.
    #[must_use]
    pub fn load() -> Self {
        Self::load_from(default_config_path())
    }

    /// Opens the config at an explicit path, degrading to an empty one on
    /// any read or parse error. A missing file is silently empty.
    pub fn load_from(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let config = match fs::read_to_string(&path) {
            Ok(raw) => match serde_yaml::from_str(&raw) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "config file is invalid");
                    eprintln!("Warning: could not parse {}: {e}", path.display());
                    CliConfig::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => CliConfig::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "config file is unreadable");
                eprintln!("Warning: could not read {}: {e}", path.display());
                CliConfig::default()
            }
        };
        Self { path, config }
    }

    /// Looks up an alias. Absence is a normal outcome, not an error; the
    /// caller then treats the name as a literal job name.
    #[must_use]
    pub fn get_job_config(&self, alias: &str) -> Option<&JobAlias> {
        self.config.aliases.get(alias)
    }

    /// Path backing this store.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The in-memory config.
    #[must_use]
    pub fn config(&self) -> &CliConfig {
        &self.config
    }

    /// Writes the built-in starter config, but only when no file exists
    /// yet. An existing file is never overwritten; the second call is a
    /// reporting no-op.
    pub fn generate_default(&mut self) -> Result<(), ConfigError> {
        if self.path.exists() {
            println!(
                "Configuration file already exists at {}",
                self.path.display()
            );
            return Ok(());
        }
        self.config = CliConfig::example();
        self.save()?;
        println!("Default configuration generated at {}", self.path.display());
        Ok(())
    }

    /// Serializes the whole in-memory config back to the file,
    /// overwriting it.
    pub fn save(&self) -> Result<(), ConfigError> {
        let raw = serde_yaml::to_string(&self.config)?;
        fs::write(&self.path, raw).map_err(|source| ConfigError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

/// Per-user config path: `~/.jenky.yaml`, falling back to the current
/// directory when the home directory is unknown.
#[must_use]
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn temp_config_path(dir: &TempDir) -> PathBuf {
        dir.path().join(".jenky.yaml")
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::load_from(temp_config_path(&dir));
        assert!(store.config().aliases.is_empty());
    }

    #[test]
    fn test_load_corrupt_file_degrades_to_empty() {
        let dir = TempDir::new().unwrap();
        let path = temp_config_path(&dir);
        fs::write(&path, "aliases: [not, a, map").unwrap();

        let store = ConfigStore::load_from(&path);
        assert!(store.config().aliases.is_empty());
    }

    #[test]
    fn test_get_job_config_absent_is_none() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::load_from(temp_config_path(&dir));
        assert!(store.get_job_config("no-such-alias").is_none());
    }

    #[test]
    fn test_generate_default_writes_example_alias() {
        let dir = TempDir::new().unwrap();
        let path = temp_config_path(&dir);
        let mut store = ConfigStore::load_from(&path);
        store.generate_default().unwrap();

        let reloaded = ConfigStore::load_from(&path);
        let alias = reloaded.get_job_config("deploy-app").unwrap();
        assert_eq!(alias.job_name, "DEPLOY_my_application");
        assert_eq!(alias.parameters["TASK"], "deploy");
        assert_eq!(alias.parameters["GIT_SYMBOL"], "origin/master");
        assert!(alias.options.progress);
        assert!(!alias.options.stream);
    }

    #[test]
    fn test_generate_default_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = temp_config_path(&dir);

        let mut store = ConfigStore::load_from(&path);
        store.generate_default().unwrap();
        let first = fs::read_to_string(&path).unwrap();

        // Second call must not touch the file, even from a fresh store
        // whose in-memory config differs.
        let mut store = ConfigStore::load_from(&path);
        store.generate_default().unwrap();
        let second = fs::read_to_string(&path).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_generate_default_never_overwrites_user_config() {
        let dir = TempDir::new().unwrap();
        let path = temp_config_path(&dir);
        let user_content = "aliases:\n  mine:\n    job_name: MY_JOB\n";
        fs::write(&path, user_content).unwrap();

        let mut store = ConfigStore::load_from(&path);
        store.generate_default().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), user_content);
    }

    #[test]
    fn test_save_and_reload_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = temp_config_path(&dir);

        let mut store = ConfigStore::load_from(&path);
        store.config = CliConfig::example();
        store.save().unwrap();

        let reloaded = ConfigStore::load_from(&path);
        assert_eq!(reloaded.config(), store.config());
    }

    #[test]
    fn test_alias_missing_optional_keys_default() {
        let raw = "aliases:\n  quick:\n    job_name: QUICK_JOB\n";
        let config: CliConfig = serde_yaml::from_str(raw).unwrap();
        let alias = &config.aliases["quick"];
        assert!(alias.parameters.is_empty());
        assert!(!alias.options.stream);
        assert!(!alias.options.progress);
    }
}
