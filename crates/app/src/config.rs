//! Runtime configuration for the terminal shell.
//!
//! Values resolve with priority: CLI flag > environment > `vocab.toml` > built-in default.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use vocab_core::model::{SettingsError, StudySettings, StudySettingsDraft};

pub const DEFAULT_CONFIG_FILE: &str = "vocab.toml";
pub const DEFAULT_SNAPSHOT_FILE: &str = "vocab_progress.json";
pub const DEFAULT_LOG_FILTER: &str = "app=info,services=info,storage=info";

pub const ENV_CONFIG: &str = "VOCAB_CONFIG";
pub const ENV_WORD_BANK: &str = "VOCAB_WORD_BANK";
pub const ENV_SNAPSHOT: &str = "VOCAB_SNAPSHOT";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid [study] settings: {0}")]
    Settings(#[from] SettingsError),
}

/// `vocab.toml` as written on disk. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    word_bank: Option<PathBuf>,
    snapshot: Option<PathBuf>,
    seed: Option<u64>,
    log_filter: Option<String>,
    study: StudySettingsDraft,
}

/// Values given on the command line; they win over everything else.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub config: Option<PathBuf>,
    pub word_bank: Option<PathBuf>,
    pub snapshot: Option<PathBuf>,
    pub seed: Option<u64>,
}

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// `None` selects the built-in word bank.
    pub word_bank: Option<PathBuf>,
    pub snapshot: PathBuf,
    pub seed: Option<u64>,
    pub log_filter: String,
    pub study: StudySettings,
    /// The file the values came from, if any.
    pub source: Option<PathBuf>,
}

impl Config {
    /// Resolve configuration from the process environment.
    ///
    /// # Errors
    ///
    /// See [`Config::resolve`].
    pub fn load(overrides: &Overrides) -> Result<Self, ConfigError> {
        Self::resolve(overrides, |key| std::env::var(key).ok(), Path::new("."))
    }

    /// Resolve configuration with an injected environment lookup and base directory.
    ///
    /// An explicit config path (flag or `VOCAB_CONFIG`) must exist; the default
    /// `vocab.toml` in `base_dir` is optional.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a config file is missing, unreadable or malformed, or if
    /// its `[study]` section fails validation.
    pub fn resolve(
        overrides: &Overrides,
        env: impl Fn(&str) -> Option<String>,
        base_dir: &Path,
    ) -> Result<Self, ConfigError> {
        let explicit = overrides
            .config
            .clone()
            .or_else(|| env(ENV_CONFIG).map(PathBuf::from));

        let source = match explicit {
            Some(path) if path.exists() => Some(path),
            Some(path) => return Err(ConfigError::NotFound(path)),
            None => Some(base_dir.join(DEFAULT_CONFIG_FILE)).filter(|p| p.exists()),
        };

        let file = match &source {
            Some(path) => read_file(path)?,
            None => ConfigFile::default(),
        };

        Ok(Self {
            word_bank: overrides
                .word_bank
                .clone()
                .or_else(|| env(ENV_WORD_BANK).map(PathBuf::from))
                .or(file.word_bank),
            snapshot: overrides
                .snapshot
                .clone()
                .or_else(|| env(ENV_SNAPSHOT).map(PathBuf::from))
                .or(file.snapshot)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SNAPSHOT_FILE)),
            seed: overrides.seed.or(file.seed),
            log_filter: file
                .log_filter
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_owned()),
            study: file.study.validate()?,
            source,
        })
    }
}

fn read_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use vocab_core::model::QuestionPolicy;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_without_any_source() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::resolve(&Overrides::default(), env(&[]), dir.path()).unwrap();
        assert_eq!(config.word_bank, None);
        assert_eq!(config.snapshot, PathBuf::from(DEFAULT_SNAPSHOT_FILE));
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
        assert_eq!(config.study, StudySettings::default());
        assert!(config.source.is_none());
    }

    #[test]
    fn file_values_are_read_from_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            r#"
word_bank = "data/word_bank.json"
snapshot = "progress.json"
seed = 7
log_filter = "debug"

[study]
default_question_count = 20
default_policy = "true-false"
show_hints = false
"#,
        )
        .unwrap();

        let config = Config::resolve(&Overrides::default(), env(&[]), dir.path()).unwrap();
        assert_eq!(config.word_bank, Some(PathBuf::from("data/word_bank.json")));
        assert_eq!(config.snapshot, PathBuf::from("progress.json"));
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.log_filter, "debug");
        assert_eq!(config.study.default_question_count(), 20);
        assert_eq!(config.study.default_policy(), QuestionPolicy::TrueFalse);
        assert!(!config.study.show_hints());
    }

    #[test]
    fn cli_beats_env_beats_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "word_bank = \"file.json\"\nsnapshot = \"file-progress.json\"\n")
            .unwrap();

        let env = env(&[
            (ENV_CONFIG, path.to_str().unwrap()),
            (ENV_WORD_BANK, "env.json"),
            (ENV_SNAPSHOT, "env-progress.json"),
        ]);
        let overrides = Overrides {
            snapshot: Some(PathBuf::from("cli-progress.json")),
            ..Overrides::default()
        };

        let config = Config::resolve(&overrides, env, dir.path()).unwrap();
        assert_eq!(config.source, Some(path));
        assert_eq!(config.word_bank, Some(PathBuf::from("env.json")));
        assert_eq!(config.snapshot, PathBuf::from("cli-progress.json"));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let overrides = Overrides {
            config: Some(dir.path().join("missing.toml")),
            ..Overrides::default()
        };
        let err = Config::resolve(&overrides, env(&[]), dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn invalid_study_settings_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            "[study]\ndefault_question_count = 12\n",
        )
        .unwrap();
        let err = Config::resolve(&Overrides::default(), env(&[]), dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Settings(_)));
    }

    #[test]
    fn unknown_keys_are_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "dark_mode = true\n").unwrap();
        let err = Config::resolve(&Overrides::default(), env(&[]), dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
