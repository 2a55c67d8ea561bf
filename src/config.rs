use crate::defaults;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub chunking: ChunkingConfig,
    pub stt: SttConfig,
    pub dispatch: DispatchConfig,
}

/// Chunk planning configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChunkingConfig {
    pub chunk_length_secs: f64,
    pub min_length_secs: f64,
}

/// Speech-to-text configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SttConfig {
    pub model: String,
    pub language: String,
    /// Explicit model file path. When unset, the model is resolved from the
    /// size name under the cache directory.
    pub model_path: Option<PathBuf>,
}

/// Parallel dispatch configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DispatchConfig {
    pub max_retries: u32,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_length_secs: defaults::CHUNK_LENGTH_SECS,
            min_length_secs: defaults::MIN_LENGTH_SECS,
        }
    }
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            model: defaults::DEFAULT_MODEL.to_string(),
            language: defaults::DEFAULT_LANGUAGE.to_string(),
            model_path: None,
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_retries: defaults::MAX_RETRIES,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Self::default()
                } else {
                    panic!("Failed to load config from {}: {}", path.display(), e);
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - CHATSCRIBE_MODEL → stt.model
    /// - CHATSCRIBE_LANGUAGE → stt.language
    /// - CHATSCRIBE_MODEL_PATH → stt.model_path
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(model) = std::env::var("CHATSCRIBE_MODEL")
            && !model.is_empty()
        {
            self.stt.model = model;
        }

        if let Ok(language) = std::env::var("CHATSCRIBE_LANGUAGE")
            && !language.is_empty()
        {
            self.stt.language = language;
        }

        if let Ok(path) = std::env::var("CHATSCRIBE_MODEL_PATH")
            && !path.is_empty()
        {
            self.stt.model_path = Some(PathBuf::from(path));
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/chatscribe/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .expect("Could not determine config directory")
            .join("chatscribe")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to serialize tests that modify environment variables
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    // SAFETY: These helpers are only used in tests with ENV_LOCK held,
    // ensuring no concurrent access to environment variables.
    fn set_env(key: &str, value: &str) {
        unsafe { std::env::set_var(key, value) }
    }

    fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) }
    }

    fn clear_chatscribe_env() {
        remove_env("CHATSCRIBE_MODEL");
        remove_env("CHATSCRIBE_LANGUAGE");
        remove_env("CHATSCRIBE_MODEL_PATH");
    }

    #[test]
    fn test_default_config_has_correct_values() {
        let config = Config::default();

        assert_eq!(config.chunking.chunk_length_secs, 30.0);
        assert_eq!(config.chunking.min_length_secs, 5.0);

        assert_eq!(config.stt.model, "base");
        assert_eq!(config.stt.language, "en");
        assert_eq!(config.stt.model_path, None);

        assert_eq!(config.dispatch.max_retries, 3);
    }

    #[test]
    fn test_load_from_toml_file() {
        let toml_content = r#"
            [chunking]
            chunk_length_secs = 60.0
            min_length_secs = 2.0

            [stt]
            model = "large"
            language = "ru"
            model_path = "/models/ggml-large.bin"

            [dispatch]
            max_retries = 5
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = Config::load(temp_file.path()).unwrap();

        assert_eq!(config.chunking.chunk_length_secs, 60.0);
        assert_eq!(config.chunking.min_length_secs, 2.0);
        assert_eq!(config.stt.model, "large");
        assert_eq!(config.stt.language, "ru");
        assert_eq!(
            config.stt.model_path,
            Some(PathBuf::from("/models/ggml-large.bin"))
        );
        assert_eq!(config.dispatch.max_retries, 5);
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let toml_content = r#"
            [stt]
            language = "de"
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = Config::load(temp_file.path()).unwrap();

        assert_eq!(config.stt.language, "de");

        // Everything else should be defaults
        assert_eq!(config.stt.model, "base");
        assert_eq!(config.chunking.chunk_length_secs, 30.0);
        assert_eq!(config.chunking.min_length_secs, 5.0);
        assert_eq!(config.dispatch.max_retries, 3);
    }

    #[test]
    fn test_env_override_model() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_chatscribe_env();

        set_env("CHATSCRIBE_MODEL", "tiny");
        let config = Config::default().with_env_overrides();

        assert_eq!(config.stt.model, "tiny");
        assert_eq!(config.stt.language, "en"); // Not overridden

        clear_chatscribe_env();
    }

    #[test]
    fn test_env_override_all() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_chatscribe_env();

        set_env("CHATSCRIBE_MODEL", "medium");
        set_env("CHATSCRIBE_LANGUAGE", "fr");
        set_env("CHATSCRIBE_MODEL_PATH", "/opt/models/ggml-medium.bin");

        let config = Config::default().with_env_overrides();

        assert_eq!(config.stt.model, "medium");
        assert_eq!(config.stt.language, "fr");
        assert_eq!(
            config.stt.model_path,
            Some(PathBuf::from("/opt/models/ggml-medium.bin"))
        );

        clear_chatscribe_env();
    }

    #[test]
    fn test_env_override_empty_string_ignored() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_chatscribe_env();

        set_env("CHATSCRIBE_MODEL", "");
        let config = Config::default().with_env_overrides();

        assert_eq!(config.stt.model, "base");

        clear_chatscribe_env();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let invalid_toml = r#"
            [stt
            model = "broken
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(invalid_toml.as_bytes()).unwrap();

        let result = Config::load(temp_file.path());

        assert!(result.is_err());
    }

    #[test]
    fn test_default_path_is_xdg_compliant() {
        let path = Config::default_path();
        let path_str = path.to_string_lossy();

        assert!(path_str.contains("chatscribe"));
        assert!(path_str.ends_with("config.toml"));
    }

    #[test]
    fn test_load_or_default_returns_default_for_missing_file() {
        let missing_path = Path::new("/tmp/nonexistent_chatscribe_config_12345.toml");
        let config = Config::load_or_default(missing_path);

        assert_eq!(config, Config::default());
    }

    #[test]
    #[should_panic(expected = "Failed to load config")]
    fn test_load_or_default_panics_on_invalid_toml() {
        let invalid_toml = r#"
            [stt
            model = "broken
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(invalid_toml.as_bytes()).unwrap();

        Config::load_or_default(temp_file.path());
    }
}
