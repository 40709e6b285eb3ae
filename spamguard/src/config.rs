use crate::error::{Result, SpamGuardError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Prefix for environment overrides, e.g. `SPAMGUARD_MODELS__DIR`.
pub const ENV_PREFIX: &str = "SPAMGUARD";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub models: ModelConfig,
    pub normalizer: NormalizerConfig,
    pub scanner: ScannerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelConfig {
    pub dir: PathBuf,
    pub vectorizer_file: String,
    pub classifier_file: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NormalizerConfig {
    pub strip_html: bool,
    pub strip_mime_boilerplate: bool,
    pub min_token_len: usize,
    pub max_token_len: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Records above this size are skipped instead of buffered.
    pub max_message_bytes: usize,
    /// Truncates the body kept on each report row. The classifier always sees the full body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_preview_chars: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Compact,
    Json,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("models"),
            vectorizer_file: "vectorizer.json".to_string(),
            classifier_file: "classifier.json".to_string(),
        }
    }
}

impl ModelConfig {
    /// Model config rooted at `dir` with the default file names.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ..Self::default()
        }
    }

    pub fn vectorizer_path(&self) -> PathBuf {
        self.dir.join(&self.vectorizer_file)
    }

    pub fn classifier_path(&self) -> PathBuf {
        self.dir.join(&self.classifier_file)
    }
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            strip_html: true,
            strip_mime_boilerplate: true,
            min_token_len: 2,
            max_token_len: 40,
        }
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            max_message_bytes: 25 * 1024 * 1024, // 25MB
            body_preview_chars: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl PipelineConfig {
    /// Layer an optional TOML file and `SPAMGUARD_*` environment variables over the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_layered(path, None)
    }

    /// `env` replaces the process environment when given.
    pub(crate) fn load_layered(
        path: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(SpamGuardError::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            builder = builder.add_source(config::File::from(path).format(config::FileFormat::Toml));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()
            .map_err(|e| SpamGuardError::Config(e.to_string()))?;

        let config: Self = settings
            .try_deserialize()
            .map_err(|e| SpamGuardError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| SpamGuardError::Config(e.to_string()))?;

        let config: Self =
            toml::from_str(&content).map_err(|e| SpamGuardError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| SpamGuardError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        let n = &self.normalizer;
        if n.min_token_len == 0 || n.min_token_len > n.max_token_len {
            return Err(SpamGuardError::Config(format!(
                "invalid token length bounds [{}, {}]",
                n.min_token_len, n.max_token_len
            )));
        }
        if self.scanner.max_message_bytes == 0 {
            return Err(SpamGuardError::Config(
                "scanner.max_message_bytes must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
