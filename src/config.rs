//! Configuration types for DOCX-to-AsciiDoc conversion.
//!
//! All pipeline behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`] or loaded from a `config.yaml` file.
//! Keeping every knob in one explicit value (rather than module-level
//! ambient state) lets the same process run two differently-configured
//! pipelines, and lets tests construct throwaway configs pointing at
//! temporary directories without cross-contamination.

use crate::error::Docx2AdocError;
use edgequake_llm::LLMProvider;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default model used when neither the config file nor the CLI names one.
pub const DEFAULT_MODEL: &str = "gpt-5";

/// Configuration for the conversion and normalization pipelines.
///
/// Built via [`ConversionConfig::builder()`],
/// [`ConversionConfig::from_yaml_file()`], or
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use docx2adoc::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .input_dir("docs_input")
///     .output_dir("docs_asciidoc")
///     .model("gpt-5")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Directory scanned for `*.docx` input documents.
    pub input_dir: PathBuf,

    /// Directory where `<base>.adoc` files are written.
    pub output_dir: PathBuf,

    /// Name of the images subdirectory inside `output_dir`. Default:
    /// `images_exported`. The Reference Reconciler also expects this
    /// directory to sit alongside the markup file it normalizes.
    pub images_dir_name: String,

    /// Name of the quarantine directory for pre-normalization backups,
    /// created alongside the markup files on demand. Default:
    /// `backup_before_normalization`. Append-only: nothing in this crate
    /// ever deletes or prunes it.
    pub backup_dir_name: String,

    /// LLM model identifier. Default: [`DEFAULT_MODEL`].
    pub model: String,

    /// API key for the generation service. When set, exported to the
    /// provider environment before provider construction; when `None` the
    /// provider factory reads whatever key variables are already present.
    pub api_key: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    /// If `None` along with `provider`, the factory auto-detects from the
    /// environment.
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    /// This is the injection point used by tests.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Custom system prompt. If `None`, uses the built-in default.
    pub system_prompt: Option<String>,

    /// Sampling temperature for the generation call. Default: 0.1.
    ///
    /// Reconstruction should be faithful, not creative; low temperature
    /// keeps the model close to the extracted text and image content.
    pub temperature: f32,

    /// Maximum tokens the model may generate per document. Default: 8192.
    pub max_tokens: usize,

    /// Maximum retry attempts on a transient generation failure. Default: 2.
    ///
    /// The service boundary itself carries no retry contract, so resilience
    /// is added here, outside the single-shot call.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds (exponential backoff). Default: 500.
    pub retry_backoff_ms: u64,

    /// Per-call generation timeout in seconds. Default: 120.
    ///
    /// A whole-document multimodal request is much larger than a chat turn;
    /// the timeout exists because the boundary defines none of its own.
    pub api_timeout_secs: u64,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("docs_input"),
            output_dir: PathBuf::from("docs_asciidoc"),
            images_dir_name: "images_exported".to_string(),
            backup_dir_name: "backup_before_normalization".to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            provider_name: None,
            provider: None,
            system_prompt: None,
            temperature: 0.1,
            max_tokens: 8192,
            max_retries: 2,
            retry_backoff_ms: 500,
            api_timeout_secs: 120,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("input_dir", &self.input_dir)
            .field("output_dir", &self.output_dir)
            .field("images_dir_name", &self.images_dir_name)
            .field("backup_dir_name", &self.backup_dir_name)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Load configuration from a YAML file.
    ///
    /// The file shape matches the batch pipeline's historical format:
    ///
    /// ```yaml
    /// openai:
    ///   api_key: sk-xxxx
    /// paths:
    ///   input_folder: docs_input
    ///   output_folder: docs_asciidoc
    ///   images_folder: images_exported
    /// model: gpt-5
    /// ```
    ///
    /// A missing file is a fatal startup condition; the error message shows
    /// the expected content.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, Docx2AdocError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Docx2AdocError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let text = std::fs::read_to_string(path).map_err(|e| Docx2AdocError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

        let raw: YamlConfig =
            serde_yaml::from_str(&text).map_err(|e| Docx2AdocError::ConfigInvalid {
                path: path.to_path_buf(),
                detail: e.to_string(),
            })?;

        let mut config = Self::default();
        if let Some(openai) = raw.openai {
            config.api_key = openai.api_key;
        }
        if let Some(paths) = raw.paths {
            if let Some(d) = paths.input_folder {
                config.input_dir = PathBuf::from(d);
            }
            if let Some(d) = paths.output_folder {
                config.output_dir = PathBuf::from(d);
            }
            if let Some(d) = paths.images_folder {
                config.images_dir_name = d;
            }
        }
        if let Some(model) = raw.model {
            config.model = model;
        }
        Ok(config)
    }

    /// Full path of the images directory under the output directory.
    pub fn images_dir(&self) -> PathBuf {
        self.output_dir.join(&self.images_dir_name)
    }
}

/// Raw deserialization target for the YAML config file.
#[derive(Debug, Deserialize)]
struct YamlConfig {
    openai: Option<YamlOpenAi>,
    paths: Option<YamlPaths>,
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct YamlOpenAi {
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct YamlPaths {
    input_folder: Option<String>,
    output_folder: Option<String>,
    images_folder: Option<String>,
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.input_dir = dir.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn images_dir_name(mut self, name: impl Into<String>) -> Self {
        self.config.images_dir_name = name.into();
        self
    }

    pub fn backup_dir_name(mut self, name: impl Into<String>) -> Self {
        self.config.backup_dir_name = name.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Docx2AdocError> {
        let c = &self.config;
        if c.images_dir_name.is_empty() {
            return Err(Docx2AdocError::InvalidConfig(
                "images_dir_name must not be empty".into(),
            ));
        }
        if c.backup_dir_name.is_empty() {
            return Err(Docx2AdocError::InvalidConfig(
                "backup_dir_name must not be empty".into(),
            ));
        }
        if c.api_timeout_secs == 0 {
            return Err(Docx2AdocError::InvalidConfig(
                "api_timeout_secs must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}
