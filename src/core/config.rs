//! Configuration types for the classifier.
//!
//! This module provides the shared model configuration, ONNX Runtime session
//! options, and the validation trait used by the predictor builder.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A model path was required but does not exist.
    #[error("model path does not exist: {path}")]
    ModelPathNotFound { path: PathBuf },

    /// A labels path was required but does not exist.
    #[error("labels path does not exist: {path}")]
    LabelsPathNotFound { path: PathBuf },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Validation failed for a specific field.
    #[error("validation failed: {message}")]
    ValidationFailed { message: String },
}

/// A trait for validating configuration parameters.
///
/// Implementors provide `validate` and `get_defaults`; the provided helpers
/// cover the common field checks.
pub trait ConfigValidator {
    /// Validates the configuration.
    fn validate(&self) -> Result<(), ConfigError>;

    /// Returns the default configuration.
    fn get_defaults() -> Self
    where
        Self: Sized;

    /// Validates that a usize parameter is greater than 0.
    fn validate_positive_usize(&self, value: usize, field: &str) -> Result<(), ConfigError> {
        if value == 0 {
            Err(ConfigError::ValidationFailed {
                message: format!("{field} must be greater than 0"),
            })
        } else {
            Ok(())
        }
    }

    /// Validates that image dimensions are non-zero and within a sane bound.
    fn validate_image_dimensions(&self, width: u32, height: u32) -> Result<(), ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::ValidationFailed {
                message: format!("image dimensions must be non-zero, got {width}x{height}"),
            });
        }
        const MAX_DIM: u32 = 8192;
        if width > MAX_DIM || height > MAX_DIM {
            return Err(ConfigError::ValidationFailed {
                message: format!("image dimensions {width}x{height} exceed maximum {MAX_DIM}"),
            });
        }
        Ok(())
    }
}

/// Graph optimization levels for ONNX Runtime.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OrtGraphOptimizationLevel {
    /// Disable all optimizations.
    DisableAll,
    /// Enable basic optimizations.
    Level1,
    /// Enable extended optimizations.
    Level2,
    /// Enable all optimizations.
    Level3,
}

impl Default for OrtGraphOptimizationLevel {
    fn default() -> Self {
        Self::Level3
    }
}

/// Configuration for ONNX Runtime sessions.
///
/// Only the CPU execution provider is used; the knobs here cover threading
/// and graph optimization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrtSessionConfig {
    /// Number of threads used to parallelize execution within nodes.
    pub intra_threads: Option<usize>,
    /// Number of threads used to parallelize execution across nodes.
    pub inter_threads: Option<usize>,
    /// Enable parallel execution mode.
    pub parallel_execution: Option<bool>,
    /// Graph optimization level.
    pub optimization_level: Option<OrtGraphOptimizationLevel>,
}

impl OrtSessionConfig {
    /// Creates a new OrtSessionConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of intra-op threads.
    pub fn with_intra_threads(mut self, threads: usize) -> Self {
        self.intra_threads = Some(threads);
        self
    }

    /// Sets the number of inter-op threads.
    pub fn with_inter_threads(mut self, threads: usize) -> Self {
        self.inter_threads = Some(threads);
        self
    }

    /// Enables or disables parallel execution mode.
    pub fn with_parallel_execution(mut self, enabled: bool) -> Self {
        self.parallel_execution = Some(enabled);
        self
    }

    /// Sets the graph optimization level.
    pub fn with_optimization_level(mut self, level: OrtGraphOptimizationLevel) -> Self {
        self.optimization_level = Some(level);
        self
    }
}

/// Common configuration shared by the classifier builder.
///
/// Carries the artifact locations and session options; the classifier-specific
/// knobs (top-k, input shape) live on the predictor config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommonModelConfig {
    /// The path to the ONNX model file (optional until build time).
    pub model_path: Option<PathBuf>,
    /// The path to the label table, one label per line (optional until build time).
    pub labels_path: Option<PathBuf>,
    /// The name of the model (optional).
    pub model_name: Option<String>,
    /// Expected SHA-256 of the model file, hex-encoded (optional).
    #[serde(default)]
    pub model_sha256: Option<String>,
    /// ONNX Runtime session configuration (optional).
    #[serde(default)]
    pub ort_session: Option<OrtSessionConfig>,
    /// Size of the session pool for concurrent predictions (>= 1).
    /// If None, defaults to 1 (single session).
    #[serde(default)]
    pub session_pool_size: Option<usize>,
}

impl CommonModelConfig {
    /// Creates a new CommonModelConfig with default values.
    pub fn new() -> Self {
        Self {
            session_pool_size: Some(1),
            ..Self::default()
        }
    }

    /// Creates a config pre-populated with a model name.
    pub fn with_defaults(model_name: Option<String>) -> Self {
        Self {
            model_name,
            session_pool_size: Some(1),
            ..Self::default()
        }
    }

    /// Sets the model path.
    pub fn model_path(mut self, model_path: impl Into<PathBuf>) -> Self {
        self.model_path = Some(model_path.into());
        self
    }

    /// Sets the labels path.
    pub fn labels_path(mut self, labels_path: impl Into<PathBuf>) -> Self {
        self.labels_path = Some(labels_path.into());
        self
    }

    /// Sets the model name.
    pub fn model_name(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = Some(model_name.into());
        self
    }

    /// Sets the expected SHA-256 of the model file (hex-encoded).
    pub fn model_sha256(mut self, digest: impl Into<String>) -> Self {
        self.model_sha256 = Some(digest.into());
        self
    }

    /// Sets the ONNX Runtime session configuration.
    pub fn ort_session(mut self, config: OrtSessionConfig) -> Self {
        self.ort_session = Some(config);
        self
    }

    /// Sets the session pool size.
    pub fn session_pool_size(mut self, size: usize) -> Self {
        self.session_pool_size = Some(size);
        self
    }
}

impl ConfigValidator for CommonModelConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(size) = self.session_pool_size {
            self.validate_positive_usize(size, "session_pool_size")?;
        }

        if let Some(digest) = &self.model_sha256 {
            if digest.len() != 64 || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(ConfigError::InvalidConfig {
                    message: format!(
                        "model_sha256 must be a 64-character hex digest, got '{digest}'"
                    ),
                });
            }
        }

        Ok(())
    }

    fn get_defaults() -> Self {
        Self::new()
    }
}

impl From<ConfigError> for crate::core::ClassifierError {
    fn from(error: ConfigError) -> Self {
        Self::ConfigError {
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pool_size_is_one() {
        let config = CommonModelConfig::new();
        assert_eq!(config.session_pool_size, Some(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_pool_size_is_rejected() {
        let config = CommonModelConfig::new().session_pool_size(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn sha256_digest_must_be_hex() {
        let config = CommonModelConfig::new().model_sha256("not-a-digest");
        assert!(config.validate().is_err());

        let config = CommonModelConfig::new().model_sha256(
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_setters_accumulate() {
        let config = CommonModelConfig::new()
            .model_path("models/mobilenet_v2.onnx")
            .labels_path("models/imagenet_labels.txt")
            .model_name("mobilenet_v2")
            .ort_session(OrtSessionConfig::new().with_intra_threads(2));

        assert_eq!(
            config.model_path.as_deref(),
            Some(std::path::Path::new("models/mobilenet_v2.onnx"))
        );
        assert_eq!(config.model_name.as_deref(), Some("mobilenet_v2"));
        assert_eq!(config.ort_session.unwrap().intra_threads, Some(2));
    }
}
