//! Error types for the classification pipeline.
//!
//! This module defines the errors that can occur while turning uploaded
//! bytes into predictions: image decoding errors, processing errors,
//! inference errors, and configuration errors, together with helper
//! constructors for attaching context.

use thiserror::Error;

/// Enum representing different stages of processing in the classification pipeline.
///
/// Used to identify which stage of the pipeline an error occurred in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProcessingStage {
    /// Error occurred during tensor operations.
    TensorOperation,
    /// Error occurred during image normalization.
    Normalization,
    /// Error occurred during image resizing.
    Resize,
    /// Error occurred during post-processing (top-k decoding).
    PostProcessing,
    /// Generic processing error.
    Generic,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::TensorOperation => write!(f, "tensor operation"),
            ProcessingStage::Normalization => write!(f, "normalization"),
            ProcessingStage::Resize => write!(f, "resize"),
            ProcessingStage::PostProcessing => write!(f, "post-processing"),
            ProcessingStage::Generic => write!(f, "processing"),
        }
    }
}

/// Enum representing the errors that can occur in the classification pipeline.
///
/// Classification is all-or-nothing: any of these surfaced from
/// [`classify`](crate::predictor::ImageClassifier::classify_bytes) means no
/// predictions were produced for the request.
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// The uploaded bytes could not be decoded as an image.
    #[error("image decode")]
    ImageDecode(#[source] image::ImageError),

    /// Error occurred during preprocessing or postprocessing.
    #[error("{kind} failed: {context}")]
    Processing {
        /// The stage of processing where the error occurred.
        kind: ProcessingStage,
        /// Additional context about the error.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error occurred during the model forward pass.
    #[error("inference")]
    Inference(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Error indicating invalid input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    ConfigError {
        /// A message describing the configuration error.
        message: String,
    },

    /// The model artifact could not be loaded. Fatal at startup.
    #[error("model load from '{}': {context}", path.display())]
    ModelLoad {
        /// Path of the artifact that failed to load.
        path: std::path::PathBuf,
        /// Additional context about the failure.
        context: String,
        /// The underlying error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Error from the ONNX Runtime session.
    #[error(transparent)]
    Session(#[from] ort::Error),

    /// Error from tensor shape operations.
    #[error("tensor operation")]
    Tensor(#[from] ndarray::ShapeError),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

/// Convenient result alias for classification operations.
pub type ClsResult<T> = Result<T, ClassifierError>;

impl ClassifierError {
    /// Creates a ClassifierError for tensor operations.
    pub fn tensor_operation(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind: ProcessingStage::TensorOperation,
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates a ClassifierError for normalization operations.
    pub fn normalization(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind: ProcessingStage::Normalization,
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates a ClassifierError for resize operations.
    pub fn resize_error(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind: ProcessingStage::Resize,
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates a ClassifierError for post-processing operations.
    pub fn post_processing(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind: ProcessingStage::PostProcessing,
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates a ClassifierError for inference operations.
    pub fn inference_error(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Inference(Box::new(error))
    }

    /// Creates a ClassifierError for invalid input.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a ClassifierError for configuration errors.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Creates a ClassifierError for model load failures.
    pub fn model_load(
        path: &std::path::Path,
        context: impl Into<String>,
        source: Option<impl std::error::Error + Send + Sync + 'static>,
    ) -> Self {
        Self::ModelLoad {
            path: path.to_path_buf(),
            context: context.into(),
            source: source.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
        }
    }

    /// True if the error is fatal for the process (model cannot be obtained).
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ModelLoad { .. } | Self::ConfigError { .. })
    }
}

impl From<image::ImageError> for ClassifierError {
    fn from(error: image::ImageError) -> Self {
        Self::ImageDecode(error)
    }
}

/// A minimal string-backed error for wrapping plain messages as sources.
#[derive(Debug)]
pub struct SimpleError {
    message: String,
}

impl SimpleError {
    /// Creates a new SimpleError with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SimpleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SimpleError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn processing_stage_display() {
        assert_eq!(ProcessingStage::Resize.to_string(), "resize");
        assert_eq!(
            ProcessingStage::PostProcessing.to_string(),
            "post-processing"
        );
    }

    #[test]
    fn model_load_is_fatal() {
        let err = ClassifierError::model_load(
            std::path::Path::new("missing.onnx"),
            "no such file",
            None::<std::io::Error>,
        );
        assert!(err.is_fatal());
        assert!(err.to_string().contains("missing.onnx"));
    }

    #[test]
    fn classification_errors_are_not_fatal() {
        let err = ClassifierError::invalid_input("empty upload");
        assert!(!err.is_fatal());

        let err = ClassifierError::resize_error("0x0 target", SimpleError::new("bad dims"));
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("resize failed"));
    }
}
