//! The core module of the classification pipeline.
//!
//! This module contains the fundamental components of the pipeline:
//! - Configuration management and validation
//! - Error handling
//! - ONNX Runtime inference engine integration
//! - Tensor aliases and the predictor trait
//!
//! It also re-exports the commonly used types for convenience.

pub mod config;
pub mod errors;
pub mod inference;
pub mod tensor;
pub mod traits;

pub use config::{CommonModelConfig, ConfigError, ConfigValidator, OrtSessionConfig};
pub use errors::{ClassifierError, ClsResult, ProcessingStage};
pub use inference::OrtInfer;
pub use tensor::{Tensor2D, Tensor4D};
pub use traits::StandardPredictor;
