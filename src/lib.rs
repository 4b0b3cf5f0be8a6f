//! # taglens
//!
//! A small image-classification demo service: upload a JPEG or PNG, get the
//! top-3 predicted labels with confidence scores from a pretrained
//! MobileNetV2-family ONNX model.
//!
//! ## Pipeline
//!
//! - **Model Provider**: loads the ONNX session and label table once per
//!   process and hands out a shared read-only handle
//! - **Preprocessing**: decode to RGB, resize to 224x224, normalize into
//!   [-1, 1], add the batch dimension
//! - **Inference & Decoding**: one forward pass, then top-k selection mapped
//!   through the label table
//!
//! ## Modules
//!
//! * [`core`] - errors, configuration, tensor aliases, the ONNX engine
//! * [`processors`] - resize, normalization, and top-k stages
//! * [`domain`] - label tables
//! * [`predictor`] - the classifier, its builder, and the model provider
//! * [`server`] - the axum web surface (upload page + classify endpoint)
//! * [`utils`] - image decoding helpers and logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use taglens::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let classifier = ImageClassifierBuilder::new()
//!     .model_path("models/mobilenet_v2.onnx")
//!     .labels_path("models/imagenet_labels.txt")
//!     .topk(3)
//!     .build()?;
//!
//! let result = classifier.classify_bytes(&std::fs::read("dog.jpg")?)?;
//! for prediction in result.predictions() {
//!     println!("{}: {:.2}%", prediction.label, prediction.confidence * 100.0);
//! }
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod domain;
pub mod predictor;
pub mod processors;
pub mod server;
pub mod utils;

/// Prelude module for convenient imports.
///
/// Bring the essentials into scope with a single use statement:
///
/// ```rust
/// use taglens::prelude::*;
/// ```
pub mod prelude {
    pub use crate::core::{ClassifierError, ClsResult, StandardPredictor};
    pub use crate::domain::LabelTable;
    pub use crate::predictor::{
        ClassificationResult, ImageClassifier, ImageClassifierBuilder, ImageClassifierConfig,
        ModelProvider, Prediction,
    };
    pub use crate::utils::{decode_image, load_image};
}
