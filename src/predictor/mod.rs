//! Predictors built on the core pipeline.

pub mod image_classifier;
pub mod provider;

pub use image_classifier::{
    ClassificationResult, ClassifyOptions, ImageClassifier, ImageClassifierBuilder,
    ImageClassifierConfig, Prediction, DEFAULT_INPUT_SHAPE, DEFAULT_TOP_K,
};
pub use provider::ModelProvider;
