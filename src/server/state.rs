//! Application state shared across request handlers.

use crate::predictor::ImageClassifier;
use std::sync::Arc;

/// Shared state for the web application.
///
/// The classifier is read-only after startup, so cloning the state per
/// request is just an `Arc` bump.
#[derive(Clone)]
pub struct AppState {
    /// The process-wide classifier instance.
    pub classifier: Arc<ImageClassifier>,
}

impl AppState {
    /// Creates application state around a loaded classifier.
    pub fn new(classifier: Arc<ImageClassifier>) -> Self {
        Self { classifier }
    }
}
