//! Load-once model provider.
//!
//! The classifier is expensive to construct (ONNX session build plus label
//! table parse), so it is loaded exactly once per process and shared
//! read-only afterwards. The provider is an explicit handle that gets passed
//! to whoever needs the model; there is no ambient global.

use crate::core::config::ConfigValidator;
use crate::core::{ClassifierError, ClsResult};
use crate::predictor::{ImageClassifier, ImageClassifierConfig};
use crate::domain::LabelTable;
use once_cell::sync::OnceCell;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Provides the process-wide classifier instance.
///
/// The first [`get`](Self::get) loads the model; every later call returns
/// the same `Arc` without reloading. A load failure is reported to the
/// caller and is expected to be treated as fatal at startup.
#[derive(Debug)]
pub struct ModelProvider {
    config: ImageClassifierConfig,
    model: OnceCell<Arc<ImageClassifier>>,
}

impl ModelProvider {
    /// Creates a provider for the given configuration. Nothing is loaded yet.
    pub fn new(config: ImageClassifierConfig) -> Self {
        Self {
            config,
            model: OnceCell::new(),
        }
    }

    /// Returns the shared classifier, loading it on the first call.
    pub fn get(&self) -> ClsResult<Arc<ImageClassifier>> {
        self.model
            .get_or_try_init(|| self.load().map(Arc::new))
            .cloned()
    }

    /// True once the model has been loaded.
    pub fn is_loaded(&self) -> bool {
        self.model.get().is_some()
    }

    fn load(&self) -> ClsResult<ImageClassifier> {
        self.config.validate()?;

        let model_path = self.config.common.model_path.clone().ok_or_else(|| {
            ClassifierError::config_error("model_path is required to load the classifier")
        })?;
        let labels_path = self.config.common.labels_path.clone().ok_or_else(|| {
            ClassifierError::config_error("labels_path is required to load the classifier")
        })?;

        if let Some(expected) = &self.config.common.model_sha256 {
            verify_model_checksum(&model_path, expected)?;
        }

        let labels = LabelTable::from_file(&labels_path)?;
        let classifier = ImageClassifier::new(self.config.clone(), &model_path, labels)?;

        info!(
            model = classifier.model_name(),
            classes = classifier.num_classes(),
            path = %model_path.display(),
            "classifier loaded"
        );

        Ok(classifier)
    }
}

/// Verifies that the model file matches the pinned SHA-256 digest.
fn verify_model_checksum(path: &Path, expected: &str) -> ClsResult<()> {
    let actual = sha256_file(path)?;
    if !actual.eq_ignore_ascii_case(expected) {
        return Err(ClassifierError::model_load(
            path,
            format!("checksum mismatch: expected {expected}, got {actual}"),
            None::<std::io::Error>,
        ));
    }
    Ok(())
}

/// Computes the hex-encoded SHA-256 digest of a file.
fn sha256_file(path: &Path) -> ClsResult<String> {
    let bytes = std::fs::read(path).map_err(|e| {
        ClassifierError::model_load(path, "failed to read model file for checksum", Some(e))
    })?;
    let digest = Sha256::digest(&bytes);
    Ok(hex::encode(digest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn sha256_of_known_content() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"hello world").unwrap();
        file.flush().unwrap();

        let digest = sha256_file(file.path()).unwrap();
        assert_eq!(
            digest,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn checksum_mismatch_is_a_model_load_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"model bytes").unwrap();
        file.flush().unwrap();

        let err = verify_model_checksum(
            file.path(),
            "0000000000000000000000000000000000000000000000000000000000000000",
        )
        .unwrap_err();
        assert!(matches!(err, ClassifierError::ModelLoad { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn provider_without_paths_fails_to_load() {
        let provider = ModelProvider::new(ImageClassifierConfig::new());
        let err = provider.get().unwrap_err();
        assert!(matches!(err, ClassifierError::ConfigError { .. }));
        assert!(!provider.is_loaded());
    }
}
