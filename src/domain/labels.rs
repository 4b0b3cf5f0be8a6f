//! Label table mapping class indexes to human-readable names.
//!
//! The table is loaded from a text file with one label per line; the line
//! number is the class index and must match the class ordering of the
//! exported model. For the reference MobileNetV2 artifact this is the
//! 1000-class ImageNet ordering.

use crate::core::{ClassifierError, ClsResult};
use std::path::Path;
use std::sync::Arc;

/// An immutable index -> label lookup table.
#[derive(Debug, Clone)]
pub struct LabelTable {
    labels: Vec<Arc<str>>,
}

impl LabelTable {
    /// Reads a label table from a file, one label per line.
    ///
    /// Leading/trailing whitespace is trimmed; blank lines are kept as empty
    /// labels so indexes stay aligned with the model's class ordering.
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error if the file cannot be read and a
    /// configuration error if it contains no labels.
    pub fn from_file(path: &Path) -> ClsResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ClassifierError::InvalidInput {
            message: format!("failed to read label table from '{}': {e}", path.display()),
        })?;
        Self::from_lines(content.lines().map(|s| s.trim().to_string()))
    }

    /// Builds a label table from an iterator of labels.
    pub fn from_lines(lines: impl IntoIterator<Item = String>) -> ClsResult<Self> {
        let labels: Vec<Arc<str>> = lines.into_iter().map(Arc::from).collect();
        if labels.is_empty() {
            return Err(ClassifierError::config_error("label table is empty"));
        }
        Ok(Self { labels })
    }

    /// Returns the label for a class index.
    pub fn get(&self, index: usize) -> Option<&Arc<str>> {
        self.labels.get(index)
    }

    /// Number of classes in the table.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// True if the table holds no labels.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Converts the table into the class-name vector consumed by
    /// [`Topk::from_class_names`](crate::processors::Topk::from_class_names).
    pub fn to_class_names(&self) -> Vec<String> {
        self.labels.iter().map(|l| l.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_labels_in_file_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "tench").unwrap();
        writeln!(file, "goldfish").unwrap();
        writeln!(file, "great white shark").unwrap();
        file.flush().unwrap();

        let table = LabelTable::from_file(file.path()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(0).map(|l| l.as_ref()), Some("tench"));
        assert_eq!(table.get(2).map(|l| l.as_ref()), Some("great white shark"));
        assert_eq!(table.get(3), None);
    }

    #[test]
    fn missing_file_is_invalid_input() {
        let err = LabelTable::from_file(Path::new("no/such/labels.txt")).unwrap_err();
        assert!(matches!(err, ClassifierError::InvalidInput { .. }));
    }

    #[test]
    fn empty_table_is_a_config_error() {
        let err = LabelTable::from_lines(std::iter::empty()).unwrap_err();
        assert!(matches!(err, ClassifierError::ConfigError { .. }));
    }
}
