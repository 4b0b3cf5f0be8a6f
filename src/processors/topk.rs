//! Top-k classification result processing.

use crate::core::{ClassifierError, ClsResult};
use std::collections::HashMap;

/// Result of top-k processing for a single prediction.
///
/// Contains the selected class indexes, their confidence scores, and the
/// mapped class names when a mapping is available, all ordered by
/// descending score.
#[derive(Debug, Clone)]
pub struct TopkResult {
    /// Top-k class indexes, highest score first.
    pub indexes: Vec<usize>,
    /// Scores corresponding to `indexes`.
    pub scores: Vec<f32>,
    /// Class names corresponding to `indexes`, if a mapping was provided.
    pub class_names: Option<Vec<String>>,
}

/// Extracts the top-k entries from a classification output.
#[derive(Debug)]
pub struct Topk {
    /// Optional mapping from class IDs to class names.
    class_id_map: Option<HashMap<usize, String>>,
}

impl Topk {
    /// Creates a new Topk processor with optional class name mapping.
    pub fn new(class_id_map: Option<HashMap<usize, String>>) -> Self {
        Self { class_id_map }
    }

    /// Creates a new Topk processor without class name mapping.
    pub fn without_class_names() -> Self {
        Self::new(None)
    }

    /// Creates a new Topk processor with class names from a vector.
    ///
    /// The vector index corresponds to the class ID.
    pub fn from_class_names(class_names: Vec<String>) -> Self {
        let class_id_map: HashMap<usize, String> = class_names.into_iter().enumerate().collect();
        Self::new(Some(class_id_map))
    }

    /// Processes a prediction vector to extract its top-k entries.
    ///
    /// `k` is capped at the number of classes. Equal scores keep ascending
    /// class-index order (the sort is stable on a descending-score key).
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error if `k` is 0 or the prediction is empty.
    pub fn process(&self, prediction: &[f32], k: usize) -> ClsResult<TopkResult> {
        if k == 0 {
            return Err(ClassifierError::invalid_input("k must be greater than 0"));
        }

        if prediction.is_empty() {
            return Err(ClassifierError::invalid_input("empty prediction vector"));
        }

        let effective_k = k.min(prediction.len());

        let mut indexed_scores: Vec<(usize, f32)> = prediction
            .iter()
            .enumerate()
            .map(|(idx, &score)| (idx, score))
            .collect();

        indexed_scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let (indexes, scores): (Vec<usize>, Vec<f32>) =
            indexed_scores.into_iter().take(effective_k).unzip();

        let class_names = self
            .class_id_map
            .as_ref()
            .map(|_| self.map_indexes_to_names(&indexes));

        Ok(TopkResult {
            indexes,
            scores,
            class_names,
        })
    }

    /// Maps class indexes to class names using the internal mapping.
    ///
    /// Unknown indexes are rendered as `Unknown(idx)`.
    fn map_indexes_to_names(&self, indexes: &[usize]) -> Vec<String> {
        if let Some(ref class_map) = self.class_id_map {
            indexes
                .iter()
                .map(|&idx| {
                    class_map
                        .get(&idx)
                        .cloned()
                        .unwrap_or_else(|| format!("Unknown({idx})"))
                })
                .collect()
        } else {
            indexes.iter().map(|&idx| idx.to_string()).collect()
        }
    }

    /// Gets the class name for a given class ID.
    pub fn get_class_name(&self, class_id: usize) -> Option<&String> {
        self.class_id_map.as_ref()?.get(&class_id)
    }

    /// Checks if class name mapping is available.
    pub fn has_class_names(&self) -> bool {
        self.class_id_map.is_some()
    }

    /// Gets the number of classes in the mapping, if available.
    pub fn num_classes(&self) -> Option<usize> {
        self.class_id_map.as_ref().map(|map| map.len())
    }
}

impl Default for Topk {
    fn default() -> Self {
        Self::without_class_names()
    }
}
