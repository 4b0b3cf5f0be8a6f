//! Image classifier
//!
//! This module provides the pretrained-classifier predictor: it takes an
//! uploaded image, resizes and normalizes it into the model's input tensor,
//! runs one forward pass through the ONNX session, and decodes the top-k
//! classes into labeled predictions.

use crate::core::config::{CommonModelConfig, ConfigValidator, OrtSessionConfig};
use crate::core::traits::StandardPredictor;
use crate::core::{ClassifierError, ClsResult, OrtInfer, Tensor2D, Tensor4D};
use crate::domain::LabelTable;
use crate::processors::{ChannelOrder, NormalizeImage, ResizeToFixed, Topk};
use crate::utils::decode_image;
use image::RgbImage;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

/// Default number of predictions returned per image.
pub const DEFAULT_TOP_K: usize = 3;

/// Default model input resolution (width, height).
pub const DEFAULT_INPUT_SHAPE: (u32, u32) = (224, 224);

/// A single labeled prediction.
#[derive(Debug, Clone)]
pub struct Prediction {
    /// Human-readable class label.
    pub label: Arc<str>,
    /// Confidence score in [0, 1].
    pub confidence: f32,
}

/// Result of classifying one image.
///
/// The vectors are parallel and ordered by descending confidence; their
/// length is at most the configured top-k. Either all stages succeeded and
/// the result is fully populated, or the call returned an error and no
/// result exists.
#[derive(Debug, Clone)]
pub struct ClassificationResult {
    /// Predicted class IDs, highest confidence first.
    pub class_ids: Vec<usize>,
    /// Confidence scores corresponding to `class_ids`.
    pub scores: Vec<f32>,
    /// Label names corresponding to `class_ids`.
    pub labels: Vec<Arc<str>>,
}

impl ClassificationResult {
    /// Iterates over the result as (label, confidence) pairs.
    pub fn predictions(&self) -> impl Iterator<Item = Prediction> + '_ {
        self.labels
            .iter()
            .zip(&self.scores)
            .map(|(label, &confidence)| Prediction {
                label: Arc::clone(label),
                confidence,
            })
    }

    /// Number of predictions in the result.
    pub fn len(&self) -> usize {
        self.class_ids.len()
    }

    /// True if the result holds no predictions.
    pub fn is_empty(&self) -> bool {
        self.class_ids.is_empty()
    }
}

/// Configuration for the image classifier.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ImageClassifierConfig {
    /// Common model configuration (artifact paths, session options).
    pub common: CommonModelConfig,
    /// Number of top predictions to return for each image.
    pub topk: Option<usize>,
    /// Input shape for the model (width, height).
    pub input_shape: Option<(u32, u32)>,
    /// Channel order of the input tensor (HWC for the MobileNet family).
    pub channel_order: Option<ChannelOrder>,
    /// Apply a softmax to the raw output before decoding.
    ///
    /// The reference artifact ends in a softmax layer, so this is off by
    /// default; enable it for logits-only exports.
    pub apply_softmax: Option<bool>,
}

impl ImageClassifierConfig {
    /// Creates a classifier configuration with default settings.
    pub fn new() -> Self {
        Self {
            common: CommonModelConfig::with_defaults(Some("image_classifier".to_string())),
            topk: Some(DEFAULT_TOP_K),
            input_shape: Some(DEFAULT_INPUT_SHAPE),
            channel_order: Some(ChannelOrder::HWC),
            apply_softmax: Some(false),
        }
    }
}

impl ConfigValidator for ImageClassifierConfig {
    fn validate(&self) -> Result<(), crate::core::ConfigError> {
        self.common.validate()?;

        if let Some(topk) = self.topk {
            self.validate_positive_usize(topk, "topk")?;
        }

        if let Some((width, height)) = self.input_shape {
            self.validate_image_dimensions(width, height)?;
        }

        Ok(())
    }

    fn get_defaults() -> Self {
        Self::new()
    }
}

/// Pretrained image classifier backed by an ONNX session.
///
/// Immutable after construction; share it behind an `Arc` across requests.
#[derive(Debug)]
pub struct ImageClassifier {
    /// Number of top predictions to return.
    topk: usize,
    /// Input shape for the model (width, height).
    input_shape: (u32, u32),
    /// Whether to apply a softmax before decoding.
    apply_softmax: bool,
    /// Name of the model being used.
    model_name: String,

    /// Fixed-size resizer for the model input resolution.
    resize: ResizeToFixed,
    /// Normalizer producing the model's expected value range.
    normalize: NormalizeImage,
    /// ONNX Runtime inference engine.
    infer: OrtInfer,
    /// Top-k operator with the label table attached.
    post_op: Topk,
    /// Number of classes in the label table.
    num_classes: usize,
}

impl ImageClassifier {
    /// Creates a new image classifier from a validated configuration, a model
    /// path, and a loaded label table.
    pub fn new(
        config: ImageClassifierConfig,
        model_path: &Path,
        labels: LabelTable,
    ) -> ClsResult<Self> {
        let input_shape = config.input_shape.unwrap_or(DEFAULT_INPUT_SHAPE);
        let topk = config.topk.unwrap_or(DEFAULT_TOP_K);
        let channel_order = config.channel_order.unwrap_or(ChannelOrder::HWC);
        let apply_softmax = config.apply_softmax.unwrap_or(false);
        let model_name = config
            .common
            .model_name
            .clone()
            .unwrap_or_else(|| "ImageClassifier".to_string());

        let num_classes = labels.len();

        let infer = OrtInfer::from_config(&config.common, model_path, None)?;

        // A tensor that doesn't match what the model expects produces garbage
        // scores rather than an error, so check the declared input up front.
        if let Some(shape) = infer.primary_input_shape() {
            let (w, h) = input_shape;
            let expected = match channel_order {
                ChannelOrder::HWC => [1, h as i64, w as i64, 3],
                ChannelOrder::CHW => [1, 3, h as i64, w as i64],
            };
            let compatible = shape.len() == 4
                && shape
                    .iter()
                    .zip(expected.iter())
                    .all(|(&dim, &exp)| dim <= 0 || dim == exp);
            if !compatible {
                warn!(
                    model = %model_name,
                    declared = ?shape,
                    configured = ?expected,
                    "model input shape does not match the configured input shape"
                );
            }
        }

        Ok(Self {
            topk,
            input_shape,
            apply_softmax,
            model_name,
            resize: ResizeToFixed::new(input_shape.0, input_shape.1)?,
            normalize: NormalizeImage::new(
                Some(2.0 / 255.0),
                Some(vec![1.0, 1.0, 1.0]),
                Some(vec![1.0, 1.0, 1.0]),
                Some(channel_order),
            )?,
            infer,
            post_op: Topk::from_class_names(labels.to_class_names()),
            num_classes,
        })
    }

    /// Returns the name of the model backing this classifier.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Returns the number of classes known to the classifier.
    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Returns the input resolution (width, height) the model expects.
    pub fn input_shape(&self) -> (u32, u32) {
        self.input_shape
    }

    /// Decodes an uploaded byte buffer and classifies it.
    ///
    /// This is the all-or-nothing entry point used by the web handler: any
    /// failure (decode, resize, normalize, inference, decoding) yields a
    /// typed error and no predictions.
    pub fn classify_bytes(&self, bytes: &[u8]) -> ClsResult<ClassificationResult> {
        let image = decode_image(bytes)?;
        self.predict(image, None)
    }

    /// Classifies an already-decoded RGB image.
    pub fn classify_image(&self, image: RgbImage) -> ClsResult<ClassificationResult> {
        self.predict(image, None)
    }
}

/// Per-call configuration for classification.
///
/// Placeholder: all knobs currently live on [`ImageClassifierConfig`].
#[derive(Debug, Clone)]
pub struct ClassifyOptions;

impl StandardPredictor for ImageClassifier {
    type Config = ClassifyOptions;
    type Result = ClassificationResult;
    type PreprocessOutput = Tensor4D;
    type InferenceOutput = Tensor2D;

    /// Resizes the image to the model resolution and normalizes it into the
    /// input tensor with a leading batch dimension of 1.
    fn preprocess(
        &self,
        image: RgbImage,
        _config: Option<&Self::Config>,
    ) -> ClsResult<Self::PreprocessOutput> {
        let resized = self.resize.apply(&image);
        self.normalize.normalize_to(&resized)
    }

    /// Runs a single forward pass, producing the (1, num_classes) output.
    fn infer(&self, input: &Self::PreprocessOutput) -> ClsResult<Self::InferenceOutput> {
        self.infer.infer_2d(input)
    }

    /// Decodes the raw output into the top-k labeled predictions.
    fn postprocess(
        &self,
        output: Self::InferenceOutput,
        _config: Option<&Self::Config>,
    ) -> ClsResult<Self::Result> {
        let row = output
            .rows()
            .into_iter()
            .next()
            .ok_or_else(|| ClassifierError::invalid_input("inference produced an empty batch"))?;

        let mut scores: Vec<f32> = row.to_vec();
        if self.apply_softmax {
            softmax_in_place(&mut scores);
        }

        if scores.len() != self.num_classes {
            warn!(
                model = %self.model_name,
                output_classes = scores.len(),
                label_classes = self.num_classes,
                "model output size does not match the label table"
            );
        }

        let topk_result = self.post_op.process(&scores, self.topk)?;

        let labels = topk_result
            .class_names
            .unwrap_or_default()
            .into_iter()
            .map(Arc::from)
            .collect();

        Ok(ClassificationResult {
            class_ids: topk_result.indexes,
            scores: topk_result.scores,
            labels,
        })
    }
}

/// Numerically stable softmax over a score vector.
fn softmax_in_place(scores: &mut [f32]) {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mut sum = 0.0f32;
    for score in scores.iter_mut() {
        *score = (*score - max).exp();
        sum += *score;
    }
    if sum > 0.0 {
        for score in scores.iter_mut() {
            *score /= sum;
        }
    }
}

/// Builder for the image classifier.
pub struct ImageClassifierBuilder {
    common: CommonModelConfig,
    topk: Option<usize>,
    input_shape: Option<(u32, u32)>,
    channel_order: Option<ChannelOrder>,
    apply_softmax: Option<bool>,
}

impl ImageClassifierBuilder {
    /// Creates a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            common: CommonModelConfig::new(),
            topk: None,
            input_shape: None,
            channel_order: None,
            apply_softmax: None,
        }
    }

    /// Sets the path to the ONNX model file.
    pub fn model_path(mut self, model_path: impl Into<std::path::PathBuf>) -> Self {
        self.common = self.common.model_path(model_path);
        self
    }

    /// Sets the path to the label table file.
    pub fn labels_path(mut self, labels_path: impl Into<std::path::PathBuf>) -> Self {
        self.common = self.common.labels_path(labels_path);
        self
    }

    /// Sets the model name.
    pub fn model_name(mut self, model_name: impl Into<String>) -> Self {
        self.common = self.common.model_name(model_name);
        self
    }

    /// Sets the ONNX Runtime session configuration.
    pub fn ort_session(mut self, config: OrtSessionConfig) -> Self {
        self.common = self.common.ort_session(config);
        self
    }

    /// Sets the session pool size for concurrent predictions (>= 1).
    pub fn session_pool_size(mut self, size: usize) -> Self {
        self.common = self.common.session_pool_size(size);
        self
    }

    /// Sets the number of top predictions to return.
    pub fn topk(mut self, topk: usize) -> Self {
        self.topk = Some(topk);
        self
    }

    /// Sets the input shape (width, height) the model expects.
    pub fn input_shape(mut self, input_shape: (u32, u32)) -> Self {
        self.input_shape = Some(input_shape);
        self
    }

    /// Sets the channel order of the input tensor.
    pub fn channel_order(mut self, order: ChannelOrder) -> Self {
        self.channel_order = Some(order);
        self
    }

    /// Enables or disables softmax on the raw output.
    pub fn apply_softmax(mut self, enable: bool) -> Self {
        self.apply_softmax = Some(enable);
        self
    }

    /// Builds the classifier, loading the label table and the ONNX session.
    ///
    /// Requires `model_path` and `labels_path` to be set.
    pub fn build(self) -> ClsResult<ImageClassifier> {
        let config = ImageClassifierConfig {
            common: self.common,
            topk: self.topk.or(Some(DEFAULT_TOP_K)),
            input_shape: self.input_shape.or(Some(DEFAULT_INPUT_SHAPE)),
            channel_order: self.channel_order,
            apply_softmax: self.apply_softmax,
        };

        config.validate()?;

        let model_path = config.common.model_path.clone().ok_or_else(|| {
            ClassifierError::config_error("model_path is required to build an ImageClassifier")
        })?;
        let labels_path = config.common.labels_path.clone().ok_or_else(|| {
            ClassifierError::config_error("labels_path is required to build an ImageClassifier")
        })?;

        let labels = LabelTable::from_file(&labels_path)?;

        ImageClassifier::new(config, &model_path, labels)
    }
}

impl Default for ImageClassifierBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn softmax_produces_a_distribution() {
        let mut scores = vec![1.0, 2.0, 3.0];
        softmax_in_place(&mut scores);

        let sum: f32 = scores.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!(scores.iter().all(|&s| (0.0..=1.0).contains(&s)));
        assert!(scores[2] > scores[1] && scores[1] > scores[0]);
    }

    #[test]
    fn softmax_is_stable_for_large_logits() {
        let mut scores = vec![1000.0, 1001.0];
        softmax_in_place(&mut scores);
        assert!(scores.iter().all(|s| s.is_finite()));
        assert!((scores.iter().sum::<f32>() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn builder_requires_artifact_paths() {
        let err = ImageClassifierBuilder::new().build().unwrap_err();
        assert!(matches!(err, ClassifierError::ConfigError { .. }));

        let err = ImageClassifierBuilder::new()
            .model_path("models/mobilenet_v2.onnx")
            .build()
            .unwrap_err();
        assert!(matches!(err, ClassifierError::ConfigError { .. }));
    }

    #[test]
    fn config_validation_rejects_zero_topk() {
        let config = ImageClassifierConfig {
            topk: Some(0),
            ..ImageClassifierConfig::new()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn classification_result_pairs_labels_with_scores() {
        let result = ClassificationResult {
            class_ids: vec![207, 208],
            scores: vec![0.82, 0.10],
            labels: vec![Arc::from("golden retriever"), Arc::from("Labrador retriever")],
        };

        let predictions: Vec<_> = result.predictions().collect();
        assert_eq!(predictions.len(), 2);
        assert_eq!(predictions[0].label.as_ref(), "golden retriever");
        assert!((predictions[0].confidence - 0.82).abs() < 1e-6);
        assert!(!result.is_empty());
    }
}
