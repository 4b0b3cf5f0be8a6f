//! Predictor trait composing the pipeline stages.
//!
//! A predictor turns a decoded RGB image into a domain result through three
//! stages: preprocess (resize + normalize + tensor), infer (forward pass),
//! and postprocess (decode the raw output). The provided `predict` runs the
//! stages in sequence; any stage error aborts the chain, so a result is
//! all-or-nothing.

use crate::core::errors::ClsResult;
use image::RgbImage;
use tracing::debug;

/// The standard single-image prediction pipeline.
pub trait StandardPredictor {
    /// Per-call configuration type.
    type Config: Send + Sync;
    /// Domain result type.
    type Result;
    /// Tensor type produced by preprocessing.
    type PreprocessOutput;
    /// Tensor type produced by inference.
    type InferenceOutput;

    /// Preprocesses an image into the inference-ready tensor.
    fn preprocess(
        &self,
        image: RgbImage,
        config: Option<&Self::Config>,
    ) -> ClsResult<Self::PreprocessOutput>;

    /// Runs the model forward pass on the preprocessed tensor.
    fn infer(&self, input: &Self::PreprocessOutput) -> ClsResult<Self::InferenceOutput>;

    /// Decodes the raw inference output into the domain result.
    fn postprocess(
        &self,
        output: Self::InferenceOutput,
        config: Option<&Self::Config>,
    ) -> ClsResult<Self::Result>;

    /// Runs the full preprocess -> infer -> postprocess chain.
    fn predict(&self, image: RgbImage, config: Option<&Self::Config>) -> ClsResult<Self::Result> {
        let (width, height) = image.dimensions();
        debug!(width, height, "starting prediction");

        let preprocessed = self.preprocess(image, config)?;
        let output = self.infer(&preprocessed)?;
        self.postprocess(output, config)
    }
}
