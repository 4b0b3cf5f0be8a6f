//! Tensor type aliases used across the pipeline.

/// A 2D tensor of f32 values, shape (batch, num_classes).
pub type Tensor2D = ndarray::Array2<f32>;

/// A 4D tensor of f32 values, shape (batch, height, width, channels) in NHWC
/// order or (batch, channels, height, width) in NCHW order depending on the
/// model family.
pub type Tensor4D = ndarray::Array4<f32>;
