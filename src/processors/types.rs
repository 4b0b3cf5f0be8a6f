//! Shared types for image processing operations.

/// Specifies the order of channels in an image tensor.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ChannelOrder {
    /// Channel, Height, Width order (common in PyTorch-family exports)
    CHW,
    /// Height, Width, Channel order (common in TensorFlow-family exports)
    HWC,
}
