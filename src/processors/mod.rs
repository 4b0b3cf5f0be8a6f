//! Image processing stages of the pipeline.
//!
//! * [`normalization`] - per-channel affine normalization into model range
//! * [`resize`] - deterministic fixed-size resampling
//! * [`topk`] - top-k decoding of classification outputs

pub mod normalization;
pub mod resize;
pub mod topk;
pub mod types;

pub use normalization::NormalizeImage;
pub use resize::ResizeToFixed;
pub use topk::{Topk, TopkResult};
pub use types::ChannelOrder;
