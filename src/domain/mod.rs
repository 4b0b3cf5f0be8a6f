//! Domain types: label tables and prediction results.

pub mod labels;

pub use labels::LabelTable;
