//! ONNX Runtime inference engine with a pooled session and 2D output support.
//!
//! The classifier runs one forward pass per request. Sessions are kept in a
//! small pool behind mutexes and checked out round-robin, so a shared
//! classifier handle stays safe under concurrent requests.

use crate::core::config::{CommonModelConfig, OrtGraphOptimizationLevel, OrtSessionConfig};
use crate::core::errors::{ClassifierError, SimpleError};
use crate::core::tensor::{Tensor2D, Tensor4D};
use ndarray::ArrayView2;
use ort::logging::LogLevel;
use ort::session::Session;
use ort::session::builder::{GraphOptimizationLevel, SessionBuilder};
use ort::value::{TensorRef, ValueType};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// ONNX Runtime inference engine for a single classification model.
pub struct OrtInfer {
    sessions: Vec<Mutex<Session>>,
    next_idx: AtomicUsize,
    input_name: String,
    output_name: Option<String>,
    model_path: std::path::PathBuf,
    model_name: String,
}

impl std::fmt::Debug for OrtInfer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrtInfer")
            .field("sessions", &self.sessions.len())
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .field("model_path", &self.model_path)
            .field("model_name", &self.model_name)
            .finish()
    }
}

impl OrtInfer {
    /// Creates a new OrtInfer with default session settings and a single session.
    ///
    /// When `input_name` is None, the input tensor name is discovered from the
    /// session metadata.
    pub fn new(
        model_path: impl AsRef<Path>,
        input_name: Option<&str>,
    ) -> Result<Self, ClassifierError> {
        Self::from_config(&CommonModelConfig::new(), model_path, input_name)
    }

    /// Creates a new OrtInfer from a CommonModelConfig, applying session
    /// options and constructing the session pool.
    pub fn from_config(
        common: &CommonModelConfig,
        model_path: impl AsRef<Path>,
        input_name: Option<&str>,
    ) -> Result<Self, ClassifierError> {
        let path = model_path.as_ref();
        let pool_size = common.session_pool_size.unwrap_or(1).max(1);
        let mut sessions = Vec::with_capacity(pool_size);
        for _ in 0..pool_size {
            let builder = Session::builder()?;
            let builder = if let Some(cfg) = &common.ort_session {
                Self::apply_ort_config(builder, cfg)?
            } else {
                builder.with_log_level(LogLevel::Error)?
            };
            let session = builder.commit_from_file(path).map_err(|e| {
                ClassifierError::model_load(path, "failed to create ONNX session", Some(e))
            })?;
            sessions.push(Mutex::new(session));
        }

        let model_name = common
            .model_name
            .clone()
            .or_else(|| {
                path.file_stem()
                    .and_then(|s| s.to_str())
                    .map(|s| s.to_string())
            })
            .unwrap_or_else(|| "unknown_model".to_string());

        let input_name = match input_name {
            Some(name) => name.to_string(),
            None => Self::discover_input_name(&sessions, path)?,
        };

        Ok(OrtInfer {
            sessions,
            next_idx: AtomicUsize::new(0),
            input_name,
            output_name: None,
            model_path: path.to_path_buf(),
            model_name,
        })
    }

    fn apply_ort_config(
        builder: SessionBuilder,
        cfg: &OrtSessionConfig,
    ) -> Result<SessionBuilder, ClassifierError> {
        let mut builder = builder.with_log_level(LogLevel::Error)?;
        if let Some(level) = cfg.optimization_level {
            let level = match level {
                OrtGraphOptimizationLevel::DisableAll => GraphOptimizationLevel::Disable,
                OrtGraphOptimizationLevel::Level1 => GraphOptimizationLevel::Level1,
                OrtGraphOptimizationLevel::Level2 => GraphOptimizationLevel::Level2,
                OrtGraphOptimizationLevel::Level3 => GraphOptimizationLevel::Level3,
            };
            builder = builder.with_optimization_level(level)?;
        }
        if let Some(threads) = cfg.intra_threads {
            builder = builder.with_intra_threads(threads)?;
        }
        if let Some(threads) = cfg.inter_threads {
            builder = builder.with_inter_threads(threads)?;
        }
        if let Some(parallel) = cfg.parallel_execution {
            builder = builder.with_parallel_execution(parallel)?;
        }
        Ok(builder)
    }

    fn discover_input_name(
        sessions: &[Mutex<Session>],
        path: &Path,
    ) -> Result<String, ClassifierError> {
        let session = sessions
            .first()
            .ok_or_else(|| {
                ClassifierError::model_load(path, "empty session pool", None::<std::io::Error>)
            })?
            .lock()
            .map_err(|_| ClassifierError::InvalidInput {
                message: "failed to acquire session lock".to_string(),
            })?;
        session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or_else(|| {
                ClassifierError::model_load(
                    path,
                    "model declares no inputs",
                    None::<std::io::Error>,
                )
            })
    }

    /// Returns the configured or discovered output tensor name.
    fn get_output_name(&self) -> Result<String, ClassifierError> {
        if let Some(ref name) = self.output_name {
            Ok(name.clone())
        } else {
            let session = self.sessions[0]
                .lock()
                .map_err(|_| ClassifierError::InvalidInput {
                    message: "failed to acquire session lock".to_string(),
                })?;
            if let Some(output) = session.outputs.first() {
                Ok(output.name.clone())
            } else {
                Err(ClassifierError::InvalidInput {
                    message: "no outputs available in session - model may be invalid".to_string(),
                })
            }
        }
    }

    /// Returns the model path associated with this inference engine.
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Returns the model name associated with this inference engine.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Returns the name of the model input tensor fed during inference.
    pub fn input_name(&self) -> &str {
        &self.input_name
    }

    /// Attempts to retrieve the primary input tensor shape from the first session.
    ///
    /// Dynamic dimensions (e.g. -1) are returned as-is.
    pub fn primary_input_shape(&self) -> Option<Vec<i64>> {
        let session_mutex = self.sessions.first()?;
        let session_guard = session_mutex.lock().ok()?;
        let input = session_guard.inputs.first()?;
        match &input.input_type {
            ValueType::Tensor { shape, .. } => Some(shape.iter().copied().collect()),
            _ => None,
        }
    }

    fn run_inference_with_processor<T>(
        &self,
        x: &Tensor4D,
        processor: impl FnOnce(&[i64], &[f32]) -> Result<T, ClassifierError>,
    ) -> Result<T, ClassifierError> {
        let input_shape = x.shape().to_vec();

        let output_name = self.get_output_name()?;

        let input_tensor = TensorRef::from_array_view(x.view()).map_err(|e| {
            ClassifierError::tensor_operation(
                &format!(
                    "failed to convert input tensor with shape {:?} for model '{}'",
                    input_shape, self.model_name
                ),
                e,
            )
        })?;

        let inputs = ort::inputs![self.input_name.as_str() => input_tensor];

        let idx = self.next_idx.fetch_add(1, Ordering::Relaxed) % self.sessions.len();
        let mut session_guard = self.sessions[idx].lock().map_err(|_| {
            ClassifierError::inference_error(SimpleError::new(format!(
                "failed to acquire session lock for session {}/{}",
                idx,
                self.sessions.len()
            )))
        })?;

        let outputs = session_guard.run(inputs).map_err(|e| {
            ClassifierError::inference_error(SimpleError::new(format!(
                "forward pass failed for model '{}' with input '{}' -> output '{}': {e}",
                self.model_name, self.input_name, output_name
            )))
        })?;

        let output = outputs[output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| {
                ClassifierError::inference_error(SimpleError::new(format!(
                    "failed to extract output tensor '{output_name}' as f32: {e}"
                )))
            })?;
        let (output_shape, output_data) = output;

        processor(output_shape, output_data)
    }

    /// Runs a forward pass and returns the (batch, num_classes) output tensor.
    pub fn infer_2d(&self, x: &Tensor4D) -> Result<Tensor2D, ClassifierError> {
        let batch_size = x.shape()[0];
        let input_shape = x.shape().to_vec();
        self.run_inference_with_processor(x, |output_shape, output_data| {
            if output_shape.len() != 2 {
                return Err(ClassifierError::tensor_operation(
                    &format!(
                        "model '{}': expected 2D output tensor, got {}D with shape {:?}",
                        self.model_name,
                        output_shape.len(),
                        output_shape
                    ),
                    SimpleError::new("invalid output tensor dimensions"),
                ));
            }

            let num_classes = output_shape[1] as usize;
            let expected_len = batch_size * num_classes;

            if output_data.len() != expected_len {
                return Err(ClassifierError::tensor_operation(
                    &format!(
                        "model '{}': output data size mismatch for input shape {:?} -> output shape {:?}",
                        self.model_name, input_shape, output_shape
                    ),
                    SimpleError::new("output tensor data size mismatch"),
                ));
            }

            let array_view = ArrayView2::from_shape((batch_size, num_classes), output_data)
                .map_err(ClassifierError::Tensor)?;
            Ok(array_view.to_owned())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::CommonModelConfig;

    #[test]
    fn missing_model_file_is_a_load_error() {
        let result = OrtInfer::new("does/not/exist.onnx", None);
        assert!(matches!(
            result,
            Err(ClassifierError::ModelLoad { .. }) | Err(ClassifierError::Session(_))
        ));
    }

    #[test]
    fn from_config_respects_session_pool_size() {
        let common = CommonModelConfig::new().session_pool_size(3);
        let result = OrtInfer::from_config(&common, "does/not/exist.onnx", None);
        assert!(result.is_err());
    }
}
