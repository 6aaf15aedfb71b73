use crate::services::preprocessor::{INPUT_CHANNELS, INPUT_SIZE, ImageTensor};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tract_onnx::prelude::*;
use tracing::info;

type Plan = SimplePlan<TypedFact, Box<dyn TypedOp>, TypedModel>;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Model file not found: {}", .0.display())]
    Missing(PathBuf),
    #[error("Unable to load model {}: {error:#}", .path.display())]
    Tract { path: PathBuf, error: TractError },
    #[error("Model output shape is not concrete: {0}")]
    UnknownOutputShape(String),
}

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Inference failed: {0:#}")]
    Tract(TractError),
    #[error("Model produced {actual} values, expected {expected}")]
    OutputLength { expected: usize, actual: usize },
    #[error("Model output has no comparable score")]
    NoScores,
}

/// A loaded classification model. Implementations are read-only after
/// construction and shared between requests.
pub trait Classifier: Send + Sync {
    /// Number of values in one output vector.
    fn output_len(&self) -> usize;

    fn predict(&self, input: ImageTensor) -> Result<Vec<f32>, InferenceError>;
}

/// ONNX model executed on the CPU by tract.
pub struct TractClassifier {
    plan: Plan,
    output_len: usize,
}

impl TractClassifier {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LoadError::Missing(path.to_path_buf()));
        }

        let model = Self::optimized(path).map_err(|error| LoadError::Tract {
            path: path.to_path_buf(),
            error,
        })?;

        let output = model.output_fact(0).map_err(|error| LoadError::Tract {
            path: path.to_path_buf(),
            error,
        })?;
        let output_len: usize = output
            .shape
            .as_concrete()
            .map(|dims| dims.iter().product())
            .ok_or_else(|| LoadError::UnknownOutputShape(format!("{:?}", output.shape)))?;

        let plan = model.into_runnable().map_err(|error| LoadError::Tract {
            path: path.to_path_buf(),
            error,
        })?;

        info!(
            "Loaded model {} with {} outputs",
            path.display(),
            output_len
        );
        Ok(Self { plan, output_len })
    }

    fn optimized(path: &Path) -> TractResult<TypedModel> {
        tract_onnx::onnx()
            .model_for_path(path)?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(
                    f32::datum_type(),
                    tvec!(1, INPUT_SIZE, INPUT_SIZE, INPUT_CHANNELS),
                ),
            )?
            .into_optimized()
    }
}

impl Classifier for TractClassifier {
    fn output_len(&self) -> usize {
        self.output_len
    }

    fn predict(&self, input: ImageTensor) -> Result<Vec<f32>, InferenceError> {
        let outputs = self
            .plan
            .run(tvec!(input.into_tensor().into()))
            .map_err(InferenceError::Tract)?;
        let scores: Vec<f32> = outputs[0]
            .to_array_view::<f32>()
            .map_err(InferenceError::Tract)?
            .iter()
            .copied()
            .collect();

        if scores.len() != self.output_len {
            return Err(InferenceError::OutputLength {
                expected: self.output_len,
                actual: scores.len(),
            });
        }
        Ok(scores)
    }
}
