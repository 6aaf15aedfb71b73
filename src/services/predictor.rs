use crate::config::class_labels::ClassLabels;
use crate::model::{Classifier, InferenceError};
use crate::repositories::upload_repository::UploadError;
use crate::services::preprocessor::{DecodeError, preprocess};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinError;
use tracing::debug;

#[derive(Debug, Serialize, PartialEq)]
pub struct PredictionResult {
    pub prediction: String,
    pub confidence: f32,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Model has {outputs} outputs but {labels} labels are configured")]
    LabelMismatch { outputs: usize, labels: usize },
}

#[derive(Debug, Error)]
pub enum PredictError {
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Inference(#[from] InferenceError),
    #[error("Inference task failed: {0}")]
    Worker(#[from] JoinError),
}

/// Model handle plus the labels for its outputs, validated against each other.
pub struct Predictor {
    classifier: Arc<dyn Classifier>,
    labels: ClassLabels,
}

impl Predictor {
    pub fn new(classifier: Arc<dyn Classifier>, labels: ClassLabels) -> Result<Self, StartupError> {
        if classifier.output_len() != labels.len() {
            return Err(StartupError::LabelMismatch {
                outputs: classifier.output_len(),
                labels: labels.len(),
            });
        }
        Ok(Self { classifier, labels })
    }

    pub async fn predict(&self, image: &Path) -> Result<PredictionResult, PredictError> {
        let tensor = preprocess(image).await?;
        let classifier = self.classifier.clone();
        let scores = tokio::task::spawn_blocking(move || classifier.predict(tensor)).await??;
        debug!("Model output for {}: {:?}", image.display(), scores);
        Ok(self.decode(&scores)?)
    }

    fn decode(&self, scores: &[f32]) -> Result<PredictionResult, InferenceError> {
        if scores.len() != self.labels.len() {
            return Err(InferenceError::OutputLength {
                expected: self.labels.len(),
                actual: scores.len(),
            });
        }
        let index = argmax(scores).ok_or(InferenceError::NoScores)?;
        let label = self.labels.get(index).ok_or(InferenceError::NoScores)?;

        Ok(PredictionResult {
            prediction: label.to_string(),
            confidence: scores[index],
        })
    }
}

/// Index of the largest value. The first maximum wins and NaN never does.
pub fn argmax(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, &value) in values.iter().enumerate() {
        if value.is_nan() {
            continue;
        }
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((index, value)),
        }
    }
    best.map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{StubClassifier, gradient_jpeg, png_bytes, scratch_dir};
    use std::sync::atomic::Ordering;

    fn labels() -> ClassLabels {
        ClassLabels::new(["happy", "sad", "angry", "neutral"]).unwrap()
    }

    fn predictor(scores: Vec<f32>) -> Predictor {
        Predictor::new(Arc::new(StubClassifier::new(scores)), labels()).unwrap()
    }

    #[test]
    fn argmax_prefers_first_maximum() {
        assert_eq!(argmax(&[0.1, 0.7, 0.1, 0.1]), Some(1));
        assert_eq!(argmax(&[0.5, 0.5, 0.0, 0.0]), Some(0));
        assert_eq!(argmax(&[-3.0, -1.0, -1.0]), Some(1));
        assert_eq!(argmax(&[f32::NAN, 0.2, 0.9]), Some(2));
        assert_eq!(argmax(&[f32::NAN]), None);
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn label_count_must_match_model_outputs() {
        let result = Predictor::new(Arc::new(StubClassifier::new(vec![0.5, 0.5])), labels());
        assert!(matches!(
            result,
            Err(StartupError::LabelMismatch {
                outputs: 2,
                labels: 4
            })
        ));
    }

    #[test]
    fn decode_reports_raw_score_at_argmax() {
        let predictor = predictor(vec![0.0; 4]);
        assert_eq!(
            predictor.decode(&[0.1, 0.7, 0.1, 0.1]).unwrap(),
            PredictionResult {
                prediction: "sad".to_string(),
                confidence: 0.7
            }
        );
        assert_eq!(
            predictor.decode(&[0.5, 0.5, 0.0, 0.0]).unwrap().prediction,
            "happy"
        );
        // Scores are not renormalized.
        assert_eq!(predictor.decode(&[2.0, 7.5, 1.0, 0.0]).unwrap().confidence, 7.5);
    }

    #[test]
    fn decode_rejects_wrong_output_length() {
        let predictor = predictor(vec![0.0; 4]);
        assert!(matches!(
            predictor.decode(&[0.1, 0.9]),
            Err(InferenceError::OutputLength {
                expected: 4,
                actual: 2
            })
        ));
    }

    #[tokio::test]
    async fn predicts_from_jpeg_on_disk() {
        let dir = scratch_dir();
        let path = dir.join("dog.jpg");
        tokio::fs::write(&path, gradient_jpeg(320, 240)).await.unwrap();

        let classifier = Arc::new(StubClassifier::new(vec![0.1, 0.7, 0.1, 0.1]));
        let predictor = Predictor::new(classifier.clone(), labels()).unwrap();
        let result = predictor.predict(&path).await.unwrap();

        assert_eq!(result.prediction, "sad");
        assert_eq!(result.confidence, 0.7);
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 1);
        tokio::fs::remove_dir_all(&dir).await.ok();
    }

    #[tokio::test]
    async fn png_never_reaches_the_model() {
        let dir = scratch_dir();
        let path = dir.join("dog.png");
        tokio::fs::write(&path, png_bytes(32, 32)).await.unwrap();

        let classifier = Arc::new(StubClassifier::new(vec![0.1, 0.7, 0.1, 0.1]));
        let predictor = Predictor::new(classifier.clone(), labels()).unwrap();
        let result = predictor.predict(&path).await;

        assert!(matches!(result, Err(PredictError::Decode(_))));
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
        tokio::fs::remove_dir_all(&dir).await.ok();
    }
}
