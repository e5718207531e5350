use ndarray::Array4;
use shared::Verdict;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::preprocess::{load_image, preprocess};

/// Scores strictly above this are recyclable.
pub const DECISION_THRESHOLD: f32 = 0.5;

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("Failed to read image: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Preprocessing error: {0}")]
    Preprocessing(String),
    #[error("Failed to load model {}: {}", .0.display(), .1)]
    Load(PathBuf, String),
    #[error("Model error: {0}")]
    Model(String),
    #[error("Model produced no output")]
    EmptyOutput,
    #[error("No inference backend compiled in for {}", .0.display())]
    UnsupportedArtifact(PathBuf),
}

/// An opaque pretrained model: a `(1, 150, 150, 3)` batch in, the flattened
/// output tensor back.
pub trait ImageClassifier: Send + Sync {
    fn predict(&self, input: &Array4<f32>) -> Result<Vec<f32>, InferenceError>;
}

/// Read-only handle to the model, loaded once and shared by every request.
#[derive(Clone)]
pub struct Model {
    classifier: Arc<dyn ImageClassifier>,
}

impl Model {
    pub fn new(classifier: Arc<dyn ImageClassifier>) -> Self {
        Self { classifier }
    }

    /// TorchScript artifacts go to `tch`, everything else to tract's ONNX loader.
    pub fn load(model_path: &Path) -> Result<Self, InferenceError> {
        let extension = model_path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("pt") | Some("pth") | Some("torchscript") => Self::load_torch(model_path),
            _ => Self::load_onnx(model_path),
        }
    }

    #[cfg(feature = "onnx")]
    fn load_onnx(model_path: &Path) -> Result<Self, InferenceError> {
        let classifier = super::onnx::OnnxClassifier::new(model_path)?;
        Ok(Self::new(Arc::new(classifier)))
    }

    #[cfg(not(feature = "onnx"))]
    fn load_onnx(model_path: &Path) -> Result<Self, InferenceError> {
        Err(InferenceError::UnsupportedArtifact(model_path.to_path_buf()))
    }

    #[cfg(feature = "torch")]
    fn load_torch(model_path: &Path) -> Result<Self, InferenceError> {
        let classifier = super::torch::TorchClassifier::new(model_path)?;
        Ok(Self::new(Arc::new(classifier)))
    }

    #[cfg(not(feature = "torch"))]
    fn load_torch(model_path: &Path) -> Result<Self, InferenceError> {
        Err(InferenceError::UnsupportedArtifact(model_path.to_path_buf()))
    }

    /// The model's `prediction[0][0]`.
    pub fn score(&self, input: &Array4<f32>) -> Result<f32, InferenceError> {
        let output = self.classifier.predict(input)?;
        output.first().copied().ok_or(InferenceError::EmptyOutput)
    }

    pub fn classify_file(&self, path: &Path) -> Result<Verdict, InferenceError> {
        let image = load_image(path)?;
        let input = preprocess(&image)?;
        let score = self.score(&input)?;
        log::debug!("Raw score for {}: {}", path.display(), score);
        Ok(decide(score))
    }
}

/// Strict comparison: exactly 0.5 (and NaN) is non-recyclable.
pub fn decide(score: f32) -> Verdict {
    if score > DECISION_THRESHOLD {
        Verdict::Recyclable
    } else {
        Verdict::NonRecyclable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::fake::FixedScoreClassifier;
    use image::{ImageBuffer, ImageFormat, Rgb};
    use ndarray::Array4;

    fn batch() -> Array4<f32> {
        Array4::zeros((1, 150, 150, 3))
    }

    #[test]
    fn threshold_is_strict() {
        assert_eq!(decide(0.5), Verdict::NonRecyclable);
        assert_eq!(decide(0.500_001), Verdict::Recyclable);
        assert_eq!(decide(0.9), Verdict::Recyclable);
        assert_eq!(decide(0.0), Verdict::NonRecyclable);
        assert_eq!(decide(f32::NAN), Verdict::NonRecyclable);
    }

    #[test]
    fn score_reads_first_output() {
        let model = Model::new(Arc::new(FixedScoreClassifier::with_output(vec![0.7, 0.1])));
        assert_eq!(model.score(&batch()).unwrap(), 0.7);
    }

    #[test]
    fn empty_output_is_an_error() {
        let model = Model::new(Arc::new(FixedScoreClassifier::with_output(Vec::new())));
        assert!(matches!(model.score(&batch()), Err(InferenceError::EmptyOutput)));
    }

    #[test]
    fn classifier_sees_preprocessed_batch() {
        let fake = Arc::new(FixedScoreClassifier::new(0.9));
        let model = Model::new(fake.clone());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bottle.jpg");
        ImageBuffer::from_pixel(320, 200, Rgb([40u8, 160, 90]))
            .save_with_format(&path, ImageFormat::Jpeg)
            .unwrap();

        assert_eq!(model.classify_file(&path).unwrap(), Verdict::Recyclable);
        assert_eq!(fake.seen_shapes(), vec![vec![1, 150, 150, 3]]);
    }

    #[test]
    fn classify_file_is_deterministic() {
        let model = Model::new(Arc::new(FixedScoreClassifier::new(0.5)));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("can.jpg");
        ImageBuffer::from_pixel(64, 64, Rgb([200u8, 200, 200]))
            .save_with_format(&path, ImageFormat::Jpeg)
            .unwrap();

        let first = model.classify_file(&path).unwrap();
        let second = model.classify_file(&path).unwrap();
        assert_eq!(first, Verdict::NonRecyclable);
        assert_eq!(first, second);
    }

    #[test]
    fn missing_artifact_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let result = Model::load(&dir.path().join("absent.onnx"));
        assert!(matches!(
            result,
            Err(InferenceError::Load(_, _)) | Err(InferenceError::UnsupportedArtifact(_))
        ));
    }

    #[test]
    fn corrupt_artifact_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("waste_classification.onnx");
        std::fs::write(&path, b"garbage").unwrap();
        assert!(Model::load(&path).is_err());
    }
}
