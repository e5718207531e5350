use ndarray::Array4;
use std::sync::Mutex;

use super::model::{ImageClassifier, InferenceError};

/// Returns a canned output regardless of input, recording the input shapes.
pub struct FixedScoreClassifier {
    output: Vec<f32>,
    seen: Mutex<Vec<Vec<usize>>>,
}

impl FixedScoreClassifier {
    pub fn new(score: f32) -> Self {
        Self::with_output(vec![score])
    }

    pub fn with_output(output: Vec<f32>) -> Self {
        Self {
            output,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn seen_shapes(&self) -> Vec<Vec<usize>> {
        self.seen.lock().unwrap().clone()
    }
}

impl ImageClassifier for FixedScoreClassifier {
    fn predict(&self, input: &Array4<f32>) -> Result<Vec<f32>, InferenceError> {
        self.seen.lock().unwrap().push(input.shape().to_vec());
        Ok(self.output.clone())
    }
}
