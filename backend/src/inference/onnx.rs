use ndarray::Array4;
use std::path::Path;
use tract_onnx::prelude::*;

use super::model::{ImageClassifier, InferenceError};
use super::preprocess::{CHANNELS, TARGET_HEIGHT, TARGET_WIDTH};

pub struct OnnxClassifier {
    model: TypedRunnableModel<TypedModel>,
}

impl OnnxClassifier {
    pub fn new(model_path: &Path) -> Result<Self, InferenceError> {
        let load_err = |e: TractError| InferenceError::Load(model_path.to_path_buf(), e.to_string());

        let model = tract_onnx::onnx()
            .model_for_path(model_path)
            .map_err(load_err)?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(
                    f32::datum_type(),
                    tvec!(1, TARGET_HEIGHT as usize, TARGET_WIDTH as usize, CHANNELS),
                ),
            )
            .map_err(load_err)?
            .into_optimized()
            .map_err(load_err)?
            .into_runnable()
            .map_err(load_err)?;

        Ok(Self { model })
    }
}

impl ImageClassifier for OnnxClassifier {
    fn predict(&self, input: &Array4<f32>) -> Result<Vec<f32>, InferenceError> {
        let data: Vec<f32> = input.iter().copied().collect();
        let tensor = Tensor::from_shape(input.shape(), &data)
            .map_err(|e| InferenceError::Model(e.to_string()))?;

        let outputs = self
            .model
            .run(tvec!(tensor.into_tvalue()))
            .map_err(|e| InferenceError::Model(e.to_string()))?;
        let output = outputs
            .first()
            .ok_or(InferenceError::EmptyOutput)?
            .to_array_view::<f32>()
            .map_err(|e| InferenceError::Model(e.to_string()))?;

        Ok(output.iter().copied().collect())
    }
}
