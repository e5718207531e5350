use ndarray::Array4;
use std::path::Path;
use std::sync::Mutex;
use tch::{CModule, Device, Kind, Tensor};

use super::model::{ImageClassifier, InferenceError};

/// TorchScript export of the classifier. `CModule` is not `Sync`, so calls
/// are serialized.
pub struct TorchClassifier {
    model: Mutex<CModule>,
    device: Device,
}

impl TorchClassifier {
    pub fn new(model_path: &Path) -> Result<Self, InferenceError> {
        let device = Device::cuda_if_available();
        let mut model = CModule::load_on_device(model_path, device)
            .map_err(|e| InferenceError::Load(model_path.to_path_buf(), e.to_string()))?;
        model.set_eval();
        Ok(Self {
            model: Mutex::new(model),
            device,
        })
    }
}

impl ImageClassifier for TorchClassifier {
    fn predict(&self, input: &Array4<f32>) -> Result<Vec<f32>, InferenceError> {
        let shape: Vec<i64> = input.shape().iter().map(|&d| d as i64).collect();
        let data: Vec<f32> = input.iter().copied().collect();
        let tensor = Tensor::from_slice(&data).view(shape.as_slice()).to_device(self.device);

        let output = self
            .model
            .lock()
            .map_err(|_| InferenceError::Model("model lock poisoned".to_string()))?
            .forward_ts(&[tensor])
            .map_err(|e| InferenceError::Model(e.to_string()))?;

        let output_flat = output.to_kind(Kind::Float).to_device(Device::Cpu).view([-1]);
        let num_elements = output_flat.size()[0] as usize;
        let mut output_vec = vec![0.0f32; num_elements];
        output_flat.copy_data(&mut output_vec, num_elements);
        Ok(output_vec)
    }
}
