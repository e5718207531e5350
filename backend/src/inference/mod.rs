pub mod model;
pub mod preprocess;

#[cfg(feature = "onnx")]
pub mod onnx;
#[cfg(feature = "torch")]
pub mod torch;

#[cfg(test)]
pub mod fake;
