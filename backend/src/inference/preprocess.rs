use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageReader};
use ndarray::{Array3, Array4, Axis};
use std::path::Path;

use super::model::InferenceError;

pub const TARGET_WIDTH: u32 = 150;
pub const TARGET_HEIGHT: u32 = 150;
pub const CHANNELS: usize = 3;

/// Decodes a stored upload. The format is sniffed from the bytes, not the
/// file extension.
pub fn load_image(path: &Path) -> Result<DynamicImage, InferenceError> {
    let image = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    Ok(image)
}

/// RGB, stretched to 150x150, scaled to [0, 1], batch of one: `(1, H, W, C)`.
pub fn preprocess(image: &DynamicImage) -> Result<Array4<f32>, InferenceError> {
    let rgb = image.to_rgb8();
    let resized = imageops::resize(&rgb, TARGET_WIDTH, TARGET_HEIGHT, FilterType::CatmullRom);

    let pixels: Vec<f32> = resized
        .into_raw()
        .into_iter()
        .map(|v| v as f32 / 255.0)
        .collect();

    let array = Array3::from_shape_vec(
        (TARGET_HEIGHT as usize, TARGET_WIDTH as usize, CHANNELS),
        pixels,
    )
    .map_err(|e| InferenceError::Preprocessing(e.to_string()))?;

    Ok(array.insert_axis(Axis(0)))
}
