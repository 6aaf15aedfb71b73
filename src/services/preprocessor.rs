use image::imageops::{self, FilterType};
use image::{ImageError, ImageFormat};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tract_onnx::prelude::tract_ndarray::Array4;

/// Side length of the square model input.
pub const INPUT_SIZE: usize = 112;
pub const INPUT_CHANNELS: usize = 3;

/// NHWC tensor of shape `[1, INPUT_SIZE, INPUT_SIZE, INPUT_CHANNELS]`, values in `[0, 1]`.
pub type ImageTensor = Array4<f32>;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Unable to read image {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid JPEG data: {0}")]
    Image(#[from] ImageError),
}

/// Reads a JPEG file and turns it into model input.
pub async fn preprocess(path: &Path) -> Result<ImageTensor, DecodeError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| DecodeError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    to_tensor(&bytes)
}

pub fn to_tensor(bytes: &[u8]) -> Result<ImageTensor, DecodeError> {
    let image = image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)?.to_rgb8();
    let resized = imageops::resize(
        &image,
        INPUT_SIZE as u32,
        INPUT_SIZE as u32,
        FilterType::Nearest,
    );

    Ok(Array4::from_shape_fn(
        (1, INPUT_SIZE, INPUT_SIZE, INPUT_CHANNELS),
        |(_, y, x, c)| f32::from(resized.get_pixel(x as u32, y as u32)[c]) / 255.0,
    ))
}
