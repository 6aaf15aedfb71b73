use crate::model::{Classifier, InferenceError};
use crate::services::preprocessor::ImageTensor;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Returns a fixed output vector for every input, or fails when it has none.
pub struct StubClassifier {
    output_len: usize,
    scores: Option<Vec<f32>>,
    pub calls: AtomicUsize,
}

impl StubClassifier {
    pub fn new(scores: Vec<f32>) -> Self {
        Self::reporting(scores.len(), scores)
    }

    /// Advertises `output_len` outputs but returns `scores` regardless.
    pub fn reporting(output_len: usize, scores: Vec<f32>) -> Self {
        Self {
            output_len,
            scores: Some(scores),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(output_len: usize) -> Self {
        Self {
            output_len,
            scores: None,
            calls: AtomicUsize::new(0),
        }
    }
}

impl Classifier for StubClassifier {
    fn output_len(&self) -> usize {
        self.output_len
    }

    fn predict(&self, _input: ImageTensor) -> Result<Vec<f32>, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.scores.clone().ok_or(InferenceError::NoScores)
    }
}

fn encode(image: RgbImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image)
        .write_to(&mut buf, format)
        .unwrap();
    buf.into_inner()
}

pub fn jpeg_bytes(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    encode(RgbImage::from_pixel(width, height, Rgb(color)), ImageFormat::Jpeg)
}

pub fn gradient_jpeg(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    encode(image, ImageFormat::Jpeg)
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(
        RgbImage::from_pixel(width, height, Rgb([10, 200, 30])),
        ImageFormat::Png,
    )
}

/// A fresh, empty directory under the system temp dir.
pub fn scratch_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("puppysense-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
