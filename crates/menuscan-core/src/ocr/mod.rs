//! OCR stage: image preprocessing and text extraction.
//!
//! Both steps sit behind traits so the pipeline can run against a fake
//! extractor when no OCR models are available.

mod engine;
mod preprocessing;

pub use engine::{assemble_lines, OnnxTextExtractor};
pub use preprocessing::MenuPreprocessor;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::OcrError;

/// Image enhancement applied before OCR.
pub trait Preprocessor {
    /// Produce an enhanced copy of `image`. The input is left untouched.
    fn preprocess(&self, image: &DynamicImage) -> DynamicImage;
}

/// Text recognition over a whole image.
pub trait TextExtractor {
    /// Recognize the text of `image`, one menu line per output line.
    fn extract_text(&self, image: &DynamicImage) -> Result<String, OcrError>;
}

impl<T: Preprocessor + ?Sized> Preprocessor for Box<T> {
    fn preprocess(&self, image: &DynamicImage) -> DynamicImage {
        (**self).preprocess(image)
    }
}

impl<T: TextExtractor + ?Sized> TextExtractor for Box<T> {
    fn extract_text(&self, image: &DynamicImage) -> Result<String, OcrError> {
        (**self).extract_text(image)
    }
}

/// A detected text box with its coordinates and content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBox {
    /// Bounding box coordinates (x1, y1, x2, y2, x3, y3, x4, y4) for quadrilateral.
    pub bbox: [f32; 8],

    /// Recognized text content.
    pub text: String,

    /// Recognition confidence score (0.0 - 1.0).
    pub confidence: f32,
}

impl TextBox {
    /// Get the center point of the bounding box.
    pub fn center(&self) -> (f32, f32) {
        let x = (self.bbox[0] + self.bbox[2] + self.bbox[4] + self.bbox[6]) / 4.0;
        let y = (self.bbox[1] + self.bbox[3] + self.bbox[5] + self.bbox[7]) / 4.0;
        (x, y)
    }

    /// Get the height of the axis-aligned bounding rectangle.
    pub fn height(&self) -> f32 {
        let (_, min_y, _, max_y) = self.rect();
        max_y - min_y
    }

    /// Get the axis-aligned bounding rectangle.
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        let xs = [self.bbox[0], self.bbox[2], self.bbox[4], self.bbox[6]];
        let ys = [self.bbox[1], self.bbox[3], self.bbox[5], self.bbox[7]];

        let min_x = xs.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_x = xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let min_y = ys.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_y = ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

        (min_x, min_y, max_x, max_y)
    }
}
