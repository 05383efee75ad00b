//! OCR engine wrapper using `pure-onnx-ocr`.

use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::OcrConfig;

use super::{TextBox, TextExtractor};

/// Text extractor backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).
pub struct OnnxTextExtractor {
    engine: pure_onnx_ocr::engine::OcrEngine,
    config: OcrConfig,
}

impl OnnxTextExtractor {
    /// Load the detection and recognition models named in `config`.
    pub fn new(config: OcrConfig) -> Result<Self, OcrError> {
        let det_path = config.model_path(&config.detection_model);
        let rec_path = config.model_path(&config.recognition_model);
        let dict_path = config.model_path(&config.dictionary);

        for path in [&det_path, &rec_path, &dict_path] {
            if !path.exists() {
                return Err(OcrError::ModelLoad(format!(
                    "missing model file {}",
                    path.display()
                )));
            }
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", config.model_dir.display());

        Ok(Self { engine, config })
    }

    /// Detect and recognize text boxes.
    pub fn recognize(&self, image: &DynamicImage) -> Result<Vec<TextBox>, OcrError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(OcrError::InvalidImage(format!("{}x{}", width, height)));
        }

        let start = Instant::now();
        let results = self
            .engine
            .run_from_image(image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        let boxes: Vec<TextBox> = results
            .iter()
            .map(|r| {
                let text = if self.config.keep_unk {
                    r.text.clone()
                } else {
                    r.text.replace("[UNK]", " ")
                };
                TextBox {
                    bbox: polygon_to_bbox(&r.bounding_box),
                    text,
                    confidence: r.confidence,
                }
            })
            .collect();

        info!(
            "OCR complete: {} text boxes in {}ms",
            boxes.len(),
            start.elapsed().as_millis()
        );

        Ok(boxes)
    }
}

impl TextExtractor for OnnxTextExtractor {
    fn extract_text(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let boxes = self.recognize(image)?;
        Ok(assemble_lines(&boxes, self.config.line_tolerance))
    }
}

/// Arrange text boxes into reading-order lines.
///
/// Boxes whose vertical centers are within `tolerance` times the median box
/// height of the line's running center belong to the same line. Lines are
/// ordered top to bottom, boxes within a line left to right and joined by a
/// space.
pub fn assemble_lines(boxes: &[TextBox], tolerance: f32) -> String {
    let mut sorted: Vec<&TextBox> = boxes.iter().filter(|b| !b.text.trim().is_empty()).collect();
    if sorted.is_empty() {
        return String::new();
    }

    sorted.sort_by(|a, b| a.center().1.total_cmp(&b.center().1));

    let mut heights: Vec<f32> = sorted.iter().map(|b| b.height()).collect();
    heights.sort_by(f32::total_cmp);
    let threshold = heights[heights.len() / 2] * tolerance;

    let mut lines: Vec<Vec<&TextBox>> = Vec::new();
    let mut line_center = f32::NEG_INFINITY;

    for text_box in sorted {
        let (_, cy) = text_box.center();
        match lines.last_mut() {
            Some(line) if (cy - line_center).abs() <= threshold => {
                line.push(text_box);
                line_center = line.iter().map(|b| b.center().1).sum::<f32>() / line.len() as f32;
            }
            _ => {
                lines.push(vec![text_box]);
                line_center = cy;
            }
        }
    }

    debug!("Assembled {} line(s) from {} box(es)", lines.len(), boxes.len());

    lines
        .into_iter()
        .map(|mut line| {
            line.sort_by(|a, b| a.rect().0.total_cmp(&b.rect().0));
            line.iter()
                .map(|b| b.text.trim())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Convert a `Polygon<f64>` to our `[f32; 8]` bbox format.
///
/// Extracts the first 4 exterior points (quadrilateral) as
/// `[x1, y1, x2, y2, x3, y3, x4, y4]`.
fn polygon_to_bbox(polygon: &pure_onnx_ocr::Polygon<f64>) -> [f32; 8] {
    let mut bbox = [0.0f32; 8];
    for (i, coord) in polygon.exterior().coords().take(4).enumerate() {
        bbox[i * 2] = coord.x as f32;
        bbox[i * 2 + 1] = coord.y as f32;
    }
    bbox
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text_box(text: &str, x: f32, y: f32, w: f32, h: f32) -> TextBox {
        TextBox {
            bbox: [x, y, x + w, y, x + w, y + h, x, y + h],
            text: text.to_string(),
            confidence: 0.9,
        }
    }

    #[test]
    fn test_assemble_same_row_left_to_right() {
        let boxes = vec![
            text_box("12", 300.0, 12.0, 30.0, 20.0),
            text_box("Burger", 10.0, 10.0, 80.0, 20.0),
            text_box("5", 300.0, 52.0, 15.0, 20.0),
            text_box("Fries", 10.0, 50.0, 60.0, 20.0),
        ];

        assert_eq!(assemble_lines(&boxes, 0.5), "Burger 12\nFries 5");
    }

    #[test]
    fn test_assemble_skips_blank_boxes() {
        let boxes = vec![
            text_box("   ", 0.0, 0.0, 10.0, 20.0),
            text_box("Soda", 10.0, 40.0, 40.0, 20.0),
            text_box("3", 100.0, 40.0, 10.0, 20.0),
        ];

        assert_eq!(assemble_lines(&boxes, 0.5), "Soda 3");
    }

    #[test]
    fn test_assemble_empty() {
        assert_eq!(assemble_lines(&[], 0.5), "");
    }

    #[test]
    fn test_text_box_geometry() {
        let b = text_box("x", 10.0, 20.0, 40.0, 10.0);
        assert_eq!(b.center(), (30.0, 25.0));
        assert_eq!(b.height(), 10.0);
        assert_eq!(b.rect(), (10.0, 20.0, 50.0, 30.0));
    }

    #[test]
    fn test_missing_models_fail_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let config = OcrConfig {
            model_dir: dir.path().to_path_buf(),
            ..OcrConfig::default()
        };

        let err = OnnxTextExtractor::new(config).err().unwrap();
        assert!(matches!(err, OcrError::ModelLoad(_)));
    }
}
