//! Menu recognition: OCR text to (name, price) pairs.

pub mod parser;

pub use parser::MenuLineParser;

use std::path::Path;

use image::{DynamicImage, ImageReader};
use tracing::debug;

use crate::error::{OcrError, Result};
use crate::models::menu_item::ParsedItem;
use crate::ocr::{Preprocessor, TextExtractor};

/// Preprocess, extract and parse a single menu image.
pub struct MenuRecognizer<P, E> {
    preprocessor: P,
    extractor: E,
    parser: MenuLineParser,
}

impl<P: Preprocessor, E: TextExtractor> MenuRecognizer<P, E> {
    /// Create a recognizer with the default line parser.
    pub fn new(preprocessor: P, extractor: E) -> Self {
        Self {
            preprocessor,
            extractor,
            parser: MenuLineParser::new(),
        }
    }

    /// Set the line parser.
    pub fn with_parser(mut self, parser: MenuLineParser) -> Self {
        self.parser = parser;
        self
    }

    /// Line parser in use.
    pub fn parser(&self) -> &MenuLineParser {
        &self.parser
    }

    /// Preprocess `image` and run OCR on it.
    pub fn read_text(&self, image: &DynamicImage) -> std::result::Result<String, OcrError> {
        let enhanced = self.preprocessor.preprocess(image);
        self.extractor.extract_text(&enhanced)
    }

    /// Open an image file and run OCR on it.
    ///
    /// The format is sniffed from the file content, so a PNG saved as
    /// `0.jpg` still decodes.
    pub fn read_file(&self, path: &Path) -> Result<String> {
        let image = ImageReader::open(path)?.with_guessed_format()?.decode()?;
        Ok(self.read_text(&image)?)
    }

    /// Recognize the menu items of `image`.
    pub fn recognize(&self, image: &DynamicImage) -> std::result::Result<Vec<ParsedItem>, OcrError> {
        let text = self.read_text(image)?;
        Ok(self.parser.parse(&text))
    }

    /// Open an image file and recognize its menu items.
    pub fn recognize_file(&self, path: &Path) -> Result<Vec<ParsedItem>> {
        let text = self.read_file(path)?;
        let items = self.parser.parse(&text);
        debug!("{}: {} item(s)", path.display(), items.len());
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MenuscanError;
    use crate::ocr::MenuPreprocessor;
    use image::{GrayImage, ImageFormat, Luma};
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    /// Returns canned text and remembers what it was handed.
    struct CannedExtractor {
        text: &'static str,
        saw_grayscale: Cell<bool>,
    }

    impl TextExtractor for CannedExtractor {
        fn extract_text(&self, image: &DynamicImage) -> std::result::Result<String, OcrError> {
            self.saw_grayscale
                .set(matches!(image, DynamicImage::ImageLuma8(_)));
            Ok(self.text.to_string())
        }
    }

    fn recognizer(text: &'static str) -> MenuRecognizer<MenuPreprocessor, CannedExtractor> {
        MenuRecognizer::new(
            MenuPreprocessor::new(),
            CannedExtractor {
                text,
                saw_grayscale: Cell::new(false),
            },
        )
    }

    #[test]
    fn test_recognize_runs_preprocessing_first() {
        let recognizer = recognizer("Burger 12\nFries 5");
        let image = DynamicImage::new_rgb8(8, 8);

        let items = recognizer.recognize(&image).unwrap();

        assert!(recognizer.extractor.saw_grayscale.get());
        assert_eq!(
            items,
            vec![ParsedItem::new("Burger", "12"), ParsedItem::new("Fries", "5")]
        );
    }

    #[test]
    fn test_recognize_file_sniffs_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("0.jpg");
        GrayImage::from_pixel(6, 6, Luma([200]))
            .save_with_format(&path, ImageFormat::Png)
            .unwrap();

        let items = recognizer("Soda 3").recognize_file(&path).unwrap();
        assert_eq!(items, vec![ParsedItem::new("Soda", "3")]);
    }

    #[test]
    fn test_undecodable_file_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("0.jpg");
        std::fs::write(&path, b"<html>not an image</html>").unwrap();

        let err = recognizer("Soda 3").recognize_file(&path).unwrap_err();
        assert!(matches!(err, MenuscanError::Decode(_)));
    }

    #[test]
    fn test_integer_parser_is_used() {
        let recognizer = recognizer("Latte 3.50")
            .with_parser(MenuLineParser::new().with_decimal_prices(false));

        let items = recognizer.recognize(&DynamicImage::new_luma8(4, 4)).unwrap();
        assert_eq!(items, vec![ParsedItem::new("Latte", "3")]);
    }
}
