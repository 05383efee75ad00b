//! Image preprocessing for OCR.

use image::{DynamicImage, GrayImage, Luma};
use imageproc::filter::median_filter;
use tracing::debug;

use super::Preprocessor;

/// Contrast multiplier applied around the mean luminance.
pub const CONTRAST_FACTOR: f32 = 2.0;

/// Sharpness multiplier applied against a smoothed copy.
pub const SHARPNESS_FACTOR: f32 = 2.0;

/// Median window radius (1 = 3x3).
const MEDIAN_RADIUS: u32 = 1;

/// Fixed enhancement chain: grayscale, contrast, sharpness, median filter.
#[derive(Debug, Clone, Copy, Default)]
pub struct MenuPreprocessor;

impl MenuPreprocessor {
    /// Create a new preprocessor.
    pub fn new() -> Self {
        Self
    }

    /// Run the enhancement chain and return the grayscale result.
    pub fn process(&self, image: &DynamicImage) -> GrayImage {
        let gray = image.to_luma8();
        debug!("Preprocessing {}x{} image", gray.width(), gray.height());

        let contrasted = enhance_contrast(&gray, CONTRAST_FACTOR);
        let sharpened = enhance_sharpness(&contrasted, SHARPNESS_FACTOR);

        median_filter(&sharpened, MEDIAN_RADIUS, MEDIAN_RADIUS)
    }
}

impl Preprocessor for MenuPreprocessor {
    fn preprocess(&self, image: &DynamicImage) -> DynamicImage {
        DynamicImage::ImageLuma8(self.process(image))
    }
}

/// Interpolate from `degenerate` towards `pixel` by `factor`.
fn blend(degenerate: u8, pixel: u8, factor: f32) -> u8 {
    let value = degenerate as f32 + factor * (pixel as f32 - degenerate as f32);
    (value as i32).clamp(0, 255) as u8
}

/// Scale each pixel's distance from the mean luminance by `factor`.
fn enhance_contrast(image: &GrayImage, factor: f32) -> GrayImage {
    let count = image.as_raw().len();
    if count == 0 {
        return image.clone();
    }

    let sum: u64 = image.as_raw().iter().map(|&p| p as u64).sum();
    let mean = (sum as f64 / count as f64 + 0.5) as u8;

    let mut result = image.clone();
    for pixel in result.pixels_mut() {
        pixel[0] = blend(mean, pixel[0], factor);
    }
    result
}

/// Scale each pixel's distance from a 3x3 smoothed copy by `factor`.
fn enhance_sharpness(image: &GrayImage, factor: f32) -> GrayImage {
    let smooth = smooth3x3(image);

    let mut result = image.clone();
    for (x, y, pixel) in result.enumerate_pixels_mut() {
        pixel[0] = blend(smooth.get_pixel(x, y)[0], pixel[0], factor);
    }
    result
}

/// 3x3 smoothing kernel `[1 1 1; 1 5 1; 1 1 1] / 13`.
///
/// Border rows and columns are copied unchanged.
fn smooth3x3(image: &GrayImage) -> GrayImage {
    let (width, height) = image.dimensions();
    let mut result = image.clone();

    if width < 3 || height < 3 {
        return result;
    }

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let mut sum = 0u32;
            for ny in y - 1..=y + 1 {
                for nx in x - 1..=x + 1 {
                    let weight = if nx == x && ny == y { 5 } else { 1 };
                    sum += weight * image.get_pixel(nx, ny)[0] as u32;
                }
            }
            let value = (sum as f32 / 13.0 + 0.5) as u32;
            result.put_pixel(x, y, Luma([value.min(255) as u8]));
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn flat(width: u32, height: u32, value: u8) -> GrayImage {
        GrayImage::from_pixel(width, height, Luma([value]))
    }

    #[test]
    fn test_output_is_grayscale_with_same_dimensions() {
        let rgb = RgbImage::from_pixel(40, 25, Rgb([200, 30, 90]));
        let out = MenuPreprocessor::new().preprocess(&DynamicImage::ImageRgb8(rgb));

        assert!(matches!(out, DynamicImage::ImageLuma8(_)));
        assert_eq!((out.width(), out.height()), (40, 25));
    }

    #[test]
    fn test_flat_image_is_unchanged() {
        let image = DynamicImage::ImageLuma8(flat(9, 7, 120));
        let out = MenuPreprocessor::new().process(&image);

        assert!(out.pixels().all(|p| p[0] == 120));
    }

    #[test]
    fn test_input_is_not_modified() {
        let mut gray = flat(5, 5, 50);
        gray.put_pixel(2, 2, Luma([255]));
        let image = DynamicImage::ImageLuma8(gray.clone());

        let _ = MenuPreprocessor::new().preprocess(&image);
        assert_eq!(image.to_luma8(), gray);
    }

    #[test]
    fn test_contrast_doubles_distance_from_mean() {
        let mut gray = flat(2, 1, 100);
        gray.put_pixel(1, 0, Luma([150]));

        let out = enhance_contrast(&gray, CONTRAST_FACTOR);
        assert_eq!(out.get_pixel(0, 0)[0], 75);
        assert_eq!(out.get_pixel(1, 0)[0], 175);
    }

    #[test]
    fn test_contrast_clamps() {
        let mut gray = flat(2, 1, 0);
        gray.put_pixel(1, 0, Luma([255]));

        let out = enhance_contrast(&gray, CONTRAST_FACTOR);
        assert_eq!(out.get_pixel(0, 0)[0], 0);
        assert_eq!(out.get_pixel(1, 0)[0], 255);
    }

    #[test]
    fn test_sharpness_keeps_border_and_boosts_peak() {
        let mut gray = flat(3, 3, 100);
        gray.put_pixel(1, 1, Luma([200]));

        let out = enhance_sharpness(&gray, SHARPNESS_FACTOR);
        assert_eq!(out.get_pixel(1, 1)[0], 255);
        assert_eq!(out.get_pixel(0, 0)[0], 100);
        assert_eq!(out.get_pixel(2, 1)[0], 100);
    }

    #[test]
    fn test_tiny_images_pass_through_smoothing() {
        let gray = flat(2, 2, 10);
        assert_eq!(smooth3x3(&gray), gray);
    }

    #[test]
    fn test_isolated_noise_is_removed() {
        let mut gray = flat(5, 5, 50);
        gray.put_pixel(2, 2, Luma([255]));

        let out = MenuPreprocessor::new().process(&DynamicImage::ImageLuma8(gray));
        assert!(out.get_pixel(2, 2)[0] < 128);
    }
}
