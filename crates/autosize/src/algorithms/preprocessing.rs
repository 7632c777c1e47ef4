use std::borrow::Cow;

use image::{DynamicImage, GrayImage, ImageBuffer, Luma, RgbImage};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{
    error::{AutosizeError, Result},
    profile::{ColorChannel, Polarity},
};

/// How pixels beyond the image edge are read while blurring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BorderPolicy {
    /// Repeat the nearest edge pixel.
    #[default]
    Replicate,
    /// Treat everything outside as black.
    Zero,
}

pub fn extract_channel(image: &DynamicImage, channel: ColorChannel) -> Result<GrayImage> {
    if !image.color().has_color() {
        return Err(AutosizeError::UnsupportedColorType(image.color()));
    }
    let rgb: Cow<'_, RgbImage> = match image.as_rgb8() {
        Some(rgb) => Cow::Borrowed(rgb),
        None => Cow::Owned(image.to_rgb8()),
    };
    let index = channel.index();
    Ok(GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        Luma([rgb.get_pixel(x, y)[index]])
    }))
}

/// Normalized 1D Gaussian weights of odd length `size`.
pub fn gaussian_kernel(size: u32, sigma: f64) -> Vec<f32> {
    let center = (size as f64 - 1.0) / 2.0;
    let scale = -0.5 / (sigma * sigma);
    let weights: Vec<f64> = (0..size)
        .map(|i| {
            let d = i as f64 - center;
            (scale * d * d).exp()
        })
        .collect();
    let sum: f64 = weights.iter().sum();
    weights.into_iter().map(|w| (w / sum) as f32).collect()
}

pub fn gaussian_blur(
    image: &GrayImage,
    kernel_size: u32,
    sigma_x: f64,
    sigma_y: f64,
    border: BorderPolicy,
) -> Result<GrayImage> {
    if kernel_size % 2 == 0 {
        return Err(AutosizeError::InvalidKernel(format!(
            "gaussian kernel size must be odd, got {kernel_size}"
        )));
    }
    if !(sigma_x > 0.0 && sigma_y > 0.0) {
        return Err(AutosizeError::InvalidKernel(format!(
            "gaussian sigma must be positive, got ({sigma_x}, {sigma_y})"
        )));
    }
    if kernel_size == 1 {
        return Ok(image.clone());
    }

    let h_kernel = gaussian_kernel(kernel_size, sigma_x);
    let v_kernel = gaussian_kernel(kernel_size, sigma_y);

    // filter in f32; imageproc truncates u8 output after each pass
    let source = to_float(image);
    match border {
        // imageproc clamps reads at the edge
        BorderPolicy::Replicate => {
            let blurred = imageproc::filter::separable_filter(&source, &h_kernel, &v_kernel);
            Ok(to_gray(&blurred))
        }
        BorderPolicy::Zero => {
            let pad = kernel_size / 2;
            let mut padded = FloatImage::new(image.width() + 2 * pad, image.height() + 2 * pad);
            image::imageops::replace(&mut padded, &source, pad as i64, pad as i64);
            let blurred =
                to_gray(&imageproc::filter::separable_filter(&padded, &h_kernel, &v_kernel));
            let (width, height) = image.dimensions();
            Ok(image::imageops::crop_imm(&blurred, pad, pad, width, height).to_image())
        }
    }
}

type FloatImage = ImageBuffer<Luma<f32>, Vec<f32>>;

fn to_float(image: &GrayImage) -> FloatImage {
    FloatImage::from_fn(image.width(), image.height(), |x, y| {
        Luma([image.get_pixel(x, y)[0] as f32])
    })
}

fn to_gray(filtered: &FloatImage) -> GrayImage {
    GrayImage::from_fn(filtered.width(), filtered.height(), |x, y| {
        Luma([filtered.get_pixel(x, y)[0].round().clamp(0.0, 255.0) as u8])
    })
}

/// Mean-based local threshold. The local mean is taken over a
/// `block_size` square with replicated borders.
pub fn adaptive_threshold(
    image: &GrayImage,
    block_size: u32,
    offset: i32,
    polarity: Polarity,
) -> Result<GrayImage> {
    if block_size % 2 == 0 || block_size < 3 {
        return Err(AutosizeError::InvalidKernel(format!(
            "threshold block size must be odd and at least 3, got {block_size}"
        )));
    }
    let radius = block_size / 2;
    let mean = imageproc::filter::box_filter(image, radius, radius);

    Ok(GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let pixel = image.get_pixel(x, y)[0] as i32;
        let threshold = mean.get_pixel(x, y)[0] as i32 - offset;
        let foreground = match polarity {
            Polarity::BrightOnDark => pixel > threshold,
            Polarity::DarkOnBright => pixel <= threshold,
        };
        Luma([if foreground { 255 } else { 0 }])
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, Rgba};

    #[test]
    fn extracts_requested_channel() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 3, Rgb([10, 20, 30])));
        assert_eq!(extract_channel(&image, ColorChannel::Red).expect("red").get_pixel(0, 0)[0], 10);
        let green = extract_channel(&image, ColorChannel::Green).expect("green");
        assert_eq!(green.get_pixel(3, 2)[0], 20);
        let blue = extract_channel(&image, ColorChannel::Blue).expect("blue");
        assert_eq!(blue.get_pixel(1, 1)[0], 30);

        let rgba = DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 0])));
        assert_eq!(extract_channel(&rgba, ColorChannel::Blue).expect("blue").get_pixel(0, 0)[0], 3);
    }

    #[test]
    fn grayscale_has_no_color_channel() {
        let gray = DynamicImage::ImageLuma8(GrayImage::new(2, 2));
        assert!(matches!(
            extract_channel(&gray, ColorChannel::Red),
            Err(AutosizeError::UnsupportedColorType(_))
        ));
    }

    #[test]
    fn kernel_is_normalized_and_symmetric() {
        let kernel = gaussian_kernel(7, 2.5);
        let sum: f32 = kernel.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert_eq!(kernel[0], kernel[6]);
        assert!(kernel[3] > kernel[2]);
    }

    #[test]
    fn blur_keeps_uniform_images_with_replicate() {
        let image = GrayImage::from_pixel(20, 20, Luma([200]));
        let blurred = gaussian_blur(&image, 11, 3.5, 3.5, BorderPolicy::Replicate).expect("blur");
        assert!(blurred.pixels().all(|p| p[0] == 200));
    }

    #[test]
    fn blur_rounds_to_nearest_level() {
        for level in [1u8, 77, 199, 201, 254] {
            let image = GrayImage::from_pixel(16, 16, Luma([level]));
            for (size, sigma) in [(5, 2.0), (7, 2.5)] {
                let blurred = gaussian_blur(&image, size, sigma, sigma, BorderPolicy::Replicate)
                    .expect("blur");
                assert!(
                    blurred.pixels().all(|p| p[0] == level),
                    "level {level} drifted with kernel {size}"
                );
            }
        }
    }

    #[test]
    fn zero_border_darkens_edges() {
        let image = GrayImage::from_pixel(20, 20, Luma([200]));
        let blurred = gaussian_blur(&image, 5, 2.0, 2.0, BorderPolicy::Zero).expect("blur");
        assert_eq!(blurred.dimensions(), (20, 20));
        assert!(blurred.get_pixel(0, 0)[0] < 200);
        assert_eq!(blurred.get_pixel(10, 10)[0], 200);
    }

    #[test]
    fn even_blur_kernel_is_rejected() {
        let image = GrayImage::new(5, 5);
        assert!(gaussian_blur(&image, 4, 1.0, 1.0, BorderPolicy::Replicate).is_err());
        assert!(gaussian_blur(&image, 5, 0.0, 1.0, BorderPolicy::Replicate).is_err());
    }

    fn dark_square() -> GrayImage {
        let mut image = GrayImage::from_pixel(40, 40, Luma([220]));
        for y in 15..25 {
            for x in 15..25 {
                image.put_pixel(x, y, Luma([30]));
            }
        }
        image
    }

    #[test]
    fn dark_on_bright_marks_dark_square() {
        let binary =
            adaptive_threshold(&dark_square(), 15, 5, Polarity::DarkOnBright).expect("threshold");
        assert_eq!(binary.get_pixel(16, 16)[0], 255, "dark pixel near bright surround is fg");
        assert_eq!(binary.get_pixel(2, 2)[0], 0, "uniform bright background stays background");
    }

    #[test]
    fn bright_on_dark_marks_bright_surround() {
        let binary =
            adaptive_threshold(&dark_square(), 15, -16, Polarity::BrightOnDark).expect("threshold");
        assert_eq!(binary.get_pixel(13, 20)[0], 255, "bright pixel next to the dark square");
        assert_eq!(binary.get_pixel(20, 20)[0], 0, "dark square is background");
        assert_eq!(binary.get_pixel(1, 1)[0], 0, "uniform area is background");
    }

    #[test]
    fn even_block_size_is_rejected() {
        assert!(adaptive_threshold(&dark_square(), 16, 5, Polarity::DarkOnBright).is_err());
    }
}
