pub mod builder;

use image::DynamicImage;
use tracing::debug;

use crate::{
    algorithms::StructuringElement,
    config::EncircleConfig,
    error::Result,
    profile::SegmentationProfile,
    traits::ImageOps,
    types::{EncircleResult, Point},
};

/// Run the segmentation pipeline once.
///
/// `image` is the stored bitmap and `seed` is already in its frame; the
/// returned circle is in the same frame. When nothing is found near the
/// seed the circle carries a negative radius.
pub fn encircle<O>(
    ops: &O,
    config: &EncircleConfig,
    image: &DynamicImage,
    seed: Point,
    profile: &SegmentationProfile,
) -> Result<EncircleResult>
where
    O: ImageOps + ?Sized,
{
    let hair_element = StructuringElement::ellipse(config.hair_kernel_size)?;
    let dilate_element = StructuringElement::ellipse(profile.dilate_kernel_size())?;
    let erode_element = StructuringElement::ellipse(profile.erode_kernel_size())?;

    let channel = ops.extract_channel(image, profile.object_class().channel())?;
    let blurred = ops.gaussian_blur(
        &channel,
        profile.blur_kernel_size(),
        profile.blur_sigma(),
        profile.blur_sigma(),
        config.blur_border,
    )?;
    let binary = ops.adaptive_threshold(
        &blurred,
        profile.block_size(),
        profile.offset(),
        profile.polarity(),
    )?;

    // Drop frame and background structures
    let components = ops.connected_components(&binary)?;
    let pruned = ops.prune_edge_components(&components, config.prune_area_threshold);
    debug!(
        profile = %profile.object_class(),
        found = components.len(),
        kept = pruned.len(),
        "pruned edge components"
    );
    let mask = ops.render_components(&pruned);

    // Remove hairs
    let mask = ops.erode(&mask, &hair_element);
    let mask = ops.dilate(&mask, &hair_element);

    // Reconnect parts split by reflections
    let mask = ops.dilate(&mask, &dilate_element);
    let mask = ops.erode(&mask, &erode_element);

    let components = ops.connected_components(&mask)?;
    let debug_image = ops.flood_fill_components(&components);
    let fit = ops.find_enclosing_circle(&components, seed, config.seed_tolerance);

    debug!(
        profile = %profile.object_class(),
        components = components.len(),
        radius = fit.circle.radius,
        blob_area = fit.area,
        "encircle finished"
    );

    Ok(EncircleResult {
        circle: fit.circle,
        debug_image,
        blob_area: fit.area,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{
        algorithms::{BorderPolicy, ComponentSet, EnclosingCircle, ImageprocOps},
        profile::{ColorChannel, Polarity},
    };
    use geo_types::Coord;
    use image::{GrayImage, Rgb, RgbImage};
    use std::sync::Mutex;

    /// Forwards to [`ImageprocOps`] and records every call.
    #[derive(Default)]
    pub(crate) struct RecordingOps {
        pub calls: Mutex<Vec<String>>,
    }

    impl RecordingOps {
        fn record(&self, call: impl Into<String>) {
            self.calls.lock().expect("lock").push(call.into());
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("lock").clone()
        }
    }

    impl ImageOps for RecordingOps {
        fn extract_channel(
            &self,
            image: &DynamicImage,
            channel: ColorChannel,
        ) -> Result<GrayImage> {
            self.record(format!("extract_channel:{channel}"));
            ImageprocOps.extract_channel(image, channel)
        }

        fn gaussian_blur(
            &self,
            image: &GrayImage,
            kernel_size: u32,
            sigma_x: f64,
            sigma_y: f64,
            border: BorderPolicy,
        ) -> Result<GrayImage> {
            self.record(format!("gaussian_blur:{kernel_size}"));
            ImageprocOps.gaussian_blur(image, kernel_size, sigma_x, sigma_y, border)
        }

        fn adaptive_threshold(
            &self,
            image: &GrayImage,
            block_size: u32,
            offset: i32,
            polarity: Polarity,
        ) -> Result<GrayImage> {
            self.record(format!("adaptive_threshold:{block_size}:{offset}:{polarity}"));
            ImageprocOps.adaptive_threshold(image, block_size, offset, polarity)
        }

        fn connected_components(&self, binary: &GrayImage) -> Result<ComponentSet> {
            self.record("connected_components");
            ImageprocOps.connected_components(binary)
        }

        fn prune_edge_components(
            &self,
            components: &ComponentSet,
            area_threshold: u32,
        ) -> ComponentSet {
            self.record(format!("prune_edge_components:{area_threshold}"));
            ImageprocOps.prune_edge_components(components, area_threshold)
        }

        fn render_components(&self, components: &ComponentSet) -> GrayImage {
            self.record("render_components");
            ImageprocOps.render_components(components)
        }

        fn erode(&self, image: &GrayImage, element: &StructuringElement) -> GrayImage {
            self.record(format!("erode:{}", element.size()));
            ImageprocOps.erode(image, element)
        }

        fn dilate(&self, image: &GrayImage, element: &StructuringElement) -> GrayImage {
            self.record(format!("dilate:{}", element.size()));
            ImageprocOps.dilate(image, element)
        }

        fn flood_fill_components(&self, components: &ComponentSet) -> GrayImage {
            self.record("flood_fill_components");
            ImageprocOps.flood_fill_components(components)
        }

        fn find_enclosing_circle(
            &self,
            components: &ComponentSet,
            seed: Point,
            seed_tolerance: f64,
        ) -> EnclosingCircle {
            self.record("find_enclosing_circle");
            ImageprocOps.find_enclosing_circle(components, seed, seed_tolerance)
        }
    }

    /// White square image with a filled black disk.
    pub(crate) fn dark_disk_image(size: u32, cx: f64, cy: f64, radius: f64) -> RgbImage {
        RgbImage::from_fn(size, size, |x, y| {
            let inside = (x as f64 - cx).powi(2) + (y as f64 - cy).powi(2) <= radius * radius;
            if inside { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) }
        })
    }

    #[test]
    fn steps_run_in_order() {
        let ops = RecordingOps::default();
        let image = DynamicImage::ImageRgb8(dark_disk_image(120, 60.0, 60.0, 15.0));
        let seed = Coord { x: 60.0, y: 60.0 };
        encircle(&ops, &EncircleConfig::default(), &image, seed, &SegmentationProfile::MOLE)
            .expect("pipeline runs");

        let expected = [
            "extract_channel:red",
            "gaussian_blur:7",
            "adaptive_threshold:39:5:dark_on_bright",
            "connected_components",
            "prune_edge_components:105",
            "render_components",
            "erode:7",
            "dilate:7",
            "dilate:9",
            "erode:11",
            "connected_components",
            "flood_fill_components",
            "find_enclosing_circle",
        ];
        assert_eq!(ops.calls(), expected);
    }

    #[test]
    fn shiny_profile_reads_blue_channel() {
        let ops = RecordingOps::default();
        let image = DynamicImage::ImageRgb8(dark_disk_image(120, 60.0, 60.0, 15.0));
        let seed = Coord { x: 60.0, y: 60.0 };
        encircle(&ops, &EncircleConfig::default(), &image, seed, &SegmentationProfile::SHINY_COIN)
            .expect("pipeline runs");
        let calls = ops.calls();
        assert_eq!(calls[0], "extract_channel:blue");
        assert_eq!(calls[2], "adaptive_threshold:65:-16:bright_on_dark");
        assert_eq!(&calls[8..10], ["dilate:21", "erode:21"]);
    }

    #[test]
    fn finds_dark_disk() {
        let image = DynamicImage::ImageRgb8(dark_disk_image(400, 200.0, 200.0, 30.0));
        let result = encircle(
            &ImageprocOps,
            &EncircleConfig::default(),
            &image,
            Coord { x: 205.0, y: 195.0 },
            &SegmentationProfile::MOLE,
        )
        .expect("pipeline runs");
        assert!(result.circle.is_fit());
        assert!((result.circle.center.x - 200.0).abs() < 5.0);
        assert!((result.circle.center.y - 200.0).abs() < 5.0);
        assert!((25.0..=35.0).contains(&result.circle.radius), "radius {}", result.circle.radius);
        assert!(result.blob_area > 0.0);
        assert_eq!(result.debug_image.dimensions(), (400, 400));
        assert_eq!(result.debug_image.get_pixel(200, 200)[0], 255, "mask is filled at the center");
    }

    #[test]
    fn blank_image_has_no_fit() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(100, 100, Rgb([255, 255, 255])));
        let seed = Coord { x: 50.0, y: 50.0 };
        let config = EncircleConfig::default();
        let result = encircle(&ImageprocOps, &config, &image, seed, &SegmentationProfile::MOLE)
            .expect("pipeline runs");
        assert!(!result.circle.is_fit());
        assert_eq!(result.circle.center, seed);
        assert_eq!(result.blob_area, 0.0);
        assert!(result.debug_image.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn identical_inputs_give_identical_outputs() {
        let image = DynamicImage::ImageRgb8(dark_disk_image(200, 90.0, 110.0, 20.0));
        let seed = Coord { x: 95.0, y: 105.0 };
        let config = EncircleConfig::default();
        let profile = SegmentationProfile::DARK_COIN;
        let first = encircle(&ImageprocOps, &config, &image, seed, &profile).expect("first run");
        let second = encircle(&ImageprocOps, &config, &image, seed, &profile).expect("second run");
        assert_eq!(first.circle, second.circle);
        assert_eq!(first.blob_area, second.blob_area);
        assert_eq!(first.debug_image, second.debug_image);
    }

    #[test]
    fn grayscale_input_fails_loudly() {
        let image = DynamicImage::ImageLuma8(GrayImage::new(50, 50));
        let seed = Coord { x: 1.0, y: 1.0 };
        let config = EncircleConfig::default();
        let result = encircle(&ImageprocOps, &config, &image, seed, &SegmentationProfile::MOLE);
        assert!(result.is_err());
    }
}
