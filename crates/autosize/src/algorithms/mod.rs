pub mod preprocessing;
pub mod morphology;
pub mod components;
pub mod fitting;

pub use preprocessing::*;
pub use morphology::*;
pub use components::*;
pub use fitting::*;

use image::{DynamicImage, GrayImage};

use crate::{
    error::Result,
    profile::{ColorChannel, Polarity},
    traits::ImageOps,
    types::Point,
};

/// Default [`ImageOps`] backend built on `image` and `imageproc`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageprocOps;

impl ImageOps for ImageprocOps {
    fn extract_channel(&self, image: &DynamicImage, channel: ColorChannel) -> Result<GrayImage> {
        extract_channel(image, channel)
    }

    fn gaussian_blur(
        &self,
        image: &GrayImage,
        kernel_size: u32,
        sigma_x: f64,
        sigma_y: f64,
        border: BorderPolicy,
    ) -> Result<GrayImage> {
        gaussian_blur(image, kernel_size, sigma_x, sigma_y, border)
    }

    fn adaptive_threshold(
        &self,
        image: &GrayImage,
        block_size: u32,
        offset: i32,
        polarity: Polarity,
    ) -> Result<GrayImage> {
        adaptive_threshold(image, block_size, offset, polarity)
    }

    fn connected_components(&self, binary: &GrayImage) -> Result<ComponentSet> {
        Ok(label_components(binary))
    }

    fn prune_edge_components(
        &self,
        components: &ComponentSet,
        area_threshold: u32,
    ) -> ComponentSet {
        prune_edge_components(components, area_threshold)
    }

    fn render_components(&self, components: &ComponentSet) -> GrayImage {
        render_components(components)
    }

    fn erode(&self, image: &GrayImage, element: &StructuringElement) -> GrayImage {
        erode(image, element)
    }

    fn dilate(&self, image: &GrayImage, element: &StructuringElement) -> GrayImage {
        dilate(image, element)
    }

    fn flood_fill_components(&self, components: &ComponentSet) -> GrayImage {
        flood_fill_components(components)
    }

    fn find_enclosing_circle(
        &self,
        components: &ComponentSet,
        seed: Point,
        seed_tolerance: f64,
    ) -> EnclosingCircle {
        find_enclosing_circle(components, seed, seed_tolerance)
    }
}
