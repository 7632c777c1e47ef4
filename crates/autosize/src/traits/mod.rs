use image::{DynamicImage, GrayImage};

use crate::{
    algorithms::{BorderPolicy, ComponentSet, EnclosingCircle, StructuringElement},
    error::Result,
    profile::{ColorChannel, Polarity},
    types::Point,
};

/// Primitive image operations the encircle pipeline is built from.
///
/// Every operation borrows its inputs and returns a new owned value. Binary
/// images use 0 for background and 255 for foreground; any non-zero pixel is
/// read as foreground.
pub trait ImageOps: Send + Sync {
    /// Single color channel as a grayscale image.
    fn extract_channel(&self, image: &DynamicImage, channel: ColorChannel) -> Result<GrayImage>;

    /// Separable Gaussian smoothing with an odd `kernel_size`.
    fn gaussian_blur(
        &self,
        image: &GrayImage,
        kernel_size: u32,
        sigma_x: f64,
        sigma_y: f64,
        border: BorderPolicy,
    ) -> Result<GrayImage>;

    /// Binarize against the mean of each `block_size` square neighbourhood.
    fn adaptive_threshold(
        &self,
        image: &GrayImage,
        block_size: u32,
        offset: i32,
        polarity: Polarity,
    ) -> Result<GrayImage>;

    /// 8-connected labelling with per-component statistics.
    fn connected_components(&self, binary: &GrayImage) -> Result<ComponentSet>;

    /// Drop components that touch the border and are larger than `area_threshold`.
    fn prune_edge_components(&self, components: &ComponentSet, area_threshold: u32) -> ComponentSet;

    /// Surviving components painted white on black.
    fn render_components(&self, components: &ComponentSet) -> GrayImage;

    fn erode(&self, image: &GrayImage, element: &StructuringElement) -> GrayImage;

    fn dilate(&self, image: &GrayImage, element: &StructuringElement) -> GrayImage;

    /// Surviving components with their interior holes filled.
    fn flood_fill_components(&self, components: &ComponentSet) -> GrayImage;

    /// Enclosing circle of the component picked by `seed`, or a no-fit circle
    /// (negative radius) when no component is close enough.
    fn find_enclosing_circle(
        &self,
        components: &ComponentSet,
        seed: Point,
        seed_tolerance: f64,
    ) -> EnclosingCircle;
}
