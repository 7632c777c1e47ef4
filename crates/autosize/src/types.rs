use std::sync::Arc;

use geo_types::Coord;
use image::{DynamicImage, GrayImage};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::error::{AutosizeError, Result};

/// A point in some 2D frame of reference (image pixels, view points, ...).
pub type Point = Coord<f64>;

/// Width and height in the same units as the points they describe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Circle relative to an implicitly known frame. A negative radius means
/// "no fit" and never leaves the crate through the public encirclers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CirclePosition {
    pub center: Point,
    pub radius: f64,
}

impl CirclePosition {
    pub const NO_FIT_RADIUS: f64 = -1.0;

    pub fn new(center: Point, radius: f64) -> Self {
        Self { center, radius }
    }

    pub fn zero() -> Self {
        Self::new(Coord { x: 0.0, y: 0.0 }, 0.0)
    }

    /// Circle inscribed in the square `rect`: `(x, y, width, height)`; only the width is read.
    pub fn from_rect(x: f64, y: f64, width: f64) -> Self {
        let radius = width / 2.0;
        Self::new(Coord { x: x + radius, y: y + radius }, radius)
    }

    /// Bounding square as `(x, y, width, height)`.
    pub fn to_rect(&self) -> (f64, f64, f64, f64) {
        (
            self.center.x - self.radius,
            self.center.y - self.radius,
            2.0 * self.radius,
            2.0 * self.radius,
        )
    }

    pub fn is_fit(&self) -> bool {
        self.radius > 0.0
    }

    /// Area of the disk, used as the denominator of blob coverage.
    pub fn area(&self) -> f64 {
        std::f64::consts::PI * self.radius * self.radius
    }
}

/// Squared Euclidean distance; enough for comparing distances.
pub fn squared_distance(a: Point, b: Point) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

/// How a stored bitmap is meant to be displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Landscape bitmap shown as stored.
    Up,
    /// Landscape bitmap shown rotated 90° clockwise (portrait capture).
    Right,
}

/// Stored bitmap plus its display orientation. The bitmap is shared, so
/// re-tagging never copies pixels.
#[derive(Debug, Clone)]
pub struct OrientedImage {
    bitmap: Arc<DynamicImage>,
    orientation: Orientation,
}

impl OrientedImage {
    pub fn new(bitmap: DynamicImage, orientation: Orientation) -> Result<Self> {
        Self::from_shared(Arc::new(bitmap), orientation)
    }

    pub fn from_shared(bitmap: Arc<DynamicImage>, orientation: Orientation) -> Result<Self> {
        let (width, height) = (bitmap.width(), bitmap.height());
        if width == 0 || height == 0 {
            return Err(AutosizeError::EmptyImage { width, height });
        }
        Ok(Self { bitmap, orientation })
    }

    pub fn bitmap(&self) -> &DynamicImage {
        &self.bitmap
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Same pixels, different tag.
    pub fn retagged(&self, orientation: Orientation) -> Self {
        Self {
            bitmap: Arc::clone(&self.bitmap),
            orientation,
        }
    }

    /// Size of the stored bitmap.
    pub fn bitmap_size(&self) -> Size {
        Size::new(self.bitmap.width() as f64, self.bitmap.height() as f64)
    }

    /// Size as displayed; transposed for right-tagged images.
    pub fn display_size(&self) -> Size {
        let size = self.bitmap_size();
        match self.orientation {
            Orientation::Up => size,
            Orientation::Right => Size::new(size.height, size.width),
        }
    }
}

/// Image and circle handed between capture, encircling and fix screens.
/// The circle is relative to the image's display frame.
#[derive(Debug, Clone)]
pub struct FixableData {
    pub image: OrientedImage,
    pub circle: CirclePosition,
}

impl FixableData {
    pub fn new(image: OrientedImage, circle: CirclePosition) -> Self {
        Self { image, circle }
    }
}

/// Output of one run of the generic pipeline, in the working frame.
#[derive(Debug, Clone)]
pub struct EncircleResult {
    pub circle: CirclePosition,
    pub debug_image: GrayImage,
    pub blob_area: f64,
}

/// Output of an object-level run, mapped back to the display frame.
#[derive(Debug, Clone)]
pub struct ObjectDetection {
    pub circle: Option<CirclePosition>,
    pub debug_mask: OrientedImage,
    pub blob_area: f64,
}
