//! Frame-of-reference conversions.
//!
//! Captured bitmaps are landscape; the UI presents them in portrait. The
//! segmentation pipeline always works on the stored (landscape/up) bitmap, so
//! seeds are rotated in and results rotated back out. Views show images
//! aspect-fit and centered, which adds a scale and an offset on top.

use geo_types::Coord;

use crate::types::{CirclePosition, Orientation, OrientedImage, Point, Size};

/// `(x, y) -> (y, width - x)` where `width` is the portrait image width.
pub fn portrait_to_landscape(point: Point, image_width: f64) -> Point {
    Coord {
        x: point.y,
        y: image_width - point.x,
    }
}

/// `(x, y) -> (height - y, x)` where `height` is the landscape image height.
pub fn landscape_to_portrait(point: Point, image_height: f64) -> Point {
    Coord {
        x: image_height - point.y,
        y: point.x,
    }
}

/// Re-tag `image` to `target` without touching pixels.
pub fn ensure_orientation(image: &OrientedImage, target: Orientation) -> OrientedImage {
    image.retagged(target)
}

/// Map a display-frame point into the stored bitmap's frame.
pub fn to_working_frame(point: Point, image: &OrientedImage) -> Point {
    match image.orientation() {
        Orientation::Up => point,
        Orientation::Right => portrait_to_landscape(point, image.display_size().width),
    }
}

/// Inverse of [`to_working_frame`].
pub fn from_working_frame(point: Point, image: &OrientedImage) -> Point {
    match image.orientation() {
        Orientation::Up => point,
        Orientation::Right => landscape_to_portrait(point, image.bitmap_size().height),
    }
}

/// Placement of an image shown "aspect fit" and centered inside a view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewFit {
    pub scale: f64,
    pub offset: Point,
}

impl ViewFit {
    /// Both sizes must be non-zero.
    pub fn aspect_fit(image_size: Size, view_size: Size) -> Self {
        let scale = (view_size.width / image_size.width).min(view_size.height / image_size.height);
        let offset = Coord {
            x: (view_size.width - image_size.width * scale) / 2.0,
            y: (view_size.height - image_size.height * scale) / 2.0,
        };
        Self { scale, offset }
    }

    pub fn image_to_view(&self, point: Point) -> Point {
        point * self.scale + self.offset
    }

    pub fn view_to_image(&self, point: Point) -> Point {
        (point - self.offset) / self.scale
    }
}

pub fn image_to_view_point(point: Point, image_size: Size, view_size: Size) -> Point {
    ViewFit::aspect_fit(image_size, view_size).image_to_view(point)
}

pub fn view_to_image_point(point: Point, image_size: Size, view_size: Size) -> Point {
    ViewFit::aspect_fit(image_size, view_size).view_to_image(point)
}

pub fn image_to_view_circle(
    circle: CirclePosition,
    image_size: Size,
    view_size: Size,
) -> CirclePosition {
    let fit = ViewFit::aspect_fit(image_size, view_size);
    CirclePosition::new(fit.image_to_view(circle.center), circle.radius * fit.scale)
}

pub fn view_to_image_circle(
    circle: CirclePosition,
    image_size: Size,
    view_size: Size,
) -> CirclePosition {
    let fit = ViewFit::aspect_fit(image_size, view_size);
    CirclePosition::new(fit.view_to_image(circle.center), circle.radius / fit.scale)
}

/// Rescale a circle from the (downsampled) display photo to the full-size
/// JPEG. `None` when the two frames disagree on aspect ratio.
pub fn translate_display_circle_to_jpeg_circle(
    circle: CirclePosition,
    display_size: Size,
    jpeg_size: Size,
) -> Option<CirclePosition> {
    let hscale = jpeg_size.width / display_size.width;
    let vscale = jpeg_size.height / display_size.height;
    if (hscale * 10.0).round() != (vscale * 10.0).round() {
        tracing::warn!(hscale, vscale, "display and jpeg frames have different aspect ratios");
        return None;
    }
    let center = Coord {
        x: circle.center.x / display_size.width * jpeg_size.width,
        y: circle.center.y / display_size.height * jpeg_size.height,
    };
    Some(CirclePosition::new(center, circle.radius * hscale))
}

/// Clipping rectangle in the stored (up) bitmap frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Place a `clipping_size` rectangle around `position` (display frame),
/// shifted so it stays inside the bitmap whenever it fits.
pub fn calc_clipping_rect(
    position: CirclePosition,
    image: &OrientedImage,
    clipping_size: Size,
) -> ClipRect {
    let half_width = clipping_size.width / 2.0;
    let half_height = clipping_size.height / 2.0;
    let center = position.center;

    // pixel centers
    let (mut left, right, mut top, bottom, bounds, clip) = match image.orientation() {
        Orientation::Up => (
            center.x - half_width + 0.5,
            center.x + half_width - 0.5,
            center.y - half_height + 0.5,
            center.y + half_height - 0.5,
            image.bitmap_size(),
            clipping_size,
        ),
        Orientation::Right => {
            let flipped_x = image.display_size().width - center.x;
            (
                center.y - half_height + 0.5,
                center.y + half_height - 0.5,
                flipped_x - half_width + 0.5,
                flipped_x + half_width - 0.5,
                image.bitmap_size(),
                Size::new(clipping_size.height, clipping_size.width),
            )
        }
    };
    let width = clip.width.floor();
    let height = clip.height.floor();

    if left < 0.0 {
        left = 0.0;
    }
    if right > bounds.width {
        left = bounds.width - width;
    }
    if top < 0.0 {
        top = 0.0;
    }
    if bottom > bounds.height {
        top = bounds.height - height;
    }

    ClipRect {
        left: left.floor(),
        top: top.floor(),
        width,
        height,
    }
}
