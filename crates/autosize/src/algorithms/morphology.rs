use image::{GrayImage, Luma};

use crate::error::{AutosizeError, Result};

/// Binary structuring element stored as one horizontal run per row,
/// relative to the anchor at the center.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuringElement {
    size: u32,
    /// `(dy, dx_start, dx_end)`, inclusive.
    runs: Vec<(i64, i64, i64)>,
}

impl StructuringElement {
    /// Ellipse inscribed in a `size` x `size` square, rasterized the way
    /// OpenCV's `MORPH_ELLIPSE` does.
    pub fn ellipse(size: u32) -> Result<Self> {
        Self::check(size)?;
        let radius = (size / 2) as i64;
        let center = (size / 2) as i64;
        let inv_r2 = if radius > 0 { 1.0 / (radius * radius) as f64 } else { 0.0 };

        let runs = (0..size as i64)
            .filter_map(|row| {
                let dy = row - radius;
                if dy.abs() > radius {
                    return None;
                }
                let span = ((radius * radius - dy * dy) as f64 * inv_r2).sqrt();
                let dx = (center as f64 * span).round() as i64;
                let start = (center - dx).max(0);
                let end = (center + dx + 1).min(size as i64);
                Some((dy, start - center, end - 1 - center))
            })
            .collect();

        Ok(Self { size, runs })
    }

    pub fn square(size: u32) -> Result<Self> {
        Self::check(size)?;
        let anchor = (size / 2) as i64;
        let runs = (0..size as i64)
            .map(|row| (row - anchor, -anchor, size as i64 - 1 - anchor))
            .collect();
        Ok(Self { size, runs })
    }

    fn check(size: u32) -> Result<()> {
        if size == 0 {
            return Err(AutosizeError::InvalidKernel(
                "structuring element size must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn contains(&self, dx: i64, dy: i64) -> bool {
        self.runs
            .iter()
            .any(|&(row, start, end)| row == dy && (start..=end).contains(&dx))
    }

    /// Element as a `size` x `size` mask image.
    pub fn to_image(&self) -> GrayImage {
        let anchor = (self.size / 2) as i64;
        GrayImage::from_fn(self.size, self.size, |x, y| {
            let hit = self.contains(x as i64 - anchor, y as i64 - anchor);
            Luma([if hit { 255 } else { 0 }])
        })
    }
}

/// Per-row running foreground counts, `width + 1` entries per row.
struct RowCounts {
    width: i64,
    height: i64,
    counts: Vec<u32>,
}

impl RowCounts {
    fn new(image: &GrayImage) -> Self {
        let (width, height) = image.dimensions();
        let stride = width as usize + 1;
        let mut counts = vec![0u32; stride * height as usize];
        for (y, row) in image.rows().enumerate() {
            let base = y * stride;
            for (x, pixel) in row.enumerate() {
                counts[base + x + 1] = counts[base + x] + u32::from(pixel[0] != 0);
            }
        }
        Self {
            width: width as i64,
            height: height as i64,
            counts,
        }
    }

    /// Foreground pixels and in-bounds pixels under the element at `(x, y)`.
    fn window(&self, element: &StructuringElement, x: i64, y: i64) -> (u32, u32) {
        let stride = (self.width + 1) as usize;
        let mut hits = 0;
        let mut covered = 0;
        for &(dy, start, end) in &element.runs {
            let row = y + dy;
            if row < 0 || row >= self.height {
                continue;
            }
            let first = (x + start).max(0);
            let last = (x + end).min(self.width - 1);
            if first > last {
                continue;
            }
            let base = row as usize * stride;
            hits += self.counts[base + last as usize + 1] - self.counts[base + first as usize];
            covered += (last - first + 1) as u32;
        }
        (hits, covered)
    }
}

fn apply(
    image: &GrayImage,
    element: &StructuringElement,
    keep: impl Fn(u32, u32) -> bool,
) -> GrayImage {
    let counts = RowCounts::new(image);
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let (hits, covered) = counts.window(element, x as i64, y as i64);
        Luma([if keep(hits, covered) { 255 } else { 0 }])
    })
}

/// Pixels outside the image never erode a pixel away.
pub fn erode(image: &GrayImage, element: &StructuringElement) -> GrayImage {
    apply(image, element, |hits, covered| hits == covered)
}

/// Pixels outside the image never dilate into it.
pub fn dilate(image: &GrayImage, element: &StructuringElement) -> GrayImage {
    apply(image, element, |hits, _| hits > 0)
}
