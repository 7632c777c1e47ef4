use geo_types::Coord;
use image::{GrayImage, ImageBuffer, Luma};
use imageproc::{
    rect::Rect,
    region_labelling::{connected_components, Connectivity},
};

use crate::types::Point;

/// Component label per pixel; 0 is background.
pub type LabelMap = ImageBuffer<Luma<u32>, Vec<u32>>;

#[derive(Debug, Clone, PartialEq)]
pub struct ComponentStats {
    pub label: u32,
    pub bounds: Rect,
    /// Pixel count.
    pub area: u32,
    pub centroid: Point,
    /// Bounding box reaches any image border.
    pub touches_edge: bool,
}

/// Labelled regions of one binary image and their statistics, sorted by label.
#[derive(Debug, Clone)]
pub struct ComponentSet {
    labels: LabelMap,
    stats: Vec<ComponentStats>,
}

struct Accumulator {
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
    area: u32,
    sum_x: f64,
    sum_y: f64,
}

impl ComponentSet {
    /// Compute statistics for an existing label map.
    pub fn from_labels(labels: LabelMap) -> Self {
        let (width, height) = labels.dimensions();
        let max_label = labels.pixels().map(|p| p[0]).max().unwrap_or(0) as usize;
        let mut accumulators: Vec<Option<Accumulator>> = (0..=max_label).map(|_| None).collect();

        for (x, y, pixel) in labels.enumerate_pixels() {
            let label = pixel[0] as usize;
            if label == 0 {
                continue;
            }
            let acc = accumulators[label].get_or_insert(Accumulator {
                min_x: x,
                min_y: y,
                max_x: x,
                max_y: y,
                area: 0,
                sum_x: 0.0,
                sum_y: 0.0,
            });
            acc.min_x = acc.min_x.min(x);
            acc.min_y = acc.min_y.min(y);
            acc.max_x = acc.max_x.max(x);
            acc.max_y = acc.max_y.max(y);
            acc.area += 1;
            acc.sum_x += x as f64;
            acc.sum_y += y as f64;
        }

        let stats = accumulators
            .into_iter()
            .enumerate()
            .filter_map(|(label, acc)| acc.map(|acc| (label as u32, acc)))
            .map(|(label, acc)| ComponentStats {
                label,
                bounds: Rect::at(acc.min_x as i32, acc.min_y as i32)
                    .of_size(acc.max_x - acc.min_x + 1, acc.max_y - acc.min_y + 1),
                area: acc.area,
                centroid: Coord {
                    x: acc.sum_x / acc.area as f64,
                    y: acc.sum_y / acc.area as f64,
                },
                touches_edge: acc.min_x == 0
                    || acc.min_y == 0
                    || acc.max_x + 1 == width
                    || acc.max_y + 1 == height,
            })
            .collect();

        Self { labels, stats }
    }

    pub fn labels(&self) -> &LabelMap {
        &self.labels
    }

    pub fn stats(&self) -> &[ComponentStats] {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    pub fn get(&self, label: u32) -> Option<&ComponentStats> {
        self.stats
            .binary_search_by_key(&label, |s| s.label)
            .ok()
            .map(|index| &self.stats[index])
    }

    /// New set holding only the components `keep` accepts; the rest are
    /// cleared to background.
    pub fn retain(&self, keep: impl Fn(&ComponentStats) -> bool) -> Self {
        let max_label = self.stats.last().map_or(0, |s| s.label) as usize;
        let mut kept = vec![false; max_label + 1];
        let mut stats = Vec::with_capacity(self.stats.len());
        for component in self.stats.iter().filter(|s| keep(s)) {
            kept[component.label as usize] = true;
            stats.push(component.clone());
        }

        let labels = LabelMap::from_fn(self.labels.width(), self.labels.height(), |x, y| {
            let label = self.labels.get_pixel(x, y)[0];
            Luma([if kept[label as usize] { label } else { 0 }])
        });

        Self { labels, stats }
    }

    /// Leftmost and rightmost pixel of `label` on every row it covers.
    pub fn row_extremes(&self, label: u32) -> Vec<Point> {
        let Some(stats) = self.get(label) else {
            return Vec::new();
        };
        let bounds = stats.bounds;
        let mut points = Vec::with_capacity(2 * bounds.height() as usize);
        for y in bounds.top() as u32..=bounds.bottom() as u32 {
            let mut row = (bounds.left() as u32..=bounds.right() as u32)
                .filter(|&x| self.labels.get_pixel(x, y)[0] == label);
            if let Some(first) = row.next() {
                let last = row.last().unwrap_or(first);
                points.push(Coord { x: first as f64, y: y as f64 });
                if last != first {
                    points.push(Coord { x: last as f64, y: y as f64 });
                }
            }
        }
        points
    }
}

pub fn label_components(binary: &GrayImage) -> ComponentSet {
    let normalized = GrayImage::from_fn(binary.width(), binary.height(), |x, y| {
        Luma([if binary.get_pixel(x, y)[0] != 0 { 255 } else { 0 }])
    });
    ComponentSet::from_labels(connected_components(&normalized, Connectivity::Eight, Luma([0u8])))
}

/// Large border-touching blobs are frame and shadow artifacts; small ones
/// and anything not reaching the border stay.
pub fn prune_edge_components(components: &ComponentSet, area_threshold: u32) -> ComponentSet {
    components.retain(|s| !(s.touches_edge && s.area > area_threshold))
}

pub fn render_components(components: &ComponentSet) -> GrayImage {
    let labels = components.labels();
    GrayImage::from_fn(labels.width(), labels.height(), |x, y| {
        Luma([if labels.get_pixel(x, y)[0] != 0 { 255 } else { 0 }])
    })
}

/// Fill background regions that cannot reach the border through 4-connected
/// background, i.e. holes inside components.
pub fn flood_fill_components(components: &ComponentSet) -> GrayImage {
    let labels = components.labels();
    let background = GrayImage::from_fn(labels.width(), labels.height(), |x, y| {
        Luma([if labels.get_pixel(x, y)[0] == 0 { 255 } else { 0 }])
    });
    let regions = ComponentSet::from_labels(connected_components(
        &background,
        Connectivity::Four,
        Luma([0u8]),
    ));

    let max_region = regions.stats().last().map_or(0, |s| s.label) as usize;
    let mut outside = vec![false; max_region + 1];
    for region in regions.stats().iter().filter(|r| r.touches_edge) {
        outside[region.label as usize] = true;
    }

    GrayImage::from_fn(labels.width(), labels.height(), |x, y| {
        let region = regions.labels().get_pixel(x, y)[0] as usize;
        let filled = labels.get_pixel(x, y)[0] != 0 || !outside[region];
        Luma([if filled { 255 } else { 0 }])
    })
}
