use geo::ConvexHull;
use geo_types::{Coord, LineString};

use crate::{
    algorithms::components::{ComponentSet, ComponentStats},
    types::{squared_distance, CirclePosition, Point},
};

const EPSILON: f64 = 1e-7;

/// Circle fitted around one component, with that component's pixel area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnclosingCircle {
    pub circle: CirclePosition,
    pub area: f64,
    pub label: Option<u32>,
}

impl EnclosingCircle {
    pub fn no_fit(seed: Point) -> Self {
        Self {
            circle: CirclePosition::new(seed, CirclePosition::NO_FIT_RADIUS),
            area: 0.0,
            label: None,
        }
    }
}

/// The component whose bounding box, grown by `tolerance`, contains the
/// seed; ties go to the nearest centroid, then the lowest label.
pub fn select_component(
    components: &ComponentSet,
    seed: Point,
    tolerance: f64,
) -> Option<&ComponentStats> {
    components
        .stats()
        .iter()
        .filter(|s| {
            let b = s.bounds;
            seed.x >= b.left() as f64 - tolerance
                && seed.x <= b.right() as f64 + tolerance
                && seed.y >= b.top() as f64 - tolerance
                && seed.y <= b.bottom() as f64 + tolerance
        })
        .min_by(|a, b| {
            squared_distance(a.centroid, seed)
                .partial_cmp(&squared_distance(b.centroid, seed))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}

pub fn find_enclosing_circle(
    components: &ComponentSet,
    seed: Point,
    tolerance: f64,
) -> EnclosingCircle {
    let Some(stats) = select_component(components, seed, tolerance) else {
        tracing::debug!(x = seed.x, y = seed.y, "no component near seed");
        return EnclosingCircle::no_fit(seed);
    };

    let outline = components.row_extremes(stats.label);
    let hull = LineString::new(outline).convex_hull();
    let points: Vec<Point> = hull.exterior().coords().copied().collect();
    let circle = minimal_enclosing_circle(&points)
        .unwrap_or_else(|| CirclePosition::new(stats.centroid, 0.0));

    tracing::debug!(
        label = stats.label,
        area = stats.area,
        radius = circle.radius,
        "fitted enclosing circle"
    );

    EnclosingCircle {
        circle,
        area: stats.area as f64,
        label: Some(stats.label),
    }
}

/// Smallest circle containing every point (incremental Welzl, input order).
pub fn minimal_enclosing_circle(points: &[Point]) -> Option<CirclePosition> {
    let (&first, rest) = points.split_first()?;
    let mut circle = CirclePosition::new(first, 0.0);

    for (i, &p) in rest.iter().enumerate() {
        if contains(&circle, p) {
            continue;
        }
        circle = CirclePosition::new(p, 0.0);
        for (j, &q) in points[..=i].iter().enumerate() {
            if contains(&circle, q) {
                continue;
            }
            circle = diameter_circle(p, q);
            for &r in &points[..j] {
                if !contains(&circle, r) {
                    circle = circumcircle(p, q, r);
                }
            }
        }
    }
    Some(circle)
}

fn contains(circle: &CirclePosition, point: Point) -> bool {
    squared_distance(circle.center, point).sqrt() <= circle.radius + EPSILON
}

fn diameter_circle(a: Point, b: Point) -> CirclePosition {
    let center = Coord {
        x: (a.x + b.x) / 2.0,
        y: (a.y + b.y) / 2.0,
    };
    CirclePosition::new(center, squared_distance(a, b).sqrt() / 2.0)
}

fn circumcircle(a: Point, b: Point, c: Point) -> CirclePosition {
    let bx = b.x - a.x;
    let by = b.y - a.y;
    let cx = c.x - a.x;
    let cy = c.y - a.y;
    let d = 2.0 * (bx * cy - by * cx);
    if d.abs() < EPSILON {
        // collinear: the widest pair spans the others
        return [diameter_circle(a, b), diameter_circle(a, c), diameter_circle(b, c)]
            .into_iter()
            .max_by(|l, r| l.radius.partial_cmp(&r.radius).unwrap_or(std::cmp::Ordering::Equal))
            .unwrap_or_else(|| diameter_circle(a, b));
    }
    let b2 = bx * bx + by * by;
    let c2 = cx * cx + cy * cy;
    let ux = (cy * b2 - by * c2) / d;
    let uy = (bx * c2 - cx * b2) / d;
    CirclePosition::new(Coord { x: a.x + ux, y: a.y + uy }, (ux * ux + uy * uy).sqrt())
}
