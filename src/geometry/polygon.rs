//! Point-in-polygon and line-of-sight tests against clump outlines.

use nalgebra::Point2;

use crate::types::{Contour, Rect};

/// Number of evenly spaced sample points used by [`line_of_sight`].
const SIGHT_SAMPLES: u32 = 10;

/// Distance below which a query point counts as lying on a polygon edge.
const EDGE_EPS: f32 = 1e-3;

#[inline]
fn near_segment(ax: f32, ay: f32, bx: f32, by: f32, px: f32, py: f32) -> bool {
    let (dx, dy) = (bx - ax, by - ay);
    let len2 = dx * dx + dy * dy;
    if len2 == 0.0 {
        return (px - ax).hypot(py - ay) <= EDGE_EPS;
    }
    let t = ((px - ax) * dx + (py - ay) * dy) / len2;
    let t = t.clamp(0.0, 1.0);
    let (cx, cy) = (ax + t * dx, ay + t * dy);
    (px - cx).hypot(py - cy) <= EDGE_EPS
}

/// Even-odd membership test; points on an edge count as inside, matching the
/// non-negative polygon-test convention the association rules rely on.
pub fn contains(poly: &[[i32; 2]], px: f32, py: f32) -> bool {
    let n = poly.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = (poly[i][0] as f32, poly[i][1] as f32);
        let (xj, yj) = (poly[j][0] as f32, poly[j][1] as f32);
        if near_segment(xi, yi, xj, yj, px, py) {
            return true;
        }
        if (yi > py) != (yj > py) {
            let t = (py - yi) / (yj - yi);
            if px < xi + t * (xj - xi) {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// True when the straight segment `from -> to`, sampled at ten evenly spaced
/// points, stays entirely inside the polygon. Used to decide whether a pixel
/// can plausibly belong to a nucleus without the connecting cytoplasm leaving
/// the clump.
pub fn line_of_sight(poly: &[[i32; 2]], from: Point2<f32>, to: Point2<f32>) -> bool {
    for k in 1..=SIGHT_SAMPLES {
        let t = k as f32 / SIGHT_SAMPLES as f32;
        let x = from.x + (to.x - from.x) * t;
        let y = from.y + (to.y - from.y) * t;
        if !contains(poly, x, y) {
            return false;
        }
    }
    true
}

/// Absolute shoelace area of the contour polygon.
pub fn contour_area(contour: &[[i32; 2]]) -> f64 {
    let n = contour.len();
    if n < 3 {
        return 0.0;
    }
    let mut acc = 0i64;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = (contour[i][0] as i64, contour[i][1] as i64);
        let (xj, yj) = (contour[j][0] as i64, contour[j][1] as i64);
        acc += xj * yi - xi * yj;
        j = i;
    }
    (acc.abs() as f64) * 0.5
}

/// Mean of the polygon vertices (the nucleus-centroid convention).
pub fn vertex_centroid(contour: &[[i32; 2]]) -> Point2<f32> {
    let n = contour.len().max(1) as f32;
    let (mut sx, mut sy) = (0.0f32, 0.0f32);
    for p in contour {
        sx += p[0] as f32;
        sy += p[1] as f32;
    }
    Point2::new(sx / n, sy / n)
}

/// Tight bounding rectangle of the contour (inclusive extents).
pub fn bounding_rect(contour: &[[i32; 2]]) -> Rect {
    if contour.is_empty() {
        return Rect::new(0, 0, 0, 0);
    }
    let (mut x0, mut y0) = (i32::MAX, i32::MAX);
    let (mut x1, mut y1) = (i32::MIN, i32::MIN);
    for p in contour {
        x0 = x0.min(p[0]);
        y0 = y0.min(p[1]);
        x1 = x1.max(p[0]);
        y1 = y1.max(p[1]);
    }
    Rect::new(x0, y0, (x1 - x0 + 1) as usize, (y1 - y0 + 1) as usize)
}

/// Translate every contour point by `(dx, dy)`.
pub fn offset_contour(contour: &[[i32; 2]], dx: i32, dy: i32) -> Contour {
    contour.iter().map(|p| [p[0] + dx, p[1] + dy]).collect()
}
