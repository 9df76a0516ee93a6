//! Rasterization of contours and ellipses into byte masks.

use nalgebra::{Point2, Vector2};

use crate::grid::Mask;
use crate::types::Contour;

/// Filled polygon mask: even-odd scanline interior plus the stroked outline,
/// so boundary pixels are always part of the fill.
pub fn fill_contour(contour: &Contour, w: usize, h: usize) -> Mask {
    let mut mask = Mask::new(w, h);
    if contour.len() < 3 {
        stroke_into(&mut mask, contour, 1);
        return mask;
    }
    let n = contour.len();
    let mut crossings: Vec<f32> = Vec::with_capacity(8);
    for y in 0..h {
        let sy = y as f32;
        crossings.clear();
        let mut j = n - 1;
        for i in 0..n {
            let (xi, yi) = (contour[i][0] as f32, contour[i][1] as f32);
            let (xj, yj) = (contour[j][0] as f32, contour[j][1] as f32);
            j = i;
            if yi == yj {
                continue;
            }
            let (y0, y1) = if yi < yj { (yi, yj) } else { (yj, yi) };
            // Half-open span so a vertex on the scanline is counted once.
            if sy >= y0 && sy < y1 {
                crossings.push(xi + (sy - yi) * (xj - xi) / (yj - yi));
            }
        }
        crossings.sort_by(|a, b| a.partial_cmp(b).unwrap());
        for pair in crossings.chunks_exact(2) {
            let x0 = pair[0].ceil().max(0.0) as usize;
            let x1 = pair[1].floor().min(w as f32 - 1.0);
            if x1 < 0.0 {
                continue;
            }
            for x in x0..=x1 as usize {
                mask.set(x, y);
            }
        }
    }
    stroke_into(&mut mask, contour, 1);
    mask
}

/// Closed contour stroked with the given thickness (square brush).
pub fn stroke_contour(contour: &Contour, w: usize, h: usize, thickness: u32) -> Mask {
    let mut mask = Mask::new(w, h);
    stroke_into(&mut mask, contour, thickness);
    mask
}

fn stroke_into(mask: &mut Mask, contour: &Contour, thickness: u32) {
    let n = contour.len();
    if n == 0 {
        return;
    }
    if n == 1 {
        stamp(mask, contour[0][0], contour[0][1], thickness);
        return;
    }
    for i in 0..n {
        let a = contour[i];
        let b = contour[(i + 1) % n];
        bresenham(mask, a, b, thickness);
    }
}

fn bresenham(mask: &mut Mask, a: [i32; 2], b: [i32; 2], thickness: u32) {
    let (mut x, mut y) = (a[0], a[1]);
    let dx = (b[0] - a[0]).abs();
    let dy = -(b[1] - a[1]).abs();
    let sx = if a[0] < b[0] { 1 } else { -1 };
    let sy = if a[1] < b[1] { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        stamp(mask, x, y, thickness);
        if x == b[0] && y == b[1] {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

#[inline]
fn stamp(mask: &mut Mask, x: i32, y: i32, thickness: u32) {
    let t = thickness.max(1) as i32;
    let lo = -(t - 1) / 2;
    let hi = t / 2;
    for oy in lo..=hi {
        for ox in lo..=hi {
            let (px, py) = (x + ox, y + oy);
            if px >= 0 && py >= 0 && (px as usize) < mask.w && (py as usize) < mask.h {
                mask.set(px as usize, py as usize);
            }
        }
    }
}

/// Filled rotated ellipse spanning `a -> b`: the segment is the major axis,
/// the minor axis is half its length. Degenerate spans mark the single pixel.
pub fn fill_ellipse(a: [i32; 2], b: [i32; 2], w: usize, h: usize) -> Mask {
    let mut mask = Mask::new(w, h);
    let pa = Point2::new(a[0] as f32, a[1] as f32);
    let pb = Point2::new(b[0] as f32, b[1] as f32);
    let span = pb - pa;
    let len = span.norm();
    if len < 1.0 {
        stamp(&mut mask, a[0], a[1], 1);
        return mask;
    }
    let center = Point2::new((pa.x + pb.x) * 0.5, (pa.y + pb.y) * 0.5);
    let axis = span / len;
    let perp = Vector2::new(-axis.y, axis.x);
    let semi_major = len * 0.5;
    let semi_minor = len * 0.25;

    let reach = semi_major.ceil() as i32 + 1;
    let cx = center.x.round() as i32;
    let cy = center.y.round() as i32;
    for y in (cy - reach).max(0)..=(cy + reach).min(h as i32 - 1) {
        for x in (cx - reach).max(0)..=(cx + reach).min(w as i32 - 1) {
            let d = Point2::new(x as f32, y as f32) - center;
            let u = d.dot(&axis) / semi_major;
            let v = d.dot(&perp) / semi_minor;
            if u * u + v * v <= 1.0 {
                mask.set(x as usize, y as usize);
            }
        }
    }
    mask
}

/// Centroid of the foreground pixels, or `None` for an empty mask.
pub fn mask_centroid(mask: &Mask) -> Option<Point2<f32>> {
    let (mut sx, mut sy, mut count) = (0.0f64, 0.0f64, 0usize);
    for y in 0..mask.h {
        for x in 0..mask.w {
            if mask.get(x, y) {
                sx += x as f64;
                sy += y as f64;
                count += 1;
            }
        }
    }
    if count == 0 {
        return None;
    }
    Some(Point2::new(
        (sx / count as f64) as f32,
        (sy / count as f64) as f32,
    ))
}
