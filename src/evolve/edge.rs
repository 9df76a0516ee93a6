//! Edge-enforcer field: low where the smoothed image has strong gradients,
//! attracting evolving contours toward intensity edges.

use crate::grid::{gaussian_smooth, gradient, GridF32};

/// `g = 1 / (1 + |grad(G_sigma * I)|^2)` over the clump image padded with
/// white on all sides, so the frame border itself produces no spurious
/// edges inside the clump.
pub fn edge_enforcer(image: &GridF32, border: usize, ksize: usize, sigma: f32) -> GridF32 {
    let (fw, fh) = (image.w + 2 * border, image.h + 2 * border);
    let mut padded = GridF32::filled(fw, fh, 1.0);
    for y in 0..image.h {
        let src = image.row(y);
        let dst = padded.row_mut(y + border);
        dst[border..border + image.w].copy_from_slice(src);
    }

    let smoothed = gaussian_smooth(&padded, ksize, sigma);
    let (gx, gy) = gradient(&smoothed);
    let mut g = GridF32::new(fw, fh);
    for ((o, &x), &y) in g.data.iter_mut().zip(&gx.data).zip(&gy.data) {
        *o = 1.0 / (1.0 + x * x + y * y);
    }
    g
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_depress_the_enforcer() {
        // Vertical step in the middle of a flat region.
        let mut image = GridF32::filled(40, 40, 0.9);
        for y in 0..40 {
            for x in 0..20 {
                image.set(x, y, 0.1);
            }
        }
        let g = edge_enforcer(&image, 10, 15, 1.5);
        assert_eq!((g.w, g.h), (60, 60));
        let at_edge = g.get(30, 30);
        let far_away = g.get(15, 30);
        assert!(at_edge < far_away, "edge {at_edge} vs flat {far_away}");
        for &v in &g.data {
            assert!(v > 0.0 && v <= 1.0);
        }
    }
}
