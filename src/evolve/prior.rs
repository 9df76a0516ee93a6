//! Shape and clump priors biasing the evolution toward plausible cell
//! layouts.
//!
//! Each cell contributes a field that is strongest at its geometric centroid
//! and decays sigmoidally toward its maximum boundary radius; the clump-wide
//! prior is the pointwise maximum of the per-cell fields. Outside the clump
//! polygon the prior saturates high, forming a wall that keeps fronts from
//! drifting out of the clump. The field is computed once per clump before
//! evolution begins and held fixed.

use nalgebra::Point2;

use crate::clump::{Cell, Clump};
use crate::geometry::{contains, mask_centroid};
use crate::grid::GridF32;

/// Prior value outside the clump polygon (and in the padded border).
const OUTSIDE_WALL: f32 = 1.0;

/// Steepness of the radial sigmoid decay.
const DECAY: f32 = 5.0;

/// Clump-wide prior over the padded frame. Requires every cell's `phi` to be
/// initialized.
pub fn clump_prior(clump: &Clump, border: usize) -> GridF32 {
    let (fw, fh) = clump.frame_size(border);
    let mut prior = GridF32::new(fw, fh);

    // Interior starts at zero, everything beyond the outline is the wall.
    let b = border as f32;
    for y in 0..fh {
        for x in 0..fw {
            if !contains(&clump.offset_outline, x as f32 - b, y as f32 - b) {
                prior.set(x, y, OUTSIDE_WALL);
            }
        }
    }

    for cell in &clump.cells {
        accumulate_shape_prior(&mut prior, cell, &clump.offset_outline, border);
    }
    prior
}

/// Max the cell's shape prior into the clump-wide field over its window.
fn accumulate_shape_prior(prior: &mut GridF32, cell: &Cell, outline: &[[i32; 2]], border: usize) {
    let contour = cell.phi_contour(border);
    if contour.is_empty() {
        return;
    }
    let Some(center) = mask_centroid(&cell.phi_mask()) else {
        return;
    };
    // Centroid in clump-local coordinates, like the contour.
    let center = Point2::new(
        center.x + (cell.window.x - border as i32) as f32,
        center.y + (cell.window.y - border as i32) as f32,
    );
    let max_radius = contour
        .iter()
        .map(|p| (Point2::new(p[0] as f32, p[1] as f32) - center).norm())
        .fold(0.0f32, f32::max)
        .max(1.0);

    let b = border as i32;
    for wy in 0..cell.window.h {
        for wx in 0..cell.window.w {
            let fx = cell.window.x + wx as i32;
            let fy = cell.window.y + wy as i32;
            if fx < 0 || fy < 0 || fx as usize >= prior.w || fy as usize >= prior.h {
                continue;
            }
            let (lx, ly) = ((fx - b) as f32, (fy - b) as f32);
            if !contains(&contour, lx, ly) || !contains(outline, lx, ly) {
                continue;
            }
            let d = (Point2::new(lx, ly) - center).norm() / max_radius;
            let value = 2.0 - 2.0 / (1.0 + (-DECAY * d).exp());
            let idx = prior.idx(fx as usize, fy as usize);
            if value > prior.data[idx] {
                prior.data[idx] = value;
            }
        }
    }
}
