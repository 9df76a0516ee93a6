//! Overlap interpolation: extends each cell's initial claim into the
//! territory of its neighbors along their shared edge.
//!
//! Touching cells produced by association partition the clump with no
//! overlap, but real cytoplasms do overlap near shared borders. For every
//! neighboring pair the shared edge is recovered by intersecting thin
//! boundary rings; its extremal visible points span a filled ellipse (minor
//! axis half the major) whose intersection with the neighbor's territory is
//! unioned into the cell. The deliberate over-claim gives the level-set
//! stage room to shrink boundaries to their true position.

use crate::clump::Clump;
use crate::geometry::{fill_ellipse, line_of_sight, stroke_contour};
use crate::grid::Mask;

/// Step 6 of association. `ring_thickness` controls how wide the boundary
/// rings used for shared-edge detection are.
pub fn interpolate_overlap(clump: &mut Clump, ring_thickness: u32) {
    let (w, h) = (clump.bounds.w, clump.bounds.h);
    let n = clump.cells.len();
    let outline = clump.offset_outline.clone();

    let initial_masks: Vec<Mask> = clump.cells.iter().map(|c| c.cyto_mask(w, h)).collect();
    let rings: Vec<Mask> = clump
        .cells
        .iter()
        .map(|c| stroke_contour(&c.cyto_boundary, w, h, ring_thickness))
        .collect();

    for a in 0..n {
        let mut extended = initial_masks[a].clone();
        let mut grew = false;
        for &b in &clump.cells[a].neighbors {
            let shared = rings[a].and(&rings[b]);
            if shared.is_empty() {
                continue;
            }

            // Shared-edge pixels ordered by row, then column.
            let mut edge: Vec<[i32; 2]> = Vec::new();
            for y in 0..h {
                for x in 0..w {
                    if shared.get(x, y) {
                        edge.push([x as i32, y as i32]);
                    }
                }
            }

            // Scan inward from both ends for points that can see the
            // neighbor's nucleus.
            let target = clump.cells[b].nucleus_center;
            let visible = |p: &[i32; 2]| {
                line_of_sight(
                    &outline,
                    nalgebra::Point2::new(p[0] as f32, p[1] as f32),
                    target,
                )
            };
            let start = edge.iter().find(|p| visible(p));
            let end = edge.iter().rev().find(|p| visible(p));
            let (Some(&start), Some(&end)) = (start, end) else {
                continue;
            };

            // Extrapolated overlap: the spanning ellipse restricted to the
            // neighbor's own territory.
            let lens = fill_ellipse(start, end, w, h).and(&initial_masks[b]);
            if !lens.is_empty() {
                extended.or_assign(&lens);
                grew = true;
            }
        }
        if grew {
            clump.cells[a].rebuild_boundary(&extended);
        }
    }
}
