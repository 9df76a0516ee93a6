//! Pixel-to-cell association: builds each cell's initial cytoplasm boundary
//! from the clump outline and the nucleus positions.
//!
//! The stage runs in six steps:
//!
//! 1. Single-cell fast path: the clump outline is the boundary.
//! 2. Seeded association: each cell cheaply claims the disc of radius half
//!    the distance to its nearest peer, restricted to clump pixels with a
//!    clear line of sight to the nucleus.
//! 3. Full association: every remaining interior pixel is tested against
//!    candidate nuclei in ascending centroid distance and assigned to the
//!    first one it can see; the configured policy decides what happens when
//!    no candidate is visible.
//! 4. Boundary extraction: each cell's claimed pixels are rasterized and the
//!    largest connected contour becomes its boundary (fragments are noise).
//! 5. Neighbor discovery: walking each boundary, the association entries
//!    above, left and above-left of every pixel reveal adjacent cells;
//!    the relation is kept symmetric.
//! 6. Overlap interpolation: for touching pairs, an ellipse spanning the
//!    shared edge extends each cell into its neighbor's territory, giving
//!    the evolution stage an over-claimed region it can shrink correctly.
//!
//! The association map itself is transient; only boundaries and neighbor
//! lists survive the stage.

mod map;
mod overlap;

pub use map::AssociationMap;
pub use overlap::interpolate_overlap;

use log::debug;
use nalgebra::Point2;

use crate::clump::Clump;
use crate::geometry::{contains, line_of_sight};
use crate::grid::Mask;
use crate::params::{AssociationParams, UnassignedPolicy};

/// Counters reported by the association stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AssociationStats {
    /// Pixels assigned to some cell.
    pub assigned: usize,
    /// Pixels of the bounding rectangle outside the clump polygon.
    pub outside: usize,
    /// Pixels assigned by the nearest-centroid fallback.
    pub fallback: usize,
    /// Pixels left without an owner.
    pub unassigned: usize,
}

/// Run the full association stage, populating every cell's initial cytoplasm
/// boundary and neighbor list.
pub fn associate_cells(clump: &mut Clump, params: &AssociationParams) -> AssociationStats {
    let (map, stats) = build_association_map(clump, params);

    if clump.cells.len() > 1 {
        extract_boundaries(clump, &map);
        discover_neighbors(clump, &map);
        interpolate_overlap(clump, params.ring_thickness);
    }

    debug!(
        "association: {} cells, {} assigned, {} outside, {} fallback, {} unassigned",
        clump.cells.len(),
        stats.assigned,
        stats.outside,
        stats.fallback,
        stats.unassigned
    );
    stats
}

/// Steps 1-3: build the pixel-ownership map. Exposed separately so callers
/// and tests can inspect per-pixel ownership before it is discarded.
pub fn build_association_map(
    clump: &mut Clump,
    params: &AssociationParams,
) -> (AssociationMap, AssociationStats) {
    let (w, h) = (clump.bounds.w, clump.bounds.h);
    let mut map = AssociationMap::new(w, h);
    let mut stats = AssociationStats::default();
    let outline = clump.offset_outline.clone();

    // A clump without detected nuclei has nothing to associate.
    if clump.cells.is_empty() {
        return (map, stats);
    }

    // Single-cell fast path: the clump outline is the boundary and every
    // interior pixel belongs to the one cell.
    if clump.cells.len() == 1 {
        for y in 0..h {
            for x in 0..w {
                if contains(&outline, x as f32, y as f32) {
                    map.set(x, y, 0);
                    stats.assigned += 1;
                } else {
                    stats.outside += 1;
                }
            }
        }
        clump.cells[0].cyto_boundary = outline;
        return (map, stats);
    }

    let centers: Vec<Point2<f32>> = clump.cells.iter().map(|c| c.nucleus_center).collect();

    // Seeded association: claim the safe disc around each nucleus first.
    for (idx, center) in centers.iter().enumerate() {
        let radius = centers
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != idx)
            .map(|(_, other)| (other - center).norm())
            .fold(f32::INFINITY, f32::min)
            * 0.5;
        if !radius.is_finite() {
            continue;
        }
        let x0 = ((center.x - radius).floor().max(0.0)) as usize;
        let y0 = ((center.y - radius).floor().max(0.0)) as usize;
        let x1 = ((center.x + radius).ceil() as usize).min(w.saturating_sub(1));
        let y1 = ((center.y + radius).ceil() as usize).min(h.saturating_sub(1));
        for y in y0..=y1.min(h.saturating_sub(1)) {
            for x in x0..=x1 {
                if map.get(x, y).is_some() {
                    continue;
                }
                let p = Point2::new(x as f32, y as f32);
                if (p - center).norm() > radius {
                    continue;
                }
                if contains(&outline, p.x, p.y) && line_of_sight(&outline, p, *center) {
                    map.set(x, y, idx);
                    stats.assigned += 1;
                }
            }
        }
    }

    // Full association: every remaining interior pixel picks the nearest
    // visible nucleus.
    let mut by_distance: Vec<(usize, f32)> = Vec::with_capacity(centers.len());
    for y in 0..h {
        for x in 0..w {
            if map.get(x, y).is_some() {
                continue;
            }
            let p = Point2::new(x as f32, y as f32);
            if !contains(&outline, p.x, p.y) {
                stats.outside += 1;
                continue;
            }
            by_distance.clear();
            for (idx, center) in centers.iter().enumerate() {
                by_distance.push((idx, (p - center).norm()));
            }
            by_distance.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap());

            let visible = by_distance
                .iter()
                .find(|&&(idx, _)| line_of_sight(&outline, p, centers[idx]))
                .map(|&(idx, _)| idx);
            match visible {
                Some(idx) => {
                    map.set(x, y, idx);
                    stats.assigned += 1;
                }
                None => match params.unassigned_policy {
                    UnassignedPolicy::NearestCentroid => {
                        map.set(x, y, by_distance[0].0);
                        stats.assigned += 1;
                        stats.fallback += 1;
                    }
                    UnassignedPolicy::LeaveUnassigned => {
                        stats.unassigned += 1;
                    }
                },
            }
        }
    }

    (map, stats)
}

/// Step 4: rasterize each cell's claimed pixels and keep the largest
/// connected contour as its initial boundary.
pub fn extract_boundaries(clump: &mut Clump, map: &AssociationMap) {
    let (w, h) = (map.w, map.h);
    for (idx, cell) in clump.cells.iter_mut().enumerate() {
        let mut mask = Mask::new(w, h);
        for y in 0..h {
            for x in 0..w {
                if map.get(x, y) == Some(idx) {
                    mask.set(x, y);
                }
            }
        }
        cell.rebuild_boundary(&mask);
    }
}

/// Step 5: walk each boundary and collect the owners found immediately
/// above, to the left and diagonally above-left of every boundary pixel.
/// The discovered relation is symmetric and deduplicated.
pub fn discover_neighbors(clump: &mut Clump, map: &AssociationMap) {
    const PROBES: [(i32, i32); 3] = [(-1, 0), (0, -1), (-1, -1)];

    let mut pairs: Vec<(usize, usize)> = Vec::new();
    for (idx, cell) in clump.cells.iter().enumerate() {
        for p in &cell.cyto_boundary {
            for &(dx, dy) in &PROBES {
                let (nx, ny) = (p[0] + dx, p[1] + dy);
                if nx < 0 || ny < 0 || nx as usize >= map.w || ny as usize >= map.h {
                    continue;
                }
                if let Some(other) = map.get(nx as usize, ny as usize) {
                    if other != idx {
                        pairs.push((idx.min(other), idx.max(other)));
                    }
                }
            }
        }
    }
    pairs.sort_unstable();
    pairs.dedup();
    for (a, b) in pairs {
        if !clump.cells[a].neighbors.contains(&b) {
            clump.cells[a].neighbors.push(b);
        }
        if !clump.cells[b].neighbors.contains(&a) {
            clump.cells[b].neighbors.push(a);
        }
    }
}
