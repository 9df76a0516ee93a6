//! One segmented cell: nucleus, cytoplasm boundary and level-set state.

use nalgebra::Point2;

use crate::geometry::{
    contour_area, fill_contour, largest_contour, offset_contour, vertex_centroid,
};
use crate::grid::{GridF32, Mask};
use crate::types::{Contour, Rect};

/// Value assigned to `phi` outside the boundary at initialization; the
/// inside gets the negated value. Inside is always negative.
const PHI_STEP: f32 = 2.0;

#[derive(Clone, Debug)]
pub struct Cell {
    /// Nucleus polygon, clump-local coordinates.
    pub nucleus_boundary: Contour,
    /// Mean of the nucleus polygon vertices.
    pub nucleus_center: Point2<f32>,
    /// Shoelace area of the nucleus polygon.
    pub nucleus_area: f64,
    /// Cytoplasm boundary, clump-local coordinates. Holds the association
    /// output until evolution freezes `final_contour`.
    pub cyto_boundary: Contour,
    /// Indices of adjacent cells within the owning clump (symmetric).
    pub neighbors: Vec<usize>,
    /// Local evolution window in frame coordinates.
    pub window: Rect,
    /// Implicit boundary function over `window`; negative inside.
    pub phi: GridF32,
    /// Foreground area at the last convergence check.
    pub phi_area: f64,
    pub converged: bool,
    /// Convergence was forced by the iteration cap.
    pub forced: bool,
    /// Boundary frozen at convergence, clump-local coordinates.
    pub final_contour: Contour,
}

impl Cell {
    pub fn new(nucleus_boundary: Contour) -> Self {
        let nucleus_center = vertex_centroid(&nucleus_boundary);
        let nucleus_area = contour_area(&nucleus_boundary);
        Self {
            nucleus_boundary,
            nucleus_center,
            nucleus_area,
            cyto_boundary: Vec::new(),
            neighbors: Vec::new(),
            window: Rect::new(0, 0, 0, 0),
            phi: GridF32::new(0, 0),
            phi_area: 0.0,
            converged: false,
            forced: false,
            final_contour: Vec::new(),
        }
    }

    /// Rasterize the current cytoplasm boundary into a clump-sized mask.
    pub fn cyto_mask(&self, w: usize, h: usize) -> Mask {
        fill_contour(&self.cyto_boundary, w, h)
    }

    /// Replace the cytoplasm boundary with the largest contour of `mask`.
    /// Smaller fragments are dropped as noise; an empty mask leaves an empty
    /// boundary for the caller to cull.
    pub fn rebuild_boundary(&mut self, mask: &Mask) {
        self.cyto_boundary = largest_contour(mask).unwrap_or_default();
    }

    /// Build `phi` over `window` (frame coordinates) as a two-level step:
    /// `-PHI_STEP` inside the current boundary, `+PHI_STEP` outside.
    /// `border` converts clump-local boundary points into frame coordinates.
    pub fn initialize_phi(&mut self, window: Rect, border: usize) {
        let local = offset_contour(
            &self.cyto_boundary,
            border as i32 - window.x,
            border as i32 - window.y,
        );
        let mask = fill_contour(&local, window.w, window.h);
        let mut phi = GridF32::filled(window.w, window.h, PHI_STEP);
        for (p, &m) in phi.data.iter_mut().zip(&mask.data) {
            if m != 0 {
                *p = -PHI_STEP;
            }
        }
        self.window = window;
        self.phi = phi;
        self.phi_area = self.measure_phi_area();
        self.converged = false;
        self.forced = false;
    }

    /// Mask of the current foreground (`phi <= 0`), window coordinates.
    pub fn phi_mask(&self) -> Mask {
        let mut mask = Mask::new(self.phi.w, self.phi.h);
        for (m, &v) in mask.data.iter_mut().zip(&self.phi.data) {
            *m = u8::from(v <= 0.0);
        }
        mask
    }

    /// Area of the largest connected foreground contour of `phi`.
    pub fn measure_phi_area(&self) -> f64 {
        largest_contour(&self.phi_mask())
            .map(|c| contour_area(&c))
            .unwrap_or(0.0)
    }

    /// Largest foreground contour of `phi`, clump-local coordinates.
    pub fn phi_contour(&self, border: usize) -> Contour {
        let dx = self.window.x - border as i32;
        let dy = self.window.y - border as i32;
        largest_contour(&self.phi_mask())
            .map(|c| offset_contour(&c, dx, dy))
            .unwrap_or_default()
    }

    /// Materialize `phi` over an arbitrary frame rectangle. Points this cell
    /// never claimed (outside its window) read as `+PHI_STEP`.
    pub fn phi_on(&self, rect: Rect) -> GridF32 {
        let mut out = GridF32::filled(rect.w, rect.h, PHI_STEP);
        let overlap = rect.intersect(&self.window);
        for y in overlap.y..overlap.bottom() {
            for x in overlap.x..overlap.right() {
                let v = self
                    .phi
                    .get((x - self.window.x) as usize, (y - self.window.y) as usize);
                out.set((x - rect.x) as usize, (y - rect.y) as usize, v);
            }
        }
        out
    }
}
