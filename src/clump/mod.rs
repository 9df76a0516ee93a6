//! Core data model: a [`Clump`] owns the cells detected inside one connected
//! foreground region, and each [`Cell`] carries its nucleus, its evolving
//! cytoplasm boundary and its implicit level-set function.
//!
//! Coordinate frames used throughout:
//! - *image*: the full source image.
//! - *clump-local*: relative to the clump's bounding rectangle.
//! - *frame*: clump-local shifted by the evolution border, covering the
//!   padded grids (`edge_enforcer`, `clump_prior`, cell windows).
//!
//! Neighbors are stored as indices into the owning clump's cell list, not as
//! references, so removing a degenerate cell only requires remapping indices.

mod cell;

pub use cell::Cell;

use crate::error::SegmentError;
use crate::geometry::{bounding_rect, offset_contour};
use crate::grid::GridF32;
use crate::types::{Contour, Rect};

/// One connected foreground region and the cells competing inside it.
#[derive(Clone, Debug)]
pub struct Clump {
    /// Closed outline polygon, image coordinates.
    pub outline: Contour,
    /// Outline relative to the bounding rectangle.
    pub offset_outline: Contour,
    /// Axis-aligned bounding rectangle in image coordinates.
    pub bounds: Rect,
    /// Grayscale source region sized `bounds.w x bounds.h`, values in [0, 1].
    pub image: GridF32,
    /// Cells owned by this clump, addressed by index.
    pub cells: Vec<Cell>,
    /// Edge-enforcer field over the padded frame; built before evolution.
    pub edge_enforcer: Option<GridF32>,
    /// Clump-prior field over the padded frame; built before evolution.
    pub clump_prior: Option<GridF32>,
    /// Initial boundaries and neighbors restored from a checkpoint.
    pub association_loaded: bool,
    /// Final contours restored from a checkpoint; evolution is skipped.
    pub loaded: bool,
}

impl Clump {
    /// Build a clump from its outline, the detected nucleus polygons (both in
    /// image coordinates) and the grayscale region under its bounding
    /// rectangle. Nuclei with empty polygons are excluded.
    pub fn from_nuclei(
        outline: Contour,
        nuclei: Vec<Contour>,
        image: GridF32,
    ) -> Result<Self, SegmentError> {
        if outline.len() < 3 {
            return Err(SegmentError::EmptyOutline);
        }
        let bounds = bounding_rect(&outline);
        let offset_outline = offset_contour(&outline, -bounds.x, -bounds.y);
        let cells = nuclei
            .into_iter()
            .filter(|n| !n.is_empty())
            .map(|n| Cell::new(offset_contour(&n, -bounds.x, -bounds.y)))
            .collect();
        Ok(Self {
            outline,
            offset_outline,
            bounds,
            image,
            cells,
            edge_enforcer: None,
            clump_prior: None,
            association_loaded: false,
            loaded: false,
        })
    }

    /// Translate a clump-local contour back into image coordinates.
    pub fn undo_offset(&self, contour: &Contour) -> Contour {
        offset_contour(contour, self.bounds.x, self.bounds.y)
    }

    /// Remove the cell at `idx`, dropping it from every neighbor list and
    /// remapping the indices that shifted down.
    pub fn remove_cell(&mut self, idx: usize) {
        self.cells.remove(idx);
        for cell in &mut self.cells {
            cell.neighbors.retain(|&n| n != idx);
            for n in &mut cell.neighbors {
                if *n > idx {
                    *n -= 1;
                }
            }
        }
    }

    /// Padded frame dimensions for the given evolution border.
    pub fn frame_size(&self, border: usize) -> (usize, usize) {
        (self.bounds.w + 2 * border, self.bounds.h + 2 * border)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: i32, y0: i32, side: i32) -> Contour {
        vec![
            [x0, y0],
            [x0 + side, y0],
            [x0 + side, y0 + side],
            [x0, y0 + side],
        ]
    }

    fn clump_with_cells(n: usize) -> Clump {
        let nuclei = (0..n as i32).map(|i| square(5 + 10 * i, 5, 3)).collect();
        Clump::from_nuclei(square(2, 2, 50), nuclei, GridF32::new(51, 51)).unwrap()
    }

    #[test]
    fn outline_offset_round_trips() {
        let clump = clump_with_cells(1);
        assert_eq!(clump.bounds, Rect::new(2, 2, 51, 51));
        assert_eq!(clump.offset_outline[0], [0, 0]);
        let back = clump.undo_offset(&clump.offset_outline);
        assert_eq!(back, clump.outline);
    }

    #[test]
    fn empty_outline_is_rejected() {
        let err = Clump::from_nuclei(vec![[0, 0]], Vec::new(), GridF32::new(1, 1));
        assert!(matches!(err, Err(SegmentError::EmptyOutline)));
    }

    #[test]
    fn empty_nuclei_are_excluded() {
        let outline = square(0, 0, 40);
        let nuclei = vec![square(5, 5, 3), Vec::new(), square(20, 20, 3)];
        let clump = Clump::from_nuclei(outline, nuclei, GridF32::new(41, 41)).unwrap();
        assert_eq!(clump.cells.len(), 2);
    }

    #[test]
    fn remove_cell_remaps_neighbor_indices() {
        let mut clump = clump_with_cells(3);
        clump.cells[0].neighbors = vec![1, 2];
        clump.cells[1].neighbors = vec![0, 2];
        clump.cells[2].neighbors = vec![0, 1];
        clump.remove_cell(1);
        assert_eq!(clump.cells.len(), 2);
        assert_eq!(clump.cells[0].neighbors, vec![1]);
        assert_eq!(clump.cells[1].neighbors, vec![0]);
    }
}
