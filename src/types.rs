use serde::Serialize;

/// Ordered integer pixel contour; the last point implicitly connects to the
/// first.
pub type Contour = Vec<[i32; 2]>;

/// Axis-aligned integer rectangle. `x`/`y` are the top-left corner, `w`/`h`
/// the extent in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: usize,
    pub h: usize,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: usize, h: usize) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.w as i32
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.h as i32
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && y >= self.y && x < self.right() && y < self.bottom()
    }

    /// Smallest rectangle covering both operands.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let r = self.right().max(other.right());
        let b = self.bottom().max(other.bottom());
        Rect::new(x, y, (r - x) as usize, (b - y) as usize)
    }

    /// Grow by `border` on all four sides.
    pub fn padded(&self, border: i32) -> Rect {
        Rect::new(
            self.x - border,
            self.y - border,
            self.w + 2 * border.max(0) as usize,
            self.h + 2 * border.max(0) as usize,
        )
    }

    /// Intersection with another rectangle; collapses to zero size on no
    /// overlap.
    pub fn intersect(&self, other: &Rect) -> Rect {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right()).max(x0);
        let y1 = self.bottom().min(other.bottom()).max(y0);
        Rect::new(x0, y0, (x1 - x0) as usize, (y1 - y0) as usize)
    }

    /// Clip to `[0, w) x [0, h)`. Degenerate rectangles collapse to zero size.
    pub fn clipped(&self, w: usize, h: usize) -> Rect {
        let x0 = self.x.max(0);
        let y0 = self.y.max(0);
        let x1 = self.right().min(w as i32).max(x0);
        let y1 = self.bottom().min(h as i32).max(y0);
        Rect::new(x0, y0, (x1 - x0) as usize, (y1 - y0) as usize)
    }
}

/// One resolved cell: the evolved cytoplasm boundary paired with the nucleus
/// it grew from. Contours are reported both in clump-local and full-image
/// coordinates for downstream consumers.
#[derive(Clone, Debug, Serialize)]
pub struct SegmentedCell {
    /// Source nucleus polygon, image coordinates.
    pub nucleus: Contour,
    /// Final cytoplasm boundary, clump-local coordinates.
    pub boundary: Contour,
    /// Final cytoplasm boundary, image coordinates.
    pub boundary_image: Contour,
    /// Nucleus area over cytoplasm area; `None` when the cytoplasm mask
    /// degenerated to (near) zero area and the ratio is not computable.
    pub nucleus_cyto_ratio: Option<f64>,
    /// True when the cell hit the iteration cap instead of stabilizing.
    pub forced: bool,
}

/// Per-clump output of the pipeline.
#[derive(Clone, Debug, Serialize)]
pub struct ClumpResult {
    pub clump_idx: usize,
    pub cells: Vec<SegmentedCell>,
    /// Evolution iterations spent on this clump; zero when the clump was
    /// restored from a checkpoint or held a single cell.
    pub iterations: usize,
    /// True when the final boundaries came from the checkpoint store.
    pub loaded_from_checkpoint: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_union_and_clip() {
        let a = Rect::new(2, 3, 4, 4);
        let b = Rect::new(5, 1, 3, 3);
        let u = a.union(&b);
        assert_eq!(u, Rect::new(2, 1, 6, 6));
        assert_eq!(u.padded(2).clipped(7, 9), Rect::new(0, 0, 7, 9));
    }

    #[test]
    fn rect_contains_is_half_open() {
        let r = Rect::new(1, 1, 2, 2);
        assert!(r.contains(1, 1));
        assert!(r.contains(2, 2));
        assert!(!r.contains(3, 2));
        assert!(!r.contains(0, 1));
    }
}
