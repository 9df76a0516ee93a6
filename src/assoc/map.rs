//! Per-clump ownership grid mapping each pixel to its claiming cell.

/// Dense pixel-to-cell lookup over the clump's bounding rectangle. Entries
/// are cell indices; unclaimed pixels read as `None`. The map lives only for
/// the duration of the association stage.
#[derive(Clone, Debug)]
pub struct AssociationMap {
    pub w: usize,
    pub h: usize,
    owner: Vec<Option<u32>>,
}

impl AssociationMap {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            owner: vec![None; w * h],
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<usize> {
        self.owner[y * self.w + x].map(|v| v as usize)
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, cell: usize) {
        self.owner[y * self.w + x] = Some(cell as u32);
    }

    /// Number of claimed pixels.
    pub fn claimed(&self) -> usize {
        self.owner.iter().filter(|o| o.is_some()).count()
    }
}
