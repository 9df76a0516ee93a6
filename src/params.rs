//! Parameter types configuring the segmentation stages.
//!
//! Groups knobs for pixel-to-cell association, the level-set evolution and
//! the batch scheduler. Defaults reproduce the reference pipeline behaviour;
//! an orchestration layer may deserialize overrides from JSON, with missing
//! fields falling back to these defaults.

use serde::Deserialize;

/// Pipeline-wide parameters, one sub-struct per stage.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct SegmentationParams {
    pub association: AssociationParams,
    pub evolve: EvolveParams,
    pub scheduler: SchedulerParams,
}

/// What to do with clump pixels whose line of sight to every nucleus leaves
/// the clump polygon (possible in strongly concave clumps).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub enum UnassignedPolicy {
    /// Assign to the nearest nucleus regardless of visibility, so the
    /// association map covers the whole clump interior.
    NearestCentroid,
    /// Leave the pixel unowned; it ends up outside every initial boundary.
    LeaveUnassigned,
}

/// Parameters for the pixel-to-cell association stage.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AssociationParams {
    /// Fallback for pixels that can see no nucleus.
    pub unassigned_policy: UnassignedPolicy,
    /// Thickness in pixels of the boundary rings intersected to find the
    /// shared edge between two neighboring cells.
    pub ring_thickness: u32,
}

impl Default for AssociationParams {
    fn default() -> Self {
        Self {
            unassigned_policy: UnassignedPolicy::NearestCentroid,
            ring_thickness: 2,
        }
    }
}

/// Parameters for the level-set evolution stage.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct EvolveParams {
    /// Time step of the explicit Euler update.
    pub dt: f32,
    /// Weight of the distance-regularization term.
    pub mu: f32,
    /// Weight of the geodesic (edge attraction) term.
    pub kappa: f32,
    /// Weight of the pairwise overlap penalty.
    pub chi: f32,
    /// Pixel spacing; bandwidth of the dirac kernel around the zero level.
    pub epsilon: f32,
    /// Convergence is probed every this many iterations.
    pub check_interval: usize,
    /// Hard iteration cap; cells still moving at the cap are force-converged
    /// with their last contour.
    pub max_iterations: usize,
    /// Foreground-area change (pixels) below which a cell counts as
    /// converged.
    pub area_delta: f64,
    /// Border in grid units added around each cell window and the clump
    /// frame, keeping fronts away from array edges.
    pub border: usize,
    /// Gaussian kernel size used by the edge enforcer.
    pub gaussian_ksize: usize,
    /// Gaussian sigma used by the edge enforcer.
    pub gaussian_sigma: f32,
}

impl Default for EvolveParams {
    fn default() -> Self {
        Self {
            dt: 5.0,
            mu: 0.04,
            kappa: 13.0,
            chi: 3.0,
            epsilon: 1.5,
            check_interval: 50,
            max_iterations: 1000,
            area_delta: 50.0,
            border: 10,
            gaussian_ksize: 15,
            gaussian_sigma: 1.5,
        }
    }
}

/// Parameters for the batch scheduler.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SchedulerParams {
    /// Maximum number of clump tasks in flight at once.
    pub max_threads: usize,
    /// Checkpoint flush cadence, in completed clumps.
    pub flush_interval: usize,
    /// Cell count above which a clump's checkpoint is flushed immediately
    /// after completion rather than waiting for the cadence.
    pub large_clump_cells: usize,
}

impl Default for SchedulerParams {
    fn default() -> Self {
        Self {
            max_threads: 16,
            flush_interval: 100,
            large_clump_cells: 3000,
        }
    }
}
