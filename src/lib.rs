#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod clump;
pub mod error;
pub mod params;
pub mod scheduler;
pub mod types;

// “Expert” modules – still public, but considered unstable internals.
pub mod assoc;
pub mod evolve;
pub mod geometry;
pub mod grid;

// --- High-level re-exports -------------------------------------------------

pub use crate::clump::{Cell, Clump};
pub use crate::error::SegmentError;
pub use crate::params::{
    AssociationParams, EvolveParams, SchedulerParams, SegmentationParams, UnassignedPolicy,
};
pub use crate::scheduler::{
    run_batch, BatchReport, CheckpointStore, ClumpRecord, JsonCheckpointStore,
    MemoryCheckpointStore,
};
pub use crate::types::{ClumpResult, Contour, Rect, SegmentedCell};

/// Small prelude for quick experiments.
pub mod prelude {
    pub use crate::params::SegmentationParams;
    pub use crate::scheduler::{run_batch, JsonCheckpointStore, MemoryCheckpointStore};
    pub use crate::{Clump, ClumpResult, SegmentedCell};
}

// --- Stage-level API (for tools & advanced users) --------------------------

pub mod stages {
    // Association steps, runnable individually.
    pub use crate::assoc::{
        associate_cells, build_association_map, discover_neighbors, extract_boundaries,
        interpolate_overlap, AssociationMap, AssociationStats,
    };

    // Evolution building blocks.
    pub use crate::evolve::{
        binary_term, clump_prior, curvature_components, edge_enforcer, evolve_clump,
        geodesic_term, signed_distance_reg,
    };
}
