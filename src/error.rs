use thiserror::Error;

/// Failures surfaced by the segmentation pipeline.
///
/// Geometric degeneracies (a cell capturing zero pixels, a mask collapsing
/// mid-evolution) are recovered locally and never reach this type; only
/// malformed input and persistence failures do.
#[derive(Debug, Error)]
pub enum SegmentError {
    /// The clump carries no usable outline polygon; its task is abandoned
    /// while the rest of the batch proceeds.
    #[error("clump has no outline polygon")]
    EmptyOutline,

    #[error("checkpoint store i/o: {0}")]
    CheckpointIo(#[from] std::io::Error),

    #[error("checkpoint store format: {0}")]
    CheckpointFormat(#[from] serde_json::Error),

    #[error("worker pool construction failed: {0}")]
    ThreadPool(String),
}
