//! Bounded-concurrency batch runner: association then evolution per clump,
//! with checkpoint-based skip and resume.
//!
//! Clumps are fully independent units of work, so each task owns its clump's
//! grids end to end and the checkpoint store is the only shared resource.
//! Tasks run on a pool bounded to `max_threads`; a completion channel feeds
//! the scheduling thread, which persists each finished clump's records in
//! turn — the single-writer retire step — and flushes on the configured
//! cadence (or immediately for unusually large clumps, bounding data loss).

mod checkpoint;

pub use checkpoint::{CheckpointStore, ClumpRecord, JsonCheckpointStore, MemoryCheckpointStore};

use std::sync::mpsc;

use log::{debug, error, info};

use crate::assoc::associate_cells;
use crate::clump::Clump;
use crate::error::SegmentError;
use crate::evolve::evolve_clump;
use crate::geometry::contour_area;
use crate::params::SegmentationParams;
use crate::types::{ClumpResult, SegmentedCell};

/// Cytoplasm areas below this are treated as degenerate when deriving the
/// nucleus/cytoplasm ratio.
const MIN_CYTO_AREA: f64 = 1e-6;

/// Outcome of a whole batch: per-clump results (ordered by clump index) and
/// the clumps whose tasks failed on malformed input.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub results: Vec<ClumpResult>,
    pub failures: Vec<(usize, SegmentError)>,
}

struct TaskOutput {
    result: ClumpResult,
    association: ClumpRecord,
    boundaries: ClumpRecord,
    cell_count: usize,
}

/// Run association and evolution for every clump, bounded to
/// `params.scheduler.max_threads` concurrent tasks, resuming from the given
/// stores and persisting updated records through them.
pub fn run_batch(
    clumps: &mut [Clump],
    params: &SegmentationParams,
    assoc_store: &mut dyn CheckpointStore,
    final_store: &mut dyn CheckpointStore,
) -> Result<BatchReport, SegmentError> {
    restore_from_checkpoints(clumps, assoc_store, final_store);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(params.scheduler.max_threads.max(1))
        .build()
        .map_err(|e| SegmentError::ThreadPool(e.to_string()))?;

    let mut report = BatchReport::default();
    let (tx, rx) = mpsc::channel::<(usize, Result<TaskOutput, SegmentError>)>();
    let total = clumps.len();
    info!(
        "batch: {total} clumps, {} workers",
        params.scheduler.max_threads.max(1)
    );

    pool.in_place_scope(|scope| {
        for (idx, clump) in clumps.iter_mut().enumerate() {
            let tx = tx.clone();
            scope.spawn(move |_| {
                let outcome = process_clump(clump, idx, params);
                // The receiver outlives every task; send cannot fail.
                let _ = tx.send((idx, outcome));
            });
        }
        drop(tx);

        let mut completed = 0usize;
        for (idx, outcome) in rx.iter() {
            completed += 1;
            match outcome {
                Ok(output) => {
                    let loaded = output.result.loaded_from_checkpoint;
                    if !loaded {
                        assoc_store.put(idx, output.association);
                        final_store.put(idx, output.boundaries);
                        let large = output.cell_count > params.scheduler.large_clump_cells;
                        if large || completed % params.scheduler.flush_interval.max(1) == 0 {
                            flush_both(assoc_store, final_store);
                        }
                    }
                    debug!(
                        "clump {idx} done ({completed}/{total}, {} cells, {} iterations)",
                        output.result.cells.len(),
                        output.result.iterations
                    );
                    report.results.push(output.result);
                }
                Err(err) => {
                    error!("clump {idx} failed: {err}");
                    report.failures.push((idx, err));
                }
            }
        }
    });

    assoc_store.flush()?;
    final_store.flush()?;
    report.results.sort_by_key(|r| r.clump_idx);
    Ok(report)
}

fn flush_both(assoc_store: &mut dyn CheckpointStore, final_store: &mut dyn CheckpointStore) {
    if let Err(err) = assoc_store.flush() {
        error!("association checkpoint flush failed: {err}");
    }
    if let Err(err) = final_store.flush() {
        error!("boundary checkpoint flush failed: {err}");
    }
}

/// Restore completed stages from the stores. A clump counts as fully loaded
/// only when its final record has a non-null contour for every cell;
/// otherwise an intact association record still lets it skip straight to
/// evolution.
fn restore_from_checkpoints(
    clumps: &mut [Clump],
    assoc_store: &dyn CheckpointStore,
    final_store: &dyn CheckpointStore,
) {
    for (idx, clump) in clumps.iter_mut().enumerate() {
        let cell_count = clump.cells.len();
        if let Some(record) = final_store.get(idx) {
            if record.is_complete(cell_count) {
                for (cell, contour) in clump.cells.iter_mut().zip(record.cells) {
                    let contour = contour.expect("complete record");
                    cell.phi_area = contour_area(&contour);
                    cell.final_contour = contour;
                    cell.converged = true;
                }
                clump.loaded = true;
                debug!("clump {idx}: final boundaries loaded from checkpoint");
                continue;
            }
        }
        if let Some(record) = assoc_store.get(idx) {
            if record.is_complete(cell_count) && record.neighbors.len() == cell_count {
                for (cell, contour) in clump.cells.iter_mut().zip(record.cells) {
                    cell.cyto_boundary = contour.expect("complete record");
                }
                for (cell, neighbors) in clump.cells.iter_mut().zip(record.neighbors) {
                    cell.neighbors = neighbors;
                }
                clump.association_loaded = true;
                debug!("clump {idx}: initial boundaries loaded from checkpoint");
            }
        }
    }
}

/// One clump end to end: association (unless restored), degenerate-cell
/// culling, evolution (unless restored), result assembly.
fn process_clump(
    clump: &mut Clump,
    idx: usize,
    params: &SegmentationParams,
) -> Result<TaskOutput, SegmentError> {
    if clump.outline.len() < 3 {
        return Err(SegmentError::EmptyOutline);
    }

    let mut iterations = 0;
    if !clump.loaded {
        if !clump.association_loaded {
            associate_cells(clump, &params.association);

            // Cells that captured no pixels are dropped, and their former
            // neighbors must forget them.
            let mut i = 0;
            while i < clump.cells.len() {
                if clump.cells[i].cyto_boundary.is_empty() {
                    debug!("clump {idx}: dropping cell {i} with empty boundary");
                    clump.remove_cell(i);
                } else {
                    i += 1;
                }
            }
        }
        iterations = evolve_clump(clump, idx, &params.evolve);
    }

    let cells: Vec<SegmentedCell> = clump
        .cells
        .iter()
        .map(|cell| {
            let ratio = if cell.phi_area > MIN_CYTO_AREA {
                Some(cell.nucleus_area / cell.phi_area)
            } else {
                None
            };
            SegmentedCell {
                nucleus: clump.undo_offset(&cell.nucleus_boundary),
                boundary: cell.final_contour.clone(),
                boundary_image: clump.undo_offset(&cell.final_contour),
                nucleus_cyto_ratio: ratio,
                forced: cell.forced,
            }
        })
        .collect();

    let association = ClumpRecord {
        cells: clump
            .cells
            .iter()
            .map(|c| Some(c.cyto_boundary.clone()))
            .collect(),
        neighbors: clump.cells.iter().map(|c| c.neighbors.clone()).collect(),
    };
    let boundaries = ClumpRecord {
        cells: clump
            .cells
            .iter()
            .map(|c| Some(c.final_contour.clone()))
            .collect(),
        neighbors: Vec::new(),
    };

    Ok(TaskOutput {
        result: ClumpResult {
            clump_idx: idx,
            cells,
            iterations,
            loaded_from_checkpoint: clump.loaded,
        },
        association,
        boundaries,
        cell_count: clump.cells.len(),
    })
}
