mod common;

use common::synthetic_clump::{lone_cell_clump, small_clump};

use cell_segmenter::{
    run_batch, Clump, ClumpRecord, MemoryCheckpointStore, SchedulerParams, SegmentationParams,
    SegmentError,
};

fn batch() -> Vec<Clump> {
    vec![small_clump(0, 0), small_clump(200, 100), lone_cell_clump()]
}

fn params_with_threads(max_threads: usize) -> SegmentationParams {
    SegmentationParams {
        scheduler: SchedulerParams {
            max_threads,
            ..SchedulerParams::default()
        },
        ..SegmentationParams::default()
    }
}

#[test]
fn results_are_independent_of_thread_count() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut baseline = None;
    for threads in [1, 2, 16] {
        let mut clumps = batch();
        let mut assoc = MemoryCheckpointStore::default();
        let mut fin = MemoryCheckpointStore::default();
        let report =
            run_batch(&mut clumps, &params_with_threads(threads), &mut assoc, &mut fin).unwrap();
        assert!(report.failures.is_empty());
        assert_eq!(report.results.len(), 3);

        let contours: Vec<Vec<_>> = report
            .results
            .iter()
            .map(|r| r.cells.iter().map(|c| c.boundary_image.clone()).collect())
            .collect();
        match &baseline {
            None => baseline = Some(contours),
            Some(expected) => {
                assert_eq!(
                    expected, &contours,
                    "contours changed with max_threads = {threads}"
                );
            }
        }
    }
}

#[test]
fn fully_loaded_checkpoints_skip_all_iterations() {
    let mut clumps = batch();
    let mut assoc = MemoryCheckpointStore::default();
    let mut fin = MemoryCheckpointStore::default();
    let params = params_with_threads(2);
    let first = run_batch(&mut clumps, &params, &mut assoc, &mut fin).unwrap();
    assert!(first.failures.is_empty());

    // Re-run the same batch against the populated stores.
    let mut clumps = batch();
    let second = run_batch(&mut clumps, &params, &mut assoc, &mut fin).unwrap();
    assert!(second.failures.is_empty());

    for (a, b) in first.results.iter().zip(&second.results) {
        assert_eq!(b.iterations, 0, "clump {} must skip evolution", b.clump_idx);
        assert!(b.loaded_from_checkpoint);
        for (ca, cb) in a.cells.iter().zip(&b.cells) {
            assert_eq!(ca.boundary, cb.boundary, "restored contour differs");
            assert_eq!(ca.nucleus_cyto_ratio, cb.nucleus_cyto_ratio);
        }
    }
}

#[test]
fn incomplete_record_forces_full_reprocess() {
    let mut clumps = batch();
    let mut assoc = MemoryCheckpointStore::default();
    let mut fin = MemoryCheckpointStore::default();
    let params = params_with_threads(2);
    run_batch(&mut clumps, &params, &mut assoc, &mut fin).unwrap();

    // Truncate clump 0's final record to fewer cells than the clump has.
    use cell_segmenter::CheckpointStore;
    let mut record = fin.get(0).unwrap();
    record.cells.pop();
    fin.put(0, record);

    let mut clumps = batch();
    let report = run_batch(&mut clumps, &params, &mut assoc, &mut fin).unwrap();
    let clump0 = report.results.iter().find(|r| r.clump_idx == 0).unwrap();
    assert!(
        !clump0.loaded_from_checkpoint,
        "incomplete record must not count as loaded"
    );

    // The association record was intact, so only evolution reran; the other
    // clumps stayed fully loaded.
    let clump1 = report.results.iter().find(|r| r.clump_idx == 1).unwrap();
    assert!(clump1.loaded_from_checkpoint);
}

#[test]
fn malformed_clump_fails_alone() {
    let broken = Clump {
        outline: Vec::new(),
        ..small_clump(0, 0)
    };
    let mut clumps = vec![broken, small_clump(200, 100)];
    let mut assoc = MemoryCheckpointStore::default();
    let mut fin = MemoryCheckpointStore::default();
    let report =
        run_batch(&mut clumps, &params_with_threads(2), &mut assoc, &mut fin).unwrap();

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, 0);
    assert!(matches!(report.failures[0].1, SegmentError::EmptyOutline));
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].clump_idx, 1);
    assert_eq!(report.results[0].cells.len(), 2);
}

#[test]
fn degenerate_ratio_is_reported_as_not_computable() {
    // A record with an empty contour has zero area; restoring it must yield
    // a `None` ratio instead of infinity.
    let mut clumps = vec![lone_cell_clump()];
    let mut assoc = MemoryCheckpointStore::default();
    let mut fin = MemoryCheckpointStore::default();
    use cell_segmenter::CheckpointStore;
    fin.put(
        0,
        ClumpRecord {
            cells: vec![Some(vec![[5, 5], [6, 6]])],
            neighbors: Vec::new(),
        },
    );
    let report =
        run_batch(&mut clumps, &params_with_threads(1), &mut assoc, &mut fin).unwrap();
    let cell = &report.results[0].cells[0];
    assert_eq!(cell.nucleus_cyto_ratio, None);
}
