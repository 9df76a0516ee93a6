mod common;

use common::synthetic_clump::{lone_cell_clump, two_cell_clump};

use cell_segmenter::geometry::{contains, contour_area, fill_contour, line_of_sight};
use cell_segmenter::stages::{
    associate_cells, build_association_map, discover_neighbors, extract_boundaries,
};
use cell_segmenter::{AssociationParams, UnassignedPolicy};
use nalgebra::Point2;

#[test]
fn single_cell_clump_assigns_every_interior_pixel() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut clump = lone_cell_clump();
    let stats = associate_cells(&mut clump, &AssociationParams::default());

    let mut interior = 0;
    for y in 0..41 {
        for x in 0..41 {
            if contains(&clump.offset_outline, x as f32, y as f32) {
                interior += 1;
            }
        }
    }
    assert_eq!(stats.assigned, interior);
    assert_eq!(stats.unassigned, 0);
    assert_eq!(
        clump.cells[0].cyto_boundary, clump.offset_outline,
        "single-cell boundary is the clump outline"
    );
}

#[test]
fn assigned_pixels_always_see_their_nucleus() {
    // LeaveUnassigned isolates the visibility rule: every pixel that did get
    // an owner must have a clear segment to that owner's nucleus centroid.
    let mut clump = two_cell_clump();
    let params = AssociationParams {
        unassigned_policy: UnassignedPolicy::LeaveUnassigned,
        ..AssociationParams::default()
    };
    let (map, stats) = build_association_map(&mut clump, &params);

    assert!(stats.assigned > 0);
    for y in 0..101 {
        for x in 0..101 {
            if let Some(owner) = map.get(x, y) {
                let p = Point2::new(x as f32, y as f32);
                let center = clump.cells[owner].nucleus_center;
                assert!(
                    line_of_sight(&clump.offset_outline, p, center),
                    "pixel ({x}, {y}) cannot see nucleus {owner}"
                );
            }
        }
    }
}

#[test]
fn two_cells_partition_the_square_before_interpolation() {
    let mut clump = two_cell_clump();
    let params = AssociationParams::default();
    let (map, stats) = build_association_map(&mut clump, &params);
    extract_boundaries(&mut clump, &map);

    // The square is convex, so no pixel needed the fallback and none were
    // left over.
    assert_eq!(stats.fallback, 0);
    assert_eq!(stats.unassigned, 0);

    let dim = 101;
    let mask_a = fill_contour(&clump.cells[0].cyto_boundary, dim, dim);
    let mask_b = fill_contour(&clump.cells[1].cyto_boundary, dim, dim);
    assert!(
        mask_a.and(&mask_b).is_empty(),
        "initial boundaries must not overlap"
    );
    let covered = mask_a.count() + mask_b.count();
    assert!(
        covered as f64 >= 0.95 * stats.assigned as f64,
        "boundaries cover the assigned interior ({covered} of {})",
        stats.assigned
    );
}

#[test]
fn neighbor_relation_is_symmetric() {
    let mut clump = two_cell_clump();
    let params = AssociationParams::default();
    let (map, _) = build_association_map(&mut clump, &params);
    extract_boundaries(&mut clump, &map);
    discover_neighbors(&mut clump, &map);

    assert_eq!(clump.cells[0].neighbors, vec![1]);
    assert_eq!(clump.cells[1].neighbors, vec![0]);
}

#[test]
fn full_association_grows_an_overlap_lens() {
    let mut clump = two_cell_clump();
    let areas_before: Vec<f64> = {
        let mut probe = two_cell_clump();
        let params = AssociationParams::default();
        let (map, _) = build_association_map(&mut probe, &params);
        extract_boundaries(&mut probe, &map);
        probe
            .cells
            .iter()
            .map(|c| contour_area(&c.cyto_boundary))
            .collect()
    };

    associate_cells(&mut clump, &AssociationParams::default());

    let dim = 101;
    let mask_a = fill_contour(&clump.cells[0].cyto_boundary, dim, dim);
    let mask_b = fill_contour(&clump.cells[1].cyto_boundary, dim, dim);
    assert!(
        !mask_a.and(&mask_b).is_empty(),
        "interpolation must create a nonzero overlap lens"
    );
    for (cell, &before) in clump.cells.iter().zip(&areas_before) {
        assert!(
            contour_area(&cell.cyto_boundary) >= before,
            "interpolation never shrinks a cell"
        );
    }
}
