//! Multi-cell DRLSE driver: evolves every cell's implicit boundary function
//! until each stabilizes, under a coupled energy of distance regularization,
//! edge/prior-weighted geodesic attraction and pairwise overlap exclusion.
//!
//! All fields live on the padded clump frame so fronts near the clump edge
//! never touch an array border. The edge enforcer and clump prior are built
//! once per clump and held fixed; only the `phi` grids change.

mod edge;
mod prior;
mod terms;

pub use edge::edge_enforcer;
pub use prior::clump_prior;
pub use terms::{binary_term, curvature_components, geodesic_term, signed_distance_reg};

use log::{debug, warn};

use crate::clump::Clump;
use crate::geometry::bounding_rect;
use crate::grid::{dirac, gradient, GridF32};
use crate::params::EvolveParams;
use crate::types::Rect;

/// Evolve every cell of the clump to convergence or the iteration cap.
/// Returns the number of iterations spent.
pub fn evolve_clump(clump: &mut Clump, clump_idx: usize, params: &EvolveParams) -> usize {
    // A clump with a single cell is already resolved: its boundary is the
    // clump outline and no iteration runs.
    if clump.cells.len() <= 1 {
        if let Some(cell) = clump.cells.first_mut() {
            cell.final_contour = clump.offset_outline.clone();
            cell.phi_area = crate::geometry::contour_area(&cell.final_contour);
            cell.converged = true;
        }
        return 0;
    }

    prepare(clump, params);

    let border = params.border;
    // Edge and prior cropped to each cell's window, fixed across iterations.
    let cropped: Vec<(GridF32, GridF32)> = {
        let edge = clump.edge_enforcer.as_ref().expect("edge enforcer built");
        let prior = clump.clump_prior.as_ref().expect("clump prior built");
        clump
            .cells
            .iter()
            .map(|c| (edge.crop(&c.window), prior.crop(&c.window)))
            .collect()
    };

    let mut remaining = clump.cells.iter().filter(|c| !c.converged).count();
    let mut iteration = 0usize;
    while remaining > 0 {
        iteration += 1;
        for i in 0..clump.cells.len() {
            if clump.cells[i].converged {
                continue;
            }
            let (edge_w, prior_w) = &cropped[i];
            update_phi(clump, i, edge_w, prior_w, params);
        }

        if iteration % params.check_interval == 0 {
            let at_cap = iteration >= params.max_iterations;
            for i in 0..clump.cells.len() {
                if clump.cells[i].converged {
                    continue;
                }
                let area = clump.cells[i].measure_phi_area();
                let delta = (clump.cells[i].phi_area - area).abs();
                clump.cells[i].phi_area = area;
                if delta < params.area_delta || at_cap {
                    let cell = &mut clump.cells[i];
                    cell.converged = true;
                    cell.forced = at_cap && delta >= params.area_delta;
                    cell.final_contour = cell.phi_contour(border);
                    remaining -= 1;
                    if cell.forced {
                        warn!(
                            "clump {clump_idx}: cell {i} force-converged at \
                             iteration {iteration} (area delta {delta:.0})"
                        );
                    } else {
                        debug!("clump {clump_idx}: cell {i} converged at iteration {iteration}");
                    }
                }
            }
        }
    }
    iteration
}

/// Build the shared fields and every cell's window and initial `phi`.
fn prepare(clump: &mut Clump, params: &EvolveParams) {
    let border = params.border;
    let (fw, fh) = clump.frame_size(border);

    // Window per cell: own bounding box joined with every neighbor's, plus
    // the fixed border, in frame coordinates.
    let boxes: Vec<Rect> = clump
        .cells
        .iter()
        .map(|c| bounding_rect(&c.cyto_boundary))
        .collect();
    let windows: Vec<Rect> = clump
        .cells
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let mut joined = boxes[i];
            for &n in &cell.neighbors {
                joined = joined.union(&boxes[n]);
            }
            // Local -> frame shifts by +border; padding by border cancels
            // the shift on the near edges and extends the far ones.
            Rect::new(
                joined.x,
                joined.y,
                joined.w + 2 * border,
                joined.h + 2 * border,
            )
            .clipped(fw, fh)
        })
        .collect();

    for (cell, window) in clump.cells.iter_mut().zip(windows) {
        cell.initialize_phi(window, border);
    }

    if clump.edge_enforcer.is_none() {
        clump.edge_enforcer = Some(edge_enforcer(
            &clump.image,
            border,
            params.gaussian_ksize,
            params.gaussian_sigma,
        ));
    }
    if clump.clump_prior.is_none() {
        clump.clump_prior = Some(clump_prior(clump, border));
    }
}

/// One explicit Euler step for cell `i`.
fn update_phi(
    clump: &mut Clump,
    i: usize,
    edge_w: &GridF32,
    prior_w: &GridF32,
    params: &EvolveParams,
) {
    let window = clump.cells[i].window;
    let phi = &clump.cells[i].phi;

    let (gx, gy) = gradient(phi);
    let reg = signed_distance_reg(phi, &gx, &gy);
    let delta = dirac(phi, params.epsilon);
    let gac = geodesic_term(&delta, &gx, &gy, edge_w, prior_w);

    let mut binary = GridF32::new(window.w, window.h);
    for &j in &clump.cells[i].neighbors {
        if j == i {
            continue;
        }
        let phi_j = clump.cells[j].phi_on(window);
        let term = binary_term(&phi_j, edge_w, prior_w, &delta);
        for (b, &t) in binary.data.iter_mut().zip(&term.data) {
            *b += t;
        }
    }

    let cell = &mut clump.cells[i];
    for idx in 0..cell.phi.data.len() {
        cell.phi.data[idx] += params.dt
            * (params.mu * reg.data[idx]
                + params.kappa * gac.data[idx]
                + params.chi * binary.data[idx]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridF32;
    use crate::types::Contour;

    fn square(side: i32) -> Contour {
        vec![[0, 0], [side, 0], [side, side], [0, side]]
    }

    #[test]
    fn single_cell_clump_converges_without_iterating() {
        let nucleus = vec![[10, 10], [14, 10], [14, 14], [10, 14]];
        let mut clump =
            Clump::from_nuclei(square(30), vec![nucleus], GridF32::new(31, 31)).unwrap();
        clump.cells[0].cyto_boundary = clump.offset_outline.clone();

        let iterations = evolve_clump(&mut clump, 0, &EvolveParams::default());
        assert_eq!(iterations, 0);
        assert!(clump.cells[0].converged);
        assert!(!clump.cells[0].forced);
        assert_eq!(clump.cells[0].final_contour, clump.offset_outline);
    }

    #[test]
    fn windows_cover_neighbors_with_border() {
        let nuclei = vec![
            vec![[8, 14], [12, 14], [12, 18], [8, 18]],
            vec![[28, 14], [32, 14], [32, 18], [28, 18]],
        ];
        let mut clump =
            Clump::from_nuclei(square(40), nuclei, GridF32::new(41, 41)).unwrap();
        clump.cells[0].cyto_boundary = vec![[0, 0], [20, 0], [20, 40], [0, 40]];
        clump.cells[1].cyto_boundary = vec![[20, 0], [40, 0], [40, 40], [20, 40]];
        clump.cells[0].neighbors = vec![1];
        clump.cells[1].neighbors = vec![0];

        let params = EvolveParams::default();
        prepare(&mut clump, &params);

        // Both cells' windows span the union of the pair's boxes plus the
        // border on every side, clipped to the frame.
        for cell in &clump.cells {
            assert_eq!(cell.window, Rect::new(0, 0, 61, 61));
            assert!(cell.phi.data.iter().any(|&v| v < 0.0));
            assert!(cell.phi.data.iter().any(|&v| v > 0.0));
        }
    }
}
