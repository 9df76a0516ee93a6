//! Energy terms of the coupled level-set evolution.
//!
//! Every term is a pure function over explicit grids of identical size (the
//! cell's local window), so terms compose without shared state and clump
//! tasks can evaluate them in parallel.

use crate::grid::{divergence, gradient, heaviside_inv, laplacian, magnitude, GridF32};

/// Guard for gradient-magnitude denominators.
const SMALL: f32 = 1e-10;

/// Normalized gradient `(gx, gy) / |grad|`, the curvature components.
pub fn curvature_components(gx: &GridF32, gy: &GridF32) -> (GridF32, GridF32) {
    let mag = magnitude(gx, gy);
    let mut nx = GridF32::new(gx.w, gx.h);
    let mut ny = GridF32::new(gy.w, gy.h);
    for i in 0..mag.data.len() {
        let m = mag.data[i] + SMALL;
        nx.data[i] = gx.data[i] / m;
        ny.data[i] = gy.data[i] / m;
    }
    (nx, ny)
}

/// Distance-regularization term `div(d_p(|grad phi|) grad phi)` plus the
/// laplacian correction, keeping `|grad phi|` near one without reshaping the
/// zero level set.
///
/// The potential is piecewise: `sin(2 pi s) / (2 pi)` on `0 <= s <= 1`,
/// `s - 1` beyond.
pub fn signed_distance_reg(phi: &GridF32, gx: &GridF32, gy: &GridF32) -> GridF32 {
    let mag = magnitude(gx, gy);
    let mut fx = GridF32::new(phi.w, phi.h);
    let mut fy = GridF32::new(phi.w, phi.h);
    let two_pi = 2.0 * std::f32::consts::PI;
    for i in 0..mag.data.len() {
        let s = mag.data[i];
        let p = if s <= 1.0 {
            (two_pi * s).sin() / two_pi
        } else {
            s - 1.0
        };
        let dps = (if p != 0.0 { p } else { 1.0 }) / (if s != 0.0 { s } else { 1.0 });
        fx.data[i] = (dps - 1.0) * gx.data[i];
        fy.data[i] = (dps - 1.0) * gy.data[i];
    }
    let mut reg = divergence(&fx, &fy);
    let lap = laplacian(phi);
    for (r, &l) in reg.data.iter_mut().zip(&lap.data) {
        *r += l;
    }
    reg
}

/// Geodesic (edge attraction) term: transport along the gradient of the
/// combined edge/prior field plus prior-weighted motion by curvature, both
/// confined to the dirac band around the zero level set.
pub fn geodesic_term(
    dirac: &GridF32,
    gx: &GridF32,
    gy: &GridF32,
    edge: &GridF32,
    prior: &GridF32,
) -> GridF32 {
    let mut pair = GridF32::new(edge.w, edge.h);
    for i in 0..pair.data.len() {
        pair.data[i] = edge.data[i] * prior.data[i];
    }
    let (vx, vy) = gradient(&pair);
    let (nx, ny) = curvature_components(gx, gy);
    let curvature = divergence(&nx, &ny);

    let mut out = GridF32::new(edge.w, edge.h);
    for i in 0..out.data.len() {
        let advect = vx.data[i] * nx.data[i] + vy.data[i] * ny.data[i];
        out.data[i] = dirac.data[i] * advect
            + dirac.data[i] * prior.data[i] * edge.data[i] * curvature.data[i];
    }
    out
}

/// Pairwise overlap penalty against one neighbor: positive wherever the
/// neighbor currently claims the pixel as interior, pushing this cell's
/// front out of it. Accumulated over all neighbors by the driver.
pub fn binary_term(
    phi_neighbor: &GridF32,
    edge: &GridF32,
    prior: &GridF32,
    dirac: &GridF32,
) -> GridF32 {
    let inside = heaviside_inv(phi_neighbor);
    let mut out = GridF32::new(edge.w, edge.h);
    for i in 0..out.data.len() {
        out.data[i] = prior.data[i] * edge.data[i] * dirac.data[i] * inside.data[i];
    }
    out
}
