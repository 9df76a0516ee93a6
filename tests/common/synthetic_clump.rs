//! Synthetic clumps for integration tests: square outlines, diamond nuclei
//! and a grayscale region with intensity edges at the plausible cell
//! borders.

use cell_segmenter::grid::GridF32;
use cell_segmenter::types::Contour;
use cell_segmenter::Clump;

pub fn square(x0: i32, y0: i32, side: i32) -> Contour {
    vec![
        [x0, y0],
        [x0 + side, y0],
        [x0 + side, y0 + side],
        [x0, y0 + side],
    ]
}

pub fn diamond(cx: i32, cy: i32, r: i32) -> Contour {
    vec![[cx - r, cy], [cx, cy - r], [cx + r, cy], [cx, cy + r]]
}

/// Grayscale region with a dark disc around every nucleus on a light
/// background, giving the edge enforcer real gradients to latch onto.
pub fn disc_image(w: usize, h: usize, discs: &[(f32, f32, f32)]) -> GridF32 {
    let mut image = GridF32::filled(w, h, 0.95);
    for y in 0..h {
        for x in 0..w {
            for &(cx, cy, r) in discs {
                let d = (x as f32 - cx).hypot(y as f32 - cy);
                if d <= r {
                    image.set(x, y, 0.35);
                }
            }
        }
    }
    image
}

/// A 100 x 100 square clump holding two cells whose nuclei sit 40 units
/// apart, with image discs marking each cell's plausible extent.
pub fn two_cell_clump() -> Clump {
    let outline = square(0, 0, 100);
    let nuclei = vec![diamond(30, 50, 4), diamond(70, 50, 4)];
    let image = disc_image(101, 101, &[(30.0, 50.0, 32.0), (70.0, 50.0, 32.0)]);
    Clump::from_nuclei(outline, nuclei, image).unwrap()
}

/// Smaller clump used by the scheduler tests, offset into image space.
pub fn small_clump(x0: i32, y0: i32) -> Clump {
    let outline = square(x0, y0, 50);
    let nuclei = vec![diamond(x0 + 16, y0 + 25, 3), diamond(x0 + 34, y0 + 25, 3)];
    let image = disc_image(51, 51, &[(16.0, 25.0, 15.0), (34.0, 25.0, 15.0)]);
    Clump::from_nuclei(outline, nuclei, image).unwrap()
}

/// Single-cell clump.
pub fn lone_cell_clump() -> Clump {
    let outline = square(0, 0, 40);
    let nuclei = vec![diamond(20, 20, 4)];
    let image = disc_image(41, 41, &[(20.0, 20.0, 14.0)]);
    Clump::from_nuclei(outline, nuclei, image).unwrap()
}
