//! Computational-geometry primitives shared by association and evolution:
//! polygon membership and visibility tests, mask rasterization, and contour
//! extraction from masks.

mod polygon;
mod raster;
mod trace;

pub use polygon::{
    bounding_rect, contains, contour_area, line_of_sight, offset_contour, vertex_centroid,
};
pub use raster::{fill_contour, fill_ellipse, mask_centroid, stroke_contour};
pub use trace::{external_contours, largest_contour};
