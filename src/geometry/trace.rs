//! Contour extraction from byte masks: 8-connected component labeling
//! followed by Moore boundary tracing of each component's outer contour.

use crate::grid::Mask;
use crate::types::Contour;

use super::polygon::contour_area;

/// Clockwise 8-neighborhood starting west.
const N8: [(i32, i32); 8] = [
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
];

#[inline]
fn dir_index(dx: i32, dy: i32) -> usize {
    N8.iter().position(|&d| d == (dx, dy)).unwrap_or(0)
}

/// Outer boundary of every 8-connected foreground component, one contour per
/// component, ordered clockwise from the component's topmost-leftmost pixel.
pub fn external_contours(mask: &Mask) -> Vec<Contour> {
    let (w, h) = (mask.w as i32, mask.h as i32);
    let mut labels = vec![0u32; mask.data.len()];
    let mut contours = Vec::new();
    let mut next_label = 0u32;
    let mut queue: Vec<(i32, i32)> = Vec::new();

    for y in 0..h {
        for x in 0..w {
            let idx = (y * w + x) as usize;
            if mask.data[idx] == 0 || labels[idx] != 0 {
                continue;
            }
            next_label += 1;
            let label = next_label;

            // Flood the component so later scan positions skip it.
            labels[idx] = label;
            queue.clear();
            queue.push((x, y));
            while let Some((cx, cy)) = queue.pop() {
                for &(dx, dy) in &N8 {
                    let (nx, ny) = (cx + dx, cy + dy);
                    if nx < 0 || ny < 0 || nx >= w || ny >= h {
                        continue;
                    }
                    let nidx = (ny * w + nx) as usize;
                    if mask.data[nidx] != 0 && labels[nidx] == 0 {
                        labels[nidx] = label;
                        queue.push((nx, ny));
                    }
                }
            }

            // (x, y) is the first pixel of the component in scan order, so
            // it sits on the outer boundary with background to its west.
            contours.push(trace_boundary(&labels, w, h, label, (x, y)));
        }
    }
    contours
}

/// Largest external contour of the mask by shoelace area, breaking ties by
/// pixel count so isolated single-pixel blobs still resolve.
pub fn largest_contour(mask: &Mask) -> Option<Contour> {
    external_contours(mask)
        .into_iter()
        .max_by(|a, b| {
            let (aa, ab) = (contour_area(a), contour_area(b));
            aa.partial_cmp(&ab)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.len().cmp(&b.len()))
        })
        .filter(|c| !c.is_empty())
}

/// Moore-neighbor boundary trace of one labeled component. `start` must be
/// the component's topmost-leftmost pixel, so its west neighbor is
/// background. The walk terminates when it is about to repeat its opening
/// step out of the start pixel.
fn trace_boundary(labels: &[u32], w: i32, h: i32, label: u32, start: (i32, i32)) -> Contour {
    let is_fg = |x: i32, y: i32| -> bool {
        x >= 0 && y >= 0 && x < w && y < h && labels[(y * w + x) as usize] == label
    };

    let mut contour: Contour = vec![[start.0, start.1]];
    let mut current = start;
    let mut backtrack = (start.0 - 1, start.1);
    let mut first_step: Option<(i32, i32)> = None;

    // Bounded walk; a boundary never exceeds the component's pixel frontier.
    let step_cap = (w as usize * h as usize * 4).max(16);
    for _ in 0..step_cap {
        let entry = dir_index(backtrack.0 - current.0, backtrack.1 - current.1);
        let mut next = None;
        let mut candidate_backtrack = backtrack;
        for k in 1..=8 {
            let (dx, dy) = N8[(entry + k) % 8];
            let p = (current.0 + dx, current.1 + dy);
            if is_fg(p.0, p.1) {
                next = Some(p);
                break;
            }
            candidate_backtrack = p;
        }
        let Some(next) = next else {
            break; // isolated pixel
        };
        if current == start {
            match first_step {
                None => first_step = Some(next),
                Some(first) if first == next => break,
                Some(_) => {}
            }
        }
        backtrack = candidate_backtrack;
        current = next;
        if current != start {
            contour.push([current.0, current.1]);
        }
    }
    contour
}
