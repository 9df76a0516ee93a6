//! Separable Gaussian smoothing for the edge-enforcer field.

use super::GridF32;

/// Normalized 1D Gaussian taps of the given size and sigma.
pub fn gaussian_taps(ksize: usize, sigma: f32) -> Vec<f32> {
    let center = (ksize as f32 - 1.0) / 2.0;
    let denom = 2.0 * sigma * sigma;
    let mut taps: Vec<f32> = (0..ksize)
        .map(|i| {
            let d = i as f32 - center;
            (-d * d / denom).exp()
        })
        .collect();
    let sum: f32 = taps.iter().sum();
    for t in &mut taps {
        *t /= sum;
    }
    taps
}

/// Convolve with a 2D Gaussian (applied separably, zero beyond the border).
pub fn gaussian_smooth(f: &GridF32, ksize: usize, sigma: f32) -> GridF32 {
    let taps = gaussian_taps(ksize, sigma);
    let half = (ksize / 2) as isize;
    let (w, h) = (f.w, f.h);

    let mut horizontal = GridF32::new(w, h);
    for y in 0..h {
        let row = f.row(y);
        let out = horizontal.row_mut(y);
        for x in 0..w as isize {
            let mut acc = 0.0;
            for (k, &t) in taps.iter().enumerate() {
                let sx = x + k as isize - half;
                if sx >= 0 && sx < w as isize {
                    acc += row[sx as usize] * t;
                }
            }
            out[x as usize] = acc;
        }
    }

    let mut out = GridF32::new(w, h);
    for y in 0..h as isize {
        for x in 0..w {
            let mut acc = 0.0;
            for (k, &t) in taps.iter().enumerate() {
                let sy = y + k as isize - half;
                if sy >= 0 && sy < h as isize {
                    acc += horizontal.get(x, sy as usize) * t;
                }
            }
            out.set(x, y as usize, acc);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taps_are_normalized_and_symmetric() {
        let taps = gaussian_taps(15, 1.5);
        let sum: f32 = taps.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        for i in 0..7 {
            assert!((taps[i] - taps[14 - i]).abs() < 1e-6);
        }
        assert!(taps[7] > taps[6]);
    }

    #[test]
    fn smoothing_preserves_constant_interior() {
        let f = GridF32::filled(40, 40, 0.5);
        let s = gaussian_smooth(&f, 15, 1.5);
        // Far from the zero border the response is the input.
        assert!((s.get(20, 20) - 0.5).abs() < 1e-4);
        // Near the border the zero padding pulls the response down.
        assert!(s.get(0, 0) < 0.5);
    }
}
