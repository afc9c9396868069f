use rayon::prelude::*;

use crate::foundation::core::PixelBuffer;
use crate::foundation::math::div_round_u8;

/// Number of box passes used to approximate one Gaussian.
pub const GAUSS_BOX_PASSES: usize = 3;

/// Widths of `n` successive box filters whose combination approximates a Gaussian
/// with standard deviation `sigma`. Every width is odd and at least 1.
pub fn boxes_for_gauss(sigma: f64, n: usize) -> Vec<u32> {
    if n == 0 {
        return Vec::new();
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return vec![1; n];
    }

    let nf = n as f64;
    let w_ideal = (12.0 * sigma * sigma / nf + 1.0).sqrt();
    let mut wl = w_ideal.floor();
    if wl % 2.0 == 0.0 {
        wl -= 1.0;
    }
    let wu = wl + 2.0;

    let m_ideal =
        (12.0 * sigma * sigma - nf * wl * wl - 4.0 * nf * wl - 3.0 * nf) / (-4.0 * wl - 4.0);
    let m = m_ideal.round_ties_even();

    (0..n)
        .map(|i| if (i as f64) < m { wl as u32 } else { wu as u32 })
        .collect()
}

/// One box pass over a single `width × height` plane: a horizontal then a vertical
/// sliding-window average with half-width `half`, sampling clamped to the edges.
///
/// `plane` holds the input and receives the output; `scratch` is grown as needed and can
/// be reused across calls.
pub fn box_blur_channel(
    plane: &mut [u8],
    width: usize,
    height: usize,
    half: u32,
    scratch: &mut Vec<u8>,
) {
    if half == 0 || width == 0 || height == 0 || plane.len() < width * height {
        return;
    }
    let half = half as usize;
    scratch.resize(width.max(height), 0);

    for row in plane.chunks_exact_mut(width).take(height) {
        scratch[..width].copy_from_slice(row);
        blur_line(&scratch[..width], row, half);
    }

    let mut column = vec![0u8; height];
    for x in 0..width {
        for (y, v) in column.iter_mut().enumerate() {
            *v = plane[y * width + x];
        }
        blur_line(&column, &mut scratch[..height], half);
        for (y, &v) in scratch[..height].iter().enumerate() {
            plane[y * width + x] = v;
        }
    }
}

fn blur_line(src: &[u8], dst: &mut [u8], half: usize) {
    let n = src.len();
    let last = n - 1;
    let div = (2 * half + 1) as u32;
    let at = |i: isize| -> u32 { u32::from(src[i.clamp(0, last as isize) as usize]) };

    let half_i = half as isize;
    let mut sum: u32 = (-half_i..=half_i).map(at).sum();
    for (x, out) in dst.iter_mut().enumerate().take(n) {
        *out = div_round_u8(sum, div);
        let x = x as isize;
        sum = sum + at(x + half_i + 1) - at(x - half_i);
    }
}

/// Gaussian blur of `src` with standard deviation `radius`, approximated by three box
/// passes per channel. The output has the same dimensions.
pub fn blur_pixels(src: &PixelBuffer, radius: u32, parallel: bool) -> PixelBuffer {
    BoxBlurEngine::new(parallel).blur(src, radius)
}

/// Separable three-box Gaussian approximation over straight RGBA8 pixels.
///
/// Channels are blurred independently; with `parallel` set the four planes run on the
/// rayon pool. Arithmetic is integer-only so output is bit-identical across runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoxBlurEngine {
    parallel: bool,
}

impl Default for BoxBlurEngine {
    fn default() -> Self {
        Self { parallel: true }
    }
}

impl BoxBlurEngine {
    /// Engine that optionally fans channels out to rayon.
    pub fn new(parallel: bool) -> Self {
        Self { parallel }
    }

    /// Blurred copy of `src`. A radius of 0 returns an unchanged copy.
    #[tracing::instrument(
        level = "debug",
        skip(self, src),
        fields(width = src.width(), height = src.height())
    )]
    pub fn blur(&self, src: &PixelBuffer, radius: u32) -> PixelBuffer {
        if radius == 0 || src.is_empty() {
            return src.clone();
        }
        let (w, h) = (src.width() as usize, src.height() as usize);
        let halves: Vec<u32> = boxes_for_gauss(f64::from(radius), GAUSS_BOX_PASSES)
            .into_iter()
            .map(|size| (size - 1) / 2)
            .collect();
        tracing::trace!(?halves, "box half-widths");

        let mut planes = split_planes(src);
        let run = |plane: &mut Vec<u8>| {
            let mut scratch = Vec::new();
            for &half in &halves {
                box_blur_channel(plane, w, h, half, &mut scratch);
            }
        };
        if self.parallel {
            planes.par_iter_mut().for_each(run);
        } else {
            planes.iter_mut().for_each(run);
        }

        PixelBuffer::from_planes(src.width(), src.height(), &planes)
    }
}

fn split_planes(src: &PixelBuffer) -> [Vec<u8>; 4] {
    let mut planes: [Vec<u8>; 4] = std::array::from_fn(|_| Vec::with_capacity(src.len()));
    for c in src.pixels() {
        planes[0].push(c.r);
        planes[1].push(c.g);
        planes[2].push(c.b);
        planes[3].push(c.a);
    }
    planes
}

#[cfg(test)]
#[path = "../../tests/unit/effects/blur.rs"]
mod tests;
