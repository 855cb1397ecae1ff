//! Integral image (summed-area table) with squared sums.
//!
//! Layout
//! - `(W+1)×(H+1)` row-major `u64` tables; row 0 and column 0 are zero so
//!   that `I[y][x]` is the sum of all pixels with `row < y` and `col < x`.
//! - A second table holds the sums of squared intensities, used for the
//!   per-window standard deviation.
//!
//! Construction runs two passes: a horizontal prefix sum per row, then a
//! vertical accumulation that adds each row to the one below it. Rows are
//! independent in the first pass and columns in the second, so with the
//! `parallel` feature each pass fans out across the orthogonal dimension. The
//! second pass starts only after the first has completed.
//!
//! `u64` accumulators cannot overflow for any frame that fits in memory
//! (255² · 2³² pixels < 2⁶⁴).
use crate::error::InvalidInputError;
use crate::image::{ImageU8, ImageView};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Columns handed to one rayon task in the vertical pass.
#[cfg(feature = "parallel")]
const COLUMN_CHUNK: usize = 512;

#[derive(Clone, Debug, Default)]
pub struct IntegralImage {
    width: usize,
    height: usize,
    sum: Vec<u64>,
    sq_sum: Vec<u64>,
}

impl IntegralImage {
    /// Build the tables for `image`.
    pub fn build(image: &ImageU8<'_>) -> Result<Self, InvalidInputError> {
        let mut out = Self::default();
        out.rebuild(image)?;
        Ok(out)
    }

    /// Recompute the tables in place, reusing the existing allocations.
    pub fn rebuild(&mut self, image: &ImageU8<'_>) -> Result<(), InvalidInputError> {
        image.validate()?;
        let stride = image.w + 1;
        let len = stride * (image.h + 1);
        self.width = image.w;
        self.height = image.h;
        self.sum.resize(len, 0);
        self.sq_sum.resize(len, 0);
        self.sum[..stride].fill(0);
        self.sq_sum[..stride].fill(0);

        row_prefix_pass(image, &mut self.sum, &mut self.sq_sum, stride);
        column_pass(&mut self.sum, stride);
        column_pass(&mut self.sq_sum, stride);
        Ok(())
    }

    /// Width of the source image.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height of the source image.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Table value `I[y][x]`, `x <= width`, `y <= height`.
    #[inline]
    pub fn at(&self, x: usize, y: usize) -> u64 {
        self.sum[y * (self.width + 1) + x]
    }

    /// Squared table value at `(x, y)`.
    #[inline]
    pub fn sq_at(&self, x: usize, y: usize) -> u64 {
        self.sq_sum[y * (self.width + 1) + x]
    }

    /// Sum of the pixels inside `[x, x+w) × [y, y+h)`.
    #[inline]
    pub fn rect_sum(&self, x: usize, y: usize, w: usize, h: usize) -> u64 {
        box_sum(&self.sum, self.width + 1, self.width, self.height, x, y, w, h)
    }

    /// Sum of squared pixels inside `[x, x+w) × [y, y+h)`.
    #[inline]
    pub fn rect_sq_sum(&self, x: usize, y: usize, w: usize, h: usize) -> u64 {
        box_sum(&self.sq_sum, self.width + 1, self.width, self.height, x, y, w, h)
    }
}

impl ImageView for IntegralImage {
    type Pixel = u64;

    #[inline]
    fn width(&self) -> usize {
        self.width + 1
    }
    #[inline]
    fn height(&self) -> usize {
        self.height + 1
    }
    #[inline]
    fn stride(&self) -> usize {
        self.width + 1
    }
    #[inline]
    fn row(&self, y: usize) -> &[u64] {
        let stride = self.width + 1;
        &self.sum[y * stride..(y + 1) * stride]
    }
    #[inline]
    fn as_slice(&self) -> Option<&[u64]> {
        Some(&self.sum)
    }
}

#[allow(clippy::too_many_arguments)]
#[inline]
fn box_sum(
    table: &[u64],
    stride: usize,
    width: usize,
    height: usize,
    x: usize,
    y: usize,
    w: usize,
    h: usize,
) -> u64 {
    debug_assert!(
        x + w <= width && y + h <= height,
        "rectangle ({x},{y},{w},{h}) reads outside the {width}x{height} integral image"
    );
    let top = y * stride;
    let bottom = (y + h) * stride;
    table[bottom + x + w] + table[top + x] - table[top + x + w] - table[bottom + x]
}

fn row_prefix_pass(image: &ImageU8<'_>, sum: &mut [u64], sq_sum: &mut [u64], stride: usize) {
    let fill = |(y, (sum_row, sq_row)): (usize, (&mut [u64], &mut [u64]))| {
        let src = image.row(y);
        let mut acc = 0u64;
        let mut acc_sq = 0u64;
        sum_row[0] = 0;
        sq_row[0] = 0;
        for (x, &px) in src.iter().enumerate() {
            let v = px as u64;
            acc += v;
            acc_sq += v * v;
            sum_row[x + 1] = acc;
            sq_row[x + 1] = acc_sq;
        }
    };

    #[cfg(feature = "parallel")]
    sum[stride..]
        .par_chunks_mut(stride)
        .zip(sq_sum[stride..].par_chunks_mut(stride))
        .enumerate()
        .for_each(fill);

    #[cfg(not(feature = "parallel"))]
    sum[stride..]
        .chunks_mut(stride)
        .zip(sq_sum[stride..].chunks_mut(stride))
        .enumerate()
        .for_each(fill);
}

fn column_pass(table: &mut [u64], stride: usize) {
    let rows = table.len() / stride;
    for y in 2..rows {
        let (head, tail) = table.split_at_mut(y * stride);
        let prev = &head[(y - 1) * stride..];
        let cur = &mut tail[..stride];

        #[cfg(feature = "parallel")]
        cur.par_iter_mut()
            .zip(prev.par_iter())
            .with_min_len(COLUMN_CHUNK)
            .for_each(|(c, p)| *c += *p);

        #[cfg(not(feature = "parallel"))]
        for (c, p) in cur.iter_mut().zip(prev) {
            *c += *p;
        }
    }
}
