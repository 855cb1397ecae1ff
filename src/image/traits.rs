//! Row access shared by 8-bit frames and integral tables.

/// Read-only, row-addressable single-channel raster.
pub trait ImageView {
    type Pixel: Copy + 'static;

    fn width(&self) -> usize;
    fn height(&self) -> usize;
    /// Elements between the starts of consecutive rows.
    fn stride(&self) -> usize;

    /// Row `y` without stride padding.
    fn row(&self, y: usize) -> &[Self::Pixel];

    fn dimensions(&self) -> (usize, usize) {
        (self.width(), self.height())
    }

    fn pixel(&self, x: usize, y: usize) -> Self::Pixel {
        self.row(y)[x]
    }

    fn rows(&self) -> impl Iterator<Item = &[Self::Pixel]> + '_ {
        (0..self.height()).map(move |y| self.row(y))
    }

    /// Whole buffer when rows are tightly packed.
    fn as_slice(&self) -> Option<&[Self::Pixel]> {
        None
    }
}
