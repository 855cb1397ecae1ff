//! Borrowed 8-bit intensity view, the only frame type the engine consumes.
//!
//! Callers own colour conversion; [`ImageU8::from_interleaved`] exists so that
//! adapters handing over raw camera buffers get a typed rejection instead of
//! silently scanning interleaved channels as intensity.
use crate::error::InvalidInputError;

#[derive(Clone, Debug)]
pub struct ImageU8<'a> {
    pub w: usize,
    pub h: usize,
    pub stride: usize, // bytes between rows
    pub data: &'a [u8],
}

impl<'a> ImageU8<'a> {
    /// Wrap a tightly packed buffer (`stride == w`) after validating it.
    pub fn new(w: usize, h: usize, data: &'a [u8]) -> Result<Self, InvalidInputError> {
        Self::with_stride(w, h, w, data)
    }

    /// Wrap a strided buffer after validating its geometry.
    pub fn with_stride(
        w: usize,
        h: usize,
        stride: usize,
        data: &'a [u8],
    ) -> Result<Self, InvalidInputError> {
        let img = Self { w, h, stride, data };
        img.validate()?;
        Ok(img)
    }

    /// Wrap a raw frame that declares its channel count. Only single-channel
    /// intensity frames are accepted.
    pub fn from_interleaved(
        w: usize,
        h: usize,
        channels: usize,
        data: &'a [u8],
    ) -> Result<Self, InvalidInputError> {
        if channels != 1 {
            return Err(InvalidInputError::UnsupportedChannels(channels));
        }
        Self::new(w, h, data)
    }

    /// Check dimensions, stride and buffer length.
    pub fn validate(&self) -> Result<(), InvalidInputError> {
        if self.w == 0 || self.h == 0 {
            return Err(InvalidInputError::EmptyImage {
                width: self.w,
                height: self.h,
            });
        }
        if self.stride < self.w {
            return Err(InvalidInputError::BadStride {
                width: self.w,
                stride: self.stride,
            });
        }
        let needed = (self.h - 1)
            .checked_mul(self.stride)
            .and_then(|n| n.checked_add(self.w))
            .unwrap_or(usize::MAX);
        if self.data.len() < needed {
            return Err(InvalidInputError::BufferTooSmall {
                width: self.w,
                height: self.h,
                stride: self.stride,
                len: self.data.len(),
                needed,
            });
        }
        Ok(())
    }
}

impl<'a> crate::image::traits::ImageView for ImageU8<'a> {
    type Pixel = u8;

    #[inline]
    fn width(&self) -> usize {
        self.w
    }
    #[inline]
    fn height(&self) -> usize {
        self.h
    }
    #[inline]
    fn stride(&self) -> usize {
        self.stride
    }
    #[inline]
    fn row(&self, y: usize) -> &[u8] {
        let start = y * self.stride;
        &self.data[start..start + self.w]
    }
    #[inline]
    fn as_slice(&self) -> Option<&[u8]> {
        (self.stride == self.w).then_some(&self.data[..self.w * self.h])
    }
}
