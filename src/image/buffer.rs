//! Owned dense 4-axis buffer (width × height × depth × channel).
//!
//! Storage order is `(channel, depth, height, width)` from outermost to
//! innermost, so `width` varies fastest and a `(z, c)` plane is one contiguous
//! run of `width * height` samples.
use super::scalar::Scalar;
use super::traits::{ImageView, ImageViewMut};
use crate::error::{ImageError, Result};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Image<T> {
    width: usize,
    height: usize,
    depth: usize,
    channel: usize,
    data: Vec<T>,
}

pub type ImageU8 = Image<u8>;
pub type ImageU16 = Image<u16>;
pub type ImageU32 = Image<u32>;
pub type ImageF32 = Image<f32>;
pub type ImageF64 = Image<f64>;

/// Checked element count of a `w × h × d × c` buffer.
pub(crate) fn element_count(dims: [usize; 4]) -> Result<usize> {
    dims.iter()
        .try_fold(1usize, |acc, &n| acc.checked_mul(n))
        .ok_or_else(|| ImageError::shape(format!("dimensions {dims:?} overflow usize")))
}

impl<T: Scalar> Image<T> {
    /// Buffer with all four dimensions zero.
    pub fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            depth: 0,
            channel: 0,
            data: Vec::new(),
        }
    }

    /// Zero-initialized buffer of size `width × height × depth × channel`.
    pub fn new(width: usize, height: usize, depth: usize, channel: usize) -> Self {
        Self::filled(width, height, depth, channel, T::default())
    }

    pub fn filled(width: usize, height: usize, depth: usize, channel: usize, value: T) -> Self {
        Self {
            width,
            height,
            depth,
            channel,
            data: vec![value; width * height * depth * channel],
        }
    }

    /// Wrap existing storage laid out in `(c, z, y, x)` order.
    pub fn from_vec(
        width: usize,
        height: usize,
        depth: usize,
        channel: usize,
        data: Vec<T>,
    ) -> Result<Self> {
        let expected = element_count([width, height, depth, channel])?;
        if data.len() != expected {
            return Err(ImageError::shape(format!(
                "{} elements supplied for a {width}x{height}x{depth}x{channel} buffer",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            depth,
            channel,
            data,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }
    #[inline]
    pub fn channel(&self) -> usize {
        self.channel
    }

    /// `[width, height, depth, channel]`
    #[inline]
    pub fn dims(&self) -> [usize; 4] {
        [self.width, self.height, self.depth, self.channel]
    }

    /// Total number of samples.
    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Convert (x, y, z, c) to a linear index into the storage.
    #[inline]
    pub fn offset(&self, x: usize, y: usize, z: usize, c: usize) -> usize {
        x + self.width * (y + self.height * (z + self.depth * c))
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize, c: usize) -> T {
        self.data[self.offset(x, y, z, c)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, c: usize, v: T) {
        let i = self.offset(x, y, z, c);
        self.data[i] = v;
    }

    /// Bounds-checked read.
    pub fn at(&self, x: usize, y: usize, z: usize, c: usize) -> Option<T> {
        (x < self.width && y < self.height && z < self.depth && c < self.channel)
            .then(|| self.get(x, y, z, c))
    }

    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_raw(self) -> Vec<T> {
        self.data
    }

    /// The contiguous `width * height` plane at `(z, c)`.
    pub fn plane(&self, z: usize, c: usize) -> &[T] {
        let len = self.width * self.height;
        let start = self.offset(0, 0, z, c);
        &self.data[start..start + len]
    }

    pub fn fill(&mut self, value: T) -> &mut Self {
        self.data.fill(value);
        self
    }

    /// Reallocate to new dimensions without interpolation; all samples reset
    /// to zero.
    pub fn resize_raw(
        &mut self,
        width: usize,
        height: usize,
        depth: usize,
        channel: usize,
    ) -> &mut Self {
        *self = Self::new(width, height, depth, channel);
        self
    }

    /// Element-wise `as` conversion into another scalar type.
    pub fn convert<U: Scalar>(&self) -> Image<U> {
        self.map_samples(|v| U::from_f64(v.to_f64()))
    }

    /// Same geometry, new samples produced by `f`.
    pub(crate) fn map_samples<U: Scalar>(&self, f: impl Fn(T) -> U) -> Image<U> {
        Image {
            width: self.width,
            height: self.height,
            depth: self.depth,
            channel: self.channel,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Smallest and largest sample, in that order. `None` when empty.
    ///
    /// NaN samples are skipped for float buffers.
    pub fn min_max(&self) -> Option<(T, T)> {
        let mut it = self
            .data
            .iter()
            .copied()
            .filter(|v| v.partial_cmp(v).is_some());
        let first = it.next()?;
        Some(it.fold((first, first), |(lo, hi), v| {
            (if v < lo { v } else { lo }, if v > hi { v } else { hi })
        }))
    }

    /// Largest and smallest sample, in that order. `None` when empty.
    pub fn max_min(&self) -> Option<(T, T)> {
        self.min_max().map(|(lo, hi)| (hi, lo))
    }
}

impl<T: Scalar> ImageView for Image<T> {
    type Pixel = T;

    #[inline]
    fn width(&self) -> usize {
        self.width
    }
    #[inline]
    fn height(&self) -> usize {
        self.height
    }
    #[inline]
    fn depth(&self) -> usize {
        self.depth
    }
    #[inline]
    fn channel(&self) -> usize {
        self.channel
    }
    #[inline]
    fn row(&self, y: usize, z: usize, c: usize) -> &[T] {
        let start = self.offset(0, y, z, c);
        &self.data[start..start + self.width]
    }
    #[inline]
    fn as_slice(&self) -> Option<&[T]> {
        Some(&self.data)
    }
}

impl<T: Scalar> ImageViewMut for Image<T> {
    #[inline]
    fn row_mut(&mut self, y: usize, z: usize, c: usize) -> &mut [T] {
        let start = self.offset(0, y, z, c);
        let end = start + self.width;
        &mut self.data[start..end]
    }

    #[inline]
    fn as_mut_slice(&mut self) -> Option<&mut [T]> {
        Some(&mut self.data)
    }
}
