//! Conversion between host N-dimensional arrays and 4-axis buffers.
//!
//! Host arrays list their axes slowest to fastest; a buffer's fastest axis is
//! `width`. The mapping therefore reads the host shape back to front:
//!
//! | rank | host axes            | buffer axes                       |
//! |------|----------------------|-----------------------------------|
//! | 1    | `(n)`                | width                             |
//! | 2    | `(rows, cols)`       | (height, width)                   |
//! | 3    | `(a, b, c)`          | (depth, height, width)            |
//! | 4    | `(a, b, c, d)`       | (channel, depth, height, width)   |
//!
//! Missing buffer axes have extent 1. Going the other way, [`to_view`]
//! always reports the full 4-axis shape `(channel, depth, height, width)` and
//! never copies.
use crate::error::{ImageError, Result};
use crate::image::buffer::element_count;
use crate::image::{Image, ImageView, ImageViewMut, Scalar};
use ndarray::{ArrayView, ArrayView4, ArrayViewMut4, Dimension};
use std::mem::size_of;

/// Borrowed row-major contiguous host array.
#[derive(Clone, Copy, Debug)]
pub struct HostArray<'a, T> {
    pub shape: &'a [usize],
    pub data: &'a [T],
}

impl<'a, T> HostArray<'a, T> {
    pub fn new(shape: &'a [usize], data: &'a [T]) -> Self {
        Self { shape, data }
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }
}

/// Buffer dimensions `[width, height, depth, channel]` for a host shape.
pub fn buffer_dims(shape: &[usize]) -> Result<[usize; 4]> {
    if shape.is_empty() || shape.len() > 4 {
        return Err(ImageError::shape(format!(
            "cannot convert from array with {} dimensions (expected 1 to 4)",
            shape.len()
        )));
    }
    let mut dims = [1usize; 4];
    for (dst, &n) in dims.iter_mut().zip(shape.iter().rev()) {
        *dst = n;
    }
    Ok(dims)
}

/// Copy a host array into a newly allocated buffer.
pub fn from_array<T: Scalar>(array: HostArray<'_, T>) -> Result<Image<T>> {
    let [w, h, d, c] = buffer_dims(array.shape)?;
    let expected = element_count([w, h, d, c])?;
    if array.data.len() != expected {
        return Err(ImageError::shape(format!(
            "array of shape {:?} needs {expected} elements, got {}",
            array.shape,
            array.data.len()
        )));
    }
    Image::from_vec(w, h, d, c, array.data.to_vec())
}

/// Copy an `ndarray` view (any memory order) into a newly allocated buffer.
pub fn from_ndarray<T: Scalar, D: Dimension>(view: ArrayView<'_, T, D>) -> Result<Image<T>> {
    let [w, h, d, c] = buffer_dims(view.shape())?;
    let data: Vec<T> = view.iter().copied().collect();
    Image::from_vec(w, h, d, c, data)
}

/// Owned copy of the buffer as a rank-4 host array `(shape, data)`.
pub fn to_array<T: Scalar>(image: &Image<T>) -> (Vec<usize>, Vec<T>) {
    let [w, h, d, c] = image.dims();
    (vec![c, d, h, w], image.data().to_vec())
}

/// Shape `(channel, depth, height, width)` and byte strides of a buffer.
fn layout<T: Scalar>(image: &Image<T>) -> ([usize; 4], [usize; 4]) {
    let item = size_of::<T>();
    let [w, h, d, c] = image.dims();
    ([c, d, h, w], [item * d * h * w, item * h * w, item * w, item])
}

/// Read-only strided view over a buffer's storage.
///
/// Borrowing the buffer ties the view's lifetime to it.
#[derive(Clone, Copy, Debug)]
pub struct StridedView<'a, T> {
    data: &'a [T],
    shape: [usize; 4],
    strides: [usize; 4],
}

/// Mutable strided view; writes go straight into the buffer.
#[derive(Debug)]
pub struct StridedViewMut<'a, T> {
    data: &'a mut [T],
    shape: [usize; 4],
    strides: [usize; 4],
}

pub fn to_view<T: Scalar>(image: &Image<T>) -> StridedView<'_, T> {
    let (shape, strides) = layout(image);
    StridedView {
        data: image.data(),
        shape,
        strides,
    }
}

pub fn to_view_mut<T: Scalar>(image: &mut Image<T>) -> StridedViewMut<'_, T> {
    let (shape, strides) = layout(image);
    StridedViewMut {
        data: image.data_mut(),
        shape,
        strides,
    }
}

macro_rules! view_metadata {
    () => {
        /// Always 4.
        pub fn ndim(&self) -> usize {
            4
        }
        /// `(channel, depth, height, width)`
        pub fn shape(&self) -> [usize; 4] {
            self.shape
        }
        /// Byte strides matching [`shape`](Self::shape).
        pub fn strides(&self) -> [usize; 4] {
            self.strides
        }
        pub fn item_size(&self) -> usize {
            size_of::<T>()
        }
        /// Struct-module format character of the element type.
        pub fn format(&self) -> &'static str {
            T::KIND.format()
        }
        fn index(&self, c: usize, z: usize, y: usize, x: usize) -> usize {
            let [sc, sz, sy, sx] = self.strides;
            (c * sc + z * sz + y * sy + x * sx) / size_of::<T>()
        }
    };
}

impl<'a, T: Scalar> StridedView<'a, T> {
    view_metadata!();

    pub fn as_ptr(&self) -> *const T {
        self.data.as_ptr()
    }

    /// Element at `(c, z, y, x)` located through the byte strides.
    pub fn get(&self, c: usize, z: usize, y: usize, x: usize) -> T {
        self.data[self.index(c, z, y, x)]
    }
}

impl<'a, T: Scalar> StridedViewMut<'a, T> {
    view_metadata!();

    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.data.as_mut_ptr()
    }

    pub fn get(&self, c: usize, z: usize, y: usize, x: usize) -> T {
        self.data[self.index(c, z, y, x)]
    }

    pub fn set(&mut self, c: usize, z: usize, y: usize, x: usize, v: T) {
        let i = self.index(c, z, y, x);
        self.data[i] = v;
    }
}

impl<'a, T: Scalar> ImageView for StridedView<'a, T> {
    type Pixel = T;

    fn width(&self) -> usize {
        self.shape[3]
    }
    fn height(&self) -> usize {
        self.shape[2]
    }
    fn depth(&self) -> usize {
        self.shape[1]
    }
    fn channel(&self) -> usize {
        self.shape[0]
    }
    fn row(&self, y: usize, z: usize, c: usize) -> &[T] {
        let start = self.index(c, z, y, 0);
        &self.data[start..start + self.width()]
    }
    fn as_slice(&self) -> Option<&[T]> {
        Some(self.data)
    }
}

impl<'a, T: Scalar> ImageView for StridedViewMut<'a, T> {
    type Pixel = T;

    fn width(&self) -> usize {
        self.shape[3]
    }
    fn height(&self) -> usize {
        self.shape[2]
    }
    fn depth(&self) -> usize {
        self.shape[1]
    }
    fn channel(&self) -> usize {
        self.shape[0]
    }
    fn row(&self, y: usize, z: usize, c: usize) -> &[T] {
        let start = self.index(c, z, y, 0);
        &self.data[start..start + self.width()]
    }
    fn as_slice(&self) -> Option<&[T]> {
        Some(&*self.data)
    }
}

impl<'a, T: Scalar> ImageViewMut for StridedViewMut<'a, T> {
    fn row_mut(&mut self, y: usize, z: usize, c: usize) -> &mut [T] {
        let start = self.index(c, z, y, 0);
        let end = start + self.width();
        &mut self.data[start..end]
    }

    fn as_mut_slice(&mut self) -> Option<&mut [T]> {
        Some(&mut *self.data)
    }
}

/// The buffer as a zero-copy `ndarray` view indexed `[c, z, y, x]`.
pub fn as_ndarray<T: Scalar>(image: &Image<T>) -> Result<ArrayView4<'_, T>> {
    let (shape, _) = layout(image);
    ArrayView4::from_shape(shape, image.data()).map_err(|e| ImageError::shape(e.to_string()))
}

pub fn as_ndarray_mut<T: Scalar>(image: &mut Image<T>) -> Result<ArrayViewMut4<'_, T>> {
    let (shape, _) = layout(image);
    ArrayViewMut4::from_shape(shape, image.data_mut())
        .map_err(|e| ImageError::shape(e.to_string()))
}
