//! Dynamically typed buffers: one variant per supported scalar type.
//!
//! Hosts that only learn the element type at run time (the C ABI, tools that
//! read container headers) hold an [`AnyImage`] and let the registry route
//! each call to the matching `Image<T>` instantiation.
use crate::error::{ImageError, Result};
use crate::geometry::AffineTransform;
use crate::half_float;
use crate::image::{io, Image, Scalar, ScalarKind};
use crate::marshal::{self, HostArray};
use std::path::Path;

#[derive(Clone, Debug, PartialEq)]
pub enum AnyImage {
    U8(Image<u8>),
    I8(Image<i8>),
    U16(Image<u16>),
    I16(Image<i16>),
    U32(Image<u32>),
    I32(Image<i32>),
    F32(Image<f32>),
    F64(Image<f64>),
}

/// Run `$body` with `$img` bound to the typed buffer inside `$value`.
macro_rules! dispatch {
    ($value:expr, $img:ident => $body:expr) => {
        match $value {
            AnyImage::U8($img) => $body,
            AnyImage::I8($img) => $body,
            AnyImage::U16($img) => $body,
            AnyImage::I16($img) => $body,
            AnyImage::U32($img) => $body,
            AnyImage::I32($img) => $body,
            AnyImage::F32($img) => $body,
            AnyImage::F64($img) => $body,
        }
    };
}

/// Like `dispatch!`, for bodies producing a `Result<Image<T>>` of the same `T`.
macro_rules! dispatch_map {
    ($value:expr, $img:ident => $body:expr) => {
        match $value {
            AnyImage::U8($img) => $body.map(AnyImage::U8),
            AnyImage::I8($img) => $body.map(AnyImage::I8),
            AnyImage::U16($img) => $body.map(AnyImage::U16),
            AnyImage::I16($img) => $body.map(AnyImage::I16),
            AnyImage::U32($img) => $body.map(AnyImage::U32),
            AnyImage::I32($img) => $body.map(AnyImage::I32),
            AnyImage::F32($img) => $body.map(AnyImage::F32),
            AnyImage::F64($img) => $body.map(AnyImage::F64),
        }
    };
}

/// Run a generic expression for the type `$t` named by a `ScalarKind`.
macro_rules! for_kind {
    ($kind:expr, $t:ident => $body:expr) => {
        match $kind {
            ScalarKind::Uint8 => {
                type $t = u8;
                $body.map(AnyImage::U8)
            }
            ScalarKind::Int8 => {
                type $t = i8;
                $body.map(AnyImage::I8)
            }
            ScalarKind::Uint16 => {
                type $t = u16;
                $body.map(AnyImage::U16)
            }
            ScalarKind::Int16 => {
                type $t = i16;
                $body.map(AnyImage::I16)
            }
            ScalarKind::Uint32 => {
                type $t = u32;
                $body.map(AnyImage::U32)
            }
            ScalarKind::Int32 => {
                type $t = i32;
                $body.map(AnyImage::I32)
            }
            ScalarKind::Float32 => {
                type $t = f32;
                $body.map(AnyImage::F32)
            }
            ScalarKind::Float64 => {
                type $t = f64;
                $body.map(AnyImage::F64)
            }
            ScalarKind::Float16 => Err(ImageError::shape(
                "float16 is a storage format, not a buffer element type",
            )),
        }
    };
}

macro_rules! impl_from_image {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<Image<$t>> for AnyImage {
                fn from(image: Image<$t>) -> Self {
                    AnyImage::$variant(image)
                }
            }
        )*
    };
}

impl_from_image!(
    u8 => U8,
    i8 => I8,
    u16 => U16,
    i16 => I16,
    u32 => U32,
    i32 => I32,
    f32 => F32,
    f64 => F64,
);

/// Decode little-endian host bytes into typed elements.
fn elements_from_bytes<T: Scalar>(bytes: &[u8]) -> Result<Vec<T>> {
    let size = T::KIND.size();
    if bytes.len() % size != 0 {
        return Err(ImageError::shape(format!(
            "{} bytes is not a whole number of {} elements",
            bytes.len(),
            T::KIND
        )));
    }
    Ok(bytes.chunks_exact(size).map(T::read_le).collect())
}

/// Raw description of a buffer's storage for foreign callers.
#[derive(Clone, Copy, Debug)]
pub struct RawBufferInfo {
    pub ptr: *mut u8,
    pub item_size: usize,
    pub format: &'static str,
    pub shape: [usize; 4],
    pub strides: [usize; 4],
}

impl AnyImage {
    /// Empty buffer of the given kind.
    pub fn empty(kind: ScalarKind) -> Result<Self> {
        for_kind!(kind, T => Ok::<_, ImageError>(Image::<T>::empty()))
    }

    /// Build from a host array given as little-endian bytes of `kind`.
    pub fn from_bytes(kind: ScalarKind, shape: &[usize], bytes: &[u8]) -> Result<Self> {
        for_kind!(kind, T => elements_from_bytes::<T>(bytes)
            .and_then(|data| marshal::from_array(HostArray::new(shape, &data))))
    }

    pub fn kind(&self) -> ScalarKind {
        dispatch!(self, img => scalar_kind_of(img))
    }

    /// `[width, height, depth, channel]`
    pub fn dims(&self) -> [usize; 4] {
        dispatch!(self, img => img.dims())
    }

    pub fn width(&self) -> usize {
        self.dims()[0]
    }
    pub fn height(&self) -> usize {
        self.dims()[1]
    }
    pub fn depth(&self) -> usize {
        self.dims()[2]
    }
    pub fn channel(&self) -> usize {
        self.dims()[3]
    }
    pub fn size(&self) -> usize {
        dispatch!(self, img => img.size())
    }

    /// Zero-copy description of the storage; valid while `self` is neither
    /// moved nor dropped.
    pub fn raw_buffer_info(&mut self) -> RawBufferInfo {
        dispatch!(self, img => {
            let mut view = marshal::to_view_mut(img);
            RawBufferInfo {
                ptr: view.as_mut_ptr().cast::<u8>(),
                item_size: view.item_size(),
                format: view.format(),
                shape: view.shape(),
                strides: view.strides(),
            }
        })
    }

    pub fn apply_geometric_transform(&self, transform: &AffineTransform) -> Result<Self> {
        dispatch_map!(self, img => img.apply_geometric_transform(transform))
    }

    pub fn save_float16(&self, path: &Path) -> Result<()> {
        dispatch!(self, img => half_float::save_float16(img, path))
    }

    pub fn load_float16(kind: ScalarKind, path: &Path) -> Result<Self> {
        for_kind!(kind, T => half_float::load_float16::<T>(path))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        dispatch!(self, img => io::save(img, path))
    }

    pub fn load(kind: ScalarKind, path: &Path) -> Result<Self> {
        for_kind!(kind, T => io::load::<T>(path))
    }

    pub fn save_container(&self, path: &Path) -> Result<()> {
        dispatch!(self, img => io::save_container(img, path))
    }

    /// Load a container of whatever element type its header names.
    pub fn load_container(path: &Path) -> Result<Self> {
        let kind = io::container_kind(path)?;
        for_kind!(kind, T => io::load_container::<T>(path))
    }
}

fn scalar_kind_of<T: Scalar>(_: &Image<T>) -> ScalarKind {
    T::KIND
}
