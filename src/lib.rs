#![doc = include_str!("../README.md")]

// Core buffer model and its host-facing conversions.
pub mod error;
pub mod image;
pub mod marshal;

// Processing routines.
pub mod color;
pub mod draw;
pub mod geometry;
pub mod half_float;

// Dynamic and foreign entry points.
pub mod ffi;
pub mod registry;

// Tooling support for the `voxel_transform` binary.
pub mod config;
pub mod diagnostics;

// --- High-level re-exports -------------------------------------------------

pub use crate::error::{ImageError, Result};
pub use crate::geometry::{apply_geometric_transform, AffineTransform};
pub use crate::image::{Image, Scalar, ScalarKind};
pub use crate::marshal::{from_array, to_view, HostArray, StridedView};
pub use crate::registry::AnyImage;

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```
/// use voxel_image::prelude::*;
///
/// let host = [1.0f32, 2.0, 3.0, 4.0];
/// let img = from_array(HostArray::new(&[2, 2], &host)).unwrap();
/// let out = img.apply_geometric_transform(&AffineTransform::identity()).unwrap();
/// assert_eq!(out, img);
/// ```
pub mod prelude {
    pub use crate::color::validate_color;
    pub use crate::image::{Image, ImageView, ImageViewMut, Scalar, ScalarKind};
    pub use crate::marshal::{from_array, to_array, to_view, HostArray};
    pub use crate::{AffineTransform, AnyImage, ImageError};
}
