//! Inverse affine resampling with trilinear interpolation.
//!
//! For each destination voxel `(x, y, z)` the kernel computes
//!
//! ```text
//! p0 = ((z - t.z) / s, (x - t.x) / s, (y - t.y) / s)
//! p1 = M⁻¹ · p0
//! dst(x, y, z, 0) = src.linear_at(p1[1], p1[2], p1[0], 0)
//! ```
//!
//! The transform works in `(z, x, y)` order, and the translation vector is
//! stored in that same order: `t = [t.z, t.x, t.y]`. Sampling clamps each
//! fractional coordinate into the source extent (Neumann boundary).
//!
//! Only channel 0 is resampled; the remaining channels are copied from the
//! source unchanged.
//!
//! Destination voxels are independent, so with the `parallel` feature the
//! depth slices of large buffers are filled concurrently.
use crate::error::{ImageError, Result};
use crate::image::{Image, Scalar};
use log::{debug, warn};
use nalgebra::{Matrix3, Vector3};

/// Buffers smaller than this are resampled on the calling thread.
pub const PARALLEL_MIN_SIZE: usize = 4096;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AffineTransform {
    /// Forward matrix `M`; the kernel applies its inverse.
    pub matrix: Matrix3<f64>,
    /// Translation in `(z, x, y)` order.
    pub translation: Vector3<f64>,
    pub scale: f64,
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl AffineTransform {
    pub fn identity() -> Self {
        Self {
            matrix: Matrix3::identity(),
            translation: Vector3::zeros(),
            scale: 1.0,
        }
    }

    pub fn new(matrix: Matrix3<f64>, translation: Vector3<f64>, scale: f64) -> Self {
        Self {
            matrix,
            translation,
            scale,
        }
    }

    /// Build from buffer operands: a 3×3 single-slice single-channel matrix
    /// (`M[row][col] = matrix(col, row)`) and a 3-element translation taken in
    /// storage order.
    pub fn from_images<T: Scalar>(
        matrix: &Image<T>,
        translation: &Image<T>,
        scale: f64,
    ) -> Result<Self> {
        if matrix.dims() != [3, 3, 1, 1] {
            return Err(ImageError::shape(format!(
                "transform matrix must be 3x3, got {:?}",
                matrix.dims()
            )));
        }
        if translation.size() != 3 {
            return Err(ImageError::shape(format!(
                "translation must have 3 elements, got {}",
                translation.size()
            )));
        }
        let m = Matrix3::from_fn(|r, c| matrix.get(c, r, 0, 0).to_f64());
        let t = translation.data();
        Ok(Self::new(
            m,
            Vector3::new(t[0].to_f64(), t[1].to_f64(), t[2].to_f64()),
            scale,
        ))
    }

    /// `M⁻¹`, or `SingularMatrix` when `M` cannot be inverted.
    pub fn inverse_matrix(&self) -> Result<Matrix3<f64>> {
        self.matrix.try_inverse().ok_or_else(|| {
            warn!("rejecting singular transform matrix {:?}", self.matrix);
            ImageError::SingularMatrix
        })
    }

    /// Source coordinates `(x', y', z')` sampled for destination `(x, y, z)`.
    #[inline]
    pub fn source_coords(&self, inverse: &Matrix3<f64>, x: f64, y: f64, z: f64) -> [f64; 3] {
        let t = &self.translation;
        let p0 = Vector3::new(
            (z - t[0]) / self.scale,
            (x - t[1]) / self.scale,
            (y - t[2]) / self.scale,
        );
        let p1 = inverse * p0;
        [p1[1], p1[2], p1[0]]
    }
}

#[inline]
fn cut(v: f64, extent: usize) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, extent.saturating_sub(1) as f64)
    }
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

/// Trilinear sample of channel `c` at fractional `(fx, fy, fz)` with
/// Neumann (clamp-to-edge) boundaries.
///
/// Panics if `image` is empty or `c` is out of range.
pub fn linear_at_xyz<T: Scalar>(image: &Image<T>, fx: f64, fy: f64, fz: f64, c: usize) -> f64 {
    let (nfx, nfy, nfz) = (
        cut(fx, image.width()),
        cut(fy, image.height()),
        cut(fz, image.depth()),
    );
    let (x, y, z) = (nfx as usize, nfy as usize, nfz as usize);
    let (dx, dy, dz) = (nfx - x as f64, nfy - y as f64, nfz - z as f64);
    let nx = if dx > 0.0 { x + 1 } else { x };
    let ny = if dy > 0.0 { y + 1 } else { y };
    let nz = if dz > 0.0 { z + 1 } else { z };
    let at = |x: usize, y: usize, z: usize| image.get(x, y, z, c).to_f64();

    let near = lerp(
        lerp(at(x, y, z), at(nx, y, z), dx),
        lerp(at(x, ny, z), at(nx, ny, z), dx),
        dy,
    );
    let far = lerp(
        lerp(at(x, y, nz), at(nx, y, nz), dx),
        lerp(at(x, ny, nz), at(nx, ny, nz), dx),
        dy,
    );
    lerp(near, far, dz)
}

/// Fill slice `z` of channel 0.
fn resample_plane<T: Scalar>(
    src: &Image<T>,
    transform: &AffineTransform,
    inverse: &Matrix3<f64>,
    z: usize,
    plane: &mut [T],
) {
    let w = src.width();
    for (i, dst) in plane.iter_mut().enumerate() {
        let (x, y) = (i % w, i / w);
        let [sx, sy, sz] = transform.source_coords(inverse, x as f64, y as f64, z as f64);
        *dst = T::from_f64(linear_at_xyz(src, sx, sy, sz, 0));
    }
}

fn resample_sequential<T: Scalar>(
    src: &Image<T>,
    transform: &AffineTransform,
    inverse: &Matrix3<f64>,
    out: &mut [T],
    plane_len: usize,
) {
    for (z, plane) in out.chunks_mut(plane_len).enumerate() {
        resample_plane(src, transform, inverse, z, plane);
    }
}

#[cfg(feature = "parallel")]
fn resample_parallel<T: Scalar>(
    src: &Image<T>,
    transform: &AffineTransform,
    inverse: &Matrix3<f64>,
    out: &mut [T],
    plane_len: usize,
) {
    use rayon::prelude::*;

    out.par_chunks_mut(plane_len)
        .enumerate()
        .for_each(|(z, plane)| resample_plane(src, transform, inverse, z, plane));
}

#[cfg(not(feature = "parallel"))]
fn resample_parallel<T: Scalar>(
    src: &Image<T>,
    transform: &AffineTransform,
    inverse: &Matrix3<f64>,
    out: &mut [T],
    plane_len: usize,
) {
    resample_sequential(src, transform, inverse, out, plane_len)
}

/// Resample channel 0 of `src` under the inverse of `transform`; the result
/// has the same shape as `src` and carries the other channels over as they
/// are. `src` is never modified.
pub fn apply_geometric_transform<T: Scalar>(
    src: &Image<T>,
    transform: &AffineTransform,
) -> Result<Image<T>> {
    let inverse = transform.inverse_matrix()?;
    if transform.scale == 0.0 || !transform.scale.is_finite() {
        return Err(ImageError::shape(format!(
            "transform scale must be finite and non-zero, got {}",
            transform.scale
        )));
    }
    let [w, h, d, c] = src.dims();
    let mut out = src.data().to_vec();
    let plane_len = w * h;
    if plane_len > 0 && c > 0 {
        let first_channel = &mut out[..plane_len * d];
        let parallel = cfg!(feature = "parallel") && src.size() >= PARALLEL_MIN_SIZE;
        debug!(
            "apply_geometric_transform: {:?} {}, parallel={parallel}",
            src.dims(),
            T::KIND
        );
        if parallel {
            resample_parallel(src, transform, &inverse, first_channel, plane_len);
        } else {
            resample_sequential(src, transform, &inverse, first_channel, plane_len);
        }
    }
    Image::from_vec(w, h, d, c, out)
}

impl<T: Scalar> Image<T> {
    pub fn apply_geometric_transform(&self, transform: &AffineTransform) -> Result<Self> {
        apply_geometric_transform(self, transform)
    }

    /// Trilinear sample with clamped borders; see [`linear_at_xyz`].
    pub fn linear_at_xyz(&self, fx: f64, fy: f64, fz: f64, c: usize) -> f64 {
        linear_at_xyz(self, fx, fy, fz, c)
    }
}
