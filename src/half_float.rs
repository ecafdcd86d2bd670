//! Lossy half-precision storage for buffers of any scalar type.
//!
//! Samples are rounded to IEEE 754 binary16 (nearest, ties to even; values
//! beyond ±65504 become ±infinity) and stored with the native container.
//! Loading widens back to the requested type, so
//! `load_float16(save_float16(b)) == from_half(&to_half(&b))`.
use crate::error::Result;
use crate::image::{io, Image, Scalar};
use half::f16;
use log::debug;
use std::path::Path;

pub fn to_half<T: Scalar>(image: &Image<T>) -> Image<f16> {
    image.map_samples(T::to_f16)
}

pub fn from_half<T: Scalar>(image: &Image<f16>) -> Image<T> {
    image.map_samples(T::from_f16)
}

/// Round `image` to half precision and write it to `path`.
pub fn save_float16<T: Scalar>(image: &Image<T>, path: &Path) -> Result<()> {
    debug!(
        "save_float16 {}: {} {:?}",
        path.display(),
        T::KIND,
        image.dims()
    );
    io::save_container(&to_half(image), path)
}

/// Read a half-precision container and widen it to `T`.
pub fn load_float16<T: Scalar>(path: &Path) -> Result<Image<T>> {
    let half = io::load_container::<f16>(path)?;
    debug!("load_float16 {} -> {}", path.display(), T::KIND);
    Ok(from_half(&half))
}

impl<T: Scalar> Image<T> {
    pub fn save_float16(&self, path: &Path) -> Result<()> {
        save_float16(self, path)
    }

    pub fn load_float16(path: &Path) -> Result<Self> {
        load_float16(path)
    }
}
