//! Drawing-color precondition shared by every rasterization primitive.
use crate::error::{ImageError, Result};
use crate::image::{Image, Scalar};

/// Fails with [`ImageError::ColorArity`] unless `color` has exactly one
/// component per channel of `image`.
pub fn validate_color<T: Scalar>(color: &[T], image: &Image<T>) -> Result<()> {
    if color.len() != image.channel() {
        return Err(ImageError::ColorArity {
            expected: image.channel(),
            actual: color.len(),
        });
    }
    Ok(())
}
