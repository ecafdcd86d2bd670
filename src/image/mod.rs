pub mod buffer;
pub mod container;
pub mod io;
pub mod scalar;
pub mod traits;

pub use self::buffer::{Image, ImageF32, ImageF64, ImageU16, ImageU32, ImageU8};
pub use self::scalar::{Scalar, ScalarKind};
pub use self::traits::{ImageView, ImageViewMut, Rows, RowsMut};
