//! C ABI over [`AnyImage`] handles.
//!
//! Every function returns `VXI_OK` or a negative status naming the error kind.
//! Handles produced here must be released with [`vxi_image_free`].
use crate::error::ImageError;
use crate::geometry::AffineTransform;
use crate::image::ScalarKind;
use crate::registry::AnyImage;
use log::debug;
use nalgebra::{Matrix3, Vector3};
use std::ffi::{c_char, CStr};
use std::path::Path;

pub const VXI_OK: i32 = 0;
pub const VXI_ERR_NULL: i32 = -1;
pub const VXI_ERR_SHAPE: i32 = -2;
pub const VXI_ERR_COLOR_ARITY: i32 = -3;
pub const VXI_ERR_SINGULAR: i32 = -4;
pub const VXI_ERR_IO: i32 = -5;
pub const VXI_ERR_CODEC: i32 = -6;

fn status(err: &ImageError) -> i32 {
    debug!("ffi call failed: {err}");
    match err {
        ImageError::Shape(_) => VXI_ERR_SHAPE,
        ImageError::ColorArity { .. } => VXI_ERR_COLOR_ARITY,
        ImageError::SingularMatrix => VXI_ERR_SINGULAR,
        ImageError::Io { .. } | ImageError::Format { .. } => VXI_ERR_IO,
        ImageError::Codec(_) => VXI_ERR_CODEC,
    }
}

/// Storage description filled by [`vxi_image_buffer_info`].
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct VxiBufferInfo {
    pub ptr: *mut u8,
    pub item_size: usize,
    pub ndim: usize,
    /// `(channel, depth, height, width)`
    pub shape: [usize; 4],
    /// Byte strides matching `shape`.
    pub strides: [usize; 4],
}

unsafe fn store_handle(out: *mut *mut AnyImage, image: AnyImage) {
    unsafe { *out = Box::into_raw(Box::new(image)) };
}

unsafe fn path_from<'a>(ptr: *const c_char) -> Option<&'a Path> {
    let s = unsafe { CStr::from_ptr(ptr) }.to_str().ok()?;
    Some(Path::new(s))
}

/// Copy a row-major host array of `ndim` axes into a new buffer.
///
/// # Safety
/// `shape_ptr` must point to `ndim` values (or may be null when `ndim` is 0),
/// `data_ptr` to `byte_len` bytes (or null when `byte_len` is 0), and `out`
/// must be writable.
#[no_mangle]
pub unsafe extern "C" fn vxi_image_from_array(
    kind: u32,
    shape_ptr: *const usize,
    ndim: usize,
    data_ptr: *const u8,
    byte_len: usize,
    out: *mut *mut AnyImage,
) -> i32 {
    if out.is_null() || (ndim > 0 && shape_ptr.is_null()) || (byte_len > 0 && data_ptr.is_null())
    {
        return VXI_ERR_NULL;
    }
    let Some(kind) = ScalarKind::from_code(kind) else {
        return VXI_ERR_SHAPE;
    };
    let shape: &[usize] = if ndim == 0 {
        &[]
    } else {
        unsafe { std::slice::from_raw_parts(shape_ptr, ndim) }
    };
    let bytes: &[u8] = if byte_len == 0 {
        &[]
    } else {
        unsafe { std::slice::from_raw_parts(data_ptr, byte_len) }
    };
    match AnyImage::from_bytes(kind, shape, bytes) {
        Ok(image) => {
            unsafe { store_handle(out, image) };
            VXI_OK
        }
        Err(err) => status(&err),
    }
}

/// New buffer of `kind` with no samples.
///
/// # Safety
/// `out` must be writable.
#[no_mangle]
pub unsafe extern "C" fn vxi_image_empty(kind: u32, out: *mut *mut AnyImage) -> i32 {
    if out.is_null() {
        return VXI_ERR_NULL;
    }
    let Some(kind) = ScalarKind::from_code(kind) else {
        return VXI_ERR_SHAPE;
    };
    match AnyImage::empty(kind) {
        Ok(image) => {
            unsafe { store_handle(out, image) };
            VXI_OK
        }
        Err(err) => status(&err),
    }
}

/// # Safety
/// `handle` must come from this module and not have been freed already.
#[no_mangle]
pub unsafe extern "C" fn vxi_image_free(handle: *mut AnyImage) {
    if !handle.is_null() {
        drop(unsafe { Box::from_raw(handle) });
    }
}

/// Write `[width, height, depth, channel]` to `out_dims`.
///
/// # Safety
/// `handle` must be live and `out_dims` must have room for 4 values.
#[no_mangle]
pub unsafe extern "C" fn vxi_image_dims(handle: *const AnyImage, out_dims: *mut usize) -> i32 {
    if handle.is_null() || out_dims.is_null() {
        return VXI_ERR_NULL;
    }
    let dims = unsafe { &*handle }.dims();
    let out = unsafe { std::slice::from_raw_parts_mut(out_dims, 4) };
    out.copy_from_slice(&dims);
    VXI_OK
}

/// Write the total sample count to `out_size`.
///
/// # Safety
/// `handle` must be live and `out_size` writable.
#[no_mangle]
pub unsafe extern "C" fn vxi_image_size(handle: *const AnyImage, out_size: *mut usize) -> i32 {
    if handle.is_null() || out_size.is_null() {
        return VXI_ERR_NULL;
    }
    unsafe { *out_size = (*handle).size() };
    VXI_OK
}

/// Write 1 to `out_equal` when both handles hold the same kind, dims and
/// samples, 0 otherwise.
///
/// # Safety
/// Both handles must be live and `out_equal` writable.
#[no_mangle]
pub unsafe extern "C" fn vxi_image_equal(
    a: *const AnyImage,
    b: *const AnyImage,
    out_equal: *mut i32,
) -> i32 {
    if a.is_null() || b.is_null() || out_equal.is_null() {
        return VXI_ERR_NULL;
    }
    let equal = unsafe { *a == *b };
    unsafe { *out_equal = i32::from(equal) };
    VXI_OK
}

/// Describe the handle's storage without copying. The pointer stays valid
/// until the handle is freed.
///
/// # Safety
/// `handle` must be live and `out` writable.
#[no_mangle]
pub unsafe extern "C" fn vxi_image_buffer_info(
    handle: *mut AnyImage,
    out: *mut VxiBufferInfo,
) -> i32 {
    if handle.is_null() || out.is_null() {
        return VXI_ERR_NULL;
    }
    let info = unsafe { &mut *handle }.raw_buffer_info();
    unsafe {
        *out = VxiBufferInfo {
            ptr: info.ptr,
            item_size: info.item_size,
            ndim: 4,
            shape: info.shape,
            strides: info.strides,
        }
    };
    VXI_OK
}

/// Resample through the inverse affine map. `matrix_ptr` holds 9 row-major
/// values, `translation_ptr` 3 values in `(z, x, y)` order.
///
/// # Safety
/// All pointers must be valid for the documented lengths.
#[no_mangle]
pub unsafe extern "C" fn vxi_image_transform(
    handle: *const AnyImage,
    matrix_ptr: *const f64,
    translation_ptr: *const f64,
    scale: f64,
    out: *mut *mut AnyImage,
) -> i32 {
    if handle.is_null() || matrix_ptr.is_null() || translation_ptr.is_null() || out.is_null() {
        return VXI_ERR_NULL;
    }
    let m = unsafe { std::slice::from_raw_parts(matrix_ptr, 9) };
    let t = unsafe { std::slice::from_raw_parts(translation_ptr, 3) };
    let transform = AffineTransform::new(
        Matrix3::from_row_slice(m),
        Vector3::from_column_slice(t),
        scale,
    );
    match unsafe { &*handle }.apply_geometric_transform(&transform) {
        Ok(image) => {
            unsafe { store_handle(out, image) };
            VXI_OK
        }
        Err(err) => status(&err),
    }
}

/// # Safety
/// `handle` must be live and `path` a NUL-terminated UTF-8 string.
#[no_mangle]
pub unsafe extern "C" fn vxi_image_save_float16(
    handle: *const AnyImage,
    path: *const c_char,
) -> i32 {
    if handle.is_null() || path.is_null() {
        return VXI_ERR_NULL;
    }
    let Some(path) = (unsafe { path_from(path) }) else {
        return VXI_ERR_IO;
    };
    match unsafe { &*handle }.save_float16(path) {
        Ok(()) => VXI_OK,
        Err(err) => status(&err),
    }
}

/// # Safety
/// `path` must be a NUL-terminated UTF-8 string and `out` writable.
#[no_mangle]
pub unsafe extern "C" fn vxi_image_load_float16(
    kind: u32,
    path: *const c_char,
    out: *mut *mut AnyImage,
) -> i32 {
    if path.is_null() || out.is_null() {
        return VXI_ERR_NULL;
    }
    let Some(kind) = ScalarKind::from_code(kind) else {
        return VXI_ERR_SHAPE;
    };
    let Some(path) = (unsafe { path_from(path) }) else {
        return VXI_ERR_IO;
    };
    match AnyImage::load_float16(kind, path) {
        Ok(image) => {
            unsafe { store_handle(out, image) };
            VXI_OK
        }
        Err(err) => status(&err),
    }
}

/// Encode a single-slice buffer with the image format named by the path's
/// extension.
///
/// # Safety
/// `handle` must be live and `path` a NUL-terminated UTF-8 string.
#[no_mangle]
pub unsafe extern "C" fn vxi_image_save(handle: *const AnyImage, path: *const c_char) -> i32 {
    if handle.is_null() || path.is_null() {
        return VXI_ERR_NULL;
    }
    let Some(path) = (unsafe { path_from(path) }) else {
        return VXI_ERR_IO;
    };
    match unsafe { &*handle }.save(path) {
        Ok(()) => VXI_OK,
        Err(err) => status(&err),
    }
}

/// # Safety
/// `path` must be a NUL-terminated UTF-8 string and `out` writable.
#[no_mangle]
pub unsafe extern "C" fn vxi_image_load(
    kind: u32,
    path: *const c_char,
    out: *mut *mut AnyImage,
) -> i32 {
    if path.is_null() || out.is_null() {
        return VXI_ERR_NULL;
    }
    let Some(kind) = ScalarKind::from_code(kind) else {
        return VXI_ERR_SHAPE;
    };
    let Some(path) = (unsafe { path_from(path) }) else {
        return VXI_ERR_IO;
    };
    match AnyImage::load(kind, path) {
        Ok(image) => {
            unsafe { store_handle(out, image) };
            VXI_OK
        }
        Err(err) => status(&err),
    }
}
