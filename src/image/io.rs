//! File I/O for buffers and JSON reports.
//!
//! - `load` / `save`: PNG, JPEG, BMP and TIFF through the `image` crate.
//! - `load_container` / `save_container`: the native container of any scalar type.
//! - `write_json_file`: pretty-print a serializable value to disk.
use super::buffer::Image;
use super::container;
use super::scalar::{Scalar, ScalarKind};
use crate::error::{ImageError, Result};
use image::{DynamicImage, ImageBuffer, ImageFormat, Luma, LumaA, Rgb, Rgba};
use log::debug;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

fn map_image_error(path: &Path, err: image::ImageError) -> ImageError {
    match err {
        image::ImageError::IoError(source) => ImageError::io(path, source),
        image::ImageError::Decoding(e) => ImageError::format(path, e.to_string()),
        image::ImageError::Unsupported(e) => ImageError::format(path, e.to_string()),
        other => ImageError::Codec(format!("{}: {other}", path.display())),
    }
}

/// Load a 2-D image file into a single-slice buffer, one channel per color
/// component. Samples are converted with `Scalar::from_f64`.
pub fn load<T: Scalar>(path: &Path) -> Result<Image<T>> {
    let img = image::open(path).map_err(|e| map_image_error(path, e))?;
    let (w, h) = (img.width() as usize, img.height() as usize);
    let channels = img.color().channel_count() as usize;
    let high_depth = img.color().bytes_per_pixel() as usize > channels;
    debug!(
        "load {}: {w}x{h}, {channels} channel(s), high_depth={high_depth}",
        path.display()
    );
    let out = match (channels, high_depth) {
        (1, false) => planar_from_interleaved(w, h, 1, img.into_luma8().as_raw()),
        (2, false) => planar_from_interleaved(w, h, 2, img.into_luma_alpha8().as_raw()),
        (3, false) => planar_from_interleaved(w, h, 3, img.into_rgb8().as_raw()),
        (4, false) => planar_from_interleaved(w, h, 4, img.into_rgba8().as_raw()),
        (1, true) => planar_from_interleaved(w, h, 1, img.into_luma16().as_raw()),
        (2, true) => planar_from_interleaved(w, h, 2, img.into_luma_alpha16().as_raw()),
        (3, true) => planar_from_interleaved(w, h, 3, img.into_rgb16().as_raw()),
        _ => planar_from_interleaved(w, h, 4, img.into_rgba16().as_raw()),
    };
    Ok(out)
}

fn planar_from_interleaved<S, T>(w: usize, h: usize, channels: usize, raw: &[S]) -> Image<T>
where
    S: Copy + Into<f64>,
    T: Scalar,
{
    let mut out = Image::new(w, h, 1, channels);
    for (i, px) in raw.chunks_exact(channels).enumerate() {
        let (x, y) = (i % w, i / w);
        for (c, &v) in px.iter().enumerate() {
            out.set(x, y, 0, c, T::from_f64(v.into()));
        }
    }
    out
}

fn interleave<T: Scalar, S>(image: &Image<T>, cast: impl Fn(f64) -> S) -> Vec<S> {
    let (w, h, ch) = (image.width(), image.height(), image.channel());
    let mut out = Vec::with_capacity(w * h * ch);
    for y in 0..h {
        for x in 0..w {
            for c in 0..ch {
                out.push(cast(image.get(x, y, 0, c).to_f64()));
            }
        }
    }
    out
}

fn to_dynamic<T: Scalar>(image: &Image<T>, sixteen_bit: bool) -> Option<DynamicImage> {
    let (w, h) = (image.width() as u32, image.height() as u32);
    if sixteen_bit {
        let raw = interleave(image, |v| v.round().clamp(0.0, 65535.0) as u16);
        return match image.channel() {
            1 => ImageBuffer::<Luma<u16>, _>::from_raw(w, h, raw).map(DynamicImage::ImageLuma16),
            2 => ImageBuffer::<LumaA<u16>, _>::from_raw(w, h, raw).map(DynamicImage::ImageLumaA16),
            3 => ImageBuffer::<Rgb<u16>, _>::from_raw(w, h, raw).map(DynamicImage::ImageRgb16),
            _ => ImageBuffer::<Rgba<u16>, _>::from_raw(w, h, raw).map(DynamicImage::ImageRgba16),
        };
    }
    let raw = interleave(image, |v| v.round().clamp(0.0, 255.0) as u8);
    match image.channel() {
        1 => ImageBuffer::<Luma<u8>, _>::from_raw(w, h, raw).map(DynamicImage::ImageLuma8),
        2 => ImageBuffer::<LumaA<u8>, _>::from_raw(w, h, raw).map(DynamicImage::ImageLumaA8),
        3 => ImageBuffer::<Rgb<u8>, _>::from_raw(w, h, raw).map(DynamicImage::ImageRgb8),
        _ => ImageBuffer::<Rgba<u8>, _>::from_raw(w, h, raw).map(DynamicImage::ImageRgba8),
    }
}

/// Save a single-slice buffer with 1–4 channels; the format follows the file
/// extension. `uint16` buffers keep 16 bits in PNG and TIFF, everything else
/// is rounded and clamped to 8 bits.
pub fn save<T: Scalar>(image: &Image<T>, path: &Path) -> Result<()> {
    if image.is_empty() || image.depth() != 1 || !(1..=4).contains(&image.channel()) {
        return Err(ImageError::shape(format!(
            "cannot encode a {:?} buffer as a 2-D image",
            image.dims()
        )));
    }
    let format = ImageFormat::from_path(path).map_err(|e| map_image_error(path, e))?;
    let sixteen_bit =
        T::KIND == ScalarKind::Uint16 && matches!(format, ImageFormat::Png | ImageFormat::Tiff);
    ensure_parent_dir(path)?;
    let dynamic = to_dynamic(image, sixteen_bit)
        .ok_or_else(|| ImageError::Codec("failed to create image buffer".to_string()))?;
    debug!("save {} as {format:?} (16-bit: {sixteen_bit})", path.display());
    dynamic
        .save_with_format(path, format)
        .map_err(|e| map_image_error(path, e))
}

/// Write `image` in the native container. The bytes go to a sibling
/// temporary first so a failure never leaves a partial file at `path`.
pub fn save_container<T: Scalar>(image: &Image<T>, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    let bytes = container::encode(image);
    debug!(
        "save_container {}: {} {:?} ({} bytes)",
        path.display(),
        T::KIND,
        image.dims(),
        bytes.len()
    );
    let tmp = partial_path(path);
    let written = fs::write(&tmp, &bytes).and_then(|()| fs::rename(&tmp, path));
    written.map_err(|e| {
        let _ = fs::remove_file(&tmp);
        ImageError::io(path, e)
    })
}

pub fn load_container<T: Scalar>(path: &Path) -> Result<Image<T>> {
    let bytes = fs::read(path).map_err(|e| ImageError::io(path, e))?;
    let image = container::decode(&bytes).map_err(|reason| ImageError::format(path, reason))?;
    debug!("load_container {}: {:?}", path.display(), image.dims());
    Ok(image)
}

/// Scalar kind stored in a container file, read from its header only.
pub fn container_kind(path: &Path) -> Result<ScalarKind> {
    let bytes = fs::read(path).map_err(|e| ImageError::io(path, e))?;
    container::read_header(&bytes)
        .map(|h| h.kind)
        .map_err(|reason| ImageError::format(path, reason))
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    ensure_parent_dir(path).map_err(|e| e.to_string())?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize JSON for {}: {e}", path.display()))?;
    fs::write(path, json).map_err(|e| format!("Failed to write JSON {}: {e}", path.display()))
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    path.with_file_name(name)
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| ImageError::io(parent, e))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageView;

    #[test]
    fn partial_path_is_a_sibling() {
        let p = partial_path(Path::new("out/volume.vxi"));
        assert_eq!(p, Path::new("out/volume.vxi.partial"));
    }

    #[test]
    fn interleave_orders_channels_per_pixel() {
        let img = Image::from_vec(2, 1, 1, 3, vec![1u8, 2, 10, 20, 100, 200]).unwrap();
        assert_eq!(interleave(&img, |v| v as u8), vec![1, 10, 100, 2, 20, 200]);
        assert_eq!(img.rows().count(), 3);
    }

    #[test]
    fn planar_conversion_inverts_interleave() {
        let raw = [1u8, 10, 100, 2, 20, 200];
        let img: Image<u8> = planar_from_interleaved(2, 1, 3, &raw);
        assert_eq!(img.data(), &[1, 2, 10, 20, 100, 200]);
    }
}
