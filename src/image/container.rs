//! Native container: a short ASCII header followed by raw little-endian samples.
//!
//! ```text
//! voxel_image <kind> little_endian\n
//! <width> <height> <depth> <channel>\n
//! <width*height*depth*channel samples in storage order>
//! ```
//!
//! Encoding is deterministic: equal buffers always produce identical bytes.
use super::buffer::{element_count, Image};
use super::scalar::{Scalar, ScalarKind};

pub const MAGIC: &str = "voxel_image";
const ENDIANNESS: &str = "little_endian";

/// Parsed container header plus the offset of the first sample byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    pub kind: ScalarKind,
    pub dims: [usize; 4],
    pub payload_offset: usize,
}

pub fn encode<T: Scalar>(image: &Image<T>) -> Vec<u8> {
    let [w, h, d, c] = image.dims();
    let header = format!("{MAGIC} {} {ENDIANNESS}\n{w} {h} {d} {c}\n", T::KIND);
    let size = T::KIND.size();
    let mut out = vec![0u8; header.len() + image.size() * size];
    out[..header.len()].copy_from_slice(header.as_bytes());
    for (chunk, &v) in out[header.len()..].chunks_exact_mut(size).zip(image.data()) {
        v.write_le(chunk);
    }
    out
}

fn next_line<'a>(bytes: &'a [u8], start: usize) -> Result<(&'a str, usize), String> {
    let rest = bytes.get(start..).unwrap_or_default();
    let end = rest
        .iter()
        .position(|&b| b == b'\n')
        .ok_or_else(|| "truncated header".to_string())?;
    let line = std::str::from_utf8(&rest[..end]).map_err(|_| "header is not ASCII".to_string())?;
    Ok((line, start + end + 1))
}

pub fn read_header(bytes: &[u8]) -> Result<Header, String> {
    let (first, pos) = next_line(bytes, 0)?;
    let fields: Vec<&str> = first.split_whitespace().collect();
    let [magic, kind, endian] = fields[..] else {
        return Err(format!("malformed header line {first:?}"));
    };
    if magic != MAGIC {
        return Err(format!("bad magic {magic:?}"));
    }
    if endian != ENDIANNESS {
        return Err(format!("unsupported byte order {endian:?}"));
    }
    let kind = ScalarKind::from_name(kind).ok_or_else(|| format!("unknown scalar type {kind:?}"))?;

    let (second, payload_offset) = next_line(bytes, pos)?;
    let parsed: Vec<usize> = second
        .split_whitespace()
        .map(str::parse)
        .collect::<Result<_, _>>()
        .map_err(|e| format!("bad dimension line {second:?}: {e}"))?;
    let dims: [usize; 4] = parsed
        .try_into()
        .map_err(|_| format!("expected four dimensions, got {second:?}"))?;
    Ok(Header {
        kind,
        dims,
        payload_offset,
    })
}

/// Decode a container holding samples of exactly type `T`.
pub fn decode<T: Scalar>(bytes: &[u8]) -> Result<Image<T>, String> {
    let header = read_header(bytes)?;
    if header.kind != T::KIND {
        return Err(format!(
            "container holds {} samples, expected {}",
            header.kind,
            T::KIND
        ));
    }
    let count = element_count(header.dims).map_err(|e| e.to_string())?;
    let size = T::KIND.size();
    let payload = &bytes[header.payload_offset..];
    if Some(payload.len()) != count.checked_mul(size) {
        return Err(format!(
            "payload has {} bytes, expected {count} samples of {size} bytes",
            payload.len()
        ));
    }
    let data = payload.chunks_exact(size).map(T::read_le).collect();
    let [w, h, d, c] = header.dims;
    Image::from_vec(w, h, d, c, data).map_err(|e| e.to_string())
}
