use voxel_image::image::{Image, Scalar};

/// Single-slice, single-channel checkerboard alternating 32 and 220.
pub fn checkerboard_u8(width: usize, height: usize, cell: usize) -> Image<u8> {
    assert!(width > 0 && height > 0, "image dimensions must be positive");
    assert!(cell > 0, "cell size must be positive");

    let mut img = Image::new(width, height, 1, 1);
    for y in 0..height {
        for x in 0..width {
            let sum = x / cell + y / cell;
            let val = if sum & 1 == 0 { 32u8 } else { 220u8 };
            img.set(x, y, 0, 0, val);
        }
    }
    img
}

/// Buffer whose sample at storage offset `i` is `i` (cast to `T`).
pub fn ramp<T: Scalar>(width: usize, height: usize, depth: usize, channel: usize) -> Image<T> {
    let data = (0..width * height * depth * channel)
        .map(|i| T::from_f64(i as f64))
        .collect();
    Image::from_vec(width, height, depth, channel, data).unwrap()
}

/// Renders channel `c` of slice `z` as text: `#` for samples equal to `on`,
/// `.` otherwise. One string per row.
pub fn mask<T: Scalar>(img: &Image<T>, z: usize, c: usize, on: T) -> Vec<String> {
    (0..img.height())
        .map(|y| {
            (0..img.width())
                .map(|x| if img.get(x, y, z, c) == on { '#' } else { '.' })
                .collect()
        })
        .collect()
}
