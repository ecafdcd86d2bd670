mod common;

use common::init_logging;
use common::synthetic_image::ramp;
use ndarray::Array3;
use voxel_image::marshal::{
    as_ndarray, as_ndarray_mut, from_array, from_ndarray, to_array, to_view, to_view_mut,
    HostArray,
};
use voxel_image::image::{ImageView, ImageViewMut};
use voxel_image::{Image, ImageError};

/// Host data `0, 1, 2, ...` for `shape`.
fn host_data(shape: &[usize]) -> Vec<f32> {
    (0..shape.iter().product::<usize>()).map(|i| i as f32).collect()
}

/// Row-major index of `idx` in a host array of `shape`.
fn host_index(shape: &[usize], idx: &[usize]) -> usize {
    shape.iter().zip(idx).fold(0, |acc, (&n, &i)| acc * n + i)
}

/// Every host element must be visible through the view at the same logical
/// position, with the host axes right-aligned onto `(c, z, y, x)`.
fn assert_view_matches_host(shape: &[usize]) {
    let data = host_data(shape);
    let img = from_array(HostArray::new(shape, &data)).unwrap();
    let view = to_view(&img);

    let mut full = [1usize; 4];
    full[4 - shape.len()..].copy_from_slice(shape);
    assert_eq!(view.shape(), full, "shape {shape:?}");

    for c in 0..full[0] {
        for z in 0..full[1] {
            for y in 0..full[2] {
                for x in 0..full[3] {
                    let all = [c, z, y, x];
                    let idx = &all[4 - shape.len()..];
                    assert_eq!(
                        view.get(c, z, y, x),
                        data[host_index(shape, idx)],
                        "shape {shape:?} at {all:?}"
                    );
                }
            }
        }
    }
}

#[test]
fn ranks_one_through_four_preserve_values() {
    init_logging();
    assert_view_matches_host(&[5]);
    assert_view_matches_host(&[3, 4]);
    assert_view_matches_host(&[2, 3, 4]);
    assert_view_matches_host(&[2, 2, 3, 2]);
}

#[test]
fn host_axes_are_reversed_onto_buffer_dims() {
    let data = host_data(&[2, 3, 4, 5]);
    assert_eq!(
        from_array(HostArray::new(&[7], &data[..7])).unwrap().dims(),
        [7, 1, 1, 1]
    );
    assert_eq!(
        from_array(HostArray::new(&[3, 4], &data[..12])).unwrap().dims(),
        [4, 3, 1, 1]
    );
    assert_eq!(
        from_array(HostArray::new(&[2, 3, 4], &data[..24])).unwrap().dims(),
        [4, 3, 2, 1]
    );
    assert_eq!(
        from_array(HostArray::new(&[2, 3, 4, 5], &data)).unwrap().dims(),
        [5, 4, 3, 2]
    );
}

#[test]
fn rank_zero_and_rank_five_are_rejected() {
    let scalar = [1.0f32];
    let err = from_array(HostArray::new(&[], &scalar)).unwrap_err();
    assert!(matches!(err, ImageError::Shape(_)));

    let data = host_data(&[1, 1, 1, 1, 2]);
    let err = from_array(HostArray::new(&[1, 1, 1, 1, 2], &data)).unwrap_err();
    assert!(matches!(err, ImageError::Shape(_)));
}

#[test]
fn element_count_must_match_shape() {
    let data = [1u8, 2, 3];
    let err = from_array(HostArray::new(&[2, 2], &data)).unwrap_err();
    assert!(matches!(err, ImageError::Shape(_)));
}

#[test]
fn byte_strides_follow_element_size() {
    let img = Image::<f64>::new(4, 3, 2, 2);
    let view = to_view(&img);
    assert_eq!(view.shape(), [2, 2, 3, 4]);
    assert_eq!(view.strides(), [192, 96, 32, 8]);
    assert_eq!(view.item_size(), 8);
    assert_eq!(view.format(), "d");
    assert_eq!(view.ndim(), 4);

    let img = Image::<u16>::new(4, 3, 2, 2);
    assert_eq!(to_view(&img).strides(), [48, 24, 8, 2]);
}

#[test]
fn view_shares_storage_with_buffer() {
    let mut img = ramp::<i32>(3, 2, 2, 1);
    let before = img.data().as_ptr();
    {
        let mut view = to_view_mut(&mut img);
        assert_eq!(view.as_mut_ptr() as *const i32, before);
        view.set(0, 1, 1, 2, -7);
    }
    assert_eq!(img.get(2, 1, 1, 0), -7);
    assert_eq!(to_view(&img).as_ptr(), before);
}

#[test]
fn mutable_view_writes_through_its_row_traits() {
    fn assert_send_sync<S: Send + Sync>(_: &S) {}

    let mut img = ramp::<u16>(2, 2, 1, 1);
    {
        let mut view = to_view_mut(&mut img);
        assert_send_sync(&view);
        view.row_mut(1, 0, 0)[0] = 99;
        view.as_mut_slice().unwrap()[0] = 7;
        assert_eq!(view.as_slice().unwrap().len(), 4);
        assert_eq!(view.row(1, 0, 0)[0], 99);
    }
    assert_eq!(img.get(0, 0, 0, 0), 7);
    assert_eq!(img.get(0, 1, 0, 0), 99);
}

#[test]
fn to_array_reports_full_shape() {
    let img = ramp::<u8>(3, 2, 1, 2);
    let (shape, data) = to_array(&img);
    assert_eq!(shape, vec![2, 1, 2, 3]);
    assert_eq!(data, img.data());

    let again = from_array(HostArray::new(&shape, &data)).unwrap();
    assert_eq!(again, img);
}

#[test]
fn ndarray_views_index_channel_first() {
    let mut img = ramp::<f32>(4, 3, 2, 1);
    {
        let arr = as_ndarray(&img).unwrap();
        assert_eq!(arr.shape(), &[1, 2, 3, 4]);
        assert_eq!(arr[[0, 1, 2, 3]], img.get(3, 2, 1, 0));
    }
    {
        let mut arr = as_ndarray_mut(&mut img).unwrap();
        arr[[0, 0, 1, 1]] = 100.0;
    }
    assert_eq!(img.get(1, 1, 0, 0), 100.0);
}

#[test]
fn from_ndarray_accepts_non_contiguous_views() {
    let arr = Array3::from_shape_fn((2, 3, 4), |(z, y, x)| (100 * z + 10 * y + x) as u16);
    let transposed = arr.view().reversed_axes();
    let img = from_ndarray(transposed).unwrap();
    // Logical shape (4, 3, 2): width 2, height 3, depth 4.
    assert_eq!(img.dims(), [2, 3, 4, 1]);
    assert_eq!(img.get(1, 2, 3, 0), arr[[1, 2, 3]]);
}

#[test]
fn dynamic_rank_ndarray_is_checked() {
    let ok = Array3::<u8>::zeros((1, 2, 3)).into_dyn();
    assert_eq!(from_ndarray(ok.view()).unwrap().dims(), [3, 2, 1, 1]);

    let too_deep = ndarray::ArrayD::<u8>::zeros(ndarray::IxDyn(&[1, 1, 1, 1, 1]));
    assert!(matches!(
        from_ndarray(too_deep.view()),
        Err(ImageError::Shape(_))
    ));
}
