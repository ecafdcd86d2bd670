mod common;

use common::init_logging;
use common::synthetic_image::{checkerboard_u8, ramp};
use nalgebra::{Matrix3, Vector3};
use voxel_image::geometry::PARALLEL_MIN_SIZE;
use voxel_image::marshal::{from_array, HostArray};
use voxel_image::{AffineTransform, Image, ImageError};

fn scaled(scale: f64) -> AffineTransform {
    AffineTransform::new(Matrix3::identity(), Vector3::zeros(), scale)
}

#[test]
fn identity_reproduces_the_source() {
    init_logging();
    let src = ramp::<f32>(5, 4, 3, 2);
    let out = src
        .apply_geometric_transform(&AffineTransform::identity())
        .unwrap();
    assert_eq!(out, src);

    let board = checkerboard_u8(16, 12, 4);
    assert_eq!(
        board
            .apply_geometric_transform(&AffineTransform::identity())
            .unwrap(),
        board
    );
}

#[test]
fn zero_matrix_is_singular() {
    let src = ramp::<f32>(3, 3, 1, 1);
    let zero = AffineTransform::new(Matrix3::zeros(), Vector3::zeros(), 1.0);
    let err = src.apply_geometric_transform(&zero).unwrap_err();
    assert!(matches!(err, ImageError::SingularMatrix));

    let rank_two = AffineTransform::new(
        Matrix3::new(1.0, 2.0, 3.0, 2.0, 4.0, 6.0, 0.0, 0.0, 1.0),
        Vector3::zeros(),
        1.0,
    );
    assert!(matches!(
        src.apply_geometric_transform(&rank_two),
        Err(ImageError::SingularMatrix)
    ));
}

#[test]
fn upscaling_a_two_by_two_interpolates() {
    let host = [1.0f32, 2.0, 3.0, 4.0];
    let src = from_array(HostArray::new(&[2, 2], &host)).unwrap();
    let out = src.apply_geometric_transform(&scaled(2.0)).unwrap();
    assert_eq!(out.dims(), [2, 2, 1, 1]);
    assert_eq!(out.get(0, 0, 0, 0), 1.0);
    assert_eq!(out.get(1, 0, 0, 0), 1.5);
    assert_eq!(out.get(0, 1, 0, 0), 2.0);
    assert_eq!(out.get(1, 1, 0, 0), 2.5);
}

#[test]
fn translation_is_given_in_zxy_order() {
    let src = Image::from_vec(4, 1, 1, 1, vec![10.0f64, 20.0, 30.0, 40.0]).unwrap();
    // Shift by one along x; the left border is clamped.
    let shift_x = AffineTransform::new(Matrix3::identity(), Vector3::new(0.0, 1.0, 0.0), 1.0);
    let out = src.apply_geometric_transform(&shift_x).unwrap();
    assert_eq!(out.data(), &[10.0, 10.0, 20.0, 30.0]);

    // A z translation on a single slice only clamps back onto it.
    let shift_z = AffineTransform::new(Matrix3::identity(), Vector3::new(3.0, 0.0, 0.0), 1.0);
    assert_eq!(src.apply_geometric_transform(&shift_z).unwrap(), src);
}

#[test]
fn swapping_x_and_y_transposes() {
    let src = ramp::<f32>(3, 3, 1, 1);
    // Rows and columns of the (z, x, y) frame: exchange x and y.
    let swap = AffineTransform::new(
        Matrix3::new(1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0),
        Vector3::zeros(),
        1.0,
    );
    let out = src.apply_geometric_transform(&swap).unwrap();
    for y in 0..3 {
        for x in 0..3 {
            assert_eq!(out.get(x, y, 0, 0), src.get(y, x, 0, 0));
        }
    }
}

#[test]
fn only_the_first_channel_is_resampled() {
    let mut src = Image::<f32>::new(4, 4, 1, 2);
    for y in 0..4 {
        for x in 0..4 {
            let v = (x + 4 * y) as f32;
            src.set(x, y, 0, 0, v);
            src.set(x, y, 0, 1, 10.0 * v);
        }
    }
    let out = src.apply_geometric_transform(&scaled(2.0)).unwrap();
    // Sample at (0.5, 0.5) of channel 0.
    assert_eq!(out.get(1, 1, 0, 0), 2.5);
    assert_eq!(out.plane(0, 1), src.plane(0, 1));
}

#[test]
fn extra_channels_survive_a_shift() {
    let src = Image::from_vec(2, 1, 1, 2, vec![1.0f32, 3.0, 5.0, 9.0]).unwrap();
    let shift_x = AffineTransform::new(Matrix3::identity(), Vector3::new(0.0, 1.0, 0.0), 1.0);
    let out = src.apply_geometric_transform(&shift_x).unwrap();
    assert_eq!(out.data(), &[1.0, 1.0, 5.0, 9.0]);
}

#[test]
fn negated_x_and_z_collapse_onto_the_first_column() {
    let host = [0i32, 1, 1, 1, 0, 1, 1, 1];
    let src = from_array(HostArray::new(&[2, 2, 2], &host)).unwrap();
    let flip = AffineTransform::new(
        Matrix3::new(-1.0, 0.0, 0.0, 0.0, -1.0, 0.0, 0.0, 0.0, 1.0),
        Vector3::zeros(),
        1.0,
    );
    let out = src.apply_geometric_transform(&flip).unwrap();
    assert_eq!(out.dims(), [2, 2, 2, 1]);
    assert_eq!(out.data(), &[0, 0, 1, 1, 0, 0, 1, 1]);
}

#[test]
fn downscaling_volumes_samples_across_slices() {
    let src = ramp::<f64>(2, 2, 4, 1);
    let out = src.apply_geometric_transform(&scaled(0.5)).unwrap();
    // Destination z maps to source z * 2, clamped to the last slice.
    assert_eq!(out.get(0, 0, 1, 0), src.get(0, 0, 2, 0));
    assert_eq!(out.get(0, 0, 3, 0), src.get(0, 0, 3, 0));
    assert_eq!(out.get(1, 0, 0, 0), src.get(1, 0, 0, 0));
}

#[test]
fn integer_buffers_truncate_interpolated_values() {
    let src = Image::from_vec(2, 1, 1, 1, vec![0u8, 3]).unwrap();
    let out = src.apply_geometric_transform(&scaled(2.0)).unwrap();
    // Sample at x = 0.5 gives 1.5.
    assert_eq!(out.data(), &[0, 1]);
}

#[test]
fn large_buffers_match_small_kernel_results() {
    init_logging();
    let src = ramp::<f32>(32, 32, 2, 2);
    assert!(src.size() >= PARALLEL_MIN_SIZE);
    let t = AffineTransform::new(
        Matrix3::new(1.0, 0.0, 0.0, 0.0, 0.8, -0.6, 0.0, 0.6, 0.8),
        Vector3::new(0.0, 2.5, -1.0),
        1.25,
    );
    let out = src.apply_geometric_transform(&t).unwrap();
    let inverse = t.inverse_matrix().unwrap();
    for &(x, y, z, c) in &[(0, 0, 0, 0), (5, 7, 1, 1), (31, 31, 1, 1), (16, 3, 0, 1)] {
        let expected = if c == 0 {
            let [sx, sy, sz] = t.source_coords(&inverse, x as f64, y as f64, z as f64);
            src.linear_at_xyz(sx, sy, sz, 0) as f32
        } else {
            src.get(x, y, z, c)
        };
        assert_eq!(out.get(x, y, z, c), expected);
    }
}

#[test]
fn invalid_scale_and_empty_input() {
    let src = ramp::<f32>(2, 2, 1, 1);
    assert!(matches!(
        src.apply_geometric_transform(&scaled(0.0)),
        Err(ImageError::Shape(_))
    ));
    assert!(matches!(
        src.apply_geometric_transform(&scaled(f64::NAN)),
        Err(ImageError::Shape(_))
    ));

    let empty = Image::<f32>::empty();
    assert_eq!(
        empty
            .apply_geometric_transform(&AffineTransform::identity())
            .unwrap(),
        empty
    );
}

#[test]
fn matrix_operands_from_buffers() {
    let m = Image::from_vec(3, 3, 1, 1, vec![1.0f32, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0])
        .unwrap();
    let t = Image::from_vec(3, 1, 1, 1, vec![0.0f32, 1.0, 0.0]).unwrap();
    let affine = AffineTransform::from_images(&m, &t, 1.0).unwrap();
    assert_eq!(affine.matrix, Matrix3::identity());
    assert_eq!(affine.translation, Vector3::new(0.0, 1.0, 0.0));

    let bad = Image::<f32>::new(2, 3, 1, 1);
    assert!(matches!(
        AffineTransform::from_images(&bad, &t, 1.0),
        Err(ImageError::Shape(_))
    ));
}
