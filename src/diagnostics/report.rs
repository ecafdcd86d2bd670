use super::timing::TimingBreakdown;
use crate::geometry::AffineTransform;
use crate::image::{Image, Scalar, ScalarKind};
use serde::Serialize;

/// Shape and element type of a buffer entering or leaving a tool.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferDescriptor {
    pub width: usize,
    pub height: usize,
    pub depth: usize,
    pub channel: usize,
    pub kind: ScalarKind,
    /// `[min, max]` over non-NaN samples; absent for empty buffers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
}

impl BufferDescriptor {
    pub fn describe<T: Scalar>(image: &Image<T>) -> Self {
        let [width, height, depth, channel] = image.dims();
        Self {
            width,
            height,
            depth,
            channel,
            kind: T::KIND,
            range: image
                .min_max()
                .map(|(lo, hi)| [lo.to_f64(), hi.to_f64()]),
        }
    }
}

/// Transform parameters as they were applied.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformDescriptor {
    /// Row-major forward matrix.
    pub matrix: [f64; 9],
    /// `(z, x, y)` order.
    pub translation: [f64; 3],
    pub scale: f64,
    pub parallel: bool,
}

impl TransformDescriptor {
    pub fn new(transform: &AffineTransform, parallel: bool) -> Self {
        let m = &transform.matrix;
        let t = &transform.translation;
        Self {
            matrix: std::array::from_fn(|i| m[(i / 3, i % 3)]),
            translation: [t[0], t[1], t[2]],
            scale: transform.scale,
            parallel,
        }
    }
}

/// Summary written by `voxel_transform` when a report path is configured.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformReport {
    pub input: BufferDescriptor,
    pub output: BufferDescriptor,
    pub transform: TransformDescriptor,
    pub timings: TimingBreakdown,
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Matrix3, Vector3};

    #[test]
    fn descriptor_reports_range_and_kind() {
        let img = Image::<u16>::from_vec(2, 1, 1, 1, vec![9, 3]).unwrap();
        let d = BufferDescriptor::describe(&img);
        assert_eq!((d.width, d.height, d.depth, d.channel), (2, 1, 1, 1));
        assert_eq!(d.kind, ScalarKind::Uint16);
        assert_eq!(d.range, Some([3.0, 9.0]));
        assert_eq!(BufferDescriptor::describe(&Image::<u8>::empty()).range, None);
    }

    #[test]
    fn transform_descriptor_flattens_row_major() {
        let t = AffineTransform::new(
            Matrix3::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 10.0),
            Vector3::new(0.5, 1.0, 1.5),
            2.0,
        );
        let d = TransformDescriptor::new(&t, false);
        assert_eq!(d.matrix, [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 10.0]);
        assert_eq!(d.translation, [0.5, 1.0, 1.5]);
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["scale"], 2.0);
    }
}
