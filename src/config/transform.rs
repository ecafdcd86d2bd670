use crate::geometry::AffineTransform;
use nalgebra::{Matrix3, Vector3};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct TransformToolConfig {
    #[serde(rename = "input")]
    pub input: PathBuf,
    #[serde(default)]
    pub transform: TransformConfig,
    pub output: TransformOutputConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Forward matrix, row-major.
    pub matrix: [f64; 9],
    /// Translation in `(z, x, y)` order.
    pub translation: [f64; 3],
    pub scale: f64,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            matrix: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
            translation: [0.0; 3],
            scale: 1.0,
        }
    }
}

impl TransformConfig {
    pub fn to_affine(&self) -> AffineTransform {
        AffineTransform::new(
            Matrix3::from_row_slice(&self.matrix),
            Vector3::from_column_slice(&self.translation),
            self.scale,
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct TransformOutputConfig {
    pub image: PathBuf,
    /// Optional half-precision container written next to the image.
    #[serde(default)]
    pub half_container: Option<PathBuf>,
    #[serde(default)]
    pub report_json: Option<PathBuf>,
}

pub fn load_config(path: &Path) -> Result<TransformToolConfig, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    parse_config(&data).map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}

fn parse_config(data: &str) -> Result<TransformToolConfig, serde_json::Error> {
    serde_json::from_str(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_transform_defaults_to_identity() {
        let cfg = parse_config(r#"{"input": "a.png", "output": {"image": "b.png"}}"#).unwrap();
        assert_eq!(cfg.input, PathBuf::from("a.png"));
        assert_eq!(cfg.transform.to_affine(), AffineTransform::identity());
        assert!(cfg.output.half_container.is_none());
        assert!(cfg.output.report_json.is_none());
    }

    #[test]
    fn matrix_is_read_row_major() {
        let cfg = parse_config(
            r#"{
                "input": "a.png",
                "transform": {"matrix": [1, 2, 3, 4, 5, 6, 7, 8, 9], "scale": 2.0},
                "output": {"image": "b.png", "report_json": "r.json"}
            }"#,
        )
        .unwrap();
        let affine = cfg.transform.to_affine();
        assert_eq!(affine.matrix[(0, 1)], 2.0);
        assert_eq!(affine.matrix[(1, 0)], 4.0);
        assert_eq!(affine.translation, Vector3::zeros());
        assert_eq!(affine.scale, 2.0);
        assert_eq!(cfg.output.report_json, Some(PathBuf::from("r.json")));
    }

    #[test]
    fn output_section_is_required() {
        assert!(parse_config(r#"{"input": "a.png"}"#).is_err());
    }
}
