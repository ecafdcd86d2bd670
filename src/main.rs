use log::info;
use std::env;
use std::path::Path;
use std::time::Instant;
use voxel_image::config::transform::load_config;
use voxel_image::diagnostics::{
    elapsed_ms, BufferDescriptor, TimingBreakdown, TransformDescriptor, TransformReport,
};
use voxel_image::geometry::PARALLEL_MIN_SIZE;
use voxel_image::image::io::{load, save, save_container, write_json_file};
use voxel_image::image::ImageF32;

/// Extension that selects the native container instead of an image codec.
const CONTAINER_EXTENSION: &str = "vxi";

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = load_config(Path::new(&config_path))?;
    let transform = config.transform.to_affine();

    let total_start = Instant::now();
    let mut timings = TimingBreakdown::default();

    let source: ImageF32 = timings
        .time("load", || load(&config.input))
        .map_err(|e| e.to_string())?;
    let transformed = timings
        .time("transform", || source.apply_geometric_transform(&transform))
        .map_err(|e| e.to_string())?;

    let is_container = config
        .output
        .image
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(CONTAINER_EXTENSION));
    timings
        .time("save", || {
            if is_container {
                save_container(&transformed, &config.output.image)
            } else {
                save(&transformed, &config.output.image)
            }
        })
        .map_err(|e| e.to_string())?;

    if let Some(path) = &config.output.half_container {
        timings
            .time("save_float16", || transformed.save_float16(path))
            .map_err(|e| e.to_string())?;
    }
    timings.total_ms = elapsed_ms(total_start);

    info!(
        "transformed {} -> {} in {:.3} ms",
        config.input.display(),
        config.output.image.display(),
        timings.total_ms
    );
    println!(
        "Saved {}x{}x{} ({} channel(s)) to {}",
        transformed.width(),
        transformed.height(),
        transformed.depth(),
        transformed.channel(),
        config.output.image.display()
    );

    if let Some(path) = &config.output.report_json {
        let parallel = cfg!(feature = "parallel") && source.size() >= PARALLEL_MIN_SIZE;
        let report = TransformReport {
            input: BufferDescriptor::describe(&source),
            output: BufferDescriptor::describe(&transformed),
            transform: TransformDescriptor::new(&transform, parallel),
            timings,
        };
        write_json_file(path, &report)?;
        println!("Report written to {}", path.display());
    }
    Ok(())
}

fn usage() -> String {
    "Usage: voxel_transform <config.json>".to_string()
}
