use std::f64::consts::PI;
use std::sync::Arc;

use nalgebra::Vector3;
use ndarray::Array3;

use dicom_cmpr::{polyline_to_voxel, CurveAxis, Plane, Volume};

/// Synthesize a CBCT-like volume: soft-tissue background with a bright
/// dental arch (semi-circle of radius 20 around (32, 24)) between two
/// axial levels.
fn synthetic_arch_volume() -> Array3<u16> {
    let mut data = Array3::from_elem((64, 64, 64), 300_u16);
    for z in 24..40 {
        for y in 0..64_i64 {
            for x in 0..64_i64 {
                let dx = x as f64 - 32.0;
                let dy = y as f64 - 24.0;
                let radius = (dx * dx + dy * dy).sqrt();
                if dy >= 0.0 && (radius - 20.0).abs() < 1.5 {
                    data[[z, y as usize, x as usize]] = 3000;
                }
            }
        }
    }
    data
}

fn main() {
    env_logger::init();

    let volume = Arc::new(
        Volume::new(synthetic_arch_volume(), Vector3::new(0.5, 0.5, 0.5))
            .expect("synthetic volume is valid"),
    );

    // draw the arch in axial image pixels; slice size is 32 (64 * 0.5), so
    // canvas coordinates are half the voxel coordinates
    let polyline: Vec<(f64, f64)> = (0..=8)
        .map(|i| {
            let theta = PI * i as f64 / 8.0;
            (16.0 + 10.0 * theta.cos(), 12.0 + 10.0 * theta.sin())
        })
        .collect();
    let center = Vector3::new(0.5, 0.5, 0.5);
    let controls = polyline_to_voxel(volume.as_ref(), Plane::Axial, &polyline, &center);

    let mut axis = CurveAxis::new(volume, controls, Plane::Axial.normal());
    axis.set_width_mm(16.0);
    axis.set_slab_mm(8.0);

    let (image, generation) = axis.render().expect("arch polyline renders");
    log::info!(
        "rendered {}x{} panoramic at generation {generation}",
        image.columns(),
        image.rows()
    );

    let preview = image.to_luma8().expect("raster converts to preview");
    let _ = preview.save("panoramic.png");
}
