use std::collections::BTreeMap;

use dicom_core::{PrimitiveValue, Tag};
use image::{ImageBuffer, Luma};
use nalgebra::Vector3;
use ndarray::Array2;
use num_traits::Zero;
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::curve::{self, RESAMPLE_STEP_VOXELS};
use crate::enums::{CurveDirection, FrameMode};
use crate::frame;
use crate::metadata;
use crate::volume::{Volume, Voxel};

/// User-controllable rendering parameters.
///
/// All three extents are millimeters and must be positive. `step_mm` only
/// enters the output PixelSpacing metadata; the curve itself is always
/// resampled at 1-voxel steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderParams {
    pub width_mm: f64,
    pub step_mm: f64,
    pub slab_mm: f64,
    pub direction: CurveDirection,
    pub frame_mode: FrameMode,
}

impl RenderParams {
    /// Defaults for a volume: 40 mm output height, metadata step at the
    /// volume's finest spacing, a 10 mm MIP slab.
    pub fn for_volume<T: Voxel>(volume: &Volume<T>) -> Self {
        Self {
            width_mm: 40.0,
            step_mm: volume.min_pixel_ratio(),
            slab_mm: 10.0,
            direction: CurveDirection::default(),
            frame_mode: FrameMode::default(),
        }
    }

    fn is_valid(&self) -> bool {
        self.width_mm > 0.0 && self.step_mm > 0.0 && self.slab_mm > 0.0
    }
}

/// Curve state of the last render, published for overlay drawing.
#[derive(Debug, Clone)]
pub struct CurveSnapshot {
    pub control_points: Vec<Vector3<f64>>,
    pub smoothed_points: Vec<Vector3<f64>>,
    pub sampled_points: Vec<Vector3<f64>>,
    pub perpendiculars: Vec<Vector3<f64>>,
    pub slab_mm: f64,
}

/// The straightened panoramic raster with its DICOM-ish tag map.
///
/// Pixels are row-major `(rows, columns)` in the volume's native encoding;
/// the horizontal axis is arc length along the curve, the vertical axis the
/// dimension orthogonal to the drawing plane.
pub struct PanoramicImage<T: Voxel> {
    pixels: Array2<T>,
    tags: BTreeMap<Tag, PrimitiveValue>,
}

impl<T: Voxel> PanoramicImage<T> {
    pub fn rows(&self) -> usize {
        self.pixels.nrows()
    }

    pub fn columns(&self) -> usize {
        self.pixels.ncols()
    }

    pub fn pixels(&self) -> &Array2<T> {
        &self.pixels
    }

    pub fn tags(&self) -> &BTreeMap<Tag, PrimitiveValue> {
        &self.tags
    }

    /// 8-bit grayscale preview, min/max normalized over the raster.
    pub fn to_luma8(&self) -> Option<ImageBuffer<Luma<u8>, Vec<u8>>> {
        let (min, max) = self
            .pixels
            .iter()
            .map(|value| value.to_f64())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), value| {
                (min.min(value), max.max(value))
            });
        let range = if max > min { max - min } else { 1.0 };

        let pixel_data: Vec<u8> = self
            .pixels
            .iter()
            .map(|value| (((value.to_f64() - min) / range) * 255.0).clamp(0.0, 255.0) as u8)
            .collect();
        ImageBuffer::from_raw(self.columns() as u32, self.rows() as u32, pixel_data)
    }
}

/// Index of the axis a direction mostly runs along.
fn dominant_axis(direction: &Vector3<f64>) -> usize {
    let abs = direction.abs();
    if abs.x >= abs.y && abs.x >= abs.z {
        0
    } else if abs.y >= abs.z {
        1
    } else {
        2
    }
}

/// Render the panoramic image for a curve, returning the raster together
/// with the curve snapshot that produced it.
///
/// Returns `None` for fewer than 2 control points, zero arc length, a
/// degenerate plane normal, or non-positive parameters. Individual
/// out-of-range samples only leave background pixels behind.
pub fn render_with_snapshot<T: Voxel>(
    volume: &Volume<T>,
    control_points: &[Vector3<f64>],
    plane_normal: &Vector3<f64>,
    params: &RenderParams,
    base_tags: &BTreeMap<Tag, PrimitiveValue>,
) -> Option<(PanoramicImage<T>, CurveSnapshot)> {
    if control_points.len() < 2 || !params.is_valid() {
        return None;
    }
    let normal_sq = plane_normal.norm_squared();
    if !normal_sq.is_finite() || normal_sq < 1e-12 {
        return None;
    }
    let normal = plane_normal.normalize();

    let smoothed = curve::smooth_polyline(control_points);
    let mut sampled = curve::resample_by_arc_length(&smoothed, RESAMPLE_STEP_VOXELS);
    if sampled.is_empty() {
        return None;
    }
    if params.direction == CurveDirection::Reversed {
        sampled.reverse();
    }

    let pixel_mm = volume.min_pixel_ratio();
    let ratio = volume.voxel_ratio();
    let columns = sampled.len();
    let rows = ((params.width_mm / pixel_mm).round() as usize).max(1);
    let slab_samples = ((params.slab_mm / pixel_mm).round() as usize).max(1);

    // slab directions, and per-sample vertical directions when the frame
    // leaves the drawing plane
    let (slab_dirs, verticals) = match params.frame_mode {
        FrameMode::InPlane => (frame::in_plane_perpendiculars(&sampled, &normal), None),
        FrameMode::ParallelTransport => {
            let (normals, binormals) = frame::parallel_transport_frames(&sampled, &normal);
            (normals, Some(binormals))
        }
    };

    log::info!(
        "panoramic render: {} control points -> {}x{} px, slab {} mm ({} samples)",
        control_points.len(),
        columns,
        rows,
        params.slab_mm,
        slab_samples
    );

    let half_rows = rows as f64 / 2.0;
    let half_slab = (slab_samples / 2) as isize;

    let rendered: Vec<Vec<T>> = (0..columns)
        .into_par_iter()
        .map(|i| {
            let slab_dir = slab_dirs[i];
            let vertical = verticals.as_ref().map_or(normal, |b| b[i]);
            let r_axis = ratio[dominant_axis(&vertical)];

            let mut column = vec![T::zero(); rows];
            for (j, cell) in column.iter_mut().enumerate() {
                let base = sampled[i] + vertical * ((j as f64 - half_rows) / r_axis);
                let mut peak = f64::NEG_INFINITY;
                for k in 0..slab_samples {
                    let offset = (k as isize - half_slab) as f64;
                    let sample = volume.sample_point(&(base + slab_dir * offset));
                    if let Some(value) = sample {
                        if value > peak {
                            peak = value;
                        }
                    }
                }
                if peak > f64::NEG_INFINITY {
                    *cell = T::from_f64(peak);
                }
            }
            column
        })
        .collect();

    let mut pixels = Array2::<T>::zeros((rows, columns));
    for (i, column) in rendered.iter().enumerate() {
        for (j, value) in column.iter().enumerate() {
            pixels[[j, i]] = *value;
        }
    }

    let tags = metadata::panoramic_tags::<T>(columns, rows, pixel_mm, params.step_mm, base_tags);
    let snapshot = CurveSnapshot {
        control_points: control_points.to_vec(),
        smoothed_points: smoothed,
        sampled_points: sampled,
        perpendiculars: slab_dirs,
        slab_mm: params.slab_mm,
    };

    Some((PanoramicImage { pixels, tags }, snapshot))
}

/// Render the panoramic image for a curve.
///
/// The stateless entry point: hand in the volume, the control points in
/// voxel coordinates, the drawing plane's normal (after any rotation the
/// caller applied) and the parameters. `None` stands for the empty raster.
pub fn render<T: Voxel>(
    volume: &Volume<T>,
    control_points: &[Vector3<f64>],
    plane_normal: &Vector3<f64>,
    params: &RenderParams,
) -> Option<PanoramicImage<T>> {
    render_with_snapshot(volume, control_points, plane_normal, params, &BTreeMap::new())
        .map(|(image, _)| image)
}
