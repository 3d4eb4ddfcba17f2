use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use dicom_core::{PrimitiveValue, Tag};
use nalgebra::Vector3;

use crate::curve::{self, RESAMPLE_STEP_VOXELS};
use crate::enums::{CurveDirection, FrameMode};
use crate::renderer::{self, CurveSnapshot, PanoramicImage, RenderParams};
use crate::volume::{Volume, Voxel};

/// Persistent state of one curved-MPR view.
///
/// Holds the volume handle, the curve control points in voxel coordinates,
/// the drawing plane's normal and the render parameters. Parameter setters
/// validate their input and bump the generation counter so stale rasters
/// can be recognized; the curve snapshot of the latest render is published
/// with a single reference swap for overlay drawing.
pub struct CurveAxis<T: Voxel> {
    volume: Arc<Volume<T>>,
    control_points: Vec<Vector3<f64>>,
    plane_normal: Vector3<f64>,
    params: RenderParams,
    base_tags: BTreeMap<Tag, PrimitiveValue>,
    generation: AtomicU64,
    snapshot: RwLock<Option<Arc<CurveSnapshot>>>,
    header_cache: Mutex<Option<(u64, BTreeMap<Tag, PrimitiveValue>)>>,
}

impl<T: Voxel> CurveAxis<T> {
    /// Create an axis with default parameters (40 mm width, step at the
    /// volume's finest spacing, 10 mm slab). The plane normal is normalized;
    /// pass it post-rotation if the volume has been rotated.
    pub fn new(
        volume: Arc<Volume<T>>,
        control_points: Vec<Vector3<f64>>,
        plane_normal: Vector3<f64>,
    ) -> Self {
        let params = RenderParams::for_volume(volume.as_ref());
        Self {
            volume,
            control_points,
            plane_normal: plane_normal.normalize(),
            params,
            base_tags: BTreeMap::new(),
            generation: AtomicU64::new(0),
            snapshot: RwLock::new(None),
            header_cache: Mutex::new(None),
        }
    }

    pub fn volume(&self) -> &Arc<Volume<T>> {
        &self.volume
    }

    pub fn control_points(&self) -> &[Vector3<f64>] {
        &self.control_points
    }

    pub fn plane_normal(&self) -> Vector3<f64> {
        self.plane_normal
    }

    pub fn params(&self) -> RenderParams {
        self.params
    }

    pub fn width_mm(&self) -> f64 {
        self.params.width_mm
    }

    pub fn step_mm(&self) -> f64 {
        self.params.step_mm
    }

    pub fn slab_mm(&self) -> f64 {
        self.params.slab_mm
    }

    /// Patient/study tags inherited into every rendered raster.
    pub fn set_base_tags(&mut self, base_tags: BTreeMap<Tag, PrimitiveValue>) {
        self.base_tags = base_tags;
        self.invalidate();
    }

    pub fn set_width_mm(&mut self, width_mm: f64) {
        if width_mm > 0.0 && self.params.width_mm != width_mm {
            self.params.width_mm = width_mm;
            self.invalidate();
        }
    }

    pub fn set_step_mm(&mut self, step_mm: f64) {
        if step_mm > 0.0 && self.params.step_mm != step_mm {
            self.params.step_mm = step_mm;
            self.invalidate();
        }
    }

    pub fn set_slab_mm(&mut self, slab_mm: f64) {
        if slab_mm > 0.0 && self.params.slab_mm != slab_mm {
            self.params.slab_mm = slab_mm;
            self.invalidate();
        }
    }

    pub fn set_direction(&mut self, direction: CurveDirection) {
        if self.params.direction != direction {
            self.params.direction = direction;
            self.invalidate();
        }
    }

    pub fn set_frame_mode(&mut self, frame_mode: FrameMode) {
        if self.params.frame_mode != frame_mode {
            self.params.frame_mode = frame_mode;
            self.invalidate();
        }
    }

    /// Generation counter; bumped by every parameter change.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Whether a raster rendered at `generation` is still current.
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation() == generation
    }

    fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        *lock(&self.header_cache) = None;
    }

    /// Total chord length of the control polyline in millimeters.
    pub fn total_arc_length_mm(&self) -> f64 {
        curve::total_length(&self.control_points) * self.volume.min_pixel_ratio()
    }

    /// Render the panoramic raster.
    ///
    /// Returns the image together with the generation it was rendered at;
    /// the caller discards the result when [`CurveAxis::is_current`] says a
    /// parameter change overtook it. `None` is the empty raster (fewer than
    /// two control points or zero arc length).
    pub fn render(&self) -> Option<(PanoramicImage<T>, u64)> {
        let generation = self.generation();
        let (image, snapshot) = renderer::render_with_snapshot(
            self.volume.as_ref(),
            &self.control_points,
            &self.plane_normal,
            &self.params,
            &self.base_tags,
        )?;

        *self.snapshot.write().unwrap_or_else(|poisoned| poisoned.into_inner()) =
            Some(Arc::new(snapshot));
        *lock(&self.header_cache) = Some((generation, image.tags().clone()));
        Some((image, generation))
    }

    /// Curve snapshot of the latest render, if any.
    pub fn last_snapshot(&self) -> Option<Arc<CurveSnapshot>> {
        self.snapshot
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Tag map describing the current output, built without sampling the
    /// volume and cached until the next parameter change.
    pub fn header(&self) -> Option<BTreeMap<Tag, PrimitiveValue>> {
        let generation = self.generation();
        {
            let cache = lock(&self.header_cache);
            if let Some((cached_generation, tags)) = cache.as_ref() {
                if *cached_generation == generation {
                    return Some(tags.clone());
                }
            }
        }

        let (columns, rows) = self.output_dimensions()?;
        let tags = crate::metadata::panoramic_tags::<T>(
            columns,
            rows,
            self.volume.min_pixel_ratio(),
            self.params.step_mm,
            &self.base_tags,
        );
        *lock(&self.header_cache) = Some((generation, tags.clone()));
        Some(tags)
    }

    /// Output raster dimensions implied by the current curve and parameters.
    pub fn output_dimensions(&self) -> Option<(usize, usize)> {
        if self.control_points.len() < 2 {
            return None;
        }
        let smoothed = curve::smooth_polyline(&self.control_points);
        let sampled = curve::resample_by_arc_length(&smoothed, RESAMPLE_STEP_VOXELS);
        if sampled.is_empty() {
            return None;
        }
        let rows = ((self.params.width_mm / self.volume.min_pixel_ratio()).round() as usize).max(1);
        Some((sampled.len(), rows))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
