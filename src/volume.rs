use nalgebra::Vector3;
use ndarray::Array3;
use num_traits::Zero;
use thiserror::Error;

use crate::interpolator::Interpolator;

#[derive(Debug, Error)]
pub enum VolumeError {
    #[error("volume contains no voxels")]
    Empty,

    #[error("non-positive voxel ratio component: {0}")]
    InvalidVoxelRatio(f64),
}

/// Scalar type a volume can be made of.
///
/// Interpolation is always carried out in `f64`; `from_f64` casts back to
/// the native encoding for raster output (saturating, rounding for the
/// integer encodings). The two `u16` attributes describe the encoding the
/// DICOM way.
pub trait Voxel: Copy + PartialOrd + Zero + Send + Sync + 'static {
    fn to_f64(self) -> f64;
    fn from_f64(value: f64) -> Self;
    fn bits_allocated() -> u16;
    fn pixel_representation() -> u16;
}

macro_rules! impl_voxel_int {
    ($($t:ty => ($bits:expr, $repr:expr)),* $(,)?) => {$(
        impl Voxel for $t {
            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_f64(value: f64) -> Self {
                // `as` saturates, NaN becomes 0
                value.round() as $t
            }

            fn bits_allocated() -> u16 {
                $bits
            }

            fn pixel_representation() -> u16 {
                $repr
            }
        }
    )*};
}

macro_rules! impl_voxel_float {
    ($($t:ty => $bits:expr),* $(,)?) => {$(
        impl Voxel for $t {
            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_f64(value: f64) -> Self {
                value as $t
            }

            fn bits_allocated() -> u16 {
                $bits
            }

            fn pixel_representation() -> u16 {
                0
            }
        }
    )*};
}

impl_voxel_int!(
    u8 => (8, 0),
    i8 => (8, 1),
    u16 => (16, 0),
    i16 => (16, 1),
    u32 => (32, 0),
    i32 => (32, 1),
);

impl_voxel_float!(f32 => 32, f64 => 64);

/// A 3D scalar grid with anisotropic voxel spacing.
///
/// The backing array is indexed `[z, y, x]`. The voxel ratio gives the
/// physical size of one voxel step along (x, y, z) in millimeters. Global
/// minimum and maximum are scanned once at construction; the volume is
/// read-only afterwards and safe to share across views.
pub struct Volume<T: Voxel> {
    data: Array3<T>,
    voxel_ratio: Vector3<f64>,
    min: f64,
    max: f64,
}

impl<T: Voxel> Volume<T> {
    /// Wrap a voxel grid.
    ///
    /// # Errors
    ///
    /// Returns an error when the grid is empty or any voxel ratio component
    /// is not a positive finite number.
    pub fn new(data: Array3<T>, voxel_ratio: Vector3<f64>) -> Result<Self, VolumeError> {
        if data.is_empty() {
            return Err(VolumeError::Empty);
        }
        for ratio in voxel_ratio.iter() {
            if !(ratio.is_finite() && *ratio > 0.0) {
                return Err(VolumeError::InvalidVoxelRatio(*ratio));
            }
        }

        let (min, max) = data
            .iter()
            .map(|value| value.to_f64())
            .filter(|value| value.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), value| {
                (min.min(value), max.max(value))
            });

        Ok(Self {
            data,
            voxel_ratio,
            min,
            max,
        })
    }

    /// Grid size as (x, y, z) voxel counts.
    pub fn size(&self) -> (usize, usize, usize) {
        let (nz, ny, nx) = self.data.dim();
        (nx, ny, nz)
    }

    /// Voxel count along one axis (x = 0, y = 1, z = 2).
    pub fn size_along(&self, axis: usize) -> usize {
        let (nx, ny, nz) = self.size();
        [nx, ny, nz][axis]
    }

    pub fn data(&self) -> &Array3<T> {
        &self.data
    }

    pub fn voxel_ratio(&self) -> Vector3<f64> {
        self.voxel_ratio
    }

    /// Smallest voxel ratio component, the finest spacing of the grid in mm.
    pub fn min_pixel_ratio(&self) -> f64 {
        self.voxel_ratio.x.min(self.voxel_ratio.y).min(self.voxel_ratio.z)
    }

    /// Side of the logical square each orthogonal plane is presented in:
    /// the largest rendered extent `N_a * r_a` over the three axes.
    pub fn slice_size(&self) -> f64 {
        let (nx, ny, nz) = self.size();
        (nx as f64 * self.voxel_ratio.x)
            .max(ny as f64 * self.voxel_ratio.y)
            .max(nz as f64 * self.voxel_ratio.z)
    }

    pub fn minimum(&self) -> f64 {
        self.min
    }

    pub fn maximum(&self) -> f64 {
        self.max
    }

    /// Trilinearly interpolated value at real-valued voxel coordinates, or
    /// `None` when the interpolation cell leaves the grid.
    #[inline]
    pub fn sample(&self, x: f64, y: f64, z: f64) -> Option<f64> {
        Interpolator::trilinear(&self.data, x, y, z)
    }

    /// `sample` with a point argument, for callers walking a curve.
    #[inline]
    pub fn sample_point(&self, point: &Vector3<f64>) -> Option<f64> {
        self.sample(point.x, point.y, point.z)
    }
}
