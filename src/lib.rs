//! # DICOM curved-MPR library
//!
//! This crate implements the curved multi-planar reformation (CPR) engine
//! of a DICOM viewer: given a 3D volume (e.g. a CBCT scan) and a polyline
//! drawn in one of the three orthogonal viewing planes, it produces the
//! *straightened panoramic image* whose horizontal axis is arc length along
//! the curve and whose vertical axis runs orthogonal to the drawing plane,
//! each pixel a maximum-intensity projection across a thin slab
//! perpendicular to the curve.
//!
//! The pipeline:
//!  - convert the 2D polyline to voxel coordinates ([`coord`])
//!  - smooth it with a Catmull-Rom spline and resample it at uniform
//!    arc-length steps ([`curve`])
//!  - derive a consistent transverse frame along the curve ([`frame`])
//!  - sample the volume trilinearly, MIP across the slab, and emit the
//!    raster with its DICOM tag map ([`renderer`], [`metadata`])
//!
//! Volume loading, window/level display and viewer plumbing stay with the
//! caller; the engine only needs the voxel grid, the spacing and the curve.
//! Rendering is a pure function of its inputs and parallelizes across
//! output columns with rayon.
//!
//! # Examples
//!
//! Render a panoramic strip along a straight path through a synthetic
//! volume:
//!
//! ```
//! use dicom_cmpr::{render, Plane, RenderParams, Volume};
//! use nalgebra::Vector3;
//! use ndarray::Array3;
//!
//! let data = Array3::<u16>::from_elem((32, 32, 32), 400);
//! let volume = Volume::new(data, Vector3::new(0.5, 0.5, 0.5))
//!     .expect("valid grid and spacing");
//!
//! let controls = [Vector3::new(5.0, 5.0, 16.0), Vector3::new(25.0, 25.0, 16.0)];
//! let params = RenderParams::for_volume(&volume);
//! let image = render(&volume, &controls, &Plane::Axial.normal(), &params)
//!     .expect("curve has two distinct points");
//! assert_eq!(image.columns(), 29);
//! ```

pub mod axis;
pub mod coord;
pub mod curve;
pub mod enums;
pub mod frame;
mod interpolator;
pub mod metadata;
pub mod renderer;
pub mod volume;

pub use axis::CurveAxis;
pub use coord::{polyline_to_voxel, volume_coordinates_from_image};
pub use enums::{CurveDirection, FrameMode, Plane};
pub use renderer::{render, CurveSnapshot, PanoramicImage, RenderParams};
pub use volume::{Volume, VolumeError, Voxel};
