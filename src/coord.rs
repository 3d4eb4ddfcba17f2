use nalgebra::Vector3;

use crate::enums::Plane;
use crate::volume::{Volume, Voxel};

/// Map a plane-image pixel coordinate to a 3D voxel coordinate.
///
/// Each orthogonal plane is presented centered in a logical square of side
/// [`Volume::slice_size`], so the in-plane axes carry a centering offset of
/// `(S - N_a * r_a) / 2` and an inverse voxel-ratio scaling. The coordinate
/// along the plane normal is taken from `center`, the crosshair position
/// normalized to `[0, 1]` per axis.
pub fn volume_coordinates_from_image<T: Voxel>(
    volume: &Volume<T>,
    plane: Plane,
    img_x: f64,
    img_y: f64,
    center: &Vector3<f64>,
) -> Vector3<f64> {
    let (nx, ny, nz) = volume.size();
    let ratio = volume.voxel_ratio();
    let slice_size = volume.slice_size();

    let offset_x = (slice_size - nx as f64 * ratio.x) / 2.0;
    let offset_y = (slice_size - ny as f64 * ratio.y) / 2.0;
    let offset_z = (slice_size - nz as f64 * ratio.z) / 2.0;

    match plane {
        // image X -> volume X, image Y -> volume Y, depth -> volume Z
        Plane::Axial => Vector3::new(
            (img_x - offset_x) / ratio.x,
            (img_y - offset_y) / ratio.y,
            center.z * nz as f64,
        ),
        // image X -> volume X, image Y -> volume Z, depth -> volume Y
        Plane::Coronal => Vector3::new(
            (img_x - offset_x) / ratio.x,
            center.y * ny as f64,
            (img_y - offset_z) / ratio.z,
        ),
        // image X -> volume Y, image Y -> volume Z, depth -> volume X
        Plane::Sagittal => Vector3::new(
            center.x * nx as f64,
            (img_x - offset_y) / ratio.y,
            (img_y - offset_z) / ratio.z,
        ),
    }
}

/// Convert a user-drawn polyline from plane-image pixels to voxel space.
///
/// Applies [`volume_coordinates_from_image`] to every vertex with the
/// crosshair depth current at drawing time.
pub fn polyline_to_voxel<T: Voxel>(
    volume: &Volume<T>,
    plane: Plane,
    polyline: &[(f64, f64)],
    center: &Vector3<f64>,
) -> Vec<Vector3<f64>> {
    polyline
        .iter()
        .map(|&(img_x, img_y)| volume_coordinates_from_image(volume, plane, img_x, img_y, center))
        .collect()
}
