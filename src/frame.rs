use nalgebra::{Rotation3, Unit, Vector3};

const DEGENERATE_SQ: f64 = 1e-10;

/// Unit tangents by central differences, one-sided at the curve ends.
pub fn central_tangents(points: &[Vector3<f64>]) -> Vec<Vector3<f64>> {
    let n = points.len();
    if n < 2 {
        return vec![Vector3::x(); n];
    }

    let mut tangents = Vec::with_capacity(n);
    for i in 0..n {
        let difference = if i == 0 {
            points[1] - points[0]
        } else if i == n - 1 {
            points[n - 1] - points[n - 2]
        } else {
            points[i + 1] - points[i - 1]
        };
        let tangent = if difference.norm_squared() > DEGENERATE_SQ {
            difference.normalize()
        } else {
            // zero-length difference, reuse the previous direction
            tangents.last().copied().unwrap_or_else(Vector3::x)
        };
        tangents.push(tangent);
    }
    tangents
}

/// Per-sample perpendicular directions lying in the drawing plane.
///
/// `perp_i = plane_normal x tangent_i`, normalized, with three repairs: a
/// degenerate cross product falls back to the previous direction (or +X), a
/// sign flip against the predecessor is undone to keep the field continuous,
/// and the whole field is negated if the middle sample points toward the
/// curve centroid, so an arch-shaped curve always samples its convex side.
pub fn in_plane_perpendiculars(
    points: &[Vector3<f64>],
    plane_normal: &Vector3<f64>,
) -> Vec<Vector3<f64>> {
    let tangents = central_tangents(points);
    let mut perpendiculars: Vec<Vector3<f64>> = Vec::with_capacity(points.len());

    for tangent in &tangents {
        let cross = plane_normal.cross(tangent);
        let mut perp = if cross.norm_squared() > DEGENERATE_SQ {
            cross.normalize()
        } else {
            perpendiculars.last().copied().unwrap_or_else(Vector3::x)
        };
        if let Some(previous) = perpendiculars.last() {
            if perp.dot(previous) < 0.0 {
                perp = -perp;
            }
        }
        perpendiculars.push(perp);
    }

    orient_outward(points, &mut perpendiculars, None);
    perpendiculars
}

/// Parallel-transport frame along the curve.
///
/// Returns per-sample (normal, binormal) pairs: the normal is the slab
/// direction, the binormal the vertical sampling direction. The first normal
/// comes from the plane normal crossed with the first tangent; subsequent
/// frames are rotated between consecutive tangents (Rodrigues) and
/// re-orthogonalized against the current tangent to stop drift. The same
/// outward check as [`in_plane_perpendiculars`] is applied, negating normals
/// and binormals together.
pub fn parallel_transport_frames(
    points: &[Vector3<f64>],
    plane_normal: &Vector3<f64>,
) -> (Vec<Vector3<f64>>, Vec<Vector3<f64>>) {
    let n = points.len();
    let tangents = central_tangents(points);
    if n == 0 {
        return (Vec::new(), Vec::new());
    }

    let mut reference = plane_normal.cross(&tangents[0]);
    if reference.norm_squared() <= DEGENERATE_SQ {
        reference = Vector3::x().cross(&tangents[0]);
    }
    if reference.norm_squared() <= DEGENERATE_SQ {
        reference = Vector3::y().cross(&tangents[0]);
    }
    let mut normal = reference.normalize();
    let mut binormal = tangents[0].cross(&normal).normalize();

    let mut normals = Vec::with_capacity(n);
    let mut binormals = Vec::with_capacity(n);
    normals.push(normal);
    binormals.push(binormal);

    for i in 1..n {
        let axis = tangents[i - 1].cross(&tangents[i]);
        let sin = axis.norm();
        let cos = tangents[i - 1].dot(&tangents[i]);
        if sin > 1e-10 {
            let rotation =
                Rotation3::from_axis_angle(&Unit::new_normalize(axis), sin.atan2(cos));
            normal = rotation * normal;
        }
        // re-orthogonalize against the current tangent to stop drift
        binormal = tangents[i].cross(&normal).normalize();
        normal = binormal.cross(&tangents[i]).normalize();

        normals.push(normal);
        binormals.push(binormal);
    }

    orient_outward(points, &mut normals, Some(&mut binormals));
    (normals, binormals)
}

/// Negate the whole direction field (and the coupled one, if any) when the
/// middle sample's direction points toward the curve centroid.
fn orient_outward(
    points: &[Vector3<f64>],
    directions: &mut [Vector3<f64>],
    coupled: Option<&mut Vec<Vector3<f64>>>,
) {
    let n = points.len();
    if n < 3 || directions.len() != n {
        return;
    }

    let centroid = points.iter().sum::<Vector3<f64>>() / n as f64;
    let mid = n / 2;
    if directions[mid].dot(&(points[mid] - centroid)) < 0.0 {
        log::debug!("flipping transverse directions to point outward");
        for direction in directions.iter_mut() {
            *direction = -*direction;
        }
        if let Some(coupled) = coupled {
            for direction in coupled.iter_mut() {
                *direction = -*direction;
            }
        }
    }
}
