use nalgebra::Vector3;

/// Samples per voxel of chord length emitted by the spline pass.
const SMOOTHING_DENSITY: f64 = 2.0;

/// Internal resampling step in voxels. The exposed `step_mm` parameter only
/// affects the output PixelSpacing metadata; sampling stays at sub-voxel
/// precision regardless.
pub const RESAMPLE_STEP_VOXELS: f64 = 1.0;

/// Evaluate a Catmull-Rom segment between `p1` and `p2` at `t` in `[0, 1]`.
pub fn catmull_rom(
    p0: &Vector3<f64>,
    p1: &Vector3<f64>,
    p2: &Vector3<f64>,
    p3: &Vector3<f64>,
    t: f64,
) -> Vector3<f64> {
    let t2 = t * t;
    let t3 = t2 * t;

    let b0 = -0.5 * t3 + t2 - 0.5 * t;
    let b1 = 1.5 * t3 - 2.5 * t2 + 1.0;
    let b2 = -1.5 * t3 + 2.0 * t2 + 0.5 * t;
    let b3 = 0.5 * t3 - 0.5 * t2;

    p0 * b0 + p1 * b1 + p2 * b2 + p3 * b3
}

/// Smooth a polyline with a Catmull-Rom spline through every control point.
///
/// Each segment emits a number of samples proportional to its chord length
/// (about [`SMOOTHING_DENSITY`] per voxel, at least 2), with the neighbour
/// controls clamped at the endpoints. The last control point is appended so
/// the result still ends exactly on the polyline. Two points pass through
/// unchanged; there is nothing to smooth.
pub fn smooth_polyline(points: &[Vector3<f64>]) -> Vec<Vector3<f64>> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let last = points.len() - 1;
    let mut smoothed = Vec::new();
    for i in 0..last {
        let p0 = &points[i.saturating_sub(1)];
        let p1 = &points[i];
        let p2 = &points[i + 1];
        let p3 = &points[(i + 2).min(last)];

        let chord = (p2 - p1).norm();
        let segment_samples = ((chord * SMOOTHING_DENSITY).round() as usize).max(2);
        for j in 0..segment_samples {
            let t = j as f64 / segment_samples as f64;
            smoothed.push(catmull_rom(p0, p1, p2, p3, t));
        }
    }
    smoothed.push(points[last]);

    log::debug!(
        "smoothed polyline: {} control points -> {} samples",
        points.len(),
        smoothed.len()
    );
    smoothed
}

/// Total arc length of a polyline in voxel units.
pub fn total_length(points: &[Vector3<f64>]) -> f64 {
    points
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).norm())
        .sum()
}

/// Resample a polyline at uniform arc-length intervals of `step` voxels.
///
/// Emits one sample for every distance `i * step` that does not exceed the
/// total length, walking the polyline once and interpolating linearly inside
/// the segment containing each target. Returns an empty list for fewer than
/// two points or zero length; the caller emits no image in that case.
pub fn resample_by_arc_length(points: &[Vector3<f64>], step: f64) -> Vec<Vector3<f64>> {
    if points.len() < 2 || step <= 0.0 {
        return Vec::new();
    }
    let length = total_length(points);
    if length <= 0.0 {
        return Vec::new();
    }

    // tolerate rounding in the accumulated segment lengths so an exact
    // multiple of `step` still lands on the final vertex
    let count = ((length + 1e-9) / step).floor() as usize;
    let mut samples = Vec::with_capacity(count + 1);

    let mut segment = 0;
    let mut segment_start = 0.0;
    let mut segment_length = (points[1] - points[0]).norm();
    for i in 0..=count {
        let target = i as f64 * step;
        while target > segment_start + segment_length && segment + 2 < points.len() {
            segment_start += segment_length;
            segment += 1;
            segment_length = (points[segment + 1] - points[segment]).norm();
        }
        let t = if segment_length > 0.0 {
            ((target - segment_start) / segment_length).clamp(0.0, 1.0)
        } else {
            0.0
        };
        samples.push(points[segment].lerp(&points[segment + 1], t));
    }
    samples
}
