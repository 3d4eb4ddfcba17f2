use ndarray::Array3;

use crate::volume::Voxel;

pub(crate) struct Interpolator;

impl Interpolator {
    /// Trilinearly interpolate `data` at real-valued voxel coordinates.
    ///
    /// `data` is indexed `[z, y, x]`. Returns `None` when any coordinate is
    /// non-finite, negative, or at/beyond the last voxel plane along its
    /// axis (the interpolation cell would leave the grid).
    #[inline]
    pub(crate) fn trilinear<T: Voxel>(data: &Array3<T>, x: f64, y: f64, z: f64) -> Option<f64> {
        let (nz, ny, nx) = data.dim();
        if !(x.is_finite() && y.is_finite() && z.is_finite()) {
            return None;
        }
        if x < 0.0 || y < 0.0 || z < 0.0 {
            return None;
        }
        if x >= (nx - 1) as f64 || y >= (ny - 1) as f64 || z >= (nz - 1) as f64 {
            return None;
        }

        let i = x.floor() as usize;
        let j = y.floor() as usize;
        let k = z.floor() as usize;
        let u = x - i as f64;
        let v = y - j as f64;
        let w = z - k as f64;

        let c000 = data[[k, j, i]].to_f64();
        let c001 = data[[k, j, i + 1]].to_f64();
        let c010 = data[[k, j + 1, i]].to_f64();
        let c011 = data[[k, j + 1, i + 1]].to_f64();
        let c100 = data[[k + 1, j, i]].to_f64();
        let c101 = data[[k + 1, j, i + 1]].to_f64();
        let c110 = data[[k + 1, j + 1, i]].to_f64();
        let c111 = data[[k + 1, j + 1, i + 1]].to_f64();

        let one_minus_u = 1.0 - u;
        let c00 = c000.mul_add(one_minus_u, c001 * u);
        let c01 = c010.mul_add(one_minus_u, c011 * u);
        let c10 = c100.mul_add(one_minus_u, c101 * u);
        let c11 = c110.mul_add(one_minus_u, c111 * u);

        let one_minus_v = 1.0 - v;
        let c0 = c00.mul_add(one_minus_v, c01 * v);
        let c1 = c10.mul_add(one_minus_v, c11 * v);

        Some(c0.mul_add(1.0 - w, c1 * w))
    }
}

#[cfg(test)]
mod tests {
    use float_eq::assert_float_eq;
    use ndarray::Array3;

    use super::*;

    fn ramp_volume() -> Array3<f32> {
        // value = x + 10*y + 100*z, linear in all three axes
        Array3::from_shape_fn((4, 4, 4), |(z, y, x)| (x + 10 * y + 100 * z) as f32)
    }

    #[test]
    fn trilinear_reproduces_grid_values() {
        let data = ramp_volume();
        let value = Interpolator::trilinear(&data, 2.0, 1.0, 1.0).unwrap();
        assert_float_eq!(value, 112.0, abs <= 1e-12);
    }

    #[test]
    fn trilinear_is_exact_on_linear_fields() {
        let data = ramp_volume();
        let value = Interpolator::trilinear(&data, 1.25, 0.5, 2.75).unwrap();
        assert_float_eq!(value, 1.25 + 5.0 + 275.0, abs <= 1e-9);
    }

    #[test]
    fn trilinear_rejects_out_of_range_coordinates() {
        let data = ramp_volume();
        assert!(Interpolator::trilinear(&data, -0.1, 0.0, 0.0).is_none());
        // the last voxel plane has no interpolation cell
        assert!(Interpolator::trilinear(&data, 3.0, 0.0, 0.0).is_none());
        assert!(Interpolator::trilinear(&data, 0.0, f64::NAN, 0.0).is_none());
    }

    #[test]
    fn trilinear_accepts_interior_cell_near_boundary() {
        let data = ramp_volume();
        assert!(Interpolator::trilinear(&data, 2.999, 2.999, 2.999).is_some());
    }
}
