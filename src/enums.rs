use nalgebra::Vector3;

/// One of the three canonical orthogonal viewing planes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plane {
    Axial,
    Coronal,
    Sagittal,
}

impl Plane {
    /// Index of the volume axis the plane normal runs along (x = 0, y = 1, z = 2).
    pub fn axis_index(&self) -> usize {
        match self {
            Plane::Axial => 2,
            Plane::Coronal => 1,
            Plane::Sagittal => 0,
        }
    }

    /// Unit normal of the plane in voxel space.
    pub fn normal(&self) -> Vector3<f64> {
        match self {
            Plane::Axial => Vector3::z(),
            Plane::Coronal => Vector3::y(),
            Plane::Sagittal => Vector3::x(),
        }
    }
}

/// Horizontal reading direction of the panoramic output.
///
/// `Reversed` walks the curve from its far end so the patient's right lands
/// on the viewer's left. Presentation choice only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CurveDirection {
    Forward,
    #[default]
    Reversed,
}

/// Transverse frame used along the curve.
///
/// `InPlane` derives every slab direction from the drawing plane's normal and
/// assumes the curve stays close to that plane. `ParallelTransport` propagates
/// a twist-minimizing frame and also handles curves that leave the plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameMode {
    #[default]
    InPlane,
    ParallelTransport,
}
