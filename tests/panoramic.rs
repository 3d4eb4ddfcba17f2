//! End-to-end scenarios for the panoramic rendering pipeline.

use std::collections::BTreeMap;

use dicom_core::PrimitiveValue;
use dicom_dictionary_std::tags;
use nalgebra::Vector3;
use ndarray::Array3;

use dicom_cmpr::{render, CurveDirection, FrameMode, Plane, RenderParams, Volume};

fn params(width_mm: f64, step_mm: f64, slab_mm: f64) -> RenderParams {
    RenderParams {
        width_mm,
        step_mm,
        slab_mm,
        direction: CurveDirection::Forward,
        frame_mode: FrameMode::InPlane,
    }
}

fn constant_volume(side: usize, value: u16) -> Volume<u16> {
    let data = Array3::from_elem((side, side, side), value);
    Volume::new(data, Vector3::new(1.0, 1.0, 1.0)).unwrap()
}

/// 64^3 zero volume with the voxel line {(x, 32, 32) : 20 <= x <= 44} at 1000.
fn bright_line_volume() -> Volume<u16> {
    let mut data = Array3::from_elem((64, 64, 64), 0_u16);
    for x in 20..=44 {
        data[[32, 32, x]] = 1000;
    }
    Volume::new(data, Vector3::new(1.0, 1.0, 1.0)).unwrap()
}

#[test]
fn constant_volume_fills_the_raster() {
    let volume = constant_volume(32, 100);
    let controls = [Vector3::new(5.0, 5.0, 10.0), Vector3::new(25.0, 25.0, 10.0)];
    let image = render(&volume, &controls, &Plane::Axial.normal(), &params(4.0, 1.0, 2.0))
        .unwrap();

    assert_eq!(image.columns(), (800_f64.sqrt().floor() as usize) + 1);
    assert_eq!(image.rows(), 4);
    for value in image.pixels().iter() {
        assert_eq!(*value, 100);
    }
}

#[test]
fn curve_leaving_the_grid_degrades_gracefully() {
    let volume = constant_volume(32, 100);
    let controls = [
        Vector3::new(-5.0, 16.0, 16.0),
        Vector3::new(40.0, 16.0, 16.0),
    ];
    let image = render(&volume, &controls, &Plane::Axial.normal(), &params(4.0, 1.0, 2.0))
        .unwrap();

    assert_eq!(image.columns(), 46);
    assert_eq!(image.rows(), 4);

    let mut in_range = 0;
    let mut background = 0;
    for value in image.pixels().iter() {
        match *value {
            100 => in_range += 1,
            0 => background += 1,
            other => panic!("unexpected pixel value {other}"),
        }
    }
    assert!(in_range > 0, "interior columns must sample the volume");
    assert!(background > 0, "out-of-range slabs must stay untouched");
}

#[test]
fn mip_captures_a_bright_line_through_the_curve() {
    let volume = bright_line_volume();
    // the curve runs along the bright line's own row of voxel centers
    let controls = [Vector3::new(10.0, 32.0, 32.0), Vector3::new(50.0, 32.0, 32.0)];
    let image = render(&volume, &controls, &Plane::Axial.normal(), &params(40.0, 1.0, 4.0))
        .unwrap();

    let center_row = image.rows() / 2;
    let peak = (0..image.columns())
        .map(|i| image.pixels()[[center_row, i]])
        .max()
        .unwrap();
    assert!(peak >= 1000, "center row must capture the line, got {peak}");

    // columns far from the line along the curve stay dark
    assert_eq!(image.pixels()[[center_row, 0]], 0);
}

#[test]
fn mip_captures_an_oblique_bright_line_approximately() {
    let volume = bright_line_volume();
    let controls = [Vector3::new(10.0, 30.0, 32.0), Vector3::new(50.0, 34.0, 32.0)];
    let image = render(&volume, &controls, &Plane::Axial.normal(), &params(40.0, 1.0, 4.0))
        .unwrap();

    // slab samples land within a voxel of y = 32, so trilinear interpolation
    // keeps the captured peak just below the line value
    let band = image.rows() / 4;
    let mut peak = 0;
    for j in (image.rows() / 2 - band)..(image.rows() / 2 + band) {
        for i in 0..image.columns() {
            peak = peak.max(image.pixels()[[j, i]]);
        }
    }
    assert!(peak > 900, "central band must catch the line, got {peak}");
}

#[test]
fn widening_the_slab_never_darkens_a_pixel() {
    let volume = bright_line_volume();
    let controls = [Vector3::new(10.0, 30.0, 32.0), Vector3::new(50.0, 34.0, 32.0)];
    let normal = Plane::Axial.normal();

    let thin = render(&volume, &controls, &normal, &params(40.0, 1.0, 0.5)).unwrap();
    let wide = render(&volume, &controls, &normal, &params(40.0, 1.0, 4.0)).unwrap();

    assert_eq!(thin.columns(), wide.columns());
    assert_eq!(thin.rows(), wide.rows());
    for (narrow, broad) in thin.pixels().iter().zip(wide.pixels().iter()) {
        assert!(narrow <= broad);
    }
}

#[test]
fn rendering_is_deterministic_apart_from_the_uid() {
    let volume = bright_line_volume();
    let controls = [
        Vector3::new(10.0, 28.0, 32.0),
        Vector3::new(30.0, 36.0, 32.0),
        Vector3::new(50.0, 28.0, 32.0),
    ];
    let normal = Plane::Axial.normal();
    let run = params(20.0, 1.0, 4.0);

    let first = render(&volume, &controls, &normal, &run).unwrap();
    let second = render(&volume, &controls, &normal, &run).unwrap();

    assert_eq!(first.pixels(), second.pixels());
    assert_ne!(
        first.tags()[&tags::SOP_INSTANCE_UID],
        second.tags()[&tags::SOP_INSTANCE_UID]
    );
}

#[test]
fn direction_flag_mirrors_the_panoramic() {
    let data = Array3::from_shape_fn((32, 32, 32), |(_, _, x)| (x * 10) as u16);
    let volume = Volume::new(data, Vector3::new(1.0, 1.0, 1.0)).unwrap();
    let controls = [Vector3::new(5.0, 16.0, 16.0), Vector3::new(25.0, 16.0, 16.0)];
    let normal = Plane::Axial.normal();

    // odd slab sample count keeps the sample set symmetric under reversal
    let forward = params(4.0, 1.0, 3.0);
    let mut reversed = forward;
    reversed.direction = CurveDirection::Reversed;

    let fwd = render(&volume, &controls, &normal, &forward).unwrap();
    let rev = render(&volume, &controls, &normal, &reversed).unwrap();

    for j in 0..fwd.rows() {
        for i in 0..fwd.columns() {
            // a straight curve reslices the volume exactly
            assert_eq!(fwd.pixels()[[j, i]], ((5 + i) * 10) as u16);
            assert_eq!(
                fwd.pixels()[[j, i]],
                rev.pixels()[[j, fwd.columns() - 1 - i]]
            );
        }
    }
}

#[test]
fn anisotropic_spacing_drives_rows_and_slab() {
    // pmm = 0.5 along x/y, coarser z
    let data = Array3::from_elem((16, 64, 64), 700_u16);
    let volume = Volume::new(data, Vector3::new(0.5, 0.5, 2.0)).unwrap();
    let controls = [Vector3::new(8.0, 30.0, 8.0), Vector3::new(50.0, 30.0, 8.0)];
    let image = render(&volume, &controls, &Plane::Axial.normal(), &params(10.0, 0.5, 2.0))
        .unwrap();

    // rows = round(10 / 0.5), columns = voxel length + 1
    assert_eq!(image.rows(), 20);
    assert_eq!(image.columns(), 43);
    // vertical offsets shrink by the z ratio, so all rows stay inside
    for value in image.pixels().iter() {
        assert_eq!(*value, 700);
    }
}

#[test]
fn base_tags_are_inherited_into_the_output() {
    let volume = constant_volume(32, 100);
    let controls = [Vector3::new(5.0, 5.0, 10.0), Vector3::new(25.0, 25.0, 10.0)];

    let mut base = BTreeMap::new();
    base.insert(tags::MODALITY, PrimitiveValue::from("CT"));
    base.insert(tags::PATIENT_ID, PrimitiveValue::from("CMPR-0001"));

    let (image, _) = dicom_cmpr::renderer::render_with_snapshot(
        &volume,
        &controls,
        &Plane::Axial.normal(),
        &params(4.0, 1.0, 2.0),
        &base,
    )
    .unwrap();

    let tag_map = image.tags();
    assert_eq!(tag_map[&tags::MODALITY], PrimitiveValue::from("CT"));
    assert_eq!(tag_map[&tags::PATIENT_ID], PrimitiveValue::from("CMPR-0001"));
    assert_eq!(tag_map[&tags::INSTANCE_NUMBER], PrimitiveValue::from(1_i32));
    assert_eq!(
        tag_map[&tags::SLICE_THICKNESS],
        PrimitiveValue::from(1.0_f64)
    );
}

#[test]
fn snapshot_describes_the_rendered_curve() {
    let volume = constant_volume(32, 100);
    let controls = [
        Vector3::new(5.0, 5.0, 10.0),
        Vector3::new(15.0, 12.0, 10.0),
        Vector3::new(25.0, 5.0, 10.0),
    ];
    let (image, snapshot) = dicom_cmpr::renderer::render_with_snapshot(
        &volume,
        &controls,
        &Plane::Axial.normal(),
        &params(4.0, 1.0, 2.0),
        &BTreeMap::new(),
    )
    .unwrap();

    assert_eq!(snapshot.control_points.len(), 3);
    assert!(snapshot.smoothed_points.len() > snapshot.control_points.len());
    assert_eq!(snapshot.sampled_points.len(), image.columns());
    assert_eq!(snapshot.perpendiculars.len(), image.columns());
    for perp in &snapshot.perpendiculars {
        assert!((perp.norm() - 1.0).abs() < 1e-9);
    }
}
