use std::collections::BTreeMap;

use dicom_core::{dicom_value, PrimitiveValue, Tag};
use dicom_dictionary_std::tags;
use uuid::Uuid;

use crate::volume::Voxel;

/// Fresh UID in the UUID-derived `2.25.` root.
pub fn create_uid() -> String {
    format!("2.25.{}", Uuid::new_v4().as_u128())
}

/// Tag map describing one panoramic raster.
///
/// Caller-supplied patient/study tags come first so the computed image
/// description always wins. PixelSpacing is `[pmm, step_mm]`: the vertical
/// spacing is the volume's finest spacing, the horizontal one the exposed
/// sampling step.
pub fn panoramic_tags<T: Voxel>(
    columns: usize,
    rows: usize,
    pixel_mm: f64,
    step_mm: f64,
    base_tags: &BTreeMap<Tag, PrimitiveValue>,
) -> BTreeMap<Tag, PrimitiveValue> {
    let mut map = base_tags.clone();
    map.insert(tags::COLUMNS, PrimitiveValue::from(columns as u16));
    map.insert(tags::ROWS, PrimitiveValue::from(rows as u16));
    map.insert(tags::PIXEL_SPACING, dicom_value!(F64, [pixel_mm, step_mm]));
    map.insert(tags::SLICE_THICKNESS, PrimitiveValue::from(pixel_mm));
    map.insert(tags::SOP_INSTANCE_UID, PrimitiveValue::from(create_uid()));
    map.insert(tags::INSTANCE_NUMBER, PrimitiveValue::from(1_i32));
    map.insert(tags::SAMPLES_PER_PIXEL, PrimitiveValue::from(1_u16));
    map.insert(
        tags::PHOTOMETRIC_INTERPRETATION,
        PrimitiveValue::from("MONOCHROME2"),
    );
    map.insert(
        tags::BITS_ALLOCATED,
        PrimitiveValue::from(T::bits_allocated()),
    );
    map.insert(
        tags::PIXEL_REPRESENTATION,
        PrimitiveValue::from(T::pixel_representation()),
    );
    map
}
