use super::*;

#[test]
fn allocate_rejects_empty_dimensions() {
    assert!(matches!(
        Bitmap::allocate(0, 4),
        Err(PictorError::InvalidDimensions)
    ));
    assert!(matches!(
        Bitmap::allocate(4, 0),
        Err(PictorError::InvalidDimensions)
    ));
}

#[test]
fn allocate_is_zeroed_and_reports_dimensions() {
    let mut bitmap = Bitmap::allocate(2, 3).unwrap();
    assert_eq!(bitmap.dimensions(), (2, 3));
    assert_eq!(bitmap.get_pixel(1, 2).unwrap(), [0, 0, 0, 0]);
}

#[test]
fn get_pixel_checks_bounds_before_touching_the_buffer() {
    let mut bitmap = Bitmap::allocate(2, 2).unwrap();
    assert!(matches!(bitmap.get_pixel(2, 0), Err(PictorError::OutOfBounds)));
    assert!(matches!(bitmap.get_pixel(0, 2), Err(PictorError::OutOfBounds)));
    assert!(matches!(
        bitmap.get_pixel(u32::MAX, u32::MAX),
        Err(PictorError::OutOfBounds)
    ));
}

#[test]
fn traverse_visits_every_pixel_in_row_major_order() {
    let mut bitmap = Bitmap::allocate(3, 2).unwrap();
    let mut visits = Vec::new();
    bitmap.traverse(|_, _, _, _, _, x, y| visits.push((y, x)));
    let expected: Vec<_> = (0..2)
        .flat_map(|y| (0..3).map(move |x| (y, x)))
        .collect();
    assert_eq!(visits, expected);
}

#[test]
fn pixel_slot_writes_land_before_the_traversal_advances() {
    let mut bitmap = Bitmap::allocate(2, 2).unwrap();
    bitmap.traverse(|slot, _, _, _, _, x, y| {
        slot.set(x as u8, y as u8, 7, 255);
        assert_eq!(slot.get(), [x as u8, y as u8, 7, 255]);
    });
    assert_eq!(bitmap.get_pixel(1, 0).unwrap(), [1, 0, 7, 255]);
    assert_eq!(bitmap.get_pixel(0, 1).unwrap(), [0, 1, 7, 255]);
}

#[test]
fn from_decoded_converts_lazily_on_first_pixel_access() {
    let rgb = image::RgbImage::from_pixel(2, 1, image::Rgb([10, 20, 30]));
    let mut bitmap = Bitmap::from_decoded(image::DynamicImage::ImageRgb8(rgb));
    assert_eq!(bitmap.dimensions(), (2, 1));
    // Alpha fills to opaque on conversion.
    assert_eq!(bitmap.get_pixel(0, 0).unwrap(), [10, 20, 30, 255]);
}

#[test]
fn pixel_bytes_expose_the_packed_canonical_layout() {
    let mut bitmap = Bitmap::allocate(3, 2).unwrap();
    let (bytes, layout) = bitmap.pixel_bytes();
    assert_eq!(
        layout,
        PixelLayout {
            stride: 4,
            pitch: 12
        }
    );
    assert_eq!(bytes.len(), 24);
}

#[test]
fn load_of_missing_path_is_file_not_found() {
    assert!(matches!(
        Bitmap::load("/nonexistent/pictor/missing.png"),
        Err(PictorError::FileNotFound)
    ));
}
