// SPDX-License-Identifier: MIT

mod common;

use common::{base_jpeg, find_subslice, JPEG_APP7_PAYLOAD, JPEG_ENTROPY};
use imagemeta::props::enums::Orientation;
use imagemeta::props::{Property, PropertyValue};
use imagemeta::tags::{ExifTag, Ifd, Tag, TiffTag};
use imagemeta::ImageFile;

#[test]
fn orientation_decodes_to_the_enum_value() -> anyhow::Result<()> {
  let mut image = ImageFile::from_buffer(&base_jpeg())?;
  image.properties_mut().add(Property::enumerated(Tag::Zeroth(TiffTag::Orientation), 6)?);
  let saved = image.encode()?;

  let again = ImageFile::from_buffer(&saved)?;
  let orientation = again.properties().get(Tag::Zeroth(TiffTag::Orientation)).expect("orientation present");
  assert_eq!(orientation.value().enum_value::<Orientation>(), Some(Orientation::RotatedRight));
  Ok(())
}

#[test]
fn unknown_segments_and_entropy_survive_a_rewrite() -> anyhow::Result<()> {
  let mut image = ImageFile::from_buffer(&base_jpeg())?;
  image.properties_mut().set_str(Tag::Zeroth(TiffTag::Software), "exiflab");
  let saved = image.encode()?;

  // The opaque APP7 segment and the entropy-coded scan data must be
  // reproduced byte for byte; only the Exif APP1 is new.
  assert!(find_subslice(&saved, JPEG_APP7_PAYLOAD).is_some());
  assert!(find_subslice(&saved, JPEG_ENTROPY).is_some());
  assert!(saved.ends_with(&[0xFF, 0xD9]));
  Ok(())
}

#[test]
fn untouched_jpeg_saves_byte_identical() -> anyhow::Result<()> {
  let original = base_jpeg();
  let mut image = ImageFile::from_buffer(&original)?;
  assert_eq!(image.encode()?, original);
  Ok(())
}

#[test]
fn maker_note_keeps_its_absolute_offset() -> anyhow::Result<()> {
  const NOTE: &[u8] = b"MNOTE-MAGIC-0123";

  // Build a JPEG whose Exif directory carries a maker note preceded (in
  // tag order) only by fields that leave slack before its data.
  let mut image = ImageFile::from_buffer(&base_jpeg())?;
  image.properties_mut().add_str(Tag::Exif(ExifTag::LensModel), "a fairly long lens model name");
  image
    .properties_mut()
    .add(Property::new(Tag::Exif(ExifTag::MakerNote), PropertyValue::Undefined(NOTE.to_vec())));
  let first = image.encode()?;
  let original_pos = find_subslice(&first, NOTE).expect("maker note written");

  // Re-load, add one small unrelated Exif tag, save again.
  let mut image = ImageFile::from_buffer(&first)?;
  image.properties_mut().add_u16(Tag::Exif(ExifTag::ISOSpeedRatings), 200);
  let second = image.encode()?;

  let new_pos = find_subslice(&second, NOTE).expect("maker note still written");
  assert_eq!(new_pos, original_pos, "maker note moved from {} to {}", original_pos, new_pos);

  // And the note still decodes intact.
  let again = ImageFile::from_buffer(&second)?;
  let note = again.properties().get(Tag::Exif(ExifTag::MakerNote)).expect("maker note present");
  assert_eq!(note.value(), &PropertyValue::Undefined(NOTE.to_vec()));
  Ok(())
}

#[test]
fn removing_the_exif_directory_drops_its_pointer() -> anyhow::Result<()> {
  let mut image = ImageFile::from_buffer(&base_jpeg())?;
  image.properties_mut().add_str(Tag::Zeroth(TiffTag::Make), "pixelgrove");
  image.properties_mut().add_u16(Tag::Exif(ExifTag::ISOSpeedRatings), 100);
  image.properties_mut().add_f64(Tag::Exif(ExifTag::FNumber), 2.8);
  let saved = image.encode()?;

  let mut image = ImageFile::from_buffer(&saved)?;
  assert!(image.properties().contains(Tag::Zeroth(TiffTag::ExifIFDPointer)));
  image.properties_mut().remove_ifd(Ifd::Exif);
  let stripped = image.encode()?;

  let again = ImageFile::from_buffer(&stripped)?;
  assert!(!again.properties().contains(Tag::Zeroth(TiffTag::ExifIFDPointer)));
  assert!(!again.properties().has_ifd(Ifd::Exif));
  // The zeroth directory itself is still there.
  assert_eq!(again.properties().get(Tag::Zeroth(TiffTag::Make)).unwrap().value().as_str(), Some("pixelgrove"));
  Ok(())
}

#[test]
fn thumbnail_round_trips_through_the_first_ifd() -> anyhow::Result<()> {
  let thumb = vec![0xFF, 0xD8, 0xFF, 0xD9, 0x00, 0x42];
  let mut image = ImageFile::from_buffer(&base_jpeg())?;
  image.properties_mut().add_str(Tag::Zeroth(TiffTag::Make), "pixelgrove");
  image.set_thumbnail(Some(thumb.clone()));
  let saved = image.encode()?;

  let again = ImageFile::from_buffer(&saved)?;
  assert_eq!(again.thumbnail(), Some(thumb.as_slice()));
  Ok(())
}

#[test]
fn gps_rationals_round_trip_unreduced() -> anyhow::Result<()> {
  use imagemeta::props::GpsCoordinate;
  use imagemeta::tags::GpsTag;
  use imagemeta::Rational;

  let coord = GpsCoordinate::new(Rational::new(40, 1), Rational::new(26, 1), Rational::new(979, 45));
  let mut image = ImageFile::from_buffer(&base_jpeg())?;
  image
    .properties_mut()
    .add(Property::new(Tag::Gps(GpsTag::GPSLatitude), PropertyValue::GpsCoordinate(coord)));
  let saved = image.encode()?;

  let again = ImageFile::from_buffer(&saved)?;
  match again.properties().get(Tag::Gps(GpsTag::GPSLatitude)).unwrap().value() {
    PropertyValue::GpsCoordinate(c) => {
      assert_eq!(c.seconds, Rational::new(979, 45));
    }
    other => panic!("unexpected value {:?}", other),
  }
  Ok(())
}
