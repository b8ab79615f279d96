// SPDX-License-Identifier: MIT

//! Image File Directory encoding.
//!
//! Directories are serialized Zeroth, Exif, GPS, Interop, First. The
//! offsets stored in pointer fields are not known until the target
//! directories have been written, so their slot positions are collected in
//! an explicit [`PatchUps`] context and patched afterwards.

use std::collections::VecDeque;

use log::debug;

use crate::bits::Endian;
use crate::formats::tiff::reader::{
  EXIF_IFD_POINTER, GPS_IFD_POINTER, INTEROP_IFD_POINTER, MAKER_NOTE, THUMBNAIL_LENGTH, THUMBNAIL_OFFSET,
};
use crate::props::collection::PropertyCollection;
use crate::tags::Ifd;
use crate::value::InteropValue;
use crate::Diagnostic;

/// Slot positions (relative to the TIFF header) that must be patched once
/// the downstream directories and the thumbnail have been written.
#[derive(Debug, Default)]
struct PatchUps {
  exif_ptr: Option<usize>,
  gps_ptr: Option<usize>,
  interop_ptr: Option<usize>,
  /// The next-IFD slot after the Zeroth directory, linking the First IFD.
  first_chain: Option<usize>,
  thumb_offset_slot: Option<usize>,
  thumb_length_slot: Option<usize>,
}

/// Result of serializing an Exif structure.
pub struct EncodedExif {
  /// The complete TIFF structure, starting at the byte order marker.
  pub data: Vec<u8>,
  pub diags: Vec<Diagnostic>,
}

/// Serialize the Exif-relevant properties of `props` into a TIFF structure.
///
/// Returns `None` when no property belongs to any of the five Exif
/// directories and no thumbnail is set; the caller then drops the segment
/// entirely.
///
/// When `preserve_maker_note` is set and `maker_note_offset` is the blob's
/// original offset, filler bytes hold the maker note at that exact offset.
/// This is best effort: pointers inside the maker note that reference bytes
/// outside of it may still desync after a rewrite.
pub fn encode_exif(
  props: &PropertyCollection,
  thumbnail: Option<&[u8]>,
  endian: Endian,
  maker_note_offset: u32,
  preserve_maker_note: bool,
) -> Option<EncodedExif> {
  let mut diags = Vec::new();

  let mut zeroth = collect_ifd(props, Ifd::Zeroth, endian);
  let mut exif = collect_ifd(props, Ifd::Exif, endian);
  let gps = collect_ifd(props, Ifd::Gps, endian);
  let interop = collect_ifd(props, Ifd::Interop, endian);
  let mut first = collect_ifd(props, Ifd::First, endian);

  // Thumbnail interchange tags track the thumbnail itself: synthesized when
  // a thumbnail is set, dropped when none is.
  if thumbnail.is_some() {
    if !first.iter().any(|f| f.tag == THUMBNAIL_OFFSET) {
      diags.push(Diagnostic::info("Adding missing thumbnail offset tag.".into()));
      first.push(InteropValue::from_longs(THUMBNAIL_OFFSET, &[0], endian));
    }
    if !first.iter().any(|f| f.tag == THUMBNAIL_LENGTH) {
      diags.push(Diagnostic::info("Adding missing thumbnail length tag.".into()));
      first.push(InteropValue::from_longs(THUMBNAIL_LENGTH, &[0], endian));
    }
  } else {
    first.retain(|f| f.tag != THUMBNAIL_OFFSET && f.tag != THUMBNAIL_LENGTH);
  }

  // Pointer fields are owned by the writer: synthesized for directories
  // that exist, dropped for directories that do not. Their values are
  // patched later. The Interop pointer lives in the Exif directory, so it
  // is settled before the Exif pointer itself.
  sync_pointer(&mut exif, INTEROP_IFD_POINTER, !interop.is_empty(), endian);
  sync_pointer(&mut zeroth, EXIF_IFD_POINTER, !exif.is_empty(), endian);
  sync_pointer(&mut zeroth, GPS_IFD_POINTER, !gps.is_empty(), endian);

  if zeroth.is_empty() && exif.is_empty() && gps.is_empty() && interop.is_empty() && first.is_empty() && thumbnail.is_none() {
    return None;
  }

  let mut out = Vec::new();
  out.extend_from_slice(&endian.tiff_marker());
  endian.write_u16(&mut out, 42);
  endian.write_u32(&mut out, 8);

  let mut patches = PatchUps::default();
  let note = NoteLayout {
    offset: maker_note_offset,
    preserve: preserve_maker_note,
  };

  write_ifd(&mut out, &zeroth, Ifd::Zeroth, endian, &mut patches, &note);
  let exif_start = out.len();
  if !exif.is_empty() {
    write_ifd(&mut out, &exif, Ifd::Exif, endian, &mut patches, &note);
  }
  let gps_start = out.len();
  if !gps.is_empty() {
    write_ifd(&mut out, &gps, Ifd::Gps, endian, &mut patches, &note);
  }
  let interop_start = out.len();
  if !interop.is_empty() {
    write_ifd(&mut out, &interop, Ifd::Interop, endian, &mut patches, &note);
  }
  let first_start = out.len();
  if !first.is_empty() {
    write_ifd(&mut out, &first, Ifd::First, endian, &mut patches, &note);
  }

  // Thumbnail bytes follow the First directory's field data.
  if let Some(thumb) = thumbnail {
    let thumb_start = out.len();
    out.extend_from_slice(thumb);
    if let Some(slot) = patches.thumb_offset_slot {
      endian.put_u32(&mut out, slot, thumb_start as u32);
    }
    if let Some(slot) = patches.thumb_length_slot {
      endian.put_u32(&mut out, slot, thumb.len() as u32);
    }
  }

  // Now that every directory position is known, fill in the deferred
  // pointer slots.
  if let Some(slot) = patches.exif_ptr {
    endian.put_u32(&mut out, slot, exif_start as u32);
  }
  if let Some(slot) = patches.gps_ptr {
    endian.put_u32(&mut out, slot, gps_start as u32);
  }
  if let Some(slot) = patches.interop_ptr {
    endian.put_u32(&mut out, slot, interop_start as u32);
  }
  if !first.is_empty() {
    if let Some(slot) = patches.first_chain {
      endian.put_u32(&mut out, slot, first_start as u32);
    }
  }

  Some(EncodedExif { data: out, diags })
}

/// Flatten one directory's properties to wire values, deduplicated by tag
/// id (the last write wins) and sorted ascending as TIFF requires.
fn collect_ifd(props: &PropertyCollection, ifd: Ifd, endian: Endian) -> Vec<InteropValue> {
  let mut fields: Vec<InteropValue> = Vec::new();
  for prop in props.in_ifd(ifd) {
    let wire = prop.interop(endian);
    match fields.iter_mut().find(|f| f.tag == wire.tag) {
      Some(slot) => *slot = wire,
      None => fields.push(wire),
    }
  }
  fields.sort_by_key(|f| f.tag);
  fields
}

fn sync_pointer(fields: &mut Vec<InteropValue>, pointer: u16, wanted: bool, endian: Endian) {
  let present = fields.iter().any(|f| f.tag == pointer);
  if wanted && !present {
    fields.push(InteropValue::from_longs(pointer, &[0], endian));
    fields.sort_by_key(|f| f.tag);
  } else if !wanted && present {
    fields.retain(|f| f.tag != pointer);
  }
}

struct NoteLayout {
  offset: u32,
  preserve: bool,
}

fn write_ifd(out: &mut Vec<u8>, fields: &[InteropValue], ifd: Ifd, endian: Endian, patches: &mut PatchUps, note: &NoteLayout) {
  let dir_start = out.len();
  let field_count = fields.len();
  // Field data begins right after the entry table and the next-IFD slot.
  let data_base = dir_start + 2 + 12 * field_count + 4;

  // The maker note is pushed to the end of the queue so filler bytes can be
  // inserted before its data without disturbing other fields.
  let mut queue: VecDeque<&InteropValue> = fields.iter().filter(|f| f.tag != MAKER_NOTE).collect();
  if let Some(note_field) = fields.iter().find(|f| f.tag == MAKER_NOTE) {
    queue.push_back(note_field);
  }

  let mut table = Vec::with_capacity(12 * field_count);
  let mut data_area: Vec<u8> = Vec::new();
  let mut entry_index = 0usize;
  let mut note_written = false;
  let has_note = ifd == Ifd::Exif && fields.iter().any(|f| f.tag == MAKER_NOTE);

  while let Some(field) = queue.pop_front() {
    let cursor = (data_base + data_area.len()) as u32;

    if has_note
      && !note_written
      && note.offset != 0
      && field.tag != MAKER_NOTE
      && field.data.len() > 4
      && cursor + field.data.len() as u32 > note.offset
    {
      // This field's data would overlap the maker note's original
      // position; write it after the maker note instead.
      queue.push_back(field);
      continue;
    }

    let mut filler = 0u32;
    if field.tag == MAKER_NOTE {
      note_written = true;
      if note.preserve && note.offset > cursor {
        filler = note.offset - cursor;
        debug!("Inserting {} filler bytes to pin the maker note at {:#x}", filler, note.offset);
      }
    }

    endian.write_u16(&mut table, field.tag);
    endian.write_u16(&mut table, u16::from(field.type_code));
    endian.write_u32(&mut table, field.count);

    // Slot positions that get patched after all directories are written.
    let slot_pos = dir_start + 2 + 12 * entry_index + 8;
    match (ifd, field.tag) {
      (Ifd::Zeroth, EXIF_IFD_POINTER) => patches.exif_ptr = Some(slot_pos),
      (Ifd::Zeroth, GPS_IFD_POINTER) => patches.gps_ptr = Some(slot_pos),
      (Ifd::Exif, INTEROP_IFD_POINTER) => patches.interop_ptr = Some(slot_pos),
      (Ifd::First, THUMBNAIL_OFFSET) => patches.thumb_offset_slot = Some(slot_pos),
      (Ifd::First, THUMBNAIL_LENGTH) => patches.thumb_length_slot = Some(slot_pos),
      _ => {}
    }

    if field.data.len() <= 4 {
      table.extend_from_slice(&field.data);
      table.resize(12 * (entry_index + 1), 0);
    } else {
      endian.write_u32(&mut table, cursor + filler);
      data_area.extend(std::iter::repeat(0xFF).take(filler as usize));
      data_area.extend_from_slice(&field.data);
    }
    entry_index += 1;
  }

  endian.write_u16(out, field_count as u16);
  out.extend_from_slice(&table);
  if ifd == Ifd::Zeroth {
    patches.first_chain = Some(out.len());
  }
  endian.write_u32(out, 0); // next IFD, patched for the Zeroth directory
  out.extend_from_slice(&data_area);
}

/// Serialize one flat directory (no pointer handling) at the current end of
/// `out`, returning the directory's start offset. Used by the TIFF
/// container writer, which manages its own IFD chain.
pub fn write_plain_ifd(out: &mut Vec<u8>, fields: &[InteropValue], endian: Endian) -> usize {
  let mut fields: Vec<&InteropValue> = fields.iter().collect();
  fields.sort_by_key(|f| f.tag);

  let dir_start = out.len();
  let field_count = fields.len();
  let data_base = dir_start + 2 + 12 * field_count + 4;

  endian.write_u16(out, field_count as u16);
  let mut data_area: Vec<u8> = Vec::new();
  for field in fields {
    endian.write_u16(out, field.tag);
    endian.write_u16(out, u16::from(field.type_code));
    endian.write_u32(out, field.count);
    if field.data.len() <= 4 {
      let pad = 4 - field.data.len();
      out.extend_from_slice(&field.data);
      out.extend(std::iter::repeat(0).take(pad));
    } else {
      endian.write_u32(out, (data_base + data_area.len()) as u32);
      data_area.extend_from_slice(&field.data);
    }
  }
  endian.write_u32(out, 0); // next IFD, patched by the caller
  out.extend_from_slice(&data_area);
  dir_start
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::formats::tiff::reader::decode_exif;
  use crate::props::{Property, PropertyValue, TextEncoding};
  use crate::tags::{ExifTag, GpsTag, Tag, TiffTag};
  use crate::value::Rational;

  fn sample_props() -> PropertyCollection {
    let mut props = PropertyCollection::new();
    props.add_str(Tag::Zeroth(TiffTag::Make), "imagemeta");
    props.add_u16(Tag::Zeroth(TiffTag::Orientation), 6);
    props.add_f64(Tag::Exif(ExifTag::FNumber), 2.0);
    props.add_dms(Tag::Gps(GpsTag::GPSLatitude), 40.0, 26.0, 21.75);
    props
  }

  #[test]
  fn encode_decode_round_trip() {
    let encoded = encode_exif(&sample_props(), None, Endian::Little, 0, false).expect("has content");
    let decoded = decode_exif(&encoded.data, TextEncoding::default()).unwrap();
    assert!(decoded.diags.is_empty());

    let make = decoded.properties.iter().find(|p| p.tag() == Tag::Zeroth(TiffTag::Make)).unwrap();
    assert_eq!(make.value().as_str(), Some("imagemeta"));
    let orient = decoded.properties.iter().find(|p| p.tag() == Tag::Zeroth(TiffTag::Orientation)).unwrap();
    assert_eq!(orient.value().as_u32(), Some(6));
    let fnum = decoded.properties.iter().find(|p| p.tag() == Tag::Exif(ExifTag::FNumber)).unwrap();
    assert_eq!(fnum.value(), &PropertyValue::Rational(Rational::new(2, 1)));
    assert!(decoded.properties.iter().any(|p| p.tag() == Tag::Gps(GpsTag::GPSLatitude)));
  }

  #[test]
  fn pointers_synthesized_and_removed() {
    let encoded = encode_exif(&sample_props(), None, Endian::Little, 0, false).unwrap();
    let decoded = decode_exif(&encoded.data, TextEncoding::default()).unwrap();
    assert!(decoded.properties.iter().any(|p| p.tag() == Tag::Zeroth(TiffTag::ExifIFDPointer)));
    assert!(decoded.properties.iter().any(|p| p.tag() == Tag::Zeroth(TiffTag::GPSIFDPointer)));

    // Without any Exif/GPS property the pointers must not appear, even if a
    // stale pointer property is still in the collection.
    let mut props = PropertyCollection::new();
    props.add_str(Tag::Zeroth(TiffTag::Make), "imagemeta");
    props.add_u32(Tag::Zeroth(TiffTag::ExifIFDPointer), 1234);
    let encoded = encode_exif(&props, None, Endian::Little, 0, false).unwrap();
    let decoded = decode_exif(&encoded.data, TextEncoding::default()).unwrap();
    assert!(!decoded.properties.iter().any(|p| p.tag() == Tag::Zeroth(TiffTag::ExifIFDPointer)));
  }

  #[test]
  fn empty_collection_encodes_to_nothing() {
    let props = PropertyCollection::new();
    assert!(encode_exif(&props, None, Endian::Little, 0, false).is_none());
  }

  #[test]
  fn thumbnail_tags_synthesized() {
    let mut props = PropertyCollection::new();
    props.add_str(Tag::Zeroth(TiffTag::Make), "imagemeta");
    let thumb = vec![0xFFu8, 0xD8, 0xFF, 0xD9];
    let encoded = encode_exif(&props, Some(&thumb), Endian::Little, 0, false).unwrap();
    assert!(encoded.diags.iter().any(|d| d.message.contains("thumbnail offset")));
    let decoded = decode_exif(&encoded.data, TextEncoding::default()).unwrap();
    assert_eq!(decoded.thumbnail, Some(thumb));
  }

  #[test]
  fn maker_note_offset_is_preserved() {
    let mut props = PropertyCollection::new();
    props.add_str(Tag::Zeroth(TiffTag::Make), "imagemeta");
    props.add_str(Tag::Exif(ExifTag::LensModel), "a fairly long lens model name");
    props.add(Property::new(
      Tag::Exif(ExifTag::MakerNote),
      PropertyValue::Undefined(vec![0xAB; 16]),
    ));

    // Pretend the maker note originally lived at offset 400.
    let encoded = encode_exif(&props, None, Endian::Little, 400, true).unwrap();
    let decoded = decode_exif(&encoded.data, TextEncoding::default()).unwrap();
    assert_eq!(decoded.maker_note_offset, 400);
    assert_eq!(&encoded.data[400..416], &[0xAB; 16]);
    let note = decoded.properties.iter().find(|p| p.tag() == Tag::Exif(ExifTag::MakerNote)).unwrap();
    assert_eq!(note.value(), &PropertyValue::Undefined(vec![0xAB; 16]));
  }

  #[test]
  fn big_endian_output_decodes() {
    let encoded = encode_exif(&sample_props(), None, Endian::Big, 0, false).unwrap();
    assert_eq!(&encoded.data[0..2], b"MM");
    let decoded = decode_exif(&encoded.data, TextEncoding::default()).unwrap();
    assert_eq!(decoded.endian, Endian::Big);
    let orient = decoded.properties.iter().find(|p| p.tag() == Tag::Zeroth(TiffTag::Orientation)).unwrap();
    assert_eq!(orient.value().as_u32(), Some(6));
  }

  #[test]
  fn plain_ifd_writes_sorted_entries() {
    let mut out = vec![0u8; 8];
    let fields = vec![
      InteropValue::from_shorts(300, &[1], Endian::Little),
      InteropValue::from_shorts(256, &[7], Endian::Little),
    ];
    let start = write_plain_ifd(&mut out, &fields, Endian::Little);
    assert_eq!(start, 8);
    assert_eq!(Endian::Little.read_u16(&out, 8), 2);
    // First entry must be the lower tag id.
    assert_eq!(Endian::Little.read_u16(&out, 10), 256);
    assert_eq!(Endian::Little.read_u16(&out, 22), 300);
  }
}
