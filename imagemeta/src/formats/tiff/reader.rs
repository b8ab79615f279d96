// SPDX-License-Identifier: MIT

//! Image File Directory decoding.
//!
//! Decoding never aborts on a malformed field. Every anomaly inside a
//! directory downgrades to a Warning diagnostic and the offending field (or
//! directory) is skipped; only an unreadable TIFF header is fatal.

use std::collections::{BTreeMap, HashSet};

use log::{debug, warn};

use crate::bits::Endian;
use crate::props::factory;
use crate::props::{Property, TextEncoding};
use crate::tags::Ifd;
use crate::value::{InteropValue, TypeCode};
use crate::{Diagnostic, Error, Result};

pub const EXIF_IFD_POINTER: u16 = 0x8769;
pub const GPS_IFD_POINTER: u16 = 0x8825;
pub const INTEROP_IFD_POINTER: u16 = 0xa005;
pub const MAKER_NOTE: u16 = 0x927c;
pub const THUMBNAIL_OFFSET: u16 = 0x0201;
pub const THUMBNAIL_LENGTH: u16 = 0x0202;
pub const STRIP_OFFSETS: u16 = 0x0111;
pub const STRIP_BYTE_COUNTS: u16 = 0x0117;

/// One raw field as read from a directory: the wire tuple plus, when the
/// value was stored out of line, its offset relative to the TIFF header.
#[derive(Debug, Clone)]
pub struct RawField {
  pub value: InteropValue,
  pub value_offset: Option<u32>,
}

/// The result of decoding a complete Exif/TIFF structure.
#[derive(Debug, Default)]
pub struct DecodedExif {
  pub endian: Endian,
  pub properties: Vec<Property>,
  pub thumbnail: Option<Vec<u8>>,
  /// Offset of the maker note value relative to the TIFF header, zero when
  /// absent. The writer uses it to keep the blob at its original position.
  pub maker_note_offset: u32,
  pub diags: Vec<Diagnostic>,
}

/// Parse the TIFF header at the start of `data`. Returns the byte order and
/// the offset of the zeroth IFD. Fatal on a truncated or unrecognized
/// header; everything past this point degrades to diagnostics.
pub fn parse_header(data: &[u8]) -> Result<(Endian, u32)> {
  if data.len() < 8 {
    return Err(Error::InvalidTiff("truncated TIFF header".into()));
  }
  let endian = match &data[0..2] {
    b"II" => Endian::Little,
    b"MM" => Endian::Big,
    _ => return Err(Error::InvalidTiff(format!("unknown byte order marker {:02x} {:02x}", data[0], data[1]))),
  };
  let magic = endian.read_u16(data, 2);
  if magic != 42 {
    return Err(Error::InvalidTiff(format!("invalid magic marker: {}", magic)));
  }
  Ok((endian, endian.read_u32(data, 4)))
}

/// Read one directory's raw fields and its next-IFD pointer.
///
/// `offset` is relative to the start of `data` (the TIFF header). Fields
/// that fail validation are skipped with a Warning pushed to `diags`.
pub fn read_raw_ifd(data: &[u8], endian: Endian, offset: u32, ifd: Ifd, diags: &mut Vec<Diagnostic>) -> (Vec<RawField>, u32) {
  let mut fields = Vec::new();
  let offset = offset as usize;
  if offset + 2 > data.len() {
    diags.push(Diagnostic::warning(format!("IFD field count overflow for IFD {:?}.", ifd)));
    return (fields, 0);
  }
  let field_count = endian.read_u16(data, offset) as usize;
  debug!("IFD {:?} at {:#x}: {} fields", ifd, offset, field_count);

  for i in 0..field_count {
    let field_offset = offset + 2 + 12 * i;
    if field_offset + 12 > data.len() {
      diags.push(Diagnostic::warning(format!("Invalid directory entry in IFD {:?}.", ifd)));
      continue;
    }
    let tag = endian.read_u16(data, field_offset);
    let type_raw = endian.read_u16(data, field_offset + 2);
    let count = endian.read_u32(data, field_offset + 4);
    let slot = field_offset + 8;

    let type_code = match TypeCode::try_from(type_raw) {
      Ok(t) => t,
      Err(_) => {
        diags.push(Diagnostic::warning(format!("Unknown type code {} for tag {}, field skipped.", type_raw, tag)));
        continue;
      }
    };

    let total_len = count as u64 * type_code.size() as u64;
    if total_len > data.len() as u64 {
      diags.push(Diagnostic::warning(format!("Field length overflow for tag {}.", tag)));
      continue;
    }
    let total_len = total_len as usize;

    let (bytes, value_offset) = if total_len <= 4 {
      (data[slot..slot + total_len].to_vec(), None)
    } else {
      let value_pos = endian.read_u32(data, slot);
      let pos = value_pos as usize;
      if pos >= data.len() {
        diags.push(Diagnostic::warning(format!("Field offset for tag {} exceeds data length.", tag)));
        continue;
      }
      if pos + total_len > data.len() {
        diags.push(Diagnostic::warning(format!("Field length for tag {} exceeds data length.", tag)));
        continue;
      }
      (data[pos..pos + total_len].to_vec(), Some(value_pos))
    };

    fields.push(RawField {
      value: InteropValue::new(tag, type_code, count, bytes),
      value_offset,
    });
  }

  // Some writers omit the next-IFD pointer after the last field.
  let next_offset = offset + 2 + 12 * field_count;
  let next_ifd = if next_offset + 4 <= data.len() {
    endian.read_u32(data, next_offset)
  } else {
    debug!("IFD {:?} has no next-IFD pointer, assuming end of chain", ifd);
    0
  };
  (fields, next_ifd)
}

/// Decode a complete Exif structure: the worklist-driven breadth-first walk
/// over the Zeroth, Exif, GPS, Interop and First directories.
///
/// `data` must start at the TIFF header (after any `Exif\0\0` marker).
pub fn decode_exif(data: &[u8], encoding: TextEncoding) -> Result<DecodedExif> {
  let (endian, ifd0_offset) = parse_header(data)?;
  let mut out = DecodedExif { endian, ..Default::default() };

  // The worklist is keyed by offset so directories are visited in file
  // order; an offset is never visited twice.
  let mut queue: BTreeMap<u32, Ifd> = BTreeMap::new();
  let mut visited: HashSet<u32> = HashSet::new();
  queue.insert(ifd0_offset, Ifd::Zeroth);

  let mut thumb_offset: Option<u32> = None;
  let mut thumb_length: u32 = 0;
  let mut thumb_is_jpeg = false;

  while let Some((&ifd_offset, &current_ifd)) = queue.iter().next() {
    queue.remove(&ifd_offset);
    if !visited.insert(ifd_offset) {
      out.diags.push(Diagnostic::warning(format!("IFD offset {:#x} referenced more than once, skipped.", ifd_offset)));
      continue;
    }

    let (fields, next_ifd) = read_raw_ifd(data, endian, ifd_offset, current_ifd, &mut out.diags);

    for field in &fields {
      let tag = field.value.tag;

      // Fields containing offsets to other IFDs.
      let pointer_target = match (current_ifd, tag) {
        (Ifd::Zeroth, EXIF_IFD_POINTER) => Some(Ifd::Exif),
        (Ifd::Zeroth, GPS_IFD_POINTER) => Some(Ifd::Gps),
        (Ifd::Exif, INTEROP_IFD_POINTER) => Some(Ifd::Interop),
        _ => None,
      };
      if let Some(target) = pointer_target {
        if field.value.data.len() >= 4 {
          let pointer = endian.read_u32(&field.value.data, 0);
          if queue.contains_key(&pointer) || visited.contains(&pointer) {
            out.diags.push(Diagnostic::warning(format!("IFD queue already contains a {:?} IFD pointer.", target)));
          } else {
            queue.insert(pointer, target);
          }
        }
      }

      // Remember where the maker note lives so a re-save can keep it there.
      if current_ifd == Ifd::Exif && tag == MAKER_NOTE {
        out.maker_note_offset = field.value_offset.unwrap_or(0);
      }

      // Thumbnail bookkeeping: JPEG-interchange pairs and strip pairs.
      if current_ifd == Ifd::First {
        match tag {
          THUMBNAIL_OFFSET => {
            thumb_is_jpeg = true;
            thumb_offset = first_u32(&field.value, endian);
          }
          THUMBNAIL_LENGTH => {
            thumb_length = first_u32(&field.value, endian).unwrap_or(0);
          }
          STRIP_OFFSETS => {
            thumb_is_jpeg = false;
            thumb_offset = first_u32(&field.value, endian);
          }
          STRIP_BYTE_COUNTS => {
            thumb_length = sum_u32(&field.value, endian);
          }
          _ => {}
        }
      }

      out.properties.push(factory::from_interop(current_ifd, &field.value, endian, encoding));
    }

    // The pointer following the Zeroth directory links the First
    // (thumbnail) directory.
    if current_ifd == Ifd::Zeroth && next_ifd != 0 {
      if (next_ifd as usize) + 2 <= data.len() {
        if queue.contains_key(&next_ifd) || visited.contains(&next_ifd) {
          out.diags.push(Diagnostic::warning("IFD queue already contains the first IFD pointer.".into()));
        } else {
          queue.insert(next_ifd, Ifd::First);
        }
      } else {
        out.diags.push(Diagnostic::warning("Invalid first IFD pointer.".into()));
      }
    }

    if out.thumbnail.is_none() && thumb_length != 0 {
      if let Some(toff) = thumb_offset {
        if thumb_is_jpeg {
          let start = toff as usize;
          let end = start.saturating_add(thumb_length as usize);
          if end > data.len() {
            out.diags.push(Diagnostic::warning("Thumbnail size exceeds data length.".into()));
          } else {
            out.thumbnail = Some(data[start..end].to_vec());
          }
          thumb_offset = None;
        }
      }
    }
  }

  if !out.diags.is_empty() {
    warn!("Exif decode finished with {} diagnostic(s)", out.diags.len());
  }
  Ok(out)
}

fn first_u32(value: &InteropValue, endian: Endian) -> Option<u32> {
  match value.type_code {
    TypeCode::Short if value.data.len() >= 2 => Some(endian.read_u16(&value.data, 0) as u32),
    TypeCode::Long if value.data.len() >= 4 => Some(endian.read_u32(&value.data, 0)),
    _ => None,
  }
}

fn sum_u32(value: &InteropValue, endian: Endian) -> u32 {
  match value.type_code {
    TypeCode::Short => value.to_shorts(endian).iter().map(|&v| v as u32).sum(),
    TypeCode::Long => value.to_longs(endian).iter().sum(),
    _ => 0,
  }
}
