// SPDX-License-Identifier: MIT

//! TIFF container framing: the top-level IFD chain and strip-based pixel
//! storage. The embedded-Exif reader/writer shared with JPEG lives in
//! [`reader`] and [`writer`].

pub mod reader;
pub mod writer;

use log::debug;

use crate::bits::Endian;
use crate::props::collection::PropertyCollection;
use crate::props::{factory, TextEncoding};
use crate::tags::{Ifd, Tag, TiffTag};
use crate::value::{InteropValue, TypeCode};
use crate::{Diagnostic, Error, Result};

use reader::{STRIP_BYTE_COUNTS, STRIP_OFFSETS};

/// Baseline tags kept when crushing a TIFF: the structural fields an image
/// reader needs to decode pixel data, nothing descriptive.
pub const CRUSH_WHITELIST: &[TiffTag] = &[
  TiffTag::NewSubfileType,
  TiffTag::SubfileType,
  TiffTag::ImageWidth,
  TiffTag::ImageLength,
  TiffTag::BitsPerSample,
  TiffTag::Compression,
  TiffTag::PhotometricInterpretation,
  TiffTag::Threshholding,
  TiffTag::CellWidth,
  TiffTag::CellLength,
  TiffTag::FillOrder,
  TiffTag::StripOffsets,
  TiffTag::Orientation,
  TiffTag::SamplesPerPixel,
  TiffTag::RowsPerStrip,
  TiffTag::StripByteCounts,
  TiffTag::MinSampleValue,
  TiffTag::MaxSampleValue,
  TiffTag::XResolution,
  TiffTag::YResolution,
  TiffTag::PlanarConfiguration,
  TiffTag::XPosition,
  TiffTag::YPosition,
  TiffTag::FreeOffsets,
  TiffTag::FreeByteCounts,
  TiffTag::GrayResponseUnit,
  TiffTag::GrayResponseCurve,
  TiffTag::T4Options,
  TiffTag::T6Options,
  TiffTag::ResolutionUnit,
  TiffTag::TransferFunction,
  TiffTag::Predictor,
  TiffTag::WhitePoint,
  TiffTag::PrimaryChromaticities,
  TiffTag::ColorMap,
  TiffTag::HalftoneHints,
  TiffTag::TileWidth,
  TiffTag::TileLength,
  TiffTag::TileOffsets,
  TiffTag::TileByteCounts,
  TiffTag::InkSet,
  TiffTag::InkNames,
  TiffTag::NumberOfInks,
  TiffTag::DotRange,
  TiffTag::ExtraSamples,
  TiffTag::SampleFormat,
  TiffTag::SMinSampleValue,
  TiffTag::SMaxSampleValue,
  TiffTag::TransferRange,
  TiffTag::JPEGProc,
  TiffTag::JPEGInterchangeFormat,
  TiffTag::JPEGInterchangeFormatLength,
  TiffTag::JPEGRestartInterval,
  TiffTag::JPEGLosslessPredictors,
  TiffTag::JPEGPointTransforms,
  TiffTag::JPEGQTables,
  TiffTag::JPEGDCTables,
  TiffTag::JPEGACTables,
  TiffTag::YCbCrCoefficients,
  TiffTag::YCbCrSubSampling,
  TiffTag::YCbCrPositioning,
  TiffTag::ReferenceBlackWhite,
];

/// One directory of the chain with its decoded strip data.
#[derive(Debug, Clone)]
struct TiffIfd {
  fields: Vec<InteropValue>,
  strips: Vec<Vec<u8>>,
}

/// A decoded TIFF file: metadata properties from the zeroth directory plus
/// the raw structure needed to rebuild the container.
#[derive(Debug)]
pub struct TiffFile {
  endian: Endian,
  ifds: Vec<TiffIfd>,
  pub properties: PropertyCollection,
  pub diags: Vec<Diagnostic>,
}

impl TiffFile {
  /// Decode a complete TIFF byte buffer.
  pub fn decode(data: &[u8], encoding: TextEncoding) -> Result<Self> {
    let (endian, mut next_offset) = reader::parse_header(data)?;
    if next_offset == 0 {
      return Err(Error::InvalidTiff("the first IFD offset is zero".into()));
    }

    let mut diags = Vec::new();
    let mut ifds = Vec::new();
    let mut visited = std::collections::HashSet::new();

    while next_offset != 0 {
      if !visited.insert(next_offset) {
        diags.push(Diagnostic::warning(format!("IFD chain loops back to offset {:#x}, stopped.", next_offset)));
        break;
      }
      let (raw_fields, next) = reader::read_raw_ifd(data, endian, next_offset, Ifd::Zeroth, &mut diags);
      let fields: Vec<InteropValue> = raw_fields.into_iter().map(|f| f.value).collect();
      let strips = read_strips(data, endian, &fields, &mut diags);
      ifds.push(TiffIfd { fields, strips });
      next_offset = next;
    }
    if ifds.is_empty() {
      return Err(Error::InvalidTiff("TIFF contains no directory".into()));
    }

    // Only the first directory feeds the property collection; chained
    // directories (extra pages) are carried through untouched.
    let mut properties = PropertyCollection::new();
    for field in &ifds[0].fields {
      properties.add(factory::from_interop(Ifd::Zeroth, field, endian, encoding));
    }

    debug!("TIFF decode: {} IFD(s), {} properties", ifds.len(), properties.len());
    Ok(Self { endian, ifds, properties, diags })
  }

  pub fn endian(&self) -> Endian {
    self.endian
  }

  /// Serialize the container. Strips are written first, directly after the
  /// header, then each directory with its strip tags regenerated to match
  /// the just-written strip positions.
  pub fn encode(&mut self) -> Vec<u8> {
    let endian = self.endian;
    let mut out = Vec::new();
    out.extend_from_slice(&endian.tiff_marker());
    endian.write_u16(&mut out, 42);
    // Offset of the zeroth directory, patched below.
    let mut link_slot = out.len();
    endian.write_u32(&mut out, 0);

    for (i, ifd) in self.ifds.iter().enumerate() {
      // Strip data first.
      let mut strip_offsets = Vec::with_capacity(ifd.strips.len());
      let mut strip_lengths = Vec::with_capacity(ifd.strips.len());
      for strip in &ifd.strips {
        strip_offsets.push(out.len() as u32);
        strip_lengths.push(strip.len() as u32);
        out.extend_from_slice(strip);
      }

      // The zeroth directory is rebuilt from the property collection; any
      // chained directory keeps its original fields.
      let mut fields = if i == 0 {
        let mut fields: Vec<InteropValue> = Vec::new();
        for prop in self.properties.in_ifd(Ifd::Zeroth) {
          let wire = prop.interop(endian);
          match fields.iter_mut().find(|f| f.tag == wire.tag) {
            Some(slot) => *slot = wire,
            None => fields.push(wire),
          }
        }
        fields
      } else {
        ifd.fields.clone()
      };

      // Stale strip layout tags are replaced by the regenerated pair.
      fields.retain(|f| f.tag != STRIP_OFFSETS && f.tag != STRIP_BYTE_COUNTS);
      if !ifd.strips.is_empty() {
        fields.push(InteropValue::from_longs(STRIP_OFFSETS, &strip_offsets, endian));
        fields.push(InteropValue::from_longs(STRIP_BYTE_COUNTS, &strip_lengths, endian));
      }

      let dir_start = writer::write_plain_ifd(&mut out, &fields, endian);
      endian.put_u32(&mut out, link_slot, dir_start as u32);
      // The next-IFD slot written by write_plain_ifd sits right after the
      // entry table.
      link_slot = dir_start + 2 + 12 * fields.len();
    }
    out
  }

  /// Remove all metadata except the baseline structural whitelist.
  pub fn crush(&mut self) {
    let whitelist: Vec<Tag> = CRUSH_WHITELIST.iter().map(|&t| Tag::Zeroth(t)).collect();
    self.properties.keep(&whitelist);
    for ifd in &mut self.ifds {
      ifd.fields.retain(|f| TiffTag::from_u16(f.tag).is_some_and(|t| CRUSH_WHITELIST.contains(&t)));
    }
  }
}

fn read_strips(data: &[u8], endian: Endian, fields: &[InteropValue], diags: &mut Vec<Diagnostic>) -> Vec<Vec<u8>> {
  let offsets = match fields.iter().find(|f| f.tag == STRIP_OFFSETS) {
    Some(f) => strip_values(f, endian),
    None => return Vec::new(),
  };
  let sizes = match fields.iter().find(|f| f.tag == STRIP_BYTE_COUNTS) {
    Some(f) => strip_values(f, endian),
    None => return Vec::new(),
  };
  if offsets.len() != sizes.len() {
    diags.push(Diagnostic::warning(format!(
      "Can't read strips: offsets has len {} but sizes has len {}.",
      offsets.len(),
      sizes.len()
    )));
    return Vec::new();
  }
  let mut strips = Vec::with_capacity(offsets.len());
  for (&offset, &size) in offsets.iter().zip(sizes.iter()) {
    let start = offset as usize;
    let end = start.saturating_add(size as usize);
    if end > data.len() {
      diags.push(Diagnostic::warning(format!("Strip at {:#x} (+{}) exceeds data length, dropped.", offset, size)));
      continue;
    }
    strips.push(data[start..end].to_vec());
  }
  strips
}

fn strip_values(field: &InteropValue, endian: Endian) -> Vec<u32> {
  match field.type_code {
    TypeCode::Short => field.to_shorts(endian).iter().map(|&v| v as u32).collect(),
    TypeCode::Long => field.to_longs(endian),
    _ => Vec::new(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::props::PropertyValue;

  /// Little-endian TIFF with one strip and a few metadata fields.
  fn sample_tiff() -> Vec<u8> {
    let strip = [0x11u8, 0x22, 0x33, 0x44, 0x55, 0x66];
    let mut buf = Vec::new();
    buf.extend_from_slice(b"II");
    buf.extend_from_slice(&42u16.to_le_bytes());
    buf.extend_from_slice(&8u32.to_le_bytes());
    // IFD at 8 with 5 fields; out-of-line data begins at 8+2+60+4 = 74.
    let entries: Vec<(u16, u16, u32, [u8; 4])> = vec![
      (256, 3, 1, [3, 0, 0, 0]),                    // ImageWidth = 3
      (257, 3, 1, [2, 0, 0, 0]),                    // ImageLength = 2
      (271, 2, 10, 74u32.to_le_bytes()),            // Make, out of line
      (273, 4, 1, 84u32.to_le_bytes()),             // StripOffsets
      (279, 4, 1, (strip.len() as u32).to_le_bytes()), // StripByteCounts
    ];
    buf.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    for (tag, typ, count, slot) in entries {
      buf.extend_from_slice(&tag.to_le_bytes());
      buf.extend_from_slice(&typ.to_le_bytes());
      buf.extend_from_slice(&count.to_le_bytes());
      buf.extend_from_slice(&slot);
    }
    buf.extend_from_slice(&0u32.to_le_bytes());
    assert_eq!(buf.len(), 74);
    buf.extend_from_slice(b"imagemeta\0");
    assert_eq!(buf.len(), 84);
    buf.extend_from_slice(&strip);
    buf
  }

  #[test]
  fn decode_reads_fields_and_strips() {
    let tiff = TiffFile::decode(&sample_tiff(), TextEncoding::default()).unwrap();
    assert!(tiff.diags.is_empty());
    assert_eq!(tiff.ifds.len(), 1);
    assert_eq!(tiff.ifds[0].strips.len(), 1);
    assert_eq!(tiff.ifds[0].strips[0], vec![0x11, 0x22, 0x33, 0x44, 0x55, 0x66]);
    let make = tiff.properties.get(Tag::Zeroth(TiffTag::Make)).unwrap();
    assert_eq!(make.value().as_str(), Some("imagemeta"));
  }

  #[test]
  fn save_round_trips_strips_and_metadata() {
    let mut tiff = TiffFile::decode(&sample_tiff(), TextEncoding::default()).unwrap();
    tiff.properties.set_str(Tag::Zeroth(TiffTag::Software), "exiflab");
    let bytes = tiff.encode();

    let again = TiffFile::decode(&bytes, TextEncoding::default()).unwrap();
    assert!(again.diags.is_empty());
    assert_eq!(again.ifds[0].strips[0], vec![0x11, 0x22, 0x33, 0x44, 0x55, 0x66]);
    assert_eq!(again.properties.get(Tag::Zeroth(TiffTag::Software)).unwrap().value().as_str(), Some("exiflab"));
    assert_eq!(again.properties.get(Tag::Zeroth(TiffTag::Make)).unwrap().value().as_str(), Some("imagemeta"));
    assert_eq!(
      again.properties.get(Tag::Zeroth(TiffTag::ImageWidth)).unwrap().value(),
      &PropertyValue::Short(3)
    );
  }

  #[test]
  fn crush_keeps_only_the_whitelist() {
    let mut tiff = TiffFile::decode(&sample_tiff(), TextEncoding::default()).unwrap();
    tiff.properties.set_str(Tag::Zeroth(TiffTag::Artist), "somebody");
    tiff.crush();
    let bytes = tiff.encode();

    let again = TiffFile::decode(&bytes, TextEncoding::default()).unwrap();
    for prop in again.properties.iter() {
      match prop.tag() {
        Tag::Zeroth(t) => assert!(CRUSH_WHITELIST.contains(&t), "unexpected tag {:?} after crush", t),
        other => panic!("unexpected directory after crush: {:?}", other),
      }
    }
    // The structural fields and pixel data survive.
    assert!(again.properties.contains(Tag::Zeroth(TiffTag::ImageWidth)));
    assert_eq!(again.ifds[0].strips[0].len(), 6);
    assert!(!again.properties.contains(Tag::Zeroth(TiffTag::Make)));
  }
}
