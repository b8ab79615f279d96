// SPDX-License-Identifier: MIT

//! JPEG marker-segment framing and APP0/APP1 metadata rewriting.
//!
//! Decoding splits the byte stream into sections. Saving re-emits every
//! section verbatim except the Exif APP1 and JFIF/JFXX APP0 headers, which
//! are regenerated from the property collection.

use log::debug;

use crate::bits::{BEu16, Endian};
use crate::formats::tiff::{reader, writer};
use crate::props::collection::PropertyCollection;
use crate::props::{JfifThumbnail, Property, PropertyValue, TextEncoding, ThumbnailFormat};
use crate::tags::{EnumKind, Ifd, JfifTag, JfxxTag, Tag};
use crate::{Diagnostic, Error, Result};

pub mod marker {
  pub const SOF0: u8 = 0xC0;
  pub const RST0: u8 = 0xD0;
  pub const RST7: u8 = 0xD7;
  pub const SOI: u8 = 0xD8;
  pub const EOI: u8 = 0xD9;
  pub const SOS: u8 = 0xDA;
  pub const EXP: u8 = 0xDF;
  pub const APP0: u8 = 0xE0;
  pub const APP1: u8 = 0xE1;
  pub const APP15: u8 = 0xEF;

  pub fn is_rst(m: u8) -> bool {
    (RST0..=RST7).contains(&m)
  }

  pub fn is_app(m: u8) -> bool {
    (APP0..=APP15).contains(&m)
  }

  pub fn has_length(m: u8) -> bool {
    m != SOI && m != EOI && !is_rst(m)
  }
}

const EXIF_HEADER: &[u8] = b"Exif\0\0";
const JFIF_HEADER: &[u8] = b"JFIF\0";
const JFXX_HEADER: &[u8] = b"JFXX\0";
const JFIF_DEFAULT_VERSION: u16 = 0x0102;

/// One marker section: the marker byte, its header bytes (without the
/// length field) and any entropy-coded data that followed it.
#[derive(Debug, Clone)]
pub struct JpegSegment {
  pub marker: u8,
  pub header: Vec<u8>,
  pub entropy: Vec<u8>,
}

impl JpegSegment {
  fn header_starts_with(&self, marker: u8, prefix: &[u8]) -> bool {
    self.marker == marker && self.header.len() >= prefix.len() && &self.header[..prefix.len()] == prefix
  }
}

/// A decoded JPEG file.
#[derive(Debug)]
pub struct JpegFile {
  pub properties: PropertyCollection,
  pub diags: Vec<Diagnostic>,
  segments: Vec<JpegSegment>,
  trailing: Vec<u8>,
  /// Byte order of the embedded Exif structure; kept on save.
  endian: Endian,
  thumbnail: Option<Vec<u8>>,
  maker_note_offset: u32,
  encoding: TextEncoding,
}

impl JpegFile {
  /// Decode a complete JPEG byte buffer.
  pub fn decode(data: &[u8], encoding: TextEncoding) -> Result<Self> {
    let segments = scan_segments(data)?;
    let mut file = Self {
      properties: PropertyCollection::new(),
      diags: Vec::new(),
      segments,
      trailing: Vec::new(),
      endian: Endian::Little,
      thumbnail: None,
      maker_note_offset: 0,
      encoding,
    };

    // Some proprietary tools append data past the EOI marker; keep it.
    let consumed: usize = file.segments.iter().map(segment_len).sum();
    if consumed < data.len() {
      file.diags.push(Diagnostic::info("Reading trailing data past end-of-image marker.".into()));
      file.trailing = data[consumed..].to_vec();
    }

    file.read_jfif_app0();
    file.read_jfxx_app0();
    file.read_exif_app1()?;
    Ok(file)
  }

  pub fn segments(&self) -> &[JpegSegment] {
    &self.segments
  }

  pub fn thumbnail(&self) -> Option<&[u8]> {
    self.thumbnail.as_deref()
  }

  pub fn set_thumbnail(&mut self, thumbnail: Option<Vec<u8>>) {
    self.thumbnail = thumbnail;
  }

  fn find_segment(&self, marker: u8, prefix: &[u8]) -> Option<usize> {
    self.segments.iter().position(|s| s.header_starts_with(marker, prefix))
  }

  fn read_exif_app1(&mut self) -> Result<()> {
    let index = match self.find_segment(marker::APP1, EXIF_HEADER) {
      Some(i) => i,
      None => return Ok(()),
    };
    let payload = &self.segments[index].header[EXIF_HEADER.len()..];
    let decoded = reader::decode_exif(payload, self.encoding)?;
    self.endian = decoded.endian;
    self.maker_note_offset = decoded.maker_note_offset;
    self.thumbnail = decoded.thumbnail;
    self.diags.extend(decoded.diags);
    for prop in decoded.properties {
      self.properties.add(prop);
    }
    Ok(())
  }

  fn read_jfif_app0(&mut self) {
    let index = match self.find_segment(marker::APP0, JFIF_HEADER) {
      Some(i) => i,
      None => return,
    };
    let header = &self.segments[index].header;
    if header.len() < 14 {
      self.diags.push(Diagnostic::warning("JFIF APP0 segment is too short.".into()));
      return;
    }
    let version = BEu16(header, 5);
    self.properties.add(Property::new(Tag::Jfif(JfifTag::Version), PropertyValue::Short(version)));
    self.properties.add(Property::new(
      Tag::Jfif(JfifTag::Units),
      PropertyValue::Enumerated { kind: EnumKind::JfifDensityUnit, value: header[7] as u16 },
    ));
    self.properties.add(Property::new(Tag::Jfif(JfifTag::XDensity), PropertyValue::Short(BEu16(header, 8))));
    self.properties.add(Property::new(Tag::Jfif(JfifTag::YDensity), PropertyValue::Short(BEu16(header, 10))));
    let x = header[12];
    let y = header[13];
    self.properties.add(Property::new(Tag::Jfif(JfifTag::XThumbnail), PropertyValue::Byte(x)));
    self.properties.add(Property::new(Tag::Jfif(JfifTag::YThumbnail), PropertyValue::Byte(y)));
    let want = 3 * x as usize * y as usize;
    let pixels = header[14..].iter().copied().take(want).collect::<Vec<u8>>();
    if pixels.len() < want {
      self.diags.push(Diagnostic::warning("JFIF thumbnail data is truncated.".into()));
    }
    self.properties.add(Property::new(
      Tag::Jfif(JfifTag::Thumbnail),
      PropertyValue::Thumbnail(JfifThumbnail::rgb24(pixels)),
    ));
  }

  fn read_jfxx_app0(&mut self) {
    let index = match self.find_segment(marker::APP0, JFXX_HEADER) {
      Some(i) => i,
      None => return,
    };
    let header = self.segments[index].header.clone();
    if header.len() < 6 {
      self.diags.push(Diagnostic::warning("JFXX APP0 segment is too short.".into()));
      return;
    }
    let code = header[5];
    self.properties.add(Property::new(
      Tag::Jfxx(JfxxTag::ExtensionCode),
      PropertyValue::Enumerated { kind: EnumKind::JfxxExtension, value: code as u16 },
    ));
    match code {
      0x10 => {
        self.properties.add(Property::new(
          Tag::Jfxx(JfxxTag::Thumbnail),
          PropertyValue::Thumbnail(JfifThumbnail::jpeg(header[6..].to_vec())),
        ));
      }
      0x13 => {
        if header.len() < 8 {
          self.diags.push(Diagnostic::warning("JFXX RGB thumbnail header is truncated.".into()));
          return;
        }
        let x = header[6];
        let y = header[7];
        self.properties.add(Property::new(Tag::Jfxx(JfxxTag::XThumbnail), PropertyValue::Byte(x)));
        self.properties.add(Property::new(Tag::Jfxx(JfxxTag::YThumbnail), PropertyValue::Byte(y)));
        let want = 3 * x as usize * y as usize;
        let pixels = header[8..].iter().copied().take(want).collect::<Vec<u8>>();
        if pixels.len() < want {
          self.diags.push(Diagnostic::warning("JFXX RGB thumbnail data is truncated.".into()));
        }
        self.properties.add(Property::new(
          Tag::Jfxx(JfxxTag::Thumbnail),
          PropertyValue::Thumbnail(JfifThumbnail::rgb24(pixels)),
        ));
      }
      0x11 => {
        if header.len() < 8 + 768 {
          self.diags.push(Diagnostic::warning("JFXX palette thumbnail header is truncated.".into()));
          return;
        }
        let x = header[6];
        let y = header[7];
        self.properties.add(Property::new(Tag::Jfxx(JfxxTag::XThumbnail), PropertyValue::Byte(x)));
        self.properties.add(Property::new(Tag::Jfxx(JfxxTag::YThumbnail), PropertyValue::Byte(y)));
        let palette = header[8..8 + 768].to_vec();
        let want = x as usize * y as usize;
        let pixels = header[8 + 768..].iter().copied().take(want).collect::<Vec<u8>>();
        if pixels.len() < want {
          self.diags.push(Diagnostic::warning("JFXX palette thumbnail data is truncated.".into()));
        }
        self.properties.add(Property::new(
          Tag::Jfxx(JfxxTag::Thumbnail),
          PropertyValue::Thumbnail(JfifThumbnail::palette(palette, pixels)),
        ));
      }
      other => {
        self.diags.push(Diagnostic::warning(format!("Unknown JFXX extension code {:#04x}.", other)));
      }
    }
  }

  /// Serialize the file. Unchanged sections and entropy data are re-emitted
  /// byte for byte; only the metadata segments are rebuilt.
  ///
  /// Maker-note preservation is best effort: the blob is held at its
  /// original offset with filler bytes, but absolute pointers inside it
  /// that reference bytes outside the blob may still desync.
  pub fn encode(&mut self) -> Result<Vec<u8>> {
    self.write_jfif_app0();
    self.write_jfxx_app0();
    self.write_exif_app1();

    let mut out = Vec::new();
    for segment in &self.segments {
      // A header longer than the 16-bit length field can carry is not
      // representable in the format.
      if segment.header.len() + 2 > u16::MAX as usize {
        return Err(Error::SegmentTooLarge(segment.marker));
      }
      // APP segments whose payload was removed are dropped entirely.
      if marker::is_app(segment.marker) && segment.header.is_empty() {
        continue;
      }
      out.push(0xFF);
      out.push(segment.marker);
      if marker::has_length(segment.marker) {
        out.extend_from_slice(&((segment.header.len() as u16 + 2).to_be_bytes()));
        out.extend_from_slice(&segment.header);
      }
      out.extend_from_slice(&segment.entropy);
    }
    out.extend_from_slice(&self.trailing);
    Ok(out)
  }

  fn write_exif_app1(&mut self) {
    let encoded = writer::encode_exif(&self.properties, self.thumbnail.as_deref(), self.endian, self.maker_note_offset, true);
    let index = self.find_segment(marker::APP1, EXIF_HEADER);
    match encoded {
      None => {
        if let Some(i) = index {
          self.diags.push(Diagnostic::info("Removing unused Exif APP1 segment.".into()));
          self.segments[i].header.clear();
        }
      }
      Some(encoded) => {
        self.diags.extend(encoded.diags);
        let mut header = EXIF_HEADER.to_vec();
        header.extend_from_slice(&encoded.data);
        match index {
          Some(i) => self.segments[i].header = header,
          None => {
            // A fresh APP1 goes right after the last APP0 segment, or
            // after SOI when there is none.
            let insert = self
              .segments
              .iter()
              .rposition(|s| s.marker == marker::APP0)
              .map(|i| i + 1)
              .unwrap_or(1);
            self.segments.insert(insert, JpegSegment { marker: marker::APP1, header, entropy: Vec::new() });
          }
        }
      }
    }
  }

  fn write_jfif_app0(&mut self) {
    let index = self.find_segment(marker::APP0, JFIF_HEADER);
    if !self.properties.has_ifd(Ifd::Jfif) {
      if let Some(i) = index {
        self.diags.push(Diagnostic::info("Removing unused JFIF APP0 segment.".into()));
        self.segments[i].header.clear();
      }
      return;
    }

    let mut header = JFIF_HEADER.to_vec();
    let version = self.jfif_u16(JfifTag::Version, JFIF_DEFAULT_VERSION, "Adding missing JFIF version tag.");
    header.extend_from_slice(&version.to_be_bytes());
    let units = self.jfif_u16(JfifTag::Units, 0, "Adding missing JFIF density unit tag.");
    header.push(units as u8);
    let xdensity = self.jfif_u16(JfifTag::XDensity, 1, "Adding missing JFIF X density tag.");
    header.extend_from_slice(&xdensity.to_be_bytes());
    let ydensity = self.jfif_u16(JfifTag::YDensity, 1, "Adding missing JFIF Y density tag.");
    header.extend_from_slice(&ydensity.to_be_bytes());
    let x = self.jfif_u16(JfifTag::XThumbnail, 0, "Adding missing JFIF X thumbnail pixel count tag.");
    let y = self.jfif_u16(JfifTag::YThumbnail, 0, "Adding missing JFIF Y thumbnail pixel count tag.");
    header.push(x as u8);
    header.push(y as u8);
    if let Some(prop) = self.properties.get(Tag::Jfif(JfifTag::Thumbnail)) {
      if let PropertyValue::Thumbnail(thumb) = prop.value() {
        header.extend_from_slice(&thumb.pixels);
      }
    }

    match index {
      Some(i) => self.segments[i].header = header,
      None => {
        // JFIF APP0 belongs directly after SOI.
        self.segments.insert(1, JpegSegment { marker: marker::APP0, header, entropy: Vec::new() });
      }
    }
  }

  fn jfif_u16(&mut self, tag: JfifTag, default: u16, missing_msg: &str) -> u16 {
    match self.properties.get(Tag::Jfif(tag)).and_then(|p| p.value().as_u32()) {
      Some(v) => v as u16,
      None => {
        self.diags.push(Diagnostic::info(missing_msg.into()));
        default
      }
    }
  }

  fn write_jfxx_app0(&mut self) {
    let index = self.find_segment(marker::APP0, JFXX_HEADER);
    if !self.properties.has_ifd(Ifd::Jfxx) {
      if let Some(i) = index {
        self.diags.push(Diagnostic::info("Removing unused JFXX APP0 segment.".into()));
        self.segments[i].header.clear();
      }
      return;
    }

    let mut header = JFXX_HEADER.to_vec();
    let thumb = match self.properties.get(Tag::Jfxx(JfxxTag::Thumbnail)).map(|p| p.value().clone()) {
      Some(PropertyValue::Thumbnail(t)) => t,
      _ => {
        self.diags.push(Diagnostic::warning("JFXX properties without a thumbnail, segment dropped.".into()));
        if let Some(i) = index {
          self.segments[i].header.clear();
        }
        return;
      }
    };
    let x = self.properties.get(Tag::Jfxx(JfxxTag::XThumbnail)).and_then(|p| p.value().as_u32()).unwrap_or(0) as u8;
    let y = self.properties.get(Tag::Jfxx(JfxxTag::YThumbnail)).and_then(|p| p.value().as_u32()).unwrap_or(0) as u8;
    match thumb.format {
      ThumbnailFormat::Jpeg => {
        header.push(0x10);
        header.extend_from_slice(&thumb.pixels);
      }
      ThumbnailFormat::Rgb24 => {
        header.push(0x13);
        header.push(x);
        header.push(y);
        header.extend_from_slice(&thumb.pixels);
      }
      ThumbnailFormat::Palette => {
        header.push(0x11);
        header.push(x);
        header.push(y);
        let mut palette = thumb.palette.clone();
        palette.resize(768, 0);
        header.extend_from_slice(&palette);
        header.extend_from_slice(&thumb.pixels);
      }
    }

    match index {
      Some(i) => self.segments[i].header = header,
      None => {
        let insert = self.segments.iter().rposition(|s| s.marker == marker::APP0).map(|i| i + 1).unwrap_or(1);
        self.segments.insert(insert, JpegSegment { marker: marker::APP0, header, entropy: Vec::new() });
      }
    }
  }

  /// Remove all metadata, keeping only the markers needed to decode the
  /// image: SOF0..EXP, which covers DQT, DHT, DAC, DNL, DRI, DHP, EXP,
  /// RSTn, SOS, SOI and EOI.
  pub fn crush(&mut self) {
    self.properties.clear();
    self.thumbnail = None;
    self.maker_note_offset = 0;
    self.segments.retain(|s| (marker::SOF0..=marker::EXP).contains(&s.marker));
  }
}

fn segment_len(segment: &JpegSegment) -> usize {
  let mut len = 2;
  if marker::has_length(segment.marker) {
    len += 2 + segment.header.len();
  }
  len + segment.entropy.len()
}

/// Split a JPEG byte stream into marker sections.
fn scan_segments(data: &[u8]) -> Result<Vec<JpegSegment>> {
  if data.len() < 2 || data[0] != 0xFF || data[1] != marker::SOI {
    return Err(Error::InvalidJpeg("missing SOI marker".into()));
  }

  let mut segments = Vec::new();
  let mut pos = 0usize;
  while pos < data.len() {
    if pos + 2 > data.len() {
      return Err(Error::InvalidJpeg("truncated marker".into()));
    }
    if data[pos] != 0xFF || data[pos + 1] == 0x00 || data[pos + 1] == 0xFF {
      return Err(Error::InvalidJpeg(format!("invalid marker {:02x} {:02x} at {:#x}", data[pos], data[pos + 1], pos)));
    }
    let m = data[pos + 1];
    pos += 2;

    let mut header = Vec::new();
    if marker::has_length(m) {
      if pos + 2 > data.len() {
        return Err(Error::InvalidJpeg("truncated segment length".into()));
      }
      let length = BEu16(data, pos) as usize;
      if length < 2 || pos + length > data.len() {
        return Err(Error::InvalidJpeg(format!("segment length {} out of bounds at {:#x}", length, pos)));
      }
      header = data[pos + 2..pos + length].to_vec();
      pos += length;
    }

    // SOS and RST sections are followed by entropy-coded data running up to
    // the next real marker; 0xFF00 byte stuffing and 0xFF fill bytes do not
    // terminate it.
    let mut entropy = Vec::new();
    if m == marker::SOS || marker::is_rst(m) {
      let (captured, next) = scan_entropy(data, pos);
      entropy = captured;
      pos = next;
    }

    debug!("JPEG segment {:#04x}, header {} bytes, entropy {} bytes", m, header.len(), entropy.len());
    segments.push(JpegSegment { marker: m, header, entropy });

    if m == marker::EOI {
      break;
    }
  }
  Ok(segments)
}

fn scan_entropy(data: &[u8], start: usize) -> (Vec<u8>, usize) {
  let mut i = start;
  loop {
    while i < data.len() && data[i] != 0xFF {
      i += 1;
    }
    if i >= data.len() {
      return (data[start..].to_vec(), data.len());
    }
    // Skip fill bytes (repeated 0xFF).
    let mut j = i + 1;
    while j < data.len() && data[j] == 0xFF {
      j += 1;
    }
    if j >= data.len() {
      return (data[start..].to_vec(), data.len());
    }
    if data[j] != 0x00 {
      // A real marker begins at the last 0xFF.
      return (data[start..j - 1].to_vec(), j - 1);
    }
    i = j + 1;
  }
}
