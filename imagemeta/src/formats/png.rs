// SPDX-License-Identifier: MIT

//! PNG chunk framing and text/time metadata chunks.
//!
//! Unlike the IFD codec, chunk corruption here is fatal: PNG carries its own
//! CRC-32 per chunk, and a mismatch means the container's integrity
//! mechanism itself has failed.

use chrono::{NaiveDate, NaiveDateTime};
use libflate::zlib::{Decoder, Encoder};
use log::debug;
use std::io::{Read, Write};

use crate::bits::BEu32;
use crate::props::collection::PropertyCollection;
use crate::props::{PngText, PngTextIntl, Property, PropertyValue, TextEncoding};
use crate::tags::{PngTag, Tag};
use crate::{Diagnostic, Error, Result};

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// One PNG chunk: its four-character type and raw data.
#[derive(Debug, Clone)]
pub struct PngChunk {
  pub ctype: [u8; 4],
  pub data: Vec<u8>,
}

impl PngChunk {
  pub fn new(ctype: [u8; 4], data: Vec<u8>) -> Self {
    Self { ctype, data }
  }

  /// Critical chunks have an uppercase first letter (IHDR, PLTE, IDAT,
  /// IEND); everything else is ancillary and safe to strip.
  pub fn is_critical(&self) -> bool {
    self.ctype[0].is_ascii_uppercase()
  }

  pub fn crc(&self) -> u32 {
    crc32(&self.ctype, &self.data)
  }

  fn has_type(&self, ctype: &[u8; 4]) -> bool {
    &self.ctype == ctype
  }
}

/// CRC-32 over chunk type and data (ISO 3309 polynomial, bitwise form).
fn crc32(ctype: &[u8], data: &[u8]) -> u32 {
  let mut crc = 0xFFFF_FFFF_u32;
  for &byte in ctype.iter().chain(data.iter()) {
    crc ^= byte as u32;
    for _ in 0..8 {
      if crc & 1 != 0 {
        crc = (crc >> 1) ^ 0xEDB8_8320;
      } else {
        crc >>= 1;
      }
    }
  }
  !crc
}

/// A decoded PNG file.
#[derive(Debug)]
pub struct PngFile {
  pub properties: PropertyCollection,
  pub diags: Vec<Diagnostic>,
  chunks: Vec<PngChunk>,
}

impl PngFile {
  /// Decode a complete PNG byte buffer.
  pub fn decode(data: &[u8], _encoding: TextEncoding) -> Result<Self> {
    if data.len() < PNG_SIGNATURE.len() || &data[..PNG_SIGNATURE.len()] != PNG_SIGNATURE {
      return Err(Error::InvalidPng("missing PNG signature".into()));
    }

    let mut chunks = Vec::new();
    let mut pos = PNG_SIGNATURE.len();
    while pos < data.len() {
      if pos + 8 > data.len() {
        return Err(Error::InvalidPng("truncated chunk header".into()));
      }
      let length = BEu32(data, pos) as usize;
      let ctype: [u8; 4] = data[pos + 4..pos + 8].try_into().expect("slice length is 4");
      pos += 8;
      if pos + length + 4 > data.len() {
        return Err(Error::InvalidPng(format!("truncated {} chunk", type_name(&ctype))));
      }
      let chunk = PngChunk::new(ctype, data[pos..pos + length].to_vec());
      let stored_crc = BEu32(data, pos + length);
      if chunk.crc() != stored_crc {
        return Err(Error::InvalidPng(format!("CRC mismatch in {} chunk", type_name(&ctype))));
      }
      pos += length + 4;
      debug!("PNG chunk {} ({} bytes)", type_name(&chunk.ctype), chunk.data.len());
      chunks.push(chunk);
    }

    let mut file = Self {
      properties: PropertyCollection::new(),
      diags: Vec::new(),
      chunks,
    };
    file.read_metadata();
    Ok(file)
  }

  pub fn chunks(&self) -> &[PngChunk] {
    &self.chunks
  }

  fn read_metadata(&mut self) {
    let latin1 = TextEncoding::Latin1;
    let mut props = Vec::new();

    for chunk in &self.chunks {
      if chunk.has_type(b"tEXt") || chunk.has_type(b"zTXt") {
        let Some(sep) = chunk.data.iter().position(|&b| b == 0) else {
          self.diags.push(Diagnostic::warning(format!("{} chunk without keyword separator.", type_name(&chunk.ctype))));
          continue;
        };
        let keyword = latin1.decode(&chunk.data[..sep]);
        if chunk.has_type(b"tEXt") {
          let text = latin1.decode(&chunk.data[sep + 1..]);
          props.push(Property::new(tag_from_keyword(&keyword), PropertyValue::PngText(PngText::latin1(keyword, text, false))));
        } else {
          // zTXt: a compression method byte, then a zlib stream.
          if chunk.data.len() < sep + 2 {
            self.diags.push(Diagnostic::warning("zTXt chunk is truncated.".into()));
            continue;
          }
          match inflate(&chunk.data[sep + 2..]) {
            Ok(raw) => {
              let text = latin1.decode(&raw);
              props.push(Property::new(tag_from_keyword(&keyword), PropertyValue::PngText(PngText::latin1(keyword, text, true))));
            }
            Err(err) => {
              self.diags.push(Diagnostic::warning(format!("zTXt chunk {:?} failed to inflate: {}.", keyword, err)));
            }
          }
        }
      } else if chunk.has_type(b"iTXt") {
        match decode_itxt(&chunk.data) {
          Ok(text) => props.push(Property::new(tag_from_keyword(&text.keyword), PropertyValue::PngText(text))),
          Err(msg) => self.diags.push(Diagnostic::warning(format!("iTXt chunk skipped: {}.", msg))),
        }
      } else if chunk.has_type(b"tIME") {
        if chunk.data.len() < 7 {
          self.diags.push(Diagnostic::warning("tIME chunk is truncated.".into()));
          continue;
        }
        let year = u16::from_be_bytes([chunk.data[0], chunk.data[1]]) as i32;
        let date = NaiveDate::from_ymd_opt(year, chunk.data[2] as u32, chunk.data[3] as u32)
          .and_then(|d| d.and_hms_opt(chunk.data[4] as u32, chunk.data[5] as u32, chunk.data[6] as u32));
        match date {
          Some(dt) => props.push(Property::new(Tag::Png(PngTag::TimeStamp), PropertyValue::DateTime(dt))),
          None => self.diags.push(Diagnostic::warning("tIME chunk holds an invalid timestamp.".into())),
        }
      }
    }

    for prop in props {
      self.properties.add(prop);
    }
  }

  /// Serialize the file: all previously decoded text/time chunks are
  /// dropped and regenerated from the property collection, inserted just
  /// before the terminal IEND chunk.
  pub fn encode(&mut self) -> Vec<u8> {
    if !self.chunks.last().map(|c| c.has_type(b"IEND")).unwrap_or(false) {
      self.chunks.push(PngChunk::new(*b"IEND", Vec::new()));
    }
    self.write_metadata();

    let mut out = PNG_SIGNATURE.to_vec();
    for chunk in &self.chunks {
      out.extend_from_slice(&(chunk.data.len() as u32).to_be_bytes());
      out.extend_from_slice(&chunk.ctype);
      out.extend_from_slice(&chunk.data);
      out.extend_from_slice(&chunk.crc().to_be_bytes());
    }
    out
  }

  fn write_metadata(&mut self) {
    self
      .chunks
      .retain(|c| !(c.has_type(b"tEXt") || c.has_type(b"zTXt") || c.has_type(b"iTXt") || c.has_type(b"tIME")));
    let insert_at = self.chunks.len() - 1; // before IEND

    let mut generated = Vec::new();
    for prop in self.properties.iter() {
      let Tag::Png(png_tag) = prop.tag() else { continue };
      match prop.value() {
        PropertyValue::PngText(text) => generated.push(encode_text_chunk(text)),
        PropertyValue::DateTime(dt) => generated.push(encode_time_chunk(dt)),
        // Plain string properties added by callers get the canonical
        // keyword of their tag and an uncompressed tEXt chunk.
        PropertyValue::Ascii(s) => {
          let text = PngText::latin1(canonical_keyword(png_tag), s.clone(), false);
          generated.push(encode_text_chunk(&text));
        }
        other => {
          self.diags.push(Diagnostic::warning(format!("PNG property {} has unsupported value {}, dropped.", prop.name(), other)));
        }
      }
    }
    for (i, chunk) in generated.into_iter().enumerate() {
      self.chunks.insert(insert_at + i, chunk);
    }
  }

  /// Remove all ancillary chunks, keeping only the critical ones.
  pub fn crush(&mut self) {
    self.properties.clear();
    self.chunks.retain(|c| c.is_critical());
  }
}

fn decode_itxt(data: &[u8]) -> std::result::Result<PngText, String> {
  let latin1 = TextEncoding::Latin1;
  let sep = data.iter().position(|&b| b == 0).ok_or("missing keyword separator")?;
  let keyword = latin1.decode(&data[..sep]);
  if data.len() < sep + 3 {
    return Err("truncated flags".into());
  }
  let compressed = data[sep + 1] == 1;
  let rest = &data[sep + 3..];
  let lang_sep = rest.iter().position(|&b| b == 0).ok_or("missing language separator")?;
  let language = latin1.decode(&rest[..lang_sep]);
  let rest = &rest[lang_sep + 1..];
  let trans_sep = rest.iter().position(|&b| b == 0).ok_or("missing translated keyword separator")?;
  let translated_keyword = String::from_utf8_lossy(&rest[..trans_sep]).into_owned();
  let body = &rest[trans_sep + 1..];
  let text = if compressed {
    String::from_utf8_lossy(&inflate(body).map_err(|e| e.to_string())?).into_owned()
  } else {
    String::from_utf8_lossy(body).into_owned()
  };
  Ok(PngText {
    keyword,
    text,
    compressed,
    international: Some(PngTextIntl { language, translated_keyword }),
  })
}

fn encode_text_chunk(text: &PngText) -> PngChunk {
  let latin1 = TextEncoding::Latin1;
  match &text.international {
    None => {
      let mut data = latin1.encode(&text.keyword);
      data.push(0);
      if text.compressed {
        data.push(0); // compression method: deflate
        data.extend_from_slice(&deflate(&latin1.encode(&text.text)));
        PngChunk::new(*b"zTXt", data)
      } else {
        data.extend_from_slice(&latin1.encode(&text.text));
        PngChunk::new(*b"tEXt", data)
      }
    }
    Some(intl) => {
      let mut data = latin1.encode(&text.keyword);
      data.push(0);
      data.push(text.compressed as u8);
      data.push(0); // compression method
      data.extend_from_slice(&latin1.encode(&intl.language));
      data.push(0);
      data.extend_from_slice(intl.translated_keyword.as_bytes());
      data.push(0);
      if text.compressed {
        data.extend_from_slice(&deflate(text.text.as_bytes()));
      } else {
        data.extend_from_slice(text.text.as_bytes());
      }
      PngChunk::new(*b"iTXt", data)
    }
  }
}

fn encode_time_chunk(dt: &NaiveDateTime) -> PngChunk {
  use chrono::{Datelike, Timelike};
  let mut data = Vec::with_capacity(7);
  data.extend_from_slice(&(dt.year() as u16).to_be_bytes());
  data.push(dt.month() as u8);
  data.push(dt.day() as u8);
  data.push(dt.hour() as u8);
  data.push(dt.minute() as u8);
  data.push(dt.second() as u8);
  PngChunk::new(*b"tIME", data)
}

fn inflate(data: &[u8]) -> std::io::Result<Vec<u8>> {
  let mut decoder = Decoder::new(data)?;
  let mut out = Vec::new();
  decoder.read_to_end(&mut out)?;
  Ok(out)
}

fn deflate(data: &[u8]) -> Vec<u8> {
  let mut encoder = Encoder::new(Vec::new()).expect("in-memory zlib encoder");
  encoder.write_all(data).expect("in-memory write");
  encoder.finish().into_result().expect("in-memory zlib finish")
}

fn type_name(ctype: &[u8; 4]) -> String {
  ctype.iter().map(|&b| b as char).collect()
}

/// Map a text-chunk keyword onto its tag; unrecognized keywords become the
/// generic text tag instead of failing.
fn tag_from_keyword(keyword: &str) -> Tag {
  let tag = if keyword.eq_ignore_ascii_case("Title") {
    PngTag::Title
  } else if keyword.eq_ignore_ascii_case("Author") {
    PngTag::Author
  } else if keyword.eq_ignore_ascii_case("Description") {
    PngTag::Description
  } else if keyword.eq_ignore_ascii_case("Copyright") {
    PngTag::Copyright
  } else if keyword.eq_ignore_ascii_case("Creation Time") {
    PngTag::CreationTime
  } else if keyword.eq_ignore_ascii_case("Software") {
    PngTag::Software
  } else if keyword.eq_ignore_ascii_case("Disclaimer") {
    PngTag::Disclaimer
  } else if keyword.eq_ignore_ascii_case("Warning") {
    PngTag::Warning
  } else if keyword.eq_ignore_ascii_case("Source") {
    PngTag::Source
  } else if keyword.eq_ignore_ascii_case("Comment") {
    PngTag::Comment
  } else {
    PngTag::Text
  };
  Tag::Png(tag)
}

fn canonical_keyword(tag: PngTag) -> &'static str {
  match tag {
    PngTag::Title => "Title",
    PngTag::Author => "Author",
    PngTag::Description => "Description",
    PngTag::Copyright => "Copyright",
    PngTag::CreationTime => "Creation Time",
    PngTag::Software => "Software",
    PngTag::Disclaimer => "Disclaimer",
    PngTag::Warning => "Warning",
    PngTag::Source => "Source",
    PngTag::Comment => "Comment",
    _ => "Comment",
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn chunk_bytes(ctype: &[u8; 4], data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(ctype);
    out.extend_from_slice(data);
    out.extend_from_slice(&crc32(ctype, data).to_be_bytes());
    out
  }

  fn minimal_png(extra: &[Vec<u8>]) -> Vec<u8> {
    let mut out = PNG_SIGNATURE.to_vec();
    let ihdr = [0, 0, 0, 1, 0, 0, 0, 1, 8, 0, 0, 0, 0];
    out.extend_from_slice(&chunk_bytes(b"IHDR", &ihdr));
    out.extend_from_slice(&chunk_bytes(b"IDAT", &[0x78, 0x9c, 0x63, 0x60, 0x00, 0x00, 0x00, 0x02, 0x00, 0x01]));
    for chunk in extra {
      out.extend_from_slice(chunk);
    }
    out.extend_from_slice(&chunk_bytes(b"IEND", &[]));
    out
  }

  #[test]
  fn crc32_matches_png_reference() {
    // The CRC of "IEND" with no data is a well-known constant.
    assert_eq!(crc32(b"IEND", &[]), 0xAE42_6082);
  }

  #[test]
  fn crc_mismatch_is_fatal() {
    let mut bytes = minimal_png(&[]);
    let len = bytes.len();
    bytes[len - 5] ^= 0xFF; // corrupt IEND's CRC
    assert!(matches!(PngFile::decode(&bytes, TextEncoding::default()), Err(Error::InvalidPng(_))));
  }

  #[test]
  fn text_chunk_decodes() {
    let mut data = b"Comment\0".to_vec();
    data.extend_from_slice(b"hello png");
    let bytes = minimal_png(&[chunk_bytes(b"tEXt", &data)]);
    let png = PngFile::decode(&bytes, TextEncoding::default()).unwrap();
    let prop = png.properties.get(Tag::Png(PngTag::Comment)).unwrap();
    assert_eq!(prop.value().as_str(), Some("hello png"));
  }

  #[test]
  fn ztxt_round_trip() {
    let mut data = b"Comment\0\0".to_vec();
    data.extend_from_slice(&deflate(b"squeezed"));
    let bytes = minimal_png(&[chunk_bytes(b"zTXt", &data)]);
    let mut png = PngFile::decode(&bytes, TextEncoding::default()).unwrap();
    let prop = png.properties.get(Tag::Png(PngTag::Comment)).unwrap();
    match prop.value() {
      PropertyValue::PngText(t) => {
        assert_eq!(t.text, "squeezed");
        assert!(t.compressed);
      }
      other => panic!("unexpected value {:?}", other),
    }

    let saved = png.encode();
    let again = PngFile::decode(&saved, TextEncoding::default()).unwrap();
    let prop = again.properties.get(Tag::Png(PngTag::Comment)).unwrap();
    assert_eq!(prop.value().as_str(), Some("squeezed"));
  }

  #[test]
  fn time_chunk_round_trip() {
    let data = [0x07, 0xE5, 7, 4, 12, 30, 5];
    let bytes = minimal_png(&[chunk_bytes(b"tIME", &data)]);
    let mut png = PngFile::decode(&bytes, TextEncoding::default()).unwrap();
    let prop = png.properties.get(Tag::Png(PngTag::TimeStamp)).unwrap();
    assert!(matches!(prop.value(), PropertyValue::DateTime(_)));

    let saved = png.encode();
    let again = PngFile::decode(&saved, TextEncoding::default()).unwrap();
    assert!(again.properties.contains(Tag::Png(PngTag::TimeStamp)));
  }

  #[test]
  fn metadata_chunks_are_inserted_before_iend() {
    let bytes = minimal_png(&[]);
    let mut png = PngFile::decode(&bytes, TextEncoding::default()).unwrap();
    png.properties.add_str(Tag::Png(PngTag::Software), "exiflab");
    let saved = png.encode();
    let again = PngFile::decode(&saved, TextEncoding::default()).unwrap();
    let types: Vec<String> = again.chunks().iter().map(|c| type_name(&c.ctype)).collect();
    assert_eq!(types, vec!["IHDR", "IDAT", "tEXt", "IEND"]);
    assert_eq!(again.properties.get(Tag::Png(PngTag::Software)).unwrap().value().as_str(), Some("exiflab"));
  }

  #[test]
  fn untouched_pixel_chunks_round_trip_exactly() {
    let bytes = minimal_png(&[]);
    let mut png = PngFile::decode(&bytes, TextEncoding::default()).unwrap();
    assert_eq!(png.encode(), bytes);
  }

  #[test]
  fn crush_retains_critical_chunks_only() {
    let mut data = b"Comment\0x".to_vec();
    data.push(b'y');
    let bytes = minimal_png(&[chunk_bytes(b"tEXt", &data)]);
    let mut png = PngFile::decode(&bytes, TextEncoding::default()).unwrap();
    png.crush();
    let saved = png.encode();
    let again = PngFile::decode(&saved, TextEncoding::default()).unwrap();
    assert!(again.properties.is_empty());
    assert!(again.chunks().iter().all(|c| c.is_critical()));
  }
}
