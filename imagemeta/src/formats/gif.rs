// SPDX-License-Identifier: MIT

//! GIF block framing: logical screen descriptor, color tables, image
//! descriptors and extension blocks with their length-prefixed sub-blocks.

use log::debug;

use crate::props::collection::PropertyCollection;
use crate::props::{Property, PropertyValue, TextEncoding};
use crate::tags::{GifTag, Tag};
use crate::{Diagnostic, Error, Result};

const SEPARATOR_IMAGE: u8 = 0x2C;
const SEPARATOR_EXTENSION: u8 = 0x21;
const SEPARATOR_TERMINATOR: u8 = 0x3B;

const LABEL_GRAPHIC_CONTROL: u8 = 0xF9;
const LABEL_COMMENT: u8 = 0xFE;
const LABEL_PLAIN_TEXT: u8 = 0x01;
const LABEL_APPLICATION: u8 = 0xFF;

/// Image descriptor block with its local color table and raster data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GifImageDescriptor {
  pub left: u16,
  pub top: u16,
  pub width: u16,
  pub height: u16,
  pub has_lct: bool,
  pub interlaced: bool,
  pub lct_sorted: bool,
  pub reserved: u8,
  /// Size exponent of the local color table; table length is `2^size`.
  pub lct_size: u8,
  pub lct: Vec<u8>,
  pub lzw_min_code_size: u8,
  pub data: Vec<Vec<u8>>,
}

/// Graphic control extension; the packed byte decomposed into its fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GifGraphicControl {
  pub reserved: u8,
  pub disposal_method: u8,
  pub user_input_flag: bool,
  pub transparent_color_flag: bool,
  /// Delay in hundredths of a second.
  pub delay_time: u16,
  pub transparent_color_index: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GifPlainText {
  pub left: u16,
  pub top: u16,
  pub width: u16,
  pub height: u16,
  pub cell_width: u8,
  pub cell_height: u8,
  pub foreground_color_index: u8,
  pub background_color_index: u8,
  pub data: Vec<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GifApplication {
  pub identifier: [u8; 8],
  pub auth_code: [u8; 3],
  pub data: Vec<Vec<u8>>,
}

/// One block of the GIF data stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GifBlock {
  ImageDescriptor(GifImageDescriptor),
  GraphicControl(GifGraphicControl),
  Comment(Vec<Vec<u8>>),
  PlainText(GifPlainText),
  Application(GifApplication),
  /// Extension with a label this codec does not interpret; carried
  /// verbatim.
  UnknownExtension { label: u8, data: Vec<Vec<u8>> },
  Terminator,
}

/// A decoded GIF file.
#[derive(Debug)]
pub struct GifFile {
  pub properties: PropertyCollection,
  pub diags: Vec<Diagnostic>,
  pub version: String,
  pub screen_width: u16,
  pub screen_height: u16,
  pub has_gct: bool,
  pub color_resolution: u8,
  pub gct_sorted: bool,
  /// Size exponent of the global color table; table length is `2^size`.
  pub gct_size: u8,
  pub backcolor_index: u8,
  pub pixel_aspect_ratio: u8,
  gct: Vec<u8>,
  blocks: Vec<GifBlock>,
  encoding: TextEncoding,
}

struct ByteReader<'a> {
  data: &'a [u8],
  pos: usize,
}

impl<'a> ByteReader<'a> {
  fn new(data: &'a [u8]) -> Self {
    Self { data, pos: 0 }
  }

  fn u8(&mut self) -> Option<u8> {
    let v = *self.data.get(self.pos)?;
    self.pos += 1;
    Some(v)
  }

  fn u16_le(&mut self) -> Option<u16> {
    let bytes = self.take(2)?;
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
  }

  fn take(&mut self, n: usize) -> Option<&'a [u8]> {
    if self.pos + n > self.data.len() {
      return None;
    }
    let slice = &self.data[self.pos..self.pos + n];
    self.pos += n;
    Some(slice)
  }

  /// Length-prefixed sub-blocks up to (and consuming) the zero-length
  /// terminator.
  fn sub_blocks(&mut self) -> Vec<Vec<u8>> {
    let mut blocks = Vec::new();
    loop {
      let Some(count) = self.u8() else { break };
      if count == 0 {
        break;
      }
      match self.take(count as usize) {
        Some(data) => blocks.push(data.to_vec()),
        None => break,
      }
    }
    blocks
  }
}

impl GifFile {
  /// Decode a complete GIF byte buffer.
  pub fn decode(data: &[u8], encoding: TextEncoding) -> Result<Self> {
    if data.len() < 13 || &data[0..3] != b"GIF" {
      return Err(Error::InvalidGif("missing GIF header".into()));
    }
    let version: String = data[3..6].iter().map(|&b| b as char).collect();

    let mut r = ByteReader::new(&data[6..]);
    let screen_width = r.u16_le().expect("length checked above");
    let screen_height = r.u16_le().expect("length checked above");
    let packed = r.u8().expect("length checked above");
    let has_gct = packed & 0x80 != 0;
    let color_resolution = ((packed >> 4) & 0x07) + 1;
    let gct_sorted = packed & 0x08 != 0;
    let gct_size = (packed & 0x07) + 1;
    let backcolor_index = r.u8().expect("length checked above");
    let pixel_aspect_ratio = r.u8().expect("length checked above");

    let mut diags = Vec::new();
    let gct = if has_gct {
      let len = 3 * (1usize << gct_size);
      match r.take(len) {
        Some(table) => table.to_vec(),
        None => return Err(Error::InvalidGif("truncated global color table".into())),
      }
    } else {
      Vec::new()
    };

    let mut blocks = Vec::new();
    loop {
      let Some(separator) = r.u8() else { break };
      match separator {
        SEPARATOR_TERMINATOR => {
          blocks.push(GifBlock::Terminator);
          break;
        }
        SEPARATOR_IMAGE => {
          let Some(block) = read_image_descriptor(&mut r) else {
            diags.push(Diagnostic::warning("Truncated image descriptor block.".into()));
            break;
          };
          blocks.push(GifBlock::ImageDescriptor(block));
        }
        SEPARATOR_EXTENSION => {
          let Some(label) = r.u8() else { break };
          match label {
            LABEL_GRAPHIC_CONTROL => match read_graphic_control(&mut r) {
              Some(block) => blocks.push(GifBlock::GraphicControl(block)),
              None => {
                diags.push(Diagnostic::warning("Truncated graphic control extension.".into()));
                break;
              }
            },
            LABEL_COMMENT => blocks.push(GifBlock::Comment(r.sub_blocks())),
            LABEL_PLAIN_TEXT => match read_plain_text(&mut r) {
              Some(block) => blocks.push(GifBlock::PlainText(block)),
              None => {
                diags.push(Diagnostic::warning("Truncated plain text extension.".into()));
                break;
              }
            },
            LABEL_APPLICATION => match read_application(&mut r) {
              Some(block) => blocks.push(GifBlock::Application(block)),
              None => {
                diags.push(Diagnostic::warning("Truncated application extension.".into()));
                break;
              }
            },
            other => {
              debug!("Unknown GIF extension label {:#04x}, preserved verbatim", other);
              blocks.push(GifBlock::UnknownExtension { label: other, data: r.sub_blocks() });
            }
          }
        }
        other => {
          return Err(Error::InvalidGif(format!("unknown block separator {:#04x}", other)));
        }
      }
    }

    if !matches!(blocks.last(), Some(GifBlock::Terminator)) {
      blocks.push(GifBlock::Terminator);
    }

    let mut file = Self {
      properties: PropertyCollection::new(),
      diags,
      version,
      screen_width,
      screen_height,
      has_gct,
      color_resolution,
      gct_sorted,
      gct_size,
      backcolor_index,
      pixel_aspect_ratio,
      gct,
      blocks,
      encoding,
    };
    file.read_metadata();
    Ok(file)
  }

  pub fn blocks(&self) -> &[GifBlock] {
    &self.blocks
  }

  /// First graphic control extension, if any.
  pub fn graphic_control(&self) -> Option<&GifGraphicControl> {
    self.blocks.iter().find_map(|b| match b {
      GifBlock::GraphicControl(gce) => Some(gce),
      _ => None,
    })
  }

  fn read_metadata(&mut self) {
    for block in &self.blocks {
      if let GifBlock::Comment(data) = block {
        let joined: Vec<u8> = data.iter().flatten().copied().collect();
        let text = self.encoding.decode(&joined);
        self.properties.add(Property::new(Tag::Gif(GifTag::Comment), PropertyValue::Ascii(text)));
      }
    }
  }

  /// Serialize the file. Comment blocks are regenerated from the property
  /// collection and re-inserted at the position of the original comment
  /// they replace, or before the terminator for newly added ones.
  pub fn encode(&mut self) -> Vec<u8> {
    self.write_metadata();

    let mut out = Vec::new();
    out.extend_from_slice(b"GIF");
    out.extend_from_slice(&self.version.bytes().take(3).collect::<Vec<u8>>());
    out.extend_from_slice(&self.screen_width.to_le_bytes());
    out.extend_from_slice(&self.screen_height.to_le_bytes());
    let mut packed = 0u8;
    if self.has_gct {
      packed |= 0x80;
    }
    packed |= (self.color_resolution - 1) << 4;
    if self.gct_sorted {
      packed |= 0x08;
    }
    packed |= self.gct_size - 1;
    out.push(packed);
    out.push(self.backcolor_index);
    out.push(self.pixel_aspect_ratio);
    out.extend_from_slice(&self.gct);

    for block in &self.blocks {
      match block {
        GifBlock::ImageDescriptor(id) => {
          out.push(SEPARATOR_IMAGE);
          out.extend_from_slice(&id.left.to_le_bytes());
          out.extend_from_slice(&id.top.to_le_bytes());
          out.extend_from_slice(&id.width.to_le_bytes());
          out.extend_from_slice(&id.height.to_le_bytes());
          let mut packed = 0u8;
          if id.has_lct {
            packed |= 0x80;
          }
          if id.interlaced {
            packed |= 0x40;
          }
          if id.lct_sorted {
            packed |= 0x20;
          }
          packed |= (id.reserved & 0x03) << 3;
          packed |= id.lct_size - 1;
          out.push(packed);
          out.extend_from_slice(&id.lct);
          out.push(id.lzw_min_code_size);
          write_sub_blocks(&mut out, &id.data);
        }
        GifBlock::GraphicControl(gce) => {
          out.push(SEPARATOR_EXTENSION);
          out.push(LABEL_GRAPHIC_CONTROL);
          out.push(4);
          let mut packed = 0u8;
          packed |= (gce.reserved & 0x07) << 5;
          packed |= (gce.disposal_method & 0x07) << 2;
          if gce.user_input_flag {
            packed |= 0x02;
          }
          if gce.transparent_color_flag {
            packed |= 0x01;
          }
          out.push(packed);
          out.extend_from_slice(&gce.delay_time.to_le_bytes());
          out.push(gce.transparent_color_index);
          out.push(0);
        }
        GifBlock::Comment(data) => {
          out.push(SEPARATOR_EXTENSION);
          out.push(LABEL_COMMENT);
          write_sub_blocks(&mut out, data);
        }
        GifBlock::PlainText(pt) => {
          out.push(SEPARATOR_EXTENSION);
          out.push(LABEL_PLAIN_TEXT);
          out.push(12);
          out.extend_from_slice(&pt.left.to_le_bytes());
          out.extend_from_slice(&pt.top.to_le_bytes());
          out.extend_from_slice(&pt.width.to_le_bytes());
          out.extend_from_slice(&pt.height.to_le_bytes());
          out.push(pt.cell_width);
          out.push(pt.cell_height);
          out.push(pt.foreground_color_index);
          out.push(pt.background_color_index);
          write_sub_blocks(&mut out, &pt.data);
        }
        GifBlock::Application(app) => {
          out.push(SEPARATOR_EXTENSION);
          out.push(LABEL_APPLICATION);
          out.push(11);
          out.extend_from_slice(&app.identifier);
          out.extend_from_slice(&app.auth_code);
          write_sub_blocks(&mut out, &app.data);
        }
        GifBlock::UnknownExtension { label, data } => {
          out.push(SEPARATOR_EXTENSION);
          out.push(*label);
          write_sub_blocks(&mut out, data);
        }
        GifBlock::Terminator => {
          out.push(SEPARATOR_TERMINATOR);
        }
      }
    }
    // The block list always carries a terminator, but a caller that
    // manipulated blocks() gets one re-synthesized anyway.
    if !matches!(self.blocks.last(), Some(GifBlock::Terminator)) {
      out.push(SEPARATOR_TERMINATOR);
    }
    out
  }

  fn write_metadata(&mut self) {
    // Drop the decoded comment blocks, remembering where they sat.
    let mut anchors = Vec::new();
    let mut kept = Vec::with_capacity(self.blocks.len());
    for block in self.blocks.drain(..) {
      if matches!(block, GifBlock::Comment(_)) {
        anchors.push(kept.len());
      } else {
        kept.push(block);
      }
    }
    self.blocks = kept;

    let comments: Vec<String> = self
      .properties
      .get_all(Tag::Gif(GifTag::Comment))
      .iter()
      .filter_map(|p| p.value().as_str().map(str::to_owned))
      .collect();

    for (k, text) in comments.iter().enumerate() {
      let raw = self.encoding.encode(text);
      let data: Vec<Vec<u8>> = raw.chunks(255).map(|c| c.to_vec()).collect();
      let at = anchors.get(k).copied().unwrap_or_else(|| {
        // Before the trailing terminator.
        if matches!(self.blocks.last(), Some(GifBlock::Terminator)) {
          self.blocks.len() - 1
        } else {
          self.blocks.len()
        }
      });
      self.blocks.insert(at.min(self.blocks.len()), GifBlock::Comment(data));
      for anchor in anchors.iter_mut().skip(k + 1) {
        *anchor += 1;
      }
    }
  }

  /// Remove comment metadata; raster structure stays untouched.
  pub fn crush(&mut self) {
    self.properties.clear();
    self.blocks.retain(|b| !matches!(b, GifBlock::Comment(_)));
  }
}

fn read_image_descriptor(r: &mut ByteReader<'_>) -> Option<GifImageDescriptor> {
  let left = r.u16_le()?;
  let top = r.u16_le()?;
  let width = r.u16_le()?;
  let height = r.u16_le()?;
  let packed = r.u8()?;
  let has_lct = packed & 0x80 != 0;
  let interlaced = packed & 0x40 != 0;
  let lct_sorted = packed & 0x20 != 0;
  let reserved = (packed >> 3) & 0x03;
  let lct_size = (packed & 0x07) + 1;
  let lct = if has_lct { r.take(3 * (1usize << lct_size))?.to_vec() } else { Vec::new() };
  let lzw_min_code_size = r.u8()?;
  let data = r.sub_blocks();
  Some(GifImageDescriptor {
    left,
    top,
    width,
    height,
    has_lct,
    interlaced,
    lct_sorted,
    reserved,
    lct_size,
    lct,
    lzw_min_code_size,
    data,
  })
}

fn read_graphic_control(r: &mut ByteReader<'_>) -> Option<GifGraphicControl> {
  let _size = r.u8()?; // always 4
  let packed = r.u8()?;
  let gce = GifGraphicControl {
    reserved: (packed >> 5) & 0x07,
    disposal_method: (packed >> 2) & 0x07,
    user_input_flag: packed & 0x02 != 0,
    transparent_color_flag: packed & 0x01 != 0,
    delay_time: r.u16_le()?,
    transparent_color_index: r.u8()?,
  };
  let _term = r.u8()?;
  Some(gce)
}

fn read_plain_text(r: &mut ByteReader<'_>) -> Option<GifPlainText> {
  let _size = r.u8()?; // always 12
  Some(GifPlainText {
    left: r.u16_le()?,
    top: r.u16_le()?,
    width: r.u16_le()?,
    height: r.u16_le()?,
    cell_width: r.u8()?,
    cell_height: r.u8()?,
    foreground_color_index: r.u8()?,
    background_color_index: r.u8()?,
    data: r.sub_blocks(),
  })
}

fn read_application(r: &mut ByteReader<'_>) -> Option<GifApplication> {
  let _size = r.u8()?; // always 11
  let identifier: [u8; 8] = r.take(8)?.try_into().ok()?;
  let auth_code: [u8; 3] = r.take(3)?.try_into().ok()?;
  Some(GifApplication {
    identifier,
    auth_code,
    data: r.sub_blocks(),
  })
}

fn write_sub_blocks(out: &mut Vec<u8>, data: &[Vec<u8>]) {
  for sub in data {
    out.push(sub.len() as u8);
    out.extend_from_slice(sub);
  }
  out.push(0);
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sample_gif() -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"GIF89a");
    out.extend_from_slice(&2u16.to_le_bytes()); // width
    out.extend_from_slice(&1u16.to_le_bytes()); // height
    // GCT present, color resolution 8, table size exponent 1 (2 entries)
    out.push(0x80 | 0x70 | 0x00);
    out.push(0); // background index
    out.push(0); // aspect ratio
    out.extend_from_slice(&[0, 0, 0, 255, 255, 255]); // 2-entry GCT
    // Graphic control: disposal 2, transparent flag set, delay 500
    out.extend_from_slice(&[0x21, 0xF9, 4, 0b0000_1001, 0xF4, 0x01, 7, 0]);
    // Comment "hi"
    out.extend_from_slice(&[0x21, 0xFE, 2, b'h', b'i', 0]);
    // Image descriptor 2x1, no LCT, lzw min code size 2, one sub-block
    out.push(0x2C);
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.push(0x00);
    out.push(2);
    out.extend_from_slice(&[3, 0x44, 0x01, 0x05, 0]);
    out.push(0x3B);
    out
  }

  #[test]
  fn screen_descriptor_bits_decode() {
    let gif = GifFile::decode(&sample_gif(), TextEncoding::default()).unwrap();
    assert_eq!(gif.version, "89a");
    assert_eq!(gif.screen_width, 2);
    assert_eq!(gif.screen_height, 1);
    assert!(gif.has_gct);
    assert_eq!(gif.color_resolution, 8);
    assert_eq!(gif.gct_size, 1);
  }

  #[test]
  fn graphic_control_packed_byte_decodes() {
    let gif = GifFile::decode(&sample_gif(), TextEncoding::default()).unwrap();
    let gce = gif.graphic_control().expect("GCE present");
    assert_eq!(gce.disposal_method, 2);
    assert!(gce.transparent_color_flag);
    assert!(!gce.user_input_flag);
    assert_eq!(gce.delay_time, 500);
    assert_eq!(gce.transparent_color_index, 7);
  }

  #[test]
  fn comment_becomes_a_property() {
    let gif = GifFile::decode(&sample_gif(), TextEncoding::default()).unwrap();
    let comment = gif.properties.get(Tag::Gif(GifTag::Comment)).unwrap();
    assert_eq!(comment.value().as_str(), Some("hi"));
  }

  #[test]
  fn unchanged_file_round_trips_exactly() {
    let original = sample_gif();
    let mut gif = GifFile::decode(&original, TextEncoding::default()).unwrap();
    assert_eq!(gif.encode(), original);
  }

  #[test]
  fn comment_edit_keeps_position() {
    let mut gif = GifFile::decode(&sample_gif(), TextEncoding::default()).unwrap();
    gif.properties.set_str(Tag::Gif(GifTag::Comment), "rewritten");
    let saved = gif.encode();
    let again = GifFile::decode(&saved, TextEncoding::default()).unwrap();
    assert_eq!(again.properties.get(Tag::Gif(GifTag::Comment)).unwrap().value().as_str(), Some("rewritten"));
    // The comment still sits between the GCE and the image descriptor.
    assert!(matches!(again.blocks()[0], GifBlock::GraphicControl(_)));
    assert!(matches!(again.blocks()[1], GifBlock::Comment(_)));
    assert!(matches!(again.blocks()[2], GifBlock::ImageDescriptor(_)));
  }

  #[test]
  fn missing_terminator_is_resynthesized() {
    let mut bytes = sample_gif();
    bytes.pop(); // drop the trailer
    let mut gif = GifFile::decode(&bytes, TextEncoding::default()).unwrap();
    assert!(matches!(gif.blocks().last(), Some(GifBlock::Terminator)));
    let saved = gif.encode();
    assert_eq!(saved.last(), Some(&SEPARATOR_TERMINATOR));
  }

  #[test]
  fn crush_drops_comments_only() {
    let mut gif = GifFile::decode(&sample_gif(), TextEncoding::default()).unwrap();
    gif.crush();
    let saved = gif.encode();
    let again = GifFile::decode(&saved, TextEncoding::default()).unwrap();
    assert!(again.properties.is_empty());
    assert!(again.blocks().iter().any(|b| matches!(b, GifBlock::ImageDescriptor(_))));
    assert!(again.graphic_control().is_some());
  }

  #[test]
  fn unknown_separator_is_fatal() {
    let mut bytes = sample_gif();
    // Replace the GCE introducer (first byte after the global color
    // table) with garbage.
    bytes[19] = 0x99;
    assert!(matches!(GifFile::decode(&bytes, TextEncoding::default()), Err(Error::InvalidGif(_))));
  }
}
