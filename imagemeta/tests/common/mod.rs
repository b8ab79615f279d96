// SPDX-License-Identifier: MIT

//! Synthetic fixture builders shared by the integration tests. No binary
//! assets: every container is assembled byte by byte.

#![allow(dead_code)]

use imagemeta::formats::png::PngChunk;

/// A minimal JPEG: SOI, an opaque APP7 segment, DQT, SOS with entropy data
/// (including a stuffed 0xFF00), EOI.
pub fn base_jpeg() -> Vec<u8> {
  let mut buf = vec![0xFF, 0xD8];
  // Unknown APP7 segment that must survive any rewrite verbatim.
  buf.extend_from_slice(&[0xFF, 0xE7, 0x00, 0x0A]);
  buf.extend_from_slice(b"OPAQUE-7" as &[u8]);
  // DQT stub
  buf.extend_from_slice(&[0xFF, 0xDB, 0x00, 0x04, 0xAA, 0xBB]);
  // SOS + entropy
  buf.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x03, 0x01]);
  buf.extend_from_slice(&[0x12, 0xFF, 0x00, 0x34, 0x56]);
  buf.extend_from_slice(&[0xFF, 0xD9]);
  buf
}

pub const JPEG_ENTROPY: &[u8] = &[0x12, 0xFF, 0x00, 0x34, 0x56];
pub const JPEG_APP7_PAYLOAD: &[u8] = b"OPAQUE-7";

fn chunk_bytes(ctype: [u8; 4], data: &[u8]) -> Vec<u8> {
  let chunk = PngChunk::new(ctype, data.to_vec());
  let mut out = Vec::new();
  out.extend_from_slice(&(data.len() as u32).to_be_bytes());
  out.extend_from_slice(&ctype);
  out.extend_from_slice(data);
  out.extend_from_slice(&chunk.crc().to_be_bytes());
  out
}

pub const PNG_IDAT: &[u8] = &[0x78, 0x9c, 0x63, 0x60, 0x00, 0x00, 0x00, 0x02, 0x00, 0x01];

/// A minimal PNG: signature, 1x1 IHDR, one IDAT, IEND.
pub fn base_png() -> Vec<u8> {
  let mut out = b"\x89PNG\r\n\x1a\n".to_vec();
  out.extend_from_slice(&chunk_bytes(*b"IHDR", &[0, 0, 0, 1, 0, 0, 0, 1, 8, 0, 0, 0, 0]));
  out.extend_from_slice(&chunk_bytes(*b"IDAT", PNG_IDAT));
  out.extend_from_slice(&chunk_bytes(*b"IEND", &[]));
  out
}

/// A minimal GIF89a: 2x1 screen with a 2-entry global color table, a
/// graphic control extension (disposal 2, transparency on, delay 500), a
/// comment, one image descriptor and the trailer.
pub fn base_gif() -> Vec<u8> {
  let mut out = Vec::new();
  out.extend_from_slice(b"GIF89a");
  out.extend_from_slice(&2u16.to_le_bytes());
  out.extend_from_slice(&1u16.to_le_bytes());
  out.push(0xF0); // GCT present, color resolution 8, size exponent 1
  out.push(0);
  out.push(0);
  out.extend_from_slice(&[0, 0, 0, 255, 255, 255]);
  out.extend_from_slice(&[0x21, 0xF9, 4, 0b0000_1001, 0xF4, 0x01, 7, 0]);
  out.extend_from_slice(&[0x21, 0xFE, 5, b'h', b'e', b'l', b'l', b'o', 0]);
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

pub const GIF_RASTER_SUB_BLOCK: &[u8] = &[3, 0x44, 0x01, 0x05, 0];

/// A minimal little-endian TIFF: one IFD holding ImageWidth, ImageLength,
/// Make and a single pixel strip.
pub fn base_tiff() -> Vec<u8> {
  let strip = [0x11u8, 0x22, 0x33, 0x44, 0x55, 0x66];
  let mut buf = Vec::new();
  buf.extend_from_slice(b"II");
  buf.extend_from_slice(&42u16.to_le_bytes());
  buf.extend_from_slice(&8u32.to_le_bytes());
  let entries: Vec<(u16, u16, u32, [u8; 4])> = vec![
    (256, 3, 1, [3, 0, 0, 0]),
    (257, 3, 1, [2, 0, 0, 0]),
    (271, 2, 10, 74u32.to_le_bytes()),
    (273, 4, 1, 84u32.to_le_bytes()),
    (279, 4, 1, (strip.len() as u32).to_le_bytes()),
  ];
  buf.extend_from_slice(&(entries.len() as u16).to_le_bytes());
  for (tag, typ, count, slot) in entries {
    buf.extend_from_slice(&tag.to_le_bytes());
    buf.extend_from_slice(&typ.to_le_bytes());
    buf.extend_from_slice(&count.to_le_bytes());
    buf.extend_from_slice(&slot);
  }
  buf.extend_from_slice(&0u32.to_le_bytes());
  buf.extend_from_slice(b"imagemeta\0");
  buf.extend_from_slice(&strip);
  buf
}

pub const TIFF_STRIP: &[u8] = &[0x11, 0x22, 0x33, 0x44, 0x55, 0x66];

/// Position of the first occurrence of `needle` in `haystack`.
pub fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
  haystack.windows(needle.len()).position(|w| w == needle)
}
