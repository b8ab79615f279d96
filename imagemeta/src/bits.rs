// SPDX-License-Identifier: MIT

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};

/// Byte order of a serialized value.
///
/// All readers and writers in this crate take the byte order as an explicit
/// parameter; nothing relies on the host endianness.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Endian {
  Big,
  Little,
}

impl Default for Endian {
  fn default() -> Self {
    Self::Little
  }
}

impl Endian {
  #[inline]
  pub fn big(&self) -> bool {
    matches!(*self, Self::Big)
  }

  #[inline]
  pub fn little(&self) -> bool {
    matches!(*self, Self::Little)
  }

  /// The TIFF byte order marker, `II` or `MM`.
  pub fn tiff_marker(&self) -> [u8; 2] {
    match *self {
      Self::Big => [0x4d, 0x4d],
      Self::Little => [0x49, 0x49],
    }
  }

  #[inline]
  pub fn read_u8(&self, buf: &[u8], offset: usize) -> u8 {
    buf[offset]
  }

  #[inline]
  pub fn read_i8(&self, buf: &[u8], offset: usize) -> i8 {
    buf[offset] as i8
  }

  #[inline]
  pub fn read_u16(&self, buf: &[u8], offset: usize) -> u16 {
    match *self {
      Self::Big => BigEndian::read_u16(&buf[offset..]),
      Self::Little => LittleEndian::read_u16(&buf[offset..]),
    }
  }

  #[inline]
  pub fn read_i16(&self, buf: &[u8], offset: usize) -> i16 {
    match *self {
      Self::Big => BigEndian::read_i16(&buf[offset..]),
      Self::Little => LittleEndian::read_i16(&buf[offset..]),
    }
  }

  #[inline]
  pub fn read_u32(&self, buf: &[u8], offset: usize) -> u32 {
    match *self {
      Self::Big => BigEndian::read_u32(&buf[offset..]),
      Self::Little => LittleEndian::read_u32(&buf[offset..]),
    }
  }

  #[inline]
  pub fn read_i32(&self, buf: &[u8], offset: usize) -> i32 {
    match *self {
      Self::Big => BigEndian::read_i32(&buf[offset..]),
      Self::Little => LittleEndian::read_i32(&buf[offset..]),
    }
  }

  #[inline]
  pub fn read_f32(&self, buf: &[u8], offset: usize) -> f32 {
    match *self {
      Self::Big => BigEndian::read_f32(&buf[offset..]),
      Self::Little => LittleEndian::read_f32(&buf[offset..]),
    }
  }

  #[inline]
  pub fn read_f64(&self, buf: &[u8], offset: usize) -> f64 {
    match *self {
      Self::Big => BigEndian::read_f64(&buf[offset..]),
      Self::Little => LittleEndian::read_f64(&buf[offset..]),
    }
  }

  #[inline]
  pub fn write_u16(&self, buf: &mut Vec<u8>, n: u16) {
    let mut tmp = [0; 2];
    match *self {
      Self::Big => BigEndian::write_u16(&mut tmp, n),
      Self::Little => LittleEndian::write_u16(&mut tmp, n),
    }
    buf.extend_from_slice(&tmp);
  }

  #[inline]
  pub fn write_i16(&self, buf: &mut Vec<u8>, n: i16) {
    self.write_u16(buf, n as u16);
  }

  #[inline]
  pub fn write_u32(&self, buf: &mut Vec<u8>, n: u32) {
    let mut tmp = [0; 4];
    match *self {
      Self::Big => BigEndian::write_u32(&mut tmp, n),
      Self::Little => LittleEndian::write_u32(&mut tmp, n),
    }
    buf.extend_from_slice(&tmp);
  }

  #[inline]
  pub fn write_i32(&self, buf: &mut Vec<u8>, n: i32) {
    self.write_u32(buf, n as u32);
  }

  #[inline]
  pub fn write_f32(&self, buf: &mut Vec<u8>, n: f32) {
    let mut tmp = [0; 4];
    match *self {
      Self::Big => BigEndian::write_f32(&mut tmp, n),
      Self::Little => LittleEndian::write_f32(&mut tmp, n),
    }
    buf.extend_from_slice(&tmp);
  }

  #[inline]
  pub fn write_f64(&self, buf: &mut Vec<u8>, n: f64) {
    let mut tmp = [0; 8];
    match *self {
      Self::Big => BigEndian::write_f64(&mut tmp, n),
      Self::Little => LittleEndian::write_f64(&mut tmp, n),
    }
    buf.extend_from_slice(&tmp);
  }

  /// Re-order a run of fixed-width values from this byte order into `dest`
  /// in place, without going through a host-order intermediate. `width` is
  /// the component size in bytes; rationals are converted as two 4-byte
  /// halves.
  pub fn convert(&self, dest: Endian, buf: &mut [u8], width: usize) {
    if *self == dest || width < 2 {
      return;
    }
    for chunk in buf.chunks_exact_mut(width) {
      chunk.reverse();
    }
  }

  /// Overwrite a u32 already present in the buffer. The IFD writer patches
  /// pointer slots in place after the target directories have been written.
  #[inline]
  pub fn put_u32(&self, buf: &mut [u8], offset: usize, n: u32) {
    match *self {
      Self::Big => BigEndian::write_u32(&mut buf[offset..offset + 4], n),
      Self::Little => LittleEndian::write_u32(&mut buf[offset..offset + 4], n),
    }
  }

  #[inline]
  pub fn put_u16(&self, buf: &mut [u8], offset: usize, n: u16) {
    match *self {
      Self::Big => BigEndian::write_u16(&mut buf[offset..offset + 2], n),
      Self::Little => LittleEndian::write_u16(&mut buf[offset..offset + 2], n),
    }
  }
}

#[allow(non_snake_case)]
#[inline]
pub fn BEu16(buf: &[u8], pos: usize) -> u16 {
  BigEndian::read_u16(&buf[pos..pos + 2])
}

#[allow(non_snake_case)]
#[inline]
pub fn BEu32(buf: &[u8], pos: usize) -> u32 {
  BigEndian::read_u32(&buf[pos..pos + 4])
}

#[allow(non_snake_case)]
#[inline]
pub fn LEu16(buf: &[u8], pos: usize) -> u16 {
  LittleEndian::read_u16(&buf[pos..pos + 2])
}

#[allow(non_snake_case)]
#[inline]
pub fn LEu32(buf: &[u8], pos: usize) -> u32 {
  LittleEndian::read_u32(&buf[pos..pos + 4])
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn read_both_orders() {
    let buf = [0x12, 0x34, 0x56, 0x78];
    assert_eq!(Endian::Big.read_u16(&buf, 0), 0x1234);
    assert_eq!(Endian::Little.read_u16(&buf, 0), 0x3412);
    assert_eq!(Endian::Big.read_u32(&buf, 0), 0x12345678);
    assert_eq!(Endian::Little.read_u32(&buf, 0), 0x78563412);
    assert_eq!(Endian::Big.read_i16(&buf, 2), 0x5678);
  }

  #[test]
  fn write_then_read_round_trip() {
    for endian in [Endian::Big, Endian::Little] {
      let mut buf = Vec::new();
      endian.write_u16(&mut buf, 0xBEEF);
      endian.write_u32(&mut buf, 0xDEADBEEF);
      endian.write_f64(&mut buf, 0.5);
      assert_eq!(endian.read_u16(&buf, 0), 0xBEEF);
      assert_eq!(endian.read_u32(&buf, 2), 0xDEADBEEF);
      assert_eq!(endian.read_f64(&buf, 6), 0.5);
    }
  }

  #[test]
  fn convert_between_orders_in_place() {
    let mut buf = vec![0x12, 0x34, 0x56, 0x78];
    Endian::Big.convert(Endian::Little, &mut buf, 2);
    assert_eq!(buf, vec![0x34, 0x12, 0x78, 0x56]);
    // Same order is a no-op.
    Endian::Little.convert(Endian::Little, &mut buf, 2);
    assert_eq!(buf, vec![0x34, 0x12, 0x78, 0x56]);
  }

  #[test]
  fn patch_in_place() {
    let mut buf = vec![0; 8];
    Endian::Little.put_u32(&mut buf, 4, 0x01020304);
    assert_eq!(Endian::Little.read_u32(&buf, 4), 0x01020304);
    Endian::Big.put_u16(&mut buf, 0, 0x4243);
    assert_eq!(&buf[0..2], b"BC");
  }
}
