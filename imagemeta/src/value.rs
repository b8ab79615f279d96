// SPDX-License-Identifier: MIT

use std::fmt::Display;

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::bits::Endian;

/// Fraction stored as two 32-bit unsigned integers.
///
/// The numerator and denominator are kept exactly as given; construction
/// never reduces, so a value read from a file round-trips bit for bit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Copy)]
pub struct Rational {
  pub n: u32,
  pub d: u32,
}

impl Rational {
  pub fn new(n: u32, d: u32) -> Self {
    Self { n, d }
  }

  /// Best rational approximation of `value` by continued-fraction expansion,
  /// reduced to lowest terms. Negative and non-finite inputs yield `0/1`;
  /// values beyond the representable range saturate.
  pub fn from_f64(value: f64) -> Self {
    if !value.is_finite() || value <= 0.0 {
      return Self::new(0, 1);
    }
    if value >= u32::MAX as f64 {
      return Self::new(u32::MAX, 1);
    }
    let (n, d) = continued_fraction(value, u32::MAX as u64);
    Self::new(n as u32, d as u32)
  }

  /// Numerator divided by denominator. A zero denominator yields `0.0`, the
  /// same policy used everywhere a malformed field degrades instead of
  /// failing.
  pub fn to_f64(&self) -> f64 {
    if self.d == 0 { 0.0 } else { self.n as f64 / self.d as f64 }
  }
}

impl Display for Rational {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_fmt(format_args!("{}/{}", self.n, self.d))
  }
}

impl Serialize for Rational {
  fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    let s = format!("{}/{}", self.n, self.d);
    serializer.serialize_str(&s)
  }
}

impl<'de> Deserialize<'de> for Rational {
  fn deserialize<D>(deserializer: D) -> std::result::Result<Rational, D::Error>
  where
    D: Deserializer<'de>,
  {
    use serde::de::Error;
    let s = String::deserialize(deserializer)?;
    let values: Vec<&str> = s.split('/').collect();
    if values.len() != 2 {
      Err(D::Error::custom(format!("Invalid rational value: {}", s)))
    } else {
      Ok(Rational::new(
        values[0].parse::<u32>().map_err(D::Error::custom)?,
        values[1].parse::<u32>().map_err(D::Error::custom)?,
      ))
    }
  }
}

/// Fraction stored as two 32-bit signed integers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Copy)]
pub struct SRational {
  pub n: i32,
  pub d: i32,
}

impl SRational {
  pub fn new(n: i32, d: i32) -> Self {
    Self { n, d }
  }

  /// See [`Rational::from_f64`]; the sign is carried on the numerator.
  pub fn from_f64(value: f64) -> Self {
    if !value.is_finite() || value == 0.0 {
      return Self::new(0, 1);
    }
    if value.abs() >= i32::MAX as f64 {
      return Self::new(if value < 0.0 { i32::MIN + 1 } else { i32::MAX }, 1);
    }
    let (n, d) = continued_fraction(value.abs(), i32::MAX as u64);
    let n = n as i32;
    Self::new(if value < 0.0 { -n } else { n }, d as i32)
  }

  /// See [`Rational::to_f64`]; a zero denominator yields `0.0`.
  pub fn to_f64(&self) -> f64 {
    if self.d == 0 { 0.0 } else { self.n as f64 / self.d as f64 }
  }
}

impl Display for SRational {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_fmt(format_args!("{}/{}", self.n, self.d))
  }
}

impl Serialize for SRational {
  fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    let s = format!("{}/{}", self.n, self.d);
    serializer.serialize_str(&s)
  }
}

impl<'de> Deserialize<'de> for SRational {
  fn deserialize<D>(deserializer: D) -> std::result::Result<SRational, D::Error>
  where
    D: Deserializer<'de>,
  {
    use serde::de::Error;
    let s = String::deserialize(deserializer)?;
    let values: Vec<&str> = s.split('/').collect();
    if values.len() != 2 {
      Err(D::Error::custom(format!("Invalid srational value: {}", s)))
    } else {
      Ok(SRational::new(
        values[0].parse::<i32>().map_err(D::Error::custom)?,
        values[1].parse::<i32>().map_err(D::Error::custom)?,
      ))
    }
  }
}

fn continued_fraction(value: f64, max_den: u64) -> (u64, u64) {
  let mut x = value;
  let (mut n0, mut d0) = (0_u64, 1_u64);
  let (mut n1, mut d1) = (1_u64, 0_u64);
  for _ in 0..64 {
    let a = x.floor();
    if a >= max_den as f64 {
      break;
    }
    let a_int = a as u64;
    let n2 = a_int.saturating_mul(n1).saturating_add(n0);
    let d2 = a_int.saturating_mul(d1).saturating_add(d0);
    if n2 > max_den || d2 > max_den {
      break;
    }
    n0 = n1;
    d0 = d1;
    n1 = n2;
    d1 = d2;
    let frac = x - a;
    if frac < 1e-10 {
      break;
    }
    x = 1.0 / frac;
  }
  if d1 == 0 { (0, 1) } else { (n1, d1) }
}

/// On-disk field type codes defined by the TIFF 6.0 / Exif 2.3 specifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize)]
#[repr(u16)]
pub enum TypeCode {
  Byte = 1,
  Ascii = 2,
  Short = 3,
  Long = 4,
  Rational = 5,
  SByte = 6,
  Undefined = 7,
  SShort = 8,
  SLong = 9,
  SRational = 10,
  Float = 11,
  Double = 12,
}

impl TypeCode {
  /// Size in bytes of a single component of this type.
  pub fn size(self) -> usize {
    match self {
      Self::Byte | Self::Ascii | Self::SByte | Self::Undefined => 1,
      Self::Short | Self::SShort => 2,
      Self::Long | Self::SLong | Self::Float => 4,
      Self::Rational | Self::SRational | Self::Double => 8,
    }
  }
}

/// The wire-level form of one decoded field: tag id, type code, component
/// count and raw bytes in a specific byte order.
///
/// This is the single exchange format between typed properties and the
/// directory codecs. Invariant: `data.len() == count * type_code.size()`;
/// for `Ascii` and `Undefined` the count is simply the byte length.
#[derive(Debug, Clone, PartialEq)]
pub struct InteropValue {
  pub tag: u16,
  pub type_code: TypeCode,
  pub count: u32,
  pub data: Vec<u8>,
}

impl Display for InteropValue {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_fmt(format_args!(
      "Tag: {}, Type: {:?}, Count: {}, Data Length: {}",
      self.tag,
      self.type_code,
      self.count,
      self.data.len()
    ))
  }
}

impl InteropValue {
  pub fn new(tag: u16, type_code: TypeCode, count: u32, data: Vec<u8>) -> Self {
    Self { tag, type_code, count, data }
  }

  pub fn byte_len(&self) -> usize {
    self.data.len()
  }

  pub fn from_bytes(tag: u16, values: &[u8]) -> Self {
    Self::new(tag, TypeCode::Byte, values.len() as u32, values.to_vec())
  }

  pub fn from_sbytes(tag: u16, values: &[i8]) -> Self {
    let data = values.iter().map(|v| *v as u8).collect::<Vec<u8>>();
    Self::new(tag, TypeCode::SByte, values.len() as u32, data)
  }

  pub fn from_undefined(tag: u16, values: &[u8]) -> Self {
    Self::new(tag, TypeCode::Undefined, values.len() as u32, values.to_vec())
  }

  /// ASCII data carries a trailing NUL; count includes it.
  pub fn from_ascii(tag: u16, value: &str) -> Self {
    let mut data = value.as_bytes().to_vec();
    data.push(0);
    Self::new(tag, TypeCode::Ascii, data.len() as u32, data)
  }

  pub fn from_shorts(tag: u16, values: &[u16], endian: Endian) -> Self {
    let mut data = Vec::with_capacity(values.len() * 2);
    for v in values {
      endian.write_u16(&mut data, *v);
    }
    Self::new(tag, TypeCode::Short, values.len() as u32, data)
  }

  pub fn from_sshorts(tag: u16, values: &[i16], endian: Endian) -> Self {
    let mut data = Vec::with_capacity(values.len() * 2);
    for v in values {
      endian.write_i16(&mut data, *v);
    }
    Self::new(tag, TypeCode::SShort, values.len() as u32, data)
  }

  pub fn from_longs(tag: u16, values: &[u32], endian: Endian) -> Self {
    let mut data = Vec::with_capacity(values.len() * 4);
    for v in values {
      endian.write_u32(&mut data, *v);
    }
    Self::new(tag, TypeCode::Long, values.len() as u32, data)
  }

  pub fn from_slongs(tag: u16, values: &[i32], endian: Endian) -> Self {
    let mut data = Vec::with_capacity(values.len() * 4);
    for v in values {
      endian.write_i32(&mut data, *v);
    }
    Self::new(tag, TypeCode::SLong, values.len() as u32, data)
  }

  pub fn from_rationals(tag: u16, values: &[Rational], endian: Endian) -> Self {
    let mut data = Vec::with_capacity(values.len() * 8);
    for v in values {
      endian.write_u32(&mut data, v.n);
      endian.write_u32(&mut data, v.d);
    }
    Self::new(tag, TypeCode::Rational, values.len() as u32, data)
  }

  pub fn from_srationals(tag: u16, values: &[SRational], endian: Endian) -> Self {
    let mut data = Vec::with_capacity(values.len() * 8);
    for v in values {
      endian.write_i32(&mut data, v.n);
      endian.write_i32(&mut data, v.d);
    }
    Self::new(tag, TypeCode::SRational, values.len() as u32, data)
  }

  pub fn from_floats(tag: u16, values: &[f32], endian: Endian) -> Self {
    let mut data = Vec::with_capacity(values.len() * 4);
    for v in values {
      endian.write_f32(&mut data, *v);
    }
    Self::new(tag, TypeCode::Float, values.len() as u32, data)
  }

  pub fn from_doubles(tag: u16, values: &[f64], endian: Endian) -> Self {
    let mut data = Vec::with_capacity(values.len() * 8);
    for v in values {
      endian.write_f64(&mut data, *v);
    }
    Self::new(tag, TypeCode::Double, values.len() as u32, data)
  }

  pub fn to_shorts(&self, endian: Endian) -> Vec<u16> {
    self.data.chunks_exact(2).map(|c| endian.read_u16(c, 0)).collect()
  }

  pub fn to_sshorts(&self, endian: Endian) -> Vec<i16> {
    self.data.chunks_exact(2).map(|c| endian.read_i16(c, 0)).collect()
  }

  pub fn to_longs(&self, endian: Endian) -> Vec<u32> {
    self.data.chunks_exact(4).map(|c| endian.read_u32(c, 0)).collect()
  }

  pub fn to_slongs(&self, endian: Endian) -> Vec<i32> {
    self.data.chunks_exact(4).map(|c| endian.read_i32(c, 0)).collect()
  }

  pub fn to_rationals(&self, endian: Endian) -> Vec<Rational> {
    self
      .data
      .chunks_exact(8)
      .map(|c| Rational::new(endian.read_u32(c, 0), endian.read_u32(c, 4)))
      .collect()
  }

  pub fn to_srationals(&self, endian: Endian) -> Vec<SRational> {
    self
      .data
      .chunks_exact(8)
      .map(|c| SRational::new(endian.read_i32(c, 0), endian.read_i32(c, 4)))
      .collect()
  }

  pub fn to_floats(&self, endian: Endian) -> Vec<f32> {
    self.data.chunks_exact(4).map(|c| endian.read_f32(c, 0)).collect()
  }

  pub fn to_doubles(&self, endian: Endian) -> Vec<f64> {
    self.data.chunks_exact(8).map(|c| endian.read_f64(c, 0)).collect()
  }
}
