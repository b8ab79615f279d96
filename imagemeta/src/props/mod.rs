// SPDX-License-Identifier: MIT

//! Typed metadata properties.
//!
//! The on-disk `(type, count, bytes)` triple of every field is materialized
//! into one arm of [`PropertyValue`]. Conversion back to the wire form via
//! [`Property::interop`] is the only serialization path; the directory
//! writers never look inside a value.

pub mod collection;
pub mod enums;
pub mod factory;

use std::fmt::Display;

use chrono::{NaiveDate, NaiveDateTime};
use num_enum::TryFromPrimitive;

use crate::bits::Endian;
use crate::tags::{EnumKind, EnumStorage, Ifd, Tag, TagKind};
use crate::value::{InteropValue, Rational, SRational, TypeCode};
use crate::{Error, Result};

/// Text encoding applied to fields whose format does not self-describe one
/// (legacy Exif ASCII strings, GIF comments).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
  #[default]
  Utf8,
  Latin1,
  Ascii,
}

impl TextEncoding {
  pub fn decode(&self, raw: &[u8]) -> String {
    // Trim at the first NUL; Exif ASCII values carry a terminator.
    let end = raw.iter().position(|&c| c == 0).unwrap_or(raw.len());
    let raw = &raw[..end];
    match self {
      Self::Utf8 | Self::Ascii => String::from_utf8_lossy(raw).into_owned(),
      Self::Latin1 => raw.iter().map(|&c| c as char).collect(),
    }
  }

  pub fn encode(&self, text: &str) -> Vec<u8> {
    match self {
      Self::Utf8 => text.as_bytes().to_vec(),
      Self::Ascii => text.chars().map(|c| if c.is_ascii() { c as u8 } else { b'?' }).collect(),
      Self::Latin1 => text.chars().map(|c| if (c as u32) < 256 { c as u8 } else { b'?' }).collect(),
    }
  }
}

/// Character set id carried in the first 8 bytes of a UserComment field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
  Ascii,
  Jis,
  Unicode,
  Undefined,
}

impl Charset {
  pub fn prefix(&self) -> [u8; 8] {
    match self {
      Self::Ascii => *b"ASCII\0\0\0",
      Self::Jis => *b"JIS\0\0\0\0\0",
      Self::Unicode => *b"UNICODE\0",
      Self::Undefined => [0; 8],
    }
  }

  pub fn from_prefix(prefix: &[u8]) -> Self {
    if prefix.len() < 8 {
      return Self::Undefined;
    }
    match &prefix[0..8] {
      b"ASCII\0\0\0" => Self::Ascii,
      b"JIS\0\0\0\0\0" => Self::Jis,
      b"UNICODE\0" | b"Unicode\0" => Self::Unicode,
      _ => Self::Undefined,
    }
  }
}

/// A degree/minute/second rational triple, also used for GPS timestamps
/// where the components are hours, minutes and seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpsCoordinate {
  pub degrees: Rational,
  pub minutes: Rational,
  pub seconds: Rational,
}

impl GpsCoordinate {
  pub fn new(degrees: Rational, minutes: Rational, seconds: Rational) -> Self {
    Self { degrees, minutes, seconds }
  }

  /// Build from a decimal number of degrees; seconds keep two fractional
  /// digits by using a fixed denominator of 100.
  pub fn from_degrees(value: f64) -> Self {
    let value = value.abs();
    let d = value.floor();
    let m = ((value - d) * 60.0).floor();
    let s = (value - d - m / 60.0) * 3600.0;
    Self {
      degrees: Rational::new(d as u32, 1),
      minutes: Rational::new(m as u32, 1),
      seconds: Rational::new((s * 100.0).round() as u32, 100),
    }
  }

  pub fn to_degrees(&self) -> f64 {
    self.degrees.to_f64() + self.minutes.to_f64() / 60.0 + self.seconds.to_f64() / 3600.0
  }

  pub fn components(&self) -> [Rational; 3] {
    [self.degrees, self.minutes, self.seconds]
  }
}

impl Display for GpsCoordinate {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_fmt(format_args!(
      "{:.2}°{:.2}'{:.2}\"",
      self.degrees.to_f64(),
      self.minutes.to_f64(),
      self.seconds.to_f64()
    ))
  }
}

/// Lens specification: focal range and maximum aperture at both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LensSpec {
  pub min_focal: Rational,
  pub max_focal: Rational,
  pub min_focal_f: Rational,
  pub max_focal_f: Rational,
}

impl LensSpec {
  pub fn components(&self) -> [Rational; 4] {
    [self.min_focal, self.max_focal, self.min_focal_f, self.max_focal_f]
  }
}

impl Display for LensSpec {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_fmt(format_args!(
      "{} F{}, {} F{}",
      self.min_focal, self.min_focal_f, self.max_focal, self.max_focal_f
    ))
  }
}

/// Pixel format of a JFIF/JFXX embedded thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailFormat {
  Jpeg,
  Palette,
  Rgb24,
}

/// An embedded JFIF or JFXX thumbnail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JfifThumbnail {
  pub format: ThumbnailFormat,
  /// 256-entry RGB palette; empty unless `format` is `Palette`.
  pub palette: Vec<u8>,
  pub pixels: Vec<u8>,
}

impl JfifThumbnail {
  pub fn jpeg(data: Vec<u8>) -> Self {
    Self { format: ThumbnailFormat::Jpeg, palette: Vec::new(), pixels: data }
  }

  pub fn rgb24(data: Vec<u8>) -> Self {
    Self { format: ThumbnailFormat::Rgb24, palette: Vec::new(), pixels: data }
  }

  pub fn palette(palette: Vec<u8>, data: Vec<u8>) -> Self {
    Self { format: ThumbnailFormat::Palette, palette, pixels: data }
  }
}

/// The value of a metadata property; one arm per on-disk type plus the
/// interpreted composites.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
  Byte(u8),
  SByte(i8),
  Short(u16),
  SShort(i16),
  Long(u32),
  SLong(i32),
  Float(f32),
  Double(f64),
  Rational(Rational),
  SRational(SRational),
  Ascii(String),
  ByteArray(Vec<u8>),
  SByteArray(Vec<i8>),
  ShortArray(Vec<u16>),
  SShortArray(Vec<i16>),
  LongArray(Vec<u32>),
  SLongArray(Vec<i32>),
  FloatArray(Vec<f32>),
  DoubleArray(Vec<f64>),
  RationalArray(Vec<Rational>),
  SRationalArray(Vec<SRational>),
  Undefined(Vec<u8>),
  /// Enum-backed value; `value` is the raw on-disk number.
  Enumerated { kind: EnumKind, value: u16 },
  /// UserComment text with its 8-byte character set id.
  EncodedString { text: String, charset: Charset },
  /// UTF-16LE text stored with type BYTE (Windows Explorer tags).
  WindowsString(String),
  /// Exactly four ASCII characters (ExifVersion and friends).
  Version(String),
  Date(NaiveDate),
  DateTime(NaiveDateTime),
  GpsCoordinate(GpsCoordinate),
  LensSpec(LensSpec),
  /// JFIF/JFXX thumbnail payload.
  Thumbnail(JfifThumbnail),
  /// A PNG textual chunk: keyword, text, and how the chunk stores it.
  PngText(PngText),
}

/// Value of a PNG `tEXt`, `zTXt` or `iTXt` chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PngText {
  pub keyword: String,
  pub text: String,
  /// Whether the chunk stores the text deflate-compressed.
  pub compressed: bool,
  /// `iTXt` language tag and translated keyword; `None` for `tEXt`/`zTXt`.
  pub international: Option<PngTextIntl>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PngTextIntl {
  pub language: String,
  pub translated_keyword: String,
}

impl PngText {
  pub fn latin1(keyword: impl Into<String>, text: impl Into<String>, compressed: bool) -> Self {
    Self {
      keyword: keyword.into(),
      text: text.into(),
      compressed,
      international: None,
    }
  }
}

impl PropertyValue {
  /// Normalize a version string to exactly four characters, padding with
  /// spaces or truncating.
  pub fn version(value: &str) -> Self {
    let mut s: String = value.chars().take(4).collect();
    while s.len() < 4 {
      s.push(' ');
    }
    Self::Version(s)
  }

  /// Force the value into a u32, when it has an integral interpretation.
  pub fn as_u32(&self) -> Option<u32> {
    match self {
      Self::Byte(v) => Some(*v as u32),
      Self::Short(v) => Some(*v as u32),
      Self::Long(v) => Some(*v),
      Self::SByte(v) => Some(*v as u32),
      Self::SShort(v) => Some(*v as u32),
      Self::SLong(v) => Some(*v as u32),
      Self::Enumerated { value, .. } => Some(*value as u32),
      Self::ShortArray(v) if v.len() == 1 => Some(v[0] as u32),
      Self::LongArray(v) if v.len() == 1 => Some(v[0]),
      _ => None,
    }
  }

  /// Force the value into an f64, when it has a numeric interpretation.
  pub fn as_f64(&self) -> Option<f64> {
    match self {
      Self::Float(v) => Some(*v as f64),
      Self::Double(v) => Some(*v),
      Self::Rational(v) => Some(v.to_f64()),
      Self::SRational(v) => Some(v.to_f64()),
      Self::GpsCoordinate(v) => Some(v.to_degrees()),
      other => other.as_u32().map(|v| v as f64),
    }
  }

  /// The textual content, for the string-like arms.
  pub fn as_str(&self) -> Option<&str> {
    match self {
      Self::Ascii(s) | Self::WindowsString(s) | Self::Version(s) => Some(s),
      Self::EncodedString { text, .. } => Some(text),
      Self::PngText(t) => Some(&t.text),
      _ => None,
    }
  }

  /// Interpret an enum-backed value through its enumeration.
  pub fn enum_value<T>(&self) -> Option<T>
  where
    T: TryFromPrimitive<Primitive = u16>,
  {
    match self {
      Self::Enumerated { value, .. } => T::try_from_primitive(*value).ok(),
      Self::Short(value) => T::try_from_primitive(*value).ok(),
      Self::Byte(value) => T::try_from_primitive(*value as u16).ok(),
      _ => None,
    }
  }
}

impl Display for PropertyValue {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    fn join<T: Display>(f: &mut std::fmt::Formatter<'_>, values: &[T]) -> std::fmt::Result {
      write!(f, "[")?;
      for (i, v) in values.iter().enumerate() {
        if i > 0 {
          write!(f, " ")?;
        }
        write!(f, "{}", v)?;
      }
      write!(f, "]")
    }
    match self {
      Self::Byte(v) => write!(f, "{}", v),
      Self::SByte(v) => write!(f, "{}", v),
      Self::Short(v) => write!(f, "{}", v),
      Self::SShort(v) => write!(f, "{}", v),
      Self::Long(v) => write!(f, "{}", v),
      Self::SLong(v) => write!(f, "{}", v),
      Self::Float(v) => write!(f, "{}", v),
      Self::Double(v) => write!(f, "{}", v),
      Self::Rational(v) => write!(f, "{}", v),
      Self::SRational(v) => write!(f, "{}", v),
      Self::Ascii(v) | Self::WindowsString(v) | Self::Version(v) => write!(f, "{}", v),
      Self::EncodedString { text, .. } => write!(f, "{}", text),
      Self::ByteArray(v) => join(f, v),
      Self::SByteArray(v) => join(f, v),
      Self::ShortArray(v) => join(f, v),
      Self::SShortArray(v) => join(f, v),
      Self::LongArray(v) => join(f, v),
      Self::SLongArray(v) => join(f, v),
      Self::FloatArray(v) => join(f, v),
      Self::DoubleArray(v) => join(f, v),
      Self::RationalArray(v) => join(f, v),
      Self::SRationalArray(v) => join(f, v),
      Self::Undefined(v) => write!(f, "({} bytes)", v.len()),
      Self::Enumerated { kind, value } => match enums::enum_name(*kind, *value) {
        Some(name) => write!(f, "{}", name),
        None => write!(f, "{}", value),
      },
      Self::Date(v) => write!(f, "{}", v.format("%Y.%m.%d")),
      Self::DateTime(v) => write!(f, "{}", v.format("%Y.%m.%d %H:%M:%S")),
      Self::GpsCoordinate(v) => write!(f, "{}", v),
      Self::LensSpec(v) => write!(f, "{}", v),
      Self::Thumbnail(v) => write!(f, "({:?} thumbnail, {} bytes)", v.format, v.pixels.len()),
      Self::PngText(v) => write!(f, "{}", v.text),
    }
  }
}

/// One metadata property: a [`Tag`] and its typed value.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
  tag: Tag,
  name: Option<String>,
  value: PropertyValue,
}

impl Property {
  pub fn new(tag: Tag, value: PropertyValue) -> Self {
    Self { tag, name: None, value }
  }

  /// Construct an enum-backed property. Fails with
  /// [`Error::UnknownEnumType`] when the registry has no enumeration for
  /// the tag; that is a caller bug, not a file defect.
  pub fn enumerated(tag: Tag, value: u16) -> Result<Self> {
    match TagKind::of(tag) {
      TagKind::Enumerated(kind) => Ok(Self::new(tag, PropertyValue::Enumerated { kind, value })),
      _ => Err(Error::UnknownEnumType(tag.name())),
    }
  }

  pub fn tag(&self) -> Tag {
    self.tag
  }

  pub fn ifd(&self) -> Ifd {
    self.tag.ifd()
  }

  /// Display name; either the override set by the caller or the tag name.
  pub fn name(&self) -> String {
    self.name.clone().unwrap_or_else(|| self.tag.name())
  }

  pub fn set_name(&mut self, name: impl Into<String>) {
    self.name = Some(name.into());
  }

  pub fn value(&self) -> &PropertyValue {
    &self.value
  }

  pub fn set_value(&mut self, value: PropertyValue) {
    self.value = value;
  }

  /// The wire-level form of this property in the requested byte order. This
  /// is the sole serialization path; every directory writer goes through it.
  pub fn interop(&self, endian: Endian) -> InteropValue {
    let tag = self.tag.id();
    match &self.value {
      PropertyValue::Byte(v) => InteropValue::from_bytes(tag, &[*v]),
      PropertyValue::SByte(v) => InteropValue::from_sbytes(tag, &[*v]),
      PropertyValue::Short(v) => InteropValue::from_shorts(tag, &[*v], endian),
      PropertyValue::SShort(v) => InteropValue::from_sshorts(tag, &[*v], endian),
      PropertyValue::Long(v) => InteropValue::from_longs(tag, &[*v], endian),
      PropertyValue::SLong(v) => InteropValue::from_slongs(tag, &[*v], endian),
      PropertyValue::Float(v) => InteropValue::from_floats(tag, &[*v], endian),
      PropertyValue::Double(v) => InteropValue::from_doubles(tag, &[*v], endian),
      PropertyValue::Rational(v) => InteropValue::from_rationals(tag, &[*v], endian),
      PropertyValue::SRational(v) => InteropValue::from_srationals(tag, &[*v], endian),
      PropertyValue::Ascii(v) => InteropValue::from_ascii(tag, v),
      PropertyValue::ByteArray(v) => InteropValue::from_bytes(tag, v),
      PropertyValue::SByteArray(v) => InteropValue::from_sbytes(tag, v),
      PropertyValue::ShortArray(v) => InteropValue::from_shorts(tag, v, endian),
      PropertyValue::SShortArray(v) => InteropValue::from_sshorts(tag, v, endian),
      PropertyValue::LongArray(v) => InteropValue::from_longs(tag, v, endian),
      PropertyValue::SLongArray(v) => InteropValue::from_slongs(tag, v, endian),
      PropertyValue::FloatArray(v) => InteropValue::from_floats(tag, v, endian),
      PropertyValue::DoubleArray(v) => InteropValue::from_doubles(tag, v, endian),
      PropertyValue::RationalArray(v) => InteropValue::from_rationals(tag, v, endian),
      PropertyValue::SRationalArray(v) => InteropValue::from_srationals(tag, v, endian),
      PropertyValue::Undefined(v) => InteropValue::from_undefined(tag, v),
      PropertyValue::Enumerated { kind, value } => match kind.storage() {
        EnumStorage::Short => InteropValue::from_shorts(tag, &[*value], endian),
        EnumStorage::Byte => InteropValue::from_bytes(tag, &[*value as u8]),
        EnumStorage::Undefined => InteropValue::from_undefined(tag, &[*value as u8]),
        EnumStorage::Ascii => InteropValue::new(tag, TypeCode::Ascii, 2, vec![*value as u8, 0]),
      },
      PropertyValue::EncodedString { text, charset } => {
        let mut data = charset.prefix().to_vec();
        match charset {
          Charset::Unicode => {
            for unit in text.encode_utf16() {
              data.extend_from_slice(&unit.to_le_bytes());
            }
          }
          _ => data.extend_from_slice(&TextEncoding::Ascii.encode(text)),
        }
        InteropValue::new(tag, TypeCode::Undefined, data.len() as u32, data)
      }
      PropertyValue::WindowsString(text) => {
        let mut data = Vec::with_capacity(text.len() * 2);
        for unit in text.encode_utf16() {
          data.extend_from_slice(&unit.to_le_bytes());
        }
        InteropValue::new(tag, TypeCode::Byte, data.len() as u32, data)
      }
      PropertyValue::Version(v) => {
        let mut data = v.as_bytes().to_vec();
        data.resize(4, b' ');
        InteropValue::new(tag, TypeCode::Undefined, 4, data)
      }
      PropertyValue::Date(v) => {
        let s = v.format("%Y:%m:%d").to_string();
        InteropValue::from_ascii(tag, &s)
      }
      PropertyValue::DateTime(v) => {
        let s = v.format("%Y:%m:%d %H:%M:%S").to_string();
        InteropValue::from_ascii(tag, &s)
      }
      PropertyValue::GpsCoordinate(v) => InteropValue::from_rationals(tag, &v.components(), endian),
      PropertyValue::LensSpec(v) => InteropValue::from_rationals(tag, &v.components(), endian),
      PropertyValue::Thumbnail(v) => {
        let mut data = v.palette.clone();
        data.extend_from_slice(&v.pixels);
        InteropValue::from_bytes(tag, &data)
      }
      // The chunk-level layout (keyword separators, compression) is owned
      // by the PNG codec; the generic wire form carries the text alone.
      PropertyValue::PngText(v) => InteropValue::from_undefined(tag, v.text.as_bytes()),
    }
  }
}

impl Display for Property {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_fmt(format_args!("{}: {}", self.name(), self.value))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::tags::{ExifTag, GpsTag, TiffTag};

  #[test]
  fn enumerated_constructor_enforces_registry() {
    let prop = Property::enumerated(Tag::Zeroth(TiffTag::Orientation), 6).unwrap();
    assert_eq!(
      prop.value().enum_value::<enums::Orientation>(),
      Some(enums::Orientation::RotatedRight)
    );
    // Make is an ASCII tag; requesting an enum property for it is a caller bug.
    assert!(matches!(
      Property::enumerated(Tag::Zeroth(TiffTag::Make), 1),
      Err(Error::UnknownEnumType(_))
    ));
  }

  #[test]
  fn interop_of_short_is_two_bytes() {
    let prop = Property::enumerated(Tag::Zeroth(TiffTag::Orientation), 6).unwrap();
    let wire = prop.interop(Endian::Little);
    assert_eq!(wire.type_code, TypeCode::Short);
    assert_eq!(wire.count, 1);
    assert_eq!(wire.data, vec![6, 0]);
  }

  #[test]
  fn gps_coordinate_round_trip() {
    let c = GpsCoordinate::new(Rational::new(40, 1), Rational::new(26, 1), Rational::new(979, 45));
    let prop = Property::new(Tag::Gps(GpsTag::GPSLatitude), PropertyValue::GpsCoordinate(c));
    let wire = prop.interop(Endian::Big);
    assert_eq!(wire.type_code, TypeCode::Rational);
    assert_eq!(wire.count, 3);
    let back = wire.to_rationals(Endian::Big);
    assert_eq!(back[2], Rational::new(979, 45));
    assert!((c.to_degrees() - (40.0 + 26.0 / 60.0 + (979.0 / 45.0) / 3600.0)).abs() < 1e-12);
  }

  #[test]
  fn version_pads_and_truncates() {
    assert_eq!(PropertyValue::version("0221"), PropertyValue::Version("0221".into()));
    assert_eq!(PropertyValue::version("98"), PropertyValue::Version("98  ".into()));
    assert_eq!(PropertyValue::version("02210"), PropertyValue::Version("0221".into()));
  }

  #[test]
  fn user_comment_wire_form() {
    let prop = Property::new(
      Tag::Exif(ExifTag::UserComment),
      PropertyValue::EncodedString { text: "hi".into(), charset: Charset::Ascii },
    );
    let wire = prop.interop(Endian::Little);
    assert_eq!(wire.type_code, TypeCode::Undefined);
    assert_eq!(&wire.data[0..8], b"ASCII\0\0\0");
    assert_eq!(&wire.data[8..], b"hi");
  }

  #[test]
  fn windows_string_is_utf16_bytes() {
    let prop = Property::new(Tag::Zeroth(TiffTag::WindowsTitle), PropertyValue::WindowsString("Hi".into()));
    let wire = prop.interop(Endian::Big);
    assert_eq!(wire.type_code, TypeCode::Byte);
    assert_eq!(wire.data, vec![b'H', 0, b'i', 0]);
    assert_eq!(wire.count, 4);
  }

  #[test]
  fn datetime_formats_as_exif_ascii() {
    let dt = NaiveDate::from_ymd_opt(2021, 7, 4).unwrap().and_hms_opt(12, 30, 5).unwrap();
    let prop = Property::new(Tag::Exif(ExifTag::DateTimeOriginal), PropertyValue::DateTime(dt));
    let wire = prop.interop(Endian::Little);
    assert_eq!(wire.data, b"2021:07:04 12:30:05\0");
    assert_eq!(wire.count, 20);
  }
}
