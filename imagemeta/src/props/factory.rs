// SPDX-License-Identifier: MIT

//! Materializes wire-level fields into typed properties.

use log::debug;

use crate::bits::Endian;
use crate::props::{Charset, GpsCoordinate, LensSpec, Property, PropertyValue, TextEncoding};
use crate::tags::{EnumStorage, Ifd, Tag, TagKind};
use crate::value::{InteropValue, TypeCode};

/// Build a typed [`Property`] from a raw field.
///
/// The registry decides how tags with special semantics (enum-backed values,
/// GPS composites, encoded comments, version strings, dates) are
/// materialized; everything else decodes strictly by its wire type code.
/// A special-case decode whose expectations do not hold (wrong type code,
/// short count) silently falls back to the plain wire decode, so malformed
/// but structurally valid fields still round-trip.
pub fn from_interop(ifd: Ifd, raw: &InteropValue, endian: Endian, encoding: TextEncoding) -> Property {
  let tag = Tag::from_id(ifd, raw.tag);
  let value = match TagKind::of(tag) {
    TagKind::Enumerated(kind) => decode_enumerated(kind, raw, endian),
    TagKind::GpsCoordinate => decode_gps_coordinate(raw, endian),
    TagKind::LensSpec => decode_lens_spec(raw, endian),
    TagKind::Version => decode_version(raw),
    TagKind::EncodedString => decode_encoded_string(raw, encoding),
    TagKind::WindowsString => decode_windows_string(raw),
    TagKind::DateTime => decode_date_time(raw, encoding),
    TagKind::Date => decode_date(raw, encoding),
    TagKind::Default => None,
  }
  .unwrap_or_else(|| decode_by_type(raw, endian, encoding));
  Property::new(tag, value)
}

fn decode_enumerated(kind: crate::tags::EnumKind, raw: &InteropValue, endian: Endian) -> Option<PropertyValue> {
  let value = match kind.storage() {
    EnumStorage::Short => {
      if raw.type_code != TypeCode::Short || raw.data.len() < 2 {
        return None;
      }
      endian.read_u16(&raw.data, 0)
    }
    EnumStorage::Byte | EnumStorage::Undefined | EnumStorage::Ascii => *raw.data.first()? as u16,
  };
  Some(PropertyValue::Enumerated { kind, value })
}

fn decode_gps_coordinate(raw: &InteropValue, endian: Endian) -> Option<PropertyValue> {
  if raw.type_code != TypeCode::Rational {
    return None;
  }
  let parts = raw.to_rationals(endian);
  if parts.len() < 3 {
    return None;
  }
  Some(PropertyValue::GpsCoordinate(GpsCoordinate::new(parts[0], parts[1], parts[2])))
}

fn decode_lens_spec(raw: &InteropValue, endian: Endian) -> Option<PropertyValue> {
  if raw.type_code != TypeCode::Rational {
    return None;
  }
  let parts = raw.to_rationals(endian);
  if parts.len() < 4 {
    return None;
  }
  Some(PropertyValue::LensSpec(LensSpec {
    min_focal: parts[0],
    max_focal: parts[1],
    min_focal_f: parts[2],
    max_focal_f: parts[3],
  }))
}

fn decode_version(raw: &InteropValue) -> Option<PropertyValue> {
  if raw.data.is_empty() {
    return None;
  }
  let text: String = raw.data.iter().take(4).map(|&b| b as char).collect();
  Some(PropertyValue::version(&text))
}

fn decode_encoded_string(raw: &InteropValue, encoding: TextEncoding) -> Option<PropertyValue> {
  if raw.data.len() < 8 {
    return None;
  }
  let charset = Charset::from_prefix(&raw.data);
  let body = &raw.data[8..];
  let text = match charset {
    Charset::Unicode => {
      let units: Vec<u16> = body.chunks_exact(2).map(|c| u16::from_le_bytes([c[0], c[1]])).collect();
      String::from_utf16_lossy(&units).trim_end_matches('\0').to_string()
    }
    Charset::Ascii => TextEncoding::Ascii.decode(body),
    _ => encoding.decode(body),
  };
  Some(PropertyValue::EncodedString { text, charset })
}

fn decode_windows_string(raw: &InteropValue) -> Option<PropertyValue> {
  let units: Vec<u16> = raw.data.chunks_exact(2).map(|c| u16::from_le_bytes([c[0], c[1]])).collect();
  let text = String::from_utf16_lossy(&units).trim_end_matches('\0').to_string();
  Some(PropertyValue::WindowsString(text))
}

fn decode_date_time(raw: &InteropValue, encoding: TextEncoding) -> Option<PropertyValue> {
  let text = encoding.decode(&raw.data);
  match chrono::NaiveDateTime::parse_from_str(text.trim(), "%Y:%m:%d %H:%M:%S") {
    Ok(dt) => Some(PropertyValue::DateTime(dt)),
    Err(err) => {
      debug!("Unparseable Exif timestamp {:?}, keeping it as text: {}", text, err);
      None
    }
  }
}

fn decode_date(raw: &InteropValue, encoding: TextEncoding) -> Option<PropertyValue> {
  let text = encoding.decode(&raw.data);
  match chrono::NaiveDate::parse_from_str(text.trim(), "%Y:%m:%d") {
    Ok(d) => Some(PropertyValue::Date(d)),
    Err(err) => {
      debug!("Unparseable date {:?}, keeping it as text: {}", text, err);
      None
    }
  }
}

fn decode_by_type(raw: &InteropValue, endian: Endian, encoding: TextEncoding) -> PropertyValue {
  match raw.type_code {
    TypeCode::Byte => {
      if raw.data.len() == 1 {
        PropertyValue::Byte(raw.data[0])
      } else {
        PropertyValue::ByteArray(raw.data.clone())
      }
    }
    TypeCode::SByte => {
      let values: Vec<i8> = raw.data.iter().map(|&b| b as i8).collect();
      if values.len() == 1 {
        PropertyValue::SByte(values[0])
      } else {
        PropertyValue::SByteArray(values)
      }
    }
    TypeCode::Ascii => PropertyValue::Ascii(encoding.decode(&raw.data)),
    TypeCode::Short => {
      let values = raw.to_shorts(endian);
      if values.len() == 1 {
        PropertyValue::Short(values[0])
      } else {
        PropertyValue::ShortArray(values)
      }
    }
    TypeCode::SShort => {
      let values = raw.to_sshorts(endian);
      if values.len() == 1 {
        PropertyValue::SShort(values[0])
      } else {
        PropertyValue::SShortArray(values)
      }
    }
    TypeCode::Long => {
      let values = raw.to_longs(endian);
      if values.len() == 1 {
        PropertyValue::Long(values[0])
      } else {
        PropertyValue::LongArray(values)
      }
    }
    TypeCode::SLong => {
      let values = raw.to_slongs(endian);
      if values.len() == 1 {
        PropertyValue::SLong(values[0])
      } else {
        PropertyValue::SLongArray(values)
      }
    }
    TypeCode::Rational => {
      let values = raw.to_rationals(endian);
      if values.len() == 1 {
        PropertyValue::Rational(values[0])
      } else {
        PropertyValue::RationalArray(values)
      }
    }
    TypeCode::SRational => {
      let values = raw.to_srationals(endian);
      if values.len() == 1 {
        PropertyValue::SRational(values[0])
      } else {
        PropertyValue::SRationalArray(values)
      }
    }
    TypeCode::Float => {
      let values = raw.to_floats(endian);
      if values.len() == 1 {
        PropertyValue::Float(values[0])
      } else {
        PropertyValue::FloatArray(values)
      }
    }
    TypeCode::Double => {
      let values = raw.to_doubles(endian);
      if values.len() == 1 {
        PropertyValue::Double(values[0])
      } else {
        PropertyValue::DoubleArray(values)
      }
    }
    TypeCode::Undefined => PropertyValue::Undefined(raw.data.clone()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::props::enums::Orientation;
  use crate::tags::{GpsTag, InteropTag, TiffTag};
  use crate::value::Rational;

  #[test]
  fn same_id_decodes_per_directory() {
    // Id 2 is GPSLatitude (3 x RATIONAL) in the GPS IFD but
    // InteroperabilityVersion (4-char version) in the Interop IFD.
    let rationals = InteropValue::from_rationals(2, &[Rational::new(40, 1), Rational::new(26, 1), Rational::new(979, 45)], Endian::Little);
    let gps = from_interop(Ifd::Gps, &rationals, Endian::Little, TextEncoding::default());
    assert_eq!(gps.tag(), Tag::Gps(GpsTag::GPSLatitude));
    assert!(matches!(gps.value(), PropertyValue::GpsCoordinate(_)));

    let version = InteropValue::from_undefined(2, b"0100");
    let interop = from_interop(Ifd::Interop, &version, Endian::Little, TextEncoding::default());
    assert_eq!(interop.tag(), Tag::Interop(InteropTag::InteroperabilityVersion));
    assert_eq!(interop.value(), &PropertyValue::Version("0100".into()));
  }

  #[test]
  fn orientation_decodes_as_enum() {
    let raw = InteropValue::from_shorts(274, &[6], Endian::Big);
    let prop = from_interop(Ifd::Zeroth, &raw, Endian::Big, TextEncoding::default());
    assert_eq!(prop.value().enum_value::<Orientation>(), Some(Orientation::RotatedRight));
  }

  #[test]
  fn user_comment_unicode() {
    let mut data = b"UNICODE\0".to_vec();
    for unit in "héllo".encode_utf16() {
      data.extend_from_slice(&unit.to_le_bytes());
    }
    let raw = InteropValue::new(37510, TypeCode::Undefined, data.len() as u32, data);
    let prop = from_interop(Ifd::Exif, &raw, Endian::Little, TextEncoding::default());
    assert_eq!(prop.value().as_str(), Some("héllo"));
  }

  #[test]
  fn windows_tag_is_utf16_in_byte_type() {
    let raw = InteropValue::from_bytes(40091, &[b'O', 0, b'k', 0]);
    let prop = from_interop(Ifd::Zeroth, &raw, Endian::Little, TextEncoding::default());
    assert_eq!(prop.value(), &PropertyValue::WindowsString("Ok".into()));
  }

  #[test]
  fn datetime_falls_back_to_ascii_when_unparseable() {
    let raw = InteropValue::from_ascii(306, "not a date");
    let prop = from_interop(Ifd::Zeroth, &raw, Endian::Little, TextEncoding::default());
    assert_eq!(prop.value(), &PropertyValue::Ascii("not a date".into()));

    let raw = InteropValue::from_ascii(306, "2020:01:02 03:04:05");
    let prop = from_interop(Ifd::Zeroth, &raw, Endian::Little, TextEncoding::default());
    assert!(matches!(prop.value(), PropertyValue::DateTime(_)));
  }

  #[test]
  fn unknown_tag_decodes_by_wire_type() {
    let raw = InteropValue::from_longs(0x9999, &[7, 8], Endian::Little);
    let prop = from_interop(Ifd::Zeroth, &raw, Endian::Little, TextEncoding::default());
    assert_eq!(prop.tag(), Tag::Zeroth(TiffTag::Unknown(0x9999)));
    assert_eq!(prop.value(), &PropertyValue::LongArray(vec![7, 8]));
  }
}
