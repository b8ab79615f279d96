// SPDX-License-Identifier: MIT

//! An ordered, tag-indexed multiset of properties.

use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::props::{Charset, GpsCoordinate, Property, PropertyValue, TextEncoding};
use crate::tags::{ExifTag, Ifd, Tag, TiffTag};
use crate::value::Rational;
use crate::Result;

/// Ordered collection of [`Property`] values with O(1) lookup by tag.
///
/// Iteration yields insertion order. Duplicate tags are allowed (repeated
/// comment tags exist in the wild); [`PropertyCollection::set`] replaces
/// every entry for a tag, not just the first.
#[derive(Debug, Clone, Default)]
pub struct PropertyCollection {
  items: Vec<Property>,
  index: HashMap<Tag, Vec<usize>>,
}

impl PropertyCollection {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &Property> {
    self.items.iter()
  }

  /// First property with the given tag, if any.
  pub fn get(&self, tag: Tag) -> Option<&Property> {
    self.index.get(&tag).and_then(|slots| slots.first()).map(|&i| &self.items[i])
  }

  /// Every property with the given tag, in insertion order.
  pub fn get_all(&self, tag: Tag) -> Vec<&Property> {
    match self.index.get(&tag) {
      Some(slots) => slots.iter().map(|&i| &self.items[i]).collect(),
      None => Vec::new(),
    }
  }

  pub fn contains(&self, tag: Tag) -> bool {
    self.index.contains_key(&tag)
  }

  /// Properties belonging to one directory, in insertion order.
  pub fn in_ifd(&self, ifd: Ifd) -> Vec<&Property> {
    self.items.iter().filter(|p| p.ifd() == ifd).collect()
  }

  pub fn has_ifd(&self, ifd: Ifd) -> bool {
    self.items.iter().any(|p| p.ifd() == ifd)
  }

  /// Append a property, keeping existing entries for the same tag.
  pub fn add(&mut self, prop: Property) {
    let slot = self.items.len();
    self.index.entry(prop.tag()).or_default().push(slot);
    self.items.push(prop);
  }

  /// Replace every existing entry for the property's tag with this one.
  pub fn set(&mut self, prop: Property) {
    self.remove(prop.tag());
    self.add(prop);
  }

  /// Remove every entry with the given tag; returns how many were removed.
  pub fn remove(&mut self, tag: Tag) -> usize {
    let before = self.items.len();
    self.items.retain(|p| p.tag() != tag);
    let removed = before - self.items.len();
    if removed > 0 {
      self.rebuild_index();
    }
    removed
  }

  /// Remove every property belonging to one directory. Used when stripping
  /// a whole metadata section.
  pub fn remove_ifd(&mut self, ifd: Ifd) -> usize {
    let before = self.items.len();
    self.items.retain(|p| p.ifd() != ifd);
    let removed = before - self.items.len();
    if removed > 0 {
      self.rebuild_index();
    }
    removed
  }

  /// Keep only properties whose tag appears in the whitelist.
  pub fn keep(&mut self, whitelist: &[Tag]) {
    self.items.retain(|p| whitelist.contains(&p.tag()));
    self.rebuild_index();
  }

  pub fn clear(&mut self) {
    self.items.clear();
    self.index.clear();
  }

  fn rebuild_index(&mut self) {
    self.index.clear();
    for (slot, prop) in self.items.iter().enumerate() {
      self.index.entry(prop.tag()).or_default().push(slot);
    }
  }

  // Convenience adders mirroring the primitive value kinds. Strings route
  // through the tag registry: Windows Explorer tags become UTF-16 values and
  // UserComment becomes an encoded string.

  pub fn add_byte(&mut self, tag: Tag, value: u8) {
    self.add(Property::new(tag, PropertyValue::Byte(value)));
  }

  pub fn add_u16(&mut self, tag: Tag, value: u16) {
    self.add(Property::new(tag, PropertyValue::Short(value)));
  }

  pub fn add_u32(&mut self, tag: Tag, value: u32) {
    self.add(Property::new(tag, PropertyValue::Long(value)));
  }

  pub fn add_i32(&mut self, tag: Tag, value: i32) {
    self.add(Property::new(tag, PropertyValue::SLong(value)));
  }

  /// Floats are stored as unsigned rationals, matching how cameras write
  /// exposure and focal values.
  pub fn add_f64(&mut self, tag: Tag, value: f64) {
    self.add(Property::new(tag, PropertyValue::Rational(Rational::from_f64(value))));
  }

  pub fn add_str(&mut self, tag: Tag, value: &str) {
    self.add_str_encoded(tag, value, TextEncoding::default());
  }

  pub fn add_str_encoded(&mut self, tag: Tag, value: &str, _encoding: TextEncoding) {
    let value = match tag {
      Tag::Zeroth(TiffTag::WindowsTitle)
      | Tag::Zeroth(TiffTag::WindowsComment)
      | Tag::Zeroth(TiffTag::WindowsAuthor)
      | Tag::Zeroth(TiffTag::WindowsKeywords)
      | Tag::Zeroth(TiffTag::WindowsSubject) => PropertyValue::WindowsString(value.into()),
      Tag::Exif(ExifTag::UserComment) => PropertyValue::EncodedString { text: value.into(), charset: Charset::Unicode },
      _ => PropertyValue::Ascii(value.into()),
    };
    self.add(Property::new(tag, value));
  }

  pub fn add_datetime(&mut self, tag: Tag, value: NaiveDateTime) {
    self.add(Property::new(tag, PropertyValue::DateTime(value)));
  }

  /// Enum-backed values dispatch through the tag registry; a tag without a
  /// registered enumeration is a caller error, not a recoverable one.
  pub fn add_enum<T: Into<u16>>(&mut self, tag: Tag, value: T) -> Result<()> {
    self.add(Property::enumerated(tag, value.into())?);
    Ok(())
  }

  /// Angular degrees/minutes/seconds, or clock hours/minutes/seconds for a
  /// GPS timestamp.
  pub fn add_dms(&mut self, tag: Tag, d: f64, m: f64, s: f64) {
    let coord = GpsCoordinate::new(Rational::from_f64(d), Rational::from_f64(m), Rational::from_f64(s));
    self.add(Property::new(tag, PropertyValue::GpsCoordinate(coord)));
  }

  pub fn set_u16(&mut self, tag: Tag, value: u16) {
    self.remove(tag);
    self.add_u16(tag, value);
  }

  pub fn set_u32(&mut self, tag: Tag, value: u32) {
    self.remove(tag);
    self.add_u32(tag, value);
  }

  pub fn set_str(&mut self, tag: Tag, value: &str) {
    self.remove(tag);
    self.add_str(tag, value);
  }

  pub fn set_datetime(&mut self, tag: Tag, value: NaiveDateTime) {
    self.remove(tag);
    self.add_datetime(tag, value);
  }
}

impl<'a> IntoIterator for &'a PropertyCollection {
  type Item = &'a Property;
  type IntoIter = std::slice::Iter<'a, Property>;

  fn into_iter(self) -> Self::IntoIter {
    self.items.iter()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::tags::PngTag;

  #[test]
  fn set_replaces_every_duplicate() {
    let mut props = PropertyCollection::new();
    props.add_str(Tag::Png(PngTag::Comment), "one");
    props.add_str(Tag::Png(PngTag::Comment), "two");
    assert_eq!(props.get_all(Tag::Png(PngTag::Comment)).len(), 2);

    props.set(Property::new(Tag::Png(PngTag::Comment), PropertyValue::Ascii("three".into())));
    let all = props.get_all(Tag::Png(PngTag::Comment));
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].value().as_str(), Some("three"));
  }

  #[test]
  fn remove_drops_every_match() {
    let mut props = PropertyCollection::new();
    props.add_str(Tag::Png(PngTag::Comment), "one");
    props.add_u16(Tag::Zeroth(TiffTag::Orientation), 1);
    props.add_str(Tag::Png(PngTag::Comment), "two");
    assert_eq!(props.remove(Tag::Png(PngTag::Comment)), 2);
    assert!(!props.contains(Tag::Png(PngTag::Comment)));
    // Index still finds the survivor after the rebuild.
    assert!(props.contains(Tag::Zeroth(TiffTag::Orientation)));
    assert_eq!(props.len(), 1);
  }

  #[test]
  fn iteration_matches_insertion_order() {
    let mut props = PropertyCollection::new();
    props.add_str(Tag::Zeroth(TiffTag::Make), "A");
    props.add_u16(Tag::Zeroth(TiffTag::Orientation), 1);
    props.add_str(Tag::Zeroth(TiffTag::Model), "B");
    let tags: Vec<Tag> = props.iter().map(|p| p.tag()).collect();
    assert_eq!(
      tags,
      vec![
        Tag::Zeroth(TiffTag::Make),
        Tag::Zeroth(TiffTag::Orientation),
        Tag::Zeroth(TiffTag::Model)
      ]
    );
  }

  #[test]
  fn remove_ifd_strips_a_directory() {
    let mut props = PropertyCollection::new();
    props.add_str(Tag::Zeroth(TiffTag::Make), "A");
    props.add_u16(Tag::Exif(ExifTag::ISOSpeedRatings), 100);
    props.add_f64(Tag::Exif(ExifTag::FNumber), 2.8);
    assert_eq!(props.remove_ifd(Ifd::Exif), 2);
    assert!(!props.has_ifd(Ifd::Exif));
    assert!(props.has_ifd(Ifd::Zeroth));
  }

  #[test]
  fn keep_is_a_whitelist() {
    let mut props = PropertyCollection::new();
    props.add_str(Tag::Zeroth(TiffTag::Make), "A");
    props.add_str(Tag::Zeroth(TiffTag::Model), "B");
    props.add_u16(Tag::Zeroth(TiffTag::Orientation), 1);
    props.keep(&[Tag::Zeroth(TiffTag::Make)]);
    assert_eq!(props.len(), 1);
    assert!(props.contains(Tag::Zeroth(TiffTag::Make)));
  }

  #[test]
  fn add_enum_dispatches_through_the_registry() {
    use crate::props::enums::Orientation;

    let mut props = PropertyCollection::new();
    props.add_enum(Tag::Zeroth(TiffTag::Orientation), Orientation::RotatedRight).unwrap();
    assert_eq!(
      props.get(Tag::Zeroth(TiffTag::Orientation)).unwrap().value().enum_value::<Orientation>(),
      Some(Orientation::RotatedRight)
    );
    assert!(props.add_enum(Tag::Zeroth(TiffTag::Make), 1u16).is_err());
  }

  #[test]
  fn windows_tag_string_routing() {
    let mut props = PropertyCollection::new();
    props.add_str(Tag::Zeroth(TiffTag::WindowsTitle), "T");
    assert!(matches!(
      props.get(Tag::Zeroth(TiffTag::WindowsTitle)).unwrap().value(),
      PropertyValue::WindowsString(_)
    ));
    props.add_str(Tag::Exif(ExifTag::UserComment), "C");
    assert!(matches!(
      props.get(Tag::Exif(ExifTag::UserComment)).unwrap().value(),
      PropertyValue::EncodedString { .. }
    ));
  }
}
