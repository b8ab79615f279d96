// SPDX-License-Identifier: MIT

mod common;

use common::{base_tiff, find_subslice, TIFF_STRIP};
use imagemeta::formats::tiff::CRUSH_WHITELIST;
use imagemeta::tags::{Tag, TiffTag};
use imagemeta::ImageFile;

#[test]
fn crush_leaves_only_whitelisted_tags() -> anyhow::Result<()> {
  let mut image = ImageFile::from_buffer(&base_tiff())?;
  image.properties_mut().set_str(Tag::Zeroth(TiffTag::Artist), "somebody");
  image.properties_mut().set_str(Tag::Zeroth(TiffTag::Copyright), "nobody");
  image.crush();
  let saved = image.encode()?;

  let again = ImageFile::from_buffer(&saved)?;
  for prop in again.properties().iter() {
    match prop.tag() {
      Tag::Zeroth(t) => assert!(CRUSH_WHITELIST.contains(&t), "tag {:?} escaped the crush", t),
      other => panic!("unexpected directory after crush: {:?}", other),
    }
  }
  assert!(again.properties().contains(Tag::Zeroth(TiffTag::ImageWidth)));
  assert!(!again.properties().contains(Tag::Zeroth(TiffTag::Make)));
  Ok(())
}

#[test]
fn strips_are_rewritten_but_not_altered() -> anyhow::Result<()> {
  let mut image = ImageFile::from_buffer(&base_tiff())?;
  image.properties_mut().set_str(Tag::Zeroth(TiffTag::Software), "exiflab");
  let saved = image.encode()?;
  assert!(find_subslice(&saved, TIFF_STRIP).is_some());

  let again = ImageFile::from_buffer(&saved)?;
  assert_eq!(again.properties().get(Tag::Zeroth(TiffTag::Software)).unwrap().value().as_str(), Some("exiflab"));
  assert_eq!(again.properties().get(Tag::Zeroth(TiffTag::Make)).unwrap().value().as_str(), Some("imagemeta"));
  Ok(())
}

#[test]
fn save_load_save_is_stable() -> anyhow::Result<()> {
  let mut image = ImageFile::from_buffer(&base_tiff())?;
  let first = image.encode()?;
  let mut image = ImageFile::from_buffer(&first)?;
  let second = image.encode()?;
  assert_eq!(first, second);
  Ok(())
}
