// SPDX-License-Identifier: MIT

//! The container-independent entry point: magic-byte sniffing and the
//! common load/save/crush surface over the four supported formats.

use std::io::Write;
use std::path::Path;

use crate::formats::gif::GifFile;
use crate::formats::jpeg::JpegFile;
use crate::formats::png::PngFile;
use crate::formats::tiff::TiffFile;
use crate::props::collection::PropertyCollection;
use crate::props::TextEncoding;
use crate::{Diagnostic, Error, Result};

/// Container format of a loaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
  Jpeg,
  Tiff,
  Png,
  Gif,
}

/// A loaded image file with its metadata properties.
///
/// The variant records the container the bytes were loaded from; saving
/// always re-emits that same container, so a file can never be written in a
/// different format than it was read.
#[derive(Debug)]
pub enum ImageFile {
  Jpeg(JpegFile),
  Tiff(TiffFile),
  Png(PngFile),
  Gif(GifFile),
}

impl ImageFile {
  /// Load an image from a complete in-memory byte buffer.
  ///
  /// The format is sniffed from the magic bytes; anything other than JPEG,
  /// TIFF, PNG or GIF fails with [`Error::NotAnImageFile`].
  pub fn from_buffer(data: &[u8]) -> Result<Self> {
    Self::from_buffer_with_encoding(data, TextEncoding::default())
  }

  /// Load with an explicit text encoding, used only for fields whose
  /// format does not self-describe one (legacy Exif ASCII strings, GIF
  /// comments).
  pub fn from_buffer_with_encoding(data: &[u8], encoding: TextEncoding) -> Result<Self> {
    if data.len() >= 2 && data[0] == 0xFF && data[1] == 0xD8 {
      return Ok(Self::Jpeg(JpegFile::decode(data, encoding)?));
    }
    if data.len() >= 4 && (&data[0..4] == b"MM\x00\x2a" || &data[0..4] == b"II\x2a\x00") {
      return Ok(Self::Tiff(TiffFile::decode(data, encoding)?));
    }
    if data.len() >= 8 && &data[0..8] == b"\x89PNG\x0d\x0a\x1a\x0a" {
      return Ok(Self::Png(PngFile::decode(data, encoding)?));
    }
    if data.len() >= 3 && &data[0..3] == b"GIF" {
      return Ok(Self::Gif(GifFile::decode(data, encoding)?));
    }
    Err(Error::NotAnImageFile)
  }

  /// Read and decode a file from disk.
  pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
    let data = std::fs::read(path)?;
    Self::from_buffer(&data)
  }

  pub fn format(&self) -> FileFormat {
    match self {
      Self::Jpeg(_) => FileFormat::Jpeg,
      Self::Tiff(_) => FileFormat::Tiff,
      Self::Png(_) => FileFormat::Png,
      Self::Gif(_) => FileFormat::Gif,
    }
  }

  pub fn properties(&self) -> &PropertyCollection {
    match self {
      Self::Jpeg(f) => &f.properties,
      Self::Tiff(f) => &f.properties,
      Self::Png(f) => &f.properties,
      Self::Gif(f) => &f.properties,
    }
  }

  pub fn properties_mut(&mut self) -> &mut PropertyCollection {
    match self {
      Self::Jpeg(f) => &mut f.properties,
      Self::Tiff(f) => &mut f.properties,
      Self::Png(f) => &mut f.properties,
      Self::Gif(f) => &mut f.properties,
    }
  }

  /// Diagnostics accumulated while decoding and, after [`Self::encode`],
  /// while encoding.
  pub fn diagnostics(&self) -> &[Diagnostic] {
    match self {
      Self::Jpeg(f) => &f.diags,
      Self::Tiff(f) => &f.diags,
      Self::Png(f) => &f.diags,
      Self::Gif(f) => &f.diags,
    }
  }

  /// The embedded Exif thumbnail; JPEG only.
  pub fn thumbnail(&self) -> Option<&[u8]> {
    match self {
      Self::Jpeg(f) => f.thumbnail(),
      _ => None,
    }
  }

  /// Replace or clear the embedded thumbnail; ignored by containers that
  /// have no Exif thumbnail slot.
  pub fn set_thumbnail(&mut self, thumbnail: Option<Vec<u8>>) {
    if let Self::Jpeg(f) = self {
      f.set_thumbnail(thumbnail);
    }
  }

  /// Serialize back into the container the image was loaded from.
  pub fn encode(&mut self) -> Result<Vec<u8>> {
    match self {
      Self::Jpeg(f) => f.encode(),
      Self::Tiff(f) => Ok(f.encode()),
      Self::Png(f) => Ok(f.encode()),
      Self::Gif(f) => Ok(f.encode()),
    }
  }

  /// Serialize into a writer.
  pub fn save<W: Write>(&mut self, writer: &mut W) -> Result<()> {
    let data = self.encode()?;
    writer.write_all(&data)?;
    Ok(())
  }

  /// Serialize to a file on disk.
  pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
    let data = self.encode()?;
    std::fs::write(path, data)?;
    Ok(())
  }

  /// Decrease file size by removing metadata, each container keeping only
  /// its structural whitelist.
  pub fn crush(&mut self) {
    match self {
      Self::Jpeg(f) => f.crush(),
      Self::Tiff(f) => f.crush(),
      Self::Png(f) => f.crush(),
      Self::Gif(f) => f.crush(),
    }
  }
}
