//! Library to read, edit and write image metadata: the Exif/TIFF tag
//! directories embedded in JPEG and TIFF files, PNG text/time chunks and
//! GIF comment extensions.
//!
//! Decoding takes a complete in-memory byte buffer and produces a typed
//! [`props::collection::PropertyCollection`]; saving re-serializes the
//! metadata into the container's native layout while re-emitting pixel
//! data and unknown sections byte for byte.
//!
//! # Example
//! ```rust,no_run
//! use imagemeta::tags::{Tag, TiffTag};
//! use imagemeta::ImageFile;
//!
//! fn main() -> imagemeta::Result<()> {
//!   let data = std::fs::read("photo.jpg")?;
//!   let mut image = ImageFile::from_buffer(&data)?;
//!
//!   for prop in image.properties().iter() {
//!     println!("{}", prop);
//!   }
//!
//!   image.properties_mut().set_str(Tag::Zeroth(TiffTag::Software), "exiflab");
//!   image.save_to_file("photo-tagged.jpg")?;
//!   Ok(())
//! }
//! ```

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

pub mod bits;
pub mod file;
pub mod formats;
pub mod props;
pub mod tags;
pub mod value;

pub use file::{FileFormat, ImageFile};
pub use props::collection::PropertyCollection;
pub use props::{Property, PropertyValue, TextEncoding};
pub use value::{InteropValue, Rational, SRational, TypeCode};

/// Fatal errors. Everything recoverable is reported as a [`Diagnostic`]
/// instead and never aborts a load or save.
#[derive(ThisError, Debug)]
pub enum Error {
  /// The buffer matches none of the supported container magics.
  #[error("Not a valid image file")]
  NotAnImageFile,

  #[error("Not a valid JPEG file: {}", _0)]
  InvalidJpeg(String),

  #[error("Not a valid TIFF structure: {}", _0)]
  InvalidTiff(String),

  #[error("Not a valid PNG file: {}", _0)]
  InvalidPng(String),

  #[error("Not a valid GIF file: {}", _0)]
  InvalidGif(String),

  /// A JPEG segment header grew past what its 16-bit length field can
  /// represent.
  #[error("Segment {:#04x} exceeds 64 KiB", _0)]
  SegmentTooLarge(u8),

  /// A caller requested an enum-backed property for a tag the registry has
  /// no enumeration for. This is a programming error, not a file defect.
  #[error("No enumeration is registered for tag {}", _0)]
  UnknownEnumType(String),

  #[error("I/O error: {:?}", _0)]
  Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Severity of a non-fatal anomaly encountered while reading or writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
  Info,
  Warning,
  Error,
}

/// A non-fatal anomaly: malformed fields recovered during decode,
/// defaulted tags and dropped segments during encode. Diagnostics are
/// accumulated in order; nothing is skipped silently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
  pub severity: Severity,
  pub message: String,
}

impl Diagnostic {
  pub fn info(message: String) -> Self {
    Self { severity: Severity::Info, message }
  }

  pub fn warning(message: String) -> Self {
    Self { severity: Severity::Warning, message }
  }

  pub fn error(message: String) -> Self {
    Self { severity: Severity::Error, message }
  }
}

impl Display for Diagnostic {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_fmt(format_args!("[{:?}] {}", self.severity, self.message))
  }
}
