// SPDX-License-Identifier: MIT

//! Tag identifiers scoped by metadata directory.
//!
//! Tag ids are only unique within a directory: id 2 is `GpsTag::GPSLatitude`
//! in the GPS IFD but `InteropTag::InteroperabilityVersion` in the Interop
//! IFD. External consumers therefore address properties through [`Tag`],
//! which pairs the directory with the per-directory enumeration.

use std::collections::HashMap;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

/// The directory (real IFD or container pseudo-directory) a tag belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ifd {
  /// Zeroth (primary image) IFD of the Exif/TIFF structure.
  Zeroth,
  /// Exif sub-IFD, linked from the Zeroth IFD.
  Exif,
  /// GPS sub-IFD, linked from the Zeroth IFD.
  Gps,
  /// Interoperability sub-IFD, linked from the Exif IFD.
  Interop,
  /// First (thumbnail) IFD, chained after the Zeroth IFD.
  First,
  /// Pseudo-directory for the JFIF APP0 segment.
  Jfif,
  /// Pseudo-directory for the JFXX APP0 segment.
  Jfxx,
  /// Pseudo-directory for PNG text/time chunks.
  Png,
  /// Pseudo-directory for GIF extension blocks.
  Gif,
}

macro_rules! tags {
  {
    $( #[$enum_attr:meta] )*
    $vis:vis enum $name:ident {
      $($(#[$ident_attr:meta])* $tag:ident = $val:expr,)*
    }
  } => {
    $( #[$enum_attr] )*
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
    $vis enum $name {
      $($(#[$ident_attr])* $tag,)*
      /// A tag id this enumeration does not name. Unknown tags still
      /// round-trip through decode and encode.
      Unknown(u16),
    }

    impl $name {
      pub fn from_u16(val: u16) -> Option<Self> {
        match val {
          $( $val => Some($name::$tag), )*
          _ => None,
        }
      }

      pub fn from_u16_exhaustive(val: u16) -> Self {
        Self::from_u16(val).unwrap_or($name::Unknown(val))
      }

      pub fn to_u16(&self) -> u16 {
        match *self {
          $( $name::$tag => $val, )*
          $name::Unknown(n) => n,
        }
      }
    }

    impl From<$name> for u16 {
      fn from(tag: $name) -> u16 {
        tag.to_u16()
      }
    }
  };
}

tags! {
/// Baseline TIFF tags. This namespace is shared by the Zeroth and the First
/// (thumbnail) directories.
pub enum TiffTag {
    NewSubfileType = 254,
    SubfileType = 255,
    ImageWidth = 256,
    ImageLength = 257,
    BitsPerSample = 258,
    Compression = 259,
    PhotometricInterpretation = 262,
    Threshholding = 263,
    CellWidth = 264,
    CellLength = 265,
    FillOrder = 266,
    DocumentName = 269,
    ImageDescription = 270,
    Make = 271,
    Model = 272,
    StripOffsets = 273,
    Orientation = 274,
    SamplesPerPixel = 277,
    RowsPerStrip = 278,
    StripByteCounts = 279,
    MinSampleValue = 280,
    MaxSampleValue = 281,
    XResolution = 282,
    YResolution = 283,
    PlanarConfiguration = 284,
    XPosition = 286,
    YPosition = 287,
    FreeOffsets = 288,
    FreeByteCounts = 289,
    GrayResponseUnit = 290,
    GrayResponseCurve = 291,
    T4Options = 292,
    T6Options = 293,
    ResolutionUnit = 296,
    TransferFunction = 301,
    Software = 305,
    DateTime = 306,
    Artist = 315,
    HostComputer = 316,
    Predictor = 317,
    WhitePoint = 318,
    PrimaryChromaticities = 319,
    ColorMap = 320,
    HalftoneHints = 321,
    TileWidth = 322,
    TileLength = 323,
    TileOffsets = 324,
    TileByteCounts = 325,
    InkSet = 332,
    InkNames = 333,
    NumberOfInks = 334,
    DotRange = 336,
    TargetPrinter = 337,
    ExtraSamples = 338,
    SampleFormat = 339,
    SMinSampleValue = 340,
    SMaxSampleValue = 341,
    TransferRange = 342,
    JPEGProc = 512,
    /// Offset of the JPEG-compressed thumbnail inside the First IFD.
    JPEGInterchangeFormat = 513,
    JPEGInterchangeFormatLength = 514,
    JPEGRestartInterval = 515,
    JPEGLosslessPredictors = 517,
    JPEGPointTransforms = 518,
    JPEGQTables = 519,
    JPEGDCTables = 520,
    JPEGACTables = 521,
    YCbCrCoefficients = 529,
    YCbCrSubSampling = 530,
    YCbCrPositioning = 531,
    ReferenceBlackWhite = 532,
    Copyright = 33432,
    /// Pointer to the Exif sub-IFD.
    ExifIFDPointer = 34665,
    /// Pointer to the GPS sub-IFD.
    GPSIFDPointer = 34853,
    /// UTF-16 title string written by Windows Explorer.
    WindowsTitle = 40091,
    WindowsComment = 40092,
    WindowsAuthor = 40093,
    WindowsKeywords = 40094,
    WindowsSubject = 40095,
}
}

tags! {
/// Tags of the Exif sub-IFD.
pub enum ExifTag {
    ExposureTime = 33434,
    FNumber = 33437,
    ExposureProgram = 34850,
    SpectralSensitivity = 34852,
    ISOSpeedRatings = 34855,
    OECF = 34856,
    ExifVersion = 36864,
    DateTimeOriginal = 36867,
    DateTimeDigitized = 36868,
    ComponentsConfiguration = 37121,
    CompressedBitsPerPixel = 37122,
    ShutterSpeedValue = 37377,
    ApertureValue = 37378,
    BrightnessValue = 37379,
    ExposureBiasValue = 37380,
    MaxApertureValue = 37381,
    SubjectDistance = 37382,
    MeteringMode = 37383,
    LightSource = 37384,
    Flash = 37385,
    FocalLength = 37386,
    SubjectArea = 37396,
    /// Opaque vendor blob; its absolute file offset is preserved on save.
    MakerNote = 37500,
    UserComment = 37510,
    SubsecTime = 37520,
    SubsecTimeOriginal = 37521,
    SubsecTimeDigitized = 37522,
    FlashpixVersion = 40960,
    ColorSpace = 40961,
    PixelXDimension = 40962,
    PixelYDimension = 40963,
    RelatedSoundFile = 40964,
    /// Pointer to the Interoperability sub-IFD.
    InteropIFDPointer = 40965,
    FlashEnergy = 41483,
    SpatialFrequencyResponse = 41484,
    FocalPlaneXResolution = 41486,
    FocalPlaneYResolution = 41487,
    FocalPlaneResolutionUnit = 41488,
    SubjectLocation = 41492,
    ExposureIndex = 41493,
    SensingMethod = 41495,
    FileSource = 41728,
    SceneType = 41729,
    CFAPattern = 41730,
    CustomRendered = 41985,
    ExposureMode = 41986,
    WhiteBalance = 41987,
    DigitalZoomRatio = 41988,
    FocalLengthIn35mmFilm = 41989,
    SceneCaptureType = 41990,
    GainControl = 41991,
    Contrast = 41992,
    Saturation = 41993,
    Sharpness = 41994,
    DeviceSettingDescription = 41995,
    SubjectDistanceRange = 41996,
    ImageUniqueID = 42016,
    CameraOwnerName = 42032,
    BodySerialNumber = 42033,
    LensSpecification = 42034,
    LensMake = 42035,
    LensModel = 42036,
    LensSerialNumber = 42037,
}
}

tags! {
/// Tags of the GPS sub-IFD.
pub enum GpsTag {
    GPSVersionID = 0,
    GPSLatitudeRef = 1,
    GPSLatitude = 2,
    GPSLongitudeRef = 3,
    GPSLongitude = 4,
    GPSAltitudeRef = 5,
    GPSAltitude = 6,
    GPSTimeStamp = 7,
    GPSSatellites = 8,
    GPSStatus = 9,
    GPSMeasureMode = 10,
    GPSDOP = 11,
    GPSSpeedRef = 12,
    GPSSpeed = 13,
    GPSTrackRef = 14,
    GPSTrack = 15,
    GPSImgDirectionRef = 16,
    GPSImgDirection = 17,
    GPSMapDatum = 18,
    GPSDestLatitudeRef = 19,
    GPSDestLatitude = 20,
    GPSDestLongitudeRef = 21,
    GPSDestLongitude = 22,
    GPSDestBearingRef = 23,
    GPSDestBearing = 24,
    GPSDestDistanceRef = 25,
    GPSDestDistance = 26,
    GPSProcessingMethod = 27,
    GPSAreaInformation = 28,
    GPSDateStamp = 29,
    GPSDifferential = 30,
}
}

tags! {
/// Tags of the Interoperability sub-IFD.
pub enum InteropTag {
    InteroperabilityIndex = 1,
    InteroperabilityVersion = 2,
    RelatedImageFileFormat = 4096,
    RelatedImageWidth = 4097,
    RelatedImageLength = 4098,
}
}

tags! {
/// Pseudo-tags for the fixed-layout JFIF APP0 segment.
pub enum JfifTag {
    Version = 0,
    Units = 1,
    XDensity = 2,
    YDensity = 3,
    XThumbnail = 4,
    YThumbnail = 5,
    Thumbnail = 6,
}
}

tags! {
/// Pseudo-tags for the JFXX extension APP0 segment.
pub enum JfxxTag {
    ExtensionCode = 0,
    XThumbnail = 1,
    YThumbnail = 2,
    Thumbnail = 3,
}
}

tags! {
/// Pseudo-tags for PNG metadata chunks.
pub enum PngTag {
    Title = 1,
    Author = 2,
    Description = 3,
    Copyright = 4,
    CreationTime = 5,
    Software = 6,
    Disclaimer = 7,
    Warning = 8,
    Source = 9,
    Comment = 10,
    /// Text chunk with a keyword not covered by the named tags.
    Text = 11,
    /// The `tIME` last-modification chunk.
    TimeStamp = 12,
}
}

tags! {
/// Pseudo-tags for GIF extension blocks.
pub enum GifTag {
    Comment = 1,
}
}

/// A tag identifier together with its owning directory.
///
/// This is the key used by the property collection and the directory codecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
  Zeroth(TiffTag),
  Exif(ExifTag),
  Gps(GpsTag),
  Interop(InteropTag),
  First(TiffTag),
  Jfif(JfifTag),
  Jfxx(JfxxTag),
  Png(PngTag),
  Gif(GifTag),
}

impl Tag {
  /// The directory owning this tag.
  pub fn ifd(&self) -> Ifd {
    match self {
      Self::Zeroth(_) => Ifd::Zeroth,
      Self::Exif(_) => Ifd::Exif,
      Self::Gps(_) => Ifd::Gps,
      Self::Interop(_) => Ifd::Interop,
      Self::First(_) => Ifd::First,
      Self::Jfif(_) => Ifd::Jfif,
      Self::Jfxx(_) => Ifd::Jfxx,
      Self::Png(_) => Ifd::Png,
      Self::Gif(_) => Ifd::Gif,
    }
  }

  /// The numeric id, unique only within [`Tag::ifd`].
  pub fn id(&self) -> u16 {
    match self {
      Self::Zeroth(t) | Self::First(t) => t.to_u16(),
      Self::Exif(t) => t.to_u16(),
      Self::Gps(t) => t.to_u16(),
      Self::Interop(t) => t.to_u16(),
      Self::Jfif(t) => t.to_u16(),
      Self::Jfxx(t) => t.to_u16(),
      Self::Png(t) => t.to_u16(),
      Self::Gif(t) => t.to_u16(),
    }
  }

  /// Resolve a numeric id inside a directory namespace. Never fails; ids
  /// without a name map to the namespace's `Unknown` arm.
  pub fn from_id(ifd: Ifd, id: u16) -> Tag {
    match ifd {
      Ifd::Zeroth => Tag::Zeroth(TiffTag::from_u16_exhaustive(id)),
      Ifd::Exif => Tag::Exif(ExifTag::from_u16_exhaustive(id)),
      Ifd::Gps => Tag::Gps(GpsTag::from_u16_exhaustive(id)),
      Ifd::Interop => Tag::Interop(InteropTag::from_u16_exhaustive(id)),
      Ifd::First => Tag::First(TiffTag::from_u16_exhaustive(id)),
      Ifd::Jfif => Tag::Jfif(JfifTag::from_u16_exhaustive(id)),
      Ifd::Jfxx => Tag::Jfxx(JfxxTag::from_u16_exhaustive(id)),
      Ifd::Png => Tag::Png(PngTag::from_u16_exhaustive(id)),
      Ifd::Gif => Tag::Gif(GifTag::from_u16_exhaustive(id)),
    }
  }

  /// Display name of the tag, e.g. `Orientation` or `<?0x9999>` for ids
  /// without a name.
  pub fn name(&self) -> String {
    let inner = match self {
      Self::Zeroth(t) | Self::First(t) => format!("{:?}", t),
      Self::Exif(t) => format!("{:?}", t),
      Self::Gps(t) => format!("{:?}", t),
      Self::Interop(t) => format!("{:?}", t),
      Self::Jfif(t) => format!("{:?}", t),
      Self::Jfxx(t) => format!("{:?}", t),
      Self::Png(t) => format!("{:?}", t),
      Self::Gif(t) => format!("{:?}", t),
    };
    if inner.starts_with("Unknown(") {
      format!("<?{:#06x}>", self.id())
    } else {
      inner
    }
  }
}

/// Which closed enumeration backs an enum-tag, and how its raw value is
/// stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumKind {
  // SHORT backed
  Orientation,
  Compression,
  PhotometricInterpretation,
  PlanarConfiguration,
  YCbCrPositioning,
  ResolutionUnit,
  ColorSpace,
  ExposureProgram,
  MeteringMode,
  LightSource,
  Flash,
  SensingMethod,
  CustomRendered,
  ExposureMode,
  WhiteBalance,
  SceneCaptureType,
  GainControl,
  Contrast,
  Saturation,
  Sharpness,
  SubjectDistanceRange,
  GpsDifferential,
  // BYTE backed
  GpsAltitudeRef,
  JfifDensityUnit,
  JfxxExtension,
  // UNDEFINED backed, single byte
  FileSource,
  SceneType,
  // ASCII backed, single character plus NUL
  GpsLatitudeRef,
  GpsLongitudeRef,
  GpsStatus,
  GpsMeasureMode,
  GpsSpeedRef,
  GpsDirectionRef,
  GpsDistanceRef,
}

/// Storage class of an enum-tag's raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumStorage {
  Short,
  Byte,
  Undefined,
  Ascii,
}

impl EnumKind {
  pub fn storage(&self) -> EnumStorage {
    use EnumKind::*;
    match self {
      GpsAltitudeRef | JfifDensityUnit | JfxxExtension => EnumStorage::Byte,
      FileSource | SceneType => EnumStorage::Undefined,
      GpsLatitudeRef | GpsLongitudeRef | GpsStatus | GpsMeasureMode | GpsSpeedRef | GpsDirectionRef | GpsDistanceRef => EnumStorage::Ascii,
      _ => EnumStorage::Short,
    }
  }
}

/// How the property factory materializes a tag, beyond what the wire type
/// code alone can express. Tags without an entry decode by wire type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
  /// Decode strictly from the wire type code.
  Default,
  /// Enum-backed value rendered through a closed enumeration.
  Enumerated(EnumKind),
  /// 3 x RATIONAL degree/minute/second (or hour/minute/second) composite.
  GpsCoordinate,
  /// 4 x RATIONAL lens specification composite.
  LensSpec,
  /// Exactly four ASCII characters stored as UNDEFINED.
  Version,
  /// UNDEFINED with a leading 8-byte character set id (UserComment).
  EncodedString,
  /// UTF-16LE text stored with type BYTE (Windows Explorer tags).
  WindowsString,
  /// ASCII `YYYY:MM:DD HH:MM:SS` timestamp.
  DateTime,
  /// ASCII `YYYY:MM:DD` date.
  Date,
}

lazy_static! {
  static ref TAG_KINDS: HashMap<Tag, TagKind> = {
    use TagKind::*;
    let mut m = HashMap::new();
    // Zeroth IFD
    m.insert(Tag::Zeroth(TiffTag::Orientation), Enumerated(EnumKind::Orientation));
    m.insert(Tag::Zeroth(TiffTag::Compression), Enumerated(EnumKind::Compression));
    m.insert(Tag::Zeroth(TiffTag::PhotometricInterpretation), Enumerated(EnumKind::PhotometricInterpretation));
    m.insert(Tag::Zeroth(TiffTag::PlanarConfiguration), Enumerated(EnumKind::PlanarConfiguration));
    m.insert(Tag::Zeroth(TiffTag::YCbCrPositioning), Enumerated(EnumKind::YCbCrPositioning));
    m.insert(Tag::Zeroth(TiffTag::ResolutionUnit), Enumerated(EnumKind::ResolutionUnit));
    m.insert(Tag::Zeroth(TiffTag::DateTime), DateTime);
    m.insert(Tag::Zeroth(TiffTag::WindowsTitle), WindowsString);
    m.insert(Tag::Zeroth(TiffTag::WindowsComment), WindowsString);
    m.insert(Tag::Zeroth(TiffTag::WindowsAuthor), WindowsString);
    m.insert(Tag::Zeroth(TiffTag::WindowsKeywords), WindowsString);
    m.insert(Tag::Zeroth(TiffTag::WindowsSubject), WindowsString);
    // First IFD shares the namespace and the interpretations
    m.insert(Tag::First(TiffTag::Orientation), Enumerated(EnumKind::Orientation));
    m.insert(Tag::First(TiffTag::Compression), Enumerated(EnumKind::Compression));
    m.insert(Tag::First(TiffTag::PhotometricInterpretation), Enumerated(EnumKind::PhotometricInterpretation));
    m.insert(Tag::First(TiffTag::ResolutionUnit), Enumerated(EnumKind::ResolutionUnit));
    m.insert(Tag::First(TiffTag::YCbCrPositioning), Enumerated(EnumKind::YCbCrPositioning));
    m.insert(Tag::First(TiffTag::DateTime), DateTime);
    // Exif IFD
    m.insert(Tag::Exif(ExifTag::ExposureProgram), Enumerated(EnumKind::ExposureProgram));
    m.insert(Tag::Exif(ExifTag::MeteringMode), Enumerated(EnumKind::MeteringMode));
    m.insert(Tag::Exif(ExifTag::LightSource), Enumerated(EnumKind::LightSource));
    m.insert(Tag::Exif(ExifTag::Flash), Enumerated(EnumKind::Flash));
    m.insert(Tag::Exif(ExifTag::ColorSpace), Enumerated(EnumKind::ColorSpace));
    m.insert(Tag::Exif(ExifTag::SensingMethod), Enumerated(EnumKind::SensingMethod));
    m.insert(Tag::Exif(ExifTag::CustomRendered), Enumerated(EnumKind::CustomRendered));
    m.insert(Tag::Exif(ExifTag::ExposureMode), Enumerated(EnumKind::ExposureMode));
    m.insert(Tag::Exif(ExifTag::WhiteBalance), Enumerated(EnumKind::WhiteBalance));
    m.insert(Tag::Exif(ExifTag::SceneCaptureType), Enumerated(EnumKind::SceneCaptureType));
    m.insert(Tag::Exif(ExifTag::GainControl), Enumerated(EnumKind::GainControl));
    m.insert(Tag::Exif(ExifTag::Contrast), Enumerated(EnumKind::Contrast));
    m.insert(Tag::Exif(ExifTag::Saturation), Enumerated(EnumKind::Saturation));
    m.insert(Tag::Exif(ExifTag::Sharpness), Enumerated(EnumKind::Sharpness));
    m.insert(Tag::Exif(ExifTag::SubjectDistanceRange), Enumerated(EnumKind::SubjectDistanceRange));
    m.insert(Tag::Exif(ExifTag::FocalPlaneResolutionUnit), Enumerated(EnumKind::ResolutionUnit));
    m.insert(Tag::Exif(ExifTag::FileSource), Enumerated(EnumKind::FileSource));
    m.insert(Tag::Exif(ExifTag::SceneType), Enumerated(EnumKind::SceneType));
    m.insert(Tag::Exif(ExifTag::ExifVersion), Version);
    m.insert(Tag::Exif(ExifTag::FlashpixVersion), Version);
    m.insert(Tag::Exif(ExifTag::UserComment), EncodedString);
    m.insert(Tag::Exif(ExifTag::DateTimeOriginal), DateTime);
    m.insert(Tag::Exif(ExifTag::DateTimeDigitized), DateTime);
    m.insert(Tag::Exif(ExifTag::LensSpecification), LensSpec);
    // GPS IFD
    m.insert(Tag::Gps(GpsTag::GPSLatitudeRef), Enumerated(EnumKind::GpsLatitudeRef));
    m.insert(Tag::Gps(GpsTag::GPSLatitude), GpsCoordinate);
    m.insert(Tag::Gps(GpsTag::GPSLongitudeRef), Enumerated(EnumKind::GpsLongitudeRef));
    m.insert(Tag::Gps(GpsTag::GPSLongitude), GpsCoordinate);
    m.insert(Tag::Gps(GpsTag::GPSAltitudeRef), Enumerated(EnumKind::GpsAltitudeRef));
    m.insert(Tag::Gps(GpsTag::GPSTimeStamp), GpsCoordinate);
    m.insert(Tag::Gps(GpsTag::GPSStatus), Enumerated(EnumKind::GpsStatus));
    m.insert(Tag::Gps(GpsTag::GPSMeasureMode), Enumerated(EnumKind::GpsMeasureMode));
    m.insert(Tag::Gps(GpsTag::GPSSpeedRef), Enumerated(EnumKind::GpsSpeedRef));
    m.insert(Tag::Gps(GpsTag::GPSTrackRef), Enumerated(EnumKind::GpsDirectionRef));
    m.insert(Tag::Gps(GpsTag::GPSImgDirectionRef), Enumerated(EnumKind::GpsDirectionRef));
    m.insert(Tag::Gps(GpsTag::GPSDestLatitudeRef), Enumerated(EnumKind::GpsLatitudeRef));
    m.insert(Tag::Gps(GpsTag::GPSDestLatitude), GpsCoordinate);
    m.insert(Tag::Gps(GpsTag::GPSDestLongitudeRef), Enumerated(EnumKind::GpsLongitudeRef));
    m.insert(Tag::Gps(GpsTag::GPSDestLongitude), GpsCoordinate);
    m.insert(Tag::Gps(GpsTag::GPSDestBearingRef), Enumerated(EnumKind::GpsDirectionRef));
    m.insert(Tag::Gps(GpsTag::GPSDestDistanceRef), Enumerated(EnumKind::GpsDistanceRef));
    m.insert(Tag::Gps(GpsTag::GPSDifferential), Enumerated(EnumKind::GpsDifferential));
    m.insert(Tag::Gps(GpsTag::GPSDateStamp), Date);
    // Interop IFD
    m.insert(Tag::Interop(InteropTag::InteroperabilityVersion), Version);
    // JFIF / JFXX pseudo-directories
    m.insert(Tag::Jfif(JfifTag::Units), Enumerated(EnumKind::JfifDensityUnit));
    m.insert(Tag::Jfxx(JfxxTag::ExtensionCode), Enumerated(EnumKind::JfxxExtension));
    m
  };
}

impl TagKind {
  /// Registry lookup; O(1) within the directory namespace.
  pub fn of(tag: Tag) -> TagKind {
    TAG_KINDS.get(&tag).copied().unwrap_or(TagKind::Default)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ids_round_trip() {
    assert_eq!(TiffTag::Orientation.to_u16(), 274);
    assert_eq!(TiffTag::from_u16(274), Some(TiffTag::Orientation));
    assert_eq!(TiffTag::from_u16_exhaustive(0x9999), TiffTag::Unknown(0x9999));
    assert_eq!(TiffTag::Unknown(0x9999).to_u16(), 0x9999);
  }

  #[test]
  fn tag_ids_collide_across_directories() {
    // Id 2 means different things in different namespaces.
    let gps = Tag::from_id(Ifd::Gps, 2);
    let interop = Tag::from_id(Ifd::Interop, 2);
    assert_eq!(gps, Tag::Gps(GpsTag::GPSLatitude));
    assert_eq!(interop, Tag::Interop(InteropTag::InteroperabilityVersion));
    assert_ne!(gps, interop);
    assert_eq!(TagKind::of(gps), TagKind::GpsCoordinate);
    assert_eq!(TagKind::of(interop), TagKind::Version);
  }

  #[test]
  fn zeroth_and_first_share_namespace_but_not_identity() {
    let zeroth = Tag::from_id(Ifd::Zeroth, 274);
    let first = Tag::from_id(Ifd::First, 274);
    assert_eq!(zeroth.id(), first.id());
    assert_ne!(zeroth, first);
    assert_eq!(zeroth.ifd(), Ifd::Zeroth);
    assert_eq!(first.ifd(), Ifd::First);
  }

  #[test]
  fn names() {
    assert_eq!(Tag::Zeroth(TiffTag::Make).name(), "Make");
    assert_eq!(Tag::Gps(GpsTag::GPSLatitude).name(), "GPSLatitude");
    assert_eq!(Tag::Zeroth(TiffTag::Unknown(0x0042)).name(), "<?0x0042>");
  }

  #[test]
  fn enum_storage_classes() {
    assert_eq!(EnumKind::Orientation.storage(), EnumStorage::Short);
    assert_eq!(EnumKind::GpsAltitudeRef.storage(), EnumStorage::Byte);
    assert_eq!(EnumKind::FileSource.storage(), EnumStorage::Undefined);
    assert_eq!(EnumKind::GpsLatitudeRef.storage(), EnumStorage::Ascii);
  }
}
