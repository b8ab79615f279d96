// SPDX-License-Identifier: MIT

//! Closed enumerations backing enum-tags.
//!
//! Every enumeration is `#[repr(u16)]` regardless of its on-disk storage
//! class; the storage class lives in [`EnumKind::storage`](crate::tags::EnumKind)
//! and only matters when converting to and from the wire.

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::tags::EnumKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum Orientation {
  Normal = 1,
  MirroredVertically = 2,
  Rotated180 = 3,
  MirroredHorizontally = 4,
  RotatedLeftAndMirroredVertically = 5,
  RotatedRight = 6,
  RotatedLeft = 7,
  RotatedRightAndMirroredVertically = 8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum Compression {
  Uncompressed = 1,
  CCITT1D = 2,
  Group3Fax = 3,
  Group4Fax = 4,
  LZW = 5,
  JPEG = 6,
  PackBits = 32773,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum PhotometricInterpretation {
  WhiteIsZero = 0,
  BlackIsZero = 1,
  RGB = 2,
  RGBPalette = 3,
  TransparencyMask = 4,
  CMYK = 5,
  YCbCr = 6,
  CIELab = 8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum PlanarConfiguration {
  ChunkyFormat = 1,
  PlanarFormat = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum YCbCrPositioning {
  Centered = 1,
  CoSited = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum ResolutionUnit {
  None = 1,
  Inches = 2,
  Centimeters = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum ColorSpace {
  SRGB = 1,
  Uncalibrated = 0xffff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum ExposureProgram {
  NotDefined = 0,
  Manual = 1,
  Normal = 2,
  AperturePriority = 3,
  ShutterPriority = 4,
  Creative = 5,
  Action = 6,
  Portrait = 7,
  Landscape = 8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum MeteringMode {
  Unknown = 0,
  Average = 1,
  CenterWeightedAverage = 2,
  Spot = 3,
  MultiSpot = 4,
  Pattern = 5,
  Partial = 6,
  Other = 255,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum LightSource {
  Unknown = 0,
  Daylight = 1,
  Fluorescent = 2,
  Tungsten = 3,
  Flash = 4,
  FineWeather = 9,
  CloudyWeather = 10,
  Shade = 11,
  DaylightFluorescent = 12,
  DayWhiteFluorescent = 13,
  CoolWhiteFluorescent = 14,
  WhiteFluorescent = 15,
  StandardLightA = 17,
  StandardLightB = 18,
  StandardLightC = 19,
  D55 = 20,
  D65 = 21,
  D75 = 22,
  D50 = 23,
  ISOStudioTungsten = 24,
  OtherLightSource = 255,
}

/// Flash is a bit field; the named values are the individual flag bits, so
/// values read from files are often combinations not named here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum Flash {
  FlashDidNotFire = 0,
  FlashFired = 1,
  StrobeReturnLightDetected = 2,
  StrobeReturnLightNotDetected = 4,
  CompulsoryFlashMode = 8,
  AutoMode = 16,
  NoFlashFunction = 32,
  RedEyeReductionMode = 64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum SensingMethod {
  NotDefined = 1,
  OneChipColorAreaSensor = 2,
  TwoChipColorAreaSensor = 3,
  ThreeChipColorAreaSensor = 4,
  ColorSequentialAreaSensor = 5,
  TriLinearSensor = 7,
  ColorSequentialLinearSensor = 8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum FileSource {
  DSC = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum SceneType {
  DirectlyPhotographedImage = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum CustomRendered {
  NormalProcess = 0,
  CustomProcess = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum ExposureMode {
  Auto = 0,
  Manual = 1,
  AutoBracket = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum WhiteBalance {
  Auto = 0,
  Manual = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum SceneCaptureType {
  Standard = 0,
  Landscape = 1,
  Portrait = 2,
  NightScene = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum GainControl {
  None = 0,
  LowGainUp = 1,
  HighGainUp = 2,
  LowGainDown = 3,
  HighGainDown = 4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum Contrast {
  Normal = 0,
  Soft = 1,
  Hard = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum Saturation {
  Normal = 0,
  Low = 1,
  High = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum Sharpness {
  Normal = 0,
  Soft = 1,
  Hard = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum SubjectDistanceRange {
  Unknown = 0,
  Macro = 1,
  CloseView = 2,
  DistantView = 3,
}

// GPS reference values are the ASCII codes of their single-letter form.

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum GpsLatitudeRef {
  North = 78,
  South = 83,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum GpsLongitudeRef {
  East = 69,
  West = 87,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum GpsAltitudeRef {
  AboveSeaLevel = 0,
  BelowSeaLevel = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum GpsStatus {
  MeasurementInProgress = 65,
  MeasurementInteroperability = 86,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum GpsMeasureMode {
  TwoDimensional = 50,
  ThreeDimensional = 51,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum GpsSpeedRef {
  KilometersPerHour = 75,
  MilesPerHour = 77,
  Knots = 78,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum GpsDirectionRef {
  TrueDirection = 84,
  MagneticDirection = 77,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum GpsDistanceRef {
  Kilometers = 75,
  Miles = 77,
  Knots = 78,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum GpsDifferential {
  WithoutCorrection = 0,
  CorrectionApplied = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum JfifDensityUnit {
  /// Densities specify the pixel aspect ratio only.
  None = 0,
  DotsPerInch = 1,
  DotsPerCm = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum JfxxExtension {
  ThumbnailJPEG = 0x10,
  ThumbnailPaletteRGB = 0x11,
  Thumbnail24BitRGB = 0x13,
}

/// Display name for a raw enum value, if the backing enumeration names it.
pub fn enum_name(kind: EnumKind, raw: u16) -> Option<String> {
  macro_rules! fmt {
    ($ty:ty) => {
      <$ty>::try_from(raw).ok().map(|v| format!("{:?}", v))
    };
  }
  match kind {
    EnumKind::Orientation => fmt!(Orientation),
    EnumKind::Compression => fmt!(Compression),
    EnumKind::PhotometricInterpretation => fmt!(PhotometricInterpretation),
    EnumKind::PlanarConfiguration => fmt!(PlanarConfiguration),
    EnumKind::YCbCrPositioning => fmt!(YCbCrPositioning),
    EnumKind::ResolutionUnit => fmt!(ResolutionUnit),
    EnumKind::ColorSpace => fmt!(ColorSpace),
    EnumKind::ExposureProgram => fmt!(ExposureProgram),
    EnumKind::MeteringMode => fmt!(MeteringMode),
    EnumKind::LightSource => fmt!(LightSource),
    EnumKind::Flash => fmt!(Flash),
    EnumKind::SensingMethod => fmt!(SensingMethod),
    EnumKind::CustomRendered => fmt!(CustomRendered),
    EnumKind::ExposureMode => fmt!(ExposureMode),
    EnumKind::WhiteBalance => fmt!(WhiteBalance),
    EnumKind::SceneCaptureType => fmt!(SceneCaptureType),
    EnumKind::GainControl => fmt!(GainControl),
    EnumKind::Contrast => fmt!(Contrast),
    EnumKind::Saturation => fmt!(Saturation),
    EnumKind::Sharpness => fmt!(Sharpness),
    EnumKind::SubjectDistanceRange => fmt!(SubjectDistanceRange),
    EnumKind::GpsDifferential => fmt!(GpsDifferential),
    EnumKind::GpsAltitudeRef => fmt!(GpsAltitudeRef),
    EnumKind::JfifDensityUnit => fmt!(JfifDensityUnit),
    EnumKind::JfxxExtension => fmt!(JfxxExtension),
    EnumKind::FileSource => fmt!(FileSource),
    EnumKind::SceneType => fmt!(SceneType),
    EnumKind::GpsLatitudeRef => fmt!(GpsLatitudeRef),
    EnumKind::GpsLongitudeRef => fmt!(GpsLongitudeRef),
    EnumKind::GpsStatus => fmt!(GpsStatus),
    EnumKind::GpsMeasureMode => fmt!(GpsMeasureMode),
    EnumKind::GpsSpeedRef => fmt!(GpsSpeedRef),
    EnumKind::GpsDirectionRef => fmt!(GpsDirectionRef),
    EnumKind::GpsDistanceRef => fmt!(GpsDistanceRef),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn orientation_values() {
    assert_eq!(Orientation::try_from(6).ok(), Some(Orientation::RotatedRight));
    assert_eq!(u16::from(Orientation::RotatedLeft), 7);
    assert!(Orientation::try_from(0).is_err());
  }

  #[test]
  fn gps_refs_are_ascii_codes() {
    assert_eq!(u16::from(GpsLatitudeRef::North), b'N' as u16);
    assert_eq!(u16::from(GpsLongitudeRef::West), b'W' as u16);
    assert_eq!(u16::from(GpsSpeedRef::Knots), b'N' as u16);
  }

  #[test]
  fn names_for_raw_values() {
    assert_eq!(enum_name(EnumKind::Orientation, 6).as_deref(), Some("RotatedRight"));
    assert_eq!(enum_name(EnumKind::JfifDensityUnit, 1).as_deref(), Some("DotsPerInch"));
    assert_eq!(enum_name(EnumKind::Orientation, 99), None);
  }
}
