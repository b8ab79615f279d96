// SPDX-License-Identifier: MIT

use anyhow::Context;
use clap::ArgMatches;
use imagemeta::bits::Endian;
use imagemeta::{ImageFile, Severity};

/// Print every metadata property of the given file, one per line, followed
/// by any diagnostics the decoder accumulated.
pub fn dump(matches: &ArgMatches) -> anyhow::Result<()> {
  let path: &String = matches.get_one("FILE").expect("FILE is required");
  let raw = matches.get_flag("raw");

  let image = ImageFile::open(path).with_context(|| format!("Failed to load {}", path))?;
  println!("Format: {:?}", image.format());

  for prop in image.properties().iter() {
    if raw {
      let wire = prop.interop(Endian::Little);
      let preview: Vec<u8> = wire.data.iter().copied().take(16).collect();
      println!(
        "{:<8?} {:<28} {:<10?} count={:<5} {}{}",
        prop.ifd(),
        prop.name(),
        wire.type_code,
        wire.count,
        hex::encode(&preview),
        if wire.data.len() > 16 { "…" } else { "" }
      );
    } else {
      println!("{:<8?} {}", prop.ifd(), prop);
    }
  }

  if let Some(thumb) = image.thumbnail() {
    println!("Thumbnail: {} bytes", thumb.len());
  }

  for diag in image.diagnostics() {
    match diag.severity {
      Severity::Info => log::info!("{}", diag),
      Severity::Warning => log::warn!("{}", diag),
      Severity::Error => log::error!("{}", diag),
    }
  }
  Ok(())
}
