// SPDX-License-Identifier: MIT

use anyhow::{bail, Context};
use clap::ArgMatches;
use imagemeta::ImageFile;

/// Write the embedded Exif thumbnail to a file.
pub fn thumb(matches: &ArgMatches) -> anyhow::Result<()> {
  let input: &String = matches.get_one("INPUT").expect("INPUT is required");
  let output: &String = matches.get_one("OUTPUT").expect("OUTPUT is required");

  let image = ImageFile::open(input).with_context(|| format!("Failed to load {}", input))?;
  match image.thumbnail() {
    Some(data) => {
      std::fs::write(output, data).with_context(|| format!("Failed to save {}", output))?;
      println!("Wrote {} ({} bytes)", output, data.len());
      Ok(())
    }
    None => bail!("{} contains no embedded thumbnail", input),
  }
}
