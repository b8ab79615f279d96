// SPDX-License-Identifier: MIT

use anyhow::Context;
use clap::ArgMatches;
use imagemeta::ImageFile;

/// Crush the input file (drop all metadata except each container's
/// structural whitelist) and save it to the output path.
pub fn strip(matches: &ArgMatches) -> anyhow::Result<()> {
  let input: &String = matches.get_one("INPUT").expect("INPUT is required");
  let output: &String = matches.get_one("OUTPUT").expect("OUTPUT is required");

  let mut image = ImageFile::open(input).with_context(|| format!("Failed to load {}", input))?;
  let before = image.properties().len();
  image.crush();
  image.save_to_file(output).with_context(|| format!("Failed to save {}", output))?;
  log::info!("Stripped {} properties from {}", before, input);
  println!("Wrote {}", output);
  Ok(())
}
