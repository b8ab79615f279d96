// SPDX-License-Identifier: MIT

use clap::{crate_version, Arg, ArgAction, Command};
use log::debug;

pub fn create_app() -> Command {
  debug!("Creating CLAP app configuration");
  Command::new("exiflab")
    .version(crate_version!())
    .about("exiflab - inspect and edit image metadata")
    .arg(
      Arg::new("debug")
        .short('d')
        .action(ArgAction::Count)
        .global(true)
        .help("Sets the level of debugging information"),
    )
    .subcommand_required(true)
    .arg_required_else_help(true)
    .subcommand(
      Command::new("dump")
        .about("Print metadata properties")
        .arg(Arg::new("raw").long("raw").action(ArgAction::SetTrue).help("Include wire-level type, count and data bytes"))
        .arg(Arg::new("FILE").required(true).help("Input file")),
    )
    .subcommand(
      Command::new("strip")
        .about("Remove metadata and save a crushed copy")
        .arg(Arg::new("INPUT").required(true).help("Input file"))
        .arg(Arg::new("OUTPUT").required(true).help("Output file")),
    )
    .subcommand(
      Command::new("thumb")
        .about("Extract the embedded thumbnail")
        .arg(Arg::new("INPUT").required(true).help("Input file"))
        .arg(Arg::new("OUTPUT").required(true).help("Output file for the thumbnail bytes")),
    )
}
