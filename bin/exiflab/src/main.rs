// SPDX-License-Identifier: MIT

mod app;
mod dump;
mod strip;
mod thumb;

use fern::colors::{Color, ColoredLevelConfig};

/// Main entry function
///
/// We initialize the fern logger here, create a Clap command line
/// parser and dispatch to the subcommand handlers.
fn main() -> anyhow::Result<()> {
  let matches = app::create_app().try_get_matches().unwrap_or_else(|e| e.exit());

  let colors = ColoredLevelConfig::new().debug(Color::Magenta);
  fern::Dispatch::new()
    .chain(std::io::stderr())
    .level(match matches.get_count("debug") {
      0 => log::LevelFilter::Error,
      1 => log::LevelFilter::Warn,
      2 => log::LevelFilter::Info,
      3 => log::LevelFilter::Debug,
      _ => log::LevelFilter::Trace,
    })
    .format(move |out, message, record| {
      out.finish(format_args!(
        "[{:6}][{}] {} ({}:{})",
        colors.color(record.level()),
        record.target(),
        message,
        record.file().unwrap_or("<undefined>"),
        record.line().unwrap_or(0)
      ))
    })
    .apply()
    .expect("Invalid fern configuration, exiting");

  match matches.subcommand() {
    Some(("dump", sc)) => dump::dump(sc),
    Some(("strip", sc)) => strip::strip(sc),
    Some(("thumb", sc)) => thumb::thumb(sc),
    _ => unreachable!("subcommand is required"),
  }
}
