use crate::report::write_session;
use crate::Result;
use libcartopal::{InitialSeeds, Session, Settings};
use log::info;
use owo_colors::{OwoColorize as _, Stream};

use std::path::Path;

pub struct ImportArgs<'a, W: std::io::Write> {
    /// A text file to scan for hex colors.
    pub input: &'a Path,
    pub rescale_hue: bool,
    pub settings: Settings,
    pub stdout: &'a mut W,
}

/// Loads every hex color found in a text file as seeds and prints the palettes.
pub fn run<W: std::io::Write>(args: ImportArgs<W>) -> Result<()> {
    info!("Reading colors from {}", args.input.display());
    let text = std::fs::read_to_string(args.input)?;

    let mut session = Session::new(args.settings)?;
    session.initialize(&InitialSeeds::Text(text))?;

    writeln!(
        args.stdout,
        "Imported {} colors {}",
        session.registry().len(),
        "✓".if_supports_color(Stream::Stdout, |s| s.green())
    )?;

    if args.rescale_hue {
        session.rescale_hue_to_settings()?;
    }

    write_session(args.stdout, &session)
}
