use crate::{Error, Result};
use libcartopal::{Settings, SETTINGS_FILE_NAME};
use owo_colors::{OwoColorize as _, Stream};

use std::path::Path;

pub struct InitArgs<'a, W: std::io::Write> {
    pub working_dir: &'a Path,
    pub stdout: &'a mut W,
}

/// Writes a settings file holding every default, ready to be edited.
pub fn run<W: std::io::Write>(args: InitArgs<W>) -> Result<()> {
    let settings_path = args.working_dir.join(SETTINGS_FILE_NAME);
    if settings_path.exists() {
        return Err(Error::General(format!(
            "{} already exists",
            settings_path.display()
        )));
    }

    write!(args.stdout, "Creating {}...", SETTINGS_FILE_NAME)?;
    let contents = Settings::default().to_yaml()?;
    std::fs::write(&settings_path, contents)?;
    writeln!(
        args.stdout,
        "{}",
        "✓".if_supports_color(Stream::Stdout, |s| s.green())
    )?;

    writeln!(
        args.stdout,
        "Done! Run `cartopal generate --config {}` to build palettes",
        SETTINGS_FILE_NAME
    )?;

    Ok(())
}
