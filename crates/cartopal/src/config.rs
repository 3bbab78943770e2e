use std::path::Path;

use libcartopal::{Consumer, Cvd, PaletteType, Settings};

use crate::Result;

/// Command line settings that win over the config file. Channel overrides apply to
/// both consumers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub palette_type: Option<PaletteType>,
    pub classes: Option<usize>,
    pub cvd: Option<Cvd>,
    pub no_bezier: bool,
    pub no_lightness_correction: bool,
    pub invert_lightness: bool,
}

/// Reads the settings file, if any, and layers the overrides on top.
pub fn resolve(config: Option<&Path>, overrides: &Overrides) -> Result<Settings> {
    let mut settings = match config {
        Some(path) => {
            let contents = std::fs::read_to_string(path)?;
            Settings::parse(&contents)?
        }
        None => Settings::default(),
    };

    for consumer in Consumer::BOTH {
        let channel = settings.channel_mut(consumer);
        if let Some(palette_type) = overrides.palette_type {
            channel.palette_type = palette_type;
        }
        if let Some(classes) = overrides.classes {
            channel.classes = classes;
        }
        if overrides.no_bezier {
            channel.bezier_interpolation = false;
        }
        if overrides.no_lightness_correction {
            channel.lightness_correction = false;
        }
        if overrides.invert_lightness {
            channel.invert_lightness = true;
        }
    }
    if let Some(cvd) = overrides.cvd {
        settings.cvd = cvd;
    }

    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use indoc::indoc;
    use temp_dir::TempDir;

    #[test]
    fn defaults_without_a_config_file() {
        let settings = resolve(None, &Overrides::default()).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn overrides_win_over_the_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cartopal.yaml");
        std::fs::write(
            &path,
            indoc! {"
                ---
                point:
                  classes: 5
                  palette_type: qualitative
                area:
                  classes: 4
                cvd: protanopia
            "},
        )
        .unwrap();

        let settings = resolve(
            Some(&path),
            &Overrides {
                classes: Some(7),
                no_bezier: true,
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(settings.point.classes, 7);
        assert_eq!(settings.area.classes, 7);
        assert_eq!(settings.point.palette_type, PaletteType::Qualitative);
        assert!(!settings.area.bezier_interpolation);
        assert_eq!(settings.cvd, Cvd::Protanopia);
    }

    #[test]
    fn overrides_are_validated() {
        let result = resolve(
            None,
            &Overrides {
                classes: Some(0),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(Error::Palette(_))));
    }

    #[test]
    fn missing_config_file_is_an_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = resolve(
            Some(&temp_dir.path().join("nope.yaml")),
            &Overrides::default(),
        );
        assert!(matches!(result, Err(Error::IoError(_))));
    }
}
