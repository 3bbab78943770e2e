use std::io::Write;

use libcartopal::color_utils::parse_hex_srgb;
use libcartopal::{Consumer, Session};
use owo_colors::{OwoColorize as _, Stream};

const SWATCH: &str = "██";

/// Prints the seeds and both consumers' inputs and palettes.
pub fn write_session<W: Write>(stdout: &mut W, session: &Session) -> crate::Result<()> {
    writeln!(
        stdout,
        "{}",
        "Seeds".if_supports_color(Stream::Stdout, |s| s.bold())
    )?;
    for seed in session.seeds() {
        writeln!(
            stdout,
            "  {:>3}  {} {}  point {}  area {}",
            seed.id,
            swatch(&seed.color),
            seed.color,
            position(seed.point_input_index),
            position(seed.area_input_index),
        )?;
    }

    for consumer in Consumer::BOTH {
        let channel = session.settings().channel(consumer);
        writeln!(stdout)?;
        writeln!(
            stdout,
            "{} ({}, {} classes, cvd {})",
            format!("{} palette", title(consumer)).if_supports_color(Stream::Stdout, |s| s.bold()),
            channel.palette_type,
            channel.classes,
            session.settings().cvd,
        )?;

        let colors = session.palette_colors(consumer);
        if colors.is_empty() {
            writeln!(stdout, "  no input colors")?;
            continue;
        }

        let inputs: Vec<&str> = session
            .input_colors(consumer)
            .iter()
            .map(|seed| seed.color.as_str())
            .collect();
        writeln!(stdout, "  input  {}", inputs.join(" "))?;

        let swatches: Vec<String> = colors.iter().map(|c| swatch(c)).collect();
        writeln!(stdout, "  {}", swatches.join(""))?;
        writeln!(stdout, "  {}", colors.join(" "))?;
    }

    Ok(())
}

fn swatch(hex: &str) -> String {
    match parse_hex_srgb(hex) {
        Ok(color) => SWATCH
            .if_supports_color(Stream::Stdout, |s| {
                s.truecolor(color.red, color.green, color.blue)
            })
            .to_string(),
        Err(_) => "  ".to_string(),
    }
}

fn position(index: Option<usize>) -> String {
    index.map(|i| i.to_string()).unwrap_or_else(|| "-".to_string())
}

fn title(consumer: Consumer) -> &'static str {
    match consumer {
        Consumer::Point => "Point",
        Consumer::Area => "Area",
    }
}
