use clap::{Args as ClapArgs, CommandFactory, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use cartopal::commands::generate::{run as generate, GenerateArgs};
use cartopal::commands::import::{run as import, ImportArgs};
use cartopal::commands::init::{run as init, InitArgs};
use cartopal::config::{resolve, Overrides};
use libcartopal::{Cvd, PaletteType};

#[derive(Parser, Debug, Clone)]
#[command(about = "Cartopal, seed-color palettes for maps", long_about = None)]
#[command(version, about, long_about = None)]
struct Args {
    #[clap(long, global = true, default_value = "auto")]
    color: Color,

    /// Log what the palette pipeline is doing
    #[clap(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
#[clap(rename_all = "lowercase")]
enum Color {
    Always,
    Auto,
    Never,
}

impl Color {
    fn init(self) {
        match self {
            Color::Always => owo_colors::set_override(true),
            Color::Auto => {}
            Color::Never => owo_colors::set_override(false),
        }
    }
}

#[derive(ClapArgs, Debug, Clone)]
struct PaletteOptions {
    /// Settings file, as written by `cartopal init`
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_parser = parse_palette_type)]
    palette_type: Option<PaletteType>,

    /// Number of classes in each palette
    #[arg(long)]
    classes: Option<usize>,

    /// Simulate a color vision deficiency
    #[arg(long, value_parser = parse_cvd)]
    cvd: Option<Cvd>,

    /// Interpolate piecewise instead of along a Bézier curve
    #[arg(long)]
    no_bezier: bool,

    #[arg(long)]
    no_lightness_correction: bool,

    /// Run palettes from light to dark
    #[arg(long)]
    invert_lightness: bool,

    /// Move seed hues into the configured hue range first
    #[arg(long)]
    rescale_hue: bool,
}

impl PaletteOptions {
    fn overrides(&self) -> Overrides {
        Overrides {
            palette_type: self.palette_type,
            classes: self.classes,
            cvd: self.cvd,
            no_bezier: self.no_bezier,
            no_lightness_correction: self.no_lightness_correction,
            invert_lightness: self.invert_lightness,
        }
    }
}

fn parse_palette_type(value: &str) -> Result<PaletteType, String> {
    value.parse().map_err(|e: libcartopal::Error| e.to_string())
}

fn parse_cvd(value: &str) -> Result<Cvd, String> {
    value.parse().map_err(|e: libcartopal::Error| e.to_string())
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Write a settings file with the defaults. Defaults to the current directory.
    Init {
        #[arg(default_value = ".")]
        working_dir: PathBuf,
    },
    /// Generate evenly spaced seed colors and print their palettes
    Generate {
        #[arg(default_value = "6")]
        count: usize,

        /// Color to step the hues from
        #[arg(long)]
        start_color: Option<String>,

        /// Pick every seed at random instead
        #[arg(long, conflicts_with = "start_color")]
        random: bool,

        #[command(flatten)]
        options: PaletteOptions,
    },
    /// Use the hex colors found in a text file as seeds
    Import {
        input: PathBuf,

        #[command(flatten)]
        options: PaletteOptions,
    },
}

/// Prints the help text, shown when no subcommand is given.
fn write_usage<W: std::io::Write>(out: &mut W) -> std::io::Result<()> {
    Args::command().write_help(out)?;
    out.flush()
}

fn main() {
    let args = Args::parse();
    args.color.init();

    let default_log_level = if args.verbose { "debug" } else { "warn" };
    let env = env_logger::Env::default().filter_or("RUST_LOG", default_log_level);
    env_logger::init_from_env(env);

    let mut stdout = std::io::stdout();

    let result = match args.command {
        Some(Commands::Init { working_dir }) => init(InitArgs {
            working_dir: &working_dir,
            stdout: &mut stdout,
        }),
        Some(Commands::Generate {
            count,
            start_color,
            random,
            options,
        }) => resolve(options.config.as_deref(), &options.overrides()).and_then(|settings| {
            generate(GenerateArgs {
                count,
                start_color,
                random,
                rescale_hue: options.rescale_hue,
                settings,
                stdout: &mut stdout,
            })
        }),
        Some(Commands::Import { input, options }) => {
            resolve(options.config.as_deref(), &options.overrides()).and_then(|settings| {
                import(ImportArgs {
                    input: &input,
                    rescale_hue: options.rescale_hue,
                    settings,
                    stdout: &mut stdout,
                })
            })
        }
        None => {
            if let Err(e) = write_usage(&mut stdout) {
                eprintln!("{}", e);
            }
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
