use thiserror::Error;

pub mod adjust;
pub mod assignment;
pub mod color_utils;
pub mod construct;
pub mod cvd;
pub mod projection;
pub mod scale;
pub mod seeds;
pub mod session;
pub mod settings;

pub use adjust::{adjust, AdjustParams, AdjustedColor};
pub use assignment::Assignment;
pub use construct::{build_palette, ConstructParams};
pub use cvd::Cvd;
pub use projection::input_colors;
pub use scale::{ColorRange, Scale};
pub use seeds::{extract_hex_colors, Consumer, InitialSeeds, SeedColor, SeedId, SeedRegistry};
pub use session::{ImportStatus, Session};
pub use settings::{ChannelSettings, HueRange, PaletteType, Settings};

pub const SETTINGS_FILE_NAME: &str = "cartopal.yaml";

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Cannot build a scale from an empty color list")]
    EmptyColorList,
    #[error("Invalid color `{0}`, expected #rgb or #rrggbb")]
    InvalidColor(String),
    #[error("No hex colors found in the input")]
    NoColorsFound,
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
    #[error("Unknown color vision deficiency `{0}`")]
    UnknownCvd(String),
    #[error("Unknown palette type `{0}`")]
    UnknownPaletteType(String),
}
