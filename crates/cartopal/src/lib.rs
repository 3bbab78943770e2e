use thiserror::Error;

pub mod commands {
    pub mod generate;
    pub mod import;
    pub mod init;
}

pub mod config;
mod report;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("An IO error occurred: {0}")]
    IoError(#[from] std::io::Error),
    #[error("{0}")]
    Palette(#[from] libcartopal::Error),
    #[error("{0}")]
    General(String),
}
