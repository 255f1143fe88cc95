use thiserror::Error;

/// Errors returned by playlist/playback operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControllerError {
    #[error("Playlist is empty")]
    EmptyPlaylist,

    #[error("Track index {index} out of range (playlist has {len} tracks)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Errors raised by the rodio-backed audio engine.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("No audio output device: {0}")]
    Stream(#[from] rodio::StreamError),

    #[error("Could not create sink: {0}")]
    Sink(#[from] rodio::PlayError),

    #[error("Could not open file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not decode file: {0}")]
    Decode(#[from] rodio::decoder::DecoderError),
}

#[derive(Debug, Error)]
pub enum ArtError {
    #[error("Could not load cover image: {0}")]
    Image(#[from] image::ImageError),
}

#[derive(Debug, Error)]
pub enum DurationError {
    #[error("Could not open file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not probe file: {0}")]
    Probe(#[from] symphonia::core::errors::Error),

    #[error("Could not determine audio duration")]
    Unknown,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Could not load settings: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Invalid setting: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ControllerError>;
