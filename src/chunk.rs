//! Chunk definitions: tags, the header chunk, the locator and the track decoder

use std::{convert::Infallible, io};

use header::HeaderError;
use thiserror::Error;
use track::TrackError;

pub mod chunk_types;
pub mod header;
pub mod locate;
pub mod track;

/// Error type for loading a whole MIDI file
#[derive(Debug, Error)]
pub enum ChunkParseError {
    /// The `MThd` chunk is missing or malformed
    #[error(transparent)]
    Header(#[from] HeaderError),
    /// Error parsing a track or XF chunk
    #[error(transparent)]
    TrackParseError(#[from] TrackError),
    /// The source could not be read
    #[error("failed to read MIDI source")]
    Io(#[from] io::Error),
}

impl From<Infallible> for ChunkParseError {
    fn from(value: Infallible) -> Self {
        match value {}
    }
}
