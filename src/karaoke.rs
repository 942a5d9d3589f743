//! Karaoke info extraction.
//!
//! The XF karaoke track opens with a cue point meta event whose text is a colon separated
//! record: `<song id>:<melody channel>:<time offset>:<language>`, e.g. `$Lyrc:1:312:JP`. This
//! module pulls that record straight out of the raw file bytes without decoding any track.

use std::{convert::Infallible, io, num::ParseIntError, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    chunk::{chunk_types::XF_KARAOKE_CHUNK, locate::locate},
    reader::MidiReadable,
};

/// A cue point meta event prefix: `FF 07`
pub const KARAOKE_INFO_SIGNATURE: [u8; 2] = [0xFF, 0x07];

/// The karaoke info record
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KaraokeInfo {
    /// Identifier of the karaoke data, `$Lyrc` in practice
    pub song_id: String,
    /// Channel carrying the melody line. Kept as written, no range check is applied
    pub melody_channel: i64,
    /// Offset applied to lyric timing
    pub time_offset: i64,
    /// Language code of the lyrics, e.g. `JP`
    pub language: String,
}

/// Errors from extracting the karaoke info record
#[derive(Debug, Error)]
pub enum KaraokeError {
    /// The file has no `XFKM` chunk. Not a corrupt file, just not a karaoke one
    #[error("no karaoke chunk")]
    NotFound,
    /// The karaoke chunk holds no `FF 07` event
    #[error("karaoke chunk has no info event")]
    MissingInfoEvent,
    /// The info event claims more bytes than the file holds
    #[error("karaoke info declares {expected} bytes but only {available} remain")]
    Truncated {
        /// Declared length
        expected: usize,
        /// Bytes left in the file
        available: usize,
    },
    /// The record does not split into exactly 4 fields
    #[error("karaoke info has {0} fields, expected 4")]
    FieldCount(usize),
    /// A numeric field is not an integer
    #[error("karaoke info field `{field}` is not an integer")]
    InvalidInteger {
        /// Name of the field
        field: &'static str,
        /// Underlying parse failure
        #[source]
        source: ParseIntError,
    },
    /// The source could not be read
    #[error("failed to read MIDI source")]
    Io(#[from] io::Error),
}

impl KaraokeError {
    /// True if the file simply has no karaoke chunk
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

impl From<Infallible> for KaraokeError {
    fn from(value: Infallible) -> Self {
        match value {}
    }
}

impl FromStr for KaraokeInfo {
    type Err = KaraokeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(':').collect();
        let &[song_id, melody_channel, time_offset, language] = fields.as_slice() else {
            return Err(KaraokeError::FieldCount(fields.len()));
        };

        Ok(Self {
            song_id: song_id.to_string(),
            melody_channel: parse_field("melody_channel", melody_channel)?,
            time_offset: parse_field("time_offset", time_offset)?,
            language: language.to_string(),
        })
    }
}

/// Parses an integer field, ignoring surrounding whitespace
fn parse_field<T>(field: &'static str, value: &str) -> Result<T, KaraokeError>
where
    T: FromStr<Err = ParseIntError>,
{
    value
        .trim()
        .parse()
        .map_err(|source| KaraokeError::InvalidInteger { field, source })
}

/// Reads a whole MIDI source and extracts its karaoke info record
pub fn extract_metadata<S>(source: S) -> Result<KaraokeInfo, KaraokeError>
where
    S: MidiReadable,
    KaraokeError: From<S::Error>,
{
    let bytes = source.get_midi_bytes()?;
    extract_from_bytes(&bytes)
}

/// Extracts the karaoke info record from in-memory file bytes.
///
/// Finds the first `XFKM` tag, then the first `FF 07` after it, and reads a single length byte
/// followed by that many Latin-1 bytes of record text.
pub fn extract_from_bytes(bytes: &[u8]) -> Result<KaraokeInfo, KaraokeError> {
    let start = locate(bytes, XF_KARAOKE_CHUNK).ok_or(KaraokeError::NotFound)?;
    let karaoke = &bytes[start..];

    let info = karaoke
        .windows(KARAOKE_INFO_SIGNATURE.len())
        .position(|window| window == KARAOKE_INFO_SIGNATURE)
        .ok_or(KaraokeError::MissingInfoEvent)?;

    let (&length, text) = karaoke[info + KARAOKE_INFO_SIGNATURE.len()..]
        .split_first()
        .ok_or(KaraokeError::Truncated {
            expected: 1,
            available: 0,
        })?;
    let text = text.get(..length as usize).ok_or(KaraokeError::Truncated {
        expected: length as usize,
        available: text.len(),
    })?;

    text.iter().copied().map(char::from).collect::<String>().parse()
}
