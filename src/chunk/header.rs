//! Header Chunk Enum and Struct Definitions

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{chunk::chunk_types::HEADER_CHUNK, reader::MidiStream};

/// Number of bytes in an `MThd` body that carry data. Longer bodies are allowed and the extra
/// bytes ignored.
const HEADER_DATA_LEN: usize = 6;

/// Header chunk data, including format, ntrks and division as 3 16 bit unsigned integers
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HeaderChunk {
    /// The MIDI format
    format: Format,
    /// Number of tracks
    ntrks: u16,
    /// Time signature/division
    division: Division,
}

/// Errors that can occur while reading an `MThd` chunk
#[derive(Debug, Error, Clone, PartialEq)]
pub enum HeaderError {
    /// The file does not start with `MThd`
    #[error("file does not start with an MThd chunk, found {0:?}")]
    MissingHeader([char; 4]),
    /// The header body is shorter than the 6 bytes it must hold
    #[error("MThd chunk holds {0} bytes, expected at least 6")]
    ShortHeader(usize),
    /// Format field is not 0, 1 or 2
    #[error(transparent)]
    InvalidFormat(#[from] InvalidFormat),
    /// The file ends inside the header
    #[error("unexpected end of file in MThd chunk")]
    Truncated,
}

impl HeaderChunk {
    /// Reads the `MThd` chunk at the stream's position, leaving the stream just past it
    pub fn read(stream: &mut MidiStream<'_>) -> Result<Self, HeaderError> {
        let chunk = stream
            .read_chunk_header()
            .map_err(|_| HeaderError::Truncated)?;

        if chunk.chunk_type != HEADER_CHUNK {
            return Err(HeaderError::MissingHeader(chunk.chunk_type));
        }
        if chunk.len() < HEADER_DATA_LEN {
            return Err(HeaderError::ShortHeader(chunk.len()));
        }

        let body = stream
            .chunk_body(chunk.len())
            .map_err(|_| HeaderError::Truncated)?;
        let &[format_hi, format_lo, ntrks_hi, ntrks_lo, div_hi, div_lo, ..] = body.remaining() else {
            return Err(HeaderError::Truncated);
        };

        Ok(Self::try_from((
            u16::from_be_bytes([format_hi, format_lo]),
            u16::from_be_bytes([ntrks_hi, ntrks_lo]),
            u16::from_be_bytes([div_hi, div_lo]),
        ))?)
    }

    /// The file format
    pub fn format(&self) -> Format {
        self.format
    }

    /// Number of `MTrk` chunks the file declares
    pub fn ntrks(&self) -> u16 {
        self.ntrks
    }

    /// Meaning of delta times in the file
    pub fn division(&self) -> Division {
        self.division
    }
}

impl TryFrom<(u16, u16, u16)> for HeaderChunk {
    type Error = InvalidFormat;
    fn try_from(value: (u16, u16, u16)) -> Result<Self, Self::Error> {
        let (format, ntrks, division) = value;

        Ok(Self {
            format: format.try_into()?,
            ntrks,
            division: division.into(),
        })
    }
}

/// The overall organization of the MIDI file. Only three values are valid, making most of the 16
/// bits irrelevant
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Format {
    /// The file contains a single multi-channel track
    Zero,
    /// The file contains one or more simultaneous tracks (or MIDI outputs) of a sequence
    One,
    /// The file contains one or more sequentially independent single-track patterns
    Two,
}

/// Error struct representing an invalid format specifier
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Invalid header format {0}")]
pub struct InvalidFormat(pub u16);

impl TryFrom<u16> for Format {
    type Error = InvalidFormat;
    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Format::Zero),
            1 => Ok(Format::One),
            2 => Ok(Format::Two),
            other => Err(InvalidFormat(other)),
        }
    }
}

/// The meaning of the delta-times in the MIDI sequence,
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Division {
    /// When bit 15 is a 0, bits 14-0 represent ticks per quarter note
    Metrical(u16),
    /// When bit 15 is 1, the high byte is a negative SMPTE frame rate in two's complement,
    /// and the low byte is ticks per frame
    TimeCodeBased(SmpteTicks),
}

/// Division defined by time-code-based time
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SmpteTicks {
    /// Negative frames per second: -24, -25, -29 or -30
    smpte: i8,
    /// Ticks per frame
    tpf: u8,
}

impl SmpteTicks {
    /// Frames per second as a positive number
    pub fn frames_per_second(&self) -> u8 {
        self.smpte.unsigned_abs()
    }

    /// Ticks per frame
    pub fn ticks_per_frame(&self) -> u8 {
        self.tpf
    }
}

impl From<u16> for Division {
    fn from(value: u16) -> Self {
        let [hi, lo] = value.to_be_bytes();

        if hi & 0x80 == 0 {
            Division::Metrical(value)
        } else {
            // Bit 15 doubles as the sign bit of the frame rate
            Division::TimeCodeBased(SmpteTicks {
                smpte: hi as i8,
                tpf: lo,
            })
        }
    }
}
