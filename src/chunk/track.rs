//! Track chunk data enums and structs, and the decoder shared by `MTrk` and the XF chunks

use event::MidiEvent;
use meta::MetaEvent;
use sysex::{SysexEvent, SYSEX_END, SYSEX_START};
use thiserror::Error;
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    chunk::chunk_types::ChunkTags,
    options::{DecodeOptions, TextError},
    reader::MidiStream,
};

pub mod event;
pub mod meta;
pub mod sysex;

/// Status byte introducing a meta event
pub const META_STATUS: u8 = 0xFF;

/// Error types from parsing a track
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TrackError {
    /// A read went past the end of the chunk or the file
    #[error("unexpected end of chunk")]
    OutOfSpace,
    /// The chunk declares more bytes than the file holds
    #[error("chunk declares {declared} bytes but only {available} remain")]
    ChunkTruncated {
        /// Declared chunk length
        declared: usize,
        /// Bytes actually left in the source
        available: usize,
    },
    /// The chunk at the cursor is not one of the accepted tags
    #[error("no {expected} header at start of track, found {found:?}")]
    UnexpectedChunk {
        /// Tags the decoder would have accepted
        expected: ChunkTags,
        /// The tag actually read
        found: [char; 4],
    },
    /// A data byte appeared in status position before any status byte
    #[error("running status without last_status")]
    RunningStatusWithoutStatus,
    /// A variable length quantity ran into the end of the chunk
    #[error("malformed variable length quantity")]
    MalformedVarLen,
    /// A variable length quantity does not fit in 32 bits
    #[error("variable length quantity overflows 32 bits")]
    VarLenOverflow,
    /// Status byte with no defined message
    #[error("undefined status byte {0:#04X}")]
    UnsupportedStatusCode(u8),
    /// A data byte above 127 with clipping disabled
    #[error("data byte {0:#04X} out of range 0..=127")]
    DataByteOutOfRange(u8),
    /// A data byte where the inherited status takes no data
    #[error("unexpected data byte {0:#04X} under running status")]
    UnexpectedDataByte(u8),
    /// Meta Event is in an invalid format
    #[error("meta event data is in an invalid format")]
    InvalidMetaEventData,
    /// Error while decoding a text meta event
    #[error("failed to decode text meta event")]
    TextDecode(#[from] TextError),
}

/// A decoded track chunk, an `MTrk` or one of the XF auxiliary chunks
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackChunk {
    /// Tag the chunk was stored under
    chunk_type: [char; 4],
    /// All events in stream order
    events: Vec<TrackEvent>,
}

impl TrackChunk {
    /// Decodes the track chunk at the stream's position.
    ///
    /// The chunk tag must be one of `accepted`, otherwise no events are read. Events are decoded
    /// until exactly the declared chunk length is consumed, and the stream is left just past the
    /// chunk. Running status starts empty for every chunk.
    pub fn decode(
        stream: &mut MidiStream<'_>,
        accepted: ChunkTags,
        options: &DecodeOptions,
    ) -> Result<Self, TrackError> {
        let chunk = stream.read_chunk_header()?;
        if !accepted.accepts(chunk.chunk_type) {
            return Err(TrackError::UnexpectedChunk {
                expected: accepted,
                found: chunk.chunk_type,
            });
        }

        if options.debug {
            debug!(
                "Decoding {} chunk of {} bytes at offset {}",
                chunk.tag(),
                chunk.len(),
                stream.position() - 8
            );
        }

        let mut body = stream.chunk_body(chunk.len())?;
        let mut running_status = None;
        let mut events = vec![];

        while !body.is_exhausted() {
            let offset = body.position();
            let event = TrackEvent::read(&mut body, &mut running_status, options)?;
            if options.debug {
                debug!("{}+{}: {:?}", chunk.tag(), offset, event);
            }
            events.push(event);
        }

        Ok(Self {
            chunk_type: chunk.chunk_type,
            events,
        })
    }

    /// Tag the chunk was stored under
    pub fn chunk_type(&self) -> [char; 4] {
        self.chunk_type
    }

    /// All events in stream order
    pub fn events(&self) -> &[TrackEvent] {
        &self.events
    }

    /// Number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True if the chunk held no events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Lyric events paired with their absolute tick
    pub fn lyrics(&self) -> impl Iterator<Item = (u64, &str)> + '_ {
        self.events
            .iter()
            .scan(0u64, |tick, event| {
                *tick += u64::from(event.delta_time);
                Some((*tick, event))
            })
            .filter_map(|(tick, event)| match &event.event {
                Event::MetaEvent(MetaEvent::Lyric(text)) => Some((tick, text.as_str())),
                _ => None,
            })
    }
}

/// Decodes one track chunk accepting only `accepted` tags. See [`TrackChunk::decode`]
pub fn decode_track(
    stream: &mut MidiStream<'_>,
    accepted: ChunkTags,
    options: &DecodeOptions,
) -> Result<TrackChunk, TrackError> {
    TrackChunk::decode(stream, accepted, options)
}

/// A MIDI Event with a DeltaTime and an attached Event
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackEvent {
    /// Delta time is a variable-length representation of how much time to wait in ticks before the
    /// event follows.
    pub delta_time: u32,
    /// The event that occurs after the delta time is waited for
    pub event: Event,
}

impl TrackEvent {
    /// Reads the next delta time and event. `running_status` is consulted when a data byte sits
    /// in status position and is replaced by every status byte other than `0xFF`.
    pub fn read(
        stream: &mut MidiStream<'_>,
        running_status: &mut Option<u8>,
        options: &DecodeOptions,
    ) -> Result<Self, TrackError> {
        let delta_time = stream.read_varlen()?;
        let byte = stream.read_byte()?;

        let (status, first) = if byte < 0x80 {
            let status = running_status.ok_or(TrackError::RunningStatusWithoutStatus)?;
            (status, Some(byte))
        } else {
            if byte != META_STATUS {
                *running_status = Some(byte);
            }
            (byte, None)
        };

        let event = match status {
            META_STATUS => Event::MetaEvent(MetaEvent::read(stream, options.charset)?),
            // Under an inherited sysex status the byte in status position is dropped
            SYSEX_START | SYSEX_END => {
                Event::SysexEvent(SysexEvent::read(stream, status, options.clip)?)
            }
            _ => Event::MidiEvent(MidiEvent::read(stream, status, first, options.clip)?),
        };

        Ok(Self { delta_time, event })
    }
}

/// Any event that may occur
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Event {
    /// A midi event
    MidiEvent(MidiEvent),
    /// A system exclusive event
    SysexEvent(SysexEvent),
    /// Specifies non-MIDI information useful to this format or to sequencers
    MetaEvent(MetaEvent),
}

impl Event {
    /// The meta event, if this is one
    pub fn as_meta(&self) -> Option<&MetaEvent> {
        match self {
            Self::MetaEvent(meta) => Some(meta),
            _ => None,
        }
    }
}
