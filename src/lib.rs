//! # xfmidi
//!
//! A reader for the two auxiliary chunks that Yamaha's XF format embeds in standard MIDI
//! files: the **XF Information Header** (`XFIH`) and the **XF Karaoke Message** track
//! (`XFKM`). Both are laid out exactly like an `MTrk` track chunk, only under a different
//! four character tag, so this crate decodes all of them with the same track decoder.
//!
//! ## Overview
//!
//! MIDI files are structured as a series of chunks. Each chunk contains a 4-character ASCII
//! type identifier and a 32-bit length that specifies how many bytes of data follow. Track
//! chunks hold a stream of delta-time prefixed events (channel messages, meta messages and
//! system exclusive messages) which may omit repeated status bytes through *running status*.
//!
//! - **One decoder, many tags**: [`TrackChunk::decode`] takes the set of chunk tags it is
//!   willing to accept, so base `MTrk` tracks and the XF chunks share a single state machine.
//! - **Optional chunks stay optional**: a file without XF chunks loads fine, its
//!   [`XfMidiFile::xfih`] and [`XfMidiFile::xfkm`] are simply `None`.
//! - **Explicit configuration**: charset, clip policy and debug tracing travel in a
//!   [`DecodeOptions`] value passed to every decode call.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use xfmidi::{extract_metadata, DecodeOptions, XfMidiFile};
//!
//! let midi = XfMidiFile::load("song.mid", &DecodeOptions::default())
//!     .expect("Load XF MIDI file");
//!
//! if let Some(karaoke) = midi.xfkm() {
//!     for (tick, lyric) in karaoke.lyrics() {
//!         println!("{tick}: {lyric}");
//!     }
//! }
//!
//! match extract_metadata("song.mid") {
//!     Ok(info) => println!("{} sung in {}", info.song_id, info.language),
//!     Err(e) if e.is_not_found() => println!("no karaoke data"),
//!     Err(e) => eprintln!("broken karaoke data: {e}"),
//! }
//! ```
//!
//! ## Library Structure
//!
//! - **[`chunk`]**: chunk type constants, the header chunk, the chunk locator and the track
//!   event decoder.
//! - **[`reader`]**: byte sources ([`reader::MidiReadable`]) and the cursor
//!   ([`reader::MidiStream`]) every decoder reads from.
//! - **[`file`]**: the whole-file loader attaching the XF chunks to the base tracks.
//! - **[`karaoke`]**: the standalone karaoke metadata extractor.
//! - **[`options`]**: per-call decoder configuration.

pub mod chunk;
pub mod file;
pub mod karaoke;
pub mod options;
pub mod reader;

pub use chunk::{
    chunk_types::ChunkTags,
    locate::{locate, locate_chunk, LocateStrategy},
    track::{decode_track, Event, TrackChunk, TrackError, TrackEvent},
    ChunkParseError,
};
pub use file::XfMidiFile;
pub use karaoke::{extract_metadata, KaraokeError, KaraokeInfo};
pub use options::{Charset, DecodeOptions, TextError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Represents a raw MIDI Chunk header.
/// A MIDI Chunk consists of a 4-character ASCII type identifier and a 32-bit unsigned integer specifying the length of its data.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Chunk {
    /// 4 character ASCII chunk type
    pub chunk_type: [char; 4],
    /// Length of the data that follows
    length: u32,
}

impl Chunk {
    /// Creates a chunk header from its tag and declared data length
    pub fn new(chunk_type: [char; 4], length: u32) -> Self {
        Self { chunk_type, length }
    }

    /// Gets the length of the chunk as a usize
    pub fn len(&self) -> usize {
        self.length as usize
    }

    /// Returns if the chunk has no attributed data
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// The chunk tag as a printable string
    pub fn tag(&self) -> String {
        self.chunk_type.iter().collect()
    }
}

impl From<u64> for Chunk {
    fn from(value: u64) -> Self {
        let high = (value >> 32) as u32;
        let low = value as u32;

        let [a, b, c, d] = high.to_be_bytes().map(char::from);

        Self {
            chunk_type: [a, b, c, d],
            length: low,
        }
    }
}
