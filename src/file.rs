//! Whole-file loading: the base `MThd`/`MTrk` structure plus the optional XF chunks

use std::{io::Read, path::Path};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    chunk::{
        chunk_types::{ChunkTags, TRACK_DATA_CHUNK},
        header::HeaderChunk,
        locate::LocateStrategy,
        track::{meta::MetaEvent, TrackChunk},
        ChunkParseError,
    },
    karaoke::{KaraokeError, KaraokeInfo},
    options::DecodeOptions,
    reader::{MidiData, MidiReadable, MidiStream},
};

/// A MIDI file with its XF Information Header and XF Karaoke Message chunks attached.
///
/// Both XF chunks are optional. A plain standard MIDI file loads with `xfih` and `xfkm` set to
/// `None` and its tracks exactly as a non-XF reader would produce them.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct XfMidiFile {
    /// The `MThd` chunk
    header: HeaderChunk,
    /// The `MTrk` chunks, in file order
    tracks: Vec<TrackChunk>,
    /// XF Information Header, if present
    xfih: Option<TrackChunk>,
    /// XF Karaoke Message track, if present
    xfkm: Option<TrackChunk>,
}

impl XfMidiFile {
    /// Loads any MIDI source: a path, or in-memory [`MidiData`]
    pub fn load<S>(source: S, options: &DecodeOptions) -> Result<Self, ChunkParseError>
    where
        S: MidiReadable,
        ChunkParseError: From<S::Error>,
    {
        let bytes = source.get_midi_bytes()?;
        Self::from_bytes(&bytes, options)
    }

    /// Loads a file from disk with default options
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ChunkParseError> {
        Self::load(path.as_ref(), &DecodeOptions::default())
    }

    /// Drains `reader` and loads the bytes it produced
    pub fn from_reader<R: Read>(reader: R, options: &DecodeOptions) -> Result<Self, ChunkParseError> {
        Self::load(MidiData::from_reader(reader)?, options)
    }

    /// Loads a file already held in memory
    pub fn from_bytes(bytes: &[u8], options: &DecodeOptions) -> Result<Self, ChunkParseError> {
        let mut stream = MidiStream::new(bytes);
        let header = HeaderChunk::read(&mut stream)?;

        let mut tracks = Vec::with_capacity(header.ntrks() as usize);
        for index in 0..header.ntrks() {
            let Some(offset) = stream.seek_chunk(TRACK_DATA_CHUNK, LocateStrategy::ChunkBoundary)
            else {
                warn!(
                    "Header declares {} tracks but only {} were found",
                    header.ntrks(),
                    index
                );
                break;
            };
            if options.debug {
                debug!("Track {} at offset {}", index, offset);
            }
            tracks.push(TrackChunk::decode(&mut stream, ChunkTags::TRACK, options)?);
        }

        let xfih = Self::decode_optional(&mut stream, ChunkTags::XF_INFO_HEADER, options)?;
        let xfkm = Self::decode_optional(&mut stream, ChunkTags::XF_KARAOKE, options)?;

        Ok(Self {
            header,
            tracks,
            xfih,
            xfkm,
        })
    }

    /// Finds and decodes the first chunk of `tags` at or after the cursor. Absence is not an
    /// error, and leaves the cursor where it was.
    fn decode_optional(
        stream: &mut MidiStream<'_>,
        tags: ChunkTags,
        options: &DecodeOptions,
    ) -> Result<Option<TrackChunk>, ChunkParseError> {
        for tag in tags.tags() {
            if let Some(offset) = stream.seek_chunk(*tag, options.locate) {
                debug!("Found {} chunk at offset {}", tag.iter().collect::<String>(), offset);
                return Ok(Some(TrackChunk::decode(stream, tags, options)?));
            }
        }

        debug!("No {} chunk in file", tags);
        Ok(None)
    }

    /// The `MThd` chunk
    pub fn header(&self) -> &HeaderChunk {
        &self.header
    }

    /// The base tracks
    pub fn tracks(&self) -> &[TrackChunk] {
        &self.tracks
    }

    /// The XF Information Header
    pub fn xfih(&self) -> Option<&TrackChunk> {
        self.xfih.as_ref()
    }

    /// The XF Karaoke Message track
    pub fn xfkm(&self) -> Option<&TrackChunk> {
        self.xfkm.as_ref()
    }

    /// Parses the karaoke info record carried by the first cue point of the karaoke track
    pub fn karaoke_info(&self) -> Result<KaraokeInfo, KaraokeError> {
        let xfkm = self.xfkm.as_ref().ok_or(KaraokeError::NotFound)?;

        xfkm.events()
            .iter()
            .find_map(|event| match event.event.as_meta() {
                Some(MetaEvent::CuePoint(text)) => Some(text),
                _ => None,
            })
            .ok_or(KaraokeError::MissingInfoEvent)?
            .parse()
    }
}
