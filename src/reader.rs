//! MIDI byte sources and the cursor that chunk decoders read from

use std::{
    convert::Infallible,
    fs,
    io::{self, Read},
    path::Path,
};

use crate::{
    chunk::{
        locate::{locate, locate_chunk, LocateStrategy},
        track::TrackError,
    },
    Chunk,
};

/// Trait that allows for different types to be translated to a MIDI parseable format
pub trait MidiReadable {
    /// Error type that may be returned while gathering the bytes
    type Error;
    /// Reads the whole source into memory
    fn get_midi_bytes(self) -> Result<Vec<u8>, Self::Error>;
}

/// Wrapper struct to allow passing in-memory bytes to the MidiReadable trait
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MidiData(Vec<u8>);

impl MidiData {
    /// Drains a reader into an in-memory byte buffer
    pub fn from_reader<R: Read>(mut reader: R) -> io::Result<Self> {
        let mut bytes = vec![];
        reader.read_to_end(&mut bytes)?;
        Ok(Self(bytes))
    }
}

impl From<Vec<u8>> for MidiData {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

impl From<&[u8]> for MidiData {
    fn from(value: &[u8]) -> Self {
        Self(value.to_vec())
    }
}

impl MidiReadable for MidiData {
    type Error = Infallible;
    fn get_midi_bytes(self) -> Result<Vec<u8>, Self::Error> {
        Ok(self.0)
    }
}

impl<PATH> MidiReadable for PATH
where
    PATH: AsRef<Path>,
{
    type Error = io::Error;
    fn get_midi_bytes(self) -> Result<Vec<u8>, Self::Error> {
        fs::read(self.as_ref())
    }
}

/// A read cursor over a borrowed MIDI byte buffer.
///
/// Every read advances [`MidiStream::position`], which is how the track decoder proves it
/// consumed exactly the declared number of bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiStream<'a> {
    /// The bytes being read
    data: &'a [u8],
    /// Offset of the next unread byte
    position: usize,
}

impl<'a> MidiStream<'a> {
    /// Creates a cursor at the start of `data`
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Offset of the next byte to be read
    pub fn position(&self) -> usize {
        self.position
    }

    /// Total number of bytes visible through this stream
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the stream holds no bytes at all
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns true once every byte has been read
    pub fn is_exhausted(&self) -> bool {
        self.position >= self.data.len()
    }

    /// Moves the cursor to an absolute offset, clamped to the end of the data
    pub fn seek(&mut self, position: usize) {
        self.position = position.min(self.data.len());
    }

    /// The bytes that have not been read yet
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.position..]
    }

    /// Reads a single byte
    pub fn read_byte(&mut self) -> Result<u8, TrackError> {
        self.next_byte().ok_or(TrackError::OutOfSpace)
    }

    /// Reads exactly `n` bytes, failing without partial output if fewer remain
    pub fn read_exact(&mut self, n: usize) -> Result<Vec<u8>, TrackError> {
        self.take_slice(n).map(<[u8]>::to_vec)
    }

    /// Reads a variable length quantity: 7 bits per byte, most significant group first,
    /// with the top bit of every byte except the last set.
    pub fn read_varlen(&mut self) -> Result<u32, TrackError> {
        let mut byte = self.read_byte()?;
        let mut value = u32::from(byte & 0x7F);

        while byte & 0x80 != 0 {
            byte = self.next_byte().ok_or(TrackError::MalformedVarLen)?;
            value = value
                .checked_mul(0x80)
                .ok_or(TrackError::VarLenOverflow)?
                | u32::from(byte & 0x7F);
        }

        Ok(value)
    }

    /// Reads an 8 byte chunk header: the 4 byte tag followed by a big-endian `u32` length
    pub fn read_chunk_header(&mut self) -> Result<Chunk, TrackError> {
        let mut raw = [0; 8];
        raw.copy_from_slice(self.take_slice(8)?);
        Ok(Chunk::from(u64::from_be_bytes(raw)))
    }

    /// Splits off the next `length` bytes as their own stream and advances past them.
    ///
    /// Reads on the returned stream can never run into whatever follows the chunk.
    pub fn chunk_body(&mut self, length: usize) -> Result<MidiStream<'a>, TrackError> {
        let available = self.data.len() - self.position;
        let body = self.take_slice(length).map_err(|_| TrackError::ChunkTruncated {
            declared: length,
            available,
        })?;
        Ok(MidiStream::new(body))
    }

    /// Moves the cursor to the next occurrence of `tag` at or after the current position and
    /// returns its absolute offset. Leaves the cursor untouched when the tag is absent.
    pub fn seek_chunk(&mut self, tag: [char; 4], strategy: LocateStrategy) -> Option<usize> {
        let found = match strategy {
            LocateStrategy::ChunkBoundary => locate_chunk(self.remaining(), tag),
            LocateStrategy::RawScan => locate(self.remaining(), tag),
        }?;

        self.position += found;
        Some(self.position)
    }

    /// Reads one byte if any remain
    fn next_byte(&mut self) -> Option<u8> {
        let byte = *self.data.get(self.position)?;
        self.position += 1;
        Some(byte)
    }

    /// Borrows the next `n` bytes and advances past them
    fn take_slice(&mut self, n: usize) -> Result<&'a [u8], TrackError> {
        let end = self
            .position
            .checked_add(n)
            .filter(|end| *end <= self.data.len())
            .ok_or(TrackError::OutOfSpace)?;
        let bytes = &self.data[self.position..end];
        self.position = end;
        Ok(bytes)
    }
}
