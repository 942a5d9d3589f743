//! Finding chunks inside a raw MIDI byte buffer

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::chunk::chunk_types::tag_bytes;

/// Size of a chunk header: 4 tag bytes and a 4 byte length
const CHUNK_HEADER_LEN: usize = 8;

/// How a chunk tag is searched for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LocateStrategy {
    /// Walk `tag length payload` headers and only match tags on a real chunk boundary
    #[default]
    ChunkBoundary,
    /// Match the first occurrence of the tag bytes at any alignment, even inside the payload
    /// of another chunk
    RawScan,
}

/// Returns the offset of the first occurrence of `tag` anywhere in `bytes`
pub fn locate(bytes: &[u8], tag: [char; 4]) -> Option<usize> {
    let needle = tag_bytes(tag);
    bytes.windows(needle.len()).position(|window| window == needle)
}

/// Returns the offset of the first chunk tagged `tag`, walking chunk headers from the start of
/// `bytes`. Stops at the first header that does not fit in the buffer.
pub fn locate_chunk(bytes: &[u8], tag: [char; 4]) -> Option<usize> {
    let needle = tag_bytes(tag);
    let mut offset = 0usize;

    loop {
        let header = bytes.get(offset..offset.checked_add(CHUNK_HEADER_LEN)?)?;
        if header[..4] == needle {
            return Some(offset);
        }

        let length = u32::from_be_bytes([header[4], header[5], header[6], header[7]]);
        offset = offset
            .checked_add(CHUNK_HEADER_LEN)?
            .checked_add(length as usize)?;
    }
}
