//! Chunk type constants and the tag sets track decoders accept

use std::fmt;

/// Creates a chunk type identifier
macro_rules! chunk_type {
    ($(#[$doc:meta])* $const_name:ident, $a:expr, $b:expr, $c:expr, $d:expr) => {
        $(#[$doc])*
        pub const $const_name: [char; 4] = [$a, $b, $c, $d];
    };
}

chunk_type!(
    /// Standard MIDI file header chunk
    HEADER_CHUNK, 'M', 'T', 'h', 'd'
);
chunk_type!(
    /// Standard MIDI track chunk
    TRACK_DATA_CHUNK, 'M', 'T', 'r', 'k'
);
chunk_type!(
    /// XF Information Header, a track chunk carrying song level text meta events
    XF_INFO_HEADER_CHUNK, 'X', 'F', 'I', 'H'
);
chunk_type!(
    /// XF Karaoke Message track, carrying the karaoke info cue point and the lyrics
    XF_KARAOKE_CHUNK, 'X', 'F', 'K', 'M'
);

/// Converts a chunk tag to the raw bytes that appear on disk
pub const fn tag_bytes(tag: [char; 4]) -> [u8; 4] {
    [tag[0] as u8, tag[1] as u8, tag[2] as u8, tag[3] as u8]
}

/// A set of chunk tags that a track decoder is willing to accept, along with the family name
/// reported when a chunk outside of the set is encountered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkTags {
    /// Name of the chunk family, used in error messages
    family: &'static str,
    /// Accepted tags
    tags: &'static [[char; 4]],
}

impl ChunkTags {
    /// Plain `MTrk` track chunks
    pub const TRACK: Self = Self {
        family: "MTrk",
        tags: &[TRACK_DATA_CHUNK],
    };

    /// Either of the XF auxiliary chunks
    pub const XF: Self = Self {
        family: "XF",
        tags: &[XF_INFO_HEADER_CHUNK, XF_KARAOKE_CHUNK],
    };

    /// Only the XF Information Header
    pub const XF_INFO_HEADER: Self = Self {
        family: "XF",
        tags: &[XF_INFO_HEADER_CHUNK],
    };

    /// Only the XF Karaoke Message track
    pub const XF_KARAOKE: Self = Self {
        family: "XF",
        tags: &[XF_KARAOKE_CHUNK],
    };

    /// Returns true if `tag` is a member of this set
    pub fn accepts(&self, tag: [char; 4]) -> bool {
        self.tags.contains(&tag)
    }

    /// Family name of the set
    pub fn family(&self) -> &'static str {
        self.family
    }

    /// All accepted tags
    pub fn tags(&self) -> &'static [[char; 4]] {
        self.tags
    }
}

impl fmt::Display for ChunkTags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.family)
    }
}
