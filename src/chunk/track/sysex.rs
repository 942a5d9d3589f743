//! System Exclusive Messages

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{event::check_data_byte, TrackError};
use crate::reader::MidiStream;

/// Start of a system exclusive message
pub const SYSEX_START: u8 = 0xF0;
/// End of a system exclusive message, or the escape prefix inside a track
pub const SYSEX_END: u8 = 0xF7;

/// A midi system exclusive event message
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SysexEvent {
    /// True if the event was stored with the `0xF7` escape prefix rather than `0xF0`
    escape: bool,
    /// Data payload without its framing `0xF0` and `0xF7` bytes
    payload: Vec<u8>,
}

impl SysexEvent {
    /// Reads a sysex event whose status byte has already been consumed: a variable length size
    /// followed by the payload. Framing bytes are stripped, and payload bytes above 127 are
    /// either clamped or rejected depending on `clip`.
    pub fn read(stream: &mut MidiStream<'_>, status: u8, clip: bool) -> Result<Self, TrackError> {
        let length = stream.read_varlen()?;
        let data = stream.read_exact(length as usize)?;

        let mut payload = data.as_slice();
        if let [SYSEX_START, rest @ ..] = payload {
            payload = rest;
        }
        if let [rest @ .., SYSEX_END] = payload {
            payload = rest;
        }

        let payload = payload
            .iter()
            .map(|byte| check_data_byte(*byte, clip))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            escape: status == SYSEX_END,
            payload,
        })
    }

    /// The message data
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// True for `0xF7` escaped events
    pub fn is_escape(&self) -> bool {
        self.escape
    }
}
