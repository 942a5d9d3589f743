//! Channel, system common and realtime messages

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::TrackError;
use crate::reader::MidiStream;

/// A MIDI message that is neither a meta nor a system exclusive event
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MidiEvent {
    /// Turn Off event
    /// This message is sent when a note is released
    NoteOff(u8, NoteMeta),
    /// Turn On event
    /// This message is sent when a note is depressed
    NoteOn(u8, NoteMeta),
    /// Polyphonic Key Pressure
    /// This message is most often sent by pressing down a key after it "bottoms out"
    PolyphonicKeyPressure(u8, NoteMeta),
    /// Control change
    /// This message is sent when a controller value changes. Controllers include devices such as
    /// pedals and levers. Certain controller numbers are reserved.
    ControlChange(u8, ControlChange),
    /// Program change.
    /// This message is sent when the patch number changes
    ProgramChange(u8, u8),
    /// Channel Pressure
    /// This message is most often sent by pressing down on a key after it "bottoms out"
    ChannelPressure(u8, u8),
    /// Pitch Wheel Change
    /// This message is sent to indicate a change in the pitch wheel as measured by a fourteen bit
    /// value, 0x2000 being centered.
    PitchWheelChange(u8, u16),
    /// MIDI time code quarter frame, 0xF1
    QuarterFrame(u8),
    /// Song position pointer in MIDI beats, 0xF2
    SongPosition(u16),
    /// Song select, 0xF3
    SongSelect(u8),
    /// Tune request, 0xF6
    TuneRequest,
    /// Single byte realtime message (clock, start, continue, stop, active sensing), 0xF8-0xFE
    Realtime(u8),
}

/// Metadata for a note's relative info. Including channel, key and velocity
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NoteMeta {
    /// Note key
    pub key: u8,
    /// Note velocity
    pub velocity: u8,
}

/// Metadata for changing a controller
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ControlChange {
    /// Controller number
    pub controller_number: u8,
    /// New value
    pub new_value: u8,
}

/// Number of data bytes following `status`
pub fn data_length(status: u8) -> Result<usize, TrackError> {
    match status {
        0x80..=0xBF | 0xE0..=0xEF | 0xF2 => Ok(2),
        0xC0..=0xDF | 0xF1 | 0xF3 => Ok(1),
        0xF6 | 0xF8 | 0xFA..=0xFC | 0xFE => Ok(0),
        other => Err(TrackError::UnsupportedStatusCode(other)),
    }
}

impl MidiEvent {
    /// Reads the data bytes for `status`. `first` is the leading data byte when the status was
    /// inherited through running status and has already been consumed.
    pub fn read(
        stream: &mut MidiStream<'_>,
        status: u8,
        first: Option<u8>,
        clip: bool,
    ) -> Result<Self, TrackError> {
        let length = data_length(status)?;

        let mut data = [0u8; 2];
        let mut filled = 0;
        if let Some(first) = first {
            if length == 0 {
                return Err(TrackError::UnexpectedDataByte(first));
            }
            data[0] = first;
            filled = 1;
        }
        for slot in data.iter_mut().take(length).skip(filled) {
            *slot = stream.read_byte()?;
        }

        for byte in data.iter_mut().take(length) {
            *byte = check_data_byte(*byte, clip)?;
        }

        Ok(Self::from_parts(status, data))
    }

    /// Builds the message from its status and already validated data bytes
    fn from_parts(status: u8, [a, b]: [u8; 2]) -> Self {
        let channel = status & 0x0F;
        match status {
            0x80..=0x8F => Self::NoteOff(channel, NoteMeta { key: a, velocity: b }),
            0x90..=0x9F => Self::NoteOn(channel, NoteMeta { key: a, velocity: b }),
            0xA0..=0xAF => Self::PolyphonicKeyPressure(channel, NoteMeta { key: a, velocity: b }),
            0xB0..=0xBF => Self::ControlChange(
                channel,
                ControlChange {
                    controller_number: a,
                    new_value: b,
                },
            ),
            0xC0..=0xCF => Self::ProgramChange(channel, a),
            0xD0..=0xDF => Self::ChannelPressure(channel, a),
            0xE0..=0xEF => Self::PitchWheelChange(channel, (u16::from(b) << 7) | u16::from(a)),
            0xF1 => Self::QuarterFrame(a),
            0xF2 => Self::SongPosition((u16::from(b) << 7) | u16::from(a)),
            0xF3 => Self::SongSelect(a),
            0xF6 => Self::TuneRequest,
            realtime => Self::Realtime(realtime),
        }
    }

    /// Channel the message is addressed to, if it is a channel message
    pub fn channel(&self) -> Option<u8> {
        match self {
            Self::NoteOff(channel, _)
            | Self::NoteOn(channel, _)
            | Self::PolyphonicKeyPressure(channel, _)
            | Self::ControlChange(channel, _)
            | Self::ProgramChange(channel, _)
            | Self::ChannelPressure(channel, _)
            | Self::PitchWheelChange(channel, _) => Some(*channel),
            _ => None,
        }
    }
}

/// Checks a data byte is 7 bit, clamping it to 127 when clipping is enabled
pub(crate) fn check_data_byte(byte: u8, clip: bool) -> Result<u8, TrackError> {
    match byte {
        0x00..=0x7F => Ok(byte),
        _ if clip => Ok(0x7F),
        _ => Err(TrackError::DataByteOutOfRange(byte)),
    }
}
