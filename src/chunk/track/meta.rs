//! Meta Event Structs and Parsing

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::TrackError;
use crate::{options::Charset, reader::MidiStream};

/// A meta level event
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MetaEvent {
    /// Sequence Number, tag 0x00
    SequenceNumber(u16),
    /// Text metadata, tag 0x01
    Text(String),
    /// Copyright, tag 0x02
    Copyright(String),
    /// Track name, tag 0x03
    TrackName(String),
    /// Instrument name, tag 0x04
    InstrumentName(String),
    /// Lyric, tag 0x05
    Lyric(String),
    /// Marker, tag 0x06
    Marker(String),
    /// Cue Point, tag 0x07. The XF karaoke track stores its info record here
    CuePoint(String),
    /// Program name, tag 0x08
    ProgramName(String),
    /// Device name, tag 0x09
    DeviceName(String),
    /// Midi Channel Prefix, tag 0x20
    MidiChannelPrefix(u8),
    /// Midi Port, tag 0x21
    MidiPort(u8),
    /// End of Track Identifier, tag 0x2F
    EndOfTrack,
    /// Tempo in microseconds per quarter note, tag 0x51
    Tempo(u32),
    /// Smpte Offset, tag 0x54
    SmpteOffset(SmpteOffset),
    /// Time signature, tag 0x58
    TimeSignature(TimeSignature),
    /// Key Signature, tag 0x59
    KeySignature(KeySignature),
    /// Sequencer Specific, tag 0x7f
    SequencerSpecific(Vec<u8>),
    /// An unknown meta event
    UnknownRaw(u8, Vec<u8>),
}

impl MetaEvent {
    /// Returns the specific event's tag
    pub fn get_tag(&self) -> u8 {
        match self {
            Self::SequenceNumber(_) => 0x00,
            Self::Text(_) => 0x01,
            Self::Copyright(_) => 0x02,
            Self::TrackName(_) => 0x03,
            Self::InstrumentName(_) => 0x04,
            Self::Lyric(_) => 0x05,
            Self::Marker(_) => 0x06,
            Self::CuePoint(_) => 0x07,
            Self::ProgramName(_) => 0x08,
            Self::DeviceName(_) => 0x09,
            Self::MidiChannelPrefix(_) => 0x20,
            Self::MidiPort(_) => 0x21,
            Self::EndOfTrack => 0x2F,
            Self::Tempo(_) => 0x51,
            Self::SmpteOffset(_) => 0x54,
            Self::TimeSignature(_) => 0x58,
            Self::KeySignature(_) => 0x59,
            Self::SequencerSpecific(_) => 0x7F,
            Self::UnknownRaw(tag, _) => *tag,
        }
    }

    /// Conventional snake case name of the event kind, e.g. `"lyrics"` or `"cue_marker"`
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::SequenceNumber(_) => "sequence_number",
            Self::Text(_) => "text",
            Self::Copyright(_) => "copyright",
            Self::TrackName(_) => "track_name",
            Self::InstrumentName(_) => "instrument_name",
            Self::Lyric(_) => "lyrics",
            Self::Marker(_) => "marker",
            Self::CuePoint(_) => "cue_marker",
            Self::ProgramName(_) => "program_name",
            Self::DeviceName(_) => "device_name",
            Self::MidiChannelPrefix(_) => "channel_prefix",
            Self::MidiPort(_) => "midi_port",
            Self::EndOfTrack => "end_of_track",
            Self::Tempo(_) => "set_tempo",
            Self::SmpteOffset(_) => "smpte_offset",
            Self::TimeSignature(_) => "time_signature",
            Self::KeySignature(_) => "key_signature",
            Self::SequencerSpecific(_) => "sequencer_specific",
            Self::UnknownRaw(..) => "unknown_meta",
        }
    }

    /// The decoded text of any text family event
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text)
            | Self::Copyright(text)
            | Self::TrackName(text)
            | Self::InstrumentName(text)
            | Self::Lyric(text)
            | Self::Marker(text)
            | Self::CuePoint(text)
            | Self::ProgramName(text)
            | Self::DeviceName(text) => Some(text),
            _ => None,
        }
    }

    /// Reads a meta event whose `0xFF` prefix has already been consumed: the type byte, a
    /// variable length size and the payload. Text payloads are decoded with `charset`.
    pub fn read(stream: &mut MidiStream<'_>, charset: Charset) -> Result<Self, TrackError> {
        let event_tag = stream.read_byte()?;
        let length = stream.read_varlen()?;
        let data = stream.read_exact(length as usize)?;

        macro_rules! meta_event {
            ($len: expr, $name: expr, $value: expr) => {{
                if data.len() != $len {
                    return Err(TrackError::InvalidMetaEventData);
                }
                Ok($name($value))
            }};
        }

        match event_tag {
            0x00 => meta_event!(
                2,
                MetaEvent::SequenceNumber,
                u16::from_be_bytes([data[0], data[1]])
            ),
            0x01 => Ok(MetaEvent::Text(charset.decode(data)?)),
            0x02 => Ok(MetaEvent::Copyright(charset.decode(data)?)),
            0x03 => Ok(MetaEvent::TrackName(charset.decode(data)?)),
            0x04 => Ok(MetaEvent::InstrumentName(charset.decode(data)?)),
            0x05 => Ok(MetaEvent::Lyric(charset.decode(data)?)),
            0x06 => Ok(MetaEvent::Marker(charset.decode(data)?)),
            0x07 => Ok(MetaEvent::CuePoint(charset.decode(data)?)),
            0x08 => Ok(MetaEvent::ProgramName(charset.decode(data)?)),
            0x09 => Ok(MetaEvent::DeviceName(charset.decode(data)?)),

            0x20 => meta_event!(1, MetaEvent::MidiChannelPrefix, data[0]),
            0x21 => meta_event!(1, MetaEvent::MidiPort, data[0]),
            0x2F => Ok(MetaEvent::EndOfTrack),

            0x51 => meta_event!(
                3,
                MetaEvent::Tempo,
                u32::from_be_bytes([0, data[0], data[1], data[2]])
            ),
            0x54 => meta_event!(
                5,
                MetaEvent::SmpteOffset,
                SmpteOffset {
                    hours: data[0],
                    minutes: data[1],
                    seconds: data[2],
                    frames: data[3],
                    subframes: data[4]
                }
            ),
            0x58 => meta_event!(
                4,
                MetaEvent::TimeSignature,
                TimeSignature {
                    numerator: data[0],
                    denominator: 1u32
                        .checked_shl(u32::from(data[1]))
                        .ok_or(TrackError::InvalidMetaEventData)?,
                    clocks_per_click: data[2],
                    thirty_second_notes_per_quarter: data[3],
                }
            ),
            0x59 => meta_event!(
                2,
                MetaEvent::KeySignature,
                KeySignature {
                    sharps_flats: data[0] as i8,
                    minor: data[1] != 0
                }
            ),

            0x7F => Ok(MetaEvent::SequencerSpecific(data)),

            _ => Ok(MetaEvent::UnknownRaw(event_tag, data)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
/// A key signature
pub struct KeySignature {
    /// Negative for flats, positive for sharps
    pub sharps_flats: i8,
    /// True if in minor, false if in major
    pub minor: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
/// An SMPTE Offset
pub struct SmpteOffset {
    /// Hours of offset
    pub hours: u8,
    /// Minutes of offset
    pub minutes: u8,
    /// Seconds of offset
    pub seconds: u8,
    /// Frames of offset
    pub frames: u8,
    /// Subframes of offset
    pub subframes: u8,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
/// A Time Signature
pub struct TimeSignature {
    /// The time signature's numerator
    pub numerator: u8,
    /// The time signature's denominator, already raised from its power of two encoding
    pub denominator: u32,
    /// MIDI clocks per metronome click
    pub clocks_per_click: u8,
    /// Thirty second notes per quarter
    pub thirty_second_notes_per_quarter: u8,
}

#[cfg(test)]
mod tests {
    use crate::{
        chunk::track::{
            meta::{KeySignature, MetaEvent, SmpteOffset, TimeSignature},
            TrackError,
        },
        options::Charset,
        reader::MidiStream,
    };

    /// Reads a meta event from bytes that still carry the 0xFF prefix
    fn parse(data: &[u8]) -> Result<MetaEvent, TrackError> {
        let mut stream = MidiStream::new(data);
        assert_eq!(stream.read_byte(), Ok(0xFF));
        MetaEvent::read(&mut stream, Charset::Latin1)
    }

    #[test]
    fn test_sequence_number() {
        let result = parse(&[0xFF, 0x00, 0x02, 0x00, 0x01]);
        assert_eq!(result, Ok(MetaEvent::SequenceNumber(1)));
    }

    #[test]
    fn test_text_event() {
        let result = parse(&[0xFF, 0x01, 0x05, b'H', b'e', b'l', b'l', b'o']);
        assert_eq!(result, Ok(MetaEvent::Text("Hello".to_string())));
    }

    #[test]
    fn test_cue_point_is_text() {
        let result = parse(b"\xFF\x07\x0E$Lyrc:1:312:JP").expect("Parse cue point");
        assert_eq!(result, MetaEvent::CuePoint("$Lyrc:1:312:JP".to_string()));
        assert_eq!(result.kind_name(), "cue_marker");
        assert_eq!(result.text(), Some("$Lyrc:1:312:JP"));
    }

    #[test]
    fn latin1_lyrics_keep_every_byte() {
        let result = parse(&[0xFF, 0x05, 0x02, 0x82, 0xA0]).expect("Parse lyric");
        assert_eq!(result, MetaEvent::Lyric("\u{82}\u{a0}".to_string()));
        assert_eq!(result.kind_name(), "lyrics");
    }

    #[test]
    fn strict_utf8_lyrics_fail_on_invalid_bytes() {
        let mut stream = MidiStream::new(&[0x05, 0x01, 0x82]);
        let result = MetaEvent::read(&mut stream, Charset::Utf8);
        assert!(matches!(result, Err(TrackError::TextDecode(_))));
    }

    #[test]
    fn test_tempo_event() {
        let result = parse(&[0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20]);
        assert_eq!(result, Ok(MetaEvent::Tempo(500_000)));
    }

    #[test]
    fn test_time_signature_event() {
        let result = parse(&[0xFF, 0x58, 0x04, 0x06, 0x03, 0x18, 0x08]);
        assert_eq!(
            result,
            Ok(MetaEvent::TimeSignature(TimeSignature {
                numerator: 6,
                denominator: 8,
                clocks_per_click: 24,
                thirty_second_notes_per_quarter: 8,
            }))
        );
    }

    #[test]
    fn absurd_time_signature_denominator_fails() {
        let result = parse(&[0xFF, 0x58, 0x04, 0x04, 0x40, 0x18, 0x08]);
        assert_eq!(result, Err(TrackError::InvalidMetaEventData));
    }

    #[test]
    fn test_key_signature_event() {
        let result = parse(&[0xFF, 0x59, 0x02, 0xFD, 0x01]);
        assert_eq!(
            result,
            Ok(MetaEvent::KeySignature(KeySignature {
                sharps_flats: -3,
                minor: true,
            }))
        );
    }

    #[test]
    fn test_smpte_offset_event() {
        let result = parse(&[0xFF, 0x54, 0x05, 0x01, 0x20, 0x15, 0x10, 0x00]);
        assert_eq!(
            result,
            Ok(MetaEvent::SmpteOffset(SmpteOffset {
                hours: 1,
                minutes: 32,
                seconds: 21,
                frames: 16,
                subframes: 0,
            }))
        );
    }

    #[test]
    fn test_end_of_track_event() {
        let result = parse(&[0xFF, 0x2F, 0x00]).expect("Parse end of track");
        assert_eq!(result, MetaEvent::EndOfTrack);
        assert_eq!(result.kind_name(), "end_of_track");
        assert_eq!(result.text(), None);
    }

    #[test]
    fn test_midi_port_event() {
        let result = parse(&[0xFF, 0x21, 0x01, 0x02]);
        assert_eq!(result, Ok(MetaEvent::MidiPort(2)));
    }

    #[test]
    fn test_unknown_event() {
        let result = parse(&[0xFF, 0x60, 0x03, 0x01, 0x02, 0x03]);
        assert_eq!(result, Ok(MetaEvent::UnknownRaw(0x60, vec![0x01, 0x02, 0x03])));
    }

    #[test]
    fn test_invalid_length() {
        let result = parse(&[0xFF, 0x20, 0x02, 0x01, 0x02]);
        assert_eq!(result, Err(TrackError::InvalidMetaEventData));
    }

    #[test]
    fn test_out_of_space() {
        let result = parse(&[0xFF, 0x01, 0x05, b'H', b'i']);
        assert_eq!(result, Err(TrackError::OutOfSpace));

        let result = parse(&[0xFF]);
        assert_eq!(result, Err(TrackError::OutOfSpace));
    }
}
