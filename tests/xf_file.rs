//! Loading a complete XF file: base track, information header and karaoke track

use std::io::{Cursor, Write};

use pretty_assertions::assert_eq;
use xfmidi::{
    chunk::{
        chunk_types::{ChunkTags, XF_INFO_HEADER_CHUNK, XF_KARAOKE_CHUNK},
        header::{Division, Format},
        track::{
            event::{MidiEvent, NoteMeta},
            meta::MetaEvent,
        },
    },
    extract_metadata,
    reader::{MidiData, MidiStream},
    Charset, DecodeOptions, Event, KaraokeInfo, LocateStrategy, TrackChunk, XfMidiFile,
};

/// Wraps an event body in a chunk header
fn chunk(tag: &[u8; 4], body: &[u8]) -> Vec<u8> {
    let mut bytes = tag.to_vec();
    bytes.extend((body.len() as u32).to_be_bytes());
    bytes.extend(body);
    bytes
}

/// Format 1 header, one track, 480 ticks per quarter
fn header() -> Vec<u8> {
    chunk(b"MThd", &[0x00, 0x01, 0x00, 0x01, 0x01, 0xE0])
}

/// Note on, note off 480 ticks later, a lyric and the end marker
fn base_track() -> Vec<u8> {
    chunk(
        b"MTrk",
        b"\x00\x90\x3C\x64\x83\x60\x80\x3C\x40\x00\xFF\x05\x0BHello World\x00\xFF\x2F\x00",
    )
}

/// Information header holding a single version text event
fn xfih() -> Vec<u8> {
    chunk(b"XFIH", b"\x00\xFF\x01\x0CXF Version 1\x00\xFF\x2F\x00")
}

/// Karaoke track: info cue point, three lyrics and the end marker
fn xfkm() -> Vec<u8> {
    chunk(
        b"XFKM",
        b"\x00\xFF\x07\x0E$Lyrc:1:312:JP\x00\xFF\x05\x05Hello\x83\x60\xFF\x05\x05World\x00\xFF\x05\x0BHello World\x00\xFF\x2F\x00",
    )
}

/// The full karaoke file
fn xf_file() -> Vec<u8> {
    [header(), base_track(), xfih(), xfkm()].concat()
}

/// The same song without any XF chunks
fn plain_file() -> Vec<u8> {
    [header(), base_track()].concat()
}

#[test]
fn loads_header_and_base_track() {
    let midi = XfMidiFile::from_bytes(&xf_file(), &DecodeOptions::default()).expect("Load file");

    assert_eq!(midi.header().format(), Format::One);
    assert_eq!(midi.header().division(), Division::Metrical(480));
    assert_eq!(midi.tracks().len(), 1);

    let track = &midi.tracks()[0];
    assert_eq!(track.len(), 4);
    assert_eq!(
        track.events()[1].event,
        Event::MidiEvent(MidiEvent::NoteOff(
            0,
            NoteMeta {
                key: 0x3C,
                velocity: 0x40
            }
        ))
    );
    assert_eq!(track.events()[1].delta_time, 480);
}

#[test]
fn information_header_has_two_events() {
    let midi = XfMidiFile::from_bytes(&xf_file(), &DecodeOptions::default()).expect("Load file");
    let xfih = midi.xfih().expect("XFIH present");

    assert_eq!(xfih.chunk_type(), XF_INFO_HEADER_CHUNK);
    assert_eq!(xfih.len(), 2);

    let kinds: Vec<_> = xfih
        .events()
        .iter()
        .filter_map(|event| event.event.as_meta())
        .map(|meta| (meta.kind_name(), meta.text()))
        .collect();
    assert_eq!(
        kinds,
        vec![("text", Some("XF Version 1")), ("end_of_track", None)]
    );
}

#[test]
fn karaoke_track_has_five_events() {
    let midi = XfMidiFile::from_bytes(&xf_file(), &DecodeOptions::default()).expect("Load file");
    let xfkm = midi.xfkm().expect("XFKM present");

    assert_eq!(xfkm.chunk_type(), XF_KARAOKE_CHUNK);
    assert_eq!(xfkm.len(), 5);
    assert_eq!(
        xfkm.events()[0].event.as_meta(),
        Some(&MetaEvent::CuePoint("$Lyrc:1:312:JP".to_string()))
    );

    let lyrics: Vec<_> = xfkm.lyrics().collect();
    assert_eq!(
        lyrics,
        vec![(0, "Hello"), (480, "World"), (480, "Hello World")]
    );

    let deltas: Vec<_> = xfkm.events().iter().map(|event| event.delta_time).collect();
    assert_eq!(deltas, vec![0, 0, 480, 0, 0]);
}

#[test]
fn karaoke_info_from_loaded_file_and_raw_bytes_agree() {
    let expected = KaraokeInfo {
        song_id: "$Lyrc".to_string(),
        melody_channel: 1,
        time_offset: 312,
        language: "JP".to_string(),
    };

    let midi = XfMidiFile::from_bytes(&xf_file(), &DecodeOptions::default()).expect("Load file");
    assert_eq!(midi.karaoke_info().expect("Parse karaoke info"), expected);

    let extracted = extract_metadata(MidiData::from(xf_file())).expect("Extract karaoke info");
    assert_eq!(extracted, expected);
}

#[test]
fn file_without_karaoke_chunk_is_not_found() {
    let err = extract_metadata(MidiData::from(plain_file())).expect_err("No karaoke chunk");
    assert!(err.is_not_found());
}

#[test]
fn plain_file_loads_like_a_standard_midi_file() {
    let options = DecodeOptions::default();
    let xf = XfMidiFile::from_bytes(&xf_file(), &options).expect("Load XF file");
    let plain = XfMidiFile::from_bytes(&plain_file(), &options).expect("Load plain file");

    assert!(plain.xfih().is_none());
    assert!(plain.xfkm().is_none());
    assert_eq!(plain.header(), xf.header());
    assert_eq!(plain.tracks(), xf.tracks());
}

#[test]
fn raw_scan_strategy_finds_the_same_chunks() {
    let options = DecodeOptions::default().with_locate(LocateStrategy::RawScan);
    let scanned = XfMidiFile::from_bytes(&xf_file(), &options).expect("Load file");
    let walked =
        XfMidiFile::from_bytes(&xf_file(), &DecodeOptions::default()).expect("Load file");

    assert_eq!(scanned, walked);
}

#[test]
fn tag_inside_text_only_fools_the_raw_scan() {
    let decoy = chunk(b"MTrk", b"\x00\xFF\x01\x04XFKM\x00\xFF\x2F\x00");
    let no_tracks = chunk(b"MThd", &[0x00, 0x01, 0x00, 0x00, 0x01, 0xE0]);
    let bytes = [no_tracks, decoy].concat();

    let walked = XfMidiFile::from_bytes(&bytes, &DecodeOptions::default()).expect("Load file");
    assert!(walked.xfkm().is_none());

    let scanned = XfMidiFile::from_bytes(
        &bytes,
        &DecodeOptions::default().with_locate(LocateStrategy::RawScan),
    );
    assert!(scanned.is_err());
}

#[test]
fn every_decode_consumes_exactly_its_chunk() {
    let bytes = xf_file();
    let mut stream = MidiStream::new(&bytes);
    stream.seek(header().len() + base_track().len());

    let options = DecodeOptions::default();
    TrackChunk::decode(&mut stream, ChunkTags::XF, &options).expect("Decode XFIH");
    assert_eq!(stream.position(), bytes.len() - xfkm().len());

    TrackChunk::decode(&mut stream, ChunkTags::XF, &options).expect("Decode XFKM");
    assert!(stream.is_exhausted());
}

#[test]
fn loads_from_path_and_reader() {
    let mut file = tempfile::NamedTempFile::new().expect("Create temporary file");
    file.write_all(&xf_file()).expect("Write temporary file");

    let from_path = XfMidiFile::open(file.path()).expect("Load from path");
    let from_reader = XfMidiFile::from_reader(Cursor::new(xf_file()), &DecodeOptions::default())
        .expect("Load from reader");
    assert_eq!(from_path, from_reader);

    let info = extract_metadata(file.path()).expect("Extract from path");
    assert_eq!(info.language, "JP");
}

#[test]
fn missing_path_is_an_io_error() {
    let result = XfMidiFile::open("no/such/song.mid");
    assert!(matches!(result, Err(xfmidi::ChunkParseError::Io(_))));

    let result = extract_metadata("no/such/song.mid");
    assert!(matches!(result, Err(xfmidi::KaraokeError::Io(_))));
}

#[test]
fn charset_applies_to_lyrics() {
    let lyric = "歌".as_bytes();
    let mut body = vec![0x00, 0xFF, 0x05, lyric.len() as u8];
    body.extend(lyric);
    body.extend([0x00, 0xFF, 0x2F, 0x00]);
    let bytes = [header(), base_track(), chunk(b"XFKM", &body)].concat();

    let utf8 = DecodeOptions::default().with_charset(Charset::Utf8);
    let midi = XfMidiFile::from_bytes(&bytes, &utf8).expect("Load file");
    let lyrics: Vec<_> = midi.xfkm().expect("XFKM present").lyrics().collect();
    assert_eq!(lyrics, vec![(0, "歌")]);

    let midi = XfMidiFile::from_bytes(&bytes, &DecodeOptions::default()).expect("Load file");
    let lyrics: Vec<_> = midi.xfkm().expect("XFKM present").lyrics().collect();
    assert_eq!(lyrics[0].1.chars().count(), 3);
}

#[test]
fn shift_jis_lyrics_decode() {
    let body = [
        0x00, 0xFF, 0x05, 0x02, 0x89, 0xCC, // 歌
        0x60, 0xFF, 0x05, 0x04, 0x83, 0x4A, 0x83, 0x89, // カラ
        0x00, 0xFF, 0x2F, 0x00,
    ];
    let bytes = [header(), base_track(), chunk(b"XFKM", &body)].concat();

    let options = DecodeOptions::default().with_charset(Charset::ShiftJis);
    let midi = XfMidiFile::from_bytes(&bytes, &options).expect("Load file");
    let lyrics: Vec<_> = midi.xfkm().expect("XFKM present").lyrics().collect();
    assert_eq!(lyrics, vec![(0, "歌"), (0x60, "カラ")]);

    let strict = DecodeOptions::default().with_charset(Charset::Utf8);
    assert!(XfMidiFile::from_bytes(&bytes, &strict).is_err());
}
