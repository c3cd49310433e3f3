mod common;

use common::*;
use mp4info::{
    Field, FieldValue, InfoKey, InfoValue, Mp4Info, ParseError, ParseOptions, StructuralError,
    TagKey, TagValue,
};
use std::io::Cursor;

fn parse(bytes: Vec<u8>) -> Result<Mp4Info, ParseError> {
    Mp4Info::from_reader(Cursor::new(bytes))
}

/// ftyp, moov (mvhd, audio trak, udta/meta/ilst), mdat
fn faac_like() -> Vec<u8> {
    let items = vec![
        text_item(&c(b"nam"), "Name"),
        text_item(&c(b"ART"), "Artist"),
        text_item(&c(b"alb"), "Album"),
        text_item(&c(b"cmt"), "This is a Comment"),
        text_item(&c(b"day"), "2004"),
        text_item(&c(b"wrt"), "Composer"),
        text_item(&c(b"too"), "FAAC 1.24+ (Jul 14 2004) UNSTABLE"),
        item(b"trkn", 0, &[0, 0, 0, 1, 0, 2, 0, 0]),
        item(b"disk", 0, &[0, 0, 0, 3, 0, 4]),
        item(b"gnre", 0, &[0, 75]),
        item(b"cpil", 21, &[1]),
    ];
    let moov = container(b"moov", &[mvhd(1000, 1178), audio_trak(b"mp4a", 8000), udta(&items)]);
    [ftyp(), moov, atom(b"mdat", &vec![0u8; 2353])].concat()
}

#[test]
fn reads_tags_and_info() {
    let mp4 = parse(faac_like()).expect("parse failed");

    assert_eq!(mp4.title().as_deref(), Some("Name"));
    assert_eq!(mp4.artist().as_deref(), Some("Artist"));
    assert_eq!(mp4.album().as_deref(), Some("Album"));
    assert_eq!(mp4.comment().as_deref(), Some("This is a Comment"));
    assert_eq!(mp4.year().as_deref(), Some("2004"));
    assert_eq!(mp4.composer().as_deref(), Some("Composer"));
    assert_eq!(mp4.encoder().as_deref(), Some("FAAC 1.24+ (Jul 14 2004) UNSTABLE"));
    assert_eq!(mp4.genre().as_deref(), Some("Acid Jazz"));
    assert_eq!(mp4.track(), Some((1, 2)));
    assert_eq!(mp4.disc(), Some((3, 4)));
    assert_eq!(mp4.tag(TagKey::Cpil), Some(&TagValue::Integer(1)));
    assert!(mp4.cover().is_none());
    assert!(mp4.tag(TagKey::Cprt).is_none());

    let info = mp4.media_info();
    assert_eq!(info.version, 4);
    assert_eq!(info.layer, Some(1));
    assert_eq!(info.encoding.as_deref(), Some("mp4a"));
    assert_eq!(info.frequency, Some(8.0));
    assert_eq!(info.size, Some(2353));
    assert_eq!(info.secs, Some(1));
    assert_eq!(info.minutes, Some(0));
    assert_eq!(info.seconds, Some(1));
    assert_eq!(info.millis, Some(178));
    assert_eq!(info.time.as_deref(), Some("00:01"));
    assert_eq!(info.bitrate, Some(16));
    assert!(!info.copyright);
    assert!(!info.encrypted);
}

#[test]
fn field_lookup_never_fails() {
    let mp4 = parse(faac_like()).unwrap();

    assert_eq!(mp4.get(Field::Info(InfoKey::Bitrate)), Some(FieldValue::Info(InfoValue::Integer(16))));
    assert_eq!(mp4.field("time"), Some(FieldValue::Info(InfoValue::Text("00:01".into()))));
    assert_eq!(mp4.field("NAM").map(|v| v.to_string()).as_deref(), Some("Name"));
    assert_eq!(mp4.field("GRP"), None);
    assert_eq!(mp4.field("COPYRIGHT"), None);
    assert_eq!(mp4.field("NOPE"), None);
}

#[test]
fn missing_ftyp_is_format_error() {
    let mut bytes = faac_like();
    bytes[4..8].copy_from_slice(b"free");
    assert!(matches!(parse(bytes), Err(ParseError::Format)));

    // checked before anything is walked: a negative-size atom would be structural
    let bogus = [b"\0\0\0\x02moov".to_vec(), vec![0u8; 16]].concat();
    assert!(matches!(parse(bogus), Err(ParseError::Format)));
}

#[test]
fn signature_is_case_insensitive() {
    let bytes = [b"\0\0\0\x08FTYP".to_vec(), container(b"moov", &[mvhd(1, 1)])].concat();
    let mp4 = parse(bytes).unwrap();
    assert_eq!(mp4.media_info().time.as_deref(), Some("00:01"));
}

#[test]
fn tiny_source_is_truncated() {
    assert!(matches!(parse(b"\0\0\0\x08ft".to_vec()), Err(ParseError::Truncated)));
}

#[test]
fn oversize_child_does_not_stop_the_parse() {
    let broken = atom_sized(10_000, b"free", &[0u8; 8]);
    let moov = container(
        b"moov",
        &[udta(&[text_item(&c(b"nam"), "Name"), broken]), mvhd(1000, 2000)],
    );
    let mp4 = parse([ftyp(), moov].concat()).expect("oversize atom must be skipped");

    assert_eq!(mp4.title().as_deref(), Some("Name"));
    // the sibling after udta is still read
    assert_eq!(mp4.media_info().time.as_deref(), Some("00:02"));
}

#[test]
fn legacy_3gpp_tags_fill_gaps_only() {
    let legacy_udta = container(
        b"udta",
        &[legacy(b"titl", "Legacy Title"), legacy(b"perf", "Performer"), legacy(b"cprt", "(c)")],
    );
    let moov = container(b"moov", &[udta(&[text_item(&c(b"nam"), "Modern Title")]), legacy_udta]);
    let mp4 = parse([ftyp(), moov].concat()).unwrap();

    assert_eq!(mp4.title().as_deref(), Some("Modern Title"));
    assert_eq!(mp4.artist().as_deref(), Some("Performer"));
    assert_eq!(mp4.tag(TagKey::Cprt), Some(&TagValue::Text(b"(c)".to_vec())));
    assert!(mp4.media_info().copyright);
    assert_eq!(mp4.info(InfoKey::Copyright), Some(InfoValue::Flag));
}

#[test]
fn mdat_sizes_accumulate() {
    let bytes = [
        ftyp(),
        atom(b"mdat", &[0u8; 100]),
        container(b"moov", &[mvhd(600, 600)]),
        atom64(b"mdat", &[0u8; 50]),
    ]
    .concat();
    let mp4 = parse(bytes).unwrap();
    assert_eq!(mp4.media_info().size, Some(150));
    assert!(mp4.media_info().bitrate.is_some());
}

#[test]
fn trailing_size_zero_mdat() {
    let bytes = [ftyp(), container(b"moov", &[mvhd(10, 25)]), atom_sized(0, b"mdat", &[0u8; 64])].concat();
    let mp4 = parse(bytes).unwrap();
    assert_eq!(mp4.media_info().size, Some(64));
    assert_eq!(mp4.media_info().time.as_deref(), Some("00:03"));
    assert_eq!(mp4.media_info().seconds, Some(2));
    assert_eq!(mp4.media_info().millis, Some(500));
}

#[test]
fn version_one_movie_header() {
    let bytes = [ftyp(), container(b"moov", &[mvhd_v1(44100, 44100 * 125)])].concat();
    let info = parse(bytes).unwrap().media_info().clone();
    assert_eq!(info.minutes, Some(2));
    assert_eq!(info.seconds, Some(5));
    assert_eq!(info.millis, Some(0));
    assert_eq!(info.time.as_deref(), Some("02:05"));
    // no mdat, no bitrate
    assert_eq!(info.bitrate, None);
}

#[test]
fn unknown_movie_header_version_is_ignored() {
    let mut header = mvhd(1000, 5000);
    header[8] = 2;
    let mp4 = parse([ftyp(), container(b"moov", &[header])].concat()).unwrap();
    assert_eq!(mp4.media_info().time, None);
}

#[test]
fn short_movie_header_is_structural() {
    let bytes = [ftyp(), container(b"moov", &[atom(b"mvhd", &[0u8; 31])])].concat();
    let err = parse(bytes).unwrap_err();
    assert!(matches!(
        err,
        ParseError::Structural(StructuralError::BodyTooShort { atom: "mvhd", len: 31, min: 32 })
    ));
}

#[test]
fn short_meta_is_structural() {
    let bytes = [ftyp(), container(b"moov", &[atom(b"meta", &[0, 0])])].concat();
    assert!(matches!(
        parse(bytes),
        Err(ParseError::Structural(StructuralError::BodyTooShort { atom: "meta", len: 2, .. }))
    ));
}

#[test]
fn unknown_duration_does_not_overflow() {
    let bytes = [ftyp(), container(b"moov", &[mvhd_v1(1, u64::MAX)])].concat();
    let info = parse(bytes).unwrap().media_info().clone();
    let minutes = info.minutes.unwrap();
    assert!(minutes > 0);
    let time = info.time.unwrap();
    assert!(time.starts_with(&format!("{}:", minutes)), "{}", time);
}

#[test]
fn legacy_title_gives_way_to_later_modern_title() {
    let legacy_udta = container(b"udta", &[legacy(b"titl", "Legacy Title")]);
    let moov = container(b"moov", &[legacy_udta, udta(&[text_item(&c(b"nam"), "Modern Title")])]);
    let mp4 = parse([ftyp(), moov].concat()).unwrap();
    assert_eq!(mp4.title().as_deref(), Some("Modern Title"));
}

#[test]
fn short_sample_description_is_structural() {
    let stbl = container(b"stbl", &[atom(b"stsd", &[0u8; 43])]);
    let bytes = [ftyp(), container(b"moov", &[container(b"trak", &[stbl])])].concat();
    assert!(matches!(
        parse(bytes),
        Err(ParseError::Structural(StructuralError::BodyTooShort { atom: "stsd", .. }))
    ));
}

#[test]
fn encrypted_and_non_audio_tracks() {
    let moov = container(b"moov", &[audio_trak(b"drms", 44100)]);
    let info = parse([ftyp(), moov].concat()).unwrap().media_info().clone();
    assert!(info.encrypted);
    assert_eq!(info.encoding.as_deref(), Some("drms"));
    assert_eq!(info.frequency, Some(44.1));

    let moov = container(b"moov", &[audio_trak(b"encv", 0)]);
    let info = parse([ftyp(), moov].concat()).unwrap().media_info().clone();
    assert!(info.encrypted);
    assert_eq!(info.encoding, None);
    assert_eq!(info.layer, None);

    let moov = container(b"moov", &[audio_trak(b"avc1", 0)]);
    let info = parse([ftyp(), moov].concat()).unwrap().media_info().clone();
    assert!(!info.encrypted);
    assert_eq!(info.encoding, None);
}

#[test]
fn format_code_is_lowercased() {
    let moov = container(b"moov", &[audio_trak(b"ALAC", 48000)]);
    let info = parse([ftyp(), moov].concat()).unwrap().media_info().clone();
    assert_eq!(info.encoding.as_deref(), Some("alac"));
    assert_eq!(info.frequency, Some(48.0));
}

#[test]
fn psp_vendor_block_supplies_title_and_encoder() {
    let tool: &[u8] = b"PSP Encoder";
    let moov = container(b"moov", &[usmt(&[(1, 1, &b"Hi"[..]), (4, 1, tool)]), mvhd(1, 1)]);
    let mp4 = parse([ftyp(), moov].concat()).unwrap();
    assert_eq!(mp4.title().as_deref(), Some("Hi"));
    assert_eq!(mp4.encoder().as_deref(), Some("PSP Encoder"));
}

#[test]
fn vendor_block_does_not_override_tags() {
    let moov = container(
        b"moov",
        &[udta(&[text_item(&c(b"nam"), "Tagged")]), usmt(&[(1, 1, &b"Hi"[..]), (2, 1, &b"ignored"[..])])],
    );
    let mp4 = parse([ftyp(), moov].concat()).unwrap();
    assert_eq!(mp4.title().as_deref(), Some("Tagged"));
    assert_eq!(mp4.encoder(), None);
}

#[test]
fn vendor_block_overrun_fails_closed() {
    let mut uuid = usmt(&[(4, 1, &b"Encoder name"[..])]);
    // first block header sits at body offset 26, i.e. atom offset 34
    uuid[34..36].copy_from_slice(&200u16.to_be_bytes());
    let bytes = [ftyp(), container(b"moov", &[uuid])].concat();
    assert!(matches!(
        parse(bytes),
        Err(ParseError::Structural(StructuralError::VendorBlock { offset: 26 }))
    ));
}

#[test]
fn other_uuid_payloads_are_ignored() {
    let body = [b"\x12\x34\x56\x78".to_vec(), vec![0u8; 40]].concat();
    let moov = container(b"moov", &[atom(b"uuid", &body), mvhd(1, 3)]);
    let mp4 = parse([ftyp(), moov].concat()).unwrap();
    assert!(mp4.tags().is_empty());
    assert_eq!(mp4.media_info().secs, Some(3));
}

#[test]
fn trace_does_not_change_results() {
    let quiet = parse(faac_like()).unwrap();
    let loud = Mp4Info::from_reader_with(Cursor::new(faac_like()), ParseOptions::default().with_trace(true)).unwrap();
    assert_eq!(quiet.tags(), loud.tags());
    assert_eq!(quiet.media_info(), loud.media_info());
}

#[test]
fn cut_off_moov_is_skipped_as_oversize() {
    let mut bytes = faac_like();
    // drop the mdat and the tail of moov
    let keep = bytes.len() - 2353 - 8 - 20;
    bytes.truncate(keep);
    let mp4 = parse(bytes).unwrap();
    assert!(mp4.tags().is_empty());
    assert_eq!(mp4.media_info().size, None);
}

#[test]
fn trailing_partial_header_is_truncated() {
    let bytes = [faac_like(), vec![0, 0, 0, 9]].concat();
    assert!(matches!(parse(bytes), Err(ParseError::Truncated)));
}
