//! Decoding of tag atom bodies into [`TagValue`]s.
//!
//! Three body layouts are understood:
//! - 3GPP text atoms (`titl`, `dscp`, `perf`, `auth`, `cprt`, `gnre` with a
//!   version 0 header), mapped onto their iTunes equivalents;
//! - parts of a freeform item (`mean`, `name`, `data`);
//! - everything else: a `data` sub-box whose well-known type says how to read
//!   the payload.

use crate::genres::genre_name;
use crate::tags::{TagKey, TagStore, TagValue};
use byteorder::{BigEndian, ByteOrder};
use tracing::debug;

/// Well-known type codes carried in the low byte of a `data` box type field.
pub mod well_known {
    pub const IMPLICIT: u8 = 0;
    pub const UTF8: u8 = 1;
    pub const JPEG: u8 = 13;
    pub const PNG: u8 = 14;
    pub const BE_SIGNED_INT: u8 = 21;
}

/// `size` + `data` + type + locale.
const DATA_BOX_HEADER: usize = 16;
/// Version/flags + language, followed by the text and a NUL.
const LEGACY_PREFIX: usize = 6;

/// The atom whose body is being decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataAtom {
    Tag(TagKey),
    /// Freeform namespace (`mean`).
    Mean,
    /// Freeform key (`name`).
    Name,
    /// Bare `data` payload belonging to the given tag.
    Data(TagKey),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Write {
    Replace,
    IfAbsent,
}

/// Decode `body` and record the result in `tags`.
///
/// Bodies that do not match any known layout leave `tags` untouched.
pub fn parse_data(atom: DataAtom, body: &[u8], tags: &mut TagStore, trace: bool) {
    let key = match atom {
        DataAtom::Mean | DataAtom::Name => return,
        DataAtom::Data(key) => {
            tags.set(key, TagValue::Binary(body.get(8..).unwrap_or_default().to_vec()));
            return;
        }
        DataAtom::Tag(key) => key,
    };

    let decoded = match legacy_text(key, body) {
        Some(legacy) => legacy,
        None => match data_box(body) {
            Some((kind, payload)) => {
                if trace {
                    debug!("    {}: type={} size={}", key, kind, payload.len());
                }
                decode_typed(key, kind, payload)
            }
            None => None,
        },
    };

    match decoded {
        Some((key, value, Write::Replace)) => tags.set(key, value),
        Some((key, value, Write::IfAbsent)) => {
            tags.set_if_absent(key, value);
        }
        None => {}
    }
}

fn is_legacy(key: TagKey) -> bool {
    matches!(
        key,
        TagKey::Titl | TagKey::Dscp | TagKey::Cprt | TagKey::Perf | TagKey::Auth | TagKey::Gnre
    )
}

/// 3GPP text form. Returns `None` when the body is not in that form, so the
/// caller falls back to the `data` sub-box.
fn legacy_text(key: TagKey, body: &[u8]) -> Option<Option<(TagKey, TagValue, Write)>> {
    if !is_legacy(key) || body.len() < 4 || BigEndian::read_u32(body) != 0 {
        return None;
    }
    if body.len() <= LEGACY_PREFIX + 1 {
        return Some(None);
    }
    let text = body[LEGACY_PREFIX..body.len() - 1].to_vec();
    let key = match key {
        TagKey::Titl => TagKey::Nam,
        TagKey::Dscp => TagKey::Cmt,
        TagKey::Perf => TagKey::Art,
        TagKey::Auth => TagKey::Wrt,
        other => other,
    };
    Some(Some((key, TagValue::Text(text), Write::IfAbsent)))
}

/// Split a `data` sub-box into its well-known type and payload.
fn data_box(body: &[u8]) -> Option<(u8, &[u8])> {
    if body.len() <= DATA_BOX_HEADER {
        return None;
    }
    let declared = BigEndian::read_u32(&body[0..4]) as usize;
    if !body[4..8].eq_ignore_ascii_case(b"data") || declared <= DATA_BOX_HEADER {
        return None;
    }
    let kind = (BigEndian::read_u32(&body[8..12]) & 0xff) as u8;
    let end = declared.min(body.len());
    Some((kind, &body[DATA_BOX_HEADER..end]))
}

fn decode_typed(key: TagKey, kind: u8, payload: &[u8]) -> Option<(TagKey, TagValue, Write)> {
    if key == TagKey::Covr {
        return Some((key, TagValue::Binary(payload.to_vec()), Write::Replace));
    }

    match kind {
        well_known::IMPLICIT => implicit(key, payload).map(|v| (key, v, Write::Replace)),
        well_known::UTF8 => text(key, payload),
        well_known::BE_SIGNED_INT => {
            let value = match payload.len() {
                1 => TagValue::Integer(payload[0] as i64),
                2 => TagValue::Integer(BigEndian::read_u16(payload) as i64),
                4 => TagValue::Integer(BigEndian::read_u32(payload) as i64),
                // values past i64::MAX keep their bytes rather than turn negative
                8 => i64::try_from(BigEndian::read_u64(payload))
                    .map(TagValue::Integer)
                    .unwrap_or_else(|_| TagValue::Binary(payload.to_vec())),
                _ => TagValue::Binary(payload.to_vec()),
            };
            Some((key, value, Write::Replace))
        }
        well_known::JPEG | well_known::PNG => {
            Some((key, TagValue::Binary(payload.to_vec()), Write::Replace))
        }
        _ => None,
    }
}

/// Type 0: a run of big-endian 16-bit values.
fn implicit(key: TagKey, payload: &[u8]) -> Option<TagValue> {
    let ints: Vec<u16> = payload.chunks_exact(2).map(BigEndian::read_u16).collect();
    match key {
        TagKey::Gnre => ints.first().and_then(|&i| genre_name(i)).map(TagValue::Genre),
        TagKey::Disk | TagKey::Trkn if payload.len() >= 4 => {
            let total = if payload.len() >= 6 { ints[2] } else { 0 };
            Some(TagValue::IntegerPair(ints[1] as i64, total as i64))
        }
        TagKey::Disk | TagKey::Trkn => None,
        _ if payload.len() >= 4 => Some(TagValue::Integer(ints[1] as i64)),
        _ => None,
    }
}

fn text(key: TagKey, payload: &[u8]) -> Option<(TagKey, TagValue, Write)> {
    match key {
        TagKey::Gen => Some((TagKey::Gnre, TagValue::Text(payload.to_vec()), Write::IfAbsent)),
        TagKey::Aart => Some((TagKey::Art, TagValue::Text(payload.to_vec()), Write::IfAbsent)),
        TagKey::Day => {
            let year = &payload[..payload.len().min(4)];
            if year.iter().all(|&b| b == 0) {
                return None;
            }
            Some((key, TagValue::Text(year.to_vec()), Write::Replace))
        }
        _ => Some((key, TagValue::Text(payload.to_vec()), Write::Replace)),
    }
}
