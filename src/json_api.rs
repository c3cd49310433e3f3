use crate::api::Mp4Info;
use crate::info::{InfoKey, InfoValue};
use crate::parser::ParseOptions;
use crate::tags::{TagKey, TagValue};
use crate::util::hex_preview;
use anyhow::Context;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Bytes of a binary value shown in the JSON preview.
const BINARY_PREVIEW: usize = 16;

/// A JSON-serializable summary of one parse, used by the `mp4info` binary
/// and by anything that wants the result as plain data.
#[derive(Debug, Serialize)]
pub struct Report {
    pub file: String,
    /// Present tags keyed by canonical name.
    pub tags: BTreeMap<&'static str, JsonValue>,
    /// Present info fields keyed by canonical name.
    pub info: BTreeMap<&'static str, JsonValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JsonValue {
    Text(String),
    Integer(i64),
    Pair([i64; 2]),
    Float(f64),
    Flag(bool),
    Binary { bytes: usize, preview: String },
}

impl From<&TagValue> for JsonValue {
    fn from(v: &TagValue) -> Self {
        match v {
            TagValue::Text(b) => JsonValue::Text(String::from_utf8_lossy(b).into_owned()),
            TagValue::Binary(b) => JsonValue::Binary {
                bytes: b.len(),
                preview: hex_preview(b, BINARY_PREVIEW),
            },
            TagValue::Integer(i) => JsonValue::Integer(*i),
            TagValue::IntegerPair(a, b) => JsonValue::Pair([*a, *b]),
            TagValue::Genre(g) => JsonValue::Text((*g).to_string()),
        }
    }
}

impl From<InfoValue> for JsonValue {
    fn from(v: InfoValue) -> Self {
        match v {
            InfoValue::Integer(i) => JsonValue::Integer(i as i64),
            InfoValue::Float(f) => JsonValue::Float(f),
            InfoValue::Text(s) => JsonValue::Text(s),
            InfoValue::Flag => JsonValue::Flag(true),
        }
    }
}

/// Build a report from an already parsed file.
pub fn report(file: impl Into<String>, mp4: &Mp4Info) -> Report {
    let tags = TagKey::ALL
        .into_iter()
        .filter_map(|k| mp4.tag(k).map(|v| (k.name(), JsonValue::from(v))))
        .collect();
    let info = InfoKey::ALL
        .into_iter()
        .filter_map(|k| mp4.info(k).map(|v| (k.name(), JsonValue::from(v))))
        .collect();
    Report { file: file.into(), tags, info }
}

/// Open, parse and summarize a file in one go.
pub fn analyze_file(path: impl AsRef<Path>, options: ParseOptions) -> anyhow::Result<Report> {
    let path = path.as_ref();
    let f = std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mp4 = Mp4Info::from_reader_with(std::io::BufReader::new(f), options)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(report(path.display().to_string(), &mp4))
}
