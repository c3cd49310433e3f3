use crate::info::{InfoKey, InfoValue, MediaInfo};
use crate::parser::{ParseError, ParseOptions, Result, Session};
use crate::tags::{TagKey, TagStore, TagValue};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use std::str::FromStr;

/// Tags and stream information read from one MP4 file.
///
/// Built in a single pass by [`Mp4Info::from_reader`]; immutable afterwards.
///
/// # Example
/// ```no_run
/// use mp4info::{Mp4Info, TagKey};
///
/// let info = Mp4Info::open("song.m4a")?;
/// if let Some(title) = info.title() {
///     println!("{title}");
/// }
/// println!("{:?}", info.tag(TagKey::Trkn));
/// # Ok::<(), mp4info::ParseError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Mp4Info {
    tags: TagStore,
    info: MediaInfo,
}

/// Any queryable key, tag or info.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Tag(TagKey),
    Info(InfoKey),
}

impl FromStr for Field {
    type Err = ();

    /// Tag names are tried first, then info names.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.parse::<TagKey>()
            .map(Field::Tag)
            .or_else(|_| s.parse::<InfoKey>().map(Field::Info))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Tag(&'a TagValue),
    Info(InfoValue),
}

impl std::fmt::Display for FieldValue<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Tag(v) => write!(f, "{}", v),
            FieldValue::Info(v) => write!(f, "{}", v),
        }
    }
}

impl Mp4Info {
    /// Open and parse a file on disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let f = File::open(path)?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn from_reader<R: Read + Seek>(r: R) -> Result<Self> {
        Self::from_reader_with(r, ParseOptions::default())
    }

    /// Parse with explicit options.
    ///
    /// Bytes 4..8 must read `ftyp` (any case); nothing is walked otherwise.
    pub fn from_reader_with<R: Read + Seek>(mut r: R, options: ParseOptions) -> Result<Self> {
        let mut head = [0u8; 8];
        r.read_exact(&mut head)?;
        if !head[4..8].eq_ignore_ascii_case(b"ftyp") {
            return Err(ParseError::Format);
        }

        let size = r.seek(SeekFrom::End(0))?;
        r.seek(SeekFrom::Start(0))?;

        let mut session = Session::new(options);
        session.parse_container(&mut r, size, 0)?;
        let (tags, info) = session.finish();
        Ok(Self { tags, info })
    }

    pub fn tags(&self) -> &TagStore {
        &self.tags
    }

    pub fn media_info(&self) -> &MediaInfo {
        &self.info
    }

    pub fn tag(&self, key: TagKey) -> Option<&TagValue> {
        self.tags.get(key)
    }

    pub fn info(&self, key: InfoKey) -> Option<InfoValue> {
        self.info.get(key)
    }

    pub fn get(&self, field: Field) -> Option<FieldValue<'_>> {
        match field {
            Field::Tag(key) => self.tag(key).map(FieldValue::Tag),
            Field::Info(key) => self.info(key).map(FieldValue::Info),
        }
    }

    /// Look a field up by name; unknown names are simply absent.
    pub fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        self.get(name.parse().ok()?)
    }

    pub fn title(&self) -> Option<String> {
        self.text(TagKey::Nam)
    }

    pub fn artist(&self) -> Option<String> {
        self.text(TagKey::Art)
    }

    pub fn album(&self) -> Option<String> {
        self.text(TagKey::Alb)
    }

    pub fn comment(&self) -> Option<String> {
        self.text(TagKey::Cmt)
    }

    pub fn composer(&self) -> Option<String> {
        self.text(TagKey::Wrt)
    }

    pub fn year(&self) -> Option<String> {
        self.text(TagKey::Day)
    }

    pub fn encoder(&self) -> Option<String> {
        self.text(TagKey::Too)
    }

    pub fn genre(&self) -> Option<String> {
        self.text(TagKey::Gnre)
    }

    /// `(number, total)`; total is 0 when the file does not say.
    pub fn track(&self) -> Option<(i64, i64)> {
        self.tag(TagKey::Trkn).and_then(TagValue::as_pair)
    }

    pub fn disc(&self) -> Option<(i64, i64)> {
        self.tag(TagKey::Disk).and_then(TagValue::as_pair)
    }

    pub fn cover(&self) -> Option<&[u8]> {
        self.tag(TagKey::Covr).and_then(TagValue::as_bytes)
    }

    fn text(&self, key: TagKey) -> Option<String> {
        self.tag(key).and_then(TagValue::as_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_names_resolve_to_tags_before_info() {
        assert_eq!("nam".parse::<Field>(), Ok(Field::Tag(TagKey::Nam)));
        assert_eq!("TIME".parse::<Field>(), Ok(Field::Info(InfoKey::Time)));
        assert!("XYZ".parse::<Field>().is_err());
    }
}
