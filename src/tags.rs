use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Canonical tag keys. Anything else found in the file is not a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TagKey {
    Aart,
    Alb,
    Art,
    Cmt,
    Covr,
    Cpil,
    Cprt,
    Day,
    Disk,
    Gen,
    Gnre,
    Grp,
    Nam,
    Rtng,
    Tmpo,
    Too,
    Trkn,
    Wrt,
    Apid,
    Akid,
    Atid,
    Cnid,
    Geid,
    Plid,

    // 3GPP forms; version 0 bodies are remapped onto NAM/CMT/ART/WRT
    Titl,
    Dscp,
    Perf,
    Auth,
}

impl TagKey {
    pub const ALL: [TagKey; 28] = [
        TagKey::Aart, TagKey::Alb, TagKey::Art, TagKey::Cmt,
        TagKey::Covr, TagKey::Cpil, TagKey::Cprt, TagKey::Day,
        TagKey::Disk, TagKey::Gen, TagKey::Gnre, TagKey::Grp,
        TagKey::Nam, TagKey::Rtng, TagKey::Tmpo, TagKey::Too,
        TagKey::Trkn, TagKey::Wrt, TagKey::Apid, TagKey::Akid,
        TagKey::Atid, TagKey::Cnid, TagKey::Geid, TagKey::Plid,
        TagKey::Titl, TagKey::Dscp, TagKey::Perf, TagKey::Auth,
    ];

    /// Map a normalized atom id onto its tag key.
    pub fn from_id(id: &[u8]) -> Option<TagKey> {
        Some(match id {
            b"AART" => TagKey::Aart,
            b"ALB" => TagKey::Alb,
            b"ART" => TagKey::Art,
            b"CMT" => TagKey::Cmt,
            b"COVR" => TagKey::Covr,
            b"CPIL" => TagKey::Cpil,
            b"CPRT" => TagKey::Cprt,
            b"DAY" => TagKey::Day,
            b"DISK" => TagKey::Disk,
            b"GEN" => TagKey::Gen,
            b"GNRE" => TagKey::Gnre,
            b"GRP" => TagKey::Grp,
            b"NAM" => TagKey::Nam,
            b"RTNG" => TagKey::Rtng,
            b"TMPO" => TagKey::Tmpo,
            b"TOO" => TagKey::Too,
            b"TRKN" => TagKey::Trkn,
            b"WRT" => TagKey::Wrt,
            b"APID" => TagKey::Apid,
            b"AKID" => TagKey::Akid,
            b"ATID" => TagKey::Atid,
            b"CNID" => TagKey::Cnid,
            b"GEID" => TagKey::Geid,
            b"PLID" => TagKey::Plid,
            b"TITL" => TagKey::Titl,
            b"DSCP" => TagKey::Dscp,
            b"PERF" => TagKey::Perf,
            b"AUTH" => TagKey::Auth,
            _ => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            TagKey::Aart => "AART",
            TagKey::Alb => "ALB",
            TagKey::Art => "ART",
            TagKey::Cmt => "CMT",
            TagKey::Covr => "COVR",
            TagKey::Cpil => "CPIL",
            TagKey::Cprt => "CPRT",
            TagKey::Day => "DAY",
            TagKey::Disk => "DISK",
            TagKey::Gen => "GEN",
            TagKey::Gnre => "GNRE",
            TagKey::Grp => "GRP",
            TagKey::Nam => "NAM",
            TagKey::Rtng => "RTNG",
            TagKey::Tmpo => "TMPO",
            TagKey::Too => "TOO",
            TagKey::Trkn => "TRKN",
            TagKey::Wrt => "WRT",
            TagKey::Apid => "APID",
            TagKey::Akid => "AKID",
            TagKey::Atid => "ATID",
            TagKey::Cnid => "CNID",
            TagKey::Geid => "GEID",
            TagKey::Plid => "PLID",
            TagKey::Titl => "TITL",
            TagKey::Dscp => "DSCP",
            TagKey::Perf => "PERF",
            TagKey::Auth => "AUTH",
        }
    }

    /// Human-readable description, used by the CLI.
    pub fn full_name(&self) -> &'static str {
        match self {
            TagKey::Aart => "Album Artist",
            TagKey::Alb => "Album",
            TagKey::Art => "Artist",
            TagKey::Cmt => "Comment",
            TagKey::Covr => "Cover Art",
            TagKey::Cpil => "Compilation",
            TagKey::Cprt => "Copyright",
            TagKey::Day => "Year",
            TagKey::Disk => "Disc Number",
            TagKey::Gen => "Custom Genre",
            TagKey::Gnre => "Genre",
            TagKey::Grp => "Grouping",
            TagKey::Nam => "Title",
            TagKey::Rtng => "Rating",
            TagKey::Tmpo => "Tempo",
            TagKey::Too => "Encoder",
            TagKey::Trkn => "Track Number",
            TagKey::Wrt => "Composer",
            TagKey::Apid => "Apple Store Account",
            TagKey::Akid => "Apple Store Account Type",
            TagKey::Atid => "Artist Id",
            TagKey::Cnid => "Catalog Id",
            TagKey::Geid => "Genre Id",
            TagKey::Plid => "Playlist Id",
            TagKey::Titl => "Title (3GPP)",
            TagKey::Dscp => "Description (3GPP)",
            TagKey::Perf => "Performer (3GPP)",
            TagKey::Auth => "Author (3GPP)",
        }
    }
}

impl fmt::Display for TagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TagKey {
    type Err = ();

    /// Case-insensitive lookup by canonical name (`"nam"`, `"TRKN"`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TagKey::from_id(s.to_ascii_uppercase().as_bytes()).ok_or(())
    }
}

/// A decoded tag value.
///
/// Text is kept as the bytes found in the file; no character set is assumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValue {
    Text(Vec<u8>),
    Binary(Vec<u8>),
    Integer(i64),
    IntegerPair(i64, i64),
    Genre(&'static str),
}

impl TagValue {
    /// Lossy rendering of a text value.
    pub fn as_text(&self) -> Option<String> {
        match self {
            TagValue::Text(b) => Some(String::from_utf8_lossy(b).into_owned()),
            TagValue::Genre(g) => Some((*g).to_string()),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            TagValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_pair(&self) -> Option<(i64, i64)> {
        match self {
            TagValue::IntegerPair(a, b) => Some((*a, *b)),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            TagValue::Text(b) | TagValue::Binary(b) => Some(b),
            _ => None,
        }
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Text(b) => write!(f, "{}", String::from_utf8_lossy(b)),
            TagValue::Binary(b) => write!(f, "<{} bytes>", b.len()),
            TagValue::Integer(v) => write!(f, "{}", v),
            TagValue::IntegerPair(a, b) => write!(f, "{}/{}", a, b),
            TagValue::Genre(g) => f.write_str(g),
        }
    }
}

/// Tags collected during a parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagStore {
    map: BTreeMap<TagKey, TagValue>,
}

impl TagStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: TagKey) -> Option<&TagValue> {
        self.map.get(&key)
    }

    pub fn contains(&self, key: TagKey) -> bool {
        self.map.contains_key(&key)
    }

    /// Store the value decoded from a key's own atom.
    pub fn set(&mut self, key: TagKey, value: TagValue) {
        self.map.insert(key, value);
    }

    /// Store a legacy or aliased value; dropped when the key already holds one.
    /// Returns whether the value was stored.
    pub fn set_if_absent(&mut self, key: TagKey, value: TagValue) -> bool {
        if self.map.contains_key(&key) {
            return false;
        }
        self.map.insert(key, value);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (TagKey, &TagValue)> {
        self.map.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
