use crate::tags::{TagKey, TagStore};
use std::fmt;
use std::str::FromStr;

/// Stream-level facts gathered from `mvhd`, `stsd` and `mdat`, plus the
/// values derived from them once the walk is over.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaInfo {
    pub version: u8,
    pub encoding: Option<String>,
    /// Sample rate in kHz.
    pub frequency: Option<f64>,
    /// Total size of all `mdat` bodies.
    pub size: Option<u64>,
    /// Rounded total duration in seconds.
    pub secs: Option<u64>,
    pub minutes: Option<u64>,
    /// Whole seconds past `minutes`, floored.
    pub seconds: Option<u64>,
    pub millis: Option<u64>,
    pub time: Option<String>,
    pub encrypted: bool,
    /// Average bitrate in kbps.
    pub bitrate: Option<u64>,
    pub copyright: bool,
    pub layer: Option<u8>,
}

/// Container "version" reported for every MP4 file.
pub const MP4_VERSION: u8 = 4;

/// Fixed scaling constant of the bitrate formula.
const BITRATE_DIVISOR: f64 = 128.0;

impl MediaInfo {
    pub fn add_media_data(&mut self, len: u64) {
        *self.size.get_or_insert(0) += len;
    }

    /// Derive the duration fields from a movie header.
    ///
    /// `time` is built from the rounded total while `seconds` is floored, so
    /// the two can disagree by one near a half-second boundary.
    pub fn set_duration(&mut self, duration: u64, timescale: u32) {
        if timescale == 0 {
            return;
        }
        let secs = duration as f64 / timescale as f64;
        let minutes = (secs / 60.0).floor();
        let rounded = secs.round();

        self.secs = Some(rounded as u64);
        self.minutes = Some(minutes as u64);
        self.seconds = Some((secs - minutes * 60.0).floor() as u64);
        self.millis = Some((1000.0 * (secs - secs.floor())).round() as u64);
        // float to int casts saturate, so an all-ones duration stays in range
        let mm = minutes as u64;
        let ss = (rounded as u64).saturating_sub(mm.saturating_mul(60));
        self.time = Some(format!("{:02}:{:02}", mm, ss));
    }

    /// Compute the derived fields. Runs once, after the whole file is walked.
    pub fn finalize(&mut self, tags: &TagStore) {
        self.version = MP4_VERSION;
        if self.frequency.is_some() {
            self.layer = Some(1);
        }
        if let (Some(size), Some(ms)) = (self.size, self.millis) {
            let minutes = self.minutes.unwrap_or(0) as f64;
            let seconds = self.seconds.unwrap_or(0) as f64;
            let span = (minutes * 60.0 + seconds + ms as f64 / 1000.0) * BITRATE_DIVISOR;
            if span > 0.0 {
                self.bitrate = Some((0.5 + size as f64 / span).floor() as u64);
            }
        }
        if tags.contains(TagKey::Cprt) {
            self.copyright = true;
        }
    }

    pub fn get(&self, key: InfoKey) -> Option<InfoValue> {
        match key {
            InfoKey::Version => Some(InfoValue::Integer(self.version as u64)),
            InfoKey::Bitrate => self.bitrate.map(InfoValue::Integer),
            InfoKey::Frequency => self.frequency.map(InfoValue::Float),
            InfoKey::Ms => self.millis.map(InfoValue::Integer),
            InfoKey::Size => self.size.map(InfoValue::Integer),
            InfoKey::Secs => self.secs.map(InfoValue::Integer),
            InfoKey::Mm => self.minutes.map(InfoValue::Integer),
            InfoKey::Ss => self.seconds.map(InfoValue::Integer),
            InfoKey::Encrypted => self.encrypted.then_some(InfoValue::Flag),
            InfoKey::Time => self.time.clone().map(InfoValue::Text),
            InfoKey::Copyright => self.copyright.then_some(InfoValue::Flag),
            InfoKey::Layer => self.layer.map(|l| InfoValue::Integer(l as u64)),
            InfoKey::Encoding => self.encoding.clone().map(InfoValue::Text),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InfoKey {
    Version,
    Bitrate,
    Frequency,
    Ms,
    Size,
    Secs,
    Mm,
    Ss,
    Encrypted,
    Time,
    Copyright,
    Layer,
    Encoding,
}

impl InfoKey {
    pub const ALL: [InfoKey; 13] = [
        InfoKey::Version, InfoKey::Bitrate, InfoKey::Frequency, InfoKey::Ms,
        InfoKey::Size, InfoKey::Secs, InfoKey::Mm, InfoKey::Ss,
        InfoKey::Encrypted, InfoKey::Time, InfoKey::Copyright, InfoKey::Layer,
        InfoKey::Encoding,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            InfoKey::Version => "VERSION",
            InfoKey::Bitrate => "BITRATE",
            InfoKey::Frequency => "FREQUENCY",
            InfoKey::Ms => "MS",
            InfoKey::Size => "SIZE",
            InfoKey::Secs => "SECS",
            InfoKey::Mm => "MM",
            InfoKey::Ss => "SS",
            InfoKey::Encrypted => "ENCRYPTED",
            InfoKey::Time => "TIME",
            InfoKey::Copyright => "COPYRIGHT",
            InfoKey::Layer => "LAYER",
            InfoKey::Encoding => "ENCODING",
        }
    }
}

impl fmt::Display for InfoKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for InfoKey {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        InfoKey::ALL
            .into_iter()
            .find(|k| k.name() == upper)
            .ok_or(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InfoValue {
    Integer(u64),
    Float(f64),
    Text(String),
    Flag,
}

impl fmt::Display for InfoValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InfoValue::Integer(v) => write!(f, "{}", v),
            InfoValue::Float(v) => write!(f, "{}", v),
            InfoValue::Text(s) => f.write_str(s),
            InfoValue::Flag => f.write_str("true"),
        }
    }
}
