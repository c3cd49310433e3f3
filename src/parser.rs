use crate::atoms::{AtomHeader, AtomId, FourCC, HeaderOutcome};
use crate::data::{DataAtom, parse_data};
use crate::info::MediaInfo;
use crate::known_atoms::{AtomClass, classify};
use crate::tags::TagStore;
use crate::util::{read_body, skip};
use byteorder::{BigEndian, ReadBytesExt};
use std::io::{Read, Seek, SeekFrom};
use tracing::debug;

#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("io: {0}")]
    Io(#[source] std::io::Error),
    #[error("not an MP4 file: no `ftyp` signature at offset 4")]
    Format,
    #[error("premature end of data")]
    Truncated,
    #[error("parse error: {0}")]
    Structural(#[from] StructuralError),
}

impl From<std::io::Error> for ParseError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            ParseError::Truncated
        } else {
            ParseError::Io(e)
        }
    }
}

/// Ways the atom tree can be inconsistent with itself.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    #[error("container should end at {expected} but children ended at {actual}")]
    ContainerEnd { expected: u64, actual: u64 },
    #[error("atom `{0}` declares a size smaller than its header")]
    NegativeSize(AtomId),
    #[error("`{atom}` body is {len} bytes, at least {min} required")]
    BodyTooShort { atom: &'static str, len: u64, min: u64 },
    #[error("vendor metadata block at {offset} overruns its buffer")]
    VendorBlock { offset: usize },
    #[error("atoms nested deeper than {0} levels")]
    TooDeep(usize),
}

pub type Result<T> = std::result::Result<T, ParseError>;

/// Knobs for a single parse. Nothing here changes the parsed values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Emit a `tracing` debug event for every atom visited.
    pub trace: bool,
    /// Deepest container nesting accepted before giving up.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { trace: false, max_depth: 64 }
    }
}

impl ParseOptions {
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Decode the header at the current position.
///
/// `parent_remaining` is the number of bytes left in the enclosing container,
/// counted from the start of this header. On `HeaderOutcome::Atom` the source
/// sits at the first body byte.
pub fn read_atom_header<R: Read + Seek>(r: &mut R, parent_remaining: u64) -> Result<HeaderOutcome> {
    let size32 = r.read_u32::<BigEndian>()?;
    let mut typ = [0u8; 4];
    r.read_exact(&mut typ)?;
    let raw = FourCC(typ);
    let id = AtomId::normalize(raw);

    let (total, header_len) = match size32 {
        0 => {
            // runs to the end of the source, not of the parent
            let body_start = r.stream_position()?;
            let end = r.seek(SeekFrom::End(0))?;
            r.seek(SeekFrom::Start(body_start))?;
            let body_size = end.saturating_sub(body_start);
            return Ok(HeaderOutcome::Atom(AtomHeader { id, raw, body_size, header_len: 8 }));
        }
        1 => (r.read_u64::<BigEndian>()?, 16),
        n => (n as u64, 8),
    };

    if total > parent_remaining {
        return Ok(HeaderOutcome::Oversize { id, header_len });
    }
    let body_size = total
        .checked_sub(header_len)
        .ok_or(StructuralError::NegativeSize(id))?;

    Ok(HeaderOutcome::Atom(AtomHeader { id, raw, body_size, header_len }))
}

/// One pass over a source, owning everything it collects.
#[derive(Debug, Default)]
pub struct Session {
    pub(crate) tags: TagStore,
    pub(crate) info: MediaInfo,
    pub(crate) options: ParseOptions,
}

impl Session {
    pub fn new(options: ParseOptions) -> Self {
        Self { tags: TagStore::new(), info: MediaInfo::default(), options }
    }

    pub fn tags(&self) -> &TagStore {
        &self.tags
    }

    pub fn info(&self) -> &MediaInfo {
        &self.info
    }

    /// Walk `size` bytes of sibling atoms starting at the current position.
    ///
    /// Every child must consume exactly what it declared: the position after
    /// the last child has to be the computed container end.
    pub fn parse_container<R: Read + Seek>(&mut self, r: &mut R, size: u64, depth: usize) -> Result<()> {
        if depth > self.options.max_depth {
            return Err(StructuralError::TooDeep(self.options.max_depth).into());
        }
        let end = r.stream_position()?.saturating_add(size);

        let mut pos = r.stream_position()?;
        while pos < end {
            self.parse_atom(r, depth, end - pos)?;
            pos = r.stream_position()?;
        }

        if pos != end {
            return Err(StructuralError::ContainerEnd { expected: end, actual: pos }.into());
        }
        Ok(())
    }

    fn parse_atom<R: Read + Seek>(&mut self, r: &mut R, depth: usize, parent_remaining: u64) -> Result<()> {
        let start = r.stream_position()?;
        let hdr = match read_atom_header(r, parent_remaining)? {
            HeaderOutcome::Atom(hdr) => hdr,
            HeaderOutcome::Oversize { id, .. } => {
                if self.options.trace {
                    debug!(depth, "{}{}: oversized, skipping {} bytes", indent(depth), id, parent_remaining);
                }
                r.seek(SeekFrom::Start(start + parent_remaining))?;
                return Ok(());
            }
        };

        let class = classify(&hdr.id);
        if self.options.trace {
            match class {
                AtomClass::Special(special) => debug!(
                    depth,
                    "{}{} ({}): {} bytes",
                    indent(depth),
                    hdr.raw,
                    special.full_name(),
                    hdr.body_size
                ),
                _ => debug!(depth, "{}{}: {} bytes", indent(depth), hdr.raw, hdr.body_size),
            }
        }

        match class {
            AtomClass::TagData(key) => {
                let body = read_body(r, hdr.body_size)?;
                parse_data(DataAtom::Tag(key), &body, &mut self.tags, self.options.trace);
            }
            AtomClass::Special(special) => self.parse_special(special, r, hdr.body_size, depth)?,
            AtomClass::Container => self.parse_container(r, hdr.body_size, depth + 1)?,
            AtomClass::Opaque => skip(r, hdr.body_size)?,
        }
        Ok(())
    }

    /// Derive the summary fields and hand over the results.
    pub fn finish(mut self) -> (TagStore, MediaInfo) {
        self.info.finalize(&self.tags);
        (self.tags, self.info)
    }
}

pub(crate) fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}
