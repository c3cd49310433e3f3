use std::fmt;

/// Raw four-character code exactly as it appears in the file.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    pub fn as_str_lossy(&self) -> String {
        self.0
            .iter()
            .map(|&c| if (32..=126).contains(&c) { c as char } else { '.' })
            .collect()
    }
}
impl fmt::Debug for FourCC { fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.as_str_lossy()) } }
impl fmt::Display for FourCC { fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.as_str_lossy()) } }

/// Legacy copyright sign that prefixes the classic iTunes text atoms (`©nam`, `©ART`, ...).
pub const COPYRIGHT_SIGN: u8 = 0xA9;

/// Normalized atom id used by every dispatch table.
///
/// A leading `0xA9` is dropped (so `©nam` becomes `NAM`) and the rest is
/// ASCII upper-cased. The result is three or four bytes long.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct AtomId {
    bytes: [u8; 4],
    len: u8,
}

impl AtomId {
    pub fn normalize(cc: FourCC) -> Self {
        let raw = if cc.0[0] == COPYRIGHT_SIGN { &cc.0[1..] } else { &cc.0[..] };
        let mut bytes = [0u8; 4];
        for (dst, src) in bytes.iter_mut().zip(raw) {
            *dst = src.to_ascii_uppercase();
        }
        AtomId { bytes, len: raw.len() as u8 }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }
}

impl From<FourCC> for AtomId {
    fn from(cc: FourCC) -> Self {
        AtomId::normalize(cc)
    }
}

impl fmt::Display for AtomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &c in self.as_bytes() {
            let c = if (32..=126).contains(&c) { c as char } else { '.' };
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}
impl fmt::Debug for AtomId { fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self) } }

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtomHeader {
    pub id: AtomId,
    pub raw: FourCC,
    pub body_size: u64,   // bytes following the header
    pub header_len: u64,  // 8, or 16 with an extended size
}

/// What the header codec tells the walker to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderOutcome {
    /// A well-formed header; the source sits at the start of the body.
    Atom(AtomHeader),
    /// The declared size runs past the enclosing container. The walker skips
    /// to the container end without decoding.
    Oversize { id: AtomId, header_len: u64 },
}
