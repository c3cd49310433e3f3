use crate::atoms::AtomId;
use crate::tags::TagKey;

/// Atoms that need a dedicated handler rather than generic treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Special {
    Moov,
    Mdat,
    Meta,
    Mvhd,
    Stsd,
    Uuid,
}

impl Special {
    pub fn full_name(&self) -> &'static str {
        match self {
            Special::Moov => "Movie Box",
            Special::Mdat => "Media Data Box",
            Special::Meta => "Meta Box",
            Special::Mvhd => "Movie Header Box",
            Special::Stsd => "Sample Description Box",
            Special::Uuid => "User Extension Box",
        }
    }
}

/// How the walker treats an atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtomClass {
    /// Body is a sequence of child atoms.
    Container,
    /// Body carries a tag value.
    TagData(TagKey),
    Special(Special),
    /// Skipped unread.
    Opaque,
}

/// Classify a normalized atom id.
///
/// Tag atoms win over special handlers, which win over plain containers, so
/// `MOOV` goes through its handler rather than straight recursion.
pub fn classify(id: &AtomId) -> AtomClass {
    let id = id.as_bytes();
    if let Some(key) = TagKey::from_id(id) {
        return AtomClass::TagData(key);
    }
    if let Some(special) = special_for(id) {
        return AtomClass::Special(special);
    }
    if is_container(id) {
        return AtomClass::Container;
    }
    AtomClass::Opaque
}

fn special_for(id: &[u8]) -> Option<Special> {
    Some(match id {
        b"MOOV" => Special::Moov,
        b"MDAT" => Special::Mdat,
        b"META" => Special::Meta,
        b"MVHD" => Special::Mvhd,
        b"STSD" => Special::Stsd,
        b"UUID" => Special::Uuid,
        _ => return None,
    })
}

fn is_container(id: &[u8]) -> bool {
    matches!(
        id,
        b"ILST" | b"MDIA" | b"MINF" | b"MOOV" | b"STBL" | b"TRAK" | b"UDTA"
    )
}
