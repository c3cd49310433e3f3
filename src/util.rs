use crate::parser::{ParseError, Result};
use std::io::{Read, Seek, SeekFrom};

/// Read exactly `len` bytes from the current position.
///
/// Goes through `take` so a bogus length cannot trigger a huge up-front
/// allocation; a short read is `ParseError::Truncated`.
pub fn read_body<R: Read>(r: &mut R, len: u64) -> Result<Vec<u8>> {
    let mut v = Vec::new();
    let got = r.by_ref().take(len).read_to_end(&mut v)?;
    if got as u64 != len {
        return Err(ParseError::Truncated);
    }
    Ok(v)
}

/// Move `len` bytes forward without reading them.
pub fn skip<R: Seek>(r: &mut R, len: u64) -> Result<()> {
    let pos = r.stream_position()?;
    r.seek(SeekFrom::Start(pos.saturating_add(len)))?;
    Ok(())
}

/// Hex of at most the first `max` bytes, with a trailing `..` when cut short.
pub fn hex_preview(bytes: &[u8], max: usize) -> String {
    if bytes.len() <= max {
        hex::encode(bytes)
    } else {
        format!("{}..", hex::encode(&bytes[..max]))
    }
}
