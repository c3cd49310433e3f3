use crate::known_atoms::Special;
use crate::parser::{Result, Session, StructuralError, indent};
use crate::tags::{TagKey, TagValue};
use crate::util::{read_body, skip};
use byteorder::{BigEndian, ByteOrder, ReadBytesExt};
use std::io::{Cursor, Read, Seek, SeekFrom};
use tracing::debug;

/// Sample entry formats that mark an audio track.
const AUDIO_FORMATS: [&[u8; 4]; 7] = [b"mp4a", b"drms", b"samr", b"sawb", b"sawp", b"enca", b"alac"];

const MVHD_MIN: u64 = 32;
const STSD_MIN: u64 = 44;
const META_PREFIX: u64 = 4;
const UUID_MIN: usize = 27;
const VENDOR_BLOCK_HEADER: usize = 10;

// 16.16 fixed point sample rate, reported in kHz
const FREQUENCY_SCALE: f64 = 65_536_000.0;

// Each handler is entered with the source at the first body byte and must
// leave it exactly `len` bytes further on.
impl Session {
    pub(crate) fn parse_special<R: Read + Seek>(
        &mut self,
        special: Special,
        r: &mut R,
        len: u64,
        depth: usize,
    ) -> Result<()> {
        match special {
            Special::Moov => self.parse_moov(r, len, depth),
            Special::Mdat => self.parse_mdat(r, len),
            Special::Meta => self.parse_meta(r, len, depth),
            Special::Mvhd => self.parse_mvhd(r, len, depth),
            Special::Stsd => self.parse_stsd(r, len, depth),
            Special::Uuid => self.parse_uuid(r, len, depth),
        }
    }

    /// Walk the movie box from an owned copy of its body.
    fn parse_moov<R: Read>(&mut self, r: &mut R, len: u64, depth: usize) -> Result<()> {
        let mut moov = Cursor::new(read_body(r, len)?);
        self.parse_container(&mut moov, len, depth + 1)
    }

    fn parse_mdat<R: Seek>(&mut self, r: &mut R, len: u64) -> Result<()> {
        self.info.add_media_data(len);
        skip(r, len)
    }

    fn parse_meta<R: Read + Seek>(&mut self, r: &mut R, len: u64, depth: usize) -> Result<()> {
        if len < META_PREFIX {
            return Err(StructuralError::BodyTooShort { atom: "meta", len, min: META_PREFIX }.into());
        }
        // version + flags
        r.seek(SeekFrom::Current(META_PREFIX as i64))?;
        self.parse_container(r, len - META_PREFIX, depth + 1)
    }

    fn parse_mvhd<R: Read>(&mut self, r: &mut R, len: u64, depth: usize) -> Result<()> {
        if len < MVHD_MIN {
            return Err(StructuralError::BodyTooShort { atom: "mvhd", len, min: MVHD_MIN }.into());
        }
        let buf = read_body(r, len)?;
        let mut cur = Cursor::new(&buf);

        let version = cur.read_u8()?;
        cur.set_position(4);
        let (timescale, duration) = match version {
            0 => {
                let _creation = cur.read_u32::<BigEndian>()?;
                let _modification = cur.read_u32::<BigEndian>()?;
                let ts = cur.read_u32::<BigEndian>()?;
                (ts, cur.read_u32::<BigEndian>()? as u64)
            }
            1 => {
                let _creation = cur.read_u64::<BigEndian>()?;
                let _modification = cur.read_u64::<BigEndian>()?;
                let ts = cur.read_u32::<BigEndian>()?;
                (ts, cur.read_u64::<BigEndian>()?)
            }
            _ => return Ok(()),
        };

        if self.options.trace {
            debug!(depth, "{}  duration/scale={}/{}", indent(depth), duration, timescale);
        }
        self.info.set_duration(duration, timescale);
        Ok(())
    }

    fn parse_stsd<R: Read>(&mut self, r: &mut R, len: u64, depth: usize) -> Result<()> {
        if len < STSD_MIN {
            return Err(StructuralError::BodyTooShort { atom: "stsd", len, min: STSD_MIN }.into());
        }
        let buf = read_body(r, len)?;
        let format = buf[12..16].to_ascii_lowercase();

        if self.options.trace {
            debug!(depth, "{}  sample={}", indent(depth), String::from_utf8_lossy(&buf[12..16]));
        }

        if AUDIO_FORMATS.iter().any(|f| f[..] == format[..]) {
            let frequency = BigEndian::read_u32(&buf[40..44]) as f64 / FREQUENCY_SCALE;
            if self.options.trace {
                debug!(depth, "{}  frequency={}", indent(depth), frequency);
            }
            self.info.encoding = Some(String::from_utf8_lossy(&format).into_owned());
            self.info.frequency = Some(frequency);
        }

        if format == b"drms" || format.starts_with(b"enc") {
            self.info.encrypted = true;
        }
        Ok(())
    }

    /// Vendor extension box. Only the PSP `USMT`/`MTDT` layout is read; any
    /// other payload is consumed and ignored.
    fn parse_uuid<R: Read>(&mut self, r: &mut R, len: u64, depth: usize) -> Result<()> {
        let buf = read_body(r, len)?;
        if buf.len() < UUID_MIN {
            return Ok(());
        }
        if self.options.trace {
            debug!(depth, "{}  vendor={}", indent(depth), hex::encode(&buf[..16]));
        }
        if &buf[0..4] != b"USMT" {
            return Ok(());
        }
        let inner_size = BigEndian::read_u32(&buf[16..20]) as u64;
        if inner_size != len - 16 || &buf[20..24] != b"MTDT" {
            return Ok(());
        }

        let count = BigEndian::read_u16(&buf[24..26]);
        let mut offset = 26;
        for _ in 0..count {
            let block = &buf[offset..];
            if block.len() < VENDOR_BLOCK_HEADER {
                return Err(StructuralError::VendorBlock { offset }.into());
            }
            let size = BigEndian::read_u16(&block[0..2]) as usize;
            let kind = BigEndian::read_u32(&block[2..6]);
            let _flags = BigEndian::read_u16(&block[6..8]);
            let param = BigEndian::read_u16(&block[8..10]);
            if size < VENDOR_BLOCK_HEADER || size > block.len() {
                return Err(StructuralError::VendorBlock { offset }.into());
            }

            let value = || TagValue::Text(block[VENDOR_BLOCK_HEADER..size].to_vec());
            match (kind, param) {
                (1, 1) if size == 12 => {
                    self.tags.set_if_absent(TagKey::Nam, value());
                }
                (4, 1) if size > 12 => {
                    self.tags.set_if_absent(TagKey::Too, value());
                }
                _ => {}
            }
            offset += size;
        }
        Ok(())
    }
}
