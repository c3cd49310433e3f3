#![allow(dead_code)]

/// A plain atom: 32-bit size, four-character type, body.
pub fn atom(typ: &[u8; 4], body: &[u8]) -> Vec<u8> {
    let mut v = Vec::new();
    v.extend_from_slice(&((body.len() + 8) as u32).to_be_bytes());
    v.extend_from_slice(typ);
    v.extend_from_slice(body);
    v
}

/// An atom using the 64-bit extended size form.
pub fn atom64(typ: &[u8; 4], body: &[u8]) -> Vec<u8> {
    let mut v = Vec::new();
    v.extend_from_slice(&1u32.to_be_bytes());
    v.extend_from_slice(typ);
    v.extend_from_slice(&((body.len() + 16) as u64).to_be_bytes());
    v.extend_from_slice(body);
    v
}

/// An atom whose header declares `size` regardless of the body length.
pub fn atom_sized(size: u32, typ: &[u8; 4], body: &[u8]) -> Vec<u8> {
    let mut v = Vec::new();
    v.extend_from_slice(&size.to_be_bytes());
    v.extend_from_slice(typ);
    v.extend_from_slice(body);
    v
}

pub fn container(typ: &[u8; 4], children: &[Vec<u8>]) -> Vec<u8> {
    atom(typ, &children.concat())
}

/// `data` sub-box with the given well-known type.
pub fn data_box(kind: u32, payload: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&kind.to_be_bytes());
    body.extend_from_slice(&[0, 0, 0, 0]); // locale
    body.extend_from_slice(payload);
    atom(b"data", &body)
}

/// An iTunes item atom (`©nam`, `trkn`, ...) wrapping one `data` box.
pub fn item(typ: &[u8; 4], kind: u32, payload: &[u8]) -> Vec<u8> {
    atom(typ, &data_box(kind, payload))
}

pub fn text_item(typ: &[u8; 4], text: &str) -> Vec<u8> {
    item(typ, 1, text.as_bytes())
}

/// `©xxx` item id.
pub fn c(name: &[u8; 3]) -> [u8; 4] {
    [0xA9, name[0], name[1], name[2]]
}

/// 3GPP text atom (`titl`, `perf`, ...): version 0, language, text, NUL.
pub fn legacy(typ: &[u8; 4], text: &str) -> Vec<u8> {
    let mut body = vec![0, 0, 0, 0, 0x15, 0xc7];
    body.extend_from_slice(text.as_bytes());
    body.push(0);
    atom(typ, &body)
}

pub fn ftyp() -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(b"M4A ");
    body.extend_from_slice(&0u32.to_be_bytes());
    body.extend_from_slice(b"M4A isom");
    atom(b"ftyp", &body)
}

/// Version 0 movie header with the given timescale and duration.
pub fn mvhd(timescale: u32, duration: u32) -> Vec<u8> {
    let mut body = vec![0u8; 100];
    body[12..16].copy_from_slice(&timescale.to_be_bytes());
    body[16..20].copy_from_slice(&duration.to_be_bytes());
    atom(b"mvhd", &body)
}

/// Version 1 movie header.
pub fn mvhd_v1(timescale: u32, duration: u64) -> Vec<u8> {
    let mut body = vec![0u8; 112];
    body[0] = 1;
    body[20..24].copy_from_slice(&timescale.to_be_bytes());
    body[24..32].copy_from_slice(&duration.to_be_bytes());
    atom(b"mvhd", &body)
}

/// Sample description with one entry of `format` at `rate` Hz.
pub fn stsd(format: &[u8; 4], rate: u16) -> Vec<u8> {
    let mut body = vec![0u8; 52];
    body[4..8].copy_from_slice(&1u32.to_be_bytes()); // entry count
    body[8..12].copy_from_slice(&36u32.to_be_bytes()); // entry size
    body[12..16].copy_from_slice(format);
    body[40..42].copy_from_slice(&rate.to_be_bytes()); // 16.16 integer part
    atom(b"stsd", &body)
}

/// moov > trak > mdia > minf > stbl > stsd
pub fn audio_trak(format: &[u8; 4], rate: u16) -> Vec<u8> {
    let stbl = container(b"stbl", &[stsd(format, rate)]);
    let minf = container(b"minf", &[stbl]);
    let mdia = container(b"mdia", &[minf]);
    container(b"trak", &[mdia])
}

/// udta > meta > ilst with the given items.
pub fn udta(items: &[Vec<u8>]) -> Vec<u8> {
    let ilst = container(b"ilst", items);
    let mut meta_body = vec![0, 0, 0, 0];
    meta_body.extend_from_slice(&ilst);
    container(b"udta", &[atom(b"meta", &meta_body)])
}

/// PSP style `uuid` box with the given (type, param type, value) blocks.
pub fn usmt(blocks: &[(u32, u16, &[u8])]) -> Vec<u8> {
    let mut mtdt = Vec::new();
    mtdt.extend_from_slice(&(blocks.len() as u16).to_be_bytes());
    for (kind, param, value) in blocks {
        mtdt.extend_from_slice(&((value.len() + 10) as u16).to_be_bytes());
        mtdt.extend_from_slice(&kind.to_be_bytes());
        mtdt.extend_from_slice(&0u16.to_be_bytes());
        mtdt.extend_from_slice(&param.to_be_bytes());
        mtdt.extend_from_slice(value);
    }

    let mut body = Vec::new();
    body.extend_from_slice(b"USMT");
    body.extend_from_slice(&[0u8; 12]);
    body.extend_from_slice(&((mtdt.len() + 8) as u32).to_be_bytes());
    body.extend_from_slice(b"MTDT");
    body.extend_from_slice(&mtdt);
    atom(b"uuid", &body)
}
