pub mod api;
pub mod atoms;
pub mod data;
pub mod genres;
mod handlers;
pub mod info;
pub mod json_api;
pub mod known_atoms;
pub mod parser;
pub mod tags;
pub mod util;

pub use api::{Field, FieldValue, Mp4Info};
pub use atoms::{AtomHeader, AtomId, FourCC, HeaderOutcome};
pub use info::{InfoKey, InfoValue, MediaInfo};
pub use json_api::{Report, analyze_file, report};
pub use parser::{ParseError, ParseOptions, Session, StructuralError, read_atom_header};
pub use tags::{TagKey, TagStore, TagValue};
