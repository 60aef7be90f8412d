//! # Ingestion Types
//!
//! This module defines what the Content Acquirer produces. Tabular parsing
//! lives in `vizon-sheets` and URL fetching in `vizon-web`; both produce the
//! types declared here. Image acquisition needs no network or plugin and
//! lives in this crate.

pub mod image;
pub mod types;

pub use self::image::load_image;
pub use types::{
    truncate_chars, ImageInput, RawInput, SourceKind, TabularFormat, MAX_TEXT_CHARS,
};
