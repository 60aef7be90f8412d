//! # VIZON
//!
//! Core of a dashboard backend that turns tabular files, images and web pages
//! into one structured `Table`, with an AI provider doing the structuring for
//! unstructured sources. Tabular parsing and URL fetching live in the
//! `vizon-sheets` and `vizon-web` plugin crates.

pub mod chat;
pub mod dashboard;
pub mod errors;
pub mod extraction;
pub mod ingest;
pub mod prompts;
pub mod providers;
pub mod session;
pub mod types;

pub use errors::{AcquisitionError, ExtractionError, NormalizationError, PromptError};
pub use extraction::{extract_structured, normalize_response, Extraction, NestedValuePolicy};
pub use ingest::{RawInput, SourceKind, TabularFormat};
pub use session::{Session, SessionStore};
pub use types::{Cell, ColumnKind, Table};
