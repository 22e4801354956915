//! # Standards Document
//!
//! Shared data model for structured standards documents (one JSON document
//! per clause) plus the loader used during graph ingestion.
//!
//! A clause document is the unit of ingestion: it carries the clause's
//! position in the standard's hierarchy, its text content, and the atomic
//! requirements extracted from that text.

mod error;
mod loader;
mod types;

pub use error::{DocumentError, Result};
pub use loader::load_document;
pub use types::{
    ClauseDocument, ContentBlock, Figure, References, RequirementEntry, RequirementType, Table,
};
