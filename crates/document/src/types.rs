use serde::{Deserialize, Serialize};

/// One structured clause extracted from a standards document.
///
/// Field names follow the extraction pipeline's JSON output. All fields are
/// defaulted so that partially extracted documents still load; documents
/// missing `chunk_id` or `document_id` cannot be addressed and are skipped
/// by the graph builder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClauseDocument {
    #[serde(default)]
    pub chunk_id: String,

    #[serde(default)]
    pub document_id: String,

    /// Dotted clause number, e.g. "4.2.1" or "Annex 4.2.1". Empty or "misc"
    /// for content that could not be placed in the hierarchy.
    #[serde(default)]
    pub clause_id: String,

    #[serde(default)]
    pub title: String,

    /// Clause id of the parent clause, if known.
    #[serde(default)]
    pub parent_id: Option<String>,

    /// Clause ids of direct children, as listed by the extractor.
    #[serde(default)]
    pub children_ids: Vec<String>,

    /// Paragraphs and list items making up the clause body.
    #[serde(default, alias = "content")]
    pub text_blocks: Vec<ContentBlock>,

    #[serde(default)]
    pub tables: Vec<Table>,

    #[serde(default)]
    pub figures: Vec<Figure>,

    #[serde(default)]
    pub references: References,

    /// Atomic testable obligations extracted from the clause text, in
    /// extraction order. Order is significant: requirement node ids are
    /// derived from list position.
    #[serde(default)]
    pub requirements: Vec<RequirementEntry>,
}

/// A paragraph or list item inside a clause body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    #[serde(default)]
    pub table_id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub headers: Vec<String>,

    #[serde(default)]
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    #[serde(default)]
    pub figure_id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub caption: String,
}

/// Citations found inside the clause text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct References {
    /// Clause ids of internal cross-references within the same standard.
    #[serde(default, alias = "internal_resolved")]
    pub internal: Vec<String>,

    /// Names of external standards cited by this clause.
    #[serde(default)]
    pub standards: Vec<String>,
}

/// One extracted requirement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequirementEntry {
    #[serde(rename = "type", default)]
    pub requirement_type: RequirementType,

    /// The normative keyword that triggered extraction ("shall", "should", ...).
    #[serde(default)]
    pub keyword: String,

    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequirementType {
    Mandatory,
    Recommended,
    #[default]
    #[serde(other)]
    Unknown,
}

impl RequirementType {
    pub fn is_mandatory(self) -> bool {
        matches!(self, RequirementType::Mandatory)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RequirementType::Mandatory => "mandatory",
            RequirementType::Recommended => "recommended",
            RequirementType::Unknown => "unknown",
        }
    }
}
