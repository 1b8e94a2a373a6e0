// search-core/src/models.rs
//! 数据模型定义

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A JSON Schema definition file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaRecord {
    pub name: String,
    pub raw_schema: Value,
    /// File name the schema was read from, e.g. `oral_history.json`
    pub source_id: String,
}

/// An example payload file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExampleRecord {
    pub id: String,
    pub name: String,
    pub filename: String,
    #[serde(rename = "data")]
    pub payload: Value,
}

/// A Markdown documentation page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocRecord {
    pub slug: String,
    pub title: String,
    pub front_matter: Map<String, Value>,
    pub body_text: String,
}

impl DocRecord {
    pub fn source_id(&self) -> String {
        format!("{}.md", self.slug)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContentRecord {
    Schema(SchemaRecord),
    Example(ExampleRecord),
    Doc(DocRecord),
}

impl ContentRecord {
    /// Stable, file name derived identifier.
    pub fn source_id(&self) -> String {
        match self {
            ContentRecord::Schema(s) => s.source_id.clone(),
            ContentRecord::Example(e) => e.filename.clone(),
            ContentRecord::Doc(d) => d.source_id(),
        }
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            ContentRecord::Schema(_) => ItemKind::Schema,
            ContentRecord::Example(_) => ItemKind::Example,
            ContentRecord::Doc(_) => ItemKind::Doc,
        }
    }
}

impl From<SchemaRecord> for ContentRecord {
    fn from(record: SchemaRecord) -> Self {
        ContentRecord::Schema(record)
    }
}

impl From<ExampleRecord> for ContentRecord {
    fn from(record: ExampleRecord) -> Self {
        ContentRecord::Example(record)
    }
}

impl From<DocRecord> for ContentRecord {
    fn from(record: DocRecord) -> Self {
        ContentRecord::Doc(record)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Schema,
    Example,
    Doc,
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemKind::Schema => write!(f, "schema"),
            ItemKind::Example => write!(f, "example"),
            ItemKind::Doc => write!(f, "doc"),
        }
    }
}

/// Flattened representation of one record, used only for matching.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchableItem {
    pub kind: ItemKind,
    pub title: String,
    pub description: Option<String>,
    /// Only computed for schemas
    pub keywords: Option<String>,
    pub content: String,
    pub href: String,
}

/// What callers get back from a search: never the raw content or keywords.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    #[serde(alias = "type")]
    pub kind: ItemKind,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub href: String,
}

impl From<&SearchableItem> for RankedResult {
    fn from(item: &SearchableItem) -> Self {
        Self {
            kind: item.kind,
            title: item.title.clone(),
            description: item.description.clone(),
            href: item.href.clone(),
        }
    }
}
