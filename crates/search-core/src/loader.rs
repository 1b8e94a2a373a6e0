// search-core/src/loader.rs
//! 内容加载模块
//!
//! Reads schemas, examples and documentation pages from a content root:
//!
//! ```text
//! <root>/schemas/*.json
//! <root>/examples/*.json
//! <root>/docs/*.md
//! ```
//!
//! A directory that cannot be read fails the whole load. A single file that
//! cannot be read or parsed is skipped with a warning.

use std::fs;
use std::path::{Path, PathBuf};

use chardetng::EncodingDetector;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::models::{ContentRecord, DocRecord, ExampleRecord, SchemaRecord};

pub const SCHEMAS_DIR: &str = "schemas";
pub const EXAMPLES_DIR: &str = "examples";
pub const DOCS_DIR: &str = "docs";

const FRONT_MATTER_FENCE: &str = "---";

/// Boundary to whatever stores the site content.
///
/// Every call returns a complete snapshot ordered by file name.
pub trait ContentSource: Send + Sync {
    fn get_all_schemas(&self) -> Result<Vec<SchemaRecord>>;
    fn get_all_examples(&self) -> Result<Vec<ExampleRecord>>;
    fn get_all_docs(&self) -> Result<Vec<DocRecord>>;

    fn get_example_by_id(&self, id: &str) -> Option<ExampleRecord> {
        self.get_all_examples()
            .ok()?
            .into_iter()
            .find(|example| example.id == id)
    }

    fn load_doc(&self, slug: &str) -> Option<DocRecord> {
        self.get_all_docs()
            .ok()?
            .into_iter()
            .find(|doc| doc.slug == slug)
    }
}

/// Loads every record, schemas first, then examples, then docs.
pub fn load_all(source: &dyn ContentSource) -> Result<Vec<ContentRecord>> {
    let mut records: Vec<ContentRecord> = Vec::new();
    records.extend(source.get_all_schemas()?.into_iter().map(ContentRecord::from));
    records.extend(source.get_all_examples()?.into_iter().map(ContentRecord::from));
    records.extend(source.get_all_docs()?.into_iter().map(ContentRecord::from));
    tracing::debug!("loaded {} content records", records.len());
    Ok(records)
}

/// Content stored as plain files under a root directory.
#[derive(Debug, Clone)]
pub struct FsContentStore {
    root: PathBuf,
}

impl FsContentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Files with `extension` directly inside `dir`, in alphabetical order.
    fn list_files(&self, dir: &str, extension: &str) -> Result<Vec<PathBuf>> {
        let dir_path = self.root.join(dir);
        fs::read_dir(&dir_path)
            .map(drop)
            .map_err(|e| Error::content_load(&dir_path, e))?;

        let pattern = format!(
            "{}/*.{}",
            glob::Pattern::escape(&dir_path.to_string_lossy()),
            extension
        );
        let entries = glob::glob(&pattern).map_err(|source| Error::Pattern {
            path: dir_path.clone(),
            source,
        })?;

        let mut files = Vec::new();
        for entry in entries {
            match entry {
                Ok(path) if path.is_file() => files.push(path),
                Ok(_) => {}
                Err(e) => tracing::warn!("skipping unreadable entry in {:?}: {}", dir_path, e),
            }
        }
        Ok(files)
    }

    fn read_json(path: &Path) -> Option<Value> {
        let text = match read_text_with_encoding_detection(path) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("skipping {:?}: {}", path, e);
                return None;
            }
        };
        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("skipping {:?}: invalid JSON: {}", path, e);
                None
            }
        }
    }

    fn read_doc(path: &Path, slug: &str) -> Option<DocRecord> {
        let text = match read_text_with_encoding_detection(path) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("skipping {:?}: {}", path, e);
                return None;
            }
        };
        match parse_front_matter(&text) {
            Ok((front_matter, body)) => Some(doc_record(slug, front_matter, body)),
            Err(e) => {
                tracing::warn!("skipping {:?}: invalid front matter: {}", path, e);
                None
            }
        }
    }
}

impl ContentSource for FsContentStore {
    fn get_all_schemas(&self) -> Result<Vec<SchemaRecord>> {
        let files = self.list_files(SCHEMAS_DIR, "json")?;
        Ok(files
            .iter()
            .filter_map(|path| {
                let filename = file_name(path)?;
                let raw_schema = Self::read_json(path)?;
                Some(SchemaRecord {
                    name: schema_name(&filename),
                    raw_schema,
                    source_id: filename,
                })
            })
            .collect())
    }

    fn get_all_examples(&self) -> Result<Vec<ExampleRecord>> {
        let files = self.list_files(EXAMPLES_DIR, "json")?;
        Ok(files
            .iter()
            .filter_map(|path| {
                let filename = file_name(path)?;
                let payload = Self::read_json(path)?;
                let stem = filename.trim_end_matches(".json");
                Some(ExampleRecord {
                    id: stem.replace('_', "-"),
                    name: title_case(&stem.replace('_', " ")),
                    filename,
                    payload,
                })
            })
            .collect())
    }

    fn get_all_docs(&self) -> Result<Vec<DocRecord>> {
        let files = self.list_files(DOCS_DIR, "md")?;
        Ok(files
            .iter()
            .filter_map(|path| {
                let filename = file_name(path)?;
                Self::read_doc(path, filename.trim_end_matches(".md"))
            })
            .collect())
    }

    fn get_example_by_id(&self, id: &str) -> Option<ExampleRecord> {
        if !is_plain_name(id) {
            return None;
        }
        let filename = format!("{}.json", id.replace('-', "_"));
        let path = self.root.join(EXAMPLES_DIR).join(&filename);
        if !path.is_file() {
            // File names that already contain '-' map to the same id.
            return self
                .get_all_examples()
                .ok()?
                .into_iter()
                .find(|example| example.id == id);
        }
        let payload = Self::read_json(&path)?;
        Some(ExampleRecord {
            id: id.to_string(),
            name: title_case(&id.replace('-', " ")),
            filename,
            payload,
        })
    }

    fn load_doc(&self, slug: &str) -> Option<DocRecord> {
        if !is_plain_name(slug) {
            return None;
        }
        Self::read_doc(&self.root.join(DOCS_DIR).join(format!("{slug}.md")), slug)
    }
}

/// Fixed, in-memory content.
#[derive(Debug, Clone, Default)]
pub struct MemoryContentStore {
    pub schemas: Vec<SchemaRecord>,
    pub examples: Vec<ExampleRecord>,
    pub docs: Vec<DocRecord>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema(mut self, record: SchemaRecord) -> Self {
        self.schemas.push(record);
        self
    }

    pub fn with_example(mut self, record: ExampleRecord) -> Self {
        self.examples.push(record);
        self
    }

    pub fn with_doc(mut self, record: DocRecord) -> Self {
        self.docs.push(record);
        self
    }
}

impl ContentSource for MemoryContentStore {
    fn get_all_schemas(&self) -> Result<Vec<SchemaRecord>> {
        Ok(self.schemas.clone())
    }

    fn get_all_examples(&self) -> Result<Vec<ExampleRecord>> {
        Ok(self.examples.clone())
    }

    fn get_all_docs(&self) -> Result<Vec<DocRecord>> {
        Ok(self.docs.clone())
    }
}

/// 智能读取文本文件（自动检测编码）
fn read_text_with_encoding_detection(path: &Path) -> std::io::Result<String> {
    let bytes = fs::read(path)?;

    if let Ok(text) = std::str::from_utf8(&bytes) {
        return Ok(text.trim_start_matches('\u{feff}').to_string());
    }

    let mut detector = EncodingDetector::new();
    detector.feed(&bytes, true);
    let detected_encoding = detector.guess(None, true);

    let (decoded, encoding_used, had_errors) = detected_encoding.decode(&bytes);
    if had_errors {
        tracing::warn!("{:?} decoded as {} with errors", path, encoding_used.name());
    } else {
        tracing::debug!("{:?} decoded as {}", path, encoding_used.name());
    }

    Ok(decoded.into_owned())
}

/// Splits a leading `---` fenced YAML block from the Markdown body.
pub fn parse_front_matter(text: &str) -> std::result::Result<(Map<String, Value>, String), serde_yaml::Error> {
    let no_front_matter = || (Map::new(), text.to_string());
    let Some(first_end) = text.find('\n') else {
        return Ok(no_front_matter());
    };
    if text[..first_end].trim_end() != FRONT_MATTER_FENCE {
        return Ok(no_front_matter());
    }

    let mut yaml = String::new();
    let mut consumed = first_end + 1;
    let mut closed = false;
    for line in text[consumed..].split_inclusive('\n') {
        consumed += line.len();
        if line.trim_end() == FRONT_MATTER_FENCE {
            closed = true;
            break;
        }
        yaml.push_str(line);
    }
    if !closed {
        return Ok(no_front_matter());
    }

    let front_matter = if yaml.trim().is_empty() {
        Map::new()
    } else {
        serde_yaml::from_str::<Option<Map<String, Value>>>(&yaml)?.unwrap_or_default()
    };
    Ok((front_matter, text[consumed..].to_string()))
}

fn doc_record(slug: &str, front_matter: Map<String, Value>, body_text: String) -> DocRecord {
    let title = front_matter
        .get("title")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| title_case(&slug.replace('-', " ")));
    DocRecord {
        slug: slug.to_string(),
        title,
        front_matter,
        body_text,
    }
}

/// `oral_history.json` -> `oral history`; only the first underscore is replaced.
fn schema_name(filename: &str) -> String {
    filename.trim_end_matches(".json").replacen('_', " ", 1)
}

/// Upper-cases every character that starts a word.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        let is_word = c.is_alphanumeric() || c == '_';
        if is_word && at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = !is_word;
    }
    out
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().to_string())
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['/', '\\']) && !name.contains("..")
}
