// search-core/src/index.rs
//! 索引模块 - 将内容记录展开为可搜索条目
//!
//! The index is rebuilt in full from a content snapshot; it is never updated
//! in place. Building is pure and deterministic: the same records always
//! produce the same items in the same order.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::Value;

use crate::config::IndexConfig;
use crate::models::{ContentRecord, DocRecord, ExampleRecord, ItemKind, SchemaRecord, SearchableItem};

/// Immutable set of searchable items, cheap to clone and share.
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    items: Arc<[SearchableItem]>,
}

impl SearchIndex {
    pub fn build(records: &[ContentRecord], config: &IndexConfig) -> Self {
        Self {
            items: build_index(records, config).into(),
        }
    }

    pub fn items(&self) -> &[SearchableItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn count_by_kind(&self) -> HashMap<ItemKind, usize> {
        let mut counts = HashMap::new();
        for item in self.items.iter() {
            *counts.entry(item.kind).or_insert(0) += 1;
        }
        counts
    }
}

/// Maps every record to exactly one item, dropping records whose source id
/// was already seen.
pub fn build_index(records: &[ContentRecord], config: &IndexConfig) -> Vec<SearchableItem> {
    let mut seen = HashSet::new();
    let mut items = Vec::with_capacity(records.len());

    for record in records {
        let source_id = record.source_id();
        if !seen.insert(source_id.clone()) {
            tracing::warn!("duplicate content source {:?}, keeping the first one", source_id);
            continue;
        }
        items.push(match record {
            ContentRecord::Schema(schema) => schema_item(schema, config),
            ContentRecord::Example(example) => example_item(example),
            ContentRecord::Doc(doc) => doc_item(doc),
        });
    }

    tracing::debug!("built {} searchable items", items.len());
    items
}

fn schema_item(record: &SchemaRecord, config: &IndexConfig) -> SearchableItem {
    let schema = &record.raw_schema;
    let description = non_empty_str(schema.get("description"));

    let property_names = extract_property_names(schema);
    let required = schema
        .get("required")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str);

    let keywords = [record.name.as_str(), description.unwrap_or("")]
        .into_iter()
        .chain(property_names.iter().map(String::as_str))
        .chain(required)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    SearchableItem {
        kind: ItemKind::Schema,
        title: record.name.clone(),
        description: Some(
            description
                .map(str::to_string)
                .unwrap_or_else(|| format!("Schema definition for {}", record.name)),
        ),
        keywords: Some(keywords),
        content: schema.to_string(),
        href: config.schema_href(&record.source_id).to_string(),
    }
}

fn example_item(record: &ExampleRecord) -> SearchableItem {
    let payload = &record.payload;
    let description = non_empty_str(payload.get("title"))
        .or_else(|| non_empty_str(payload.pointer("/label/en/0")))
        .unwrap_or("Example data");

    SearchableItem {
        kind: ItemKind::Example,
        title: record.name.clone(),
        description: Some(description.to_string()),
        keywords: None,
        content: payload.to_string(),
        href: format!("/examples/{}", record.id),
    }
}

fn doc_item(record: &DocRecord) -> SearchableItem {
    let title = if record.title.is_empty() {
        record.slug.clone()
    } else {
        record.title.clone()
    };
    let description = non_empty_str(record.front_matter.get("description")).unwrap_or("Documentation");

    SearchableItem {
        kind: ItemKind::Doc,
        title,
        description: Some(description.to_string()),
        keywords: None,
        content: record.body_text.clone(),
        href: format!("/docs/{}", record.slug),
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Flattens the property names of a schema, depth first.
///
/// For every entry of `properties` the dotted path and the bare key are
/// emitted, `items.properties` entries get a `[]` segment, and
/// `patternProperties` keys are emitted as-is and become the prefix of their
/// children. Local `$ref` pointers are followed; a node that is already on
/// the current recursion path is a leaf. At most [`MAX_PROPERTY_NAMES`]
/// names are produced.
pub fn extract_property_names(schema: &Value) -> Vec<String> {
    let mut walker = PropertyWalker {
        root: schema,
        path: Vec::new(),
        names: Vec::new(),
    };
    walker.walk(schema, "");
    if walker.is_full() {
        tracing::warn!("schema property names cut off at {}", MAX_PROPERTY_NAMES);
        walker.names.truncate(MAX_PROPERTY_NAMES);
    }
    walker.names
}

/// Bounds the expansion of schemas whose definitions reference each other.
pub const MAX_PROPERTY_NAMES: usize = 10_000;

struct PropertyWalker<'a> {
    root: &'a Value,
    /// Nodes on the current recursion path, compared by identity
    path: Vec<&'a Value>,
    names: Vec<String>,
}

impl<'a> PropertyWalker<'a> {
    fn walk(&mut self, node: &'a Value, prefix: &str) {
        if self.is_full() {
            return;
        }
        let node = self.resolve(node);
        if !self.enter(node) {
            return;
        }

        if let Some(properties) = node.get("properties").and_then(Value::as_object) {
            for (key, child) in properties {
                if self.is_full() {
                    break;
                }
                let full_key = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                self.names.push(full_key.clone());
                self.names.push(key.clone());
                self.walk(child, &full_key);
            }
        }

        if let Some(items) = node.get("items").map(|items| self.resolve(items)) {
            if let Some(properties) = items.get("properties").and_then(Value::as_object) {
                if self.enter(items) {
                    for (key, child) in properties {
                        if self.is_full() {
                            break;
                        }
                        let full_key = format!("{prefix}[].{key}");
                        self.names.push(full_key.clone());
                        self.names.push(key.clone());
                        self.walk(child, &full_key);
                    }
                    self.path.pop();
                }
            }
        }

        if let Some(patterns) = node.get("patternProperties").and_then(Value::as_object) {
            for (pattern, child) in patterns {
                if self.is_full() {
                    break;
                }
                self.names.push(pattern.clone());
                self.walk(child, pattern);
            }
        }

        self.path.pop();
    }

    fn is_full(&self) -> bool {
        self.names.len() >= MAX_PROPERTY_NAMES
    }

    /// Pushes `node` onto the path unless it is already there.
    fn enter(&mut self, node: &'a Value) -> bool {
        if !node.is_object() || self.path.iter().any(|seen| std::ptr::eq(*seen, node)) {
            return false;
        }
        self.path.push(node);
        true
    }

    /// Follows `$ref: "#/..."` chains within the root document.
    fn resolve(&self, mut node: &'a Value) -> &'a Value {
        let mut hops: Vec<&'a Value> = Vec::new();
        while let Some(reference) = node.get("$ref").and_then(Value::as_str) {
            let Some(pointer) = reference.strip_prefix('#') else {
                break;
            };
            let Some(target) = self.root.pointer(pointer) else {
                tracing::debug!("unresolved schema reference {:?}", reference);
                break;
            };
            if hops.iter().any(|hop| std::ptr::eq(*hop, target)) {
                break;
            }
            hops.push(node);
            node = target;
        }
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, json};

    fn schema(name: &str, source_id: &str, raw: Value) -> ContentRecord {
        ContentRecord::Schema(SchemaRecord {
            name: name.into(),
            raw_schema: raw,
            source_id: source_id.into(),
        })
    }

    #[test]
    fn test_nested_paths() {
        let names = extract_property_names(&json!({"properties": {"a": {"properties": {"b": {}}}}}));
        assert_eq!(names, vec!["a", "a", "a.b", "b"]);
    }

    #[test]
    fn test_array_item_paths() {
        let names = extract_property_names(&json!({
            "properties": {
                "speakers": {
                    "type": "array",
                    "items": {"properties": {"name": {"type": "string"}}}
                }
            }
        }));
        assert_eq!(names, vec!["speakers", "speakers", "speakers[].name", "name"]);
    }

    #[test]
    fn test_top_level_array_paths() {
        let names = extract_property_names(&json!({"items": {"properties": {"id": {}}}}));
        assert_eq!(names, vec!["[].id", "id"]);
    }

    #[test]
    fn test_pattern_properties() {
        let names = extract_property_names(&json!({
            "patternProperties": {
                "^[a-z]{2}$": {"properties": {"value": {}}}
            }
        }));
        assert_eq!(names, vec!["^[a-z]{2}$", "^[a-z]{2}$.value", "value"]);
    }

    #[test]
    fn test_malformed_schema_yields_nothing() {
        assert!(extract_property_names(&json!({"type": "object"})).is_empty());
        assert!(extract_property_names(&json!("not a schema")).is_empty());
        assert!(extract_property_names(&json!({"properties": ["a", "b"]})).is_empty());
    }

    #[test]
    fn test_cyclic_reference_terminates() {
        let names = extract_property_names(&json!({
            "definitions": {
                "node": {
                    "properties": {
                        "label": {"type": "string"},
                        "children": {"items": {"$ref": "#/definitions/node"}},
                        "parent": {"$ref": "#/definitions/node"}
                    }
                }
            },
            "properties": {"root": {"$ref": "#/definitions/node"}}
        }));
        assert!(names.contains(&"root".to_string()));
        assert!(names.contains(&"root.label".to_string()));
        assert!(names.contains(&"root.children".to_string()));
        assert!(names.contains(&"root.parent".to_string()));
        assert!(!names.iter().any(|n| n.starts_with("root.parent.")));
    }

    #[test]
    fn test_mutually_referencing_definitions_are_bounded() {
        let count = 9;
        let mut definitions = Map::new();
        for i in 0..count {
            let properties: Map<String, Value> = (0..count)
                .filter(|j| *j != i)
                .map(|j| (format!("d{j}"), json!({"$ref": format!("#/definitions/d{j}")})))
                .collect();
            definitions.insert(format!("d{i}"), json!({"properties": properties}));
        }
        let names = extract_property_names(&json!({
            "definitions": definitions,
            "properties": {"start": {"$ref": "#/definitions/d0"}}
        }));
        assert_eq!(names.len(), MAX_PROPERTY_NAMES);
        assert_eq!(names[0], "start");
        assert!(names.contains(&"start.d1".to_string()));
    }

    #[test]
    fn test_self_referencing_ref_chain() {
        let names = extract_property_names(&json!({
            "definitions": {"a": {"$ref": "#/definitions/b"}, "b": {"$ref": "#/definitions/a"}},
            "properties": {"x": {"$ref": "#/definitions/a"}}
        }));
        assert_eq!(names, vec!["x", "x"]);
    }

    #[test]
    fn test_schema_item() {
        let records = vec![schema(
            "oral history",
            "oral_history.json",
            json!({
                "description": "Interview metadata",
                "required": ["interviewee"],
                "properties": {"interviewee": {"type": "string"}}
            }),
        )];
        let items = build_index(&records, &IndexConfig::default());
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.kind, ItemKind::Schema);
        assert_eq!(item.title, "oral history");
        assert_eq!(item.description.as_deref(), Some("Interview metadata"));
        assert_eq!(
            item.keywords.as_deref(),
            Some("oral history Interview metadata interviewee interviewee interviewee")
        );
        assert_eq!(item.href, "/schemas/interview");
        assert!(item.content.starts_with(r#"{"description":"Interview metadata""#));
    }

    #[test]
    fn test_schema_without_description() {
        let items = build_index(&[schema("collection", "collection.json", json!({}))], &IndexConfig::default());
        assert_eq!(items[0].description.as_deref(), Some("Schema definition for collection"));
        assert_eq!(items[0].keywords.as_deref(), Some("collection"));
        assert_eq!(items[0].href, "/schemas/collection");
    }

    #[test]
    fn test_example_and_doc_items() {
        let records = vec![
            ContentRecord::Example(ExampleRecord {
                id: "one-item".into(),
                name: "One Item".into(),
                filename: "one_item.json".into(),
                payload: json!({"label": {"en": ["First item"]}}),
            }),
            ContentRecord::Example(ExampleRecord {
                id: "bare".into(),
                name: "Bare".into(),
                filename: "bare.json".into(),
                payload: json!({"title": ""}),
            }),
            ContentRecord::Doc(DocRecord {
                slug: "intro".into(),
                title: String::new(),
                front_matter: Map::new(),
                body_text: "Hello".into(),
            }),
        ];
        let items = build_index(&records, &IndexConfig::default());

        assert_eq!(items[0].description.as_deref(), Some("First item"));
        assert_eq!(items[0].href, "/examples/one-item");
        assert!(items[0].keywords.is_none());
        assert_eq!(items[1].description.as_deref(), Some("Example data"));
        assert_eq!(items[2].title, "intro");
        assert_eq!(items[2].description.as_deref(), Some("Documentation"));
        assert_eq!(items[2].content, "Hello");
        assert_eq!(items[2].href, "/docs/intro");
    }

    #[test]
    fn test_build_is_idempotent() {
        let records = vec![
            schema("b", "b.json", json!({"properties": {"x": {"properties": {"y": {}}}}})),
            schema("a", "a.json", json!({"description": "first"})),
        ];
        let config = IndexConfig::default();
        assert_eq!(build_index(&records, &config), build_index(&records, &config));
    }

    #[test]
    fn test_duplicate_source_ids_are_dropped() {
        let records = vec![
            schema("first", "same.json", json!({})),
            schema("second", "same.json", json!({})),
        ];
        let index = SearchIndex::build(&records, &IndexConfig::default());
        assert_eq!(index.len(), 1);
        assert_eq!(index.items()[0].title, "first");
        assert_eq!(index.count_by_kind().get(&ItemKind::Schema), Some(&1));
    }
}
