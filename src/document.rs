//! Nested translation documents and their flat, dot-joined form.

use serde_json::map::Entry;
use serde_json::{Map, Value};
use std::collections::btree_map::Entry as FlatEntry;
use std::collections::BTreeMap;
use thiserror::Error;

/// One locale's content tree: objects as inner nodes, strings as leaves.
pub type TranslationDocument = Map<String, Value>;

/// Dot-joined key path to text. Ordered, so iteration is deterministic.
pub type FlatDocument = BTreeMap<String, String>;

/// Separator between path segments in a flat key
pub const KEY_SEPARATOR: char = '.';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnflattenError {
    /// `path` is needed as a text value by one key and as an object by another
    #[error("key '{key}' collides at '{path}': a path cannot be both a text and a group of keys")]
    Collision { key: String, path: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlattenError {
    /// Two leaves, e.g. nested `a: { b }` and dotted `"a.b"`, share one flat key
    #[error("key '{key}' is defined more than once")]
    Duplicate { key: String },
}

/// Flatten a nested document into dot-joined key paths.
///
/// Only string leaves are emitted. Arrays, numbers, booleans and nulls are
/// not translatable content and are dropped. When two leaves land on the same
/// flat key the one visited last wins; use [`try_flatten`] to reject that.
pub fn flatten(doc: &TranslationDocument) -> FlatDocument {
    let mut result = FlatDocument::new();
    flatten_into(doc, None, &mut result, &mut Vec::new());
    result
}

/// Like [`flatten`], but fails on the first flat key produced twice.
pub fn try_flatten(doc: &TranslationDocument) -> Result<FlatDocument, FlattenError> {
    let mut result = FlatDocument::new();
    let mut duplicates = Vec::new();
    flatten_into(doc, None, &mut result, &mut duplicates);

    match duplicates.into_iter().next() {
        Some(key) => Err(FlattenError::Duplicate { key }),
        None => Ok(result),
    }
}

fn flatten_into(
    map: &TranslationDocument,
    prefix: Option<&str>,
    result: &mut FlatDocument,
    duplicates: &mut Vec<String>,
) {
    for (key, value) in map {
        let full_key = prefix.map_or_else(|| key.clone(), |p| format!("{p}{KEY_SEPARATOR}{key}"));
        match value {
            Value::Object(child) => flatten_into(child, Some(&full_key), result, duplicates),
            Value::String(text) => match result.entry(full_key) {
                FlatEntry::Vacant(slot) => {
                    slot.insert(text.clone());
                }
                FlatEntry::Occupied(mut slot) => {
                    duplicates.push(slot.key().clone());
                    slot.insert(text.clone());
                }
            },
            _ => {}
        }
    }
}

/// Rebuild the nested document from flat key paths.
///
/// Fails on the first key whose path conflicts with another key, e.g. `nav`
/// and `nav.home` in the same document.
pub fn unflatten(flat: &FlatDocument) -> Result<TranslationDocument, UnflattenError> {
    let mut root = TranslationDocument::new();

    for (key, value) in flat {
        let mut node = &mut root;
        let mut path = String::new();
        let mut segments = key.split(KEY_SEPARATOR).peekable();

        while let Some(segment) = segments.next() {
            if !path.is_empty() {
                path.push(KEY_SEPARATOR);
            }
            path.push_str(segment);

            if segments.peek().is_none() {
                match node.entry(segment) {
                    Entry::Vacant(slot) => {
                        slot.insert(Value::String(value.clone()));
                    }
                    Entry::Occupied(_) => {
                        return Err(UnflattenError::Collision {
                            key: key.clone(),
                            path,
                        });
                    }
                }
                break;
            }

            let child = node
                .entry(segment)
                .or_insert_with(|| Value::Object(Map::new()));
            node = match child {
                Value::Object(map) => map,
                _ => {
                    return Err(UnflattenError::Collision {
                        key: key.clone(),
                        path,
                    })
                }
            };
        }
    }

    Ok(root)
}

/// Look up a dot-joined key in a nested document.
pub fn lookup<'a>(doc: &'a TranslationDocument, key: &str) -> Option<&'a str> {
    let mut segments = key.split(KEY_SEPARATOR);
    let first = segments.next()?;
    let mut current = doc.get(first)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    current.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn doc(value: Value) -> TranslationDocument {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    // ==================== flatten Tests ====================

    #[test]
    fn test_try_flatten_rejects_dotted_and_nested_same_key() {
        let source = doc(json!({ "a": { "b": "nested" }, "a.b": "dotted" }));

        assert_eq!(
            try_flatten(&source),
            Err(FlattenError::Duplicate {
                key: "a.b".to_string()
            })
        );
        // The lenient form keeps a single value
        assert_eq!(flatten(&source).len(), 1);
    }

    #[test]
    fn test_try_flatten_accepts_distinct_keys() {
        let source = doc(json!({ "nav": { "home": "Start" }, "nav.contact": "Kontakt" }));
        let flat = try_flatten(&source).expect("No duplicates");

        assert_eq!(flat, flatten(&source));
        assert_eq!(flat.len(), 2);
    }

    #[test]
    fn test_flatten_nested_keys() {
        let flat = flatten(&doc(json!({
            "nav": { "home": "Start", "contact": "Kontakt" },
            "title": "Ferienhaus"
        })));

        assert_eq!(flat.len(), 3);
        assert_eq!(flat.get("nav.home").map(String::as_str), Some("Start"));
        assert_eq!(flat.get("nav.contact").map(String::as_str), Some("Kontakt"));
        assert_eq!(flat.get("title").map(String::as_str), Some("Ferienhaus"));
    }

    #[test]
    fn test_flatten_drops_non_text_values() {
        let flat = flatten(&doc(json!({
            "rooms": 3,
            "pets": false,
            "tags": ["sea", "pool"],
            "note": null,
            "name": "Casa"
        })));

        assert_eq!(flat.len(), 1);
        assert!(flat.contains_key("name"));
    }

    #[test]
    fn test_flatten_empty_document() {
        assert!(flatten(&TranslationDocument::new()).is_empty());
    }

    // ==================== unflatten Tests ====================

    #[test]
    fn test_unflatten_builds_intermediate_nodes() {
        let mut flat = FlatDocument::new();
        flat.insert("a.b.c".to_string(), "deep".to_string());
        flat.insert("a.d".to_string(), "shallow".to_string());

        let nested = unflatten(&flat).expect("Should unflatten");
        assert_eq!(
            Value::Object(nested),
            json!({ "a": { "b": { "c": "deep" }, "d": "shallow" } })
        );
    }

    #[test]
    fn test_unflatten_leaf_then_prefix_collides() {
        let mut flat = FlatDocument::new();
        flat.insert("nav".to_string(), "Navigation".to_string());
        flat.insert("nav.home".to_string(), "Start".to_string());

        let err = unflatten(&flat).unwrap_err();
        assert_eq!(
            err,
            UnflattenError::Collision {
                key: "nav.home".to_string(),
                path: "nav".to_string(),
            }
        );
    }

    #[test]
    fn test_unflatten_nested_leaf_collides() {
        let mut flat = FlatDocument::new();
        flat.insert("a.b".to_string(), "leaf".to_string());
        flat.insert("a.b.c".to_string(), "child".to_string());

        let err = unflatten(&flat).unwrap_err();
        assert_eq!(
            err,
            UnflattenError::Collision {
                key: "a.b.c".to_string(),
                path: "a.b".to_string(),
            }
        );
    }

    #[test]
    fn test_collision_error_message_names_key() {
        let err = UnflattenError::Collision {
            key: "nav.home".to_string(),
            path: "nav".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("nav.home"));
        assert!(message.contains("'nav'"));
    }

    // ==================== lookup Tests ====================

    #[test]
    fn test_lookup_nested_value() {
        let d = doc(json!({ "footer": { "legal": { "imprint": "Impressum" } } }));
        assert_eq!(lookup(&d, "footer.legal.imprint"), Some("Impressum"));
    }

    #[test]
    fn test_lookup_missing_or_non_text() {
        let d = doc(json!({ "footer": { "legal": {} }, "count": 2 }));
        assert_eq!(lookup(&d, "footer.legal"), None);
        assert_eq!(lookup(&d, "footer.legal.imprint"), None);
        assert_eq!(lookup(&d, "count"), None);
        assert_eq!(lookup(&d, "nope"), None);
    }

    // ==================== Property Tests ====================

    fn arb_document() -> impl Strategy<Value = TranslationDocument> {
        let leaf = "[^\\x00]{0,12}".prop_map(Value::String);
        let node = leaf.prop_recursive(3, 32, 4, |inner| {
            prop::collection::btree_map("[a-z][a-z0-9_]{0,6}", inner, 1..4)
                .prop_map(|map| Value::Object(map.into_iter().collect()))
        });
        prop::collection::btree_map("[a-z][a-z0-9_]{0,6}", node, 1..5)
            .prop_map(|map| map.into_iter().collect())
    }

    proptest! {
        #[test]
        fn prop_unflatten_inverts_flatten(original in arb_document()) {
            let rebuilt = unflatten(&flatten(&original)).expect("Should unflatten");
            prop_assert_eq!(rebuilt, original);
        }
    }
}
