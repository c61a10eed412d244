//! Object normalizer
//!
//! Parses one resource file and turns each entry of its `items` list into a
//! [`CapturedObject`]. The stored value of an object is its canonical JSON:
//! compact, object keys in lexicographic order, no HTML escaping, no trailing
//! newline. That is the form the API server itself reads back from the store.

use kinesnap_core::{CapturedObject, Error, Result};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

/// Top-level shape of a resource file
#[derive(Debug, Deserialize)]
struct ResourceList {
    #[serde(default)]
    items: Option<Vec<Value>>,
}

/// Parse a resource file's contents into captured objects
///
/// Returns an empty vector when the file has no items. Any item lacking a
/// non-empty `kind`, `apiVersion` or `metadata.name` fails the whole file.
pub fn normalize(path: &Path, contents: &[u8]) -> Result<Vec<CapturedObject>> {
    if contents.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let list: Option<ResourceList> = serde_yaml::from_slice(contents)
        .map_err(|e| Error::malformed_document(path, e.to_string()))?;
    let items = list.and_then(|l| l.items).unwrap_or_default();

    items
        .iter()
        .enumerate()
        .map(|(index, item)| normalize_item(path, index, item))
        .collect()
}

fn normalize_item(path: &Path, index: usize, item: &Value) -> Result<CapturedObject> {
    let object = item
        .as_object()
        .ok_or_else(|| Error::malformed(path, index, "item is not a mapping"))?;

    let kind = required_str(object.get("kind"))
        .ok_or_else(|| Error::malformed(path, index, "missing kind"))?;
    let api_version = required_str(object.get("apiVersion"))
        .ok_or_else(|| Error::malformed(path, index, "missing apiVersion"))?;
    let metadata = object
        .get("metadata")
        .and_then(Value::as_object)
        .ok_or_else(|| Error::malformed(path, index, "missing metadata"))?;
    let name = required_str(metadata.get("name"))
        .ok_or_else(|| Error::malformed(path, index, "missing metadata.name"))?;

    let namespace = match metadata.get("namespace") {
        None | Some(Value::Null) => None,
        Some(Value::String(ns)) if ns.is_empty() => None,
        Some(Value::String(ns)) => Some(ns.clone()),
        Some(_) => {
            return Err(Error::malformed(
                path,
                index,
                "metadata.namespace is not a string",
            ))
        }
    };

    Ok(CapturedObject {
        kind: kind.to_string(),
        api_version: api_version.to_string(),
        name: name.to_string(),
        namespace,
        raw_value: canonical_json(item)?.into_bytes(),
    })
}

fn required_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Encode a JSON value canonically: compact, object keys in sorted order
pub fn canonical_json(value: &Value) -> Result<String> {
    serde_json::to_string(value).map_err(|e| Error::Serialization(e.to_string()))
}
