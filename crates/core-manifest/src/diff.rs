//! Structural diff between two JSON documents
//!
//! Objects are compared key by key, arrays index by index. Every differing
//! leaf is reported once with its path, e.g. `$.urls[3][1]`.

use serde::Serialize;
use serde_json::Value;

/// Kind of difference found at a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Present only in the second document
    Added,
    /// Present only in the first document
    Removed,
    /// Present in both with different values
    Changed,
}

/// A single difference
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffEntry {
    pub path: String,
    pub kind: ChangeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<Value>,
}

/// Every difference between two documents, in document order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ManifestDiff {
    entries: Vec<DiffEntry>,
}

impl ManifestDiff {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[DiffEntry] {
        &self.entries
    }

    /// Entries of the given kind
    pub fn of_kind(&self, kind: ChangeKind) -> impl Iterator<Item = &DiffEntry> {
        self.entries.iter().filter(move |e| e.kind == kind)
    }
}

/// Compute the structural difference from `before` to `after`
pub fn diff_documents(before: &Value, after: &Value) -> ManifestDiff {
    let mut entries = Vec::new();
    walk("$", before, after, &mut entries);
    ManifestDiff { entries }
}

fn walk(path: &str, before: &Value, after: &Value, out: &mut Vec<DiffEntry>) {
    match (before, after) {
        (Value::Object(old), Value::Object(new)) => {
            for (key, old_value) in old {
                let child = key_path(path, key);
                match new.get(key) {
                    Some(new_value) => walk(&child, old_value, new_value, out),
                    None => out.push(removed(child, old_value)),
                }
            }
            for (key, new_value) in new {
                if !old.contains_key(key) {
                    out.push(added(key_path(path, key), new_value));
                }
            }
        }
        (Value::Array(old), Value::Array(new)) => {
            for index in 0..old.len().max(new.len()) {
                let child = format!("{}[{}]", path, index);
                match (old.get(index), new.get(index)) {
                    (Some(o), Some(n)) => walk(&child, o, n, out),
                    (Some(o), None) => out.push(removed(child, o)),
                    (None, Some(n)) => out.push(added(child, n)),
                    (None, None) => {}
                }
            }
        }
        _ if before != after => out.push(DiffEntry {
            path: path.to_string(),
            kind: ChangeKind::Changed,
            before: Some(before.clone()),
            after: Some(after.clone()),
        }),
        _ => {}
    }
}

fn key_path(parent: &str, key: &str) -> String {
    let plain = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if plain {
        format!("{}.{}", parent, key)
    } else {
        format!("{}[{}]", parent, Value::String(key.to_string()))
    }
}

fn added(path: String, value: &Value) -> DiffEntry {
    DiffEntry {
        path,
        kind: ChangeKind::Added,
        before: None,
        after: Some(value.clone()),
    }
}

fn removed(path: String, value: &Value) -> DiffEntry {
    DiffEntry {
        path,
        kind: ChangeKind::Removed,
        before: Some(value.clone()),
        after: None,
    }
}
