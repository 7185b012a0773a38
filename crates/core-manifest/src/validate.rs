//! Validation of an existing manifest against derived data
//!
//! Two documents are equal when they match structurally after the excluded
//! keys are removed and both `urls` lists are sorted. `urls` order carries no
//! meaning, so it never causes a mismatch.

use crate::{KEY_DEPS, KEY_URLS, KEY_VERSION};
use serde_json::Value;

/// Files `mip` treats as board entry points
pub const BOOT_MAIN_FILES: [&str; 2] = ["boot.py", "main.py"];

/// Fields excluded from validation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Drop `version` from both documents
    pub ignore_version: bool,
    /// Drop `deps` from both documents
    pub ignore_deps: bool,
    /// Drop `boot.py` and `main.py` entries from both `urls` lists
    pub ignore_boot_main: bool,
}

impl ValidationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ignore_version(mut self, ignore: bool) -> Self {
        self.ignore_version = ignore;
        self
    }

    pub fn ignore_deps(mut self, ignore: bool) -> Self {
        self.ignore_deps = ignore;
        self
    }

    pub fn ignore_boot_main(mut self, ignore: bool) -> Self {
        self.ignore_boot_main = ignore;
        self
    }
}

/// Compare two manifest documents under the given exclusions
pub fn compare_documents(derived: &Value, existing: &Value, options: &ValidationOptions) -> bool {
    normalize_document(derived, options) == normalize_document(existing, options)
}

/// Apply exclusions and sort `urls`, returning the comparable form
pub fn normalize_document(document: &Value, options: &ValidationOptions) -> Value {
    let mut document = document.clone();

    if let Value::Object(map) = &mut document {
        if options.ignore_version {
            map.remove(KEY_VERSION);
        }
        if options.ignore_deps {
            map.remove(KEY_DEPS);
        }
        if let Some(Value::Array(urls)) = map.get_mut(KEY_URLS) {
            if options.ignore_boot_main {
                urls.retain(|entry| !is_boot_main_entry(entry));
            }
            urls.sort_by_cached_key(url_sort_key);
        }
    }

    document
}

fn is_boot_main_entry(entry: &Value) -> bool {
    entry
        .get(0)
        .and_then(Value::as_str)
        .and_then(|path| path.rsplit('/').next())
        .map(|name| BOOT_MAIN_FILES.contains(&name))
        .unwrap_or(false)
}

// Lexicographic on the pair; non-string elements fall back to their JSON text.
fn url_sort_key(entry: &Value) -> Vec<String> {
    match entry {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        other => vec![other.to_string()],
    }
}
