//! Tag grouping and tag resolution over `$ref`-split path items.
//!
//! A root specification produced by `redocly split` keeps every path item in
//! its own file:
//!
//! ```yaml
//! paths:
//!   /users:
//!     $ref: paths/users.yaml
//! ```
//!
//! [`group_paths`] builds the tag-grouped listing shown in the UI and
//! [`resolve_tags`] finds every tag a selection of path items refers to.

use std::collections::BTreeSet;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_yaml::{Mapping, Value};
use utoipa::ToSchema;

use crate::error::{BundlerError, Result};
use crate::loader::SpecLoader;

/// Tag used when a fragment declares no tags.
pub const UNTAGGED: &str = "Untagged";

/// Summary used when a fragment's first operation has none.
pub const DEFAULT_SUMMARY: &str = "No summary available.";

/// A path listed under its primary tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[schema(example = json!({ "path": "/users", "summary": "List users" }))]
pub struct GroupedPath {
    /// Path key as written in the root specification.
    #[schema(example = "/users")]
    pub path: String,

    /// Summary of the first operation in the path's fragment.
    #[schema(example = "List users")]
    pub summary: String,
}

/// Paths grouped by primary tag, in first-seen tag order.
///
/// Serializes as a JSON object keyed by tag name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagGroups {
    groups: Vec<(String, Vec<GroupedPath>)>,
}

impl TagGroups {
    /// Append `entry` to `tag`'s group, creating the group if needed.
    pub fn push(&mut self, tag: &str, entry: GroupedPath) {
        if let Some((_, entries)) = self.groups.iter_mut().find(|(name, _)| name == tag) {
            entries.push(entry);
        } else {
            self.groups.push((tag.to_string(), vec![entry]));
        }
    }

    /// Entries for `tag`, if any.
    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&[GroupedPath]> {
        self.groups
            .iter()
            .find(|(name, _)| name == tag)
            .map(|(_, entries)| entries.as_slice())
    }

    /// Tag names in first-seen order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(name, _)| name.as_str())
    }

    /// Iterate `(tag, entries)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[GroupedPath])> {
        self.groups
            .iter()
            .map(|(name, entries)| (name.as_str(), entries.as_slice()))
    }

    /// Number of tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether no path was grouped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl Serialize for TagGroups {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for (tag, entries) in &self.groups {
            map.serialize_entry(tag, entries)?;
        }
        map.end()
    }
}

/// The `$ref` target of a path item, if it is a reference.
#[must_use]
pub fn path_ref(item: &Value) -> Option<&str> {
    item.as_mapping()?.get("$ref")?.as_str()
}

/// The `paths` mapping of a root document, if present.
#[must_use]
pub fn root_paths(root: &Mapping) -> Option<&Mapping> {
    root.get("paths")?.as_mapping()
}

fn string_tags(operation: &Mapping) -> Option<Vec<&str>> {
    let tags = operation.get("tags")?.as_sequence()?;
    Some(tags.iter().filter_map(Value::as_str).collect())
}

/// Group the root's `$ref` path items by the primary tag of their first
/// operation.
///
/// Only the first mapping-valued entry of each fragment is considered, so a
/// path appears exactly once. Inline path items and fragments that fail to
/// load are skipped.
///
/// # Errors
///
/// Returns [`BundlerError::RootSpecMissing`] if `root` has no `paths`
/// mapping. `root_file` only names the file in that error.
pub fn group_paths(
    loader: &SpecLoader,
    root: &Mapping,
    root_file: &std::path::Path,
) -> Result<TagGroups> {
    let paths =
        root_paths(root).ok_or_else(|| BundlerError::RootSpecMissing(root_file.to_path_buf()))?;

    let mut groups = TagGroups::default();

    for (key, item) in paths {
        let (Some(path), Some(reference)) = (key.as_str(), path_ref(item)) else {
            continue;
        };
        let Some(fragment) = loader.load(reference) else {
            continue;
        };

        if let Some(operation) = fragment.values().find_map(Value::as_mapping) {
            let summary = operation
                .get("summary")
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_SUMMARY);
            let primary_tag = string_tags(operation)
                .and_then(|tags| tags.first().copied())
                .unwrap_or(UNTAGGED);

            groups.push(
                primary_tag,
                GroupedPath {
                    path: path.to_string(),
                    summary: summary.to_string(),
                },
            );
        }
    }

    Ok(groups)
}

/// Collect every tag used by any operation of the selected path items.
///
/// Inline items and fragments that fail to load contribute nothing.
pub fn resolve_tags(loader: &SpecLoader, selected_paths: &Mapping) -> BTreeSet<String> {
    let mut tags = BTreeSet::new();

    for reference in selected_paths.values().filter_map(path_ref) {
        let Some(fragment) = loader.load(reference) else {
            continue;
        };
        for operation in fragment.values().filter_map(Value::as_mapping) {
            if let Some(names) = string_tags(operation) {
                tags.extend(names.into_iter().map(str::to_string));
            }
        }
    }

    tags
}
