//! Filtered specification assembly.
//!
//! Given the root document and the path keys a user picked, build a new
//! document that keeps every other top-level key verbatim, lists only the
//! picked paths, and keeps only the tag descriptors those paths refer to.

use serde_yaml::{Mapping, Value};

use crate::grouping::{resolve_tags, root_paths};
use crate::loader::SpecLoader;

/// Keep the requested keys that exist in the root's `paths`, in request
/// order. Unknown keys are dropped; the first occurrence of a duplicate wins.
#[must_use]
pub fn select_paths<S: AsRef<str>>(root: &Mapping, keys: &[S]) -> Mapping {
    let mut selected = Mapping::new();
    let Some(paths) = root_paths(root) else {
        return selected;
    };

    for key in keys {
        let key = key.as_ref();
        if selected.contains_key(key) {
            continue;
        }
        if let Some(item) = paths.get(key) {
            selected.insert(Value::from(key), item.clone());
        }
    }

    selected
}

/// Root tag descriptors whose `name` is in `required`, in root order.
fn filter_tags(root: &Mapping, required: impl Fn(&str) -> bool) -> Vec<Value> {
    root.get("tags")
        .and_then(Value::as_sequence)
        .map(|tags| {
            tags.iter()
                .filter(|tag| {
                    tag.get("name")
                        .and_then(Value::as_str)
                        .is_some_and(&required)
                })
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}

/// Build the filtered specification for `keys`.
///
/// The result holds every top-level key of `root` except `paths` and `tags`
/// (document order), followed by the filtered `tags` and the selected
/// `paths`.
#[must_use]
pub fn filter_spec<S: AsRef<str>>(loader: &SpecLoader, root: &Mapping, keys: &[S]) -> Mapping {
    let selected = select_paths(root, keys);
    let required = resolve_tags(loader, &selected);
    let tags = filter_tags(root, |name| required.contains(name));

    let mut filtered: Mapping = root
        .iter()
        .filter(|(key, _)| !matches!(key.as_str(), Some("paths" | "tags")))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    filtered.insert("tags".into(), Value::Sequence(tags));
    filtered.insert("paths".into(), Value::Mapping(selected));
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::tests::shop_project;

    fn keys_of(mapping: &Mapping) -> Vec<&str> {
        mapping.keys().filter_map(Value::as_str).collect()
    }

    fn tag_names(spec: &Mapping) -> Vec<&str> {
        spec["tags"]
            .as_sequence()
            .unwrap()
            .iter()
            .filter_map(|tag| tag["name"].as_str())
            .collect()
    }

    #[test]
    fn test_select_paths_drops_unknown_keys() {
        let dir = shop_project();
        let loader = SpecLoader::new(dir.path());
        let root = loader.load("openapi.yaml").unwrap();

        let selected = select_paths(&root, &["/orders", "/nope", "/users", "/orders"]);
        assert_eq!(keys_of(&selected), vec!["/orders", "/users"]);
    }

    #[test]
    fn test_only_required_tags_survive() {
        let dir = shop_project();
        let loader = SpecLoader::new(dir.path());
        let root = loader.load("openapi.yaml").unwrap();

        let spec = filter_spec(&loader, &root, &["/orders"]);
        assert_eq!(tag_names(&spec), vec!["Orders"]);
        assert_eq!(keys_of(spec["paths"].as_mapping().unwrap()), vec!["/orders"]);
    }

    #[test]
    fn test_tag_order_follows_root() {
        let dir = shop_project();
        let loader = SpecLoader::new(dir.path());
        let root = loader.load("openapi.yaml").unwrap();

        // /users brings in Users and Admin (from its POST); root order is
        // Users, Orders, Admin.
        let spec = filter_spec(&loader, &root, &["/orders", "/users"]);
        assert_eq!(tag_names(&spec), vec!["Users", "Orders", "Admin"]);
    }

    #[test]
    fn test_metadata_preserved_and_key_order() {
        let dir = shop_project();
        let loader = SpecLoader::new(dir.path());
        let root = loader.load("openapi.yaml").unwrap();

        let spec = filter_spec(&loader, &root, &["/users"]);
        assert_eq!(
            keys_of(&spec),
            vec!["openapi", "info", "servers", "tags", "paths"]
        );
        assert_eq!(spec["info"], root["info"]);
        assert_eq!(spec["servers"], root["servers"]);
    }

    #[test]
    fn test_all_paths_round_trip() {
        let dir = shop_project();
        let loader = SpecLoader::new(dir.path());
        let root = loader.load("openapi.yaml").unwrap();
        let all: Vec<String> = root_paths(&root)
            .unwrap()
            .keys()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect();

        let spec = filter_spec(&loader, &root, all.as_slice());
        assert_eq!(spec["paths"], root["paths"]);
        // every root tag is used by some fragment
        assert_eq!(spec["tags"], root["tags"]);
    }

    #[test]
    fn test_missing_tags_and_paths() {
        let loader = SpecLoader::new("/unused");
        let mut root = Mapping::new();
        root.insert("openapi".into(), "3.1.0".into());

        let spec = filter_spec(&loader, &root, &["/users"]);
        assert_eq!(spec["tags"], Value::Sequence(Vec::new()));
        assert_eq!(spec["paths"], Value::Mapping(Mapping::new()));
    }
}
