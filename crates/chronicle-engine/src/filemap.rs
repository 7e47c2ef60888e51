use std::collections::BTreeMap;

/// `{path -> content}`. Absence of a key means "the file does not exist at
/// this snapshot"; an empty string is distinct and means "exists, empty"
/// (spec.md §3), a distinction this type never collapses.
pub type FileMap = BTreeMap<String, String>;
