use crate::FileMap;
use serde::{Deserialize, Serialize};

/// One changed path between two `FileMap`s. `None` means "does not exist at
/// that snapshot"; `Some(String::new())` is distinct and means "exists, is
/// empty" (spec.md §4.2).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDiff {
    pub path: String,
    pub before: Option<String>,
    pub after: Option<String>,
}

/// Pure computation: `base x current -> [{path, before, after}]`. Order of
/// the returned entries is unspecified (callers must treat it as a set,
/// spec.md §4.2); we iterate in path order purely for deterministic tests.
pub struct DiffEngine;

impl DiffEngine {
    pub fn diff(base: &FileMap, current: &FileMap) -> Vec<FileDiff> {
        let mut paths: Vec<&String> = base.keys().chain(current.keys()).collect();
        paths.sort();
        paths.dedup();

        paths
            .into_iter()
            .filter_map(|path| {
                let before = base.get(path);
                let after = current.get(path);
                if before == after {
                    return None;
                }
                Some(FileDiff {
                    path: path.clone(),
                    before: before.cloned(),
                    after: after.cloned(),
                })
            })
            .collect()
    }
}
