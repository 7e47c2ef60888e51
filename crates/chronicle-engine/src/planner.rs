use crate::FileMap;

/// Pure description of the writes/deletes needed to move disk from `current`
/// to `target`. Never touches disk itself (spec.md §4.3).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub writes: FileMap,
    pub deletes: Vec<String>,
}

impl Plan {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty() && self.deletes.is_empty()
    }
}

pub struct OperationPlanner;

impl OperationPlanner {
    pub fn plan(current: &FileMap, target: &FileMap) -> Plan {
        let mut writes = FileMap::new();
        for (path, content) in target {
            if current.get(path) != Some(content) {
                writes.insert(path.clone(), content.clone());
            }
        }
        let mut deletes: Vec<String> = current
            .keys()
            .filter(|path| !target.contains_key(*path))
            .cloned()
            .collect();
        deletes.sort();
        Plan { writes, deletes }
    }
}
