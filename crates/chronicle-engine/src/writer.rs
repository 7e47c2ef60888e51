use crate::Plan;

/// Seam between the pure in-memory engine and the side-effecting disk layer.
/// `chronicle-watch` provides the real implementation (lock-guarded writes
/// with a delayed release, spec.md §4.4); this crate only depends on the
/// trait, the same way `deepseek-core::ToolHost` is implemented elsewhere.
pub trait DiskWriter: Send + Sync {
    fn execute(&self, plan: &Plan);
}

/// A `DiskWriter` that does nothing, useful for tests that only care about
/// in-memory history state, and for hosts that manage disk I/O themselves.
#[derive(Debug, Default)]
pub struct NoopDiskWriter;

impl DiskWriter for NoopDiskWriter {
    fn execute(&self, _plan: &Plan) {}
}
