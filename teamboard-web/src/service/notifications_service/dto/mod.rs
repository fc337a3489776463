mod project_snapshot;
mod user_summary;

pub use project_snapshot::*;
pub use user_summary::*;
