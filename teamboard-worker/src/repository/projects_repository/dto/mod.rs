mod project_deadline;

pub use project_deadline::*;
