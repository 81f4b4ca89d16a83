//! Run-level orchestration shared by the binary and integration tests

pub mod orchestration;

pub use orchestration::{run_tagging_workflow, TaggingWorkflowArgs, WorkflowResult};
