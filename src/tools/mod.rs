//! Snapshot tool implementations

mod take_snapshot;
mod wait_for;

pub use take_snapshot::{TakeSnapshotArgs, TakeSnapshotTool};
pub use wait_for::{WaitForArgs, WaitForTool};

use rmcp::model::Content;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use std::future::Future;

use crate::utils::ToolError;

/// Grouping used when listing tools to a client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolCategory {
    Navigation,
    Debugging,
}

/// A browser tool callable by an MCP host
pub trait Tool: Send + Sync + 'static {
    type Args: DeserializeOwned + JsonSchema + Send;

    fn name() -> &'static str;

    fn description() -> &'static str;

    fn category() -> ToolCategory;

    fn read_only() -> bool {
        false
    }

    /// JSON schema for `Args`, as advertised to clients
    fn input_schema() -> serde_json::Value {
        serde_json::to_value(schemars::schema_for!(Self::Args)).unwrap_or_default()
    }

    fn execute(
        &self,
        args: Self::Args,
    ) -> impl Future<Output = Result<Vec<Content>, ToolError>> + Send;
}
