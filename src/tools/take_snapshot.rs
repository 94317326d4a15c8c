//! take_snapshot tool - accessibility-tree snapshot of the selected page

use rmcp::model::Content;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use super::{Tool, ToolCategory};
use crate::response::ToolResponse;
use crate::snapshot::{FilterArgs, FilterPolicy, SnapshotOptions, SnapshotSource, build_filtered_snapshot};
use crate::utils::ToolError;

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TakeSnapshotArgs {
    /// Whether to include all possible information available in the full a11y tree. Default is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,

    /// The absolute path, or a path relative to the current working directory,
    /// to save the snapshot to instead of attaching it to the response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,

    /// Specialized filter to include/exclude roles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterArgs>,
}

pub struct TakeSnapshotTool<S: ?Sized> {
    source: Arc<S>,
}

impl<S: ?Sized> Clone for TakeSnapshotTool<S> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
        }
    }
}

impl<S> TakeSnapshotTool<S>
where
    S: SnapshotSource + ?Sized + 'static,
{
    pub fn new(source: Arc<S>) -> Self {
        Self { source }
    }

    /// Build the response without rendering it
    pub async fn run(&self, args: TakeSnapshotArgs) -> Result<ToolResponse, ToolError> {
        // Only the caller's filter is applied; no default pruning here.
        let policy = args.filter.map(FilterPolicy::try_from).transpose()?;
        let verbose = args.verbose.unwrap_or(false);

        let snapshot = build_filtered_snapshot(
            self.source.as_ref(),
            SnapshotOptions {
                verbose,
                filter: policy.as_ref(),
            },
        )
        .await?;

        let mut response = ToolResponse::new();
        response.include_snapshot(snapshot, verbose, args.file_path.map(PathBuf::from));
        Ok(response)
    }
}

impl<S> Tool for TakeSnapshotTool<S>
where
    S: SnapshotSource + ?Sized + 'static,
{
    type Args = TakeSnapshotArgs;

    fn name() -> &'static str {
        "take_snapshot"
    }

    fn description() -> &'static str {
        "Take a text snapshot of the currently selected page based on the a11y tree. \
         The snapshot lists page elements along with a unique identifier (uid). \
         Always use the latest snapshot. Prefer taking a snapshot over taking a screenshot.\n\n\
         Example: take_snapshot({})\n\
         Example: take_snapshot({\"filter\": {\"ignoreRoles\": [\"none\", \"option\"]}})\n\
         Example: take_snapshot({\"filePath\": \"snapshot.json\"})"
    }

    fn category() -> ToolCategory {
        ToolCategory::Debugging
    }

    fn read_only() -> bool {
        false // filePath writes to disk
    }

    async fn execute(&self, args: Self::Args) -> Result<Vec<Content>, ToolError> {
        Ok(self.run(args).await?.into_contents().await?)
    }
}
