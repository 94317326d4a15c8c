//! wait_for tool - waits for text to appear, then returns a fresh snapshot

use rmcp::model::Content;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::{Tool, ToolCategory};
use crate::WaitConfig;
use crate::response::ToolResponse;
use crate::snapshot::{SnapshotOptions, SnapshotSource, build_filtered_snapshot};
use crate::utils::{ToolError, validate_wait_timeout};
use crate::wait::{TextSampler, TextWaiter, WaitSpec};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WaitForArgs {
    /// Text to appear on the page
    pub text: String,

    /// Maximum wait time in milliseconds. Uses the configured default when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

pub struct WaitForTool<C: ?Sized> {
    page: Arc<C>,
    waiter: TextWaiter,
    config: WaitConfig,
    cancel: CancellationToken,
}

impl<C: ?Sized> Clone for WaitForTool<C> {
    fn clone(&self) -> Self {
        Self {
            page: self.page.clone(),
            waiter: self.waiter.clone(),
            config: self.config.clone(),
            cancel: self.cancel.clone(),
        }
    }
}

impl<C> WaitForTool<C>
where
    C: SnapshotSource + TextSampler + ?Sized + 'static,
{
    /// `cancel` is the session token; cancelling it aborts in-flight waits.
    pub fn new(page: Arc<C>, config: WaitConfig, cancel: CancellationToken) -> Self {
        Self {
            page,
            waiter: TextWaiter::from_config(&config),
            config,
            cancel,
        }
    }

    /// Build the response without rendering it
    pub async fn run(&self, args: WaitForArgs) -> Result<ToolResponse, ToolError> {
        let timeout = validate_wait_timeout(args.timeout, &self.config)?;
        let spec = WaitSpec::new(args.text, timeout);
        let cancel = self.cancel.child_token();

        let outcome = self
            .waiter
            .wait_for_text(self.page.as_ref(), &spec, &cancel)
            .await?;
        tracing::info!(
            text = %spec.text,
            samples = outcome.samples,
            elapsed_ms = outcome.elapsed.as_millis() as u64,
            "wait_for satisfied"
        );

        let snapshot = build_filtered_snapshot(self.page.as_ref(), SnapshotOptions::default()).await?;

        let mut response = ToolResponse::new();
        response.append_line(format!("Element with text \"{}\" found.", spec.text));
        response.include_snapshot(snapshot, false, None);
        Ok(response)
    }
}

impl<C> Tool for WaitForTool<C>
where
    C: SnapshotSource + TextSampler + ?Sized + 'static,
{
    type Args = WaitForArgs;

    fn name() -> &'static str {
        "wait_for"
    }

    fn description() -> &'static str {
        "Wait for the specified text to appear on the selected page.\n\n\
         Returns a fresh snapshot once the text is found.\n\n\
         Example: wait_for({\"text\": \"Order confirmed\"})\n\
         Example: wait_for({\"text\": \"Save\", \"timeout\": 5000})"
    }

    fn category() -> ToolCategory {
        ToolCategory::Navigation
    }

    fn read_only() -> bool {
        true
    }

    async fn execute(&self, args: Self::Args) -> Result<Vec<Content>, ToolError> {
        Ok(self.run(args).await?.into_contents().await?)
    }
}
