use async_trait::async_trait;
use thiserror::Error;

use super::filter::{FilterPolicy, filter_snapshot};
use super::node::SnapshotNode;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("No page loaded. Navigate to a page first.")]
    NoPage,

    #[error("CDP command failed: {0}")]
    Cdp(String),

    #[error("Accessibility tree has no root node")]
    MissingRoot,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Producer of raw accessibility trees with per-node uids
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Capture the current page. `verbose` asks for every node the
    /// accessibility layer knows about, including ones it marks as ignored.
    async fn raw_tree(&self, verbose: bool) -> Result<SnapshotNode, SnapshotError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotOptions<'a> {
    pub verbose: bool,
    pub filter: Option<&'a FilterPolicy>,
}

/// Capture a raw tree from `source` and prune it with the caller's filter
pub async fn build_filtered_snapshot<S>(
    source: &S,
    options: SnapshotOptions<'_>,
) -> Result<SnapshotNode, SnapshotError>
where
    S: SnapshotSource + ?Sized,
{
    let raw = source.raw_tree(options.verbose).await?;
    let snapshot = filter_snapshot(&raw, options.filter);

    tracing::debug!(
        raw_nodes = raw.node_count(),
        kept_nodes = snapshot.node_count(),
        verbose = options.verbose,
        filtered = options.filter.is_some(),
        "Built accessibility snapshot"
    );

    Ok(snapshot)
}
