//! Tool response assembly
//!
//! Collects response lines and an optional snapshot, then delivers the
//! snapshot inline or persists it to a caller-supplied file.

use rmcp::model::Content;
use std::path::{Path, PathBuf};

use crate::snapshot::{SnapshotError, SnapshotNode, format_snapshot};

#[derive(Debug, Default)]
pub struct ToolResponse {
    lines: Vec<String>,
    snapshot: Option<IncludedSnapshot>,
}

#[derive(Debug)]
struct IncludedSnapshot {
    node: SnapshotNode,
    verbose: bool,
    file_path: Option<PathBuf>,
}

impl ToolResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Attach a snapshot. With `file_path` set it is written there as JSON
    /// instead of being inlined.
    pub fn include_snapshot(&mut self, node: SnapshotNode, verbose: bool, file_path: Option<PathBuf>) {
        self.snapshot = Some(IncludedSnapshot {
            node,
            verbose,
            file_path,
        });
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn snapshot(&self) -> Option<&SnapshotNode> {
        self.snapshot.as_ref().map(|s| &s.node)
    }

    /// Render the response text, writing the snapshot file if one was requested
    pub async fn render(self) -> Result<String, SnapshotError> {
        let mut text = self.lines.join("\n");

        if let Some(included) = self.snapshot {
            if !text.is_empty() {
                text.push('\n');
            }
            match included.file_path {
                Some(path) => {
                    let path = resolve_path(&path)?;
                    let json = serde_json::to_string_pretty(&included.node)?;
                    tokio::fs::write(&path, json).await?;
                    tracing::info!(path = %path.display(), "Saved snapshot");
                    text.push_str(&format!("Saved snapshot to {}.", path.display()));
                }
                None => {
                    text.push_str("## Latest page snapshot\n");
                    text.push_str(&format_snapshot(&included.node, included.verbose));
                }
            }
        }

        Ok(text)
    }

    pub async fn into_contents(self) -> Result<Vec<Content>, SnapshotError> {
        Ok(vec![Content::text(self.render().await?)])
    }
}

fn resolve_path(path: &Path) -> Result<PathBuf, SnapshotError> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn inline_snapshot_follows_lines() {
        let mut response = ToolResponse::new();
        response.append_line("Element with text \"Save\" found.");
        response.include_snapshot(
            SnapshotNode::new("1_0", "RootWebArea").with_name("Editor"),
            false,
            None,
        );

        let text = response.render().await.expect("render");
        assert_eq!(
            text,
            "Element with text \"Save\" found.\n## Latest page snapshot\nuid=1_0 RootWebArea \"Editor\"\n"
        );
    }

    #[tokio::test]
    async fn file_snapshot_is_persisted_as_json() {
        let path = std::env::temp_dir().join(format!(
            "kodegen_snapshot_response_{}.json",
            std::process::id()
        ));
        let node = SnapshotNode::new("1_0", "RootWebArea")
            .with_children(vec![SnapshotNode::new("1_1", "button").with_name("Save")]);

        let mut response = ToolResponse::new();
        response.include_snapshot(node.clone(), false, Some(path.clone()));
        let text = response.render().await.expect("render");

        assert_eq!(text, format!("Saved snapshot to {}.", path.display()));
        let saved: SnapshotNode =
            serde_json::from_str(&std::fs::read_to_string(&path).expect("file written"))
                .expect("valid json");
        assert_eq!(saved, node);

        let _ = std::fs::remove_file(&path);
    }
}
