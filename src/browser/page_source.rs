//! chromiumoxide collaborators: raw accessibility trees and page text
//!
//! The CDP `Accessibility.getFullAXTree` response is a flat node list linked
//! by ids; it is assembled here into a [`SnapshotNode`] tree with uids of the
//! form `<snapshot id>_<pre-order index>`.

use chromiumoxide::Page;
use chromiumoxide_cdp::cdp::browser_protocol::accessibility::{
    AxNode, AxValue, EnableParams as AxEnableParams, GetFullAxTreeParams,
};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::snapshot::{SnapshotError, SnapshotNode};

const PAGE_TEXT_SCRIPT: &str =
    "(function(){ try { return document.body ? document.body.innerText : ''; } catch (e) { return ''; } })()";

/// Fetch the full accessibility tree of `page`
pub async fn capture_ax_tree(
    page: &Page,
    snapshot_id: u64,
    verbose: bool,
) -> Result<SnapshotNode, SnapshotError> {
    page.execute(AxEnableParams::default())
        .await
        .map_err(|e| SnapshotError::Cdp(format!("failed to enable accessibility: {e}")))?;

    let response = page
        .execute(GetFullAxTreeParams::default())
        .await
        .map_err(|e| SnapshotError::Cdp(format!("failed to get accessibility tree: {e}")))?;

    assemble_tree(&response.result.nodes, snapshot_id, verbose)
}

/// Rendered text of the page body
pub async fn sample_page_text(page: &Page) -> Result<String, SnapshotError> {
    let text = page
        .evaluate(PAGE_TEXT_SCRIPT)
        .await
        .map_err(|e| SnapshotError::Cdp(format!("failed to read page text: {e}")))?
        .into_value::<String>()
        .map_err(|e| SnapshotError::Cdp(format!("page text was not a string: {e}")))?;
    Ok(text)
}

/// Link a flat CDP node list into a tree.
///
/// Without `verbose`, nodes Chrome marks as ignored are skipped and their
/// children take their place. The root is always kept.
pub(crate) fn assemble_tree(
    nodes: &[AxNode],
    snapshot_id: u64,
    verbose: bool,
) -> Result<SnapshotNode, SnapshotError> {
    let root = nodes
        .iter()
        .find(|node| node.parent_id.is_none())
        .ok_or(SnapshotError::MissingRoot)?;

    let mut assembler = TreeAssembler {
        by_id: nodes
            .iter()
            .map(|node| (node.node_id.inner().as_str(), node))
            .collect(),
        visited: HashSet::new(),
        snapshot_id,
        verbose,
        next_index: 0,
    };

    assembler.visited.insert(root.node_id.inner().as_str());
    let mut tree = assembler.convert(root);
    tree.children = assembler.children_of(root);
    Ok(tree)
}

struct TreeAssembler<'a> {
    by_id: HashMap<&'a str, &'a AxNode>,
    visited: HashSet<&'a str>,
    snapshot_id: u64,
    verbose: bool,
    next_index: u64,
}

impl<'a> TreeAssembler<'a> {
    fn children_of(&mut self, node: &'a AxNode) -> Vec<SnapshotNode> {
        let mut children = Vec::new();

        for child_id in node.child_ids.iter().flatten() {
            let Some(child) = self.by_id.get(child_id.inner().as_str()).copied() else {
                continue;
            };
            // CDP occasionally reports a node under two parents; keep the first
            if !self.visited.insert(child.node_id.inner().as_str()) {
                continue;
            }

            if child.ignored && !self.verbose {
                children.extend(self.children_of(child));
            } else {
                let mut converted = self.convert(child);
                converted.children = self.children_of(child);
                children.push(converted);
            }
        }

        children
    }

    fn convert(&mut self, node: &AxNode) -> SnapshotNode {
        let uid = format!("{}_{}", self.snapshot_id, self.next_index);
        self.next_index += 1;

        let mut attributes = BTreeMap::new();
        for property in node.properties.iter().flatten() {
            let Some(value) = property.value.value.clone() else {
                continue;
            };
            if let Ok(serde_json::Value::String(key)) = serde_json::to_value(&property.name) {
                attributes.insert(key, value);
            }
        }
        if let Some(backend_id) = &node.backend_dom_node_id {
            attributes.insert("backendNodeId".to_string(), serde_json::json!(*backend_id.inner()));
        }
        if self.verbose && node.ignored {
            attributes.insert("ignored".to_string(), serde_json::Value::Bool(true));
        }

        SnapshotNode {
            uid,
            role: ax_string(&node.role).unwrap_or_default(),
            name: ax_string(&node.name),
            value: ax_string(&node.value),
            description: ax_string(&node.description),
            attributes,
            children: Vec::new(),
        }
    }
}

fn ax_string(value: &Option<AxValue>) -> Option<String> {
    match value.as_ref()?.value.as_ref()? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}
