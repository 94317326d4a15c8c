use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One accessible element of a snapshot.
///
/// Everything except `children` is the node's identity and is carried through
/// filtering untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotNode {
    /// Identifier used to target later interactions (`<snapshot>_<index>`)
    pub uid: String,

    /// Semantic role, e.g. "button" or "none"
    #[serde(default)]
    pub role: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Extra properties reported by the source (focusable, checked, ...)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, serde_json::Value>,

    #[serde(default)]
    pub children: Vec<SnapshotNode>,
}

impl SnapshotNode {
    pub fn new(uid: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            role: role.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<SnapshotNode>) -> Self {
        self.children = children;
        self
    }

    /// Copy of this node's identity with a replacement child list
    pub(crate) fn rebuilt(&self, children: Vec<SnapshotNode>) -> Self {
        Self {
            uid: self.uid.clone(),
            role: self.role.clone(),
            name: self.name.clone(),
            value: self.value.clone(),
            description: self.description.clone(),
            attributes: self.attributes.clone(),
            children,
        }
    }

    /// Total number of nodes in this subtree, including `self`
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(SnapshotNode::node_count).sum::<usize>()
    }

    /// Depth-first search by uid
    pub fn find(&self, uid: &str) -> Option<&SnapshotNode> {
        if self.uid == uid {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(uid))
    }
}
