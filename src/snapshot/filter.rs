//! Role-based pruning of snapshot trees
//!
//! - A node whose role is in `preserve_roles` is always kept.
//! - A node whose role is in `ignore_roles` is removed with its whole subtree.
//! - Any other node is kept with its filtered children.
//!
//! Both checks run per node; a preserved parent does not shield its children.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use super::node::SnapshotNode;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("{list} contains an empty role; remove the entry or give it a role name")]
    BlankRole { list: &'static str },
}

/// Filter shape accepted on the tool surface
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FilterArgs {
    /// Roles to remove (with their subtrees) from the snapshot, e.g. ["none", "option"]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_roles: Option<Vec<String>>,

    /// Roles to always keep, even if present in ignoreRoles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preserve_roles: Option<Vec<String>>,
}

/// Normalized role sets. Entries are trimmed and lower-cased; blank entries
/// are rejected so that no entry can match an unset role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPolicy {
    ignore_roles: HashSet<String>,
    preserve_roles: HashSet<String>,
}

impl FilterPolicy {
    pub fn new<I, P>(ignore_roles: I, preserve_roles: P) -> Result<Self, PolicyError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        Ok(Self {
            ignore_roles: normalize_roles(ignore_roles, "ignoreRoles")?,
            preserve_roles: normalize_roles(preserve_roles, "preserveRoles")?,
        })
    }

    pub fn ignores(&self, role: &str) -> bool {
        self.ignore_roles.contains(&role.to_lowercase())
    }

    pub fn preserves(&self, role: &str) -> bool {
        self.preserve_roles.contains(&role.to_lowercase())
    }

    /// Whether a node with `role` is removed along with its subtree.
    /// Preservation wins over ignore.
    pub fn drops(&self, role: &str) -> bool {
        let role = role.to_lowercase();
        self.ignore_roles.contains(&role) && !self.preserve_roles.contains(&role)
    }
}

impl TryFrom<FilterArgs> for FilterPolicy {
    type Error = PolicyError;

    fn try_from(args: FilterArgs) -> Result<Self, Self::Error> {
        FilterPolicy::new(
            args.ignore_roles.unwrap_or_default(),
            args.preserve_roles.unwrap_or_default(),
        )
    }
}

fn normalize_roles<I>(roles: I, list: &'static str) -> Result<HashSet<String>, PolicyError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    roles
        .into_iter()
        .map(|role| {
            let role = role.as_ref().trim();
            if role.is_empty() {
                Err(PolicyError::BlankRole { list })
            } else {
                Ok(role.to_lowercase())
            }
        })
        .collect()
}

/// Returns a new tree with nodes filtered according to `policy`.
///
/// Without a policy the tree is returned unchanged. The root is never dropped:
/// if its own role is ignored, the result is the root with no children.
pub fn filter_snapshot(root: &SnapshotNode, policy: Option<&FilterPolicy>) -> SnapshotNode {
    let Some(policy) = policy else {
        return root.clone();
    };

    visit(root, policy).unwrap_or_else(|| root.rebuilt(Vec::new()))
}

fn visit(node: &SnapshotNode, policy: &FilterPolicy) -> Option<SnapshotNode> {
    if policy.drops(&node.role) {
        return None;
    }

    let children = node
        .children
        .iter()
        .filter_map(|child| visit(child, policy))
        .collect();
    Some(node.rebuilt(children))
}
