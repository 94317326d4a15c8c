//! Accessibility-tree snapshots
//!
//! A raw tree comes from a [`SnapshotSource`], is pruned by [`filter_snapshot`]
//! and rendered with [`format_snapshot`].

mod filter;
mod format;
mod node;
mod source;

pub use filter::{FilterArgs, FilterPolicy, PolicyError, filter_snapshot};
pub use format::format_snapshot;
pub use node::SnapshotNode;
pub use source::{SnapshotError, SnapshotOptions, SnapshotSource, build_filtered_snapshot};
