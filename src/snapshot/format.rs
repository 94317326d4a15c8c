use std::fmt::Write as _;

use super::node::SnapshotNode;

/// Names longer than this are truncated in the text rendering
const MAX_NAME_CHARS: usize = 200;

/// Render a snapshot as indented text, one node per line:
///
/// ```text
/// uid=1_0 RootWebArea "Example"
///   uid=1_1 button "Save" focusable
/// ```
///
/// Verbose output adds every extra attribute as `key=value`; otherwise only
/// boolean flags that are set are listed.
pub fn format_snapshot(root: &SnapshotNode, verbose: bool) -> String {
    let mut output = String::new();
    format_node(root, 0, verbose, &mut output);
    output
}

fn format_node(node: &SnapshotNode, depth: usize, verbose: bool, output: &mut String) {
    let mut attrs = vec![format!("uid={}", node.uid)];

    if !node.role.is_empty() {
        attrs.push(node.role.clone());
    }

    if let Some(name) = node.name.as_deref().filter(|n| !n.is_empty()) {
        attrs.push(quote(&truncate(name)));
    }
    if let Some(value) = node.value.as_deref().filter(|v| !v.is_empty()) {
        attrs.push(format!("value={}", quote(value)));
    }
    if let Some(description) = node.description.as_deref().filter(|d| !d.is_empty()) {
        attrs.push(format!("description={}", quote(description)));
    }

    for (key, value) in &node.attributes {
        match value {
            serde_json::Value::Bool(true) => attrs.push(key.clone()),
            serde_json::Value::Bool(false) if !verbose => {}
            serde_json::Value::String(s) if verbose => attrs.push(format!("{key}={}", quote(s))),
            other if verbose => attrs.push(format!("{key}={other}")),
            _ => {}
        }
    }

    let _ = writeln!(output, "{}{}", "  ".repeat(depth), attrs.join(" "));

    for child in &node.children {
        format_node(child, depth + 1, verbose, output);
    }
}

fn truncate(text: &str) -> String {
    if text.chars().count() > MAX_NAME_CHARS {
        format!("{}...", text.chars().take(MAX_NAME_CHARS).collect::<String>())
    } else {
        text.to_string()
    }
}

fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\\\""))
}
