//! Post-build tree normalization: text coalescing, name subsumption, and
//! elision of structural `generic` wrappers.

use crate::text::normalize_whitespace;
use crate::tree::{AriaNode, NodeChild};

/// Fold consecutive string children into one whitespace-normalized run,
/// dropping empties. A node whose only remaining child is a string equal to
/// its own name loses that child; the name already carries the content.
pub fn normalize_string_children(node: &mut AriaNode) {
    let mut normalized = Vec::with_capacity(node.children.len());
    let mut buffer = String::new();

    for child in node.children.drain(..) {
        match child {
            NodeChild::Text(text) => buffer.push_str(&text),
            NodeChild::Node(mut inner) => {
                flush(&mut buffer, &mut normalized);
                normalize_string_children(&mut inner);
                normalized.push(NodeChild::Node(inner));
            }
        }
    }
    flush(&mut buffer, &mut normalized);

    if normalized.len() == 1 && normalized[0].as_text() == Some(node.name.as_str()) {
        normalized.clear();
    }
    node.children = normalized;
}

fn flush(buffer: &mut String, out: &mut Vec<NodeChild>) {
    if buffer.is_empty() {
        return;
    }
    let text = normalize_whitespace(buffer);
    if !text.is_empty() {
        out.push(NodeChild::Text(text));
    }
    buffer.clear();
}

/// Depth-first post-order pass that splices out `generic` nodes adding no
/// structure: at most one child, and every remaining child an element that
/// receives pointer events.
pub fn normalize_generic_roles(root: &mut AriaNode) {
    let children = std::mem::take(&mut root.children);
    let mut result = Vec::with_capacity(children.len());
    for child in children {
        append_normalized(child, &mut result);
    }
    root.children = result;
}

fn normalize_node(mut node: AriaNode) -> Vec<NodeChild> {
    let children = std::mem::take(&mut node.children);
    let mut result = Vec::with_capacity(children.len());
    for child in children {
        append_normalized(child, &mut result);
    }

    let remove_self = node.role == "generic"
        && result.len() <= 1
        && result
            .iter()
            .all(|c| c.as_node().is_some_and(|n| n.receives_pointer_events));
    if remove_self {
        return result;
    }
    node.children = result;
    vec![NodeChild::Node(node)]
}

fn append_normalized(child: NodeChild, out: &mut Vec<NodeChild>) {
    match child {
        NodeChild::Text(text) => push_text(text, out),
        NodeChild::Node(node) => {
            for replacement in normalize_node(node) {
                match replacement {
                    NodeChild::Text(text) => push_text(text, out),
                    node => out.push(node),
                }
            }
        }
    }
}

/// Elision can leave two string children adjacent; keep them coalesced so
/// renderers and matchers never see consecutive text runs.
fn push_text(text: String, out: &mut Vec<NodeChild>) {
    if let Some(NodeChild::Text(last)) = out.last_mut() {
        last.push(' ');
        last.push_str(&text);
        *last = normalize_whitespace(last);
        return;
    }
    out.push(NodeChild::Text(text));
}
