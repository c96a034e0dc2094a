//! Recursive structural matcher and the public matching entry points.

use ego_tree::NodeId;
use scraper::{ElementRef, Html};
use tracing::debug;

use crate::builder::{SnapshotEngine, SnapshotOptions};
use crate::render::{render_aria_tree, RenderOptions};
use crate::score::best_diff_candidate;
use crate::template::{ContainerMode, RoleTemplate, TemplateNode, TextPattern};
use crate::tree::{AriaNode, NodeChild};

/// Rendered forms of the snapshot a match ran against. `diff_target` is set
/// only when nothing matched: the best-candidate subtree, rendered so a
/// caller can diff it against the template's own rendering.
#[derive(Debug)]
pub struct ReceivedTree {
    pub raw: String,
    pub regex: String,
    pub diff_target: Option<String>,
}

/// Outcome of [`matches_aria_tree`]: the source elements of every matching
/// subtree plus the rendered snapshot. A mismatch is not an error; it is
/// `matches.is_empty()` with a populated `diff_target`.
#[derive(Debug)]
pub struct TreeMatchResult {
    pub matches: Vec<NodeId>,
    pub received: ReceivedTree,
}

/// Match a template anywhere in the subtree under `root`.
pub fn matches_aria_tree(
    engine: &mut SnapshotEngine,
    doc: &Html,
    root: ElementRef<'_>,
    template: &TemplateNode,
) -> TreeMatchResult {
    let snapshot = engine.snapshot(doc, root, &SnapshotOptions::default());
    let matched = matches_node_deep(&snapshot.root, template, false, false);
    debug!(matches = matched.len(), "template match");

    let raw = render_aria_tree(&snapshot.root, &RenderOptions::raw());
    let regex = render_aria_tree(&snapshot.root, &RenderOptions::regex());
    let diff_target = matched.is_empty().then(|| {
        let candidate = best_diff_candidate(&snapshot.root, template);
        render_aria_tree(&candidate, &RenderOptions::raw())
    });

    TreeMatchResult {
        matches: matched.iter().filter_map(|node| node.element).collect(),
        received: ReceivedTree {
            raw,
            regex,
            diff_target,
        },
    }
}

/// Source elements of every subtree matching the template.
pub fn get_all_by_aria(
    engine: &mut SnapshotEngine,
    doc: &Html,
    root: ElementRef<'_>,
    template: &TemplateNode,
) -> Vec<NodeId> {
    let snapshot = engine.snapshot(doc, root, &SnapshotOptions::default());
    matches_node_deep(&snapshot.root, template, true, false)
        .iter()
        .filter_map(|node| node.element)
        .collect()
}

/// DFS that tries a full template match at every node. A hit on a string
/// child records its parent node. Stops at the first hit unless
/// `collect_all` is set.
pub fn matches_node_deep<'a>(
    root: &'a AriaNode,
    template: &TemplateNode,
    collect_all: bool,
    is_deep_equal: bool,
) -> Vec<&'a AriaNode> {
    let mut results = Vec::new();
    visit_deep(root, template, collect_all, is_deep_equal, &mut results);
    results
}

fn visit_deep<'a>(
    node: &'a AriaNode,
    template: &TemplateNode,
    collect_all: bool,
    is_deep_equal: bool,
    results: &mut Vec<&'a AriaNode>,
) -> bool {
    if let TemplateNode::Role(role_template) = template {
        if matches_role(node, role_template, is_deep_equal) {
            results.push(node);
            return !collect_all;
        }
    }
    for child in &node.children {
        match child {
            NodeChild::Text(text) => {
                if let TemplateNode::Text(pattern) = template {
                    if matches_text(Some(text), Some(pattern)) {
                        results.push(node);
                        if !collect_all {
                            return true;
                        }
                    }
                }
            }
            NodeChild::Node(inner) => {
                if visit_deep(inner, template, collect_all, is_deep_equal, results) {
                    return true;
                }
            }
        }
    }
    false
}

/// Whether one child (node or text) satisfies one template node.
pub fn matches_node(child: &NodeChild, template: &TemplateNode, is_deep_equal: bool) -> bool {
    match (child, template) {
        (NodeChild::Text(text), TemplateNode::Text(pattern)) => {
            matches_text(Some(text), Some(pattern))
        }
        (NodeChild::Node(node), TemplateNode::Role(role_template)) => {
            matches_role(node, role_template, is_deep_equal)
        }
        _ => false,
    }
}

pub(crate) fn matches_role(node: &AriaNode, template: &RoleTemplate, is_deep_equal: bool) -> bool {
    if template.role != "fragment" && template.role != node.role {
        return false;
    }
    if template.checked.is_some() && template.checked != node.checked {
        return false;
    }
    if template.disabled.is_some() && template.disabled != node.disabled {
        return false;
    }
    if template.expanded.is_some() && template.expanded != node.expanded {
        return false;
    }
    if template.level.is_some() && template.level != node.level {
        return false;
    }
    if template.pressed.is_some() && template.pressed != node.pressed {
        return false;
    }
    if template.selected.is_some() && template.selected != node.selected {
        return false;
    }
    if !matches_text(Some(&node.name), template.name.as_ref()) {
        return false;
    }
    if !matches_text(
        node.props.get("url").map(String::as_str),
        template.url.as_ref(),
    ) {
        return false;
    }

    match template.container_mode {
        Some(ContainerMode::Contain) => contains_list(&node.children, &template.children),
        Some(ContainerMode::Equal) => list_equal(&node.children, &template.children, false),
        Some(ContainerMode::DeepEqual) => list_equal(&node.children, &template.children, true),
        None if is_deep_equal => list_equal(&node.children, &template.children, true),
        None => contains_list(&node.children, &template.children),
    }
}

fn list_equal(children: &[NodeChild], templates: &[TemplateNode], is_deep_equal: bool) -> bool {
    children.len() == templates.len()
        && children
            .iter()
            .zip(templates)
            .all(|(child, template)| matches_node(child, template, is_deep_equal))
}

/// Greedy in-order subsequence check: advance through the actual children,
/// consuming one match per template child. Intentionally not backtracking;
/// this greediness is the observable contract.
fn contains_list(children: &[NodeChild], templates: &[TemplateNode]) -> bool {
    if templates.len() > children.len() {
        return false;
    }
    let mut remaining = children.iter();
    'templates: for template in templates {
        for child in remaining.by_ref() {
            if matches_node(child, template, false) {
                continue 'templates;
            }
        }
        return false;
    }
    true
}

/// Empty template ⇒ match; empty text ⇒ no match; literal ⇒ equality;
/// regex ⇒ unanchored search.
pub fn matches_text(text: Option<&str>, pattern: Option<&TextPattern>) -> bool {
    let Some(pattern) = pattern else {
        return true;
    };
    if let TextPattern::Literal(literal) = pattern {
        if literal.is_empty() {
            return true;
        }
    }
    let Some(text) = text else {
        return false;
    };
    if text.is_empty() {
        return false;
    }
    match pattern {
        TextPattern::Literal(literal) => text == literal,
        TextPattern::Pattern(re) => re.find(text).is_some(),
    }
}
