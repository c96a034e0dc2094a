//! Canonical YAML-sequence rendering of a snapshot.
//!
//! Raw mode emits literal text. Regex mode generalizes dynamic content
//! (counters, sizes, durations) into patterns and drops text whose
//! information the parent's name already carries, so the output stays valid
//! as a template for future runs.

use regex::Regex;

use crate::text::{
    json_quote, longest_common_substring, yaml_escape_key_if_needed, yaml_escape_value_if_needed,
};
use crate::tree::{AriaNode, NodeChild, Tristate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Raw,
    Regex,
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub mode: RenderMode,
    /// Annotate pointer-receiving nodes with `[ref=…]` and `[cursor=pointer]`.
    pub for_ai: bool,
}

impl RenderOptions {
    pub fn raw() -> Self {
        Self {
            mode: RenderMode::Raw,
            for_ai: false,
        }
    }

    pub fn regex() -> Self {
        Self {
            mode: RenderMode::Regex,
            for_ai: false,
        }
    }
}

/// Render a tree as a two-space-indented YAML sequence. A `fragment` root
/// emits only its children.
pub fn render_aria_tree(root: &AriaNode, options: &RenderOptions) -> String {
    let mut lines = Vec::new();
    if root.role == "fragment" {
        for child in &root.children {
            render_child(child, Some(root), "", options, &mut lines);
        }
    } else {
        render_node(root, "", options, &mut lines);
    }
    lines.join("\n")
}

fn render_child(
    child: &NodeChild,
    parent: Option<&AriaNode>,
    indent: &str,
    options: &RenderOptions,
    lines: &mut Vec<String>,
) {
    match child {
        NodeChild::Text(text) => {
            if options.mode == RenderMode::Regex {
                if let Some(parent) = parent {
                    if !text_contributes_info(parent, text) {
                        return;
                    }
                }
            }
            let rendered = render_string(text, options);
            if !rendered.is_empty() {
                lines.push(format!(
                    "{indent}- text: {}",
                    yaml_escape_value_if_needed(&rendered)
                ));
            }
        }
        NodeChild::Node(node) => render_node(node, indent, options, lines),
    }
}

fn render_node(node: &AriaNode, indent: &str, options: &RenderOptions, lines: &mut Vec<String>) {
    let mut key = node.role.clone();

    // YAML caps keys at 1024 characters; leave room for role and attributes.
    if !node.name.is_empty() && node.name.chars().count() <= 900 {
        let name = render_string(&node.name, options);
        if !name.is_empty() {
            key.push(' ');
            if name.len() >= 2 && name.starts_with('/') && name.ends_with('/') {
                key.push_str(&name);
            } else {
                key.push_str(&json_quote(&name));
            }
        }
    }

    match node.checked {
        Some(Tristate::Mixed) => key.push_str(" [checked=mixed]"),
        Some(Tristate::True) => key.push_str(" [checked]"),
        _ => {}
    }
    if node.disabled == Some(true) {
        key.push_str(" [disabled]");
    }
    if node.expanded == Some(true) {
        key.push_str(" [expanded]");
    }
    if let Some(level) = node.level {
        key.push_str(&format!(" [level={level}]"));
    }
    match node.pressed {
        Some(Tristate::Mixed) => key.push_str(" [pressed=mixed]"),
        Some(Tristate::True) => key.push_str(" [pressed]"),
        _ => {}
    }
    if node.selected == Some(true) {
        key.push_str(" [selected]");
    }
    if options.for_ai && node.receives_pointer_events {
        if let Some(aria_ref) = &node.aria_ref {
            key.push_str(&format!(" [ref={aria_ref}]"));
            if node.box_info.cursor.as_deref() == Some("pointer") {
                key.push_str(" [cursor=pointer]");
            }
        }
    }

    let key_line = format!("{indent}- {}", yaml_escape_key_if_needed(&key));
    let has_props = !node.props.is_empty();

    if node.children.is_empty() && !has_props {
        lines.push(key_line);
        return;
    }

    if let [NodeChild::Text(text)] = node.children.as_slice() {
        if !has_props {
            let included =
                options.mode != RenderMode::Regex || text_contributes_info(node, text);
            if included {
                let rendered = render_string(text, options);
                if !rendered.is_empty() {
                    lines.push(format!(
                        "{key_line}: {}",
                        yaml_escape_value_if_needed(&rendered)
                    ));
                    return;
                }
            }
            lines.push(key_line);
            return;
        }
    }

    lines.push(format!("{key_line}:"));
    let child_indent = format!("{indent}  ");
    for (name, value) in &node.props {
        lines.push(format!(
            "{child_indent}- /{name}: {}",
            yaml_escape_value_if_needed(value)
        ));
    }
    for child in &node.children {
        render_child(child, Some(node), &child_indent, options, lines);
    }
}

fn render_string(text: &str, options: &RenderOptions) -> String {
    match options.mode {
        RenderMode::Raw => text.to_string(),
        RenderMode::Regex => to_best_guess_regex(text),
    }
}

/// Whether a text run adds information beyond its parent's name: repeatedly
/// strip the longest common substring with the name and keep the text only
/// if more than 10% of it survives.
fn text_contributes_info(node: &AriaNode, text: &str) -> bool {
    if text.is_empty() {
        return false;
    }
    if node.name.is_empty() {
        return true;
    }
    if node.name.chars().count() > text.chars().count() {
        return false;
    }

    let common = if text.len() <= 200 && node.name.len() <= 200 {
        longest_common_substring(text, &node.name)
    } else {
        String::new()
    };
    let mut filtered = text.to_string();
    while !common.is_empty() && filtered.contains(&common) {
        filtered = filtered.replacen(&common, "", 1);
    }
    filtered.trim().chars().count() as f64 / text.chars().count() as f64 > 0.1
}

const DYNAMIC_REPLACEMENTS: [&str; 6] = [
    r"[\d,.]+[bkmBKM]+",
    r"\d+[hmsp]+",
    r"[\d,.]+[hmsp]+",
    r"\d+,\d+",
    r"\d+\.\d+",
    r"\d+",
];

fn dynamic_content_regex() -> Regex {
    // Sizes (2mb), durations (20s, 1h30m), grouped and decimal numbers,
    // multi-digit integers. Single digits stay literal.
    Regex::new(
        r"(\b[\d,.]+[bkmBKM]+\b)|(\b\d+[hmsp]+\b)|(\b[\d,.]+[hmsp]+\b)|(\b\d+,\d+\b)|(\b\d+\.\d{2,}\b)|(\b\d{2,}\b)",
    )
    .expect("valid pattern")
}

/// Replace dynamic numeric content with regex equivalents and escape the
/// rest. Returns the literal text unchanged when nothing dynamic is found,
/// otherwise the slash-delimited pattern source.
fn to_best_guess_regex(text: &str) -> String {
    let finder = dynamic_content_regex();
    let mut pattern = String::new();
    let mut last = 0;

    for caps in finder.captures_iter(text) {
        let Some(full) = caps.get(0) else {
            continue;
        };
        let Some(group) = (1..=DYNAMIC_REPLACEMENTS.len()).find(|&i| caps.get(i).is_some()) else {
            continue;
        };
        pattern.push_str(&regex::escape(&text[last..full.start()]));
        pattern.push_str(DYNAMIC_REPLACEMENTS[group - 1]);
        last = full.end();
    }

    if pattern.is_empty() {
        return text.to_string();
    }
    pattern.push_str(&regex::escape(&text[last..]));
    format!("/{pattern}/")
}
