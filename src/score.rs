//! Structural similarity scoring, used to pick the subtree a failed match is
//! diffed against. Weights favor role and name agreement, reward in-position
//! children, and nudge toward deeper, more specific subtrees on ties.

use crate::matcher::matches_text;
use crate::template::{RoleTemplate, TemplateNode, TextPattern};
use crate::text::longest_common_substring;
use crate::tree::{AriaNode, NodeChild};

const SCORE_EXACT: i64 = 1000;
const SCORE_ROLE: i64 = 500;
const SCORE_NAME: i64 = 400;
const SCORE_STATE_FIELD: i64 = 100;
const SCORE_ALL_STATES: i64 = 500;
const SCORE_URL: i64 = 100;
const SCORE_NO_MATCH: i64 = -200;
const SCORE_POSITION: i64 = 200;
const SCORE_MISSING_CHILD: i64 = -50;
const SCORE_ALL_CHILDREN: i64 = 300;
const SCORE_DEPTH: i64 = 20;

/// Similarity of two strings in 0..=400: longest common substring length
/// over the longer operand. Empty operands score zero.
pub fn similarity_score(a: &str, b: &str) -> i64 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let common = longest_common_substring(a, b).chars().count();
    let longest = a.chars().count().max(b.chars().count());
    ((common as f64 / longest as f64) * SCORE_NAME as f64).floor() as i64
}

/// Score one actual child against one template node.
pub(crate) fn score_child(child: &NodeChild, template: &TemplateNode) -> i64 {
    match (child, template) {
        (NodeChild::Text(text), TemplateNode::Text(pattern)) => {
            if matches_text(Some(text), Some(pattern)) {
                SCORE_EXACT
            } else if let TextPattern::Literal(literal) = pattern {
                similarity_score(text, literal)
            } else {
                0
            }
        }
        (NodeChild::Node(node), TemplateNode::Role(role_template)) => {
            score_role(node, role_template)
        }
        _ => SCORE_NO_MATCH,
    }
}

pub(crate) fn score_role(node: &AriaNode, template: &RoleTemplate) -> i64 {
    let mut score = 0;

    if template.role == "fragment" || template.role == node.role {
        score += SCORE_ROLE;
    }

    if let Some(name) = &template.name {
        if matches_text(Some(&node.name), Some(name)) {
            score += SCORE_NAME;
        } else if let TextPattern::Literal(literal) = name {
            score += similarity_score(&node.name, literal);
        }
    }

    let mut specified = 0;
    let mut agreed = 0;
    let mut state = |wanted: bool, equal: bool| {
        if wanted {
            specified += 1;
            if equal {
                agreed += 1;
            }
        }
    };
    state(template.checked.is_some(), template.checked == node.checked);
    state(template.disabled.is_some(), template.disabled == node.disabled);
    state(template.expanded.is_some(), template.expanded == node.expanded);
    state(template.level.is_some(), template.level == node.level);
    state(template.pressed.is_some(), template.pressed == node.pressed);
    state(template.selected.is_some(), template.selected == node.selected);
    score += agreed * SCORE_STATE_FIELD;
    if specified > 0 && agreed == specified {
        score += SCORE_ALL_STATES;
    }

    if let Some(url) = &template.url {
        if matches_text(node.props.get("url").map(String::as_str), Some(url)) {
            score += SCORE_URL;
        }
    }

    score + score_children(&node.children, &template.children, true)
}

/// Greedy assignment score of a children list against a template list.
pub(crate) fn score_children(
    children: &[NodeChild],
    templates: &[TemplateNode],
    position_bonus: bool,
) -> i64 {
    assign_children(children, templates, position_bonus).0
}

/// Greedy assignment: each template child, in order, takes the
/// highest-scoring unused actual child; ties go to the lower index. A score
/// must be positive to count as a match. With the position bonus (scoring
/// mode), in-place matches earn extra and unmatched template children cost;
/// without it (selection mode), only the chosen indices matter.
fn assign_children(
    children: &[NodeChild],
    templates: &[TemplateNode],
    position_bonus: bool,
) -> (i64, Vec<Option<usize>>) {
    if templates.is_empty() {
        return (0, Vec::new());
    }
    if children.is_empty() {
        return (
            SCORE_MISSING_CHILD * templates.len() as i64,
            vec![None; templates.len()],
        );
    }

    let mut used = vec![false; children.len()];
    let mut chosen = Vec::with_capacity(templates.len());
    let mut total = 0;
    let mut all_matched = true;

    for (template_index, template) in templates.iter().enumerate() {
        let mut best: Option<(usize, i64)> = None;
        for (child_index, child) in children.iter().enumerate() {
            if used[child_index] {
                continue;
            }
            let score = score_child(child, template);
            if score > best.map_or(0, |(_, s)| s) {
                best = Some((child_index, score));
            }
        }
        match best {
            Some((child_index, score)) => {
                used[child_index] = true;
                total += score;
                if position_bonus && child_index == template_index {
                    total += SCORE_POSITION;
                }
                chosen.push(Some(child_index));
            }
            None => {
                if position_bonus {
                    total += SCORE_MISSING_CHILD;
                }
                all_matched = false;
                chosen.push(None);
            }
        }
    }

    if position_bonus && all_matched {
        total += SCORE_ALL_CHILDREN;
    }
    (total, chosen)
}

struct BestMatch<'a> {
    node: &'a AriaNode,
    score: i64,
    fragment: bool,
}

fn baseline(node: &AriaNode, template: &TemplateNode) -> (i64, bool) {
    match template {
        // A multi-child wildcard template compares against a node's child
        // list, so the diff can show just the relevant siblings.
        TemplateNode::Role(t) if t.role == "fragment" && t.children.len() > 1 => {
            (score_children(&node.children, &t.children, true), true)
        }
        TemplateNode::Role(t) => (score_role(node, t), false),
        TemplateNode::Text(_) => (SCORE_NO_MATCH, false),
    }
}

fn find_best_match<'a>(root: &'a AriaNode, template: &TemplateNode) -> BestMatch<'a> {
    fn walk<'a>(
        node: &'a AriaNode,
        template: &TemplateNode,
        depth: i64,
        best: &mut BestMatch<'a>,
    ) {
        let (base, fragment) = baseline(node, template);
        let score = base + SCORE_DEPTH * depth;
        if score > best.score {
            *best = BestMatch {
                node,
                score,
                fragment,
            };
        }
        for child in node.children.iter().filter_map(NodeChild::as_node) {
            walk(child, template, depth + 1, best);
        }
    }

    let (base, fragment) = baseline(root, template);
    let mut best = BestMatch {
        node: root,
        score: base,
        fragment,
    };
    for child in root.children.iter().filter_map(NodeChild::as_node) {
        walk(child, template, 1, &mut best);
    }
    best
}

/// The subtree a failed match should be diffed against. When the winner is a
/// multi-child wildcard comparison, only the children the assignment picked
/// are kept, in original order, under a synthetic fragment.
pub fn best_diff_candidate(root: &AriaNode, template: &TemplateNode) -> AriaNode {
    let best = find_best_match(root, template);
    if best.fragment {
        if let TemplateNode::Role(t) = template {
            let (_, chosen) = assign_children(&best.node.children, &t.children, false);
            let mut indices: Vec<usize> = chosen.into_iter().flatten().collect();
            indices.sort_unstable();
            indices.dedup();
            let mut fragment = AriaNode::fragment();
            fragment.children = indices
                .iter()
                .filter_map(|&i| best.node.children.get(i).cloned())
                .collect();
            return fragment;
        }
    }
    best.node.clone()
}
