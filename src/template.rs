//! Template model and parser for the YAML-like snapshot format.
//!
//! The accepted format is the same one the renderer emits:
//!
//! ```yaml
//! - heading "Issues" [level=1]
//! - list:
//!   - /children: equal
//!   - listitem: One
//!   - listitem: /Th\w+/
//! - link "Home":
//!   - /url: /.*example.com/
//! - text: plain text child
//! ```
//!
//! Regex patterns are validated here; an invalid pattern is a parse error,
//! never a matcher fault.

use anyhow::{anyhow, bail, Context, Result};
use regex::Regex;
use serde_yaml::Value;

use crate::text::normalize_whitespace;
use crate::tree::Tristate;

/// A literal string or an unanchored regular expression.
#[derive(Debug, Clone)]
pub enum TextPattern {
    Literal(String),
    Pattern(Regex),
}

impl PartialEq for TextPattern {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TextPattern::Literal(a), TextPattern::Literal(b)) => a == b,
            (TextPattern::Pattern(a), TextPattern::Pattern(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

/// Child-list comparison policy on a role template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerMode {
    /// Template children appear as an in-order subsequence (the default).
    Contain,
    /// Same length, pairwise match.
    Equal,
    /// `Equal`, propagated through the whole subtree.
    DeepEqual,
}

/// One template node: an expected text run or an expected element.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateNode {
    Text(TextPattern),
    Role(RoleTemplate),
}

/// Expected element: role (`fragment` is a wildcard), optional name and url
/// constraints, optional state constraints, and expected children.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleTemplate {
    pub role: String,
    pub name: Option<TextPattern>,
    pub url: Option<TextPattern>,
    pub checked: Option<Tristate>,
    pub disabled: Option<bool>,
    pub expanded: Option<bool>,
    pub level: Option<u32>,
    pub pressed: Option<Tristate>,
    pub selected: Option<bool>,
    pub container_mode: Option<ContainerMode>,
    pub children: Vec<TemplateNode>,
}

impl RoleTemplate {
    pub fn new(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            name: None,
            url: None,
            checked: None,
            disabled: None,
            expanded: None,
            level: None,
            pressed: None,
            selected: None,
            container_mode: None,
            children: Vec::new(),
        }
    }
}

/// Parse a template document. A single-entry document unwraps to that entry,
/// so `- link` matches link nodes rather than their parent; multi-entry
/// documents keep a `fragment` root that matches by children.
pub fn parse_template(text: &str) -> Result<TemplateNode> {
    let value: Value = serde_yaml::from_str(text).context("template is not valid YAML")?;
    let mut root = RoleTemplate::new("fragment");
    match &value {
        Value::Sequence(seq) => parse_children(seq, &mut root)?,
        Value::Null => {}
        _ => bail!("template root must be a YAML sequence"),
    }
    if root.children.len() == 1 && root.container_mode.is_none() && root.url.is_none() {
        return Ok(root.children.remove(0));
    }
    Ok(TemplateNode::Role(root))
}

fn parse_children(seq: &[Value], container: &mut RoleTemplate) -> Result<()> {
    for item in seq {
        match item {
            Value::String(s) => {
                // A quoted "/children: <mode>" entry is the container
                // directive, not a role line.
                if let Some(mode) = s.trim().strip_prefix("/children:") {
                    container.container_mode = Some(parse_mode(mode.trim())?);
                    continue;
                }
                container.children.push(TemplateNode::Role(parse_key(s)?));
            }
            Value::Mapping(map) => {
                if map.len() != 1 {
                    bail!("template node must have exactly one key: {item:?}");
                }
                let Some((key, value)) = map.iter().next() else {
                    continue;
                };
                let key = key
                    .as_str()
                    .ok_or_else(|| anyhow!("template keys must be strings: {key:?}"))?;

                if key == "/children" {
                    let mode = value
                        .as_str()
                        .ok_or_else(|| anyhow!("/children expects contain, equal or deep-equal"))?;
                    container.container_mode = Some(parse_mode(mode)?);
                } else if key == "/url" {
                    container.url = Some(value_pattern(value)?);
                } else if key == "text" {
                    container.children.push(TemplateNode::Text(value_pattern(value)?));
                } else {
                    let mut node = parse_key(key)?;
                    match value {
                        Value::String(_) | Value::Number(_) | Value::Bool(_) => {
                            node.children.push(TemplateNode::Text(value_pattern(value)?));
                        }
                        Value::Sequence(children) => parse_children(children, &mut node)?,
                        Value::Null => {}
                        _ => bail!("unsupported value for template key {key:?}"),
                    }
                    container.children.push(TemplateNode::Role(node));
                }
            }
            _ => bail!("unsupported template entry: {item:?}"),
        }
    }
    Ok(())
}

fn parse_mode(mode: &str) -> Result<ContainerMode> {
    match mode {
        "contain" => Ok(ContainerMode::Contain),
        "equal" => Ok(ContainerMode::Equal),
        "deep-equal" => Ok(ContainerMode::DeepEqual),
        other => bail!("unknown container mode {other:?}"),
    }
}

fn value_pattern(value: &Value) -> Result<TextPattern> {
    match value {
        Value::String(s) => string_pattern(s),
        Value::Number(n) => Ok(TextPattern::Literal(n.to_string())),
        Value::Bool(b) => Ok(TextPattern::Literal(b.to_string())),
        other => bail!("expected a scalar template value, got {other:?}"),
    }
}

fn string_pattern(s: &str) -> Result<TextPattern> {
    if s.len() >= 2 && s.starts_with('/') && s.ends_with('/') {
        let source = &s[1..s.len() - 1];
        let re = Regex::new(source).with_context(|| format!("invalid pattern {s:?}"))?;
        return Ok(TextPattern::Pattern(re));
    }
    Ok(TextPattern::Literal(normalize_whitespace(s)))
}

/// Parse a key line: `role ("name" | /regex/)? ("[" attr ("=" value)? "]")*`.
fn parse_key(key: &str) -> Result<RoleTemplate> {
    let trimmed = key.trim();
    let role_end = trimmed
        .find(char::is_whitespace)
        .unwrap_or(trimmed.len());
    let role = &trimmed[..role_end];
    if role.is_empty() {
        bail!("empty template key");
    }
    let mut node = RoleTemplate::new(role);
    let mut rest = trimmed[role_end..].trim_start();

    if rest.starts_with('"') {
        let (name, tail) = take_quoted(rest).with_context(|| format!("in template key {key:?}"))?;
        node.name = Some(TextPattern::Literal(normalize_whitespace(&name)));
        rest = tail.trim_start();
    } else if rest.starts_with('/') {
        let (source, tail) = take_regex(rest).with_context(|| format!("in template key {key:?}"))?;
        let re = Regex::new(&source).with_context(|| format!("invalid pattern /{source}/"))?;
        node.name = Some(TextPattern::Pattern(re));
        rest = tail.trim_start();
    }

    while let Some(after_open) = rest.strip_prefix('[') {
        let end = after_open
            .find(']')
            .ok_or_else(|| anyhow!("unterminated attribute in template key {key:?}"))?;
        apply_attribute(&mut node, &after_open[..end])
            .with_context(|| format!("in template key {key:?}"))?;
        rest = after_open[end + 1..].trim_start();
    }

    if !rest.is_empty() {
        bail!("unexpected trailing input {rest:?} in template key {key:?}");
    }
    Ok(node)
}

fn take_quoted(s: &str) -> Result<(String, &str)> {
    let mut out = String::new();
    let mut iter = s.char_indices();
    iter.next(); // opening quote
    while let Some((i, c)) = iter.next() {
        match c {
            '"' => return Ok((out, &s[i + 1..])),
            '\\' => {
                let Some((_, escaped)) = iter.next() else {
                    break;
                };
                match escaped {
                    'n' => out.push('\n'),
                    'r' => out.push('\r'),
                    't' => out.push('\t'),
                    'u' => {
                        let mut code = String::new();
                        for _ in 0..4 {
                            let Some((_, digit)) = iter.next() else {
                                bail!("truncated \\u escape");
                            };
                            code.push(digit);
                        }
                        let value = u32::from_str_radix(&code, 16)
                            .with_context(|| format!("bad \\u escape {code:?}"))?;
                        out.push(
                            char::from_u32(value)
                                .ok_or_else(|| anyhow!("bad \\u escape {code:?}"))?,
                        );
                    }
                    other => out.push(other),
                }
            }
            c => out.push(c),
        }
    }
    bail!("unterminated quoted name")
}

fn take_regex(s: &str) -> Result<(String, &str)> {
    let mut escaped = false;
    let mut iter = s.char_indices();
    iter.next(); // opening slash
    for (i, c) in iter {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '/' => return Ok((s[1..i].to_string(), &s[i + 1..])),
            _ => {}
        }
    }
    bail!("unterminated regex name")
}

fn apply_attribute(node: &mut RoleTemplate, attr: &str) -> Result<()> {
    let (name, value) = match attr.split_once('=') {
        Some((name, value)) => (name.trim(), Some(value.trim())),
        None => (attr.trim(), None),
    };
    match name {
        "checked" => node.checked = Some(tristate_value(value)?),
        "pressed" => node.pressed = Some(tristate_value(value)?),
        "disabled" => node.disabled = Some(flag_value(value)?),
        "expanded" => node.expanded = Some(flag_value(value)?),
        "selected" => node.selected = Some(flag_value(value)?),
        "level" => {
            let value = value.ok_or_else(|| anyhow!("level requires a value"))?;
            node.level = Some(value.parse().with_context(|| format!("bad level {value:?}"))?);
        }
        other => bail!("unknown attribute {other:?}"),
    }
    Ok(())
}

fn tristate_value(value: Option<&str>) -> Result<Tristate> {
    match value {
        None | Some("true") => Ok(Tristate::True),
        Some("false") => Ok(Tristate::False),
        Some("mixed") => Ok(Tristate::Mixed),
        Some(other) => bail!("expected true, false or mixed, got {other:?}"),
    }
}

fn flag_value(value: Option<&str>) -> Result<bool> {
    match value {
        None | Some("true") => Ok(true),
        Some("false") => Ok(false),
        Some(other) => bail!("expected true or false, got {other:?}"),
    }
}
