use std::collections::{BTreeMap, HashMap};
use std::fmt;

use ego_tree::NodeId;
use serde::Serialize;

/// Tri-state value for `checked` and `pressed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tristate {
    True,
    False,
    Mixed,
}

impl Tristate {
    pub fn from_bool(value: bool) -> Self {
        if value {
            Tristate::True
        } else {
            Tristate::False
        }
    }
}

impl fmt::Display for Tristate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tristate::True => write!(f, "true"),
            Tristate::False => write!(f, "false"),
            Tristate::Mixed => write!(f, "mixed"),
        }
    }
}

/// Style-derived box snapshot. There is no layout engine behind a parsed
/// document, so this carries what inline styles and UA defaults can tell us.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoxInfo {
    pub visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

/// A child of an [`AriaNode`]: either a nested node or a run of text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NodeChild {
    Text(String),
    Node(AriaNode),
}

impl NodeChild {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            NodeChild::Text(text) => Some(text),
            NodeChild::Node(_) => None,
        }
    }

    pub fn as_node(&self) -> Option<&AriaNode> {
        match self {
            NodeChild::Text(_) => None,
            NodeChild::Node(node) => Some(node),
        }
    }
}

/// One element of the accessibility tree.
///
/// The root of every snapshot is a synthetic `fragment` node; `iframe` is a
/// sentinel role for frame boundaries. State attributes are present only for
/// roles that admit them (see the role sets in `bridge`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AriaNode {
    pub role: String,
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeChild>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub props: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked: Option<Tristate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expanded: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pressed: Option<Tristate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,
    /// Source element in the parsed document. Non-owning; only meaningful
    /// while the document the snapshot was built from is alive.
    #[serde(skip_serializing)]
    pub element: Option<NodeId>,
    #[serde(rename = "box")]
    pub box_info: BoxInfo,
    pub receives_pointer_events: bool,
    /// Stable ref id (`<prefix>e<N>`), assigned in for-AI mode only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aria_ref: Option<String>,
}

impl AriaNode {
    pub fn new(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            name: String::new(),
            children: Vec::new(),
            props: BTreeMap::new(),
            checked: None,
            disabled: None,
            expanded: None,
            level: None,
            pressed: None,
            selected: None,
            element: None,
            box_info: BoxInfo {
                visible: true,
                cursor: None,
            },
            receives_pointer_events: true,
            aria_ref: None,
        }
    }

    /// Synthetic root node.
    pub fn fragment() -> Self {
        Self::new("fragment")
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        self.children.push(NodeChild::Text(text.into()));
    }

    pub fn push_node(&mut self, node: AriaNode) {
        self.children.push(NodeChild::Node(node));
    }
}

/// A built accessibility tree plus the ref → element index.
///
/// `elements` is populated only in for-AI mode; otherwise it is empty.
#[derive(Debug)]
pub struct AriaSnapshot {
    pub root: AriaNode,
    pub elements: HashMap<String, NodeId>,
}
