//! DOM walk producing normalized accessibility snapshots.
//!
//! The walk mirrors rendered order: `::before` content, slot-assigned or
//! natural children, shadow-root children, `aria-owns` targets, `::after`
//! content. A visited set keyed on node ids dedups nodes reachable both
//! through `aria-owns` and their natural position, and slot-assigned nodes
//! reachable through both shadow traversal and slot assignment.

use std::collections::{HashMap, HashSet};

use ego_tree::{NodeId, NodeRef};
use scraper::{ElementRef, Html, Node, Selector};
use tracing::debug;

use crate::bridge::{
    DomContext, GlobalOptions, Pseudo, CHECKED_ROLES, DISABLED_ROLES, EXPANDED_ROLES, LEVEL_ROLES,
    PRESSED_ROLES, SELECTED_ROLES,
};
use crate::normalize::{normalize_generic_roles, normalize_string_children};
use crate::tree::{AriaNode, AriaSnapshot, BoxInfo, NodeChild};

/// Per-build options.
#[derive(Debug, Clone, Default)]
pub struct SnapshotOptions {
    /// Assign stable refs, default roleless elements to `generic`, and keep
    /// style-visible elements that are hidden only for ARIA.
    pub for_ai: bool,
    /// Prefix for generated refs (`<prefix>e<N>`).
    pub ref_prefix: String,
    pub global: GlobalOptions,
}

#[derive(Debug)]
struct CachedRef {
    role: String,
    name: String,
    aria_ref: String,
}

/// Snapshot builder owning the persistent ref state: the monotonically
/// increasing counter and the per-element ref cache. Refs stay stable across
/// rebuilds as long as an element's role and accessible name do not change.
/// Use one engine per document; a fresh engine restarts numbering.
#[derive(Debug, Default)]
pub struct SnapshotEngine {
    last_ref: u64,
    ref_cache: HashMap<NodeId, CachedRef>,
}

impl SnapshotEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a normalized snapshot of the subtree under `root`.
    pub fn snapshot<'d>(
        &mut self,
        doc: &'d Html,
        root: ElementRef<'d>,
        options: &SnapshotOptions,
    ) -> AriaSnapshot {
        let ctx = DomContext::new(doc, options.global);

        let mut fragment = AriaNode::fragment();
        fragment.element = Some(root.id());
        fragment.box_info = BoxInfo {
            visible: !ctx.is_style_hidden(root),
            cursor: ctx.cursor(root),
        };

        let mut walker = Walker {
            ctx: &ctx,
            options,
            last_ref: &mut self.last_ref,
            ref_cache: &mut self.ref_cache,
            visited: HashSet::new(),
            elements: HashMap::new(),
        };
        walker.visit(&mut fragment, *root, false);
        let elements = walker.elements;

        normalize_string_children(&mut fragment);
        normalize_generic_roles(&mut fragment);

        debug!(
            nodes = count_nodes(&fragment),
            refs = elements.len(),
            for_ai = options.for_ai,
            "snapshot built"
        );
        AriaSnapshot {
            root: fragment,
            elements,
        }
    }
}

/// The `<body>` element when present, otherwise the document root. The usual
/// scope for whole-page snapshots.
pub fn body_or_root(doc: &Html) -> ElementRef<'_> {
    let selector = Selector::parse("body").expect("valid selector");
    doc.select(&selector)
        .next()
        .unwrap_or_else(|| doc.root_element())
}

fn count_nodes(node: &AriaNode) -> usize {
    1 + node
        .children
        .iter()
        .filter_map(NodeChild::as_node)
        .map(count_nodes)
        .sum::<usize>()
}

struct Walker<'w, 'd> {
    ctx: &'w DomContext<'d>,
    options: &'w SnapshotOptions,
    last_ref: &'w mut u64,
    ref_cache: &'w mut HashMap<NodeId, CachedRef>,
    visited: HashSet<NodeId>,
    elements: HashMap<String, NodeId>,
}

impl<'w, 'd> Walker<'w, 'd> {
    fn visit(&mut self, parent: &mut AriaNode, node: NodeRef<'d, Node>, pe_none: bool) {
        match node.value() {
            Node::Text(text) => {
                // Field values are surfaced separately; raw text under a
                // textbox would duplicate them.
                if parent.role != "textbox" {
                    let raw: &str = &text;
                    parent.push_text(raw);
                }
            }
            Node::Element(_) => {
                if let Some(el) = ElementRef::wrap(node) {
                    self.visit_element(parent, el, pe_none);
                }
            }
            _ => {}
        }
    }

    fn visit_element(&mut self, parent: &mut AriaNode, el: ElementRef<'d>, pe_none: bool) {
        if !self.visited.insert(el.id()) {
            return;
        }
        let element = el.value();
        let tag = element.name();

        // Shadow roots are visited from their host; a bare template is inert.
        if tag == "template" || DomContext::is_intrinsically_hidden(tag) {
            return;
        }

        if self.ctx.is_hidden_for_aria(el) && !(self.options.for_ai && !self.ctx.is_style_hidden(el))
        {
            return;
        }

        let pe_none = match self.ctx.pointer_events(el).as_deref() {
            Some("none") => true,
            Some(_) => false,
            None => pe_none,
        };

        let owned: Vec<ElementRef<'d>> = element
            .attr("aria-owns")
            .map(|ids| {
                ids.split_whitespace()
                    .filter_map(|id| self.ctx.element_by_dom_id(id))
                    .collect()
            })
            .unwrap_or_default();

        // Frame boundary: always a leaf, whatever the role rules would say.
        if tag == "iframe" {
            let node = self.make_node(el, "iframe".to_string(), pe_none);
            parent.push_node(node);
            return;
        }

        let role = self
            .ctx
            .aria_role(el)
            .or_else(|| self.options.for_ai.then(|| "generic".to_string()));
        let Some(role) = role.filter(|r| r != "presentation" && r != "none") else {
            // Transparent element: children attach to the current parent.
            self.process_children(parent, el, owned, pe_none);
            return;
        };

        let mut node = self.make_node(el, role, pe_none);
        self.process_children(&mut node, el, owned, pe_none);
        parent.push_node(node);
    }

    fn make_node(&mut self, el: ElementRef<'d>, role: String, pe_none: bool) -> AriaNode {
        let element = el.value();
        let mut node = AriaNode::new(role);
        node.element = Some(el.id());
        node.name = self.ctx.accessible_name(el, &node.role);
        node.box_info = BoxInfo {
            visible: !self.ctx.is_style_hidden(el),
            cursor: self.ctx.cursor(el),
        };
        node.receives_pointer_events = node.box_info.visible && !pe_none;

        let role = node.role.as_str();
        if CHECKED_ROLES.contains(&role) {
            node.checked = Some(self.ctx.aria_checked(el));
        }
        if DISABLED_ROLES.contains(&role) && self.ctx.aria_disabled(el) {
            node.disabled = Some(true);
        }
        if EXPANDED_ROLES.contains(&role) {
            node.expanded = self.ctx.aria_expanded(el);
        }
        if LEVEL_ROLES.contains(&role) {
            node.level = self.ctx.aria_level(el);
        }
        if PRESSED_ROLES.contains(&role) {
            node.pressed = self.ctx.aria_pressed(el);
        }
        if SELECTED_ROLES.contains(&role) {
            node.selected = self.ctx.aria_selected(el);
        }

        if node.role == "link" {
            if let Some(href) = element.attr("href") {
                node.props.insert("url".to_string(), href.to_string());
            }
        }

        // The current field value is the sole text child for editable fields.
        if matches!(element.name(), "input" | "textarea") {
            let ty = if element.name() == "input" {
                element.attr("type").unwrap_or("text")
            } else {
                "text"
            };
            let skip = ty == "checkbox"
                || ty == "radio"
                || (ty == "file" && self.ctx.options.input_file_role_textbox);
            if !skip {
                let value = if element.name() == "textarea" {
                    el.text().collect::<String>()
                } else {
                    element.attr("value").unwrap_or_default().to_string()
                };
                if !value.is_empty() {
                    node.push_text(value);
                }
            }
        }

        if self.options.for_ai {
            self.assign_ref(&mut node, el.id());
        }
        node
    }

    fn assign_ref(&mut self, node: &mut AriaNode, id: NodeId) {
        let cached = self
            .ref_cache
            .get(&id)
            .filter(|c| c.role == node.role && c.name == node.name)
            .map(|c| c.aria_ref.clone());
        let aria_ref = match cached {
            Some(aria_ref) => aria_ref,
            None => {
                *self.last_ref += 1;
                let aria_ref = format!("{}e{}", self.options.ref_prefix, self.last_ref);
                self.ref_cache.insert(
                    id,
                    CachedRef {
                        role: node.role.clone(),
                        name: node.name.clone(),
                        aria_ref: aria_ref.clone(),
                    },
                );
                aria_ref
            }
        };
        self.elements.insert(aria_ref.clone(), id);
        node.aria_ref = Some(aria_ref);
    }

    fn process_children(
        &mut self,
        target: &mut AriaNode,
        el: ElementRef<'d>,
        owned: Vec<ElementRef<'d>>,
        pe_none: bool,
    ) {
        // A word boundary around anything not displayed inline, so later
        // text concatenation cannot glue words together.
        let block_boundary = !self.ctx.display_is_inline(el) || el.value().name() == "br";
        if block_boundary {
            target.push_text(" ");
        }
        if let Some(content) = self.ctx.css_content(el.id(), Pseudo::Before) {
            target.push_text(content);
        }

        let assigned = if el.value().name() == "slot" {
            self.assigned_nodes(el)
        } else {
            Vec::new()
        };
        if !assigned.is_empty() {
            for node in assigned {
                self.visit(target, node, pe_none);
            }
        } else if let Some(shadow) = shadow_root(el) {
            // Light children render only through slots inside the shadow tree.
            for child in shadow.children() {
                self.visit(target, child, pe_none);
            }
        } else {
            for child in el.children() {
                self.visit(target, child, pe_none);
            }
        }

        for owned_el in owned {
            self.visit(target, *owned_el, pe_none);
        }

        if let Some(content) = self.ctx.css_content(el.id(), Pseudo::After) {
            target.push_text(content);
        }
        if block_boundary {
            target.push_text(" ");
        }
    }

    /// Light-DOM nodes assigned to a slot: elements whose `slot` attribute
    /// matches the slot's name (both absent for the default slot), plus text
    /// nodes for the default slot. Empty when the slot has no host, which
    /// makes the caller fall back to the slot's own children.
    fn assigned_nodes(&self, slot: ElementRef<'d>) -> Vec<NodeRef<'d, Node>> {
        let mut host = None;
        for ancestor in slot.ancestors() {
            if let Some(anc) = ElementRef::wrap(ancestor) {
                let value = anc.value();
                if value.name() == "template" && value.attr("shadowrootmode").is_some() {
                    host = anc.parent().and_then(ElementRef::wrap);
                    break;
                }
            }
        }
        let Some(host) = host else {
            return Vec::new();
        };

        let slot_name = slot.value().attr("name");
        let mut assigned = Vec::new();
        for child in host.children() {
            match child.value() {
                Node::Element(element) => {
                    if element.name() == "template" && element.attr("shadowrootmode").is_some() {
                        continue;
                    }
                    if element.attr("slot") == slot_name {
                        assigned.push(child);
                    }
                }
                Node::Text(_) if slot_name.is_none() => assigned.push(child),
                _ => {}
            }
        }
        assigned
    }
}

fn shadow_root<'d>(el: ElementRef<'d>) -> Option<ElementRef<'d>> {
    el.children().find_map(|child| {
        let template = ElementRef::wrap(child)?;
        let value = template.value();
        (value.name() == "template" && value.attr("shadowrootmode").is_some()).then_some(template)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Tristate;

    fn build(html: &str) -> AriaSnapshot {
        let doc = Html::parse_document(html);
        SnapshotEngine::new().snapshot(&doc, body_or_root(&doc), &SnapshotOptions::default())
    }

    fn build_for_ai(html: &str) -> AriaSnapshot {
        let doc = Html::parse_document(html);
        let options = SnapshotOptions {
            for_ai: true,
            ..Default::default()
        };
        SnapshotEngine::new().snapshot(&doc, body_or_root(&doc), &options)
    }

    fn only_node(snapshot: &AriaSnapshot) -> &AriaNode {
        assert_eq!(snapshot.root.children.len(), 1, "root: {:?}", snapshot.root);
        snapshot.root.children[0].as_node().expect("node child")
    }

    fn find_role<'a>(node: &'a AriaNode, role: &str) -> Option<&'a AriaNode> {
        if node.role == role {
            return Some(node);
        }
        node.children
            .iter()
            .filter_map(NodeChild::as_node)
            .find_map(|n| find_role(n, role))
    }

    #[test]
    fn heading_with_subsumed_text() {
        let snapshot = build("<body><h1>Title</h1></body>");
        let heading = only_node(&snapshot);
        assert_eq!(heading.role, "heading");
        assert_eq!(heading.name, "Title");
        assert_eq!(heading.level, Some(1));
        assert!(heading.children.is_empty());
    }

    #[test]
    fn script_and_style_pruned() {
        let snapshot = build(
            "<body><script>let x = 1;</script><style>p{}</style><p>Prose</p></body>",
        );
        let paragraph = only_node(&snapshot);
        assert_eq!(paragraph.role, "paragraph");
        assert_eq!(paragraph.children, vec![NodeChild::Text("Prose".into())]);
    }

    #[test]
    fn hidden_subtree_pruned() {
        let snapshot = build(
            r#"<body><div aria-hidden="true"><button>Ghost</button></div><button>Real</button></body>"#,
        );
        let button = only_node(&snapshot);
        assert_eq!(button.name, "Real");
    }

    #[test]
    fn for_ai_keeps_aria_hidden_but_style_visible() {
        let snapshot = build_for_ai(r#"<body><div aria-hidden="true"><button>Ghost</button></div></body>"#);
        assert!(find_role(&snapshot.root, "button").is_some());

        let snapshot = build(r#"<body><div aria-hidden="true"><button>Ghost</button></div></body>"#);
        assert!(find_role(&snapshot.root, "button").is_none());
    }

    #[test]
    fn block_elements_produce_word_boundaries() {
        let snapshot = build("<body><div>Hello</div><div>world</div></body>");
        assert_eq!(
            snapshot.root.children,
            vec![NodeChild::Text("Hello world".into())]
        );
    }

    #[test]
    fn inline_elements_concatenate_without_space() {
        let snapshot = build("<body><p><b>bold</b>text</p></body>");
        let paragraph = only_node(&snapshot);
        assert_eq!(paragraph.children, vec![NodeChild::Text("boldtext".into())]);
    }

    #[test]
    fn br_is_a_word_boundary() {
        let snapshot = build("<body><p>one<br>two</p></body>");
        let paragraph = only_node(&snapshot);
        assert_eq!(paragraph.children, vec![NodeChild::Text("one two".into())]);
    }

    #[test]
    fn checkbox_value_never_rendered_as_text() {
        let snapshot = build(r#"<body><input type="checkbox" value="yes" checked></body>"#);
        let checkbox = only_node(&snapshot);
        assert_eq!(checkbox.role, "checkbox");
        assert_eq!(checkbox.checked, Some(Tristate::True));
        assert!(checkbox.children.is_empty());
    }

    #[test]
    fn textbox_value_becomes_sole_text_child() {
        let snapshot = build(r#"<body><input value="John"></body>"#);
        let textbox = only_node(&snapshot);
        assert_eq!(textbox.role, "textbox");
        assert_eq!(textbox.children, vec![NodeChild::Text("John".into())]);
    }

    #[test]
    fn textarea_content_not_duplicated() {
        let snapshot = build("<body><textarea>draft text</textarea></body>");
        let textbox = only_node(&snapshot);
        assert_eq!(textbox.children, vec![NodeChild::Text("draft text".into())]);
    }

    #[test]
    fn iframe_is_a_leaf() {
        let snapshot = build(r#"<body><iframe title="Ad"><p>inner</p></iframe></body>"#);
        let frame = only_node(&snapshot);
        assert_eq!(frame.role, "iframe");
        assert_eq!(frame.name, "Ad");
        assert!(frame.children.is_empty());
    }

    #[test]
    fn link_carries_url_prop() {
        let snapshot = build(r#"<body><a href="https://example.com">Link</a></body>"#);
        let link = only_node(&snapshot);
        assert_eq!(link.role, "link");
        assert_eq!(link.props.get("url").map(String::as_str), Some("https://example.com"));
    }

    #[test]
    fn presentation_role_is_transparent() {
        let snapshot = build(r#"<body><ul role="presentation"><li>x</li></ul></body>"#);
        assert!(find_role(&snapshot.root, "list").is_none());
        assert!(find_role(&snapshot.root, "listitem").is_some());
    }

    #[test]
    fn aria_owns_appends_after_natural_children() {
        let snapshot = build(
            r#"<body><div role="group" aria-owns="x">first</div><p id="x">owned</p></body>"#,
        );
        let group = only_node(&snapshot);
        assert_eq!(group.role, "group");
        assert_eq!(group.children.len(), 2);
        assert_eq!(group.children[0], NodeChild::Text("first".into()));
        assert_eq!(
            group.children[1].as_node().map(|n| n.role.as_str()),
            Some("paragraph")
        );
    }

    #[test]
    fn dangling_aria_owns_degrades() {
        let snapshot = build(r#"<body><div role="group" aria-owns="missing">ok</div></body>"#);
        let group = only_node(&snapshot);
        assert_eq!(group.children, vec![NodeChild::Text("ok".into())]);
    }

    #[test]
    fn declarative_shadow_dom_with_slot() {
        let snapshot = build(
            r#"<body><div>
                 <template shadowrootmode="open"><span>[</span><slot></slot><span>]</span></template>
                 <button>Act</button>
               </div></body>"#,
        );
        let children = &snapshot.root.children;
        assert_eq!(children.len(), 3, "children: {children:?}");
        assert_eq!(children[0], NodeChild::Text("[".into()));
        assert_eq!(children[1].as_node().map(|n| n.name.as_str()), Some("Act"));
        assert_eq!(children[2], NodeChild::Text("]".into()));
    }

    #[test]
    fn slot_fallback_content_used_when_nothing_assigned() {
        // No light children at all; whitespace would be assigned to the
        // default slot and suppress the fallback, as in a real engine.
        let snapshot = build(
            r#"<body><div><template shadowrootmode="open"><slot>fallback</slot></template></div></body>"#,
        );
        assert_eq!(
            snapshot.root.children,
            vec![NodeChild::Text("fallback".into())]
        );
    }

    #[test]
    fn named_slot_assignment() {
        let snapshot = build(
            r#"<body><div>
                 <template shadowrootmode="open"><slot name="tail">none</slot></template>
                 <button slot="tail">Tail</button>
                 <button>Loose</button>
               </div></body>"#,
        );
        // The unassigned light child does not render; only the named one does.
        assert_eq!(snapshot.root.children.len(), 1);
        assert_eq!(
            snapshot.root.children[0].as_node().map(|n| n.name.as_str()),
            Some("Tail")
        );
    }

    #[test]
    fn pseudo_content_wraps_element_content() {
        let snapshot = build(
            r##"<html><head><style>.tag::before { content: "#"; }</style></head>
               <body><p class="tag">topic</p></body></html>"##,
        );
        let paragraph = only_node(&snapshot);
        assert_eq!(paragraph.children, vec![NodeChild::Text("#topic".into())]);
    }

    #[test]
    fn for_ai_collapses_generic_wrappers() {
        let snapshot = build_for_ai("<body><div><button>Go</button></div></body>");
        let button = only_node(&snapshot);
        assert_eq!(button.role, "button");
        assert!(button.aria_ref.is_some());
    }

    #[test]
    fn refs_stable_across_rebuilds() {
        let doc = Html::parse_document("<body><button>Go</button><a href='/x'>L</a></body>");
        let options = SnapshotOptions {
            for_ai: true,
            ..Default::default()
        };
        let mut engine = SnapshotEngine::new();
        let first = engine.snapshot(&doc, body_or_root(&doc), &options);
        let second = engine.snapshot(&doc, body_or_root(&doc), &options);

        assert!(!first.elements.is_empty());
        assert_eq!(first.elements, second.elements);
    }

    #[test]
    fn fresh_engine_restarts_ref_numbering() {
        let doc = Html::parse_document("<body><button>Go</button></body>");
        let options = SnapshotOptions {
            for_ai: true,
            ref_prefix: "f3".to_string(),
            ..Default::default()
        };
        let snapshot = SnapshotEngine::new().snapshot(&doc, body_or_root(&doc), &options);
        let button = find_role(&snapshot.root, "button").expect("button");
        assert_eq!(button.aria_ref.as_deref(), Some("f3e2"));
    }

    #[test]
    fn no_consecutive_text_children_anywhere() {
        fn check(node: &AriaNode) {
            for pair in node.children.windows(2) {
                assert!(
                    !(pair[0].as_text().is_some() && pair[1].as_text().is_some()),
                    "adjacent text runs in {node:?}"
                );
            }
            for child in node.children.iter().filter_map(NodeChild::as_node) {
                check(child);
            }
        }
        let snapshot = build(
            r#"<body><p>a<span>b</span>c</p><div>d</div>e<ul><li>f</li><li>g</li></ul></body>"#,
        );
        check(&snapshot.root);
    }
}
