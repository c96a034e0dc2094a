//! DOM utility layer: role and accessible-name computation, visibility,
//! state attributes, and pseudo-element content over a parsed document.
//!
//! This is the only module that reads raw DOM state; everything above it
//! works on [`crate::tree::AriaNode`] values.

use std::collections::HashMap;

use ego_tree::NodeId;
use scraper::node::Element;
use scraper::{ElementRef, Html, Selector};

use crate::text::normalize_whitespace;
use crate::tree::Tristate;

/// Roles that admit the `checked` attribute.
pub const CHECKED_ROLES: &[&str] = &[
    "checkbox",
    "menuitemcheckbox",
    "menuitemradio",
    "option",
    "radio",
    "switch",
    "treeitem",
];

/// Roles that admit the `disabled` attribute.
pub const DISABLED_ROLES: &[&str] = &[
    "application",
    "button",
    "checkbox",
    "columnheader",
    "combobox",
    "grid",
    "gridcell",
    "group",
    "link",
    "listbox",
    "menu",
    "menubar",
    "menuitem",
    "menuitemcheckbox",
    "menuitemradio",
    "option",
    "radio",
    "radiogroup",
    "row",
    "rowheader",
    "scrollbar",
    "searchbox",
    "separator",
    "slider",
    "spinbutton",
    "switch",
    "tab",
    "tablist",
    "textbox",
    "toolbar",
    "tree",
    "treegrid",
    "treeitem",
];

/// Roles that admit the `expanded` attribute.
pub const EXPANDED_ROLES: &[&str] = &[
    "application",
    "button",
    "checkbox",
    "columnheader",
    "combobox",
    "gridcell",
    "link",
    "listbox",
    "menuitem",
    "menuitemcheckbox",
    "menuitemradio",
    "row",
    "rowgroup",
    "rowheader",
    "switch",
    "tab",
    "treeitem",
];

/// Roles that admit the `level` attribute.
pub const LEVEL_ROLES: &[&str] = &["heading", "listitem", "row", "treeitem"];

/// Roles that admit the `pressed` attribute.
pub const PRESSED_ROLES: &[&str] = &["button"];

/// Roles that admit the `selected` attribute.
pub const SELECTED_ROLES: &[&str] = &[
    "columnheader",
    "gridcell",
    "option",
    "row",
    "rowheader",
    "tab",
    "treeitem",
];

/// Roles whose accessible name may come from descendant content.
const NAME_FROM_CONTENT_ROLES: &[&str] = &[
    "button",
    "cell",
    "checkbox",
    "columnheader",
    "gridcell",
    "heading",
    "link",
    "menuitem",
    "menuitemcheckbox",
    "menuitemradio",
    "option",
    "radio",
    "row",
    "rowheader",
    "sectionhead",
    "switch",
    "tab",
    "tooltip",
    "treeitem",
];

/// Tags whose UA default display is `inline`. Everything else (including
/// inline-block widgets) produces word boundaries around its content.
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "cite", "code", "data", "dfn", "em", "i", "img", "kbd",
    "label", "mark", "q", "s", "samp", "slot", "small", "span", "strong", "sub", "sup", "time",
    "u", "var",
];

/// Tags that never contribute accessible content.
const HIDDEN_TAGS: &[&str] = &[
    "base", "datalist", "head", "link", "meta", "noscript", "param", "script", "source", "style",
    "svg", "template", "title", "track",
];

/// Pseudo-element position for CSS `content` lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pseudo {
    Before,
    After,
}

/// Engine-wide DOM options.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalOptions {
    /// Treat `input[type=file]` as a textbox (legacy engines) instead of a
    /// button. Also excludes it from value-as-child handling.
    pub input_file_role_textbox: bool,
}

/// Read-only view over a parsed document: id and label indexes plus the
/// pseudo-element content extracted from `<style>` blocks.
pub struct DomContext<'a> {
    doc: &'a Html,
    ids: HashMap<String, NodeId>,
    labels: HashMap<String, String>,
    pseudo: HashMap<(NodeId, Pseudo), String>,
    pub options: GlobalOptions,
}

impl<'a> DomContext<'a> {
    pub fn new(doc: &'a Html, options: GlobalOptions) -> Self {
        let mut ids = HashMap::new();
        for node in doc.root_element().descendants() {
            if let Some(el) = ElementRef::wrap(node) {
                if let Some(id) = el.value().attr("id") {
                    ids.entry(id.to_string()).or_insert_with(|| node.id());
                }
            }
        }

        Self {
            labels: build_label_map(doc),
            pseudo: scan_pseudo_content(doc),
            ids,
            doc,
            options,
        }
    }

    pub fn element(&self, id: NodeId) -> Option<ElementRef<'a>> {
        self.doc.tree.get(id).and_then(ElementRef::wrap)
    }

    pub fn element_by_dom_id(&self, dom_id: &str) -> Option<ElementRef<'a>> {
        self.ids.get(dom_id).and_then(|id| self.element(*id))
    }

    /// CSS `content` string for `::before`/`::after`, if any rule sets one.
    pub fn css_content(&self, id: NodeId, pseudo: Pseudo) -> Option<&str> {
        self.pseudo.get(&(id, pseudo)).map(String::as_str)
    }

    /// Computed ARIA role: the explicit `role` attribute wins, then the
    /// HTML-AAM implicit mapping. `None` means the element is transparent.
    pub fn aria_role(&self, el: ElementRef<'_>) -> Option<String> {
        if let Some(explicit) = el.value().attr("role") {
            if let Some(token) = explicit.split_whitespace().next() {
                return Some(token.to_ascii_lowercase());
            }
        }
        self.implicit_role(el).map(str::to_string)
    }

    fn implicit_role(&self, el: ElementRef<'_>) -> Option<&'static str> {
        let element = el.value();
        let role = match element.name() {
            "a" | "area" => {
                if element.attr("href").is_some() {
                    "link"
                } else {
                    return None;
                }
            }
            "article" => "article",
            "aside" => "complementary",
            "blockquote" => "blockquote",
            "button" => "button",
            "caption" => "caption",
            "code" => "code",
            "dd" => "definition",
            "del" | "s" => "deletion",
            "details" | "fieldset" | "optgroup" => "group",
            "dfn" | "dt" => "term",
            "dialog" => "dialog",
            "em" => "emphasis",
            "figure" => "figure",
            "footer" => "contentinfo",
            "form" => "form",
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => "heading",
            "header" => "banner",
            "hr" => "separator",
            "html" => "document",
            "img" => match element.attr("alt") {
                Some("") => "presentation",
                _ => "img",
            },
            "input" => return self.input_role(element),
            "ins" => "insertion",
            "li" => "listitem",
            "main" => "main",
            "math" => "math",
            "menu" | "ol" | "ul" => "list",
            "meter" => "meter",
            "nav" => "navigation",
            "option" => "option",
            "output" => "status",
            "p" => "paragraph",
            "progress" => "progressbar",
            "search" => "search",
            "section" => {
                // A section is a landmark only when it has an author-given name.
                if element.attr("aria-label").is_some() || element.attr("aria-labelledby").is_some()
                {
                    "region"
                } else {
                    return None;
                }
            }
            "select" => {
                let multiple = element.attr("multiple").is_some();
                let sized = element
                    .attr("size")
                    .and_then(|s| s.parse::<u32>().ok())
                    .is_some_and(|s| s > 1);
                if multiple || sized {
                    "listbox"
                } else {
                    "combobox"
                }
            }
            "strong" => "strong",
            "sub" => "subscript",
            "summary" => "button",
            "sup" => "superscript",
            "table" => "table",
            "tbody" | "tfoot" | "thead" => "rowgroup",
            "td" => "cell",
            "textarea" => "textbox",
            "th" => {
                if element.attr("scope") == Some("row") {
                    "rowheader"
                } else {
                    "columnheader"
                }
            }
            "time" => "time",
            "tr" => "row",
            _ => return None,
        };
        Some(role)
    }

    fn input_role(&self, element: &Element) -> Option<&'static str> {
        let role = match element.attr("type").unwrap_or("text") {
            "button" | "image" | "reset" | "submit" => "button",
            "checkbox" => "checkbox",
            "radio" => "radio",
            "range" => "slider",
            "number" => "spinbutton",
            "search" => "searchbox",
            "file" => {
                if self.options.input_file_role_textbox {
                    "textbox"
                } else {
                    "button"
                }
            }
            "hidden" => return None,
            _ => "textbox",
        };
        Some(role)
    }

    /// Accessible name, whitespace-normalized. Empty when the element has no
    /// name source and its role does not take a name from content.
    pub fn accessible_name(&self, el: ElementRef<'_>, role: &str) -> String {
        let element = el.value();

        if let Some(ids) = element.attr("aria-labelledby") {
            let text = ids
                .split_whitespace()
                .filter_map(|id| self.element_by_dom_id(id))
                .map(|target| target.text().collect::<String>())
                .collect::<Vec<_>>()
                .join(" ");
            let text = normalize_whitespace(&text);
            if !text.is_empty() {
                return text;
            }
        }

        if let Some(label) = element.attr("aria-label") {
            let label = normalize_whitespace(label);
            if !label.is_empty() {
                return label;
            }
        }

        match element.name() {
            "img" | "area" => {
                if let Some(alt) = element.attr("alt") {
                    return normalize_whitespace(alt);
                }
            }
            "input" | "select" | "textarea" => {
                if let Some(id) = element.attr("id") {
                    if let Some(label) = self.labels.get(id) {
                        return label.clone();
                    }
                }
                if element.name() == "input"
                    && matches!(
                        element.attr("type"),
                        Some("button") | Some("submit") | Some("reset")
                    )
                {
                    if let Some(value) = element.attr("value") {
                        return normalize_whitespace(value);
                    }
                }
                if let Some(placeholder) = element.attr("placeholder") {
                    let placeholder = normalize_whitespace(placeholder);
                    if !placeholder.is_empty() {
                        return placeholder;
                    }
                }
            }
            "iframe" => {
                if let Some(title) = element.attr("title") {
                    return normalize_whitespace(title);
                }
            }
            _ => {}
        }

        if NAME_FROM_CONTENT_ROLES.contains(&role) {
            let content = normalize_whitespace(&el.text().collect::<String>());
            if !content.is_empty() {
                return content;
            }
        }

        // Last resort for every role.
        if let Some(title) = element.attr("title") {
            return normalize_whitespace(title);
        }
        String::new()
    }

    /// Hidden by inline styles or the `hidden` attribute, independent of ARIA.
    pub fn is_style_hidden(&self, el: ElementRef<'_>) -> bool {
        let element = el.value();
        if element.attr("hidden").is_some() {
            return true;
        }
        if element.name() == "input" && element.attr("type") == Some("hidden") {
            return true;
        }
        if self.style_value(el, "display").as_deref() == Some("none") {
            return true;
        }
        matches!(
            self.style_value(el, "visibility").as_deref(),
            Some("hidden") | Some("collapse")
        )
    }

    pub fn is_hidden_for_aria(&self, el: ElementRef<'_>) -> bool {
        self.is_style_hidden(el) || el.value().attr("aria-hidden") == Some("true")
    }

    pub fn is_intrinsically_hidden(tag: &str) -> bool {
        HIDDEN_TAGS.contains(&tag)
    }

    /// Whether the element's computed display is `inline` (style attribute
    /// first, then the UA default for the tag).
    pub fn display_is_inline(&self, el: ElementRef<'_>) -> bool {
        if let Some(display) = self.style_value(el, "display") {
            return display == "inline";
        }
        INLINE_TAGS.contains(&el.value().name())
    }

    /// Computed-cursor approximation: inline style, else the UA pointer
    /// cursor on links.
    pub fn cursor(&self, el: ElementRef<'_>) -> Option<String> {
        if let Some(cursor) = self.style_value(el, "cursor") {
            return Some(cursor);
        }
        let element = el.value();
        if element.name() == "a" && element.attr("href").is_some() {
            return Some("pointer".to_string());
        }
        None
    }

    /// Locally declared `pointer-events` value, if any.
    pub fn pointer_events(&self, el: ElementRef<'_>) -> Option<String> {
        self.style_value(el, "pointer-events")
    }

    pub fn aria_checked(&self, el: ElementRef<'_>) -> Tristate {
        let element = el.value();
        if element.name() == "input"
            && matches!(element.attr("type"), Some("checkbox") | Some("radio"))
        {
            return Tristate::from_bool(element.attr("checked").is_some());
        }
        match element.attr("aria-checked") {
            Some("true") => Tristate::True,
            Some("mixed") => Tristate::Mixed,
            _ => Tristate::False,
        }
    }

    pub fn aria_disabled(&self, el: ElementRef<'_>) -> bool {
        let element = el.value();
        if is_form_control(element.name()) {
            if element.attr("disabled").is_some() {
                return true;
            }
            for ancestor in el.ancestors() {
                if let Some(anc) = ElementRef::wrap(ancestor) {
                    if anc.value().name() == "fieldset" && anc.value().attr("disabled").is_some() {
                        return true;
                    }
                }
            }
        }
        if let Some(value) = element.attr("aria-disabled") {
            return value == "true";
        }
        // aria-disabled is inherited from the nearest ancestor that sets it.
        for ancestor in el.ancestors() {
            if let Some(anc) = ElementRef::wrap(ancestor) {
                if let Some(value) = anc.value().attr("aria-disabled") {
                    return value == "true";
                }
            }
        }
        false
    }

    pub fn aria_expanded(&self, el: ElementRef<'_>) -> Option<bool> {
        match el.value().attr("aria-expanded") {
            Some("true") => Some(true),
            Some("false") => Some(false),
            _ => None,
        }
    }

    pub fn aria_level(&self, el: ElementRef<'_>) -> Option<u32> {
        let element = el.value();
        match element.name() {
            "h1" => return Some(1),
            "h2" => return Some(2),
            "h3" => return Some(3),
            "h4" => return Some(4),
            "h5" => return Some(5),
            "h6" => return Some(6),
            _ => {}
        }
        element.attr("aria-level").and_then(|v| v.parse().ok())
    }

    pub fn aria_pressed(&self, el: ElementRef<'_>) -> Option<Tristate> {
        match el.value().attr("aria-pressed") {
            Some("true") => Some(Tristate::True),
            Some("false") => Some(Tristate::False),
            Some("mixed") => Some(Tristate::Mixed),
            _ => None,
        }
    }

    pub fn aria_selected(&self, el: ElementRef<'_>) -> Option<bool> {
        let element = el.value();
        if element.name() == "option" {
            return Some(element.attr("selected").is_some());
        }
        match element.attr("aria-selected") {
            Some("true") => Some(true),
            Some("false") => Some(false),
            _ => None,
        }
    }

    fn style_value(&self, el: ElementRef<'_>, property: &str) -> Option<String> {
        let style = el.value().attr("style")?;
        for declaration in style.split(';') {
            let Some((name, value)) = declaration.split_once(':') else {
                continue;
            };
            if name.trim().eq_ignore_ascii_case(property) {
                let value = value.trim().trim_end_matches("!important").trim();
                return Some(value.to_ascii_lowercase());
            }
        }
        None
    }
}

fn is_form_control(tag: &str) -> bool {
    matches!(
        tag,
        "button" | "input" | "optgroup" | "option" | "select" | "textarea"
    )
}

/// Pre-scan `<label for="...">` elements into an id → label-text map.
fn build_label_map(doc: &Html) -> HashMap<String, String> {
    let selector = Selector::parse("label[for]").expect("valid selector");
    let mut map = HashMap::new();
    for label in doc.select(&selector) {
        if let Some(for_id) = label.value().attr("for") {
            let text = normalize_whitespace(&label.text().collect::<String>());
            if !text.is_empty() {
                map.insert(for_id.to_string(), text);
            }
        }
    }
    map
}

/// One-pass scan of `<style>` blocks for `sel::before` / `sel::after` rules
/// with a string `content` value. Cascade is not modeled; later rules win.
fn scan_pseudo_content(doc: &Html) -> HashMap<(NodeId, Pseudo), String> {
    let style_selector = Selector::parse("style").expect("valid selector");
    let mut map = HashMap::new();

    for style in doc.select(&style_selector) {
        let css = style.text().collect::<String>();
        for rule in css.split('}') {
            let Some((selectors, body)) = rule.split_once('{') else {
                continue;
            };
            // Skip at-rules and anything with nested blocks.
            if selectors.contains('@') {
                continue;
            }
            let Some(content) = parse_content_value(body) else {
                continue;
            };
            for selector in selectors.split(',') {
                let selector = selector.trim();
                let (base, pseudo) = if let Some(base) = selector
                    .strip_suffix("::before")
                    .or_else(|| selector.strip_suffix(":before"))
                {
                    (base.trim(), Pseudo::Before)
                } else if let Some(base) = selector
                    .strip_suffix("::after")
                    .or_else(|| selector.strip_suffix(":after"))
                {
                    (base.trim(), Pseudo::After)
                } else {
                    continue;
                };
                if base.is_empty() {
                    continue;
                }
                let Ok(parsed) = Selector::parse(base) else {
                    continue;
                };
                for target in doc.select(&parsed) {
                    map.insert((target.id(), pseudo), content.clone());
                }
            }
        }
    }
    map
}

/// Extract a quoted string from a rule body's `content` declaration.
/// Keywords (`none`, `normal`) and functional values are ignored.
fn parse_content_value(body: &str) -> Option<String> {
    for declaration in body.split(';') {
        let Some((name, value)) = declaration.split_once(':') else {
            continue;
        };
        if !name.trim().eq_ignore_ascii_case("content") {
            continue;
        }
        let value = value.trim().trim_end_matches("!important").trim();
        for quote in ['"', '\''] {
            if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
                let inner = &value[1..value.len() - 1];
                return Some(inner.replace("\\\"", "\"").replace("\\'", "'"));
            }
        }
        return None;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(doc: &Html) -> DomContext<'_> {
        DomContext::new(doc, GlobalOptions::default())
    }

    fn first<'a>(doc: &'a Html, selector: &str) -> ElementRef<'a> {
        let sel = Selector::parse(selector).unwrap();
        doc.select(&sel).next().expect("element present")
    }

    #[test]
    fn implicit_roles_by_tag() {
        let doc = Html::parse_document(
            r#"<body><h2>T</h2><nav></nav><ul><li>x</li></ul>
               <a href="/x">link</a><a>plain</a><table><tr><td>c</td></tr></table></body>"#,
        );
        let ctx = context(&doc);
        assert_eq!(ctx.aria_role(first(&doc, "h2")).as_deref(), Some("heading"));
        assert_eq!(ctx.aria_role(first(&doc, "nav")).as_deref(), Some("navigation"));
        assert_eq!(ctx.aria_role(first(&doc, "ul")).as_deref(), Some("list"));
        assert_eq!(ctx.aria_role(first(&doc, "li")).as_deref(), Some("listitem"));
        assert_eq!(ctx.aria_role(first(&doc, "a[href]")).as_deref(), Some("link"));
        assert_eq!(ctx.aria_role(first(&doc, "a:not([href])")), None);
        assert_eq!(ctx.aria_role(first(&doc, "td")).as_deref(), Some("cell"));
    }

    #[test]
    fn explicit_role_wins() {
        let doc = Html::parse_document(r#"<body><div role="button">go</div></body>"#);
        let ctx = context(&doc);
        assert_eq!(ctx.aria_role(first(&doc, "div")).as_deref(), Some("button"));
    }

    #[test]
    fn input_roles_by_type() {
        let doc = Html::parse_document(
            r#"<body><input type="checkbox"><input type="submit"><input type="range">
               <input><input type="hidden"></body>"#,
        );
        let ctx = context(&doc);
        assert_eq!(
            ctx.aria_role(first(&doc, "input[type=checkbox]")).as_deref(),
            Some("checkbox")
        );
        assert_eq!(
            ctx.aria_role(first(&doc, "input[type=submit]")).as_deref(),
            Some("button")
        );
        assert_eq!(
            ctx.aria_role(first(&doc, "input[type=range]")).as_deref(),
            Some("slider")
        );
        assert_eq!(
            ctx.aria_role(first(&doc, "input:not([type])")).as_deref(),
            Some("textbox")
        );
        assert_eq!(ctx.aria_role(first(&doc, "input[type=hidden]")), None);
    }

    #[test]
    fn img_empty_alt_is_presentational() {
        let doc = Html::parse_document(r#"<body><img alt=""><img alt="Logo"></body>"#);
        let ctx = context(&doc);
        assert_eq!(
            ctx.aria_role(first(&doc, "img[alt='']")).as_deref(),
            Some("presentation")
        );
        assert_eq!(
            ctx.aria_role(first(&doc, "img[alt=Logo]")).as_deref(),
            Some("img")
        );
    }

    #[test]
    fn name_priority_aria_label_first() {
        let doc = Html::parse_document(r#"<body><button aria-label="Close">X</button></body>"#);
        let ctx = context(&doc);
        let button = first(&doc, "button");
        assert_eq!(ctx.accessible_name(button, "button"), "Close");
    }

    #[test]
    fn name_from_labelledby() {
        let doc = Html::parse_document(
            r#"<body><span id="cap">Amount due</span><input aria-labelledby="cap"></body>"#,
        );
        let ctx = context(&doc);
        assert_eq!(ctx.accessible_name(first(&doc, "input"), "textbox"), "Amount due");
    }

    #[test]
    fn name_from_label_for() {
        let doc = Html::parse_document(
            r#"<body><label for="e">Email</label><input id="e" type="email"></body>"#,
        );
        let ctx = context(&doc);
        assert_eq!(ctx.accessible_name(first(&doc, "input"), "textbox"), "Email");
    }

    #[test]
    fn name_from_content_is_role_gated() {
        let doc = Html::parse_document(r#"<body><h1> Hello  world </h1><p>Prose</p></body>"#);
        let ctx = context(&doc);
        assert_eq!(ctx.accessible_name(first(&doc, "h1"), "heading"), "Hello world");
        assert_eq!(ctx.accessible_name(first(&doc, "p"), "paragraph"), "");
    }

    #[test]
    fn hidden_detection() {
        let doc = Html::parse_document(
            r#"<body><div hidden>a</div><div style="display: none">b</div>
               <div aria-hidden="true">c</div><div>d</div></body>"#,
        );
        let ctx = context(&doc);
        let divs: Vec<_> = {
            let sel = Selector::parse("div").unwrap();
            doc.select(&sel).collect()
        };
        assert!(ctx.is_style_hidden(divs[0]));
        assert!(ctx.is_style_hidden(divs[1]));
        assert!(!ctx.is_style_hidden(divs[2]));
        assert!(ctx.is_hidden_for_aria(divs[2]));
        assert!(!ctx.is_hidden_for_aria(divs[3]));
    }

    #[test]
    fn checked_state_from_native_and_aria() {
        let doc = Html::parse_document(
            r#"<body><input type="checkbox" checked><input type="radio">
               <div role="checkbox" aria-checked="mixed">half</div></body>"#,
        );
        let ctx = context(&doc);
        assert_eq!(ctx.aria_checked(first(&doc, "input[type=checkbox]")), Tristate::True);
        assert_eq!(ctx.aria_checked(first(&doc, "input[type=radio]")), Tristate::False);
        assert_eq!(ctx.aria_checked(first(&doc, "div")), Tristate::Mixed);
    }

    #[test]
    fn disabled_through_fieldset() {
        let doc = Html::parse_document(
            r#"<body><fieldset disabled><input id="in"></fieldset><button>ok</button></body>"#,
        );
        let ctx = context(&doc);
        assert!(ctx.aria_disabled(first(&doc, "input")));
        assert!(!ctx.aria_disabled(first(&doc, "button")));
    }

    #[test]
    fn level_from_heading_and_attribute() {
        let doc = Html::parse_document(
            r#"<body><h3>x</h3><div role="heading" aria-level="4">y</div></body>"#,
        );
        let ctx = context(&doc);
        assert_eq!(ctx.aria_level(first(&doc, "h3")), Some(3));
        assert_eq!(ctx.aria_level(first(&doc, "div")), Some(4));
    }

    #[test]
    fn pseudo_content_scanned_from_style() {
        let doc = Html::parse_document(
            r#"<html><head><style>
                 .icon::before { content: "→ "; }
                 .done::after { content: 'ok' }
                 .skip::before { content: none; }
               </style></head>
               <body><span class="icon done skip">t</span></body></html>"#,
        );
        let ctx = context(&doc);
        let span = first(&doc, "span");
        assert_eq!(ctx.css_content(span.id(), Pseudo::Before), Some("→ "));
        assert_eq!(ctx.css_content(span.id(), Pseudo::After), Some("ok"));
    }

    #[test]
    fn inline_detection() {
        let doc = Html::parse_document(
            r#"<body><span>a</span><div>b</div><em style="display: block">c</em></body>"#,
        );
        let ctx = context(&doc);
        assert!(ctx.display_is_inline(first(&doc, "span")));
        assert!(!ctx.display_is_inline(first(&doc, "div")));
        assert!(!ctx.display_is_inline(first(&doc, "em")));
    }

    #[test]
    fn link_gets_pointer_cursor() {
        let doc = Html::parse_document(r#"<body><a href="/x">go</a><p>t</p></body>"#);
        let ctx = context(&doc);
        assert_eq!(ctx.cursor(first(&doc, "a")).as_deref(), Some("pointer"));
        assert_eq!(ctx.cursor(first(&doc, "p")), None);
    }
}
