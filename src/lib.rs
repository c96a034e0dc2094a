//! Accessibility-tree snapshot matching engine.
//!
//! Builds a normalized ARIA tree from parsed HTML, matches declarative
//! YAML-like templates against it, finds the closest subtree for diffing
//! when nothing matches, and renders trees back to canonical text.

pub mod bridge;
pub mod builder;
pub mod matcher;
pub mod normalize;
pub mod render;
pub mod score;
pub mod template;
pub mod text;
pub mod tree;

pub use bridge::GlobalOptions;
pub use builder::{body_or_root, SnapshotEngine, SnapshotOptions};
pub use matcher::{get_all_by_aria, matches_aria_tree, ReceivedTree, TreeMatchResult};
pub use render::{render_aria_tree, RenderMode, RenderOptions};
pub use template::{parse_template, ContainerMode, RoleTemplate, TemplateNode, TextPattern};
pub use tree::{AriaNode, AriaSnapshot, BoxInfo, NodeChild, Tristate};
