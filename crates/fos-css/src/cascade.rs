//! Style Cascade & Resolver
//!
//! Computes styles for DOM elements by:
//! 1. Applying user-agent defaults for the element's tag
//! 2. Applying the inline `style` attribute (normal, then `!important`)
//! 3. Resolving `inherit`, `initial` and inherited properties against the parent

use fos_dom::{DomTree, NodeId};

use crate::{ComputedStyle, CssParser, Declaration};
use crate::properties::PropertyId;

/// User-agent rule: tag names and the display value they get
struct UaRule {
    tags: &'static [&'static str],
    display: &'static str,
}

const UA_RULES: &[UaRule] = &[
    UaRule {
        tags: &[
            "html", "body", "div", "p", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol",
            "form", "header", "footer", "section", "article", "nav", "aside", "main",
        ],
        display: "block",
    },
    UaRule { tags: &["li"], display: "list-item" },
    UaRule { tags: &["img", "iframe", "input", "button", "select", "textarea"], display: "inline-block" },
    UaRule {
        tags: &["head", "script", "style", "link", "meta", "title", "template", "noscript"],
        display: "none",
    },
];

/// Style resolver - computes styles for DOM elements
#[derive(Debug, Default)]
pub struct StyleResolver {
    parser: CssParser,
}

impl StyleResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Specified style of an element: UA defaults plus inline declarations.
    ///
    /// Values are not resolved, so a literal `inherit` survives. Returns
    /// `None` for non-element nodes.
    pub fn specified_style(&self, tree: &DomTree, node_id: NodeId) -> Option<ComputedStyle> {
        let elem = tree.element(node_id)?;
        let mut style = ComputedStyle::new();

        for decl in self.ua_declarations(&elem.tag, elem.get_attr("type"), elem.get_attr("hidden").is_some()) {
            style.apply_declaration(&decl);
        }

        if let Some(inline) = elem.get_attr("style") {
            match self.parser.parse_declarations(inline) {
                Ok(decls) => {
                    // !important declarations win over normal ones
                    for decl in decls.iter().filter(|d| !d.important) {
                        style.apply_declaration(decl);
                    }
                    for decl in decls.iter().filter(|d| d.important) {
                        style.apply_declaration(decl);
                    }
                }
                Err(e) => tracing::warn!("Ignoring inline style on {:?}: {}", node_id, e),
            }
        }

        Some(style)
    }

    /// Computed style of an element, with inheritance applied.
    ///
    /// Returns `None` for non-element nodes.
    pub fn compute_style(&self, tree: &DomTree, node_id: NodeId) -> Option<ComputedStyle> {
        self.compute_style_chain(tree, node_id).into_iter().next()
    }

    /// Computed styles of an element and its element ancestors, innermost
    /// first, resolved in one pass from the outermost ancestor down.
    ///
    /// Empty for non-element nodes.
    pub fn compute_style_chain(&self, tree: &DomTree, node_id: NodeId) -> Vec<ComputedStyle> {
        if tree.element(node_id).is_none() {
            return Vec::new();
        }

        let mut chain = vec![node_id];
        chain.extend(tree.ancestors(node_id).take_while(|&a| tree.element(a).is_some()));

        let mut styles: Vec<ComputedStyle> = Vec::with_capacity(chain.len());
        for &id in chain.iter().rev() {
            let specified = self.specified_style(tree, id).unwrap_or_default();
            let resolved = Self::resolve(&specified, styles.last());
            styles.push(resolved);
        }
        styles.reverse();
        styles
    }

    fn resolve(specified: &ComputedStyle, parent: Option<&ComputedStyle>) -> ComputedStyle {
        let inherited = |property: &str| -> Option<String> {
            parent.and_then(|p| p.get(property)).map(str::to_string)
        };

        let mut style = ComputedStyle::initial();
        for id in PropertyId::ALL.iter().filter(|id| id.is_inherited()) {
            if let Some(value) = inherited(id.name()) {
                style.set(id.name(), &value);
            }
        }

        for (property, value) in specified.iter() {
            let initial = PropertyId::from_name(property).map(|id| id.initial_value());
            let inherits = PropertyId::from_name(property).is_some_and(|id| id.is_inherited());
            let resolved = match value {
                "inherit" => inherited(property).or(initial.map(str::to_string)),
                "initial" => initial.map(str::to_string),
                "unset" if inherits => inherited(property).or(initial.map(str::to_string)),
                "unset" => initial.map(str::to_string),
                other => Some(other.to_string()),
            };
            match resolved {
                Some(v) => style.set(property, &v),
                None => {
                    style.remove(property);
                }
            }
        }

        style
    }

    /// Default user-agent declarations for an element
    fn ua_declarations(&self, tag: &str, input_type: Option<&str>, hidden_attr: bool) -> Vec<Declaration> {
        let hidden_input = tag == "input" && input_type.is_some_and(|t| t.eq_ignore_ascii_case("hidden"));
        if hidden_attr || hidden_input {
            return vec![Declaration::new("display", "none")];
        }

        UA_RULES.iter()
            .find(|rule| rule.tags.contains(&tag))
            .map(|rule| vec![Declaration::new("display", rule.display)])
            .unwrap_or_default()
    }
}
