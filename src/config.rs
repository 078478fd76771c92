//! Heuristic allow-lists for classification and metadata extraction
//!
//! Framework-specific attribute and tag names (click bindings, icon
//! components, custom option items) vary between host applications, so they
//! are configuration rather than constants. The defaults cover plain HTML
//! plus the Angular/Material forms the engine was originally tuned for.

use serde::Deserialize;

/// Configurable heuristics shared by the classifier and metadata extractor
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Attributes treated as click handlers (native or framework-style,
    /// including parenthesized bindings)
    pub click_attrs: Vec<String>,

    /// Tags treated as icon components for the clickable-icon rule
    pub icon_tags: Vec<String>,

    /// Custom tags treated as option-like selectable items, in addition to
    /// the native `option`
    pub option_tags: Vec<String>,

    /// Class names marking an element as its own menu/popup trigger
    pub menu_trigger_classes: Vec<String>,

    /// Tags considered at all by the text rule
    pub text_tags: Vec<String>,

    /// Subset of `text_tags` annotated even without a structure check
    pub simple_text_tags: Vec<String>,

    /// Tags whose presence in a subtree marks it as block structure rather
    /// than a leaf-like text container
    pub structural_tags: Vec<String>,

    /// When set, the full-document pass is confined to the first element
    /// with this tag; falls back to the document root when absent
    pub scan_root_tag: Option<String>,

    /// Report unrecognized semantic types as the literal tag name instead of
    /// the generic `"text"`
    pub type_falls_back_to_tag: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            click_attrs: strings(&["onclick", "ng-click", "(click)"]),
            icon_tags: strings(&["mat-icon"]),
            option_tags: strings(&["mat-option"]),
            menu_trigger_classes: strings(&["mat-mdc-menu-trigger", "clickable"]),
            text_tags: strings(&[
                "span", "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "td", "th", "li",
            ]),
            simple_text_tags: strings(&["span", "p", "td", "th", "li"]),
            structural_tags: strings(&["div", "h1", "h2", "h3", "h4", "h5", "h6"]),
            scan_root_tag: None,
            type_falls_back_to_tag: false,
        }
    }
}

impl ClassifierConfig {
    /// Default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: confine the full-document pass to a container tag
    pub fn scan_root_tag(mut self, tag: impl Into<String>) -> Self {
        self.scan_root_tag = Some(tag.into().to_ascii_lowercase());
        self
    }

    /// Builder method: replace the click-binding attribute list
    pub fn click_attrs(mut self, attrs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.click_attrs = attrs.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method: replace the option-like custom tag list
    pub fn option_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.option_tags = tags.into_iter().map(|t| t.into().to_ascii_lowercase()).collect();
        self
    }

    /// Builder method: replace the icon tag list
    pub fn icon_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.icon_tags = tags.into_iter().map(|t| t.into().to_ascii_lowercase()).collect();
        self
    }

    /// Builder method: report unknown semantic types as the literal tag name
    pub fn type_falls_back_to_tag(mut self, enabled: bool) -> Self {
        self.type_falls_back_to_tag = enabled;
        self
    }

    /// True when `tag` is an option-like selectable item (native or custom)
    pub fn is_option_like(&self, tag: &str) -> bool {
        tag == "option" || self.option_tags.iter().any(|t| t == tag)
    }

    /// True when `tag` is in the icon list
    pub fn is_icon_tag(&self, tag: &str) -> bool {
        self.icon_tags.iter().any(|t| t == tag)
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
