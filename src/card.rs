//! Project card rendering.
//!
//! A card is driven entirely by its string attributes. Any attribute change
//! recomputes the whole fragment; a theme change only flips the host's
//! `light-theme` class.

use std::fmt::Write as _;

use crate::html::escape;
use crate::record::{parse_tags, ProjectRecord};
use crate::theme::{Theme, ThemeSurface};

/// Attribute names a card observes, in render order.
pub const OBSERVED_ATTRIBUTES: [&str; 8] = [
    "data-index",
    "title",
    "description",
    "image",
    "image-alt",
    "link",
    "overview",
    "tags",
];

const CARD_STYLE: &str = r#"<style>
:host {
  --card-bg-start: #252526; --card-bg-end: #2d2d30; --card-border: #3e3e42;
  --card-border-accent: #569cd6; --card-border-hover: #4ec9b0;
  --text-primary: #d4d4d4; --text-description: white; --text-heading: #6a9955;
  --text-accent: #4ec9b0; --text-tag: #b5cea8;
  --badge-bg: #1e1e1e; --badge-text: #569cd6; --pitch-bg: #2d2d30; --tag-bg: #1e1e1e;
  display: block; position: relative; padding: 2rem; margin-bottom: 2rem;
  background: linear-gradient(135deg, var(--card-bg-start) 0%, var(--card-bg-end) 100%);
  border: 1px solid var(--card-border); border-left: 4px solid var(--card-border-accent);
  border-radius: 8px; font-family: 'Fira Code', 'Courier New', monospace;
  color: var(--text-primary);
}
:host(.light-theme) {
  --card-bg-start: #ececec; --card-bg-end: #f8f8f8; --card-border: #d4d4d4;
  --text-primary: #3a3a3a; --text-description: #3a3a3a;
  --badge-bg: #f5f5f5; --pitch-bg: #ececec; --tag-bg: #f5f5f5;
}
.index-badge { position: absolute; top: -0.75rem; left: 1rem; background: var(--badge-bg); color: var(--badge-text); }
.project-header h2 { color: var(--text-heading); }
.project-description { color: var(--text-description); border-left: 3px solid var(--card-border); }
.image-container img { display: block; width: 100%; height: auto; }
.project-pitch { background: var(--pitch-bg); border-left: 3px solid var(--text-accent); }
.tech-stack span { display: inline-block; background: var(--tag-bg); color: var(--text-tag); }
</style>"#;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardAttributes {
    pub data_index: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub image_alt: Option<String>,
    pub link: Option<String>,
    pub overview: Option<String>,
    pub tags: Option<String>,
}

impl CardAttributes {
    /// Attributes for the card showing `record` at `position` in a list,
    /// with the gallery's fallbacks applied.
    pub fn from_record(record: &ProjectRecord, position: usize) -> Self {
        fn or(value: &str, fallback: &str) -> Option<String> {
            Some(if value.is_empty() { fallback } else { value }.to_string())
        }

        let index = if record.index.is_empty() {
            (position + 1).to_string()
        } else {
            record.index.clone()
        };

        Self {
            data_index: Some(index),
            title: or(&record.title, "Untitled Project"),
            description: Some(record.description.clone()),
            image: Some(record.image.clone()),
            image_alt: Some(record.image_alt.clone()),
            link: or(&record.link, "#"),
            overview: Some(record.overview.clone()),
            tags: Some(record.tags.clone()),
        }
    }

    /// Set an observed attribute. Returns `false` for names a card ignores.
    pub fn set(&mut self, name: &str, value: Option<String>) -> bool {
        let slot = match name {
            "data-index" => &mut self.data_index,
            "title" => &mut self.title,
            "description" => &mut self.description,
            "image" => &mut self.image,
            "image-alt" => &mut self.image_alt,
            "link" => &mut self.link,
            "overview" => &mut self.overview,
            "tags" => &mut self.tags,
            _ => return false,
        };
        *slot = value;
        true
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        match name {
            "data-index" => self.data_index.as_deref(),
            "title" => self.title.as_deref(),
            "description" => self.description.as_deref(),
            "image" => self.image.as_deref(),
            "image-alt" => self.image_alt.as_deref(),
            "link" => self.link.as_deref(),
            "overview" => self.overview.as_deref(),
            "tags" => self.tags.as_deref(),
            _ => None,
        }
    }
}

/// The AVIF sibling of a GIF asset: `/gif/` becomes `/avif/` and `.gif`
/// becomes `.avif`, first occurrence of each.
pub fn avif_variant(image: &str) -> String {
    image.replacen("/gif/", "/avif/", 1).replacen(".gif", ".avif", 1)
}

fn attr_or<'a>(value: &'a Option<String>, fallback: &'a str) -> &'a str {
    match value.as_deref() {
        Some(v) if !v.is_empty() => v,
        _ => fallback,
    }
}

/// Render the card's shadow content from its attributes.
pub fn render_fragment(attrs: &CardAttributes) -> String {
    let index = attr_or(&attrs.data_index, "1");
    let title = attr_or(&attrs.title, "Project Title");
    let description = attr_or(&attrs.description, "Project description");
    let image = attr_or(&attrs.image, "");
    let image_alt = attr_or(&attrs.image_alt, "Project image");
    let link = attr_or(&attrs.link, "#");
    let overview = attr_or(&attrs.overview, "");
    let tags = parse_tags(attr_or(&attrs.tags, ""));

    let mut out = String::with_capacity(CARD_STYLE.len() + 512);
    out.push_str(CARD_STYLE);
    let _ = write!(
        out,
        concat!(
            "<span class=\"index-badge\">[{index}]</span>",
            "<header class=\"project-header\"><h2>{title}</h2></header>",
            "<p class=\"project-description\">{description}</p>",
            "<figure class=\"image-container\">",
            "<a href=\"{link}\" target=\"_blank\" rel=\"noopener noreferrer\">",
            "<picture>",
            "<source srcset=\"{avif}\" type=\"image/avif\">",
            "<img src=\"{image}\" alt=\"{image_alt}\">",
            "</picture>",
            "</a>",
            "</figure>",
            "<aside class=\"project-pitch\"><h3>Project Overview</h3><p>{overview}</p></aside>",
            "<footer class=\"tech-stack\">"
        ),
        index = escape(index),
        title = escape(title),
        description = escape(description),
        link = escape(link),
        avif = escape(&avif_variant(image)),
        image = escape(image),
        image_alt = escape(image_alt),
        overview = escape(overview),
    );
    for tag in &tags {
        let _ = write!(out, "<span>{}</span>", escape(tag));
    }
    out.push_str("</footer>");
    out
}

#[derive(Debug, Clone)]
pub struct ProjectCard {
    attributes: CardAttributes,
    fragment: String,
    light: bool,
    renders: u32,
}

impl ProjectCard {
    /// Build and render a card under the current theme.
    pub fn new(attributes: CardAttributes, theme: Theme) -> Self {
        let mut card = Self {
            attributes,
            fragment: String::new(),
            light: false,
            renders: 0,
        };
        card.render();
        card.apply_theme(theme);
        card
    }

    pub fn from_record(record: &ProjectRecord, position: usize, theme: Theme) -> Self {
        Self::new(CardAttributes::from_record(record, position), theme)
    }

    /// Update one attribute; observed attributes trigger a full re-render.
    pub fn set_attribute(&mut self, name: &str, value: Option<String>) {
        if self.attributes.set(name, value) {
            self.render();
        }
    }

    pub fn attributes(&self) -> &CardAttributes {
        &self.attributes
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    pub fn is_light(&self) -> bool {
        self.light
    }

    pub fn render_count(&self) -> u32 {
        self.renders
    }

    pub fn apply_theme(&mut self, theme: Theme) {
        self.light = theme == Theme::Light;
    }

    pub fn to_html(&self) -> String {
        let class = if self.light { " class=\"light-theme\"" } else { "" };
        format!("<project-card{class}>{}</project-card>", self.fragment)
    }

    fn render(&mut self) {
        self.fragment = render_fragment(&self.attributes);
        self.renders += 1;
    }
}

impl ThemeSurface for ProjectCard {
    fn set_variant(&mut self, theme: Theme) {
        self.apply_theme(theme);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn avif_variant_swaps_directory_and_extension() {
        assert_eq!(avif_variant("img/gif/demo.gif"), "img/avif/demo.avif");
        assert_eq!(avif_variant("demo.png"), "demo.png");
        assert_eq!(avif_variant(""), "");
    }

    #[test]
    fn avif_variant_replaces_first_occurrence_only() {
        assert_eq!(avif_variant("/gif/a.gif.gif"), "/avif/a.avif.gif");
    }

    #[test]
    fn empty_attributes_render_fallback_text() {
        let html = render_fragment(&CardAttributes::default());
        assert!(html.contains("[1]"));
        assert!(html.contains("<h2>Project Title</h2>"));
        assert!(html.contains("Project description"));
        assert!(html.contains("alt=\"Project image\""));
        assert!(html.contains("href=\"#\""));
        assert!(html.contains("<footer class=\"tech-stack\"></footer>"));
    }

    #[test]
    fn record_fallbacks_use_position_and_untitled() {
        let attrs = CardAttributes::from_record(&ProjectRecord::default(), 2);
        assert_eq!(attrs.data_index.as_deref(), Some("3"));
        assert_eq!(attrs.title.as_deref(), Some("Untitled Project"));
        assert_eq!(attrs.link.as_deref(), Some("#"));
        assert_eq!(attrs.tags.as_deref(), Some(""));
    }

    #[test]
    fn tags_render_as_spans() {
        let record = ProjectRecord {
            title: "A".into(),
            tags: "go, rust ,  wasm".into(),
            ..ProjectRecord::default()
        };
        let card = ProjectCard::from_record(&record, 0, Theme::Dark);
        assert!(card
            .fragment()
            .contains("<span>go</span><span>rust</span><span>wasm</span></footer>"));
    }

    #[test]
    fn attribute_change_rerenders_whole_fragment() {
        let mut card = ProjectCard::new(CardAttributes::default(), Theme::Dark);
        assert_eq!(card.render_count(), 1);
        card.set_attribute("title", Some("Renamed".into()));
        assert_eq!(card.render_count(), 2);
        assert!(card.fragment().contains("<h2>Renamed</h2>"));
        card.set_attribute("unobserved", Some("x".into()));
        assert_eq!(card.render_count(), 2);
    }

    #[test]
    fn theme_change_does_not_rerender() {
        let mut card = ProjectCard::new(CardAttributes::default(), Theme::Dark);
        assert!(!card.is_light());
        card.set_variant(Theme::Light);
        assert!(card.is_light());
        assert_eq!(card.render_count(), 1);
        assert!(card.to_html().starts_with("<project-card class=\"light-theme\">"));
    }

    #[test]
    fn interpolated_values_are_escaped() {
        let mut attrs = CardAttributes::default();
        attrs.set("title", Some("<script>x</script>".into()));
        attrs.set("link", Some("https://a.test/?q=\"x\"".into()));
        let html = render_fragment(&attrs);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("href=\"https://a.test/?q=&quot;x&quot;\""));
    }

    #[test]
    fn attribute_lookup_by_name() {
        let mut attrs = CardAttributes::default();
        for name in OBSERVED_ATTRIBUTES {
            assert!(attrs.set(name, Some(name.to_uppercase())));
        }
        assert_eq!(attrs.get("image-alt"), Some("IMAGE-ALT"));
        assert_eq!(attrs.get("nope"), None);
    }
}
