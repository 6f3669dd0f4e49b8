//! Card payload assembly.
//!
//! Builds the interactive-card 2.0 JSON envelope. Pure data
//! transformation; image uploads happen in the client before the
//! elements reach [`card_payload`].

use std::path::PathBuf;

use serde_json::{json, Value};

/// Default header color template.
pub const DEFAULT_TEMPLATE: &str = "blue";

/// One element of a rich card body, in display order.
#[derive(Debug, Clone, PartialEq)]
pub enum CardElement {
    /// Markdown block (bold, links, headings).
    Markdown(String),
    /// Local image, uploaded at send time.
    Image { path: PathBuf, alt: String },
    /// Image already uploaded, referenced by key.
    ImageKey { key: String, alt: String },
    /// Horizontal rule.
    Hr,
    /// Small grey footer text.
    Note(String),
}

/// A section of a progress report.
#[derive(Debug, Clone, Default)]
pub struct Section {
    pub heading: String,
    pub body: String,
    pub image: Option<PathBuf>,
}

/// Render one element to card JSON. `Image` must be resolved to
/// `ImageKey` first (the client does this); rendering it directly
/// yields `None`.
pub(crate) fn element_json(element: &CardElement) -> Option<Value> {
    match element {
        CardElement::Markdown(content) => Some(json!({
            "tag": "markdown",
            "content": content,
        })),
        CardElement::Image { .. } => None,
        CardElement::ImageKey { key, alt } => Some(json!({
            "tag": "img",
            "img_key": key,
            "alt": { "tag": "plain_text", "content": alt },
        })),
        CardElement::Hr => Some(json!({ "tag": "hr" })),
        CardElement::Note(content) => Some(json!({
            "tag": "note",
            "elements": [ { "tag": "plain_text", "content": content } ],
        })),
    }
}

/// Assemble the card envelope around rendered body elements.
pub fn card_payload(title: &str, template: &str, elements: &[Value]) -> Value {
    json!({
        "schema": "2.0",
        "config": { "wide_screen_mode": true },
        "header": {
            "title": { "tag": "plain_text", "content": title },
            "template": template,
        },
        "body": { "elements": elements },
    })
}

/// Expand report sections into card elements, separated by rules.
/// A section renders its heading as a markdown `##` block above the
/// body, then its image (alt-tagged with the heading).
pub fn sections_to_elements(sections: &[Section]) -> Vec<CardElement> {
    let mut elements = Vec::new();
    for (i, section) in sections.iter().enumerate() {
        if i > 0 {
            elements.push(CardElement::Hr);
        }
        let mut markdown = String::new();
        if !section.heading.is_empty() {
            markdown.push_str(&format!("## {}\n\n", section.heading));
        }
        if !section.body.is_empty() {
            markdown.push_str(&section.body);
        }
        if !markdown.is_empty() {
            elements.push(CardElement::Markdown(markdown));
        }
        if let Some(image) = &section.image {
            let alt = if section.heading.is_empty() {
                "image".to_string()
            } else {
                section.heading.clone()
            };
            elements.push(CardElement::Image {
                path: image.clone(),
                alt,
            });
        }
    }
    elements
}

/// Interleave text and image arguments pairwise (text 1, image 1,
/// text 2, image 2, ...), the way the CLI assembles ad-hoc cards.
pub fn interleave_elements(texts: &[String], images: &[PathBuf]) -> Vec<CardElement> {
    let mut elements = Vec::new();
    let longest = texts.len().max(images.len());
    for i in 0..longest {
        if let Some(text) = texts.get(i) {
            elements.push(CardElement::Markdown(text.clone()));
        }
        if let Some(path) = images.get(i) {
            elements.push(CardElement::Image {
                path: path.clone(),
                alt: format!("Image {}", i + 1),
            });
        }
    }
    elements
}
