// File: src/document.rs
// Purpose: Full HTML document around a composed body

use maud::{html, Markup, DOCTYPE};

use crate::metadata::{DESCRIPTION, TITLE};
use crate::Metadata;

/// A composed body plus the metadata that goes into its `<head>`
#[derive(Debug, Clone)]
pub struct Document {
    pub metadata: Metadata,
    pub body: Markup,
}

impl Document {
    pub fn new(metadata: Metadata, body: Markup) -> Self {
        Self { metadata, body }
    }

    pub fn title(&self) -> Option<&str> {
        self.metadata.title()
    }

    /// Renders the complete page
    ///
    /// `title` becomes `<title>`; every other field becomes
    /// `<meta name=... content=...>`.
    ///
    /// ```
    /// use maud::html;
    /// use trellis::{Document, Metadata};
    ///
    /// let doc = Document::new(
    ///     Metadata::new().with("title", "Page Deux").with("description", "Page Deux"),
    ///     html! { h1 { "Page Deux" } },
    /// );
    /// let html = doc.render().into_string();
    ///
    /// assert!(html.starts_with("<!DOCTYPE html>"));
    /// assert!(html.contains("<title>Page Deux</title>"));
    /// assert!(html.contains(r#"<meta name="description" content="Page Deux">"#));
    /// ```
    pub fn render(&self) -> Markup {
        html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="utf-8";
                    @if let Some(title) = self.metadata.title() {
                        title { (title) }
                    }
                    @if let Some(description) = self.metadata.description() {
                        meta name="description" content=(description);
                    }
                    @for (name, content) in self.metadata.iter().filter(|(k, _)| *k != TITLE && *k != DESCRIPTION) {
                        meta name=(name) content=(content);
                    }
                }
                body {
                    (self.body)
                }
            }
        }
    }
}
