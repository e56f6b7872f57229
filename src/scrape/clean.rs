//! HTML to plain text extraction.

use regex::Regex;
use scraper::{ElementRef, Html};

/// Tags removed entirely, contents included, before text extraction.
const STRIP_TAGS: [&str; 7] = [
    "script", "style", "sup", "img", "figure", "table", "noscript",
];

/// Extracts normalized text from HTML documents.
pub struct HtmlCleaner {
    whitespace: Regex,
}

impl HtmlCleaner {
    pub fn new() -> Self {
        let whitespace = Regex::new(r"\s+").expect("Invalid regex");
        Self { whitespace }
    }

    /// Extract the visible text of a page.
    ///
    /// Denylisted subtrees are dropped, remaining text nodes are joined with
    /// spaces, whitespace runs collapse to a single space, and the result is
    /// trimmed. Plain text input passes through with only whitespace
    /// normalization.
    pub fn extract_text(&self, html: &str) -> String {
        let document = Html::parse_document(html);

        let mut raw = String::new();
        collect_text(document.root_element(), &mut raw);

        self.whitespace.replace_all(&raw, " ").trim().to_string()
    }
}

impl Default for HtmlCleaner {
    fn default() -> Self {
        Self::new()
    }
}

/// Append the text of an element's subtree, skipping denylisted elements.
fn collect_text(element: ElementRef, out: &mut String) {
    if STRIP_TAGS.contains(&element.value().name()) {
        return;
    }

    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            collect_text(child_element, out);
        } else if let Some(text) = child.value().as_text() {
            out.push_str(text);
            out.push(' ');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_denylisted_tags_with_contents() {
        let html = r#"
            <html><body>
                <script>var hidden = 1;</script>
                <style>.x { color: red; }</style>
                <p>La batalla ocurrió<sup>[3]</sup> en 1824.</p>
                <table><tr><td>celda tabular</td></tr></table>
                <figure><figcaption>una leyenda</figcaption></figure>
                <noscript>sin javascript</noscript>
            </body></html>
        "#;

        let text = HtmlCleaner::new().extract_text(html);
        assert_eq!(text, "La batalla ocurrió en 1824.");
        assert!(!text.contains("hidden"));
        assert!(!text.contains("celda tabular"));
        assert!(!text.contains("una leyenda"));
        assert!(!text.contains("sin javascript"));
    }

    #[test]
    fn test_drops_nested_content_inside_denylisted_tags() {
        let html = "<table><tr><td><p>dentro de tabla</p></td></tr></table><p>fuera</p>";
        let text = HtmlCleaner::new().extract_text(html);
        assert_eq!(text, "fuera");
    }

    #[test]
    fn test_collapses_whitespace_runs() {
        let html = "<p>uno\n\n   dos\t\ttres</p>\n<p>cuatro</p>";
        let text = HtmlCleaner::new().extract_text(html);
        assert_eq!(text, "uno dos tres cuatro");
    }

    #[test]
    fn test_plain_text_passes_through() {
        let text = HtmlCleaner::new().extract_text("A. B. C.");
        assert_eq!(text, "A. B. C.");
    }

    #[test]
    fn test_empty_page_yields_empty_string() {
        let cleaner = HtmlCleaner::new();
        assert_eq!(cleaner.extract_text(""), "");
        assert_eq!(cleaner.extract_text("<script>only();</script>"), "");
    }
}
