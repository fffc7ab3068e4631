//! Structural queries over fetched HTML.
//!
//! Thin layer over `scraper` shared by the DBLP and CiteSeer stages. A
//! [`Markup`] is not `Send`, so stages parse, extract owned values and drop
//! it before the next fetch.

use crate::error::{MinerError, Result};
use scraper::{ElementRef, Html, Selector};

/// Parsed HTML page
pub struct Markup {
    document: Html,
}

impl Markup {
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    /// All elements matching `css`, in document order
    pub fn select_all(&self, css: &str) -> Result<Vec<ElementRef<'_>>> {
        let selector = selector(css)?;
        Ok(self.document.select(&selector).collect())
    }

    /// First element matching `css`
    pub fn first(&self, css: &str) -> Result<Option<ElementRef<'_>>> {
        let selector = selector(css)?;
        Ok(self.document.select(&selector).next())
    }
}

/// Compile a CSS selector, reporting failures as parse errors
pub fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| MinerError::Parse(format!("Bad selector '{}': {}", css, e)))
}

/// First descendant of `element` matching `css`
pub fn first_within<'a>(element: ElementRef<'a>, css: &str) -> Result<Option<ElementRef<'a>>> {
    let selector = selector(css)?;
    Ok(element.select(&selector).next())
}

/// All descendants of `element` matching `css`
pub fn all_within<'a>(element: ElementRef<'a>, css: &str) -> Result<Vec<ElementRef<'a>>> {
    let selector = selector(css)?;
    Ok(element.select(&selector).collect())
}

/// Concatenated text of an element and its descendants
pub fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Text of the element's first direct text node, if it has one
pub fn leading_text(element: ElementRef<'_>) -> Option<String> {
    element
        .children()
        .next()
        .and_then(|node| node.value().as_text().map(|t| t.to_string()))
}

pub fn href(element: ElementRef<'_>) -> Option<&str> {
    element.value().attr("href")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
        <div class="head"><a href="/one">One</a><a href="/two">Two</a></div>
        <div id="docAuthors">by Ann, Bob<span>extra</span></div>
    </body></html>"#;

    #[test]
    fn test_select_and_href() -> Result<()> {
        let markup = Markup::parse(PAGE);
        let links = markup.select_all("a")?;
        assert_eq!(links.len(), 2);
        assert_eq!(href(links[1]), Some("/two"));
        assert_eq!(text_of(links[0]), "One");
        Ok(())
    }

    #[test]
    fn test_first_within() -> Result<()> {
        let markup = Markup::parse(PAGE);
        let head = markup.first("div.head")?.expect("head block");
        let link = first_within(head, "a")?.expect("link");
        assert_eq!(href(link), Some("/one"));
        assert!(first_within(head, "img")?.is_none());
        assert_eq!(all_within(head, "a")?.len(), 2);
        Ok(())
    }

    #[test]
    fn test_leading_text_stops_at_first_node() -> Result<()> {
        let markup = Markup::parse(PAGE);
        let authors = markup.first("div#docAuthors")?.expect("authors");
        assert_eq!(leading_text(authors).as_deref(), Some("by Ann, Bob"));
        assert_eq!(text_of(authors), "by Ann, Bobextra");
        Ok(())
    }

    #[test]
    fn test_bad_selector() {
        assert!(matches!(selector("div[["), Err(MinerError::Parse(_))));
    }
}
