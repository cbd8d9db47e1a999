// Parsed-document helpers over scraper

use mdcrawl_core::ParseError;
use scraper::{Html, Selector};

fn selector(css: &str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|e| ParseError(format!("invalid selector {}: {}", css, e)))
}

/// Raw `href` values of every `<a>` in the document, in document order.
pub fn extract_links(html: &str) -> Result<Vec<String>, ParseError> {
    let document = Html::parse_document(html);
    let link_selector = selector("a[href]")?;

    Ok(document
        .select(&link_selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect())
}

/// Text of the first `<title>`, whitespace-collapsed. `None` when absent or empty.
pub fn title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let title_selector = selector("title").ok()?;

    let text = document
        .select(&title_selector)
        .next()?
        .text()
        .collect::<Vec<_>>()
        .join(" ");
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");

    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_links_in_document_order() {
        let html = r#"<html><body>
            <a href="/b">B</a>
            <p><a href="https://other.com/a">A</a></p>
            <a name="anchor">no href</a>
            <a href="/b">B again</a>
        </body></html>"#;

        assert_eq!(
            extract_links(html).unwrap(),
            vec!["/b", "https://other.com/a", "/b"]
        );
    }

    #[test]
    fn test_extract_links_empty_document() {
        assert!(extract_links("").unwrap().is_empty());
    }

    #[test]
    fn test_title() {
        let html = "<html><head><title>  Hello\n   World </title></head></html>";
        assert_eq!(title(html), Some("Hello World".to_string()));
    }

    #[test]
    fn test_missing_title() {
        assert_eq!(title("<html><body>x</body></html>"), None);
        assert_eq!(title("<title>   </title>"), None);
    }
}
