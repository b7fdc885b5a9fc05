//! HTML to plain text
//!
//! Strips page chrome, picks the main content container and flattens it to
//! line-separated text.

use scraper::{Html, Selector};

/// Elements removed before any text is collected
const NOISE_ELEMENTS: &str = "script, style, nav, footer, header, aside, iframe";

/// Main-content containers, tried in order; the first match wins
const CONTENT_SELECTORS: &[&str] = &[
    "article",
    "main",
    r#"[role="main"]"#,
    ".content",
    ".post",
    ".entry",
];

const TRUNCATION_MARKER: &str = "...";

pub(crate) fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// Concatenate text fragments and collapse runs of whitespace to one space
pub(crate) fn collapse_whitespace<'a>(fragments: impl Iterator<Item = &'a str>) -> String {
    let joined: String = fragments.collect();
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extract the readable text of an HTML page.
///
/// Returns `None` when the page has no body or no visible text. Output longer
/// than `max_chars` characters is cut and suffixed with `...`.
pub fn extract_main_text(html: &str, max_chars: usize) -> Option<String> {
    let mut document = Html::parse_document(html);

    if let Some(noise) = selector(NOISE_ELEMENTS) {
        let noise_ids: Vec<_> = document.select(&noise).map(|el| el.id()).collect();
        for id in noise_ids {
            if let Some(mut node) = document.tree.get_mut(id) {
                node.detach();
            }
        }
    }

    let main = CONTENT_SELECTORS
        .iter()
        .filter_map(|css| selector(css))
        .find_map(|sel| document.select(&sel).next())
        .or_else(|| {
            let body = selector("body")?;
            document.select(&body).next()
        })?;

    let text = main
        .text()
        .flat_map(|chunk| chunk.lines())
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    if text.is_empty() {
        return None;
    }

    Some(truncate_chars(text, max_chars))
}

fn truncate_chars(text: String, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_MARKER),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefers_article_and_strips_noise() {
        let html = r#"
            <html><head><style>body { color: red }</style></head>
            <body>
              <header>Site header</header>
              <nav>Home | About</nav>
              <div class="content">Sidebar-ish content block</div>
              <article>
                <h1>Title</h1>
                <script>var tracking = 1;</script>
                <p>First paragraph.</p>

                <p>  Second paragraph.  </p>
                <aside>Related links</aside>
              </article>
              <footer>Copyright</footer>
            </body></html>
        "#;

        let text = extract_main_text(html, 5000).unwrap();

        assert_eq!(text, "Title\nFirst paragraph.\nSecond paragraph.");
    }

    #[test]
    fn test_selector_priority() {
        let html = r#"<body><div class="post">Post body</div><main>Main body</main></body>"#;
        assert_eq!(extract_main_text(html, 5000).unwrap(), "Main body");

        let html = r#"<body><div role="main">Role main</div><div class="entry">Entry</div></body>"#;
        assert_eq!(extract_main_text(html, 5000).unwrap(), "Role main");

        let html = r#"<body><div class="entry">Entry</div><div class="post">Post</div></body>"#;
        assert_eq!(extract_main_text(html, 5000).unwrap(), "Post");
    }

    #[test]
    fn test_falls_back_to_body() {
        let html = "<html><body><div>Just a div</div><p>and a paragraph</p></body></html>";
        assert_eq!(
            extract_main_text(html, 5000).unwrap(),
            "Just a div\nand a paragraph"
        );
    }

    #[test]
    fn test_empty_page_yields_none() {
        assert!(extract_main_text("", 5000).is_none());
        assert!(extract_main_text("<html><body><script>x()</script></body></html>", 5000).is_none());
    }

    #[test]
    fn test_truncation_counts_characters() {
        let html = "<body><p>héllo wörld</p></body>";

        assert_eq!(extract_main_text(html, 5).unwrap(), "héllo...");
        assert_eq!(extract_main_text(html, 11).unwrap(), "héllo wörld");
    }

    #[test]
    fn test_collapse_whitespace() {
        let fragments = ["  The ", "Rust", "\n book  "];
        assert_eq!(collapse_whitespace(fragments.into_iter()), "The Rust book");
    }
}
