use scraper::{ElementRef, Selector};

/// Collapses whitespace runs, treating non-breaking and zero-width spaces as
/// blanks.
pub fn clean_text(text: &str) -> String {
    text.split(|c: char| c.is_whitespace() || matches!(c, '\u{a0}' | '\u{200b}' | '\u{200c}' | '\u{200d}' | '\u{feff}'))
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text of `element` with a line break between text nodes.
pub fn joined_text(element: ElementRef) -> String {
    element.text().collect::<Vec<_>>().join("\n")
}

/// All text of `element` on one cleaned line.
pub fn flat_text(element: ElementRef) -> String {
    clean_text(&joined_text(element))
}

/// Non-empty, cleaned lines of `element`.
pub fn text_lines(element: ElementRef) -> Vec<String> {
    joined_text(element)
        .lines()
        .map(clean_text)
        .filter(|l| !l.is_empty())
        .collect()
}

pub fn none_if_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

/// Parses a selector that is known to be valid.
#[allow(clippy::unwrap_used)]
pub fn sel(selector: &str) -> Selector {
    Selector::parse(selector).unwrap()
}
