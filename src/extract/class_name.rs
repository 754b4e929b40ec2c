use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::Rules;
use crate::{
    model::{Session, SessionSpeaker},
    util::{flat_text, none_if_empty, sel},
};

static SEL_DIV: LazyLock<Selector> = LazyLock::new(|| sel("div"));

static CONTAINER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)session|event|agenda-item").unwrap());
static TITLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)title|heading|session-name").unwrap());
static TIME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)time|date|when").unwrap());
static SPEAKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)speaker|presenter|moderator").unwrap());
static DESCRIPTION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)description|summary|abstract").unwrap());
static TRACK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)track|category|topic").unwrap());
static LOCATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)location|room|venue").unwrap());

const SPEAKER_TAGS: &[&str] = &["span", "div", "p"];
const TITLE_TAGS: &[&str] = &["h2", "h3", "h4", "a"];

/// `<div class="agenda-item">` blocks whose parts are tagged by class name.
///
/// A container holding another titled container is a list wrapper, not a
/// session, and is skipped in favour of its children.
pub fn extract(html: &Html, _rules: &Rules) -> Vec<Session> {
    html.select(&SEL_DIV)
        .filter(|div| has_class(*div, &CONTAINER) && !wraps_sessions(*div))
        .filter_map(parse_container)
        .collect()
}

fn wraps_sessions(div: ElementRef) -> bool {
    find_all(div, &["div"], &CONTAINER).any(|inner| find(inner, TITLE_TAGS, &TITLE).is_some())
}

fn parse_container(div: ElementRef) -> Option<Session> {
    let title = find(div, TITLE_TAGS, &TITLE)
        .map(flat_text)
        .and_then(none_if_empty)?;

    let field = |tags: &'static [&'static str], re: &'static Regex| {
        find(div, tags, re).map(flat_text).and_then(none_if_empty)
    };

    // innermost matches only, so a `speakers` wrapper does not swallow its items
    let mut speakers: Vec<SessionSpeaker> = Vec::new();
    for text in find_all(div, SPEAKER_TAGS, &SPEAKER)
        .filter(|e| find(*e, SPEAKER_TAGS, &SPEAKER).is_none())
        .map(flat_text)
    {
        let credit = SessionSpeaker::Line(text);
        if !credit.as_str().is_empty() && !speakers.contains(&credit) {
            speakers.push(credit);
        }
    }

    Some(Session {
        time: field(&["time", "span", "div"], &TIME),
        location: field(&["span", "div"], &LOCATION),
        tracks: field(&["span", "div"], &TRACK).into_iter().collect(),
        description: field(&["div", "p", "span"], &DESCRIPTION),
        speakers,
        ..Session::new(title)
    })
}

fn has_class(element: ElementRef, re: &Regex) -> bool {
    element.value().classes().any(|c| re.is_match(c))
}

fn find_all<'a>(
    root: ElementRef<'a>,
    tags: &'static [&'static str],
    re: &'static Regex,
) -> impl Iterator<Item = ElementRef<'a>> {
    root.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(move |e| tags.contains(&e.value().name()) && has_class(*e, re))
}

fn find<'a>(
    root: ElementRef<'a>,
    tags: &'static [&'static str],
    re: &'static Regex,
) -> Option<ElementRef<'a>> {
    find_all(root, tags, re).next()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_blocks_become_sessions() {
        let html = Html::parse_document(
            r#"<div class="agenda">
                 <div class="Agenda-Item">
                   <h3 class="item-title">Elections   Roundtable</h3>
                   <span class="when">Tuesday 2:00 pm</span>
                   <div class="speakers">
                     <span class="speaker">Jane Doe, Senator</span>
                     <span class="speaker">John Roe</span>
                   </div>
                   <p class="summary">Officials compare notes.</p>
                   <span class="topic">Elections</span>
                   <span class="room">Room 210</span>
                 </div>
                 <div class="event-footer"><p>no title here</p></div>
               </div>"#,
        );
        let sessions = extract(&html, &Rules::default());
        assert_eq!(sessions.len(), 1);
        let s = &sessions[0];
        assert_eq!(s.title, "Elections Roundtable");
        assert_eq!(s.time.as_deref(), Some("Tuesday 2:00 pm"));
        assert_eq!(s.location.as_deref(), Some("Room 210"));
        assert_eq!(s.tracks, ["Elections"]);
        assert_eq!(s.description.as_deref(), Some("Officials compare notes."));
        let names: Vec<_> = s.speakers.iter().map(SessionSpeaker::as_str).collect();
        assert_eq!(names, ["Jane Doe, Senator", "John Roe"]);
    }

    #[test]
    fn list_wrappers_yield_their_children() {
        let html = Html::parse_document(
            r#"<div class="sessions-list">
                 <div class="session">
                   <h3 class="title">AI Policy Forum</h3>
                   <span class="speaker">Jane Doe</span>
                 </div>
                 <div class="session">
                   <h3 class="title">Budget Roundtable</h3>
                   <span class="speaker">John Roe</span>
                 </div>
               </div>"#,
        );
        let sessions = extract(&html, &Rules::default());
        let got: Vec<_> = sessions
            .iter()
            .map(|s| (s.title.as_str(), s.speakers.iter().map(SessionSpeaker::as_str).collect::<Vec<_>>()))
            .collect();
        assert_eq!(
            got,
            [("AI Policy Forum", vec!["Jane Doe"]), ("Budget Roundtable", vec!["John Roe"])]
        );
    }
}
