use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::{Rules, slash_date};
use crate::{
    model::{Session, SessionSpeaker, split_credit},
    util::{clean_text, flat_text, joined_text, none_if_empty, sel, text_lines},
};

static SEL_DATED: LazyLock<Selector> = LazyLock::new(|| sel("td[data-value]"));

static TIME_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d{1,2}:\d{2}\s*[ap]m\s*-\s*\d{1,2}:\d{2}\s*[ap]m)(.*)$").unwrap()
});
static TIME_START: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^\d{1,2}:\d{2}\s*[ap]m").unwrap());
static CREDIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:Speaker|Moderator|Presenter|Panelist):[^\S\n]*([^\n<]+)").unwrap());
static TRACK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Track:[^\S\n]*([^\n<]+)").unwrap());

const MARKERS: [&str; 5] = ["Speaker:", "Moderator:", "Presenter:", "Panelist:", "Track:"];

/// A `<td data-value="MM/DD/YYYY">` cell.
pub fn is_date_cell(cell: ElementRef) -> bool {
    cell.value().name() == "td"
        && cell
            .attr("data-value")
            .is_some_and(|v| v.len() == 10 && v.contains('/'))
}

/// Rows laid out as `| title | date, time, room | summary | credits... |`.
pub fn extract(html: &Html, _rules: &Rules) -> Vec<Session> {
    html.select(&SEL_DATED)
        .filter(|c| is_date_cell(*c))
        .enumerate()
        .filter_map(|(idx, cell)| {
            let session = parse_cell(cell);
            if session.is_none() {
                tracing::debug!(target: "date-cell", "cell #{idx} skipped");
            }
            session
        })
        .collect()
}

fn parse_cell(cell: ElementRef) -> Option<Session> {
    let row = cell
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "tr")?;
    let cells: Vec<ElementRef> = row
        .child_elements()
        .filter(|c| c.value().name() == "td")
        .collect();
    if cells.len() < 3 {
        return None;
    }

    let date = slash_date(cell.attr("data-value")?);

    let lines = text_lines(cell);
    let (first, rest) = lines.split_first()?;
    let (time, mut location) = parse_time_location(first);
    let more = clean_text(&rest.join(" "));
    if !more.is_empty() {
        location = if location.is_empty() { more } else { format!("{location}, {more}") };
    }

    let title = cell
        .prev_siblings()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "td")
        .map(flat_text)
        .unwrap_or_default();
    if title.is_empty() {
        return None;
    }

    let description = cell
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "td")
        .map(|d| {
            let text = flat_text(d);
            match text.strip_prefix("Summary:") {
                Some(body) => body.trim().to_owned(),
                None => text,
            }
        });

    let mut speakers = Vec::new();
    let mut tracks = Vec::new();
    for c in &cells {
        let text = marker_lines(&joined_text(*c));
        if !MARKERS.iter().any(|m| text.contains(m)) {
            continue;
        }
        speakers.extend(credits(&text));
        if let Some(track) = TRACK.captures(&text).map(|c| c[1].trim().to_owned()) {
            tracks = track
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_owned)
                .collect();
        }
    }

    Some(Session {
        date: none_if_empty(date),
        time,
        location: none_if_empty(location),
        tracks,
        speakers,
        description: description.and_then(none_if_empty),
        ..Session::new(title)
    })
}

fn starts_with_marker(line: &str) -> bool {
    MARKERS.iter().any(|m| line.starts_with(m))
}

/// Cleaned lines of a cell, with a bare `Speaker:` line joined to the value
/// on the line after it, so `<b>Speaker:</b> Jane Doe` reads as one line.
/// A marker followed by another marker stays empty.
fn marker_lines(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    for line in text.lines().map(clean_text).filter(|l| !l.is_empty()) {
        let bare_marker = lines.last().is_some_and(|last| MARKERS.contains(&last.as_str()));
        if bare_marker
            && !starts_with_marker(&line)
            && let Some(last) = lines.last_mut()
        {
            last.push(' ');
            last.push_str(&line);
        } else {
            lines.push(line);
        }
    }
    lines.join("\n")
}

/// `Speaker: Jane Doe, Senator, Ohio` -> structured credits, one per line.
pub fn credits(text: &str) -> Vec<SessionSpeaker> {
    CREDIT
        .captures_iter(text)
        .filter(|c| !starts_with_marker(c[1].trim()))
        .filter_map(|c| {
            let (name, title, organization) = split_credit(c[1].trim());
            (!name.is_empty()).then_some(SessionSpeaker::Person {
                name,
                title,
                organization,
            })
        })
        .collect()
}

/// `"Mon, Aug. 4 | 9:00 am - 10:00 am Room 210"` -> time and trailing location.
pub fn parse_time_location(text: &str) -> (Option<String>, String) {
    let rest = text.split_once('|').map_or(text, |(_, r)| r).trim();
    if let Some(c) = TIME_RANGE.captures(rest) {
        (Some(c[1].trim().to_owned()), c[2].trim().to_owned())
    } else if TIME_START.is_match(rest) {
        (Some(rest.to_owned()), String::new())
    } else {
        (None, rest.to_owned())
    }
}
