use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::{Rules, agenda_date, date_cell::is_date_cell};
use crate::{
    model::{Session, SessionSpeaker},
    util::{clean_text, joined_text, none_if_empty, sel, text_lines},
};

static SEL_TR: LazyLock<Selector> = LazyLock::new(|| sel("tr"));

const HEADER_TOKENS: [&str; 4] = ["time", "date", "time/room", ""];

const MAX_SPEAKER_LEN: usize = 200;

const SPEAKER_BLACKLIST: [&str; 5] = ["location:", "track:", "summary:", "description:", "note:"];

/// Verbs of promotional copy, matched as whole words with simple inflections.
const BLACKLIST_VERBS: [&str; 4] = ["sponsor", "join", "learn", "explore"];
const VERB_SUFFIXES: [&str; 5] = ["", "s", "d", "ed", "ing"];

const HONORIFICS: [&str; 6] = ["senator", "representative", "speaker", "president", "director", "chair"];

/// Rows shaped `| when | title, speakers, location... |`.
pub fn extract(html: &Html, rules: &Rules) -> Vec<Session> {
    html.select(&SEL_TR)
        .enumerate()
        .filter_map(|(idx, row)| parse_row(idx, row, rules))
        .collect()
}

fn parse_row(idx: usize, row: ElementRef, rules: &Rules) -> Option<Session> {
    let cells: Vec<ElementRef> = row
        .child_elements()
        .filter(|c| matches!(c.value().name(), "td" | "th"))
        .collect();
    if cells.len() < 2 || cells.iter().copied().any(is_date_cell) {
        return None;
    }

    let token = clean_text(&joined_text(cells[0]));
    if HEADER_TOKENS.contains(&token.to_lowercase().as_str()) {
        return None;
    }

    let lines = text_lines(cells[1]);
    let Some(title) = lines.first() else {
        tracing::debug!(target: "table-row", "row #{idx}: empty content cell");
        return None;
    };

    let mut session = Session::new(title.clone());
    if let Some((date, time)) = token.split_once('|') {
        session.date = none_if_empty(agenda_date(date, rules.year));
        session.time = none_if_empty(time.trim().to_owned());
    } else {
        session.time = Some(token);
    }

    session.location = lines.iter().enumerate().find_map(|(i, line)| {
        if line.contains("Location:") {
            none_if_empty(line.replace("Location:", "").trim().to_owned())
        } else if i > 0 && is_venue(line, rules) {
            Some(line.clone())
        } else {
            None
        }
    });

    if let Some(track) = lines
        .iter()
        .find(|l| l.contains("Track:"))
        .and_then(|l| none_if_empty(l.replace("Track:", "").trim().to_owned()))
    {
        session.tracks.push(track);
    }

    session.speakers = lines[1..]
        .iter()
        .take_while(|l| !(l.contains("Location:") || l.contains("Track:") || is_venue(l, rules)))
        .filter(|l| looks_like_speaker(l))
        .map(|l| SessionSpeaker::Line(l.clone()))
        .collect();

    Some(session)
}

fn is_venue(line: &str, rules: &Rules) -> bool {
    rules.venues.iter().any(|v| line.contains(v.as_str()))
}

/// `Jane Doe, Senator, Ohio` or a short capitalised phrase. Plenty of
/// capitalised non-names slip through; that is accepted.
pub fn looks_like_speaker(line: &str) -> bool {
    let lower = line.to_lowercase();
    let words = line.split_whitespace().count();
    let shaped = line.contains(',')
        || ((2..=5).contains(&words) && line.starts_with(char::is_uppercase))
        || HONORIFICS.iter().any(|h| lower.contains(h));

    shaped
        && line.chars().count() < MAX_SPEAKER_LEN
        && !SPEAKER_BLACKLIST.iter().any(|k| lower.contains(k))
        && !lower
            .split(|c: char| !c.is_alphanumeric())
            .any(is_blacklisted_verb)
}

fn is_blacklisted_verb(word: &str) -> bool {
    BLACKLIST_VERBS
        .iter()
        .any(|v| word.strip_prefix(v).is_some_and(|rest| VERB_SUFFIXES.contains(&rest)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body><table>
        <tr><th>Time/Room</th><th>Session</th></tr>
        <tr>
          <td>Monday, Aug. 4 | 9:00 am - 10:15 am</td>
          <td><strong>Opening General Session</strong><br>
              Jane Doe, Senator, Ohio<br>
              Maria Lopez<br>
              Join us to explore the future of federalism.<br>
              Location: BCEC, Ballroom East<br>
              Track: Technology</td>
        </tr>
        <tr><td>12:00 pm</td><td>Legislators' Lunch<br>Westin Grand Ballroom</td></tr>
        <tr><td></td><td>orphan</td></tr>
        <tr><td>only one cell</td></tr>
    </table></body></html>"#;

    #[test]
    fn rows_become_sessions() {
        let html = Html::parse_document(PAGE);
        let sessions = extract(&html, &Rules::default());
        assert_eq!(sessions.len(), 2);

        let opening = &sessions[0];
        assert_eq!(opening.title, "Opening General Session");
        assert_eq!(opening.date.as_deref(), Some("2025-08-04"));
        assert_eq!(opening.time.as_deref(), Some("9:00 am - 10:15 am"));
        assert_eq!(opening.location.as_deref(), Some("BCEC, Ballroom East"));
        assert_eq!(opening.tracks, ["Technology"]);
        assert_eq!(
            opening.speakers,
            [
                SessionSpeaker::Line("Jane Doe, Senator, Ohio".to_owned()),
                SessionSpeaker::Line("Maria Lopez".to_owned()),
            ]
        );

        let lunch = &sessions[1];
        assert_eq!(lunch.time.as_deref(), Some("12:00 pm"));
        assert_eq!(lunch.date, None);
        assert_eq!(lunch.location.as_deref(), Some("Westin Grand Ballroom"));
        assert!(lunch.speakers.is_empty());
    }

    #[test]
    fn speaker_heuristic() {
        assert!(looks_like_speaker("Jane Doe, Senator, Ohio"));
        assert!(looks_like_speaker("Maria Lopez"));
        assert!(looks_like_speaker("Speaker of the House Tim Moore"));
        assert!(!looks_like_speaker("lowercase words only"));
        assert!(!looks_like_speaker("Summary: budgets, taxes"));
        assert!(!looks_like_speaker("Learn About Budgets"));
        assert!(!looks_like_speaker("Join Us, Everyone"));
        assert!(!looks_like_speaker("Sponsored By Acme"));
        assert!(looks_like_speaker("Joint Committee Chair"));
        assert!(looks_like_speaker("Pat Joiner, Delegate, Maryland"));
        assert!(!looks_like_speaker(&format!("A, {}", "x".repeat(250))));
    }
}
