//! Turns one agenda page into session records.
//!
//! Each strategy in [`STRATEGIES`] reads the page on its own and returns what
//! it recognises; [`extract_document`] runs them all and concatenates the
//! results. Cross-page duplicate suppression lives in [`Seen`], and the
//! speaker/track roll-up in [`Harvest`].

pub mod class_name;
pub mod date_cell;
pub mod json_ld;
pub mod table_row;

use std::{
    collections::{BTreeMap, BTreeSet},
    hash::{BuildHasher, BuildHasherDefault, DefaultHasher},
    sync::LazyLock,
};

use chrono::NaiveDate;
use hashbrown::HashSet;
use regex::Regex;
use scraper::Html;
use serde::{Deserialize, Serialize};

use crate::model::{Session, Speaker};

pub type Strategy = fn(&Html, &Rules) -> Vec<Session>;

#[rustfmt::skip]
pub const STRATEGIES: [(&str, Strategy); 4] = [
    ("table-row", table_row::extract),
    ("class-name", class_name::extract),
    ("json-ld", json_ld::extract),
    ("date-cell", date_cell::extract),
];

/// Page-independent knobs shared by the strategies.
#[derive(Clone, Debug)]
pub struct Rules {
    /// Year assumed for dates written as `Saturday, Aug. 2`.
    pub year: i32,
    /// Substrings that mark a line as a venue even without `Location:`.
    pub venues: Vec<String>,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            year: 2025,
            venues: ["BCEC", "Westin", "Omni"].map(str::to_owned).to_vec(),
        }
    }
}

/// Runs every strategy over `html` and keeps the sessions with real titles,
/// each classified.
pub fn extract_document(html: &str, rules: &Rules) -> Vec<Session> {
    let document = Html::parse_document(html);
    let mut sessions = Vec::new();
    for (name, strategy) in STRATEGIES {
        let found = strategy(&document, rules);
        tracing::debug!(target: "extract", "{name}: {} candidates", found.len());
        sessions.extend(found);
    }

    sessions.retain(Session::has_real_title);
    for session in &mut sessions {
        if session.session_type.is_none() {
            session.session_type = Some(classify(&session.title).to_owned());
        }
    }
    sessions
}

#[rustfmt::skip]
const SESSION_TYPES: [(&str, &str); 20] = [
    ("general session", "General Session"),
    ("opening session", "General Session"),
    ("closing session", "General Session"),
    ("breakfast", "Breakfast Session"),
    ("lunch", "Lunch Session"),
    ("reception", "Reception"),
    ("committee meeting", "Committee Meeting"),
    ("business meeting", "Business Meeting"),
    ("task force", "Task Force Meeting"),
    ("caucus", "Caucus Meeting"),
    ("registration", "Registration"),
    ("exhibit hall", "Exhibit Hall Event"),
    ("learning hub", "Learning Hub Session"),
    ("workshop", "Workshop"),
    ("roundtable", "Roundtable"),
    ("professional development", "Professional Development"),
    ("training", "Training"),
    ("forum", "Forum"),
    ("panel", "Panel Discussion"),
    ("plenary", "Plenary Session"),
];

/// First keyword found in the lower-cased title decides the label.
pub fn classify(title: &str) -> &'static str {
    let title = title.to_lowercase();
    SESSION_TYPES
        .iter()
        .find(|(key, _)| title.contains(key))
        .map_or(crate::model::DEFAULT_SESSION_TYPE, |&(_, label)| label)
}

static AGENDA_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[A-Za-z]+,\s*)?([A-Za-z]{3})[A-Za-z]*\.?\s+(\d{1,2})$").unwrap()
});

/// `"Saturday, Aug. 2"` -> `"2025-08-02"`; anything else comes back unchanged.
pub fn agenda_date(text: &str, year: i32) -> String {
    let text = text.trim();
    let parsed = AGENDA_DAY.captures(text).and_then(|c| {
        let month = match c[1].to_ascii_lowercase().as_str() {
            "jan" => 1,
            "feb" => 2,
            "mar" => 3,
            "apr" => 4,
            "may" => 5,
            "jun" => 6,
            "jul" => 7,
            "aug" => 8,
            "sep" => 9,
            "oct" => 10,
            "nov" => 11,
            "dec" => 12,
            _ => return None,
        };
        NaiveDate::from_ymd_opt(year, month, c[2].parse().ok()?)
    });
    parsed.map_or_else(|| text.to_owned(), |d| d.format("%Y-%m-%d").to_string())
}

/// `"08/04/2025"` -> `"2025-08-04"`; unparseable values are kept as they are.
pub fn slash_date(value: &str) -> String {
    NaiveDate::parse_from_str(value.trim(), "%m/%d/%Y")
        .map_or_else(|_| value.to_owned(), |d| d.format("%Y-%m-%d").to_string())
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Dedup {
    /// Hash of title, date, time and location.
    #[default]
    Fingerprint,
    /// Equal `(title, time)` pairs.
    TitleTime,
}

pub fn fingerprint(session: &Session) -> u64 {
    let key = [
        session.title.as_str(),
        session.date.as_deref().unwrap_or_default(),
        session.time.as_deref().unwrap_or_default(),
        session.location.as_deref().unwrap_or_default(),
    ]
    .concat();
    BuildHasherDefault::<DefaultHasher>::default().hash_one(key)
}

/// Sessions already accepted during one run.
#[derive(Debug)]
pub struct Seen {
    mode: Dedup,
    fingerprints: HashSet<u64>,
    pairs: HashSet<(String, String)>,
}

impl Seen {
    pub fn new(mode: Dedup) -> Self {
        Self {
            mode,
            fingerprints: HashSet::new(),
            pairs: HashSet::new(),
        }
    }

    /// Returns `true` the first time a session is offered.
    pub fn insert(&mut self, session: &Session) -> bool {
        match self.mode {
            Dedup::Fingerprint => self.fingerprints.insert(fingerprint(session)),
            Dedup::TitleTime => self.pairs.insert((
                session.title.clone(),
                session.time.clone().unwrap_or_default(),
            )),
        }
    }

    /// Moves the unseen sessions of `batch` into `out`, returning how many.
    pub fn admit(&mut self, batch: Vec<Session>, out: &mut Vec<Session>) -> usize {
        let before = out.len();
        out.extend(batch.into_iter().filter(|s| self.insert(s)));
        out.len() - before
    }
}

const MAX_NAME_WORDS: usize = 5;

/// Speakers, tracks and counts gathered from the kept sessions.
#[derive(Debug, Default)]
pub struct Harvest {
    pub speakers: BTreeMap<String, Speaker>,
    pub tracks: BTreeSet<String>,
    pub by_date: BTreeMap<String, usize>,
    pub by_type: BTreeMap<String, usize>,
}

impl Harvest {
    pub fn from_sessions<'a>(sessions: impl IntoIterator<Item = &'a Session>) -> Self {
        let mut harvest = Self::default();
        for session in sessions {
            harvest.absorb(session);
        }
        harvest
    }

    pub fn absorb(&mut self, session: &Session) {
        for credit in &session.speakers {
            let (name, title, organization) = credit.parts();
            if name.is_empty() || name.split_whitespace().count() > MAX_NAME_WORDS {
                continue;
            }
            let speaker = self.speakers.entry(name.clone()).or_insert_with(|| Speaker {
                name,
                ..Speaker::default()
            });
            if speaker.title.is_empty() {
                speaker.title = title;
            }
            if speaker.organization.is_empty() {
                speaker.organization = organization;
            }
            if speaker.sessions.last() != Some(&session.title) {
                speaker.sessions.push(session.title.clone());
            }
        }

        self.tracks.extend(session.tracks.iter().cloned());
        if let Some(date) = &session.date {
            *self.by_date.entry(date.clone()).or_default() += 1;
        }
        *self.by_type.entry(session.session_type().to_owned()).or_default() += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SessionSpeaker;

    #[test]
    fn classify_takes_first_keyword() {
        assert_eq!(classify("Legislators' BREAKFAST Briefing"), "Breakfast Session");
        assert_eq!(classify("Budget Roundtable"), "Roundtable");
        assert_eq!(classify("Opening General Session"), "General Session");
        assert_eq!(classify("Workshop Lunch"), "Lunch Session");
        assert_eq!(classify("Cybersecurity Deep Dive"), "Session");
    }

    #[test]
    fn dates_map_to_iso() {
        assert_eq!(agenda_date("Saturday, Aug. 2", 2025), "2025-08-02");
        assert_eq!(agenda_date("Wednesday, August 6", 2025), "2025-08-06");
        assert_eq!(agenda_date("Sept. 31", 2025), "Sept. 31");
        assert_eq!(agenda_date("TBD", 2025), "TBD");
        assert_eq!(slash_date("08/04/2025"), "2025-08-04");
        assert_eq!(slash_date("13/04/2025"), "13/04/2025");
    }

    fn session(title: &str, time: &str, location: &str) -> Session {
        Session {
            time: Some(time.to_owned()),
            location: Some(location.to_owned()),
            ..Session::new(title)
        }
    }

    #[test]
    fn fingerprint_dedup_keeps_first() {
        let mut seen = Seen::new(Dedup::Fingerprint);
        let mut out = Vec::new();
        let batch = vec![
            session("A", "9:00 am", "Hall A"),
            session("A", "9:00 am", "Hall A"),
            session("A", "9:00 am", "Hall B"),
        ];
        assert_eq!(seen.admit(batch, &mut out), 2);
        assert_eq!(seen.admit(vec![session("A", "9:00 am", "Hall B")], &mut out), 0);
        assert_eq!(out[1].location.as_deref(), Some("Hall B"));
    }

    #[test]
    fn title_time_dedup_ignores_location() {
        let mut seen = Seen::new(Dedup::TitleTime);
        let mut out = Vec::new();
        let batch = vec![session("A", "9:00 am", "Hall A"), session("A", "9:00 am", "Hall B")];
        assert_eq!(seen.admit(batch, &mut out), 1);
    }

    #[test]
    fn harvest_merges_speakers_by_name() {
        let mut a = Session::new("Opening General Session");
        a.speakers = vec![SessionSpeaker::Line("Jane Doe, Senator, Ohio".to_owned())];
        a.tracks = vec!["Technology".to_owned()];
        a.date = Some("2025-08-04".to_owned());
        let mut b = Session::new("AI Policy Forum");
        b.speakers = vec![
            SessionSpeaker::Person {
                name: "Jane Doe".to_owned(),
                title: String::new(),
                organization: String::new(),
            },
            SessionSpeaker::Line("This Session Will Explore Many Things Today".to_owned()),
        ];

        let harvest = Harvest::from_sessions([&a, &b]);
        assert_eq!(harvest.speakers.len(), 1);
        let jane = &harvest.speakers["Jane Doe"];
        assert_eq!(jane.title, "Senator");
        assert_eq!(jane.organization, "Ohio");
        assert_eq!(jane.sessions, ["Opening General Session", "AI Policy Forum"]);
        assert_eq!(harvest.tracks.iter().collect::<Vec<_>>(), ["Technology"]);
        assert_eq!(harvest.by_date["2025-08-04"], 1);
        assert_eq!(harvest.by_type["Session"], 2);
    }
}
