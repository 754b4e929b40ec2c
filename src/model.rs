//! Records exchanged between the extractor and the query service.
//!
//! Writers always emit the canonical keys (`tracks`, `session_type`, structured
//! speakers). Readers also accept the older shapes: a single `track` string, a
//! `type` key, and bare speaker names.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::extract::Dedup;

/// Titles that are table headers rather than sessions.
pub const PLACEHOLDER_TITLES: [&str; 3] = ["time", "time/room", "date"];

pub const DEFAULT_SESSION_TYPE: &str = "Session";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SessionRecord")]
pub struct Session {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tracks: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub speakers: Vec<SessionSpeaker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_type: Option<String>,
}

/// Every shape a session has been written in.
#[derive(Deserialize)]
struct SessionRecord {
    #[serde(default)]
    title: String,
    date: Option<String>,
    time: Option<String>,
    location: Option<String>,
    track: Option<String>,
    #[serde(default)]
    tracks: Vec<String>,
    #[serde(default)]
    speakers: Vec<SessionSpeaker>,
    description: Option<String>,
    session_type: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

impl From<SessionRecord> for Session {
    fn from(r: SessionRecord) -> Self {
        let mut tracks = r.tracks;
        if let Some(track) = r.track.filter(|t| !t.is_empty())
            && !tracks.contains(&track)
        {
            tracks.insert(0, track);
        }
        Self {
            title: r.title,
            date: r.date.filter(|s| !s.is_empty()),
            time: r.time.filter(|s| !s.is_empty()),
            location: r.location.filter(|s| !s.is_empty()),
            tracks,
            speakers: r.speakers,
            description: r.description.filter(|s| !s.is_empty()),
            session_type: r.session_type.or(r.kind),
        }
    }
}

impl Session {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// A record is worth keeping only if its title is a real title.
    pub fn has_real_title(&self) -> bool {
        let title = self.title.trim();
        !title.is_empty()
            && !PLACEHOLDER_TITLES
                .iter()
                .any(|p| title.eq_ignore_ascii_case(p))
    }

    pub fn session_type(&self) -> &str {
        self.session_type.as_deref().unwrap_or(DEFAULT_SESSION_TYPE)
    }

    pub fn has_track(&self, track: &str) -> bool {
        self.tracks.iter().any(|t| t == track)
    }

    pub fn has_speaker(&self, speaker: &str) -> bool {
        self.speakers.iter().any(|s| s.as_str() == speaker)
    }
}

/// A speaker as listed on one session: either the raw agenda line or a
/// parsed `name, title, organization` triple.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SessionSpeaker {
    Line(String),
    Person {
        name: String,
        #[serde(default)]
        title: String,
        #[serde(default)]
        organization: String,
    },
}

impl SessionSpeaker {
    /// The string matched by speaker filters.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Line(line) => line,
            Self::Person { name, .. } => name,
        }
    }

    /// Splits into `(name, title, organization)`; a free-text line is split on
    /// commas with everything after the second segment kept as organization.
    pub fn parts(&self) -> (String, String, String) {
        match self {
            Self::Line(line) => split_credit(line),
            Self::Person {
                name,
                title,
                organization,
            } => (name.clone(), title.clone(), organization.clone()),
        }
    }
}

/// `"Jane Doe, Senator, Ohio, USA"` -> `("Jane Doe", "Senator", "Ohio, USA")`.
pub fn split_credit(text: &str) -> (String, String, String) {
    let parts: Vec<&str> = text.split(',').map(str::trim).collect();
    let name = parts.first().copied().unwrap_or_default().to_owned();
    let title = parts.get(1).copied().unwrap_or_default().to_owned();
    let organization = parts.get(2..).map(|rest| rest.join(", ")).unwrap_or_default();
    (name, title, organization)
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SpeakerEntry")]
pub struct Speaker {
    pub name: String,
    pub title: String,
    pub organization: String,
    pub sessions: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SpeakerEntry {
    Name(String),
    Record {
        name: String,
        #[serde(default)]
        title: String,
        #[serde(default)]
        organization: String,
        #[serde(default)]
        sessions: Vec<String>,
    },
}

impl From<SpeakerEntry> for Speaker {
    fn from(entry: SpeakerEntry) -> Self {
        match entry {
            SpeakerEntry::Name(name) => Self {
                name,
                ..Self::default()
            },
            SpeakerEntry::Record {
                name,
                title,
                organization,
                sessions,
            } => Self {
                name,
                title,
                organization,
                sessions,
            },
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventInfo {
    pub name: String,
    pub year: String,
    pub location: String,
    pub dates: String,
    pub venue: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub extracted_at: String,
    pub source_url: String,
    pub total_sessions: usize,
    pub total_unique_speakers: usize,
    pub total_tracks: usize,
    pub sessions_by_date: BTreeMap<String, usize>,
    pub sessions_by_type: BTreeMap<String, usize>,
    pub pages_scraped: u32,
    pub dedup: Dedup,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<EventInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(default)]
    pub sessions: Vec<Session>,
    #[serde(default)]
    pub speakers: Vec<Speaker>,
    #[serde(default)]
    pub tracks: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_track_and_type_keys_are_folded() {
        let s: Session = serde_json::from_str(
            r#"{"title":"Budget Roundtable","track":"Fiscal","type":"Roundtable"}"#,
        )
        .unwrap();
        assert_eq!(s.tracks, ["Fiscal"]);
        assert_eq!(s.session_type(), "Roundtable");

        let out = serde_json::to_value(&s).unwrap();
        assert_eq!(out["tracks"], serde_json::json!(["Fiscal"]));
        assert_eq!(out["session_type"], "Roundtable");
        assert!(out.get("track").is_none());
        assert!(out.get("type").is_none());
    }

    #[test]
    fn speakers_accept_both_shapes() {
        let s: Session = serde_json::from_str(
            r#"{"title":"x","speakers":["Jane Doe, Senator, Ohio",{"name":"John Roe","title":"Chair"}]}"#,
        )
        .unwrap();
        assert_eq!(s.speakers[0].as_str(), "Jane Doe, Senator, Ohio");
        assert_eq!(s.speakers[1].as_str(), "John Roe");
        assert!(s.has_speaker("John Roe"));
        assert!(!s.has_speaker("Jane Doe"));

        let dataset: Dataset =
            serde_json::from_str(r#"{"sessions":[],"speakers":["Ann Lee",{"name":"Bo Kim","sessions":["x"]}]}"#)
                .unwrap();
        assert_eq!(dataset.speakers[0].name, "Ann Lee");
        assert_eq!(dataset.speakers[1].sessions, ["x"]);
    }

    #[test]
    fn credit_lines_split_into_three_parts() {
        assert_eq!(
            split_credit("Jane Doe, Director, Office of Policy, State of Ohio"),
            (
                "Jane Doe".to_owned(),
                "Director".to_owned(),
                "Office of Policy, State of Ohio".to_owned()
            )
        );
        assert_eq!(
            split_credit("Jane Doe"),
            ("Jane Doe".to_owned(), String::new(), String::new())
        );
    }

    #[test]
    fn placeholder_titles_are_rejected() {
        assert!(!Session::new("Time/Room").has_real_title());
        assert!(!Session::new("  ").has_real_title());
        assert!(Session::new("Opening General Session").has_real_title());
    }
}
