//! Read-only views over a loaded [`Dataset`].

use std::{collections::BTreeSet, path::Path};

use serde::Serialize;

use crate::{
    error::LoadError,
    model::{Dataset, Session, Speaker},
    store,
};

#[derive(Debug, Default)]
pub struct Catalog {
    dataset: Dataset,
    tracks: BTreeSet<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total_sessions: usize,
    pub total_speakers: usize,
    pub total_tracks: usize,
    pub tracks: Vec<String>,
    pub session_types: Vec<String>,
}

impl Catalog {
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let dataset = store::load(path)?;
        let catalog = Self::new(dataset);
        tracing::info!(
            target: "catalog",
            "loaded {} sessions, {} speakers from {}",
            catalog.dataset.sessions.len(),
            catalog.dataset.speakers.len(),
            path.display(),
        );
        Ok(catalog)
    }

    pub fn new(mut dataset: Dataset) -> Self {
        let before = dataset.sessions.len();
        dataset.sessions.retain(|s| !s.title.trim().is_empty());
        if dataset.sessions.len() != before {
            tracing::warn!(target: "catalog", "dropped {} untitled sessions", before - dataset.sessions.len());
        }

        let tracks = dataset
            .sessions
            .iter()
            .flat_map(|s| s.tracks.iter().cloned())
            .collect();
        Self { dataset, tracks }
    }

    /// Catalog answering every query with nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn sessions(&self) -> &[Session] {
        &self.dataset.sessions
    }

    pub fn speakers(&self) -> &[Speaker] {
        &self.dataset.speakers
    }

    pub const fn tracks(&self) -> &BTreeSet<String> {
        &self.tracks
    }

    pub const fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Sessions passing every non-empty filter, in file order.
    ///
    /// `query` is a case-insensitive substring of the title, description or a
    /// speaker; `track` and `speaker` must match exactly.
    pub fn search(&self, query: &str, track: &str, speaker: &str) -> Vec<&Session> {
        let query = query.to_lowercase();
        self.dataset
            .sessions
            .iter()
            .filter(|s| query.is_empty() || mentions(s, &query))
            .filter(|s| track.is_empty() || s.has_track(track))
            .filter(|s| speaker.is_empty() || s.has_speaker(speaker))
            .collect()
    }

    pub fn sessions_by_speaker(&self, name: &str) -> Vec<&Session> {
        self.dataset
            .sessions
            .iter()
            .filter(|s| s.has_speaker(name))
            .collect()
    }

    pub fn stats(&self) -> Stats {
        let session_types: BTreeSet<&str> = self.dataset.sessions.iter().map(Session::session_type).collect();
        Stats {
            total_sessions: self.dataset.sessions.len(),
            total_speakers: self.dataset.speakers.len(),
            total_tracks: self.tracks.len(),
            tracks: self.tracks.iter().cloned().collect(),
            session_types: session_types.into_iter().map(str::to_owned).collect(),
        }
    }
}

fn mentions(session: &Session, lowered: &str) -> bool {
    let hit = |text: &str| text.to_lowercase().contains(lowered);
    hit(&session.title)
        || session.description.as_deref().is_some_and(hit)
        || session.speakers.iter().any(|sp| hit(sp.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SessionSpeaker;

    fn catalog() -> Catalog {
        let dataset: Dataset = serde_json::from_str(
            r#"{
              "sessions": [
                {"title": "AI Policy Forum", "speakers": ["Jane Doe"], "track": "Technology"},
                {"title": "Budget Roundtable", "speakers": [], "tracks": ["Fiscal", "Technology"],
                 "description": "State AI spending", "type": "Roundtable"},
                {"title": "Housing Lunch", "speakers": [{"name": "Jane Doe", "title": "Senator"}]},
                {"title": "", "speakers": ["Nobody"]}
              ],
              "speakers": ["Jane Doe"]
            }"#,
        )
        .unwrap();
        Catalog::new(dataset)
    }

    fn titles(sessions: &[&Session]) -> Vec<String> {
        sessions.iter().map(|s| s.title.clone()).collect()
    }

    #[test]
    fn empty_filters_return_everything_in_order() {
        let c = catalog();
        assert_eq!(
            titles(&c.search("", "", "")),
            ["AI Policy Forum", "Budget Roundtable", "Housing Lunch"]
        );
    }

    #[test]
    fn query_matches_title_description_and_speakers() {
        let c = catalog();
        assert_eq!(titles(&c.search("ai", "", "")), ["AI Policy Forum", "Budget Roundtable"]);
        assert_eq!(titles(&c.search("JANE", "", "")), ["AI Policy Forum", "Housing Lunch"]);
        assert!(c.search("zzz", "", "").is_empty());
    }

    #[test]
    fn track_matches_single_and_list_forms() {
        let c = catalog();
        assert_eq!(
            titles(&c.search("", "Technology", "")),
            ["AI Policy Forum", "Budget Roundtable"]
        );
        assert!(c.search("", "technology", "").is_empty());
    }

    #[test]
    fn speaker_filter_is_exact_and_filters_combine() {
        let c = catalog();
        assert_eq!(
            titles(&c.sessions_by_speaker("Jane Doe")),
            ["AI Policy Forum", "Housing Lunch"]
        );
        assert!(c.sessions_by_speaker("jane doe").is_empty());
        assert_eq!(titles(&c.search("policy", "Technology", "Jane Doe")), ["AI Policy Forum"]);
        assert!(c.search("budget", "", "Jane Doe").is_empty());
    }

    #[test]
    fn stats_count_types_and_tracks() {
        let c = catalog();
        assert_eq!(
            c.stats(),
            Stats {
                total_sessions: 3,
                total_speakers: 1,
                total_tracks: 2,
                tracks: vec!["Fiscal".to_owned(), "Technology".to_owned()],
                session_types: vec!["Roundtable".to_owned(), "Session".to_owned()],
            }
        );
    }

    #[test]
    fn empty_catalog_reports_zeroes() {
        let stats = Catalog::empty().stats();
        assert_eq!(stats, Stats::default());
        assert_eq!(
            serde_json::to_value(&stats).unwrap(),
            serde_json::json!({
                "total_sessions": 0, "total_speakers": 0, "total_tracks": 0,
                "tracks": [], "session_types": []
            })
        );
        assert!(Catalog::empty().search("", "", "").is_empty());
    }

    #[test]
    fn structured_speaker_names_are_searchable() {
        let mut s = Session::new("x");
        s.speakers.push(SessionSpeaker::Person {
            name: "Ann Lee".to_owned(),
            title: "Director".to_owned(),
            organization: String::new(),
        });
        let c = Catalog::new(Dataset {
            sessions: vec![s],
            ..Dataset::default()
        });
        assert_eq!(c.search("ann", "", "").len(), 1);
        assert_eq!(c.search("director", "", "").len(), 0);
    }
}
