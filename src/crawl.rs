//! One extraction run: page through the agenda and build a [`Dataset`].

use core::time::Duration;
use std::path::PathBuf;

use reqwest::Client;

use crate::{
    error::ExtractError,
    extract::{Dedup, Harvest, Rules, Seen, extract_document},
    model::{Dataset, EventInfo, Metadata, Session},
    scrape::fetch_page,
};

pub struct Context {
    pub client: Client,
    pub url: String,
    pub rules: Rules,
    pub dedup: Dedup,
    pub max_pages: u32,
    /// Consecutive pages without anything new before giving up.
    pub empty_streak: u32,
    pub delay: Duration,
    pub event: Option<EventInfo>,
}

/// Decides when paging stops.
#[derive(Debug)]
pub struct Pager {
    max_pages: u32,
    empty_streak: u32,
    page: u32,
    dry: u32,
}

impl Pager {
    pub const fn new(max_pages: u32, empty_streak: u32) -> Self {
        Self {
            max_pages,
            empty_streak,
            page: 0,
            dry: 0,
        }
    }

    /// The next page number to fetch, or `None` once the run is over.
    pub fn next_page(&mut self) -> Option<u32> {
        if self.page >= self.max_pages || self.dry >= self.empty_streak {
            return None;
        }
        self.page += 1;
        Some(self.page)
    }

    /// Records how many new unique sessions the last page gave.
    pub fn record(&mut self, fresh: usize) {
        if fresh == 0 {
            self.dry += 1;
        } else {
            self.dry = 0;
        }
    }

    pub const fn pages(&self) -> u32 {
        self.page
    }
}

pub async fn crawl(ctx: &Context) -> Result<Dataset, ExtractError> {
    let mut seen = Seen::new(ctx.dedup);
    let mut sessions = Vec::new();
    let mut pager = Pager::new(ctx.max_pages, ctx.empty_streak);

    while let Some(page) = pager.next_page() {
        if page > 1 {
            tokio::time::sleep(ctx.delay).await;
        }
        let html = fetch_page(&ctx.client, &ctx.url, page).await?;
        let found = extract_document(&html, &ctx.rules);
        let total = found.len();
        let fresh = seen.admit(found, &mut sessions);
        pager.record(fresh);
        tracing::info!(target: "crawl", "[Page #{page}] {total} found, {fresh} new");
    }

    Ok(build_dataset(sessions, ctx, pager.pages()))
}

/// Parses saved pages instead of fetching them.
pub fn from_files(files: &[PathBuf], ctx: &Context) -> Result<Dataset, ExtractError> {
    let mut seen = Seen::new(ctx.dedup);
    let mut sessions = Vec::new();
    for path in files {
        let html = std::fs::read_to_string(path).map_err(|source| ExtractError::Html {
            path: path.clone(),
            source,
        })?;
        let fresh = seen.admit(extract_document(&html, &ctx.rules), &mut sessions);
        tracing::info!(target: "crawl", "{}: {fresh} new", path.display());
    }
    Ok(build_dataset(sessions, ctx, files.len() as u32))
}

pub fn build_dataset(sessions: Vec<Session>, ctx: &Context, pages: u32) -> Dataset {
    let harvest = Harvest::from_sessions(&sessions);
    let speakers: Vec<_> = harvest.speakers.into_values().collect();
    let tracks: Vec<_> = harvest.tracks.into_iter().collect();

    tracing::info!(
        target: "crawl",
        "{} sessions, {} speakers, {} tracks over {pages} pages",
        sessions.len(),
        speakers.len(),
        tracks.len(),
    );

    Dataset {
        event: ctx.event.clone(),
        metadata: Some(Metadata {
            extracted_at: chrono::Local::now().to_rfc3339(),
            source_url: ctx.url.clone(),
            total_sessions: sessions.len(),
            total_unique_speakers: speakers.len(),
            total_tracks: tracks.len(),
            sessions_by_date: harvest.by_date,
            sessions_by_type: harvest.by_type,
            pages_scraped: pages,
            dedup: ctx.dedup,
        }),
        sessions,
        speakers,
        tracks,
    }
}
