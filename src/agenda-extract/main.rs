use core::time::Duration;
use std::path::PathBuf;

use agenda::{
    crawl::{self, Context},
    extract::{Dedup, Rules},
    model::EventInfo,
};

const DEFAULT_URL: &str = "https://www.ncsl.org/events/2025-ncsl-legislative-summit/agenda";

#[derive(clap::Parser)]
#[command(about = "Scrape a conference agenda into a JSON dataset")]
struct Args {
    /// Agenda page; `?page=N` is appended per page.
    #[arg(long, env = "AGENDA_URL", default_value = DEFAULT_URL)]
    url: String,
    /// Hard cap on pages fetched.
    #[arg(long, default_value_t = 10)]
    max_pages: u32,
    /// Stop after this many pages in a row add no new session.
    #[arg(long, default_value_t = 3)]
    empty_streak: u32,
    #[arg(long, default_value_t = 1000)]
    delay_ms: u64,
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
    /// Files to write; every one gets the same dataset.
    #[arg(short, long = "output", value_name = "file", default_value = "ncsl_sessions.json")]
    outputs: Vec<PathBuf>,
    #[arg(long, value_enum, default_value_t = Dedup::Fingerprint)]
    dedup: Dedup,
    /// Year for dates printed without one.
    #[arg(long, default_value_t = 2025)]
    year: i32,
    /// Substrings marking a line as a venue.
    #[arg(long = "venue", default_values = ["BCEC", "Westin", "Omni"])]
    venues: Vec<String>,
    /// Parse saved HTML files instead of fetching.
    #[arg(long = "html", value_name = "file")]
    html: Vec<PathBuf>,

    #[arg(long, default_value = "NCSL 2025 Legislative Summit")]
    event_name: String,
    #[arg(long, default_value = "Boston, MA")]
    event_location: String,
    #[arg(long, default_value = "August 2-6, 2025")]
    event_dates: String,
    #[arg(long, default_value = "Boston Convention and Exhibition Center (BCEC)")]
    event_venue: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use clap::Parser;

    pretty_env_logger::init_timed();

    let args = Args::parse();

    let ctx = Context {
        client: agenda::scrape::basic(Duration::from_secs(args.timeout_secs))?,
        url: args.url,
        rules: Rules {
            year: args.year,
            venues: args.venues,
        },
        dedup: args.dedup,
        max_pages: args.max_pages,
        empty_streak: args.empty_streak,
        delay: Duration::from_millis(args.delay_ms),
        event: Some(EventInfo {
            name: args.event_name,
            year: args.year.to_string(),
            location: args.event_location,
            dates: args.event_dates,
            venue: args.event_venue,
        }),
    };

    let result = if args.html.is_empty() {
        crawl::crawl(&ctx).await
    } else {
        crawl::from_files(&args.html, &ctx)
    };
    let dataset = match result {
        Ok(d) => d,
        Err(e) => {
            tracing::error!(target: "main", "\x1b[31mextraction aborted: {e}\x1b[0m");
            return Err(e.into());
        }
    };

    for path in &args.outputs {
        agenda::store::save(&dataset, path)?;
    }

    for (i, session) in dataset.sessions.iter().take(5).enumerate() {
        tracing::info!(
            target: "main",
            "\x1b[36m{}. {} | {} {} | {}\x1b[0m",
            i + 1,
            session.title,
            session.date.as_deref().unwrap_or("-"),
            session.time.as_deref().unwrap_or("TBD"),
            session.location.as_deref().unwrap_or("-"),
        );
    }

    Ok(())
}
