use core::fmt::Write;

use agenda::model::Session;
use axum::{
    extract::{Query, State},
    response::Html,
};

use crate::service::{Filters, Shared};

const STYLE: &str = "body{font-family:sans-serif;max-width:60em;margin:auto;padding:1em}\
    .session{border-bottom:1px solid #ddd;padding:.5em 0}.meta{color:#555;font-size:.9em}";

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{t}</title><style>{STYLE}</style></head>\
         <body><nav><a href=\"/\">Overview</a> | <a href=\"/sessions\">Sessions</a> | <a href=\"/speakers\">Speakers</a></nav>\
         <h1>{t}</h1>{body}</body></html>",
        t = escape(title),
    ))
}

fn session_block(out: &mut String, s: &Session) {
    let when = [s.date.as_deref(), s.time.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");
    let _ = write!(
        out,
        "<div class=\"session\"><strong>{}</strong><div class=\"meta\">{} · {} · {}</div>",
        escape(&s.title),
        escape(&when),
        escape(s.location.as_deref().unwrap_or("")),
        escape(s.session_type()),
    );
    if !s.tracks.is_empty() {
        let _ = write!(out, "<div class=\"meta\">Track: {}</div>", escape(&s.tracks.join(", ")));
    }
    if !s.speakers.is_empty() {
        out.push_str("<ul>");
        for sp in &s.speakers {
            let _ = write!(out, "<li>{}</li>", escape(sp.as_str()));
        }
        out.push_str("</ul>");
    }
    if let Some(d) = &s.description {
        let _ = write!(out, "<p>{}</p>", escape(d));
    }
    out.push_str("</div>");
}

pub async fn index(State(catalog): State<Shared>) -> Html<String> {
    let stats = catalog.stats();
    let mut body = format!(
        "<p>{} sessions, {} speakers, {} tracks</p><form action=\"/sessions\"><input name=\"q\" placeholder=\"Search\"> <button>Go</button></form>",
        stats.total_sessions, stats.total_speakers, stats.total_tracks,
    );
    for s in catalog.sessions().iter().take(20) {
        session_block(&mut body, s);
    }
    let title = catalog
        .dataset()
        .event
        .as_ref()
        .map_or("Agenda", |e| e.name.as_str());
    layout(title, &body)
}

pub async fn sessions(State(catalog): State<Shared>, Query(f): Query<Filters>) -> Html<String> {
    let mut body = format!(
        "<form><input name=\"q\" value=\"{}\" placeholder=\"Search\"> <select name=\"track\"><option value=\"\">All tracks</option>",
        escape(&f.q),
    );
    for track in catalog.tracks() {
        let selected = if *track == f.track { " selected" } else { "" };
        let _ = write!(body, "<option{selected}>{}</option>", escape(track));
    }
    let _ = write!(
        body,
        "</select> <input name=\"speaker\" value=\"{}\" placeholder=\"Speaker\"> <button>Filter</button></form>",
        escape(&f.speaker),
    );

    let hits = catalog.search(&f.q, &f.track, &f.speaker);
    let _ = write!(body, "<p>{} sessions</p>", hits.len());
    for s in hits {
        session_block(&mut body, s);
    }
    layout("Sessions", &body)
}

pub async fn speakers(State(catalog): State<Shared>) -> Html<String> {
    let mut people: Vec<_> = catalog.speakers().iter().collect();
    people.sort_by(|a, b| a.name.cmp(&b.name));

    let mut body = String::from("<ul>");
    for p in people {
        let _ = write!(body, "<li><strong>{}</strong>", escape(&p.name));
        let role = [p.title.as_str(), p.organization.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        if !role.is_empty() {
            let _ = write!(body, ", {}", escape(&role));
        }
        if !p.sessions.is_empty() {
            let _ = write!(body, " <span class=\"meta\">({} sessions)</span>", p.sessions.len());
        }
        body.push_str("</li>");
    }
    body.push_str("</ul>");
    layout("Speakers", &body)
}
