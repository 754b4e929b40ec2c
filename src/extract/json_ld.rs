use std::sync::LazyLock;

use scraper::{Html, Selector};
use serde_json::Value;

use super::Rules;
use crate::{
    model::{Session, SessionSpeaker},
    util::{clean_text, none_if_empty, sel},
};

static SEL_LD: LazyLock<Selector> = LazyLock::new(|| sel(r#"script[type="application/ld+json"]"#));

/// schema.org `Event` objects embedded as JSON-LD.
pub fn extract(html: &Html, _rules: &Rules) -> Vec<Session> {
    let mut sessions = Vec::new();
    for (idx, script) in html.select(&SEL_LD).enumerate() {
        let raw = script.text().collect::<String>();
        match serde_json::from_str::<Value>(&raw) {
            Ok(value) => collect(&value, &mut sessions),
            Err(e) => tracing::warn!(target: "json-ld", "script #{idx} skipped: {e}"),
        }
    }
    sessions
}

fn collect(value: &Value, out: &mut Vec<Session>) {
    match value {
        Value::Array(items) => items.iter().for_each(|item| collect(item, out)),
        Value::Object(map) => {
            if is_event(value) {
                if let Some(session) = to_session(value) {
                    out.push(session);
                }
            }
            for nested in ["@graph", "subEvent"] {
                if let Some(inner) = map.get(nested) {
                    collect(inner, out);
                }
            }
        }
        _ => (),
    }
}

fn is_event(value: &Value) -> bool {
    let is_event_type = |t: &Value| t.as_str().is_some_and(|s| s.ends_with("Event"));
    match value.get("@type") {
        Some(Value::Array(types)) => types.iter().any(is_event_type),
        Some(t) => is_event_type(t),
        None => false,
    }
}

fn text(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(clean_text).and_then(none_if_empty)
}

fn to_session(event: &Value) -> Option<Session> {
    let title = text(event.get("name"))?;

    let location = match event.get("location") {
        Some(Value::String(s)) => none_if_empty(clean_text(s)),
        Some(place) => text(place.get("name")),
        None => None,
    };

    let performers: Vec<&Value> = match event.get("performer") {
        Some(Value::Array(list)) => list.iter().collect(),
        Some(one) => vec![one],
        None => Vec::new(),
    };
    let speakers = performers
        .into_iter()
        .filter_map(|p| match p {
            Value::String(s) => none_if_empty(clean_text(s)),
            _ => text(p.get("name")),
        })
        .map(|name| SessionSpeaker::Person {
            name,
            title: String::new(),
            organization: String::new(),
        })
        .collect();

    Some(Session {
        description: text(event.get("description")),
        time: text(event.get("startDate")),
        location,
        speakers,
        ..Session::new(title)
    })
}
