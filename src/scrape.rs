use core::time::Duration;

use reqwest::{
    Client,
    header::{ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, HeaderMap, HeaderValue},
};

use crate::error::ExtractError;

pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// A client that looks like a desktop browser.
pub fn basic(timeout: Duration) -> reqwest::Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

    Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .timeout(timeout)
        .build()
}

/// GETs one agenda page (`?page=N`) and returns its body.
pub async fn fetch_page(client: &Client, url: &str, page: u32) -> Result<String, ExtractError> {
    let fetch_err = |source| ExtractError::Fetch {
        url: url.to_owned(),
        page,
        source,
    };

    tracing::info!(target: "fetch", "[Page #{page}] GET {url}");
    let res = client
        .get(url)
        .query(&[("page", page)])
        .send()
        .await
        .map_err(fetch_err)?;

    let status = res.status();
    if !status.is_success() {
        return Err(ExtractError::Status {
            url: url.to_owned(),
            page,
            status,
        });
    }

    let body = res.text().await.map_err(fetch_err)?;
    tracing::info!(target: "fetch", "[Page #{page}] {} bytes", body.len());
    Ok(body)
}
