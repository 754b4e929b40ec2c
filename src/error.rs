use std::{io, path::PathBuf};

use reqwest::StatusCode;

/// Failure of a whole extraction run. The dataset on disk is left untouched.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("[Page #{page}] fetching {url} failed: {source}")]
    Fetch {
        url: String,
        page: u32,
        #[source]
        source: reqwest::Error,
    },
    #[error("[Page #{page}] {url} answered {status}")]
    Status {
        url: String,
        page: u32,
        status: StatusCode,
    },
    #[error("reading saved page {path:?} failed: {source}")]
    Html {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("writing {path:?} failed: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("encoding dataset failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure to bring a dataset into the query service.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("dataset {0:?} not found, run the extractor first")]
    Missing(PathBuf),
    #[error("reading {path:?} failed: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("decoding {path:?} failed: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
