use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("The selector you are trying to scrape for is missing. Selector: {0}")]
    ParseMissingSelector(String),
    #[error("Invalid link pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("No table matched {0} on the page.")]
    TableNotFound(String),
    #[error("{count} tables matched {matcher}, expected exactly one.")]
    AmbiguousTable { matcher: String, count: usize },
    #[error("The selected table has no rows.")]
    EmptyTable,
    #[error("Row {row} has {found} cells but the header has {expected} columns.")]
    RowShape {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Marker `{marker}` is missing from `{url}`.")]
    MissingMarker { marker: &'static str, url: String },
    #[error("Category key `{0}` was produced by more than one page.")]
    DuplicateKey(String),

    #[error("Directory `{}` has no ancestor {levels} level(s) up.", .cwd.display())]
    NoAncestor { cwd: PathBuf, levels: usize },

    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Couldn't move the finished file into place: {0}")]
    Persist(#[from] tempfile::PersistError),
    #[error("Csv Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Tokio Join Error, couldn't await a task! {0}")]
    RuntimeJoin(#[from] tokio::task::JoinError),

    #[error("Reqwest Error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("GET {url} returned status {status}.")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },
}
