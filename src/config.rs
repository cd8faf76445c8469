//! Command line surface and the option structs each job is handed.
//!
//! Nothing here reads the environment; every location and trust decision
//! comes in through flags.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::parse::TableMatcher;
use crate::{DBDB_URL, SYNSYS_BASE_URL, SYNSYS_URL};

#[derive(Debug, Parser)]
#[command(name = "bioscrap", version, about)]
pub struct Cli {
    /// Directory the CSV files are written to. Defaults to the legacy
    /// `downloads` directory above the working directory.
    #[arg(long, global = true)]
    pub out_dir: Option<PathBuf>,

    #[command(flatten)]
    pub http: HttpArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scrape the DBDB drug–disease association table.
    Dbdb(DbdbArgs),
    /// Scrape the SynSysNet synaptic protein tree.
    Synsys(SynsysArgs),
    /// Run `dbdb` and then `synsys` with their default options.
    All,
}

#[derive(Debug, Clone, Args)]
pub struct HttpArgs {
    /// Skip TLS certificate verification. Never on unless asked for.
    #[arg(long, global = true)]
    pub danger_accept_invalid_certs: bool,

    /// Per-request timeout in seconds. No timeout when absent.
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Args)]
#[group(multiple = false)]
pub struct TableArgs {
    /// Pick the N-th `<table>` in document order (0-based).
    #[arg(long)]
    pub table_index: Option<usize>,
    /// Pick the table whose `id` attribute equals this value.
    #[arg(long)]
    pub table_id: Option<String>,
    /// Pick the table whose `<caption>` text equals this value.
    #[arg(long)]
    pub table_caption: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct DbdbArgs {
    #[arg(long, default_value = DBDB_URL)]
    pub url: String,
    #[command(flatten)]
    pub table: TableArgs,
}

#[derive(Debug, Clone, Args)]
pub struct SynsysArgs {
    #[arg(long, default_value = SYNSYS_URL)]
    pub url: String,
    /// Prefix that relative category links are appended to.
    #[arg(long, default_value = SYNSYS_BASE_URL)]
    pub base_url: String,
    /// Maximum number of category pages in flight at once.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
    pub concurrency: u16,
    #[arg(long, value_enum, default_value_t = DuplicatePolicy::LastWins)]
    pub on_duplicate: DuplicatePolicy,
    #[arg(long, value_enum, default_value_t = MarkerPolicy::Fail)]
    pub on_missing_marker: MarkerPolicy,
    #[arg(long, value_enum, default_value_t = PageErrorPolicy::Abort)]
    pub on_page_error: PageErrorPolicy,
}

/// What to do when two category pages yield the same `class:subclass` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DuplicatePolicy {
    Error,
    #[default]
    LastWins,
    Merge,
}

/// What to do when a URL lacks one of the substrings a value is cut from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum MarkerPolicy {
    #[default]
    Fail,
    Skip,
}

/// What to do when one category page can't be fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PageErrorPolicy {
    #[default]
    Abort,
    Skip,
}

#[derive(Debug, Clone, Default)]
pub struct HttpOptions {
    pub accept_invalid_certs: bool,
    pub timeout: Option<Duration>,
}

impl From<&HttpArgs> for HttpOptions {
    fn from(args: &HttpArgs) -> Self {
        Self {
            accept_invalid_certs: args.danger_accept_invalid_certs,
            timeout: args.timeout_secs.map(Duration::from_secs),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AssociationsOptions {
    pub url: String,
    pub table: TableMatcher,
}

impl Default for AssociationsOptions {
    fn default() -> Self {
        Self {
            url: DBDB_URL.to_string(),
            table: TableMatcher::default(),
        }
    }
}

impl From<&DbdbArgs> for AssociationsOptions {
    fn from(args: &DbdbArgs) -> Self {
        let t = &args.table;
        let table = match (t.table_index, &t.table_id, &t.table_caption) {
            (Some(n), _, _) => TableMatcher::Nth(n),
            (_, Some(id), _) => TableMatcher::Id(id.clone()),
            (_, _, Some(caption)) => TableMatcher::Caption(caption.clone()),
            _ => TableMatcher::default(),
        };
        Self {
            url: args.url.clone(),
            table,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProteinTreeOptions {
    pub url: String,
    pub base_url: String,
    pub concurrency: usize,
    pub on_duplicate: DuplicatePolicy,
    pub on_missing_marker: MarkerPolicy,
    pub on_page_error: PageErrorPolicy,
}

impl Default for ProteinTreeOptions {
    fn default() -> Self {
        Self {
            url: SYNSYS_URL.to_string(),
            base_url: SYNSYS_BASE_URL.to_string(),
            concurrency: 1,
            on_duplicate: DuplicatePolicy::default(),
            on_missing_marker: MarkerPolicy::default(),
            on_page_error: PageErrorPolicy::default(),
        }
    }
}

impl From<&SynsysArgs> for ProteinTreeOptions {
    fn from(args: &SynsysArgs) -> Self {
        Self {
            url: args.url.clone(),
            base_url: args.base_url.clone(),
            concurrency: usize::from(args.concurrency),
            on_duplicate: args.on_duplicate,
            on_missing_marker: args.on_missing_marker,
            on_page_error: args.on_page_error,
        }
    }
}
