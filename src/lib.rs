//! Scrapers for two biomedical reference sites.
//!
//! `dbdb` turns the drug–disease association list of the URMC DBDB into
//! `rochester-dbdb-associations.csv`; `synsys` walks the SynSysNet synaptic
//! protein classes and writes the UniProt accessions found under each
//! `class:subclass` to `SynSysNet-Synaptic-Protein-Tree.csv`.

pub mod config;
mod error;
pub mod locate;
mod macros;
pub mod parse;
pub mod process;
pub mod request;
pub mod table;
pub mod tree;

pub use error::{Error, Result};

pub const DOWNLOADS_DIR: &str = "downloads";

pub const DBDB_URL: &str = "https://www.dbdb.urmc.rochester.edu/associations/list";
pub const DBDB_FILE_NAME: &str = "rochester-dbdb-associations.csv";
/// The DBDB job writes one directory above the working directory.
pub const DBDB_LEVELS_UP: usize = 1;

pub const SYNSYS_URL: &str = "http://bioinformatics.charite.de/synsys/index.php?site=syn_class";
pub const SYNSYS_BASE_URL: &str = "http://bioinformatics.charite.de/synsys/";
pub const SYNSYS_FILE_NAME: &str = "SynSysNet-Synaptic-Protein-Tree.csv";
/// The SynSysNet job writes two directories above the working directory.
pub const SYNSYS_LEVELS_UP: usize = 2;

const CATEGORY_HREF_PATTERN: &str = r"./index\.php\?site=search";
const IDENTIFIER_HREF_PATTERN: &str = r"http://www\.uniprot\.org/.";
const IDENTIFIER_MARKER: &str = "uniprot/";
const CLASS_MARKER: &str = "synapt=";
const SUBCLASS_MARKER: &str = "Function=";
/// Header of the protein tree's only data column.
const TREE_COLUMN: &str = "0";
