use std::fs::Permissions;
use std::io::{Read, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::{Error, Result};

/// Rectangular table with an index label per row, ready to be written out as CSV.
///
/// The CSV layout is a header line that starts with an empty cell (the index
/// column has no name) followed by the column names, then one line per row
/// starting with the row's index label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSet {
    columns: Vec<String>,
    index: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RecordSet {
    /// Rows labelled `0..rows.len()`. Every row must have one cell per column.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        if let Some((row, cells)) = rows
            .iter()
            .enumerate()
            .find(|(_, cells)| cells.len() != columns.len())
        {
            return Err(Error::RowShape {
                row,
                expected: columns.len(),
                found: cells.len(),
            });
        }
        let index = (0..rows.len()).map(|i| i.to_string()).collect();
        Ok(Self {
            columns,
            index,
            rows,
        })
    }

    /// A single data column, each row labelled by its key.
    pub fn keyed(column: &str, entries: Vec<(String, String)>) -> Self {
        let (index, rows) = entries
            .into_iter()
            .map(|(key, value)| (key, vec![value]))
            .unzip();
        Self {
            columns: vec![column.to_string()],
            index,
            rows,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn index(&self) -> &[String] {
        &self.index
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(std::iter::once("").chain(self.columns.iter().map(String::as_str)))?;
        for (label, cells) in self.index.iter().zip(&self.rows) {
            wtr.write_record(std::iter::once(label).chain(cells))?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Writes the CSV to a temporary file next to `path` and renames it over `path`,
    /// so a failed run never leaves a half-written file behind.
    /// The destination directory has to exist. An existing file keeps its permissions.
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        self.write_csv(tmp.as_file_mut())?;
        tmp.as_file().sync_all()?;
        if let Some(perms) = output_permissions(path) {
            tmp.as_file().set_permissions(perms)?;
        }
        tmp.persist(path)?;
        Ok(())
    }

    /// Reads back a file in the layout `write_csv` produces.
    pub fn read_csv<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
        let columns = rdr.headers()?.iter().skip(1).map(str::to_string).collect();

        let mut index = Vec::new();
        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            let mut cells = record.iter().map(str::to_string);
            index.push(cells.next().unwrap_or_default());
            rows.push(cells.collect());
        }
        Ok(Self {
            columns,
            index,
            rows,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::read_csv(std::fs::File::open(path)?)
    }
}

/// Permissions for the finished file: the ones of the file being replaced, else the usual 0644.
/// Temp files are created owner-only.
fn output_permissions(path: &Path) -> Option<Permissions> {
    match std::fs::metadata(path) {
        Ok(meta) => Some(meta.permissions()),
        Err(_) => default_permissions(),
    }
}

#[cfg(unix)]
fn default_permissions() -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<Permissions> {
    None
}
