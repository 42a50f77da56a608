//! Flat CSV dump of the record table.
//!
//! The file has the header `author,title,nw,noi` and one row per article in
//! table order. Reading it back gives an identical [`RecordTable`], which lets
//! charts be redrawn without scraping again.

use crate::error::ReportError;
use crate::models::{ArticleRecord, RecordTable};
use csv::{ReaderBuilder, WriterBuilder};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{info, instrument};

pub const HEADER: [&str; 4] = ["author", "title", "nw", "noi"];

/// Serialize `table` to `writer`. The header is written even for an empty table.
pub fn write_records<W: Write>(writer: W, table: &RecordTable) -> Result<(), ReportError> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(HEADER)?;
    for record in table {
        wtr.serialize(record)?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Deserialize a table previously written by [`write_records`].
pub fn read_records<R: Read>(reader: R) -> Result<RecordTable, ReportError> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let mut table = RecordTable::new();
    for row in rdr.deserialize::<ArticleRecord>() {
        table.push(row?);
    }
    Ok(table)
}

#[instrument(level = "info", skip_all, fields(path = %path.display(), rows = table.len()))]
pub fn write_csv(path: &Path, table: &RecordTable) -> Result<(), ReportError> {
    let file = File::create(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_records(file, table)?;
    info!("Wrote record CSV");
    Ok(())
}

#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn read_csv(path: &Path) -> Result<RecordTable, ReportError> {
    let file = File::open(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table = read_records(file)?;
    info!(rows = table.len(), "Loaded record CSV");
    Ok(table)
}
