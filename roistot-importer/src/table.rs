//! Delimited text input
//!
//! The first record is the header; every following record is a data row.
//! Records may have differing lengths.

use csv::ReaderBuilder;
use std::io;
use std::path::Path;

/// Header and data rows of one input file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Read a table from `reader`
pub fn read_table<R: io::Read>(reader: R, delimiter: u8) -> csv::Result<Table> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(reader);

    let mut records = reader.records();
    let header = match records.next() {
        Some(record) => record?
            .iter()
            .map(|cell| cell.trim_start_matches('\u{feff}').to_string())
            .collect(),
        None => return Ok(Table::default()),
    };

    let mut rows = Vec::new();
    for record in records {
        rows.push(record?.iter().map(str::to_string).collect());
    }

    Ok(Table { header, rows })
}

/// Read a table from the file at `path`
pub fn read_table_file(path: &Path, delimiter: u8) -> csv::Result<Table> {
    let file = std::fs::File::open(path)?;
    read_table(io::BufReader::new(file), delimiter)
}
