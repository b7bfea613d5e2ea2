//! Table I/O with exact schema enforcement.
//!
//! Every table this engine reads has an order-significant column set; a
//! header that differs in any way is a schema mismatch, reported with both
//! the found and the expected columns. Write and read go through `csv`
//! with serde structs, so column order is the struct field order.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Why a table or input file could not be used.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("Missing file: {}", .path.display())]
    Missing { path: PathBuf },

    #[error("Could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{} columns were {found:?}; expected {expected:?}", .path.display())]
    Schema {
        path: PathBuf,
        found: Vec<String>,
        expected: Vec<String>,
    },

    #[error("{} line {line}: {detail}", .path.display())]
    Malformed {
        path: PathBuf,
        line: u64,
        detail: String,
    },

    #[error("{} contained no rows", .path.display())]
    Empty { path: PathBuf },
}

/// Read a CSV table, enforcing the exact expected header.
pub fn read_table<T: DeserializeOwned>(
    path: &Path,
    expected_columns: &[&str],
) -> Result<Vec<T>, TableError> {
    if !path.exists() {
        return Err(TableError::Missing {
            path: path.to_path_buf(),
        });
    }

    let mut reader = csv::Reader::from_path(path).map_err(|e| to_table_error(path, e))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| to_table_error(path, e))?
        .iter()
        .map(str::to_string)
        .collect();
    if headers != expected_columns {
        return Err(TableError::Schema {
            path: path.to_path_buf(),
            found: headers,
            expected: expected_columns.iter().map(|s| s.to_string()).collect(),
        });
    }

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let row: T = result.map_err(|e| to_table_error(path, e))?;
        rows.push(row);
    }
    Ok(rows)
}

/// Read a table and require at least one data row.
pub fn read_non_empty_table<T: DeserializeOwned>(
    path: &Path,
    expected_columns: &[&str],
) -> Result<Vec<T>, TableError> {
    let rows = read_table(path, expected_columns)?;
    if rows.is_empty() {
        return Err(TableError::Empty {
            path: path.to_path_buf(),
        });
    }
    Ok(rows)
}

/// Write a CSV table; the header row comes from the struct's fields.
pub fn write_table<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), TableError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    }

    let mut writer = csv::Writer::from_path(path).map_err(|e| to_table_error(path, e))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| to_table_error(path, e))?;
    }
    writer.flush().map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Read a whole input file to text (manifest, mapping payload).
pub fn read_text(path: &Path) -> Result<String, TableError> {
    if !path.exists() {
        return Err(TableError::Missing {
            path: path.to_path_buf(),
        });
    }
    std::fs::read_to_string(path).map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn to_table_error(path: &Path, err: csv::Error) -> TableError {
    let line = err.position().map(|pos| pos.line()).unwrap_or(0);
    let detail = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(io_err) => TableError::Io {
            path: path.to_path_buf(),
            source: io_err,
        },
        _ => TableError::Malformed {
            path: path.to_path_buf(),
            line,
            detail,
        },
    }
}
