//! CSV importer.
//!
//! Each data row becomes one document. Columns whose header starts with
//! the embedding prefix are parsed as numbers and gathered, in column
//! order, into a single embedding array; all other columns are copied as
//! strings. Rows are numbered from 1 into the `index` field.

use std::io::Read;

use serde::Serialize;
use serde_json::{Map, Value, json};
use thiserror::Error;
use tracing::{debug, info, instrument};

use atlas_core::pipeline::DEFAULT_PATH;
use atlas_core::{DataApi, Namespace, Operation};

/// Field holding the 1-based row number.
pub const INDEX_FIELD: &str = "index";

/// Progress is logged every this many rows.
pub const PROGRESS_INTERVAL: u64 = 25;

/// Errors that stop an import.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: column '{column}' is not a finite number: '{value}'")]
    Embedding {
        row: u64,
        column: String,
        value: String,
    },

    #[error("row {row}: insert failed: {source}")]
    Insert {
        row: u64,
        #[source]
        source: atlas_core::Error,
    },
}

/// Outcome of a completed import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub rows: u64,
}

/// Turns CSV rows into documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowShaper {
    prefix: String,
    embedding_field: String,
}

impl Default for RowShaper {
    fn default() -> Self {
        Self::new(DEFAULT_PATH)
    }
}

impl RowShaper {
    /// A shaper gathering `prefix*` columns into a field named `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self {
            embedding_field: prefix.clone(),
            prefix,
        }
    }

    pub fn with_embedding_field(mut self, field: impl Into<String>) -> Self {
        self.embedding_field = field.into();
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Shape one row. `row` is the 1-based row number.
    pub fn shape(
        &self,
        headers: &csv::StringRecord,
        record: &csv::StringRecord,
        row: u64,
    ) -> Result<Value, ImportError> {
        let mut document = Map::new();
        let mut embedding = Vec::new();

        for (column, cell) in headers.iter().zip(record.iter()) {
            if column.starts_with(&self.prefix) {
                let value = cell
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| ImportError::Embedding {
                        row,
                        column: column.to_string(),
                        value: cell.to_string(),
                    })?;
                embedding.push(value);
            } else {
                document.insert(column.to_string(), json!(cell));
            }
        }

        document.insert(INDEX_FIELD.to_string(), json!(row));
        document.insert(self.embedding_field.clone(), json!(embedding));
        Ok(Value::Object(document))
    }
}

/// Insert every row of a CSV document, one `insertOne` at a time.
#[instrument(skip(reader, shaper, api), fields(prefix = shaper.prefix()))]
pub async fn import_csv<R: Read>(
    reader: R,
    target: &Namespace,
    shaper: &RowShaper,
    api: &dyn DataApi,
) -> Result<ImportSummary, ImportError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    info!(columns = headers.len(), "starting import");

    let mut rows = 0u64;
    for record in csv_reader.records() {
        let record = record?;
        let row = rows + 1;
        let document = shaper.shape(&headers, &record, row)?;

        let result = api
            .execute(&Operation::InsertOne {
                target: target.clone(),
                document,
            })
            .await
            .map_err(|source| ImportError::Insert { row, source })?;
        debug!(row, inserted = %result, "row inserted");

        rows = row;
        if rows % PROGRESS_INTERVAL == 0 {
            info!(rows, "import progress");
        }
    }

    info!(rows, "import finished");
    Ok(ImportSummary { rows })
}
