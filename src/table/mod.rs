pub mod read;
pub mod write;

use arrow::{array::StringArray, error::ArrowError, record_batch::RecordBatch};

/// Column every inventory export is keyed on.
pub const KEY_COLUMN: &str = "sku_id";

/// One parsed inventory CSV. Every column is a nullable `Utf8` array with the
/// schema taken from the file's header row, so downstream operations can
/// treat cells uniformly as optional strings.
#[derive(Debug, Clone)]
pub struct SkuTable {
    batch: RecordBatch,
}

impl SkuTable {
    /// Parse raw CSV bytes (header row required) into an all-string table.
    pub fn from_csv(bytes: &[u8]) -> Result<Self, ArrowError> {
        read::read_string_batch(bytes).map(|batch| Self { batch })
    }

    pub(crate) fn from_batch(batch: RecordBatch) -> Self {
        Self { batch }
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.batch.schema().column_with_name(name).is_some()
    }
}

/// The combined output table: still string-typed except for
/// `stock_on_hand`, which becomes `Float64` once the adjustment runs.
#[derive(Debug, Clone)]
pub struct CombinedTable {
    batch: RecordBatch,
}

impl CombinedTable {
    pub(crate) fn from_batch(batch: RecordBatch) -> Self {
        Self { batch }
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    /// First `n` rows, for display. Zero-copy slice of the underlying arrays.
    pub fn preview(&self, n: usize) -> CombinedTable {
        let len = n.min(self.batch.num_rows());
        Self {
            batch: self.batch.slice(0, len),
        }
    }

    /// Serialize to UTF-8 CSV bytes (header + rows), ready for download.
    pub fn to_csv(&self) -> Result<Vec<u8>, ArrowError> {
        write::write_csv(&self.batch)
    }
}

/// Look up a column as a string array. `Ok(None)` when the column does not
/// exist; an error when it exists but is no longer `Utf8`.
pub(crate) fn string_column<'a>(
    batch: &'a RecordBatch,
    name: &str,
) -> Result<Option<&'a StringArray>, ArrowError> {
    let Some(col) = batch.column_by_name(name) else {
        return Ok(None);
    };
    col.as_any()
        .downcast_ref::<StringArray>()
        .map(Some)
        .ok_or_else(|| {
            ArrowError::CastError(format!("column `{name}` is not a string column"))
        })
}
