pub mod adjust;
pub mod summary;

use arrow::{
    array::{ArrayRef, BooleanArray},
    compute::{concat_batches, filter_record_batch},
    datatypes::{DataType, Field, Schema},
    error::ArrowError,
    record_batch::RecordBatch,
};
use std::{collections::HashSet, sync::Arc};
use tracing::debug;

use crate::{
    error::{CombineError, Source},
    table::{string_column, CombinedTable, SkuTable, KEY_COLUMN},
};

/// Row counts of the three concatenated slices, kept for the summary
/// breakdown. `active` and `inactive` are post-filter counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceCounts {
    pub available: u64,
    pub active: u64,
    pub inactive: u64,
}

/// Collect the non-null `sku_id` values of a table into a lookup set.
pub fn key_set(table: &SkuTable, source: Source) -> Result<HashSet<String>, CombineError> {
    let col = string_column(table.batch(), KEY_COLUMN)?
        .ok_or(CombineError::MissingKeyColumn { input: source })?;
    Ok(col.iter().flatten().map(str::to_string).collect())
}

/// Keep the rows of `table` whose `sku_id` is in `keys`, preserving order.
/// A missing key column fails loudly instead of producing a misleading empty
/// result.
pub fn filter_by_key(
    table: &SkuTable,
    keys: &HashSet<String>,
    source: Source,
) -> Result<SkuTable, CombineError> {
    let col = string_column(table.batch(), KEY_COLUMN)?
        .ok_or(CombineError::MissingKeyColumn { input: source })?;
    let mask: BooleanArray = col
        .iter()
        .map(|v| Some(matches!(v, Some(s) if keys.contains(s))))
        .collect();
    let filtered = filter_record_batch(table.batch(), &mask)?;
    Ok(SkuTable::from_batch(filtered))
}

/// Filter the active and inactive tables down to the available SKUs and stack
/// the three: filtered active, filtered inactive, then everything available.
/// SKUs present in more than one source appear once per source.
pub fn combine(
    available: &SkuTable,
    active: &SkuTable,
    inactive: &SkuTable,
) -> Result<(CombinedTable, SourceCounts), CombineError> {
    let keys = key_set(available, Source::Available)?;
    let active_rows = filter_by_key(active, &keys, Source::Active)?;
    let inactive_rows = filter_by_key(inactive, &keys, Source::Inactive)?;

    debug!(
        available = available.num_rows(),
        active = active_rows.num_rows(),
        inactive = inactive_rows.num_rows(),
        "filtered sources"
    );

    let counts = SourceCounts {
        available: available.num_rows() as u64,
        active: active_rows.num_rows() as u64,
        inactive: inactive_rows.num_rows() as u64,
    };
    let batch = concat_aligned(&[
        active_rows.batch(),
        inactive_rows.batch(),
        available.batch(),
    ])?;
    Ok((CombinedTable::from_batch(batch), counts))
}

/// Concatenate batches whose column sets may differ. The output schema is the
/// first-seen-order union of all column names; a batch missing a column
/// contributes nulls for it. All columns are still `Utf8` at this point.
fn concat_aligned(batches: &[&RecordBatch]) -> Result<RecordBatch, ArrowError> {
    let mut names: Vec<String> = Vec::new();
    for batch in batches {
        for field in batch.schema().fields() {
            if !names.iter().any(|n| n == field.name()) {
                names.push(field.name().clone());
            }
        }
    }

    let fields: Vec<Field> = names
        .iter()
        .map(|n| Field::new(n, DataType::Utf8, true))
        .collect();
    let schema = Arc::new(Schema::new(fields));

    let mut aligned = Vec::with_capacity(batches.len());
    for batch in batches {
        let cols: Vec<ArrayRef> = names
            .iter()
            .map(|n| match batch.column_by_name(n) {
                Some(col) => col.clone(),
                None => arrow::array::new_null_array(&DataType::Utf8, batch.num_rows()),
            })
            .collect();
        aligned.push(RecordBatch::try_new(schema.clone(), cols)?);
    }
    concat_batches(&schema, &aligned)
}
