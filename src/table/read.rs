use arrow::{
    array::{ArrayRef, StringArray},
    csv::{reader::Format, ReaderBuilder},
    datatypes::{DataType, Field, Schema},
    error::ArrowError,
    record_batch::RecordBatch,
};
use std::{io::Cursor, sync::Arc};
use tracing::debug;

/// Parse CSV bytes into a single `RecordBatch` where every column is a
/// nullable `Utf8` array named after the header row. Values keep their
/// original text; typing happens later, per operation.
pub fn read_string_batch(bytes: &[u8]) -> Result<RecordBatch, ArrowError> {
    // One probe pass for the header names only.
    let format = Format::default().with_header(true);
    let (inferred, _) = format.infer_schema(Cursor::new(bytes), Some(1))?;
    if inferred.fields().is_empty() {
        return Err(ArrowError::CsvError("input has no header row".to_string()));
    }

    let fields: Vec<Field> = inferred
        .fields()
        .iter()
        .map(|f| Field::new(f.name().trim(), DataType::Utf8, true))
        .collect();
    let schema = Arc::new(Schema::new(fields));

    let reader = ReaderBuilder::new(schema.clone())
        .with_header(true)
        .with_quote(b'"')
        .with_delimiter(b',')
        .build(Cursor::new(bytes))?;

    let mut batches = Vec::new();
    for batch in reader {
        batches.push(batch?);
    }

    let batch = if batches.is_empty() {
        // Header-only file: a legal zero-row table.
        RecordBatch::new_empty(schema)
    } else {
        normalize_nulls(&arrow::compute::concat_batches(&schema, &batches)?)?
    };

    debug!(
        rows = batch.num_rows(),
        columns = batch.num_columns(),
        "parsed CSV input"
    );
    Ok(batch)
}

/// The CSV reader hands back empty fields as empty strings; downstream code
/// treats an absent value as null, so rewrite them.
fn normalize_nulls(batch: &RecordBatch) -> Result<RecordBatch, ArrowError> {
    let mut cols = Vec::with_capacity(batch.num_columns());
    for arr in batch.columns() {
        let Some(sarr) = arr.as_any().downcast_ref::<StringArray>() else {
            cols.push(arr.clone());
            continue;
        };
        let rewritten: StringArray = sarr
            .iter()
            .map(|opt| opt.filter(|s| !s.is_empty()))
            .collect();
        cols.push(Arc::new(rewritten) as ArrayRef);
    }
    RecordBatch::try_new(batch.schema(), cols)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use arrow::array::Array;

    #[test]
    fn header_names_are_trimmed() -> Result<()> {
        let batch = read_string_batch(b" sku_id , stock_on_hand\nA1,5\n")?;
        let schema = batch.schema();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(names, vec!["sku_id", "stock_on_hand"]);
        Ok(())
    }

    #[test]
    fn quoted_values_keep_embedded_commas() -> Result<()> {
        let batch = read_string_batch(b"sku_id,parent_category\nA1,\"toys, outdoor\"\n")?;
        let cat = batch
            .column(1)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(cat.value(0), "toys, outdoor");
        Ok(())
    }

    #[test]
    fn empty_fields_become_nulls() -> Result<()> {
        let batch = read_string_batch(b"sku_id,blocked_qty\nA1,\n,4\n")?;
        let skus = batch
            .column(0)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        let blocked = batch
            .column(1)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert!(blocked.is_null(0));
        assert!(skus.is_null(1));
        assert_eq!(skus.value(0), "A1");
        assert_eq!(blocked.value(1), "4");
        Ok(())
    }

    #[test]
    fn values_stay_textual_even_when_numeric() -> Result<()> {
        let batch = read_string_batch(b"sku_id,stock_on_hand\n1,10\n2,20\n")?;
        assert_eq!(batch.schema().field(1).data_type(), &DataType::Utf8);
        Ok(())
    }
}
