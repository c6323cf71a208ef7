use arrow::{
    array::{ArrayRef, Float64Builder},
    datatypes::{DataType, Field, FieldRef, Schema},
    error::ArrowError,
    record_batch::RecordBatch,
};
use std::sync::Arc;
use tracing::debug;

use crate::table::{string_column, CombinedTable};

pub const STOCK_COLUMN: &str = "stock_on_hand";
pub const BLOCKED_COLUMN: &str = "blocked_qty";

/// Warehouse-internal columns stripped from the final output when present.
pub const DROPPED_COLUMNS: [&str; 3] = ["putaway_reserved_qty", "can_expire", "parent_category"];

/// Replace `stock_on_hand` with `max(stock_on_hand - blocked_qty, 0)` per
/// row. Rows where either value is null or not numeric come out null. If
/// either column is absent the table passes through untouched.
pub fn adjust_stock(table: &CombinedTable) -> Result<CombinedTable, ArrowError> {
    let batch = table.batch();
    let Some(stock) = string_column(batch, STOCK_COLUMN)? else {
        debug!("no `{STOCK_COLUMN}` column, skipping stock adjustment");
        return Ok(table.clone());
    };
    let Some(blocked) = string_column(batch, BLOCKED_COLUMN)? else {
        debug!("no `{BLOCKED_COLUMN}` column, skipping stock adjustment");
        return Ok(table.clone());
    };

    let mut builder = Float64Builder::with_capacity(batch.num_rows());
    for (on_hand, held) in stock.iter().zip(blocked.iter()) {
        let adjusted = match (parse_qty(on_hand), parse_qty(held)) {
            (Some(on_hand), Some(held)) => Some((on_hand - held).max(0.0)),
            _ => None,
        };
        builder.append_option(adjusted);
    }
    let adjusted: ArrayRef = Arc::new(builder.finish());

    let schema = batch.schema();
    let stock_idx = schema
        .column_with_name(STOCK_COLUMN)
        .map(|(i, _)| i)
        .ok_or_else(|| ArrowError::SchemaError(format!("`{STOCK_COLUMN}` vanished")))?;

    let fields: Vec<FieldRef> = schema
        .fields()
        .iter()
        .enumerate()
        .map(|(i, f)| {
            if i == stock_idx {
                Arc::new(Field::new(STOCK_COLUMN, DataType::Float64, true))
            } else {
                f.clone()
            }
        })
        .collect();
    let columns: Vec<ArrayRef> = batch
        .columns()
        .iter()
        .enumerate()
        .map(|(i, c)| if i == stock_idx { adjusted.clone() } else { c.clone() })
        .collect();

    debug!(rows = batch.num_rows(), "adjusted stock on hand");
    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?;
    Ok(CombinedTable::from_batch(batch))
}

fn parse_qty(value: Option<&str>) -> Option<f64> {
    value.and_then(|s| s.trim().parse().ok())
}

/// Drop whichever of [`DROPPED_COLUMNS`] exist; absence is not an error and
/// every other column is untouched.
pub fn drop_columns(table: &CombinedTable) -> Result<CombinedTable, ArrowError> {
    let batch = table.batch();
    let keep: Vec<usize> = batch
        .schema()
        .fields()
        .iter()
        .enumerate()
        .filter(|(_, f)| !DROPPED_COLUMNS.contains(&f.name().as_str()))
        .map(|(i, _)| i)
        .collect();

    if keep.len() == batch.num_columns() {
        return Ok(table.clone());
    }
    debug!(
        dropped = batch.num_columns() - keep.len(),
        "dropped internal columns"
    );
    Ok(CombinedTable::from_batch(batch.project(&keep)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::SkuTable;
    use anyhow::Result;
    use arrow::array::Float64Array;

    fn combined(csv: &str) -> Result<CombinedTable> {
        let table = SkuTable::from_csv(csv.as_bytes())?;
        Ok(CombinedTable::from_batch(table.batch().clone()))
    }

    fn stock_values(table: &CombinedTable) -> Vec<Option<f64>> {
        table
            .batch()
            .column_by_name(STOCK_COLUMN)
            .unwrap()
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap()
            .iter()
            .collect()
    }

    #[test]
    fn subtracts_blocked_qty_and_clips_at_zero() -> Result<()> {
        let table = combined("sku_id,stock_on_hand,blocked_qty\nA,10,3\nB,10,12\nC,10,1\n")?;
        let adjusted = adjust_stock(&table)?;
        assert_eq!(
            stock_values(&adjusted),
            vec![Some(7.0), Some(0.0), Some(9.0)]
        );
        Ok(())
    }

    #[test]
    fn never_negative_for_any_numeric_pair() -> Result<()> {
        let table = combined("sku_id,stock_on_hand,blocked_qty\nA,0,5\nB,3,3\nC,-2,1\n")?;
        let adjusted = adjust_stock(&table)?;
        for v in stock_values(&adjusted).into_iter().flatten() {
            assert!(v >= 0.0);
        }
        Ok(())
    }

    #[test]
    fn null_or_non_numeric_values_propagate_null() -> Result<()> {
        let table = combined("sku_id,stock_on_hand,blocked_qty\nA,10,\nB,,2\nC,n/a,2\nD,8,2\n")?;
        let adjusted = adjust_stock(&table)?;
        assert_eq!(
            stock_values(&adjusted),
            vec![None, None, None, Some(6.0)]
        );
        Ok(())
    }

    #[test]
    fn missing_blocked_qty_passes_through_unchanged() -> Result<()> {
        let table = combined("sku_id,stock_on_hand\nA,10\n")?;
        let adjusted = adjust_stock(&table)?;
        assert_eq!(adjusted.batch(), table.batch());
        Ok(())
    }

    #[test]
    fn missing_stock_on_hand_passes_through_unchanged() -> Result<()> {
        let table = combined("sku_id,blocked_qty\nA,10\n")?;
        let adjusted = adjust_stock(&table)?;
        assert_eq!(adjusted.batch(), table.batch());
        Ok(())
    }

    #[test]
    fn drops_exactly_the_internal_columns_that_exist() -> Result<()> {
        let table = combined("sku_id,can_expire,stock_on_hand,parent_category\nA,Y,5,toys\n")?;
        let cleaned = drop_columns(&table)?;
        assert_eq!(cleaned.column_names(), vec!["sku_id", "stock_on_hand"]);
        Ok(())
    }

    #[test]
    fn no_internal_columns_means_no_change() -> Result<()> {
        let table = combined("sku_id,stock_on_hand\nA,5\n")?;
        let cleaned = drop_columns(&table)?;
        assert_eq!(cleaned.batch(), table.batch());
        Ok(())
    }

    #[test]
    fn dropped_columns_do_not_survive_serialization() -> Result<()> {
        let table = combined("sku_id,putaway_reserved_qty\nA,2\n")?;
        let cleaned = drop_columns(&table)?;
        let text = String::from_utf8(cleaned.to_csv()?)?;
        assert!(!text.contains("putaway_reserved_qty"));
        Ok(())
    }
}
