use arrow::error::ArrowError;
use serde::Serialize;
use std::{collections::HashSet, fmt};

use crate::combine::SourceCounts;
use crate::table::{string_column, CombinedTable, KEY_COLUMN};

/// Derived counters for the result panel. Computed once, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Rows in the combined table.
    pub total_rows: u64,
    /// Distinct non-null `sku_id` values, when that column survived.
    pub distinct_skus: Option<u64>,
    /// Rows taken from the available table (unfiltered).
    pub available_rows: u64,
    /// Rows from the active table that matched an available SKU.
    pub active_rows: u64,
    /// Rows from the inactive table that matched an available SKU.
    pub inactive_rows: u64,
}

pub fn summarize(table: &CombinedTable, counts: SourceCounts) -> Result<Summary, ArrowError> {
    let distinct_skus = match string_column(table.batch(), KEY_COLUMN)? {
        Some(col) => {
            let unique: HashSet<&str> = col.iter().flatten().collect();
            Some(unique.len() as u64)
        }
        None => None,
    };

    Ok(Summary {
        total_rows: table.num_rows() as u64,
        distinct_skus,
        available_rows: counts.available,
        active_rows: counts.active,
        inactive_rows: counts.inactive,
    })
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Total rows: {}", self.total_rows)?;
        if let Some(n) = self.distinct_skus {
            write!(f, " | Unique SKUs: {n}")?;
        }
        write!(
            f,
            " | Available: {} | Active (filtered): {} | Inactive (filtered): {}",
            self.available_rows, self.active_rows, self.inactive_rows
        )
    }
}
