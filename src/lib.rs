//! Combine three SKU inventory exports (available, active, inactive) into one
//! cleaned table.
//!
//! The active and inactive tables are filtered down to the SKUs present in
//! the available table, the three are concatenated, `stock_on_hand` is
//! clamped by `blocked_qty`, a fixed set of warehouse-internal columns is
//! dropped, and the result is summarized and serialized back to CSV bytes.
//!
//! All tables live in memory for the duration of one [`pipeline::run`] call;
//! nothing is persisted and no state is shared between calls.

pub mod combine;
pub mod error;
pub mod pipeline;
pub mod table;

pub use combine::summary::Summary;
pub use error::{CombineError, Source};
pub use pipeline::{run, run_with_progress, CombineOutput, InputSet, ProgressSink, Stage};
pub use table::{CombinedTable, SkuTable};
