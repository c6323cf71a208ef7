//! One-shot combine pipeline: parse the three uploads, filter + concatenate,
//! adjust stock, drop internal columns, summarize. Synchronous and
//! self-contained; the caller owns all I/O.

use tracing::{debug, info, instrument};

use crate::{
    combine::{self, adjust, summary::Summary},
    error::{CombineError, Source},
    table::{CombinedTable, SkuTable},
};

/// Suggested name for the downloadable result file.
pub const DOWNLOAD_FILE_NAME: &str = "combined_cleaned.csv";

/// The three uploaded CSV payloads. All three must be present before any
/// work happens; the fields are plain data, not ambient widget state.
#[derive(Debug, Clone, Default)]
pub struct InputSet {
    pub available: Option<Vec<u8>>,
    pub active: Option<Vec<u8>>,
    pub inactive: Option<Vec<u8>>,
}

impl InputSet {
    /// Which uploads are still outstanding, in fixed source order.
    pub fn missing(&self) -> Vec<Source> {
        Source::ALL
            .into_iter()
            .zip([&self.available, &self.active, &self.inactive])
            .filter(|(_, payload)| payload.is_none())
            .map(|(source, _)| source)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }
}

/// Pipeline checkpoints, in order. Mirrors what a caller would drive a
/// progress indicator with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Parsed,
    Combined,
    Adjusted,
    Done,
}

/// Optional observer for [`Stage`] checkpoints. Purely informational; the
/// pipeline result does not depend on it.
pub trait ProgressSink {
    fn on_stage(&mut self, _stage: Stage) {}
}

struct NoProgress;

impl ProgressSink for NoProgress {}

/// Everything a caller needs to render the result: the cleaned table and the
/// derived counters.
#[derive(Debug, Clone)]
pub struct CombineOutput {
    pub table: CombinedTable,
    pub summary: Summary,
}

/// Run the full pipeline over a complete [`InputSet`].
pub fn run(inputs: &InputSet) -> Result<CombineOutput, CombineError> {
    run_with_progress(inputs, &mut NoProgress)
}

/// [`run`], reporting each [`Stage`] to `progress` as it completes.
#[instrument(level = "info", skip_all)]
pub fn run_with_progress(
    inputs: &InputSet,
    progress: &mut dyn ProgressSink,
) -> Result<CombineOutput, CombineError> {
    let (Some(available), Some(active), Some(inactive)) = (
        inputs.available.as_deref(),
        inputs.active.as_deref(),
        inputs.inactive.as_deref(),
    ) else {
        return Err(CombineError::MissingInput(inputs.missing()));
    };

    let available = parse_input(available, Source::Available)?;
    let active = parse_input(active, Source::Active)?;
    let inactive = parse_input(inactive, Source::Inactive)?;
    progress.on_stage(Stage::Parsed);

    let (combined, counts) = combine::combine(&available, &active, &inactive)?;
    progress.on_stage(Stage::Combined);

    let adjusted = adjust::adjust_stock(&combined)?;
    let cleaned = adjust::drop_columns(&adjusted)?;
    progress.on_stage(Stage::Adjusted);

    let summary = combine::summary::summarize(&cleaned, counts)?;
    info!(%summary, "combine finished");
    progress.on_stage(Stage::Done);

    Ok(CombineOutput {
        table: cleaned,
        summary,
    })
}

fn parse_input(bytes: &[u8], source: Source) -> Result<SkuTable, CombineError> {
    debug!(%source, bytes = bytes.len(), "parsing input");
    SkuTable::from_csv(bytes).map_err(|e| CombineError::Parse {
        input: source,
        message: e.to_string(),
    })
}
