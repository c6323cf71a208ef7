use arrow::error::ArrowError;
use std::fmt;
use thiserror::Error;

/// Which of the three uploaded inventories a value or an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Available,
    Active,
    Inactive,
}

impl Source {
    pub const ALL: [Source; 3] = [Source::Available, Source::Active, Source::Inactive];

    /// Label used in error messages and the summary breakdown.
    pub fn label(&self) -> &'static str {
        match self {
            Source::Available => "available SKUs",
            Source::Active => "active SKUs",
            Source::Inactive => "inactive SKUs",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Failures of one combine request. Every variant is terminal for the
/// request; no partial output is produced.
#[derive(Debug, Error)]
pub enum CombineError {
    /// Fewer than three input files were supplied. Recoverable by the caller
    /// supplying the rest; no computation has happened.
    #[error("all three input files are required; still missing: {}", fmt_sources(.0))]
    MissingInput(Vec<Source>),

    /// An input stream was not valid CSV. The field is `input`, not
    /// `source`: thiserror reserves `source` for a wrapped cause, and this
    /// is a label.
    #[error("failed to parse {input} file: {message}")]
    Parse { input: Source, message: String },

    /// A table needed for key filtering has no `sku_id` column.
    #[error("{input} file has no `sku_id` column")]
    MissingKeyColumn { input: Source },

    /// A bulk table operation failed after parsing.
    #[error("table operation failed: {0}")]
    Arrow(#[from] ArrowError),
}

fn fmt_sources(sources: &[Source]) -> String {
    sources
        .iter()
        .map(Source::label)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_input_names_every_absent_file() {
        let err = CombineError::MissingInput(vec![Source::Active, Source::Inactive]);
        let msg = err.to_string();
        assert!(msg.contains("active SKUs"));
        assert!(msg.contains("inactive SKUs"));
        assert!(!msg.contains("available SKUs"));
    }

    #[test]
    fn parse_error_identifies_offending_input() {
        let err = CombineError::Parse {
            input: Source::Inactive,
            message: "incorrect number of fields".into(),
        };
        assert!(err.to_string().starts_with("failed to parse inactive SKUs"));
    }
}
