use arrow::{csv::WriterBuilder, error::ArrowError, record_batch::RecordBatch};

/// Serialize a batch to CSV bytes: header row plus one line per row, UTF-8,
/// nulls rendered as empty fields.
pub fn write_csv(batch: &RecordBatch) -> Result<Vec<u8>, ArrowError> {
    let mut buf = Vec::new();
    let mut writer = WriterBuilder::new().with_header(true).build(&mut buf);
    writer.write(batch)?;
    drop(writer);
    Ok(buf)
}
