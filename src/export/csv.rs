use crate::errors::AppResult;
use crate::models::Record;
use crate::utils::text::collapse_whitespace;
use ::csv::{Terminator, WriterBuilder};
use std::io::Write;

pub const CSV_HEADER: [&str; 3] = ["Timestamp", "Name", "URL"];

/// Scrive i record in CSV: header, then one row per record in the given order.
/// Timestamps are rendered in local time; names never span more than one line.
pub fn write_csv<W: Write>(out: W, records: &[Record]) -> AppResult<()> {
    let mut wtr = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(out);

    wtr.write_record(CSV_HEADER)?;

    for r in records {
        let name = collapse_whitespace(&r.name);
        wtr.write_record([r.display_timestamp().as_str(), name.as_str(), r.url.as_str()])?;
    }

    wtr.flush()?;
    Ok(())
}
