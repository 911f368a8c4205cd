use crate::errors::AppResult;
use crate::models::Record;
use std::io::Write;

/// Scrive i record in JSON formattato.
pub fn write_json<W: Write>(mut out: W, records: &[Record]) -> AppResult<()> {
    serde_json::to_writer_pretty(&mut out, records)?;
    out.write_all(b"\n")?;
    Ok(())
}
