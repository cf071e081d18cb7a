//! CSV output for a finished labeling session.

use crate::labels::LabelSequence;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const HEADER: [&str; 2] = ["Frame", "Label"];
const LINE_END: &str = "\r\n";

fn needs_quotes(field: &str) -> bool {
    field.contains([',', '"', '\r', '\n'])
}

fn write_field(out: &mut impl Write, field: &str) -> std::io::Result<()> {
    if needs_quotes(field) {
        write!(out, "\"{}\"", field.replace('"', "\"\""))
    } else {
        out.write_all(field.as_bytes())
    }
}

fn write_row(out: &mut impl Write, first: &str, second: &str) -> std::io::Result<()> {
    write_field(out, first)?;
    out.write_all(b",")?;
    write_field(out, second)?;
    out.write_all(LINE_END.as_bytes())
}

/// Write the `Frame,Label` header and one row per label.
pub fn write_table(out: &mut impl Write, labels: &LabelSequence) -> Result<()> {
    write_row(out, HEADER[0], HEADER[1]).context("failed to write table header")?;
    let mut label_buf = [0u8; 4];
    for (frame, label) in labels.rows() {
        let label = label.encode_utf8(&mut label_buf);
        write_row(out, &frame.to_string(), label)
            .with_context(|| format!("failed to write row for frame {frame}"))?;
    }
    Ok(())
}

/// Create (or truncate) `path` and write the label table to it.
pub fn write_label_table(path: &Path, labels: &LabelSequence) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create '{}'", path.display()))?;
    let mut out = BufWriter::new(file);
    write_table(&mut out, labels)?;
    out.flush()
        .with_context(|| format!("failed to flush '{}'", path.display()))?;
    Ok(())
}
