use crate::models::{Dataset, Row};
use anyhow::{bail, Context, Result};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use tracing::{debug, info};

/// Read a whole CSV listing into memory. The first record becomes the header.
pub fn load_dataset(label: &str, file_path: &str) -> Result<Dataset> {
    let file = File::open(file_path)
        .with_context(|| format!("Failed to open file: {}", file_path))?;

    let dataset = read_dataset(label, file)
        .with_context(|| format!("Failed to read CSV: {}", file_path))?;

    info!(
        dataset = %dataset.label,
        path = file_path,
        rows = dataset.rows.len(),
        columns = dataset.column_count(),
        "Loaded dataset"
    );
    Ok(dataset)
}

/// Parse CSV content from any reader. Rows may have any number of fields;
/// short rows only fail once a missing column is actually read.
pub fn read_dataset<R: Read>(label: &str, reader: R) -> Result<Dataset> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = reader.records();
    let header = match records.next() {
        Some(record) => record?.iter().map(str::to_string).collect::<Vec<_>>(),
        None => bail!("dataset {} has no header row", label),
    };
    debug!(dataset = label, ?header, "Read header");

    let rows = records
        .map(|record| {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            Ok(Row::new(line, record.iter().map(str::to_string).collect()))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Dataset {
        label: label.to_string(),
        header,
        rows,
    })
}
