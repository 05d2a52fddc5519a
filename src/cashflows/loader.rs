//! Load cash-flow series from CSV
//!
//! One series per row: the first column is an identifier, the remaining
//! columns are the flows for periods 0, 1, 2, ... Rows may differ in length.
//! A header row is optional and is detected by a non-numeric second column.

use super::CashFlowSeries;
use crate::error::LoadError;
use csv::{ReaderBuilder, StringRecord};
use serde::Serialize;
use std::path::Path;

/// A series together with the identifier from its CSV row
#[derive(Debug, Clone, Serialize)]
pub struct NamedSeries {
    pub id: String,
    pub series: CashFlowSeries,
}

/// Load all series from a CSV file
pub fn load_series<P: AsRef<Path>>(path: P) -> Result<Vec<NamedSeries>, LoadError> {
    let file = std::fs::File::open(path)?;
    load_series_from_reader(file)
}

/// Load series from any reader (e.g., string buffer, stdin)
pub fn load_series_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<NamedSeries>, LoadError> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut all = Vec::new();

    for (index, result) in csv_reader.records().enumerate() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(index as u64 + 1);

        if index == 0 && is_header(&record) {
            continue;
        }
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }

        all.push(to_named_series(&record, line)?);
    }

    Ok(all)
}

fn is_header(record: &StringRecord) -> bool {
    record
        .get(1)
        .map(|field| field.parse::<f64>().is_err())
        .unwrap_or(false)
}

fn to_named_series(record: &StringRecord, line: u64) -> Result<NamedSeries, LoadError> {
    let id = record
        .get(0)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("line{}", line));

    let flows = record
        .iter()
        .skip(1)
        .filter(|field| !field.is_empty())
        .map(|field| {
            field.parse::<f64>().map_err(|_| LoadError::Number {
                value: field.to_string(),
                line,
            })
        })
        .collect::<Result<Vec<f64>, LoadError>>()?;

    Ok(NamedSeries {
        id,
        series: CashFlowSeries::new(flows)?,
    })
}
