//! CSV import for step exports
//!
//! Expects a header row containing `date` and `steps` columns (any order,
//! case-insensitive, extra columns ignored).

use std::io::Read;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Observation, RawObservation};
use crate::series::validate;

const DATE_COLUMN: &str = "date";
const STEPS_COLUMN: &str = "steps";

fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim().trim_start_matches('\u{feff}').eq_ignore_ascii_case(name))
}

/// Read CSV rows without validating them
pub fn read_csv_rows<R: Read>(reader: R, user_id: &str) -> Result<Vec<RawObservation>> {
    Ok(read_numbered_rows(reader, user_id)?
        .into_iter()
        .map(|(_, row)| row)
        .collect())
}

/// Rows paired with their 1-based line number in the file
fn read_numbered_rows<R: Read>(reader: R, user_id: &str) -> Result<Vec<(u64, RawObservation)>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let (date_idx, steps_idx) = match (
        find_column(&headers, DATE_COLUMN),
        find_column(&headers, STEPS_COLUMN),
    ) {
        (Some(d), Some(s)) => (d, s),
        _ => {
            return Err(Error::Import(
                "CSV file must contain 'date' and 'steps' columns".to_string(),
            ))
        }
    };

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        if record.iter().all(|field| field.is_empty()) {
            continue;
        }

        let date = record
            .get(date_idx)
            .ok_or_else(|| Error::Import(format!("Line {}: missing date", line)))?;
        let steps = record
            .get(steps_idx)
            .ok_or_else(|| Error::Import(format!("Line {}: missing steps", line)))?;

        rows.push((line, RawObservation::new(date, steps, user_id)));
    }

    Ok(rows)
}

/// Parse and validate a step CSV for one user
///
/// Any invalid row rejects the whole file.
pub fn parse_csv<R: Read>(reader: R, user_id: &str) -> Result<Vec<Observation>> {
    let rows = read_numbered_rows(reader, user_id)?;

    let observations = rows
        .iter()
        .map(|(line, row)| {
            validate(row).map_err(|e| match e {
                Error::Validation(msg) => Error::Validation(format!("Line {}: {}", line, msg)),
                other => other,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(user = user_id, rows = observations.len(), "Parsed step CSV");
    Ok(observations)
}
