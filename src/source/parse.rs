//! CSV to `ListingTable`.
//!
//! Missing required columns fail the whole load. Individual rows that fail to
//! parse, or that break the listing invariants (negative price, coordinates
//! off the globe), are skipped and reported in `LoadReport::row_errors`.

use crate::query::{Listing, ListingTable};
use anyhow::{Context, Result};
use csv::StringRecord;
use std::collections::HashMap;

pub const REQUIRED_COLUMNS: [&str; 12] = [
    "name",
    "country",
    "suburb",
    "latitude",
    "longitude",
    "price",
    "rating",
    "property_type",
    "occupancy_30",
    "occupancy_60",
    "occupancy_90",
    "occupancy_365",
];

#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    /// 1-based line in the CSV, header included.
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub table: ListingTable,
    pub rows_read: usize,
    pub row_errors: Vec<RowError>,
}

pub fn parse_listings(text: &str) -> Result<LoadReport> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .context("Failed to read CSV headers")?
        .clone();
    let columns = build_header_map(&headers);

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|c| !columns.contains_key(*c))
        .collect();
    if !missing.is_empty() {
        anyhow::bail!("listings CSV is missing required columns: {}", missing.join(", "));
    }

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header line
        let line = idx + 2;
        rows_read += 1;

        let parsed = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| parse_row(&record, &columns));
        match parsed {
            Ok(listing) => rows.push(listing),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    if rows.is_empty() {
        anyhow::bail!(
            "no valid listings in CSV ({} rows read, {} rejected)",
            rows_read,
            row_errors.len()
        );
    }

    Ok(LoadReport {
        table: ListingTable::new(rows),
        rows_read,
        row_errors,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let name = name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase();
            (name, idx)
        })
        .collect()
}

fn field<'r>(record: &'r StringRecord, columns: &HashMap<String, usize>, name: &str) -> &'r str {
    columns
        .get(name)
        .and_then(|&i| record.get(i))
        .unwrap_or("")
}

fn text(record: &StringRecord, columns: &HashMap<String, usize>, name: &str) -> Result<String, String> {
    let v = field(record, columns, name);
    if v.is_empty() {
        return Err(format!("empty {name}"));
    }
    Ok(v.to_string())
}

fn number(record: &StringRecord, columns: &HashMap<String, usize>, name: &str) -> Result<f64, String> {
    let raw = field(record, columns, name);
    let v: f64 = raw
        .parse()
        .map_err(|_| format!("{name} is not a number: '{raw}'"))?;
    if !v.is_finite() {
        return Err(format!("{name} is not finite: '{raw}'"));
    }
    Ok(v)
}

fn non_negative(record: &StringRecord, columns: &HashMap<String, usize>, name: &str) -> Result<f64, String> {
    let v = number(record, columns, name)?;
    if v < 0.0 {
        return Err(format!("{name} is negative: {v}"));
    }
    Ok(v)
}

fn parse_row(record: &StringRecord, columns: &HashMap<String, usize>) -> Result<Listing, String> {
    let latitude = number(record, columns, "latitude")?;
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(format!("latitude out of range: {latitude}"));
    }
    let longitude = number(record, columns, "longitude")?;
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(format!("longitude out of range: {longitude}"));
    }

    let rating = match field(record, columns, "rating") {
        "" => None,
        _ => Some(number(record, columns, "rating")?),
    };

    Ok(Listing {
        name: text(record, columns, "name")?,
        country: text(record, columns, "country")?,
        suburb: text(record, columns, "suburb")?,
        latitude,
        longitude,
        price: non_negative(record, columns, "price")?,
        rating,
        property_type: text(record, columns, "property_type")?,
        occupancy_30: non_negative(record, columns, "occupancy_30")?,
        occupancy_60: non_negative(record, columns, "occupancy_60")?,
        occupancy_90: non_negative(record, columns, "occupancy_90")?,
        occupancy_365: non_negative(record, columns, "occupancy_365")?,
    })
}
