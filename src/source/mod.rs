pub mod file;
pub mod http;
pub mod parse;

use anyhow::Result;
use async_trait::async_trait;

pub use file::FileSource;
pub use http::HttpSource;
pub use parse::{parse_listings, LoadReport, RowError, REQUIRED_COLUMNS};

/// Where the raw listings CSV comes from. Fetched once per session.
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn fetch(&self) -> Result<String>;
    fn describe(&self) -> String;
}

const LOGGED_ROW_ERRORS: usize = 20;

fn unlogged_row_errors(report: &LoadReport) -> usize {
    report.row_errors.len().saturating_sub(LOGGED_ROW_ERRORS)
}

/// Fetch and parse in one step, logging how many rows were rejected.
pub async fn load_table(source: &dyn ListingSource) -> Result<LoadReport> {
    tracing::info!(source = %source.describe(), "loading listings");
    let text = source.fetch().await?;
    let report = parse_listings(&text)?;
    for e in report.row_errors.iter().take(LOGGED_ROW_ERRORS) {
        tracing::warn!(line = e.line, error = %e.message, "skipped listing row");
    }
    let omitted = unlogged_row_errors(&report);
    if omitted > 0 {
        tracing::warn!(omitted, "further skipped rows not logged");
    }
    tracing::info!(
        rows_read = report.rows_read,
        rows_used = report.table.len(),
        rejected = report.row_errors.len(),
        "listings loaded"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ListingTable;

    fn report_with_errors(n: usize) -> LoadReport {
        LoadReport {
            table: ListingTable::default(),
            rows_read: n,
            row_errors: (0..n)
                .map(|i| RowError {
                    line: i + 2,
                    message: "invalid price".to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_unlogged_row_errors_counts_overflow() {
        assert_eq!(unlogged_row_errors(&report_with_errors(0)), 0);
        assert_eq!(unlogged_row_errors(&report_with_errors(LOGGED_ROW_ERRORS)), 0);
        assert_eq!(unlogged_row_errors(&report_with_errors(25)), 5);
    }
}
