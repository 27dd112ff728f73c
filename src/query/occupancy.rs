use super::aggregate::{CategoryMean, GroupMeans};
use super::error::QueryError;
use super::table::{Listing, ListingTable};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Trailing window an occupancy percentage was measured over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OccupancyWindow {
    Days30,
    Days60,
    Days90,
    Days365,
}

impl OccupancyWindow {
    pub const ALL: [OccupancyWindow; 4] = [
        OccupancyWindow::Days30,
        OccupancyWindow::Days60,
        OccupancyWindow::Days90,
        OccupancyWindow::Days365,
    ];

    /// Column name in the dataset.
    pub fn field_name(self) -> &'static str {
        match self {
            OccupancyWindow::Days30 => "occupancy_30",
            OccupancyWindow::Days60 => "occupancy_60",
            OccupancyWindow::Days90 => "occupancy_90",
            OccupancyWindow::Days365 => "occupancy_365",
        }
    }

    pub fn value(self, listing: &Listing) -> f64 {
        match self {
            OccupancyWindow::Days30 => listing.occupancy_30,
            OccupancyWindow::Days60 => listing.occupancy_60,
            OccupancyWindow::Days90 => listing.occupancy_90,
            OccupancyWindow::Days365 => listing.occupancy_365,
        }
    }

    /// Cycle to the next window, wrapping after 365 days.
    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|w| *w == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for OccupancyWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

impl FromStr for OccupancyWindow {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|w| w.field_name() == s)
            .ok_or_else(|| QueryError::InvalidParameter {
                parameter: "occupancy field",
                value: s.to_string(),
                expected: Self::ALL
                    .iter()
                    .map(|w| w.field_name())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

/// Mean occupancy per country for a field given by column name.
/// The name is validated before anything is aggregated.
pub fn mean_occupancy_by_country(
    table: &ListingTable,
    field: &str,
) -> Result<Vec<CategoryMean>, QueryError> {
    let window: OccupancyWindow = field.parse()?;
    Ok(mean_occupancy_for_window(table, window))
}

/// Mean occupancy per country, countries in the order they first appear.
pub fn mean_occupancy_for_window(table: &ListingTable, window: OccupancyWindow) -> Vec<CategoryMean> {
    let mut groups = GroupMeans::new();
    for l in table.rows() {
        groups.add(&l.country, window.value(l));
    }
    groups.into_means()
}
