//! Location filters behind the geospatial page: suburb choices under a price
//! bound, the filtered listing subset and the map centre.

use super::aggregate::mean;
use super::error::{validate_price_bound, QueryError};
use super::table::{distinct, Listing, ListingTable};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Result of [`geo_filtered_subset`]. Borrows rows from the table, so row
/// identity is preserved and nothing is copied or deduplicated.
#[derive(Debug, Clone)]
pub struct GeoSubset<'a> {
    /// Rows matching country, suburb and `price <= max_price`, in table order.
    pub matches: Vec<&'a Listing>,
    /// Rows matching country and suburb regardless of price.
    pub suburb_listings: Vec<&'a Listing>,
    /// Mean coordinate of `suburb_listings`; `None` when there are none.
    pub center: Option<GeoPoint>,
    country: String,
    suburb: String,
}

impl<'a> GeoSubset<'a> {
    /// Map centre, or `EmptyResult` when the suburb has no listings at all.
    pub fn map_center(&self) -> Result<GeoPoint, QueryError> {
        self.center.ok_or_else(|| QueryError::EmptyResult {
            context: format!("no listings in {}, {}", self.suburb, self.country),
        })
    }

    /// Distinct listing names of `matches`, first-seen order.
    pub fn distinct_names(&self) -> Vec<String> {
        distinct(self.matches.iter().map(|l| l.name.as_str()))
    }
}

/// Suburbs of `country` that have at least one listing priced at or under `max_price`.
/// An unknown country or an over-tight bound gives an empty list.
pub fn country_suburb_options(
    table: &ListingTable,
    country: &str,
    max_price: f64,
) -> Result<Vec<String>, QueryError> {
    validate_price_bound(max_price)?;
    Ok(distinct(
        table
            .rows()
            .iter()
            .filter(|l| l.country == country && l.price <= max_price)
            .map(|l| l.suburb.as_str()),
    ))
}

pub fn geo_filtered_subset<'a>(
    table: &'a ListingTable,
    country: &str,
    suburb: &str,
    max_price: f64,
) -> Result<GeoSubset<'a>, QueryError> {
    validate_price_bound(max_price)?;

    let suburb_listings: Vec<&Listing> = table
        .rows()
        .iter()
        .filter(|l| l.country == country && l.suburb == suburb)
        .collect();

    let matches: Vec<&Listing> = suburb_listings
        .iter()
        .copied()
        .filter(|l| l.price <= max_price)
        .collect();

    let center = mean(suburb_listings.iter().map(|l| l.latitude))
        .zip(mean(suburb_listings.iter().map(|l| l.longitude)))
        .map(|(latitude, longitude)| GeoPoint { latitude, longitude });

    Ok(GeoSubset {
        matches,
        suburb_listings,
        center,
        country: country.to_string(),
        suburb: suburb.to_string(),
    })
}

/// All listings of one country, in table order.
pub fn country_listings<'a>(table: &'a ListingTable, country: &str) -> Vec<&'a Listing> {
    table.rows().iter().filter(|l| l.country == country).collect()
}
