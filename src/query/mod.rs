//! Listing query engine.
//!
//! Every operation here is a pure function of `(&ListingTable, parameters)`.
//! Nothing mutates the table and nothing is cached between calls.

pub mod aggregate;
pub mod error;
pub mod geo;
pub mod occupancy;
pub mod ranking;
pub mod table;

pub use aggregate::CategoryMean;
pub use error::QueryError;
pub use geo::{country_listings, country_suburb_options, geo_filtered_subset, GeoPoint, GeoSubset};
pub use occupancy::{mean_occupancy_by_country, mean_occupancy_for_window, OccupancyWindow};
pub use ranking::{mean_price_by_country_for_property_type, top_suburbs_by_mean_price};
pub use table::{Listing, ListingTable, PriceRange};
