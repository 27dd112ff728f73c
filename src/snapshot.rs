//! Non-interactive output: runs the dashboard's default queries once and
//! serialises the results, for scripting and for checking a dataset without a
//! terminal.

use crate::config::DashboardConfig;
use crate::query::{
    country_suburb_options, geo_filtered_subset, mean_occupancy_for_window,
    mean_price_by_country_for_property_type, top_suburbs_by_mean_price, CategoryMean, GeoPoint,
    ListingTable, OccupancyWindow, PriceRange, QueryError,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Snapshot {
    pub dataset: String,
    pub rows: usize,
    pub countries: Vec<String>,
    pub property_types: Vec<String>,
    pub price_range: Option<PriceRange>,
    pub country: Option<CountrySnapshot>,
    pub property_type_means: Vec<PropertyTypeSnapshot>,
    pub occupancy: Vec<OccupancySnapshot>,
}

#[derive(Debug, Serialize)]
pub struct CountrySnapshot {
    pub country: String,
    /// The price bound used for the suburb queries (the table maximum).
    pub max_price: f64,
    pub suburbs: Vec<String>,
    pub top_suburbs: Vec<CategoryMean>,
    pub first_suburb: Option<SuburbSnapshot>,
}

#[derive(Debug, Serialize)]
pub struct SuburbSnapshot {
    pub suburb: String,
    pub listings: usize,
    pub distinct_names: usize,
    pub center: Option<GeoPoint>,
}

#[derive(Debug, Serialize)]
pub struct PropertyTypeSnapshot {
    pub property_type: String,
    pub countries: Vec<CategoryMean>,
}

#[derive(Debug, Serialize)]
pub struct OccupancySnapshot {
    pub window: String,
    pub countries: Vec<CategoryMean>,
}

pub fn build_snapshot(
    table: &ListingTable,
    config: &DashboardConfig,
    dataset: &str,
) -> Result<Snapshot, QueryError> {
    let countries = table.countries();
    let property_types = table.property_types();
    let price_range = table.price_range();

    let country = config
        .default_country
        .clone()
        .filter(|c| {
            let known = countries.contains(c);
            if !known {
                tracing::warn!(country = %c, "default_country not in dataset");
            }
            known
        })
        .or_else(|| countries.first().cloned());

    let country = match (country, price_range) {
        (Some(country), Some(range)) => Some(country_snapshot(table, config, country, range.max)?),
        _ => None,
    };

    let property_type_means = property_types
        .iter()
        .map(|t| PropertyTypeSnapshot {
            property_type: t.clone(),
            countries: mean_price_by_country_for_property_type(table, t),
        })
        .collect();

    let occupancy = OccupancyWindow::ALL
        .into_iter()
        .map(|w| OccupancySnapshot {
            window: w.field_name().to_string(),
            countries: mean_occupancy_for_window(table, w),
        })
        .collect();

    Ok(Snapshot {
        dataset: dataset.to_string(),
        rows: table.len(),
        countries,
        property_types,
        price_range,
        country,
        property_type_means,
        occupancy,
    })
}

fn country_snapshot(
    table: &ListingTable,
    config: &DashboardConfig,
    country: String,
    max_price: f64,
) -> Result<CountrySnapshot, QueryError> {
    let suburbs = country_suburb_options(table, &country, max_price)?;
    let first_suburb = match suburbs.first() {
        Some(s) => {
            let subset = geo_filtered_subset(table, &country, s, max_price)?;
            Some(SuburbSnapshot {
                suburb: s.clone(),
                listings: subset.matches.len(),
                distinct_names: subset.distinct_names().len(),
                center: subset.center,
            })
        }
        None => None,
    };

    Ok(CountrySnapshot {
        top_suburbs: top_suburbs_by_mean_price(table, &country, config.top_k),
        country,
        max_price,
        suburbs,
        first_suburb,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Listing;

    fn listing(country: &str, suburb: &str, name: &str, price: f64) -> Listing {
        Listing {
            name: name.to_string(),
            country: country.to_string(),
            suburb: suburb.to_string(),
            latitude: -22.97,
            longitude: -43.18,
            price,
            rating: Some(97.0),
            property_type: "Apartment".to_string(),
            occupancy_30: 50.0,
            occupancy_60: 50.0,
            occupancy_90: 50.0,
            occupancy_365: 50.0,
        }
    }

    #[test]
    fn test_snapshot_contents() {
        let table = ListingTable::new(vec![
            listing("Brazil", "Copacabana", "Beach View", 300.0),
            listing("Brazil", "Copacabana", "Beach View", 200.0),
            listing("Brazil", "Leblon", "Quiet Studio", 500.0),
        ]);
        let snap = build_snapshot(&table, &DashboardConfig::default(), "rio.csv").unwrap();
        assert_eq!(snap.rows, 3);
        let country = snap.country.unwrap();
        assert_eq!(country.country, "Brazil");
        assert_eq!(country.max_price, 500.0);
        assert_eq!(country.suburbs, vec!["Copacabana", "Leblon"]);
        assert_eq!(country.top_suburbs[0].label, "Leblon");
        let first = country.first_suburb.unwrap();
        assert_eq!(first.listings, 2);
        assert_eq!(first.distinct_names, 1);
        assert_eq!(snap.occupancy.len(), 4);
        assert_eq!(snap.occupancy[3].window, "occupancy_365");
    }

    #[test]
    fn test_snapshot_serializes() {
        let table = ListingTable::new(vec![listing("Brazil", "Leblon", "Quiet Studio", 500.0)]);
        let snap = build_snapshot(&table, &DashboardConfig::default(), "rio.csv").unwrap();
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["country"]["top_suburbs"][0]["value"], 500.0);
        assert_eq!(json["price_range"]["min"], 500.0);
    }

    #[test]
    fn test_unknown_default_country_uses_first() {
        let table = ListingTable::new(vec![
            listing("Brazil", "Leblon", "Quiet Studio", 500.0),
            listing("Chile", "Providencia", "Loft", 80.0),
        ]);
        let cfg = DashboardConfig {
            default_country: Some("Atlantis".to_string()),
            ..DashboardConfig::default()
        };
        let snap = build_snapshot(&table, &cfg, "rio.csv").unwrap();
        assert_eq!(snap.country.unwrap().country, "Brazil");
    }

    #[test]
    fn test_empty_table_snapshot() {
        let snap = build_snapshot(&ListingTable::default(), &DashboardConfig::default(), "none").unwrap();
        assert!(snap.country.is_none());
        assert!(snap.property_type_means.is_empty());
        assert!(snap.occupancy.iter().all(|o| o.countries.is_empty()));
    }
}
