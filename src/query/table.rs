use serde::Serialize;
use std::collections::HashSet;

/// One rental listing. Rows are validated by the loader before they get here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    pub name: String,
    pub country: String,
    pub suburb: String,
    pub latitude: f64,
    pub longitude: f64,
    pub price: f64,
    /// `None` for listings without reviews.
    pub rating: Option<f64>,
    pub property_type: String,
    pub occupancy_30: f64,
    pub occupancy_60: f64,
    pub occupancy_90: f64,
    pub occupancy_365: f64,
}

/// Inclusive price span of the whole table, used to bound the price slider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

/// The in-memory dataset. Built once per session and only ever read.
#[derive(Debug, Clone, Default)]
pub struct ListingTable {
    rows: Vec<Listing>,
}

impl ListingTable {
    pub fn new(rows: Vec<Listing>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Listing] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct countries in first-seen order.
    pub fn countries(&self) -> Vec<String> {
        distinct(self.rows.iter().map(|l| l.country.as_str()))
    }

    /// Distinct property types in first-seen order.
    pub fn property_types(&self) -> Vec<String> {
        distinct(self.rows.iter().map(|l| l.property_type.as_str()))
    }

    pub fn price_range(&self) -> Option<PriceRange> {
        let mut prices = self.rows.iter().map(|l| l.price);
        let first = prices.next()?;
        let (min, max) = prices.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Some(PriceRange { min, max })
    }
}

/// Collect distinct values keeping the order in which they first appear.
pub(crate) fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();
    for v in values {
        if seen.insert(v) {
            out.push(v.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(country: &str, property_type: &str, price: f64) -> Listing {
        Listing {
            name: format!("{} {}", country, price),
            country: country.to_string(),
            suburb: "Centre".to_string(),
            latitude: 0.0,
            longitude: 0.0,
            price,
            rating: None,
            property_type: property_type.to_string(),
            occupancy_30: 0.0,
            occupancy_60: 0.0,
            occupancy_90: 0.0,
            occupancy_365: 0.0,
        }
    }

    #[test]
    fn test_countries_first_seen_order() {
        let table = ListingTable::new(vec![
            listing("Portugal", "Loft", 80.0),
            listing("Brazil", "Loft", 120.0),
            listing("Portugal", "House", 95.0),
            listing("Australia", "Apartment", 150.0),
        ]);
        assert_eq!(table.countries(), vec!["Portugal", "Brazil", "Australia"]);
        assert_eq!(table.property_types(), vec!["Loft", "House", "Apartment"]);
    }

    #[test]
    fn test_price_range() {
        let table = ListingTable::new(vec![
            listing("Portugal", "Loft", 80.0),
            listing("Brazil", "Loft", 1200.0),
            listing("Portugal", "House", 9.0),
        ]);
        let expected = PriceRange {
            min: 9.0,
            max: 1200.0,
        };
        assert_eq!(table.price_range(), Some(expected));
    }

    #[test]
    fn test_empty_table() {
        let table = ListingTable::default();
        assert!(table.is_empty());
        assert_eq!(table.price_range(), None);
        assert!(table.countries().is_empty());
    }
}
