//! View models the renderer draws from. Each is rebuilt from the query layer
//! whenever a selection changes and owns its data, so drawing never touches
//! the table.

use crate::query::{
    country_listings, geo_filtered_subset, GeoPoint, Listing, ListingTable, QueryError,
};

/// One plotted listing: position plus the value that weights its colour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeoView {
    /// Distinct listing names under the price bound.
    pub names: Vec<String>,
    /// Every listing of the country, weighted by price.
    pub price_points: Vec<MapPoint>,
    /// Rated listings of the suburb, weighted by rating.
    pub rating_points: Vec<MapPoint>,
    pub center: Option<GeoPoint>,
    /// Half-width of the map window in degrees, from the suburb's spread.
    pub span: f64,
    /// Why the maps are empty, when they are.
    pub no_data: Option<String>,
}

const MIN_SPAN_DEG: f64 = 0.01;

impl GeoView {
    pub fn empty(reason: impl Into<String>) -> Self {
        Self {
            no_data: Some(reason.into()),
            ..Self::default()
        }
    }

    pub fn build(
        table: &ListingTable,
        country: &str,
        suburb: &str,
        max_price: f64,
    ) -> Result<Self, QueryError> {
        let subset = geo_filtered_subset(table, country, suburb, max_price)?;
        let center = subset.map_center()?;

        let price_points = country_listings(table, country)
            .into_iter()
            .map(|l| point(l, l.price))
            .collect();

        let rating_points = subset
            .suburb_listings
            .iter()
            .filter_map(|l| l.rating.map(|r| point(l, r)))
            .collect();

        let span = subset
            .suburb_listings
            .iter()
            .map(|l| {
                (l.latitude - center.latitude)
                    .abs()
                    .max((l.longitude - center.longitude).abs())
            })
            .fold(0.0_f64, f64::max)
            .max(MIN_SPAN_DEG)
            * 1.1;

        Ok(Self {
            names: subset.distinct_names(),
            price_points,
            rating_points,
            center: Some(center),
            span,
            no_data: None,
        })
    }

    /// `(x_bounds, y_bounds)` of the map window: longitude, then latitude.
    pub fn bounds(&self) -> Option<([f64; 2], [f64; 2])> {
        self.center.map(|c| {
            (
                [c.longitude - self.span, c.longitude + self.span],
                [c.latitude - self.span, c.latitude + self.span],
            )
        })
    }
}

fn point(l: &Listing, weight: f64) -> MapPoint {
    MapPoint {
        latitude: l.latitude,
        longitude: l.longitude,
        weight,
    }
}

/// Split points into low / mid / high thirds by weight, as `(x, y)` canvas
/// coordinates. Equal weights land in the same layer.
pub fn density_layers(points: &[MapPoint]) -> [Vec<(f64, f64)>; 3] {
    let mut layers: [Vec<(f64, f64)>; 3] = Default::default();
    if points.is_empty() {
        return layers;
    }

    let mut weights: Vec<f64> = points.iter().map(|p| p.weight).collect();
    weights.sort_by(|a, b| a.total_cmp(b));
    let low_cut = weights[weights.len() / 3];
    let high_cut = weights[(weights.len() * 2) / 3];

    for p in points {
        let layer = if p.weight < low_cut {
            0
        } else if p.weight < high_cut {
            1
        } else {
            2
        };
        layers[layer].push((p.longitude, p.latitude));
    }
    layers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(suburb: &str, price: f64, rating: Option<f64>, lat: f64, lon: f64) -> Listing {
        Listing {
            name: format!("{suburb} {price}"),
            country: "Australia".to_string(),
            suburb: suburb.to_string(),
            latitude: lat,
            longitude: lon,
            price,
            rating,
            property_type: "Apartment".to_string(),
            occupancy_30: 0.0,
            occupancy_60: 0.0,
            occupancy_90: 0.0,
            occupancy_365: 0.0,
        }
    }

    fn sydney() -> ListingTable {
        ListingTable::new(vec![
            listing("Bondi", 250.0, Some(95.0), -33.890, 151.270),
            listing("Bondi", 900.0, None, -33.894, 151.274),
            listing("Manly", 180.0, Some(88.0), -33.797, 151.285),
        ])
    }

    #[test]
    fn test_build_geo_view() {
        let view = GeoView::build(&sydney(), "Australia", "Bondi", 500.0).unwrap();
        assert_eq!(view.names, vec!["Bondi 250"]);
        assert_eq!(view.price_points.len(), 3);
        assert_eq!(view.rating_points.len(), 1);
        let center = view.center.unwrap();
        assert!((center.latitude - -33.892).abs() < 1e-9);
        assert!(view.no_data.is_none());
        assert!(view.span >= MIN_SPAN_DEG);
    }

    #[test]
    fn test_unknown_suburb_is_empty_result() {
        let err = GeoView::build(&sydney(), "Australia", "Parramatta", 500.0).unwrap_err();
        assert!(err.is_empty_result());
    }

    #[test]
    fn test_bounds_centered() {
        let view = GeoView::build(&sydney(), "Australia", "Manly", 500.0).unwrap();
        let (x, y) = view.bounds().unwrap();
        assert!(((x[0] + x[1]) / 2.0 - 151.285).abs() < 1e-9);
        assert!(((y[0] + y[1]) / 2.0 - -33.797).abs() < 1e-9);
        assert!(GeoView::empty("nothing").bounds().is_none());
    }

    #[test]
    fn test_density_layers_split_by_weight() {
        let points: Vec<MapPoint> = (0..6)
            .map(|i| MapPoint {
                latitude: i as f64,
                longitude: 0.0,
                weight: i as f64 * 10.0,
            })
            .collect();
        let layers = density_layers(&points);
        assert_eq!(layers[0].len(), 2);
        assert_eq!(layers[1].len(), 2);
        assert_eq!(layers[2].len(), 2);
        assert_eq!(layers[2][1], (0.0, 5.0));
    }

    #[test]
    fn test_density_layers_equal_weights() {
        let point = MapPoint {
            latitude: 1.0,
            longitude: 2.0,
            weight: 7.0,
        };
        let points = vec![point; 4];
        let layers = density_layers(&points);
        assert!(layers[0].is_empty());
        assert!(layers[1].is_empty());
        assert_eq!(layers[2].len(), 4);
    }
}
