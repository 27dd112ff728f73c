use super::aggregate::{sort_desc_by_value, CategoryMean, GroupMeans};
use super::table::ListingTable;

/// The `k` suburbs of `country` with the highest mean price.
///
/// Means are rounded to whole currency units (half to even) before ranking, so
/// two suburbs 0.3 apart can tie; ties are ordered by suburb name.
pub fn top_suburbs_by_mean_price(table: &ListingTable, country: &str, k: usize) -> Vec<CategoryMean> {
    let mut groups = GroupMeans::new();
    for l in table.rows().iter().filter(|l| l.country == country) {
        groups.add(&l.suburb, l.price);
    }

    let mut means = groups.into_means();
    for m in means.iter_mut() {
        m.value = m.value.round_ties_even();
    }
    sort_desc_by_value(&mut means);
    means.truncate(k);
    means
}

/// Mean price per country for one property type, most expensive first.
pub fn mean_price_by_country_for_property_type(
    table: &ListingTable,
    property_type: &str,
) -> Vec<CategoryMean> {
    let mut groups = GroupMeans::new();
    for l in table.rows().iter().filter(|l| l.property_type == property_type) {
        groups.add(&l.country, l.price);
    }

    let mut means = groups.into_means();
    sort_desc_by_value(&mut means);
    means
}
